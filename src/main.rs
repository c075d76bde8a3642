//! Demo: provisions a namespace, a VPC connection, a data source behind it and a SPICE data
//! set against the in-memory service, refreshes the data set, then tears everything down.

use quicksight_reconciler::api::{InMemoryQuickSight, SharedApi};
use quicksight_reconciler::lifecycle::tracing::setup_tracing;
use quicksight_reconciler::lifecycle::{ReconcileSystem, SystemConfig};
use quicksight_reconciler::model::{
    DataSetDeclaration, DataSourceDeclaration, IngestionDeclaration, NamespaceDeclaration,
    VpcConnectionDeclaration,
};
use reconcile_framework::FamilyClient;
use std::sync::Arc;
use tracing::{info, Instrument};

const ACCOUNT_ID: &str = "123456789012";
const ANALYST_ARN: &str = "arn:aws:quicksight:us-east-1:123456789012:group/analytics/analysts";

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    let api: SharedApi = Arc::new(InMemoryQuickSight::new());
    let mut config = SystemConfig::new(ACCOUNT_ID);
    config.reconciler.min_poll_interval_ms = 50;
    let system = ReconcileSystem::new(api, config);

    let span = tracing::info_span!("provision");
    let (namespace, vpc, data_source, data_set) = async {
        let namespace = system
            .namespace_client
            .create_namespace(&NamespaceDeclaration::new("analytics"))
            .await
            .map_err(|e| e.to_string())?;

        let vpc = system
            .vpc_connection_client
            .create_vpc_connection(&VpcConnectionDeclaration {
                aws_account_id: None,
                vpc_connection_id: "warehouse-vpc".to_string(),
                name: "Warehouse".to_string(),
                role_arn: "arn:aws:iam::123456789012:role/quicksight-vpc".to_string(),
                security_group_ids: vec!["sg-0a1b2c3d".to_string()],
                subnet_ids: vec!["subnet-1111".to_string(), "subnet-2222".to_string()],
                dns_resolvers: None,
            })
            .await
            .map_err(|e| e.to_string())?;

        let vpc_connection_arn = vpc.attributes.get("arn").as_str().unwrap_or_default();
        let data_source = system
            .data_source_client
            .create_data_source(
                &DataSourceDeclaration::new("warehouse", "Warehouse")
                    .postgresql("sales", "warehouse.internal", 5432)
                    .credentials("quicksight", "demo-password")
                    .vpc_connection(vpc_connection_arn)
                    .permission(
                        ANALYST_ARN,
                        &["quicksight:DescribeDataSource", "quicksight:PassDataSource"],
                    ),
            )
            .await
            .map_err(|e| e.to_string())?;

        let declared = DataSetDeclaration::new("sales", "Sales", "SPICE")
            .custom_sql(
                "orders",
                data_source.attributes.get("arn").as_str().unwrap_or_default(),
                "SELECT id, region, amount, ordered_at FROM orders",
                &[
                    ("id", "INTEGER"),
                    ("region", "STRING"),
                    ("amount", "DECIMAL"),
                    ("ordered_at", "DATETIME"),
                ],
            )
            .permission(ANALYST_ARN, &["quicksight:DescribeDataSet", "quicksight:PassDataSet"])
            .tag("team", "finance")
            .incremental_refresh("ordered_at", 7, "DAY")
            .build();
        let data_set = system
            .data_set_client
            .create_data_set(declared)
            .await
            .map_err(|e| e.to_string())?;

        Ok::<_, String>((namespace, vpc, data_source, data_set))
    }
    .instrument(span)
    .await?;

    info!(
        namespace = %namespace.id,
        vpc_connection = %vpc.id,
        data_source = %data_source.id,
        data_set = %data_set.id,
        "Provisioned"
    );

    let ingestion = system
        .ingestion_client
        .start_ingestion(&IngestionDeclaration::full_refresh("sales", "nightly-1"))
        .instrument(tracing::info_span!("refresh"))
        .await
        .map_err(|e| e.to_string())?;
    info!(
        status = ?ingestion.attributes.get("ingestion_status").as_str(),
        "Ingestion finished"
    );

    let span = tracing::info_span!("teardown");
    async {
        system
            .data_set_client
            .delete(data_set.id)
            .await
            .map_err(|e| e.to_string())?;
        system
            .data_source_client
            .delete(data_source.id)
            .await
            .map_err(|e| e.to_string())?;
        system
            .vpc_connection_client
            .delete(vpc.id)
            .await
            .map_err(|e| e.to_string())?;
        system
            .namespace_client
            .delete(namespace.id)
            .await
            .map_err(|e| e.to_string())
    }
    .instrument(span)
    .await?;

    system.shutdown().await
}
