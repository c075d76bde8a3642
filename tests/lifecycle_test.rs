//! Asynchronous create/update/delete against the in-memory service. Time is paused, so
//! waiter and retry sleeps complete instantly.

use quicksight_reconciler::api::{
    ApiOperation, CreateIngestionRequest, InMemoryQuickSight, QuickSightApi, SharedApi,
};
use quicksight_reconciler::ingestion::IngestionError;
use quicksight_reconciler::lifecycle::{ReconcileSystem, SystemConfig};
use quicksight_reconciler::model::{
    DataSetDeclaration, DataSourceDeclaration, IngestionDeclaration, NamespaceDeclaration,
    VpcConnectionDeclaration,
};
use quicksight_reconciler::namespace::NamespaceError;
use quicksight_reconciler::vpc_connection::VpcConnectionError;
use reconcile_framework::{ErrorKind, FamilyClient, Observed, ReconcileError, RemoteError, Value};
use std::sync::Arc;

const ACCOUNT_ID: &str = "123456789012";

fn start_with(api: InMemoryQuickSight, config: SystemConfig) -> (Arc<InMemoryQuickSight>, ReconcileSystem) {
    let api = Arc::new(api);
    let shared: SharedApi = api.clone();
    (api, ReconcileSystem::new(shared, config))
}

fn start() -> (Arc<InMemoryQuickSight>, ReconcileSystem) {
    start_with(InMemoryQuickSight::new(), SystemConfig::new(ACCOUNT_ID))
}

fn warehouse_vpc() -> VpcConnectionDeclaration {
    VpcConnectionDeclaration {
        aws_account_id: None,
        vpc_connection_id: "warehouse".to_string(),
        name: "Warehouse".to_string(),
        role_arn: "arn:aws:iam::123456789012:role/quicksight-vpc".to_string(),
        security_group_ids: vec!["sg-1".to_string()],
        subnet_ids: vec!["subnet-a".to_string(), "subnet-b".to_string()],
        dns_resolvers: None,
    }
}

fn role_not_assumable() -> RemoteError {
    RemoteError::new(
        ErrorKind::AccessDenied,
        "QuickSight could not sts:AssumeRole arn:aws:iam::123456789012:role/quicksight-vpc",
    )
}

async fn spice_data_set(system: &ReconcileSystem) {
    let declared = DataSetDeclaration::new("sales", "Sales", "SPICE")
        .custom_sql(
            "orders",
            "arn:aws:quicksight:us-east-1:123456789012:datasource/warehouse",
            "SELECT id FROM orders",
            &[("id", "INTEGER")],
        )
        .build();
    system.data_set_client.create_data_set(declared).await.unwrap();
}

// --- Namespace ---

#[tokio::test(start_paused = true)]
async fn test_namespace_create_waits_until_created() {
    let (api, system) = start_with(
        InMemoryQuickSight::new().with_settle_polls(3),
        SystemConfig::new(ACCOUNT_ID),
    );

    let state = system
        .namespace_client
        .create_namespace(&NamespaceDeclaration::new("analytics"))
        .await
        .unwrap();

    assert_eq!(state.id, "123456789012,analytics");
    assert_eq!(state.attributes.get("creation_status").as_str(), Some("CREATED"));
    assert_eq!(state.attributes.get("identity_store").as_str(), Some("QUICKSIGHT"));
    assert_eq!(state.attributes.get("capacity_region").as_str(), Some("us-east-1"));
    assert!(api.calls(ApiOperation::DescribeNamespace) >= 4);
}

#[tokio::test(start_paused = true)]
async fn test_namespace_changes_are_recorded_without_remote_calls() {
    let (api, system) = start();
    let state = system
        .namespace_client
        .create_namespace(&NamespaceDeclaration::new("analytics"))
        .await
        .unwrap();
    let describes = api.calls(ApiOperation::DescribeNamespace);

    let declaration = NamespaceDeclaration {
        identity_store: Some("IAM_IDENTITY_CENTER".to_string()),
        ..NamespaceDeclaration::new("analytics")
    };
    let updated = system
        .namespace_client
        .update_namespace(state.id, &declaration, state.attributes)
        .await
        .unwrap();

    let Observed::Present(updated) = updated else {
        panic!("namespace unexpectedly absent");
    };
    assert_eq!(
        updated.attributes.get("identity_store").as_str(),
        Some("IAM_IDENTITY_CENTER")
    );
    assert_eq!(api.calls(ApiOperation::CreateNamespace), 1);
    assert_eq!(api.calls(ApiOperation::DescribeNamespace), describes);
}

#[tokio::test(start_paused = true)]
async fn test_namespace_delete_waits_until_gone() {
    let (api, system) = start();
    let state = system
        .namespace_client
        .create_namespace(&NamespaceDeclaration::new("analytics"))
        .await
        .unwrap();

    system.namespace_client.delete(state.id.clone()).await.unwrap();

    assert!(api.describe_namespace(ACCOUNT_ID, "analytics").await.unwrap_err().is_not_found());
    let read = system
        .namespace_client
        .read(state.id, state.attributes)
        .await
        .unwrap();
    assert!(read.is_absent());
}

#[tokio::test(start_paused = true)]
async fn test_namespace_rejected_identity_store_is_not_retried() {
    let (api, system) = start();
    let declaration = NamespaceDeclaration {
        identity_store: Some("ACTIVE_DIRECTORY".to_string()),
        ..NamespaceDeclaration::new("analytics")
    };

    let err = system
        .namespace_client
        .create_namespace(&declaration)
        .await
        .unwrap_err();

    match err {
        NamespaceError::Reconcile(ReconcileError::Remote { source, .. }) => {
            assert_eq!(source.kind, ErrorKind::InvalidParameterValue);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(api.calls(ApiOperation::CreateNamespace), 1);
}

// --- VPC connection ---

#[tokio::test(start_paused = true)]
async fn test_vpc_connection_create_retries_while_role_propagates() {
    let (api, system) = start();
    api.inject_fault(ApiOperation::CreateVpcConnection, role_not_assumable());
    api.inject_fault(ApiOperation::CreateVpcConnection, role_not_assumable());

    let state = system
        .vpc_connection_client
        .create_vpc_connection(&warehouse_vpc())
        .await
        .unwrap();

    assert_eq!(api.calls(ApiOperation::CreateVpcConnection), 3);
    assert_eq!(state.attributes.get("status").as_str(), Some("CREATION_SUCCESSFUL"));
    assert_eq!(state.attributes.get("availability_status").as_str(), Some("AVAILABLE"));
}

#[tokio::test(start_paused = true)]
async fn test_vpc_connection_role_that_never_propagates() {
    let mut config = SystemConfig::new(ACCOUNT_ID);
    config.reconciler.retry.budget_secs = 5;
    let (api, system) = start_with(InMemoryQuickSight::new(), config);
    for _ in 0..50 {
        api.inject_fault(ApiOperation::CreateVpcConnection, role_not_assumable());
    }

    let err = system
        .vpc_connection_client
        .create_vpc_connection(&warehouse_vpc())
        .await
        .unwrap_err();

    assert!(matches!(err, VpcConnectionError::RoleNotPropagated(_)), "{err:?}");
    assert!(api.calls(ApiOperation::CreateVpcConnection) < 50);
}

#[tokio::test(start_paused = true)]
async fn test_vpc_connection_update_waits_for_success() {
    let (api, system) = start();
    let state = system
        .vpc_connection_client
        .create_vpc_connection(&warehouse_vpc())
        .await
        .unwrap();

    let declaration = VpcConnectionDeclaration {
        subnet_ids: vec!["subnet-a".to_string(), "subnet-c".to_string()],
        ..warehouse_vpc()
    };
    let updated = system
        .vpc_connection_client
        .update_vpc_connection(state.id, &declaration, state.attributes)
        .await
        .unwrap();

    let Observed::Present(updated) = updated else {
        panic!("VPC connection unexpectedly absent");
    };
    assert_eq!(updated.attributes.get("status").as_str(), Some("UPDATE_SUCCESSFUL"));
    assert_eq!(
        updated.attributes.get("subnet_ids").canonical(),
        Value::string_set(["subnet-a", "subnet-c"])
    );
    assert_eq!(api.calls(ApiOperation::UpdateVpcConnection), 1);
}

#[tokio::test(start_paused = true)]
async fn test_deleted_vpc_connection_reads_absent_and_can_be_recreated() {
    let (api, system) = start();
    let state = system
        .vpc_connection_client
        .create_vpc_connection(&warehouse_vpc())
        .await
        .unwrap();

    system
        .vpc_connection_client
        .delete(state.id.clone())
        .await
        .unwrap();

    let remote = api.describe_vpc_connection(ACCOUNT_ID, "warehouse").await.unwrap();
    assert_eq!(remote.status, "DELETED");
    let read = system
        .vpc_connection_client
        .read(state.id.clone(), state.attributes)
        .await
        .unwrap();
    assert!(read.is_absent());

    // A second delete finds nothing to do.
    system.vpc_connection_client.delete(state.id).await.unwrap();

    system
        .vpc_connection_client
        .create_vpc_connection(&warehouse_vpc())
        .await
        .unwrap();
}

// --- Data source ---

#[tokio::test(start_paused = true)]
async fn test_data_source_connects_through_available_vpc_connection() {
    let (_api, system) = start();
    let connection = system
        .vpc_connection_client
        .create_vpc_connection(&warehouse_vpc())
        .await
        .unwrap();
    let vpc_connection_arn = connection.attributes.get("arn").as_str().unwrap();

    let declaration = DataSourceDeclaration::new("warehouse", "Warehouse")
        .redshift_cluster("analytics-cluster", "analytics")
        .credentials("reporter", "hunter2")
        .vpc_connection(vpc_connection_arn);
    let state = system
        .data_source_client
        .create_data_source(&declaration)
        .await
        .unwrap();

    assert_eq!(state.attributes.get("status").as_str(), Some("CREATION_SUCCESSFUL"));
    assert_eq!(state.attributes.get("type").as_str(), Some("REDSHIFT"));
    assert!(state.attributes.get("error_info").is_null());
    system.shutdown().await.unwrap();
}

// --- Ingestion ---

#[tokio::test(start_paused = true)]
async fn test_ingestion_runs_to_completion() {
    let (_api, system) = start();
    spice_data_set(&system).await;

    let state = system
        .ingestion_client
        .start_ingestion(&IngestionDeclaration::full_refresh("sales", "nightly-1"))
        .await
        .unwrap();

    assert_eq!(state.id, "123456789012,sales,nightly-1");
    assert_eq!(state.attributes.get("ingestion_status").as_str(), Some("COMPLETED"));
    assert_eq!(state.attributes.get("ingestion_type").as_str(), Some("FULL_REFRESH"));
    assert!(state.attributes.get("created_time").is_present());
}

#[tokio::test(start_paused = true)]
async fn test_failed_ingestion_reports_its_status() {
    let (_api, system) = start_with(
        InMemoryQuickSight::new().with_ingestion_outcome("FAILED"),
        SystemConfig::new(ACCOUNT_ID),
    );
    spice_data_set(&system).await;

    let err = system
        .ingestion_client
        .start_ingestion(&IngestionDeclaration::full_refresh("sales", "nightly-1"))
        .await
        .unwrap_err();

    match err {
        IngestionError::Failed { status } => assert_eq!(status, "FAILED"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_slow_ingestion_times_out_and_can_be_cancelled() {
    let mut config = SystemConfig::new(ACCOUNT_ID);
    config.reconciler.timeouts.create_secs = Some(30);
    let (api, system) = start_with(InMemoryQuickSight::new().with_settle_polls(10_000), config);
    spice_data_set(&system).await;

    let err = system
        .ingestion_client
        .start_ingestion(&IngestionDeclaration::full_refresh("sales", "nightly-1"))
        .await
        .unwrap_err();
    assert!(matches!(err, IngestionError::StillRunning(_)), "{err:?}");

    let id = "123456789012,sales,nightly-1".to_string();
    system.ingestion_client.cancel_ingestion(id.clone()).await.unwrap();

    assert_eq!(api.calls(ApiOperation::CancelIngestion), 1);
    let read = system.ingestion_client.read(id, Value::Null).await.unwrap();
    assert!(read.is_absent());
}

#[tokio::test(start_paused = true)]
async fn test_cancelling_finished_ingestion_leaves_it_in_place() {
    let (api, system) = start();
    spice_data_set(&system).await;
    api.create_ingestion(CreateIngestionRequest {
        aws_account_id: ACCOUNT_ID.to_string(),
        data_set_id: "sales".to_string(),
        ingestion_id: "manual".to_string(),
        ingestion_type: None,
    })
    .await
    .unwrap();
    for _ in 0..8 {
        api.describe_ingestion(ACCOUNT_ID, "sales", "manual").await.unwrap();
    }

    let id = "123456789012,sales,manual".to_string();
    system.ingestion_client.cancel_ingestion(id.clone()).await.unwrap();

    let Observed::Present(state) = system.ingestion_client.import(id).await.unwrap() else {
        panic!("completed ingestion unexpectedly absent");
    };
    assert_eq!(state.attributes.get("ingestion_status").as_str(), Some("COMPLETED"));
}

// --- System ---

#[tokio::test(start_paused = true)]
async fn test_cancel_interrupts_waits_in_progress() {
    let (_api, system) = start_with(
        InMemoryQuickSight::new().with_settle_polls(10_000),
        SystemConfig::new(ACCOUNT_ID),
    );
    let client = system.namespace_client.clone();
    let pending = tokio::spawn(async move {
        client
            .create_namespace(&NamespaceDeclaration::new("analytics"))
            .await
    });

    tokio::time::sleep(std::time::Duration::from_secs(5)).await;
    system.cancel();

    let err = pending.await.unwrap().unwrap_err();
    assert!(
        matches!(err, NamespaceError::Reconcile(ReconcileError::Cancelled { .. })),
        "{err:?}"
    );
    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_shutdown_waits_for_every_actor() {
    let (api, system) = start();
    spice_data_set(&system).await;

    system.shutdown().await.unwrap();

    // The service keeps what was created; only the actors are gone.
    assert!(api.describe_data_set(ACCOUNT_ID, "sales").await.is_ok());
}
