//! Client wrappers against scripted actors: request routing and error classification,
//! without a remote API.

use quicksight_reconciler::clients::{
    DataSetClient, DataSourceClient, IngestionClient, NamespaceClient, VpcConnectionClient,
};
use quicksight_reconciler::data_set::{DataSet, DataSetError};
use quicksight_reconciler::data_source::{DataSource, DataSourceError};
use quicksight_reconciler::ingestion::{IngestionError, IngestionFamily};
use quicksight_reconciler::model::{
    DataSetDeclaration, DataSourceDeclaration, NamespaceDeclaration, VpcConnectionDeclaration,
};
use quicksight_reconciler::namespace::{Namespace, NamespaceError};
use quicksight_reconciler::vpc_connection::{VpcConnectionError, VpcConnectionFamily};
use reconcile_framework::mock::MockClient;
use reconcile_framework::{
    ErrorKind, FamilyClient, Observed, ReconcileError, ReconcilerConfig, RemoteError,
    ResourceState, Value,
};
use std::time::Duration;

fn vpc_declaration() -> VpcConnectionDeclaration {
    VpcConnectionDeclaration {
        aws_account_id: Some("123456789012".to_string()),
        vpc_connection_id: "warehouse".to_string(),
        name: "Warehouse".to_string(),
        role_arn: "arn:aws:iam::123456789012:role/quicksight-vpc".to_string(),
        security_group_ids: vec!["sg-1".to_string()],
        subnet_ids: vec!["subnet-a".to_string()],
        dns_resolvers: None,
    }
}

#[tokio::test]
async fn test_namespace_failure_status_is_creation_failed() {
    let mut mock = MockClient::<Namespace>::new();
    mock.expect_create().return_err(ReconcileError::UnexpectedState {
        operation: "create quicksight_namespace 123456789012,analytics".to_string(),
        status: "NON_RETRYABLE_FAILURE".to_string(),
    });
    let client = NamespaceClient::new(mock.client());

    let err = client
        .create_namespace(&NamespaceDeclaration::new("analytics"))
        .await
        .unwrap_err();

    match err {
        NamespaceError::CreationFailed { status } => assert_eq!(status, "NON_RETRYABLE_FAILURE"),
        other => panic!("unexpected error: {other:?}"),
    }
    mock.verify();
}

#[tokio::test]
async fn test_exhausted_role_retries_are_role_not_propagated() {
    let mut mock = MockClient::<VpcConnectionFamily>::new();
    mock.expect_create().return_err(ReconcileError::RetryExhausted {
        operation: "create quicksight_vpc_connection 123456789012,warehouse".to_string(),
        attempts: 12,
        source: RemoteError::new(ErrorKind::AccessDenied, "could not sts:AssumeRole"),
    });
    mock.expect_create().return_err(ReconcileError::RetryExhausted {
        operation: "create quicksight_vpc_connection 123456789012,warehouse".to_string(),
        attempts: 12,
        source: RemoteError::new(ErrorKind::Throttling, "Rate exceeded"),
    });
    let client = VpcConnectionClient::new(mock.client());

    let first = client.create_vpc_connection(&vpc_declaration()).await.unwrap_err();
    let second = client.create_vpc_connection(&vpc_declaration()).await.unwrap_err();

    assert!(matches!(first, VpcConnectionError::RoleNotPropagated(_)), "{first:?}");
    assert!(
        matches!(second, VpcConnectionError::Reconcile(ReconcileError::RetryExhausted { .. })),
        "{second:?}"
    );
    mock.verify();
}

#[tokio::test]
async fn test_ingestion_timeout_is_still_running() {
    let mut mock = MockClient::<IngestionFamily>::new();
    mock.expect_delete("123456789012,sales,nightly-1").return_ok(());
    mock.expect_read("123456789012,sales,nightly-1")
        .return_err(ReconcileError::WaitTimeout {
            operation: "read".to_string(),
            timeout: Duration::from_secs(600),
            last_status: "RUNNING".to_string(),
        });
    let client = IngestionClient::new(mock.client());

    client
        .cancel_ingestion("123456789012,sales,nightly-1".to_string())
        .await
        .unwrap();
    let err = client
        .read("123456789012,sales,nightly-1".to_string(), Value::Null)
        .await
        .unwrap_err();

    assert!(matches!(err, IngestionError::StillRunning(_)), "{err:?}");
    mock.verify();
}

#[tokio::test]
async fn test_data_set_client_passes_states_through() {
    let state = ResourceState {
        id: "123456789012,sales".to_string(),
        attributes: Value::object([("data_set_id", Value::from("sales"))]),
    };
    let mut mock = MockClient::<DataSet>::new();
    mock.expect_create().return_ok(state.clone());
    mock.expect_update("123456789012,sales").return_ok(Observed::Absent);
    mock.expect_import("123456789012,sales")
        .return_ok(Observed::Present(state.clone()));
    let client = DataSetClient::new(mock.client());
    let declared = DataSetDeclaration::new("sales", "Sales", "SPICE").build();

    let created = client.create_data_set(declared.clone()).await.unwrap();
    let updated = client
        .update_data_set(created.id.clone(), declared, created.attributes.clone())
        .await
        .unwrap();
    let imported = client.import(created.id.clone()).await.unwrap();

    assert_eq!(created, state);
    assert!(updated.is_absent());
    assert_eq!(imported.into_state(), Some(state));
    mock.verify();
}

#[tokio::test]
async fn test_partial_data_set_create_keeps_the_id() {
    let mut mock = MockClient::<DataSet>::new();
    mock.expect_create().return_err(ReconcileError::partially_created(
        "123456789012,sales",
        ReconcileError::Remote {
            operation: "configure quicksight_data_set 123456789012,sales".to_string(),
            source: RemoteError::new(ErrorKind::AccessDenied, "not allowed"),
        },
    ));
    let client = DataSetClient::new(mock.client());

    let err = client
        .create_data_set(DataSetDeclaration::new("sales", "Sales", "SPICE").build())
        .await
        .unwrap_err();

    match err {
        DataSetError::PartiallyCreated { id, message } => {
            assert_eq!(id, "123456789012,sales");
            assert!(message.contains("not allowed"), "{message}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    mock.verify();
}

#[tokio::test]
async fn test_only_type_changes_require_data_source_replacement() {
    let remote = |message: &str| ReconcileError::Remote {
        operation: "update quicksight_data_source 123456789012,warehouse".to_string(),
        source: RemoteError::new(ErrorKind::InvalidParameterValue, message),
    };
    let mut mock = MockClient::<DataSource>::new();
    mock.expect_update("123456789012,warehouse").return_err(remote(
        "cannot change the type of data source warehouse from POSTGRESQL to MYSQL",
    ));
    mock.expect_update("123456789012,warehouse").return_err(remote("Port must be positive"));
    let client = DataSourceClient::new(mock.client());
    let declaration = DataSourceDeclaration::new("warehouse", "Warehouse")
        .mysql("analytics", "db.internal", 3306);
    let id = "123456789012,warehouse".to_string();

    let first = client
        .update_data_source(id.clone(), &declaration, Value::Null)
        .await
        .unwrap_err();
    let second = client
        .update_data_source(id, &declaration, Value::Null)
        .await
        .unwrap_err();

    assert!(matches!(first, DataSourceError::ReplacementRequired(_)), "{first:?}");
    assert!(
        matches!(second, DataSourceError::Reconcile(ReconcileError::Remote { .. })),
        "{second:?}"
    );
    mock.verify();
}

#[tokio::test]
async fn test_request_to_stopped_actor_is_communication_error() {
    let (actor, client) =
        quicksight_reconciler::namespace::new(1, ReconcilerConfig::new("123456789012"));
    drop(actor);

    let err = client
        .create_namespace(&NamespaceDeclaration::new("analytics"))
        .await
        .unwrap_err();

    assert!(matches!(err, NamespaceError::ActorCommunicationError(_)), "{err:?}");
}
