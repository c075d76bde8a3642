use async_trait::async_trait;
use once_cell::sync::Lazy;
use pretty_assertions::assert_eq;
use reconcile_framework::mock::MockClient;
use reconcile_framework::{
    diff, AttributeNode as N, ChangeSet, ErrorKind, Field, IdentityCodec, Lifecycle, ObjectSchema,
    Observed, ReconcileActor, ReconcileError, Reconciler, ReconcilerConfig, RemoteError,
    ResourceFamily, ResourceState, Value, WaitSpec,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

// --- Test family: a widget with an async create ---

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WidgetRemote {
    widget_id: String,
    name: String,
    color: String,
    tags: Vec<String>,
    arn: String,
    status: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
struct WidgetInput {
    aws_account_id: String,
    widget_id: String,
    name: String,
    color: Option<String>,
    tags: Option<Vec<String>>,
}

#[derive(Default)]
struct FakeApi {
    objects: Mutex<HashMap<String, (WidgetRemote, u32)>>,
    inputs: Mutex<Vec<WidgetInput>>,
    faults: Mutex<VecDeque<RemoteError>>,
    creates: AtomicU32,
    updates: AtomicU32,
    deletes: AtomicU32,
}

impl FakeApi {
    fn take_fault(&self) -> Result<(), RemoteError> {
        match self.faults.lock().unwrap().pop_front() {
            Some(fault) => Err(fault),
            None => Ok(()),
        }
    }

    fn last_input(&self) -> WidgetInput {
        self.inputs.lock().unwrap().last().cloned().unwrap()
    }
}

struct Widget;

static WIDGET_SCHEMA: Lazy<ObjectSchema> = Lazy::new(|| {
    ObjectSchema::new(vec![
        Field::optional_computed("aws_account_id", N::string()),
        Field::required("widget_id", N::string()),
        Field::required("name", N::string()),
        Field::optional_computed("color", N::string()),
        Field::optional("tags", N::list(N::string())).explicit_empty(),
        Field::computed("arn", N::string()),
        Field::computed("status", N::string()),
    ])
});

#[async_trait]
impl ResourceFamily for Widget {
    const TYPE_NAME: &'static str = "test_widget";
    const IDENTITY: IdentityCodec = IdentityCodec::new(',', &["aws_account_id", "widget_id"]);

    type Context = Arc<FakeApi>;
    type Remote = WidgetRemote;
    type CreateInput = WidgetInput;
    type UpdateInput = WidgetInput;

    fn schema() -> &'static ObjectSchema {
        &WIDGET_SCHEMA
    }

    fn lifecycle() -> Lifecycle {
        Lifecycle {
            create: Some(WaitSpec::new(&["CREATING"], &["ACTIVE"])),
            ..Lifecycle::default()
        }
    }

    fn status(remote: &WidgetRemote) -> String {
        remote.status.clone()
    }

    async fn describe(api: &Arc<FakeApi>, parts: &[String]) -> Result<WidgetRemote, RemoteError> {
        api.take_fault()?;
        let mut objects = api.objects.lock().unwrap();
        let (remote, polls_left) = objects
            .get_mut(&parts.join(","))
            .ok_or_else(|| RemoteError::not_found("widget not found"))?;
        if *polls_left == 0 {
            remote.status = "ACTIVE".to_string();
        } else {
            *polls_left -= 1;
        }
        Ok(remote.clone())
    }

    async fn create(
        api: &Arc<FakeApi>,
        parts: &[String],
        input: WidgetInput,
        _declared: &Value,
    ) -> Result<(), RemoteError> {
        api.creates.fetch_add(1, Ordering::SeqCst);
        api.take_fault()?;
        let remote = WidgetRemote {
            widget_id: input.widget_id.clone(),
            name: input.name.clone(),
            color: input.color.clone().unwrap_or_else(|| "blue".to_string()),
            tags: input.tags.clone().unwrap_or_default(),
            arn: format!("arn:test:{}:widget/{}", input.aws_account_id, input.widget_id),
            status: "CREATING".to_string(),
        };
        api.inputs.lock().unwrap().push(input);
        api.objects
            .lock()
            .unwrap()
            .insert(parts.join(","), (remote, 2));
        Ok(())
    }

    async fn update(
        api: &Arc<FakeApi>,
        parts: &[String],
        input: WidgetInput,
        _declared: &Value,
        _prior: &Value,
        _changes: &ChangeSet,
    ) -> Result<(), RemoteError> {
        api.updates.fetch_add(1, Ordering::SeqCst);
        api.take_fault()?;
        let mut objects = api.objects.lock().unwrap();
        let (remote, _) = objects
            .get_mut(&parts.join(","))
            .ok_or_else(|| RemoteError::not_found("widget not found"))?;
        remote.name = input.name.clone();
        if let Some(color) = &input.color {
            remote.color = color.clone();
        }
        remote.tags = input.tags.clone().unwrap_or_default();
        api.inputs.lock().unwrap().push(input);
        Ok(())
    }

    async fn delete(api: &Arc<FakeApi>, parts: &[String]) -> Result<(), RemoteError> {
        api.deletes.fetch_add(1, Ordering::SeqCst);
        api.take_fault()?;
        api.objects
            .lock()
            .unwrap()
            .remove(&parts.join(","))
            .map(|_| ())
            .ok_or_else(|| RemoteError::not_found("widget not found"))
    }
}

const ACCOUNT: &str = "123456789012";

fn setup() -> (Arc<FakeApi>, Reconciler<Widget>) {
    let api = Arc::new(FakeApi::default());
    let reconciler = Reconciler::<Widget>::new(api.clone(), ReconcilerConfig::new(ACCOUNT));
    (api, reconciler)
}

fn declared(name: &str) -> Value {
    Value::object([
        ("widget_id", Value::from("w1")),
        ("name", Value::from(name)),
        ("color", Value::Unknown),
        ("tags", Value::Null),
    ])
}

// --- Tests ---

#[tokio::test(start_paused = true)]
async fn test_unknown_field_round_trip_produces_empty_diff() {
    let (api, reconciler) = setup();
    let declared = declared("first");

    let state = reconciler.create(&declared).await.unwrap();
    assert_eq!(state.id, "123456789012,w1");

    // Unknown is never sent; the explicit-empty list is.
    let input = api.last_input();
    assert_eq!(input.color, None);
    assert_eq!(input.tags, Some(vec![]));
    assert_eq!(input.aws_account_id, ACCOUNT);

    // The remote default fills the unknown, the empty list reads back as null.
    assert_eq!(state.attributes.get("color"), &Value::from("blue"));
    assert_eq!(state.attributes.get("tags"), &Value::Null);
    assert_eq!(state.attributes.get("status"), &Value::from("ACTIVE"));
    assert_eq!(state.attributes.get("aws_account_id"), &Value::from(ACCOUNT));

    let observed = reconciler
        .read(&state.id, &state.attributes)
        .await
        .unwrap()
        .into_state()
        .unwrap();
    assert!(diff(Widget::schema(), &declared, &observed.attributes).is_empty());

    let after = reconciler
        .update(&state.id, &declared, &observed.attributes)
        .await
        .unwrap();
    assert_eq!(after, Observed::Present(observed));
    assert_eq!(api.updates.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_update_sends_changes_and_clears_list() {
    let (api, reconciler) = setup();
    let mut declared = declared("first");
    declared.set("tags", Value::string_list(["a", "b"]));
    let state = reconciler.create(&declared).await.unwrap();
    assert_eq!(state.attributes.get("tags"), &Value::string_list(["a", "b"]));

    let mut renamed = declared.clone();
    renamed.set("name", Value::from("second"));
    renamed.set("tags", Value::Null);
    let updated = reconciler
        .update(&state.id, &renamed, &state.attributes)
        .await
        .unwrap()
        .into_state()
        .unwrap();

    assert_eq!(api.updates.load(Ordering::SeqCst), 1);
    assert_eq!(api.last_input().tags, Some(vec![]));
    assert_eq!(updated.attributes.get("name"), &Value::from("second"));
    assert_eq!(updated.attributes.get("tags"), &Value::Null);
}

#[tokio::test(start_paused = true)]
async fn test_delete_is_idempotent_and_read_reports_absence() {
    let (api, reconciler) = setup();
    let state = reconciler.create(&declared("first")).await.unwrap();

    reconciler.delete(&state.id).await.unwrap();
    reconciler.delete(&state.id).await.unwrap();
    assert_eq!(api.deletes.load(Ordering::SeqCst), 2);

    let observed = reconciler.read(&state.id, &state.attributes).await.unwrap();
    assert!(observed.is_absent());
}

#[tokio::test(start_paused = true)]
async fn test_update_of_missing_object_reports_absence() {
    let (_, reconciler) = setup();
    let prior = Value::object([("name", Value::from("first"))]);
    let observed = reconciler
        .update("123456789012,gone", &declared("second"), &prior)
        .await
        .unwrap();
    assert_eq!(observed, Observed::Absent);
}

#[tokio::test(start_paused = true)]
async fn test_import_repopulates_identity_fields() {
    let (_, reconciler) = setup();
    reconciler.create(&declared("first")).await.unwrap();

    let imported = reconciler
        .import("123456789012,w1")
        .await
        .unwrap()
        .into_state()
        .unwrap();
    assert_eq!(imported.attributes.get("aws_account_id"), &Value::from(ACCOUNT));
    assert_eq!(imported.attributes.get("widget_id"), &Value::from("w1"));
    assert_eq!(imported.attributes.get("name"), &Value::from("first"));

    let err = reconciler.import("w1").await.unwrap_err();
    assert!(matches!(err, ReconcileError::InvalidIdentity(_)));
    assert!(err.to_string().contains("AWS_ACCOUNT_ID,WIDGET_ID"));
}

#[tokio::test(start_paused = true)]
async fn test_delete_forgets_the_identity_lock() {
    let (_, reconciler) = setup();
    let state = reconciler.create(&declared("first")).await.unwrap();
    reconciler.read(&state.id, &state.attributes).await.unwrap();
    assert_eq!(reconciler.tracked_locks().await, 1);

    reconciler.delete(&state.id).await.unwrap();
    assert_eq!(reconciler.tracked_locks().await, 0);

    // Two deletes racing on one key: the second keeps the entry alive until it is done.
    let (first, second) = tokio::join!(reconciler.delete(&state.id), reconciler.delete(&state.id));
    first.unwrap();
    second.unwrap();
    assert_eq!(reconciler.tracked_locks().await, 0);
}

#[tokio::test(start_paused = true)]
async fn test_create_retries_transient_failures() {
    let (api, reconciler) = setup();
    api.faults
        .lock()
        .unwrap()
        .push_back(RemoteError::new(ErrorKind::Throttling, "Rate exceeded"));

    reconciler.create(&declared("first")).await.unwrap();
    assert_eq!(api.creates.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_permanent_create_failure_tracks_nothing() {
    let (api, reconciler) = setup();
    api.faults
        .lock()
        .unwrap()
        .push_back(RemoteError::new(ErrorKind::AccessDenied, "Denied"));

    let err = reconciler.create(&declared("first")).await.unwrap_err();
    match err {
        ReconcileError::Remote { operation, source } => {
            assert_eq!(operation, "create test_widget 123456789012,w1");
            assert_eq!(source.kind, ErrorKind::AccessDenied);
        }
        other => panic!("expected a remote error, got {other:?}"),
    }
    assert!(api.objects.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_missing_identity_field_is_rejected() {
    let (_, reconciler) = setup();
    let declared = Value::object([("name", Value::from("first"))]);
    let err = reconciler.create(&declared).await.unwrap_err();
    assert!(matches!(err, ReconcileError::InvalidIdentity(_)));
}

#[tokio::test(start_paused = true)]
async fn test_actor_serves_requests_until_clients_drop() {
    let api = Arc::new(FakeApi::default());
    let (actor, client) = ReconcileActor::<Widget>::new(10, ReconcilerConfig::new(ACCOUNT));
    let handle = tokio::spawn(actor.run(api.clone()));

    let state = client.create(declared("first")).await.unwrap();
    let observed = client
        .read(state.id.clone(), state.attributes.clone())
        .await
        .unwrap();
    assert!(!observed.is_absent());
    client.delete(state.id.clone()).await.unwrap();
    assert!(client
        .read(state.id.clone(), Value::Null)
        .await
        .unwrap()
        .is_absent());

    drop(client);
    handle.await.unwrap();
}

#[tokio::test]
async fn test_mock_client_answers_in_order() {
    let mut mock = MockClient::<Widget>::new();
    let state = ResourceState {
        id: "123456789012,w1".to_string(),
        attributes: Value::object([("name", Value::from("first"))]),
    };
    mock.expect_create().return_ok(state.clone());
    mock.expect_delete("123456789012,w1").return_ok(());
    mock.expect_read("123456789012,w1").return_ok(Observed::Absent);

    let client = mock.client();
    assert_eq!(client.create(declared("first")).await.unwrap(), state);
    client.delete("123456789012,w1".to_string()).await.unwrap();
    assert_eq!(
        client
            .read("123456789012,w1".to_string(), Value::Null)
            .await
            .unwrap(),
        Observed::Absent
    );
    mock.verify();
}

#[tokio::test]
async fn test_mock_client_error_injection() {
    let mut mock = MockClient::<Widget>::new();
    mock.expect_delete("123456789012,w1")
        .return_err(ReconcileError::ActorClosed);

    let result = mock.client().delete("123456789012,w1".to_string()).await;
    assert!(matches!(result, Err(ReconcileError::ActorClosed)));
}
