//! # In-Memory QuickSight
//!
//! A [`QuickSightApi`] that keeps every object in process memory. It behaves like the real
//! service where the reconciler can tell the difference:
//!
//! - Asynchronous operations move objects through intermediate statuses. Each status
//!   change lands after `settle_polls` further describe calls.
//! - Missing objects fail with `ResourceNotFoundException`.
//! - Faults can be queued per operation and are returned before the call has any effect.
//! - Every call is counted, so tests can assert that a no-op update made no remote call.

use super::types::*;
use super::QuickSightApi;
use async_trait::async_trait;
use chrono::Utc;
use reconcile_framework::{ErrorKind, RemoteError};
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use strum::Display;
use tracing::debug;

const REGION: &str = "us-east-1";

/// Names of the API calls, for fault injection and call counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum ApiOperation {
    CreateNamespace,
    DescribeNamespace,
    DeleteNamespace,
    CreateVpcConnection,
    UpdateVpcConnection,
    DescribeVpcConnection,
    DeleteVpcConnection,
    CreateDataSource,
    UpdateDataSource,
    DescribeDataSource,
    DeleteDataSource,
    DescribeDataSourcePermissions,
    UpdateDataSourcePermissions,
    CreateDataSet,
    UpdateDataSet,
    DescribeDataSet,
    DeleteDataSet,
    DescribeDataSetPermissions,
    UpdateDataSetPermissions,
    DescribeDataSetRefreshProperties,
    PutDataSetRefreshProperties,
    DeleteDataSetRefreshProperties,
    ListTagsForResource,
    TagResource,
    UntagResource,
    CreateIngestion,
    DescribeIngestion,
    CancelIngestion,
}

// =============================================================================
// STATUS PROGRESSION
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Status(&'static str),
    Remove,
}

#[derive(Debug, Default)]
struct Progression {
    steps: VecDeque<Step>,
    countdown: u32,
}

impl Progression {
    fn start(steps: impl IntoIterator<Item = Step>, settle_polls: u32) -> Self {
        Self {
            steps: steps.into_iter().collect(),
            countdown: settle_polls,
        }
    }

    fn tick(&mut self, settle_polls: u32) -> Option<Step> {
        if self.steps.is_empty() {
            return None;
        }
        if self.countdown > 0 {
            self.countdown -= 1;
            return None;
        }
        self.countdown = settle_polls;
        self.steps.pop_front()
    }
}

#[derive(Debug)]
struct Tracked<T> {
    value: T,
    progression: Progression,
}

/// Applies the next status change, if one is due, and returns the current object.
fn observe<T: Clone>(
    objects: &mut HashMap<String, Tracked<T>>,
    key: &str,
    settle_polls: u32,
    apply: fn(&mut T, &'static str),
) -> Option<T> {
    let step = objects.get_mut(key)?.progression.tick(settle_polls);
    match step {
        Some(Step::Remove) => {
            objects.remove(key);
            None
        }
        Some(Step::Status(status)) => {
            let tracked = objects.get_mut(key)?;
            apply(&mut tracked.value, status);
            Some(tracked.value.clone())
        }
        None => objects.get(key).map(|tracked| tracked.value.clone()),
    }
}

#[derive(Debug, Clone)]
struct StoredDataSource {
    description: DataSourceDescription,
    permissions: Vec<ResourcePermission>,
}

#[derive(Debug)]
struct StoredDataSet {
    description: DataSetDescription,
    permissions: Vec<ResourcePermission>,
    refresh_properties: Option<DataSetRefreshProperties>,
}

#[derive(Debug, Default)]
struct Store {
    namespaces: HashMap<String, Tracked<NamespaceInfo>>,
    vpc_connections: HashMap<String, Tracked<VpcConnection>>,
    data_sources: HashMap<String, Tracked<StoredDataSource>>,
    data_sets: HashMap<String, StoredDataSet>,
    ingestions: HashMap<String, Tracked<Ingestion>>,
    tags: HashMap<String, BTreeMap<String, String>>,
    faults: HashMap<ApiOperation, VecDeque<RemoteError>>,
    calls: HashMap<ApiOperation, u32>,
}

fn key(parts: &[&str]) -> String {
    parts.join("/")
}

fn not_found(what: &str, id: &str) -> RemoteError {
    RemoteError::not_found(format!("{what} {id} not found"))
}

fn invalid(message: impl Into<String>) -> RemoteError {
    RemoteError::new(ErrorKind::InvalidParameterValue, message)
}

fn now() -> i64 {
    Utc::now().timestamp()
}

// =============================================================================
// IN-MEMORY API
// =============================================================================

/// A QuickSight account held in memory.
pub struct InMemoryQuickSight {
    store: Mutex<Store>,
    settle_polls: u32,
    ingestion_outcome: &'static str,
}

impl Default for InMemoryQuickSight {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryQuickSight {
    pub fn new() -> Self {
        Self {
            store: Mutex::new(Store::default()),
            settle_polls: 1,
            ingestion_outcome: "COMPLETED",
        }
    }

    /// Number of describe calls that still report the previous status after each change.
    pub fn with_settle_polls(mut self, polls: u32) -> Self {
        self.settle_polls = polls;
        self
    }

    /// Final status of every ingestion, `COMPLETED` unless set.
    pub fn with_ingestion_outcome(mut self, status: &'static str) -> Self {
        self.ingestion_outcome = status;
        self
    }

    /// Queues `error` as the result of the next call to `operation`.
    pub fn inject_fault(&self, operation: ApiOperation, error: RemoteError) {
        self.lock()
            .faults
            .entry(operation)
            .or_default()
            .push_back(error);
    }

    /// How many times `operation` was called, faulted calls included.
    pub fn calls(&self, operation: ApiOperation) -> u32 {
        self.lock().calls.get(&operation).copied().unwrap_or(0)
    }

    fn lock(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Counts the call and returns the store, or the next queued fault.
    fn enter(&self, operation: ApiOperation) -> Result<MutexGuard<'_, Store>, RemoteError> {
        let mut store = self.lock();
        *store.calls.entry(operation).or_default() += 1;
        if let Some(fault) = store.faults.get_mut(&operation).and_then(VecDeque::pop_front) {
            debug!(%operation, error = %fault, "Injected fault");
            return Err(fault);
        }
        debug!(%operation, "API call");
        Ok(store)
    }

    fn arn(account_id: &str, kind: &str, id: &str) -> String {
        format!("arn:aws:quicksight:{REGION}:{account_id}:{kind}/{id}")
    }
}

/// A data source behind a VPC connection only connects once that connection is available.
fn connection_outcome(
    store: &Store,
    properties: Option<&VpcConnectionProperties>,
    success: &'static str,
    failure: &'static str,
) -> &'static str {
    let Some(properties) = properties else {
        return success;
    };
    let available = store.vpc_connections.values().any(|connection| {
        connection.value.arn == properties.vpc_connection_arn
            && connection.value.availability_status == "AVAILABLE"
    });
    if available {
        success
    } else {
        failure
    }
}

fn ssl_with_defaults(ssl: Option<SslProperties>) -> SslProperties {
    SslProperties {
        disable_ssl: Some(ssl.and_then(|ssl| ssl.disable_ssl).unwrap_or(false)),
    }
}

fn validate_definition(definition: &DataSetDefinition) -> Result<(), RemoteError> {
    if definition.physical_table_map.is_empty() {
        return Err(invalid("PhysicalTableMap must contain at least one table"));
    }
    if !matches!(definition.import_mode.as_str(), "SPICE" | "DIRECT_QUERY") {
        return Err(invalid(format!(
            "ImportMode {} is not one of SPICE, DIRECT_QUERY",
            definition.import_mode
        )));
    }

    let known: HashSet<&str> = definition
        .physical_table_map
        .values()
        .flat_map(PhysicalTable::columns)
        .map(|column| column.name.as_str())
        .collect();
    if let Some(configuration) = &definition.row_level_permission_tag_configuration {
        if configuration.tag_rules.is_empty() {
            return Err(invalid("TagRules must contain at least one rule"));
        }
        if let Some(rule) = configuration
            .tag_rules
            .iter()
            .find(|rule| !known.contains(rule.column_name.as_str()))
        {
            return Err(invalid(format!(
                "tag rule column {} is not an output column",
                rule.column_name
            )));
        }
    }
    let foldered = definition
        .field_folders
        .iter()
        .flat_map(|folders| folders.values())
        .flat_map(|folder| folder.columns.iter().flatten());
    for column in foldered {
        if !known.contains(column.as_str()) {
            return Err(invalid(format!("field folder column {column} is not an output column")));
        }
    }
    Ok(())
}

/// The service generates one logical table per physical table when none are given.
fn describe_definition(
    definition: DataSetDefinition,
    created_time: i64,
) -> DataSetDescription {
    let logical_table_map = definition.logical_table_map.unwrap_or_else(|| {
        definition
            .physical_table_map
            .keys()
            .map(|id| {
                let table = LogicalTable {
                    alias: id.clone(),
                    source: LogicalTableSource::PhysicalTableId(id.clone()),
                    data_transforms: None,
                };
                (id.clone(), table)
            })
            .collect()
    });
    let output_columns = definition
        .physical_table_map
        .values()
        .flat_map(PhysicalTable::columns)
        .map(|column| OutputColumn {
            name: column.name.clone(),
            column_type: column.column_type.clone(),
            description: None,
        })
        .collect();

    DataSetDescription {
        arn: InMemoryQuickSight::arn(&definition.aws_account_id, "dataset", &definition.data_set_id),
        data_set_id: definition.data_set_id,
        name: definition.name,
        import_mode: definition.import_mode,
        physical_table_map: definition.physical_table_map,
        logical_table_map,
        column_groups: definition.column_groups,
        column_level_permission_rules: definition.column_level_permission_rules,
        data_set_usage_configuration: definition.data_set_usage_configuration.unwrap_or_default(),
        row_level_permission_data_set: definition.row_level_permission_data_set,
        row_level_permission_tag_configuration: definition
            .row_level_permission_tag_configuration
            .map(|configuration| RowLevelPermissionTagConfiguration {
                status: configuration.status.or_else(|| Some("ENABLED".to_string())),
                ..configuration
            }),
        field_folders: definition.field_folders,
        output_columns,
        created_time,
        last_updated_time: now(),
    }
}

fn merge_permissions(current: &mut Vec<ResourcePermission>, grant: Vec<ResourcePermission>) {
    for granted in grant {
        match current.iter_mut().find(|p| p.principal == granted.principal) {
            Some(existing) => {
                for action in granted.actions {
                    if !existing.actions.contains(&action) {
                        existing.actions.push(action);
                    }
                }
            }
            None => current.push(granted),
        }
    }
}

fn remove_permissions(current: &mut Vec<ResourcePermission>, revoke: Vec<ResourcePermission>) {
    for revoked in revoke {
        if let Some(existing) = current.iter_mut().find(|p| p.principal == revoked.principal) {
            existing.actions.retain(|a| !revoked.actions.contains(a));
        }
    }
    current.retain(|p| !p.actions.is_empty());
}

#[async_trait]
impl QuickSightApi for InMemoryQuickSight {
    async fn create_namespace(&self, request: CreateNamespaceRequest) -> Result<(), RemoteError> {
        let mut store = self.enter(ApiOperation::CreateNamespace)?;
        let id = key(&[&request.aws_account_id, &request.namespace]);
        if store.namespaces.contains_key(&id) {
            return Err(RemoteError::new(
                ErrorKind::ResourceExists,
                format!("namespace {} already exists", request.namespace),
            ));
        }
        let identity_store = request.identity_store.unwrap_or_else(|| "QUICKSIGHT".into());
        if identity_store != "QUICKSIGHT" {
            return Err(invalid(format!("identity store {identity_store} is not supported")));
        }
        let info = NamespaceInfo {
            arn: Self::arn(&request.aws_account_id, "namespace", &request.namespace),
            namespace: request.namespace,
            capacity_region: REGION.to_string(),
            creation_status: "CREATING".to_string(),
            identity_store,
        };
        store.namespaces.insert(
            id,
            Tracked {
                value: info,
                progression: Progression::start([Step::Status("CREATED")], self.settle_polls),
            },
        );
        Ok(())
    }

    async fn describe_namespace(
        &self,
        account_id: &str,
        namespace: &str,
    ) -> Result<NamespaceInfo, RemoteError> {
        let mut store = self.enter(ApiOperation::DescribeNamespace)?;
        observe(
            &mut store.namespaces,
            &key(&[account_id, namespace]),
            self.settle_polls,
            |info, status| info.creation_status = status.to_string(),
        )
        .ok_or_else(|| not_found("namespace", namespace))
    }

    async fn delete_namespace(&self, account_id: &str, namespace: &str) -> Result<(), RemoteError> {
        let mut store = self.enter(ApiOperation::DeleteNamespace)?;
        let tracked = store
            .namespaces
            .get_mut(&key(&[account_id, namespace]))
            .ok_or_else(|| not_found("namespace", namespace))?;
        tracked.value.creation_status = "DELETING".to_string();
        tracked.progression = Progression::start([Step::Remove], self.settle_polls);
        Ok(())
    }

    async fn create_vpc_connection(&self, request: VpcConnectionRequest) -> Result<(), RemoteError> {
        let mut store = self.enter(ApiOperation::CreateVpcConnection)?;
        let id = key(&[&request.aws_account_id, &request.vpc_connection_id]);
        if store
            .vpc_connections
            .get(&id)
            .is_some_and(|c| c.value.status != "DELETED")
        {
            return Err(RemoteError::new(
                ErrorKind::ResourceExists,
                format!("VPC connection {} already exists", request.vpc_connection_id),
            ));
        }
        if request.subnet_ids.is_empty() || request.security_group_ids.is_empty() {
            return Err(invalid("SubnetIds and SecurityGroupIds must not be empty"));
        }
        let connection = VpcConnection {
            arn: Self::arn(&request.aws_account_id, "vpcConnection", &request.vpc_connection_id),
            vpc_connection_id: request.vpc_connection_id,
            name: request.name,
            role_arn: request.role_arn,
            security_group_ids: request.security_group_ids,
            subnet_ids: request.subnet_ids,
            dns_resolvers: request.dns_resolvers.unwrap_or_default(),
            status: "CREATION_IN_PROGRESS".to_string(),
            availability_status: "UNAVAILABLE".to_string(),
        };
        store.vpc_connections.insert(
            id,
            Tracked {
                value: connection,
                progression: Progression::start(
                    [Step::Status("CREATION_SUCCESSFUL")],
                    self.settle_polls,
                ),
            },
        );
        Ok(())
    }

    async fn update_vpc_connection(&self, request: VpcConnectionRequest) -> Result<(), RemoteError> {
        let mut store = self.enter(ApiOperation::UpdateVpcConnection)?;
        let tracked = store
            .vpc_connections
            .get_mut(&key(&[&request.aws_account_id, &request.vpc_connection_id]))
            .filter(|c| c.value.status != "DELETED")
            .ok_or_else(|| not_found("VPC connection", &request.vpc_connection_id))?;
        let connection = &mut tracked.value;
        connection.name = request.name;
        connection.role_arn = request.role_arn;
        connection.security_group_ids = request.security_group_ids;
        connection.subnet_ids = request.subnet_ids;
        if let Some(resolvers) = request.dns_resolvers {
            connection.dns_resolvers = resolvers;
        }
        connection.status = "UPDATE_IN_PROGRESS".to_string();
        tracked.progression =
            Progression::start([Step::Status("UPDATE_SUCCESSFUL")], self.settle_polls);
        Ok(())
    }

    async fn describe_vpc_connection(
        &self,
        account_id: &str,
        vpc_connection_id: &str,
    ) -> Result<VpcConnection, RemoteError> {
        let mut store = self.enter(ApiOperation::DescribeVpcConnection)?;
        observe(
            &mut store.vpc_connections,
            &key(&[account_id, vpc_connection_id]),
            self.settle_polls,
            |connection, status| {
                connection.status = status.to_string();
                connection.availability_status = match status {
                    "DELETED" => "UNAVAILABLE".to_string(),
                    _ => "AVAILABLE".to_string(),
                };
            },
        )
        .ok_or_else(|| not_found("VPC connection", vpc_connection_id))
    }

    async fn delete_vpc_connection(
        &self,
        account_id: &str,
        vpc_connection_id: &str,
    ) -> Result<(), RemoteError> {
        let mut store = self.enter(ApiOperation::DeleteVpcConnection)?;
        let tracked = store
            .vpc_connections
            .get_mut(&key(&[account_id, vpc_connection_id]))
            .filter(|c| c.value.status != "DELETED")
            .ok_or_else(|| not_found("VPC connection", vpc_connection_id))?;
        tracked.value.status = "DELETION_IN_PROGRESS".to_string();
        tracked.progression = Progression::start([Step::Status("DELETED")], self.settle_polls);
        Ok(())
    }

    async fn create_data_source(&self, request: CreateDataSourceRequest) -> Result<(), RemoteError> {
        let mut store = self.enter(ApiOperation::CreateDataSource)?;
        let definition = request.definition;
        let id = key(&[&definition.aws_account_id, &definition.data_source_id]);
        if store.data_sources.contains_key(&id) {
            return Err(RemoteError::new(
                ErrorKind::ResourceExists,
                format!("data source {} already exists", definition.data_source_id),
            ));
        }
        if request.data_source_type != definition.data_source_parameters.data_source_type() {
            return Err(invalid(format!(
                "Type {} does not match DataSourceParameters",
                request.data_source_type
            )));
        }
        let outcome = connection_outcome(
            &store,
            definition.vpc_connection_properties.as_ref(),
            "CREATION_SUCCESSFUL",
            "CREATION_FAILED",
        );
        let description = DataSourceDescription {
            arn: Self::arn(&definition.aws_account_id, "datasource", &definition.data_source_id),
            data_source_id: definition.data_source_id,
            name: definition.name,
            data_source_type: request.data_source_type,
            data_source_parameters: definition.data_source_parameters,
            ssl_properties: ssl_with_defaults(definition.ssl_properties),
            vpc_connection_properties: definition.vpc_connection_properties,
            status: "CREATION_IN_PROGRESS".to_string(),
            error_info: None,
        };
        if !request.tags.is_empty() {
            store.tags.insert(description.arn.clone(), request.tags);
        }
        store.data_sources.insert(
            id,
            Tracked {
                value: StoredDataSource {
                    description,
                    permissions: request.permissions,
                },
                progression: Progression::start([Step::Status(outcome)], self.settle_polls),
            },
        );
        Ok(())
    }

    async fn update_data_source(&self, definition: DataSourceDefinition) -> Result<(), RemoteError> {
        let mut store = self.enter(ApiOperation::UpdateDataSource)?;
        let outcome = connection_outcome(
            &store,
            definition.vpc_connection_properties.as_ref(),
            "UPDATE_SUCCESSFUL",
            "UPDATE_FAILED",
        );
        let tracked = store
            .data_sources
            .get_mut(&key(&[&definition.aws_account_id, &definition.data_source_id]))
            .ok_or_else(|| not_found("data source", &definition.data_source_id))?;
        let description = &mut tracked.value.description;
        let data_source_type = definition.data_source_parameters.data_source_type();
        if description.data_source_type != data_source_type {
            return Err(invalid(format!(
                "cannot change the type of data source {} from {} to {data_source_type}",
                definition.data_source_id, description.data_source_type
            )));
        }
        description.name = definition.name;
        description.data_source_parameters = definition.data_source_parameters;
        description.ssl_properties = ssl_with_defaults(definition.ssl_properties);
        description.vpc_connection_properties = definition.vpc_connection_properties;
        description.status = "UPDATE_IN_PROGRESS".to_string();
        description.error_info = None;
        tracked.progression = Progression::start([Step::Status(outcome)], self.settle_polls);
        Ok(())
    }

    async fn describe_data_source(
        &self,
        account_id: &str,
        data_source_id: &str,
    ) -> Result<DataSourceDescription, RemoteError> {
        let mut store = self.enter(ApiOperation::DescribeDataSource)?;
        observe(
            &mut store.data_sources,
            &key(&[account_id, data_source_id]),
            self.settle_polls,
            |stored, status| {
                stored.description.status = status.to_string();
                if status.ends_with("_FAILED") {
                    stored.description.error_info =
                        Some("VPC connection is not available".to_string());
                }
            },
        )
        .map(|stored| stored.description)
        .ok_or_else(|| not_found("data source", data_source_id))
    }

    async fn delete_data_source(
        &self,
        account_id: &str,
        data_source_id: &str,
    ) -> Result<(), RemoteError> {
        let mut store = self.enter(ApiOperation::DeleteDataSource)?;
        let tracked = store
            .data_sources
            .remove(&key(&[account_id, data_source_id]))
            .ok_or_else(|| not_found("data source", data_source_id))?;
        store.tags.remove(&tracked.value.description.arn);
        Ok(())
    }

    async fn describe_data_source_permissions(
        &self,
        account_id: &str,
        data_source_id: &str,
    ) -> Result<Vec<ResourcePermission>, RemoteError> {
        let store = self.enter(ApiOperation::DescribeDataSourcePermissions)?;
        store
            .data_sources
            .get(&key(&[account_id, data_source_id]))
            .map(|tracked| tracked.value.permissions.clone())
            .ok_or_else(|| not_found("data source", data_source_id))
    }

    async fn update_data_source_permissions(
        &self,
        account_id: &str,
        data_source_id: &str,
        grant: Vec<ResourcePermission>,
        revoke: Vec<ResourcePermission>,
    ) -> Result<(), RemoteError> {
        let mut store = self.enter(ApiOperation::UpdateDataSourcePermissions)?;
        let tracked = store
            .data_sources
            .get_mut(&key(&[account_id, data_source_id]))
            .ok_or_else(|| not_found("data source", data_source_id))?;
        remove_permissions(&mut tracked.value.permissions, revoke);
        merge_permissions(&mut tracked.value.permissions, grant);
        Ok(())
    }

    async fn create_data_set(&self, request: CreateDataSetRequest) -> Result<(), RemoteError> {
        let mut store = self.enter(ApiOperation::CreateDataSet)?;
        let definition = request.definition;
        let id = key(&[&definition.aws_account_id, &definition.data_set_id]);
        if store.data_sets.contains_key(&id) {
            return Err(RemoteError::new(
                ErrorKind::ResourceExists,
                format!("data set {} already exists", definition.data_set_id),
            ));
        }
        validate_definition(&definition)?;
        let description = describe_definition(definition, now());
        if !request.tags.is_empty() {
            store.tags.insert(description.arn.clone(), request.tags);
        }
        store.data_sets.insert(
            id,
            StoredDataSet {
                description,
                permissions: request.permissions,
                refresh_properties: None,
            },
        );
        Ok(())
    }

    async fn update_data_set(&self, definition: DataSetDefinition) -> Result<(), RemoteError> {
        let mut store = self.enter(ApiOperation::UpdateDataSet)?;
        let stored = store
            .data_sets
            .get_mut(&key(&[&definition.aws_account_id, &definition.data_set_id]))
            .ok_or_else(|| not_found("data set", &definition.data_set_id))?;
        validate_definition(&definition)?;
        stored.description = describe_definition(definition, stored.description.created_time);
        if stored.description.import_mode != "SPICE" {
            stored.refresh_properties = None;
        }
        Ok(())
    }

    async fn describe_data_set(
        &self,
        account_id: &str,
        data_set_id: &str,
    ) -> Result<DataSetDescription, RemoteError> {
        let store = self.enter(ApiOperation::DescribeDataSet)?;
        store
            .data_sets
            .get(&key(&[account_id, data_set_id]))
            .map(|stored| stored.description.clone())
            .ok_or_else(|| not_found("data set", data_set_id))
    }

    async fn delete_data_set(&self, account_id: &str, data_set_id: &str) -> Result<(), RemoteError> {
        let mut store = self.enter(ApiOperation::DeleteDataSet)?;
        let stored = store
            .data_sets
            .remove(&key(&[account_id, data_set_id]))
            .ok_or_else(|| not_found("data set", data_set_id))?;
        store.tags.remove(&stored.description.arn);
        Ok(())
    }

    async fn describe_data_set_permissions(
        &self,
        account_id: &str,
        data_set_id: &str,
    ) -> Result<Vec<ResourcePermission>, RemoteError> {
        let store = self.enter(ApiOperation::DescribeDataSetPermissions)?;
        store
            .data_sets
            .get(&key(&[account_id, data_set_id]))
            .map(|stored| stored.permissions.clone())
            .ok_or_else(|| not_found("data set", data_set_id))
    }

    async fn update_data_set_permissions(
        &self,
        account_id: &str,
        data_set_id: &str,
        grant: Vec<ResourcePermission>,
        revoke: Vec<ResourcePermission>,
    ) -> Result<(), RemoteError> {
        let mut store = self.enter(ApiOperation::UpdateDataSetPermissions)?;
        let stored = store
            .data_sets
            .get_mut(&key(&[account_id, data_set_id]))
            .ok_or_else(|| not_found("data set", data_set_id))?;
        remove_permissions(&mut stored.permissions, revoke);
        merge_permissions(&mut stored.permissions, grant);
        Ok(())
    }

    async fn describe_data_set_refresh_properties(
        &self,
        account_id: &str,
        data_set_id: &str,
    ) -> Result<DataSetRefreshProperties, RemoteError> {
        let store = self.enter(ApiOperation::DescribeDataSetRefreshProperties)?;
        let stored = store
            .data_sets
            .get(&key(&[account_id, data_set_id]))
            .ok_or_else(|| not_found("data set", data_set_id))?;
        if stored.description.import_mode != "SPICE" {
            return Err(invalid(format!("{data_set_id} is not a SPICE dataset")));
        }
        stored
            .refresh_properties
            .clone()
            .ok_or_else(|| not_found("refresh properties of data set", data_set_id))
    }

    async fn put_data_set_refresh_properties(
        &self,
        account_id: &str,
        data_set_id: &str,
        properties: DataSetRefreshProperties,
    ) -> Result<(), RemoteError> {
        let mut store = self.enter(ApiOperation::PutDataSetRefreshProperties)?;
        let stored = store
            .data_sets
            .get_mut(&key(&[account_id, data_set_id]))
            .ok_or_else(|| not_found("data set", data_set_id))?;
        if stored.description.import_mode != "SPICE" {
            return Err(invalid(format!("{data_set_id} is not a SPICE dataset")));
        }
        stored.refresh_properties = Some(properties);
        Ok(())
    }

    async fn delete_data_set_refresh_properties(
        &self,
        account_id: &str,
        data_set_id: &str,
    ) -> Result<(), RemoteError> {
        let mut store = self.enter(ApiOperation::DeleteDataSetRefreshProperties)?;
        store
            .data_sets
            .get_mut(&key(&[account_id, data_set_id]))
            .and_then(|stored| stored.refresh_properties.take())
            .map(|_| ())
            .ok_or_else(|| not_found("refresh properties of data set", data_set_id))
    }

    async fn list_tags_for_resource(
        &self,
        arn: &str,
    ) -> Result<BTreeMap<String, String>, RemoteError> {
        let store = self.enter(ApiOperation::ListTagsForResource)?;
        Ok(store.tags.get(arn).cloned().unwrap_or_default())
    }

    async fn tag_resource(
        &self,
        arn: &str,
        tags: BTreeMap<String, String>,
    ) -> Result<(), RemoteError> {
        let mut store = self.enter(ApiOperation::TagResource)?;
        store.tags.entry(arn.to_string()).or_default().extend(tags);
        Ok(())
    }

    async fn untag_resource(&self, arn: &str, keys: Vec<String>) -> Result<(), RemoteError> {
        let mut store = self.enter(ApiOperation::UntagResource)?;
        if let Some(tags) = store.tags.get_mut(arn) {
            tags.retain(|k, _| !keys.contains(k));
        }
        Ok(())
    }

    async fn create_ingestion(&self, request: CreateIngestionRequest) -> Result<(), RemoteError> {
        let mut store = self.enter(ApiOperation::CreateIngestion)?;
        let data_set = store
            .data_sets
            .get(&key(&[&request.aws_account_id, &request.data_set_id]))
            .ok_or_else(|| not_found("data set", &request.data_set_id))?;
        if data_set.description.import_mode != "SPICE" {
            return Err(invalid(format!("{} is not a SPICE dataset", request.data_set_id)));
        }
        let arn = format!("{}/ingestion/{}", data_set.description.arn, request.ingestion_id);
        let id = key(&[&request.aws_account_id, &request.data_set_id, &request.ingestion_id]);
        if store.ingestions.contains_key(&id) {
            return Err(RemoteError::new(
                ErrorKind::ResourceExists,
                format!("ingestion {} already exists", request.ingestion_id),
            ));
        }
        let ingestion = Ingestion {
            arn,
            ingestion_id: request.ingestion_id,
            ingestion_status: "INITIALIZED".to_string(),
            ingestion_type: request
                .ingestion_type
                .unwrap_or_else(|| "FULL_REFRESH".to_string()),
            created_time: now(),
        };
        store.ingestions.insert(
            id,
            Tracked {
                value: ingestion,
                progression: Progression::start(
                    [
                        Step::Status("QUEUED"),
                        Step::Status("RUNNING"),
                        Step::Status(self.ingestion_outcome),
                    ],
                    self.settle_polls,
                ),
            },
        );
        Ok(())
    }

    async fn describe_ingestion(
        &self,
        account_id: &str,
        data_set_id: &str,
        ingestion_id: &str,
    ) -> Result<Ingestion, RemoteError> {
        let mut store = self.enter(ApiOperation::DescribeIngestion)?;
        observe(
            &mut store.ingestions,
            &key(&[account_id, data_set_id, ingestion_id]),
            self.settle_polls,
            |ingestion, status| ingestion.ingestion_status = status.to_string(),
        )
        .ok_or_else(|| not_found("ingestion", ingestion_id))
    }

    async fn cancel_ingestion(
        &self,
        account_id: &str,
        data_set_id: &str,
        ingestion_id: &str,
    ) -> Result<(), RemoteError> {
        let mut store = self.enter(ApiOperation::CancelIngestion)?;
        let id = key(&[account_id, data_set_id, ingestion_id]);
        let tracked = store
            .ingestions
            .get_mut(&id)
            .ok_or_else(|| not_found("ingestion", ingestion_id))?;
        if matches!(
            tracked.value.ingestion_status.as_str(),
            "INITIALIZED" | "QUEUED" | "RUNNING"
        ) {
            tracked.value.ingestion_status = "CANCELLED".to_string();
            tracked.progression = Progression::default();
        }
        Ok(())
    }
}

impl std::fmt::Debug for InMemoryQuickSight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryQuickSight")
            .field("settle_polls", &self.settle_polls)
            .field("ingestion_outcome", &self.ingestion_outcome)
            .finish_non_exhaustive()
    }
}
