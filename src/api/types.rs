//! Typed request and response shapes of the QuickSight management API.
//!
//! Field names serialize in PascalCase, the same wire form the transcoder expands declared
//! trees into. Union types (a physical table is exactly one of three sources) are
//! externally tagged enums, so `{"CustomSql": {...}}` is the only accepted shape.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// SHARED
// =============================================================================

/// A principal and the actions it may perform on a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct ResourcePermission {
    pub principal: String,
    pub actions: Vec<String>,
}

// =============================================================================
// NAMESPACE
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct CreateNamespaceRequest {
    pub aws_account_id: String,
    pub namespace: String,
    pub identity_store: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct NamespaceInfo {
    pub namespace: String,
    pub arn: String,
    pub capacity_region: String,
    pub creation_status: String,
    pub identity_store: String,
}

// =============================================================================
// VPC CONNECTION
// =============================================================================

/// Create and update take the same fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct VpcConnectionRequest {
    pub aws_account_id: String,
    pub vpc_connection_id: String,
    pub name: String,
    pub role_arn: String,
    pub security_group_ids: Vec<String>,
    pub subnet_ids: Vec<String>,
    pub dns_resolvers: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct VpcConnection {
    pub vpc_connection_id: String,
    pub name: String,
    pub role_arn: String,
    pub security_group_ids: Vec<String>,
    pub subnet_ids: Vec<String>,
    pub dns_resolvers: Vec<String>,
    pub arn: String,
    pub status: String,
    pub availability_status: String,
}

// =============================================================================
// DATA SOURCE
// =============================================================================

/// Host, port and database of a relational engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct DatabaseEndpoint {
    pub database: String,
    pub host: String,
    pub port: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct AmazonElasticsearchParameters {
    pub domain: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct AthenaParameters {
    pub work_group: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct AwsIotAnalyticsParameters {
    pub data_set_name: String,
}

/// Jira and ServiceNow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct SiteParameters {
    pub site_base_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct PrestoParameters {
    pub catalog: String,
    pub host: String,
    pub port: i64,
}

/// Either `ClusterId` or `Host` and `Port` locate the cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct RedshiftParameters {
    pub cluster_id: Option<String>,
    pub database: String,
    pub host: Option<String>,
    pub port: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct ManifestFileLocation {
    pub bucket: String,
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct S3Parameters {
    pub manifest_file_location: ManifestFileLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct SnowflakeParameters {
    pub database: String,
    pub host: String,
    pub warehouse: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct SparkParameters {
    pub host: String,
    pub port: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct TwitterParameters {
    pub max_rows: i64,
    pub query: String,
}

/// How to reach the underlying engine. Exactly one engine; it also fixes the data source
/// type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DataSourceParameters {
    AmazonElasticsearchParameters(AmazonElasticsearchParameters),
    AthenaParameters(AthenaParameters),
    AuroraParameters(DatabaseEndpoint),
    AuroraPostgreSqlParameters(DatabaseEndpoint),
    AwsIotAnalyticsParameters(AwsIotAnalyticsParameters),
    JiraParameters(SiteParameters),
    MariaDbParameters(DatabaseEndpoint),
    MySqlParameters(DatabaseEndpoint),
    PostgreSqlParameters(DatabaseEndpoint),
    PrestoParameters(PrestoParameters),
    RedshiftParameters(RedshiftParameters),
    S3Parameters(S3Parameters),
    ServiceNowParameters(SiteParameters),
    SnowflakeParameters(SnowflakeParameters),
    SparkParameters(SparkParameters),
    SqlServerParameters(DatabaseEndpoint),
    TeradataParameters(DatabaseEndpoint),
    TwitterParameters(TwitterParameters),
}

impl DataSourceParameters {
    /// The `Type` the service records for these parameters.
    pub fn data_source_type(&self) -> &'static str {
        match self {
            Self::AmazonElasticsearchParameters(_) => "AMAZON_ELASTICSEARCH",
            Self::AthenaParameters(_) => "ATHENA",
            Self::AuroraParameters(_) => "AURORA",
            Self::AuroraPostgreSqlParameters(_) => "AURORA_POSTGRESQL",
            Self::AwsIotAnalyticsParameters(_) => "AWS_IOT_ANALYTICS",
            Self::JiraParameters(_) => "JIRA",
            Self::MariaDbParameters(_) => "MARIADB",
            Self::MySqlParameters(_) => "MYSQL",
            Self::PostgreSqlParameters(_) => "POSTGRESQL",
            Self::PrestoParameters(_) => "PRESTO",
            Self::RedshiftParameters(_) => "REDSHIFT",
            Self::S3Parameters(_) => "S3",
            Self::ServiceNowParameters(_) => "SERVICENOW",
            Self::SnowflakeParameters(_) => "SNOWFLAKE",
            Self::SparkParameters(_) => "SPARK",
            Self::SqlServerParameters(_) => "SQLSERVER",
            Self::TeradataParameters(_) => "TERADATA",
            Self::TwitterParameters(_) => "TWITTER",
        }
    }
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct CredentialPair {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for CredentialPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialPair")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct DataSourceCredentials {
    pub credential_pair: CredentialPair,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct SslProperties {
    pub disable_ssl: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct VpcConnectionProperties {
    pub vpc_connection_arn: String,
}

/// The fields `UpdateDataSource` replaces. The type cannot change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DataSourceDefinition {
    pub aws_account_id: String,
    pub data_source_id: String,
    pub name: String,
    pub data_source_parameters: DataSourceParameters,
    pub credentials: Option<DataSourceCredentials>,
    pub ssl_properties: Option<SslProperties>,
    pub vpc_connection_properties: Option<VpcConnectionProperties>,
}

#[derive(Debug, Clone)]
pub struct CreateDataSourceRequest {
    pub definition: DataSourceDefinition,
    pub data_source_type: String,
    pub permissions: Vec<ResourcePermission>,
    pub tags: BTreeMap<String, String>,
}

/// What `DescribeDataSource` returns. Credentials are never returned.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DataSourceDescription {
    pub arn: String,
    pub data_source_id: String,
    pub name: String,
    #[serde(rename = "Type")]
    pub data_source_type: String,
    pub data_source_parameters: DataSourceParameters,
    pub ssl_properties: SslProperties,
    pub vpc_connection_properties: Option<VpcConnectionProperties>,
    pub status: String,
    pub error_info: Option<String>,
}

// =============================================================================
// DATA SET
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct InputColumn {
    pub name: String,
    #[serde(rename = "Type")]
    pub column_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct CustomSql {
    pub data_source_arn: String,
    pub name: String,
    pub sql_query: String,
    pub columns: Option<Vec<InputColumn>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct RelationalTable {
    pub data_source_arn: String,
    pub catalog: Option<String>,
    pub schema: Option<String>,
    pub name: String,
    pub input_columns: Vec<InputColumn>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct UploadSettings {
    pub format: Option<String>,
    pub contains_header: Option<bool>,
    pub start_from_row: Option<i64>,
    pub delimiter: Option<String>,
    pub text_qualifier: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct S3Source {
    pub data_source_arn: String,
    pub input_columns: Vec<InputColumn>,
    pub upload_settings: Option<UploadSettings>,
}

/// Where a physical table reads its rows from. Exactly one source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PhysicalTable {
    CustomSql(CustomSql),
    RelationalTable(RelationalTable),
    S3Source(S3Source),
}

impl PhysicalTable {
    pub fn columns(&self) -> &[InputColumn] {
        match self {
            PhysicalTable::CustomSql(sql) => sql.columns.as_deref().unwrap_or_default(),
            PhysicalTable::RelationalTable(table) => &table.input_columns,
            PhysicalTable::S3Source(source) => &source.input_columns,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct JoinInstruction {
    pub left_operand: String,
    pub right_operand: String,
    #[serde(rename = "Type")]
    pub join_type: String,
    pub on_clause: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LogicalTableSource {
    DataSetArn(String),
    PhysicalTableId(String),
    JoinInstruction(JoinInstruction),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct CastColumnTypeOperation {
    pub column_name: String,
    pub new_column_type: String,
    pub format: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct CalculatedColumn {
    pub column_id: String,
    pub column_name: String,
    pub expression: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct CreateColumnsOperation {
    pub columns: Vec<CalculatedColumn>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct FilterOperation {
    pub condition_expression: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct ProjectOperation {
    pub projected_columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct RenameColumnOperation {
    pub column_name: String,
    pub new_column_name: String,
}

/// One step of a logical table's transform pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TransformOperation {
    CastColumnTypeOperation(CastColumnTypeOperation),
    CreateColumnsOperation(CreateColumnsOperation),
    FilterOperation(FilterOperation),
    ProjectOperation(ProjectOperation),
    RenameColumnOperation(RenameColumnOperation),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct LogicalTable {
    pub alias: String,
    pub source: LogicalTableSource,
    pub data_transforms: Option<Vec<TransformOperation>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct GeoSpatialColumnGroup {
    pub name: String,
    pub country_code: String,
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct ColumnGroup {
    pub geo_spatial_column_group: Option<GeoSpatialColumnGroup>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct ColumnLevelPermissionRule {
    pub column_names: Vec<String>,
    pub principals: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct DataSetUsageConfiguration {
    pub disable_use_as_direct_query_source: bool,
    pub disable_use_as_imported_source: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct RowLevelPermissionDataSet {
    pub arn: String,
    pub permission_policy: String,
    pub format_version: Option<String>,
    pub namespace: Option<String>,
    pub status: Option<String>,
}

/// Groups output columns under a folder in the analysis editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct FieldFolder {
    pub description: Option<String>,
    pub columns: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct RowLevelPermissionTagRule {
    pub tag_key: String,
    pub column_name: String,
    pub tag_multi_value_delimiter: Option<String>,
    pub match_all_value: Option<String>,
}

/// Row-level security driven by session tags. `Status` defaults to `ENABLED`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct RowLevelPermissionTagConfiguration {
    pub status: Option<String>,
    pub tag_rules: Vec<RowLevelPermissionTagRule>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct LookbackWindow {
    pub column_name: String,
    pub size: i64,
    pub size_unit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct IncrementalRefresh {
    pub lookback_window: LookbackWindow,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct RefreshConfiguration {
    pub incremental_refresh: IncrementalRefresh,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct DataSetRefreshProperties {
    pub refresh_configuration: RefreshConfiguration,
}

/// The fields `UpdateDataSet` replaces wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DataSetDefinition {
    pub aws_account_id: String,
    pub data_set_id: String,
    pub name: String,
    pub import_mode: String,
    pub physical_table_map: BTreeMap<String, PhysicalTable>,
    pub logical_table_map: Option<BTreeMap<String, LogicalTable>>,
    pub column_groups: Option<Vec<ColumnGroup>>,
    pub column_level_permission_rules: Option<Vec<ColumnLevelPermissionRule>>,
    pub data_set_usage_configuration: Option<DataSetUsageConfiguration>,
    pub row_level_permission_data_set: Option<RowLevelPermissionDataSet>,
    pub row_level_permission_tag_configuration: Option<RowLevelPermissionTagConfiguration>,
    pub field_folders: Option<BTreeMap<String, FieldFolder>>,
}

#[derive(Debug, Clone)]
pub struct CreateDataSetRequest {
    pub definition: DataSetDefinition,
    pub permissions: Vec<ResourcePermission>,
    pub tags: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct OutputColumn {
    pub name: String,
    #[serde(rename = "Type")]
    pub column_type: String,
    pub description: Option<String>,
}

/// What `DescribeDataSet` returns. Permissions, refresh properties and tags live behind
/// their own calls.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DataSetDescription {
    pub arn: String,
    pub data_set_id: String,
    pub name: String,
    pub import_mode: String,
    pub physical_table_map: BTreeMap<String, PhysicalTable>,
    pub logical_table_map: BTreeMap<String, LogicalTable>,
    pub column_groups: Option<Vec<ColumnGroup>>,
    pub column_level_permission_rules: Option<Vec<ColumnLevelPermissionRule>>,
    pub data_set_usage_configuration: DataSetUsageConfiguration,
    pub row_level_permission_data_set: Option<RowLevelPermissionDataSet>,
    pub row_level_permission_tag_configuration: Option<RowLevelPermissionTagConfiguration>,
    pub field_folders: Option<BTreeMap<String, FieldFolder>>,
    pub output_columns: Vec<OutputColumn>,
    /// Epoch seconds.
    pub created_time: i64,
    /// Epoch seconds.
    pub last_updated_time: i64,
}

// =============================================================================
// INGESTION
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct CreateIngestionRequest {
    pub aws_account_id: String,
    pub data_set_id: String,
    pub ingestion_id: String,
    pub ingestion_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Ingestion {
    pub arn: String,
    pub ingestion_id: String,
    pub ingestion_status: String,
    pub ingestion_type: String,
    /// Epoch seconds.
    pub created_time: i64,
}
