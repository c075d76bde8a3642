use reconcile_framework::Value;
use std::collections::BTreeMap;

/// Builder for a data source declaration.
///
/// ```rust
/// use quicksight_reconciler::model::DataSourceDeclaration;
/// use reconcile_framework::Value;
///
/// let declared = DataSourceDeclaration::new("warehouse", "Warehouse")
///     .postgresql("analytics", "db.internal", 5432)
///     .credentials("reporter", "hunter2")
///     .build();
///
/// assert_eq!(
///     declared.get("parameters").get("postgresql").get("port"),
///     &Value::Int(5432)
/// );
/// ```
#[derive(Clone, PartialEq)]
pub struct DataSourceDeclaration {
    aws_account_id: Option<String>,
    data_source_id: String,
    name: String,
    engines: BTreeMap<String, Value>,
    credentials: Value,
    ssl_properties: Value,
    vpc_connection_properties: Value,
    permissions: Vec<Value>,
    tags: BTreeMap<String, Value>,
}

impl std::fmt::Debug for DataSourceDeclaration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataSourceDeclaration")
            .field("data_source_id", &self.data_source_id)
            .field("name", &self.name)
            .field("engines", &self.engines.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

fn endpoint(database: &str, host: &str, port: i64) -> Value {
    Value::object([
        ("database", Value::from(database)),
        ("host", Value::from(host)),
        ("port", Value::from(port)),
    ])
}

impl DataSourceDeclaration {
    pub fn new(data_source_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            aws_account_id: None,
            data_source_id: data_source_id.into(),
            name: name.into(),
            engines: BTreeMap::new(),
            credentials: Value::Null,
            ssl_properties: Value::Null,
            vpc_connection_properties: Value::Null,
            permissions: Vec::new(),
            tags: BTreeMap::new(),
        }
    }

    pub fn data_source_id(&self) -> &str {
        &self.data_source_id
    }

    pub fn account(mut self, aws_account_id: impl Into<String>) -> Self {
        self.aws_account_id = Some(aws_account_id.into());
        self
    }

    /// Sets one engine block by its declared name, e.g. `"twitter"`.
    ///
    /// Setting a second engine is allowed here; the reconciler rejects it.
    pub fn engine(mut self, engine: &str, parameters: Value) -> Self {
        self.engines.insert(engine.to_string(), parameters);
        self
    }

    pub fn postgresql(self, database: &str, host: &str, port: i64) -> Self {
        self.engine("postgresql", endpoint(database, host, port))
    }

    pub fn mysql(self, database: &str, host: &str, port: i64) -> Self {
        self.engine("mysql", endpoint(database, host, port))
    }

    pub fn athena(self, work_group: Option<&str>) -> Self {
        let work_group = work_group.map_or(Value::Null, Value::from);
        self.engine("athena", Value::object([("work_group", work_group)]))
    }

    pub fn s3_manifest(self, bucket: &str, key: &str) -> Self {
        let location = Value::object([("bucket", Value::from(bucket)), ("key", Value::from(key))]);
        self.engine("s3", Value::object([("manifest_file_location", location)]))
    }

    pub fn redshift_cluster(self, cluster_id: &str, database: &str) -> Self {
        self.engine(
            "redshift",
            Value::object([
                ("cluster_id", Value::from(cluster_id)),
                ("database", Value::from(database)),
            ]),
        )
    }

    pub fn credentials(mut self, username: &str, password: &str) -> Self {
        let pair = Value::object([
            ("username", Value::from(username)),
            ("password", Value::from(password)),
        ]);
        self.credentials = Value::object([("credential_pair", pair)]);
        self
    }

    pub fn disable_ssl(mut self, disable_ssl: bool) -> Self {
        self.ssl_properties = Value::object([("disable_ssl", Value::from(disable_ssl))]);
        self
    }

    pub fn vpc_connection(mut self, vpc_connection_arn: &str) -> Self {
        self.vpc_connection_properties =
            Value::object([("vpc_connection_arn", Value::from(vpc_connection_arn))]);
        self
    }

    pub fn permission(mut self, principal: &str, actions: &[&str]) -> Self {
        self.permissions.push(Value::object([
            ("principal", Value::from(principal)),
            ("actions", Value::string_set(actions.iter().copied())),
        ]));
        self
    }

    pub fn tag(mut self, key: &str, value: &str) -> Self {
        self.tags.insert(key.to_string(), Value::from(value));
        self
    }

    pub fn build(self) -> Value {
        let mut declared = Value::object([
            (
                "aws_account_id",
                self.aws_account_id.map_or(Value::Null, Value::from),
            ),
            ("data_source_id", Value::from(self.data_source_id)),
            ("name", Value::from(self.name)),
            ("parameters", Value::object(self.engines)),
            ("credentials", self.credentials),
            ("ssl_properties", self.ssl_properties),
            ("vpc_connection_properties", self.vpc_connection_properties),
        ]);
        if !self.permissions.is_empty() {
            declared.set("permissions", Value::Set(self.permissions));
        }
        if !self.tags.is_empty() {
            declared.set("tags", Value::Map(self.tags));
        }
        declared
    }
}

impl From<&DataSourceDeclaration> for Value {
    fn from(declaration: &DataSourceDeclaration) -> Self {
        declaration.clone().build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_leaves_out_credentials() {
        let declaration =
            DataSourceDeclaration::new("warehouse", "Warehouse").credentials("reporter", "hunter2");
        let printed = format!("{declaration:?}");
        assert!(printed.contains("warehouse"));
        assert!(!printed.contains("hunter2"));
    }

    #[test]
    fn test_unset_blocks_stay_null() {
        let declared = DataSourceDeclaration::new("warehouse", "Warehouse")
            .athena(None)
            .build();
        assert!(declared.get("credentials").is_null());
        assert!(declared.get("ssl_properties").is_null());
        assert!(declared.get("tags").is_null());
        assert!(declared.get("parameters").get("athena").get("work_group").is_null());
    }
}
