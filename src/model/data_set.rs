use reconcile_framework::Value;
use std::collections::BTreeMap;

/// Builder for a data set declaration.
///
/// Covers the common shapes (SQL and relational tables, permissions, tags, incremental
/// refresh). Anything else can be set on the built [`Value`] directly.
///
/// ```rust
/// use quicksight_reconciler::model::DataSetDeclaration;
///
/// let declared = DataSetDeclaration::new("sales", "Sales", "SPICE")
///     .custom_sql("orders", "arn:aws:quicksight:us-east-1:123456789012:datasource/pg", "SELECT * FROM orders", &[("id", "INTEGER")])
///     .permission("arn:aws:quicksight:us-east-1:123456789012:user/default/alice", &["quicksight:DescribeDataSet"])
///     .tag("team", "finance")
///     .build();
///
/// assert_eq!(declared.get("import_mode").as_str(), Some("SPICE"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DataSetDeclaration {
    aws_account_id: Option<String>,
    data_set_id: String,
    name: String,
    import_mode: String,
    physical_tables: BTreeMap<String, Value>,
    permissions: Vec<Value>,
    tags: BTreeMap<String, Value>,
    refresh_properties: Value,
    field_folders: BTreeMap<String, Value>,
    tag_rules: Vec<Value>,
}

fn columns(columns: &[(&str, &str)]) -> Value {
    Value::List(
        columns
            .iter()
            .map(|(name, column_type)| {
                Value::object([("name", Value::from(*name)), ("type", Value::from(*column_type))])
            })
            .collect(),
    )
}

impl DataSetDeclaration {
    pub fn new(
        data_set_id: impl Into<String>,
        name: impl Into<String>,
        import_mode: impl Into<String>,
    ) -> Self {
        Self {
            aws_account_id: None,
            data_set_id: data_set_id.into(),
            name: name.into(),
            import_mode: import_mode.into(),
            physical_tables: BTreeMap::new(),
            permissions: Vec::new(),
            tags: BTreeMap::new(),
            refresh_properties: Value::Null,
            field_folders: BTreeMap::new(),
            tag_rules: Vec::new(),
        }
    }

    pub fn account(mut self, aws_account_id: impl Into<String>) -> Self {
        self.aws_account_id = Some(aws_account_id.into());
        self
    }

    pub fn custom_sql(
        mut self,
        table_id: &str,
        data_source_arn: &str,
        sql_query: &str,
        output: &[(&str, &str)],
    ) -> Self {
        let source = Value::object([
            ("data_source_arn", Value::from(data_source_arn)),
            ("name", Value::from(table_id)),
            ("sql_query", Value::from(sql_query)),
            ("columns", columns(output)),
        ]);
        self.physical_tables
            .insert(table_id.to_string(), Value::object([("custom_sql", source)]));
        self
    }

    pub fn relational_table(
        mut self,
        table_id: &str,
        data_source_arn: &str,
        table_name: &str,
        input: &[(&str, &str)],
    ) -> Self {
        let source = Value::object([
            ("data_source_arn", Value::from(data_source_arn)),
            ("name", Value::from(table_name)),
            ("input_columns", columns(input)),
        ]);
        self.physical_tables.insert(
            table_id.to_string(),
            Value::object([("relational_table", source)]),
        );
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

    pub fn field_folder(mut self, folder_id: &str, description: &str, columns: &[&str]) -> Self {
        let folder = Value::object([
            ("description", Value::from(description)),
            ("columns", Value::string_list(columns.iter().copied())),
        ]);
        self.field_folders.insert(folder_id.to_string(), folder);
        self
    }

    /// Restricts rows to those whose `column_name` matches the session tag `tag_key`.
    pub fn tag_rule(mut self, tag_key: &str, column_name: &str) -> Self {
        self.tag_rules.push(Value::object([
            ("tag_key", Value::from(tag_key)),
            ("column_name", Value::from(column_name)),
        ]));
        self
    }

    /// Incremental refresh looking back `size` units over `column_name`.
    pub fn incremental_refresh(mut self, column_name: &str, size: i64, size_unit: &str) -> Self {
        let window = Value::object([
            ("column_name", Value::from(column_name)),
            ("size", Value::from(size)),
            ("size_unit", Value::from(size_unit)),
        ]);
        self.refresh_properties = Value::object([(
            "refresh_configuration",
            Value::object([(
                "incremental_refresh",
                Value::object([("lookback_window", window)]),
            )]),
        )]);
        self
    }

    pub fn build(self) -> Value {
        let mut declared = Value::object([
            (
                "aws_account_id",
                self.aws_account_id.map_or(Value::Null, Value::from),
            ),
            ("data_set_id", Value::from(self.data_set_id)),
            ("name", Value::from(self.name)),
            ("import_mode", Value::from(self.import_mode)),
            ("physical_table_map", Value::Map(self.physical_tables)),
            ("refresh_properties", self.refresh_properties),
        ]);
        if !self.permissions.is_empty() {
            declared.set("permissions", Value::Set(self.permissions));
        }
        if !self.tags.is_empty() {
            declared.set("tags", Value::Map(self.tags));
        }
        if !self.field_folders.is_empty() {
            declared.set("field_folders", Value::Map(self.field_folders));
        }
        if !self.tag_rules.is_empty() {
            declared.set(
                "row_level_permission_tag_configuration",
                Value::object([("tag_rules", Value::List(self.tag_rules))]),
            );
        }
        declared
    }
}
