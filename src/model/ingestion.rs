use super::optional;
use reconcile_framework::Value;

/// A SPICE refresh of one data set.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestionDeclaration {
    pub aws_account_id: Option<String>,
    pub data_set_id: String,
    pub ingestion_id: String,
    /// `FULL_REFRESH` (the default) or `INCREMENTAL_REFRESH`.
    pub ingestion_type: Option<String>,
}

impl IngestionDeclaration {
    pub fn full_refresh(data_set_id: impl Into<String>, ingestion_id: impl Into<String>) -> Self {
        Self {
            aws_account_id: None,
            data_set_id: data_set_id.into(),
            ingestion_id: ingestion_id.into(),
            ingestion_type: None,
        }
    }
}

impl From<&IngestionDeclaration> for Value {
    fn from(declaration: &IngestionDeclaration) -> Self {
        Value::object([
            ("aws_account_id", optional(&declaration.aws_account_id)),
            ("data_set_id", Value::from(declaration.data_set_id.as_str())),
            ("ingestion_id", Value::from(declaration.ingestion_id.as_str())),
            ("ingestion_type", optional(&declaration.ingestion_type)),
        ])
    }
}
