use super::optional;
use reconcile_framework::Value;

/// A QuickSight namespace.
#[derive(Debug, Clone, PartialEq)]
pub struct NamespaceDeclaration {
    /// Defaults to the configured account.
    pub aws_account_id: Option<String>,
    pub namespace: String,
    /// Only `QUICKSIGHT` is supported by the service.
    pub identity_store: Option<String>,
}

impl NamespaceDeclaration {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            aws_account_id: None,
            namespace: namespace.into(),
            identity_store: None,
        }
    }
}

impl From<&NamespaceDeclaration> for Value {
    fn from(declaration: &NamespaceDeclaration) -> Self {
        Value::object([
            ("aws_account_id", optional(&declaration.aws_account_id)),
            ("namespace", Value::from(declaration.namespace.as_str())),
            ("identity_store", optional(&declaration.identity_store)),
        ])
    }
}
