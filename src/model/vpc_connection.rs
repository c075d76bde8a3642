use super::optional;
use reconcile_framework::Value;

/// A VPC connection QuickSight uses to reach private data sources.
#[derive(Debug, Clone, PartialEq)]
pub struct VpcConnectionDeclaration {
    pub aws_account_id: Option<String>,
    pub vpc_connection_id: String,
    pub name: String,
    /// Role QuickSight assumes to create network interfaces.
    pub role_arn: String,
    pub security_group_ids: Vec<String>,
    pub subnet_ids: Vec<String>,
    pub dns_resolvers: Option<Vec<String>>,
}

impl From<&VpcConnectionDeclaration> for Value {
    fn from(declaration: &VpcConnectionDeclaration) -> Self {
        Value::object([
            ("aws_account_id", optional(&declaration.aws_account_id)),
            (
                "vpc_connection_id",
                Value::from(declaration.vpc_connection_id.as_str()),
            ),
            ("name", Value::from(declaration.name.as_str())),
            ("role_arn", Value::from(declaration.role_arn.as_str())),
            (
                "security_group_ids",
                Value::string_set(declaration.security_group_ids.iter().cloned()),
            ),
            (
                "subnet_ids",
                Value::string_set(declaration.subnet_ids.iter().cloned()),
            ),
            (
                "dns_resolvers",
                declaration
                    .dns_resolvers
                    .as_ref()
                    .map_or(Value::Null, |r| Value::string_set(r.iter().cloned())),
            ),
        ])
    }
}
