//! Declared shape of a data source.
//!
//! `parameters` is exactly one engine block. The engine fixes the computed `type`, which
//! the service refuses to change on update. `credentials` are sent but never described.

use once_cell::sync::Lazy;
use reconcile_framework::{AttributeNode as N, Field, ObjectSchema, ACCOUNT_FIELD};

/// Fields routed to their own remote calls instead of `UpdateDataSource`.
pub const SUB_RESOURCE_FIELDS: &[&str] = &["permissions", "tags"];

pub static DATA_SOURCE_SCHEMA: Lazy<ObjectSchema> = Lazy::new(|| {
    ObjectSchema::new(vec![
        Field::optional_computed(ACCOUNT_FIELD, N::string()),
        Field::required("data_source_id", N::string()),
        Field::required("name", N::string()),
        Field::required("parameters", parameters()).wire("DataSourceParameters"),
        Field::optional(
            "credentials",
            N::object(vec![Field::required(
                "credential_pair",
                N::object(vec![
                    Field::required("username", N::string()),
                    Field::required("password", N::string()),
                ]),
            )]),
        )
        .write_only(),
        Field::optional_computed(
            "ssl_properties",
            N::object(vec![Field::optional_computed("disable_ssl", N::bool())]),
        ),
        Field::optional(
            "vpc_connection_properties",
            N::object(vec![Field::required("vpc_connection_arn", N::string())]),
        ),
        Field::optional(
            "permissions",
            N::set(N::object(vec![
                Field::required("principal", N::string()),
                Field::required("actions", N::set(N::string())),
            ])),
        )
        .empty_as_null(),
        Field::optional("tags", N::map(N::string())).empty_as_null(),
        Field::computed("arn", N::string()),
        Field::computed("type", N::string()),
        Field::computed("status", N::string()),
        Field::computed("error_info", N::string()),
    ])
});

fn endpoint() -> N {
    N::object(vec![
        Field::required("database", N::string()),
        Field::required("host", N::string()),
        Field::required("port", N::int()),
    ])
}

fn site() -> N {
    N::object(vec![Field::required("site_base_url", N::string())])
}

fn engine(name: &str, wire_name: &str, node: N) -> Field {
    Field::optional(name, node).wire(wire_name)
}

fn parameters() -> N {
    N::variant(vec![
        engine(
            "amazon_elasticsearch",
            "AmazonElasticsearchParameters",
            N::object(vec![Field::required("domain", N::string())]),
        ),
        engine(
            "athena",
            "AthenaParameters",
            N::object(vec![Field::optional("work_group", N::string())]),
        ),
        engine("aurora", "AuroraParameters", endpoint()),
        engine("aurora_postgresql", "AuroraPostgreSqlParameters", endpoint()),
        engine(
            "aws_iot_analytics",
            "AwsIotAnalyticsParameters",
            N::object(vec![Field::required("data_set_name", N::string())]),
        ),
        engine("jira", "JiraParameters", site()),
        engine("maria_db", "MariaDbParameters", endpoint()),
        engine("mysql", "MySqlParameters", endpoint()),
        engine("postgresql", "PostgreSqlParameters", endpoint()),
        engine(
            "presto",
            "PrestoParameters",
            N::object(vec![
                Field::required("catalog", N::string()),
                Field::required("host", N::string()),
                Field::required("port", N::int()),
            ]),
        ),
        engine(
            "redshift",
            "RedshiftParameters",
            N::object(vec![
                Field::optional("cluster_id", N::string()),
                Field::required("database", N::string()),
                Field::optional("host", N::string()),
                Field::optional("port", N::int()),
            ]),
        ),
        engine(
            "s3",
            "S3Parameters",
            N::object(vec![Field::required(
                "manifest_file_location",
                N::object(vec![
                    Field::required("bucket", N::string()),
                    Field::required("key", N::string()),
                ]),
            )]),
        ),
        engine("service_now", "ServiceNowParameters", site()),
        engine(
            "snowflake",
            "SnowflakeParameters",
            N::object(vec![
                Field::required("database", N::string()),
                Field::required("host", N::string()),
                Field::required("warehouse", N::string()),
            ]),
        ),
        engine(
            "spark",
            "SparkParameters",
            N::object(vec![
                Field::required("host", N::string()),
                Field::required("port", N::int()),
            ]),
        ),
        engine("sql_server", "SqlServerParameters", endpoint()),
        engine("teradata", "TeradataParameters", endpoint()),
        engine(
            "twitter",
            "TwitterParameters",
            N::object(vec![
                Field::required("max_rows", N::int()),
                Field::required("query", N::string()),
            ]),
        ),
    ])
}
