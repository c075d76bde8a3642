//! Declared shape of a data set.
//!
//! - `physical_table_map` is a map from table id to a source that is exactly one of
//!   `custom_sql`, `relational_table` or `s3_source`.
//! - `logical_table_map` is generated by the service when left null.
//! - `column_groups` and `column_level_permission_rules` are replaced wholesale on update,
//!   so clearing them needs an explicit empty list on the wire.
//! - `field_folders` is keyed by folder id.

use once_cell::sync::Lazy;
use reconcile_framework::{AttributeNode as N, Field, ObjectSchema, ACCOUNT_FIELD};

/// Fields routed to their own remote calls instead of `UpdateDataSet`.
pub const SUB_RESOURCE_FIELDS: &[&str] = &["permissions", "refresh_properties", "tags"];

pub static DATA_SET_SCHEMA: Lazy<ObjectSchema> = Lazy::new(|| {
    ObjectSchema::new(vec![
        Field::optional_computed(ACCOUNT_FIELD, N::string()),
        Field::required("data_set_id", N::string()),
        Field::required("name", N::string()),
        Field::required("import_mode", N::string()),
        Field::required("physical_table_map", N::map(physical_table())),
        Field::optional_computed("logical_table_map", N::map(logical_table())),
        Field::optional("column_groups", N::list(column_group())).explicit_empty(),
        Field::optional(
            "column_level_permission_rules",
            N::list(N::object(vec![
                Field::required("column_names", N::set(N::string())),
                Field::required("principals", N::set(N::string())),
            ])),
        )
        .explicit_empty(),
        Field::optional_computed(
            "data_set_usage_configuration",
            N::object(vec![
                Field::required("disable_use_as_direct_query_source", N::bool()),
                Field::required("disable_use_as_imported_source", N::bool()),
            ]),
        ),
        Field::optional(
            "row_level_permission_data_set",
            N::object(vec![
                Field::required("arn", N::string()),
                Field::required("permission_policy", N::string()),
                Field::optional("format_version", N::string()),
                Field::optional("namespace", N::string()),
                Field::optional("status", N::string()),
            ]),
        ),
        Field::optional(
            "row_level_permission_tag_configuration",
            N::object(vec![
                Field::optional_computed("status", N::string()),
                Field::required(
                    "tag_rules",
                    N::list(N::object(vec![
                        Field::required("tag_key", N::string()),
                        Field::required("column_name", N::string()),
                        Field::optional("tag_multi_value_delimiter", N::string()),
                        Field::optional("match_all_value", N::string()),
                    ])),
                ),
            ]),
        ),
        Field::optional(
            "field_folders",
            N::map(N::object(vec![
                Field::optional("description", N::string()),
                Field::optional("columns", N::list(N::string())),
            ])),
        ),
        Field::optional(
            "permissions",
            N::set(N::object(vec![
                Field::required("principal", N::string()),
                Field::required("actions", N::set(N::string())),
            ])),
        )
        .empty_as_null(),
        Field::optional("refresh_properties", refresh_properties()),
        Field::optional("tags", N::map(N::string())).empty_as_null(),
        Field::computed("arn", N::string()),
        Field::computed(
            "output_columns",
            N::list(N::object(vec![
                Field::required("name", N::string()),
                Field::required("type", N::string()),
                Field::optional("description", N::string()),
            ])),
        ),
        Field::computed("created_time", N::timestamp()),
        Field::computed("last_updated_time", N::timestamp()),
    ])
});

fn input_columns() -> N {
    N::list(N::object(vec![
        Field::required("name", N::string()),
        Field::required("type", N::string()),
    ]))
}

fn physical_table() -> N {
    N::variant(vec![
        Field::optional(
            "custom_sql",
            N::object(vec![
                Field::required("data_source_arn", N::string()),
                Field::required("name", N::string()),
                Field::required("sql_query", N::string()),
                Field::optional("columns", input_columns()),
            ]),
        ),
        Field::optional(
            "relational_table",
            N::object(vec![
                Field::required("data_source_arn", N::string()),
                Field::optional("catalog", N::string()),
                Field::optional("schema", N::string()),
                Field::required("name", N::string()),
                Field::required("input_columns", input_columns()),
            ]),
        ),
        Field::optional(
            "s3_source",
            N::object(vec![
                Field::required("data_source_arn", N::string()),
                Field::required("input_columns", input_columns()),
                Field::optional(
                    "upload_settings",
                    N::object(vec![
                        Field::optional("format", N::string()),
                        Field::optional("contains_header", N::bool()),
                        Field::optional("start_from_row", N::int()),
                        Field::optional("delimiter", N::string()),
                        Field::optional("text_qualifier", N::string()),
                    ]),
                ),
            ]),
        ),
    ])
}

fn logical_table() -> N {
    N::object(vec![
        Field::required("alias", N::string()),
        Field::required(
            "source",
            N::variant(vec![
                Field::optional("data_set_arn", N::string()),
                Field::optional("physical_table_id", N::string()),
                Field::optional(
                    "join_instruction",
                    N::object(vec![
                        Field::required("left_operand", N::string()),
                        Field::required("right_operand", N::string()),
                        Field::required("type", N::string()),
                        Field::required("on_clause", N::string()),
                    ]),
                ),
            ]),
        ),
        Field::optional("data_transforms", N::list(transform_operation())),
    ])
}

fn transform_operation() -> N {
    N::variant(vec![
        Field::optional(
            "cast_column_type_operation",
            N::object(vec![
                Field::required("column_name", N::string()),
                Field::required("new_column_type", N::string()),
                Field::optional("format", N::string()),
            ]),
        ),
        Field::optional(
            "create_columns_operation",
            N::object(vec![Field::required(
                "columns",
                N::list(N::object(vec![
                    Field::required("column_id", N::string()),
                    Field::required("column_name", N::string()),
                    Field::required("expression", N::string()),
                ])),
            )]),
        ),
        Field::optional(
            "filter_operation",
            N::object(vec![Field::required("condition_expression", N::string())]),
        ),
        Field::optional(
            "project_operation",
            N::object(vec![Field::required("projected_columns", N::list(N::string()))]),
        ),
        Field::optional(
            "rename_column_operation",
            N::object(vec![
                Field::required("column_name", N::string()),
                Field::required("new_column_name", N::string()),
            ]),
        ),
    ])
}

fn column_group() -> N {
    N::object(vec![Field::optional(
        "geo_spatial_column_group",
        N::object(vec![
            Field::required("name", N::string()),
            Field::required("country_code", N::string()),
            Field::required("columns", N::list(N::string())),
        ]),
    )])
}

fn refresh_properties() -> N {
    N::object(vec![Field::required(
        "refresh_configuration",
        N::object(vec![Field::required(
            "incremental_refresh",
            N::object(vec![Field::required(
                "lookback_window",
                N::object(vec![
                    Field::required("column_name", N::string()),
                    Field::required("size", N::int()),
                    Field::required("size_unit", N::string()),
                ]),
            )]),
        )]),
    )])
}
