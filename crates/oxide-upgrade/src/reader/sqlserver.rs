//! Microsoft SQL Server catalog reader.

use oxide_db::schema::{Column, DefaultValue};

use super::{schema_condition, table_filter, MetadataReader};

/// Reads SQL Server's `INFORMATION_SCHEMA` and `sys` views.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlServerReader;

impl MetadataReader for SqlServerReader {
    fn default_schema_sql(&self) -> Option<String> {
        Some("SELECT SCHEMA_NAME() AS SCHEMA_NAME".to_string())
    }

    fn tables_sql(&self, schema: &str) -> String {
        format!(
            "SELECT t.TABLE_NAME AS TABLE_NAME, CAST(p.value AS NVARCHAR(4000)) AS REMARKS \
             FROM INFORMATION_SCHEMA.TABLES t \
             LEFT JOIN sys.extended_properties p \
             ON p.major_id = OBJECT_ID(QUOTENAME(t.TABLE_SCHEMA) + '.' + QUOTENAME(t.TABLE_NAME)) \
             AND p.minor_id = 0 AND p.name = 'MS_Description' \
             WHERE t.TABLE_SCHEMA {} AND t.TABLE_TYPE IN ('BASE TABLE', 'VIEW') \
             ORDER BY t.TABLE_NAME",
            schema_condition(schema)
        )
    }

    fn columns_sql(&self, schema: &str, table: Option<&str>) -> String {
        format!(
            "SELECT c.TABLE_NAME AS TABLE_NAME, c.COLUMN_NAME AS COLUMN_NAME, \
             c.DATA_TYPE AS TYPE_NAME, \
             CAST(CASE c.CHARACTER_MAXIMUM_LENGTH WHEN -1 THEN 4294967295 \
             ELSE COALESCE(c.CHARACTER_MAXIMUM_LENGTH, c.NUMERIC_PRECISION) END AS BIGINT) AS COLUMN_SIZE, \
             CAST(c.NUMERIC_SCALE AS BIGINT) AS DECIMAL_DIGITS, c.IS_NULLABLE AS IS_NULLABLE, \
             c.COLUMN_DEFAULT AS COLUMN_DEF, \
             CASE COLUMNPROPERTY(OBJECT_ID(QUOTENAME(c.TABLE_SCHEMA) + '.' + QUOTENAME(c.TABLE_NAME)), \
             c.COLUMN_NAME, 'IsIdentity') WHEN 1 THEN 'YES' ELSE 'NO' END AS IS_AUTOINCREMENT, \
             CAST(p.value AS NVARCHAR(4000)) AS REMARKS \
             FROM INFORMATION_SCHEMA.COLUMNS c \
             LEFT JOIN sys.extended_properties p \
             ON p.major_id = OBJECT_ID(QUOTENAME(c.TABLE_SCHEMA) + '.' + QUOTENAME(c.TABLE_NAME)) \
             AND p.minor_id = COLUMNPROPERTY(p.major_id, c.COLUMN_NAME, 'ColumnId') \
             AND p.name = 'MS_Description' \
             WHERE c.TABLE_SCHEMA {}{} \
             ORDER BY c.TABLE_NAME, c.ORDINAL_POSITION",
            schema_condition(schema),
            table_filter("c.TABLE_NAME", table)
        )
    }

    fn primary_keys_sql(&self, schema: &str, table: Option<&str>) -> String {
        format!(
            "SELECT tc.TABLE_NAME AS TABLE_NAME, k.COLUMN_NAME AS COLUMN_NAME, \
             tc.CONSTRAINT_NAME AS PK_NAME \
             FROM INFORMATION_SCHEMA.TABLE_CONSTRAINTS tc \
             JOIN INFORMATION_SCHEMA.KEY_COLUMN_USAGE k \
             ON k.CONSTRAINT_SCHEMA = tc.CONSTRAINT_SCHEMA AND k.CONSTRAINT_NAME = tc.CONSTRAINT_NAME \
             WHERE tc.CONSTRAINT_TYPE = 'PRIMARY KEY' AND tc.TABLE_SCHEMA {}{} \
             ORDER BY tc.TABLE_NAME, k.ORDINAL_POSITION",
            schema_condition(schema),
            table_filter("tc.TABLE_NAME", table)
        )
    }

    fn foreign_keys_sql(&self, schema: &str, table: Option<&str>) -> String {
        format!(
            "SELECT OBJECT_NAME(f.parent_object_id) AS TABLE_NAME, f.name AS FK_NAME, \
             COL_NAME(fc.parent_object_id, fc.parent_column_id) AS FKCOLUMN_NAME, \
             OBJECT_NAME(f.referenced_object_id) AS PKTABLE_NAME, \
             COL_NAME(fc.referenced_object_id, fc.referenced_column_id) AS PKCOLUMN_NAME, \
             REPLACE(f.update_referential_action_desc, '_', ' ') AS UPDATE_RULE, \
             REPLACE(f.delete_referential_action_desc, '_', ' ') AS DELETE_RULE \
             FROM sys.foreign_keys f \
             JOIN sys.foreign_key_columns fc ON fc.constraint_object_id = f.object_id \
             WHERE SCHEMA_NAME(f.schema_id) {}{} \
             ORDER BY f.name, fc.constraint_column_id",
            schema_condition(schema),
            table_filter("OBJECT_NAME(f.parent_object_id)", table)
        )
    }

    fn indexes_sql(&self, schema: &str, table: Option<&str>) -> String {
        format!(
            "SELECT t.name AS TABLE_NAME, i.name AS INDEX_NAME, \
             CASE i.is_unique WHEN 1 THEN 0 ELSE 1 END AS NON_UNIQUE, c.name AS COLUMN_NAME \
             FROM sys.indexes i \
             JOIN sys.tables t ON t.object_id = i.object_id \
             JOIN sys.index_columns ic ON ic.object_id = i.object_id AND ic.index_id = i.index_id \
             JOIN sys.columns c ON c.object_id = ic.object_id AND c.column_id = ic.column_id \
             WHERE i.name IS NOT NULL AND ic.is_included_column = 0 \
             AND SCHEMA_NAME(t.schema_id) {}{} \
             ORDER BY t.name, i.name, ic.key_ordinal",
            schema_condition(schema),
            table_filter("t.name", table)
        )
    }

    fn sequences_sql(&self, schema: &str) -> Option<String> {
        Some(format!(
            "SELECT name AS SEQUENCE_NAME, CAST(start_value AS BIGINT) AS START_VALUE, \
             CAST(increment AS BIGINT) AS INCREMENT, CAST(minimum_value AS BIGINT) AS MIN_VALUE, \
             CAST(maximum_value AS BIGINT) AS MAX_VALUE, CAST(cache_size AS BIGINT) AS CACHE_SIZE, \
             is_cycling AS CYCLE \
             FROM sys.sequences WHERE SCHEMA_NAME(schema_id) {} ORDER BY name",
            schema_condition(schema)
        ))
    }

    fn supports_read_all_primary_keys(&self) -> bool {
        false
    }

    fn supports_read_all_foreign_keys(&self) -> bool {
        false
    }

    fn supports_read_all_indexes(&self) -> bool {
        false
    }

    /// Defaults are stored wrapped in parentheses, e.g. `((0))`.
    fn default_value(&self, raw: &str, column: &Column) -> Option<DefaultValue> {
        Some(DefaultValue::from_literal(unwrap_parens(raw), column.type_code))
            .filter(|d| !d.is_null())
    }
}

fn unwrap_parens(raw: &str) -> &str {
    let mut value = raw.trim();
    while let Some(inner) = value.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        if !balanced(inner) {
            break;
        }
        value = inner.trim();
    }
    value
}

/// Whether no closing parenthesis in `value` lacks its opening one.
fn balanced(value: &str) -> bool {
    let mut depth = 0_i32;
    for c in value.chars() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}
