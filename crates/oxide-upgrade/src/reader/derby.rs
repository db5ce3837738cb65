//! Apache Derby catalog reader.
//!
//! Derby exposes the JDBC metadata result sets through `SYSIBM`
//! procedures. Keys and indexes can only be read one table at a time.

use oxide_db::schema::{Column, DefaultValue};

use super::{literal, schema_condition, MetadataReader};

/// Reads Derby's system tables and `SYSIBM` metadata procedures.
#[derive(Debug, Clone, Copy, Default)]
pub struct DerbyReader;

fn table_pattern(table: Option<&str>) -> String {
    literal(table.unwrap_or("%"))
}

impl MetadataReader for DerbyReader {
    fn default_schema_sql(&self) -> Option<String> {
        Some("SELECT CURRENT SCHEMA AS SCHEMA_NAME FROM SYSIBM.SYSDUMMY1".to_string())
    }

    fn tables_sql(&self, schema: &str) -> String {
        format!(
            "SELECT t.TABLENAME AS TABLE_NAME FROM SYS.SYSTABLES t \
             JOIN SYS.SYSSCHEMAS s ON s.SCHEMAID = t.SCHEMAID \
             WHERE s.SCHEMANAME {} AND t.TABLETYPE IN ('T', 'V') \
             ORDER BY t.TABLENAME",
            schema_condition(schema)
        )
    }

    fn columns_sql(&self, schema: &str, table: Option<&str>) -> String {
        format!(
            "CALL SYSIBM.SQLCOLUMNS(NULL, {}, {}, '%', 'DATATYPE=''JDBC''')",
            literal(schema),
            table_pattern(table)
        )
    }

    fn primary_keys_sql(&self, schema: &str, table: Option<&str>) -> String {
        format!(
            "CALL SYSIBM.SQLPRIMARYKEYS(NULL, {}, {}, NULL)",
            literal(schema),
            table_pattern(table)
        )
    }

    fn foreign_keys_sql(&self, schema: &str, table: Option<&str>) -> String {
        format!(
            "CALL SYSIBM.SQLFOREIGNKEYS(NULL, NULL, NULL, NULL, {}, {}, 'IMPORTEDKEY=1')",
            literal(schema),
            table_pattern(table)
        )
    }

    fn indexes_sql(&self, schema: &str, table: Option<&str>) -> String {
        format!(
            "CALL SYSIBM.SQLSTATISTICS(NULL, {}, {}, 0, 1, NULL)",
            literal(schema),
            table_pattern(table)
        )
    }

    fn sequences_sql(&self, schema: &str) -> Option<String> {
        Some(format!(
            "SELECT q.SEQUENCENAME AS SEQUENCE_NAME, q.STARTVALUE AS START_VALUE, \
             q.INCREMENT AS INCREMENT, q.MINIMUMVALUE AS MIN_VALUE, \
             q.MAXIMUMVALUE AS MAX_VALUE, q.CYCLEOPTION AS CYCLE \
             FROM SYS.SYSSEQUENCES q JOIN SYS.SYSSCHEMAS s ON s.SCHEMAID = q.SCHEMAID \
             WHERE s.SCHEMANAME {} ORDER BY q.SEQUENCENAME",
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

    /// Identity columns report `GENERATED_BY_DEFAULT` or an
    /// `AUTOINCREMENT:` description as their default.
    fn default_value(&self, raw: &str, column: &Column) -> Option<DefaultValue> {
        let upper = raw.to_ascii_uppercase();
        if upper.starts_with("GENERATED_") || upper.starts_with("AUTOINCREMENT") {
            return None;
        }
        Some(DefaultValue::from_literal(raw, column.type_code)).filter(|d| !d.is_null())
    }
}
