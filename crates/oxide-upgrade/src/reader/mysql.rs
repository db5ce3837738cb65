//! MySQL and MariaDB catalog reader.

use super::{schema_condition, table_filter, MetadataReader};

/// Reads MySQL's `information_schema`. MySQL has no sequences.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlReader;

impl MetadataReader for MySqlReader {
    fn default_schema_sql(&self) -> Option<String> {
        Some("SELECT DATABASE() AS SCHEMA_NAME".to_string())
    }

    fn tables_sql(&self, schema: &str) -> String {
        format!(
            "SELECT TABLE_NAME AS TABLE_NAME, TABLE_COMMENT AS REMARKS \
             FROM information_schema.TABLES \
             WHERE TABLE_SCHEMA {} AND TABLE_TYPE IN ('BASE TABLE', 'VIEW') \
             ORDER BY TABLE_NAME",
            schema_condition(schema)
        )
    }

    fn columns_sql(&self, schema: &str, table: Option<&str>) -> String {
        format!(
            "SELECT TABLE_NAME AS TABLE_NAME, COLUMN_NAME AS COLUMN_NAME, \
             COLUMN_TYPE AS TYPE_NAME, \
             CAST(COALESCE(CHARACTER_MAXIMUM_LENGTH, NUMERIC_PRECISION) AS SIGNED) AS COLUMN_SIZE, \
             CAST(NUMERIC_SCALE AS SIGNED) AS DECIMAL_DIGITS, IS_NULLABLE AS IS_NULLABLE, \
             COLUMN_DEFAULT AS COLUMN_DEF, \
             CASE WHEN EXTRA LIKE '%auto_increment%' THEN 'YES' ELSE 'NO' END AS IS_AUTOINCREMENT, \
             COLUMN_COMMENT AS REMARKS \
             FROM information_schema.COLUMNS \
             WHERE TABLE_SCHEMA {}{} \
             ORDER BY TABLE_NAME, ORDINAL_POSITION",
            schema_condition(schema),
            table_filter("TABLE_NAME", table)
        )
    }

    fn primary_keys_sql(&self, schema: &str, table: Option<&str>) -> String {
        format!(
            "SELECT TABLE_NAME AS TABLE_NAME, COLUMN_NAME AS COLUMN_NAME, \
             CONSTRAINT_NAME AS PK_NAME \
             FROM information_schema.KEY_COLUMN_USAGE \
             WHERE CONSTRAINT_NAME = 'PRIMARY' AND TABLE_SCHEMA {}{} \
             ORDER BY TABLE_NAME, ORDINAL_POSITION",
            schema_condition(schema),
            table_filter("TABLE_NAME", table)
        )
    }

    fn foreign_keys_sql(&self, schema: &str, table: Option<&str>) -> String {
        format!(
            "SELECT k.TABLE_NAME AS TABLE_NAME, k.CONSTRAINT_NAME AS FK_NAME, \
             k.COLUMN_NAME AS FKCOLUMN_NAME, k.REFERENCED_TABLE_NAME AS PKTABLE_NAME, \
             k.REFERENCED_COLUMN_NAME AS PKCOLUMN_NAME, r.UPDATE_RULE AS UPDATE_RULE, \
             r.DELETE_RULE AS DELETE_RULE \
             FROM information_schema.KEY_COLUMN_USAGE k \
             JOIN information_schema.REFERENTIAL_CONSTRAINTS r \
             ON r.CONSTRAINT_SCHEMA = k.CONSTRAINT_SCHEMA AND r.CONSTRAINT_NAME = k.CONSTRAINT_NAME \
             WHERE k.REFERENCED_TABLE_NAME IS NOT NULL AND k.TABLE_SCHEMA {}{} \
             ORDER BY k.TABLE_NAME, k.CONSTRAINT_NAME, k.ORDINAL_POSITION",
            schema_condition(schema),
            table_filter("k.TABLE_NAME", table)
        )
    }

    fn indexes_sql(&self, schema: &str, table: Option<&str>) -> String {
        format!(
            "SELECT TABLE_NAME AS TABLE_NAME, INDEX_NAME AS INDEX_NAME, \
             CAST(NON_UNIQUE AS SIGNED) AS NON_UNIQUE, COLUMN_NAME AS COLUMN_NAME \
             FROM information_schema.STATISTICS \
             WHERE TABLE_SCHEMA {}{} \
             ORDER BY TABLE_NAME, INDEX_NAME, SEQ_IN_INDEX",
            schema_condition(schema),
            table_filter("TABLE_NAME", table)
        )
    }
}
