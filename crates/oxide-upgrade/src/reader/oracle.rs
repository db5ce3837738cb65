//! Oracle catalog reader.

use oxide_db::schema::{Column, TypeFamily};

use super::{schema_condition, table_filter, MetadataReader};

/// Precision Oracle applies to a `NUMBER` declared without one.
const NUMBER_PRECISION: u32 = 38;

/// Reads Oracle's `ALL_*` dictionary views.
#[derive(Debug, Clone, Copy, Default)]
pub struct OracleReader;

impl MetadataReader for OracleReader {
    fn default_schema_sql(&self) -> Option<String> {
        Some("SELECT SYS_CONTEXT('USERENV', 'CURRENT_SCHEMA') AS SCHEMA_NAME FROM DUAL".to_string())
    }

    fn tables_sql(&self, schema: &str) -> String {
        format!(
            "SELECT t.TABLE_NAME AS TABLE_NAME, c.COMMENTS AS REMARKS \
             FROM ALL_TABLES t \
             LEFT JOIN ALL_TAB_COMMENTS c ON c.OWNER = t.OWNER AND c.TABLE_NAME = t.TABLE_NAME \
             WHERE t.OWNER {0} AND t.TABLE_NAME NOT LIKE 'BIN$%' \
             UNION ALL \
             SELECT v.VIEW_NAME, NULL FROM ALL_VIEWS v WHERE v.OWNER {0} \
             ORDER BY 1",
            schema_condition(schema)
        )
    }

    fn columns_sql(&self, schema: &str, table: Option<&str>) -> String {
        format!(
            "SELECT c.TABLE_NAME AS TABLE_NAME, c.COLUMN_NAME AS COLUMN_NAME, \
             c.DATA_TYPE AS TYPE_NAME, \
             CASE WHEN c.DATA_TYPE = 'NUMBER' THEN c.DATA_PRECISION \
             WHEN c.CHAR_LENGTH > 0 THEN c.CHAR_LENGTH ELSE c.DATA_LENGTH END AS COLUMN_SIZE, \
             c.DATA_SCALE AS DECIMAL_DIGITS, \
             CASE c.NULLABLE WHEN 'Y' THEN 'YES' ELSE 'NO' END AS IS_NULLABLE, \
             c.DATA_DEFAULT AS COLUMN_DEF, \
             CASE c.IDENTITY_COLUMN WHEN 'YES' THEN 'YES' ELSE 'NO' END AS IS_AUTOINCREMENT, \
             m.COMMENTS AS REMARKS \
             FROM ALL_TAB_COLUMNS c \
             LEFT JOIN ALL_COL_COMMENTS m ON m.OWNER = c.OWNER AND m.TABLE_NAME = c.TABLE_NAME \
             AND m.COLUMN_NAME = c.COLUMN_NAME \
             WHERE c.OWNER {}{} \
             ORDER BY c.TABLE_NAME, c.COLUMN_ID",
            schema_condition(schema),
            table_filter("c.TABLE_NAME", table)
        )
    }

    fn primary_keys_sql(&self, schema: &str, table: Option<&str>) -> String {
        format!(
            "SELECT c.TABLE_NAME AS TABLE_NAME, k.COLUMN_NAME AS COLUMN_NAME, \
             c.CONSTRAINT_NAME AS PK_NAME \
             FROM ALL_CONSTRAINTS c \
             JOIN ALL_CONS_COLUMNS k ON k.OWNER = c.OWNER AND k.CONSTRAINT_NAME = c.CONSTRAINT_NAME \
             WHERE c.CONSTRAINT_TYPE = 'P' AND c.OWNER {}{} \
             ORDER BY c.TABLE_NAME, k.POSITION",
            schema_condition(schema),
            table_filter("c.TABLE_NAME", table)
        )
    }

    fn foreign_keys_sql(&self, schema: &str, table: Option<&str>) -> String {
        format!(
            "SELECT c.TABLE_NAME AS TABLE_NAME, c.CONSTRAINT_NAME AS FK_NAME, \
             k.COLUMN_NAME AS FKCOLUMN_NAME, r.TABLE_NAME AS PKTABLE_NAME, \
             rk.COLUMN_NAME AS PKCOLUMN_NAME, 'NO ACTION' AS UPDATE_RULE, \
             c.DELETE_RULE AS DELETE_RULE \
             FROM ALL_CONSTRAINTS c \
             JOIN ALL_CONS_COLUMNS k ON k.OWNER = c.OWNER AND k.CONSTRAINT_NAME = c.CONSTRAINT_NAME \
             JOIN ALL_CONSTRAINTS r ON r.OWNER = c.R_OWNER AND r.CONSTRAINT_NAME = c.R_CONSTRAINT_NAME \
             JOIN ALL_CONS_COLUMNS rk ON rk.OWNER = r.OWNER AND rk.CONSTRAINT_NAME = r.CONSTRAINT_NAME \
             AND rk.POSITION = k.POSITION \
             WHERE c.CONSTRAINT_TYPE = 'R' AND c.OWNER {}{} \
             ORDER BY c.TABLE_NAME, c.CONSTRAINT_NAME, k.POSITION",
            schema_condition(schema),
            table_filter("c.TABLE_NAME", table)
        )
    }

    fn indexes_sql(&self, schema: &str, table: Option<&str>) -> String {
        format!(
            "SELECT i.TABLE_NAME AS TABLE_NAME, i.INDEX_NAME AS INDEX_NAME, \
             CASE i.UNIQUENESS WHEN 'UNIQUE' THEN 0 ELSE 1 END AS NON_UNIQUE, \
             c.COLUMN_NAME AS COLUMN_NAME \
             FROM ALL_INDEXES i \
             JOIN ALL_IND_COLUMNS c ON c.INDEX_OWNER = i.OWNER AND c.INDEX_NAME = i.INDEX_NAME \
             WHERE i.TABLE_OWNER {}{} \
             ORDER BY i.TABLE_NAME, i.INDEX_NAME, c.COLUMN_POSITION",
            schema_condition(schema),
            table_filter("i.TABLE_NAME", table)
        )
    }

    /// The dictionary keeps no start value, so it is never compared.
    fn sequences_sql(&self, schema: &str) -> Option<String> {
        Some(format!(
            "SELECT SEQUENCE_NAME AS SEQUENCE_NAME, NULL AS START_VALUE, \
             INCREMENT_BY AS INCREMENT, MIN_VALUE AS MIN_VALUE, \
             LEAST(MAX_VALUE, 9223372036854775807) AS MAX_VALUE, CACHE_SIZE AS CACHE_SIZE, \
             CYCLE_FLAG AS CYCLE \
             FROM ALL_SEQUENCES WHERE SEQUENCE_OWNER {} ORDER BY SEQUENCE_NAME",
            schema_condition(schema)
        ))
    }

    fn adjust_column(&self, column: &mut Column) {
        if column.type_code.family() == TypeFamily::Exact && column.precision.is_none() {
            column.precision = Some(NUMBER_PRECISION);
        }
    }
}
