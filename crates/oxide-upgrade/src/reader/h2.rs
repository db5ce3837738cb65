//! H2 catalog reader.

use oxide_db::schema::{Column, DefaultValue};

use super::{schema_condition, table_filter, MetadataReader};

/// Reads H2's `INFORMATION_SCHEMA`.
#[derive(Debug, Clone, Copy, Default)]
pub struct H2Reader;

impl MetadataReader for H2Reader {
    fn default_schema_sql(&self) -> Option<String> {
        Some("SELECT CURRENT_SCHEMA AS SCHEMA_NAME".to_string())
    }

    fn tables_sql(&self, schema: &str) -> String {
        format!(
            "SELECT TABLE_NAME AS TABLE_NAME, REMARKS AS REMARKS \
             FROM INFORMATION_SCHEMA.TABLES \
             WHERE TABLE_SCHEMA {} AND TABLE_TYPE IN ('BASE TABLE', 'VIEW') \
             ORDER BY TABLE_NAME",
            schema_condition(schema)
        )
    }

    fn columns_sql(&self, schema: &str, table: Option<&str>) -> String {
        format!(
            "SELECT TABLE_NAME AS TABLE_NAME, COLUMN_NAME AS COLUMN_NAME, \
             DATA_TYPE AS TYPE_NAME, \
             COALESCE(CHARACTER_MAXIMUM_LENGTH, NUMERIC_PRECISION) AS COLUMN_SIZE, \
             NUMERIC_SCALE AS DECIMAL_DIGITS, IS_NULLABLE AS IS_NULLABLE, \
             COLUMN_DEFAULT AS COLUMN_DEF, IS_IDENTITY AS IS_AUTOINCREMENT, REMARKS AS REMARKS \
             FROM INFORMATION_SCHEMA.COLUMNS \
             WHERE TABLE_SCHEMA {}{} \
             ORDER BY TABLE_NAME, ORDINAL_POSITION",
            schema_condition(schema),
            table_filter("TABLE_NAME", table)
        )
    }

    fn primary_keys_sql(&self, schema: &str, table: Option<&str>) -> String {
        format!(
            "SELECT c.TABLE_NAME AS TABLE_NAME, k.COLUMN_NAME AS COLUMN_NAME, \
             c.CONSTRAINT_NAME AS PK_NAME \
             FROM INFORMATION_SCHEMA.TABLE_CONSTRAINTS c \
             JOIN INFORMATION_SCHEMA.KEY_COLUMN_USAGE k \
             ON k.CONSTRAINT_SCHEMA = c.CONSTRAINT_SCHEMA AND k.CONSTRAINT_NAME = c.CONSTRAINT_NAME \
             WHERE c.CONSTRAINT_TYPE = 'PRIMARY KEY' AND c.TABLE_SCHEMA {}{} \
             ORDER BY c.TABLE_NAME, k.ORDINAL_POSITION",
            schema_condition(schema),
            table_filter("c.TABLE_NAME", table)
        )
    }

    fn foreign_keys_sql(&self, schema: &str, table: Option<&str>) -> String {
        format!(
            "SELECT k.TABLE_NAME AS TABLE_NAME, k.CONSTRAINT_NAME AS FK_NAME, \
             k.COLUMN_NAME AS FKCOLUMN_NAME, p.TABLE_NAME AS PKTABLE_NAME, \
             p.COLUMN_NAME AS PKCOLUMN_NAME, r.UPDATE_RULE AS UPDATE_RULE, \
             r.DELETE_RULE AS DELETE_RULE \
             FROM INFORMATION_SCHEMA.REFERENTIAL_CONSTRAINTS r \
             JOIN INFORMATION_SCHEMA.KEY_COLUMN_USAGE k \
             ON k.CONSTRAINT_SCHEMA = r.CONSTRAINT_SCHEMA AND k.CONSTRAINT_NAME = r.CONSTRAINT_NAME \
             JOIN INFORMATION_SCHEMA.KEY_COLUMN_USAGE p \
             ON p.CONSTRAINT_SCHEMA = r.UNIQUE_CONSTRAINT_SCHEMA \
             AND p.CONSTRAINT_NAME = r.UNIQUE_CONSTRAINT_NAME \
             AND p.ORDINAL_POSITION = k.POSITION_IN_UNIQUE_CONSTRAINT \
             WHERE k.TABLE_SCHEMA {}{} \
             ORDER BY k.TABLE_NAME, k.CONSTRAINT_NAME, k.ORDINAL_POSITION",
            schema_condition(schema),
            table_filter("k.TABLE_NAME", table)
        )
    }

    fn indexes_sql(&self, schema: &str, table: Option<&str>) -> String {
        format!(
            "SELECT i.TABLE_NAME AS TABLE_NAME, i.INDEX_NAME AS INDEX_NAME, \
             CASE WHEN i.INDEX_TYPE_NAME IN ('UNIQUE INDEX', 'PRIMARY KEY') THEN FALSE ELSE TRUE END AS NON_UNIQUE, \
             c.COLUMN_NAME AS COLUMN_NAME \
             FROM INFORMATION_SCHEMA.INDEXES i \
             JOIN INFORMATION_SCHEMA.INDEX_COLUMNS c \
             ON c.INDEX_SCHEMA = i.INDEX_SCHEMA AND c.INDEX_NAME = i.INDEX_NAME \
             WHERE i.TABLE_SCHEMA {}{} \
             ORDER BY i.TABLE_NAME, i.INDEX_NAME, c.ORDINAL_POSITION",
            schema_condition(schema),
            table_filter("i.TABLE_NAME", table)
        )
    }

    fn sequences_sql(&self, schema: &str) -> Option<String> {
        Some(format!(
            "SELECT SEQUENCE_NAME AS SEQUENCE_NAME, START_VALUE AS START_VALUE, \
             INCREMENT AS INCREMENT, MINIMUM_VALUE AS MIN_VALUE, MAXIMUM_VALUE AS MAX_VALUE, \
             CACHE AS CACHE_SIZE, CYCLE_OPTION AS CYCLE \
             FROM INFORMATION_SCHEMA.SEQUENCES WHERE SEQUENCE_SCHEMA {} \
             ORDER BY SEQUENCE_NAME",
            schema_condition(schema)
        ))
    }

    /// Identity defaults are reported as `NEXT VALUE FOR` expressions.
    fn default_value(&self, raw: &str, column: &Column) -> Option<DefaultValue> {
        if raw.to_ascii_uppercase().starts_with("NEXT VALUE FOR") {
            return None;
        }
        Some(DefaultValue::from_literal(raw, column.type_code)).filter(|d| !d.is_null())
    }
}

#[cfg(test)]
mod tests {
    use oxide_db::dialect::H2Dialect;
    use oxide_db::schema::TypeCode;

    use super::*;
    use crate::connection::Row;
    use crate::reader::tests::{column_row, ScriptedConnection};
    use crate::reader::SchemaReader;

    #[tokio::test]
    async fn test_read_h2_schema() {
        let conn = ScriptedConnection::new("H2")
            .on("CURRENT_SCHEMA", vec![Row::new().with("SCHEMA_NAME", "PUBLIC")])
            .on("INFORMATION_SCHEMA.TABLES", vec![Row::new().with("TABLE_NAME", "ITEMS")])
            .on(
                "INFORMATION_SCHEMA.COLUMNS",
                vec![
                    column_row("ITEMS", "ID", "BIGINT")
                        .with("IS_NULLABLE", "NO")
                        .with("IS_AUTOINCREMENT", "YES")
                        .with("COLUMN_DEF", "NEXT VALUE FOR PUBLIC.SYSTEM_SEQUENCE_1"),
                    column_row("ITEMS", "LABEL", "CHARACTER VARYING")
                        .with("COLUMN_SIZE", 30_i64)
                        .with("COLUMN_DEF", "'x'"),
                ],
            )
            .on(
                "CONSTRAINT_TYPE = 'PRIMARY KEY'",
                vec![Row::new()
                    .with("TABLE_NAME", "ITEMS")
                    .with("COLUMN_NAME", "ID")
                    .with("PK_NAME", "CONSTRAINT_4")],
            )
            .on(
                "INFORMATION_SCHEMA.INDEXES",
                vec![Row::new()
                    .with("TABLE_NAME", "ITEMS")
                    .with("INDEX_NAME", "PRIMARY_KEY_4")
                    .with("NON_UNIQUE", false)
                    .with("COLUMN_NAME", "ID")],
            )
            .on(
                "INFORMATION_SCHEMA.SEQUENCES",
                vec![
                    Row::new().with("SEQUENCE_NAME", "SYSTEM_SEQUENCE_1"),
                    Row::new()
                        .with("SEQUENCE_NAME", "ITEM_SEQ")
                        .with("START_VALUE", 100_i64)
                        .with("CYCLE", "NO"),
                ],
            );

        let dialect = H2Dialect::new().unwrap();
        let schema = SchemaReader::new(&dialect, &H2Reader)
            .read_schema(&conn, None, None)
            .await
            .unwrap();

        let items = schema.find_table("ITEMS").unwrap();
        assert!(items.indexes.is_empty());
        let id = items.find_column("ID").unwrap();
        assert!(id.auto_increment && id.primary_key);
        assert!(!id.unique);
        assert_eq!(id.default, None);
        let label = items.find_column("LABEL").unwrap();
        assert_eq!(label.type_code, TypeCode::Varchar);
        assert_eq!(label.length, Some(30));
        assert_eq!(label.default, Some(DefaultValue::Text("x".into())));

        assert_eq!(schema.sequences.len(), 1);
        assert_eq!(schema.sequences[0].start, Some(100));
        assert_eq!(schema.sequences[0].cycle, Some(false));
    }
}
