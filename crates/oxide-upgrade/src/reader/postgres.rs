//! PostgreSQL catalog reader.

use oxide_db::schema::{Column, DefaultValue};

use super::{schema_condition, table_filter, MetadataReader};

/// Reads `information_schema` and `pg_catalog`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresReader;

impl MetadataReader for PostgresReader {
    fn default_schema_sql(&self) -> Option<String> {
        Some("SELECT current_schema() AS SCHEMA_NAME".to_string())
    }

    fn tables_sql(&self, schema: &str) -> String {
        format!(
            "SELECT t.table_name AS TABLE_NAME, \
             obj_description(format('%I.%I', t.table_schema, t.table_name)::regclass, 'pg_class') AS REMARKS \
             FROM information_schema.tables t \
             WHERE t.table_schema {} AND t.table_type IN ('BASE TABLE', 'VIEW') \
             ORDER BY t.table_name",
            schema_condition(schema)
        )
    }

    fn columns_sql(&self, schema: &str, table: Option<&str>) -> String {
        format!(
            "SELECT c.table_name AS TABLE_NAME, c.column_name AS COLUMN_NAME, \
             c.udt_name::text AS TYPE_NAME, \
             COALESCE(c.character_maximum_length, c.numeric_precision)::bigint AS COLUMN_SIZE, \
             c.numeric_scale::bigint AS DECIMAL_DIGITS, c.is_nullable::text AS IS_NULLABLE, \
             c.column_default::text AS COLUMN_DEF, \
             CASE WHEN c.is_identity = 'YES' THEN 'YES' ELSE 'NO' END AS IS_AUTOINCREMENT, \
             col_description(format('%I.%I', c.table_schema, c.table_name)::regclass, c.ordinal_position::int) AS REMARKS \
             FROM information_schema.columns c \
             WHERE c.table_schema {}{} \
             ORDER BY c.table_name, c.ordinal_position",
            schema_condition(schema),
            table_filter("c.table_name", table)
        )
    }

    fn primary_keys_sql(&self, schema: &str, table: Option<&str>) -> String {
        format!(
            "SELECT tc.table_name AS TABLE_NAME, k.column_name AS COLUMN_NAME, \
             tc.constraint_name AS PK_NAME \
             FROM information_schema.table_constraints tc \
             JOIN information_schema.key_column_usage k \
             ON k.constraint_schema = tc.constraint_schema AND k.constraint_name = tc.constraint_name \
             AND k.table_name = tc.table_name \
             WHERE tc.constraint_type = 'PRIMARY KEY' AND tc.table_schema {}{} \
             ORDER BY tc.table_name, k.ordinal_position",
            schema_condition(schema),
            table_filter("tc.table_name", table)
        )
    }

    fn foreign_keys_sql(&self, schema: &str, table: Option<&str>) -> String {
        format!(
            "SELECT k.table_name AS TABLE_NAME, k.constraint_name AS FK_NAME, \
             k.column_name AS FKCOLUMN_NAME, p.table_name AS PKTABLE_NAME, \
             p.column_name AS PKCOLUMN_NAME, rc.update_rule::text AS UPDATE_RULE, \
             rc.delete_rule::text AS DELETE_RULE \
             FROM information_schema.referential_constraints rc \
             JOIN information_schema.key_column_usage k \
             ON k.constraint_schema = rc.constraint_schema AND k.constraint_name = rc.constraint_name \
             JOIN information_schema.key_column_usage p \
             ON p.constraint_schema = rc.unique_constraint_schema \
             AND p.constraint_name = rc.unique_constraint_name \
             AND p.ordinal_position = k.position_in_unique_constraint \
             WHERE k.table_schema {}{} \
             ORDER BY k.table_name, k.constraint_name, k.ordinal_position",
            schema_condition(schema),
            table_filter("k.table_name", table)
        )
    }

    fn indexes_sql(&self, schema: &str, table: Option<&str>) -> String {
        format!(
            "SELECT t.relname AS TABLE_NAME, i.relname AS INDEX_NAME, \
             NOT ix.indisunique AS NON_UNIQUE, a.attname AS COLUMN_NAME \
             FROM pg_index ix \
             JOIN pg_class t ON t.oid = ix.indrelid \
             JOIN pg_class i ON i.oid = ix.indexrelid \
             JOIN pg_namespace n ON n.oid = t.relnamespace \
             CROSS JOIN LATERAL unnest(ix.indkey) WITH ORDINALITY AS k(attnum, ord) \
             JOIN pg_attribute a ON a.attrelid = t.oid AND a.attnum = k.attnum \
             WHERE n.nspname {}{} \
             ORDER BY t.relname, i.relname, k.ord",
            schema_condition(schema),
            table_filter("t.relname", table)
        )
    }

    fn sequences_sql(&self, schema: &str) -> Option<String> {
        Some(format!(
            "SELECT sequencename AS SEQUENCE_NAME, start_value AS START_VALUE, \
             increment_by AS INCREMENT, min_value AS MIN_VALUE, max_value AS MAX_VALUE, \
             cache_size AS CACHE_SIZE, cycle AS CYCLE \
             FROM pg_sequences WHERE schemaname {} ORDER BY sequencename",
            schema_condition(schema)
        ))
    }

    /// Strips the `::type` casts the catalog adds to literals.
    fn default_value(&self, raw: &str, column: &Column) -> Option<DefaultValue> {
        Some(DefaultValue::from_literal(strip_casts(raw), column.type_code)).filter(|d| !d.is_null())
    }
}

fn strip_casts(raw: &str) -> &str {
    let mut value = raw.trim();
    while let Some(pos) = value.rfind("::") {
        // Casts inside a call or a quoted literal belong to them.
        if value[pos..].contains([')', '\'']) {
            break;
        }
        value = value[..pos].trim_end();
    }
    value
        .strip_prefix('(')
        .and_then(|v| v.strip_suffix(')'))
        .filter(|v| !v.contains('(') && !v.contains(')'))
        .unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use oxide_db::schema::TypeCode;

    use super::*;

    #[test]
    fn test_default_casts_are_stripped() {
        assert_eq!(strip_casts("'new'::character varying"), "'new'");
        assert_eq!(strip_casts("'2020-01-01'::date::text"), "'2020-01-01'");
        assert_eq!(strip_casts("(-1)::integer"), "-1");
        assert_eq!(strip_casts("'a::b'::text"), "'a::b'");
        assert_eq!(strip_casts("now()"), "now()");
        assert_eq!(strip_casts("nextval('s'::regclass)"), "nextval('s'::regclass)");
    }

    #[test]
    fn test_default_values() {
        let reader = PostgresReader;
        let amount = Column::new("amount", TypeCode::Decimal);
        assert_eq!(
            reader.default_value("0.50::numeric", &amount),
            Some(DefaultValue::Decimal("0.5".into()))
        );
        let name = Column::new("name", TypeCode::Varchar);
        assert_eq!(reader.default_value("NULL::character varying", &name), None);
    }

    #[test]
    fn test_single_table_queries_are_filtered() {
        let sql = PostgresReader.columns_sql("public", Some("users"));
        assert!(sql.contains("c.table_schema = 'public' AND c.table_name = 'users'"));
        assert!(!PostgresReader.indexes_sql("public", None).contains("relname ="));
    }
}
