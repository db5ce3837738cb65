//! SQLite catalog reader.
//!
//! Metadata comes from `sqlite_master` joined with the `pragma_*`
//! table-valued functions. Only the main database is read, whatever the
//! schema pattern.

use super::{table_filter, MetadataReader};

const USER_TABLES: &str = "m.type IN ('table', 'view') AND m.name NOT LIKE 'sqlite_%'";

/// Reads `sqlite_master` and the `pragma_*` functions.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteReader;

impl MetadataReader for SqliteReader {
    fn tables_sql(&self, _schema: &str) -> String {
        format!("SELECT m.name AS TABLE_NAME FROM sqlite_master m WHERE {USER_TABLES} ORDER BY m.name")
    }

    fn columns_sql(&self, _schema: &str, table: Option<&str>) -> String {
        format!(
            "SELECT m.name AS TABLE_NAME, p.name AS COLUMN_NAME, p.type AS TYPE_NAME, \
             CASE p.\"notnull\" WHEN 0 THEN 'YES' ELSE 'NO' END AS IS_NULLABLE, \
             p.dflt_value AS COLUMN_DEF, \
             CASE WHEN p.pk > 0 AND upper(m.sql) LIKE '%AUTOINCREMENT%' THEN 'YES' ELSE 'NO' END AS IS_AUTOINCREMENT \
             FROM sqlite_master m JOIN pragma_table_info(m.name) p \
             WHERE {USER_TABLES}{} \
             ORDER BY m.name, p.cid",
            table_filter("m.name", table)
        )
    }

    fn primary_keys_sql(&self, _schema: &str, table: Option<&str>) -> String {
        format!(
            "SELECT m.name AS TABLE_NAME, p.name AS COLUMN_NAME \
             FROM sqlite_master m JOIN pragma_table_info(m.name) p \
             WHERE m.type = 'table' AND m.name NOT LIKE 'sqlite_%' AND p.pk > 0{} \
             ORDER BY m.name, p.pk",
            table_filter("m.name", table)
        )
    }

    fn foreign_keys_sql(&self, _schema: &str, table: Option<&str>) -> String {
        format!(
            "SELECT m.name AS TABLE_NAME, 'fk_' || m.name || '_' || f.id AS FK_NAME, \
             f.\"from\" AS FKCOLUMN_NAME, f.\"table\" AS PKTABLE_NAME, f.\"to\" AS PKCOLUMN_NAME, \
             f.on_update AS UPDATE_RULE, f.on_delete AS DELETE_RULE \
             FROM sqlite_master m JOIN pragma_foreign_key_list(m.name) f \
             WHERE m.type = 'table' AND m.name NOT LIKE 'sqlite_%'{} \
             ORDER BY m.name, f.id, f.seq",
            table_filter("m.name", table)
        )
    }

    fn indexes_sql(&self, _schema: &str, table: Option<&str>) -> String {
        format!(
            "SELECT m.name AS TABLE_NAME, l.name AS INDEX_NAME, \
             CASE l.\"unique\" WHEN 0 THEN 1 ELSE 0 END AS NON_UNIQUE, i.name AS COLUMN_NAME \
             FROM sqlite_master m JOIN pragma_index_list(m.name) l \
             JOIN pragma_index_info(l.name) i \
             WHERE m.type = 'table' AND m.name NOT LIKE 'sqlite_%'{} \
             ORDER BY m.name, l.name, i.seqno",
            table_filter("m.name", table)
        )
    }
}
