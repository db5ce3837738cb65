//! Live schema introspection.
//!
//! A vendor [`MetadataReader`] only describes how to ask the catalog:
//! the SQL for each kind of metadata, with result columns aliased to the
//! standard names (`TABLE_NAME`, `COLUMN_NAME`, `TYPE_NAME`, ...), plus a
//! few hooks. [`SchemaReader`] runs those queries over a
//! [`DbConnection`], assembles the [`Schema`] and removes the objects the
//! [`Dialect`] recognises as generated by the database itself.

mod derby;
mod h2;
mod mysql;
mod oracle;
mod postgres;
mod sqlite;
mod sqlserver;

pub use derby::DerbyReader;
pub use h2::H2Reader;
pub use mysql::MySqlReader;
pub use oracle::OracleReader;
pub use postgres::PostgresReader;
pub use sqlite::SqliteReader;
pub use sqlserver::SqlServerReader;

use std::fmt::Debug;

use oxide_db::dialect::{Dialect, Limit, LimitedSql};
use oxide_db::schema::{
    Column, DefaultValue, ForeignKey, ForeignKeyRule, Index, Schema, Sequence, Table, TableName,
    TypeCode, TypeFamily,
};
use oxide_db::types::NativeType;
use tracing::{debug, info};

use crate::connection::{DbConnection, Row, SqlValue};
use crate::error::{Result, UpgradeError};

/// Describes how to read schema metadata from one vendor's catalog.
///
/// `schema` arguments name one schema exactly unless they contain `%`,
/// in which case they are `LIKE` patterns; [`schema_condition`] renders
/// both forms. When `table` is set, the query
/// must be restricted to that table; this per-table form is used for the
/// metadata kinds whose bulk read the vendor does not support.
pub trait MetadataReader: Send + Sync + Debug {
    /// Query returning the current schema as `SCHEMA_NAME`. `None` uses
    /// the dialect's fixed default schema.
    fn default_schema_sql(&self) -> Option<String> {
        None
    }

    /// Tables and views: `TABLE_NAME`, optional `REMARKS`.
    fn tables_sql(&self, schema: &str) -> String;

    /// Columns in ordinal order: `TABLE_NAME`, `COLUMN_NAME`,
    /// `TYPE_NAME`, `COLUMN_SIZE`, `DECIMAL_DIGITS`, `IS_NULLABLE`,
    /// `COLUMN_DEF`, `IS_AUTOINCREMENT`, `REMARKS`.
    fn columns_sql(&self, schema: &str, table: Option<&str>) -> String;

    /// Primary key columns in key order: `TABLE_NAME`, `COLUMN_NAME`,
    /// `PK_NAME`.
    fn primary_keys_sql(&self, schema: &str, table: Option<&str>) -> String;

    /// Foreign key columns in key order: `TABLE_NAME` (or
    /// `FKTABLE_NAME`), `FK_NAME`, `FKCOLUMN_NAME`, `PKTABLE_NAME`,
    /// `PKCOLUMN_NAME`, `UPDATE_RULE`, `DELETE_RULE`. Rules are either
    /// standard codes or names.
    fn foreign_keys_sql(&self, schema: &str, table: Option<&str>) -> String;

    /// Index columns in index order: `TABLE_NAME`, `INDEX_NAME`,
    /// `NON_UNIQUE`, `COLUMN_NAME`.
    fn indexes_sql(&self, schema: &str, table: Option<&str>) -> String;

    /// Sequences: `SEQUENCE_NAME`, `START_VALUE`, `INCREMENT`,
    /// `MIN_VALUE`, `MAX_VALUE`, `CACHE_SIZE`, `CYCLE`.
    fn sequences_sql(&self, _schema: &str) -> Option<String> {
        None
    }

    /// Whether primary keys of all tables can be read in one query.
    fn supports_read_all_primary_keys(&self) -> bool {
        true
    }

    /// Whether foreign keys of all tables can be read in one query.
    fn supports_read_all_foreign_keys(&self) -> bool {
        true
    }

    /// Whether indexes of all tables can be read in one query.
    fn supports_read_all_indexes(&self) -> bool {
        true
    }

    /// Classifies a raw column default. `None` means no default.
    fn default_value(&self, raw: &str, column: &Column) -> Option<DefaultValue> {
        Some(DefaultValue::from_literal(raw, column.type_code)).filter(|d| !d.is_null())
    }

    /// Adjusts a column after it was built from its catalog row.
    fn adjust_column(&self, _column: &mut Column) {}
}

/// Renders a string literal for a catalog query.
pub(crate) fn literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Renders the comparison that selects `schema`: `= '<schema>'`, or
/// `LIKE '<schema>'` when it holds a `%` wildcard. `_` alone is taken
/// literally.
pub(crate) fn schema_condition(schema: &str) -> String {
    if is_pattern(schema) {
        format!("LIKE {}", literal(schema))
    } else {
        format!("= {}", literal(schema))
    }
}

fn is_pattern(schema: &str) -> bool {
    schema.contains('%')
}

/// Whether a metadata row belongs to `schema`. Rows without a
/// `TABLE_SCHEM` or `FKTABLE_SCHEM` column are kept.
fn in_schema(row: &Row, schema: &str) -> bool {
    if is_pattern(schema) {
        return true;
    }
    row.text("FKTABLE_SCHEM")
        .or_else(|| row.text("TABLE_SCHEM"))
        .is_none_or(|s| s == schema)
}

/// Replaces each `?` placeholder with its bound value in order.
fn inline_args(limited: &LimitedSql) -> String {
    let mut args = limited.args.iter();
    let mut sql = String::with_capacity(limited.sql.len());
    for c in limited.sql.chars() {
        if c == '?' {
            if let Some(value) = args.next() {
                sql.push_str(&value.to_string());
                continue;
            }
        }
        sql.push(c);
    }
    sql
}

/// Renders ` AND <column> = '<table>'` for per-table queries.
pub(crate) fn table_filter(column: &str, table: Option<&str>) -> String {
    table
        .map(|t| format!(" AND {column} = {}", literal(t)))
        .unwrap_or_default()
}

/// Reads a live [`Schema`] with a [`MetadataReader`] and a [`Dialect`].
#[derive(Debug, Clone, Copy)]
pub struct SchemaReader<'a> {
    dialect: &'a dyn Dialect,
    reader: &'a dyn MetadataReader,
}

impl<'a> SchemaReader<'a> {
    /// Creates a schema reader.
    #[must_use]
    pub const fn new(dialect: &'a dyn Dialect, reader: &'a dyn MetadataReader) -> Self {
        Self { dialect, reader }
    }

    /// Reads every table and sequence of the schemas matching
    /// `schema_pattern`, or of the default schema when it is `None`.
    ///
    /// # Errors
    ///
    /// Returns [`UpgradeError::Introspection`] for the first failing
    /// query. Nothing read before the failure is returned.
    pub async fn read_schema(
        &self,
        conn: &dyn DbConnection,
        catalog: Option<&str>,
        schema_pattern: Option<&str>,
    ) -> Result<Schema> {
        let schema_name = self.resolve_schema(conn, schema_pattern).await?;
        debug!(schema = %schema_name, dialect = self.dialect.name(), "Reading schema");

        let mut tables = Vec::new();
        for row in self.fetch(conn, self.reader.tables_sql(&schema_name)).await? {
            let Some(name) = row.text("TABLE_NAME") else {
                continue;
            };
            let mut table = Table::new(name);
            table.catalog = catalog.map(str::to_string);
            table.schema = Some(schema_name.clone());
            table.comment = row.non_empty("REMARKS");
            tables.push(table);
        }

        let columns = self.fetch(conn, self.reader.columns_sql(&schema_name, None)).await?;
        for row in columns.iter().filter(|r| in_schema(r, &schema_name)) {
            let Some(table) = row.text("TABLE_NAME").and_then(|n| find(&mut tables, &n)) else {
                continue;
            };
            if let Some(column) = self.build_column(row) {
                table.columns.push(column);
            }
        }

        let names: Vec<String> = tables.iter().map(|t| t.name.clone()).collect();
        let bulk = self.reader.supports_read_all_primary_keys();
        let rows = self
            .read_per_table(conn, &schema_name, &names, bulk, |s, t| {
                self.reader.primary_keys_sql(s, t)
            })
            .await?;
        apply_primary_keys(&mut tables, &rows);

        let bulk = self.reader.supports_read_all_foreign_keys();
        let rows = self
            .read_per_table(conn, &schema_name, &names, bulk, |s, t| {
                self.reader.foreign_keys_sql(s, t)
            })
            .await?;
        apply_foreign_keys(&mut tables, &rows);

        let bulk = self.reader.supports_read_all_indexes();
        let rows = self
            .read_per_table(conn, &schema_name, &names, bulk, |s, t| {
                self.reader.indexes_sql(s, t)
            })
            .await?;
        apply_indexes(&mut tables, &rows);

        let mut sequences = Vec::new();
        if self.dialect.supports_sequences() {
            if let Some(sql) = self.reader.sequences_sql(&schema_name) {
                for row in self.fetch(conn, sql).await? {
                    if let Some(sequence) = self.build_sequence(&row, &schema_name, &tables) {
                        sequences.push(sequence);
                    }
                }
            }
        }

        for table in &mut tables {
            self.remove_internal_indexes(table);
        }
        tables.retain(|t| !t.columns.is_empty());

        info!(
            schema = %schema_name,
            tables = tables.len(),
            sequences = sequences.len(),
            "Read live schema"
        );
        Ok(Schema {
            catalog: catalog.map(str::to_string),
            name: Some(schema_name),
            tables,
            sequences,
        })
    }

    /// Returns whether `table` holds at least one row.
    ///
    /// # Errors
    ///
    /// Returns [`UpgradeError::Introspection`] if the query fails.
    pub async fn has_rows(&self, conn: &dyn DbConnection, table: &TableName) -> Result<bool> {
        let select = format!("SELECT 1 FROM {}", self.dialect.qualify(table));
        let limited = self.dialect.rewrite_for_limit(&select, Limit { offset: 0, rows: 1 });
        let rows = self.fetch(conn, inline_args(&limited)).await?;
        Ok(!rows.is_empty())
    }

    async fn resolve_schema(&self, conn: &dyn DbConnection, pattern: Option<&str>) -> Result<String> {
        if let Some(pattern) = pattern {
            return Ok(self.dialect.case_fold(pattern));
        }
        if let Some(sql) = self.reader.default_schema_sql() {
            let rows = self.fetch(conn, sql).await?;
            if let Some(name) = rows.first().and_then(|r| r.non_empty("SCHEMA_NAME")) {
                return Ok(name);
            }
        }
        Ok(self.dialect.default_schema().unwrap_or("%").to_string())
    }

    async fn fetch(&self, conn: &dyn DbConnection, sql: String) -> Result<Vec<Row>> {
        debug!(sql = %sql, "Reading metadata");
        conn.query(&sql)
            .await
            .map_err(|source| UpgradeError::Introspection { query: sql, source })
    }

    async fn read_per_table<F>(
        &self,
        conn: &dyn DbConnection,
        schema: &str,
        tables: &[String],
        bulk: bool,
        sql: F,
    ) -> Result<Vec<Row>>
    where
        F: Fn(&str, Option<&str>) -> String,
    {
        let mut rows = Vec::new();
        if bulk {
            rows = self.fetch(conn, sql(schema, None)).await?;
        } else {
            for table in tables {
                rows.extend(self.fetch(conn, sql(schema, Some(table))).await?);
            }
        }
        rows.retain(|r| in_schema(r, schema));
        Ok(rows)
    }

    fn build_column(&self, row: &Row) -> Option<Column> {
        let name = row.text("COLUMN_NAME")?;
        let type_name = row.text("TYPE_NAME").unwrap_or_default();
        let type_code = self
            .dialect
            .types()
            .classify(&type_name)
            .unwrap_or(TypeCode::Special);

        let mut column = if type_code == TypeCode::Special {
            Column::special(name, type_name.clone())
        } else {
            Column::new(name, type_code)
        };

        let args = NativeType::parse(&type_name).args;
        let size = row
            .int("COLUMN_SIZE")
            .and_then(|s| u32::try_from(s).ok())
            .or_else(|| args.first().copied());
        let digits = row
            .int("DECIMAL_DIGITS")
            .and_then(|s| u32::try_from(s).ok())
            .or_else(|| args.get(1).copied());
        match type_code.family() {
            TypeFamily::Character | TypeFamily::Binary => column.length = size,
            TypeFamily::Exact => {
                column.precision = size;
                column.scale = digits;
            }
            _ => {}
        }

        column.nullable = row.flag("IS_NULLABLE").unwrap_or(true);
        column.auto_increment = row.flag("IS_AUTOINCREMENT").unwrap_or(false);
        column.comment = row.non_empty("REMARKS");

        if let Some(raw) = row.non_empty("COLUMN_DEF") {
            if self.dialect.is_internal_default_value(&raw) {
                column.auto_increment = true;
            } else {
                column.default = self.reader.default_value(&raw, &column);
            }
        }
        self.reader.adjust_column(&mut column);
        Some(column)
    }

    fn build_sequence(&self, row: &Row, schema: &str, tables: &[Table]) -> Option<Sequence> {
        let name = row.text("SEQUENCE_NAME")?;
        if self.dialect.is_internal_sequence(&name, tables) {
            debug!(sequence = %name, "Skipping internal sequence");
            return None;
        }
        let mut sequence = Sequence::new(name);
        sequence.schema = Some(schema.to_string());
        sequence.start = row.int("START_VALUE");
        sequence.increment = row.int("INCREMENT");
        sequence.min_value = row.int("MIN_VALUE");
        sequence.max_value = row.int("MAX_VALUE");
        sequence.cache = row.int("CACHE_SIZE");
        sequence.cycle = row.flag("CYCLE");
        Some(sequence)
    }

    /// Marks columns backed by a generated single-column unique index as
    /// unique, then drops every generated index.
    fn remove_internal_indexes(&self, table: &mut Table) {
        let internal: Vec<bool> = table
            .indexes
            .iter()
            .map(|index| self.dialect.is_internal_index(table, index))
            .collect();

        let backing: Vec<(String, String)> = table
            .indexes
            .iter()
            .zip(&internal)
            .filter(|(index, internal)| **internal && index.unique && index.columns.len() == 1)
            .map(|(index, _)| (index.columns[0].clone(), index.name.clone()))
            .collect();
        for (column, index) in backing {
            if let Some(column) = table.find_column_mut(&column) {
                if !column.primary_key {
                    column.unique = true;
                    column.unique_index = Some(index);
                }
            }
        }

        let indexes = std::mem::take(&mut table.indexes);
        table.indexes = indexes
            .into_iter()
            .zip(internal)
            .filter_map(|(index, internal)| {
                if internal {
                    debug!(table = %table.name, index = %index.name, "Skipping internal index");
                    None
                } else {
                    Some(index)
                }
            })
            .collect();
    }
}

fn find<'t>(tables: &'t mut [Table], name: &str) -> Option<&'t mut Table> {
    tables.iter_mut().find(|t| t.name.eq_ignore_ascii_case(name))
}

fn apply_primary_keys(tables: &mut [Table], rows: &[Row]) {
    for row in rows {
        let (Some(table), Some(column)) = (row.text("TABLE_NAME"), row.text("COLUMN_NAME")) else {
            continue;
        };
        let Some(table) = find(tables, &table) else {
            continue;
        };
        if let Some(name) = row.non_empty("PK_NAME") {
            table.primary_key_name = Some(name);
        }
        if let Some(column) = table.find_column_mut(&column) {
            column.primary_key = true;
            column.nullable = false;
        }
    }
}

fn apply_foreign_keys(tables: &mut [Table], rows: &[Row]) {
    for row in rows {
        let table = row.text("FKTABLE_NAME").or_else(|| row.text("TABLE_NAME"));
        let (Some(table), Some(name)) = (table, row.text("FK_NAME")) else {
            continue;
        };
        let (Some(column), Some(foreign_table), Some(foreign_column)) = (
            row.text("FKCOLUMN_NAME"),
            row.text("PKTABLE_NAME"),
            row.text("PKCOLUMN_NAME"),
        ) else {
            continue;
        };
        let Some(table) = find(tables, &table) else {
            continue;
        };
        let Some(foreign_key) = table
            .foreign_keys
            .iter_mut()
            .find(|fk| fk.name.eq_ignore_ascii_case(&name))
        else {
            let mut foreign_key =
                ForeignKey::new(name, vec![column], foreign_table, vec![foreign_column]);
            foreign_key.on_update = rule(row.get("UPDATE_RULE"));
            foreign_key.on_delete = rule(row.get("DELETE_RULE"));
            table.foreign_keys.push(foreign_key);
            continue;
        };
        foreign_key.columns.push(column);
        foreign_key.foreign_columns.push(foreign_column);
    }
}

fn rule(value: Option<&SqlValue>) -> ForeignKeyRule {
    match value {
        Some(SqlValue::Text(name)) => name
            .trim()
            .parse::<i64>()
            .map_or_else(|_| ForeignKeyRule::from_name(name), ForeignKeyRule::from_code),
        Some(value) => value
            .as_int()
            .map_or(ForeignKeyRule::NoAction, ForeignKeyRule::from_code),
        None => ForeignKeyRule::NoAction,
    }
}

fn apply_indexes(tables: &mut [Table], rows: &[Row]) {
    for row in rows {
        let (Some(table), Some(name), Some(column)) = (
            row.text("TABLE_NAME"),
            row.text("INDEX_NAME"),
            row.text("COLUMN_NAME"),
        ) else {
            continue;
        };
        let Some(table) = find(tables, &table) else {
            continue;
        };
        let Some(index) = table
            .indexes
            .iter_mut()
            .find(|i| i.name.eq_ignore_ascii_case(&name))
        else {
            let mut index = Index::new(name, vec![column]);
            index.unique = !row.flag("NON_UNIQUE").unwrap_or(true);
            table.indexes.push(index);
            continue;
        };
        index.columns.push(column);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use oxide_db::dialect::PostgresDialect;

    use super::*;

    /// A connection answering queries from a script: the first entry
    /// whose key occurs in the SQL wins, anything else returns no rows.
    pub struct ScriptedConnection {
        product: String,
        script: Vec<(&'static str, Vec<Row>)>,
        pub queries: Mutex<Vec<String>>,
        pub failing: Option<&'static str>,
    }

    impl ScriptedConnection {
        pub fn new(product: &str) -> Self {
            Self {
                product: product.to_string(),
                script: Vec::new(),
                queries: Mutex::new(Vec::new()),
                failing: None,
            }
        }

        pub fn on(mut self, key: &'static str, rows: Vec<Row>) -> Self {
            self.script.push((key, rows));
            self
        }
    }

    #[async_trait]
    impl DbConnection for ScriptedConnection {
        fn product_name(&self) -> &str {
            &self.product
        }

        async fn query(&self, sql: &str) -> std::result::Result<Vec<Row>, sqlx::Error> {
            self.queries.lock().unwrap().push(sql.to_string());
            if self.failing.is_some_and(|key| sql.contains(key)) {
                return Err(sqlx::Error::Protocol("permission denied".into()));
            }
            Ok(self
                .script
                .iter()
                .find(|(key, _)| sql.contains(key))
                .map(|(_, rows)| rows.clone())
                .unwrap_or_default())
        }

        async fn execute(&self, sql: &str) -> std::result::Result<u64, sqlx::Error> {
            self.queries.lock().unwrap().push(sql.to_string());
            if self.failing.is_some_and(|key| sql.contains(key)) {
                return Err(sqlx::Error::Protocol("syntax error".into()));
            }
            Ok(0)
        }
    }

    pub fn column_row(table: &str, column: &str, type_name: &str) -> Row {
        Row::new()
            .with("TABLE_NAME", table)
            .with("COLUMN_NAME", column)
            .with("TYPE_NAME", type_name)
    }

    fn postgres_connection() -> ScriptedConnection {
        ScriptedConnection::new("PostgreSQL")
            .on(
                "current_schema()",
                vec![Row::new().with("SCHEMA_NAME", "public")],
            )
            .on(
                "information_schema.tables",
                vec![
                    Row::new().with("TABLE_NAME", "users"),
                    Row::new().with("TABLE_NAME", "empty"),
                ],
            )
            .on(
                "information_schema.columns",
                vec![
                    column_row("users", "id", "int8")
                        .with("IS_NULLABLE", "NO")
                        .with("COLUMN_DEF", "nextval('users_id_seq'::regclass)"),
                    column_row("users", "email", "varchar")
                        .with("COLUMN_SIZE", 100_i64)
                        .with("IS_NULLABLE", "YES"),
                    column_row("users", "status", "varchar")
                        .with("COLUMN_SIZE", 10_i64)
                        .with("COLUMN_DEF", "'new'::character varying")
                        .with("REMARKS", "Account state"),
                    column_row("users", "balance", "numeric")
                        .with("COLUMN_SIZE", 12_i64)
                        .with("DECIMAL_DIGITS", 2_i64),
                    column_row("users", "doc", "jsonb"),
                ],
            )
            .on(
                "PRIMARY KEY",
                vec![Row::new()
                    .with("TABLE_NAME", "users")
                    .with("COLUMN_NAME", "id")
                    .with("PK_NAME", "users_pkey")],
            )
            .on(
                "referential_constraints",
                vec![Row::new()
                    .with("TABLE_NAME", "users")
                    .with("FK_NAME", "fk_users_team")
                    .with("FKCOLUMN_NAME", "status")
                    .with("PKTABLE_NAME", "teams")
                    .with("PKCOLUMN_NAME", "code")
                    .with("UPDATE_RULE", "NO ACTION")
                    .with("DELETE_RULE", "CASCADE")],
            )
            .on(
                "pg_index",
                vec![
                    Row::new()
                        .with("TABLE_NAME", "users")
                        .with("INDEX_NAME", "users_pkey")
                        .with("NON_UNIQUE", false)
                        .with("COLUMN_NAME", "id"),
                    Row::new()
                        .with("TABLE_NAME", "users")
                        .with("INDEX_NAME", "users_email_key")
                        .with("NON_UNIQUE", false)
                        .with("COLUMN_NAME", "email"),
                    Row::new()
                        .with("TABLE_NAME", "users")
                        .with("INDEX_NAME", "ix_users_status")
                        .with("NON_UNIQUE", true)
                        .with("COLUMN_NAME", "status"),
                ],
            )
            .on(
                "pg_sequences",
                vec![
                    Row::new()
                        .with("SEQUENCE_NAME", "users_id_seq")
                        .with("START_VALUE", 1_i64),
                    Row::new()
                        .with("SEQUENCE_NAME", "order_seq")
                        .with("START_VALUE", 1_i64),
                    Row::new()
                        .with("SEQUENCE_NAME", "seq1")
                        .with("START_VALUE", 1_i64)
                        .with("INCREMENT", 1_i64)
                        .with("CYCLE", false),
                ],
            )
    }

    #[tokio::test]
    async fn test_read_postgres_schema() {
        let dialect = PostgresDialect::new().unwrap();
        let reader = PostgresReader;
        let conn = postgres_connection();
        let schema = SchemaReader::new(&dialect, &reader)
            .read_schema(&conn, None, None)
            .await
            .unwrap();

        assert_eq!(schema.name.as_deref(), Some("public"));
        assert_eq!(schema.tables.len(), 1);
        let users = &schema.tables[0];
        assert_eq!(users.primary_key(), vec!["id"]);
        assert_eq!(users.primary_key_name.as_deref(), Some("users_pkey"));

        let id = users.find_column("id").unwrap();
        assert_eq!(id.type_code, TypeCode::BigInt);
        assert!(id.auto_increment);
        assert_eq!(id.default, None);

        let email = users.find_column("email").unwrap();
        assert_eq!(email.type_code, TypeCode::Varchar);
        assert_eq!(email.length, Some(100));
        assert!(email.unique);
        assert_eq!(email.unique_index.as_deref(), Some("users_email_key"));

        let status = users.find_column("status").unwrap();
        assert_eq!(status.default, Some(DefaultValue::Text("new".into())));
        assert_eq!(status.comment.as_deref(), Some("Account state"));
        assert!(!status.unique);

        let balance = users.find_column("balance").unwrap();
        assert_eq!((balance.precision, balance.scale), (Some(12), Some(2)));

        let doc = users.find_column("doc").unwrap();
        assert_eq!(doc.type_code, TypeCode::Special);
        assert_eq!(doc.native_type.as_deref(), Some("jsonb"));

        let names: Vec<&str> = users.indexes.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["ix_users_status"]);

        assert_eq!(users.foreign_keys.len(), 1);
        assert_eq!(users.foreign_keys[0].on_delete, ForeignKeyRule::Cascade);

        let sequences: Vec<&str> = schema.sequences.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(sequences, vec!["order_seq", "seq1"]);
    }

    #[tokio::test]
    async fn test_failing_query_discards_schema() {
        let dialect = PostgresDialect::new().unwrap();
        let reader = PostgresReader;
        let mut conn = postgres_connection();
        conn.failing = Some("pg_index");

        let err = SchemaReader::new(&dialect, &reader)
            .read_schema(&conn, None, None)
            .await
            .unwrap_err();
        match err {
            UpgradeError::Introspection { query, .. } => assert!(query.contains("pg_index")),
            other => panic!("expected an introspection error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_explicit_schema_is_case_folded() {
        let dialect = PostgresDialect::new().unwrap();
        let reader = PostgresReader;
        let conn = ScriptedConnection::new("PostgreSQL");
        let schema = SchemaReader::new(&dialect, &reader)
            .read_schema(&conn, None, Some("APP"))
            .await
            .unwrap();
        assert_eq!(schema.name.as_deref(), Some("app"));
        let queries = conn.queries.lock().unwrap();
        assert!(!queries.iter().any(|q| q.contains("current_schema()")));
        assert!(queries.iter().any(|q| q.contains("t.table_schema = 'app'")));
        assert!(!queries.iter().any(|q| q.contains("LIKE 'app'")));
    }

    #[tokio::test]
    async fn test_has_rows_fetches_a_single_row() {
        let dialect = PostgresDialect::new().unwrap();
        let reader = PostgresReader;
        let conn = ScriptedConnection::new("PostgreSQL")
            .on("FROM users", vec![Row::new().with("?column?", 1_i64)]);
        let schema_reader = SchemaReader::new(&dialect, &reader);

        assert!(schema_reader.has_rows(&conn, &TableName::new("users")).await.unwrap());
        assert!(!schema_reader.has_rows(&conn, &TableName::new("teams")).await.unwrap());
        let queries = conn.queries.lock().unwrap();
        assert_eq!(queries[0], "SELECT 1 FROM users limit 1 offset 0");
    }

    #[tokio::test]
    async fn test_has_rows_uses_the_vendor_row_limit() {
        let dialect = oxide_db::dialect::OracleDialect::new().unwrap();
        let reader = OracleReader;
        let conn = ScriptedConnection::new("Oracle");
        let table = TableName {
            catalog: None,
            schema: Some("APP".into()),
            name: "USERS".into(),
        };
        let found = SchemaReader::new(&dialect, &reader).has_rows(&conn, &table).await.unwrap();
        assert!(!found);
        let queries = conn.queries.lock().unwrap();
        assert!(queries[0].contains("( SELECT 1 FROM APP.USERS )"));
        assert!(queries[0].contains("ROWNUM <= 1 ) WHERE ORACLE_ROWNUM >= 1"));
        assert!(!queries[0].contains('?'));
    }

    #[test]
    fn test_underscore_in_schema_is_not_a_wildcard() {
        assert_eq!(schema_condition("APP_1"), "= 'APP_1'");
        assert_eq!(schema_condition("APP%"), "LIKE 'APP%'");
        assert_eq!(schema_condition("%"), "LIKE '%'");
    }

    #[test]
    fn test_rows_of_a_sibling_schema_are_dropped() {
        let own = Row::new().with("TABLE_SCHEM", "APP_1").with("TABLE_NAME", "T");
        let sibling = Row::new().with("TABLE_SCHEM", "APPX1").with("TABLE_NAME", "T");
        let foreign = Row::new().with("FKTABLE_SCHEM", "APPX1").with("TABLE_SCHEM", "APP_1");
        let plain = Row::new().with("TABLE_NAME", "T");
        assert!(in_schema(&own, "APP_1"));
        assert!(!in_schema(&sibling, "APP_1"));
        assert!(!in_schema(&foreign, "APP_1"));
        assert!(in_schema(&plain, "APP_1"));
        assert!(in_schema(&sibling, "APP%"));
    }

    #[test]
    fn test_rule_translation() {
        assert_eq!(rule(Some(&SqlValue::Int(0))), ForeignKeyRule::Cascade);
        assert_eq!(rule(Some(&SqlValue::Text("2".into()))), ForeignKeyRule::SetNull);
        assert_eq!(rule(Some(&SqlValue::Text("SET DEFAULT".into()))), ForeignKeyRule::SetDefault);
        assert_eq!(rule(Some(&SqlValue::Text("RESTRICT".into()))), ForeignKeyRule::NoAction);
        assert_eq!(rule(None), ForeignKeyRule::NoAction);
    }

    #[test]
    fn test_literal_escapes_quotes() {
        assert_eq!(literal("o'brien"), "'o''brien'");
        assert_eq!(table_filter("t.name", Some("users")), " AND t.name = 'users'");
        assert_eq!(table_filter("t.name", None), "");
    }
}
