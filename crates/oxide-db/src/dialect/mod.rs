//! Database dialect implementations.
//!
//! A dialect knows how one vendor spells DDL: identifier quoting, native
//! types, literals, sequences, pagination and, most importantly, how to
//! alter a column without rewriting it.
//!
//! Vendors compose a shared [`DialectSettings`] value and a
//! [`TypeRegistry`], and override only the [`Dialect`] methods whose
//! behaviour differs. Sequence support is a separate capability,
//! [`SequenceDialect`], reached through [`Dialect::sequences`].

mod derby;
mod h2;
mod mysql;
mod oracle;
mod postgres;
mod sqlite;
mod sqlserver;

pub use derby::DerbyDialect;
pub use h2::H2Dialect;
pub use mysql::MySqlDialect;
pub use oracle::OracleDialect;
pub use postgres::PostgresDialect;
pub use sqlite::SqliteDialect;
pub use sqlserver::SqlServerDialect;

use std::fmt::Debug;

use crate::changes::{ColumnDefinitionChange, ColumnPropertyChange, SchemaChange};
use crate::error::{DbError, Result};
use crate::schema::{
    Column, DefaultValue, ForeignKey, ForeignKeyRule, Index, Sequence, Table, TableName,
    TypeFamily,
};
use crate::types::{NativeType, TypeRegistry};

/// Prefix of indexes and constraints created by this engine on behalf of
/// a column flag. Objects with this prefix are never reported as indexes.
pub const INTERNAL_NAME_PREFIX: &str = "INTERNAL_";

/// How a vendor folds unquoted identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseFolding {
    /// Folded to upper case.
    Upper,
    /// Folded to lower case.
    Lower,
    /// Kept as written.
    Preserve,
}

/// How a vendor stores column and table comments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentSupport {
    /// No comments.
    None,
    /// Part of the column definition.
    Inline,
    /// Separate `COMMENT ON` statements.
    Statement,
}

/// Static per-vendor settings shared by the default [`Dialect`] methods.
#[derive(Debug, Clone, Copy)]
pub struct DialectSettings {
    /// Dialect name.
    pub name: &'static str,
    /// Opening identifier quote.
    pub open_quote: char,
    /// Closing identifier quote.
    pub close_quote: char,
    /// Folding of unquoted identifiers.
    pub case_folding: CaseFolding,
    /// Whether quoted identifiers are folded too.
    pub fold_quoted: bool,
    /// Reserved words on top of the common SQL set.
    pub keywords: &'static [&'static str],
    /// Schemas owned by the database itself.
    pub system_schemas: &'static [&'static str],
    /// Schema used when none is given, if fixed.
    pub default_schema: Option<&'static str>,
    /// Literal for `true`.
    pub true_literal: &'static str,
    /// Literal for `false`.
    pub false_literal: &'static str,
    /// Suffix appended to the type of auto-increment columns.
    pub auto_increment: Option<&'static str>,
    /// Comment support.
    pub comments: CommentSupport,
    /// Whether `UNIQUE` may appear in a column definition.
    pub inline_unique: bool,
    /// Clause introducing a column in `ALTER TABLE .. ADD`.
    pub add_column_prefix: &'static str,
    /// Base name of the variable-length text type, the only type whose
    /// size is altered in place.
    pub varchar_type: &'static str,
}

impl DialectSettings {
    /// Settings of a standard SQL database.
    pub const STANDARD: Self = Self {
        name: "Standard",
        open_quote: '"',
        close_quote: '"',
        case_folding: CaseFolding::Upper,
        fold_quoted: false,
        keywords: &[],
        system_schemas: &["INFORMATION_SCHEMA"],
        default_schema: None,
        true_literal: "1",
        false_literal: "0",
        auto_increment: None,
        comments: CommentSupport::None,
        inline_unique: true,
        add_column_prefix: "ADD COLUMN ",
        varchar_type: "varchar",
    };
}

/// Pagination request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limit {
    /// Rows to skip.
    pub offset: u64,
    /// Rows to return.
    pub rows: u64,
}

/// A query rewritten for pagination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimitedSql {
    /// Rewritten SQL.
    pub sql: String,
    /// Values to bind after the query's own parameters, in order.
    pub args: Vec<u64>,
}

const SQL_KEYWORDS: &[&str] = &[
    "ADD", "ALL", "ALTER", "AND", "ANY", "AS", "ASC", "BETWEEN", "BY", "CASE", "CAST", "CHECK",
    "COLUMN", "CONSTRAINT", "CREATE", "CROSS", "CURRENT", "CURRENT_DATE", "CURRENT_TIME",
    "CURRENT_TIMESTAMP", "CURRENT_USER", "DEFAULT", "DELETE", "DESC", "DISTINCT", "DROP", "ELSE",
    "END", "EXCEPT", "EXISTS", "FALSE", "FETCH", "FOR", "FOREIGN", "FROM", "FULL", "GRANT",
    "GROUP", "HAVING", "IN", "INNER", "INSERT", "INTERSECT", "INTO", "IS", "JOIN", "KEY", "LEFT",
    "LIKE", "NATURAL", "NOT", "NULL", "OF", "ON", "OR", "ORDER", "OUTER", "PRIMARY",
    "REFERENCES", "RIGHT", "ROW", "ROWS", "SELECT", "SESSION_USER", "SET", "SOME", "TABLE",
    "THEN", "TO", "TRUE", "UNION", "UNIQUE", "UPDATE", "USING", "VALUES", "WHEN", "WHERE",
    "WITH",
];

/// Sequence capability.
pub trait SequenceDialect: Dialect {
    /// Renders `CREATE SEQUENCE`.
    fn sequence_ddl(&self, sequence: &Sequence) -> Vec<String>;

    /// Renders `DROP SEQUENCE`.
    fn drop_sequence_ddl(&self, name: &TableName) -> Vec<String>;

    /// Expression yielding the next value.
    fn next_value(&self, name: &TableName) -> String;

    /// Returns whether the current value of a sequence is visible to the
    /// session.
    fn supports_current_value(&self) -> bool {
        true
    }

    /// Expression yielding the current value.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Unsupported`] when the vendor has no current
    /// value semantics.
    fn current_value(&self, name: &TableName) -> Result<String>;
}

/// Trait for database-specific SQL generation.
pub trait Dialect: Send + Sync + Debug {
    /// Returns the vendor settings.
    fn settings(&self) -> &DialectSettings;

    /// Returns the type registry.
    fn types(&self) -> &TypeRegistry;

    /// Returns the dialect name.
    fn name(&self) -> &'static str {
        self.settings().name
    }

    /// Returns the sequence capability, if the vendor has sequences.
    fn sequences(&self) -> Option<&dyn SequenceDialect> {
        None
    }

    /// Returns whether sequences are supported.
    fn supports_sequences(&self) -> bool {
        self.sequences().is_some()
    }

    /// Returns whether [`Dialect::current_value_expr`] can succeed.
    fn supports_current_sequence_value(&self) -> bool {
        self.sequences().is_some_and(|s| s.supports_current_value())
    }

    /// Returns whether auto-increment columns are supported.
    fn supports_auto_increment(&self) -> bool {
        self.settings().auto_increment.is_some()
    }

    /// Returns whether column comments are supported.
    fn supports_column_comment(&self) -> bool {
        self.settings().comments != CommentSupport::None
    }

    /// Returns whether `name` is a reserved word.
    fn is_keyword(&self, name: &str) -> bool {
        SQL_KEYWORDS
            .iter()
            .chain(self.settings().keywords)
            .any(|k| k.eq_ignore_ascii_case(name))
    }

    /// Normalises an unquoted identifier the way the vendor stores it.
    fn case_fold(&self, name: &str) -> String {
        match self.settings().case_folding {
            CaseFolding::Upper => name.to_ascii_uppercase(),
            CaseFolding::Lower => name.to_ascii_lowercase(),
            CaseFolding::Preserve => name.to_string(),
        }
    }

    /// Wraps an identifier in the vendor's quotes.
    fn quote_identifier(&self, name: &str) -> String {
        let settings = self.settings();
        let inner = if settings.fold_quoted {
            self.case_fold(name)
        } else {
            name.to_string()
        };
        let close = settings.close_quote.to_string();
        format!(
            "{}{}{}",
            settings.open_quote,
            inner.replace(&close, &close.repeat(2)),
            settings.close_quote
        )
    }

    /// Removes the vendor's quotes, if present.
    fn unquote(&self, name: &str) -> String {
        let settings = self.settings();
        let close = settings.close_quote.to_string();
        name.strip_prefix(settings.open_quote)
            .and_then(|n| n.strip_suffix(settings.close_quote))
            .map_or_else(|| name.to_string(), |inner| inner.replace(&close.repeat(2), &close))
    }

    /// Renders an identifier for DDL, quoting only when required.
    fn identifier(&self, name: &str) -> String {
        let plain = !name.is_empty()
            && !name.starts_with(|c: char| c.is_ascii_digit())
            && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if plain && !self.is_keyword(name) {
            name.to_string()
        } else {
            self.quote_identifier(name)
        }
    }

    /// Renders a qualified name.
    fn qualify(&self, name: &TableName) -> String {
        let mut parts = Vec::with_capacity(3);
        if let Some(schema) = &name.schema {
            if let Some(catalog) = &name.catalog {
                parts.push(self.identifier(catalog));
            }
            parts.push(self.identifier(schema));
        }
        parts.push(self.identifier(&name.name));
        parts.join(".")
    }

    /// Renders a name that may already carry `schema.` qualifiers.
    fn qualify_dotted(&self, name: &str) -> String {
        name.split('.')
            .map(|part| self.identifier(part))
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Returns the schemas owned by the database itself.
    fn system_schemas(&self) -> &'static [&'static str] {
        self.settings().system_schemas
    }

    /// Returns whether a schema belongs to the database itself.
    fn is_system_schema(&self, schema: &str) -> bool {
        self.system_schemas()
            .iter()
            .any(|s| s.eq_ignore_ascii_case(schema))
    }

    /// Returns the fixed default schema, if the vendor has one.
    fn default_schema(&self) -> Option<&'static str> {
        self.settings().default_schema
    }

    /// Escapes a string for use inside single quotes.
    fn escape(&self, value: &str) -> String {
        value.replace('\'', "''")
    }

    /// Renders a string literal.
    fn string_literal(&self, value: &str) -> String {
        format!("'{}'", self.escape(value))
    }

    /// Renders a boolean literal.
    fn boolean_literal(&self, value: bool) -> &'static str {
        if value {
            self.settings().true_literal
        } else {
            self.settings().false_literal
        }
    }

    /// Renders the default of a column, or `None` if it has none.
    fn default_value_sql(&self, column: &Column) -> Option<String> {
        let family = column.type_code.family();
        let numeric = matches!(
            family,
            TypeFamily::Integer | TypeFamily::Float | TypeFamily::Exact | TypeFamily::Boolean
        );
        let sql = match column.effective_default()? {
            DefaultValue::Null => return None,
            DefaultValue::Boolean(b) if family == TypeFamily::Character => {
                self.string_literal(self.boolean_literal(*b))
            }
            DefaultValue::Boolean(b) => self.boolean_literal(*b).to_string(),
            DefaultValue::Integer(i) if numeric => i.to_string(),
            DefaultValue::Decimal(d) if numeric => d.clone(),
            DefaultValue::Integer(i) => self.string_literal(&i.to_string()),
            DefaultValue::Decimal(d) | DefaultValue::Text(d) => self.string_literal(d),
            DefaultValue::Expression(e) => e.clone(),
        };
        Some(sql)
    }

    /// Renders the native type of a column, without modifiers.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::UnmappedType`] when the type is not registered.
    fn native_type(&self, column: &Column) -> Result<String> {
        self.types().resolve(column)
    }

    /// Renders the column type followed by the auto-increment suffix,
    /// when applicable.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::UnmappedType`] when the type is not registered.
    fn column_type_definition(&self, column: &Column) -> Result<String> {
        let native = self.native_type(column)?;
        match self.settings().auto_increment {
            Some(suffix) if column.auto_increment => Ok(format!("{native} {suffix}")),
            _ => Ok(native),
        }
    }

    /// Returns the null clause of a column definition, possibly empty.
    fn null_clause(&self, nullable: bool) -> &'static str {
        if nullable {
            "NULL"
        } else {
            "NOT NULL"
        }
    }

    /// Renders an inline comment clause.
    fn inline_comment(&self, comment: &str) -> String {
        format!("COMMENT {}", self.string_literal(comment))
    }

    /// Renders a full column definition: name, type, default, null
    /// clause, inline unique and inline comment.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::UnmappedType`] when the type is not registered.
    fn column_definition(&self, column: &Column) -> Result<String> {
        let mut parts = vec![
            self.identifier(&column.name),
            self.column_type_definition(column)?,
        ];
        if let Some(default) = self.default_value_sql(column) {
            parts.push(format!("DEFAULT {default}"));
        }
        let null = self.null_clause(column.is_nullable());
        if !null.is_empty() {
            parts.push(null.to_string());
        }
        if column.is_unique() && self.settings().inline_unique {
            parts.push("UNIQUE".to_string());
        }
        if let (Some(comment), CommentSupport::Inline) = (&column.comment, self.settings().comments)
        {
            parts.push(self.inline_comment(comment));
        }
        Ok(parts.join(" "))
    }

    /// Renders `CREATE TABLE` followed by the statements the vendor
    /// cannot express inline (unique constraints, comments).
    ///
    /// # Errors
    ///
    /// Returns [`DbError::UnmappedType`] when a column type is not
    /// registered.
    fn create_table_sql(&self, table: &Table) -> Result<Vec<String>> {
        let name = table.qualified_name();
        let mut definitions = table
            .columns
            .iter()
            .map(|c| self.column_definition(c))
            .collect::<Result<Vec<_>>>()?;

        let primary_key = table.primary_key();
        if !primary_key.is_empty() {
            let columns: Vec<String> = primary_key.iter().map(|c| self.identifier(c)).collect();
            definitions.push(format!("PRIMARY KEY ({})", columns.join(", ")));
        }
        if !self.supports_add_foreign_key() {
            definitions.extend(table.foreign_keys.iter().map(|fk| self.foreign_key_clause(fk)));
        }

        let mut sqls = vec![format!(
            "CREATE TABLE {} ({})",
            self.qualify(&name),
            definitions.join(", ")
        )];

        if !self.settings().inline_unique {
            for column in table.columns.iter().filter(|c| c.is_unique()) {
                sqls.extend(self.add_unique_sql(&name, column));
            }
        }
        if let Some(comment) = &table.comment {
            sqls.extend(self.comment_on_table_sql(&name, comment));
        }
        if self.settings().comments == CommentSupport::Statement {
            for column in table.columns.iter().filter(|c| c.comment.is_some()) {
                sqls.extend(self.comment_on_column_sql(&name, column));
            }
        }
        Ok(sqls)
    }

    /// Renders the statements adding a column to an existing table.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::UnmappedType`] when the type is not registered.
    fn add_column_sql(&self, table: &TableName, column: &Column) -> Result<Vec<String>> {
        let mut sqls = vec![format!(
            "ALTER TABLE {} {}{}",
            self.qualify(table),
            self.settings().add_column_prefix,
            self.column_definition(column)?
        )];
        if column.is_unique() && !self.settings().inline_unique {
            sqls.extend(self.add_unique_sql(table, column));
        }
        if column.comment.is_some() && self.settings().comments == CommentSupport::Statement {
            sqls.extend(self.comment_on_column_sql(table, column));
        }
        Ok(sqls)
    }

    /// Renders the statements making a column unique.
    fn add_unique_sql(&self, table: &TableName, column: &Column) -> Vec<String> {
        vec![format!(
            "ALTER TABLE {} ADD UNIQUE({})",
            self.qualify(table),
            self.identifier(&column.name)
        )]
    }

    /// Renders the statements dropping the unique constraint of a live
    /// column. Empty when the constraint name is unknown.
    fn drop_unique_sql(&self, table: &TableName, column: &Column) -> Vec<String> {
        column
            .unique_index
            .iter()
            .map(|name| {
                format!(
                    "ALTER TABLE {} DROP CONSTRAINT {}",
                    self.qualify(table),
                    self.identifier(name)
                )
            })
            .collect()
    }

    /// Renders `CREATE INDEX`.
    fn create_index_sql(&self, table: &TableName, index: &Index) -> String {
        let columns: Vec<String> = index.columns.iter().map(|c| self.identifier(c)).collect();
        format!(
            "CREATE {}INDEX {} ON {} ({})",
            if index.unique { "UNIQUE " } else { "" },
            self.identifier(&index.name),
            self.qualify(table),
            columns.join(", ")
        )
    }

    /// Returns whether `ON UPDATE` rules are supported.
    fn supports_on_update(&self) -> bool {
        true
    }

    /// Returns whether the given `ON DELETE` rule is supported.
    fn supports_on_delete(&self, _rule: ForeignKeyRule) -> bool {
        true
    }

    /// Returns whether foreign keys can be added to an existing table.
    /// When not, they are declared inside `CREATE TABLE`.
    fn supports_add_foreign_key(&self) -> bool {
        true
    }

    /// Renders `CONSTRAINT .. FOREIGN KEY .. REFERENCES ..` with the
    /// supported rules.
    fn foreign_key_clause(&self, foreign_key: &ForeignKey) -> String {
        let columns: Vec<String> = foreign_key.columns.iter().map(|c| self.identifier(c)).collect();
        let foreign_columns: Vec<String> = foreign_key
            .foreign_columns
            .iter()
            .map(|c| self.identifier(c))
            .collect();
        let mut sql = format!(
            "CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({})",
            self.identifier(&foreign_key.name),
            columns.join(", "),
            self.qualify_dotted(&foreign_key.foreign_table),
            foreign_columns.join(", ")
        );
        if foreign_key.on_update != ForeignKeyRule::NoAction && self.supports_on_update() {
            sql.push_str(" ON UPDATE ");
            sql.push_str(foreign_key.on_update.to_sql());
        }
        if foreign_key.on_delete != ForeignKeyRule::NoAction
            && self.supports_on_delete(foreign_key.on_delete)
        {
            sql.push_str(" ON DELETE ");
            sql.push_str(foreign_key.on_delete.to_sql());
        }
        sql
    }

    /// Renders a foreign key addition.
    fn create_foreign_key_sql(&self, table: &TableName, foreign_key: &ForeignKey) -> String {
        format!(
            "ALTER TABLE {} ADD {}",
            self.qualify(table),
            self.foreign_key_clause(foreign_key)
        )
    }

    /// Renders a table comment.
    fn comment_on_table_sql(&self, table: &TableName, comment: &str) -> Vec<String> {
        match self.settings().comments {
            CommentSupport::None => Vec::new(),
            CommentSupport::Inline => vec![format!(
                "ALTER TABLE {} COMMENT {}",
                self.qualify(table),
                self.string_literal(comment)
            )],
            CommentSupport::Statement => vec![format!(
                "COMMENT ON TABLE {} IS {}",
                self.qualify(table),
                self.string_literal(comment)
            )],
        }
    }

    /// Renders a column comment as a separate statement. Vendors with
    /// inline comments change them through a column redefinition.
    fn comment_on_column_sql(&self, table: &TableName, column: &Column) -> Vec<String> {
        if self.settings().comments != CommentSupport::Statement {
            return Vec::new();
        }
        vec![format!(
            "COMMENT ON COLUMN {}.{} IS {}",
            self.qualify(table),
            self.identifier(&column.name),
            self.string_literal(column.comment.as_deref().unwrap_or_default())
        )]
    }

    /// Returns whether a column can be resized to `new_type` in place.
    /// Only the variable-length text type qualifies.
    fn alters_size_in_place(&self, new_type: &str) -> bool {
        NativeType::parse(new_type)
            .base
            .starts_with(self.settings().varchar_type)
    }

    /// Returns whether a property change can be applied without
    /// rewriting the column. `old` is the live column.
    fn supports_safe_alter(&self, old: &Column, change: &ColumnPropertyChange) -> bool {
        match change {
            ColumnPropertyChange::Type { .. } => false,
            ColumnPropertyChange::Size { new, .. } => self.alters_size_in_place(new),
            ColumnPropertyChange::Unique { old: true, new: false } => old.unique_index.is_some(),
            ColumnPropertyChange::Comment { .. } => self.supports_column_comment(),
            _ => true,
        }
    }

    /// Renders the least destructive statements for a column change.
    ///
    /// The default emits one targeted statement per property, in the
    /// order unique, default, nullable, size, comment.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Unsupported`] for a base type change, which
    /// never has a safe form.
    fn safe_alter_column_sql(&self, change: &ColumnDefinitionChange) -> Result<Vec<String>> {
        let mut sqls = Vec::new();
        for property in &change.changes {
            match property {
                ColumnPropertyChange::Unique { new: true, .. } => {
                    sqls.extend(self.add_unique_sql(&change.table, &change.new));
                }
                ColumnPropertyChange::Unique { .. } => {
                    sqls.extend(self.drop_unique_sql(&change.table, &change.old));
                }
                ColumnPropertyChange::Default { .. } => {
                    sqls.extend(self.alter_default_sql(&change.table, &change.new));
                }
                ColumnPropertyChange::Nullable { .. } => {
                    sqls.extend(self.alter_nullable_sql(&change.table, &change.new));
                }
                ColumnPropertyChange::Size { .. } => {
                    sqls.extend(self.alter_size_sql(&change.table, &change.new)?);
                }
                ColumnPropertyChange::Comment { .. } => {
                    sqls.extend(self.comment_on_column_sql(&change.table, &change.new));
                }
                ColumnPropertyChange::Type { .. } => {
                    return Err(DbError::unsupported(
                        self.name(),
                        format!("changing the type of {}.{}", change.table, change.new.name),
                    ));
                }
            }
        }
        Ok(sqls)
    }

    /// Returns `ALTER TABLE t ALTER COLUMN c`.
    fn alter_column_prefix(&self, table: &TableName, column: &str) -> String {
        format!(
            "ALTER TABLE {} ALTER COLUMN {}",
            self.qualify(table),
            self.identifier(column)
        )
    }

    /// Renders a default change to the declared default.
    fn alter_default_sql(&self, table: &TableName, column: &Column) -> Vec<String> {
        let prefix = self.alter_column_prefix(table, &column.name);
        vec![match self.default_value_sql(column) {
            Some(default) => format!("{prefix} SET DEFAULT {default}"),
            None => format!("{prefix} DROP DEFAULT"),
        }]
    }

    /// Renders a nullability change to the declared value.
    fn alter_nullable_sql(&self, table: &TableName, column: &Column) -> Vec<String> {
        let prefix = self.alter_column_prefix(table, &column.name);
        vec![if column.is_nullable() {
            format!("{prefix} DROP NOT NULL")
        } else {
            format!("{prefix} SET NOT NULL")
        }]
    }

    /// Renders a size change to the declared type.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::UnmappedType`] when the type is not registered.
    fn alter_size_sql(&self, table: &TableName, column: &Column) -> Result<Vec<String>> {
        Ok(vec![format!(
            "{} SET DATA TYPE {}",
            self.alter_column_prefix(table, &column.name),
            self.native_type(column)?
        )])
    }

    /// Renders one change of a change set.
    ///
    /// # Errors
    ///
    /// Propagates type mapping and capability errors.
    fn generate_sql(&self, change: &SchemaChange) -> Result<Vec<String>> {
        match change {
            SchemaChange::CreateTable(table) => self.create_table_sql(table),
            SchemaChange::AddColumn { table, column } => self.add_column_sql(table, column),
            SchemaChange::AlterColumn(change) => self.safe_alter_column_sql(change),
            SchemaChange::CommentTable { table, comment } => {
                Ok(self.comment_on_table_sql(table, comment))
            }
            SchemaChange::AddIndex { table, index } => Ok(vec![self.create_index_sql(table, index)]),
            SchemaChange::AddForeignKey { table, foreign_key } => {
                Ok(vec![self.create_foreign_key_sql(table, foreign_key)])
            }
            SchemaChange::CreateSequence(sequence) => self.create_sequence_sql(sequence),
            SchemaChange::DropSequence(sequence) => {
                self.drop_sequence_sql(&sequence.qualified_name())
            }
        }
    }

    /// Renders `CREATE SEQUENCE`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Unsupported`] without sequence support.
    fn create_sequence_sql(&self, sequence: &Sequence) -> Result<Vec<String>> {
        self.sequences()
            .map(|s| s.sequence_ddl(sequence))
            .ok_or_else(|| DbError::unsupported(self.name(), "sequences"))
    }

    /// Renders `DROP SEQUENCE`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Unsupported`] without sequence support.
    fn drop_sequence_sql(&self, name: &TableName) -> Result<Vec<String>> {
        self.sequences()
            .map(|s| s.drop_sequence_ddl(name))
            .ok_or_else(|| DbError::unsupported(self.name(), "sequences"))
    }

    /// Expression yielding the next value of a sequence.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Unsupported`] without sequence support.
    fn next_value_expr(&self, name: &TableName) -> Result<String> {
        self.sequences()
            .map(|s| s.next_value(name))
            .ok_or_else(|| DbError::unsupported(self.name(), "sequences"))
    }

    /// Expression yielding the current value of a sequence.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Unsupported`] without sequence support or
    /// without session-visible current values.
    fn current_value_expr(&self, name: &TableName) -> Result<String> {
        self.sequences()
            .ok_or_else(|| DbError::unsupported(self.name(), "sequences"))?
            .current_value(name)
    }

    /// Appends vendor pagination to a query.
    fn rewrite_for_limit(&self, sql: &str, limit: Limit) -> LimitedSql {
        LimitedSql {
            sql: format!("{sql} limit ? offset ?"),
            args: vec![limit.rows, limit.offset],
        }
    }

    /// Returns whether an index was generated by the database or by this
    /// engine rather than declared.
    fn is_internal_index(&self, _table: &Table, index: &Index) -> bool {
        index
            .name
            .to_ascii_uppercase()
            .starts_with(INTERNAL_NAME_PREFIX)
    }

    /// Returns whether a sequence was generated by the database.
    /// `tables` are the live tables read alongside it.
    fn is_internal_sequence(&self, _name: &str, _tables: &[Table]) -> bool {
        false
    }

    /// Returns whether a raw column default was generated by the
    /// database, such as an identity sequence call.
    fn is_internal_default_value(&self, _raw: &str) -> bool {
        false
    }
}

/// Alters a column by redefining it.
///
/// Unique drops come first, then one redefinition carrying every other
/// property, then unique additions. `redefine` receives the declared
/// column with its unique flag cleared.
///
/// # Errors
///
/// Propagates errors from `redefine`.
pub fn redefine_column_sql<D, F>(
    dialect: &D,
    change: &ColumnDefinitionChange,
    redefine: F,
) -> Result<Vec<String>>
where
    D: Dialect + ?Sized,
    F: FnOnce(&Column) -> Result<Vec<String>>,
{
    let mut sqls = Vec::new();
    if change.removes_unique() {
        sqls.extend(dialect.drop_unique_sql(&change.table, &change.old));
    }
    if change.has_non_unique_changes() {
        let column = Column {
            unique: false,
            ..change.new.clone()
        };
        sqls.extend(redefine(&column)?);
    }
    if change.adds_unique() {
        sqls.extend(dialect.add_unique_sql(&change.table, &change.new));
    }
    Ok(sqls)
}

/// Appends `keyword value` when the value is set.
pub(crate) fn push_clause(parts: &mut Vec<String>, keyword: &str, value: Option<i64>) {
    if let Some(value) = value {
        parts.push(format!("{keyword} {value}"));
    }
}
