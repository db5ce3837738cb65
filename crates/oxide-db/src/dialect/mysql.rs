//! MySQL and MariaDB dialect.

use super::{
    redefine_column_sql, CaseFolding, CommentSupport, Dialect, DialectSettings, Limit, LimitedSql,
};
use crate::changes::{ColumnDefinitionChange, ColumnPropertyChange};
use crate::error::Result;
use crate::schema::{Column, Index, Table, TableName, TypeCode};
use crate::types::TypeRegistry;

const SETTINGS: DialectSettings = DialectSettings {
    name: "MySQL",
    open_quote: '`',
    close_quote: '`',
    case_folding: CaseFolding::Preserve,
    keywords: &[
        "DATABASE", "DATABASES", "DIV", "INDEX", "INTERVAL", "KEYS", "LIMIT", "LOCK", "RANGE",
        "READ", "REGEXP", "RLIKE", "SCHEMA", "SHOW", "WRITE",
    ],
    system_schemas: &["INFORMATION_SCHEMA", "PERFORMANCE_SCHEMA", "MYSQL", "SYS"],
    auto_increment: Some("AUTO_INCREMENT"),
    comments: CommentSupport::Inline,
    ..DialectSettings::STANDARD
};

/// MySQL dialect, also used for MariaDB.
#[derive(Debug)]
pub struct MySqlDialect {
    types: TypeRegistry,
}

impl MySqlDialect {
    /// Creates a new MySQL dialect.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the type registry is invalid.
    pub fn new() -> Result<Self> {
        let types = TypeRegistry::builder(SETTINGS.name)
            .canonical(TypeCode::Boolean, "bit", TypeCode::Bit)
            .add(TypeCode::Bit, "bit")
            .add(TypeCode::TinyInt, "tinyint")
            .add(TypeCode::SmallInt, "smallint")
            .add(TypeCode::Integer, "integer")
            .add(TypeCode::BigInt, "bigint")
            .add(TypeCode::Real, "float")
            .canonical(TypeCode::Float, "double", TypeCode::Double)
            .add(TypeCode::Double, "double")
            .add(TypeCode::Decimal, "decimal($p,$s)")
            .canonical(TypeCode::Numeric, "decimal($p,$s)", TypeCode::Decimal)
            .ranged(TypeCode::Char, "char($l)", 0, 255)
            .ranged(TypeCode::Varchar, "varchar($l)", 0, 65535)
            .register(TypeCode::Varchar, "longtext", Some(65536), None, Some(TypeCode::LongVarchar))
            .add(TypeCode::LongVarchar, "longtext")
            .ranged(TypeCode::Binary, "binary($l)", 1, 255)
            .register(TypeCode::Binary, "longblob", Some(256), None, Some(TypeCode::LongVarBinary))
            .ranged(TypeCode::VarBinary, "varbinary($l)", 1, 65535)
            .register(TypeCode::VarBinary, "longblob", Some(65536), None, Some(TypeCode::LongVarBinary))
            .add(TypeCode::LongVarBinary, "longblob")
            .add(TypeCode::Date, "date")
            .add(TypeCode::Time, "time")
            .add(TypeCode::Timestamp, "datetime")
            .add(TypeCode::Blob, "blob")
            .add(TypeCode::Clob, "text")
            .alias("int", TypeCode::Integer)
            .alias("mediumint", TypeCode::Integer)
            .alias("double precision", TypeCode::Double)
            .alias("numeric", TypeCode::Decimal)
            .alias("timestamp", TypeCode::Timestamp)
            .alias("mediumtext", TypeCode::LongVarchar)
            .alias("tinytext", TypeCode::Varchar)
            .alias("mediumblob", TypeCode::LongVarBinary)
            .alias("tinyblob", TypeCode::VarBinary)
            .build()?;
        Ok(Self { types })
    }
}

impl Dialect for MySqlDialect {
    fn settings(&self) -> &DialectSettings {
        &SETTINGS
    }

    fn types(&self) -> &TypeRegistry {
        &self.types
    }

    fn escape(&self, value: &str) -> String {
        value.replace('\\', "\\\\").replace('\'', "''")
    }

    fn drop_unique_sql(&self, table: &TableName, column: &Column) -> Vec<String> {
        column
            .unique_index
            .iter()
            .map(|name| {
                format!(
                    "ALTER TABLE {} DROP INDEX {}",
                    self.qualify(table),
                    self.identifier(name)
                )
            })
            .collect()
    }

    fn supports_safe_alter(&self, old: &Column, change: &ColumnPropertyChange) -> bool {
        match change {
            ColumnPropertyChange::Type { .. } => false,
            ColumnPropertyChange::Size { new, .. } => self.alters_size_in_place(new),
            ColumnPropertyChange::Unique { old: true, new: false } => old.unique_index.is_some(),
            _ => true,
        }
    }

    fn safe_alter_column_sql(&self, change: &ColumnDefinitionChange) -> Result<Vec<String>> {
        redefine_column_sql(self, change, |column| {
            Ok(vec![format!(
                "ALTER TABLE {} MODIFY COLUMN {}",
                self.qualify(&change.table),
                self.column_definition(column)?
            )])
        })
    }

    fn rewrite_for_limit(&self, sql: &str, limit: Limit) -> LimitedSql {
        LimitedSql {
            sql: format!("{sql} limit ?,?"),
            args: vec![limit.offset, limit.rows],
        }
    }

    fn is_internal_index(&self, table: &Table, index: &Index) -> bool {
        let name = index.name.as_str();
        let named_after_column = index.unique
            && index.columns.len() == 1
            && index.columns[0].eq_ignore_ascii_case(name);
        let named_after_fk = table
            .foreign_keys
            .iter()
            .any(|fk| fk.name.eq_ignore_ascii_case(name));
        name.eq_ignore_ascii_case("PRIMARY")
            || named_after_column
            || named_after_fk
            || name.to_ascii_uppercase().starts_with(super::INTERNAL_NAME_PREFIX)
    }
}
