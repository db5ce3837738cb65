//! Microsoft SQL Server dialect.

use super::{
    push_clause, redefine_column_sql, CaseFolding, Dialect, DialectSettings, Limit, LimitedSql,
    SequenceDialect, INTERNAL_NAME_PREFIX,
};
use crate::changes::{ColumnDefinitionChange, ColumnPropertyChange};
use crate::error::{DbError, Result};
use crate::schema::{Column, Index, Sequence, Table, TableName, TypeCode};
use crate::types::TypeRegistry;

const SETTINGS: DialectSettings = DialectSettings {
    name: "SQLServer",
    case_folding: CaseFolding::Preserve,
    keywords: &[
        "BACKUP", "BROWSE", "CLUSTERED", "DATABASE", "FILE", "IDENTITY", "INDEX", "KILL",
        "NONCLUSTERED", "PERCENT", "PLAN", "PROC", "PROCEDURE", "PUBLIC", "TOP", "TRAN",
        "TRANSACTION", "USER",
    ],
    system_schemas: &[
        "INFORMATION_SCHEMA", "SYS", "GUEST", "DB_OWNER", "DB_ACCESSADMIN", "DB_SECURITYADMIN",
        "DB_DDLADMIN", "DB_BACKUPOPERATOR", "DB_DATAREADER", "DB_DATAWRITER", "DB_DENYDATAREADER",
        "DB_DENYDATAWRITER",
    ],
    default_schema: Some("dbo"),
    auto_increment: Some("IDENTITY"),
    inline_unique: false,
    add_column_prefix: "ADD ",
    ..DialectSettings::STANDARD
};

/// Microsoft SQL Server dialect (2012 and later).
#[derive(Debug)]
pub struct SqlServerDialect {
    types: TypeRegistry,
}

impl SqlServerDialect {
    /// Creates a new SQL Server dialect.
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
            .add(TypeCode::Integer, "int")
            .add(TypeCode::BigInt, "bigint")
            .add(TypeCode::Real, "real")
            .canonical(TypeCode::Float, "float", TypeCode::Double)
            .add(TypeCode::Double, "float")
            .add(TypeCode::Decimal, "decimal($p,$s)")
            .canonical(TypeCode::Numeric, "decimal($p,$s)", TypeCode::Decimal)
            .ranged(TypeCode::Char, "char($l)", 1, 8000)
            .ranged(TypeCode::Varchar, "varchar($l)", 1, 8000)
            .register(TypeCode::Varchar, "varchar(max)", Some(8001), None, None)
            .add(TypeCode::LongVarchar, "text")
            .canonical(TypeCode::Clob, "varchar(max)", TypeCode::Varchar)
            .ranged(TypeCode::Binary, "binary($l)", 1, 8000)
            .ranged(TypeCode::VarBinary, "varbinary($l)", 1, 8000)
            .register(TypeCode::VarBinary, "varbinary(max)", Some(8001), None, None)
            .add(TypeCode::LongVarBinary, "image")
            .canonical(TypeCode::Blob, "varbinary(max)", TypeCode::VarBinary)
            .add(TypeCode::Date, "date")
            .add(TypeCode::Time, "time")
            .add(TypeCode::Timestamp, "datetime")
            .alias("integer", TypeCode::Integer)
            .alias("numeric", TypeCode::Decimal)
            .alias("double precision", TypeCode::Double)
            .alias("nchar", TypeCode::Char)
            .alias("nvarchar", TypeCode::Varchar)
            .alias("ntext", TypeCode::LongVarchar)
            .alias("datetime2", TypeCode::Timestamp)
            .build()?;
        Ok(Self { types })
    }
}

impl Dialect for SqlServerDialect {
    fn settings(&self) -> &DialectSettings {
        &SETTINGS
    }

    fn types(&self) -> &TypeRegistry {
        &self.types
    }

    fn sequences(&self) -> Option<&dyn SequenceDialect> {
        Some(self)
    }

    fn supports_safe_alter(&self, old: &Column, change: &ColumnPropertyChange) -> bool {
        match change {
            // Defaults are named constraints; replacing one needs its name.
            ColumnPropertyChange::Type { .. } | ColumnPropertyChange::Default { .. } => false,
            ColumnPropertyChange::Size { new, .. } => self.alters_size_in_place(new),
            ColumnPropertyChange::Unique { old: true, new: false } => old.unique_index.is_some(),
            ColumnPropertyChange::Comment { .. } => false,
            _ => true,
        }
    }

    fn safe_alter_column_sql(&self, change: &ColumnDefinitionChange) -> Result<Vec<String>> {
        redefine_column_sql(self, change, |column| {
            Ok(vec![format!(
                "{} {} {}",
                self.alter_column_prefix(&change.table, &column.name),
                self.native_type(column)?,
                self.null_clause(column.is_nullable())
            )])
        })
    }

    fn rewrite_for_limit(&self, sql: &str, limit: Limit) -> LimitedSql {
        let ordered = sql.to_ascii_lowercase().contains("order by");
        LimitedSql {
            sql: format!(
                "{sql}{} offset ? rows fetch next ? rows only",
                if ordered { "" } else { " order by 1" }
            ),
            args: vec![limit.offset, limit.rows],
        }
    }

    fn is_internal_index(&self, _table: &Table, index: &Index) -> bool {
        let name = index.name.to_ascii_uppercase();
        name.starts_with("PK__") || name.starts_with("UQ__") || name.starts_with(INTERNAL_NAME_PREFIX)
    }
}

impl SequenceDialect for SqlServerDialect {
    fn sequence_ddl(&self, sequence: &Sequence) -> Vec<String> {
        let mut parts = vec![format!(
            "CREATE SEQUENCE {}",
            self.qualify(&sequence.qualified_name())
        )];
        push_clause(&mut parts, "START WITH", sequence.start);
        push_clause(&mut parts, "INCREMENT BY", sequence.increment);
        push_clause(&mut parts, "MINVALUE", sequence.min_value);
        push_clause(&mut parts, "MAXVALUE", sequence.max_value);
        push_clause(&mut parts, "CACHE", sequence.cache);
        match sequence.cycle {
            Some(true) => parts.push("CYCLE".to_string()),
            Some(false) => parts.push("NO CYCLE".to_string()),
            None => {}
        }
        vec![parts.join(" ")]
    }

    fn drop_sequence_ddl(&self, name: &TableName) -> Vec<String> {
        vec![format!("DROP SEQUENCE {}", self.qualify(name))]
    }

    fn next_value(&self, name: &TableName) -> String {
        format!("NEXT VALUE FOR {}", self.qualify(name))
    }

    fn supports_current_value(&self) -> bool {
        false
    }

    fn current_value(&self, _name: &TableName) -> Result<String> {
        Err(DbError::unsupported(self.name(), "current sequence values"))
    }
}
