//! H2 dialect.

use regex::Regex;

use super::{
    push_clause, redefine_column_sql, CommentSupport, Dialect, DialectSettings, Limit, LimitedSql,
    SequenceDialect,
};
use crate::changes::{ColumnDefinitionChange, ColumnProperty};
use crate::error::{DbError, Result};
use crate::schema::{Index, Sequence, Table, TableName, TypeCode};
use crate::types::TypeRegistry;

const SETTINGS: DialectSettings = DialectSettings {
    name: "H2",
    keywords: &["LIMIT", "MINUS", "OFFSET", "ROWNUM", "SYSDATE", "SYSTIME", "TODAY", "TOP"],
    default_schema: Some("PUBLIC"),
    true_literal: "TRUE",
    false_literal: "FALSE",
    auto_increment: Some("AUTO_INCREMENT"),
    comments: CommentSupport::Statement,
    ..DialectSettings::STANDARD
};

/// H2 dialect.
#[derive(Debug)]
pub struct H2Dialect {
    types: TypeRegistry,
    internal_index: Regex,
    internal_sequence: Regex,
}

impl H2Dialect {
    /// Creates a new H2 dialect.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the type registry is invalid.
    pub fn new() -> Result<Self> {
        let types = TypeRegistry::builder(SETTINGS.name)
            .add(TypeCode::Boolean, "boolean")
            .canonical(TypeCode::Bit, "boolean", TypeCode::Boolean)
            .add(TypeCode::TinyInt, "tinyint")
            .add(TypeCode::SmallInt, "smallint")
            .add(TypeCode::Integer, "integer")
            .add(TypeCode::BigInt, "bigint")
            .add(TypeCode::Real, "real")
            .canonical(TypeCode::Float, "double", TypeCode::Double)
            .add(TypeCode::Double, "double")
            .add(TypeCode::Decimal, "decimal($p,$s)")
            .canonical(TypeCode::Numeric, "decimal($p,$s)", TypeCode::Decimal)
            .add(TypeCode::Char, "char($l)")
            .add(TypeCode::Varchar, "varchar($l)")
            .add(TypeCode::LongVarchar, "longvarchar")
            .add(TypeCode::Binary, "binary($l)")
            .add(TypeCode::VarBinary, "varbinary($l)")
            .add(TypeCode::LongVarBinary, "longvarbinary")
            .add(TypeCode::Date, "date")
            .add(TypeCode::Time, "time")
            .add(TypeCode::Timestamp, "timestamp")
            .add(TypeCode::Blob, "blob")
            .add(TypeCode::Clob, "clob")
            .alias("int", TypeCode::Integer)
            .alias("double precision", TypeCode::Double)
            .alias("float", TypeCode::Double)
            .alias("numeric", TypeCode::Decimal)
            .alias("character", TypeCode::Char)
            .alias("character varying", TypeCode::Varchar)
            .alias("binary varying", TypeCode::VarBinary)
            .alias("character large object", TypeCode::Clob)
            .alias("binary large object", TypeCode::Blob)
            .build()?;
        let config = |e: regex::Error| DbError::Configuration(e.to_string());
        Ok(Self {
            types,
            internal_index: Regex::new(r"(?i)^(PRIMARY_KEY_|CONSTRAINT_INDEX_)").map_err(config)?,
            internal_sequence: Regex::new(r"(?i)SYSTEM_SEQUENCE_").map_err(config)?,
        })
    }
}

impl Dialect for H2Dialect {
    fn settings(&self) -> &DialectSettings {
        &SETTINGS
    }

    fn types(&self) -> &TypeRegistry {
        &self.types
    }

    fn sequences(&self) -> Option<&dyn SequenceDialect> {
        Some(self)
    }

    fn safe_alter_column_sql(&self, change: &ColumnDefinitionChange) -> Result<Vec<String>> {
        redefine_column_sql(self, change, |column| {
            let mut sqls = Vec::new();
            let redefines = [ColumnProperty::Default, ColumnProperty::Nullable, ColumnProperty::Size]
                .into_iter()
                .any(|p| change.has(p));
            if redefines {
                sqls.push(format!(
                    "ALTER TABLE {} ALTER COLUMN {}",
                    self.qualify(&change.table),
                    self.column_definition(column)?
                ));
            }
            if change.has(ColumnProperty::Comment) {
                sqls.extend(self.comment_on_column_sql(&change.table, column));
            }
            Ok(sqls)
        })
    }

    fn rewrite_for_limit(&self, sql: &str, limit: Limit) -> LimitedSql {
        LimitedSql {
            sql: format!("{sql} limit ?,?"),
            args: vec![limit.offset, limit.rows],
        }
    }

    fn is_internal_index(&self, _table: &Table, index: &Index) -> bool {
        self.internal_index.is_match(&index.name)
            || index
                .name
                .to_ascii_uppercase()
                .starts_with(super::INTERNAL_NAME_PREFIX)
    }

    fn is_internal_sequence(&self, name: &str, _tables: &[Table]) -> bool {
        self.internal_sequence.is_match(name)
    }

    fn is_internal_default_value(&self, raw: &str) -> bool {
        self.internal_sequence.is_match(raw)
    }
}

impl SequenceDialect for H2Dialect {
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
        vec![format!("DROP SEQUENCE IF EXISTS {}", self.qualify(name))]
    }

    fn next_value(&self, name: &TableName) -> String {
        format!("NEXT VALUE FOR {}", self.qualify(name))
    }

    fn current_value(&self, name: &TableName) -> Result<String> {
        Ok(format!("CURRENT VALUE FOR {}", self.qualify(name)))
    }
}
