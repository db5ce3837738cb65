//! Apache Derby dialect.

use regex::Regex;

use super::{
    push_clause, Dialect, DialectSettings, Limit, LimitedSql, SequenceDialect,
    INTERNAL_NAME_PREFIX,
};
use crate::changes::ColumnPropertyChange;
use crate::error::{DbError, Result};
use crate::schema::{Column, Index, Sequence, Table, TableName, TypeCode};
use crate::types::TypeRegistry;

const SETTINGS: DialectSettings = DialectSettings {
    name: "Derby",
    keywords: &["USER", "BOOLEAN", "OFFSET"],
    system_schemas: &[
        "NULLID", "SQLJ", "SYS", "SYSCAT", "SYSCS_DIAG", "SYSCS_UTIL", "SYSFUN", "SYSIBM",
        "SYSPROC", "SYSSTAT",
    ],
    true_literal: "TRUE",
    false_literal: "FALSE",
    auto_increment: Some("GENERATED BY DEFAULT AS IDENTITY"),
    ..DialectSettings::STANDARD
};

const UNIQUE_INDEX_PREFIX: &str = "INTERNAL_UNIQUE_IX_";

/// Apache Derby dialect.
///
/// Derby names every index backing a constraint `SQL` followed by a
/// timestamp; those are never reported as declared indexes. Unique
/// columns are enforced through an `INTERNAL_UNIQUE_IX_` index so that
/// the constraint can later be found and dropped by name.
#[derive(Debug)]
pub struct DerbyDialect {
    types: TypeRegistry,
    internal_index: Regex,
}

impl DerbyDialect {
    /// Creates a new Derby dialect.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the type registry is invalid.
    pub fn new() -> Result<Self> {
        let types = TypeRegistry::builder(SETTINGS.name)
            .add(TypeCode::Boolean, "boolean")
            .canonical(TypeCode::Bit, "smallint", TypeCode::SmallInt)
            .canonical(TypeCode::TinyInt, "smallint", TypeCode::SmallInt)
            .add(TypeCode::SmallInt, "smallint")
            .add(TypeCode::Integer, "integer")
            .add(TypeCode::BigInt, "bigint")
            .add(TypeCode::Real, "real")
            .canonical(TypeCode::Float, "double", TypeCode::Double)
            .add(TypeCode::Double, "double")
            .add(TypeCode::Decimal, "decimal($p,$s)")
            .canonical(TypeCode::Numeric, "decimal($p,$s)", TypeCode::Decimal)
            .ranged(TypeCode::Char, "char($l)", 1, 254)
            .ranged(TypeCode::Varchar, "varchar($l)", 0, 32672)
            .register(TypeCode::Varchar, "clob", Some(32673), None, Some(TypeCode::Clob))
            .add(TypeCode::LongVarchar, "long varchar")
            .ranged(TypeCode::Binary, "char($l) for bit data", 1, 254)
            .register(TypeCode::Binary, "blob", Some(255), None, Some(TypeCode::Blob))
            .ranged(TypeCode::VarBinary, "varchar($l) for bit data", 1, 32672)
            .register(TypeCode::VarBinary, "blob", Some(32673), None, Some(TypeCode::Blob))
            .add(TypeCode::LongVarBinary, "long varchar for bit data")
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
            .build()?;
        let internal_index =
            Regex::new(r"(?i)^SQL\d+$").map_err(|e| DbError::Configuration(e.to_string()))?;
        Ok(Self {
            types,
            internal_index,
        })
    }

    fn unique_index_name(column: &str) -> String {
        format!("{UNIQUE_INDEX_PREFIX}{}", column.to_ascii_uppercase())
    }
}

impl Dialect for DerbyDialect {
    fn settings(&self) -> &DialectSettings {
        &SETTINGS
    }

    fn types(&self) -> &TypeRegistry {
        &self.types
    }

    fn sequences(&self) -> Option<&dyn SequenceDialect> {
        Some(self)
    }

    fn null_clause(&self, nullable: bool) -> &'static str {
        if nullable {
            ""
        } else {
            "NOT NULL"
        }
    }

    fn add_unique_sql(&self, table: &TableName, column: &Column) -> Vec<String> {
        vec![format!(
            "CREATE UNIQUE INDEX {} ON {} ({})",
            Self::unique_index_name(&column.name),
            self.qualify(table),
            self.identifier(&column.name)
        )]
    }

    fn drop_unique_sql(&self, table: &TableName, column: &Column) -> Vec<String> {
        let schema = table.schema.as_deref();
        column
            .unique_index
            .iter()
            .filter(|name| name.to_ascii_uppercase().starts_with(INTERNAL_NAME_PREFIX))
            .map(|name| {
                let mut index = TableName::new(name.clone());
                index.schema = schema.map(str::to_string);
                format!("DROP INDEX {}", self.qualify(&index))
            })
            .collect()
    }

    fn supports_safe_alter(&self, old: &Column, change: &ColumnPropertyChange) -> bool {
        match change {
            ColumnPropertyChange::Unique { old: true, new: false } => old
                .unique_index
                .as_deref()
                .is_some_and(|n| n.to_ascii_uppercase().starts_with(INTERNAL_NAME_PREFIX)),
            ColumnPropertyChange::Type { .. } | ColumnPropertyChange::Comment { .. } => false,
            ColumnPropertyChange::Size { new, .. } => self.alters_size_in_place(new),
            _ => true,
        }
    }

    fn alter_nullable_sql(&self, table: &TableName, column: &Column) -> Vec<String> {
        let prefix = self.alter_column_prefix(table, &column.name);
        vec![if column.is_nullable() {
            format!("{prefix} NULL")
        } else {
            format!("{prefix} NOT NULL")
        }]
    }

    fn rewrite_for_limit(&self, sql: &str, limit: Limit) -> LimitedSql {
        LimitedSql {
            sql: format!("{sql} offset ? rows fetch first ? rows only"),
            args: vec![limit.offset, limit.rows],
        }
    }

    fn is_internal_index(&self, _table: &Table, index: &Index) -> bool {
        self.internal_index.is_match(&index.name)
            || index
                .name
                .to_ascii_uppercase()
                .starts_with(INTERNAL_NAME_PREFIX)
    }
}

impl SequenceDialect for DerbyDialect {
    fn sequence_ddl(&self, sequence: &Sequence) -> Vec<String> {
        let mut parts = vec![format!(
            "CREATE SEQUENCE {}",
            self.qualify(&sequence.qualified_name())
        )];
        push_clause(&mut parts, "START WITH", sequence.start);
        push_clause(&mut parts, "INCREMENT BY", sequence.increment);
        push_clause(&mut parts, "MINVALUE", sequence.min_value);
        push_clause(&mut parts, "MAXVALUE", sequence.max_value);
        parts.push(if sequence.cycle == Some(true) { "CYCLE" } else { "NO CYCLE" }.to_string());
        vec![parts.join(" ")]
    }

    fn drop_sequence_ddl(&self, name: &TableName) -> Vec<String> {
        vec![format!("DROP SEQUENCE {} RESTRICT", self.qualify(name))]
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::changes::ColumnDefinitionChange;

    fn dialect() -> DerbyDialect {
        DerbyDialect::new().unwrap()
    }

    #[test]
    fn test_generated_index_names_are_internal() {
        let d = dialect();
        let table = Table::new("USERS");
        assert!(d.is_internal_index(&table, &Index::new("SQL140908223119600", vec![])));
        assert!(d.is_internal_index(&table, &Index::new("INTERNAL_UNIQUE_IX_EMAIL", vec![])));
        assert!(!d.is_internal_index(&table, &Index::new("SQLITE_IDX", vec![])));
        assert!(!d.is_internal_index(&table, &Index::new("IX_USERS_EMAIL", vec![])));
    }

    #[test]
    fn test_nullable_columns_have_no_null_clause() {
        let d = dialect();
        let name = Column::new("name", TypeCode::Varchar).length(40);
        assert_eq!(d.column_definition(&name).unwrap(), "name varchar(40)");
    }

    #[test]
    fn test_targeted_alteration() {
        let d = dialect();
        let old = Column::new("email", TypeCode::Varchar).length(50);
        let new = Column::new("email", TypeCode::Varchar).length(100).unique().not_null();
        let mut change = ColumnDefinitionChange::new(TableName::new("users"), old, new);
        change.push(ColumnPropertyChange::Size {
            old: "varchar(50)".into(),
            new: "varchar(100)".into(),
        });
        change.push(ColumnPropertyChange::Nullable {
            old: true,
            new: false,
        });
        change.push(ColumnPropertyChange::Unique {
            old: false,
            new: true,
        });

        assert_eq!(
            d.safe_alter_column_sql(&change).unwrap(),
            vec![
                "CREATE UNIQUE INDEX INTERNAL_UNIQUE_IX_EMAIL ON users (email)",
                "ALTER TABLE users ALTER COLUMN email NOT NULL",
                "ALTER TABLE users ALTER COLUMN email SET DATA TYPE varchar(100)",
            ]
        );
    }

    #[test]
    fn test_unique_drop_requires_internal_index() {
        let d = dialect();
        let removal = ColumnPropertyChange::Unique {
            old: true,
            new: false,
        };
        let mut generated = Column::new("email", TypeCode::Varchar).unique();
        generated.unique_index = Some("SQL140908223119601".into());
        assert!(!d.supports_safe_alter(&generated, &removal));

        let mut ours = Column::new("email", TypeCode::Varchar).unique();
        ours.unique_index = Some("INTERNAL_UNIQUE_IX_EMAIL".into());
        assert!(d.supports_safe_alter(&ours, &removal));
        assert_eq!(
            d.drop_unique_sql(&TableName::new("users"), &ours),
            vec!["DROP INDEX INTERNAL_UNIQUE_IX_EMAIL"]
        );
    }

    #[test]
    fn test_sequences_without_current_value() {
        let d = dialect();
        let name = TableName::new("seq1");
        assert_eq!(
            d.create_sequence_sql(&Sequence::new("seq1").start(1)).unwrap(),
            vec!["CREATE SEQUENCE seq1 START WITH 1 NO CYCLE"]
        );
        assert_eq!(
            d.drop_sequence_sql(&name).unwrap(),
            vec!["DROP SEQUENCE seq1 RESTRICT"]
        );
        assert_eq!(d.next_value_expr(&name).unwrap(), "NEXT VALUE FOR seq1");
        assert!(!d.supports_current_sequence_value());
        assert!(d.current_value_expr(&name).unwrap_err().is_unsupported());
    }

    #[test]
    fn test_limit() {
        let limited = dialect().rewrite_for_limit("select * from t", Limit { offset: 3, rows: 7 });
        assert_eq!(limited.sql, "select * from t offset ? rows fetch first ? rows only");
        assert_eq!(limited.args, vec![3, 7]);
    }

    #[test]
    fn test_type_round_trip() {
        crate::dialect::tests::assert_types_round_trip(&dialect());
    }
}
