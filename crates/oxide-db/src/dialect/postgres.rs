//! PostgreSQL dialect.

use super::{push_clause, CaseFolding, CommentSupport, Dialect, DialectSettings, SequenceDialect};
use crate::error::Result;
use crate::schema::{Column, Index, Sequence, Table, TableName, TypeCode};
use crate::types::TypeRegistry;

const SETTINGS: DialectSettings = DialectSettings {
    name: "PostgreSQL",
    case_folding: CaseFolding::Lower,
    fold_quoted: true,
    keywords: &["USER", "ANALYSE", "ANALYZE", "LIMIT", "OFFSET", "RETURNING"],
    system_schemas: &["INFORMATION_SCHEMA", "PG_CATALOG"],
    default_schema: Some("public"),
    true_literal: "'1'",
    false_literal: "'0'",
    comments: CommentSupport::Statement,
    ..DialectSettings::STANDARD
};

/// PostgreSQL dialect.
#[derive(Debug)]
pub struct PostgresDialect {
    types: TypeRegistry,
}

impl PostgresDialect {
    /// Creates a new PostgreSQL dialect.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the type registry is invalid.
    pub fn new() -> Result<Self> {
        let types = TypeRegistry::builder(SETTINGS.name)
            .add(TypeCode::Boolean, "boolean")
            .add(TypeCode::Bit, "bit")
            .canonical(TypeCode::TinyInt, "smallint", TypeCode::SmallInt)
            .add(TypeCode::SmallInt, "smallint")
            .add(TypeCode::Integer, "integer")
            .add(TypeCode::BigInt, "bigint")
            .add(TypeCode::Real, "real")
            .canonical(TypeCode::Float, "double precision", TypeCode::Double)
            .add(TypeCode::Double, "double precision")
            .add(TypeCode::Decimal, "numeric($p,$s)")
            .canonical(TypeCode::Numeric, "numeric($p,$s)", TypeCode::Decimal)
            .add(TypeCode::Char, "char($l)")
            .add(TypeCode::Varchar, "varchar($l)")
            .add(TypeCode::LongVarchar, "text")
            .canonical(TypeCode::Clob, "text", TypeCode::LongVarchar)
            .canonical(TypeCode::Binary, "bytea", TypeCode::VarBinary)
            .add(TypeCode::VarBinary, "bytea")
            .canonical(TypeCode::LongVarBinary, "bytea", TypeCode::VarBinary)
            .add(TypeCode::Date, "date")
            .add(TypeCode::Time, "time")
            .add(TypeCode::Timestamp, "timestamp")
            .add(TypeCode::Blob, "oid")
            .alias("bool", TypeCode::Boolean)
            .alias("int2", TypeCode::SmallInt)
            .alias("int4", TypeCode::Integer)
            .alias("int", TypeCode::Integer)
            .alias("int8", TypeCode::BigInt)
            .alias("float4", TypeCode::Real)
            .alias("float8", TypeCode::Double)
            .alias("decimal", TypeCode::Decimal)
            .alias("bpchar", TypeCode::Char)
            .alias("character", TypeCode::Char)
            .alias("character varying", TypeCode::Varchar)
            .alias("time without time zone", TypeCode::Time)
            .alias("timestamp without time zone", TypeCode::Timestamp)
            .build()?;
        Ok(Self { types })
    }
}

impl Dialect for PostgresDialect {
    fn settings(&self) -> &DialectSettings {
        &SETTINGS
    }

    fn types(&self) -> &TypeRegistry {
        &self.types
    }

    fn sequences(&self) -> Option<&dyn SequenceDialect> {
        Some(self)
    }

    fn is_system_schema(&self, schema: &str) -> bool {
        schema.to_ascii_lowercase().starts_with("pg_toast")
            || self
                .system_schemas()
                .iter()
                .any(|s| s.eq_ignore_ascii_case(schema))
    }

    fn alter_size_sql(&self, table: &TableName, column: &Column) -> Result<Vec<String>> {
        Ok(vec![format!(
            "{} TYPE {}",
            self.alter_column_prefix(table, &column.name),
            self.native_type(column)?
        )])
    }

    fn is_internal_index(&self, table: &Table, index: &Index) -> bool {
        let name = index.name.to_ascii_lowercase();
        let prefix = format!("{}_", table.name.to_ascii_lowercase());
        let generated = name.starts_with(&prefix)
            && (name.ends_with("_pkey") || name.ends_with("_key"));
        generated || name.to_ascii_uppercase().starts_with(super::INTERNAL_NAME_PREFIX)
    }

    /// A sequence is owned by a serial or identity column when it is
    /// named `<table>_<column>_seq` after an auto-increment column.
    fn is_internal_sequence(&self, name: &str, tables: &[Table]) -> bool {
        tables.iter().any(|table| {
            table
                .columns
                .iter()
                .filter(|c| c.auto_increment)
                .any(|c| name.eq_ignore_ascii_case(&format!("{}_{}_seq", table.name, c.name)))
        })
    }

    fn is_internal_default_value(&self, raw: &str) -> bool {
        raw.trim_start().to_ascii_lowercase().starts_with("nextval(")
    }
}

impl SequenceDialect for PostgresDialect {
    fn sequence_ddl(&self, sequence: &Sequence) -> Vec<String> {
        let mut parts = vec![format!(
            "CREATE SEQUENCE {}",
            self.qualify(&sequence.qualified_name())
        )];
        push_clause(&mut parts, "INCREMENT", sequence.increment);
        push_clause(&mut parts, "MINVALUE", sequence.min_value);
        push_clause(&mut parts, "MAXVALUE", sequence.max_value);
        push_clause(&mut parts, "START", sequence.start);
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
        format!("nextval({})", self.string_literal(&self.qualify(name)))
    }

    fn current_value(&self, name: &TableName) -> Result<String> {
        Ok(format!("currval({})", self.string_literal(&self.qualify(name))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::changes::{ColumnDefinitionChange, ColumnPropertyChange};
    use crate::dialect::Limit;
    use crate::schema::DefaultValue;

    fn dialect() -> PostgresDialect {
        PostgresDialect::new().unwrap()
    }

    #[test]
    fn test_quoted_identifiers_are_lowercased() {
        let d = dialect();
        assert_eq!(d.quote_identifier("Users"), "\"users\"");
        assert_eq!(d.identifier("user"), "\"user\"");
        assert_eq!(d.identifier("email"), "email");
        assert_eq!(d.case_fold("EMAIL"), "email");
    }

    #[test]
    fn test_widen_and_add_unique() {
        let d = dialect();
        let old = Column::new("email", TypeCode::Varchar).length(50);
        let new = Column::new("email", TypeCode::Varchar).length(100).unique();
        let mut change = ColumnDefinitionChange::new(TableName::new("users"), old, new);
        change.push(ColumnPropertyChange::Size {
            old: "varchar(50)".into(),
            new: "varchar(100)".into(),
        });
        change.push(ColumnPropertyChange::Unique {
            old: false,
            new: true,
        });

        assert_eq!(
            d.safe_alter_column_sql(&change).unwrap(),
            vec![
                "ALTER TABLE users ADD UNIQUE(email)",
                "ALTER TABLE users ALTER COLUMN email TYPE varchar(100)",
            ]
        );
    }

    #[test]
    fn test_default_and_nullability_changes() {
        let d = dialect();
        let old = Column::new("status", TypeCode::Integer);
        let new = Column::new("status", TypeCode::Integer)
            .not_null()
            .default_value(DefaultValue::Integer(0));
        let mut change = ColumnDefinitionChange::new(TableName::new("jobs"), old, new);
        change.push(ColumnPropertyChange::Nullable {
            old: true,
            new: false,
        });
        change.push(ColumnPropertyChange::Default {
            old: None,
            new: Some("0".into()),
        });

        assert_eq!(
            d.safe_alter_column_sql(&change).unwrap(),
            vec![
                "ALTER TABLE jobs ALTER COLUMN status SET DEFAULT 0",
                "ALTER TABLE jobs ALTER COLUMN status SET NOT NULL",
            ]
        );
    }

    #[test]
    fn test_create_table_with_comments() {
        let d = dialect();
        let table = Table::new("users")
            .in_schema("app")
            .comment("Registered users")
            .column(Column::new("id", TypeCode::BigInt).primary_key())
            .column(Column::new("email", TypeCode::Varchar).length(100).unique().comment("Login"));
        assert_eq!(
            d.create_table_sql(&table).unwrap(),
            vec![
                "CREATE TABLE app.users (id bigint NOT NULL, email varchar(100) NULL UNIQUE, PRIMARY KEY (id))",
                "COMMENT ON TABLE app.users IS 'Registered users'",
                "COMMENT ON COLUMN app.users.email IS 'Login'",
            ]
        );
    }

    #[test]
    fn test_sequences() {
        let d = dialect();
        let seq = Sequence::new("seq1").start(1).increment(1).cycle(false);
        assert_eq!(
            d.create_sequence_sql(&seq).unwrap(),
            vec!["CREATE SEQUENCE seq1 INCREMENT 1 START 1 NO CYCLE"]
        );
        assert_eq!(
            d.drop_sequence_sql(&TableName::new("seq1")).unwrap(),
            vec!["DROP SEQUENCE IF EXISTS seq1"]
        );
        assert_eq!(d.next_value_expr(&TableName::new("seq1")).unwrap(), "nextval('seq1')");
        assert_eq!(d.current_value_expr(&TableName::new("seq1")).unwrap(), "currval('seq1')");
        assert!(d.supports_current_sequence_value());
    }

    #[test]
    fn test_limit() {
        let limited = dialect().rewrite_for_limit("select * from users", Limit { offset: 20, rows: 10 });
        assert_eq!(limited.sql, "select * from users limit ? offset ?");
        assert_eq!(limited.args, vec![10, 20]);
    }

    #[test]
    fn test_internal_objects() {
        let d = dialect();
        let table = Table::new("users");
        assert!(d.is_internal_index(&table, &Index::new("users_pkey", vec![])));
        assert!(d.is_internal_index(&table, &Index::new("users_email_key", vec![])));
        assert!(!d.is_internal_index(&table, &Index::new("ix_users_email", vec![])));
        assert!(!d.is_internal_sequence("seq1", &[]));
        assert!(d.is_internal_default_value("nextval('users_id_seq'::regclass)"));
        assert!(d.is_system_schema("pg_toast_temp_1"));
        assert!(d.is_system_schema("information_schema"));
        assert!(!d.is_system_schema("public"));
    }

    #[test]
    fn test_only_owned_sequences_are_internal() {
        let d = dialect();
        let serial = Column::new("id", TypeCode::BigInt).primary_key().auto_increment();
        let tables = vec![
            Table::new("users").column(serial),
            Table::new("orders").column(Column::new("id", TypeCode::BigInt).primary_key()),
        ];
        assert!(d.is_internal_sequence("users_id_seq", &tables));
        assert!(!d.is_internal_sequence("orders_id_seq", &tables));
        assert!(!d.is_internal_sequence("order_seq", &tables));
        assert!(!d.is_internal_sequence("users_id_seq", &[]));
    }

    #[test]
    fn test_type_round_trip() {
        crate::dialect::tests::assert_types_round_trip(&dialect());
    }

    #[test]
    fn test_classify_aliases() {
        let d = dialect();
        assert_eq!(d.types().classify("character varying"), Some(TypeCode::Varchar));
        assert_eq!(d.types().classify("int4"), Some(TypeCode::Integer));
        assert_eq!(
            d.types().classify("timestamp without time zone"),
            Some(TypeCode::Timestamp)
        );
    }
}
