//! SQLite dialect.
//!
//! SQLite keeps declared type names verbatim, so every type code gets a
//! distinct native name and reads back unchanged. Its `ALTER TABLE` can
//! only add columns: a missing unique constraint is added as a unique
//! index, and every other column change is reported as unsupported.

use super::{CaseFolding, Dialect, DialectSettings, INTERNAL_NAME_PREFIX};
use crate::changes::ColumnPropertyChange;
use crate::error::Result;
use crate::schema::{Column, Index, Table, TableName, TypeCode};
use crate::types::TypeRegistry;

const SETTINGS: DialectSettings = DialectSettings {
    name: "SQLite",
    case_folding: CaseFolding::Preserve,
    keywords: &["AUTOINCREMENT", "GLOB", "INDEX", "LIMIT", "OFFSET", "PRAGMA", "REGEXP"],
    system_schemas: &["temp"],
    default_schema: Some("main"),
    ..DialectSettings::STANDARD
};

/// SQLite dialect.
#[derive(Debug)]
pub struct SqliteDialect {
    types: TypeRegistry,
}

impl SqliteDialect {
    /// Creates a new SQLite dialect.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the type registry is invalid.
    pub fn new() -> Result<Self> {
        let types = TypeRegistry::builder(SETTINGS.name)
            .add(TypeCode::Boolean, "boolean")
            .add(TypeCode::Bit, "bit")
            .add(TypeCode::TinyInt, "tinyint")
            .add(TypeCode::SmallInt, "smallint")
            .add(TypeCode::Integer, "integer")
            .add(TypeCode::BigInt, "bigint")
            .add(TypeCode::Real, "real")
            .add(TypeCode::Float, "float")
            .add(TypeCode::Double, "double")
            .add(TypeCode::Decimal, "decimal($p,$s)")
            .add(TypeCode::Numeric, "numeric($p,$s)")
            .add(TypeCode::Char, "char($l)")
            .add(TypeCode::Varchar, "varchar($l)")
            .add(TypeCode::LongVarchar, "text")
            .add(TypeCode::Clob, "clob")
            .add(TypeCode::Binary, "binary($l)")
            .add(TypeCode::VarBinary, "varbinary($l)")
            .add(TypeCode::LongVarBinary, "longvarbinary")
            .add(TypeCode::Blob, "blob")
            .add(TypeCode::Date, "date")
            .add(TypeCode::Time, "time")
            .add(TypeCode::Timestamp, "timestamp")
            .alias("int", TypeCode::Integer)
            .alias("datetime", TypeCode::Timestamp)
            .alias("double precision", TypeCode::Double)
            .alias("character varying", TypeCode::Varchar)
            .build()?;
        Ok(Self { types })
    }

    fn unique_index_name(table: &TableName, column: &str) -> String {
        format!("{INTERNAL_NAME_PREFIX}UNIQUE_IX_{}_{column}", table.name)
    }
}

impl Dialect for SqliteDialect {
    fn settings(&self) -> &DialectSettings {
        &SETTINGS
    }

    fn types(&self) -> &TypeRegistry {
        &self.types
    }

    fn supports_add_foreign_key(&self) -> bool {
        false
    }

    fn add_column_sql(&self, table: &TableName, column: &Column) -> Result<Vec<String>> {
        let inline = Column {
            unique: false,
            ..column.clone()
        };
        let mut sqls = vec![format!(
            "ALTER TABLE {} ADD COLUMN {}",
            self.qualify(table),
            self.column_definition(&inline)?
        )];
        if column.is_unique() {
            sqls.extend(self.add_unique_sql(table, column));
        }
        Ok(sqls)
    }

    fn add_unique_sql(&self, table: &TableName, column: &Column) -> Vec<String> {
        vec![format!(
            "CREATE UNIQUE INDEX {} ON {} ({})",
            self.identifier(&Self::unique_index_name(table, &column.name)),
            self.qualify(table),
            self.identifier(&column.name)
        )]
    }

    fn drop_unique_sql(&self, _table: &TableName, column: &Column) -> Vec<String> {
        column
            .unique_index
            .iter()
            .filter(|name| name.starts_with(INTERNAL_NAME_PREFIX))
            .map(|name| format!("DROP INDEX {}", self.identifier(name)))
            .collect()
    }

    fn supports_safe_alter(&self, old: &Column, change: &ColumnPropertyChange) -> bool {
        match change {
            ColumnPropertyChange::Unique { new: true, .. } => true,
            ColumnPropertyChange::Unique { .. } => old
                .unique_index
                .as_deref()
                .is_some_and(|n| n.starts_with(INTERNAL_NAME_PREFIX)),
            _ => false,
        }
    }

    fn is_internal_index(&self, _table: &Table, index: &Index) -> bool {
        let name = index.name.to_ascii_lowercase();
        name.starts_with("sqlite_autoindex_")
            || index.name.to_ascii_uppercase().starts_with(INTERNAL_NAME_PREFIX)
    }

    fn is_internal_sequence(&self, name: &str, _tables: &[Table]) -> bool {
        name.eq_ignore_ascii_case("sqlite_sequence")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::changes::ColumnDefinitionChange;
    use crate::dialect::Limit;
    use crate::schema::{DefaultValue, ForeignKey, ForeignKeyRule};

    fn dialect() -> SqliteDialect {
        SqliteDialect::new().unwrap()
    }

    #[test]
    fn test_create_table_inlines_foreign_keys() {
        let d = dialect();
        let table = Table::new("orders")
            .column(Column::new("id", TypeCode::Integer).primary_key())
            .column(Column::new("user_id", TypeCode::Integer).not_null())
            .foreign_key(
                ForeignKey::new("fk_orders_user", vec!["user_id".into()], "users", vec!["id".into()])
                    .on_delete(ForeignKeyRule::Cascade),
            );
        assert_eq!(
            d.create_table_sql(&table).unwrap(),
            vec![
                "CREATE TABLE orders (id integer NOT NULL, user_id integer NOT NULL, PRIMARY KEY (id), CONSTRAINT fk_orders_user FOREIGN KEY (user_id) REFERENCES users (id) ON DELETE CASCADE)"
            ]
        );
    }

    #[test]
    fn test_add_unique_column_uses_index() {
        let d = dialect();
        let column = Column::new("code", TypeCode::Varchar)
            .length(10)
            .unique()
            .default_value(DefaultValue::Text("none".into()));
        assert_eq!(
            d.add_column_sql(&TableName::new("items"), &column).unwrap(),
            vec![
                "ALTER TABLE items ADD COLUMN code varchar(10) DEFAULT 'none' NULL",
                "CREATE UNIQUE INDEX INTERNAL_UNIQUE_IX_items_code ON items (code)",
            ]
        );
    }

    #[test]
    fn test_only_unique_changes_are_safe() {
        let d = dialect();
        let column = Column::new("code", TypeCode::Varchar).length(10);
        assert!(d.supports_safe_alter(
            &column,
            &ColumnPropertyChange::Unique {
                old: false,
                new: true
            }
        ));
        assert!(!d.supports_safe_alter(
            &column,
            &ColumnPropertyChange::Size {
                old: "varchar(10)".into(),
                new: "varchar(20)".into()
            }
        ));
        assert!(!d.supports_safe_alter(
            &column,
            &ColumnPropertyChange::Nullable {
                old: true,
                new: false
            }
        ));

        let mut change = ColumnDefinitionChange::new(
            TableName::new("items"),
            column.clone(),
            column.unique(),
        );
        change.push(ColumnPropertyChange::Unique {
            old: false,
            new: true,
        });
        assert_eq!(
            d.safe_alter_column_sql(&change).unwrap(),
            vec!["CREATE UNIQUE INDEX INTERNAL_UNIQUE_IX_items_code ON items (code)"]
        );
    }

    #[test]
    fn test_no_sequences() {
        let d = dialect();
        assert!(!d.supports_sequences());
        assert!(!d.supports_auto_increment());
        assert!(d.next_value_expr(&TableName::new("s")).is_err());
    }

    #[test]
    fn test_limit() {
        let limited = dialect().rewrite_for_limit("select 1", Limit { offset: 4, rows: 2 });
        assert_eq!(limited.sql, "select 1 limit ? offset ?");
        assert_eq!(limited.args, vec![2, 4]);
    }

    #[test]
    fn test_internal_objects() {
        let d = dialect();
        let table = Table::new("items");
        assert!(d.is_internal_index(&table, &Index::new("sqlite_autoindex_items_1", vec![])));
        assert!(d.is_internal_index(&table, &Index::new("INTERNAL_UNIQUE_IX_items_code", vec![])));
        assert!(!d.is_internal_index(&table, &Index::new("ix_items_code", vec![])));
    }

    #[test]
    fn test_type_round_trip() {
        crate::dialect::tests::assert_types_round_trip(&dialect());
    }
}
