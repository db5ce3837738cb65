//! Schema comparison.
//!
//! Compares a declared [`Schema`] against the live schema of the same
//! qualifier and produces the [`ChangeSet`] that brings the database up
//! to date. The comparison is additive: live tables, columns, indexes
//! and foreign keys the model does not declare are left alone, and
//! column changes that could lose data or rewrite the column are
//! reported as warnings instead of changes.

use std::fmt::Debug;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::changes::{
    ChangeSet, ChangeWarning, ColumnDefinitionChange, ColumnPropertyChange, SchemaChange,
    SkipReason,
};
use crate::dialect::Dialect;
use crate::error::{DbError, Result};
use crate::schema::{Column, DefaultValue, Schema, Sequence, Table, TableName};
use crate::types::NativeType;

/// Computes the changes needed to turn a live schema into a declared one.
pub trait Comparator: Send + Sync + Debug {
    /// Compares `declared` against `live`.
    ///
    /// # Errors
    ///
    /// Returns an error when a declared type has no native mapping, or
    /// when the model declares sequences on a platform without them.
    fn compare(&self, declared: &Schema, live: &Schema) -> Result<ChangeSet>;
}

/// Comparator driven entirely by a [`Dialect`].
#[derive(Debug, Clone)]
pub struct GenericComparator {
    dialect: Arc<dyn Dialect>,
}

impl GenericComparator {
    /// Creates a comparator for the given dialect.
    #[must_use]
    pub fn new(dialect: Arc<dyn Dialect>) -> Self {
        Self { dialect }
    }

    /// Returns the dialect.
    #[must_use]
    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    fn compare_tables(&self, declared: &Schema, live: &Schema, set: &mut ChangeSet) -> Result<()> {
        for table in declared.all_tables() {
            match live.find_table(&table.name) {
                None => self.create_table(table, set),
                Some(existing) => self.compare_table(table, existing, set)?,
            }
        }
        Ok(())
    }

    fn create_table(&self, table: &Table, set: &mut ChangeSet) {
        debug!(table = %table.qualified_name(), "Table missing");
        let name = table.qualified_name();
        set.changes.push(SchemaChange::CreateTable(Table {
            secondary: None,
            ..table.clone()
        }));
        for index in &table.indexes {
            set.changes.push(SchemaChange::AddIndex {
                table: name.clone(),
                index: index.clone(),
            });
        }
        // Platforms without ALTER TABLE ADD CONSTRAINT inline them in
        // CREATE TABLE.
        if self.dialect.supports_add_foreign_key() {
            for foreign_key in &table.foreign_keys {
                set.changes.push(SchemaChange::AddForeignKey {
                    table: name.clone(),
                    foreign_key: foreign_key.clone(),
                });
            }
        }
    }

    fn compare_table(&self, declared: &Table, live: &Table, set: &mut ChangeSet) -> Result<()> {
        let name = declared.qualified_name();

        for column in &declared.columns {
            match live.find_column(&column.name) {
                None => {
                    debug!(table = %name, column = %column.name, "Column missing");
                    set.changes.push(SchemaChange::AddColumn {
                        table: name.clone(),
                        column: column.clone(),
                    });
                }
                Some(existing) => {
                    if let Some(change) =
                        self.compare_column(&name, column, existing, live.has_rows, set)?
                    {
                        set.changes.push(SchemaChange::AlterColumn(change));
                    }
                }
            }
        }

        let declared_key = declared.primary_key();
        let live_key = live.primary_key();
        let same_key = declared_key.len() == live_key.len()
            && declared_key
                .iter()
                .zip(&live_key)
                .all(|(a, b)| a.eq_ignore_ascii_case(b));
        if !declared_key.is_empty() && !same_key {
            warn!(table = %name, "Primary key differs from the live table");
            set.warnings.push(ChangeWarning::PrimaryKeyMismatch {
                table: name.clone(),
                declared: declared_key.iter().map(|c| (*c).to_string()).collect(),
                live: live_key.iter().map(|c| (*c).to_string()).collect(),
            });
        }

        if let Some(comment) = &declared.comment {
            if self.dialect.supports_column_comment() && live.comment.as_ref() != Some(comment) {
                set.changes.push(SchemaChange::CommentTable {
                    table: name.clone(),
                    comment: comment.clone(),
                });
            }
        }

        for index in &declared.indexes {
            let exists = live.indexes.iter().any(|l| {
                l.name.eq_ignore_ascii_case(&index.name) || l.is_equivalent(index)
            });
            if !exists {
                debug!(table = %name, index = %index.name, "Index missing");
                set.changes.push(SchemaChange::AddIndex {
                    table: name.clone(),
                    index: index.clone(),
                });
            }
        }

        for foreign_key in &declared.foreign_keys {
            let exists = live.foreign_keys.iter().any(|l| {
                l.name.eq_ignore_ascii_case(&foreign_key.name) || l.is_equivalent(foreign_key)
            });
            if exists {
                continue;
            }
            if self.dialect.supports_add_foreign_key() {
                debug!(table = %name, foreign_key = %foreign_key.name, "Foreign key missing");
                set.changes.push(SchemaChange::AddForeignKey {
                    table: name.clone(),
                    foreign_key: foreign_key.clone(),
                });
            } else {
                warn!(table = %name, foreign_key = %foreign_key.name, "Foreign key cannot be added");
                set.warnings.push(ChangeWarning::ForeignKeySkipped {
                    table: name.clone(),
                    foreign_key: foreign_key.name.clone(),
                });
            }
        }
        Ok(())
    }

    /// Compares one column and returns the safe part of the difference.
    ///
    /// Unsafe property changes are recorded as warnings and the live
    /// value of that property is kept in the change's target column, so
    /// that dialects redefining the whole column never apply them.
    fn compare_column(
        &self,
        table: &TableName,
        declared: &Column,
        live: &Column,
        has_rows: bool,
        set: &mut ChangeSet,
    ) -> Result<Option<ColumnDefinitionChange>> {
        let mut change = ColumnDefinitionChange::new(table.clone(), live.clone(), declared.clone());

        for property in self.detect(declared, live)? {
            match self.skip_reason(live, has_rows, &property) {
                None => change.push(property),
                Some(reason) => {
                    warn!(
                        table = %table,
                        column = %declared.name,
                        change = %property,
                        reason = %reason,
                        "Skipping column change"
                    );
                    keep_live(&property, &mut change.new, live);
                    set.warnings.push(ChangeWarning::Skipped {
                        table: table.clone(),
                        column: declared.name.clone(),
                        change: property,
                        reason,
                    });
                }
            }
        }

        if change.is_empty() {
            return Ok(None);
        }
        debug!(table = %table, column = %declared.name, changes = change.changes.len(), "Column differs");
        Ok(Some(change))
    }

    /// Lists every property difference, safe or not.
    fn detect(&self, declared: &Column, live: &Column) -> Result<Vec<ColumnPropertyChange>> {
        let dialect = self.dialect.as_ref();
        let mut found = Vec::new();

        let new_type = dialect.native_type(declared)?;
        let old_type = dialect
            .native_type(live)
            .or_else(|e| live.native_type.clone().ok_or(e))?;
        if !new_type.eq_ignore_ascii_case(&old_type) {
            let old = NativeType::parse(&old_type);
            let new = NativeType::parse(&new_type);
            found.push(if old.same_base(&new) && old.args.len() == new.args.len() {
                ColumnPropertyChange::Size {
                    old: old_type,
                    new: new_type,
                }
            } else {
                ColumnPropertyChange::Type {
                    old: old_type,
                    new: new_type,
                }
            });
        }

        if declared.is_nullable() != live.is_nullable() {
            found.push(ColumnPropertyChange::Nullable {
                old: live.is_nullable(),
                new: declared.is_nullable(),
            });
        }

        if declared.is_unique() != live.is_unique() {
            found.push(ColumnPropertyChange::Unique {
                old: live.is_unique(),
                new: declared.is_unique(),
            });
        }

        // Identity columns carry a vendor generated default.
        if !declared.auto_increment {
            let new = dialect.default_value_sql(declared);
            let old = dialect.default_value_sql(live);
            if !same_default(declared, live, new.as_deref(), old.as_deref()) {
                found.push(ColumnPropertyChange::Default { old, new });
            }
        }

        if let Some(comment) = &declared.comment {
            if dialect.supports_column_comment() && live.comment.as_ref() != Some(comment) {
                found.push(ColumnPropertyChange::Comment {
                    old: live.comment.clone(),
                    new: Some(comment.clone()),
                });
            }
        }
        Ok(found)
    }

    fn skip_reason(
        &self,
        live: &Column,
        has_rows: bool,
        property: &ColumnPropertyChange,
    ) -> Option<SkipReason> {
        match property {
            ColumnPropertyChange::Type { .. } => Some(SkipReason::TypeChange),
            ColumnPropertyChange::Size { old, new }
                if !NativeType::parse(old).is_widened_by(&NativeType::parse(new)) =>
            {
                Some(SkipReason::Narrowing)
            }
            // Existing rows may hold NULLs or duplicates.
            ColumnPropertyChange::Nullable { new: false, .. }
            | ColumnPropertyChange::Unique { new: true, .. }
                if has_rows =>
            {
                Some(SkipReason::NonEmptyTable)
            }
            _ if !self.dialect.supports_safe_alter(live, property) => Some(SkipReason::NotSupported),
            _ => None,
        }
    }

    fn compare_sequences(&self, declared: &Schema, live: &Schema, set: &mut ChangeSet) -> Result<()> {
        if declared.sequences.is_empty() {
            return Ok(());
        }
        if !self.dialect.supports_sequences() {
            return Err(DbError::unsupported(self.dialect.name(), "sequences"));
        }
        for sequence in &declared.sequences {
            match live.find_sequence(&sequence.name) {
                None => {
                    debug!(sequence = %sequence.qualified_name(), "Sequence missing");
                    set.changes.push(SchemaChange::CreateSequence(sequence.clone()));
                }
                Some(existing) if !sequence_matches(sequence, existing) => {
                    warn!(sequence = %sequence.qualified_name(), "Sequence differs, recreating");
                    set.changes.push(SchemaChange::DropSequence(sequence.clone()));
                    set.changes.push(SchemaChange::CreateSequence(sequence.clone()));
                    set.warnings.push(ChangeWarning::SequenceRecreated {
                        sequence: sequence.qualified_name(),
                    });
                }
                Some(_) => {}
            }
        }
        Ok(())
    }
}

impl Comparator for GenericComparator {
    fn compare(&self, declared: &Schema, live: &Schema) -> Result<ChangeSet> {
        let mut set = ChangeSet::new();
        self.compare_tables(declared, live, &mut set)?;
        self.compare_sequences(declared, live, &mut set)?;
        debug!(
            dialect = self.dialect.name(),
            changes = set.changes.len(),
            warnings = set.warnings.len(),
            "Comparison complete"
        );
        Ok(set)
    }
}

/// Restores the live value of a skipped property on the target column.
fn keep_live(property: &ColumnPropertyChange, target: &mut Column, live: &Column) {
    match property {
        ColumnPropertyChange::Type { .. } | ColumnPropertyChange::Size { .. } => {
            target.type_code = live.type_code;
            target.native_type.clone_from(&live.native_type);
            target.length = live.length;
            target.precision = live.precision;
            target.scale = live.scale;
        }
        ColumnPropertyChange::Nullable { .. } => target.nullable = live.is_nullable(),
        ColumnPropertyChange::Unique { .. } => {
            target.unique = live.unique;
            target.unique_index.clone_from(&live.unique_index);
        }
        ColumnPropertyChange::Default { .. } => target.default.clone_from(&live.default),
        ColumnPropertyChange::Comment { .. } => target.comment.clone_from(&live.comment),
    }
}

fn same_default(declared: &Column, live: &Column, new: Option<&str>, old: Option<&str>) -> bool {
    match (new, old) {
        (Some(new), Some(old)) if new != old => {
            // Expressions come back in whatever case the catalog stores.
            matches!(declared.default, Some(DefaultValue::Expression(_)))
                && matches!(live.default, Some(DefaultValue::Expression(_)))
                && new.eq_ignore_ascii_case(old)
        }
        (new, old) => new == old,
    }
}

/// Returns whether every attribute the model sets matches the live value.
/// Attributes the catalog does not report are not compared.
fn sequence_matches(declared: &Sequence, live: &Sequence) -> bool {
    fn same<T: PartialEq>(declared: Option<T>, live: Option<T>) -> bool {
        declared.is_none() || live.is_none() || declared == live
    }
    same(declared.start, live.start)
        && same(declared.increment, live.increment)
        && same(declared.min_value, live.min_value)
        && same(declared.max_value, live.max_value)
        && same(declared.cache, live.cache)
        && same(declared.cycle, live.cycle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::changes::ColumnProperty;
    use crate::dialect::{
        DerbyDialect, MySqlDialect, PostgresDialect, SqlServerDialect, SqliteDialect,
    };
    use crate::schema::{ForeignKey, Index, TypeCode};

    fn postgres() -> GenericComparator {
        GenericComparator::new(Arc::new(PostgresDialect::new().unwrap()))
    }

    fn schema(tables: Vec<Table>) -> Schema {
        Schema {
            tables,
            ..Schema::default()
        }
    }

    fn users(email: Column) -> Table {
        Table::new("users")
            .column(Column::new("id", TypeCode::BigInt).primary_key())
            .column(email)
    }

    #[test]
    fn test_identical_schemas_produce_no_changes() {
        let declared = schema(vec![users(Column::new("email", TypeCode::Varchar).length(100))]);
        let set = postgres().compare(&declared, &declared.clone()).unwrap();
        assert!(set.is_empty());
        assert!(set.warnings.is_empty());
    }

    #[test]
    fn test_missing_table_is_created_with_indexes_and_keys() {
        let orders = Table::new("orders")
            .column(Column::new("id", TypeCode::BigInt).primary_key())
            .column(Column::new("user_id", TypeCode::BigInt))
            .index(Index::new("ix_orders_user", vec!["user_id".into()]))
            .foreign_key(ForeignKey::new(
                "fk_orders_user",
                vec!["user_id".into()],
                "users",
                vec!["id".into()],
            ));
        let set = postgres()
            .compare(&schema(vec![orders]), &Schema::default())
            .unwrap();
        assert_eq!(set.len(), 3);
        assert!(matches!(set.changes[0], SchemaChange::CreateTable(_)));
        assert!(matches!(set.changes[1], SchemaChange::AddIndex { .. }));
        assert!(matches!(set.changes[2], SchemaChange::AddForeignKey { .. }));
    }

    #[test]
    fn test_live_extras_are_never_dropped() {
        let declared = schema(vec![users(Column::new("email", TypeCode::Varchar).length(100))]);
        let live = schema(vec![
            users(Column::new("email", TypeCode::Varchar).length(100))
                .column(Column::new("legacy", TypeCode::Integer))
                .index(Index::new("ix_users_legacy", vec!["legacy".into()])),
            Table::new("audit").column(Column::new("id", TypeCode::Integer)),
        ]);
        let set = postgres().compare(&declared, &live).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn test_widening_and_unique_are_combined() {
        let declared = schema(vec![users(
            Column::new("email", TypeCode::Varchar).length(100).unique(),
        )]);
        let live = schema(vec![users(Column::new("email", TypeCode::Varchar).length(50))]);
        let comparator = postgres();
        let set = comparator.compare(&declared, &live).unwrap();

        assert_eq!(set.len(), 1);
        let SchemaChange::AlterColumn(change) = &set.changes[0] else {
            panic!("expected a column change, got {:?}", set.changes[0]);
        };
        assert!(change.has(ColumnProperty::Unique));
        assert!(change.has(ColumnProperty::Size));
        assert_eq!(
            comparator.dialect().generate_sql(&set.changes[0]).unwrap(),
            vec![
                "ALTER TABLE users ADD UNIQUE(email)",
                "ALTER TABLE users ALTER COLUMN email TYPE varchar(100)",
            ]
        );
    }

    #[test]
    fn test_type_change_and_narrowing_are_skipped() {
        let declared = schema(vec![users(Column::new("email", TypeCode::Varchar).length(20))
            .column(Column::new("age", TypeCode::Varchar).length(10))]);
        let live = schema(vec![users(Column::new("email", TypeCode::Varchar).length(50))
            .column(Column::new("age", TypeCode::Integer))]);
        let set = postgres().compare(&declared, &live).unwrap();

        assert!(set.is_empty());
        let reasons: Vec<SkipReason> = set
            .skipped()
            .filter_map(|w| match w {
                ChangeWarning::Skipped { reason, .. } => Some(*reason),
                _ => None,
            })
            .collect();
        assert_eq!(reasons, vec![SkipReason::Narrowing, SkipReason::TypeChange]);
    }

    #[test]
    fn test_skipped_type_is_not_redefined() {
        let comparator = GenericComparator::new(Arc::new(MySqlDialect::new().unwrap()));
        let declared = schema(vec![
            users(Column::new("age", TypeCode::Varchar).length(10).not_null()),
        ]);
        let live = schema(vec![users(Column::new("age", TypeCode::Integer))]);
        let set = comparator.compare(&declared, &live).unwrap();

        assert_eq!(set.len(), 1);
        assert_eq!(set.skipped().count(), 1);
        assert_eq!(
            comparator.dialect().generate_sql(&set.changes[0]).unwrap(),
            vec!["ALTER TABLE users MODIFY COLUMN age integer NOT NULL"]
        );
    }

    #[test]
    fn test_unsupported_alteration_is_skipped() {
        let comparator = GenericComparator::new(Arc::new(SqliteDialect::new().unwrap()));
        let declared = schema(vec![users(Column::new("email", TypeCode::Varchar).length(50).not_null())]);
        let live = schema(vec![users(Column::new("email", TypeCode::Varchar).length(50))]);
        let set = comparator.compare(&declared, &live).unwrap();

        assert!(set.is_empty());
        assert!(matches!(
            set.warnings.as_slice(),
            [ChangeWarning::Skipped {
                reason: SkipReason::NotSupported,
                ..
            }]
        ));
    }

    #[test]
    fn test_fixed_width_types_are_not_resized() {
        let dialects: [Arc<dyn Dialect>; 2] = [
            Arc::new(MySqlDialect::new().unwrap()),
            Arc::new(SqlServerDialect::new().unwrap()),
        ];
        for dialect in dialects {
            let comparator = GenericComparator::new(dialect);
            let declared = schema(vec![users(Column::new("code", TypeCode::Char).length(20))
                .column(Column::new("price", TypeCode::Decimal).precision(12, 2))
                .column(Column::new("name", TypeCode::Varchar).length(80))]);
            let live = schema(vec![users(Column::new("code", TypeCode::Char).length(10))
                .column(Column::new("price", TypeCode::Decimal).precision(10, 2))
                .column(Column::new("name", TypeCode::Varchar).length(40))]);
            let set = comparator.compare(&declared, &live).unwrap();

            let name = comparator.dialect().name();
            assert_eq!(set.len(), 1, "{name}");
            let SchemaChange::AlterColumn(change) = &set.changes[0] else {
                panic!("{name}: expected a column change, got {:?}", set.changes[0]);
            };
            assert_eq!(change.new.name, "name");
            let skipped: Vec<(&str, SkipReason)> = set
                .skipped()
                .filter_map(|w| match w {
                    ChangeWarning::Skipped { column, reason, .. } => Some((column.as_str(), *reason)),
                    _ => None,
                })
                .collect();
            assert_eq!(
                skipped,
                vec![("code", SkipReason::NotSupported), ("price", SkipReason::NotSupported)],
                "{name}"
            );
        }
    }

    #[test]
    fn test_tightening_a_populated_table_is_skipped() {
        let declared = schema(vec![users(
            Column::new("email", TypeCode::Varchar).length(100).not_null().unique(),
        )]);
        let live = |table: Table| schema(vec![table]);
        let empty = users(Column::new("email", TypeCode::Varchar).length(100));

        let set = postgres().compare(&declared, &live(empty.clone())).unwrap();
        assert_eq!(set.len(), 1);
        assert!(set.warnings.is_empty());

        let set = postgres().compare(&declared, &live(empty.with_rows())).unwrap();
        assert!(set.is_empty());
        let reasons: Vec<SkipReason> = set
            .skipped()
            .filter_map(|w| match w {
                ChangeWarning::Skipped { reason, .. } => Some(*reason),
                _ => None,
            })
            .collect();
        assert_eq!(reasons, vec![SkipReason::NonEmptyTable, SkipReason::NonEmptyTable]);
    }

    #[test]
    fn test_relaxing_a_populated_table_is_applied() {
        let declared = schema(vec![users(Column::new("email", TypeCode::Varchar).length(200))]);
        let live = schema(vec![users(
            Column::new("email", TypeCode::Varchar).length(100).not_null(),
        )
        .with_rows()]);
        let set = postgres().compare(&declared, &live).unwrap();
        assert_eq!(set.len(), 1);
        assert!(set.warnings.is_empty());
    }

    #[test]
    fn test_foreign_key_on_existing_table_without_alter_support() {
        let comparator = GenericComparator::new(Arc::new(SqliteDialect::new().unwrap()));
        let fk = ForeignKey::new("fk_users_team", vec!["team_id".into()], "teams", vec!["id".into()]);
        let declared = schema(vec![users(Column::new("team_id", TypeCode::Integer)).foreign_key(fk)]);
        let live = schema(vec![users(Column::new("team_id", TypeCode::Integer))]);
        let set = comparator.compare(&declared, &live).unwrap();

        assert!(set.is_empty());
        assert_eq!(
            set.warnings,
            vec![ChangeWarning::ForeignKeySkipped {
                table: TableName::new("users"),
                foreign_key: "fk_users_team".into(),
            }]
        );
    }

    #[test]
    fn test_equivalent_index_under_another_name() {
        let declared = schema(vec![users(Column::new("email", TypeCode::Varchar).length(100))
            .index(Index::new("ix_users_email", vec!["email".into()]))]);
        let live = schema(vec![users(Column::new("email", TypeCode::Varchar).length(100))
            .index(Index::new("users_email_idx", vec!["EMAIL".into()]))]);
        assert!(postgres().compare(&declared, &live).unwrap().is_empty());
    }

    #[test]
    fn test_default_and_comment_changes() {
        let declared = schema(vec![users(
            Column::new("status", TypeCode::Integer)
                .default_value(DefaultValue::Integer(1))
                .comment("State"),
        )]);
        let live = schema(vec![users(Column::new("status", TypeCode::Integer))]);
        let set = postgres().compare(&declared, &live).unwrap();

        let SchemaChange::AlterColumn(change) = &set.changes[0] else {
            panic!("expected a column change");
        };
        assert_eq!(
            change.changes,
            vec![
                ColumnPropertyChange::Default {
                    old: None,
                    new: Some("1".into())
                },
                ColumnPropertyChange::Comment {
                    old: None,
                    new: Some("State".into())
                },
            ]
        );
    }

    #[test]
    fn test_expression_defaults_ignore_case() {
        let now = |e: &str| {
            Column::new("created", TypeCode::Timestamp)
                .default_value(DefaultValue::Expression(e.into()))
        };
        let declared = schema(vec![users(now("CURRENT_TIMESTAMP"))]);
        let live = schema(vec![users(now("current_timestamp"))]);
        assert!(postgres().compare(&declared, &live).unwrap().is_empty());
    }

    #[test]
    fn test_primary_key_mismatch_is_reported() {
        let declared = schema(vec![users(Column::new("email", TypeCode::Varchar).length(100))]);
        let live = schema(vec![Table::new("users")
            .column(Column::new("id", TypeCode::BigInt).not_null())
            .column(Column::new("email", TypeCode::Varchar).length(100))]);
        let set = postgres().compare(&declared, &live).unwrap();
        assert!(set.is_empty());
        assert!(matches!(
            set.warnings.as_slice(),
            [ChangeWarning::PrimaryKeyMismatch { .. }]
        ));
    }

    #[test]
    fn test_identical_sequence_is_unchanged() {
        let sequence = Sequence::new("seq1").start(1).increment(1).cycle(false);
        let declared = Schema {
            sequences: vec![sequence.clone()],
            ..Schema::default()
        };
        let live = Schema {
            sequences: vec![sequence.cache(1).bounds(1, i64::MAX)],
            ..Schema::default()
        };
        assert!(postgres().compare(&declared, &live).unwrap().is_empty());
    }

    #[test]
    fn test_changed_sequence_is_recreated() {
        let declared = Schema {
            sequences: vec![Sequence::new("seq1").start(1).increment(5)],
            ..Schema::default()
        };
        let live = Schema {
            sequences: vec![Sequence::new("SEQ1").start(1).increment(1)],
            ..Schema::default()
        };
        let set = postgres().compare(&declared, &live).unwrap();
        assert!(matches!(
            set.changes.as_slice(),
            [SchemaChange::DropSequence(_), SchemaChange::CreateSequence(_)]
        ));
        assert!(matches!(
            set.warnings.as_slice(),
            [ChangeWarning::SequenceRecreated { .. }]
        ));
    }

    #[test]
    fn test_sequences_require_support() {
        let comparator = GenericComparator::new(Arc::new(MySqlDialect::new().unwrap()));
        let declared = Schema {
            sequences: vec![Sequence::new("seq1")],
            ..Schema::default()
        };
        let err = comparator.compare(&declared, &Schema::default()).unwrap_err();
        assert!(err.is_unsupported());
    }

    #[test]
    fn test_secondary_tables_are_compared() {
        let declared = schema(vec![users(Column::new("email", TypeCode::Varchar).length(100))
            .secondary(Table::new("users_ext").column(Column::new("id", TypeCode::BigInt).primary_key()))]);
        let live = schema(vec![users(Column::new("email", TypeCode::Varchar).length(100))]);
        let set = GenericComparator::new(Arc::new(DerbyDialect::new().unwrap()))
            .compare(&declared, &live)
            .unwrap();
        assert_eq!(set.len(), 1);
        let SchemaChange::CreateTable(table) = &set.changes[0] else {
            panic!("expected a table creation");
        };
        assert_eq!(table.name, "users_ext");
    }
}
