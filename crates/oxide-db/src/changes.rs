//! Change sets produced by the comparator.

use std::fmt;

use serde::Serialize;

use crate::schema::{Column, ForeignKey, Index, Sequence, Table, TableName};

/// Column attributes that can change, in the order they are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ColumnProperty {
    /// Unique flag.
    Unique,
    /// Default value.
    Default,
    /// Nullability.
    Nullable,
    /// Length, precision or scale of an otherwise unchanged type.
    Size,
    /// Column comment.
    Comment,
    /// Native type.
    Type,
}

/// A single attribute delta between a live and a declared column.
///
/// Defaults and types are held in their rendered SQL form, which is what
/// the comparison was made on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ColumnPropertyChange {
    /// Unique flag changed.
    Unique {
        /// Live value.
        old: bool,
        /// Declared value.
        new: bool,
    },
    /// Default value changed.
    Default {
        /// Live default.
        old: Option<String>,
        /// Declared default.
        new: Option<String>,
    },
    /// Nullability changed.
    Nullable {
        /// Live value.
        old: bool,
        /// Declared value.
        new: bool,
    },
    /// Size changed within the same base type.
    Size {
        /// Live native type.
        old: String,
        /// Declared native type.
        new: String,
    },
    /// Comment changed.
    Comment {
        /// Live comment.
        old: Option<String>,
        /// Declared comment.
        new: Option<String>,
    },
    /// Base type changed.
    Type {
        /// Live native type.
        old: String,
        /// Declared native type.
        new: String,
    },
}

impl ColumnPropertyChange {
    /// Returns the attribute this change touches.
    #[must_use]
    pub const fn property(&self) -> ColumnProperty {
        match self {
            Self::Unique { .. } => ColumnProperty::Unique,
            Self::Default { .. } => ColumnProperty::Default,
            Self::Nullable { .. } => ColumnProperty::Nullable,
            Self::Size { .. } => ColumnProperty::Size,
            Self::Comment { .. } => ColumnProperty::Comment,
            Self::Type { .. } => ColumnProperty::Type,
        }
    }

    /// Returns whether this change removes a unique constraint.
    #[must_use]
    pub const fn is_unique_removal(&self) -> bool {
        matches!(self, Self::Unique { old: true, new: false })
    }

    /// Returns whether this change adds a unique constraint.
    #[must_use]
    pub const fn is_unique_addition(&self) -> bool {
        matches!(self, Self::Unique { old: false, new: true })
    }
}

fn opt(value: Option<&String>) -> &str {
    value.map_or("<none>", String::as_str)
}

impl fmt::Display for ColumnPropertyChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unique { old, new } => write!(f, "unique {old} -> {new}"),
            Self::Default { old, new } => {
                write!(f, "default {} -> {}", opt(old.as_ref()), opt(new.as_ref()))
            }
            Self::Nullable { old, new } => write!(f, "nullable {old} -> {new}"),
            Self::Size { old, new } => write!(f, "size {old} -> {new}"),
            Self::Comment { old, new } => {
                write!(f, "comment {} -> {}", opt(old.as_ref()), opt(new.as_ref()))
            }
            Self::Type { old, new } => write!(f, "type {old} -> {new}"),
        }
    }
}

/// All property changes for one column.
///
/// Changes are kept sorted by [`ColumnProperty`]; splitting them into
/// statements is left to the dialect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnDefinitionChange {
    /// Table owning the column.
    pub table: TableName,
    /// Live column.
    pub old: Column,
    /// Declared column.
    pub new: Column,
    /// Property changes, in precedence order.
    pub changes: Vec<ColumnPropertyChange>,
}

impl ColumnDefinitionChange {
    /// Creates an empty change for a column pair.
    #[must_use]
    pub const fn new(table: TableName, old: Column, new: Column) -> Self {
        Self {
            table,
            old,
            new,
            changes: Vec::new(),
        }
    }

    /// Adds a property change, keeping precedence order.
    pub fn push(&mut self, change: ColumnPropertyChange) {
        let at = self
            .changes
            .partition_point(|c| c.property() <= change.property());
        self.changes.insert(at, change);
    }

    /// Returns whether no property changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Returns whether the given property changed.
    #[must_use]
    pub fn has(&self, property: ColumnProperty) -> bool {
        self.find(property).is_some()
    }

    /// Returns the change for the given property.
    #[must_use]
    pub fn find(&self, property: ColumnProperty) -> Option<&ColumnPropertyChange> {
        self.changes.iter().find(|c| c.property() == property)
    }

    /// Returns whether the unique constraint is removed.
    #[must_use]
    pub fn removes_unique(&self) -> bool {
        self.changes.iter().any(ColumnPropertyChange::is_unique_removal)
    }

    /// Returns whether a unique constraint is added.
    #[must_use]
    pub fn adds_unique(&self) -> bool {
        self.changes.iter().any(ColumnPropertyChange::is_unique_addition)
    }

    /// Returns whether anything besides uniqueness changed.
    #[must_use]
    pub fn has_non_unique_changes(&self) -> bool {
        self.changes
            .iter()
            .any(|c| c.property() != ColumnProperty::Unique)
    }
}

/// One reconciliation step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SchemaChange {
    /// Create a table with its columns and primary key. Its indexes and
    /// foreign keys follow as separate changes.
    CreateTable(Table),
    /// Add a column to an existing table.
    AddColumn {
        /// Table.
        table: TableName,
        /// New column.
        column: Column,
    },
    /// Alter an existing column in place.
    AlterColumn(ColumnDefinitionChange),
    /// Set a table comment.
    CommentTable {
        /// Table.
        table: TableName,
        /// New comment.
        comment: String,
    },
    /// Create an index.
    AddIndex {
        /// Table.
        table: TableName,
        /// New index.
        index: Index,
    },
    /// Add a foreign key.
    AddForeignKey {
        /// Table.
        table: TableName,
        /// New foreign key.
        foreign_key: ForeignKey,
    },
    /// Create a sequence.
    CreateSequence(Sequence),
    /// Drop a sequence so it can be recreated.
    DropSequence(Sequence),
}

impl SchemaChange {
    /// Returns the qualified name of the table or sequence affected.
    #[must_use]
    pub fn target(&self) -> TableName {
        match self {
            Self::CreateTable(table) => table.qualified_name(),
            Self::AddColumn { table, .. }
            | Self::CommentTable { table, .. }
            | Self::AddIndex { table, .. }
            | Self::AddForeignKey { table, .. } => table.clone(),
            Self::AlterColumn(change) => change.table.clone(),
            Self::CreateSequence(sequence) | Self::DropSequence(sequence) => {
                sequence.qualified_name()
            }
        }
    }
}

impl fmt::Display for SchemaChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateTable(table) => write!(f, "create table {}", table.qualified_name()),
            Self::AddColumn { table, column } => {
                write!(f, "add column {table}.{}", column.name)
            }
            Self::AlterColumn(change) => {
                let parts: Vec<String> = change.changes.iter().map(ToString::to_string).collect();
                write!(
                    f,
                    "alter column {}.{} ({})",
                    change.table,
                    change.new.name,
                    parts.join(", ")
                )
            }
            Self::CommentTable { table, .. } => write!(f, "comment on table {table}"),
            Self::AddIndex { table, index } => write!(f, "add index {} on {table}", index.name),
            Self::AddForeignKey { table, foreign_key } => {
                write!(f, "add foreign key {} on {table}", foreign_key.name)
            }
            Self::CreateSequence(sequence) => {
                write!(f, "create sequence {}", sequence.qualified_name())
            }
            Self::DropSequence(sequence) => {
                write!(f, "drop sequence {}", sequence.qualified_name())
            }
        }
    }
}

/// Why a detected column change was left out of the change set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SkipReason {
    /// The base type differs.
    TypeChange,
    /// The new size is smaller than the live one.
    Narrowing,
    /// The platform cannot apply this change without a rewrite.
    NotSupported,
    /// The change would be checked against existing rows: a column
    /// becoming NOT NULL or unique on a table that is not empty.
    NonEmptyTable,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::TypeChange => "type changes are never applied automatically",
            Self::Narrowing => "narrowing may lose data",
            Self::NotSupported => "no safe alteration on this platform",
            Self::NonEmptyTable => "the table already holds rows",
        })
    }
}

/// Findings reported next to the change set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ChangeWarning {
    /// A column change that was detected but not applied.
    Skipped {
        /// Table.
        table: TableName,
        /// Column.
        column: String,
        /// Detected change.
        change: ColumnPropertyChange,
        /// Why it was skipped.
        reason: SkipReason,
    },
    /// A sequence is dropped and recreated; its current value restarts.
    SequenceRecreated {
        /// Sequence.
        sequence: TableName,
    },
    /// Declared and live primary keys differ. Primary keys are never
    /// altered.
    PrimaryKeyMismatch {
        /// Table.
        table: TableName,
        /// Declared key columns.
        declared: Vec<String>,
        /// Live key columns.
        live: Vec<String>,
    },
    /// A foreign key missing on an existing table that the platform
    /// cannot add after creation.
    ForeignKeySkipped {
        /// Table.
        table: TableName,
        /// Constraint name.
        foreign_key: String,
    },
}

impl fmt::Display for ChangeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skipped {
                table,
                column,
                change,
                reason,
            } => write!(f, "skipped {table}.{column}: {change} ({reason})"),
            Self::SequenceRecreated { sequence } => {
                write!(f, "sequence {sequence} is recreated, its counter restarts")
            }
            Self::PrimaryKeyMismatch {
                table,
                declared,
                live,
            } => write!(
                f,
                "primary key of {table} differs: declared ({}) live ({})",
                declared.join(", "),
                live.join(", ")
            ),
            Self::ForeignKeySkipped { table, foreign_key } => write!(
                f,
                "foreign key {foreign_key} on {table} requires rebuilding the table"
            ),
        }
    }
}

/// The output of a comparison.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChangeSet {
    /// Changes to apply.
    pub changes: Vec<SchemaChange>,
    /// Changes detected but not applied, and other findings.
    pub warnings: Vec<ChangeWarning>,
}

/// The changes of one table, borrowed from a [`ChangeSet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableChange<'a> {
    /// Table.
    pub table: TableName,
    /// Changes targeting the table, in change-set order.
    pub changes: Vec<&'a SchemaChange>,
}

impl ChangeSet {
    /// Creates an empty change set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            changes: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Returns whether there is nothing to apply.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Returns the number of changes to apply.
    #[must_use]
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Appends another change set.
    pub fn extend(&mut self, other: Self) {
        self.changes.extend(other.changes);
        self.warnings.extend(other.warnings);
    }

    /// Returns the skipped column changes.
    pub fn skipped(&self) -> impl Iterator<Item = &ChangeWarning> {
        self.warnings
            .iter()
            .filter(|w| matches!(w, ChangeWarning::Skipped { .. }))
    }

    /// Groups table changes by table, in first-seen order. Sequence
    /// changes are not included.
    #[must_use]
    pub fn by_table(&self) -> Vec<TableChange<'_>> {
        let mut groups: Vec<TableChange<'_>> = Vec::new();
        for change in &self.changes {
            if matches!(
                change,
                SchemaChange::CreateSequence(_) | SchemaChange::DropSequence(_)
            ) {
                continue;
            }
            let target = change.target();
            match groups.iter_mut().find(|g| g.table.key() == target.key()) {
                Some(group) => group.changes.push(change),
                None => groups.push(TableChange {
                    table: target,
                    changes: vec![change],
                }),
            }
        }
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::TypeCode;

    #[test]
    fn test_push_keeps_precedence_order() {
        let column = Column::new("email", TypeCode::Varchar);
        let mut change =
            ColumnDefinitionChange::new(TableName::new("users"), column.clone(), column);
        change.push(ColumnPropertyChange::Size {
            old: "varchar(50)".into(),
            new: "varchar(100)".into(),
        });
        change.push(ColumnPropertyChange::Default {
            old: None,
            new: Some("'x'".into()),
        });
        change.push(ColumnPropertyChange::Unique {
            old: true,
            new: false,
        });

        let order: Vec<ColumnProperty> = change.changes.iter().map(ColumnPropertyChange::property).collect();
        assert_eq!(
            order,
            vec![ColumnProperty::Unique, ColumnProperty::Default, ColumnProperty::Size]
        );
        assert!(change.removes_unique());
        assert!(!change.adds_unique());
        assert!(change.has_non_unique_changes());
    }

    #[test]
    fn test_group_by_table() {
        let users = TableName::new("users");
        let mut set = ChangeSet::new();
        set.changes.push(SchemaChange::AddColumn {
            table: users.clone(),
            column: Column::new("a", TypeCode::Integer),
        });
        set.changes.push(SchemaChange::CreateSequence(Sequence::new("seq1")));
        set.changes.push(SchemaChange::CreateTable(Table::new("orders")));
        set.changes.push(SchemaChange::AddIndex {
            table: TableName::new("USERS"),
            index: Index::new("ix_a", vec!["a".into()]),
        });

        let groups = set.by_table();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].table, users);
        assert_eq!(groups[0].changes.len(), 2);
        assert_eq!(groups[1].table.name, "orders");
    }

    #[test]
    fn test_warning_display() {
        let warning = ChangeWarning::Skipped {
            table: TableName::new("users"),
            column: "age".into(),
            change: ColumnPropertyChange::Type {
                old: "integer".into(),
                new: "varchar(10)".into(),
            },
            reason: SkipReason::TypeChange,
        };
        assert_eq!(
            warning.to_string(),
            "skipped users.age: type integer -> varchar(10) (type changes are never applied automatically)"
        );
    }
}
