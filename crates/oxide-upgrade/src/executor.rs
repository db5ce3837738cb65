//! Upgrade command: read, compare, plan and execute.

use oxide_db::changes::{ChangeSet, ChangeWarning, SchemaChange};
use oxide_db::Schema;
use tracing::{debug, info};

use crate::connection::DbConnection;
use crate::error::{Result, UpgradeError};
use crate::platform::Platform;

/// Options of an upgrade run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpgradeOptions {
    /// Print the statements instead of executing them.
    pub dry_run: bool,
    /// Apply column alterations. When false only new objects are created.
    pub alter_columns: bool,
}

impl Default for UpgradeOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            alter_columns: true,
        }
    }
}

/// Outcome of an upgrade run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpgradeReport {
    /// Planned statements, in execution order.
    pub statements: Vec<String>,
    /// Changes that were detected but not applied.
    pub warnings: Vec<ChangeWarning>,
    /// Number of statements executed. Zero for a dry run.
    pub executed: usize,
}

/// Execution phase of a change. Phases run in declaration order so that
/// referenced objects exist before anything refers to them.
const fn phase(change: &SchemaChange) -> u8 {
    match change {
        SchemaChange::DropSequence(_) => 0,
        SchemaChange::CreateSequence(_) => 1,
        SchemaChange::CreateTable(_) => 2,
        SchemaChange::AddColumn { .. } => 3,
        SchemaChange::AlterColumn(_) => 4,
        SchemaChange::CommentTable { .. } => 5,
        SchemaChange::AddIndex { .. } => 6,
        SchemaChange::AddForeignKey { .. } => 7,
    }
}

/// Live tables where a declared column becomes NOT NULL or unique.
fn tightened_tables(declared: &Schema, live: &Schema) -> Vec<String> {
    let mut names = Vec::new();
    for table in declared.all_tables() {
        let Some(current) = live.find_table(&table.name) else {
            continue;
        };
        let tightened = table.columns.iter().any(|column| {
            current.find_column(&column.name).is_some_and(|c| {
                (!column.is_nullable() && c.is_nullable()) || (column.is_unique() && !c.is_unique())
            })
        });
        if tightened {
            names.push(current.name.clone());
        }
    }
    names
}

/// Brings live schemas up to date with declared ones, additively.
#[derive(Debug, Clone)]
pub struct UpgradeCommand {
    platform: Platform,
    options: UpgradeOptions,
}

impl UpgradeCommand {
    /// Creates an upgrade command for a platform.
    #[must_use]
    pub const fn new(platform: Platform, options: UpgradeOptions) -> Self {
        Self { platform, options }
    }

    /// Returns the platform.
    #[must_use]
    pub const fn platform(&self) -> &Platform {
        &self.platform
    }

    /// Returns the options.
    #[must_use]
    pub const fn options(&self) -> UpgradeOptions {
        self.options
    }

    /// Reads the live counterpart of `declared` and compares both.
    ///
    /// The live schema is read from `declared`'s catalog and schema, or
    /// from the connection's default schema when it has none.
    ///
    /// # Errors
    ///
    /// Returns an error if reading the live schema fails or if `declared`
    /// needs a capability the platform lacks.
    pub async fn diff(&self, conn: &dyn DbConnection, declared: &Schema) -> Result<ChangeSet> {
        let mut live = self
            .platform
            .read_schema(conn, declared.catalog.as_deref(), declared.name.as_deref())
            .await?;
        for name in tightened_tables(declared, &live) {
            let Some(table) = live.find_table_mut(&name) else {
                continue;
            };
            if self.platform.has_rows(conn, &table.qualified_name()).await? {
                debug!(table = %name, "Table holds rows");
                table.has_rows = true;
            }
        }
        Ok(self.platform.comparator().compare(declared, &live)?)
    }

    /// Renders a change set as statements, grouped by phase.
    ///
    /// # Errors
    ///
    /// Returns an error if a change cannot be rendered on this platform.
    pub fn plan(&self, changes: &ChangeSet) -> Result<Vec<String>> {
        let mut ordered: Vec<&SchemaChange> = changes
            .changes
            .iter()
            .filter(|change| match change {
                SchemaChange::AlterColumn(alter) if !self.options.alter_columns => {
                    info!(
                        table = %alter.table,
                        column = %alter.new.name,
                        "Column alteration disabled, skipping"
                    );
                    false
                }
                _ => true,
            })
            .collect();
        ordered.sort_by_key(|change| phase(change));

        let dialect = self.platform.dialect();
        let mut statements = Vec::new();
        for change in ordered {
            statements.extend(dialect.generate_sql(change)?);
        }
        Ok(statements)
    }

    /// Executes statements one by one, stopping at the first failure.
    /// In dry-run mode the statements are printed instead.
    ///
    /// # Errors
    ///
    /// Returns [`UpgradeError::Execution`] for the first failing
    /// statement; the remaining ones are not executed.
    pub async fn execute(&self, conn: &dyn DbConnection, statements: &[String]) -> Result<usize> {
        if self.options.dry_run {
            for sql in statements {
                println!("{sql};");
            }
            return Ok(0);
        }
        for sql in statements {
            debug!(sql = %sql, "Executing SQL");
            conn.execute(sql)
                .await
                .map_err(|source| UpgradeError::Execution {
                    sql: sql.clone(),
                    source,
                })?;
        }
        Ok(statements.len())
    }

    /// Upgrades every declared schema.
    ///
    /// All schemas are compared before anything is executed, so foreign
    /// keys across schemas are added after every table exists.
    ///
    /// # Errors
    ///
    /// Returns the first read, comparison, rendering or execution error.
    pub async fn upgrade(&self, conn: &dyn DbConnection, declared: &[Schema]) -> Result<UpgradeReport> {
        let mut changes = ChangeSet::new();
        for schema in declared {
            changes.extend(self.diff(conn, schema).await?);
        }

        let statements = self.plan(&changes)?;
        info!(
            platform = self.platform.name(),
            "Found {} changes",
            statements.len()
        );
        if !changes.warnings.is_empty() {
            info!(skipped = changes.warnings.len(), "Some changes were not applied");
        }

        let executed = self.execute(conn, &statements).await?;
        Ok(UpgradeReport {
            statements,
            warnings: changes.warnings,
            executed,
        })
    }
}
