//! End-to-end upgrade cycle against an in-memory SQLite database.

use oxide_db::prelude::*;
use oxide_upgrade::prelude::*;

fn model() -> Schema {
    Schema {
        tables: vec![
            Table::new("users")
                .column(Column::new("id", TypeCode::Integer).primary_key())
                .column(
                    Column::new("email", TypeCode::Varchar)
                        .length(100)
                        .unique()
                        .not_null(),
                )
                .column(
                    Column::new("name", TypeCode::Varchar)
                        .length(50)
                        .default_value(DefaultValue::Text("anon".into())),
                )
                .column(
                    Column::new("active", TypeCode::Boolean)
                        .not_null()
                        .default_value(DefaultValue::Boolean(true)),
                )
                .index(Index::new("ix_users_name", vec!["name".into()])),
            Table::new("orders")
                .column(Column::new("id", TypeCode::Integer).primary_key())
                .column(Column::new("user_id", TypeCode::Integer).not_null())
                .column(Column::new("total", TypeCode::Decimal).precision(10, 2))
                .foreign_key(
                    ForeignKey::new("fk_orders_user", vec!["user_id".into()], "users", vec!["id".into()])
                        .on_delete(ForeignKeyRule::Cascade),
                ),
        ],
        ..Schema::default()
    }
}

async fn sqlite() -> (SqlxConnection, Platform) {
    let conn = SqlxConnection::connect("sqlite::memory:").await.unwrap();
    let registry = PlatformRegistry::with_defaults().unwrap();
    let platform = registry.detect(conn.product_name()).unwrap().clone();
    (conn, platform)
}

#[tokio::test]
async fn test_upgrade_is_idempotent() {
    let (conn, platform) = sqlite().await;
    assert_eq!(platform.name(), "SQLite");
    let command = UpgradeCommand::new(platform, UpgradeOptions::default());

    let report = command.upgrade(&conn, &[model()]).await.unwrap();
    assert!(report.executed > 0);
    assert_eq!(report.executed, report.statements.len());
    assert!(report.warnings.is_empty());

    let changes = command.diff(&conn, &model()).await.unwrap();
    assert!(changes.is_empty(), "unexpected changes: {changes:?}");

    let again = command.upgrade(&conn, &[model()]).await.unwrap();
    assert!(again.statements.is_empty());
    assert_eq!(again.executed, 0);
}

#[tokio::test]
async fn test_dry_run_leaves_database_untouched() {
    let (conn, platform) = sqlite().await;
    let options = UpgradeOptions {
        dry_run: true,
        ..UpgradeOptions::default()
    };

    let report = UpgradeCommand::new(platform.clone(), options)
        .upgrade(&conn, &[model()])
        .await
        .unwrap();
    assert_eq!(report.executed, 0);
    assert!(!report.statements.is_empty());

    let live = platform.read_schema(&conn, None, None).await.unwrap();
    assert!(live.tables.is_empty());
}

#[tokio::test]
async fn test_added_column_and_unsupported_changes() {
    let (conn, platform) = sqlite().await;
    let command = UpgradeCommand::new(platform, UpgradeOptions::default());
    command.upgrade(&conn, &[model()]).await.unwrap();

    let mut declared = model();
    let users = &mut declared.tables[0];
    users.columns.push(Column::new("nickname", TypeCode::Varchar).length(30).unique());
    users
        .find_column_mut("name")
        .unwrap()
        .length = Some(80);

    let report = command.upgrade(&conn, &[declared.clone()]).await.unwrap();
    assert_eq!(
        report.statements,
        vec![
            "ALTER TABLE users ADD COLUMN nickname varchar(30) NULL",
            "CREATE UNIQUE INDEX INTERNAL_UNIQUE_IX_users_nickname ON users (nickname)",
        ]
    );
    assert_eq!(report.warnings.len(), 1);
    assert!(matches!(
        &report.warnings[0],
        ChangeWarning::Skipped { column, reason: SkipReason::NotSupported, .. } if column == "name"
    ));

    let live = command.platform().read_schema(&conn, None, None).await.unwrap();
    let nickname = live.find_table("users").unwrap().find_column("nickname").unwrap();
    assert!(nickname.unique);
    assert_eq!(
        nickname.unique_index.as_deref(),
        Some("INTERNAL_UNIQUE_IX_users_nickname")
    );
}

#[tokio::test]
async fn test_unique_on_populated_table_is_skipped() {
    let (conn, platform) = sqlite().await;
    let command = UpgradeCommand::new(platform, UpgradeOptions::default());
    command.upgrade(&conn, &[model()]).await.unwrap();

    let mut declared = model();
    declared.tables[0].find_column_mut("name").unwrap().unique = true;

    let changes = command.diff(&conn, &declared).await.unwrap();
    assert_eq!(changes.len(), 1);
    assert!(changes.warnings.is_empty());

    conn.execute("INSERT INTO users (id, email, name) VALUES (1, 'a@example.com', 'a')")
        .await
        .unwrap();
    let report = command.upgrade(&conn, &[declared]).await.unwrap();
    assert!(report.statements.is_empty());
    assert_eq!(report.warnings.len(), 1);
    assert!(matches!(
        &report.warnings[0],
        ChangeWarning::Skipped { column, reason: SkipReason::NonEmptyTable, .. } if column == "name"
    ));
}
