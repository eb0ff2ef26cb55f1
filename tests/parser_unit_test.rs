//! Statement classification and dialect helpers.

use sql_seed::parser::{parse_statement, SqlDialect, StatementType, TableRef};

fn parsed(sql: &str) -> (StatementType, String) {
    parse_statement(sql)
}

#[test]
fn test_insert_variants() {
    assert_eq!(
        parsed("INSERT INTO `users` VALUES (1);"),
        (StatementType::Insert, "users".to_string())
    );
    assert_eq!(
        parsed("  insert into t values (1);"),
        (StatementType::Insert, "t".to_string())
    );
    assert_eq!(
        parsed("REPLACE INTO t VALUES (1);"),
        (StatementType::Insert, "t".to_string())
    );
    assert_eq!(
        parsed("INSERT IGNORE INTO t VALUES (1);"),
        (StatementType::Insert, "t".to_string())
    );
}

#[test]
fn test_create_table_qualified_and_quoted() {
    assert_eq!(
        parsed("CREATE TABLE IF NOT EXISTS \"public\".\"orders\" (id INT);"),
        (StatementType::CreateTable, "public.orders".to_string())
    );
    assert_eq!(
        parsed("CREATE TEMPORARY TABLE scratch (id INT);"),
        (StatementType::CreateTable, "scratch".to_string())
    );
}

#[test]
fn test_create_index_targets_table() {
    assert_eq!(
        parsed("CREATE UNIQUE INDEX idx_email ON users (email);"),
        (StatementType::CreateIndex, "users".to_string())
    );
    assert_eq!(
        parsed("CREATE INDEX on_time ON events (ts);"),
        (StatementType::CreateIndex, "events".to_string())
    );
}

#[test]
fn test_other_statement_types() {
    assert_eq!(
        parsed("ALTER TABLE ONLY public.users ADD COLUMN age INT;"),
        (StatementType::AlterTable, "public.users".to_string())
    );
    assert_eq!(
        parsed("DROP TABLE IF EXISTS [logs];"),
        (StatementType::DropTable, "logs".to_string())
    );
    assert_eq!(
        parsed("TRUNCATE TABLE sessions;"),
        (StatementType::Truncate, "sessions".to_string())
    );
    assert_eq!(
        parsed("DELETE FROM audit WHERE id = 1;"),
        (StatementType::Delete, "audit".to_string())
    );
    assert_eq!(
        parsed("UPDATE users SET name = 'x';"),
        (StatementType::Update, "users".to_string())
    );
}

#[test]
fn test_unknown_statements_have_no_table() {
    for sql in [
        "SET NAMES utf8mb4;",
        "BEGIN;",
        "CREATE VIEW v AS SELECT 1;",
        "INSERTED INTO t VALUES (1);",
        "",
    ] {
        assert_eq!(parsed(sql), (StatementType::Unknown, String::new()), "{sql}");
    }
}

#[test]
fn test_statement_type_groups() {
    assert!(StatementType::CreateTable.is_schema());
    assert!(StatementType::CreateIndex.is_schema());
    assert!(!StatementType::Insert.is_schema());
    assert!(StatementType::Insert.is_data());
    assert!(StatementType::Delete.is_data());
    assert!(!StatementType::Unknown.is_data());
    assert_eq!(StatementType::CreateTable.to_string(), "create_table");
}

#[test]
fn test_dialect_from_str() {
    assert_eq!("PostgreSQL".parse::<SqlDialect>(), Ok(SqlDialect::Postgres));
    assert_eq!("mariadb".parse::<SqlDialect>(), Ok(SqlDialect::MySql));
    assert_eq!("sqlite3".parse::<SqlDialect>(), Ok(SqlDialect::Sqlite));
    assert!("oracle".parse::<SqlDialect>().is_err());
    assert_eq!(SqlDialect::default(), SqlDialect::MySql);
}

#[test]
fn test_quote_identifier() {
    assert_eq!(
        SqlDialect::Postgres.quote_identifier("public.users"),
        "\"public\".\"users\""
    );
    assert_eq!(SqlDialect::MySql.quote_identifier("a`b"), "`a``b`");
}

#[test]
fn test_truncate_statement_per_dialect() {
    assert_eq!(
        SqlDialect::MySql.truncate_statement(&TableRef::from("users")),
        "TRUNCATE TABLE `users`;"
    );
    assert_eq!(
        SqlDialect::Postgres.truncate_statement(&TableRef::from("users")),
        "TRUNCATE TABLE \"users\" CASCADE;"
    );
    assert_eq!(
        SqlDialect::Sqlite.truncate_statement(&TableRef::from("users")),
        "DELETE FROM \"users\";"
    );
}
