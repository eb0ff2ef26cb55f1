//! Statement classification: what a statement does and which table it targets.

use once_cell::sync::Lazy;
use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum StatementType {
    Unknown,
    CreateTable,
    Insert,
    CreateIndex,
    AlterTable,
    DropTable,
    Truncate,
    Delete,
    Update,
}

impl StatementType {
    /// DDL statements (CREATE TABLE, CREATE INDEX, ALTER TABLE, DROP TABLE)
    pub fn is_schema(&self) -> bool {
        matches!(
            self,
            StatementType::CreateTable
                | StatementType::CreateIndex
                | StatementType::AlterTable
                | StatementType::DropTable
        )
    }

    /// Statements that write rows
    pub fn is_data(&self) -> bool {
        matches!(
            self,
            StatementType::Insert
                | StatementType::Truncate
                | StatementType::Delete
                | StatementType::Update
        )
    }
}

impl std::fmt::Display for StatementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StatementType::Unknown => "unknown",
            StatementType::CreateTable => "create_table",
            StatementType::Insert => "insert",
            StatementType::CreateIndex => "create_index",
            StatementType::AlterTable => "alter_table",
            StatementType::DropTable => "drop_table",
            StatementType::Truncate => "truncate",
            StatementType::Delete => "delete",
            StatementType::Update => "update",
        };
        write!(f, "{}", name)
    }
}

/// Target database flavour; drives identifier quoting and truncate syntax.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum SqlDialect {
    #[default]
    MySql,
    Postgres,
    Sqlite,
}

impl std::str::FromStr for SqlDialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mysql" | "mariadb" => Ok(SqlDialect::MySql),
            "postgres" | "postgresql" | "pg" => Ok(SqlDialect::Postgres),
            "sqlite" | "sqlite3" => Ok(SqlDialect::Sqlite),
            _ => Err(format!(
                "Unknown dialect: {}. Valid options: mysql, postgres, sqlite",
                s
            )),
        }
    }
}

impl std::fmt::Display for SqlDialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SqlDialect::MySql => write!(f, "mysql"),
            SqlDialect::Postgres => write!(f, "postgres"),
            SqlDialect::Sqlite => write!(f, "sqlite"),
        }
    }
}

impl SqlDialect {
    /// Quote a possibly schema-qualified identifier, part by part, as written.
    pub fn quote_identifier(&self, name: &str) -> String {
        name.split('.')
            .map(|part| self.quote_part(part))
            .collect::<Vec<_>>()
            .join(".")
    }

    fn quote_part(&self, part: &str) -> String {
        let (open, close) = match self {
            SqlDialect::MySql => ('`', '`'),
            SqlDialect::Postgres | SqlDialect::Sqlite => ('"', '"'),
        };
        let escaped = part.replace(close, &format!("{close}{close}"));
        format!("{open}{escaped}{close}")
    }

    /// The name this dialect resolves `part` to.
    ///
    /// Postgres folds unquoted identifiers to lower case; MySQL and SQLite
    /// keep the spelling and compare case-insensitively instead.
    fn resolve_part<'a>(&self, part: &'a IdentPart) -> Cow<'a, str> {
        match self {
            SqlDialect::Postgres if !part.quoted => Cow::Owned(part.name.to_ascii_lowercase()),
            _ => Cow::Borrowed(part.name.as_str()),
        }
    }

    /// The table name as the server resolves it, unquoted.
    pub fn canonical_name(&self, table: &TableRef) -> String {
        table
            .parts
            .iter()
            .map(|p| self.resolve_part(p))
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Key under which two references name the same table.
    pub fn table_key(&self, table: &TableRef) -> String {
        let name = self.canonical_name(table);
        match self {
            SqlDialect::Postgres => name,
            SqlDialect::MySql | SqlDialect::Sqlite => name.to_lowercase(),
        }
    }

    /// Quote `table` so it names the same relation its unquoted spelling did.
    pub fn quote_table(&self, table: &TableRef) -> String {
        table
            .parts
            .iter()
            .map(|p| self.quote_part(&self.resolve_part(p)))
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Statement that empties `table` before a reload.
    ///
    /// SQLite has no TRUNCATE; an unqualified DELETE takes its truncate
    /// optimization instead.
    pub fn truncate_statement(&self, table: &TableRef) -> String {
        let quoted = self.quote_table(table);
        match self {
            SqlDialect::MySql => format!("TRUNCATE TABLE {};", quoted),
            SqlDialect::Postgres => format!("TRUNCATE TABLE {} CASCADE;", quoted),
            SqlDialect::Sqlite => format!("DELETE FROM {};", quoted),
        }
    }
}

/// One dotted component of a table reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentPart {
    pub name: String,
    /// Written with backticks, double quotes or brackets
    pub quoted: bool,
}

/// A possibly schema-qualified table name, with the quoting it was written with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    pub parts: Vec<IdentPart>,
}

impl From<&str> for TableRef {
    /// Treat `name` as an unquoted, dot-separated reference.
    fn from(name: &str) -> Self {
        TableRef {
            parts: name
                .split('.')
                .map(|part| IdentPart {
                    name: part.to_string(),
                    quoted: false,
                })
                .collect(),
        }
    }
}

impl std::fmt::Display for TableRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{}", part.name)?;
        }
        Ok(())
    }
}

static CREATE_TABLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)^\s*CREATE\s+(?:TEMP\w*\s+)?TABLE\s+(?:IF\s+NOT\s+EXISTS\s+)?[`"\[]?([^\s`"\](;]+)"#)
        .unwrap()
});

static INSERT_INTO_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)^\s*(?:INSERT|REPLACE)\s+(?:IGNORE\s+)?INTO\s+[`"\[]?([^\s`"\](;]+)"#)
        .unwrap()
});

static CREATE_INDEX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bON\s+(?:ONLY\s+)?").unwrap());

/// Classify `stmt` and extract its target table.
///
/// Returns an empty table name when none applies or it cannot be read.
pub fn parse_statement(stmt: &str) -> (StatementType, String) {
    let (stmt_type, table) = parse_table_ref(stmt);
    (stmt_type, table.map(|t| t.to_string()).unwrap_or_default())
}

/// Like [`parse_statement`], keeping how each part of the table name was quoted.
pub fn parse_table_ref(stmt: &str) -> (StatementType, Option<TableRef>) {
    let bytes = stmt.as_bytes();
    let mut cur = Cursor::new(bytes);

    if cur.keyword("CREATE") {
        cur.keyword("UNIQUE");
        if !cur.keyword("TEMPORARY") {
            cur.keyword("TEMP");
        }
        if cur.keyword("TABLE") {
            let table = table_after(&mut cur, &["IF", "NOT", "EXISTS"])
                .or_else(|| regex_table(&CREATE_TABLE_RE, stmt));
            return (StatementType::CreateTable, table);
        }
        if cur.keyword("INDEX") {
            let table = CREATE_INDEX_RE
                .find(stmt)
                .and_then(|m| Cursor::at(bytes, m.end()).identifier());
            return (StatementType::CreateIndex, table);
        }
        return (StatementType::Unknown, None);
    }

    if cur.keyword("INSERT") || cur.keyword("REPLACE") {
        cur.keyword("IGNORE");
        if cur.keyword("INTO") {
            let table =
                table_after(&mut cur, &[]).or_else(|| regex_table(&INSERT_INTO_RE, stmt));
            return (StatementType::Insert, table);
        }
        return (StatementType::Unknown, None);
    }

    if cur.keyword("ALTER") && cur.keyword("TABLE") {
        return (
            StatementType::AlterTable,
            table_after(&mut cur, &["IF", "EXISTS", "ONLY"]),
        );
    }

    let mut cur = Cursor::new(bytes);
    if cur.keyword("DROP") && cur.keyword("TABLE") {
        return (
            StatementType::DropTable,
            table_after(&mut cur, &["IF", "EXISTS"]),
        );
    }

    let mut cur = Cursor::new(bytes);
    if cur.keyword("TRUNCATE") {
        cur.keyword("TABLE");
        return (StatementType::Truncate, table_after(&mut cur, &["ONLY"]));
    }

    let mut cur = Cursor::new(bytes);
    if cur.keyword("DELETE") && cur.keyword("FROM") {
        return (StatementType::Delete, table_after(&mut cur, &["ONLY"]));
    }

    let mut cur = Cursor::new(bytes);
    if cur.keyword("UPDATE") {
        return (StatementType::Update, table_after(&mut cur, &["ONLY"]));
    }

    (StatementType::Unknown, None)
}

fn table_after(cur: &mut Cursor<'_>, optional: &[&str]) -> Option<TableRef> {
    for word in optional {
        cur.keyword(word);
    }
    cur.identifier()
}

fn regex_table(re: &Regex, stmt: &str) -> Option<TableRef> {
    re.captures(stmt)
        .and_then(|caps| caps.get(1))
        .map(|m| TableRef::from(m.as_str()))
}

/// Byte cursor over the head of a statement.
struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self::at(bytes, 0)
    }

    fn at(bytes: &'a [u8], pos: usize) -> Self {
        Self { bytes, pos }
    }

    fn skip_whitespace(&mut self) {
        while self.pos < self.bytes.len() && is_whitespace(self.bytes[self.pos]) {
            self.pos += 1;
        }
    }

    /// Consume `word` (case-insensitive) if it is the next whole word.
    fn keyword(&mut self, word: &str) -> bool {
        self.skip_whitespace();
        let end = self.pos + word.len();
        if end > self.bytes.len() || !self.bytes[self.pos..end].eq_ignore_ascii_case(word.as_bytes()) {
            return false;
        }
        if self.bytes.get(end).is_some_and(|&b| is_ident_byte(b)) {
            return false;
        }
        self.pos = end;
        true
    }

    /// Read a possibly quoted, possibly dotted identifier.
    fn identifier(&mut self) -> Option<TableRef> {
        self.skip_whitespace();
        let mut parts = Vec::new();

        loop {
            parts.push(self.identifier_part()?);
            if self.bytes.get(self.pos) == Some(&b'.') {
                self.pos += 1;
                continue;
            }
            break;
        }

        Some(TableRef { parts })
    }

    fn identifier_part(&mut self) -> Option<IdentPart> {
        let first = *self.bytes.get(self.pos)?;
        let close = match first {
            b'`' => Some(b'`'),
            b'"' => Some(b'"'),
            b'[' => Some(b']'),
            _ => None,
        };

        if let Some(close) = close {
            let start = self.pos + 1;
            let len = self.bytes[start..].iter().position(|&b| b == close)?;
            self.pos = start + len + 1;
            return Some(IdentPart {
                name: String::from_utf8_lossy(&self.bytes[start..start + len]).into_owned(),
                quoted: true,
            });
        }

        let start = self.pos;
        while self.pos < self.bytes.len() && is_ident_byte(self.bytes[self.pos]) {
            self.pos += 1;
        }
        if self.pos == start {
            return None;
        }
        Some(IdentPart {
            name: String::from_utf8_lossy(&self.bytes[start..self.pos]).into_owned(),
            quoted: false,
        })
    }
}

#[inline]
fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}

#[inline]
fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$' || b >= 0x80
}
