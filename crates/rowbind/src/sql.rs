//! SQL text for the statements the mapper issues.
//!
//! All statements use `?` positional placeholders; drivers rewrite them to
//! their native form.

/// The type of SQL statement being issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryType {
    Select,
    Insert,
    Update,
    Other,
}

impl QueryType {
    /// Detect the statement type from its leading keyword.
    pub fn from_sql(sql: &str) -> Self {
        let head = sql
            .trim_start()
            .split(|c: char| c.is_whitespace() || c == '(')
            .next()
            .unwrap_or("");
        if head.eq_ignore_ascii_case("SELECT") {
            QueryType::Select
        } else if head.eq_ignore_ascii_case("INSERT") {
            QueryType::Insert
        } else if head.eq_ignore_ascii_case("UPDATE") {
            QueryType::Update
        } else {
            QueryType::Other
        }
    }
}

/// `SELECT * FROM <table> [<where>] [LIMIT n]`
pub fn select(table: &str, clause: &str, limit: Option<u64>) -> String {
    let mut sql = format!("SELECT * FROM {table}");
    if !clause.is_empty() {
        sql.push(' ');
        sql.push_str(clause);
    }
    if let Some(n) = limit {
        sql.push_str(&format!(" LIMIT {n}"));
    }
    sql
}

/// `INSERT INTO <table> (a, b) VALUES (?, ?)`
pub fn insert(table: &str, columns: &[String]) -> String {
    let placeholders = vec!["?"; columns.len()].join(", ");
    format!(
        "INSERT INTO {table} ({}) VALUES ({placeholders})",
        columns.join(", ")
    )
}

/// `UPDATE <table> SET a=?, b=? WHERE <key_column> = <key_sql>`
///
/// `key_sql` is either `?` or an already-rendered literal.
pub fn update(table: &str, columns: &[String], key_column: &str, key_sql: &str) -> String {
    let sets = columns
        .iter()
        .map(|c| format!("{c}=?"))
        .collect::<Vec<_>>()
        .join(", ");
    format!("UPDATE {table} SET {sets} WHERE {key_column} = {key_sql}")
}

/// `SELECT <key_column> FROM <table> WHERE a = ? AND b = ? LIMIT 1`
pub fn select_key(table: &str, key_column: &str, columns: &[String]) -> String {
    let filters = columns
        .iter()
        .map(|c| format!("{c} = ?"))
        .collect::<Vec<_>>()
        .join(" AND ");
    format!("SELECT {key_column} FROM {table} WHERE {filters} LIMIT 1")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn select_variants() {
        assert_eq!(select("t", "", None), "SELECT * FROM t");
        assert_eq!(
            select("t", "WHERE (a = ?)", Some(1)),
            "SELECT * FROM t WHERE (a = ?) LIMIT 1"
        );
    }

    #[test]
    fn insert_and_update() {
        assert_eq!(
            insert("t", &cols(&["id", "name"])),
            "INSERT INTO t (id, name) VALUES (?, ?)"
        );
        assert_eq!(
            update("t", &cols(&["name"]), "id", "5"),
            "UPDATE t SET name=? WHERE id = 5"
        );
        assert_eq!(
            update("t", &cols(&["a", "b"]), "id", "?"),
            "UPDATE t SET a=?, b=? WHERE id = ?"
        );
    }

    #[test]
    fn key_query_back() {
        assert_eq!(
            select_key("t", "id", &cols(&["name"])),
            "SELECT id FROM t WHERE name = ? LIMIT 1"
        );
        assert_eq!(
            select_key("t", "id", &cols(&["a", "b"])),
            "SELECT id FROM t WHERE a = ? AND b = ? LIMIT 1"
        );
    }

    #[test]
    fn query_type_detection() {
        assert_eq!(QueryType::from_sql("  select 1"), QueryType::Select);
        assert_eq!(QueryType::from_sql("INSERT INTO t"), QueryType::Insert);
        assert_eq!(QueryType::from_sql("UPDATE t SET a=?"), QueryType::Update);
        assert_eq!(QueryType::from_sql("DELETE FROM t"), QueryType::Other);
    }
}
