//! SQL fragments for UUID columns that may hold canonical text, upper-case
//! text or a 16-byte blob, depending on which writer produced the row.

/// Predicate on `col` matching one UUID in any stored form.
/// Takes two binds, both the hyphenated id: see [`bind_uuid`].
pub fn match_uuid_clause(col: &str) -> String {
    format!(
        "((typeof({c})='blob' AND hex({c})=upper(replace(?,'-',''))) OR (typeof({c})='text' AND lower({c}) = lower(?)))",
        c = col
    )
}

/// Binds `id` for one [`match_uuid_clause`] predicate.
pub fn bind_uuid<'q>(
    query: sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>>,
    id: uuid::Uuid,
) -> sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>> {
    let text = id.to_string();
    query.bind(text.clone()).bind(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clause_checks_both_storage_forms() {
        let clause = match_uuid_clause("pm.user_id");
        assert!(clause.contains("typeof(pm.user_id)='blob'"));
        assert!(clause.contains("lower(pm.user_id) = lower(?)"));
        assert_eq!(clause.matches('?').count(), 2);
    }
}
