// src/common/db_utils.rs

/// Verifica se o erro é uma violação da constraint UNIQUE informada.
/// Usado pelos repositórios para traduzir duplicidades em erros de negócio.
pub(crate) fn is_unique_violation(error: &sqlx::Error, constraint: &str) -> bool {
    match error {
        sqlx::Error::Database(db_err) => {
            db_err.is_unique_violation() && db_err.constraint().is_some_and(|c| c == constraint)
        }
        _ => false,
    }
}

/// Escapa os curingas do ILIKE para buscas "contém".
pub(crate) fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("neverfull"), "%neverfull%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }

    #[test]
    fn non_database_errors_are_not_unique_violations() {
        assert!(!is_unique_violation(&sqlx::Error::RowNotFound, "users_email_key"));
    }
}
