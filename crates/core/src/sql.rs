use thiserror::Error;

pub const SHOW_DATABASES_SQL: &str = "SHOW DATABASES";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SqlError {
    #[error("database name cannot be empty")]
    EmptyDatabaseName,
    #[error("table name cannot be empty")]
    EmptyTableName,
}

#[must_use]
pub fn quote_identifier(identifier: &str) -> String {
    format!("`{}`", identifier.replace('`', "``"))
}

fn non_empty_database(database: &str) -> Result<&str, SqlError> {
    if database.trim().is_empty() {
        return Err(SqlError::EmptyDatabaseName);
    }
    Ok(database)
}

pub fn show_tables_sql(database: &str) -> Result<String, SqlError> {
    let database = non_empty_database(database)?;
    Ok(format!("SHOW TABLES FROM {}", quote_identifier(database)))
}

pub fn select_all_sql(database: &str, table: &str) -> Result<String, SqlError> {
    let database = non_empty_database(database)?;
    if table.trim().is_empty() {
        return Err(SqlError::EmptyTableName);
    }

    Ok(format!(
        "SELECT * FROM {}.{}",
        quote_identifier(database),
        quote_identifier(table)
    ))
}

#[cfg(test)]
mod tests {
    use super::{quote_identifier, select_all_sql, show_tables_sql, SqlError};

    #[test]
    fn identifiers_escape_embedded_backticks() {
        assert_eq!(quote_identifier("orders"), "`orders`");
        assert_eq!(quote_identifier("we`ird"), "`we``ird`");
    }

    #[test]
    fn show_tables_is_scoped_to_database() {
        assert_eq!(
            show_tables_sql("shop").expect("valid database"),
            "SHOW TABLES FROM `shop`"
        );
        assert_eq!(show_tables_sql("  "), Err(SqlError::EmptyDatabaseName));
    }

    #[test]
    fn select_all_qualifies_table_with_database() {
        assert_eq!(
            select_all_sql("shop", "order items").expect("valid target"),
            "SELECT * FROM `shop`.`order items`"
        );
    }

    #[test]
    fn select_all_rejects_empty_names() {
        assert_eq!(
            select_all_sql("", "users"),
            Err(SqlError::EmptyDatabaseName)
        );
        assert_eq!(select_all_sql("shop", ""), Err(SqlError::EmptyTableName));
    }
}
