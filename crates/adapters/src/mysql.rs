use async_trait::async_trait;
use dbnav_core::connection_manager::{BackendError, Credentials, DatabaseBackend, QueryRow};
use mysql_async::prelude::Queryable;
use mysql_async::{Conn, OptsBuilder, Row, Value};
use tracing::trace;

/// MariaDB / MySQL backend over a single `mysql_async` connection.
#[derive(Debug, Clone, Default)]
pub struct MysqlBackend;

#[async_trait]
impl DatabaseBackend for MysqlBackend {
    type Connection = Conn;

    async fn connect(&self, credentials: &Credentials) -> Result<Self::Connection, BackendError> {
        Conn::new(opts_from_credentials(credentials))
            .await
            .map_err(to_backend_error)
    }

    async fn ping(&self, connection: &mut Self::Connection) -> Result<(), BackendError> {
        connection.ping().await.map_err(to_backend_error)
    }

    async fn query(
        &self,
        connection: &mut Self::Connection,
        sql: &str,
    ) -> Result<Vec<QueryRow>, BackendError> {
        trace!(sql, "running text query");
        let rows = connection
            .query::<Row, _>(sql)
            .await
            .map_err(to_backend_error)?;
        Ok(rows.into_iter().map(row_to_query_row).collect())
    }

    async fn disconnect(&self, connection: Self::Connection) -> Result<(), BackendError> {
        connection.disconnect().await.map_err(to_backend_error)
    }
}

fn opts_from_credentials(credentials: &Credentials) -> OptsBuilder {
    let password = (!credentials.password.is_empty()).then(|| credentials.password.clone());
    OptsBuilder::default()
        .ip_or_hostname(credentials.host.clone())
        .tcp_port(credentials.port)
        .user(Some(credentials.user.clone()))
        .pass(password)
}

fn row_to_query_row(row: Row) -> QueryRow {
    let cells = row
        .unwrap()
        .into_iter()
        .map(mysql_value_to_cell)
        .collect::<Vec<_>>();
    QueryRow::new(cells)
}

fn mysql_value_to_cell(value: Value) -> Option<String> {
    let text = match value {
        Value::NULL => return None,
        Value::Bytes(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Value::Int(value) => value.to_string(),
        Value::UInt(value) => value.to_string(),
        Value::Float(value) => value.to_string(),
        Value::Double(value) => value.to_string(),
        Value::Date(year, month, day, hour, minute, second, micros) => {
            if hour == 0 && minute == 0 && second == 0 && micros == 0 {
                format!("{year:04}-{month:02}-{day:02}")
            } else {
                format!(
                    "{year:04}-{month:02}-{day:02} {hour:02}:{minute:02}:{second:02}.{micros:06}"
                )
            }
        }
        Value::Time(is_negative, days, hours, minutes, seconds, micros) => {
            let sign = if is_negative { "-" } else { "" };
            let hours = u32::from(hours) + days * 24;
            format!("{sign}{hours:02}:{minutes:02}:{seconds:02}.{micros:06}")
        }
    };
    Some(text)
}

fn to_backend_error(error: mysql_async::Error) -> BackendError {
    BackendError::new(error.to_string())
}

#[cfg(test)]
mod tests {
    use dbnav_core::connection_manager::Credentials;
    use mysql_async::{Opts, Value};

    use super::{mysql_value_to_cell, opts_from_credentials};

    #[test]
    fn null_becomes_absent_cell() {
        assert_eq!(mysql_value_to_cell(Value::NULL), None);
    }

    #[test]
    fn value_conversion_is_human_readable() {
        assert_eq!(
            mysql_value_to_cell(Value::Bytes(b"hello".to_vec())).as_deref(),
            Some("hello")
        );
        assert_eq!(mysql_value_to_cell(Value::Int(-8)).as_deref(), Some("-8"));
        assert_eq!(mysql_value_to_cell(Value::UInt(8)).as_deref(), Some("8"));
    }

    #[test]
    fn dates_drop_zero_time_part() {
        assert_eq!(
            mysql_value_to_cell(Value::Date(2024, 2, 9, 0, 0, 0, 0)).as_deref(),
            Some("2024-02-09")
        );
        assert_eq!(
            mysql_value_to_cell(Value::Date(2024, 2, 9, 13, 5, 1, 20)).as_deref(),
            Some("2024-02-09 13:05:01.000020")
        );
    }

    #[test]
    fn times_fold_days_into_hours() {
        assert_eq!(
            mysql_value_to_cell(Value::Time(true, 1, 2, 3, 4, 0)).as_deref(),
            Some("-26:03:04.000000")
        );
    }

    fn credentials(password: &str) -> Credentials {
        Credentials {
            host: "db.local".to_string(),
            port: 3307,
            user: "root".to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn opts_carry_host_port_and_user() {
        let opts = Opts::from(opts_from_credentials(&credentials("secret")));

        assert_eq!(opts.ip_or_hostname(), "db.local");
        assert_eq!(opts.tcp_port(), 3307);
        assert_eq!(opts.user(), Some("root"));
        assert_eq!(opts.pass(), Some("secret"));
    }

    #[test]
    fn empty_password_is_sent_as_no_password() {
        let opts = Opts::from(opts_from_credentials(&credentials("")));

        assert_eq!(opts.user(), Some("root"));
        assert_eq!(opts.pass(), None);
    }
}
