use std::time::{Duration, Instant};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// One result row; `None` is a SQL NULL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRow {
    pub cells: Vec<Option<String>>,
}

impl QueryRow {
    #[must_use]
    pub fn new(cells: Vec<Option<String>>) -> Self {
        Self { cells }
    }

    #[must_use]
    pub fn first(&self) -> Option<&str> {
        self.cells.first().and_then(Option::as_deref)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct BackendError {
    message: String,
}

impl BackendError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
pub trait DatabaseBackend {
    type Connection: Send;

    async fn connect(&self, credentials: &Credentials) -> Result<Self::Connection, BackendError>;
    async fn ping(&self, connection: &mut Self::Connection) -> Result<(), BackendError>;
    /// Runs `sql` and returns the whole stored result set.
    async fn query(
        &self,
        connection: &mut Self::Connection,
        sql: &str,
    ) -> Result<Vec<QueryRow>, BackendError>;
    async fn disconnect(&self, connection: Self::Connection) -> Result<(), BackendError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionStatus {
    pub endpoint: Option<String>,
    pub user: Option<String>,
    pub is_connected: bool,
    pub last_latency: Option<Duration>,
}

impl ConnectionStatus {
    #[must_use]
    pub fn disconnected() -> Self {
        Self {
            endpoint: None,
            user: None,
            is_connected: false,
            last_latency: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConnectionManagerError {
    #[error("active connection already exists to `{endpoint}`")]
    AlreadyConnected { endpoint: String },
    #[error("connection manager is not connected")]
    NotConnected,
    #[error("connection backend failed: {0}")]
    Backend(#[source] BackendError),
}

#[derive(Debug)]
struct ActiveConnection<C> {
    credentials: Credentials,
    handle: C,
}

impl<C> ActiveConnection<C> {
    fn endpoint(&self) -> String {
        format!("{}:{}", self.credentials.host, self.credentials.port)
    }
}

/// Owns the single live connection and routes every query through it.
#[derive(Debug)]
pub struct ConnectionManager<B: DatabaseBackend> {
    backend: B,
    active: Option<ActiveConnection<B::Connection>>,
    last_latency: Option<Duration>,
}

impl<B: DatabaseBackend> ConnectionManager<B> {
    #[must_use]
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            active: None,
            last_latency: None,
        }
    }

    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.active.is_some()
    }

    #[must_use]
    pub fn status(&self) -> ConnectionStatus {
        ConnectionStatus {
            endpoint: self.active.as_ref().map(ActiveConnection::endpoint),
            user: self
                .active
                .as_ref()
                .map(|active| active.credentials.user.clone()),
            is_connected: self.active.is_some(),
            last_latency: self.last_latency,
        }
    }

    pub async fn connect(
        &mut self,
        credentials: Credentials,
    ) -> Result<Duration, ConnectionManagerError> {
        if let Some(active) = &self.active {
            return Err(ConnectionManagerError::AlreadyConnected {
                endpoint: active.endpoint(),
            });
        }

        let started_at = Instant::now();
        let mut handle = self
            .backend
            .connect(&credentials)
            .await
            .map_err(ConnectionManagerError::Backend)?;
        self.backend
            .ping(&mut handle)
            .await
            .map_err(ConnectionManagerError::Backend)?;

        let latency = started_at.elapsed();
        self.last_latency = Some(latency);
        self.active = Some(ActiveConnection {
            credentials,
            handle,
        });

        Ok(latency)
    }

    pub async fn health_check(&mut self) -> Result<Duration, ConnectionManagerError> {
        let active = self
            .active
            .as_mut()
            .ok_or(ConnectionManagerError::NotConnected)?;

        let started_at = Instant::now();
        self.backend
            .ping(&mut active.handle)
            .await
            .map_err(ConnectionManagerError::Backend)?;

        let latency = started_at.elapsed();
        self.last_latency = Some(latency);

        Ok(latency)
    }

    pub async fn query(&mut self, sql: &str) -> Result<Vec<QueryRow>, ConnectionManagerError> {
        let active = self
            .active
            .as_mut()
            .ok_or(ConnectionManagerError::NotConnected)?;

        self.backend
            .query(&mut active.handle, sql)
            .await
            .map_err(ConnectionManagerError::Backend)
    }

    /// Closes the active connection. The handle is released even when the
    /// backend reports an error while closing it.
    pub async fn disconnect(&mut self) -> Result<(), ConnectionManagerError> {
        let Some(active) = self.active.take() else {
            return Ok(());
        };

        self.last_latency = None;
        self.backend
            .disconnect(active.handle)
            .await
            .map_err(ConnectionManagerError::Backend)
    }
}
