//! Screen state machine.
//!
//! Every user gesture maps to one method here. Gestures that need data run a
//! single query through the [`ConnectionManager`] and only switch screens once
//! that query succeeded; on failure the error is logged, stored as the status
//! line, and the current screen stays active.

use std::num::ParseIntError;

use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::bounded_list::BoundedList;
use crate::config::AppConfig;
use crate::connection_manager::{
    ConnectionManager, ConnectionManagerError, ConnectionStatus, Credentials, DatabaseBackend,
    QueryRow,
};
use crate::layout::{Area, Point, ScreenLayout, DATABASE_ROW_PITCH, TABLE_ROW_PITCH};
use crate::session::{LoginField, Screen, SessionLimits, SessionState, StatusMessage};
use crate::sql::{select_all_sql, show_tables_sql, SqlError, SHOW_DATABASES_SQL};
use crate::table_data::TableDataBuffer;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigatorSettings {
    pub host: String,
    pub default_port: Option<u16>,
    pub limits: SessionLimits,
}

impl Default for NavigatorSettings {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for NavigatorSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            host: config.host.clone(),
            default_port: config.default_port,
            limits: config.session_limits(),
        }
    }
}

#[derive(Debug, Error)]
pub enum NavigationError {
    #[error("invalid port `{input}`: {source}")]
    InvalidPort {
        input: String,
        #[source]
        source: ParseIntError,
    },
    #[error("failed to connect: {0}")]
    Connect(#[source] ConnectionManagerError),
    #[error("query failed: {0}")]
    Query(#[source] ConnectionManagerError),
    #[error("database connection lost: {0}")]
    ConnectionLost(#[source] ConnectionManagerError),
    #[error("no database selected")]
    NoDatabaseSelected,
    #[error("invalid query target: {0}")]
    Sql(#[from] SqlError),
    #[error("no list entry at index {index}")]
    NoSuchEntry { index: usize },
}

pub struct ScreenNavigator<B: DatabaseBackend> {
    state: SessionState,
    connections: ConnectionManager<B>,
    host: String,
    limits: SessionLimits,
    layout: ScreenLayout,
}

impl<B: DatabaseBackend> ScreenNavigator<B> {
    #[must_use]
    pub fn new(backend: B, settings: NavigatorSettings) -> Self {
        let mut state = SessionState::new(&settings.limits);
        if let Some(port) = settings.default_port {
            state.form.set_value(LoginField::Port, &port.to_string());
        }

        Self {
            state,
            connections: ConnectionManager::new(backend),
            host: settings.host,
            limits: settings.limits,
            layout: ScreenLayout::new(Area::default()),
        }
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub fn layout(&self) -> ScreenLayout {
        self.layout
    }

    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    #[must_use]
    pub fn connection_status(&self) -> ConnectionStatus {
        self.connections.status()
    }

    #[must_use]
    pub fn connections(&self) -> &ConnectionManager<B> {
        &self.connections
    }

    /// Adopts a new terminal size and re-clamps the scroll offset to it.
    pub fn set_viewport(&mut self, viewport: Area) {
        if self.layout.viewport() == viewport {
            return;
        }
        self.layout = ScreenLayout::new(viewport);
        if let Some((content, visible)) = self.scroll_extent() {
            self.state.scroll.clamp(content, visible);
        }
    }

    /// Focuses the login field under `point`, or none when the click missed
    /// every field.
    pub fn focus_at(&mut self, point: Point) {
        if self.state.screen != Screen::Login {
            return;
        }
        self.state.form.set_focus(self.layout.field_at(point));
    }

    pub fn focus_next(&mut self) {
        if self.state.screen == Screen::Login {
            self.state.form.focus_next();
        }
    }

    pub fn type_char(&mut self, ch: char) -> bool {
        self.state.screen == Screen::Login && self.state.form.insert_char(ch)
    }

    pub fn backspace(&mut self) -> bool {
        self.state.screen == Screen::Login && self.state.form.backspace()
    }

    /// Resolves a left click against the widgets of the current screen.
    pub async fn click(&mut self, point: Point) -> Result<(), NavigationError> {
        match self.state.screen {
            Screen::Login => {
                self.focus_at(point);
                if self.layout.connect_button().contains(point) {
                    return self.connect().await;
                }
            }
            Screen::DatabaseList => {
                let hit = self.layout.entry_at(
                    point,
                    self.state.databases.len(),
                    DATABASE_ROW_PITCH,
                    self.state.scroll.offset(),
                );
                if let Some(index) = hit {
                    return self.select_database(index).await;
                }
            }
            Screen::TableList => {
                let hit = self.layout.entry_at(
                    point,
                    self.state.tables.len(),
                    TABLE_ROW_PITCH,
                    self.state.scroll.offset(),
                );
                if let Some(index) = hit {
                    return self.select_table(index).await;
                }
                if self.layout.back_button().contains(point) {
                    self.back();
                }
            }
            Screen::TableData => {
                if self.layout.back_button().contains(point) {
                    self.back();
                }
            }
        }
        Ok(())
    }

    /// Keyboard submit: connects from the login screen, ignored elsewhere.
    pub async fn submit(&mut self) -> Result<(), NavigationError> {
        if self.state.screen == Screen::Login {
            return self.connect().await;
        }
        Ok(())
    }

    pub async fn connect(&mut self) -> Result<(), NavigationError> {
        if self.state.screen != Screen::Login {
            return Ok(());
        }
        let outcome = self.try_connect().await;
        self.report(outcome)
    }

    pub async fn select_database(&mut self, index: usize) -> Result<(), NavigationError> {
        if self.state.screen != Screen::DatabaseList {
            return Ok(());
        }
        let outcome = self.try_select_database(index).await;
        self.report(outcome)
    }

    pub async fn select_table(&mut self, index: usize) -> Result<(), NavigationError> {
        if self.state.screen != Screen::TableList {
            return Ok(());
        }
        let outcome = self.try_select_table(index).await;
        self.report(outcome)
    }

    pub fn back(&mut self) {
        match self.state.screen {
            Screen::TableList => {
                self.state.screen = Screen::DatabaseList;
                self.state.scroll.reset();
            }
            Screen::TableData => self.state.screen = Screen::TableList,
            Screen::Login | Screen::DatabaseList => return,
        }
        debug!(screen = ?self.state.screen, "navigated back");
    }

    /// Applies wheel movement on the list screens. Positive deltas scroll
    /// toward the top of the list.
    pub fn scroll(&mut self, wheel_delta: i32) {
        let Some((content, visible)) = self.scroll_extent() else {
            return;
        };
        let step = i32::from(self.limits.scroll_step);
        self.state
            .scroll
            .apply(wheel_delta.saturating_mul(step), content, visible);
    }

    /// Closes the connection, whatever state it is in.
    pub async fn shutdown(&mut self) {
        match self.connections.disconnect().await {
            Ok(()) => info!("connection closed"),
            Err(error) => warn!(%error, "closing connection failed"),
        }
    }

    async fn try_connect(&mut self) -> Result<StatusMessage, NavigationError> {
        let form = &self.state.form;
        let port = form
            .parse_port()
            .map_err(|source| NavigationError::InvalidPort {
                input: form.value(LoginField::Port).to_string(),
                source,
            })?;
        let credentials = Credentials {
            host: self.host.clone(),
            port,
            user: form.value(LoginField::Username).to_string(),
            password: form.value(LoginField::Password).to_string(),
        };

        if self.connections.is_connected() {
            if let Err(error) = self.connections.disconnect().await {
                warn!(%error, "closing previous connection failed");
            }
        }

        info!(host = %credentials.host, port, user = %credentials.user, "connecting");
        let latency = self
            .connections
            .connect(credentials)
            .await
            .map_err(NavigationError::Connect)?;
        let rows = self
            .connections
            .query(SHOW_DATABASES_SQL)
            .await
            .map_err(NavigationError::Query)?;

        let mut databases = BoundedList::new(self.limits.max_databases);
        fill_names(&mut databases, rows, "database");
        let count = databases.len();
        self.state.databases = databases;
        self.state.scroll.reset();
        self.state.screen = Screen::DatabaseList;

        info!(databases = count, ?latency, "connected");
        Ok(StatusMessage::info(format!(
            "Connected to {}:{port} in {} ms, {count} databases",
            self.host,
            latency.as_millis()
        )))
    }

    async fn try_select_database(
        &mut self,
        index: usize,
    ) -> Result<StatusMessage, NavigationError> {
        let database = self
            .state
            .databases
            .get(index)
            .cloned()
            .ok_or(NavigationError::NoSuchEntry { index })?;

        self.state.selected_database = Some(database.clone());
        self.state.selected_table = None;
        self.state.tables.clear();

        let sql = show_tables_sql(&database)?;
        debug!(%sql, "listing tables");
        let rows = self
            .connections
            .query(&sql)
            .await
            .map_err(NavigationError::Query)?;

        fill_names(&mut self.state.tables, rows, "table");
        self.state.scroll.reset();
        self.state.screen = Screen::TableList;

        Ok(StatusMessage::info(format!(
            "{} tables in `{database}`",
            self.state.tables.len()
        )))
    }

    async fn try_select_table(&mut self, index: usize) -> Result<StatusMessage, NavigationError> {
        let table = self
            .state
            .tables
            .get(index)
            .cloned()
            .ok_or(NavigationError::NoSuchEntry { index })?;
        self.state.selected_table = Some(table.clone());

        let message = self.fetch_table_data(&table).await?;
        self.state.screen = Screen::TableData;
        Ok(message)
    }

    async fn fetch_table_data(&mut self, table: &str) -> Result<StatusMessage, NavigationError> {
        let database = self
            .state
            .selected_database
            .clone()
            .filter(|name| !name.is_empty())
            .ok_or(NavigationError::NoDatabaseSelected)?;

        let sql = select_all_sql(&database, table)?;
        debug!(%sql, "fetching table rows");

        self.connections
            .health_check()
            .await
            .map_err(NavigationError::ConnectionLost)?;
        let rows = self
            .connections
            .query(&sql)
            .await
            .map_err(NavigationError::Query)?;

        let mut buffer = TableDataBuffer::new(self.limits.table_data_capacity);
        for row in &rows {
            if !buffer.append_row(&row.cells) {
                warn!(
                    capacity = buffer.capacity(),
                    rows_kept = buffer.rows_appended(),
                    rows_total = rows.len(),
                    "table data truncated"
                );
                break;
            }
        }
        debug!(rows = rows.len(), bytes = buffer.as_str().len(), "fetched table data");

        let message = if buffer.is_truncated() {
            format!(
                "Showing {} of {} rows from `{database}`.`{table}` (truncated)",
                buffer.rows_appended(),
                rows.len()
            )
        } else {
            format!("Fetched {} rows from `{database}`.`{table}`", rows.len())
        };
        self.state.table_data = buffer;
        Ok(StatusMessage::info(message))
    }

    fn report(
        &mut self,
        outcome: Result<StatusMessage, NavigationError>,
    ) -> Result<(), NavigationError> {
        match outcome {
            Ok(message) => {
                self.state.status = Some(message);
                Ok(())
            }
            Err(failure) => {
                error!(error = %failure, screen = ?self.state.screen, "action failed");
                self.state.status = Some(StatusMessage::error(failure.to_string()));
                Err(failure)
            }
        }
    }

    fn scroll_extent(&self) -> Option<(u32, u16)> {
        let (count, pitch) = match self.state.screen {
            Screen::DatabaseList => (self.state.databases.len(), DATABASE_ROW_PITCH),
            Screen::TableList => (self.state.tables.len(), TABLE_ROW_PITCH),
            Screen::Login | Screen::TableData => return None,
        };
        let content = u32::try_from(count)
            .unwrap_or(u32::MAX)
            .saturating_mul(u32::from(pitch));
        Some((content, self.layout.list_viewport().height))
    }
}

/// Collects the first column of every row, stopping at the list capacity.
fn fill_names(list: &mut BoundedList<String>, rows: Vec<QueryRow>, kind: &str) {
    let names = rows
        .into_iter()
        .filter_map(|row| row.cells.into_iter().next().flatten());
    if let Err(overflow) = list.extend_until_full(names) {
        warn!(
            capacity = overflow.capacity,
            "maximum number of {kind} entries reached, list truncated"
        );
    }
}
