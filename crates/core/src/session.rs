use std::num::ParseIntError;

use crate::bounded_list::BoundedList;
use crate::layout::max_scroll;
use crate::table_data::TableDataBuffer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    DatabaseList,
    TableList,
    TableData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginField {
    Username,
    Password,
    Port,
}

impl LoginField {
    pub const ALL: [Self; 3] = [Self::Username, Self::Password, Self::Port];

    #[must_use]
    pub fn index(self) -> u16 {
        match self {
            Self::Username => 0,
            Self::Password => 1,
            Self::Port => 2,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Username => "Username:",
            Self::Password => "Password:",
            Self::Port => "Port:",
        }
    }

    /// Maximum number of characters the field holds.
    #[must_use]
    pub fn capacity(self) -> usize {
        match self {
            Self::Username | Self::Password => 99,
            Self::Port => 9,
        }
    }

    #[must_use]
    pub fn accepts(self, ch: char) -> bool {
        match self {
            Self::Username | Self::Password => !ch.is_control(),
            Self::Port => ch.is_ascii_digit(),
        }
    }

    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Self::Username => Self::Password,
            Self::Password => Self::Port,
            Self::Port => Self::Username,
        }
    }
}

/// Login form values. Only the focused field accepts keyboard input.
#[derive(Clone, PartialEq, Eq)]
pub struct LoginForm {
    username: String,
    password: String,
    port: String,
    focus: Option<LoginField>,
}

impl Default for LoginForm {
    fn default() -> Self {
        Self {
            username: String::new(),
            password: String::new(),
            port: String::new(),
            focus: Some(LoginField::Username),
        }
    }
}

impl std::fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginForm")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("port", &self.port)
            .field("focus", &self.focus)
            .finish()
    }
}

impl LoginForm {
    #[must_use]
    pub fn value(&self, field: LoginField) -> &str {
        match field {
            LoginField::Username => &self.username,
            LoginField::Password => &self.password,
            LoginField::Port => &self.port,
        }
    }

    fn value_mut(&mut self, field: LoginField) -> &mut String {
        match field {
            LoginField::Username => &mut self.username,
            LoginField::Password => &mut self.password,
            LoginField::Port => &mut self.port,
        }
    }

    #[must_use]
    pub fn focus(&self) -> Option<LoginField> {
        self.focus
    }

    #[must_use]
    pub fn is_editing(&self, field: LoginField) -> bool {
        self.focus == Some(field)
    }

    pub fn set_focus(&mut self, focus: Option<LoginField>) {
        self.focus = focus;
    }

    pub fn focus_next(&mut self) {
        self.focus = Some(self.focus.map_or(LoginField::Username, LoginField::next));
    }

    /// Writes `value` into `field`, keeping only the characters the field
    /// accepts, up to its capacity.
    pub fn set_value(&mut self, field: LoginField, value: &str) {
        let filtered = value
            .chars()
            .filter(|ch| field.accepts(*ch))
            .take(field.capacity())
            .collect();
        *self.value_mut(field) = filtered;
    }

    /// Returns `false` when there is no focused field, the character is not
    /// accepted, or the field is full.
    pub fn insert_char(&mut self, ch: char) -> bool {
        let Some(field) = self.focus else {
            return false;
        };
        if !field.accepts(ch) {
            return false;
        }

        let value = self.value_mut(field);
        if value.chars().count() >= field.capacity() {
            return false;
        }
        value.push(ch);
        true
    }

    pub fn backspace(&mut self) -> bool {
        let Some(field) = self.focus else {
            return false;
        };
        self.value_mut(field).pop().is_some()
    }

    pub fn parse_port(&self) -> Result<u16, ParseIntError> {
        self.port.trim().parse::<u16>()
    }
}

/// Vertical scroll position of the list screens, in rows. Always in
/// `[-max_scroll, 0]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollState {
    offset: i32,
}

impl ScrollState {
    #[must_use]
    pub fn offset(&self) -> i32 {
        self.offset
    }

    pub fn reset(&mut self) {
        self.offset = 0;
    }

    /// Moves by `delta` rows (positive scrolls toward the top) and clamps to
    /// the range that keeps `content` rows inside a `viewport` rows tall view.
    pub fn apply(&mut self, delta: i32, content: u32, viewport: u16) {
        self.offset = self.offset.saturating_add(delta);
        self.clamp(content, viewport);
    }

    pub fn clamp(&mut self, content: u32, viewport: u16) {
        let max = max_scroll(content, viewport);
        self.offset = self.offset.clamp(-max, 0);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
}

impl StatusMessage {
    #[must_use]
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Info,
            text: text.into(),
        }
    }

    #[must_use]
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Error,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionLimits {
    pub max_databases: usize,
    pub max_tables: usize,
    pub table_data_capacity: usize,
    pub scroll_step: u16,
}

impl Default for SessionLimits {
    fn default() -> Self {
        Self {
            max_databases: 100,
            max_tables: 500,
            table_data_capacity: 64 * 1024,
            scroll_step: 1,
        }
    }
}

/// Everything the client knows during one run.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub screen: Screen,
    pub form: LoginForm,
    pub selected_database: Option<String>,
    pub selected_table: Option<String>,
    pub databases: BoundedList<String>,
    pub tables: BoundedList<String>,
    pub table_data: TableDataBuffer,
    pub scroll: ScrollState,
    pub status: Option<StatusMessage>,
}

impl SessionState {
    #[must_use]
    pub fn new(limits: &SessionLimits) -> Self {
        Self {
            screen: Screen::Login,
            form: LoginForm::default(),
            selected_database: None,
            selected_table: None,
            databases: BoundedList::new(limits.max_databases),
            tables: BoundedList::new(limits.max_tables),
            table_data: TableDataBuffer::new(limits.table_data_capacity),
            scroll: ScrollState::default(),
            status: None,
        }
    }
}
