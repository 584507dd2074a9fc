//! Cell geometry of every screen.
//!
//! The renderer draws widgets into these areas and the navigator hit-tests
//! clicks against the same areas, so a button is clickable exactly where it
//! is drawn.

use crate::session::LoginField;

pub const LIST_TOP: u16 = 3;
pub const DATABASE_ROW_PITCH: u16 = 2;
pub const TABLE_ROW_PITCH: u16 = 1;

const TITLE_ROW: u16 = 1;
const MARGIN_X: u16 = 4;
const LABEL_WIDTH: u16 = 11;
const FIELD_X: u16 = MARGIN_X + LABEL_WIDTH + 1;
const FIELD_WIDTH: u16 = 32;
const FIELD_HEIGHT: u16 = 3;
const FIRST_FIELD_Y: u16 = 4;
const CONNECT_WIDTH: u16 = 13;
const LIST_ENTRY_WIDTH: u16 = 40;
const BACK_WIDTH: u16 = 12;
const BUTTON_HEIGHT: u16 = 3;
const FOOTER_HEIGHT: u16 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub x: u16,
    pub y: u16,
}

impl Point {
    #[must_use]
    pub fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Area {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Area {
    #[must_use]
    pub fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[must_use]
    pub fn right(&self) -> u16 {
        self.x.saturating_add(self.width)
    }

    #[must_use]
    pub fn bottom(&self) -> u16 {
        self.y.saturating_add(self.height)
    }

    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenLayout {
    viewport: Area,
}

impl ScreenLayout {
    #[must_use]
    pub fn new(viewport: Area) -> Self {
        Self { viewport }
    }

    #[must_use]
    pub fn viewport(&self) -> Area {
        self.viewport
    }

    #[must_use]
    pub fn title(&self) -> Area {
        Area::new(
            MARGIN_X,
            TITLE_ROW,
            self.viewport.width.saturating_sub(2 * MARGIN_X),
            1,
        )
    }

    #[must_use]
    pub fn field_label(&self, field: LoginField) -> Area {
        Area::new(MARGIN_X, field_y(field) + 1, LABEL_WIDTH, 1)
    }

    #[must_use]
    pub fn field(&self, field: LoginField) -> Area {
        Area::new(FIELD_X, field_y(field), FIELD_WIDTH, FIELD_HEIGHT)
    }

    #[must_use]
    pub fn field_at(&self, point: Point) -> Option<LoginField> {
        LoginField::ALL
            .into_iter()
            .find(|field| self.field(*field).contains(point))
    }

    #[must_use]
    pub fn connect_button(&self) -> Area {
        let below_fields = field_y(LoginField::Port) + FIELD_HEIGHT + 1;
        Area::new(FIELD_X, below_fields, CONNECT_WIDTH, BUTTON_HEIGHT)
    }

    /// Rows available to scrollable lists and the table dump.
    #[must_use]
    pub fn list_viewport(&self) -> Area {
        let reserved = LIST_TOP + BUTTON_HEIGHT + FOOTER_HEIGHT;
        Area::new(
            MARGIN_X,
            LIST_TOP,
            self.viewport.width.saturating_sub(2 * MARGIN_X),
            self.viewport.height.saturating_sub(reserved),
        )
    }

    /// Where entry `index` is drawn, or `None` when scrolled out of view.
    #[must_use]
    pub fn list_entry(&self, index: usize, pitch: u16, offset: i32) -> Option<Area> {
        let list = self.list_viewport();
        let index = i64::try_from(index).ok()?;
        let y = i64::from(LIST_TOP) + index * i64::from(pitch) + i64::from(offset);
        if y < i64::from(list.y) || y >= i64::from(list.bottom()) {
            return None;
        }

        let y = u16::try_from(y).ok()?;
        Some(Area::new(list.x, y, LIST_ENTRY_WIDTH.min(list.width), 1))
    }

    /// Index of the list entry under `point`, if any.
    #[must_use]
    pub fn entry_at(&self, point: Point, count: usize, pitch: u16, offset: i32) -> Option<usize> {
        let list = self.list_viewport();
        if pitch == 0 || !list.contains(point) {
            return None;
        }
        if point.x >= list.x + LIST_ENTRY_WIDTH.min(list.width) {
            return None;
        }

        let relative = i64::from(point.y) - i64::from(LIST_TOP) - i64::from(offset);
        if relative < 0 || relative % i64::from(pitch) != 0 {
            return None;
        }

        let index = usize::try_from(relative / i64::from(pitch)).ok()?;
        (index < count).then_some(index)
    }

    #[must_use]
    pub fn back_button(&self) -> Area {
        Area::new(
            self.viewport.width.saturating_sub(BACK_WIDTH + MARGIN_X),
            self.viewport
                .height
                .saturating_sub(BUTTON_HEIGHT + FOOTER_HEIGHT),
            BACK_WIDTH,
            BUTTON_HEIGHT,
        )
    }

    #[must_use]
    pub fn status_line(&self) -> Area {
        Area::new(
            0,
            self.viewport.height.saturating_sub(1),
            self.viewport.width,
            1,
        )
    }
}

fn field_y(field: LoginField) -> u16 {
    FIRST_FIELD_Y + field.index() * FIELD_HEIGHT
}

/// Largest scroll distance needed to reveal `content` rows in `viewport` rows.
#[must_use]
pub fn max_scroll(content: u32, viewport: u16) -> i32 {
    let overflow = content.saturating_sub(u32::from(viewport));
    i32::try_from(overflow).unwrap_or(i32::MAX)
}
