//! Recurring daily attendance windows assigned to users.

use serde::{Deserialize, Serialize};

use super::{ShiftId, TimeOfDay};

/// Shift category as configured by administrators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftKind {
    Morning,
    Afternoon,
    Night,
    Commercial,
    Custom,
}

/// A user's daily shift.
///
/// `shift_end` earlier than `shift_start` is a legal window that crosses
/// midnight (22:00-06:00). Equal boundaries describe a shift that covers the
/// whole day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Shift {
    id: ShiftId,
    kind: ShiftKind,
    shift_start: TimeOfDay,
    shift_end: TimeOfDay,
    active: bool,
}

impl Shift {
    /// Build a shift. Every combination of boundaries is valid.
    pub const fn new(
        id: ShiftId,
        kind: ShiftKind,
        shift_start: TimeOfDay,
        shift_end: TimeOfDay,
        active: bool,
    ) -> Self {
        Self {
            id,
            kind,
            shift_start,
            shift_end,
            active,
        }
    }

    pub const fn id(&self) -> &ShiftId {
        &self.id
    }

    pub const fn kind(&self) -> ShiftKind {
        self.kind
    }

    pub const fn shift_start(&self) -> TimeOfDay {
        self.shift_start
    }

    pub const fn shift_end(&self) -> TimeOfDay {
        self.shift_end
    }

    /// Whether the window wraps past midnight.
    pub fn crosses_midnight(&self) -> bool {
        self.shift_end < self.shift_start
    }

    pub const fn is_active(&self) -> bool {
        self.active
    }
}
