//! Meal type catalogue entries and their service windows.

use std::fmt;

use serde::Serialize;

use super::{MealTypeId, TimeOfDay};

/// Validation errors returned by [`MealType::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MealTypeValidationError {
    EmptyName,
}

impl fmt::Display for MealTypeValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "meal type name must not be empty"),
        }
    }
}

impl std::error::Error for MealTypeValidationError {}

/// Input for constructing a [`MealType`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MealTypeDraft {
    pub id: MealTypeId,
    pub name: String,
    pub service_start: TimeOfDay,
    pub service_end: TimeOfDay,
    pub tolerance_minutes: u16,
    pub active: bool,
}

/// A category of meal service (breakfast, lunch, supper).
///
/// ## Invariants
/// - `name` is non-empty once trimmed.
/// - the service window never wraps past midnight; an end before the start
///   leaves the window empty rather than failing construction.
/// - the tolerance only ever extends the end of the window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MealType {
    id: MealTypeId,
    name: String,
    service_start: TimeOfDay,
    service_end: TimeOfDay,
    tolerance_minutes: u16,
    active: bool,
}

impl MealType {
    /// Validate a draft and build the meal type.
    pub fn new(draft: MealTypeDraft) -> Result<Self, MealTypeValidationError> {
        let MealTypeDraft {
            id,
            name,
            service_start,
            service_end,
            tolerance_minutes,
            active,
        } = draft;
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(MealTypeValidationError::EmptyName);
        }
        Ok(Self {
            id,
            name: trimmed.to_owned(),
            service_start,
            service_end,
            tolerance_minutes,
            active,
        })
    }

    pub fn id(&self) -> &MealTypeId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn service_start(&self) -> TimeOfDay {
        self.service_start
    }

    pub fn service_end(&self) -> TimeOfDay {
        self.service_end
    }

    pub fn tolerance_minutes(&self) -> u16 {
        self.tolerance_minutes
    }

    /// Last minute at which the meal may still be served, tolerance included.
    pub fn tolerant_end(&self) -> TimeOfDay {
        self.service_end
            .saturating_add_minutes(self.tolerance_minutes)
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use rstest::rstest;

    use super::*;

    fn draft(start: &str, end: &str) -> MealTypeDraft {
        MealTypeDraft {
            id: MealTypeId::random(),
            name: "  Lunch ".to_owned(),
            service_start: start.parse().expect("valid start"),
            service_end: end.parse().expect("valid end"),
            tolerance_minutes: 15,
            active: true,
        }
    }

    #[rstest]
    fn trims_name_and_exposes_tolerant_end() {
        let meal = MealType::new(draft("11:00", "14:00")).expect("valid meal type");
        assert_eq!(meal.name(), "Lunch");
        assert_eq!(meal.tolerant_end().to_string(), "14:15");
    }

    #[rstest]
    fn accepts_windows_ending_before_they_start() {
        let meal = MealType::new(draft("22:00", "00:30")).expect("late meal type");
        assert_eq!(meal.service_start().to_string(), "22:00");
        assert_eq!(meal.service_end().to_string(), "00:30");
    }

    #[rstest]
    fn rejects_blank_names() {
        let mut blank = draft("06:00", "09:00");
        blank.name = "   ".to_owned();
        assert_eq!(
            MealType::new(blank).expect_err("blank name"),
            MealTypeValidationError::EmptyName
        );
    }
}
