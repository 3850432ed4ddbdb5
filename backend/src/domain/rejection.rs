//! Redemption rejection types.
//!
//! Every business-rule failure is a value, never a panic or an `Err` from the
//! engine. Adapters render [`RejectionKind`] into localised messages without
//! string matching; `details` carries structured context (allowed window,
//! remaining wait, underlying store error).

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::{MealTypeId, TimeOfDay, VoucherKind};

/// Closed set of reasons a redemption can be refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectionKind {
    /// The code matches no voucher of any kind.
    NotFound,
    /// The voucher exists but is used, expired, or past its valid day.
    Expired,
    /// The user's account is suspended.
    Suspended,
    /// The user's company is inactive.
    CompanyInactive,
    /// The user's shift is inactive.
    ShiftInactive,
    /// The current time is outside the meal service window.
    OutOfWindow,
    /// The current time is outside the user's shift.
    OutOfShift,
    /// The previous redemption today is too recent.
    TooSoon,
    /// Validation passed but the conditional commit lost to a concurrent one.
    RaceLost,
    /// A store lookup or write failed.
    LookupFailed,
}

impl fmt::Display for RejectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::NotFound => "NOT_FOUND",
            Self::Expired => "EXPIRED",
            Self::Suspended => "SUSPENDED",
            Self::CompanyInactive => "COMPANY_INACTIVE",
            Self::ShiftInactive => "SHIFT_INACTIVE",
            Self::OutOfWindow => "OUT_OF_WINDOW",
            Self::OutOfShift => "OUT_OF_SHIFT",
            Self::TooSoon => "TOO_SOON",
            Self::RaceLost => "RACE_LOST",
            Self::LookupFailed => "LOOKUP_FAILED",
        };
        f.write_str(label)
    }
}

/// A refused redemption.
///
/// ## Invariants
/// - `message` must be non-empty once trimmed of whitespace.
///
/// # Examples
/// ```
/// use canteen::domain::{Rejection, RejectionKind};
///
/// let rejection = Rejection::new(RejectionKind::NotFound, "unknown code");
/// assert_eq!(rejection.kind(), RejectionKind::NotFound);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
#[serde(try_from = "RejectionDto", into = "RejectionDto")]
pub struct Rejection {
    kind: RejectionKind,
    message: String,
    details: Option<Value>,
}

/// Validation errors emitted by the constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectionValidationError {
    EmptyMessage,
}

impl fmt::Display for RejectionValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyMessage => write!(f, "rejection message must not be empty"),
        }
    }
}

impl std::error::Error for RejectionValidationError {}

impl Rejection {
    /// Create a new rejection, panicking if validation fails.
    pub fn new(kind: RejectionKind, message: impl Into<String>) -> Self {
        match Self::try_new(kind, message) {
            Ok(value) => value,
            Err(err) => panic!("rejection messages must satisfy validation: {err}"),
        }
    }

    /// Fallible constructor that validates the message content.
    pub fn try_new(
        kind: RejectionKind,
        message: impl Into<String>,
    ) -> Result<Self, RejectionValidationError> {
        let message = message.into();
        if message.trim().is_empty() {
            return Err(RejectionValidationError::EmptyMessage);
        }
        Ok(Self {
            kind,
            message,
            details: None,
        })
    }

    /// Stable machine-readable reason.
    pub const fn kind(&self) -> RejectionKind {
        self.kind
    }

    /// Human-readable message for operators.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Structured context for adapters.
    pub const fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Attach structured details to the rejection.
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// The code matched nothing.
    pub fn not_found() -> Self {
        Self::new(RejectionKind::NotFound, "voucher code not recognised")
    }

    /// A voucher of `kind` was found but can no longer be used.
    pub fn expired(kind: VoucherKind) -> Self {
        Self::new(
            RejectionKind::Expired,
            format!("{kind} voucher has expired or was already used"),
        )
        .with_details(json!({ "voucherKind": kind }))
    }

    pub fn suspended() -> Self {
        Self::new(RejectionKind::Suspended, "user account is suspended")
    }

    pub fn company_inactive() -> Self {
        Self::new(RejectionKind::CompanyInactive, "user's company is inactive")
    }

    pub fn shift_inactive() -> Self {
        Self::new(RejectionKind::ShiftInactive, "user's shift is inactive")
    }

    /// Outside the meal service window `[start, end]`.
    pub fn out_of_window(start: TimeOfDay, end: TimeOfDay, presented_at: TimeOfDay) -> Self {
        Self::new(
            RejectionKind::OutOfWindow,
            format!("meal is served between {start} and {end}"),
        )
        .with_details(json!({
            "windowStart": start,
            "windowEnd": end,
            "presentedAt": presented_at,
        }))
    }

    /// Outside the user's shift `[start, end]`.
    pub fn out_of_shift(start: TimeOfDay, end: TimeOfDay, presented_at: TimeOfDay) -> Self {
        Self::new(
            RejectionKind::OutOfShift,
            format!("user's shift runs from {start} to {end}"),
        )
        .with_details(json!({
            "shiftStart": start,
            "shiftEnd": end,
            "presentedAt": presented_at,
        }))
    }

    /// Extra voucher presented before the day it was issued for.
    pub fn not_yet_valid(valid_on: NaiveDate) -> Self {
        Self::new(
            RejectionKind::OutOfWindow,
            format!("extra voucher is only valid on {valid_on}"),
        )
        .with_details(json!({ "validOn": valid_on }))
    }

    /// Previous redemption too recent; `remaining_minutes` rounded up.
    pub fn too_soon(remaining_minutes: u64, next_allowed_at: DateTime<Utc>) -> Self {
        Self::new(
            RejectionKind::TooSoon,
            format!("next meal allowed in {remaining_minutes} minute(s)"),
        )
        .with_details(json!({
            "remainingMinutes": remaining_minutes,
            "nextAllowedAt": next_allowed_at,
        }))
    }

    pub fn race_lost() -> Self {
        Self::new(
            RejectionKind::RaceLost,
            "voucher was redeemed concurrently by another request",
        )
    }

    /// A store call failed; `cause` is kept for logging.
    pub fn lookup_failed(cause: impl fmt::Display) -> Self {
        Self::new(RejectionKind::LookupFailed, "voucher lookup failed")
            .with_details(json!({ "cause": cause.to_string() }))
    }

    /// The requested meal type does not exist or is inactive.
    pub fn unknown_meal_type(meal_type_id: &MealTypeId) -> Self {
        Self::new(
            RejectionKind::NotFound,
            format!("meal type {meal_type_id} is not available"),
        )
        .with_details(json!({ "mealTypeId": meal_type_id }))
    }

    /// Voucher bound to `expected`, presented for `requested`. A voucher
    /// only exists for the meal it was issued for.
    pub fn issued_for_other_meal(expected: &MealTypeId, requested: &MealTypeId) -> Self {
        Self::new(
            RejectionKind::NotFound,
            "voucher was issued for a different meal type",
        )
        .with_details(json!({
            "issuedFor": expected,
            "requested": requested,
        }))
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for Rejection {}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RejectionDto {
    kind: RejectionKind,
    message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl From<Rejection> for RejectionDto {
    fn from(value: Rejection) -> Self {
        Self {
            kind: value.kind,
            message: value.message,
            details: value.details,
        }
    }
}

impl TryFrom<RejectionDto> for Rejection {
    type Error = RejectionValidationError;

    fn try_from(value: RejectionDto) -> Result<Self, Self::Error> {
        let RejectionDto {
            kind,
            message,
            details,
        } = value;

        let mut rejection = Self::try_new(kind, message)?;
        rejection.details = details;
        Ok(rejection)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use rstest::rstest;
    use serde_json::json;

    use super::*;

    #[rstest]
    fn try_new_rejects_blank_messages() {
        assert_eq!(
            Rejection::try_new(RejectionKind::NotFound, "  "),
            Err(RejectionValidationError::EmptyMessage)
        );
    }

    #[rstest]
    #[case(RejectionKind::CompanyInactive, "\"COMPANY_INACTIVE\"")]
    #[case(RejectionKind::TooSoon, "\"TOO_SOON\"")]
    #[case(RejectionKind::RaceLost, "\"RACE_LOST\"")]
    fn kinds_serialise_in_screaming_snake_case(#[case] kind: RejectionKind, #[case] json: &str) {
        assert_eq!(serde_json::to_string(&kind).expect("serialise kind"), json);
        assert_eq!(kind.to_string(), json.trim_matches('"'));
    }

    #[rstest]
    #[case("MEAL_TYPE_UNAVAILABLE")]
    #[case("MEAL_TYPE_MISMATCH")]
    #[case("not_found")]
    fn kinds_outside_the_closed_set_are_refused(#[case] raw: &str) {
        assert!(serde_json::from_value::<RejectionKind>(json!(raw)).is_err());
    }

    #[rstest]
    fn meal_type_problems_report_not_found() {
        let lunch = MealTypeId::random();
        let breakfast = MealTypeId::random();

        let unknown = Rejection::unknown_meal_type(&lunch);
        assert_eq!(unknown.kind(), RejectionKind::NotFound);
        assert_eq!(unknown.details(), Some(&json!({ "mealTypeId": lunch })));

        let other_meal = Rejection::issued_for_other_meal(&breakfast, &lunch);
        assert_eq!(other_meal.kind(), RejectionKind::NotFound);
        assert_eq!(
            other_meal.details(),
            Some(&json!({ "issuedFor": breakfast, "requested": lunch }))
        );
    }

    #[rstest]
    fn out_of_window_carries_the_allowed_window() {
        let rejection = Rejection::out_of_window(
            "11:00".parse().expect("valid time"),
            "14:15".parse().expect("valid time"),
            "14:16".parse().expect("valid time"),
        );
        assert_eq!(rejection.kind(), RejectionKind::OutOfWindow);
        assert_eq!(
            rejection.details(),
            Some(&json!({
                "windowStart": "11:00",
                "windowEnd": "14:15",
                "presentedAt": "14:16",
            }))
        );
    }

    #[rstest]
    fn lookup_failure_keeps_the_cause() {
        let rejection = Rejection::lookup_failed("connection reset");
        assert_eq!(
            rejection.details().and_then(|d| d.get("cause")),
            Some(&json!("connection reset"))
        );
    }

    #[rstest]
    fn deserialisation_enforces_message_invariant() {
        let payload = json!({ "kind": "NOT_FOUND", "message": "" });
        assert!(serde_json::from_value::<Rejection>(payload).is_err());

        let valid = json!({ "kind": "SUSPENDED", "message": "suspended" });
        let rejection: Rejection = serde_json::from_value(valid).expect("valid rejection");
        assert_eq!(rejection.kind(), RejectionKind::Suspended);
        assert!(rejection.details().is_none());
    }
}
