//! Voucher codes and the records they are redeemed against.

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{MealTypeId, User, UserId};

/// Maximum length of a voucher code.
pub const VOUCHER_CODE_MAX: usize = 32;

/// Validation errors returned by [`VoucherCode::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoucherCodeError {
    Empty,
    TooLong { max: usize },
    InvalidCharacters,
}

impl fmt::Display for VoucherCodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "voucher code must not be empty"),
            Self::TooLong { max } => write!(f, "voucher code must be at most {max} characters"),
            Self::InvalidCharacters => write!(
                f,
                "voucher code may only contain ASCII letters, digits, or hyphens"
            ),
        }
    }
}

impl std::error::Error for VoucherCodeError {}

static VOUCHER_CODE_RE: OnceLock<Regex> = OnceLock::new();

fn voucher_code_regex() -> &'static Regex {
    VOUCHER_CODE_RE.get_or_init(|| {
        // Length is enforced separately; this regex constrains allowed characters.
        let pattern = "^[A-Za-z0-9-]+$";
        Regex::new(pattern)
            .unwrap_or_else(|error| panic!("voucher code regex failed to compile: {error}"))
    })
}

/// Code printed on a badge or ticket and presented at the till.
///
/// Surrounding whitespace from scanners is trimmed. The remaining code must
/// be 1 to 32 ASCII letters, digits or hyphens; anything else is refused
/// before it reaches a store. Matching is exact and case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VoucherCode(String);

impl VoucherCode {
    /// Validate and construct a code from raw input.
    pub fn new(code: impl AsRef<str>) -> Result<Self, VoucherCodeError> {
        let trimmed = code.as_ref().trim();
        if trimmed.is_empty() {
            return Err(VoucherCodeError::Empty);
        }
        if trimmed.chars().count() > VOUCHER_CODE_MAX {
            return Err(VoucherCodeError::TooLong {
                max: VOUCHER_CODE_MAX,
            });
        }
        if !voucher_code_regex().is_match(trimmed) {
            return Err(VoucherCodeError::InvalidCharacters);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Code with all but the last four characters masked, for logs.
    pub fn masked(&self) -> String {
        let visible = self.0.len().saturating_sub(4);
        self.0
            .char_indices()
            .map(|(index, ch)| if index < visible { '*' } else { ch })
            .collect()
    }
}

impl AsRef<str> for VoucherCode {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for VoucherCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl TryFrom<String> for VoucherCode {
    type Error = VoucherCodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<VoucherCode> for String {
    fn from(value: VoucherCode) -> Self {
        value.0
    }
}

/// The kind of voucher a presented code resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoucherKind {
    /// Single-use code not tied to a user.
    Disposable,
    /// Single-use additional allowance granted to a specific user.
    Extra,
    /// A user's own badge code.
    Regular,
}

impl fmt::Display for VoucherKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Disposable => "disposable",
            Self::Extra => "extra",
            Self::Regular => "regular",
        };
        f.write_str(label)
    }
}

/// A single-use code issued for one meal type.
///
/// Lifecycle: issued unused, consumed exactly once (`used_at` goes from
/// `None` to `Some`), never valid again after consumption or expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisposableVoucher {
    code: VoucherCode,
    meal_type_id: MealTypeId,
    expires_at: DateTime<Utc>,
    used_at: Option<DateTime<Utc>>,
}

impl DisposableVoucher {
    /// Build a disposable voucher record.
    pub const fn new(
        code: VoucherCode,
        meal_type_id: MealTypeId,
        expires_at: DateTime<Utc>,
        used_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            code,
            meal_type_id,
            expires_at,
            used_at,
        }
    }

    pub const fn code(&self) -> &VoucherCode {
        &self.code
    }

    pub const fn meal_type_id(&self) -> &MealTypeId {
        &self.meal_type_id
    }

    pub const fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub const fn used_at(&self) -> Option<DateTime<Utc>> {
        self.used_at
    }

    /// Whether the voucher has already been consumed.
    pub const fn is_used(&self) -> bool {
        self.used_at.is_some()
    }

    /// Whether the voucher has expired at `now`. Expiry is exclusive: a
    /// voucher expiring at 12:00 is no longer valid at 12:00.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Return a copy marked as consumed at `used_at`.
    pub fn consumed(&self, used_at: DateTime<Utc>) -> Self {
        Self {
            used_at: Some(used_at),
            ..self.clone()
        }
    }
}

/// An additional meal authorisation granted to a user for one day.
///
/// Used for overtime and events: the holder may eat outside their shift and
/// regardless of the interval between meals, but account checks still apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtraVoucher {
    code: VoucherCode,
    user: User,
    meal_type_id: Option<MealTypeId>,
    valid_on: NaiveDate,
    used_at: Option<DateTime<Utc>>,
}

impl ExtraVoucher {
    /// Build an extra voucher. `meal_type_id` of `None` allows any meal.
    pub const fn new(
        code: VoucherCode,
        user: User,
        meal_type_id: Option<MealTypeId>,
        valid_on: NaiveDate,
        used_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            code,
            user,
            meal_type_id,
            valid_on,
            used_at,
        }
    }

    pub const fn code(&self) -> &VoucherCode {
        &self.code
    }

    pub const fn user(&self) -> &User {
        &self.user
    }

    pub const fn meal_type_id(&self) -> Option<&MealTypeId> {
        self.meal_type_id.as_ref()
    }

    pub const fn valid_on(&self) -> NaiveDate {
        self.valid_on
    }

    pub const fn used_at(&self) -> Option<DateTime<Utc>> {
        self.used_at
    }

    pub const fn is_used(&self) -> bool {
        self.used_at.is_some()
    }

    /// Return a copy marked as consumed at `used_at`.
    pub fn consumed(&self, used_at: DateTime<Utc>) -> Self {
        Self {
            used_at: Some(used_at),
            ..self.clone()
        }
    }
}

/// Historical entry of a regular voucher redemption. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RedemptionRecord {
    user_id: UserId,
    meal_type_id: MealTypeId,
    used_at: DateTime<Utc>,
}

impl RedemptionRecord {
    /// Build a record for a redemption at `used_at`.
    pub const fn new(user_id: UserId, meal_type_id: MealTypeId, used_at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            meal_type_id,
            used_at,
        }
    }

    pub const fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub const fn meal_type_id(&self) -> &MealTypeId {
        &self.meal_type_id
    }

    pub const fn used_at(&self) -> DateTime<Utc> {
        self.used_at
    }
}
