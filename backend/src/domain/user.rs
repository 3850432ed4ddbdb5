//! Canteen users entitled to regular vouchers.

use std::fmt;

use serde::Serialize;

use super::{Company, Shift, UserId, VoucherCode};

/// Validation errors returned by [`User::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyName,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "user name must not be empty"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Input for constructing a [`User`].
///
/// Company and shift are resolved by the caller; a user cannot exist without
/// both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDraft {
    pub id: UserId,
    pub name: String,
    pub voucher: VoucherCode,
    pub suspended: bool,
    pub company: Company,
    pub shift: Shift,
}

/// A person holding a personal voucher code.
///
/// ## Invariants
/// - `name` is non-empty once trimmed.
/// - company and shift are always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    id: UserId,
    name: String,
    voucher: VoucherCode,
    suspended: bool,
    company: Company,
    shift: Shift,
}

impl User {
    /// Validate a draft and build the user.
    pub fn new(draft: UserDraft) -> Result<Self, UserValidationError> {
        let UserDraft {
            id,
            name,
            voucher,
            suspended,
            company,
            shift,
        } = draft;
        if name.trim().is_empty() {
            return Err(UserValidationError::EmptyName);
        }
        Ok(Self {
            id,
            name: name.trim().to_owned(),
            voucher,
            suspended,
            company,
            shift,
        })
    }

    /// Stable user identifier.
    pub const fn id(&self) -> &UserId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Personal voucher code printed on the user's badge.
    pub const fn voucher(&self) -> &VoucherCode {
        &self.voucher
    }

    pub const fn is_suspended(&self) -> bool {
        self.suspended
    }

    pub const fn company(&self) -> &Company {
        &self.company
    }

    pub const fn shift(&self) -> &Shift {
        &self.shift
    }
}
