//! Redemption verdicts returned to callers.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use super::{
    DisposableVoucher, ExtraVoucher, MealTypeId, Rejection, RejectionKind, User, VoucherKind,
};

/// What an accepted code resolved to. Exactly one kind, never a mix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RedemptionSubject {
    /// An unused, unexpired disposable voucher.
    Disposable(DisposableVoucher),
    /// An unused extra voucher together with its holder.
    Extra(ExtraVoucher),
    /// A user's personal voucher.
    Regular(User),
}

impl RedemptionSubject {
    /// Voucher kind of this subject.
    pub const fn kind(&self) -> VoucherKind {
        match self {
            Self::Disposable(_) => VoucherKind::Disposable,
            Self::Extra(_) => VoucherKind::Extra,
            Self::Regular(_) => VoucherKind::Regular,
        }
    }

    /// The user the meal is attributed to, if any.
    pub const fn user(&self) -> Option<&User> {
        match self {
            Self::Disposable(_) => None,
            Self::Extra(voucher) => Some(voucher.user()),
            Self::Regular(user) => Some(user),
        }
    }
}

/// Successful validation outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acceptance {
    subject: RedemptionSubject,
    meal_type_id: MealTypeId,
    evaluated_at: DateTime<Utc>,
}

impl Acceptance {
    /// Build an acceptance for `subject` at `evaluated_at`.
    pub const fn new(
        subject: RedemptionSubject,
        meal_type_id: MealTypeId,
        evaluated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            subject,
            meal_type_id,
            evaluated_at,
        }
    }

    pub const fn kind(&self) -> VoucherKind {
        self.subject.kind()
    }

    pub const fn subject(&self) -> &RedemptionSubject {
        &self.subject
    }

    pub const fn meal_type_id(&self) -> &MealTypeId {
        &self.meal_type_id
    }

    pub const fn evaluated_at(&self) -> DateTime<Utc> {
        self.evaluated_at
    }
}

/// Outcome of a validation or redemption call.
///
/// Serialises as `{"success": true, "voucherKind": ..., "subject": ...}` or
/// `{"success": false, "errorKind": ..., "message": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(into = "VerdictDto")]
pub enum RedemptionVerdict {
    /// Every check passed.
    Accepted(Acceptance),
    /// The first failing check's reason.
    Rejected(Rejection),
}

impl RedemptionVerdict {
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }

    pub const fn acceptance(&self) -> Option<&Acceptance> {
        match self {
            Self::Accepted(acceptance) => Some(acceptance),
            Self::Rejected(_) => None,
        }
    }

    pub const fn rejection(&self) -> Option<&Rejection> {
        match self {
            Self::Accepted(_) => None,
            Self::Rejected(rejection) => Some(rejection),
        }
    }

    /// Rejection reason, if the verdict is a rejection.
    pub const fn rejection_kind(&self) -> Option<RejectionKind> {
        match self {
            Self::Accepted(_) => None,
            Self::Rejected(rejection) => Some(rejection.kind()),
        }
    }
}

impl From<Result<Acceptance, Rejection>> for RedemptionVerdict {
    fn from(value: Result<Acceptance, Rejection>) -> Self {
        match value {
            Ok(acceptance) => Self::Accepted(acceptance),
            Err(rejection) => Self::Rejected(rejection),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct VerdictDto {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    voucher_kind: Option<VoucherKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    subject: Option<RedemptionSubject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    meal_type_id: Option<MealTypeId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    evaluated_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_kind: Option<RejectionKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl From<RedemptionVerdict> for VerdictDto {
    fn from(value: RedemptionVerdict) -> Self {
        match value {
            RedemptionVerdict::Accepted(acceptance) => Self {
                success: true,
                voucher_kind: Some(acceptance.kind()),
                subject: Some(acceptance.subject),
                meal_type_id: Some(acceptance.meal_type_id),
                evaluated_at: Some(acceptance.evaluated_at),
                error_kind: None,
                message: None,
                details: None,
            },
            RedemptionVerdict::Rejected(rejection) => Self {
                success: false,
                voucher_kind: None,
                subject: None,
                meal_type_id: None,
                evaluated_at: None,
                error_kind: Some(rejection.kind()),
                message: Some(rejection.message().to_owned()),
                details: rejection.details().cloned(),
            },
        }
    }
}
