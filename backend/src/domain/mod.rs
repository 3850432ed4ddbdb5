//! Domain primitives, validators and the redemption orchestrator.
//!
//! Purpose: decide whether a presented voucher code may be redeemed for a
//! meal, independent of storage and transport. Entities are immutable and
//! built through validating constructors; business failures are returned as
//! [`Rejection`] values inside a [`RedemptionVerdict`].
//!
//! Public surface:
//! - `MealType`, `Shift`, `Company`, `User`: configuration the rules read.
//! - `DisposableVoucher`, `ExtraVoucher`, `RedemptionRecord`: redeemable
//!   artefacts and history.
//! - `classify`, `ServiceWindow`, `ShiftWindow` and the `check_*`
//!   functions: the individual rule sets.
//! - `RedemptionService`: sequences the rules and commits accepted
//!   redemptions through the [`ports::RedemptionStore`] port.

pub mod classifier;
pub mod company;
pub mod eligibility;
pub mod identifiers;
pub mod meal_type;
pub mod policy;
pub mod ports;
pub mod redemption_service;
pub mod rejection;
pub mod shift;
pub mod temporal;
pub mod time_of_day;
pub mod user;
pub mod verdict;
pub mod voucher;

pub use self::classifier::{Classification, classify};
pub use self::company::{Company, CompanyValidationError};
pub use self::identifiers::{CompanyId, IdentifierParseError, MealTypeId, ShiftId, UserId};
pub use self::meal_type::{MealType, MealTypeDraft, MealTypeValidationError};
pub use self::policy::{
    DEFAULT_MIN_INTERVAL_MINUTES, MAX_MIN_INTERVAL_MINUTES, RedemptionPolicy,
    RedemptionPolicyError,
};
pub use self::redemption_service::RedemptionService;
pub use self::rejection::{Rejection, RejectionKind, RejectionValidationError};
pub use self::shift::{Shift, ShiftKind};
pub use self::temporal::{ServiceWindow, ShiftWindow, local_day_start};
pub use self::time_of_day::{TimeOfDay, TimeOfDayError};
pub use self::user::{User, UserDraft, UserValidationError};
pub use self::verdict::{Acceptance, RedemptionSubject, RedemptionVerdict};
pub use self::voucher::{
    DisposableVoucher, ExtraVoucher, RedemptionRecord, VOUCHER_CODE_MAX, VoucherCode,
    VoucherCodeError, VoucherKind,
};
