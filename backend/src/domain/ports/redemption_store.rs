//! Port for the voucher data store consulted and updated by redemptions.
//!
//! Lookups are read-only. The three write operations are conditional and
//! must be atomic in the adapter: they report `Ok(false)` instead of
//! writing when a concurrent redemption got there first.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    DisposableVoucher, ExtraVoucher, MealType, MealTypeId, RedemptionRecord, User, UserId,
    VoucherCode,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by redemption store adapters.
    pub enum RedemptionStoreError {
        /// Store connection could not be established or timed out.
        Connection => "redemption store connection failed",
        /// Query or mutation failed during execution.
        Query => "redemption store query failed",
        /// A stored record could not be mapped onto a domain entity.
        Malformed => "redemption store returned a malformed record",
    }
}

/// Condition attached to a regular redemption append.
///
/// The append must be refused when the user already has a redemption that
/// falls on the same local day (`used_at >= day_start`) and is more recent
/// than `latest_permitted`. This is the same rule the interval check applied
/// during validation, re-evaluated atomically at write time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalGuard {
    /// Start of the local calendar day, as a UTC instant.
    pub day_start: DateTime<Utc>,
    /// Latest previous redemption instant that still permits this one.
    pub latest_permitted: DateTime<Utc>,
}

impl IntervalGuard {
    /// Whether an existing redemption at `used_at` blocks the append.
    pub fn conflicts_with(&self, used_at: DateTime<Utc>) -> bool {
        used_at >= self.day_start && used_at > self.latest_permitted
    }
}

/// Port for reading vouchers, users and redemption history, and for the
/// atomic commit that follows an accepted verdict.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RedemptionStore: Send + Sync {
    /// Find a meal type by id.
    async fn find_meal_type(
        &self,
        meal_type_id: &MealTypeId,
    ) -> Result<Option<MealType>, RedemptionStoreError>;

    /// Find a disposable voucher by exact code, used or not.
    async fn find_disposable_voucher(
        &self,
        code: &VoucherCode,
    ) -> Result<Option<DisposableVoucher>, RedemptionStoreError>;

    /// Find an extra voucher by exact code, used or not, with its holder.
    async fn find_extra_voucher(
        &self,
        code: &VoucherCode,
    ) -> Result<Option<ExtraVoucher>, RedemptionStoreError>;

    /// Find the user whose personal voucher matches `code`, with company and
    /// shift embedded.
    async fn find_user_by_voucher(
        &self,
        code: &VoucherCode,
    ) -> Result<Option<User>, RedemptionStoreError>;

    /// List a user's redemptions at or after `since`, oldest first.
    async fn list_redemptions_since(
        &self,
        user_id: &UserId,
        since: DateTime<Utc>,
    ) -> Result<Vec<RedemptionRecord>, RedemptionStoreError>;

    /// Append a redemption unless `guard` reports a conflicting record.
    ///
    /// Returns `Ok(false)` when the guard refused the append.
    async fn append_redemption(
        &self,
        record: &RedemptionRecord,
        guard: IntervalGuard,
    ) -> Result<bool, RedemptionStoreError>;

    /// Mark a disposable voucher used, only if it is currently unused.
    ///
    /// Returns `Ok(false)` when the voucher was already consumed or is gone.
    async fn consume_disposable_voucher(
        &self,
        code: &VoucherCode,
        used_at: DateTime<Utc>,
    ) -> Result<bool, RedemptionStoreError>;

    /// Mark an extra voucher used, only if it is currently unused.
    async fn consume_extra_voucher(
        &self,
        code: &VoucherCode,
        used_at: DateTime<Utc>,
    ) -> Result<bool, RedemptionStoreError>;
}

/// Fixture implementation for tests that only need an empty store.
///
/// Every lookup misses and every conditional write succeeds.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureRedemptionStore;

#[async_trait]
impl RedemptionStore for FixtureRedemptionStore {
    async fn find_meal_type(
        &self,
        _meal_type_id: &MealTypeId,
    ) -> Result<Option<MealType>, RedemptionStoreError> {
        Ok(None)
    }

    async fn find_disposable_voucher(
        &self,
        _code: &VoucherCode,
    ) -> Result<Option<DisposableVoucher>, RedemptionStoreError> {
        Ok(None)
    }

    async fn find_extra_voucher(
        &self,
        _code: &VoucherCode,
    ) -> Result<Option<ExtraVoucher>, RedemptionStoreError> {
        Ok(None)
    }

    async fn find_user_by_voucher(
        &self,
        _code: &VoucherCode,
    ) -> Result<Option<User>, RedemptionStoreError> {
        Ok(None)
    }

    async fn list_redemptions_since(
        &self,
        _user_id: &UserId,
        _since: DateTime<Utc>,
    ) -> Result<Vec<RedemptionRecord>, RedemptionStoreError> {
        Ok(Vec::new())
    }

    async fn append_redemption(
        &self,
        _record: &RedemptionRecord,
        _guard: IntervalGuard,
    ) -> Result<bool, RedemptionStoreError> {
        Ok(true)
    }

    async fn consume_disposable_voucher(
        &self,
        _code: &VoucherCode,
        _used_at: DateTime<Utc>,
    ) -> Result<bool, RedemptionStoreError> {
        Ok(true)
    }

    async fn consume_extra_voucher(
        &self,
        _code: &VoucherCode,
        _used_at: DateTime<Utc>,
    ) -> Result<bool, RedemptionStoreError> {
        Ok(true)
    }
}
