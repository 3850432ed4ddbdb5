//! In-memory `RedemptionStore` implementation.
//!
//! All tables sit behind one mutex, so each conditional write observes and
//! mutates a consistent state. Suitable for tests and the operator binary;
//! not a persistence engine.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::domain::ports::{IntervalGuard, RedemptionStore, RedemptionStoreError};
use crate::domain::{
    DisposableVoucher, ExtraVoucher, MealType, MealTypeId, RedemptionRecord, User, UserId,
    VoucherCode,
};

#[derive(Debug, Default)]
struct Tables {
    meal_types: HashMap<MealTypeId, MealType>,
    disposable_vouchers: HashMap<VoucherCode, DisposableVoucher>,
    extra_vouchers: HashMap<VoucherCode, ExtraVoucher>,
    users_by_voucher: HashMap<VoucherCode, User>,
    redemptions: Vec<RedemptionRecord>,
}

/// Mutex-guarded store holding every table in process memory.
#[derive(Debug, Default)]
pub struct InMemoryRedemptionStore {
    tables: Mutex<Tables>,
}

impl InMemoryRedemptionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, RedemptionStoreError> {
        self.tables
            .lock()
            .map_err(|_| RedemptionStoreError::connection("in-memory store lock poisoned"))
    }

    /// Insert or replace a meal type.
    pub fn insert_meal_type(&self, meal_type: MealType) -> Result<(), RedemptionStoreError> {
        self.lock()?
            .meal_types
            .insert(*meal_type.id(), meal_type);
        Ok(())
    }

    /// Insert or replace a user, keyed by their voucher code.
    pub fn insert_user(&self, user: User) -> Result<(), RedemptionStoreError> {
        self.lock()?
            .users_by_voucher
            .insert(user.voucher().clone(), user);
        Ok(())
    }

    /// Insert or replace a disposable voucher.
    pub fn insert_disposable_voucher(
        &self,
        voucher: DisposableVoucher,
    ) -> Result<(), RedemptionStoreError> {
        self.lock()?
            .disposable_vouchers
            .insert(voucher.code().clone(), voucher);
        Ok(())
    }

    /// Insert or replace an extra voucher.
    pub fn insert_extra_voucher(&self, voucher: ExtraVoucher) -> Result<(), RedemptionStoreError> {
        self.lock()?
            .extra_vouchers
            .insert(voucher.code().clone(), voucher);
        Ok(())
    }

    /// Append a historical redemption without any interval check.
    pub fn insert_redemption(&self, record: RedemptionRecord) -> Result<(), RedemptionStoreError> {
        self.lock()?.redemptions.push(record);
        Ok(())
    }

    /// Every stored redemption for `user_id`, oldest first.
    pub fn redemptions_for(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<RedemptionRecord>, RedemptionStoreError> {
        let tables = self.lock()?;
        let mut records: Vec<_> = tables
            .redemptions
            .iter()
            .filter(|record| record.user_id() == user_id)
            .cloned()
            .collect();
        records.sort_by_key(RedemptionRecord::used_at);
        Ok(records)
    }
}

#[async_trait]
impl RedemptionStore for InMemoryRedemptionStore {
    async fn find_meal_type(
        &self,
        meal_type_id: &MealTypeId,
    ) -> Result<Option<MealType>, RedemptionStoreError> {
        Ok(self.lock()?.meal_types.get(meal_type_id).cloned())
    }

    async fn find_disposable_voucher(
        &self,
        code: &VoucherCode,
    ) -> Result<Option<DisposableVoucher>, RedemptionStoreError> {
        Ok(self.lock()?.disposable_vouchers.get(code).cloned())
    }

    async fn find_extra_voucher(
        &self,
        code: &VoucherCode,
    ) -> Result<Option<ExtraVoucher>, RedemptionStoreError> {
        Ok(self.lock()?.extra_vouchers.get(code).cloned())
    }

    async fn find_user_by_voucher(
        &self,
        code: &VoucherCode,
    ) -> Result<Option<User>, RedemptionStoreError> {
        Ok(self.lock()?.users_by_voucher.get(code).cloned())
    }

    async fn list_redemptions_since(
        &self,
        user_id: &UserId,
        since: DateTime<Utc>,
    ) -> Result<Vec<RedemptionRecord>, RedemptionStoreError> {
        Ok(self
            .redemptions_for(user_id)?
            .into_iter()
            .filter(|record| record.used_at() >= since)
            .collect())
    }

    async fn append_redemption(
        &self,
        record: &RedemptionRecord,
        guard: IntervalGuard,
    ) -> Result<bool, RedemptionStoreError> {
        let mut tables = self.lock()?;
        let conflict = tables.redemptions.iter().any(|existing| {
            existing.user_id() == record.user_id() && guard.conflicts_with(existing.used_at())
        });
        if conflict {
            debug!(user_id = %record.user_id(), "redemption append refused by interval guard");
            return Ok(false);
        }
        tables.redemptions.push(record.clone());
        Ok(true)
    }

    async fn consume_disposable_voucher(
        &self,
        code: &VoucherCode,
        used_at: DateTime<Utc>,
    ) -> Result<bool, RedemptionStoreError> {
        let mut tables = self.lock()?;
        let Some(voucher) = tables.disposable_vouchers.get_mut(code) else {
            return Ok(false);
        };
        if voucher.is_used() {
            debug!("disposable voucher already consumed");
            return Ok(false);
        }
        *voucher = voucher.consumed(used_at);
        Ok(true)
    }

    async fn consume_extra_voucher(
        &self,
        code: &VoucherCode,
        used_at: DateTime<Utc>,
    ) -> Result<bool, RedemptionStoreError> {
        let mut tables = self.lock()?;
        let Some(voucher) = tables.extra_vouchers.get_mut(code) else {
            return Ok(false);
        };
        if voucher.is_used() {
            debug!("extra voucher already consumed");
            return Ok(false);
        }
        *voucher = voucher.consumed(used_at);
        Ok(true)
    }
}
