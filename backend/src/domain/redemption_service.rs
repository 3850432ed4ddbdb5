//! Redemption orchestrator implementing the [`VoucherRedemption`] driving port.
//!
//! Sequences classification, the temporal windows and the eligibility chain,
//! stopping at the first failing rule. Validation never writes; `redeem`
//! follows an accepted validation with exactly one conditional write.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use mockable::Clock;
use tracing::{debug, warn};

use crate::domain::classifier::{Classification, classify};
use crate::domain::eligibility::{
    check_account, check_disposable, check_extra, check_interval, check_meal_binding,
};
use crate::domain::ports::{
    IntervalGuard, RedemptionRequest, RedemptionStore, RedemptionStoreError, VoucherRedemption,
};
use crate::domain::temporal::{ServiceWindow, local_day_start};
use crate::domain::{
    Acceptance, MealTypeId, RedemptionPolicy, RedemptionRecord, RedemptionSubject,
    RedemptionVerdict, Rejection, TimeOfDay, VoucherCode,
};

fn map_store_error(error: RedemptionStoreError) -> Rejection {
    warn!(error = %error, error_kind = error.kind(), "redemption store call failed");
    Rejection::lookup_failed(error)
}

/// The single write that makes an accepted redemption stick.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Commit {
    ConsumeDisposable(VoucherCode),
    ConsumeExtra(VoucherCode),
    Append {
        record: RedemptionRecord,
        guard: IntervalGuard,
    },
}

#[derive(Debug)]
struct Approval {
    acceptance: Acceptance,
    commit: Commit,
}

/// Voucher redemption service.
///
/// Stateless between calls; clones share the store and clock.
pub struct RedemptionService<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    policy: RedemptionPolicy,
}

impl<S> Clone for RedemptionService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            clock: Arc::clone(&self.clock),
            policy: self.policy,
        }
    }
}

impl<S> RedemptionService<S> {
    /// Create a service over `store`, reading wall time from `clock`.
    ///
    /// ```rust,no_run
    /// # use std::sync::Arc;
    /// # use canteen::domain::{RedemptionPolicy, RedemptionService};
    /// # use canteen::outbound::memory::InMemoryRedemptionStore;
    /// # use mockable::DefaultClock;
    /// let service = RedemptionService::new(
    ///     Arc::new(InMemoryRedemptionStore::default()),
    ///     Arc::new(DefaultClock),
    ///     RedemptionPolicy::default(),
    /// );
    /// # let _ = service;
    /// ```
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>, policy: RedemptionPolicy) -> Self {
        Self {
            store,
            clock,
            policy,
        }
    }

    pub const fn policy(&self) -> &RedemptionPolicy {
        &self.policy
    }
}

impl<S> RedemptionService<S>
where
    S: RedemptionStore,
{
    /// Decide whether `code` may be redeemed for `meal_type_id` right now.
    pub async fn validate_redemption(
        &self,
        code: &str,
        meal_type_id: &MealTypeId,
    ) -> RedemptionVerdict {
        let now = self.clock.local().fixed_offset();
        self.validate_redemption_at(code, meal_type_id, now).await
    }

    /// Decide whether `code` may be redeemed for `meal_type_id` at `now`.
    ///
    /// `now` carries the local offset that defines the time of day and the
    /// calendar day the rules are evaluated against.
    pub async fn validate_redemption_at(
        &self,
        code: &str,
        meal_type_id: &MealTypeId,
        now: DateTime<FixedOffset>,
    ) -> RedemptionVerdict {
        let outcome = self
            .evaluate(code, meal_type_id, &now)
            .await
            .map(|approval| approval.acceptance);
        log_verdict(RedemptionVerdict::from(outcome), meal_type_id)
    }

    /// Validate and, when accepted, commit the redemption right now.
    pub async fn redeem(&self, code: &str, meal_type_id: &MealTypeId) -> RedemptionVerdict {
        let now = self.clock.local().fixed_offset();
        self.redeem_at(code, meal_type_id, now).await
    }

    /// Validate and, when accepted, commit the redemption at `now`.
    ///
    /// A conditional write that finds the voucher already consumed, or a
    /// newer redemption for the same user, yields `RACE_LOST`.
    pub async fn redeem_at(
        &self,
        code: &str,
        meal_type_id: &MealTypeId,
        now: DateTime<FixedOffset>,
    ) -> RedemptionVerdict {
        let outcome = match self.evaluate(code, meal_type_id, &now).await {
            Ok(approval) => self.commit(approval).await,
            Err(rejection) => Err(rejection),
        };
        log_verdict(RedemptionVerdict::from(outcome), meal_type_id)
    }

    async fn evaluate(
        &self,
        raw_code: &str,
        meal_type_id: &MealTypeId,
        now: &DateTime<FixedOffset>,
    ) -> Result<Approval, Rejection> {
        let Ok(code) = VoucherCode::new(raw_code) else {
            return Err(Rejection::not_found());
        };

        let meal_type = self
            .store
            .find_meal_type(meal_type_id)
            .await
            .map_err(map_store_error)?
            .filter(|meal_type| meal_type.is_active())
            .ok_or_else(|| Rejection::unknown_meal_type(meal_type_id))?;

        debug!(code = %code.masked(), %meal_type_id, "classifying voucher code");
        let classification = classify(self.store.as_ref(), &code, now)
            .await
            .map_err(map_store_error)?;

        let time = TimeOfDay::of(now);
        let instant = now.with_timezone(&Utc);
        let window = ServiceWindow::for_meal_type(&meal_type);

        match classification {
            Classification::NotFound => Err(Rejection::not_found()),
            Classification::Spent(kind) => Err(Rejection::expired(kind)),
            Classification::Disposable(voucher) => {
                check_meal_binding(Some(voucher.meal_type_id()), meal_type_id)?;
                window.check(time)?;
                check_disposable(&voucher, instant)?;
                Ok(Approval {
                    commit: Commit::ConsumeDisposable(voucher.code().clone()),
                    acceptance: Acceptance::new(
                        RedemptionSubject::Disposable(voucher),
                        *meal_type_id,
                        instant,
                    ),
                })
            }
            Classification::Extra(voucher) => {
                window.check(time)?;
                check_extra(&voucher, meal_type_id, now.date_naive())?;
                Ok(Approval {
                    commit: Commit::ConsumeExtra(voucher.code().clone()),
                    acceptance: Acceptance::new(
                        RedemptionSubject::Extra(voucher),
                        *meal_type_id,
                        instant,
                    ),
                })
            }
            Classification::Regular(user) => {
                window.check(time)?;
                check_account(&user, time)?;

                let day_start = local_day_start(now);
                let history = self
                    .store
                    .list_redemptions_since(user.id(), day_start)
                    .await
                    .map_err(map_store_error)?;
                check_interval(&self.policy, &history, instant)?;

                Ok(Approval {
                    commit: Commit::Append {
                        record: RedemptionRecord::new(*user.id(), *meal_type_id, instant),
                        guard: IntervalGuard {
                            day_start,
                            latest_permitted: instant - self.policy.min_interval(),
                        },
                    },
                    acceptance: Acceptance::new(
                        RedemptionSubject::Regular(user),
                        *meal_type_id,
                        instant,
                    ),
                })
            }
        }
    }

    async fn commit(&self, approval: Approval) -> Result<Acceptance, Rejection> {
        let Approval { acceptance, commit } = approval;
        let used_at = acceptance.evaluated_at();
        let written = match &commit {
            Commit::ConsumeDisposable(code) => {
                self.store.consume_disposable_voucher(code, used_at).await
            }
            Commit::ConsumeExtra(code) => self.store.consume_extra_voucher(code, used_at).await,
            Commit::Append { record, guard } => self.store.append_redemption(record, *guard).await,
        }
        .map_err(map_store_error)?;

        if written {
            Ok(acceptance)
        } else {
            warn!(
                voucher_kind = %acceptance.kind(),
                meal_type_id = %acceptance.meal_type_id(),
                "conditional redemption write refused"
            );
            Err(Rejection::race_lost())
        }
    }
}

fn log_verdict(verdict: RedemptionVerdict, meal_type_id: &MealTypeId) -> RedemptionVerdict {
    match &verdict {
        RedemptionVerdict::Accepted(acceptance) => debug!(
            voucher_kind = %acceptance.kind(),
            %meal_type_id,
            "redemption accepted"
        ),
        RedemptionVerdict::Rejected(rejection) => debug!(
            rejection = %rejection.kind(),
            %meal_type_id,
            "redemption rejected"
        ),
    }
    verdict
}

#[async_trait]
impl<S> VoucherRedemption for RedemptionService<S>
where
    S: RedemptionStore,
{
    async fn validate(&self, request: &RedemptionRequest) -> RedemptionVerdict {
        self.validate_redemption(&request.code, &request.meal_type_id)
            .await
    }

    async fn redeem(&self, request: &RedemptionRequest) -> RedemptionVerdict {
        RedemptionService::redeem(self, &request.code, &request.meal_type_id).await
    }
}

#[cfg(test)]
#[path = "redemption_service_tests.rs"]
mod tests;
