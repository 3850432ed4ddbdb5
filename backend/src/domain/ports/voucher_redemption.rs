//! Driving port for voucher redemption.

use async_trait::async_trait;

use crate::domain::{MealTypeId, RedemptionVerdict};

/// Code presented at the till for a meal type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedemptionRequest {
    /// Raw code as scanned or typed; validated by the service.
    pub code: String,
    /// Meal being served.
    pub meal_type_id: MealTypeId,
}

impl RedemptionRequest {
    /// Build a request for `code` at `meal_type_id`.
    pub fn new(code: impl Into<String>, meal_type_id: MealTypeId) -> Self {
        Self {
            code: code.into(),
            meal_type_id,
        }
    }
}

/// Domain use-case port for deciding and committing redemptions.
#[async_trait]
pub trait VoucherRedemption: Send + Sync {
    /// Decide whether the code may be redeemed now. Read-only and safe to
    /// retry.
    async fn validate(&self, request: &RedemptionRequest) -> RedemptionVerdict;

    /// Validate and, when accepted, atomically commit the redemption.
    ///
    /// A lost conditional write yields a `RACE_LOST` rejection.
    async fn redeem(&self, request: &RedemptionRequest) -> RedemptionVerdict;
}
