//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod redemption_store;
mod voucher_redemption;

#[cfg(test)]
pub use redemption_store::MockRedemptionStore;
pub use redemption_store::{
    FixtureRedemptionStore, IntervalGuard, RedemptionStore, RedemptionStoreError,
};
pub use voucher_redemption::{RedemptionRequest, VoucherRedemption};
