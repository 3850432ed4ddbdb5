//! Resolves a presented code to the voucher kind it belongs to.

use chrono::{DateTime, FixedOffset, Utc};

use super::ports::{RedemptionStore, RedemptionStoreError};
use super::{DisposableVoucher, ExtraVoucher, User, VoucherCode, VoucherKind};

/// What a code resolved to.
///
/// Exactly one variant applies; downstream checks match exhaustively rather
/// than probing optional fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// An unused, unexpired disposable voucher.
    Disposable(DisposableVoucher),
    /// An unused extra voucher whose valid day has not passed.
    Extra(ExtraVoucher),
    /// A user's personal voucher.
    Regular(User),
    /// The code exists as a single-use voucher that can no longer be used.
    Spent(VoucherKind),
    /// Nothing matched.
    NotFound,
}

impl Classification {
    /// Voucher kind of the match, if any.
    pub const fn kind(&self) -> Option<VoucherKind> {
        match self {
            Self::Disposable(_) => Some(VoucherKind::Disposable),
            Self::Extra(_) => Some(VoucherKind::Extra),
            Self::Regular(_) => Some(VoucherKind::Regular),
            Self::Spent(kind) => Some(*kind),
            Self::NotFound => None,
        }
    }
}

/// Classify `code` against the store as seen at `now`.
///
/// Lookups run disposable, then extra, then user. A usable disposable voucher
/// wins outright. A spent single-use voucher only decides the outcome when no
/// later lookup matches, so a badge code that collides with an old ticket
/// still resolves to its owner.
///
/// Read-only: repeated calls with the same store state and instant return the
/// same classification.
pub async fn classify<S>(
    store: &S,
    code: &VoucherCode,
    now: &DateTime<FixedOffset>,
) -> Result<Classification, RedemptionStoreError>
where
    S: RedemptionStore + ?Sized,
{
    let instant = now.with_timezone(&Utc);
    let mut spent = None;

    if let Some(voucher) = store.find_disposable_voucher(code).await? {
        if voucher.is_used() || voucher.is_expired_at(instant) {
            spent = Some(VoucherKind::Disposable);
        } else {
            return Ok(Classification::Disposable(voucher));
        }
    }

    if let Some(voucher) = store.find_extra_voucher(code).await? {
        if voucher.is_used() || voucher.valid_on() < now.date_naive() {
            spent.get_or_insert(VoucherKind::Extra);
        } else {
            return Ok(Classification::Extra(voucher));
        }
    }

    if let Some(user) = store.find_user_by_voucher(code).await? {
        return Ok(Classification::Regular(user));
    }

    Ok(spent.map_or(Classification::NotFound, Classification::Spent))
}
