//! Account state and pacing rules applied after classification.
//!
//! Each check returns the first failing rule as a [`Rejection`]. None of them
//! touch the store; callers fetch whatever history a check needs.

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};

use super::temporal::ShiftWindow;
use super::{
    DisposableVoucher, ExtraVoucher, MealTypeId, RedemptionPolicy, RedemptionRecord, Rejection,
    TimeOfDay, User, VoucherKind,
};

/// A voucher issued for a different meal is `NOT_FOUND` for the requested
/// one. `None` binds to any meal.
pub fn check_meal_binding(
    issued_for: Option<&MealTypeId>,
    requested: &MealTypeId,
) -> Result<(), Rejection> {
    match issued_for {
        Some(expected) if expected != requested => {
            Err(Rejection::issued_for_other_meal(expected, requested))
        }
        _ => Ok(()),
    }
}

/// Disposable vouchers are usable strictly before `expires_at`.
pub fn check_disposable(voucher: &DisposableVoucher, now: DateTime<Utc>) -> Result<(), Rejection> {
    if voucher.is_used() || voucher.is_expired_at(now) {
        return Err(Rejection::expired(VoucherKind::Disposable));
    }
    Ok(())
}

/// Suspension, then company state.
pub fn check_holder(user: &User) -> Result<(), Rejection> {
    if user.is_suspended() {
        return Err(Rejection::suspended());
    }
    if !user.company().is_active() {
        return Err(Rejection::company_inactive());
    }
    Ok(())
}

/// Full account chain for regular vouchers: holder checks, shift state, then
/// the shift window at `time`.
pub fn check_account(user: &User, time: TimeOfDay) -> Result<(), Rejection> {
    check_holder(user)?;
    let shift = user.shift();
    if !shift.is_active() {
        return Err(Rejection::shift_inactive());
    }
    ShiftWindow::for_shift(shift).check(time)
}

/// Minimum interval between regular redemptions.
///
/// `history` holds the user's redemptions for the current local day. The
/// latest one must be at least the policy interval before `now`.
pub fn check_interval(
    policy: &RedemptionPolicy,
    history: &[RedemptionRecord],
    now: DateTime<Utc>,
) -> Result<(), Rejection> {
    let Some(last) = history.iter().map(RedemptionRecord::used_at).max() else {
        return Ok(());
    };
    let next_allowed_at = last + policy.min_interval();
    if next_allowed_at <= now {
        return Ok(());
    }
    let remaining = next_allowed_at - now;
    let mut minutes = remaining.num_minutes();
    if remaining > TimeDelta::minutes(minutes) {
        minutes += 1;
    }
    Err(Rejection::too_soon(
        u64::try_from(minutes).unwrap_or(0),
        next_allowed_at,
    ))
}

/// Extra voucher chain: holder checks, meal binding, then the valid day.
///
/// Shift and interval rules do not apply to extra vouchers.
pub fn check_extra(
    voucher: &ExtraVoucher,
    requested: &MealTypeId,
    today: NaiveDate,
) -> Result<(), Rejection> {
    check_holder(voucher.user())?;
    check_meal_binding(voucher.meal_type_id(), requested)?;
    if voucher.is_used() || voucher.valid_on() < today {
        return Err(Rejection::expired(VoucherKind::Extra));
    }
    if voucher.valid_on() > today {
        return Err(Rejection::not_yet_valid(voucher.valid_on()));
    }
    Ok(())
}
