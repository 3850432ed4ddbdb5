//! Test utilities for the canteen crate.
//!
//! Shared by unit tests (in `src/`) and integration tests (in `tests/`).
//! Compiled only for tests or with the `test-support` feature.

use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Local, NaiveDate, TimeDelta, TimeZone, Utc};
use mockable::Clock;
use uuid::Uuid;

use crate::domain::{
    Company, CompanyId, MealType, MealTypeDraft, MealTypeId, Shift, ShiftId, ShiftKind,
    TimeOfDay, User, UserDraft, UserId, VoucherCode,
};

/// Lunch meal type identifier used across fixtures.
pub const LUNCH_ID: MealTypeId = MealTypeId::from_uuid(Uuid::from_u128(0x1001));
/// Breakfast meal type identifier used across fixtures.
pub const BREAKFAST_ID: MealTypeId = MealTypeId::from_uuid(Uuid::from_u128(0x1002));

/// Build a UTC instant, panicking on invalid input.
pub fn utc(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    match Utc.with_ymd_and_hms(year, month, day, hour, minute, 0).single() {
        Some(instant) => instant,
        None => panic!("invalid UTC fixture {year}-{month}-{day} {hour}:{minute}"),
    }
}

/// Build an instant from a wall-clock time in the machine's local zone.
///
/// Tests express "12:00 today" this way so assertions do not depend on the
/// zone the suite runs in.
pub fn local(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Local> {
    let Some(date) = NaiveDate::from_ymd_opt(year, month, day) else {
        panic!("invalid local fixture date {year}-{month}-{day}");
    };
    let Some(naive) = date.and_hms_opt(hour, minute, 0) else {
        panic!("invalid local fixture time {hour}:{minute}");
    };
    match Local.from_local_datetime(&naive).earliest() {
        Some(instant) => instant,
        None => panic!("local fixture {naive} falls in a daylight saving gap"),
    }
}

/// Parse an `HH:MM` fixture time.
pub fn time(raw: &str) -> TimeOfDay {
    match raw.parse() {
        Ok(time) => time,
        Err(error) => panic!("invalid fixture time {raw:?}: {error}"),
    }
}

/// Parse a fixture voucher code.
pub fn code(raw: &str) -> VoucherCode {
    match VoucherCode::new(raw) {
        Ok(code) => code,
        Err(error) => panic!("invalid fixture code {raw:?}: {error}"),
    }
}

/// Lunch served 11:00 to 14:00 with 15 minutes of tolerance.
pub fn lunch() -> MealType {
    meal_type(LUNCH_ID, "Lunch", "11:00", "14:00", 15, true)
}

/// Breakfast served 06:00 to 09:00 with no tolerance.
pub fn breakfast() -> MealType {
    meal_type(BREAKFAST_ID, "Breakfast", "06:00", "09:00", 0, true)
}

/// Build a meal type from fixture values.
pub fn meal_type(
    id: MealTypeId,
    name: &str,
    start: &str,
    end: &str,
    tolerance_minutes: u16,
    active: bool,
) -> MealType {
    let draft = MealTypeDraft {
        id,
        name: name.to_owned(),
        service_start: time(start),
        service_end: time(end),
        tolerance_minutes,
        active,
    };
    match MealType::new(draft) {
        Ok(meal_type) => meal_type,
        Err(error) => panic!("invalid fixture meal type: {error}"),
    }
}

/// Active day shift, 08:00 to 17:00.
pub fn day_shift() -> Shift {
    Shift::new(
        ShiftId::from_uuid(Uuid::from_u128(0x2001)),
        ShiftKind::Commercial,
        time("08:00"),
        time("17:00"),
        true,
    )
}

/// Active night shift, 22:00 to 06:00.
pub fn night_shift() -> Shift {
    Shift::new(
        ShiftId::from_uuid(Uuid::from_u128(0x2002)),
        ShiftKind::Night,
        time("22:00"),
        time("06:00"),
        true,
    )
}

/// Company fixture with the given state.
pub fn company(active: bool) -> Company {
    match Company::new(CompanyId::from_uuid(Uuid::from_u128(0x3001)), "Acme", active) {
        Ok(company) => company,
        Err(error) => panic!("invalid fixture company: {error}"),
    }
}

/// Knobs for [`user_with`].
#[derive(Debug, Clone)]
pub struct UserFixture {
    pub suspended: bool,
    pub company_active: bool,
    pub shift: Shift,
}

impl Default for UserFixture {
    fn default() -> Self {
        Self {
            suspended: false,
            company_active: true,
            shift: day_shift(),
        }
    }
}

/// Active, unsuspended day-shift user holding `voucher`.
pub fn sample_user(voucher: &str) -> User {
    user_with(voucher, UserFixture::default())
}

/// User holding `voucher` with the state described by `fixture`.
pub fn user_with(voucher: &str, fixture: UserFixture) -> User {
    let draft = UserDraft {
        id: UserId::from_uuid(Uuid::from_u128(0x4000 + u128::from(checksum(voucher)))),
        name: format!("Holder of {voucher}"),
        voucher: code(voucher),
        suspended: fixture.suspended,
        company: company(fixture.company_active),
        shift: fixture.shift,
    };
    match User::new(draft) {
        Ok(user) => user,
        Err(error) => panic!("invalid fixture user: {error}"),
    }
}

fn checksum(raw: &str) -> u32 {
    raw.bytes()
        .fold(0_u32, |acc, byte| acc.wrapping_mul(31).wrapping_add(u32::from(byte)))
}

/// Clock frozen at one local instant.
#[derive(Debug, Clone, Copy)]
pub struct FixtureClock {
    now: DateTime<Local>,
}

impl FixtureClock {
    pub const fn at(now: DateTime<Local>) -> Self {
        Self { now }
    }
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.now
    }

    fn utc(&self) -> DateTime<Utc> {
        self.now.with_timezone(&Utc)
    }
}

/// Clock that tests can move forward between calls.
pub struct MutableClock(Mutex<DateTime<Local>>);

impl MutableClock {
    pub fn new(now: DateTime<Local>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn advance_minutes(&self, minutes: i64) {
        *self.lock_clock() += TimeDelta::minutes(minutes);
    }

    fn lock_clock(&self) -> MutexGuard<'_, DateTime<Local>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("clock mutex"),
        }
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        *self.lock_clock()
    }

    fn utc(&self) -> DateTime<Utc> {
        self.local().with_timezone(&Utc)
    }
}
