//! Temporal window checks for meal services and shifts.
//!
//! Both windows are inclusive at both ends and compared at minute
//! granularity. Meal windows never wrap; shift windows wrap past midnight
//! when the end precedes the start.

use chrono::{DateTime, LocalResult, NaiveTime, TimeZone, Utc};

use super::{MealType, Rejection, Shift, TimeOfDay};

/// Allowed service window of a meal type, tolerance applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceWindow {
    start: TimeOfDay,
    end: TimeOfDay,
}

impl ServiceWindow {
    /// Window `[service_start, service_end + tolerance]` of `meal_type`.
    pub fn for_meal_type(meal_type: &MealType) -> Self {
        Self {
            start: meal_type.service_start(),
            end: meal_type.tolerant_end(),
        }
    }

    pub const fn start(&self) -> TimeOfDay {
        self.start
    }

    pub const fn end(&self) -> TimeOfDay {
        self.end
    }

    pub fn contains(&self, time: TimeOfDay) -> bool {
        self.start <= time && time <= self.end
    }

    /// `OUT_OF_WINDOW` carrying the allowed window when `time` falls outside.
    pub fn check(&self, time: TimeOfDay) -> Result<(), Rejection> {
        if self.contains(time) {
            Ok(())
        } else {
            Err(Rejection::out_of_window(self.start, self.end, time))
        }
    }
}

/// Daily attendance window of a shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShiftWindow {
    start: TimeOfDay,
    end: TimeOfDay,
}

impl ShiftWindow {
    pub const fn for_shift(shift: &Shift) -> Self {
        Self {
            start: shift.shift_start(),
            end: shift.shift_end(),
        }
    }

    /// Inclusive containment; wraps past midnight when `end < start`.
    pub fn contains(&self, time: TimeOfDay) -> bool {
        if self.end < self.start {
            time >= self.start || time <= self.end
        } else {
            self.start <= time && time <= self.end
        }
    }

    /// `OUT_OF_SHIFT` carrying the shift boundaries when `time` falls outside.
    pub fn check(&self, time: TimeOfDay) -> Result<(), Rejection> {
        if self.contains(time) {
            Ok(())
        } else {
            Err(Rejection::out_of_shift(self.start, self.end, time))
        }
    }
}

/// UTC instant of the most recent local midnight before `now`.
///
/// When midnight does not exist locally (a daylight saving gap), the first
/// valid instant of the day is used instead.
pub fn local_day_start<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Utc> {
    let timezone = now.timezone();
    let midnight = now.date_naive().and_time(NaiveTime::MIN);
    match timezone.from_local_datetime(&midnight) {
        LocalResult::Single(start) | LocalResult::Ambiguous(start, _) => start.with_timezone(&Utc),
        LocalResult::None => {
            let elapsed = now.naive_local() - midnight;
            now.with_timezone(&Utc) - elapsed
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use chrono::FixedOffset;
    use rstest::rstest;
    use serde_json::json;

    use super::*;
    use crate::domain::{MealTypeDraft, MealTypeId, RejectionKind, ShiftId, ShiftKind};

    fn time(raw: &str) -> TimeOfDay {
        raw.parse().expect("valid time")
    }

    fn lunch() -> MealType {
        MealType::new(MealTypeDraft {
            id: MealTypeId::random(),
            name: "Lunch".to_owned(),
            service_start: time("11:00"),
            service_end: time("14:00"),
            tolerance_minutes: 15,
            active: true,
        })
        .expect("valid meal type")
    }

    fn shift(start: &str, end: &str) -> Shift {
        Shift::new(ShiftId::random(), ShiftKind::Night, time(start), time(end), true)
    }

    #[rstest]
    #[case("11:00", true)]
    #[case("12:30", true)]
    #[case("14:00", true)]
    #[case("14:15", true)]
    #[case("10:59", false)]
    #[case("14:16", false)]
    #[case("00:00", false)]
    fn meal_window_includes_tolerance(#[case] at: &str, #[case] inside: bool) {
        let window = ServiceWindow::for_meal_type(&lunch());
        assert_eq!(window.contains(time(at)), inside);
        assert_eq!(window.check(time(at)).is_ok(), inside);
    }

    #[rstest]
    #[case("23:00")]
    #[case("00:10")]
    #[case("12:00")]
    fn meal_window_ending_before_it_starts_is_empty(#[case] at: &str) {
        let late = MealType::new(MealTypeDraft {
            id: MealTypeId::random(),
            name: "Late supper".to_owned(),
            service_start: time("22:00"),
            service_end: time("00:30"),
            tolerance_minutes: 0,
            active: true,
        })
        .expect("valid meal type");
        let rejection = ServiceWindow::for_meal_type(&late)
            .check(time(at))
            .expect_err("window never wraps");
        assert_eq!(rejection.kind(), RejectionKind::OutOfWindow);
    }

    #[rstest]
    fn meal_rejection_reports_the_window() {
        let rejection = ServiceWindow::for_meal_type(&lunch())
            .check(time("10:59"))
            .expect_err("before service");
        assert_eq!(rejection.kind(), RejectionKind::OutOfWindow);
        assert_eq!(
            rejection.details(),
            Some(&json!({
                "windowStart": "11:00",
                "windowEnd": "14:15",
                "presentedAt": "10:59",
            }))
        );
    }

    #[rstest]
    #[case("22:00", "06:00", "23:00", true)]
    #[case("22:00", "06:00", "05:00", true)]
    #[case("22:00", "06:00", "22:00", true)]
    #[case("22:00", "06:00", "06:00", true)]
    #[case("22:00", "06:00", "00:00", true)]
    #[case("22:00", "06:00", "12:00", false)]
    #[case("22:00", "06:00", "21:59", false)]
    #[case("22:00", "06:00", "06:01", false)]
    #[case("08:00", "17:00", "08:00", true)]
    #[case("08:00", "17:00", "17:00", true)]
    #[case("08:00", "17:00", "17:01", false)]
    #[case("08:00", "17:00", "07:59", false)]
    #[case("00:00", "00:00", "13:37", false)]
    #[case("08:00", "08:00", "08:00", true)]
    #[case("08:00", "08:00", "08:01", false)]
    #[case("08:00", "08:00", "20:00", false)]
    fn shift_window_handles_wraparound(
        #[case] start: &str,
        #[case] end: &str,
        #[case] at: &str,
        #[case] inside: bool,
    ) {
        let window = ShiftWindow::for_shift(&shift(start, end));
        assert_eq!(window.contains(time(at)), inside);
    }

    #[rstest]
    fn shift_rejection_is_out_of_shift() {
        let rejection = ShiftWindow::for_shift(&shift("22:00", "06:00"))
            .check(time("12:00"))
            .expect_err("midday is outside a night shift");
        assert_eq!(rejection.kind(), RejectionKind::OutOfShift);
    }

    #[rstest]
    fn day_start_uses_the_instant_offset() {
        let offset = FixedOffset::west_opt(3 * 3600).expect("valid offset");
        let now = offset
            .with_ymd_and_hms(2026, 6, 10, 1, 30, 0)
            .single()
            .expect("valid instant");
        let expected = Utc
            .with_ymd_and_hms(2026, 6, 10, 3, 0, 0)
            .single()
            .expect("valid instant");
        assert_eq!(local_day_start(&now), expected);
    }
}
