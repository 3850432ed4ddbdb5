//! Tests for the redemption service.

use std::sync::Arc;

use chrono::TimeDelta;
use mockall::predicate::{always, eq};
use rstest::rstest;
use serde_json::json;

use super::*;
use crate::domain::ports::MockRedemptionStore;
use crate::domain::{
    DisposableVoucher, ExtraVoucher, MealType, RejectionKind, User, VoucherKind,
};
use crate::outbound::memory::InMemoryRedemptionStore;
use crate::test_support::{
    BREAKFAST_ID, FixtureClock, LUNCH_ID, MutableClock, UserFixture, code, local, lunch,
    meal_type, night_shift, sample_user, user_with,
};

const BADGE: &str = "EMP-0001";
const TICKET: &str = "TICKET-0001";

fn at(hour: u32, minute: u32) -> DateTime<FixedOffset> {
    local(2026, 6, 10, hour, minute).fixed_offset()
}

fn utc_at(hour: u32, minute: u32) -> DateTime<Utc> {
    local(2026, 6, 10, hour, minute).with_timezone(&Utc)
}

fn day_start() -> DateTime<Utc> {
    utc_at(0, 0)
}

#[derive(Default)]
struct Script {
    meal_type: Option<MealType>,
    disposable: Option<DisposableVoucher>,
    extra: Option<ExtraVoucher>,
    user: Option<User>,
    history: Vec<RedemptionRecord>,
}

impl Script {
    fn lunch() -> Self {
        Self {
            meal_type: Some(lunch()),
            ..Self::default()
        }
    }
}

/// Read-side expectations only; tests add write expectations as needed.
fn scripted_store(script: Script) -> MockRedemptionStore {
    let Script {
        meal_type,
        disposable,
        extra,
        user,
        history,
    } = script;
    let mut store = MockRedemptionStore::new();
    store
        .expect_find_meal_type()
        .returning(move |_| Ok(meal_type.clone()));
    store
        .expect_find_disposable_voucher()
        .returning(move |_| Ok(disposable.clone()));
    store
        .expect_find_extra_voucher()
        .returning(move |_| Ok(extra.clone()));
    store
        .expect_find_user_by_voucher()
        .returning(move |_| Ok(user.clone()));
    store
        .expect_list_redemptions_since()
        .returning(move |_, _| Ok(history.clone()));
    store
}

fn service(store: MockRedemptionStore) -> RedemptionService<MockRedemptionStore> {
    RedemptionService::new(
        Arc::new(store),
        Arc::new(FixtureClock::at(local(2026, 6, 10, 12, 0))),
        RedemptionPolicy::default(),
    )
}

fn lunch_ticket() -> DisposableVoucher {
    DisposableVoucher::new(code(TICKET), LUNCH_ID, utc_at(23, 0), None)
}

fn assert_rejected(verdict: &RedemptionVerdict, kind: RejectionKind) {
    assert_eq!(
        verdict.rejection_kind(),
        Some(kind),
        "unexpected verdict: {verdict:?}"
    );
}

#[tokio::test]
async fn unused_disposable_is_accepted_without_writing() {
    let service = service(scripted_store(Script {
        disposable: Some(lunch_ticket()),
        ..Script::lunch()
    }));

    let verdict = service
        .validate_redemption_at(TICKET, &LUNCH_ID, at(12, 30))
        .await;

    let acceptance = verdict.acceptance().expect("disposable accepted");
    assert_eq!(acceptance.kind(), VoucherKind::Disposable);
    assert_eq!(acceptance.meal_type_id(), &LUNCH_ID);
    assert_eq!(acceptance.evaluated_at(), utc_at(12, 30));
}

#[tokio::test]
async fn disposable_commit_consumes_the_voucher() {
    let mut store = scripted_store(Script {
        disposable: Some(lunch_ticket()),
        ..Script::lunch()
    });
    store
        .expect_consume_disposable_voucher()
        .with(eq(code(TICKET)), eq(utc_at(12, 30)))
        .times(1)
        .return_once(|_, _| Ok(true));

    let verdict = service(store)
        .redeem_at(TICKET, &LUNCH_ID, at(12, 30))
        .await;

    assert!(verdict.is_accepted());
}

#[tokio::test]
async fn lost_disposable_commit_is_race_lost() {
    let mut store = scripted_store(Script {
        disposable: Some(lunch_ticket()),
        ..Script::lunch()
    });
    store
        .expect_consume_disposable_voucher()
        .times(1)
        .return_once(|_, _| Ok(false));

    let verdict = service(store)
        .redeem_at(TICKET, &LUNCH_ID, at(12, 30))
        .await;

    assert_rejected(&verdict, RejectionKind::RaceLost);
}

#[tokio::test]
async fn consumed_disposable_is_expired() {
    let spent = lunch_ticket().consumed(utc_at(11, 45));
    let service = service(scripted_store(Script {
        disposable: Some(spent),
        ..Script::lunch()
    }));

    let verdict = service
        .validate_redemption_at(TICKET, &LUNCH_ID, at(12, 30))
        .await;

    assert_rejected(&verdict, RejectionKind::Expired);
}

#[tokio::test]
async fn disposable_for_another_meal_is_not_found() {
    let ticket = DisposableVoucher::new(code(TICKET), BREAKFAST_ID, utc_at(23, 0), None);
    let service = service(scripted_store(Script {
        disposable: Some(ticket),
        ..Script::lunch()
    }));

    let verdict = service
        .validate_redemption_at(TICKET, &LUNCH_ID, at(12, 30))
        .await;

    assert_rejected(&verdict, RejectionKind::NotFound);
    assert_eq!(
        verdict.rejection().and_then(Rejection::details),
        Some(&json!({
            "issuedFor": BREAKFAST_ID,
            "requested": LUNCH_ID,
        }))
    );
}

#[rstest]
#[case(10, 59, Some(RejectionKind::OutOfWindow))]
#[case(11, 0, None)]
#[case(14, 15, None)]
#[case(14, 16, Some(RejectionKind::OutOfWindow))]
#[tokio::test]
async fn meal_window_boundaries_apply_to_disposables(
    #[case] hour: u32,
    #[case] minute: u32,
    #[case] expected: Option<RejectionKind>,
) {
    let service = service(scripted_store(Script {
        disposable: Some(lunch_ticket()),
        ..Script::lunch()
    }));

    let verdict = service
        .validate_redemption_at(TICKET, &LUNCH_ID, at(hour, minute))
        .await;

    assert_eq!(verdict.rejection_kind(), expected);
}

#[rstest]
#[case(12, 59, Some(RejectionKind::TooSoon))]
#[case(13, 0, None)]
#[tokio::test]
async fn regular_voucher_respects_minimum_interval(
    #[case] hour: u32,
    #[case] minute: u32,
    #[case] expected: Option<RejectionKind>,
) {
    let user = sample_user(BADGE);
    let history = vec![RedemptionRecord::new(*user.id(), LUNCH_ID, utc_at(12, 0))];
    let service = service(scripted_store(Script {
        user: Some(user),
        history,
        ..Script::lunch()
    }));

    let verdict = service
        .validate_redemption_at(BADGE, &LUNCH_ID, at(hour, minute))
        .await;

    assert_eq!(verdict.rejection_kind(), expected);
}

#[tokio::test]
async fn history_is_read_from_local_midnight() {
    let user = sample_user(BADGE);
    let user_id = *user.id();
    let mut store = MockRedemptionStore::new();
    store
        .expect_find_meal_type()
        .return_once(|_| Ok(Some(lunch())));
    store
        .expect_find_disposable_voucher()
        .return_once(|_| Ok(None));
    store.expect_find_extra_voucher().return_once(|_| Ok(None));
    store
        .expect_find_user_by_voucher()
        .return_once(move |_| Ok(Some(user)));
    store
        .expect_list_redemptions_since()
        .with(eq(user_id), eq(day_start()))
        .times(1)
        .return_once(|_, _| Ok(Vec::new()));

    let verdict = service(store)
        .validate_redemption_at(BADGE, &LUNCH_ID, at(12, 0))
        .await;

    assert!(verdict.is_accepted());
}

#[tokio::test]
async fn suspended_user_is_rejected_before_history_is_read() {
    let user = user_with(
        BADGE,
        UserFixture {
            suspended: true,
            company_active: false,
            ..UserFixture::default()
        },
    );
    let mut store = MockRedemptionStore::new();
    store
        .expect_find_meal_type()
        .return_once(|_| Ok(Some(lunch())));
    store
        .expect_find_disposable_voucher()
        .return_once(|_| Ok(None));
    store.expect_find_extra_voucher().return_once(|_| Ok(None));
    store
        .expect_find_user_by_voucher()
        .return_once(move |_| Ok(Some(user)));
    store.expect_list_redemptions_since().never();

    let verdict = service(store)
        .validate_redemption_at(BADGE, &LUNCH_ID, at(12, 0))
        .await;

    assert_rejected(&verdict, RejectionKind::Suspended);
}

#[tokio::test]
async fn night_shift_user_outside_shift_is_rejected() {
    let user = user_with(
        BADGE,
        UserFixture {
            shift: night_shift(),
            ..UserFixture::default()
        },
    );
    let service = service(scripted_store(Script {
        user: Some(user),
        ..Script::lunch()
    }));

    let verdict = service
        .validate_redemption_at(BADGE, &LUNCH_ID, at(12, 0))
        .await;

    assert_rejected(&verdict, RejectionKind::OutOfShift);
}

#[tokio::test]
async fn regular_commit_appends_with_interval_guard() {
    let user = sample_user(BADGE);
    let expected_record = RedemptionRecord::new(*user.id(), LUNCH_ID, utc_at(13, 0));
    let expected_guard = IntervalGuard {
        day_start: day_start(),
        latest_permitted: utc_at(12, 0),
    };
    let mut store = scripted_store(Script {
        user: Some(user),
        ..Script::lunch()
    });
    store
        .expect_append_redemption()
        .with(eq(expected_record), eq(expected_guard))
        .times(1)
        .return_once(|_, _| Ok(true));

    let verdict = service(store).redeem_at(BADGE, &LUNCH_ID, at(13, 0)).await;

    let acceptance = verdict.acceptance().expect("regular accepted");
    assert_eq!(acceptance.kind(), VoucherKind::Regular);
}

#[rstest]
#[case(Ok(false), RejectionKind::RaceLost)]
#[case(Err(RedemptionStoreError::query("deadlock detected")), RejectionKind::LookupFailed)]
#[tokio::test]
async fn failed_regular_commit_is_reported(
    #[case] outcome: Result<bool, RedemptionStoreError>,
    #[case] expected: RejectionKind,
) {
    let mut store = scripted_store(Script {
        user: Some(sample_user(BADGE)),
        ..Script::lunch()
    });
    store
        .expect_append_redemption()
        .with(always(), always())
        .times(1)
        .return_once(move |_, _| outcome);

    let verdict = service(store).redeem_at(BADGE, &LUNCH_ID, at(13, 0)).await;

    assert_rejected(&verdict, expected);
}

fn night_shift_extra() -> ExtraVoucher {
    let holder = user_with(
        BADGE,
        UserFixture {
            shift: night_shift(),
            ..UserFixture::default()
        },
    );
    ExtraVoucher::new(
        code("EXTRA-0001"),
        holder,
        Some(LUNCH_ID),
        at(12, 0).date_naive(),
        None,
    )
}

#[tokio::test]
async fn extra_voucher_skips_shift_and_interval_rules() {
    let mut store = MockRedemptionStore::new();
    store
        .expect_find_meal_type()
        .return_once(|_| Ok(Some(lunch())));
    store
        .expect_find_disposable_voucher()
        .return_once(|_| Ok(None));
    store
        .expect_find_extra_voucher()
        .return_once(|_| Ok(Some(night_shift_extra())));
    store.expect_find_user_by_voucher().never();
    store.expect_list_redemptions_since().never();
    store
        .expect_consume_extra_voucher()
        .with(eq(code("EXTRA-0001")), eq(utc_at(12, 0)))
        .times(1)
        .return_once(|_, _| Ok(true));

    let verdict = service(store)
        .redeem_at("EXTRA-0001", &LUNCH_ID, at(12, 0))
        .await;

    let acceptance = verdict.acceptance().expect("extra accepted");
    assert_eq!(acceptance.kind(), VoucherKind::Extra);
    assert_eq!(
        acceptance.subject().user().map(User::id),
        Some(sample_user(BADGE).id())
    );
}

#[rstest]
#[case(None)]
#[case(Some(meal_type(LUNCH_ID, "Lunch", "11:00", "14:00", 15, false)))]
#[tokio::test]
async fn unavailable_meal_type_is_not_found_before_classification(
    #[case] meal: Option<MealType>,
) {
    let mut store = MockRedemptionStore::new();
    store
        .expect_find_meal_type()
        .with(eq(LUNCH_ID))
        .return_once(move |_| Ok(meal));
    store.expect_find_disposable_voucher().never();

    let verdict = service(store)
        .validate_redemption_at(TICKET, &LUNCH_ID, at(12, 0))
        .await;

    assert_rejected(&verdict, RejectionKind::NotFound);
    assert_eq!(
        verdict.rejection().and_then(Rejection::details),
        Some(&json!({ "mealTypeId": LUNCH_ID }))
    );
}

#[rstest]
#[case("")]
#[case("not a code")]
#[case("CODE-THAT-IS-FAR-TOO-LONG-TO-BE-VALID")]
#[tokio::test]
async fn malformed_codes_are_not_found_without_lookups(#[case] raw: &str) {
    let mut store = MockRedemptionStore::new();
    store.expect_find_meal_type().never();

    let verdict = service(store)
        .validate_redemption_at(raw, &LUNCH_ID, at(12, 0))
        .await;

    assert_rejected(&verdict, RejectionKind::NotFound);
}

#[tokio::test]
async fn unknown_code_is_not_found() {
    let service = service(scripted_store(Script::lunch()));

    let verdict = service
        .validate_redemption_at("UNKNOWN-1", &LUNCH_ID, at(12, 0))
        .await;

    assert_rejected(&verdict, RejectionKind::NotFound);
}

#[tokio::test]
async fn store_failure_is_lookup_failed_with_cause() {
    let mut store = MockRedemptionStore::new();
    store
        .expect_find_meal_type()
        .return_once(|_| Ok(Some(lunch())));
    store
        .expect_find_disposable_voucher()
        .return_once(|_| Err(RedemptionStoreError::connection("pool exhausted")));

    let verdict = service(store)
        .validate_redemption_at(TICKET, &LUNCH_ID, at(12, 0))
        .await;

    assert_rejected(&verdict, RejectionKind::LookupFailed);
    let cause = verdict
        .rejection()
        .and_then(Rejection::details)
        .and_then(|details| details.get("cause"))
        .and_then(|cause| cause.as_str())
        .expect("cause recorded");
    assert!(cause.contains("pool exhausted"));
}

#[tokio::test]
async fn driving_port_reads_the_injected_clock() {
    let user = sample_user(BADGE);
    let history = vec![RedemptionRecord::new(
        *user.id(),
        LUNCH_ID,
        utc_at(12, 0) - TimeDelta::minutes(30),
    )];
    let service = service(scripted_store(Script {
        user: Some(user),
        history,
        ..Script::lunch()
    }));
    let port: &dyn VoucherRedemption = &service;

    let verdict = port
        .validate(&RedemptionRequest::new(BADGE, LUNCH_ID))
        .await;

    assert_rejected(&verdict, RejectionKind::TooSoon);
    assert_eq!(
        verdict
            .rejection()
            .and_then(Rejection::details)
            .and_then(|details| details.get("remainingMinutes")),
        Some(&json!(30))
    );
}

#[tokio::test]
async fn interval_elapses_as_the_clock_moves() {
    let store = InMemoryRedemptionStore::new();
    store.insert_meal_type(lunch()).expect("seed meal type");
    store.insert_user(sample_user(BADGE)).expect("seed user");
    let clock = Arc::new(MutableClock::new(local(2026, 6, 10, 12, 0)));
    let service = RedemptionService::new(
        Arc::new(store),
        Arc::clone(&clock) as Arc<dyn Clock>,
        RedemptionPolicy::default(),
    );

    assert!(service.redeem(BADGE, &LUNCH_ID).await.is_accepted());

    clock.advance_minutes(59);
    let early = service.redeem(BADGE, &LUNCH_ID).await;
    assert_rejected(&early, RejectionKind::TooSoon);

    clock.advance_minutes(1);
    assert!(service.redeem(BADGE, &LUNCH_ID).await.is_accepted());
}

#[tokio::test]
async fn validation_is_repeatable() {
    let service = service(scripted_store(Script {
        disposable: Some(lunch_ticket()),
        ..Script::lunch()
    }));
    let first = service
        .validate_redemption_at(TICKET, &LUNCH_ID, at(12, 0))
        .await;
    let second = service
        .validate_redemption_at(TICKET, &LUNCH_ID, at(12, 0))
        .await;

    assert_eq!(first, second);
}
