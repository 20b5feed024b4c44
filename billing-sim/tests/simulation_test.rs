mod common;

use billing_sim::config::FixtureConfig;
use billing_sim::simulation::schedule::start_of_day;
use billing_sim::simulation::SubscriptionSimulator;
use chrono::NaiveDate;
use common::{fast_poll, Call, FakeProvider, TEST_CLOCK_ID};
use service_core::error::AppError;

fn anchor() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
}

#[tokio::test]
async fn simulates_a_year_with_one_mid_cycle_upgrade() {
    let provider = FakeProvider::with_catalog();
    let fixtures = FixtureConfig::default();
    let simulator = SubscriptionSimulator::new(&provider, &fixtures, TEST_CLOCK_ID, fast_poll(5));

    let outcome = simulator.run(anchor()).await.expect("simulation failed");

    assert_eq!(outcome.subscription_id, "sub_test");
    assert_eq!(outcome.periods_advanced, 12);
    assert_eq!(outcome.upgraded_on, NaiveDate::from_ymd_opt(2024, 8, 15));

    let calls = provider.calls();
    let advances: Vec<i64> = calls
        .iter()
        .filter_map(|c| match c {
            Call::AdvanceClock { frozen_time } => Some(*frozen_time),
            _ => None,
        })
        .collect();
    // Twelve monthly advances plus the extra mid-period one.
    assert_eq!(advances.len(), 13);
    assert!(advances.windows(2).all(|w| w[0] < w[1]));

    let upgrades: Vec<usize> = calls
        .iter()
        .enumerate()
        .filter(|(_, c)| matches!(c, Call::Upgrade { .. }))
        .map(|(i, _)| i)
        .collect();
    assert_eq!(upgrades.len(), 1);

    // The upgrade follows the day-15 advance and its readiness poll.
    let upgrade_at = start_of_day(NaiveDate::from_ymd_opt(2024, 8, 15).unwrap()).timestamp();
    let before = &calls[..upgrades[0]];
    let last_advance = before
        .iter()
        .rev()
        .find_map(|c| match c {
            Call::AdvanceClock { frozen_time } => Some(*frozen_time),
            _ => None,
        });
    assert_eq!(last_advance, Some(upgrade_at));
    assert_eq!(before.last(), Some(&Call::RetrieveClock));

    assert_eq!(
        calls[upgrades[0]],
        Call::Upgrade {
            item_id: "si_sub_test".to_string(),
            new_price_id: "price_premium".to_string(),
        }
    );
}

#[tokio::test]
async fn subscribes_to_basic_price_with_named_coupon() {
    let provider = FakeProvider::with_catalog();
    let fixtures = FixtureConfig::default();
    let simulator = SubscriptionSimulator::new(&provider, &fixtures, TEST_CLOCK_ID, fast_poll(5));

    simulator.run(anchor()).await.expect("simulation failed");

    let calls = provider.calls();
    assert!(calls.contains(&Call::CreateCustomer {
        email: "yamir@example.com".to_string(),
        test_clock: TEST_CLOCK_ID.to_string(),
    }));
    assert!(calls.contains(&Call::CreateSubscription {
        price_id: "price_basic".to_string(),
        coupon_id: Some("coupon_5off".to_string()),
    }));
}

#[tokio::test]
async fn missing_coupon_fails_before_any_side_effect() {
    let mut provider = FakeProvider::with_catalog();
    provider.coupons.clear();
    let fixtures = FixtureConfig::default();
    let simulator = SubscriptionSimulator::new(&provider, &fixtures, TEST_CLOCK_ID, fast_poll(5));

    let err = simulator.run(anchor()).await.unwrap_err();

    assert!(matches!(err, AppError::LookupNotFound(_)));
    assert_eq!(err.exit_code(), 65);
    assert_eq!(provider.count(|c| matches!(c, Call::CreateCustomer { .. })), 0);
    assert_eq!(provider.count(|c| matches!(c, Call::AdvanceClock { .. })), 0);
}

#[tokio::test]
async fn missing_premium_price_is_a_lookup_error() {
    let mut provider = FakeProvider::with_catalog();
    provider.prices.retain(|p| p.id != "price_premium");
    let fixtures = FixtureConfig::default();
    let simulator = SubscriptionSimulator::new(&provider, &fixtures, TEST_CLOCK_ID, fast_poll(5));

    let err = simulator.run(anchor()).await.unwrap_err();

    match err {
        AppError::LookupNotFound(what) => assert!(what.contains("monthly_crossclip_premium")),
        other => panic!("expected lookup error, got {:?}", other),
    }
}
