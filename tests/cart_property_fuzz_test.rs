use proptest::collection::vec;
use proptest::prelude::*;
use proptest::test_runner::{FileFailurePersistence, TestCaseError, TestCaseResult};

use storefront_tester::{
    CartModel, Error, LineItem, MockStore, Money, PRICE_TOLERANCE, StoreSession, compute_subtotal,
    validate_totals,
};

const CART_PROPTEST_REGRESSION_FILE: &str = "tests/proptest-regressions/cart_property_fuzz_test.txt";
const DEFAULT_CART_PROPTEST_CASES: u32 = 192;

fn cart_proptest_cases() -> u32 {
    std::env::var("STOREFRONT_TESTER_PROPTEST_CASES")
        .ok()
        .and_then(|raw| raw.parse::<u32>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_CART_PROPTEST_CASES)
}

#[derive(Clone, Debug)]
enum CartAction {
    Add(usize),
    Remove(usize),
}

fn cart_action_strategy() -> impl Strategy<Value = CartAction> {
    prop_oneof![
        (0usize..6).prop_map(CartAction::Add),
        (0usize..6).prop_map(CartAction::Remove),
    ]
}

fn harness_error(err: Error) -> TestCaseError {
    TestCaseError::fail(format!("{err:?}"))
}

// Replays the same add/remove sequence against the mock storefront and the
// cart model, checking that badge, rows, and totals never diverge, then
// drives the sequence through checkout and re-verifies the rendered summary.
fn assert_store_and_model_agree(actions: &[CartAction]) -> TestCaseResult {
    let mut session = StoreSession::mock();
    session
        .login_as(MockStore::STANDARD_USER, MockStore::PASSWORD)
        .map_err(harness_error)?;
    let names = session.driver().product_names();
    let mut model = CartModel::new();

    for action in actions {
        match action {
            CartAction::Add(index) => {
                let name = &names[index % names.len()];
                let price = session
                    .driver()
                    .unit_price(name)
                    .ok_or_else(|| TestCaseError::fail(format!("no price for {name}")))?;
                session
                    .inventory()
                    .add_to_cart(name)
                    .map_err(harness_error)?;
                model.add(name, price);
            }
            CartAction::Remove(index) => {
                let name = &names[index % names.len()];
                if model.contains(name) {
                    session
                        .inventory()
                        .remove_from_cart(name)
                        .map_err(harness_error)?;
                } else {
                    // An absent item has no remove button, while the model
                    // treats the same removal as a no-op.
                    let result = session.inventory().remove_from_cart(name);
                    prop_assert!(matches!(result, Err(Error::ElementNotFound(_))));
                }
                model.remove(name);
            }
        }
        let badge = session.inventory().badge_count().map_err(harness_error)?;
        prop_assert_eq!(badge, model.unit_count());
    }

    session.inventory().open_cart().map_err(harness_error)?;
    session
        .cart()
        .verify_matches(&model)
        .map_err(harness_error)?;
    session.cart().checkout().map_err(harness_error)?;
    let mut step_one = session.checkout_info();
    step_one
        .fill_info("John", "Doe", "12345")
        .map_err(harness_error)?;
    step_one.continue_to_overview().map_err(harness_error)?;

    let overview = session.checkout_overview();
    overview.verify_matches(&model).map_err(harness_error)?;
    let summary = overview.order_summary().map_err(harness_error)?;
    summary
        .verify_consistent(PRICE_TOLERANCE)
        .map_err(harness_error)?;
    prop_assert_eq!(summary.subtotal, model.expected_subtotal());
    prop_assert!(validate_totals(
        summary.subtotal,
        summary.tax,
        summary.total,
        PRICE_TOLERANCE
    ));
    Ok(())
}

fn assert_single_line_subtotal(cents: i64, quantity: u32) -> TestCaseResult {
    let price = Money::from_cents(cents);
    let item = LineItem::new("Fuzzed Item", price, quantity).map_err(harness_error)?;
    prop_assert_eq!(compute_subtotal(&[item]), price.scale(quantity));
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: cart_proptest_cases(),
        failure_persistence: Some(Box::new(
            FileFailurePersistence::Direct(CART_PROPTEST_REGRESSION_FILE),
        )),
        .. ProptestConfig::default()
    })]

    #[test]
    fn cart_model_and_mock_store_stay_in_agreement(
        actions in vec(cart_action_strategy(), 0..48),
    ) {
        assert_store_and_model_agree(&actions)?;
    }

    #[test]
    fn single_line_subtotal_is_price_times_quantity(
        cents in 0i64..1_000_000,
        quantity in 1u32..100,
    ) {
        assert_single_line_subtotal(cents, quantity)?;
    }
}
