use storefront_tester::{
    CartModel, CheckoutInfo, Error, MockStore, Money, Result, SortMode, StoreSession,
    compute_subtotal, selectors, validate_totals, PRICE_TOLERANCE,
};

const BACKPACK: &str = "Alpine Backpack";
const BIKE_LIGHT: &str = "Clip-On Bike Light";
const BOLT_SHIRT: &str = "Bolt Graphic T-Shirt";

fn checkout_info() -> CheckoutInfo {
    CheckoutInfo::new("John", "Doe", "12345")
}

fn logged_in_session() -> Result<StoreSession<MockStore>> {
    let mut session = StoreSession::mock();
    session.login_as(MockStore::STANDARD_USER, MockStore::PASSWORD)?;
    Ok(session)
}

fn add_tracked(
    session: &mut StoreSession<MockStore>,
    model: &mut CartModel,
    name: &str,
) -> Result<()> {
    let price = session
        .driver()
        .unit_price(name)
        .ok_or_else(|| Error::ElementNotFound(format!("catalog entry {name:?}")))?;
    session.inventory().add_to_cart(name)?;
    model.add(name, price);
    Ok(())
}

#[test]
fn complete_purchase_flow_for_standard_user() -> Result<()> {
    let mut session = logged_in_session()?;
    let mut model = CartModel::new();

    session.inventory().verify_loaded()?;
    session.inventory().verify_item_count(6)?;

    add_tracked(&mut session, &mut model, BACKPACK)?;
    add_tracked(&mut session, &mut model, BIKE_LIGHT)?;
    session.inventory().verify_badge_count(2)?;

    session.inventory().open_cart()?;
    let cart = session.cart();
    cart.verify_loaded()?;
    cart.verify_item_count(2)?;
    cart.verify_item_present(BACKPACK)?;
    cart.verify_item_present(BIKE_LIGHT)?;
    session.cart().checkout()?;

    let mut step_one = session.checkout_info();
    step_one.verify_loaded()?;
    step_one.fill_info("John", "Doe", "12345")?;
    step_one.continue_to_overview()?;

    let overview = session.checkout_overview();
    overview.verify_loaded()?;
    overview.verify_item_count(2)?;
    overview.verify_item_present(BACKPACK)?;
    overview.verify_item_present(BIKE_LIGHT)?;
    overview.verify_matches(&model)?;
    overview.verify_price_arithmetic()?;

    let summary = overview.order_summary()?;
    assert_eq!(summary.subtotal, model.expected_subtotal());
    assert!(validate_totals(
        summary.subtotal,
        summary.tax,
        summary.total,
        PRICE_TOLERANCE
    ));
    assert_eq!(compute_subtotal(&summary.items), summary.subtotal);

    session.checkout_overview().finish()?;
    let complete = session.checkout_complete();
    complete.verify_loaded()?;
    complete.verify_order_complete()?;
    session.checkout_complete().back_to_products()?;
    session.inventory().verify_loaded()?;
    session.inventory().verify_badge_count(0)?;
    Ok(())
}

#[test]
fn purchase_flow_via_session_helper() -> Result<()> {
    let mut session = logged_in_session()?;
    let mut model = CartModel::new();
    add_tracked(&mut session, &mut model, BACKPACK)?;
    add_tracked(&mut session, &mut model, BIKE_LIGHT)?;

    let summary = session.complete_purchase(&checkout_info(), &model)?;
    assert_eq!(summary.subtotal, Money::from_cents(39_98));
    assert_eq!(summary.items.len(), 2);
    Ok(())
}

#[test]
fn add_three_items_and_remove_one_before_checkout() -> Result<()> {
    let mut session = logged_in_session()?;
    let mut model = CartModel::new();
    add_tracked(&mut session, &mut model, BACKPACK)?;
    add_tracked(&mut session, &mut model, BIKE_LIGHT)?;
    add_tracked(&mut session, &mut model, BOLT_SHIRT)?;
    session.inventory().verify_badge_count(3)?;

    session.inventory().open_cart()?;
    session.cart().verify_item_count(3)?;
    session.cart().remove(BIKE_LIGHT)?;
    model.remove(BIKE_LIGHT);
    session.cart().verify_item_count(2)?;
    session.cart().verify_matches(&model)?;
    session.cart().checkout()?;

    let mut step_one = session.checkout_info();
    step_one.fill_info("John", "Doe", "12345")?;
    step_one.continue_to_overview()?;
    let overview = session.checkout_overview();
    overview.verify_item_count(2)?;
    overview.verify_matches(&model)?;
    session.checkout_overview().finish()?;
    session.checkout_complete().verify_order_complete()?;
    Ok(())
}

#[test]
fn sort_high_to_low_and_purchase_most_expensive_item() -> Result<()> {
    let mut session = logged_in_session()?;
    let mut inventory = session.inventory();
    inventory.sort_by(SortMode::PriceDescending)?;
    inventory.verify_sorted(SortMode::PriceDescending)?;
    let top = inventory.displayed_names()[0].clone();

    let mut model = CartModel::new();
    add_tracked(&mut session, &mut model, &top)?;
    session.inventory().verify_badge_count(1)?;

    let summary = session.complete_purchase(&checkout_info(), &model)?;
    assert_eq!(summary.subtotal, Money::from_cents(49_99));
    Ok(())
}

#[test]
fn every_sort_mode_verifies_against_displayed_order() -> Result<()> {
    let mut session = logged_in_session()?;
    let mut inventory = session.inventory();
    for mode in SortMode::ALL {
        inventory.sort_by(mode)?;
        inventory.verify_sorted(mode)?;
        inventory.verify_item_count(6)?;
    }
    Ok(())
}

#[test]
fn cancel_checkout_and_continue_shopping() -> Result<()> {
    let mut session = logged_in_session()?;
    let mut model = CartModel::new();
    add_tracked(&mut session, &mut model, BACKPACK)?;
    session.inventory().open_cart()?;
    session.cart().checkout()?;

    session.checkout_info().cancel()?;
    session.cart().verify_loaded()?;

    session.cart().continue_shopping()?;
    session.inventory().verify_loaded()?;
    // The item stays in the cart through the canceled checkout.
    session.inventory().verify_badge_count(1)?;
    Ok(())
}

#[test]
fn locked_out_user_cannot_log_in() -> Result<()> {
    let mut session = StoreSession::mock();
    let mut login = session.login_page();
    login.verify_loaded()?;
    login.login(MockStore::LOCKED_OUT_USER, MockStore::PASSWORD)?;
    login.verify_error("Sorry, this user has been locked out.")?;
    // Still on the login screen.
    login.verify_loaded()?;
    Ok(())
}

#[test]
fn login_validation_reports_missing_fields_and_bad_credentials() -> Result<()> {
    let mut session = StoreSession::mock();
    let mut login = session.login_page();
    login.login("", MockStore::PASSWORD)?;
    login.verify_error("Username is required")?;
    login.login(MockStore::STANDARD_USER, "")?;
    login.verify_error("Password is required")?;
    login.login("nobody", MockStore::PASSWORD)?;
    login.verify_error("Username and password do not match any user in this service")?;
    login.dismiss_error_if_visible()?;
    assert!(login.error_message().is_err());
    Ok(())
}

#[test]
fn checkout_information_requires_every_field() -> Result<()> {
    let mut session = logged_in_session()?;
    let mut model = CartModel::new();
    add_tracked(&mut session, &mut model, BOLT_SHIRT)?;
    session.inventory().open_cart()?;
    session.cart().checkout()?;

    let mut step_one = session.checkout_info();
    step_one.verify_loaded()?;
    step_one.verify_first_name_required()?;
    step_one.verify_last_name_required()?;
    step_one.verify_postal_code_required()?;
    step_one.dismiss_error_if_visible()?;

    step_one.fill_info("John", "Doe", "12345")?;
    step_one.continue_to_overview()?;
    session.checkout_overview().verify_loaded()?;
    Ok(())
}

#[test]
fn skewed_total_fails_price_verification() -> Result<()> {
    let mut session = logged_in_session()?;
    session.driver_mut().set_total_skew(Money::from_cents(2));
    let mut model = CartModel::new();
    add_tracked(&mut session, &mut model, BACKPACK)?;

    let err = session
        .complete_purchase(&checkout_info(), &model)
        .expect_err("a skewed total must fail verification");
    assert!(matches!(
        err,
        Error::AssertionFailed { ref selector, .. } if selector == selectors::TOTAL_LABEL
    ));
    Ok(())
}

#[test]
fn tax_rate_changes_keep_totals_consistent() -> Result<()> {
    let mut session = logged_in_session()?;
    session.driver_mut().set_tax_rate_bps(1_725);
    let mut model = CartModel::new();
    add_tracked(&mut session, &mut model, BACKPACK)?;
    add_tracked(&mut session, &mut model, BOLT_SHIRT)?;

    let summary = session.complete_purchase(&checkout_info(), &model)?;
    // 17.25% of $45.98 rounds to $7.93 at the cent.
    assert_eq!(summary.tax, Money::from_cents(7_93));
    assert_eq!(summary.total, Money::from_cents(53_91));
    Ok(())
}
