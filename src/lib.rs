use std::collections::HashSet;
use std::error::Error as StdError;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Sub};

use fancy_regex::Regex;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    PriceParse(String),
    InvalidLineItem(String),
    ElementNotFound(String),
    AssertionFailed {
        selector: String,
        expected: String,
        actual: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PriceParse(msg) => write!(f, "price parse error: {msg}"),
            Self::InvalidLineItem(msg) => write!(f, "invalid line item: {msg}"),
            Self::ElementNotFound(selector) => write!(f, "element not found: {selector}"),
            Self::AssertionFailed {
                selector,
                expected,
                actual,
            } => write!(
                f,
                "assertion failed for {selector}: expected {expected}, actual {actual}"
            ),
        }
    }
}

impl StdError for Error {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    pub const fn cents(self) -> i64 {
        self.0
    }

    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub fn abs(self) -> Money {
        Money(self.0.saturating_abs())
    }

    pub fn scale(self, quantity: u32) -> Money {
        Money(self.0.saturating_mul(i64::from(quantity)))
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0.saturating_sub(rhs.0))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let magnitude = self.0.unsigned_abs();
        write!(f, "{sign}${}.{:02}", magnitude / 100, magnitude % 100)
    }
}

// Displayed amounts are pre-rounded to two places upstream, so one cent is
// the tightest tolerance that never rejects a legitimately rounded total.
pub const PRICE_TOLERANCE: Money = Money::from_cents(1);

const AMOUNT_PATTERN: &str = r"^(\d+)(?:\.(\d{1,2}))?$";

#[derive(Debug)]
pub struct PriceParser {
    amount: Regex,
}

impl PriceParser {
    pub fn new() -> Result<Self> {
        let amount = Regex::new(AMOUNT_PATTERN)
            .map_err(|err| Error::PriceParse(format!("amount pattern failed to compile: {err}")))?;
        Ok(Self { amount })
    }

    pub fn parse(&self, text: &str) -> Result<Money> {
        self.parse_labeled(text, "$")
    }

    pub fn parse_labeled(&self, text: &str, prefix: &str) -> Result<Money> {
        let rest = text
            .trim()
            .strip_prefix(prefix)
            .ok_or_else(|| Error::PriceParse(format!("expected prefix {prefix:?} in {text:?}")))?
            .trim();
        let captures = self
            .amount
            .captures(rest)
            .map_err(|err| Error::PriceParse(format!("amount match failed: {err}")))?
            .ok_or_else(|| Error::PriceParse(format!("no decimal amount in {text:?}")))?;
        let whole = captures.get(1).map_or("", |group| group.as_str());
        let dollars = whole
            .parse::<i64>()
            .map_err(|_| Error::PriceParse(format!("amount out of range: {text:?}")))?;
        let cents = match captures.get(2) {
            Some(group) => {
                let digits = group.as_str();
                let value = digits
                    .parse::<i64>()
                    .map_err(|_| Error::PriceParse(format!("amount out of range: {text:?}")))?;
                if digits.len() == 1 { value * 10 } else { value }
            }
            None => 0,
        };
        dollars
            .checked_mul(100)
            .and_then(|scaled| scaled.checked_add(cents))
            .map(Money::from_cents)
            .ok_or_else(|| Error::PriceParse(format!("amount out of range: {text:?}")))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    name: String,
    unit_price: Money,
    quantity: u32,
}

impl LineItem {
    pub fn new(name: &str, unit_price: Money, quantity: u32) -> Result<LineItem> {
        if name.trim().is_empty() {
            return Err(Error::InvalidLineItem("name must not be empty".into()));
        }
        if unit_price.is_negative() {
            return Err(Error::InvalidLineItem(format!(
                "negative unit price {unit_price} for {name}"
            )));
        }
        if quantity == 0 {
            return Err(Error::InvalidLineItem(format!("zero quantity for {name}")));
        }
        Ok(LineItem {
            name: name.to_string(),
            unit_price,
            quantity,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unit_price(&self) -> Money {
        self.unit_price
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn line_total(&self) -> Money {
        self.unit_price.scale(self.quantity)
    }
}

pub fn compute_subtotal(items: &[LineItem]) -> Money {
    items.iter().map(LineItem::line_total).sum()
}

pub fn validate_totals(subtotal: Money, tax: Money, total: Money, tolerance: Money) -> bool {
    (total - (subtotal + tax)).abs() < tolerance
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSummary {
    pub items: Vec<LineItem>,
    pub subtotal: Money,
    pub tax: Money,
    pub total: Money,
    pub payment_info: String,
    pub shipping_info: String,
}

impl OrderSummary {
    pub fn verify_consistent(&self, tolerance: Money) -> Result<()> {
        let computed = compute_subtotal(&self.items);
        if (self.subtotal - computed).abs() >= tolerance {
            return Err(Error::AssertionFailed {
                selector: selectors::SUBTOTAL_LABEL.to_string(),
                expected: computed.to_string(),
                actual: self.subtotal.to_string(),
            });
        }
        if !validate_totals(self.subtotal, self.tax, self.total, tolerance) {
            return Err(Error::AssertionFailed {
                selector: selectors::TOTAL_LABEL.to_string(),
                expected: (self.subtotal + self.tax).to_string(),
                actual: self.total.to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortMode {
    NameAscending,
    NameDescending,
    PriceAscending,
    PriceDescending,
}

impl SortMode {
    pub const ALL: [SortMode; 4] = [
        SortMode::NameAscending,
        SortMode::NameDescending,
        SortMode::PriceAscending,
        SortMode::PriceDescending,
    ];

    pub const fn option_value(self) -> &'static str {
        match self {
            SortMode::NameAscending => "az",
            SortMode::NameDescending => "za",
            SortMode::PriceAscending => "lohi",
            SortMode::PriceDescending => "hilo",
        }
    }

    pub fn from_option_value(value: &str) -> Option<SortMode> {
        match value {
            "az" => Some(SortMode::NameAscending),
            "za" => Some(SortMode::NameDescending),
            "lohi" => Some(SortMode::PriceAscending),
            "hilo" => Some(SortMode::PriceDescending),
            _ => None,
        }
    }

    pub const fn is_by_price(self) -> bool {
        matches!(self, SortMode::PriceAscending | SortMode::PriceDescending)
    }
}

#[derive(Debug)]
pub struct SortValidator {
    parser: PriceParser,
}

impl SortValidator {
    pub fn new() -> Result<Self> {
        Ok(Self {
            parser: PriceParser::new()?,
        })
    }

    // Non-strict in every mode: adjacent equal entries are legal because
    // distinct items may share a price.
    pub fn is_sorted(&self, entries: &[String], mode: SortMode) -> Result<bool> {
        match mode {
            SortMode::NameAscending => Ok(entries.windows(2).all(|pair| pair[0] <= pair[1])),
            SortMode::NameDescending => Ok(entries.windows(2).all(|pair| pair[0] >= pair[1])),
            SortMode::PriceAscending | SortMode::PriceDescending => {
                let prices = entries
                    .iter()
                    .map(|entry| self.parser.parse(entry))
                    .collect::<Result<Vec<Money>>>()?;
                if mode == SortMode::PriceAscending {
                    Ok(prices.windows(2).all(|pair| pair[0] <= pair[1]))
                } else {
                    Ok(prices.windows(2).all(|pair| pair[0] >= pair[1]))
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    name: String,
    unit_price: Money,
    quantity: u32,
}

impl CartLine {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unit_price(&self) -> Money {
        self.unit_price
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }
}

#[derive(Debug, Clone, Default)]
pub struct CartModel {
    lines: Vec<CartLine>,
}

impl CartModel {
    pub fn new() -> Self {
        Self::default()
    }

    // The first insertion fixes the unit price; later adds only bump the
    // quantity.
    pub fn add(&mut self, name: &str, unit_price: Money) {
        if let Some(line) = self.lines.iter_mut().find(|line| line.name == name) {
            line.quantity += 1;
        } else {
            self.lines.push(CartLine {
                name: name.to_string(),
                unit_price,
                quantity: 1,
            });
        }
    }

    // Removing an absent name is a no-op, mirroring the idempotent remove
    // button in the UI.
    pub fn remove(&mut self, name: &str) {
        if let Some(index) = self.lines.iter().position(|line| line.name == name) {
            if self.lines[index].quantity > 1 {
                self.lines[index].quantity -= 1;
            } else {
                self.lines.remove(index);
            }
        }
    }

    // Distinct item lines; the cart badge uses unit_count instead.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    // Total units across all lines.
    pub fn unit_count(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    pub fn quantity_of(&self, name: &str) -> u32 {
        self.lines
            .iter()
            .find(|line| line.name == name)
            .map_or(0, |line| line.quantity)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lines.iter().any(|line| line.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn item_names(&self) -> HashSet<&str> {
        self.lines.iter().map(|line| line.name.as_str()).collect()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn line_items(&self) -> Result<Vec<LineItem>> {
        self.lines
            .iter()
            .map(|line| LineItem::new(&line.name, line.unit_price, line.quantity))
            .collect()
    }

    pub fn expected_subtotal(&self) -> Money {
        self.lines
            .iter()
            .map(|line| line.unit_price.scale(line.quantity))
            .sum()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

pub fn item_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_matches('-').to_string()
}

pub mod selectors {
    pub const LOGIN_LOGO: &str = ".login_logo";
    pub const USERNAME: &str = "[data-test=\"username\"]";
    pub const PASSWORD: &str = "[data-test=\"password\"]";
    pub const LOGIN_BUTTON: &str = "[data-test=\"login-button\"]";
    pub const ERROR: &str = "[data-test=\"error\"]";
    pub const ERROR_DISMISS: &str = ".error-button";
    pub const TITLE: &str = ".title";
    pub const MENU_BUTTON: &str = "#menu-btn";
    pub const LOGOUT_LINK: &str = "#logout-link";
    pub const CART_LINK: &str = ".shopping_cart_link";
    pub const CART_BADGE: &str = ".shopping_cart_badge";
    pub const SORT_SELECT: &str = ".product_sort_container";
    pub const INVENTORY_ITEM: &str = ".inventory_item";
    pub const ITEM_NAME: &str = ".inventory_item_name";
    pub const ITEM_PRICE: &str = ".inventory_item_price";
    pub const ITEM_DESC: &str = ".inventory_item_desc";
    pub const CART_ITEM: &str = ".cart_item";
    pub const CART_QUANTITY: &str = ".cart_quantity";
    pub const CHECKOUT_BUTTON: &str = "[data-test=\"checkout\"]";
    pub const CONTINUE_SHOPPING: &str = "[data-test=\"continue-shopping\"]";
    pub const FIRST_NAME: &str = "[data-test=\"firstName\"]";
    pub const LAST_NAME: &str = "[data-test=\"lastName\"]";
    pub const POSTAL_CODE: &str = "[data-test=\"postalCode\"]";
    pub const CONTINUE_BUTTON: &str = "[data-test=\"continue\"]";
    pub const CANCEL_BUTTON: &str = "[data-test=\"cancel\"]";
    pub const FINISH_BUTTON: &str = "[data-test=\"finish\"]";
    pub const PAYMENT_INFO: &str = "[data-test=\"payment-info-value\"]";
    pub const SHIPPING_INFO: &str = "[data-test=\"shipping-info-value\"]";
    pub const SUBTOTAL_LABEL: &str = ".summary_subtotal_label";
    pub const TAX_LABEL: &str = ".summary_tax_label";
    pub const TOTAL_LABEL: &str = ".summary_total_label";
    pub const COMPLETE_HEADER: &str = "[data-test=\"complete-header\"]";
    pub const COMPLETE_TEXT: &str = "[data-test=\"complete-text\"]";
    pub const BACK_TO_PRODUCTS: &str = "[data-test=\"back-to-products\"]";
    pub const DISPATCH_BANNER: &str = ".dispatch_banner";

    pub fn add_to_cart(name: &str) -> String {
        format!("[data-test=\"add-to-cart-{}\"]", super::item_slug(name))
    }

    pub fn remove(name: &str) -> String {
        format!("[data-test=\"remove-{}\"]", super::item_slug(name))
    }
}

pub trait PageDriver {
    fn get_text(&self, selector: &str) -> Result<String>;
    fn texts(&self, selector: &str) -> Vec<String>;
    fn count(&self, selector: &str) -> usize;
    fn is_visible(&self, selector: &str) -> bool;
    fn click(&mut self, selector: &str) -> Result<()>;
    fn fill(&mut self, selector: &str, value: &str) -> Result<()>;
    fn select(&mut self, selector: &str, value: &str) -> Result<()>;

    fn assert_text(&self, selector: &str, expected: &str) -> Result<()> {
        let actual = self.get_text(selector)?;
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: expected.to_string(),
                actual,
            });
        }
        Ok(())
    }

    fn assert_count(&self, selector: &str, expected: usize) -> Result<()> {
        let actual = self.count(selector);
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: expected.to_string(),
                actual: actual.to_string(),
            });
        }
        Ok(())
    }

    fn assert_visible(&self, selector: &str) -> Result<()> {
        if !self.is_visible(selector) {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: "visible element".to_string(),
                actual: "not visible".to_string(),
            });
        }
        Ok(())
    }
}

fn scrape_line_items<D: PageDriver>(driver: &D) -> Result<Vec<LineItem>> {
    let names = driver.texts(selectors::ITEM_NAME);
    let prices = driver.texts(selectors::ITEM_PRICE);
    let quantities = driver.texts(selectors::CART_QUANTITY);
    if names.len() != prices.len() || names.len() != quantities.len() {
        return Err(Error::AssertionFailed {
            selector: selectors::CART_ITEM.to_string(),
            expected: "matching name, price, and quantity rows".to_string(),
            actual: format!(
                "{} names, {} prices, {} quantities",
                names.len(),
                prices.len(),
                quantities.len()
            ),
        });
    }
    let parser = PriceParser::new()?;
    names
        .iter()
        .zip(&prices)
        .zip(&quantities)
        .map(|((name, price), quantity)| {
            let unit_price = parser.parse(price)?;
            let quantity = quantity
                .trim()
                .parse::<u32>()
                .map_err(|_| Error::AssertionFailed {
                    selector: selectors::CART_QUANTITY.to_string(),
                    expected: "integer quantity".to_string(),
                    actual: quantity.clone(),
                })?;
            LineItem::new(name, unit_price, quantity)
        })
        .collect()
}

fn describe_items(items: &[LineItem]) -> String {
    if items.is_empty() {
        return "no items".to_string();
    }
    items
        .iter()
        .map(|item| format!("{}x {} @ {}", item.quantity(), item.name(), item.unit_price()))
        .collect::<Vec<_>>()
        .join(", ")
}

pub struct LoginPage<'d, D: PageDriver> {
    driver: &'d mut D,
}

impl<'d, D: PageDriver> LoginPage<'d, D> {
    pub fn new(driver: &'d mut D) -> Self {
        Self { driver }
    }

    pub fn verify_loaded(&self) -> Result<()> {
        self.driver.assert_visible(selectors::USERNAME)?;
        self.driver.assert_visible(selectors::PASSWORD)?;
        self.driver.assert_visible(selectors::LOGIN_BUTTON)
    }

    pub fn login(&mut self, username: &str, password: &str) -> Result<()> {
        self.driver.fill(selectors::USERNAME, username)?;
        self.driver.fill(selectors::PASSWORD, password)?;
        self.driver.click(selectors::LOGIN_BUTTON)
    }

    pub fn error_message(&self) -> Result<String> {
        self.driver.get_text(selectors::ERROR)
    }

    pub fn verify_error(&self, expected: &str) -> Result<()> {
        self.driver.assert_text(selectors::ERROR, expected)
    }

    pub fn dismiss_error_if_visible(&mut self) -> Result<()> {
        if self.driver.is_visible(selectors::ERROR_DISMISS) {
            self.driver.click(selectors::ERROR_DISMISS)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDetails {
    pub name: String,
    pub price: Money,
    pub description: String,
}

pub struct InventoryPage<'d, D: PageDriver> {
    driver: &'d mut D,
}

impl<'d, D: PageDriver> InventoryPage<'d, D> {
    pub fn new(driver: &'d mut D) -> Self {
        Self { driver }
    }

    pub fn verify_loaded(&self) -> Result<()> {
        self.driver.assert_text(selectors::TITLE, "Products")
    }

    pub fn verify_item_count(&self, expected: usize) -> Result<()> {
        self.driver.assert_count(selectors::INVENTORY_ITEM, expected)
    }

    pub fn add_to_cart(&mut self, name: &str) -> Result<()> {
        self.driver.click(&selectors::add_to_cart(name))
    }

    pub fn remove_from_cart(&mut self, name: &str) -> Result<()> {
        self.driver.click(&selectors::remove(name))
    }

    pub fn badge_count(&self) -> Result<u32> {
        if !self.driver.is_visible(selectors::CART_BADGE) {
            return Ok(0);
        }
        let text = self.driver.get_text(selectors::CART_BADGE)?;
        text.parse::<u32>().map_err(|_| Error::AssertionFailed {
            selector: selectors::CART_BADGE.to_string(),
            expected: "integer badge count".to_string(),
            actual: text,
        })
    }

    pub fn verify_badge_count(&self, expected: u32) -> Result<()> {
        if expected == 0 {
            if self.driver.is_visible(selectors::CART_BADGE) {
                return Err(Error::AssertionFailed {
                    selector: selectors::CART_BADGE.to_string(),
                    expected: "hidden badge".to_string(),
                    actual: self.driver.get_text(selectors::CART_BADGE)?,
                });
            }
            return Ok(());
        }
        self.driver
            .assert_text(selectors::CART_BADGE, &expected.to_string())
    }

    pub fn open_cart(&mut self) -> Result<()> {
        self.driver.click(selectors::CART_LINK)
    }

    pub fn sort_by(&mut self, mode: SortMode) -> Result<()> {
        self.driver
            .select(selectors::SORT_SELECT, mode.option_value())
    }

    pub fn displayed_names(&self) -> Vec<String> {
        self.driver.texts(selectors::ITEM_NAME)
    }

    pub fn displayed_prices(&self) -> Vec<String> {
        self.driver.texts(selectors::ITEM_PRICE)
    }

    pub fn verify_sorted(&self, mode: SortMode) -> Result<()> {
        let (selector, entries) = if mode.is_by_price() {
            (selectors::ITEM_PRICE, self.displayed_prices())
        } else {
            (selectors::ITEM_NAME, self.displayed_names())
        };
        let validator = SortValidator::new()?;
        if !validator.is_sorted(&entries, mode)? {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: format!("{mode:?} ordering"),
                actual: entries.join(" | "),
            });
        }
        Ok(())
    }

    pub fn product_details(&self, name: &str) -> Result<ProductDetails> {
        let names = self.displayed_names();
        let index = names.iter().position(|n| n == name).ok_or_else(|| {
            Error::ElementNotFound(format!("{} with text {name:?}", selectors::ITEM_NAME))
        })?;
        let prices = self.displayed_prices();
        let price_text = prices.get(index).ok_or_else(|| {
            Error::ElementNotFound(format!("{} for {name:?}", selectors::ITEM_PRICE))
        })?;
        let descriptions = self.driver.texts(selectors::ITEM_DESC);
        let description = descriptions.get(index).cloned().unwrap_or_default();
        let parser = PriceParser::new()?;
        Ok(ProductDetails {
            name: name.to_string(),
            price: parser.parse(price_text)?,
            description,
        })
    }

    pub fn logout(&mut self) -> Result<()> {
        self.driver.click(selectors::MENU_BUTTON)?;
        self.driver.click(selectors::LOGOUT_LINK)
    }
}

pub struct CartPage<'d, D: PageDriver> {
    driver: &'d mut D,
}

impl<'d, D: PageDriver> CartPage<'d, D> {
    pub fn new(driver: &'d mut D) -> Self {
        Self { driver }
    }

    pub fn verify_loaded(&self) -> Result<()> {
        self.driver.assert_text(selectors::TITLE, "Your Cart")
    }

    pub fn item_count(&self) -> usize {
        self.driver.count(selectors::CART_ITEM)
    }

    pub fn verify_item_count(&self, expected: usize) -> Result<()> {
        self.driver.assert_count(selectors::CART_ITEM, expected)
    }

    pub fn verify_empty(&self) -> Result<()> {
        self.verify_item_count(0)
    }

    pub fn verify_item_present(&self, name: &str) -> Result<()> {
        let names = self.driver.texts(selectors::ITEM_NAME);
        if !names.iter().any(|n| n == name) {
            return Err(Error::AssertionFailed {
                selector: selectors::ITEM_NAME.to_string(),
                expected: name.to_string(),
                actual: names.join(" | "),
            });
        }
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Result<()> {
        self.driver.click(&selectors::remove(name))
    }

    pub fn quantity_of(&self, name: &str) -> Result<u32> {
        let items = self.line_items()?;
        items
            .iter()
            .find(|item| item.name() == name)
            .map(LineItem::quantity)
            .ok_or_else(|| {
                Error::ElementNotFound(format!("{} with text {name:?}", selectors::ITEM_NAME))
            })
    }

    pub fn price_of(&self, name: &str) -> Result<Money> {
        let items = self.line_items()?;
        items
            .iter()
            .find(|item| item.name() == name)
            .map(LineItem::unit_price)
            .ok_or_else(|| {
                Error::ElementNotFound(format!("{} with text {name:?}", selectors::ITEM_NAME))
            })
    }

    pub fn line_items(&self) -> Result<Vec<LineItem>> {
        scrape_line_items(&*self.driver)
    }

    pub fn verify_matches(&self, model: &CartModel) -> Result<()> {
        self.verify_item_count(model.line_count())?;
        let actual = self.line_items()?;
        let expected = model.line_items()?;
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selectors::CART_ITEM.to_string(),
                expected: describe_items(&expected),
                actual: describe_items(&actual),
            });
        }
        Ok(())
    }

    pub fn checkout(&mut self) -> Result<()> {
        self.driver.click(selectors::CHECKOUT_BUTTON)
    }

    pub fn continue_shopping(&mut self) -> Result<()> {
        self.driver.click(selectors::CONTINUE_SHOPPING)
    }
}

pub struct CheckoutStepOnePage<'d, D: PageDriver> {
    driver: &'d mut D,
}

impl<'d, D: PageDriver> CheckoutStepOnePage<'d, D> {
    pub fn new(driver: &'d mut D) -> Self {
        Self { driver }
    }

    pub fn verify_loaded(&self) -> Result<()> {
        self.driver
            .assert_text(selectors::TITLE, "Checkout: Your Information")?;
        self.driver.assert_visible(selectors::FIRST_NAME)?;
        self.driver.assert_visible(selectors::LAST_NAME)?;
        self.driver.assert_visible(selectors::POSTAL_CODE)
    }

    pub fn fill_info(
        &mut self,
        first_name: &str,
        last_name: &str,
        postal_code: &str,
    ) -> Result<()> {
        self.driver.fill(selectors::FIRST_NAME, first_name)?;
        self.driver.fill(selectors::LAST_NAME, last_name)?;
        self.driver.fill(selectors::POSTAL_CODE, postal_code)
    }

    pub fn clear_form(&mut self) -> Result<()> {
        self.fill_info("", "", "")
    }

    pub fn continue_to_overview(&mut self) -> Result<()> {
        self.driver.click(selectors::CONTINUE_BUTTON)
    }

    pub fn cancel(&mut self) -> Result<()> {
        self.driver.click(selectors::CANCEL_BUTTON)
    }

    pub fn error_message(&self) -> Result<String> {
        self.driver.get_text(selectors::ERROR)
    }

    pub fn verify_error(&self, expected: &str) -> Result<()> {
        self.driver.assert_text(selectors::ERROR, expected)
    }

    pub fn dismiss_error_if_visible(&mut self) -> Result<()> {
        if self.driver.is_visible(selectors::ERROR_DISMISS) {
            self.driver.click(selectors::ERROR_DISMISS)?;
        }
        Ok(())
    }

    pub fn verify_first_name_required(&mut self) -> Result<()> {
        self.clear_form()?;
        self.driver.fill(selectors::LAST_NAME, "Doe")?;
        self.driver.fill(selectors::POSTAL_CODE, "12345")?;
        self.continue_to_overview()?;
        self.verify_error("Error: First Name is required")
    }

    pub fn verify_last_name_required(&mut self) -> Result<()> {
        self.clear_form()?;
        self.driver.fill(selectors::FIRST_NAME, "John")?;
        self.driver.fill(selectors::POSTAL_CODE, "12345")?;
        self.continue_to_overview()?;
        self.verify_error("Error: Last Name is required")
    }

    pub fn verify_postal_code_required(&mut self) -> Result<()> {
        self.clear_form()?;
        self.driver.fill(selectors::FIRST_NAME, "John")?;
        self.driver.fill(selectors::LAST_NAME, "Doe")?;
        self.continue_to_overview()?;
        self.verify_error("Error: Postal Code is required")
    }
}

pub struct CheckoutStepTwoPage<'d, D: PageDriver> {
    driver: &'d mut D,
}

impl<'d, D: PageDriver> CheckoutStepTwoPage<'d, D> {
    pub fn new(driver: &'d mut D) -> Self {
        Self { driver }
    }

    pub fn verify_loaded(&self) -> Result<()> {
        self.driver
            .assert_text(selectors::TITLE, "Checkout: Overview")?;
        self.driver.assert_visible(selectors::PAYMENT_INFO)?;
        self.driver.assert_visible(selectors::SHIPPING_INFO)?;
        self.driver.assert_visible(selectors::FINISH_BUTTON)
    }

    pub fn item_count(&self) -> usize {
        self.driver.count(selectors::CART_ITEM)
    }

    pub fn verify_item_count(&self, expected: usize) -> Result<()> {
        self.driver.assert_count(selectors::CART_ITEM, expected)
    }

    pub fn verify_item_present(&self, name: &str) -> Result<()> {
        let names = self.driver.texts(selectors::ITEM_NAME);
        if !names.iter().any(|n| n == name) {
            return Err(Error::AssertionFailed {
                selector: selectors::ITEM_NAME.to_string(),
                expected: name.to_string(),
                actual: names.join(" | "),
            });
        }
        Ok(())
    }

    pub fn line_items(&self) -> Result<Vec<LineItem>> {
        scrape_line_items(&*self.driver)
    }

    pub fn subtotal(&self) -> Result<Money> {
        let parser = PriceParser::new()?;
        let text = self.driver.get_text(selectors::SUBTOTAL_LABEL)?;
        parser.parse_labeled(&text, "Item total: $")
    }

    pub fn tax(&self) -> Result<Money> {
        let parser = PriceParser::new()?;
        let text = self.driver.get_text(selectors::TAX_LABEL)?;
        parser.parse_labeled(&text, "Tax: $")
    }

    pub fn total(&self) -> Result<Money> {
        let parser = PriceParser::new()?;
        let text = self.driver.get_text(selectors::TOTAL_LABEL)?;
        parser.parse_labeled(&text, "Total: $")
    }

    pub fn payment_info(&self) -> Result<String> {
        self.driver.get_text(selectors::PAYMENT_INFO)
    }

    pub fn shipping_info(&self) -> Result<String> {
        self.driver.get_text(selectors::SHIPPING_INFO)
    }

    pub fn order_summary(&self) -> Result<OrderSummary> {
        Ok(OrderSummary {
            items: self.line_items()?,
            subtotal: self.subtotal()?,
            tax: self.tax()?,
            total: self.total()?,
            payment_info: self.payment_info()?,
            shipping_info: self.shipping_info()?,
        })
    }

    pub fn verify_price_arithmetic(&self) -> Result<()> {
        self.order_summary()?.verify_consistent(PRICE_TOLERANCE)
    }

    pub fn verify_matches(&self, model: &CartModel) -> Result<()> {
        self.verify_item_count(model.line_count())?;
        let actual = self.line_items()?;
        let expected = model.line_items()?;
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selectors::CART_ITEM.to_string(),
                expected: describe_items(&expected),
                actual: describe_items(&actual),
            });
        }
        let displayed = self.subtotal()?;
        let recomputed = model.expected_subtotal();
        if (displayed - recomputed).abs() >= PRICE_TOLERANCE {
            return Err(Error::AssertionFailed {
                selector: selectors::SUBTOTAL_LABEL.to_string(),
                expected: recomputed.to_string(),
                actual: displayed.to_string(),
            });
        }
        Ok(())
    }

    pub fn finish(&mut self) -> Result<()> {
        self.driver.click(selectors::FINISH_BUTTON)
    }

    pub fn cancel(&mut self) -> Result<()> {
        self.driver.click(selectors::CANCEL_BUTTON)
    }
}

pub struct CheckoutCompletePage<'d, D: PageDriver> {
    driver: &'d mut D,
}

impl<'d, D: PageDriver> CheckoutCompletePage<'d, D> {
    pub fn new(driver: &'d mut D) -> Self {
        Self { driver }
    }

    pub fn verify_loaded(&self) -> Result<()> {
        self.driver
            .assert_text(selectors::TITLE, "Checkout: Complete!")?;
        self.driver.assert_visible(selectors::COMPLETE_HEADER)?;
        self.driver.assert_visible(selectors::COMPLETE_TEXT)?;
        self.driver.assert_visible(selectors::BACK_TO_PRODUCTS)
    }

    pub fn verify_order_complete(&self) -> Result<()> {
        self.driver
            .assert_text(selectors::COMPLETE_HEADER, "Thank you for your order!")?;
        let text = self.driver.get_text(selectors::COMPLETE_TEXT)?;
        if !text.contains("dispatched") {
            return Err(Error::AssertionFailed {
                selector: selectors::COMPLETE_TEXT.to_string(),
                expected: "dispatch confirmation".to_string(),
                actual: text,
            });
        }
        self.driver.assert_visible(selectors::DISPATCH_BANNER)
    }

    pub fn header_text(&self) -> Result<String> {
        self.driver.get_text(selectors::COMPLETE_HEADER)
    }

    pub fn complete_text(&self) -> Result<String> {
        self.driver.get_text(selectors::COMPLETE_TEXT)
    }

    pub fn back_to_products(&mut self) -> Result<()> {
        self.driver.click(selectors::BACK_TO_PRODUCTS)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutInfo {
    pub first_name: String,
    pub last_name: String,
    pub postal_code: String,
}

impl CheckoutInfo {
    pub fn new(first_name: &str, last_name: &str, postal_code: &str) -> Self {
        Self {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            postal_code: postal_code.to_string(),
        }
    }
}

pub struct StoreSession<D: PageDriver> {
    driver: D,
}

impl StoreSession<MockStore> {
    pub fn mock() -> Self {
        Self::new(MockStore::new())
    }
}

impl<D: PageDriver> StoreSession<D> {
    pub fn new(driver: D) -> Self {
        Self { driver }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    pub fn login_page(&mut self) -> LoginPage<'_, D> {
        LoginPage::new(&mut self.driver)
    }

    pub fn inventory(&mut self) -> InventoryPage<'_, D> {
        InventoryPage::new(&mut self.driver)
    }

    pub fn cart(&mut self) -> CartPage<'_, D> {
        CartPage::new(&mut self.driver)
    }

    pub fn checkout_info(&mut self) -> CheckoutStepOnePage<'_, D> {
        CheckoutStepOnePage::new(&mut self.driver)
    }

    pub fn checkout_overview(&mut self) -> CheckoutStepTwoPage<'_, D> {
        CheckoutStepTwoPage::new(&mut self.driver)
    }

    pub fn checkout_complete(&mut self) -> CheckoutCompletePage<'_, D> {
        CheckoutCompletePage::new(&mut self.driver)
    }

    pub fn login_as(&mut self, username: &str, password: &str) -> Result<()> {
        let mut login = self.login_page();
        login.verify_loaded()?;
        login.login(username, password)?;
        self.inventory().verify_loaded()
    }

    // Walks cart review, information, overview, and confirmation, verifying
    // the displayed state against the caller's cart model at each step.
    pub fn complete_purchase(
        &mut self,
        info: &CheckoutInfo,
        expected: &CartModel,
    ) -> Result<OrderSummary> {
        self.inventory().open_cart()?;
        let mut cart = self.cart();
        cart.verify_loaded()?;
        cart.verify_matches(expected)?;
        cart.checkout()?;
        let mut step_one = self.checkout_info();
        step_one.verify_loaded()?;
        step_one.fill_info(&info.first_name, &info.last_name, &info.postal_code)?;
        step_one.continue_to_overview()?;
        let mut overview = self.checkout_overview();
        overview.verify_loaded()?;
        overview.verify_matches(expected)?;
        overview.verify_price_arithmetic()?;
        let summary = overview.order_summary()?;
        overview.finish()?;
        let complete = self.checkout_complete();
        complete.verify_loaded()?;
        complete.verify_order_complete()?;
        Ok(summary)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Login,
    Inventory,
    Cart,
    CheckoutInfo,
    CheckoutOverview,
    CheckoutComplete,
}

#[derive(Debug, Clone)]
struct Product {
    name: String,
    price: Money,
    description: String,
}

#[derive(Debug, Clone)]
struct StoreCartEntry {
    name: String,
    quantity: u32,
}

const STORE_NAME: &str = "Demo Outfitters";
const PAYMENT_INFO_TEXT: &str = "DemoPay Voucher #0042";
const SHIPPING_INFO_TEXT: &str = "Standard Overnight Courier";
const COMPLETE_TEXT_COPY: &str = "Your order has been dispatched and will arrive shortly.";

fn default_catalog() -> Vec<Product> {
    [
        (
            "Alpine Backpack",
            29_99,
            "Rugged 28-liter pack with a padded laptop sleeve.",
        ),
        (
            "Clip-On Bike Light",
            9_99,
            "Water-resistant LED light with three blink modes.",
        ),
        (
            "Bolt Graphic T-Shirt",
            15_99,
            "Soft cotton tee with a bolt print.",
        ),
        (
            "Fleece Hooded Jacket",
            49_99,
            "Midweight fleece with zip pockets.",
        ),
        (
            "Cotton Onesie",
            7_99,
            "Snap-closure onesie in organic cotton.",
        ),
        (
            "Retro Logo T-Shirt (Red)",
            15_99,
            "Throwback logo tee in faded red.",
        ),
    ]
    .into_iter()
    .map(|(name, cents, description)| Product {
        name: name.to_string(),
        price: Money::from_cents(cents),
        description: description.to_string(),
    })
    .collect()
}

fn data_test_slug<'s>(selector: &'s str, action: &str) -> Option<&'s str> {
    selector
        .strip_prefix("[data-test=\"")
        .and_then(|rest| rest.strip_suffix("\"]"))
        .and_then(|rest| rest.strip_prefix(action))
}

#[derive(Debug, Clone)]
pub struct MockStore {
    screen: Screen,
    catalog: Vec<Product>,
    cart: Vec<StoreCartEntry>,
    sort_mode: SortMode,
    menu_open: bool,
    error: Option<String>,
    form_username: String,
    form_password: String,
    form_first: String,
    form_last: String,
    form_postal: String,
    tax_rate_bps: u32,
    total_skew: Money,
}

impl MockStore {
    pub const STANDARD_USER: &'static str = "standard_user";
    pub const LOCKED_OUT_USER: &'static str = "locked_out_user";
    pub const PASSWORD: &'static str = "swordfish-77";

    const KNOWN_USERS: [&'static str; 2] = [Self::STANDARD_USER, Self::LOCKED_OUT_USER];

    pub fn new() -> Self {
        Self {
            screen: Screen::Login,
            catalog: default_catalog(),
            cart: Vec::new(),
            sort_mode: SortMode::NameAscending,
            menu_open: false,
            error: None,
            form_username: String::new(),
            form_password: String::new(),
            form_first: String::new(),
            form_last: String::new(),
            form_postal: String::new(),
            tax_rate_bps: 800,
            total_skew: Money::ZERO,
        }
    }

    pub fn product_names(&self) -> Vec<String> {
        self.catalog
            .iter()
            .map(|product| product.name.clone())
            .collect()
    }

    pub fn unit_price(&self, name: &str) -> Option<Money> {
        self.catalog
            .iter()
            .find(|product| product.name == name)
            .map(|product| product.price)
    }

    pub fn set_tax_rate_bps(&mut self, rate: u32) {
        self.tax_rate_bps = rate;
    }

    // Offsets the rendered grand total without touching the item rows, so
    // tests can prove the verifier rejects inconsistent arithmetic.
    pub fn set_total_skew(&mut self, skew: Money) {
        self.total_skew = skew;
    }

    fn title(&self) -> Option<&'static str> {
        match self.screen {
            Screen::Login => None,
            Screen::Inventory => Some("Products"),
            Screen::Cart => Some("Your Cart"),
            Screen::CheckoutInfo => Some("Checkout: Your Information"),
            Screen::CheckoutOverview => Some("Checkout: Overview"),
            Screen::CheckoutComplete => Some("Checkout: Complete!"),
        }
    }

    fn cart_units(&self) -> u32 {
        self.cart.iter().map(|entry| entry.quantity).sum()
    }

    // Entries only ever originate from the catalog, so the price lookup
    // cannot miss.
    fn cart_rows(&self) -> Vec<(&str, Money, u32)> {
        self.cart
            .iter()
            .filter_map(|entry| {
                self.catalog
                    .iter()
                    .find(|product| product.name == entry.name)
                    .map(|product| (entry.name.as_str(), product.price, entry.quantity))
            })
            .collect()
    }

    fn sorted_catalog(&self) -> Vec<&Product> {
        let mut items: Vec<&Product> = self.catalog.iter().collect();
        match self.sort_mode {
            SortMode::NameAscending => items.sort_by(|a, b| a.name.cmp(&b.name)),
            SortMode::NameDescending => items.sort_by(|a, b| b.name.cmp(&a.name)),
            SortMode::PriceAscending => items.sort_by(|a, b| a.price.cmp(&b.price)),
            SortMode::PriceDescending => items.sort_by(|a, b| b.price.cmp(&a.price)),
        }
        items
    }

    fn product_by_slug(&self, slug: &str) -> Option<&Product> {
        self.catalog
            .iter()
            .find(|product| item_slug(&product.name) == slug)
    }

    fn cart_entry_by_slug(&self, slug: &str) -> Option<&StoreCartEntry> {
        self.cart
            .iter()
            .find(|entry| item_slug(&entry.name) == slug)
    }

    fn order_subtotal(&self) -> Money {
        self.cart_rows()
            .iter()
            .map(|(_, price, quantity)| price.scale(*quantity))
            .sum()
    }

    fn order_tax(&self) -> Money {
        let subtotal = self.order_subtotal();
        // Half-up rounding at the cent, the same boundary the display uses.
        Money::from_cents((subtotal.cents() * i64::from(self.tax_rate_bps) + 5_000) / 10_000)
    }

    fn order_total(&self) -> Money {
        self.order_subtotal() + self.order_tax() + self.total_skew
    }

    fn add_to_cart(&mut self, name: &str) {
        if let Some(entry) = self.cart.iter_mut().find(|entry| entry.name == name) {
            entry.quantity += 1;
        } else {
            self.cart.push(StoreCartEntry {
                name: name.to_string(),
                quantity: 1,
            });
        }
    }

    fn remove_from_cart_by_slug(&mut self, slug: &str) -> bool {
        if let Some(index) = self
            .cart
            .iter()
            .position(|entry| item_slug(&entry.name) == slug)
        {
            if self.cart[index].quantity > 1 {
                self.cart[index].quantity -= 1;
            } else {
                self.cart.remove(index);
            }
            return true;
        }
        false
    }

    fn attempt_login(&mut self) {
        let username = self.form_username.trim().to_string();
        let password = self.form_password.clone();
        self.error = None;
        if username.is_empty() {
            self.error = Some("Username is required".to_string());
            return;
        }
        if password.is_empty() {
            self.error = Some("Password is required".to_string());
            return;
        }
        if password != Self::PASSWORD || !Self::KNOWN_USERS.contains(&username.as_str()) {
            self.error =
                Some("Username and password do not match any user in this service".to_string());
            return;
        }
        if username == Self::LOCKED_OUT_USER {
            self.error = Some("Sorry, this user has been locked out.".to_string());
            return;
        }
        self.form_username.clear();
        self.form_password.clear();
        self.screen = Screen::Inventory;
    }

    fn submit_checkout_info(&mut self) {
        self.error = None;
        if self.form_first.trim().is_empty() {
            self.error = Some("Error: First Name is required".to_string());
            return;
        }
        if self.form_last.trim().is_empty() {
            self.error = Some("Error: Last Name is required".to_string());
            return;
        }
        if self.form_postal.trim().is_empty() {
            self.error = Some("Error: Postal Code is required".to_string());
            return;
        }
        self.screen = Screen::CheckoutOverview;
    }

    fn finish_order(&mut self) {
        self.cart.clear();
        self.form_first.clear();
        self.form_last.clear();
        self.form_postal.clear();
        self.screen = Screen::CheckoutComplete;
    }

    // The cart survives logout; only the session fields reset.
    fn logout(&mut self) {
        self.menu_open = false;
        self.error = None;
        self.form_username.clear();
        self.form_password.clear();
        self.screen = Screen::Login;
    }

    fn lookup(&self, selector: &str) -> Vec<String> {
        if let Some(texts) = self.chrome_lookup(selector) {
            return texts;
        }
        match self.screen {
            Screen::Login => self.login_lookup(selector),
            Screen::Inventory => self.inventory_lookup(selector),
            Screen::Cart => self.cart_lookup(selector),
            Screen::CheckoutInfo => self.checkout_info_lookup(selector),
            Screen::CheckoutOverview => self.overview_lookup(selector),
            Screen::CheckoutComplete => self.complete_lookup(selector),
        }
    }

    fn chrome_lookup(&self, selector: &str) -> Option<Vec<String>> {
        if self.screen == Screen::Login {
            return None;
        }
        match selector {
            selectors::TITLE => self.title().map(|title| vec![title.to_string()]),
            selectors::CART_LINK => Some(vec!["Cart".to_string()]),
            selectors::CART_BADGE => {
                let units = self.cart_units();
                if units > 0 {
                    Some(vec![units.to_string()])
                } else {
                    Some(Vec::new())
                }
            }
            selectors::MENU_BUTTON => Some(vec!["Menu".to_string()]),
            selectors::LOGOUT_LINK => {
                if self.menu_open {
                    Some(vec!["Logout".to_string()])
                } else {
                    Some(Vec::new())
                }
            }
            _ => None,
        }
    }

    fn error_lookup(&self, selector: &str) -> Option<Vec<String>> {
        match selector {
            selectors::ERROR => Some(self.error.iter().cloned().collect()),
            selectors::ERROR_DISMISS => Some(self.error.iter().map(|_| "x".to_string()).collect()),
            _ => None,
        }
    }

    fn login_lookup(&self, selector: &str) -> Vec<String> {
        if let Some(texts) = self.error_lookup(selector) {
            return texts;
        }
        match selector {
            selectors::LOGIN_LOGO => vec![STORE_NAME.to_string()],
            selectors::USERNAME => vec![self.form_username.clone()],
            selectors::PASSWORD => vec![self.form_password.clone()],
            selectors::LOGIN_BUTTON => vec!["Login".to_string()],
            _ => Vec::new(),
        }
    }

    fn inventory_lookup(&self, selector: &str) -> Vec<String> {
        let items = self.sorted_catalog();
        match selector {
            selectors::SORT_SELECT => vec![self.sort_mode.option_value().to_string()],
            selectors::INVENTORY_ITEM | selectors::ITEM_NAME => {
                items.iter().map(|product| product.name.clone()).collect()
            }
            selectors::ITEM_PRICE => items
                .iter()
                .map(|product| product.price.to_string())
                .collect(),
            selectors::ITEM_DESC => items
                .iter()
                .map(|product| product.description.clone())
                .collect(),
            other => self.product_button_lookup(other, true),
        }
    }

    fn product_button_lookup(&self, selector: &str, with_add: bool) -> Vec<String> {
        if with_add {
            if let Some(slug) = data_test_slug(selector, "add-to-cart-") {
                if self.product_by_slug(slug).is_some() {
                    return vec!["Add to cart".to_string()];
                }
            }
        }
        if let Some(slug) = data_test_slug(selector, "remove-") {
            if self.cart_entry_by_slug(slug).is_some() {
                return vec!["Remove".to_string()];
            }
        }
        Vec::new()
    }

    fn cart_lookup(&self, selector: &str) -> Vec<String> {
        let rows = self.cart_rows();
        match selector {
            selectors::CART_ITEM | selectors::ITEM_NAME => {
                rows.iter().map(|(name, _, _)| name.to_string()).collect()
            }
            selectors::ITEM_PRICE => rows
                .iter()
                .map(|(_, price, _)| price.to_string())
                .collect(),
            selectors::CART_QUANTITY => rows
                .iter()
                .map(|(_, _, quantity)| quantity.to_string())
                .collect(),
            selectors::CHECKOUT_BUTTON => vec!["Checkout".to_string()],
            selectors::CONTINUE_SHOPPING => vec!["Continue Shopping".to_string()],
            other => self.product_button_lookup(other, false),
        }
    }

    fn checkout_info_lookup(&self, selector: &str) -> Vec<String> {
        if let Some(texts) = self.error_lookup(selector) {
            return texts;
        }
        match selector {
            selectors::FIRST_NAME => vec![self.form_first.clone()],
            selectors::LAST_NAME => vec![self.form_last.clone()],
            selectors::POSTAL_CODE => vec![self.form_postal.clone()],
            selectors::CONTINUE_BUTTON => vec!["Continue".to_string()],
            selectors::CANCEL_BUTTON => vec!["Cancel".to_string()],
            _ => Vec::new(),
        }
    }

    fn overview_lookup(&self, selector: &str) -> Vec<String> {
        let rows = self.cart_rows();
        match selector {
            selectors::CART_ITEM | selectors::ITEM_NAME => {
                rows.iter().map(|(name, _, _)| name.to_string()).collect()
            }
            selectors::ITEM_PRICE => rows
                .iter()
                .map(|(_, price, _)| price.to_string())
                .collect(),
            selectors::CART_QUANTITY => rows
                .iter()
                .map(|(_, _, quantity)| quantity.to_string())
                .collect(),
            selectors::PAYMENT_INFO => vec![PAYMENT_INFO_TEXT.to_string()],
            selectors::SHIPPING_INFO => vec![SHIPPING_INFO_TEXT.to_string()],
            selectors::SUBTOTAL_LABEL => {
                vec![format!("Item total: {}", self.order_subtotal())]
            }
            selectors::TAX_LABEL => vec![format!("Tax: {}", self.order_tax())],
            selectors::TOTAL_LABEL => vec![format!("Total: {}", self.order_total())],
            selectors::FINISH_BUTTON => vec!["Finish".to_string()],
            selectors::CANCEL_BUTTON => vec!["Cancel".to_string()],
            _ => Vec::new(),
        }
    }

    fn complete_lookup(&self, selector: &str) -> Vec<String> {
        match selector {
            selectors::COMPLETE_HEADER => vec!["Thank you for your order!".to_string()],
            selectors::COMPLETE_TEXT => vec![COMPLETE_TEXT_COPY.to_string()],
            selectors::BACK_TO_PRODUCTS => vec!["Back Home".to_string()],
            selectors::DISPATCH_BANNER => vec![String::new()],
            _ => Vec::new(),
        }
    }

    fn click_login(&mut self, selector: &str) -> Result<()> {
        match selector {
            selectors::LOGIN_BUTTON => {
                self.attempt_login();
                Ok(())
            }
            selectors::ERROR_DISMISS if self.error.is_some() => {
                self.error = None;
                Ok(())
            }
            other => Err(Error::ElementNotFound(other.to_string())),
        }
    }

    fn click_inventory(&mut self, selector: &str) -> Result<()> {
        match selector {
            selectors::CART_LINK => {
                self.menu_open = false;
                self.screen = Screen::Cart;
                Ok(())
            }
            selectors::MENU_BUTTON => {
                self.menu_open = true;
                Ok(())
            }
            selectors::LOGOUT_LINK if self.menu_open => {
                self.logout();
                Ok(())
            }
            other => self.click_product_button(other, true),
        }
    }

    fn click_product_button(&mut self, selector: &str, with_add: bool) -> Result<()> {
        if with_add {
            if let Some(slug) = data_test_slug(selector, "add-to-cart-") {
                let name = self
                    .product_by_slug(slug)
                    .map(|product| product.name.clone());
                if let Some(name) = name {
                    self.add_to_cart(&name);
                    return Ok(());
                }
            }
        }
        if let Some(slug) = data_test_slug(selector, "remove-") {
            if self.remove_from_cart_by_slug(slug) {
                return Ok(());
            }
        }
        Err(Error::ElementNotFound(selector.to_string()))
    }

    fn click_cart(&mut self, selector: &str) -> Result<()> {
        match selector {
            selectors::CART_LINK => Ok(()),
            selectors::CHECKOUT_BUTTON => {
                self.error = None;
                self.screen = Screen::CheckoutInfo;
                Ok(())
            }
            selectors::CONTINUE_SHOPPING => {
                self.screen = Screen::Inventory;
                Ok(())
            }
            other => self.click_product_button(other, false),
        }
    }

    fn click_checkout_info(&mut self, selector: &str) -> Result<()> {
        match selector {
            selectors::CONTINUE_BUTTON => {
                self.submit_checkout_info();
                Ok(())
            }
            selectors::CANCEL_BUTTON => {
                self.error = None;
                self.screen = Screen::Cart;
                Ok(())
            }
            selectors::ERROR_DISMISS if self.error.is_some() => {
                self.error = None;
                Ok(())
            }
            other => Err(Error::ElementNotFound(other.to_string())),
        }
    }

    fn click_overview(&mut self, selector: &str) -> Result<()> {
        match selector {
            selectors::FINISH_BUTTON => {
                self.finish_order();
                Ok(())
            }
            selectors::CANCEL_BUTTON => {
                self.screen = Screen::Inventory;
                Ok(())
            }
            other => Err(Error::ElementNotFound(other.to_string())),
        }
    }

    fn click_complete(&mut self, selector: &str) -> Result<()> {
        match selector {
            selectors::BACK_TO_PRODUCTS => {
                self.screen = Screen::Inventory;
                Ok(())
            }
            other => Err(Error::ElementNotFound(other.to_string())),
        }
    }
}

impl Default for MockStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PageDriver for MockStore {
    fn get_text(&self, selector: &str) -> Result<String> {
        self.lookup(selector)
            .into_iter()
            .next()
            .ok_or_else(|| Error::ElementNotFound(selector.to_string()))
    }

    fn texts(&self, selector: &str) -> Vec<String> {
        self.lookup(selector)
    }

    fn count(&self, selector: &str) -> usize {
        self.lookup(selector).len()
    }

    fn is_visible(&self, selector: &str) -> bool {
        !self.lookup(selector).is_empty()
    }

    fn click(&mut self, selector: &str) -> Result<()> {
        match self.screen {
            Screen::Login => self.click_login(selector),
            Screen::Inventory => self.click_inventory(selector),
            Screen::Cart => self.click_cart(selector),
            Screen::CheckoutInfo => self.click_checkout_info(selector),
            Screen::CheckoutOverview => self.click_overview(selector),
            Screen::CheckoutComplete => self.click_complete(selector),
        }
    }

    fn fill(&mut self, selector: &str, value: &str) -> Result<()> {
        match (self.screen, selector) {
            (Screen::Login, selectors::USERNAME) => {
                self.form_username = value.to_string();
                Ok(())
            }
            (Screen::Login, selectors::PASSWORD) => {
                self.form_password = value.to_string();
                Ok(())
            }
            (Screen::CheckoutInfo, selectors::FIRST_NAME) => {
                self.form_first = value.to_string();
                Ok(())
            }
            (Screen::CheckoutInfo, selectors::LAST_NAME) => {
                self.form_last = value.to_string();
                Ok(())
            }
            (Screen::CheckoutInfo, selectors::POSTAL_CODE) => {
                self.form_postal = value.to_string();
                Ok(())
            }
            _ => Err(Error::ElementNotFound(selector.to_string())),
        }
    }

    fn select(&mut self, selector: &str, value: &str) -> Result<()> {
        match (self.screen, selector) {
            (Screen::Inventory, selectors::SORT_SELECT) => {
                let mode = SortMode::from_option_value(value).ok_or_else(|| {
                    Error::ElementNotFound(format!("option {value:?} in {selector}"))
                })?;
                self.sort_mode = mode;
                Ok(())
            }
            _ => Err(Error::ElementNotFound(selector.to_string())),
        }
    }
}
