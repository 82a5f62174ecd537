use std::fmt;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{PixelError, PixelResult};

/// A catalog product as the storefront knows it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub subcategory: Option<String>,
    pub unit_price: Decimal,
    pub quantity: u32,
}

impl Product {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: impl Into<String>,
        unit_price: Decimal,
        quantity: u32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: category.into(),
            subcategory: None,
            unit_price,
            quantity,
        }
    }

    pub fn with_subcategory(mut self, subcategory: impl Into<String>) -> Self {
        self.subcategory = Some(subcategory.into());
        self
    }

    /// Unit price times quantity. Fails instead of overflowing.
    pub fn line_total(&self) -> PixelResult<Decimal> {
        self.unit_price
            .checked_mul(Decimal::from(self.quantity))
            .ok_or_else(|| {
                PixelError::InvalidAmount(format!(
                    "{} x {} overflows for product '{}'",
                    self.unit_price, self.quantity, self.id
                ))
            })
    }
}

/// Sum of line totals across a cart.
pub fn cart_total(products: &[Product]) -> PixelResult<Decimal> {
    products.iter().try_fold(Decimal::ZERO, |total, product| {
        total.checked_add(product.line_total()?).ok_or_else(|| {
            PixelError::InvalidAmount(format!("cart total overflows at product '{}'", product.id))
        })
    })
}

/// ISO-4217 currency code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency(String);

impl Currency {
    pub fn parse(code: &str) -> PixelResult<Self> {
        if code.len() == 3 && code.chars().all(|c| c.is_ascii_uppercase()) {
            Ok(Self(code.to_string()))
        } else {
            Err(PixelError::InvalidCurrency(code.to_string()))
        }
    }

    pub fn usd() -> Self {
        Self("USD".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Currency {
    fn default() -> Self {
        Self::usd()
    }
}

impl TryFrom<String> for Currency {
    type Error = PixelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Currency> for String {
    fn from(currency: Currency) -> Self {
        currency.0
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single product entry within an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub product_id: String,
    pub name: String,
    pub category: String,
    pub quantity: u32,
    pub unit_price: Decimal,
}

impl From<&Product> for LineItem {
    fn from(product: &Product) -> Self {
        Self {
            product_id: product.id.clone(),
            name: product.name.clone(),
            category: product.category.clone(),
            quantity: product.quantity,
            unit_price: product.unit_price,
        }
    }
}

/// E-commerce event data before it is rendered into the vendor schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingEvent {
    pub content_identifier: String,
    pub content_type: String,
    pub content_name: String,
    #[serde(default)]
    pub content_category: Option<String>,
    pub value: Decimal,
    #[serde(default)]
    pub currency: Option<Currency>,
    pub line_items: Vec<LineItem>,
}

impl TrackingEvent {
    /// Event describing a single product, valued at its line total.
    pub fn from_product(product: &Product) -> PixelResult<Self> {
        Ok(Self {
            content_identifier: product.id.clone(),
            content_type: product.category.clone(),
            content_name: product.name.clone(),
            content_category: product.subcategory.clone(),
            value: product.line_total()?,
            currency: None,
            line_items: vec![LineItem::from(product)],
        })
    }

    /// Event describing a whole cart. The first product is the headline item;
    /// the value is the cart total.
    pub fn from_cart(products: &[Product]) -> PixelResult<Self> {
        let main = products.first().ok_or(PixelError::EmptyCart)?;
        Ok(Self {
            content_identifier: main.id.clone(),
            content_type: main.category.clone(),
            content_name: main.name.clone(),
            content_category: main.subcategory.clone(),
            value: cart_total(products)?,
            currency: None,
            line_items: products.iter().map(LineItem::from).collect(),
        })
    }

    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = Some(currency);
        self
    }
}

/// A completed purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseEvent {
    #[serde(flatten)]
    pub event: TrackingEvent,
    pub order_id: String,
    pub total_amount: Decimal,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub shipping_cost: Option<Decimal>,
    #[serde(default)]
    pub tax: Option<Decimal>,
}

impl PurchaseEvent {
    pub fn new(event: TrackingEvent, order_id: impl Into<String>, total_amount: Decimal) -> Self {
        Self {
            event,
            order_id: order_id.into(),
            total_amount,
            transaction_id: None,
            payment_method: None,
            shipping_cost: None,
            tax: None,
        }
    }

    pub fn from_cart(order_id: impl Into<String>, products: &[Product]) -> PixelResult<Self> {
        let event = TrackingEvent::from_cart(products)?;
        let total = event.value;
        Ok(Self::new(event, order_id, total))
    }

    /// `ORDER-<unix millis>`.
    pub fn generate_order_id() -> String {
        format!("ORDER-{}", Utc::now().timestamp_millis())
    }
}
