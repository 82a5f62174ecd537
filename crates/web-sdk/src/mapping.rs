//! Pixel payload mapping — renders [`TrackingEvent`]s into the JSON object the
//! vendor's `track` call expects.
//!
//! | Domain | Vendor |
//! |---|---|
//! | item id | `content_identifier` |
//! | primary category | `content_type` |
//! | item name | `content_name` |
//! | secondary category | `content_category` |
//! | line total sum | `value` |
//! | currency | `currency` |
//! | line items | `contents` |

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use pixel_core::{Currency, LineItem, PixelResult, PurchaseEvent, TrackingEvent};

/// Body of a vendor `track` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VendorPayload {
    pub content_identifier: String,
    pub content_type: String,
    pub content_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_category: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub value: Decimal,
    pub currency: Currency,
    pub contents: Vec<VendorContent>,
}

/// One entry of `contents`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VendorContent {
    pub content_id: String,
    pub content_type: String,
    pub content_name: String,
    pub quantity: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

impl From<&LineItem> for VendorContent {
    fn from(item: &LineItem) -> Self {
        Self {
            content_id: item.product_id.clone(),
            content_type: item.category.clone(),
            content_name: item.name.clone(),
            quantity: item.quantity,
            price: item.unit_price,
        }
    }
}

pub struct PixelMapper {
    default_currency: Currency,
}

impl Default for PixelMapper {
    fn default() -> Self {
        Self::new(Currency::usd())
    }
}

impl PixelMapper {
    pub fn new(default_currency: Currency) -> Self {
        Self { default_currency }
    }

    pub fn default_currency(&self) -> &Currency {
        &self.default_currency
    }

    pub fn payload(&self, event: &TrackingEvent) -> VendorPayload {
        VendorPayload {
            content_identifier: event.content_identifier.clone(),
            content_type: event.content_type.clone(),
            content_name: event.content_name.clone(),
            content_category: event.content_category.clone(),
            value: event.value,
            currency: event
                .currency
                .clone()
                .unwrap_or_else(|| self.default_currency.clone()),
            contents: event.line_items.iter().map(VendorContent::from).collect(),
        }
    }

    /// Purchases report `total_amount` as the event value.
    pub fn purchase_payload(&self, purchase: &PurchaseEvent) -> VendorPayload {
        let mut payload = self.payload(&purchase.event);
        payload.value = purchase.total_amount;
        payload
    }

    pub fn transform(&self, event: &TrackingEvent) -> PixelResult<serde_json::Value> {
        let payload = serde_json::to_value(self.payload(event))?;
        debug!(
            content_identifier = %event.content_identifier,
            "pixel payload transformed"
        );
        Ok(payload)
    }

    pub fn transform_purchase(&self, purchase: &PurchaseEvent) -> PixelResult<serde_json::Value> {
        let payload = serde_json::to_value(self.purchase_payload(purchase))?;
        debug!(order_id = %purchase.order_id, "pixel purchase payload transformed");
        Ok(payload)
    }
}
