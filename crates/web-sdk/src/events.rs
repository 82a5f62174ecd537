//! Vendor vocabulary — the operations the pixel object understands and the
//! standard e-commerce event names it reports.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An operation on the vendor object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VendorMethod {
    Load,
    Page,
    Track,
    Identify,
    Instances,
    Debug,
    On,
    Off,
    Once,
    Ready,
    Alias,
    Group,
    EnableCookie,
    DisableCookie,
    HoldConsent,
    RevokeConsent,
    GrantConsent,
}

impl VendorMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            VendorMethod::Load => "load",
            VendorMethod::Page => "page",
            VendorMethod::Track => "track",
            VendorMethod::Identify => "identify",
            VendorMethod::Instances => "instances",
            VendorMethod::Debug => "debug",
            VendorMethod::On => "on",
            VendorMethod::Off => "off",
            VendorMethod::Once => "once",
            VendorMethod::Ready => "ready",
            VendorMethod::Alias => "alias",
            VendorMethod::Group => "group",
            VendorMethod::EnableCookie => "enableCookie",
            VendorMethod::DisableCookie => "disableCookie",
            VendorMethod::HoldConsent => "holdConsent",
            VendorMethod::RevokeConsent => "revokeConsent",
            VendorMethod::GrantConsent => "grantConsent",
        }
    }
}

impl fmt::Display for VendorMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event name passed as the first argument of `track`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PixelEvent {
    AddToCart,
    InitiateCheckout,
    CompletePayment,
    Custom(String),
}

impl PixelEvent {
    pub fn as_str(&self) -> &str {
        match self {
            PixelEvent::AddToCart => "AddToCart",
            PixelEvent::InitiateCheckout => "InitiateCheckout",
            PixelEvent::CompletePayment => "CompletePayment",
            PixelEvent::Custom(name) => name,
        }
    }
}

impl fmt::Display for PixelEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_method_names_match_serde() {
        let methods = [
            (VendorMethod::Load, "load"),
            (VendorMethod::Page, "page"),
            (VendorMethod::Track, "track"),
            (VendorMethod::Instances, "instances"),
            (VendorMethod::EnableCookie, "enableCookie"),
            (VendorMethod::HoldConsent, "holdConsent"),
            (VendorMethod::GrantConsent, "grantConsent"),
        ];
        for (method, name) in methods {
            assert_eq!(method.as_str(), name);
            assert_eq!(serde_json::to_value(method).unwrap(), name);
        }
    }

    #[test]
    fn test_event_names() {
        assert_eq!(PixelEvent::AddToCart.to_string(), "AddToCart");
        assert_eq!(PixelEvent::CompletePayment.as_str(), "CompletePayment");
        assert_eq!(PixelEvent::Custom("ViewContent".into()).as_str(), "ViewContent");
    }
}
