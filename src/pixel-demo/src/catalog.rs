//! Sample storefront cart.

use pixel_core::Product;
use rust_decimal::Decimal;

pub fn sample_products() -> Vec<Product> {
    vec![
        Product::new(
            "PROD-001",
            "Smartphone Pro Max",
            "Electronics",
            Decimal::new(99_999, 2),
            1,
        )
        .with_subcategory("Mobile Phones"),
        Product::new(
            "PROD-002",
            "Wireless Headphones",
            "Electronics",
            Decimal::new(19_999, 2),
            2,
        )
        .with_subcategory("Audio Accessories"),
    ]
}
