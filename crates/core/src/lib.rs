pub mod config;
pub mod error;
pub mod types;

pub use config::{AppConfig, PixelConfig};
pub use error::{PixelError, PixelResult};
pub use types::{Currency, LineItem, Product, PurchaseEvent, TrackingEvent};
