//! Pixel web SDK — one-time vendor script injection, a command buffer for
//! calls made before the vendor script is live, and a tracking adapter that
//! maps storefront events onto the vendor's e-commerce schema.
//!
//! # Modules
//!
//! - [`document`] — Host page seam and script elements
//! - [`events`] — Vendor operations and standard event names
//! - [`queue`] — Ordered command queue for pre-load calls
//! - [`vendor`] — Vendor call surfaces and the buffering vendor object
//! - [`loader`] — Idempotent script loader
//! - [`readiness`] — Bounded wait for the vendor object
//! - [`mapping`] — Field mapping into vendor payloads
//! - [`adapter`] — Tracking adapter exposed to the storefront

pub mod adapter;
pub mod document;
pub mod events;
pub mod loader;
pub mod mapping;
pub mod queue;
pub mod readiness;
pub mod vendor;

pub use adapter::{AdapterState, Dispatch, InitOutcome, InitTask, TrackingAdapter};
pub use document::{Document, InMemoryDocument, ScriptTag};
pub use events::{PixelEvent, VendorMethod};
pub use loader::{PixelRuntime, ScriptLoader};
pub use mapping::PixelMapper;
pub use readiness::ReadinessPolicy;
pub use vendor::{CommandBuffer, LoadOptions, PixelApi, RecordingEndpoint, VendorEndpoint};
