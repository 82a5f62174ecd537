//! Tracking adapter — the API the storefront calls.
//!
//! Initialization injects the vendor script, waits (bounded) for the vendor
//! object to expose `load`, then issues `load` and `page`. Until that has
//! happened every tracking call is dropped with a warning. No tracking
//! failure is ever returned to the caller as an error.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use pixel_core::{
    AppConfig, Currency, PixelConfig, PixelError, PixelResult, PurchaseEvent, TrackingEvent,
};

use crate::events::PixelEvent;
use crate::loader::PixelRuntime;
use crate::mapping::PixelMapper;
use crate::readiness::{wait_for, ReadinessPolicy};
use crate::vendor::{LoadOptions, PixelApi};

/// Result of [`TrackingAdapter::initialize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InitOutcome {
    pub initialized: bool,
}

/// Snapshot of the adapter lifecycle flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AdapterState {
    pub script_injected: bool,
    pub ready: bool,
}

/// What happened to a tracking call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Sent,
    /// Dropped because the pixel was not ready.
    Skipped,
    Failed,
}

pub struct TrackingAdapter {
    config: PixelConfig,
    runtime: Arc<dyn PixelRuntime>,
    readiness: ReadinessPolicy,
    mapper: PixelMapper,
    vendor: RwLock<Option<Arc<dyn PixelApi>>>,
    ready: AtomicBool,
    init_lock: tokio::sync::Mutex<()>,
}

impl TrackingAdapter {
    pub fn new(config: PixelConfig, runtime: Arc<dyn PixelRuntime>) -> Self {
        Self {
            config,
            runtime,
            readiness: ReadinessPolicy::default(),
            mapper: PixelMapper::default(),
            vendor: RwLock::new(None),
            ready: AtomicBool::new(false),
            init_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn from_config(config: &AppConfig, runtime: Arc<dyn PixelRuntime>) -> PixelResult<Self> {
        Ok(Self::new(config.pixel.clone(), runtime)
            .with_readiness(ReadinessPolicy::from(&config.readiness))
            .with_default_currency(config.tracking.currency()?))
    }

    pub fn with_readiness(mut self, policy: ReadinessPolicy) -> Self {
        self.readiness = policy;
        self
    }

    pub fn with_default_currency(mut self, currency: Currency) -> Self {
        self.mapper = PixelMapper::new(currency);
        self
    }

    pub fn config(&self) -> &PixelConfig {
        &self.config
    }

    pub fn is_initialized(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    pub fn state(&self) -> AdapterState {
        AdapterState {
            script_injected: self.runtime.is_injected(),
            ready: self.is_initialized(),
        }
    }

    /// Bring the pixel up. Safe to call any number of times; only the first
    /// successful run injects the script and issues `load`.
    pub async fn initialize(&self) -> InitOutcome {
        if self.is_initialized() {
            return InitOutcome { initialized: true };
        }

        let _guard = self.init_lock.lock().await;
        if self.is_initialized() {
            return InitOutcome { initialized: true };
        }

        match self.try_initialize().await {
            Ok(vendor) => {
                *self.vendor.write() = Some(vendor);
                self.ready.store(true, Ordering::Release);
                info!(pixel_id = %self.config.pixel_id, "pixel initialized");
                if self.config.test_mode {
                    info!("pixel running in test mode");
                }
                InitOutcome { initialized: true }
            }
            Err(e) => {
                error!(
                    pixel_id = %self.config.pixel_id,
                    error = %e,
                    "pixel initialization failed, tracking disabled"
                );
                InitOutcome { initialized: false }
            }
        }
    }

    async fn try_initialize(&self) -> PixelResult<Arc<dyn PixelApi>> {
        self.config.validate()?;

        let options = LoadOptions::for_test_mode(self.config.test_mode);
        self.runtime.inject(&self.config.pixel_id, &options)?;

        let runtime = self.runtime.clone();
        let vendor = wait_for(&self.readiness, move || {
            runtime.vendor().filter(|v| v.load_callable())
        })
        .await
        .inspect_err(|_| metrics::counter!("pixel.init.timeout").increment(1))?;

        vendor.load(&self.config.pixel_id, &options)?;
        vendor.page()?;
        Ok(vendor)
    }

    /// Run [`initialize`](Self::initialize) in the background.
    pub fn spawn_initialize(self: &Arc<Self>) -> InitTask {
        let adapter = Arc::clone(self);
        InitTask {
            handle: tokio::spawn(async move { adapter.initialize().await }),
        }
    }

    fn live_vendor(&self) -> Option<Arc<dyn PixelApi>> {
        if !self.is_initialized() {
            return None;
        }
        self.vendor.read().clone()
    }

    /// Map `data` onto the vendor schema and send it as `event`.
    pub fn track(&self, event: &PixelEvent, data: &TrackingEvent) -> Dispatch {
        self.send(event, |mapper| mapper.transform(data))
    }

    pub fn track_add_to_cart(&self, data: &TrackingEvent) -> Dispatch {
        self.track(&PixelEvent::AddToCart, data)
    }

    pub fn track_initiate_checkout(&self, data: &TrackingEvent) -> Dispatch {
        self.track(&PixelEvent::InitiateCheckout, data)
    }

    pub fn track_purchase(&self, purchase: &PurchaseEvent) -> Dispatch {
        self.send(&PixelEvent::CompletePayment, |mapper| {
            mapper.transform_purchase(purchase)
        })
    }

    pub fn track_page_view(&self) -> Dispatch {
        let Some(vendor) = self.live_vendor() else {
            metrics::counter!("pixel.events.skipped").increment(1);
            warn!(reason = %PixelError::NotReady, "page view dropped");
            return Dispatch::Skipped;
        };
        match vendor.page() {
            Ok(()) => {
                metrics::counter!("pixel.events.sent").increment(1);
                info!("pixel page view tracked");
                Dispatch::Sent
            }
            Err(e) => {
                metrics::counter!("pixel.events.failed").increment(1);
                error!(error = %e, "failed to track page view");
                Dispatch::Failed
            }
        }
    }

    fn send<F>(&self, event: &PixelEvent, build: F) -> Dispatch
    where
        F: FnOnce(&PixelMapper) -> PixelResult<Value>,
    {
        let Some(vendor) = self.live_vendor() else {
            metrics::counter!("pixel.events.skipped").increment(1);
            warn!(event = %event, reason = %PixelError::NotReady, "pixel event dropped");
            return Dispatch::Skipped;
        };

        let result = build(&self.mapper).and_then(|payload| {
            vendor.track(event.as_str(), payload.clone())?;
            Ok(payload)
        });

        match result {
            Ok(payload) => {
                metrics::counter!("pixel.events.sent").increment(1);
                info!(event = %event, payload = %payload, "pixel event sent");
                Dispatch::Sent
            }
            Err(e) => {
                metrics::counter!("pixel.events.failed").increment(1);
                error!(event = %event, error = %e, "failed to send pixel event");
                Dispatch::Failed
            }
        }
    }
}

/// Background initialization started by [`TrackingAdapter::spawn_initialize`].
pub struct InitTask {
    handle: JoinHandle<InitOutcome>,
}

impl InitTask {
    /// Abort the readiness wait. The adapter stays uninitialized and a later
    /// [`TrackingAdapter::initialize`] starts over.
    pub fn cancel(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub async fn outcome(self) -> InitOutcome {
        match self.handle.await {
            Ok(outcome) => outcome,
            Err(e) if e.is_cancelled() => {
                warn!("pixel initialization cancelled");
                InitOutcome { initialized: false }
            }
            Err(e) => {
                error!(error = %e, "pixel initialization task failed");
                InitOutcome { initialized: false }
            }
        }
    }
}
