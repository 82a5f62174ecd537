//! Vendor script loader — installs the stand-in vendor object and attaches the
//! vendor script to the page exactly once.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, error, info};
use url::Url;

use pixel_core::config::LoaderConfig;
use pixel_core::{PixelError, PixelResult};

use crate::document::{Document, ScriptTag};
use crate::vendor::{CommandBuffer, LoadOptions, PixelApi, VendorEndpoint};

/// What the adapter needs from the page: a way to inject the vendor and a
/// handle on the vendor object once it exists.
pub trait PixelRuntime: Send + Sync {
    fn inject(&self, account_id: &str, options: &LoadOptions) -> PixelResult<()>;

    fn vendor(&self) -> Option<Arc<dyn PixelApi>>;

    fn is_injected(&self) -> bool;
}

#[derive(Default)]
struct LoaderState {
    injected: bool,
    buffer: Option<Arc<CommandBuffer>>,
}

pub struct ScriptLoader {
    document: Arc<dyn Document>,
    config: LoaderConfig,
    state: Mutex<LoaderState>,
}

impl ScriptLoader {
    pub fn new(document: Arc<dyn Document>, config: LoaderConfig) -> Self {
        Self {
            document,
            config,
            state: Mutex::new(LoaderState::default()),
        }
    }

    /// `<script_url>?sdkid=<account>&lib=<tag>`
    pub fn script_url(&self, account_id: &str) -> PixelResult<Url> {
        let mut url = Url::parse(&self.config.script_url).map_err(|e| {
            PixelError::Config(format!(
                "invalid script_url '{}': {}",
                self.config.script_url, e
            ))
        })?;
        url.query_pairs_mut()
            .append_pair("sdkid", account_id)
            .append_pair("lib", &self.config.library_tag);
        Ok(url)
    }

    /// Attach the vendor script. A no-op once a script element is in place.
    /// On failure the loader stays uninjected so a later call can retry.
    pub fn inject(&self, account_id: &str, options: &LoadOptions) -> PixelResult<Arc<CommandBuffer>> {
        let mut state = self.state.lock();
        if let (true, Some(buffer)) = (state.injected, &state.buffer) {
            debug!(account_id, "vendor script already injected");
            return Ok(buffer.clone());
        }

        let tag = ScriptTag::external(self.script_url(account_id)?.to_string());
        if let Err(e) = self.document.insert_script(&tag) {
            metrics::counter!("pixel.inject.failed").increment(1);
            error!(account_id, error = %e, "failed to inject vendor script");
            return Err(match e {
                PixelError::InjectionFailure(_) => e,
                other => PixelError::InjectionFailure(other.to_string()),
            });
        }
        // The vendor object exists only once its script element does.
        let buffer = Arc::new(CommandBuffer::new(self.config.library_tag.clone()));
        state.buffer = Some(buffer.clone());
        state.injected = true;

        info!(
            account_id,
            src = %tag.src,
            debug = options.debug,
            "vendor script injected"
        );
        Ok(buffer)
    }

    pub fn buffer(&self) -> Option<Arc<CommandBuffer>> {
        self.state.lock().buffer.clone()
    }

    pub fn is_injected(&self) -> bool {
        self.state.lock().injected
    }

    /// Called by the host once the vendor script has downloaded and run.
    pub fn script_loaded(&self, endpoint: Arc<dyn VendorEndpoint>) -> PixelResult<usize> {
        let buffer = self.buffer().ok_or_else(|| {
            PixelError::InjectionFailure("vendor script loaded before injection".into())
        })?;
        Ok(buffer.activate(endpoint))
    }
}

impl PixelRuntime for ScriptLoader {
    fn inject(&self, account_id: &str, options: &LoadOptions) -> PixelResult<()> {
        ScriptLoader::inject(self, account_id, options).map(|_| ())
    }

    fn vendor(&self) -> Option<Arc<dyn PixelApi>> {
        self.buffer().map(|b| b as Arc<dyn PixelApi>)
    }

    fn is_injected(&self) -> bool {
        ScriptLoader::is_injected(self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::document::InMemoryDocument;
    use crate::events::VendorMethod;
    use crate::vendor::RecordingEndpoint;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Rejects the first `failures` insertions, then behaves like a page.
    struct FlakyDocument {
        failures: AtomicUsize,
        inner: InMemoryDocument,
    }

    impl Document for FlakyDocument {
        fn insert_script(&self, tag: &ScriptTag) -> PixelResult<()> {
            if self
                .failures
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
            {
                return Err(PixelError::InjectionFailure("no document context".into()));
            }
            self.inner.insert_script(tag)
        }
    }

    #[test]
    fn test_script_url() {
        let loader = ScriptLoader::new(Arc::new(InMemoryDocument::new()), LoaderConfig::default());
        let url = loader.script_url("D4JHOSBC77UBCCH9DR1G").unwrap();
        assert_eq!(
            url.as_str(),
            "https://analytics.tiktok.com/i18n/pixel/events.js?sdkid=D4JHOSBC77UBCCH9DR1G&lib=ttq"
        );

        let bad = ScriptLoader::new(
            Arc::new(InMemoryDocument::new()),
            LoaderConfig {
                script_url: "not a url".into(),
                ..Default::default()
            },
        );
        assert!(bad.script_url("X").is_err());
    }

    #[test]
    fn test_inject_is_idempotent() {
        let doc = Arc::new(InMemoryDocument::new());
        let loader = ScriptLoader::new(doc.clone(), LoaderConfig::default());
        let options = LoadOptions::default();

        let first = loader.inject("PIXEL1", &options).unwrap();
        let second = loader.inject("PIXEL1", &options).unwrap();
        loader.inject("PIXEL1", &options).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(doc.script_count(), 1);
        assert!(loader.is_injected());
        assert_eq!(first.name(), "ttq");
    }

    #[test]
    fn test_failed_injection_can_retry() {
        let doc = Arc::new(FlakyDocument {
            failures: AtomicUsize::new(1),
            inner: InMemoryDocument::new(),
        });
        let loader = ScriptLoader::new(doc.clone(), LoaderConfig::default());

        let err = loader.inject("PIXEL1", &LoadOptions::default()).err().unwrap();
        assert!(matches!(err, PixelError::InjectionFailure(_)));
        assert!(!loader.is_injected());
        assert_eq!(doc.inner.script_count(), 0);
        assert!(loader.buffer().is_none());
        assert!(PixelRuntime::vendor(&loader).is_none());
        assert!(loader
            .script_loaded(Arc::new(RecordingEndpoint::new()))
            .is_err());

        let buffer = loader.inject("PIXEL1", &LoadOptions::default()).unwrap();
        assert!(loader.is_injected());
        assert_eq!(doc.inner.script_count(), 1);
        assert!(Arc::ptr_eq(&buffer, &loader.buffer().unwrap()));
    }

    #[test]
    fn test_script_loaded_drains_buffer() {
        let loader = ScriptLoader::new(Arc::new(InMemoryDocument::new()), LoaderConfig::default());
        let endpoint = Arc::new(RecordingEndpoint::new());
        assert!(loader.script_loaded(endpoint.clone()).is_err());

        let buffer = loader.inject("PIXEL1", &LoadOptions::default()).unwrap();
        buffer.page().unwrap();

        assert_eq!(loader.script_loaded(endpoint.clone()).unwrap(), 1);
        assert_eq!(endpoint.count_method(VendorMethod::Page), 1);
        assert!(PixelRuntime::vendor(&loader).unwrap().load_callable());
    }
}
