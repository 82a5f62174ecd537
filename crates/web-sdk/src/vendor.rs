//! The vendor object and the two surfaces around it.
//!
//! [`PixelApi`] is what the adapter calls. [`VendorEndpoint`] is the live
//! vendor library that eventually executes those calls. [`CommandBuffer`]
//! sits in between: it queues everything until the vendor script has loaded,
//! drains the queue into the endpoint, and forwards directly afterwards.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, error, info, warn};

use pixel_core::{PixelError, PixelResult};

use crate::events::VendorMethod;
use crate::queue::{Command, CommandQueue};

/// Options passed with the vendor `load` call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadOptions {
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub debug: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partner: Option<String>,
}

impl LoadOptions {
    pub fn for_test_mode(test_mode: bool) -> Self {
        Self {
            debug: test_mode,
            partner: None,
        }
    }
}

/// Vendor call surface consumed by the adapter.
pub trait PixelApi: Send + Sync {
    /// Whether the object exposes a callable `load`.
    fn load_callable(&self) -> bool;

    fn load(&self, account_id: &str, options: &LoadOptions) -> PixelResult<()>;

    fn page(&self) -> PixelResult<()>;

    fn track(&self, event_name: &str, payload: Value) -> PixelResult<()>;
}

/// The live vendor library.
pub trait VendorEndpoint: Send + Sync {
    fn execute(&self, command: &Command) -> PixelResult<()>;
}

enum BufferState {
    Queued(CommandQueue),
    /// Replaying the queue. New calls keep queuing behind it.
    Draining(CommandQueue),
    Live(Arc<dyn VendorEndpoint>),
}

/// Stand-in vendor object installed by the loader.
pub struct CommandBuffer {
    name: String,
    state: Mutex<BufferState>,
    accounts: Mutex<HashMap<String, AccountLoad>>,
}

/// Per-account record of a `load` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountLoad {
    pub options: LoadOptions,
    pub requested_at: DateTime<Utc>,
}

impl CommandBuffer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Mutex::new(BufferState::Queued(CommandQueue::new())),
            accounts: Mutex::new(HashMap::new()),
        }
    }

    /// Global name the vendor object is published under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Queue the call, or forward it if the vendor script is already live.
    pub fn dispatch(&self, method: VendorMethod, args: Vec<Value>) -> PixelResult<()> {
        let command = Command::new(method, args);
        let endpoint = {
            let mut state = self.state.lock();
            match &mut *state {
                BufferState::Queued(queue) | BufferState::Draining(queue) => {
                    queue.push(command);
                    return Ok(());
                }
                BufferState::Live(endpoint) => endpoint.clone(),
            }
        };
        debug!(method = %method, "vendor call forwarded");
        endpoint.execute(&command)
    }

    /// Replay everything queued so far into the live endpoint in arrival
    /// order, then forward directly. Calls made while the replay runs are
    /// queued behind it. Returns the number of commands replayed.
    pub fn activate(&self, endpoint: Arc<dyn VendorEndpoint>) -> usize {
        let mut batch = {
            let mut state = self.state.lock();
            let BufferState::Queued(queue) = &mut *state else {
                warn!(object = %self.name, "vendor object already active, ignoring activation");
                return 0;
            };
            let batch = queue.drain();
            *state = BufferState::Draining(CommandQueue::new());
            batch
        };

        let mut replayed = 0;
        loop {
            for command in &batch {
                if let Err(e) = endpoint.execute(command) {
                    error!(method = %command.method, error = %e, "queued vendor call failed");
                }
            }
            replayed += batch.len();

            let mut state = self.state.lock();
            if let BufferState::Draining(queue) = &mut *state {
                if !queue.is_empty() {
                    batch = queue.drain();
                    continue;
                }
            }
            *state = BufferState::Live(endpoint.clone());
            break;
        }

        info!(
            object = %self.name,
            replayed,
            "vendor script active, command queue drained"
        );
        replayed
    }

    pub fn is_live(&self) -> bool {
        matches!(*self.state.lock(), BufferState::Live(_))
    }

    /// Number of calls waiting for the vendor script.
    pub fn pending(&self) -> usize {
        match &*self.state.lock() {
            BufferState::Queued(queue) | BufferState::Draining(queue) => queue.len(),
            BufferState::Live(_) => 0,
        }
    }

    /// Copy of the calls waiting for the vendor script.
    pub fn queued(&self) -> Vec<Command> {
        match &*self.state.lock() {
            BufferState::Queued(queue) | BufferState::Draining(queue) => queue.commands().to_vec(),
            BufferState::Live(_) => Vec::new(),
        }
    }

    pub fn account_load(&self, account_id: &str) -> Option<AccountLoad> {
        self.accounts.lock().get(account_id).cloned()
    }
}

impl PixelApi for CommandBuffer {
    fn load_callable(&self) -> bool {
        true
    }

    fn load(&self, account_id: &str, options: &LoadOptions) -> PixelResult<()> {
        self.accounts.lock().insert(
            account_id.to_string(),
            AccountLoad {
                options: options.clone(),
                requested_at: Utc::now(),
            },
        );
        self.dispatch(
            VendorMethod::Load,
            vec![json!(account_id), serde_json::to_value(options)?],
        )
    }

    fn page(&self) -> PixelResult<()> {
        self.dispatch(VendorMethod::Page, Vec::new())
    }

    fn track(&self, event_name: &str, payload: Value) -> PixelResult<()> {
        self.dispatch(VendorMethod::Track, vec![json!(event_name), payload])
    }
}

/// Live endpoint that records every executed command.
#[derive(Default)]
pub struct RecordingEndpoint {
    executed: Mutex<Vec<Command>>,
}

impl RecordingEndpoint {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn executed(&self) -> Vec<Command> {
        self.executed.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.executed.lock().len()
    }

    pub fn count_method(&self, method: VendorMethod) -> usize {
        self.executed
            .lock()
            .iter()
            .filter(|c| c.method == method)
            .count()
    }

    /// `(event name, payload)` of every executed `track` call.
    pub fn tracked(&self) -> Vec<(String, Value)> {
        self.executed
            .lock()
            .iter()
            .filter(|c| c.method == VendorMethod::Track)
            .filter_map(|c| {
                let name = c.args.first()?.as_str()?.to_string();
                let payload = c.args.get(1).cloned().unwrap_or(Value::Null);
                Some((name, payload))
            })
            .collect()
    }
}

impl VendorEndpoint for RecordingEndpoint {
    fn execute(&self, command: &Command) -> PixelResult<()> {
        if command.method == VendorMethod::Track && command.args.is_empty() {
            return Err(PixelError::Vendor("track called without an event name".into()));
        }
        let args = Value::Array(command.args.clone());
        info!(method = %command.method, args = %args, "vendor call executed");
        self.executed.lock().push(command.clone());
        Ok(())
    }
}
