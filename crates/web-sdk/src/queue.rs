//! Command queue — calls made against the vendor object before its script
//! has run. Arrival order is preserved so `load` always drains before the
//! `page` and `track` calls that depend on it.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::events::VendorMethod;

/// A single deferred vendor call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    pub method: VendorMethod,
    pub args: Vec<Value>,
    pub queued_at: DateTime<Utc>,
}

impl Command {
    pub fn new(method: VendorMethod, args: Vec<Value>) -> Self {
        Self {
            method,
            args,
            queued_at: Utc::now(),
        }
    }
}

#[derive(Debug, Default)]
pub struct CommandQueue {
    commands: Vec<Command>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: Command) {
        debug!(
            method = %command.method,
            position = self.commands.len(),
            "vendor call queued"
        );
        self.commands.push(command);
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Pending argument tuples for one operation, oldest first.
    pub fn pending(&self, method: VendorMethod) -> Vec<&[Value]> {
        self.commands
            .iter()
            .filter(|c| c.method == method)
            .map(|c| c.args.as_slice())
            .collect()
    }

    /// Pending argument tuples grouped by operation name.
    pub fn by_method(&self) -> BTreeMap<VendorMethod, Vec<Vec<Value>>> {
        let mut grouped: BTreeMap<VendorMethod, Vec<Vec<Value>>> = BTreeMap::new();
        for command in &self.commands {
            grouped
                .entry(command.method)
                .or_default()
                .push(command.args.clone());
        }
        grouped
    }

    /// Take every queued command in arrival order.
    pub fn drain(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }
}
