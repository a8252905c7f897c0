//! Tool-call reassembly.
//!
//! Providers stream tool calls as fragments: the first fragment of a call
//! carries its `id` and name, the rest carry argument text under the same
//! `index`. Calls at different indices interleave freely, and a provider
//! may reuse an index for a second call in the same turn, so a new call is
//! recognized by the presence of an `id`, never by the index alone.

use std::collections::BTreeMap;

use nextchat_core::ToolCall;
use tracing::{debug, warn};

use crate::delta::ToolCallFragment;

/// What happened to an applied fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentOutcome {
    /// A new call was started.
    Started,
    /// Argument text was appended to an existing call.
    Appended,
    /// The fragment referenced an index with no call and was discarded.
    Dropped,
}

/// Reassembles tool-call fragments into complete [`ToolCall`]s.
#[derive(Debug, Clone, Default)]
pub struct ToolCallAccumulator {
    calls: Vec<ToolCall>,
    // index -> position in `calls` of the most recent call started there
    by_index: BTreeMap<u32, usize>,
}

impl ToolCallAccumulator {
    /// Create an empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one fragment.
    pub fn apply(&mut self, fragment: &ToolCallFragment) -> FragmentOutcome {
        if let Some(id) = fragment.id.as_deref().filter(|id| !id.is_empty()) {
            let mut call = ToolCall::function(
                id,
                fragment.name().unwrap_or_default(),
                fragment.arguments(),
            );
            if let Some(call_type) = fragment.call_type.as_deref().filter(|t| !t.is_empty()) {
                call.call_type = call_type.to_string();
            }

            if self.by_index.contains_key(&fragment.index) {
                debug!(index = fragment.index, tool_call_id = id, "Tool call index reused");
            }
            self.by_index.insert(fragment.index, self.calls.len());
            self.calls.push(call);
            return FragmentOutcome::Started;
        }

        let Some(&position) = self.by_index.get(&fragment.index) else {
            warn!(
                index = fragment.index,
                "Dropping tool call fragment for an index with no started call"
            );
            return FragmentOutcome::Dropped;
        };

        let call = &mut self.calls[position];
        if call.function.name.is_empty() {
            if let Some(name) = fragment.name() {
                call.function.name = name.to_string();
            }
        }
        call.function.arguments.push_str(fragment.arguments());
        FragmentOutcome::Appended
    }

    /// Apply a batch of fragments in order.
    pub fn apply_all<'a>(&mut self, fragments: impl IntoIterator<Item = &'a ToolCallFragment>) {
        for fragment in fragments {
            self.apply(fragment);
        }
    }

    /// Calls accumulated so far, in the order they were started.
    #[must_use]
    pub fn calls(&self) -> &[ToolCall] {
        &self.calls
    }

    /// Number of calls started.
    #[must_use]
    pub fn len(&self) -> usize {
        self.calls.len()
    }

    /// Whether no call has been started.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    /// Take the accumulated calls, leaving the accumulator empty.
    pub fn take_calls(&mut self) -> Vec<ToolCall> {
        self.by_index.clear();
        std::mem::take(&mut self.calls)
    }

    /// Consume the accumulator, returning the calls.
    #[must_use]
    pub fn into_calls(self) -> Vec<ToolCall> {
        self.calls
    }
}
