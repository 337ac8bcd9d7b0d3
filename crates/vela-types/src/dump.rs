//! Binding store dumps: debug output of a unification session
//!
//! Two renderings of the same data: a line-oriented text form for quick
//! inspection and a versioned JSON form for tooling. Entries are sorted
//! by variable id so output is deterministic across runs.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::types::VarId;
use crate::unifier::Unifier;

/// Version of the bindings dump format
pub const BINDINGS_DUMP_VERSION: u32 = 1;

/// One store entry. `bound` is the direct binding rendered with the type
/// display syntax (`v<id>` for variables); `None` marks a variable that
/// was seen and later unbound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingEntry {
    pub var: VarId,
    pub bound: Option<String>,
}

/// Complete snapshot of a session's binding store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingsDump {
    pub bindings_version: u32,
    pub bindings: Vec<BindingEntry>,
}

impl BindingsDump {
    /// Capture the current store, sorted by variable id
    pub fn from_unifier(unifier: &Unifier) -> Self {
        let mut bindings: Vec<BindingEntry> = unifier
            .bindings()
            .map(|(var, bound)| BindingEntry {
                var,
                bound: bound.map(|ty| ty.to_string()),
            })
            .collect();
        bindings.sort_by_key(|entry| entry.var);

        BindingsDump {
            bindings_version: BINDINGS_DUMP_VERSION,
            bindings,
        }
    }

    /// Text form: one `v<id> --> <binding>` line per entry, `null` for
    /// seen-but-unbound variables
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for entry in &self.bindings {
            let bound = entry.bound.as_deref().unwrap_or("null");
            let _ = writeln!(out, "v{} --> {}", entry.var, bound);
        }
        out
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Serialize to compact JSON
    pub fn to_json_compact(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

// ============================================================================
// Tests
// ============================================================================
