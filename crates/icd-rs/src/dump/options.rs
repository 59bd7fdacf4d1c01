// crates/icd-rs/src/dump/options.rs

use serde::{Deserialize, Serialize};

/// Controls which fields the canonical dump prints and how paths are keyed.
///
/// Every option defaults to the value used for plain structural diffs. When
/// deserialized, missing keys take their default and unknown keys are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DumpOptions {
    /// Omit `typeChanged` markers.
    pub ignore_type_changed: bool,
    /// Omit `index` fields.
    pub ignore_index: bool,
    /// Omit fields whose value is empty.
    pub ignore_empty: bool,
    /// Key nodes by name only. When `false`, each node segment is prefixed with
    /// its position in the list it was reached from, e.g. `D1/[1]C2`.
    pub ignore_order: bool,
}

impl Default for DumpOptions {
    fn default() -> Self {
        Self {
            ignore_type_changed: true,
            ignore_index: true,
            ignore_empty: false,
            ignore_order: true,
        }
    }
}
