// crates/icd-rs/src/lib.rs

#![no_std]
#![doc = "Parses ICD (Interface Control Document) XML files into a typed document graph."]
#![doc = ""]
#![doc = "This `no_std + alloc` library builds an arena-backed graph of devices, channels,"]
#![doc = "data containers, data items and filters, resolves the reference-path expressions"]
#![doc = "that link them, and flattens the result into a sorted list of canonical paths"]
#![doc = "suitable for diffing two ICD revisions."]
#![doc = ""]
#![doc = "It supports:"]
#![doc = "- `load_icd_from_str`: Two-pass parsing (structure, then references)."]
#![doc = "- `Dumper`: Canonical flattening with a configurable exclusion policy."]

extern crate alloc;

// --- Crate Modules ---

mod dump;
mod error;
mod model;
mod parser;
mod path;
mod registry;
mod xml;

// --- Public API Re-exports ---

pub use dump::{CanonicalDump, DumpOptions, Dumper, Entry};
pub use error::IcdError;
pub use model::{
    Bus, Channel, Config, Data, DataContainer, DataContainerAttribute, DataFilter, Device,
    Document, ElementInfo, EnumElement, FieldRole, LinkList, Metadata, Node, NodeId, NodeKind,
    ScalarField,
};
pub use parser::load_icd_from_str;
pub use path::{PathError, ReferencePath, Segment};
pub use registry::IndexRegistry;
