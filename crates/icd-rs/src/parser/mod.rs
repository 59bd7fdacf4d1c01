// crates/icd-rs/src/parser/mod.rs

//! Two-pass construction of the ICD document graph.
//!
//! Pass 1 (`build`) walks the element tree depth-first, creates every node,
//! registers its index and queues each reference-path attribute as a
//! [`PendingReference`]. Pass 2 (`resolve`) runs only once the whole graph
//! exists and replaces every queued expression with the nodes it designates.

mod build;
mod resolve;

use crate::error::IcdError;
use crate::model::{Document, NodeId, NodeKind};
use crate::xml;
use alloc::string::String;
use log::info;

/// A reference-holding attribute of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RefField {
    /// `@channels` of a device.
    Channels,
    /// `@datas` of a channel, data container or data.
    Datas,
    /// `@filters` of a data.
    Filters,
}

impl RefField {
    pub(crate) fn attribute(self) -> &'static str {
        match self {
            RefField::Channels => "channels",
            RefField::Datas => "datas",
            RefField::Filters => "filters",
        }
    }
}

/// A reference-path expression waiting for the second pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PendingReference {
    pub node: NodeId,
    pub field: RefField,
    pub expression: String,
}

/// Parses an ICD XML string slice into a fully resolved [`Document`].
///
/// # Errors
/// Returns an `IcdError` if the XML is malformed, an indexed element lacks a
/// valid unique `@index`, or any reference path cannot be resolved. No partial
/// document is returned on failure.
pub fn load_icd_from_str(xml_content: &str) -> Result<Document, IcdError> {
    // 1. Read the raw XML into an element tree.
    let root = xml::read_document(xml_content)?;

    // 2. Pass 1: structural build.
    let (document, pending) = build::build_document(&root)?;
    info!(
        "Built {} nodes ({} devices), {} references pending",
        document.len(),
        document.devices().len(),
        pending.len()
    );

    // 3. Pass 2: reference resolution.
    let document = resolve::resolve_references(document, pending)?;
    Ok(document)
}

/// Parses the `@index` attribute of an indexed element.
pub(crate) fn parse_index(raw: Option<&str>, kind: NodeKind) -> Result<u64, IcdError> {
    let element = tag_of(kind);
    let raw = raw.ok_or(IcdError::MissingAttribute {
        element,
        attribute: "index",
    })?;
    raw.trim()
        .parse::<u64>()
        .map_err(|_| IcdError::InvalidAttributeFormat {
            element,
            attribute: "index",
            value: String::from(raw),
        })
}

/// XML tag used for each node kind in the source dialect.
pub(crate) fn tag_of(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::Device => "devices",
        NodeKind::Channel => "channels",
        NodeKind::DataContainer => "dataContainers",
        NodeKind::Data => "datas",
        NodeKind::DataFilter => "filters",
    }
}
