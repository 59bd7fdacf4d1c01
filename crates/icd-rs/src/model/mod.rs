// crates/icd-rs/src/model/mod.rs

//! The typed ICD document graph.
//!
//! Every indexed element (device, channel, data container, data, filter) lives in a
//! single arena owned by the [`Document`]. Structural children and cross-references
//! are both stored as [`NodeId`] handles into that arena, so a node may be aliased by
//! any number of reference lists without being duplicated.

use crate::error::IcdError;
use crate::registry::IndexRegistry;
use alloc::borrow::Cow;
use alloc::string::String;
use alloc::vec::Vec;

pub mod nodes;
pub mod records;

pub use nodes::{Channel, Data, DataContainer, DataFilter, Device};
pub use records::{Config, DataContainerAttribute, EnumElement, Metadata};

// --- Handles ---

/// A stable handle to a node stored in a [`Document`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Position of the node in the arena.
    pub fn slot(self) -> usize {
        self.0 as usize
    }
}

/// The closed set of indexed node kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NodeKind {
    Device,
    Channel,
    DataContainer,
    Data,
    DataFilter,
}

impl NodeKind {
    /// Human readable name, used in log and error messages.
    pub fn label(self) -> &'static str {
        match self {
            NodeKind::Device => "device",
            NodeKind::Channel => "channel",
            NodeKind::DataContainer => "data container",
            NodeKind::Data => "data",
            NodeKind::DataFilter => "filter",
        }
    }
}

// --- Scalar field descriptors ---

/// How the canonical dump treats a scalar field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRole {
    /// Printed as `<field>:<value>`.
    Plain,
    /// The display name; already part of the node's own path segment.
    Name,
    /// The `property` key of a Config or EnumElement; already part of the parent segment.
    Property,
    /// The `index` of an indexed element.
    Index,
    /// A `typeChanged` marker.
    TypeChanged,
}

/// One scalar field of a node or record, as seen by the canonical dump.
///
/// Collection fields (configs, nested lists, references) never appear as a
/// `ScalarField`: they are traversed structurally instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScalarField<'a> {
    /// Canonical (snake_case) field name.
    pub name: &'static str,
    pub role: FieldRole,
    pub value: Cow<'a, str>,
}

impl<'a> ScalarField<'a> {
    pub fn plain(name: &'static str, value: &'a str) -> Self {
        Self::with_role(name, FieldRole::Plain, value)
    }

    pub fn with_role(name: &'static str, role: FieldRole, value: &'a str) -> Self {
        Self {
            name,
            role,
            value: Cow::Borrowed(value),
        }
    }
}

// --- Shared element data ---

/// Fields shared by every indexed ICD element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementInfo {
    /// Mandatory `@index`, unique within the document.
    pub index: u64,
    /// `@name`
    pub name: String,
    /// `@comment`
    pub comment: Option<String>,
    /// Text of each `<parents>` child, in document order.
    pub parents: Vec<String>,
    /// `<configs>` children, in document order.
    pub configs: Vec<Config>,
}

impl ElementInfo {
    /// Scalar fields common to all indexed elements.
    pub fn scalar_fields(&self) -> Vec<ScalarField<'_>> {
        alloc::vec![
            ScalarField {
                name: "index",
                role: FieldRole::Index,
                value: Cow::Owned(alloc::format!("{}", self.index)),
            },
            ScalarField::with_role("name", FieldRole::Name, &self.name),
            ScalarField::plain("comment", self.comment.as_deref().unwrap_or("")),
        ]
    }
}

/// A list filled both from a reference-path expression and from directly nested children.
///
/// The effective content is `referenced` (in expression order) followed by every
/// `embedded` entry that is not already referenced. Embedded children are never
/// handed to the path resolver.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkList {
    /// Targets of the reference-path expression, filled by the second parsing pass.
    pub referenced: Vec<NodeId>,
    /// Children nested directly under the owning element, filled by the first pass.
    pub embedded: Vec<NodeId>,
}

impl LinkList {
    /// Iterates the merged list.
    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.referenced.iter().copied().chain(
            self.embedded
                .iter()
                .copied()
                .filter(move |id| !self.referenced.contains(id)),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.referenced.is_empty() && self.embedded.is_empty()
    }
}

// --- Nodes ---

/// An indexed node of the graph.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Device(Device),
    Channel(Channel),
    DataContainer(DataContainer),
    Data(Data),
    DataFilter(DataFilter),
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Device(_) => NodeKind::Device,
            Node::Channel(_) => NodeKind::Channel,
            Node::DataContainer(_) => NodeKind::DataContainer,
            Node::Data(_) => NodeKind::Data,
            Node::DataFilter(_) => NodeKind::DataFilter,
        }
    }

    pub fn element(&self) -> &ElementInfo {
        match self {
            Node::Device(n) => &n.element,
            Node::Channel(n) => &n.element,
            Node::DataContainer(n) => &n.element,
            Node::Data(n) => &n.element,
            Node::DataFilter(n) => &n.element,
        }
    }

    pub fn name(&self) -> &str {
        &self.element().name
    }

    pub fn index(&self) -> u64 {
        self.element().index
    }

    /// All scalar fields of this node, shared element fields included.
    pub fn scalar_fields(&self) -> Vec<ScalarField<'_>> {
        let mut fields = self.element().scalar_fields();
        match self {
            Node::Device(_) => {}
            Node::Channel(n) => fields.extend(n.scalar_fields()),
            Node::DataContainer(n) => fields.extend(n.scalar_fields()),
            Node::Data(n) => fields.extend(n.scalar_fields()),
            Node::DataFilter(n) => fields.extend(n.scalar_fields()),
        }
        fields
    }

    pub fn as_device(&self) -> Option<&Device> {
        match self {
            Node::Device(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_channel(&self) -> Option<&Channel> {
        match self {
            Node::Channel(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_data_container(&self) -> Option<&DataContainer> {
        match self {
            Node::DataContainer(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_data(&self) -> Option<&Data> {
        match self {
            Node::Data(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_filter(&self) -> Option<&DataFilter> {
        match self {
            Node::DataFilter(n) => Some(n),
            _ => None,
        }
    }
}

// --- Document ---

/// The legacy top-level `<bus>` container.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bus {
    pub channels: Vec<NodeId>,
    pub datas: Vec<NodeId>,
    pub filters: Vec<NodeId>,
}

/// A fully parsed and resolved ICD file.
///
/// Owns every node of the graph and the index registry built while parsing.
/// A `Document` is only handed out once all references are resolved, and is
/// immutable afterwards.
#[derive(Debug, Clone, Default)]
pub struct Document {
    pub(crate) nodes: Vec<Node>,
    pub(crate) devices: Vec<NodeId>,
    pub(crate) bus: Option<Bus>,
    pub(crate) registry: IndexRegistry,
}

impl Document {
    /// Top-level devices, in document order.
    pub fn devices(&self) -> &[NodeId] {
        &self.devices
    }

    pub fn bus(&self) -> Option<&Bus> {
        self.bus.as_ref()
    }

    pub fn registry(&self) -> &IndexRegistry {
        &self.registry
    }

    /// Returns the node behind a handle produced by this document.
    ///
    /// # Panics
    /// Panics if `id` belongs to another document.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.slot()]
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.slot())
    }

    /// Looks up a node by its `@index`.
    pub fn by_index(&self, index: u64) -> Result<&Node, IcdError> {
        let id = self.registry.lookup(index)?;
        Ok(self.node(id))
    }

    /// Number of indexed nodes in the graph.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterates all nodes with their handles, in arena order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(slot, node)| (NodeId(slot as u32), node))
    }

    /// Stores a node in the arena and registers its index.
    pub(crate) fn insert(&mut self, node: Node) -> Result<NodeId, IcdError> {
        let id = NodeId(self.nodes.len() as u32);
        self.registry.register(node.index(), id)?;
        self.nodes.push(node);
        Ok(id)
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.slot())
    }
}
