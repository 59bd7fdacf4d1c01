// crates/icd-rs/src/path.rs

//! Reference-path expressions and their resolution.
//!
//! An expression is a whitespace-separated list of paths such as
//! `//@bus/@datas.3 //@bus/@datas.4`. Each path starts at the document root and
//! walks one `/`-delimited segment at a time; a segment names a field and may
//! select an element of a list field with a `.N` suffix. The leading `@` of a
//! segment is optional.
//!
//! Only structural lists are navigable. They are complete once the first pass
//! finishes, so the order in which pending references are resolved never
//! changes the result.

use crate::model::{Document, Node, NodeId};
use alloc::fmt;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

/// Errors raised while parsing or evaluating a reference path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// The path text does not follow the `//seg/seg.N` grammar.
    Malformed { path: String, reason: &'static str },
    /// The current object has no navigable field with this name.
    UnresolvedField { field: String, on: &'static str },
    /// The list index is past the end of the list.
    IndexOutOfRange {
        field: String,
        index: usize,
        len: usize,
    },
    /// A list field was used without selecting an element.
    MissingIndex { field: String },
    /// An index was applied to a single-valued field.
    NotAList { field: String },
    /// The path ends on something that is not an indexed node.
    NotANode { path: String },
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathError::Malformed { path, reason } => {
                write!(f, "malformed path {:?}: {}", path, reason)
            }
            PathError::UnresolvedField { field, on } => {
                write!(f, "no field '{}' on {}", field, on)
            }
            PathError::IndexOutOfRange { field, index, len } => write!(
                f,
                "index {} out of range for '{}' (length {})",
                index, field, len
            ),
            PathError::MissingIndex { field } => {
                write!(f, "list field '{}' needs an index", field)
            }
            PathError::NotAList { field } => write!(f, "field '{}' is not a list", field),
            PathError::NotANode { path } => {
                write!(f, "path {:?} does not designate an element", path)
            }
        }
    }
}

impl core::error::Error for PathError {}

// --- Grammar ---

/// One step of a reference path: `name` or `name.N`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub field: String,
    pub position: Option<usize>,
}

impl Segment {
    fn parse(text: &str, path: &str) -> Result<Self, PathError> {
        let malformed = |reason| PathError::Malformed {
            path: path.to_string(),
            reason,
        };
        let text = text.strip_prefix('@').unwrap_or(text);
        let (field, position) = match text.split_once('.') {
            Some((field, position)) => {
                let position = position
                    .parse::<usize>()
                    .map_err(|_| malformed("list index is not a non-negative integer"))?;
                (field, Some(position))
            }
            None => (text, None),
        };
        if field.is_empty() {
            return Err(malformed("empty segment"));
        }
        Ok(Self {
            field: field.to_string(),
            position,
        })
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.field)?;
        if let Some(position) = self.position {
            write!(f, ".{}", position)?;
        }
        Ok(())
    }
}

/// A single root-relative reference path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferencePath {
    pub segments: Vec<Segment>,
}

impl ReferencePath {
    /// Parses one path such as `//@devices.0/@channels.1`.
    pub fn parse(text: &str) -> Result<Self, PathError> {
        let rest = text.strip_prefix("//").ok_or(PathError::Malformed {
            path: text.to_string(),
            reason: "path must start with '//'",
        })?;
        if rest.is_empty() {
            return Ok(Self {
                segments: Vec::new(),
            });
        }
        let segments = rest
            .split('/')
            .map(|segment| Segment::parse(segment, text))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { segments })
    }

    /// Parses a whitespace-separated list of paths. A blank expression is an empty list.
    pub fn parse_expression(expression: &str) -> Result<Vec<Self>, PathError> {
        expression.split_whitespace().map(Self::parse).collect()
    }
}

impl fmt::Display for ReferencePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return write!(f, "//");
        }
        write!(f, "/")?;
        for segment in &self.segments {
            write!(f, "/{}", segment)?;
        }
        Ok(())
    }
}

// --- Resolution ---

/// Where the resolver currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cursor {
    Root,
    Bus,
    Node(NodeId),
}

/// The value of a field on the current object.
enum FieldValue<'d> {
    List(&'d [NodeId]),
    Single(Cursor),
}

fn describe(document: &Document, cursor: Cursor) -> &'static str {
    match cursor {
        Cursor::Root => "the document root",
        Cursor::Bus => "the bus",
        Cursor::Node(id) => document.node(id).kind().label(),
    }
}

/// Navigable fields of each object.
fn field<'d>(document: &'d Document, cursor: Cursor, name: &str) -> Option<FieldValue<'d>> {
    match cursor {
        Cursor::Root => match name {
            "devices" => Some(FieldValue::List(&document.devices)),
            "bus" => document.bus.as_ref().map(|_| FieldValue::Single(Cursor::Bus)),
            _ => None,
        },
        Cursor::Bus => {
            let bus = document.bus.as_ref()?;
            match name {
                "channels" => Some(FieldValue::List(&bus.channels)),
                "datas" => Some(FieldValue::List(&bus.datas)),
                "filters" => Some(FieldValue::List(&bus.filters)),
                _ => None,
            }
        }
        Cursor::Node(id) => {
            let list: &[NodeId] = match (document.node(id), name) {
                (Node::Device(n), "channels") => &n.channels.embedded,
                (Node::Channel(n), "dataContainers") => &n.data_containers,
                (Node::Channel(n), "datas") => &n.datas.embedded,
                (Node::DataContainer(n), "sublists") => &n.sublists,
                (Node::DataContainer(n), "datas") => &n.datas.embedded,
                (Node::Data(n), "datas") => &n.datas.embedded,
                (Node::Data(n), "filters") => &n.filters.embedded,
                _ => return None,
            };
            Some(FieldValue::List(list))
        }
    }
}

fn step(document: &Document, cursor: Cursor, segment: &Segment) -> Result<Cursor, PathError> {
    let value = field(document, cursor, &segment.field).ok_or_else(|| {
        PathError::UnresolvedField {
            field: segment.field.clone(),
            on: describe(document, cursor),
        }
    })?;
    match (value, segment.position) {
        (FieldValue::List(list), Some(position)) => list
            .get(position)
            .map(|id| Cursor::Node(*id))
            .ok_or(PathError::IndexOutOfRange {
                field: segment.field.clone(),
                index: position,
                len: list.len(),
            }),
        (FieldValue::List(_), None) => Err(PathError::MissingIndex {
            field: segment.field.clone(),
        }),
        (FieldValue::Single(next), None) => Ok(next),
        (FieldValue::Single(_), Some(_)) => Err(PathError::NotAList {
            field: segment.field.clone(),
        }),
    }
}

/// Evaluates one path from the document root.
pub fn resolve_path(document: &Document, path: &ReferencePath) -> Result<NodeId, PathError> {
    let mut cursor = Cursor::Root;
    for segment in &path.segments {
        cursor = step(document, cursor, segment)?;
    }
    match cursor {
        Cursor::Node(id) => Ok(id),
        Cursor::Root | Cursor::Bus => Err(PathError::NotANode {
            path: path.to_string(),
        }),
    }
}

impl Document {
    /// Resolves a reference-path expression to the nodes it designates, in order.
    pub fn resolve(&self, expression: &str) -> Result<Vec<NodeId>, PathError> {
        ReferencePath::parse_expression(expression)?
            .iter()
            .map(|path| resolve_path(self, path))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Bus, Channel, DataFilter, Device, ElementInfo};
    use alloc::vec;

    fn info(index: u64, name: &str) -> ElementInfo {
        ElementInfo {
            index,
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Builds a document with two bus filters and one device owning one channel.
    fn sample() -> Document {
        let mut doc = Document::default();
        let f0 = doc
            .insert(Node::DataFilter(DataFilter {
                element: info(10, "F0"),
                ..Default::default()
            }))
            .unwrap();
        let f1 = doc
            .insert(Node::DataFilter(DataFilter {
                element: info(11, "F1"),
                ..Default::default()
            }))
            .unwrap();
        let ch = doc
            .insert(Node::Channel(Channel {
                element: info(1, "C1"),
                ..Default::default()
            }))
            .unwrap();
        let mut device = Device {
            element: info(0, "D1"),
            ..Default::default()
        };
        device.channels.embedded.push(ch);
        let dev = doc.insert(Node::Device(device)).unwrap();
        doc.devices.push(dev);
        doc.bus = Some(Bus {
            filters: vec![f0, f1],
            ..Default::default()
        });
        doc
    }

    #[test]
    fn test_parse_path() {
        let path = ReferencePath::parse("//@bus/@filters.1").unwrap();
        assert_eq!(
            path.segments,
            vec![
                Segment {
                    field: "bus".to_string(),
                    position: None
                },
                Segment {
                    field: "filters".to_string(),
                    position: Some(1)
                },
            ]
        );
        assert_eq!(path.to_string(), "//@bus/@filters.1");

        // The '@' marker is optional.
        assert_eq!(ReferencePath::parse("//bus/filters.1").unwrap(), path);
    }

    #[test]
    fn test_parse_expression() {
        let paths =
            ReferencePath::parse_expression("//@bus/@filters.0  //@bus/@filters.1\n").unwrap();
        assert_eq!(paths.len(), 2);
        assert!(ReferencePath::parse_expression("").unwrap().is_empty());
        assert!(ReferencePath::parse_expression("   ").unwrap().is_empty());
    }

    #[test]
    fn test_parse_malformed() {
        assert!(matches!(
            ReferencePath::parse("@bus/@filters.0"),
            Err(PathError::Malformed { .. })
        ));
        assert!(matches!(
            ReferencePath::parse("//@bus/@filters.x"),
            Err(PathError::Malformed { .. })
        ));
        assert!(matches!(
            ReferencePath::parse("//@bus//@filters.0"),
            Err(PathError::Malformed { .. })
        ));
    }

    #[test]
    fn test_resolve_bus_filter() {
        let doc = sample();
        let ids = doc.resolve("//@bus/@filters.1").unwrap();
        assert_eq!(ids.len(), 1);
        assert_eq!(doc.node(ids[0]).name(), "F1");
    }

    #[test]
    fn test_resolve_several_paths_keeps_order() {
        let doc = sample();
        let ids = doc
            .resolve("//@bus/@filters.1 //@devices.0/@channels.0 //@bus/@filters.0")
            .unwrap();
        let names: Vec<&str> = ids.iter().map(|id| doc.node(*id).name()).collect();
        assert_eq!(names, ["F1", "C1", "F0"]);
    }

    #[test]
    fn test_resolve_out_of_range() {
        let doc = sample();
        assert_eq!(
            doc.resolve("//@bus/@filters.2"),
            Err(PathError::IndexOutOfRange {
                field: "filters".to_string(),
                index: 2,
                len: 2
            })
        );
    }

    #[test]
    fn test_resolve_unknown_field() {
        let doc = sample();
        assert!(matches!(
            doc.resolve("//@bus/@gadgets.0"),
            Err(PathError::UnresolvedField { on: "the bus", .. })
        ));
        assert!(matches!(
            doc.resolve("//@devices.0/@channels.0/@filters.0"),
            Err(PathError::UnresolvedField { on: "channel", .. })
        ));
    }

    #[test]
    fn test_resolve_shape_errors() {
        let doc = sample();
        assert!(matches!(
            doc.resolve("//@bus/@filters"),
            Err(PathError::MissingIndex { .. })
        ));
        assert!(matches!(
            doc.resolve("//@bus.0/@filters.0"),
            Err(PathError::NotAList { .. })
        ));
        assert!(matches!(doc.resolve("//@bus"), Err(PathError::NotANode { .. })));
        assert!(matches!(doc.resolve("//"), Err(PathError::NotANode { .. })));
    }

    #[test]
    fn test_resolve_without_bus() {
        let doc = Document::default();
        assert!(matches!(
            doc.resolve("//@bus/@filters.0"),
            Err(PathError::UnresolvedField { on: "the document root", .. })
        ));
    }
}
