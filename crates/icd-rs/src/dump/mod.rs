// crates/icd-rs/src/dump/mod.rs

//! Canonical flattening of a resolved document.
//!
//! The dump walks the graph depth-first from every device (and from the bus,
//! when present) and records one canonical path per node and per printed
//! scalar field. Field values are embedded in the key itself
//! (`D1/C1/type:A429`), so two revisions that differ only in a value produce
//! different, independently sortable lines. The resulting keys are sorted and
//! unique by construction, which makes the output a stable diff substrate.

mod options;
mod policy;

pub use options::DumpOptions;

use crate::error::IcdError;
use crate::model::{
    Config, DataContainerAttribute, Document, EnumElement, Metadata, Node, NodeId, ScalarField,
};
use alloc::borrow::Cow;
use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use log::{info, trace, warn};

/// Path segment under which the bus content is dumped.
const BUS_SEGMENT: &str = "bus";

/// What a canonical path was recorded for.
#[derive(Debug, Clone, PartialEq)]
pub enum Entry<'d> {
    /// The `<bus>` container.
    Bus,
    /// An indexed node.
    Node(NodeId),
    /// A data container attribute.
    Attribute(&'d DataContainerAttribute),
    /// A printed scalar value.
    Value(Cow<'d, str>),
}

/// The result of a dump: canonical paths mapped to what they were recorded for.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CanonicalDump<'d> {
    entries: BTreeMap<String, Entry<'d>>,
}

impl<'d> CanonicalDump<'d> {
    /// Canonical paths in lexicographic order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn get(&self, path: &str) -> Option<&Entry<'d>> {
        self.entries.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    pub fn entries(&self) -> &BTreeMap<String, Entry<'d>> {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consumes the dump and returns the sorted paths.
    pub fn into_paths(self) -> Vec<String> {
        self.entries.into_keys().collect()
    }

    /// The sorted paths, one per line.
    pub fn to_text(&self) -> String {
        let mut text = String::new();
        for path in self.paths() {
            text.push_str(path);
            text.push('\n');
        }
        text
    }

    fn record(&mut self, path: String, entry: Entry<'d>) {
        trace!("Recording {}", path);
        self.entries.insert(path, entry);
    }
}

/// Produces canonical dumps of a document.
#[derive(Debug, Clone, Copy)]
pub struct Dumper<'d> {
    document: &'d Document,
    options: DumpOptions,
}

impl<'d> Dumper<'d> {
    pub fn new(document: &'d Document, options: DumpOptions) -> Self {
        Self { document, options }
    }

    pub fn options(&self) -> &DumpOptions {
        &self.options
    }

    /// Dumps every device and the bus.
    pub fn dump(&self) -> CanonicalDump<'d> {
        let mut walk = Walk::new(self.document, self.options);

        for (position, &device) in self.document.devices().iter().enumerate() {
            walk.node("", Some(position), device);
        }

        if let Some(bus) = self.document.bus() {
            walk.out.record(String::from(BUS_SEGMENT), Entry::Bus);
            walk.list(BUS_SEGMENT, &bus.channels);
            walk.list(BUS_SEGMENT, &bus.datas);
            walk.list(BUS_SEGMENT, &bus.filters);
        }

        info!("Dumped {} canonical paths", walk.out.len());
        walk.out
    }

    /// Dumps only the sub-graph below the node with the given `@index`.
    ///
    /// # Errors
    /// Returns `IcdError::UnknownIndex` if no node carries that index.
    pub fn dump_index(&self, index: u64) -> Result<CanonicalDump<'d>, IcdError> {
        let id = self.document.registry().lookup(index)?;
        let mut walk = Walk::new(self.document, self.options);
        walk.node("", None, id);
        info!("Dumped {} canonical paths below index {}", walk.out.len(), index);
        Ok(walk.out)
    }
}

/// State of one depth-first traversal.
struct Walk<'d> {
    document: &'d Document,
    options: DumpOptions,
    out: CanonicalDump<'d>,
    /// Nodes on the current path, used to stop on reference cycles.
    ancestors: Vec<NodeId>,
}

impl<'d> Walk<'d> {
    fn new(document: &'d Document, options: DumpOptions) -> Self {
        Self {
            document,
            options,
            out: CanonicalDump::default(),
            ancestors: Vec::new(),
        }
    }

    fn segment(&self, position: Option<usize>, name: &str) -> String {
        match position {
            Some(position) if !self.options.ignore_order => format!("[{}]{}", position, name),
            _ => String::from(name),
        }
    }

    fn node(&mut self, parent: &str, position: Option<usize>, id: NodeId) {
        let document = self.document;
        let node = document.node(id);
        let path = join(parent, &self.segment(position, node.name()));

        self.out.record(path.clone(), Entry::Node(id));
        self.fields(&path, node.scalar_fields());
        self.keyed(
            &path,
            "Config",
            &node.element().configs,
            |c: &'d Config| c.property.as_str(),
            Config::scalar_fields,
        );

        // Leaf records belong to the node itself and are complete even on a repeat visit.
        match node {
            Node::DataContainer(n) => {
                let reserved: Vec<&'static str> =
                    node.scalar_fields().iter().map(|field| field.name).collect();
                self.attributes(&path, &n.attributes, &reserved);
            }
            Node::Data(n) => {
                self.keyed(
                    &path,
                    "Enum",
                    &n.enum_elements,
                    |e: &'d EnumElement| e.property.as_str(),
                    EnumElement::scalar_fields,
                );
                self.keyed(
                    &path,
                    "Metadata",
                    &n.metadatas,
                    |m: &'d Metadata| m.key.as_str(),
                    Metadata::scalar_fields,
                );
            }
            Node::Device(_) | Node::Channel(_) | Node::DataFilter(_) => {}
        }

        if self.ancestors.contains(&id) {
            warn!("Reference cycle at {}; not descending further", path);
            return;
        }
        self.ancestors.push(id);

        match node {
            Node::Device(n) => self.links(&path, n.channels.iter()),
            // Data referenced by a channel is reached through its containers or the bus.
            Node::Channel(n) => self.list(&path, &n.data_containers),
            Node::DataContainer(n) => {
                self.links(&path, n.datas.iter());
                self.list(&path, &n.sublists);
            }
            Node::Data(n) => {
                self.links(&path, n.datas.iter());
                self.links(&path, n.filters.iter());
            }
            Node::DataFilter(_) => {}
        }

        self.ancestors.pop();
    }

    fn list(&mut self, parent: &str, ids: &[NodeId]) {
        self.links(parent, ids.iter().copied());
    }

    fn links(&mut self, parent: &str, ids: impl Iterator<Item = NodeId>) {
        for (position, id) in ids.enumerate() {
            self.node(parent, Some(position), id);
        }
    }

    /// Records the printable scalar fields of an item as `<path>/<field>:<value>`.
    fn fields(&mut self, path: &str, fields: Vec<ScalarField<'d>>) {
        for field in fields {
            if policy::is_excluded(&field, &self.options) {
                continue;
            }
            let key = format!("{}/{}:{}", path, field.name, field.value);
            self.out.record(key, Entry::Value(field.value));
        }
    }

    /// Records keyed records under `<path>/<group>/<key>`. A later record with the
    /// same key replaces an earlier one.
    fn keyed<T>(
        &mut self,
        path: &str,
        group: &str,
        items: &'d [T],
        key: impl Fn(&'d T) -> &'d str,
        fields: impl Fn(&'d T) -> Vec<ScalarField<'d>>,
    ) {
        let mut by_key: BTreeMap<&'d str, &'d T> = BTreeMap::new();
        for item in items {
            by_key.insert(key(item), item);
        }
        for (key, item) in by_key {
            self.fields(&format!("{}/{}/{}", path, group, key), fields(item));
        }
    }

    /// Container attributes are recorded below `<path>/` (hence the double
    /// separator), and their value is also printed as `<path>/<name>:<value>`
    /// unless `name` is one of the container's own field names.
    fn attributes(
        &mut self,
        path: &str,
        attributes: &'d [DataContainerAttribute],
        reserved: &[&str],
    ) {
        let parent = format!("{}/", path);
        for (position, attribute) in attributes.iter().enumerate() {
            let own = format!("{}/{}", parent, self.segment(Some(position), &attribute.name));
            self.out.record(own.clone(), Entry::Attribute(attribute));
            self.fields(&own, attribute.scalar_fields());

            if self.options.ignore_empty && attribute.value.is_empty() {
                continue;
            }
            if reserved.contains(&attribute.name.as_str()) {
                warn!(
                    "Attribute '{}' of {} shadows a container field; only {} is recorded",
                    attribute.name, path, own
                );
                continue;
            }
            self.out.record(
                format!("{}/{}:{}", path, attribute.name, attribute.value),
                Entry::Value(Cow::Borrowed(&attribute.value)),
            );
        }
    }
}

fn join(parent: &str, segment: &str) -> String {
    if parent.is_empty() {
        String::from(segment)
    } else {
        format!("{}/{}", parent, segment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::load_icd_from_str;

    const XML: &str = r#"<ICD>
  <devices index="0" name="D1" comment="main">
    <configs property="Rate" value="10" type="int"/>
    <configs property="Rate" value="20" type="int"/>
    <channels index="1" name="C1" type="A429" typeChanged="false"/>
  </devices>
  <devices index="5" name="D2"/>
</ICD>"#;

    #[test]
    fn test_device_fields_and_configs() {
        let doc = load_icd_from_str(XML).unwrap();
        let dump = Dumper::new(&doc, DumpOptions::default()).dump();

        assert!(matches!(dump.get("D1"), Some(Entry::Node(_))));
        assert!(dump.contains("D1/comment:main"));
        assert!(dump.contains("D1/C1"));
        assert!(dump.contains("D1/C1/type:A429"));
        assert!(!dump.contains("D1/C1/type_changed:false"));
        assert!(!dump.contains("D1/index:0"));
        assert!(!dump.paths().any(|p| p.contains("name:")));

        // Same property twice: the last one wins.
        assert!(dump.contains("D1/Config/Rate/value:20"));
        assert!(!dump.contains("D1/Config/Rate/value:10"));
        assert!(!dump.paths().any(|p| p.contains("property:")));

        assert!(dump.contains("D2"));
    }

    #[test]
    fn test_index_and_type_changed_can_be_kept() {
        let doc = load_icd_from_str(XML).unwrap();
        let options = DumpOptions {
            ignore_type_changed: false,
            ignore_index: false,
            ..Default::default()
        };
        let dump = Dumper::new(&doc, options).dump();
        assert!(dump.contains("D1/index:0"));
        assert!(dump.contains("D1/C1/index:1"));
        assert!(dump.contains("D1/C1/type_changed:false"));
        assert!(dump.contains("D1/Config/Rate/type_changed:false"));
    }

    #[test]
    fn test_ignore_empty() {
        let doc = load_icd_from_str(XML).unwrap();
        let kept = Dumper::new(&doc, DumpOptions::default()).dump();
        assert!(kept.contains("D2/comment:"));

        let options = DumpOptions {
            ignore_empty: true,
            ..Default::default()
        };
        let dump = Dumper::new(&doc, options).dump();
        assert!(!dump.contains("D2/comment:"));
        assert!(dump.paths().all(|p| !p.ends_with(':')));
    }

    #[test]
    fn test_keep_order_prefixes_positions() {
        let doc = load_icd_from_str(XML).unwrap();
        let options = DumpOptions {
            ignore_order: false,
            ..Default::default()
        };
        let dump = Dumper::new(&doc, options).dump();
        assert!(dump.contains("[0]D1"));
        assert!(dump.contains("[0]D1/[0]C1/type:A429"));
        assert!(dump.contains("[1]D2"));
    }

    #[test]
    fn test_dump_index() {
        let doc = load_icd_from_str(XML).unwrap();
        let dumper = Dumper::new(&doc, DumpOptions::default());
        let dump = dumper.dump_index(1).unwrap();
        assert_eq!(dump.paths().collect::<Vec<_>>(), ["C1", "C1/comment:", "C1/type:A429"]);
        assert!(matches!(
            dumper.dump_index(99),
            Err(IcdError::UnknownIndex { index: 99 })
        ));
    }

    #[test]
    fn test_to_text_is_sorted() {
        let doc = load_icd_from_str(XML).unwrap();
        let text = Dumper::new(&doc, DumpOptions::default()).dump().to_text();
        let lines: Vec<&str> = text.lines().collect();
        let mut sorted = lines.clone();
        sorted.sort();
        assert_eq!(lines, sorted);
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn test_reference_cycle_terminates() {
        let xml = r#"<ICD><bus>
  <datas index="1" name="A" datas="//@bus/@datas.1"/>
  <datas index="2" name="B" datas="//@bus/@datas.0"/>
</bus></ICD>"#;
        let doc = load_icd_from_str(xml).unwrap();
        let dump = Dumper::new(&doc, DumpOptions::default()).dump();
        assert!(dump.contains("bus/A/B"));
        assert!(dump.contains("bus/A/B/A"));
        assert!(!dump.contains("bus/A/B/A/B"));
    }

    #[test]
    fn test_repeated_node_keeps_its_leaf_records() {
        let xml = r#"<ICD><bus>
  <datas index="1" name="A" datas="//@bus/@datas.1">
    <configs property="P" value="1"/>
    <enumElements property="ON" value="1"/>
    <metadatas key="origin" value="sensor"/>
  </datas>
  <datas index="2" name="B" datas="//@bus/@datas.0"/>
</bus></ICD>"#;
        let doc = load_icd_from_str(xml).unwrap();
        let dump = Dumper::new(&doc, DumpOptions::default()).dump();
        for prefix in ["bus/A", "bus/A/B/A"] {
            assert!(dump.contains(&format!("{}/Config/P/value:1", prefix)));
            assert!(dump.contains(&format!("{}/Enum/ON/value:1", prefix)), "{}", prefix);
            assert!(dump.contains(&format!("{}/Metadata/origin/value:sensor", prefix)));
        }
    }

    #[test]
    fn test_attribute_named_like_a_container_field() {
        let xml = r#"<ICD>
  <devices index="0" name="D1">
    <channels index="1" name="C1">
      <dataContainers index="2" name="CT1" type="Label">
        <attributes name="type" value="Word"/>
        <attributes name="Direction" value="In"/>
      </dataContainers>
    </channels>
  </devices>
</ICD>"#;
        let doc = load_icd_from_str(xml).unwrap();
        let dump = Dumper::new(&doc, DumpOptions::default()).dump();

        let types: Vec<&str> = dump
            .paths()
            .filter(|p| p.starts_with("D1/C1/CT1/type:"))
            .collect();
        assert_eq!(types, ["D1/C1/CT1/type:Label"]);
        // The attribute stays visible under its own node.
        assert!(dump.contains("D1/C1/CT1//type/value:Word"));
        assert!(dump.contains("D1/C1/CT1/Direction:In"));
    }
}
