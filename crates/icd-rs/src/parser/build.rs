// crates/icd-rs/src/parser/build.rs

//! Pass 1: instantiates nodes from the element tree.

use super::{PendingReference, RefField, parse_index};
use crate::error::IcdError;
use crate::model::{
    Bus, Channel, Config, Data, DataContainer, DataContainerAttribute, DataFilter, Device,
    Document, ElementInfo, EnumElement, Metadata, Node, NodeId, NodeKind,
};
use crate::xml::XmlElement;
use alloc::string::String;
use alloc::vec::Vec;
use log::{debug, trace, warn};

/// Default rendering of absent boolean attributes.
const FALSE: &str = "false";
/// Default rendering of absent numeric attributes.
const ZERO: &str = "0";

/// Builds the unresolved graph and the list of references to resolve.
pub(super) fn build_document(
    root: &XmlElement,
) -> Result<(Document, Vec<PendingReference>), IcdError> {
    let mut builder = Builder::default();

    for child in &root.children {
        trace!("Root: adding <{}>", child.tag);
        match child.tag.as_str() {
            "devices" => {
                let id = builder.device(child)?;
                builder.document.devices.push(id);
            }
            "bus" => builder.bus(child)?,
            other => unknown_tag(other, "ICD"),
        }
    }

    Ok((builder.document, builder.pending))
}

#[derive(Default)]
struct Builder {
    document: Document,
    pending: Vec<PendingReference>,
}

impl Builder {
    /// Stores a finished node and registers its index.
    fn insert(&mut self, node: Node) -> Result<NodeId, IcdError> {
        let kind = node.kind();
        let index = node.index();
        let id = self.document.insert(node)?;
        debug!("Created {} {} (index {})", kind.label(), self.document.node(id).name(), index);
        Ok(id)
    }

    /// Queues `attribute` of `node` for the second pass, if present.
    fn queue(&mut self, node: NodeId, field: RefField, expression: Option<&str>) {
        if let Some(expression) = expression {
            trace!("Queueing {:?}.{} = {:?}", node, field.attribute(), expression);
            self.pending.push(PendingReference {
                node,
                field,
                expression: String::from(expression),
            });
        }
    }

    fn bus(&mut self, el: &XmlElement) -> Result<(), IcdError> {
        // A second <bus> section extends the first one.
        let mut bus = match self.document.bus.take() {
            Some(existing) => {
                debug!("Merging additional <bus> section");
                existing
            }
            None => Bus::default(),
        };

        for child in &el.children {
            match child.tag.as_str() {
                "channels" => bus.channels.push(self.channel(child)?),
                "datas" => bus.datas.push(self.data(child)?),
                "filters" => bus.filters.push(self.filter(child)?),
                other => unknown_tag(other, "bus"),
            }
        }

        self.document.bus = Some(bus);
        Ok(())
    }

    fn device(&mut self, el: &XmlElement) -> Result<NodeId, IcdError> {
        let mut device = Device {
            element: element_info(el, NodeKind::Device)?,
            ..Default::default()
        };

        for child in &el.children {
            if common_child(&mut device.element, child) {
                continue;
            }
            match child.tag.as_str() {
                "channels" => device.channels.embedded.push(self.channel(child)?),
                other => unknown_tag(other, "device"),
            }
        }

        let id = self.insert(Node::Device(device))?;
        self.queue(id, RefField::Channels, el.attribute("channels"));
        Ok(id)
    }

    fn channel(&mut self, el: &XmlElement) -> Result<NodeId, IcdError> {
        let mut channel = Channel {
            element: element_info(el, NodeKind::Channel)?,
            type_name: attr(el, "type"),
            type_changed: attr(el, "typeChanged"),
            ..Default::default()
        };

        for child in &el.children {
            if common_child(&mut channel.element, child) {
                continue;
            }
            match child.tag.as_str() {
                "dataContainers" => channel.data_containers.push(self.container(child)?),
                "datas" => channel.datas.embedded.push(self.data(child)?),
                other => unknown_tag(other, "channel"),
            }
        }

        let id = self.insert(Node::Channel(channel))?;
        self.queue(id, RefField::Datas, el.attribute("datas"));
        Ok(id)
    }

    fn container(&mut self, el: &XmlElement) -> Result<NodeId, IcdError> {
        let mut container = DataContainer {
            element: element_info(el, NodeKind::DataContainer)?,
            type_name: attr(el, "type"),
            ..Default::default()
        };

        for child in &el.children {
            if common_child(&mut container.element, child) {
                continue;
            }
            match child.tag.as_str() {
                "sublists" => container.sublists.push(self.container(child)?),
                "datas" => container.datas.embedded.push(self.data(child)?),
                "attributes" => container.attributes.push(container_attribute(child)),
                other => unknown_tag(other, "data container"),
            }
        }

        let id = self.insert(Node::DataContainer(container))?;
        self.queue(id, RefField::Datas, el.attribute("datas"));
        Ok(id)
    }

    fn data(&mut self, el: &XmlElement) -> Result<NodeId, IcdError> {
        let mut data = Data {
            element: element_info(el, NodeKind::Data)?,
            type_name: attr(el, "type"),
            size: attr_or(el, "size", ZERO),
            size_format: attr(el, "sizeFormat"),
            min: attr(el, "min"),
            min_format: attr(el, "minFormat"),
            max: attr(el, "max"),
            max_format: attr(el, "maxFormat"),
            default_value: attr(el, "defaultValue"),
            default_value_format: attr(el, "defaultValueFormat"),
            unit: attr(el, "unit"),
            type_changed: attr_or(el, "typeChanged", FALSE),
            ..Default::default()
        };

        for child in &el.children {
            if common_child(&mut data.element, child) {
                continue;
            }
            match child.tag.as_str() {
                "channelTypes" => data.channel_types.push(String::from(child.text())),
                "metadatas" => data.metadatas.push(metadata(child)),
                "datas" => data.datas.embedded.push(self.data(child)?),
                "filters" => data.filters.embedded.push(self.filter(child)?),
                "enumElements" => data.enum_elements.push(enum_element(child)),
                other => unknown_tag(other, "data"),
            }
        }

        let id = self.insert(Node::Data(data))?;
        self.queue(id, RefField::Filters, el.attribute("filters"));
        self.queue(id, RefField::Datas, el.attribute("datas"));
        Ok(id)
    }

    fn filter(&mut self, el: &XmlElement) -> Result<NodeId, IcdError> {
        let mut filter = DataFilter {
            element: element_info(el, NodeKind::DataFilter)?,
            sequence: attr_or(el, "sequence", ZERO),
            sequence_format: attr(el, "sequenceFormat"),
            type_name: attr(el, "type"),
            ..Default::default()
        };

        for child in &el.children {
            if common_child(&mut filter.element, child) {
                continue;
            }
            match child.tag.as_str() {
                "channelTypes" => filter.channel_types.push(String::from(child.text())),
                other => unknown_tag(other, "filter"),
            }
        }

        self.insert(Node::DataFilter(filter))
    }
}

// --- Element helpers ---

fn element_info(el: &XmlElement, kind: NodeKind) -> Result<ElementInfo, IcdError> {
    Ok(ElementInfo {
        index: parse_index(el.attribute("index"), kind)?,
        name: attr(el, "name"),
        comment: el.attribute("comment").map(String::from),
        parents: Vec::new(),
        configs: Vec::new(),
    })
}

/// Handles the children every indexed element accepts. Returns `false` if the
/// tag is not one of them.
fn common_child(element: &mut ElementInfo, child: &XmlElement) -> bool {
    match child.tag.as_str() {
        "parents" => element.parents.push(String::from(child.text())),
        "configs" => element.configs.push(config(child)),
        _ => return false,
    }
    true
}

fn unknown_tag(tag: &str, parent: &str) {
    warn!("Unknown tag '{}' for {}", tag, parent);
}

fn attr(el: &XmlElement, name: &str) -> String {
    attr_or(el, name, "")
}

fn attr_or(el: &XmlElement, name: &str, default: &str) -> String {
    String::from(el.attribute(name).unwrap_or(default))
}

// --- Leaf records ---

fn config(el: &XmlElement) -> Config {
    Config {
        property: attr(el, "property"),
        value: attr(el, "value"),
        type_name: attr(el, "type"),
        comment: attr(el, "comment"),
        value_pattern: attr(el, "valuePattern"),
        hidden: attr_or(el, "hidden", FALSE),
        displayed: attr_or(el, "displayed", FALSE),
        value_format: attr(el, "valueFormat"),
        type_changed: attr_or(el, "typeChanged", FALSE),
        symbols: attr(el, "symbols"),
    }
}

fn enum_element(el: &XmlElement) -> EnumElement {
    EnumElement {
        property: attr(el, "property"),
        value: attr(el, "value"),
        type_name: attr(el, "type"),
        comment: attr(el, "comment"),
        value_pattern: attr(el, "valuePattern"),
        type_changed: attr_or(el, "typeChanged", FALSE),
    }
}

fn metadata(el: &XmlElement) -> Metadata {
    Metadata {
        key: attr(el, "key"),
        value: attr(el, "value"),
    }
}

fn container_attribute(el: &XmlElement) -> DataContainerAttribute {
    DataContainerAttribute {
        name: attr(el, "name"),
        type_name: attr(el, "type"),
        value: attr(el, "value"),
        default_value: attr(el, "defaultValue"),
        value_pattern: attr(el, "valuePattern"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::read_document;

    fn build(xml: &str) -> Result<(Document, Vec<PendingReference>), IcdError> {
        build_document(&read_document(xml).unwrap())
    }

    #[test]
    fn test_build_queues_references() {
        let (doc, pending) = build(
            r#"<ICD>
  <devices index="0" name="D1" channels="//@bus/@channels.0"/>
  <bus>
    <channels index="1" name="C1" datas="//@bus/@datas.0">
      <dataContainers index="2" name="CT1" datas=""/>
    </channels>
    <datas index="3" name="X" filters="//@bus/@filters.0" datas=""/>
    <filters index="4" name="F"/>
  </bus>
</ICD>"#,
        )
        .unwrap();

        assert_eq!(doc.len(), 5);
        assert_eq!(doc.devices().len(), 1);
        let bus = doc.bus().unwrap();
        assert_eq!((bus.channels.len(), bus.datas.len(), bus.filters.len()), (1, 1, 1));

        let fields: Vec<(u64, &str, &str)> = pending
            .iter()
            .map(|p| (doc.node(p.node).index(), p.field.attribute(), p.expression.as_str()))
            .collect();
        assert_eq!(
            fields,
            [
                (0, "channels", "//@bus/@channels.0"),
                (2, "datas", ""),
                (1, "datas", "//@bus/@datas.0"),
                (3, "filters", "//@bus/@filters.0"),
                (3, "datas", ""),
            ]
        );
    }

    #[test]
    fn test_build_defaults() {
        let (doc, _) = build(
            r#"<ICD><bus>
  <datas index="5" name="D">
    <configs property="P" value="1"/>
    <enumElements property="ON" value="1"/>
  </datas>
  <channels index="6" name="C"/>
  <filters index="7" name="F"/>
</bus></ICD>"#,
        )
        .unwrap();

        let data = doc.by_index(5).unwrap().as_data().unwrap();
        assert_eq!(data.size, "0");
        assert_eq!(data.type_changed, "false");
        assert_eq!(data.unit, "");
        assert_eq!(data.element.comment, None);
        assert_eq!(data.element.configs[0].hidden, "false");
        assert_eq!(data.element.configs[0].value, "1");
        assert_eq!(data.enum_elements[0].type_changed, "false");

        let channel = doc.by_index(6).unwrap().as_channel().unwrap();
        assert_eq!(channel.type_changed, "");

        let filter = doc.by_index(7).unwrap().as_filter().unwrap();
        assert_eq!(filter.sequence, "0");
    }

    #[test]
    fn test_build_collects_children() {
        let (doc, _) = build(
            r#"<ICD><bus>
  <datas index="1" name="D" comment="c">
    <parents>P1</parents>
    <parents>P2</parents>
    <channelTypes>A429</channelTypes>
    <metadatas key="k" value="v"/>
    <datas index="2" name="Inner"/>
    <filters index="3" name="F"/>
  </datas>
</bus></ICD>"#,
        )
        .unwrap();

        let data = doc.by_index(1).unwrap().as_data().unwrap();
        assert_eq!(data.element.comment.as_deref(), Some("c"));
        assert_eq!(data.element.parents, ["P1", "P2"]);
        assert_eq!(data.channel_types, ["A429"]);
        assert_eq!(data.metadatas[0].key, "k");
        assert_eq!(data.datas.embedded.len(), 1);
        assert_eq!(data.filters.embedded.len(), 1);
        // Embedded children are not references.
        assert!(data.datas.referenced.is_empty());
    }

    #[test]
    fn test_unknown_tags_are_skipped() {
        let (doc, _) = build(
            r#"<ICD>
  <gadgets index="9"/>
  <devices index="0" name="D1"><widget/></devices>
  <bus><channels index="1" name="C1"><unknown index="1"/></channels></bus>
</ICD>"#,
        )
        .unwrap();
        // The unknown subtrees are not instantiated, so their indices are not registered.
        assert_eq!(doc.len(), 2);
        assert!(!doc.registry().contains(9));
    }

    #[test]
    fn test_missing_index_is_fatal() {
        let result = build(r#"<ICD><bus><datas name="NoIndex"/></bus></ICD>"#);
        assert!(matches!(
            result,
            Err(IcdError::MissingAttribute {
                element: "datas",
                attribute: "index"
            })
        ));
    }

    #[test]
    fn test_duplicate_index_is_fatal() {
        let result = build(
            r#"<ICD><bus><datas index="1" name="A"/><filters index="1" name="B"/></bus></ICD>"#,
        );
        assert!(matches!(result, Err(IcdError::DuplicateIndex { index: 1 })));
    }

    #[test]
    fn test_second_bus_section_is_merged() {
        let (doc, _) = build(
            r#"<ICD><bus><datas index="1" name="A"/></bus><bus><datas index="2" name="B"/></bus></ICD>"#,
        )
        .unwrap();
        assert_eq!(doc.bus().unwrap().datas.len(), 2);
    }
}
