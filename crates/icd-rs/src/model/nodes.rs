// crates/icd-rs/src/model/nodes.rs

//! Indexed node kinds: devices, channels, data containers, data items and filters.

use super::records::{DataContainerAttribute, EnumElement, Metadata};
use super::{ElementInfo, FieldRole, LinkList, NodeId, ScalarField};
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

/// Represents a `<devices>` element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Device {
    pub element: ElementInfo,
    /// `@channels` references, plus `<channels>` nested directly under the device.
    pub channels: LinkList,
}

/// Represents a `<channels>` element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Channel {
    pub element: ElementInfo,
    /// `@type`
    pub type_name: String,
    /// `@typeChanged`
    pub type_changed: String,
    /// `<dataContainers>` children.
    pub data_containers: Vec<NodeId>,
    /// `@datas` references, plus `<datas>` children. Not part of the canonical dump.
    pub datas: LinkList,
}

impl Channel {
    pub fn scalar_fields(&self) -> Vec<ScalarField<'_>> {
        vec![
            ScalarField::plain("type", &self.type_name),
            ScalarField::with_role("type_changed", FieldRole::TypeChanged, &self.type_changed),
        ]
    }
}

/// Represents a `<dataContainers>` or `<sublists>` element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataContainer {
    pub element: ElementInfo,
    /// `@type`
    pub type_name: String,
    /// `<sublists>` children.
    pub sublists: Vec<NodeId>,
    /// `<attributes>` children.
    pub attributes: Vec<DataContainerAttribute>,
    /// `@datas` references, plus `<datas>` children.
    pub datas: LinkList,
}

impl DataContainer {
    pub fn scalar_fields(&self) -> Vec<ScalarField<'_>> {
        vec![ScalarField::plain("type", &self.type_name)]
    }
}

/// Represents a `<datas>` element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Data {
    pub element: ElementInfo,
    /// `@type`
    pub type_name: String,
    /// `@size`
    pub size: String,
    /// `@sizeFormat`
    pub size_format: String,
    /// `@min`
    pub min: String,
    /// `@minFormat`
    pub min_format: String,
    /// `@max`
    pub max: String,
    /// `@maxFormat`
    pub max_format: String,
    /// `@defaultValue`
    pub default_value: String,
    /// `@defaultValueFormat`
    pub default_value_format: String,
    /// `@unit`
    pub unit: String,
    /// `@typeChanged`
    pub type_changed: String,
    /// `@datas` references, plus `<datas>` children.
    pub datas: LinkList,
    /// `@filters` references, plus `<filters>` children.
    pub filters: LinkList,
    pub enum_elements: Vec<EnumElement>,
    pub metadatas: Vec<Metadata>,
    /// Text of each `<channelTypes>` child.
    pub channel_types: Vec<String>,
}

impl Data {
    pub fn scalar_fields(&self) -> Vec<ScalarField<'_>> {
        vec![
            ScalarField::plain("type", &self.type_name),
            ScalarField::plain("size", &self.size),
            ScalarField::plain("size_format", &self.size_format),
            ScalarField::plain("min", &self.min),
            ScalarField::plain("min_format", &self.min_format),
            ScalarField::plain("max", &self.max),
            ScalarField::plain("max_format", &self.max_format),
            ScalarField::plain("default_value", &self.default_value),
            ScalarField::plain("default_value_format", &self.default_value_format),
            ScalarField::plain("unit", &self.unit),
            ScalarField::with_role("type_changed", FieldRole::TypeChanged, &self.type_changed),
        ]
    }
}

/// Represents a `<filters>` element (filters and codecs).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataFilter {
    pub element: ElementInfo,
    /// `@sequence`
    pub sequence: String,
    /// `@sequenceFormat`
    pub sequence_format: String,
    /// `@type`
    pub type_name: String,
    /// Text of each `<channelTypes>` child.
    pub channel_types: Vec<String>,
}

impl DataFilter {
    pub fn scalar_fields(&self) -> Vec<ScalarField<'_>> {
        vec![
            ScalarField::plain("sequence", &self.sequence),
            ScalarField::plain("sequence_format", &self.sequence_format),
            ScalarField::plain("type", &self.type_name),
        ]
    }
}
