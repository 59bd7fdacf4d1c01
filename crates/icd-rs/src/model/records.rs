// crates/icd-rs/src/model/records.rs

//! Leaf value records: configuration properties, enumeration literals,
//! metadata pairs and data container attributes.

use super::{FieldRole, ScalarField};
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

/// Represents a `<configs>` element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// `@property`, the key of this entry.
    pub property: String,
    pub value: String,
    pub type_name: String,
    pub comment: String,
    /// `@valuePattern`
    pub value_pattern: String,
    pub hidden: String,
    pub displayed: String,
    /// `@valueFormat`
    pub value_format: String,
    /// `@typeChanged`
    pub type_changed: String,
    pub symbols: String,
}

impl Config {
    pub fn scalar_fields(&self) -> Vec<ScalarField<'_>> {
        vec![
            ScalarField::with_role("property", FieldRole::Property, &self.property),
            ScalarField::plain("value", &self.value),
            ScalarField::plain("type", &self.type_name),
            ScalarField::plain("comment", &self.comment),
            ScalarField::plain("value_pattern", &self.value_pattern),
            ScalarField::plain("hidden", &self.hidden),
            ScalarField::plain("displayed", &self.displayed),
            ScalarField::plain("value_format", &self.value_format),
            ScalarField::with_role("type_changed", FieldRole::TypeChanged, &self.type_changed),
            ScalarField::plain("symbols", &self.symbols),
        ]
    }
}

/// Represents an `<enumElements>` element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnumElement {
    /// `@property`, the key of this literal.
    pub property: String,
    pub value: String,
    pub type_name: String,
    pub comment: String,
    /// `@valuePattern`
    pub value_pattern: String,
    /// `@typeChanged`
    pub type_changed: String,
}

impl EnumElement {
    pub fn scalar_fields(&self) -> Vec<ScalarField<'_>> {
        vec![
            ScalarField::with_role("property", FieldRole::Property, &self.property),
            ScalarField::plain("value", &self.value),
            ScalarField::plain("type", &self.type_name),
            ScalarField::plain("comment", &self.comment),
            ScalarField::plain("value_pattern", &self.value_pattern),
            ScalarField::with_role("type_changed", FieldRole::TypeChanged, &self.type_changed),
        ]
    }
}

/// Represents a `<metadatas key="..." value="..."/>` element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    pub key: String,
    pub value: String,
}

impl Metadata {
    pub fn scalar_fields(&self) -> Vec<ScalarField<'_>> {
        vec![
            ScalarField::with_role("key", FieldRole::Property, &self.key),
            ScalarField::plain("value", &self.value),
        ]
    }
}

/// Represents an `<attributes>` element of a data container.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataContainerAttribute {
    pub name: String,
    pub type_name: String,
    pub value: String,
    /// `@defaultValue`
    pub default_value: String,
    /// `@valuePattern`
    pub value_pattern: String,
}

impl DataContainerAttribute {
    pub fn scalar_fields(&self) -> Vec<ScalarField<'_>> {
        vec![
            ScalarField::with_role("name", FieldRole::Name, &self.name),
            ScalarField::plain("type", &self.type_name),
            ScalarField::plain("value", &self.value),
            ScalarField::plain("default_value", &self.default_value),
            ScalarField::plain("value_pattern", &self.value_pattern),
        ]
    }
}
