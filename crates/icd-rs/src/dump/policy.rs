// crates/icd-rs/src/dump/policy.rs

//! The attribute-inclusion policy of the canonical dump.

use super::DumpOptions;
use crate::model::{FieldRole, ScalarField};

/// Returns `true` if `field` must not be printed.
///
/// Collection fields never reach this point: nodes only describe their scalar
/// fields. Names and property keys are always excluded because they are part of
/// the path segment already.
pub(crate) fn is_excluded(field: &ScalarField<'_>, options: &DumpOptions) -> bool {
    let by_role = match field.role {
        FieldRole::Name | FieldRole::Property => true,
        FieldRole::TypeChanged => options.ignore_type_changed,
        FieldRole::Index => options.ignore_index,
        FieldRole::Plain => false,
    };
    by_role || (options.ignore_empty && field.value.is_empty())
}
