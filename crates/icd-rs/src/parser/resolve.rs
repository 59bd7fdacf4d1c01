// crates/icd-rs/src/parser/resolve.rs

//! Pass 2: replaces every queued reference-path expression with the nodes it designates.

use super::{PendingReference, RefField};
use crate::error::IcdError;
use crate::model::{Document, LinkList, Node};
use alloc::vec::Vec;
use log::{debug, info, warn};

/// Resolves all pending references in place.
///
/// The first unresolvable path aborts the whole parse; the partially resolved
/// document is dropped.
pub(super) fn resolve_references(
    mut document: Document,
    pending: Vec<PendingReference>,
) -> Result<Document, IcdError> {
    let total = pending.len();

    for reference in pending {
        let index = document.node(reference.node).index();
        let targets = document.resolve(&reference.expression).map_err(|source| {
            IcdError::UnresolvedReference {
                index,
                field: reference.field.attribute(),
                expression: reference.expression.clone(),
                source,
            }
        })?;
        debug!(
            "Resolved {}.{} -> {} node(s)",
            index,
            reference.field.attribute(),
            targets.len()
        );

        match document
            .node_mut(reference.node)
            .and_then(|node| links_mut(node, reference.field))
        {
            Some(links) => links.referenced = targets,
            None => warn!(
                "Element {} has no '{}' reference list",
                index,
                reference.field.attribute()
            ),
        }
    }

    info!("Resolved {} reference expressions", total);
    Ok(document)
}

/// The reference list a pending entry writes into.
fn links_mut(node: &mut Node, field: RefField) -> Option<&mut LinkList> {
    match (node, field) {
        (Node::Device(n), RefField::Channels) => Some(&mut n.channels),
        (Node::Channel(n), RefField::Datas) => Some(&mut n.datas),
        (Node::DataContainer(n), RefField::Datas) => Some(&mut n.datas),
        (Node::Data(n), RefField::Datas) => Some(&mut n.datas),
        (Node::Data(n), RefField::Filters) => Some(&mut n.filters),
        _ => None,
    }
}
