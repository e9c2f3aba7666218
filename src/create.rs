//! Server shape records to live shapes.
//!
//! The concrete shape types live outside this crate; a `ShapeFactory` turns a
//! record into one once every id the record references has been resolved.

#[cfg(test)]
#[path = "create_test.rs"]
mod create_test;

use serde::{Deserialize, Serialize};

use crate::groups::GroupMember;
use crate::id::{GlobalId, LocalId};
use crate::scene::Scene;

/// A shape as sent by the server. Type-specific fields stay in `props`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerShape {
    pub uuid: GlobalId,
    #[serde(rename = "type_")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge: Option<u32>,
    /// Active variant of a toggle composite.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_variant: Option<GlobalId>,
    /// Variants of a toggle composite.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variants: Vec<ServerVariant>,
    #[serde(flatten)]
    pub props: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerVariant {
    pub uuid: GlobalId,
    pub name: String,
}

/// Local ids for the shapes a record references.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ResolvedRefs {
    pub active_variant: Option<LocalId>,
    /// Variants whose shapes are known locally, in record order.
    pub variants: Vec<(LocalId, String)>,
}

/// Builds live shapes from server records.
pub trait ShapeFactory<S> {
    /// Returns `None` for record types the factory does not handle.
    fn build(&mut self, record: &ServerShape, refs: &ResolvedRefs) -> Option<S>;
}

impl<S> Scene<S> {
    /// Build and register a shape from a server record.
    ///
    /// Group membership is recorded first, reserving the record's local id so
    /// the group can refer to it before the shape exists; the reservation is
    /// consumed when the shape is claimed. Returns `None` if the factory does
    /// not recognise the record type.
    pub fn create_from_record(&mut self, record: &ServerShape, factory: &mut dyn ShapeFactory<S>) -> Option<LocalId> {
        if let Some(group) = record.group.as_deref() {
            if self.groups.has_group(group) {
                let local = self.ids.reserve(record.uuid.clone());
                self.groups.add_members(group, [GroupMember { local, badge: record.badge.unwrap_or_default() }]);
            } else {
                tracing::debug!(%group, uuid = %record.uuid, "missing group info");
            }
        }

        let refs = ResolvedRefs {
            active_variant: record.active_variant.as_ref().and_then(|g| self.ids.local_of(g)),
            variants: record
                .variants
                .iter()
                .filter_map(|v| Some((self.ids.local_of(&v.uuid)?, v.name.clone())))
                .collect(),
        };

        let Some(shape) = factory.build(record, &refs) else {
            tracing::debug!(kind = %record.kind, uuid = %record.uuid, "unsupported shape type");
            return None;
        };
        Some(self.claim(shape, Some(record.uuid.clone())))
    }
}
