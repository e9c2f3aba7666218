//! Shape groups and their badged members.
//!
//! Group listings often reference members whose shapes have not been built
//! yet, which is why shape creation reserves a local id before registering
//! the member here.

#[cfg(test)]
#[path = "groups_test.rs"]
mod groups_test;

use std::collections::HashMap;

use crate::id::{GlobalId, IdOwner, LocalId};

/// One member of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupMember {
    pub local: LocalId,
    /// Per-group ordinal displayed on the token.
    pub badge: u32,
}

#[derive(Debug, Default)]
pub struct GroupRegistry {
    groups: HashMap<String, Vec<GroupMember>>,
}

impl GroupRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an empty group. Existing groups are left untouched.
    pub fn add_group(&mut self, name: impl Into<String>) {
        self.groups.entry(name.into()).or_default();
    }

    #[must_use]
    pub fn has_group(&self, name: &str) -> bool {
        self.groups.contains_key(name)
    }

    /// Add members to `name`, replacing any entry with the same local id.
    /// Returns false if the group is unknown.
    pub fn add_members(&mut self, name: &str, members: impl IntoIterator<Item = GroupMember>) -> bool {
        let Some(group) = self.groups.get_mut(name) else {
            return false;
        };
        for member in members {
            group.retain(|m| m.local != member.local);
            group.push(member);
        }
        true
    }

    #[must_use]
    pub fn members(&self, name: &str) -> Option<&[GroupMember]> {
        self.groups.get(name).map(Vec::as_slice)
    }

    /// The group `local` belongs to, if any.
    #[must_use]
    pub fn group_of(&self, local: LocalId) -> Option<&str> {
        self.groups
            .iter()
            .find(|(_, members)| members.iter().any(|m| m.local == local))
            .map(|(name, _)| name.as_str())
    }

    /// Remove a group and return its members.
    pub fn remove_group(&mut self, name: &str) -> Option<Vec<GroupMember>> {
        self.groups.remove(name)
    }

    pub fn clear(&mut self) {
        self.groups.clear();
    }
}

impl IdOwner for GroupRegistry {
    fn drop_id(&mut self, id: LocalId, _global: &GlobalId) {
        for members in self.groups.values_mut() {
            members.retain(|m| m.local != id);
        }
    }

    fn reset(&mut self) {
        self.clear();
    }
}
