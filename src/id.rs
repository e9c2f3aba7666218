//! Shape identity: compact local handles and session-wide global ids.
//!
//! DESIGN
//! ======
//! A `LocalId` is a dense, non-zero index into `IdRegistry::slots`. Zero is
//! never issued so a local id can never be mistaken for "unset". Released ids
//! go onto a free stack and are handed out again (LIFO) before the counter
//! advances, which keeps the table compact enough to index by.
//!
//! A `GlobalId` is the string identity shared with the server and every other
//! client. An id can be *reserved* for a global id before its shape exists
//! (for example a group listing a member whose record has not been built yet);
//! a later `claim` with that global id consumes the reservation instead of
//! minting a fresh local id.
//!
//! TRADE-OFFS
//! ==========
//! Reverse lookup (`local_of`) scans the slot table by default. Scenes hold
//! hundreds to low thousands of shapes, so the scan is cheap and there is no
//! second map to keep consistent. `Lookup::Indexed` maintains a
//! `GlobalId -> LocalId` map alongside the slots for larger sessions.

#[cfg(test)]
#[path = "id_test.rs"]
mod id_test;

use std::collections::HashMap;
use std::fmt;
use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::SceneError;

// =============================================================================
// TYPES
// =============================================================================

/// Process-local shape handle. Never zero, recycled on release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocalId(NonZeroU32);

impl LocalId {
    /// Build a local id from its raw value. Returns `None` for zero.
    #[must_use]
    pub fn new(raw: u32) -> Option<Self> {
        NonZeroU32::new(raw).map(Self)
    }

    /// The raw integer value.
    #[must_use]
    pub fn get(self) -> u32 {
        self.0.get()
    }

    fn slot(self) -> usize {
        self.0.get() as usize
    }
}

impl fmt::Display for LocalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Session-wide shape identity, stable across reconnects.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GlobalId(String);

impl GlobalId {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Mint a fresh random global id for a locally created shape.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for GlobalId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for GlobalId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for GlobalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Strategy for resolving a global id back to its local id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lookup {
    /// Linear scan over the slot table.
    #[default]
    Scan,
    /// Auxiliary hash map kept in step with the slot table.
    Indexed,
}

/// Bookkeeping keyed by `LocalId` that must forget an id before it is recycled.
pub trait IdOwner {
    /// Called while `id` still resolves to `global`.
    fn drop_id(&mut self, id: LocalId, global: &GlobalId);

    /// Called on scene teardown.
    fn reset(&mut self) {}
}

// =============================================================================
// REGISTRY
// =============================================================================

/// Bidirectional `LocalId <-> GlobalId` table with reservations.
#[derive(Debug)]
pub struct IdRegistry {
    /// Global id per local slot. Slot 0 is never occupied.
    slots: Vec<Option<GlobalId>>,
    /// Number of ids minted from the counter (not the free stack).
    minted: u32,
    free: Vec<LocalId>,
    reserved: HashMap<GlobalId, LocalId>,
    reverse: Option<HashMap<GlobalId, LocalId>>,
    warn_missing: bool,
}

impl IdRegistry {
    /// Registry with scanning lookup and warnings on missing global ids.
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(Lookup::Scan, true)
    }

    #[must_use]
    pub fn with_options(lookup: Lookup, warn_missing: bool) -> Self {
        Self {
            slots: Vec::new(),
            minted: 0,
            free: Vec::new(),
            reserved: HashMap::new(),
            reverse: match lookup {
                Lookup::Scan => None,
                Lookup::Indexed => Some(HashMap::new()),
            },
            warn_missing,
        }
    }

    /// Reset all tables. Reuses the configured lookup strategy.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.minted = 0;
        self.free.clear();
        self.reserved.clear();
        if let Some(reverse) = self.reverse.as_mut() {
            reverse.clear();
        }
    }

    fn mint(&mut self) -> LocalId {
        if let Some(id) = self.free.pop() {
            return id;
        }
        let id = LocalId(NonZeroU32::MIN.saturating_add(self.minted));
        self.minted += 1;
        id
    }

    fn bind(&mut self, local: LocalId, global: GlobalId) {
        let slot = local.slot();
        if self.slots.len() <= slot {
            self.slots.resize(slot + 1, None);
        }
        if let Some(reverse) = self.reverse.as_mut() {
            reverse.insert(global.clone(), local);
        }
        self.slots[slot] = Some(global);
    }

    /// Allocate a local id for `global` before its shape exists.
    ///
    /// Idempotent: if `global` already has a local id (reserved or claimed),
    /// that id is returned unchanged.
    pub fn reserve(&mut self, global: GlobalId) -> LocalId {
        if let Some(local) = self.probe(&global) {
            return local;
        }
        let local = self.mint();
        self.bind(local, global.clone());
        self.reserved.insert(global, local);
        local
    }

    /// Attach a local id for a shape that is being registered.
    ///
    /// A pending reservation for `global` is consumed. Without a global id a
    /// fresh one is generated. A global id that is already claimed keeps its
    /// existing local id so that no global id ever maps to two local ids.
    pub fn claim(&mut self, global: Option<GlobalId>) -> LocalId {
        let Some(global) = global else {
            let local = self.mint();
            self.bind(local, GlobalId::generate());
            return local;
        };
        if let Some(local) = self.reserved.remove(&global) {
            return local;
        }
        if let Some(local) = self.probe(&global) {
            tracing::warn!(%global, %local, "global id claimed twice; reusing its local id");
            return local;
        }
        let local = self.mint();
        self.bind(local, global);
        local
    }

    /// Clear the mapping for `local`, then return it to the free pool.
    ///
    /// # Errors
    ///
    /// Returns `UnknownLocalId` if `local` is not live.
    pub fn release(&mut self, local: LocalId) -> Result<GlobalId, SceneError> {
        let Some(global) = self.slots.get_mut(local.slot()).and_then(Option::take) else {
            tracing::error!(%local, "release of unknown local id");
            return Err(SceneError::UnknownLocalId(local));
        };
        self.reserved.remove(&global);
        if let Some(reverse) = self.reverse.as_mut() {
            reverse.remove(&global);
        }
        self.free.push(local);
        Ok(global)
    }

    /// Resolve a live local id to its global id.
    ///
    /// # Errors
    ///
    /// Returns `UnknownLocalId` if `local` was never issued or was released.
    /// This signals a logic fault in the caller, not a recoverable condition.
    pub fn global_of(&self, local: LocalId) -> Result<&GlobalId, SceneError> {
        self.slots.get(local.slot()).and_then(Option::as_ref).ok_or_else(|| {
            tracing::error!(%local, "no global id for local id");
            SceneError::UnknownLocalId(local)
        })
    }

    /// Resolve a global id to its local id, logging a warning on a miss when
    /// the registry is configured to.
    #[must_use]
    pub fn local_of(&self, global: &GlobalId) -> Option<LocalId> {
        let found = self.probe(global);
        if found.is_none() && self.warn_missing {
            tracing::warn!(%global, "no local id found for global id");
        }
        found
    }

    /// Resolve a global id without logging. Used where a miss is expected.
    #[must_use]
    pub fn probe(&self, global: &GlobalId) -> Option<LocalId> {
        if let Some(reverse) = self.reverse.as_ref() {
            return reverse.get(global).copied();
        }
        (1u32..)
            .zip(self.slots.iter().skip(1))
            .find(|(_, slot)| slot.as_ref() == Some(global))
            .and_then(|(raw, _)| LocalId::new(raw))
    }

    /// Whether `local` currently maps to a global id.
    #[must_use]
    pub fn is_live(&self, local: LocalId) -> bool {
        self.slots.get(local.slot()).is_some_and(Option::is_some)
    }

    /// Whether `global` has a reservation that no shape has claimed yet.
    #[must_use]
    pub fn is_reserved(&self, global: &GlobalId) -> bool {
        self.reserved.contains_key(global)
    }

    /// Number of live local ids, reserved or claimed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All live `(local, global)` pairs in ascending local order.
    pub fn iter(&self) -> impl Iterator<Item = (LocalId, &GlobalId)> {
        (1u32..)
            .zip(self.slots.iter().skip(1))
            .filter_map(|(raw, slot)| Some((LocalId::new(raw)?, slot.as_ref()?)))
    }
}

impl Default for IdRegistry {
    fn default() -> Self {
        Self::new()
    }
}
