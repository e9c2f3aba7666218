//! Client-side scene engine for a networked tabletop renderer.
//!
//! The engine owns two tightly coupled pieces of state: the identity layer
//! that maps compact process-local shape handles to session-wide global ids,
//! and the floor system that stacks floors and layers, tracks which floor and
//! layer are active, and decides which canvases need to be redrawn after a
//! mutation. Rendering, shape geometry and the socket transport are external;
//! they plug in through the [`layer::LayerCanvas`], [`create::ShapeFactory`]
//! and [`sync::SyncEvent`] seams.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`scene`] | The [`scene::Scene`] context: claim/release teardown ordering, clear |
//! | [`id`] | [`id::LocalId`], [`id::GlobalId`] and the identity registry |
//! | [`shapes`] | Local id to shape object index |
//! | [`floors`] | Floor store and composition engine |
//! | [`invalidate`] | Redraw invalidation passes over floors and layers |
//! | [`floor`] | Floor records, floor references and layer names |
//! | [`layer`] | Layer records and the canvas seam |
//! | [`groups`] | Group membership keyed by local id |
//! | [`selection`] | Selected shape set |
//! | [`sync`] | Sync modes and the outgoing event outbox |
//! | [`remote`] | Inbound floor events from the server |
//! | [`create`] | Server shape records to live shapes |
//! | [`config`] | Environment-driven configuration |
//! | [`error`] | Error type and stable error codes |
//! | [`consts`] | Shared constants |

pub mod config;
pub mod consts;
pub mod create;
pub mod error;
pub mod floor;
pub mod floors;
pub mod groups;
pub mod id;
pub mod invalidate;
pub mod layer;
pub mod remote;
pub mod scene;
pub mod selection;
pub mod shapes;
pub mod sync;

#[cfg(test)]
mod test_helpers;
