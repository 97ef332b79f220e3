//! View synchronization protocol
//!
//! The building blocks every page controller is made of:
//!
//! - [`ViewState`]: the loading / demo / authenticated phase machine,
//!   holding the entities currently on screen
//! - [`LiveQuery`]: generation-tagged subscriptions, so snapshots from a
//!   torn-down stream can never reach current view state
//! - [`OptimisticList`]: locally-spliced entity lists with rollback
//!   tokens and snapshot reconciliation
//! - [`demo`]: the fixed read-only dataset shown to guests

pub mod demo;
mod live;
mod optimistic;
mod state;

pub use live::{decode_documents, LiveQuery, TaggedSnapshot};
pub use optimistic::{Keyed, OptimisticList, Rollback};
pub use state::{ViewPhase, ViewState};
