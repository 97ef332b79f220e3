//! Gullak Core Library
//!
//! This crate provides the core functionality for Gullak, a personal
//! finance app: live document-store views with optimistic updates and a
//! guest demo mode.
//!
//! # Architecture
//!
//! Every page follows the same protocol: watch the session, re-enter
//! loading on each transition, tear down and reopen store subscriptions,
//! and resolve to demo data (guest) or live snapshots (signed in).
//! Mutations splice into the on-screen list first and roll back when the
//! store write fails.
//!
//! # Quick Start
//!
//! ```text
//! let store: Arc<dyn DocumentStore> = Arc::new(LocalStore::open(&path)?);
//! let mut page = DashboardPage::new(store);
//!
//! let (tx, mut rx) = mpsc::unbounded_channel();
//! page.apply_session(session, tx)?;
//! while let Some(snapshot) = rx.recv().await {
//!     page.apply_snapshot(&snapshot);
//! }
//! ```
//!
//! # Modules
//!
//! - `store`: Document-store trait, queries, and the SQLite-backed store
//! - `view`: Phase machine, generation-tagged live queries, optimistic lists
//! - `pages`: One controller per page
//! - `models`: Finance entities and the session type
//! - `auth`: Session watching and the local identity provider
//! - `advisor`: HTTP client for the advice service
//! - `notify`: Bill-due alerts
//! - `config`: Application configuration

pub mod advisor;
pub mod auth;
pub mod config;
pub mod models;
pub mod notify;
pub mod pages;
pub mod store;
pub mod view;

pub use advisor::{AdvisorClient, AdvisorError};
pub use auth::{AuthError, AuthService, LocalAuth, SessionWatcher};
pub use config::Config;
pub use models::{Bill, Goal, Investment, Session, Transaction};
pub use store::{DocumentStore, LocalStore, Query, StoreError};
pub use view::{ViewPhase, ViewState};
