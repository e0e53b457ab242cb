//! # Jobfilter Architecture
//!
//! Jobfilter is a **UI-agnostic job filtering library**. It decides which CI
//! jobs are visible for a set of filters persisted as query parameters, and
//! turns filter intents ("show only unclassified failures", "add symbol B")
//! into edits of those parameters. The `jobfilter` binary is one client; a
//! web view or a TUI would be others.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (main.rs, args.rs, print.rs, logging.rs)         │
//! │  - Parses arguments, formats output, handles terminal I/O   │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - FilterModel facade: evaluate, mutate, digest, notify     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Logic Layer (state.rs, evaluate.rs, mutate.rs)             │
//! │  - Derived state, visibility predicate, store edits         │
//! │  - Pure functions over Rust types                           │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - Abstract ParamStore trait                                │
//! │  - InMemoryParamStore plus test fixtures                    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Persisted Form
//!
//! The store is the single source of truth. Field filters and the two status
//! dimensions live under prefixed keys (`filter-tier`, `filter-resultStatus`),
//! the non-field filters (`author`, `revision`, ...) without a prefix. A key
//! whose values equal its defaults is never stored, so an empty store means
//! "default view".
//!
//! ## Module Overview
//!
//! - [`api`]: The facade, entry point for all operations
//! - [`registry`]: Filter dimensions, defaults and key conventions
//! - [`params`]: Query parameter values and percent-decoding
//! - [`store`]: Storage abstraction and the in-memory implementation
//! - [`state`]: Derived filter state and its cache
//! - [`evaluate`]: Job visibility
//! - [`mutate`]: Filter intents as store writes
//! - [`notify`]: Change subscriptions
//! - [`model`]: Core data types (`Job`, `ClassificationChoice`)
//! - [`config`]: Configuration management
//! - [`error`]: Error types

pub mod api;
pub mod config;
pub mod error;
pub mod evaluate;
pub mod model;
pub mod mutate;
pub mod notify;
pub mod params;
pub mod registry;
pub mod state;
pub mod store;
