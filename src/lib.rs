//! # Formflow
//!
//! Form publishing, assignment, submission and approval, with a dashboard
//! aggregation layer. Usable both as a standalone server and as a library.
//!
//! ## Library Usage
//!
//! ```toml
//! [dependencies]
//! formflow = { version = "0.0.1", default-features = false }
//! ```
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use std::path::Path;
//! use formflow::clock::OrgClock;
//! use formflow::files::LocalFileStore;
//! use formflow::notify::TracingNotifier;
//! use formflow::store::{SqliteStore, Store};
//! use formflow::workflow::FormService;
//!
//! let store = SqliteStore::new("./data/formflow.db").unwrap();
//! store.initialize().unwrap();
//!
//! let service = FormService::new(
//!     Arc::new(store),
//!     Arc::new(TracingNotifier),
//!     Arc::new(LocalFileStore::new(Path::new("./data"))),
//!     Arc::new(OrgClock::default()),
//! );
//! let metrics = service.dashboard_metrics().unwrap();
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default): Builds the `formflow` binary. Disable with `default-features = false`.

pub mod auth;
pub mod clock;
pub mod config;
pub mod error;
pub mod files;
pub mod notify;
pub mod server;
pub mod store;
pub mod types;
pub mod validation;
pub mod workflow;
