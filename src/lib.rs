//! Library crate for userdesk.
//!
//! Building blocks of the users screen:
//! - Records exchanged with the service (`model`)
//! - HTTP access to the users collection (`api`)
//! - Observable client-side store (`store`)
//! - Application state and event loop (`app`)
//! - Incremental search over the table (`search`)
//! - Rendering (`ui`)
//! - Command line and logging (`cli`), error types (`error`)
//!
//! It is used by the `userdesk` binary and by tests.
#![doc = include_str!("../README.md")]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod api;
pub mod app;
pub mod cli;
pub mod error;
pub mod model;
pub mod search;
pub mod store;
pub mod ui;

pub use error::{AppError, Result};
pub use store::{StoreError, StoreState, UserStore};
