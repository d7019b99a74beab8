//! gmirror-core - Core library for gmirror
//!
//! This crate contains the message models, the remote transport, the
//! synchronization engine, the snapshot store and the analytics used by the
//! `gmirror` command line front-end.

pub mod analytics;
pub mod config;
pub mod error;
pub mod models;
pub mod remote;
pub mod store;
pub mod sync;
pub mod util;

pub use error::{Error, Result};
pub use models::{Group, Message, MessageSet};
