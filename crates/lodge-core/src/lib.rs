//! Core types and trait definitions for the Lodge residence back end.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

pub mod actor;
pub mod assembly;
pub mod error;
pub mod measure;
pub mod news;
pub mod policy;
pub mod report;
pub mod resident;
pub mod role;
pub mod room;
pub mod service;
pub mod stats;
pub mod store;
pub mod user;

pub use error::{Error, Result};
