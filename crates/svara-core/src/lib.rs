//! Svara Core: client records, media rules, backend traits, configuration.
//!
//! This crate has no internal svara dependencies. Everything that touches the
//! network sits behind the [`backend`] traits so the admin flow can run
//! against [`memory::MemoryBackend`] as well as the hosted service.
//!
//! # Modules
//!
//! - [`model`]: client records and editable fields
//! - [`media`]: upload constraints, object keys, legacy URL handling
//! - [`backend`]: `ClientTable` and `ObjectStore` traits
//! - [`memory`]: in-process backend with call recording
//! - [`config`]: TOML configuration and `ConfigManager`
//! - [`error`]: error types and Result alias

#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod backend;
pub mod config;
pub mod error;
pub mod media;
pub mod memory;
pub mod model;

pub use backend::{ClientTable, DEFAULT_SIGNED_URL_TTL, ObjectStore, SignedUrl};
pub use config::{ConfigManager, SvaraConfig};
pub use error::{Error, ErrorCategory, ImageRejection, RemoteService, Result};
pub use media::{ImageUpload, MediaRules};
pub use model::{ClientFields, ClientId, ClientPayload, ClientRecord};
