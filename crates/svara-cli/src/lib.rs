//! # svara-cli
//!
//! Command-line admin tool for the Švara client list.
//!
//! - `svara auth`: sign up, sign in, sign out, session status
//! - `svara clients`: list, add and edit clients, print signed photo URLs
//! - `svara config`: show, edit, create and export the configuration
//!
//! Handlers take their backends as trait objects so they run the same way
//! against Supabase and against the in-memory implementations.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod auth_handlers;
pub mod cli;
pub mod client_handlers;
pub mod config_handlers;
pub mod error;
pub mod logging;

pub use error::{Error, Result};
