//! # svara-supabase
//!
//! Network implementation of the Švara backend seams against a Supabase
//! project:
//! - [`svara_core::ClientTable`] over the PostgREST `/rest/v1` endpoint
//! - [`svara_core::ObjectStore`] over the private `/storage/v1` bucket
//! - [`svara_auth::AuthProvider`] over the GoTrue `/auth/v1` endpoint
//!
//! All three are implemented by one [`SupabaseClient`], which shares the
//! HTTP connection pool and the current session between them. Every call is
//! a single request with no retries.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod auth;
mod client;
mod error;
mod rest;
mod storage;

pub use client::SupabaseClient;
