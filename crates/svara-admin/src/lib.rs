//! # svara-admin
//!
//! The admin core of the Švara site, independent of any backend:
//!
//! - [`ClientRepository`]: client list with photo upload and cleanup
//! - [`ClientForm`] and [`BannerSlot`]: local form and status state
//! - [`SignedImageResolver`]: private photo paths to signed URLs
//! - [`SessionGate`]: sign-in view or admin panel
//! - [`AdminPanel`]: the pieces above wired together
//!
//! Backends are injected as `Arc<dyn ...>` trait objects from `svara-core`
//! and `svara-auth`.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod banner;
pub mod cache;
pub mod error;
pub mod form;
pub mod gate;
pub mod panel;
pub mod repository;
pub mod resolver;

pub use banner::{Banner, BannerKind, BannerSlot, DEFAULT_BANNER_TTL};
pub use cache::SignedUrlCache;
pub use error::{Error, Result};
pub use form::{ClientForm, FormMode};
pub use gate::{GateState, GateView, SessionGate};
pub use panel::AdminPanel;
pub use repository::ClientRepository;
pub use resolver::{ImageHandle, ImageState, SignedImageResolver, UnavailableReason};
