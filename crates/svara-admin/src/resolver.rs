//! Private object paths to displayable URLs.
//!
//! Photos live in a private bucket, so every display first exchanges the
//! stored path for a signed URL. An [`ImageHandle`] tracks one displayed
//! image through `Loading`, then `Ready` or `Unavailable`. A `Ready` image
//! that later fails to load becomes `Unavailable` as well.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use svara_core::config::MediaSettings;
use svara_core::media::object_key_from_reference;
use svara_core::{DEFAULT_SIGNED_URL_TTL, ObjectStore, SignedUrl};

use crate::cache::SignedUrlCache;

/// Why an image cannot be shown. All reasons look the same to the viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnavailableReason {
    /// The record has no image path.
    NoImage,
    /// The stored reference could not be turned into an object key.
    InvalidReference(String),
    /// The object does not exist.
    NotFound,
    /// Signing the URL failed.
    RequestFailed(String),
    /// The signed URL was issued but the image did not load.
    LoadFailed(String),
}

impl fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoImage => write!(f, "no image"),
            Self::InvalidReference(e) => write!(f, "invalid reference: {e}"),
            Self::NotFound => write!(f, "object not found"),
            Self::RequestFailed(e) => write!(f, "signing failed: {e}"),
            Self::LoadFailed(e) => write!(f, "image load failed: {e}"),
        }
    }
}

/// Display state of one image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageState {
    /// Waiting for the signed URL.
    Loading,
    /// The image can be fetched from this URL.
    Ready(SignedUrl),
    /// Show the "image unavailable" placeholder.
    Unavailable(UnavailableReason),
}

impl ImageState {
    /// Returns `true` while loading.
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Returns `true` once the placeholder should be shown.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }

    /// The signed URL when ready.
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Ready(signed) => Some(&signed.url),
            _ => None,
        }
    }
}

/// Exchanges stored image references for signed URLs.
#[derive(Clone)]
pub struct SignedImageResolver {
    objects: Arc<dyn ObjectStore>,
    ttl: Duration,
    cache: Option<Arc<SignedUrlCache>>,
}

impl SignedImageResolver {
    /// Creates a resolver issuing one-hour URLs, without caching.
    pub fn new(objects: Arc<dyn ObjectStore>) -> Self {
        Self {
            objects,
            ttl: DEFAULT_SIGNED_URL_TTL,
            cache: None,
        }
    }

    /// Creates a resolver from the media settings.
    pub fn from_settings(objects: Arc<dyn ObjectStore>, settings: &MediaSettings) -> Self {
        let resolver = Self::new(objects).with_ttl(settings.signed_url_ttl());
        if settings.cache_signed_urls {
            resolver.with_cache(Arc::new(SignedUrlCache::default()))
        } else {
            resolver
        }
    }

    /// Sets the validity window of issued URLs.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Reuses signed URLs through `cache`.
    pub fn with_cache(mut self, cache: Arc<SignedUrlCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Validity window of issued URLs.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Starts displaying the image stored under `reference`.
    pub fn mount(&self, reference: impl Into<String>) -> ImageHandle {
        ImageHandle {
            reference: reference.into(),
            state: ImageState::Loading,
        }
    }

    /// Drops any cached URL for `key`.
    pub fn forget(&self, key: &str) {
        if let Some(cache) = &self.cache {
            cache.invalidate(key);
        }
    }

    /// Resolves `reference` to its display state. Never returns `Loading`.
    pub async fn resolve(&self, reference: &str) -> ImageState {
        let reference = reference.trim();
        if reference.is_empty() {
            return ImageState::Unavailable(UnavailableReason::NoImage);
        }

        let key = match object_key_from_reference(reference) {
            Ok(key) => key,
            Err(e) => {
                tracing::warn!(reference, error = %e, "Unusable image reference");
                return ImageState::Unavailable(UnavailableReason::InvalidReference(e.to_string()));
            }
        };

        if let Some(cached) = self.cache.as_ref().and_then(|c| c.get(&key)) {
            tracing::trace!(key = %key, "Signed URL cache hit");
            return ImageState::Ready(cached);
        }

        match self.objects.create_signed_url(&key, self.ttl).await {
            Ok(signed) => {
                if let Some(cache) = &self.cache {
                    cache.insert(signed.clone());
                }
                ImageState::Ready(signed)
            }
            Err(e) if e.is_not_found() => {
                tracing::warn!(key = %key, "Image object not found");
                ImageState::Unavailable(UnavailableReason::NotFound)
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Failed to sign image URL");
                ImageState::Unavailable(UnavailableReason::RequestFailed(e.to_string()))
            }
        }
    }
}

impl fmt::Debug for SignedImageResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignedImageResolver")
            .field("ttl", &self.ttl)
            .field("cached", &self.cache.is_some())
            .finish_non_exhaustive()
    }
}

/// One displayed image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageHandle {
    reference: String,
    state: ImageState,
}

impl ImageHandle {
    /// The stored reference being displayed.
    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// Current state.
    pub fn state(&self) -> &ImageState {
        &self.state
    }

    /// Requests the signed URL. Only acts while loading.
    pub async fn load(&mut self, resolver: &SignedImageResolver) -> &ImageState {
        if self.state.is_loading() {
            self.state = resolver.resolve(&self.reference).await;
        }
        &self.state
    }

    /// Records that the image itself failed to load from its URL.
    ///
    /// The URL is dropped from the resolver's cache so the next mount signs
    /// a new one. Returns `true` when this moved the handle from `Ready` to
    /// `Unavailable`.
    pub fn image_failed(
        &mut self,
        resolver: &SignedImageResolver,
        reason: impl Into<String>,
    ) -> bool {
        let ImageState::Ready(signed) = &self.state else {
            return false;
        };
        resolver.forget(&signed.key);
        let reason = reason.into();
        tracing::warn!(reference = %self.reference, %reason, "Image failed to load");
        self.state = ImageState::Unavailable(UnavailableReason::LoadFailed(reason));
        true
    }
}
