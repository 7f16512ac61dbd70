//! Transient status messages.

use std::time::Duration;

use tokio::time::Instant;

/// How long a banner stays up by default.
pub const DEFAULT_BANNER_TTL: Duration = Duration::from_secs(5);

/// Banner flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    /// The last action worked.
    Success,
    /// The last action failed.
    Error,
}

/// A status message with the time it was raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    /// Flavour.
    pub kind: BannerKind,
    /// Text shown to the admin.
    pub message: String,
    raised_at: Instant,
}

impl Banner {
    /// Returns `true` for error banners.
    pub fn is_error(&self) -> bool {
        self.kind == BannerKind::Error
    }
}

/// Holds at most one banner and hides it once its time is up.
#[derive(Debug, Clone)]
pub struct BannerSlot {
    current: Option<Banner>,
    ttl: Duration,
}

impl Default for BannerSlot {
    fn default() -> Self {
        Self::new(DEFAULT_BANNER_TTL)
    }
}

impl BannerSlot {
    /// Creates an empty slot whose banners last `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self { current: None, ttl }
    }

    /// Shows a banner, replacing any previous one.
    pub fn show(&mut self, kind: BannerKind, message: impl Into<String>) {
        let message = message.into();
        match kind {
            BannerKind::Success => tracing::info!(%message, "Banner"),
            BannerKind::Error => tracing::warn!(%message, "Banner"),
        }
        self.current = Some(Banner {
            kind,
            message,
            raised_at: Instant::now(),
        });
    }

    /// Shows a success banner.
    pub fn success(&mut self, message: impl Into<String>) {
        self.show(BannerKind::Success, message);
    }

    /// Shows an error banner.
    pub fn error(&mut self, message: impl Into<String>) {
        self.show(BannerKind::Error, message);
    }

    /// The visible banner, if it has not timed out.
    pub fn current(&self) -> Option<&Banner> {
        self.current
            .as_ref()
            .filter(|b| b.raised_at.elapsed() < self.ttl)
    }

    /// Hides the banner now.
    pub fn dismiss(&mut self) {
        self.current = None;
    }
}
