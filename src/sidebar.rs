//! Persisted width of the resizable repository sidebar.

use crate::storage::KeyValueStore;
use crate::throttle::Throttle;
use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Storage key holding the width in pixels as a decimal integer.
pub const SIDEBAR_WIDTH_KEY: &str = "sidebar-width";

/// Allowed range and starting value for the sidebar width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WidthBounds {
    pub default: u32,
    pub min: u32,
    pub max: u32,
}

impl Default for WidthBounds {
    fn default() -> Self {
        Self {
            default: 250,
            min: 150,
            max: 350,
        }
    }
}

impl WidthBounds {
    pub fn clamp(&self, width: u32) -> u32 {
        // Tolerates min > max from a bad config instead of panicking like Ord::clamp.
        width.max(self.min).min(self.max.max(self.min))
    }
}

/// Sidebar width model whose changes are written through a [`Throttle`].
///
/// Dragging the sidebar edge calls [`SidebarWidth::set_width`] on every mouse
/// move; only the final width of a drag reaches the store.
pub struct SidebarWidth {
    width: u32,
    bounds: WidthBounds,
    store: Arc<dyn KeyValueStore>,
    throttle: Throttle,
}

impl SidebarWidth {
    /// Load the persisted width, falling back to the default when it is
    /// missing, unparsable or unreadable.
    pub fn load(store: Arc<dyn KeyValueStore>, bounds: WidthBounds, delay: Duration) -> Self {
        let stored = match store.get(SIDEBAR_WIDTH_KEY) {
            Ok(value) => value,
            Err(e) => {
                warn!("Could not read persisted sidebar width: {}", e);
                None
            }
        };
        let width = stored
            .as_deref()
            .and_then(|value| value.trim().parse::<u32>().ok())
            .unwrap_or(bounds.default);

        Self {
            width: bounds.clamp(width),
            bounds,
            store,
            throttle: Throttle::new(delay),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn bounds(&self) -> WidthBounds {
        self.bounds
    }

    pub fn has_pending_write(&self) -> bool {
        self.throttle.is_pending()
    }

    /// Set the width, clamped to the bounds. Returns the applied width.
    pub fn set_width(&mut self, width: u32) -> u32 {
        let clamped = self.bounds.clamp(width);
        if clamped != self.width {
            self.width = clamped;
            self.persist();
        }
        self.width
    }

    /// Grow or shrink by `delta` pixels. Returns the applied width.
    pub fn resize_by(&mut self, delta: i32) -> u32 {
        let target = i64::from(self.width) + i64::from(delta);
        let target = target.clamp(0, i64::from(u32::MAX)) as u32;
        self.set_width(target)
    }

    /// Restore the default width and forget the stored value.
    pub fn reset(&mut self) -> u32 {
        self.width = self.bounds.clamp(self.bounds.default);
        let store = Arc::clone(&self.store);
        self.throttle.queue(move || {
            store
                .remove(SIDEBAR_WIDTH_KEY)
                .context("Failed to clear sidebar width")
        });
        self.width
    }

    /// Write any queued change now.
    pub async fn flush(&self) -> anyhow::Result<()> {
        if self.throttle.flush().await? {
            debug!(width = self.width, "Flushed sidebar width");
        }
        Ok(())
    }

    fn persist(&self) {
        let store = Arc::clone(&self.store);
        let value = self.width.to_string();
        self.throttle.queue(move || {
            store
                .set(SIDEBAR_WIDTH_KEY, &value)
                .context("Failed to persist sidebar width")
        });
    }
}
