//! Custom tracing layers for Folio
//!
//! [`EventCounterLayer`] tallies events by level. Tests install it with
//! `tracing::subscriber::with_default` to assert how many warnings a code
//! path emits.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

#[derive(Debug, Default)]
struct LevelCounts {
    trace: AtomicUsize,
    debug: AtomicUsize,
    info: AtomicUsize,
    warn: AtomicUsize,
    error: AtomicUsize,
}

impl LevelCounts {
    fn slot(&self, level: Level) -> &AtomicUsize {
        match level {
            Level::TRACE => &self.trace,
            Level::DEBUG => &self.debug,
            Level::INFO => &self.info,
            Level::WARN => &self.warn,
            _ => &self.error,
        }
    }
}

/// Layer that counts events per level
///
/// Clones share their counters, so a clone kept by the caller observes
/// everything the installed layer sees.
#[derive(Debug, Clone, Default)]
pub struct EventCounterLayer {
    counts: Arc<LevelCounts>,
    target_prefix: Option<String>,
}

impl EventCounterLayer {
    /// Create a counter for events from every target
    pub fn new() -> Self {
        Self::default()
    }

    /// Only count events whose target starts with `prefix`
    pub fn for_target(prefix: impl Into<String>) -> Self {
        Self {
            counts: Arc::default(),
            target_prefix: Some(prefix.into()),
        }
    }

    /// Events seen at `level`
    pub fn count(&self, level: Level) -> usize {
        self.counts.slot(level).load(Ordering::SeqCst)
    }

    pub fn warnings(&self) -> usize {
        self.count(Level::WARN)
    }

    pub fn errors(&self) -> usize {
        self.count(Level::ERROR)
    }

    /// Events seen at any level
    pub fn total(&self) -> usize {
        [Level::TRACE, Level::DEBUG, Level::INFO, Level::WARN, Level::ERROR]
            .into_iter()
            .map(|level| self.count(level))
            .sum()
    }

    /// Reset every counter to zero
    pub fn reset(&self) {
        for level in [Level::TRACE, Level::DEBUG, Level::INFO, Level::WARN, Level::ERROR] {
            self.counts.slot(level).store(0, Ordering::SeqCst);
        }
    }
}

impl<S: Subscriber> Layer<S> for EventCounterLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if let Some(prefix) = &self.target_prefix
            && !metadata.target().starts_with(prefix.as_str())
        {
            return;
        }
        self.counts
            .slot(*metadata.level())
            .fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::layer::SubscriberExt;

    #[test]
    fn test_counts_by_level() {
        let counter = EventCounterLayer::new();
        let subscriber = tracing_subscriber::registry().with(counter.clone());

        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!("first");
            tracing::warn!(code = 7, "second");
            tracing::error!("broken");
            tracing::debug!("detail");
        });

        assert_eq!(counter.warnings(), 2);
        assert_eq!(counter.errors(), 1);
        assert_eq!(counter.count(Level::DEBUG), 1);
        assert_eq!(counter.count(Level::INFO), 0);
        assert_eq!(counter.total(), 4);

        counter.reset();
        assert_eq!(counter.total(), 0);
    }

    #[test]
    fn test_target_prefix() {
        let counter = EventCounterLayer::for_target("folio_wra");
        let subscriber = tracing_subscriber::registry().with(counter.clone());

        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!(target: "folio_wra::site", "counted");
            tracing::warn!(target: "other", "ignored");
        });

        assert_eq!(counter.warnings(), 1);
    }
}
