//! Log output that stays quiet while the TUI owns the terminal
//!
//! The fmt layer writes to stderr, which would draw over the alternate screen.
//! Wrapping it in [`ConditionalStderrLayer`] drops events while TUI mode is on.

use std::sync::atomic::{AtomicBool, Ordering};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;

static TUI_MODE: AtomicBool = AtomicBool::new(false);

pub fn set_tui_mode(enabled: bool) {
    TUI_MODE.store(enabled, Ordering::SeqCst);
}

pub fn is_tui_mode() -> bool {
    TUI_MODE.load(Ordering::SeqCst)
}

/// Turns TUI mode on for its lifetime, off again on drop
#[must_use]
pub struct TuiModeGuard(());

impl TuiModeGuard {
    pub fn enter() -> Self {
        set_tui_mode(true);
        Self(())
    }
}

impl Drop for TuiModeGuard {
    fn drop(&mut self) {
        set_tui_mode(false);
    }
}

/// Forwards to `inner` only while TUI mode is off
pub struct ConditionalStderrLayer<L> {
    inner: L,
}

impl<L> ConditionalStderrLayer<L> {
    pub fn new(inner: L) -> Self {
        Self { inner }
    }
}

impl<S, L> Layer<S> for ConditionalStderrLayer<L>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    L: Layer<S>,
{
    fn on_new_span(&self, attrs: &tracing::span::Attributes<'_>, id: &tracing::span::Id, ctx: Context<'_, S>) {
        // Span data is needed later even if it was created while the TUI was up
        self.inner.on_new_span(attrs, id, ctx);
    }

    fn on_event(&self, event: &tracing::Event<'_>, ctx: Context<'_, S>) {
        if !is_tui_mode() {
            self.inner.on_event(event, ctx);
        }
    }

    fn on_enter(&self, id: &tracing::span::Id, ctx: Context<'_, S>) {
        if !is_tui_mode() {
            self.inner.on_enter(id, ctx);
        }
    }

    fn on_exit(&self, id: &tracing::span::Id, ctx: Context<'_, S>) {
        if !is_tui_mode() {
            self.inner.on_exit(id, ctx);
        }
    }

    fn on_close(&self, id: tracing::span::Id, ctx: Context<'_, S>) {
        self.inner.on_close(id, ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;
    use tracing_subscriber::layer::SubscriberExt;

    struct CountingLayer(Arc<AtomicUsize>);

    impl<S: tracing::Subscriber> Layer<S> for CountingLayer {
        fn on_event(&self, _event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_events_dropped_while_tui_is_up() {
        let seen = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry()
            .with(ConditionalStderrLayer::new(CountingLayer(seen.clone())));

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("before");
            {
                let _guard = TuiModeGuard::enter();
                tracing::info!("hidden");
            }
            tracing::info!("after");
        });

        assert_eq!(seen.load(Ordering::SeqCst), 2);
        assert!(!is_tui_mode());
    }
}
