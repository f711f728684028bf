//! Sentinel-driven infinite scroll

use tracing::debug;

/// Default number of rows ahead of the sentinel at which loading starts
pub const DEFAULT_LEAD_MARGIN: usize = 3;

/// Paging inputs the driver watches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageStatus {
    pub has_more: bool,
    pub is_loading_more: bool,
}

#[derive(Debug)]
struct Subscription {
    status: PageStatus,
    was_visible: bool,
}

/// Requests the next page when the sentinel row scrolls into view.
///
/// A subscription lives between [`mount`](Self::mount) and
/// [`unmount`](Self::unmount) and is renewed whenever the page status
/// changes. Each renewal starts with the sentinel counted as hidden, so a
/// sentinel that is still on screen after a page lands triggers once more.
#[derive(Debug)]
pub struct PaginationDriver {
    lead_margin: usize,
    subscription: Option<Subscription>,
}

impl PaginationDriver {
    pub fn new(lead_margin: usize) -> Self {
        Self {
            lead_margin,
            subscription: None,
        }
    }

    pub fn mount(&mut self) {
        self.subscription = Some(Subscription {
            status: PageStatus::default(),
            was_visible: false,
        });
    }

    pub fn unmount(&mut self) {
        self.subscription = None;
    }

    /// Whether a sentinel at row `sentinel` counts as visible when rows
    /// before `viewport_end` are on screen
    pub fn is_visible(&self, sentinel: usize, viewport_end: usize) -> bool {
        sentinel <= viewport_end + self.lead_margin
    }

    /// Feed the current status and viewport; returns true when the caller
    /// should load the next page.
    pub fn observe(&mut self, status: PageStatus, sentinel: usize, viewport_end: usize) -> bool {
        let visible = self.is_visible(sentinel, viewport_end);
        let Some(sub) = self.subscription.as_mut() else {
            return false;
        };

        if sub.status != status {
            sub.status = status;
            sub.was_visible = false;
        }

        let became_visible = visible && !sub.was_visible;
        sub.was_visible = visible;

        let fire = became_visible && status.has_more && !status.is_loading_more;
        if fire {
            debug!("Sentinel at row {} visible, loading next page", sentinel);
        }
        fire
    }
}

impl Default for PaginationDriver {
    fn default() -> Self {
        Self::new(DEFAULT_LEAD_MARGIN)
    }
}
