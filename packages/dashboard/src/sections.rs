//! Active-section tracking for the navigation bar.

use std::time::{Duration, Instant};

use citypulse_city_models::Section;

/// Distance below the top of the viewport at which a section counts as
/// reached.
pub const DEFAULT_SCROLL_OFFSET: f64 = 200.0;

/// Default minimum interval between two recomputations.
pub const DEFAULT_SCROLL_THROTTLE: Duration = Duration::from_millis(100);

/// Vertical extent of a rendered section.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectionBounds {
    /// The section.
    pub section: Section,
    /// Page offset of its top edge.
    pub top: f64,
    /// Its height.
    pub height: f64,
}

impl SectionBounds {
    /// Returns `true` if `y` lies in `[top, top + height)`.
    #[must_use]
    pub fn contains(&self, y: f64) -> bool {
        y >= self.top && y < self.top + self.height
    }
}

/// Returns the first section, in page order, whose bounds contain
/// `scroll_y + offset`. Sections missing from `bounds` are skipped.
#[must_use]
pub fn active_section(bounds: &[SectionBounds], scroll_y: f64, offset: f64) -> Option<Section> {
    let probe = scroll_y + offset;
    Section::ALL.iter().copied().find(|section| {
        bounds
            .iter()
            .any(|b| b.section == *section && b.contains(probe))
    })
}

/// Tracks the highlighted section across scroll events.
#[derive(Debug, Clone)]
pub struct ScrollTracker {
    offset: f64,
    throttle: Duration,
    active: Section,
    last_update: Option<Instant>,
    /// Latest scroll position suppressed by the throttle.
    pending: Option<f64>,
}

impl Default for ScrollTracker {
    fn default() -> Self {
        Self::new(DEFAULT_SCROLL_OFFSET, DEFAULT_SCROLL_THROTTLE)
    }
}

impl ScrollTracker {
    /// Creates a tracker starting on [`Section::Dashboard`].
    #[must_use]
    pub const fn new(offset: f64, throttle: Duration) -> Self {
        Self {
            offset,
            throttle,
            active: Section::Dashboard,
            last_update: None,
            pending: None,
        }
    }

    /// The highlighted section.
    #[must_use]
    pub const fn active(&self) -> Section {
        self.active
    }

    /// Jumps straight to `section`, as when a navigation link is clicked.
    pub const fn navigate(&mut self, section: Section) {
        self.active = section;
        self.pending = None;
    }

    /// Handles a scroll event at time `now`. Events arriving within the
    /// throttle interval of the last recomputation are held as pending;
    /// the newest one is applied by the next recomputation or by
    /// [`Self::settle`]. If no section contains the probe point the
    /// previous one stays active.
    pub fn on_scroll(&mut self, bounds: &[SectionBounds], scroll_y: f64, now: Instant) -> Section {
        if self
            .last_update
            .is_some_and(|last| now.saturating_duration_since(last) < self.throttle)
        {
            self.pending = Some(scroll_y);
            return self.active;
        }
        self.last_update = Some(now);
        self.apply(bounds, scroll_y)
    }

    /// Applies the last suppressed scroll position, as when scrolling has
    /// gone idle. Does nothing if no event is pending.
    pub fn settle(&mut self, bounds: &[SectionBounds]) -> Section {
        match self.pending {
            Some(scroll_y) => self.apply(bounds, scroll_y),
            None => self.active,
        }
    }

    fn apply(&mut self, bounds: &[SectionBounds], scroll_y: f64) -> Section {
        self.pending = None;
        if let Some(section) = active_section(bounds, scroll_y, self.offset) {
            if section != self.active {
                log::trace!("Active section: {section}");
            }
            self.active = section;
        }
        self.active
    }
}
