//! Scrollable regions and weak handles to them
//!
//! A [`ScrollRegion`] models one scrollable surface: a clamped two-axis
//! offset, the maximum scrollable extent per axis, and observers that fire on
//! every offset change, whether the change came from user input
//! ([`ScrollRegion::report_scroll`]) or from code ([`ScrollRegion::set_offset`]).
//! Both paths notify, matching how a real scroll surface raises events for
//! programmatic scrolls too.
//!
//! Panes own their region. Everything else holds a [`ScrollHandle`], a weak
//! reference that stops resolving once the owning pane is gone, so a sync
//! session never keeps a torn-down pane alive.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

// ─────────────────────────────────────────────────────────────────────────────
// Offset and Range
// ─────────────────────────────────────────────────────────────────────────────

/// A scroll position in pixels, measured from the top-left of the content.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollOffset {
    pub x: f32,
    pub y: f32,
}

impl ScrollOffset {
    /// The origin (not scrolled on either axis).
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Clamp both axes into `[0, range]`.
    pub fn clamp_to(self, range: ScrollRange) -> Self {
        Self {
            x: self.x.clamp(0.0, range.x),
            y: self.y.clamp(0.0, range.y),
        }
    }
}

/// Maximum scrollable extent per axis: content size minus viewport size.
///
/// An axis with extent `0.0` cannot scroll. Extents are floored at zero, so a
/// viewport larger than its content yields `0.0` rather than a negative range.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollRange {
    pub x: f32,
    pub y: f32,
}

impl ScrollRange {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x: x.max(0.0),
            y: y.max(0.0),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Region
// ─────────────────────────────────────────────────────────────────────────────

/// Callback invoked after a region's offset changed.
pub type ScrollObserver = Rc<dyn Fn()>;

/// Identifies a subscription so it can be removed later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObserverId(u64);

struct RegionInner {
    offset: ScrollOffset,
    range: ScrollRange,
    /// Programmatic offset not yet applied to the widget surface.
    pending_flush: Option<ScrollOffset>,
    observers: Vec<(ObserverId, ScrollObserver)>,
    next_observer: u64,
}

/// A scrollable surface with observable offset changes.
///
/// Cloning shares the same underlying surface. The region dies when the last
/// clone is dropped, at which point its handles stop resolving.
#[derive(Clone)]
pub struct ScrollRegion {
    inner: Rc<RefCell<RegionInner>>,
}

impl Default for ScrollRegion {
    fn default() -> Self {
        Self::new()
    }
}

impl ScrollRegion {
    /// Create a region at the origin with no scrollable extent.
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(RegionInner {
                offset: ScrollOffset::ZERO,
                range: ScrollRange::default(),
                pending_flush: None,
                observers: Vec::new(),
                next_observer: 0,
            })),
        }
    }

    /// Create a weak handle to this region.
    pub fn handle(&self) -> ScrollHandle {
        ScrollHandle {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// The current scroll offset.
    pub fn offset(&self) -> ScrollOffset {
        self.inner.borrow().offset
    }

    /// The current scrollable extent.
    pub fn range(&self) -> ScrollRange {
        self.inner.borrow().range
    }

    /// Update the scrollable extent, re-clamping the offset if it now falls
    /// outside the new range. The re-clamp does not notify observers; it is a
    /// layout change, not a scroll.
    pub fn set_range(&self, range: ScrollRange) {
        let mut inner = self.inner.borrow_mut();
        inner.range = ScrollRange::new(range.x, range.y);
        inner.offset = inner.offset.clamp_to(inner.range);
    }

    /// Scroll programmatically. The target is clamped into range; observers
    /// fire if the clamped value differs from the current offset, and the new
    /// offset is queued for [`ScrollRegion::take_flush`] so the widget surface
    /// can pick it up.
    pub fn set_offset(&self, target: ScrollOffset) {
        self.apply(target, true);
    }

    /// Record a scroll performed by the surface itself (user input). Clamps
    /// and notifies like [`ScrollRegion::set_offset`] but queues no flush,
    /// since the surface is already at this offset.
    pub fn report_scroll(&self, offset: ScrollOffset) {
        self.apply(offset, false);
    }

    fn apply(&self, target: ScrollOffset, queue_flush: bool) {
        let observers: Vec<ScrollObserver> = {
            let mut inner = self.inner.borrow_mut();
            let clamped = target.clamp_to(inner.range);
            if clamped == inner.offset {
                return;
            }
            inner.offset = clamped;
            if queue_flush {
                inner.pending_flush = Some(clamped);
            }
            inner.observers.iter().map(|(_, f)| Rc::clone(f)).collect()
        };
        // The borrow is released before callbacks run, so observers may read
        // or write this region re-entrantly.
        for observer in &observers {
            observer();
        }
    }

    /// Take the most recent programmatic offset, if the widget surface has
    /// not applied it yet.
    pub fn take_flush(&self) -> Option<ScrollOffset> {
        self.inner.borrow_mut().pending_flush.take()
    }

    /// Whether a programmatic offset is waiting to be applied to the surface.
    pub fn has_pending_flush(&self) -> bool {
        self.inner.borrow().pending_flush.is_some()
    }

    /// Register an observer, invoked after every offset change.
    pub fn subscribe(&self, observer: ScrollObserver) -> ObserverId {
        let mut inner = self.inner.borrow_mut();
        let id = ObserverId(inner.next_observer);
        inner.next_observer += 1;
        inner.observers.push((id, observer));
        id
    }

    /// Remove a previously registered observer. Unknown ids are ignored.
    pub fn unsubscribe(&self, id: ObserverId) {
        self.inner
            .borrow_mut()
            .observers
            .retain(|(oid, _)| *oid != id);
    }

    /// Number of registered observers.
    #[allow(dead_code)]
    pub fn observer_count(&self) -> usize {
        self.inner.borrow().observers.len()
    }
}

impl fmt::Debug for ScrollRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("ScrollRegion")
            .field("offset", &inner.offset)
            .field("range", &inner.range)
            .field("observers", &inner.observers.len())
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Handle
// ─────────────────────────────────────────────────────────────────────────────

/// Weak reference to a [`ScrollRegion`].
///
/// Handles compare by the region they point at, not by value, so two handles
/// to the same region are interchangeable.
#[derive(Clone)]
pub struct ScrollHandle {
    inner: Weak<RefCell<RegionInner>>,
}

impl ScrollHandle {
    /// Whether the region behind this handle still exists.
    pub fn is_live(&self) -> bool {
        self.inner.strong_count() > 0
    }

    /// Whether two handles point at the same region.
    pub fn same_region(&self, other: &ScrollHandle) -> bool {
        Weak::ptr_eq(&self.inner, &other.inner)
    }

    /// Resolve the handle into a region for the duration of one operation.
    pub(crate) fn upgrade(&self) -> Option<ScrollRegion> {
        self.inner.upgrade().map(|inner| ScrollRegion { inner })
    }
}

impl fmt::Debug for ScrollHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollHandle")
            .field("live", &self.is_live())
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
