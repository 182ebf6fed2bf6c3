//! Multi-region scroll synchronization
//!
//! A [`SyncSession`] observes a set of scroll regions and mirrors any scroll
//! in one of them onto all the others, either proportionally (equal scroll
//! percentage per axis) or directly (equal raw offset). Writing a target
//! raises that target's own observers, so the session carries an explicit
//! phase: while `Syncing`, every incoming scroll notification is discarded
//! rather than queued. The phase returns to `Idle` at the next turn of the
//! event loop, not when the propagation loop ends, so everything the current
//! turn produces, including surface echoes of the writes just made, falls
//! under the same guard.
//!
//! Sessions hold only weak handles. A region that is dropped mid-session is
//! skipped; fewer than two live regions at establishment yields an inert
//! session that observes nothing.

use std::cell::Cell;
use std::rc::Rc;

use log::{debug, info};

use super::defer::Deferrer;
use super::region::{ObserverId, ScrollHandle};

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Which axes a session mirrors and how offsets are mapped.
///
/// Fixed for the lifetime of a session. To change it, release the session
/// and establish a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncConfig {
    /// Mirror vertical scrolling.
    pub vertical: bool,
    /// Mirror horizontal scrolling.
    pub horizontal: bool,
    /// Map offsets by scroll percentage instead of copying them raw.
    pub proportional: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            vertical: true,
            horizontal: true,
            proportional: true,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Session
// ─────────────────────────────────────────────────────────────────────────────

/// Propagation phase of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SyncPhase {
    /// Waiting for a scroll notification.
    Idle,
    /// A pass ran this turn; further notifications are discarded until the
    /// next turn boundary.
    Syncing,
}

/// State shared between the session and the observer closures it registers.
struct SessionCore {
    handles: Vec<ScrollHandle>,
    config: SyncConfig,
    phase: Cell<SyncPhase>,
    deferrer: Rc<dyn Deferrer>,
}

/// An established synchronization session over two or more scroll regions.
///
/// Observers are attached on [`SyncSession::establish`] and detached on
/// [`SyncSession::release`] or drop.
pub struct SyncSession {
    core: Rc<SessionCore>,
    subscriptions: Vec<(ScrollHandle, ObserverId)>,
}

impl SyncSession {
    /// Attach a session to the given regions.
    ///
    /// Handles whose region is already gone are skipped. If fewer than two
    /// live handles remain the session is inert: it registers no observers
    /// and [`SyncSession::is_active`] returns `false`.
    pub fn establish(
        handles: &[ScrollHandle],
        config: SyncConfig,
        deferrer: Rc<dyn Deferrer>,
    ) -> SyncSession {
        let live: Vec<ScrollHandle> = handles.iter().filter(|h| h.is_live()).cloned().collect();
        if live.len() < handles.len() {
            debug!(
                "Sync establish: skipping {} dead handle(s)",
                handles.len() - live.len()
            );
        }

        let core = Rc::new(SessionCore {
            handles: live,
            config,
            phase: Cell::new(SyncPhase::Idle),
            deferrer,
        });

        if core.handles.len() < 2 {
            info!(
                "Sync establish: {} live handle(s), session is inert",
                core.handles.len()
            );
            return SyncSession {
                core,
                subscriptions: Vec::new(),
            };
        }

        let mut subscriptions = Vec::with_capacity(core.handles.len());
        for handle in &core.handles {
            let Some(region) = handle.upgrade() else {
                continue;
            };
            let pass_core = Rc::clone(&core);
            let source = handle.clone();
            let id = region.subscribe(Rc::new(move || run_pass(&pass_core, &source)));
            subscriptions.push((handle.clone(), id));
        }

        debug!(
            "Sync session established over {} region(s), config {:?}",
            subscriptions.len(),
            config
        );
        SyncSession {
            core,
            subscriptions,
        }
    }

    /// Detach all observers. Safe to call more than once; also runs on drop.
    pub fn release(&mut self) {
        if self.subscriptions.is_empty() {
            return;
        }
        for (handle, id) in self.subscriptions.drain(..) {
            if let Some(region) = handle.upgrade() {
                region.unsubscribe(id);
            }
        }
        debug!("Sync session released");
    }

    /// Whether the session has observers attached.
    pub fn is_active(&self) -> bool {
        !self.subscriptions.is_empty()
    }

    /// Whether a pass ran this turn and the guard is still up.
    #[allow(dead_code)]
    pub fn is_syncing(&self) -> bool {
        self.core.phase.get() == SyncPhase::Syncing
    }

    /// Number of regions this session observes.
    #[allow(dead_code)]
    pub fn observer_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// The configuration this session was established with.
    #[allow(dead_code)]
    pub fn config(&self) -> SyncConfig {
        self.core.config
    }
}

impl Drop for SyncSession {
    fn drop(&mut self) {
        self.release();
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Propagation pass
// ─────────────────────────────────────────────────────────────────────────────

/// Handle one scroll notification from `source`.
///
/// Runs as an observer on every region in the session. The phase check makes
/// the cascade terminate: writes performed below re-enter this function
/// through the targets' observers and are discarded.
fn run_pass(core: &Rc<SessionCore>, source: &ScrollHandle) {
    if core.phase.get() == SyncPhase::Syncing {
        return;
    }
    core.phase.set(SyncPhase::Syncing);

    if let Some(region) = source.upgrade() {
        // Snapshot the source before any target is written, so a re-entrant
        // write to the source cannot skew later targets in this pass.
        let offset = region.offset();
        let range = region.range();
        let percent_x = if range.x > 0.0 { offset.x / range.x } else { 0.0 };
        let percent_y = if range.y > 0.0 { offset.y / range.y } else { 0.0 };

        debug!(
            "Sync pass: source at ({:.1}, {:.1}), percent ({:.3}, {:.3})",
            offset.x, offset.y, percent_x, percent_y
        );

        for handle in &core.handles {
            if handle.same_region(source) {
                continue;
            }
            let Some(target) = handle.upgrade() else {
                continue;
            };

            // An axis the target cannot scroll on is left untouched.
            let target_range = target.range();
            let mut next = target.offset();
            if core.config.horizontal && target_range.x > 0.0 {
                next.x = if core.config.proportional {
                    percent_x * target_range.x
                } else {
                    offset.x
                };
            }
            if core.config.vertical && target_range.y > 0.0 {
                next.y = if core.config.proportional {
                    percent_y * target_range.y
                } else {
                    offset.y
                };
            }
            target.set_offset(next);
        }
    }

    // The guard drops at the start of the next turn, not here. A release job
    // outliving the session only clears a phase nobody reads anymore.
    let release = Rc::clone(core);
    core.deferrer
        .defer(Box::new(move || release.phase.set(SyncPhase::Idle)));
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::defer::FrameDeferrer;
    use crate::sync::region::{ScrollOffset, ScrollRange, ScrollRegion};

    fn pump() -> Rc<FrameDeferrer> {
        Rc::new(FrameDeferrer::new())
    }

    fn region_with_range(x: f32, y: f32) -> ScrollRegion {
        let region = ScrollRegion::new();
        region.set_range(ScrollRange::new(x, y));
        region
    }

    #[test]
    fn test_default_config_enables_everything() {
        let config = SyncConfig::default();
        assert!(config.vertical);
        assert!(config.horizontal);
        assert!(config.proportional);
    }

    #[test]
    fn test_proportional_sync_maps_percentage() {
        let turns = pump();
        let a = region_with_range(0.0, 50.0);
        let b = region_with_range(0.0, 200.0);
        let session = SyncSession::establish(
            &[a.handle(), b.handle()],
            SyncConfig::default(),
            turns.clone(),
        );

        // Bottom of a is 100%, which lands at the bottom of b.
        a.report_scroll(ScrollOffset::new(0.0, 50.0));
        assert_eq!(b.offset().y, 200.0);
        assert!(session.is_syncing());

        turns.run_pending();
        assert!(!session.is_syncing());

        // And back the other way at 25%.
        b.report_scroll(ScrollOffset::new(0.0, 50.0));
        assert_eq!(a.offset().y, 12.5);
    }

    #[test]
    fn test_reentrant_notification_is_discarded() {
        let turns = pump();
        let a = region_with_range(0.0, 100.0);
        let b = region_with_range(0.0, 200.0);
        let _session = SyncSession::establish(
            &[a.handle(), b.handle()],
            SyncConfig::default(),
            turns.clone(),
        );

        // A bystander observer on b writes a whenever b moves. With the
        // guard up, that write lands on a but starts no second pass.
        let a_writer = a.clone();
        b.subscribe(Rc::new(move || {
            a_writer.set_offset(ScrollOffset::new(0.0, 10.0));
        }));

        a.report_scroll(ScrollOffset::new(0.0, 100.0));
        assert_eq!(b.offset().y, 200.0);
        assert_eq!(a.offset().y, 10.0);

        // After the turn boundary a fresh scroll syncs again.
        turns.run_pending();
        a.report_scroll(ScrollOffset::new(0.0, 50.0));
        assert_eq!(b.offset().y, 100.0);
    }

    #[test]
    fn test_first_scroll_in_a_turn_wins() {
        let turns = pump();
        let a = region_with_range(0.0, 100.0);
        let b = region_with_range(0.0, 200.0);
        let _session = SyncSession::establish(
            &[a.handle(), b.handle()],
            SyncConfig::default(),
            turns.clone(),
        );

        a.report_scroll(ScrollOffset::new(0.0, 40.0));
        assert_eq!(b.offset().y, 80.0);

        // Second scroll in the same turn moves a but is not propagated.
        a.report_scroll(ScrollOffset::new(0.0, 80.0));
        assert_eq!(a.offset().y, 80.0);
        assert_eq!(b.offset().y, 80.0);

        turns.run_pending();
        a.report_scroll(ScrollOffset::new(0.0, 100.0));
        assert_eq!(b.offset().y, 200.0);
    }

    #[test]
    fn test_direct_mode_copies_raw_offset() {
        let turns = pump();
        let a = region_with_range(0.0, 100.0);
        let b = region_with_range(0.0, 500.0);
        let c = region_with_range(0.0, 100.0);
        let config = SyncConfig {
            proportional: false,
            ..SyncConfig::default()
        };
        let _session = SyncSession::establish(
            &[a.handle(), b.handle(), c.handle()],
            config,
            turns.clone(),
        );

        a.report_scroll(ScrollOffset::new(0.0, 77.0));
        assert_eq!(b.offset().y, 77.0);
        assert_eq!(c.offset().y, 77.0);

        // Raw copy, so regions with different ranges drift apart.
        turns.run_pending();
        a.report_scroll(ScrollOffset::new(0.0, 100.0));
        assert_eq!(b.offset().y, 100.0);
    }

    #[test]
    fn test_zero_range_target_is_never_written() {
        let turns = pump();
        let a = region_with_range(0.0, 100.0);
        let b = region_with_range(0.0, 0.0);
        let _session = SyncSession::establish(
            &[a.handle(), b.handle()],
            SyncConfig::default(),
            turns.clone(),
        );

        a.report_scroll(ScrollOffset::new(0.0, 60.0));
        assert_eq!(b.offset(), ScrollOffset::ZERO);
    }

    #[test]
    fn test_zero_range_target_is_never_written_in_direct_mode() {
        let turns = pump();
        let a = region_with_range(0.0, 100.0);
        let b = region_with_range(0.0, 0.0);
        let config = SyncConfig {
            proportional: false,
            ..SyncConfig::default()
        };
        let _session =
            SyncSession::establish(&[a.handle(), b.handle()], config, turns.clone());

        a.report_scroll(ScrollOffset::new(0.0, 77.0));
        assert_eq!(b.offset(), ScrollOffset::ZERO);
    }

    #[test]
    fn test_zero_range_source_counts_as_zero_percent() {
        let turns = pump();
        // a can only scroll horizontally; b can only scroll vertically.
        let a = region_with_range(100.0, 0.0);
        let b = region_with_range(0.0, 300.0);
        b.set_offset(ScrollOffset::new(0.0, 120.0));
        b.take_flush();

        let _session = SyncSession::establish(
            &[a.handle(), b.handle()],
            SyncConfig::default(),
            turns.clone(),
        );

        // Vertical percent of a is 0, not a division by zero, so b is pulled
        // to the top while its horizontal axis stays untouched.
        a.report_scroll(ScrollOffset::new(40.0, 0.0));
        assert_eq!(b.offset(), ScrollOffset::ZERO);
    }

    #[test]
    fn test_horizontal_axis_can_be_gated_off() {
        let turns = pump();
        let a = region_with_range(100.0, 100.0);
        let b = region_with_range(200.0, 200.0);
        b.set_offset(ScrollOffset::new(50.0, 0.0));
        b.take_flush();

        let config = SyncConfig {
            horizontal: false,
            ..SyncConfig::default()
        };
        let _session =
            SyncSession::establish(&[a.handle(), b.handle()], config, turns.clone());

        a.report_scroll(ScrollOffset::new(80.0, 40.0));
        assert_eq!(b.offset(), ScrollOffset::new(50.0, 80.0));
    }

    #[test]
    fn test_fully_gated_session_still_consumes_the_event() {
        let turns = pump();
        let a = region_with_range(100.0, 100.0);
        let b = region_with_range(100.0, 100.0);
        let config = SyncConfig {
            vertical: false,
            horizontal: false,
            ..SyncConfig::default()
        };
        let session =
            SyncSession::establish(&[a.handle(), b.handle()], config, turns.clone());

        a.report_scroll(ScrollOffset::new(30.0, 30.0));
        assert_eq!(b.offset(), ScrollOffset::ZERO);
        assert!(session.is_syncing());
    }

    #[test]
    fn test_single_live_handle_is_inert() {
        let turns = pump();
        let a = region_with_range(0.0, 100.0);
        let session =
            SyncSession::establish(&[a.handle()], SyncConfig::default(), turns.clone());

        assert!(!session.is_active());
        assert_eq!(session.observer_count(), 0);
        assert_eq!(a.observer_count(), 0);

        a.report_scroll(ScrollOffset::new(0.0, 50.0));
        assert!(!session.is_syncing());
    }

    #[test]
    fn test_dead_handles_are_skipped_at_establish() {
        let turns = pump();
        let a = region_with_range(0.0, 100.0);
        let b = region_with_range(0.0, 200.0);
        let dead = ScrollRegion::new().handle();

        let session = SyncSession::establish(
            &[a.handle(), dead.clone(), b.handle()],
            SyncConfig::default(),
            turns.clone(),
        );
        assert_eq!(session.observer_count(), 2);

        a.report_scroll(ScrollOffset::new(0.0, 50.0));
        assert_eq!(b.offset().y, 100.0);

        // One live handle next to a dead one is below the minimum.
        let inert =
            SyncSession::establish(&[a.handle(), dead], SyncConfig::default(), turns.clone());
        assert!(!inert.is_active());
    }

    #[test]
    fn test_region_dropped_mid_session_is_skipped() {
        let turns = pump();
        let a = region_with_range(0.0, 100.0);
        let b = region_with_range(0.0, 200.0);
        let c = region_with_range(0.0, 400.0);
        let _session = SyncSession::establish(
            &[a.handle(), b.handle(), c.handle()],
            SyncConfig::default(),
            turns.clone(),
        );

        drop(c);

        a.report_scroll(ScrollOffset::new(0.0, 100.0));
        assert_eq!(b.offset().y, 200.0);
    }

    #[test]
    fn test_release_detaches_and_is_idempotent() {
        let turns = pump();
        let a = region_with_range(0.0, 100.0);
        let b = region_with_range(0.0, 200.0);
        let mut session = SyncSession::establish(
            &[a.handle(), b.handle()],
            SyncConfig::default(),
            turns.clone(),
        );
        assert!(session.is_active());
        assert_eq!(a.observer_count(), 1);
        assert_eq!(b.observer_count(), 1);

        session.release();
        session.release();
        assert!(!session.is_active());
        assert_eq!(a.observer_count(), 0);
        assert_eq!(b.observer_count(), 0);

        a.report_scroll(ScrollOffset::new(0.0, 50.0));
        assert_eq!(b.offset(), ScrollOffset::ZERO);
    }

    #[test]
    fn test_drop_releases_observers() {
        let turns = pump();
        let a = region_with_range(0.0, 100.0);
        let b = region_with_range(0.0, 200.0);
        {
            let _session = SyncSession::establish(
                &[a.handle(), b.handle()],
                SyncConfig::default(),
                turns.clone(),
            );
            assert_eq!(a.observer_count(), 1);
        }
        assert_eq!(a.observer_count(), 0);
        assert_eq!(b.observer_count(), 0);
    }

    #[test]
    fn test_programmatic_set_offset_also_triggers_sync() {
        let turns = pump();
        let a = region_with_range(0.0, 100.0);
        let b = region_with_range(0.0, 200.0);
        let _session = SyncSession::establish(
            &[a.handle(), b.handle()],
            SyncConfig::default(),
            turns.clone(),
        );

        a.set_offset(ScrollOffset::new(0.0, 25.0));
        assert_eq!(b.offset().y, 50.0);
    }
}
