//! Sunrise/sunset boundary controller
//!
//! Owns the two animated day boundaries, turns single-pointer drags into new
//! targets, and hands the per-frame geometry to whoever draws the widget.
//!
//! The controller has single-thread affinity: pointer events, host setters,
//! `tick` and `compute_geometry` must all be called from the same thread.
//! The listener is not required to be `Send`, so the compiler enforces this.

use std::sync::mpsc::Sender;

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::animated::AnimatedScalar;
use crate::day_fraction::{fraction_to_millis, millis_to_fraction};
use crate::geometry::DayGeometry;

/// Earliest fraction a boundary may be dragged to
pub const DAY_START: f64 = 0.0;

/// Latest fraction a boundary may be dragged to (23:59:59)
pub const DAY_END: f64 = 0.99998842592;

/// Minimum separation kept between the two boundaries while dragging
pub const TARGET_RANGE: f64 = 0.04167;

const DEFAULT_SUNRISE: f64 = 0.25;
const DEFAULT_SUNSET: f64 = 0.75;

/// Pointer event phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    Cancel,
}

/// A single pointer event in surface coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub phase: PointerPhase,
    /// Horizontal pointer position, measured from the surface's left edge
    pub x: f32,
    /// Width of the surface the position is measured in
    pub surface_width: f32,
}

impl PointerEvent {
    pub fn new(phase: PointerPhase, x: f32, surface_width: f32) -> Self {
        Self {
            phase,
            x,
            surface_width,
        }
    }

    /// Pointer position as a fraction of the surface width, if measurable
    fn distance(&self) -> Option<f64> {
        if !self.x.is_finite() || !self.surface_width.is_finite() || self.surface_width <= 0.0 {
            return None;
        }
        Some(self.x as f64 / self.surface_width as f64)
    }
}

/// Which boundary, if any, is being dragged
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragState {
    Idle,
    /// Dragging the sunrise boundary
    DraggingStart {
        /// Boundary value minus pointer distance at pointer-down
        offset: f64,
        /// Target the boundary had when the drag began
        origin: f64,
    },
    /// Dragging the sunset boundary
    DraggingEnd { offset: f64, origin: f64 },
}

impl DragState {
    pub fn is_dragging(&self) -> bool {
        !matches!(self, DragState::Idle)
    }
}

/// What a cancelled gesture does with the dragged boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CancelPolicy {
    /// Treat cancel like a release and notify the listener
    #[default]
    Commit,
    /// Restore the boundary to where the drag started, without notifying
    Revert,
}

/// A boundary change committed by a user gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryChange {
    /// New sunrise, in milliseconds since midnight
    Sunrise(i64),
    /// New sunset, in milliseconds since midnight
    Sunset(i64),
}

/// Receives boundary changes made by the user.
///
/// Only gestures notify; the host setters never do.
pub trait BoundaryListener {
    fn on_sunrise_changed(&mut self, millis: i64);
    fn on_sunset_changed(&mut self, millis: i64);
}

impl BoundaryListener for Sender<BoundaryChange> {
    fn on_sunrise_changed(&mut self, millis: i64) {
        // The receiving side may already be gone during shutdown
        let _ = self.send(BoundaryChange::Sunrise(millis));
    }

    fn on_sunset_changed(&mut self, millis: i64) {
        let _ = self.send(BoundaryChange::Sunset(millis));
    }
}

/// Outcome of a pointer event
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerResponse {
    /// Whether the controller claims the gesture exclusively after this event
    pub exclusive: bool,
    /// Whether a new frame should be drawn
    pub redraw: bool,
    /// Change committed by this event, if it ended a drag
    pub committed: Option<BoundaryChange>,
}

/// Settled flags reported by [`BoundaryController::tick`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameStatus {
    pub start_settled: bool,
    pub end_settled: bool,
}

impl FrameStatus {
    /// True when no further frames are needed for animation
    pub fn is_settled(&self) -> bool {
        self.start_settled && self.end_settled
    }
}

/// Interaction and animation state for the sunrise/sunset widget
pub struct BoundaryController {
    day_start: AnimatedScalar,
    day_end: AnimatedScalar,
    drag: DragState,
    cancel_policy: CancelPolicy,
    listener: Option<Box<dyn BoundaryListener>>,
}

impl std::fmt::Debug for BoundaryController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundaryController")
            .field("day_start", &self.day_start)
            .field("day_end", &self.day_end)
            .field("drag", &self.drag)
            .field("cancel_policy", &self.cancel_policy)
            .field("has_listener", &self.listener.is_some())
            .finish()
    }
}

impl Default for BoundaryController {
    fn default() -> Self {
        Self::new()
    }
}

impl BoundaryController {
    /// Create a controller with sunrise at 06:00 and sunset at 18:00
    pub fn new() -> Self {
        Self {
            day_start: AnimatedScalar::new(DEFAULT_SUNRISE),
            day_end: AnimatedScalar::new(DEFAULT_SUNSET),
            drag: DragState::Idle,
            cancel_policy: CancelPolicy::default(),
            listener: None,
        }
    }

    pub fn with_cancel_policy(mut self, policy: CancelPolicy) -> Self {
        self.cancel_policy = policy;
        self
    }

    pub fn set_cancel_policy(&mut self, policy: CancelPolicy) {
        self.cancel_policy = policy;
    }

    pub fn cancel_policy(&self) -> CancelPolicy {
        self.cancel_policy
    }

    /// Set the listener notified when the user changes a boundary
    pub fn set_listener(&mut self, listener: Box<dyn BoundaryListener>) {
        self.listener = Some(listener);
    }

    /// Set the sunrise time. Values beyond one day wrap around.
    pub fn set_day_start(&mut self, millis: i64, animate: bool) {
        let fraction = millis_to_fraction(millis);
        if animate {
            self.day_start.set_target(fraction);
        } else {
            self.day_start.set_immediate(fraction);
        }
    }

    /// Set the sunset time. Values beyond one day wrap around.
    pub fn set_day_end(&mut self, millis: i64, animate: bool) {
        let fraction = millis_to_fraction(millis);
        if animate {
            self.day_end.set_target(fraction);
        } else {
            self.day_end.set_immediate(fraction);
        }
    }

    /// Sunrise target in milliseconds since midnight
    pub fn day_start_millis(&self) -> i64 {
        fraction_to_millis(self.day_start.target())
    }

    /// Sunset target in milliseconds since midnight
    pub fn day_end_millis(&self) -> i64 {
        fraction_to_millis(self.day_end.target())
    }

    pub fn day_start(&self) -> &AnimatedScalar {
        &self.day_start
    }

    pub fn day_end(&self) -> &AnimatedScalar {
        &self.day_end
    }

    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    /// Whether ancestors should be kept from intercepting the gesture
    pub fn claims_exclusive_gesture(&self) -> bool {
        self.drag.is_dragging()
    }

    pub fn is_settled(&self) -> bool {
        self.day_start.is_settled() && self.day_end.is_settled()
    }

    /// Advance both boundaries by one frame
    pub fn tick(&mut self) -> FrameStatus {
        FrameStatus {
            start_settled: self.day_start.tick(),
            end_settled: self.day_end.tick(),
        }
    }

    /// Derive the shapes to paint from the current boundary values
    pub fn compute_geometry(&self, width: f32, height: f32, hour_of_day: u32) -> DayGeometry {
        DayGeometry::compute(
            self.day_start.current(),
            self.day_end.current(),
            width,
            height,
            hour_of_day,
        )
    }

    /// Feed a pointer event into the gesture state machine
    pub fn handle_pointer(&mut self, event: PointerEvent) -> PointerResponse {
        let mut response = PointerResponse::default();

        match event.phase {
            PointerPhase::Down => self.pointer_down(event),
            PointerPhase::Move => response.redraw = self.pointer_move(event),
            PointerPhase::Up => response.committed = self.finish_drag(false),
            PointerPhase::Cancel => response.committed = self.finish_drag(true),
        }

        response.exclusive = self.claims_exclusive_gesture();
        response.redraw |= !self.is_settled();
        response
    }

    fn pointer_down(&mut self, event: PointerEvent) {
        self.drag = DragState::Idle;

        let Some(distance) = event.distance() else {
            trace!("Ignoring pointer down on a surface with no width");
            return;
        };

        // No drag may begin while an animation is still running
        if !self.is_settled() {
            trace!("Ignoring pointer down while boundaries are animating");
            return;
        }

        let start = self.day_start.current();
        let end = self.day_end.current();
        if (distance - start).abs() < (distance - end).abs() {
            self.drag = DragState::DraggingStart {
                offset: start - distance,
                origin: self.day_start.target(),
            };
            debug!("Started dragging sunrise from {:.4}", start);
        } else {
            self.drag = DragState::DraggingEnd {
                offset: end - distance,
                origin: self.day_end.target(),
            };
            debug!("Started dragging sunset from {:.4}", end);
        }
    }

    fn pointer_move(&mut self, event: PointerEvent) -> bool {
        let Some(distance) = event.distance() else {
            trace!("Ignoring pointer move on a surface with no width");
            return false;
        };

        match self.drag {
            DragState::Idle => false,
            DragState::DraggingStart { offset, .. } => {
                let upper = (self.day_end.target() - TARGET_RANGE).max(DAY_START);
                let candidate = (offset + distance).clamp(DAY_START, upper);
                self.day_start.set_target(candidate);
                true
            }
            DragState::DraggingEnd { offset, .. } => {
                let lower = (self.day_start.target() + TARGET_RANGE).min(DAY_END);
                let candidate = (offset + distance).clamp(lower, DAY_END);
                self.day_end.set_target(candidate);
                true
            }
        }
    }

    fn finish_drag(&mut self, cancelled: bool) -> Option<BoundaryChange> {
        let drag = std::mem::replace(&mut self.drag, DragState::Idle);

        if cancelled && self.cancel_policy == CancelPolicy::Revert {
            match drag {
                DragState::DraggingStart { origin, .. } => self.day_start.set_target(origin),
                DragState::DraggingEnd { origin, .. } => self.day_end.set_target(origin),
                DragState::Idle => {}
            }
            if drag.is_dragging() {
                debug!("Drag cancelled, boundary reverted");
            }
            return None;
        }

        let change = match drag {
            DragState::Idle => return None,
            DragState::DraggingStart { .. } => BoundaryChange::Sunrise(self.day_start_millis()),
            DragState::DraggingEnd { .. } => BoundaryChange::Sunset(self.day_end_millis()),
        };

        debug!("Committing {:?}", change);
        if let Some(listener) = self.listener.as_mut() {
            match change {
                BoundaryChange::Sunrise(millis) => listener.on_sunrise_changed(millis),
                BoundaryChange::Sunset(millis) => listener.on_sunset_changed(millis),
            }
        }

        Some(change)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::day_fraction::DAY_LENGTH_MS;
    use std::sync::mpsc::{channel, Receiver};

    const WIDTH: f32 = 1000.0;

    fn event(phase: PointerPhase, fraction: f32) -> PointerEvent {
        PointerEvent::new(phase, fraction * WIDTH, WIDTH)
    }

    fn controller_with_channel() -> (BoundaryController, Receiver<BoundaryChange>) {
        let (tx, rx) = channel();
        let mut controller = BoundaryController::new();
        controller.set_listener(Box::new(tx));
        (controller, rx)
    }

    fn settle(controller: &mut BoundaryController) {
        for _ in 0..200 {
            if controller.tick().is_settled() {
                return;
            }
        }
        panic!("controller did not settle");
    }

    #[test]
    fn test_defaults() {
        let controller = BoundaryController::new();
        assert_eq!(controller.day_start().current(), 0.25);
        assert_eq!(controller.day_end().current(), 0.75);
        assert_eq!(controller.drag_state(), DragState::Idle);
        assert!(!controller.claims_exclusive_gesture());
    }

    #[test]
    fn test_pointer_down_picks_closer_boundary() {
        let mut controller = BoundaryController::new();
        let response = controller.handle_pointer(event(PointerPhase::Down, 0.26));
        assert!(matches!(controller.drag_state(), DragState::DraggingStart { .. }));
        assert!(response.exclusive);

        controller.handle_pointer(event(PointerPhase::Up, 0.26));
        controller.handle_pointer(event(PointerPhase::Down, 0.6));
        assert!(matches!(controller.drag_state(), DragState::DraggingEnd { .. }));
    }

    #[test]
    fn test_drag_sunrise_notifies_on_release() {
        let (mut controller, rx) = controller_with_channel();

        controller.handle_pointer(event(PointerPhase::Down, 0.25));
        let response = controller.handle_pointer(event(PointerPhase::Move, 0.40));
        assert!(response.redraw);
        assert!((controller.day_start().target() - 0.40).abs() < 1e-6);
        // Animated, not a jump
        assert!(!controller.day_start().is_settled());

        let response = controller.handle_pointer(event(PointerPhase::Up, 0.40));
        assert!(!response.exclusive);
        assert_eq!(controller.drag_state(), DragState::Idle);
        assert_eq!(response.committed, Some(BoundaryChange::Sunrise(34_560_000)));
        assert_eq!(rx.try_recv(), Ok(BoundaryChange::Sunrise(34_560_000)));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_drag_keeps_pointer_offset() {
        let mut controller = BoundaryController::new();
        controller.handle_pointer(event(PointerPhase::Down, 0.26));
        controller.handle_pointer(event(PointerPhase::Move, 0.40));
        // Grabbed 0.01 to the right of the boundary, so it trails the pointer
        assert!((controller.day_start().target() - 0.39).abs() < 1e-6);
    }

    #[test]
    fn test_drag_sunrise_clamps_below_sunset() {
        let mut controller = BoundaryController::new();
        controller.handle_pointer(event(PointerPhase::Down, 0.25));
        controller.handle_pointer(event(PointerPhase::Move, 0.80));

        let target = controller.day_start().target();
        assert!((target - (0.75 - TARGET_RANGE)).abs() < 1e-9);
        assert!((target - 0.7083).abs() < 1e-4);
    }

    #[test]
    fn test_drag_sunrise_clamps_at_midnight() {
        let mut controller = BoundaryController::new();
        controller.handle_pointer(event(PointerPhase::Down, 0.25));
        controller.handle_pointer(event(PointerPhase::Move, -0.3));
        assert_eq!(controller.day_start().target(), DAY_START);
    }

    #[test]
    fn test_drag_sunset_clamps_to_range() {
        let mut controller = BoundaryController::new();
        controller.handle_pointer(event(PointerPhase::Down, 0.75));
        controller.handle_pointer(event(PointerPhase::Move, 1.4));
        assert_eq!(controller.day_end().target(), DAY_END);

        controller.handle_pointer(event(PointerPhase::Move, 0.1));
        let target = controller.day_end().target();
        assert!((target - (0.25 + TARGET_RANGE)).abs() < 1e-9);
    }

    #[test]
    fn test_drag_sequences_keep_ordering_invariant() {
        let mut controller = BoundaryController::new();
        let moves: [(f32, &[f32]); 4] = [
            (0.25, &[0.9, 0.5, -1.0, 0.7]),
            (0.75, &[0.0, 0.3, 2.0, 0.2]),
            (0.1, &[0.95, 0.99]),
            (0.9, &[-0.5, 0.05]),
        ];

        for (down, path) in moves {
            settle(&mut controller);
            controller.handle_pointer(event(PointerPhase::Down, down));
            for &x in path {
                controller.handle_pointer(event(PointerPhase::Move, x));
                let start = controller.day_start().target();
                let end = controller.day_end().target();
                assert!(start + TARGET_RANGE <= end + 1e-12);
                assert!((0.0..1.0).contains(&start));
                assert!((0.0..1.0).contains(&end));
            }
            controller.handle_pointer(event(PointerPhase::Up, 0.0));
        }
    }

    #[test]
    fn test_pointer_down_ignored_while_animating() {
        let mut controller = BoundaryController::new();
        controller.set_day_start(2 * 3_600_000, true);
        assert!(!controller.is_settled());

        let response = controller.handle_pointer(event(PointerPhase::Down, 0.25));
        assert_eq!(controller.drag_state(), DragState::Idle);
        assert!(!response.exclusive);
        assert!(response.redraw);

        controller.handle_pointer(event(PointerPhase::Move, 0.5));
        assert_eq!(controller.day_end().target(), 0.75);
    }

    #[test]
    fn test_zero_width_events_ignored() {
        let mut controller = BoundaryController::new();
        controller.handle_pointer(PointerEvent::new(PointerPhase::Down, 10.0, 0.0));
        assert_eq!(controller.drag_state(), DragState::Idle);

        controller.handle_pointer(event(PointerPhase::Down, 0.25));
        let before = *controller.day_start();
        let response = controller.handle_pointer(PointerEvent::new(PointerPhase::Move, 10.0, 0.0));
        assert!(!response.redraw);
        assert_eq!(*controller.day_start(), before);
        assert!(controller.day_start().target().is_finite());
        assert!(controller.drag_state().is_dragging());

        // Release needs no distance, so it still ends and commits the drag
        let response = controller.handle_pointer(PointerEvent::new(PointerPhase::Up, 0.0, 0.0));
        assert_eq!(controller.drag_state(), DragState::Idle);
        assert_eq!(response.committed, Some(BoundaryChange::Sunrise(6 * 3_600_000)));
        assert!(!response.exclusive);
    }

    #[test]
    fn test_zero_width_cancel_ends_drag() {
        let mut controller = BoundaryController::new();
        controller.handle_pointer(event(PointerPhase::Down, 0.75));
        let response =
            controller.handle_pointer(PointerEvent::new(PointerPhase::Cancel, 0.0, 0.0));
        assert_eq!(controller.drag_state(), DragState::Idle);
        assert_eq!(response.committed, Some(BoundaryChange::Sunset(18 * 3_600_000)));
        assert!(!response.exclusive);
    }

    #[test]
    fn test_pointer_down_tie_picks_sunset() {
        let mut controller = BoundaryController::new();
        controller.handle_pointer(event(PointerPhase::Down, 0.5));
        assert!(matches!(controller.drag_state(), DragState::DraggingEnd { .. }));
    }

    fn assert_in_day(controller: &BoundaryController) {
        for target in [controller.day_start().target(), controller.day_end().target()] {
            assert!((DAY_START..=DAY_END).contains(&target), "{}", target);
        }
    }

    #[test]
    fn test_drag_with_boundaries_closer_than_range() {
        let mut controller = BoundaryController::new();
        controller.set_day_start(12 * 3_600_000, false);
        controller.set_day_end(12 * 3_600_000 + 60_000, false);

        controller.handle_pointer(event(PointerPhase::Down, 0.49));
        assert!(matches!(controller.drag_state(), DragState::DraggingStart { .. }));
        controller.handle_pointer(event(PointerPhase::Move, 0.6));
        controller.handle_pointer(event(PointerPhase::Up, 0.6));
        assert_in_day(&controller);
        settle(&mut controller);

        controller.handle_pointer(event(PointerPhase::Down, 0.52));
        assert!(matches!(controller.drag_state(), DragState::DraggingEnd { .. }));
        controller.handle_pointer(event(PointerPhase::Move, 0.3));
        controller.handle_pointer(event(PointerPhase::Up, 0.3));
        assert_in_day(&controller);
    }

    #[test]
    fn test_drag_with_boundaries_out_of_order() {
        let mut controller = BoundaryController::new();
        controller.set_day_start(12 * 3_600_000, false);
        controller.set_day_end(1_000, false);

        controller.handle_pointer(event(PointerPhase::Down, 0.5));
        assert!(matches!(controller.drag_state(), DragState::DraggingStart { .. }));
        controller.handle_pointer(event(PointerPhase::Move, 0.8));
        controller.handle_pointer(event(PointerPhase::Move, -0.2));
        controller.handle_pointer(event(PointerPhase::Up, -0.2));
        assert_in_day(&controller);
        assert_eq!(controller.day_start().target(), DAY_START);
    }

    #[test]
    fn test_setters_never_notify() {
        let (mut controller, rx) = controller_with_channel();
        controller.set_day_start(5 * 3_600_000, false);
        controller.set_day_end(20 * 3_600_000, true);
        settle(&mut controller);
        controller.set_day_start(-3_600_000, false);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_setters_wrap_millis() {
        let mut controller = BoundaryController::new();
        controller.set_day_start(DAY_LENGTH_MS + 6 * 3_600_000, false);
        assert_eq!(controller.day_start().current(), 0.25);
        assert_eq!(controller.day_start_millis(), 6 * 3_600_000);

        controller.set_day_end(-6 * 3_600_000, false);
        assert_eq!(controller.day_end_millis(), 18 * 3_600_000);
    }

    #[test]
    fn test_release_without_drag_is_silent() {
        let (mut controller, rx) = controller_with_channel();
        let response = controller.handle_pointer(event(PointerPhase::Up, 0.5));
        assert_eq!(response.committed, None);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_cancel_commits_by_default() {
        let (mut controller, rx) = controller_with_channel();
        controller.handle_pointer(event(PointerPhase::Down, 0.75));
        controller.handle_pointer(event(PointerPhase::Move, 0.5));
        controller.handle_pointer(event(PointerPhase::Cancel, 0.5));
        assert_eq!(rx.try_recv(), Ok(BoundaryChange::Sunset(43_200_000)));
        assert!(!controller.claims_exclusive_gesture());
    }

    #[test]
    fn test_cancel_reverts_when_configured() {
        let (tx, rx) = channel();
        let mut controller = BoundaryController::new().with_cancel_policy(CancelPolicy::Revert);
        controller.set_listener(Box::new(tx));

        controller.handle_pointer(event(PointerPhase::Down, 0.75));
        controller.handle_pointer(event(PointerPhase::Move, 0.5));
        let response = controller.handle_pointer(event(PointerPhase::Cancel, 0.5));

        assert_eq!(response.committed, None);
        assert_eq!(controller.day_end().target(), 0.75);
        assert_eq!(controller.drag_state(), DragState::Idle);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_compute_geometry_uses_current_values() {
        let mut controller = BoundaryController::new();
        controller.set_day_start(0, true);
        let geometry = controller.compute_geometry(230.0, 100.0, 12);
        // The first night segment ends at sunrise, still 0.25 until ticked
        assert!((geometry.curve().segments()[0].end.x - 60.0).abs() < 1e-3);

        controller.tick();
        let geometry = controller.compute_geometry(230.0, 100.0, 12);
        assert!(geometry.curve().segments()[0].end.x < 59.0);
    }
}
