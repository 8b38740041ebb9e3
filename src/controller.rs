//! Drag / auto-rotate interaction state machine
//!
//! Tracks pointer and touch input and decides each frame whether the view
//! drifts on its own or follows the user's drag. After a release the view
//! holds still for a cooldown period before the drift resumes.
//!
//! Three phases:
//! - `Auto`: no recent input, longitude drifts by a fixed step per frame.
//! - `Dragging`: orientation is a linear function of pointer displacement
//!   from the position and orientation captured at pointer-down.
//! - `Cooldown`: pointer released, orientation frozen until the deadline.
//!
//! A new pointer-down in any phase replaces the whole phase, which is what
//! cancels a pending cooldown. There is never more than one deadline.

use std::time::{Duration, Instant};

use crate::camera::Orientation;

/// Tunable interaction constants, filled from [`ViewerConfig`](crate::config::ViewerConfig)
#[derive(Debug, Clone, Copy)]
pub struct ControllerSettings {
    /// Degrees of rotation per pixel of drag
    pub sensitivity_deg_per_px: f32,
    /// Longitude increment per frame while drifting
    pub auto_rotate_step_deg: f32,
    /// Hold time between release and drift resuming
    pub cooldown: Duration,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            sensitivity_deg_per_px: 0.1,
            auto_rotate_step_deg: 0.1,
            cooldown: Duration::from_secs(5),
        }
    }
}

/// Reference frame captured at pointer-down
#[derive(Debug, Clone, Copy)]
struct DragSession {
    /// Pointer position at the start of the drag, physical pixels
    start_px: (f32, f32),
    /// Orientation at the start of the drag
    start_orientation: Orientation,
}

/// Interaction phase
#[derive(Debug, Clone, Copy)]
enum Phase {
    /// Idle, orientation drifts
    Auto,
    /// Pointer held down, orientation follows the pointer
    Dragging(DragSession),
    /// Released, frozen until the deadline passes
    Cooldown { until: Instant },
}

/// Pointer-driven orientation controller for the panorama camera
pub struct OrbitController {
    orientation: Orientation,
    phase: Phase,
    settings: ControllerSettings,
}

impl OrbitController {
    /// Create a controller starting in the drifting phase
    pub fn new(orientation: Orientation, settings: ControllerSettings) -> Self {
        Self {
            orientation,
            phase: Phase::Auto,
            settings,
        }
    }

    /// Current look orientation
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Whether the view is currently drifting on its own
    pub fn is_auto(&self) -> bool {
        matches!(self.phase, Phase::Auto)
    }

    /// Whether a drag is in progress
    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, Phase::Dragging(_))
    }

    /// Begin a drag at the given pointer position.
    ///
    /// Valid in any phase; replacing a `Cooldown` phase discards its
    /// deadline so the drift cannot resume mid-drag.
    pub fn pointer_down(&mut self, pos_px: (f32, f32)) {
        self.phase = Phase::Dragging(DragSession {
            start_px: pos_px,
            start_orientation: self.orientation,
        });
    }

    /// Update the drag with a new pointer position.
    ///
    /// Orientation is recomputed from the drag's reference frame rather
    /// than accumulated. Ignored unless a drag is in progress.
    pub fn pointer_move(&mut self, pos_px: (f32, f32)) {
        let Phase::Dragging(session) = self.phase else {
            return;
        };

        let k = self.settings.sensitivity_deg_per_px;
        // Dragging right turns the view left, dragging down tilts up,
        // matching the feel of grabbing the image itself.
        self.orientation = Orientation::new(
            session.start_orientation.longitude + (session.start_px.0 - pos_px.0) * k,
            session.start_orientation.latitude + (pos_px.1 - session.start_px.1) * k,
        );
    }

    /// End the drag and arm the cooldown deadline.
    ///
    /// Orientation freezes at its current value. Ignored unless a drag is
    /// in progress, so a stray release cannot restart an elapsed cooldown.
    pub fn pointer_up(&mut self, now: Instant) {
        if self.is_dragging() {
            self.phase = Phase::Cooldown {
                until: now + self.settings.cooldown,
            };
        }
    }

    /// Per-frame tick: resolve an elapsed cooldown, apply drift, clamp.
    ///
    /// The frame on which the deadline passes already drifts.
    pub fn advance_frame(&mut self, now: Instant) {
        if let Phase::Cooldown { until } = self.phase {
            if now >= until {
                self.phase = Phase::Auto;
            }
        }

        if let Phase::Auto = self.phase {
            self.orientation.longitude += self.settings.auto_rotate_step_deg;
        }

        self.orientation = self.orientation.clamped();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> OrbitController {
        OrbitController::new(Orientation::default(), ControllerSettings::default())
    }

    #[test]
    fn test_auto_rotate_advances_each_frame() {
        let mut ctrl = controller();
        let now = Instant::now();
        assert!(ctrl.is_auto());

        ctrl.advance_frame(now);
        assert!((ctrl.orientation().longitude - 0.1).abs() < 1e-6);
        ctrl.advance_frame(now);
        assert!((ctrl.orientation().longitude - 0.2).abs() < 1e-6);
        assert_eq!(ctrl.orientation().latitude, 0.0);
    }

    #[test]
    fn test_drag_is_linear_in_displacement() {
        let mut ctrl = OrbitController::new(
            Orientation::new(10.0, 5.0),
            ControllerSettings::default(),
        );
        ctrl.pointer_down((100.0, 200.0));
        ctrl.pointer_move((150.0, 230.0));

        // lon0 + (start_x - x) * k, lat0 + (y - start_y) * k with k = 0.1
        assert!((ctrl.orientation().longitude - (10.0 - 50.0 * 0.1)).abs() < 1e-5);
        assert!((ctrl.orientation().latitude - (5.0 + 30.0 * 0.1)).abs() < 1e-5);
    }

    #[test]
    fn test_drag_recomputes_from_reference_frame() {
        let mut ctrl = controller();
        ctrl.pointer_down((0.0, 0.0));
        ctrl.pointer_move((10.0, 0.0));
        ctrl.pointer_move((10.0, 0.0));
        // Repeated identical moves must not accumulate
        assert!((ctrl.orientation().longitude + 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_move_ignored_outside_drag() {
        let mut ctrl = controller();
        ctrl.pointer_move((500.0, 500.0));
        assert_eq!(ctrl.orientation(), Orientation::default());

        ctrl.pointer_down((0.0, 0.0));
        ctrl.pointer_up(Instant::now());
        ctrl.pointer_move((500.0, 500.0));
        assert_eq!(ctrl.orientation(), Orientation::default());
    }

    #[test]
    fn test_drag_suspends_auto_rotate() {
        let mut ctrl = controller();
        ctrl.pointer_down((0.0, 0.0));
        let lon = ctrl.orientation().longitude;
        ctrl.advance_frame(Instant::now());
        assert_eq!(ctrl.orientation().longitude, lon);
    }

    #[test]
    fn test_release_freezes_until_cooldown_elapses() {
        let mut ctrl = controller();
        let t0 = Instant::now();

        ctrl.pointer_down((0.0, 0.0));
        ctrl.pointer_move((10.0, 0.0));
        ctrl.pointer_up(t0);
        let frozen = ctrl.orientation();

        // Frozen for the entire cooldown window
        ctrl.advance_frame(t0 + Duration::from_millis(1));
        ctrl.advance_frame(t0 + Duration::from_millis(4999));
        assert_eq!(ctrl.orientation(), frozen);
        assert!(!ctrl.is_auto());

        // First frame at the deadline drifts again
        ctrl.advance_frame(t0 + Duration::from_secs(5));
        assert!(ctrl.is_auto());
        assert!((ctrl.orientation().longitude - frozen.longitude - 0.1).abs() < 1e-5);
    }

    #[test]
    fn test_new_drag_cancels_pending_cooldown() {
        let mut ctrl = controller();
        let t0 = Instant::now();

        ctrl.pointer_down((0.0, 0.0));
        ctrl.pointer_up(t0);

        // Second drag starts before the deadline fires
        ctrl.pointer_down((0.0, 0.0));
        let lon = ctrl.orientation().longitude;

        // Well past the first deadline the view must still be held
        ctrl.advance_frame(t0 + Duration::from_secs(60));
        assert!(!ctrl.is_auto());
        assert_eq!(ctrl.orientation().longitude, lon);
    }

    #[test]
    fn test_stray_release_does_not_rearm_cooldown() {
        let mut ctrl = controller();
        let t0 = Instant::now();
        ctrl.pointer_up(t0);
        ctrl.advance_frame(t0);
        assert!(ctrl.is_auto());
    }

    #[test]
    fn test_latitude_clamped_every_frame() {
        let mut ctrl = controller();
        ctrl.pointer_down((0.0, 0.0));
        // Drag far enough down to push latitude past the pole limit
        ctrl.pointer_move((0.0, 2000.0));
        assert!(ctrl.orientation().latitude > 85.0);

        ctrl.advance_frame(Instant::now());
        assert_eq!(ctrl.orientation().latitude, 85.0);
    }
}
