//! Drag/pinch state machine on top of [`Viewport`].
//!
//! ## Usage
//!
//! 1) Forward every pointer or touch contact to [`GestureTracker::pointer_down`],
//!    [`GestureTracker::pointer_move`] and [`GestureTracker::pointer_up`].
//! 2) Call [`GestureTracker::cancel`] when the pointer leaves or the platform
//!    cancels the touch sequence.
//!
//! The tracker re-anchors its [`GestureSession`] on every change of the
//! contact count, so going from a pinch back to a drag (or the other way
//! round) never makes the image jump.

use crate::view::{DragSession, PinchSession, Viewport};
use eframe::egui::Pos2;

pub type PointerId = u64;

/// Id used for the mouse, distinct from any touch id the platform hands out.
pub const MOUSE_POINTER: PointerId = u64::MAX;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GesturePhase {
    Idle,
    Dragging,
    Pinching,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GestureSession {
    Drag(DragSession),
    Pinch(PinchSession),
}

#[derive(Clone, Debug, Default)]
pub struct GestureTracker {
    /// Active contacts in the order they went down.
    pointers: Vec<(PointerId, Pos2)>,
    session: Option<GestureSession>,
}

impl GestureTracker {
    pub fn phase(&self) -> GesturePhase {
        match self.session {
            None => GesturePhase::Idle,
            Some(GestureSession::Drag(_)) => GesturePhase::Dragging,
            Some(GestureSession::Pinch(_)) => GesturePhase::Pinching,
        }
    }

    pub fn session(&self) -> Option<&GestureSession> {
        self.session.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Whether any contact other than the mouse is down.
    pub fn has_touch(&self) -> bool {
        self.pointers.iter().any(|(id, _)| *id != MOUSE_POINTER)
    }

    pub fn pointer_down(&mut self, viewport: &Viewport, id: PointerId, pos: Pos2) {
        match self.pointers.iter_mut().find(|(p, _)| *p == id) {
            Some(pointer) => pointer.1 = pos,
            None => self.pointers.push((id, pos)),
        }
        self.reanchor(viewport);
    }

    /// Returns `true` when the view changed.
    pub fn pointer_move(&mut self, viewport: &mut Viewport, id: PointerId, pos: Pos2) -> bool {
        let Some(index) = self.pointers.iter().position(|(p, _)| *p == id) else {
            return false;
        };
        self.pointers[index].1 = pos;

        // Contacts past the first two do not take part in the gesture.
        if index > 1 {
            return false;
        }

        match (&self.session, self.pointers.as_slice()) {
            (Some(GestureSession::Drag(session)), [(_, p0), ..]) => {
                viewport.continue_drag(session, *p0);
                true
            }
            (Some(GestureSession::Pinch(session)), [(_, p0), (_, p1), ..]) => {
                viewport.continue_pinch(session, *p0, *p1);
                true
            }
            _ => false,
        }
    }

    pub fn pointer_up(&mut self, viewport: &Viewport, id: PointerId) {
        let before = self.pointers.len();
        self.pointers.retain(|(p, _)| *p != id);
        if self.pointers.len() != before {
            self.reanchor(viewport);
        }
    }

    /// Drop every contact, ending the gesture where it is.
    pub fn cancel(&mut self) {
        if self.session.is_some() {
            log::debug!("gesture cancelled in phase {:?}", self.phase());
        }
        self.pointers.clear();
        self.session = None;
    }

    fn reanchor(&mut self, viewport: &Viewport) {
        self.session = match self.pointers.as_slice() {
            [] => None,
            [(_, p0)] => Some(GestureSession::Drag(viewport.begin_drag(*p0))),
            [(_, p0), (_, p1), ..] => Some(GestureSession::Pinch(viewport.begin_pinch(*p0, *p1))),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::ViewLimits;
    use eframe::egui::{Vec2, pos2, vec2};

    const EPSILON: f32 = 1e-3;

    fn viewport() -> Viewport {
        let mut vp = Viewport::new(ViewLimits {
            padding_factor: 1.0,
            max_scale: 5.0,
        });
        vp.set_frame_size(vec2(1000.0, 500.0));
        vp.set_image_size(vec2(2000.0, 1000.0));
        vp
    }

    #[test]
    fn new_tracker_is_idle() {
        let tracker = GestureTracker::default();
        assert_eq!(tracker.phase(), GesturePhase::Idle);
        assert!(!tracker.is_active());
        assert!(!tracker.has_touch());
    }

    #[test]
    fn single_pointer_drags_then_returns_to_idle() {
        let mut vp = viewport();
        let mut tracker = GestureTracker::default();

        tracker.pointer_down(&vp, MOUSE_POINTER, pos2(100.0, 100.0));
        assert_eq!(tracker.phase(), GesturePhase::Dragging);
        assert!(!tracker.has_touch());

        assert!(tracker.pointer_move(&mut vp, MOUSE_POINTER, pos2(150.0, 80.0)));
        assert_eq!(vp.translate(), vec2(50.0, -20.0));

        tracker.pointer_up(&vp, MOUSE_POINTER);
        assert_eq!(tracker.phase(), GesturePhase::Idle);

        // Moves after release leave the view alone.
        assert!(!tracker.pointer_move(&mut vp, MOUSE_POINTER, pos2(500.0, 500.0)));
        assert_eq!(vp.translate(), vec2(50.0, -20.0));
    }

    #[test]
    fn second_touch_turns_drag_into_pinch() {
        let mut vp = viewport();
        let mut tracker = GestureTracker::default();

        tracker.pointer_down(&vp, 1, pos2(400.0, 250.0));
        tracker.pointer_move(&mut vp, 1, pos2(410.0, 250.0));
        assert_eq!(vp.translate(), vec2(10.0, 0.0));

        tracker.pointer_down(&vp, 2, pos2(610.0, 250.0));
        assert_eq!(tracker.phase(), GesturePhase::Pinching);
        assert!(tracker.has_touch());

        // Re-anchoring must not move anything by itself.
        assert_eq!(vp.translate(), vec2(10.0, 0.0));
        assert!((vp.scale() - 0.5).abs() < EPSILON);

        tracker.pointer_move(&mut vp, 2, pos2(810.0, 250.0));
        assert!((vp.scale() - 1.0).abs() < EPSILON);
    }

    #[test]
    fn lifting_one_finger_reanchors_a_drag_without_jump() {
        let mut vp = viewport();
        let mut tracker = GestureTracker::default();

        tracker.pointer_down(&vp, 7, pos2(400.0, 250.0));
        tracker.pointer_down(&vp, 8, pos2(600.0, 250.0));
        tracker.pointer_move(&mut vp, 8, pos2(800.0, 250.0));
        let after_pinch = vp.state();

        tracker.pointer_up(&vp, 7);
        assert_eq!(tracker.phase(), GesturePhase::Dragging);
        assert_eq!(vp.state(), after_pinch);

        tracker.pointer_move(&mut vp, 8, pos2(820.0, 260.0));
        assert!((vp.scale() - after_pinch.scale).abs() < EPSILON);
        let moved = vp.translate() - after_pinch.translate;
        assert!((moved - vec2(20.0, 10.0)).length() < EPSILON);

        tracker.pointer_up(&vp, 8);
        assert_eq!(tracker.phase(), GesturePhase::Idle);
    }

    #[test]
    fn third_contact_is_ignored_by_the_pinch() {
        let mut vp = viewport();
        let mut tracker = GestureTracker::default();

        tracker.pointer_down(&vp, 1, pos2(400.0, 250.0));
        tracker.pointer_down(&vp, 2, pos2(600.0, 250.0));
        tracker.pointer_down(&vp, 3, pos2(100.0, 100.0));
        assert_eq!(tracker.phase(), GesturePhase::Pinching);

        let before = vp.state();
        assert!(!tracker.pointer_move(&mut vp, 3, pos2(900.0, 400.0)));
        assert_eq!(vp.state(), before);
    }

    #[test]
    fn cancel_ends_any_gesture() {
        let mut vp = viewport();
        let mut tracker = GestureTracker::default();

        tracker.pointer_down(&vp, 1, pos2(400.0, 250.0));
        tracker.pointer_down(&vp, 2, pos2(600.0, 250.0));
        tracker.cancel();
        assert_eq!(tracker.phase(), GesturePhase::Idle);
        assert!(!tracker.has_touch());
        assert!(!tracker.pointer_move(&mut vp, 1, pos2(0.0, 0.0)));
        assert_eq!(vp.translate(), Vec2::ZERO);
    }

    #[test]
    fn releasing_an_unknown_pointer_keeps_the_session() {
        let vp = viewport();
        let mut tracker = GestureTracker::default();

        tracker.pointer_down(&vp, 1, pos2(10.0, 10.0));
        let session = *tracker.session().unwrap();
        tracker.pointer_up(&vp, 99);
        assert_eq!(tracker.session(), Some(&session));
    }
}
