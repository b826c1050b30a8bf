//! Pan/zoom transform over a single image shown inside a frame.
//!
//! Coordinates handed to [`Viewport`] are *frame-local*: `(0, 0)` is the
//! top-left corner of the frame. The translation stored in [`ViewState`] is
//! the offset of the image centre from the frame centre, so a fitted image
//! always has a zero translation.

use eframe::egui::{Pos2, Rect, Vec2};

/// Scale and translation currently applied to the image.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewState {
    pub scale: f32,
    pub translate: Vec2,
    /// Fit scale for the last known image and frame sizes, lower bound of `scale`.
    pub base_scale: f32,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            scale: 1.0,
            translate: Vec2::ZERO,
            base_scale: 1.0,
        }
    }
}

/// Result of [`compute_fit`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fit {
    pub scale: f32,
    pub translate: Vec2,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewLimits {
    /// Fraction of the frame the fitted image may occupy, in `(0, 1]`.
    pub padding_factor: f32,
    pub max_scale: f32,
}

impl Default for ViewLimits {
    fn default() -> Self {
        Self {
            padding_factor: 0.9,
            max_scale: 5.0,
        }
    }
}

/// Anchor of a single-pointer drag.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragSession {
    pub anchor_pos: Pos2,
    pub anchor_translate: Vec2,
}

/// Anchor of a two-pointer pinch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PinchSession {
    pub initial_distance: f32,
    pub initial_scale: f32,
    pub initial_midpoint: Pos2,
    pub initial_translate: Vec2,
}

fn valid_size(size: Vec2) -> bool {
    size.x.is_finite() && size.y.is_finite() && size.x > 0.0 && size.y > 0.0
}

fn midpoint(a: Pos2, b: Pos2) -> Pos2 {
    a.lerp(b, 0.5)
}

/// Fit `image_size` into `frame_size`, centred, leaving `padding_factor` of margin.
///
/// Returns `None` while either size is unknown (zero or degenerate).
pub fn compute_fit(image_size: Vec2, frame_size: Vec2, padding_factor: f32) -> Option<Fit> {
    if !valid_size(image_size) || !valid_size(frame_size) {
        return None;
    }

    Some(Fit {
        scale: viewer_utils::calculate_fit_scale(frame_size, image_size) * padding_factor,
        translate: Vec2::ZERO,
    })
}

#[derive(Clone, Debug)]
pub struct Viewport {
    limits: ViewLimits,
    image_size: Option<Vec2>,
    frame_size: Option<Vec2>,
    state: ViewState,
    /// Whether `state.base_scale` comes from real image and frame sizes.
    fitted: bool,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(ViewLimits::default())
    }
}

impl Viewport {
    pub fn new(limits: ViewLimits) -> Self {
        Self {
            limits,
            image_size: None,
            frame_size: None,
            state: ViewState::default(),
            fitted: false,
        }
    }

    #[inline]
    pub fn state(&self) -> ViewState {
        self.state
    }

    #[inline]
    pub fn scale(&self) -> f32 {
        self.state.scale
    }

    #[inline]
    pub fn translate(&self) -> Vec2 {
        self.state.translate
    }

    #[inline]
    pub fn base_scale(&self) -> f32 {
        self.state.base_scale
    }

    #[inline]
    pub fn limits(&self) -> ViewLimits {
        self.limits
    }

    #[inline]
    pub fn image_size(&self) -> Option<Vec2> {
        self.image_size
    }

    #[inline]
    pub fn frame_size(&self) -> Option<Vec2> {
        self.frame_size
    }

    /// Magnification relative to the image's natural size, for the readout.
    #[inline]
    pub fn zoom_percent(&self) -> f32 {
        self.state.scale * 100.0
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted
    }

    /// Fit for the last known sizes, if both are known.
    pub fn fit(&self) -> Option<Fit> {
        compute_fit(
            self.image_size?,
            self.frame_size?,
            self.limits.padding_factor,
        )
    }

    fn max_scale(&self) -> f32 {
        self.limits.max_scale.max(self.state.base_scale)
    }

    fn clamp_scale(&self, scale: f32) -> f32 {
        scale.clamp(self.state.base_scale, self.max_scale())
    }

    pub fn set_limits(&mut self, limits: ViewLimits) {
        if self.limits == limits {
            return;
        }
        self.limits = limits;
        self.refit_keeping_zoom();
    }

    /// Natural pixel size of a freshly loaded image; always starts from a fresh fit.
    pub fn set_image_size(&mut self, image_size: Vec2) {
        if !valid_size(image_size) {
            return;
        }
        self.image_size = Some(image_size);
        self.fitted = false;
        self.reset_view();
    }

    /// Frame size changed (layout, window resize, fullscreen).
    ///
    /// A view still sitting at the old fit follows the new fit; a manually
    /// zoomed view keeps its scale, clamped into the new bounds.
    pub fn set_frame_size(&mut self, frame_size: Vec2) {
        if !valid_size(frame_size) || self.frame_size == Some(frame_size) {
            return;
        }
        self.frame_size = Some(frame_size);
        self.refit_keeping_zoom();
    }

    fn refit_keeping_zoom(&mut self) {
        let Some(fit) = self.fit() else {
            return;
        };

        if !self.fitted {
            self.reset_view();
            return;
        }

        let at_base = (self.state.scale - self.state.base_scale).abs() <= f32::EPSILON;
        self.state.base_scale = fit.scale;
        self.state.scale = if at_base {
            fit.scale
        } else {
            self.clamp_scale(self.state.scale)
        };

        log::debug!(
            "refit: base scale {:.4}, scale {:.4}",
            self.state.base_scale,
            self.state.scale
        );
    }

    /// Reapply the fit for the last known sizes. No-op until both are known.
    pub fn reset_view(&mut self) -> ViewState {
        if let Some(fit) = self.fit() {
            self.state = ViewState {
                scale: fit.scale,
                translate: fit.translate,
                base_scale: fit.scale,
            };
            self.fitted = true;
        }
        self.state
    }

    /// Multiply the scale by `factor`, keeping the image point under `anchor` in place.
    ///
    /// Without an anchor the translation is left untouched, which zooms about
    /// the image centre.
    pub fn zoom_by(&mut self, factor: f32, anchor: Option<Pos2>) -> ViewState {
        if !factor.is_finite() || factor <= 0.0 {
            return self.state;
        }

        let old_scale = self.state.scale;
        let new_scale = self.clamp_scale(old_scale * factor);

        if let (Some(anchor), Some(frame_size)) = (anchor, self.frame_size) {
            let offset = anchor.to_vec2() - frame_size * 0.5 - self.state.translate;
            self.state.translate -= offset * (new_scale / old_scale - 1.0);
        }
        self.state.scale = new_scale;

        self.state
    }

    /// Zoom so that `scale` becomes `target`, anchored like [`Viewport::zoom_by`].
    pub fn zoom_to(&mut self, target: f32, anchor: Option<Pos2>) -> ViewState {
        self.zoom_by(target / self.state.scale, anchor)
    }

    /// Translation is unbounded; the image may leave the frame entirely.
    pub fn pan_by(&mut self, delta: Vec2) -> ViewState {
        if delta.x.is_finite() && delta.y.is_finite() {
            self.state.translate += delta;
        }
        self.state
    }

    pub fn begin_drag(&self, pointer_pos: Pos2) -> DragSession {
        DragSession {
            anchor_pos: pointer_pos,
            anchor_translate: self.state.translate,
        }
    }

    /// Depends only on the session and `pointer_pos`, never on earlier samples.
    pub fn continue_drag(&mut self, session: &DragSession, pointer_pos: Pos2) -> ViewState {
        self.state.translate = pointer_pos - session.anchor_pos + session.anchor_translate;
        self.state
    }

    pub fn begin_pinch(&self, touch_a: Pos2, touch_b: Pos2) -> PinchSession {
        PinchSession {
            initial_distance: touch_a.distance(touch_b),
            initial_scale: self.state.scale,
            initial_midpoint: midpoint(touch_a, touch_b),
            initial_translate: self.state.translate,
        }
    }

    /// Scale follows the distance ratio against the session's initial scale, and
    /// the image point that was under the initial midpoint follows the live one.
    pub fn continue_pinch(
        &mut self,
        session: &PinchSession,
        touch_a: Pos2,
        touch_b: Pos2,
    ) -> ViewState {
        let ratio = if session.initial_distance > f32::EPSILON {
            touch_a.distance(touch_b) / session.initial_distance
        } else {
            1.0
        };
        let new_scale = self.clamp_scale(session.initial_scale * ratio);
        let live_midpoint = midpoint(touch_a, touch_b);

        self.state.translate = match self.frame_size {
            Some(frame_size) => {
                let centre = frame_size * 0.5;
                let grabbed =
                    session.initial_midpoint.to_vec2() - centre - session.initial_translate;
                live_midpoint.to_vec2() - centre - grabbed * (new_scale / session.initial_scale)
            }
            None => session.initial_translate + (live_midpoint - session.initial_midpoint),
        };
        self.state.scale = new_scale;

        self.state
    }

    /// On-screen rect of the image when the frame occupies `frame_rect`.
    pub fn image_rect(&self, frame_rect: Rect) -> Option<Rect> {
        let image_size = self.image_size?;
        Some(Rect::from_center_size(
            frame_rect.center() + self.state.translate,
            image_size * self.state.scale,
        ))
    }

    /// Frame-local point to image pixel coordinates.
    pub fn frame_to_image(&self, pos: Pos2) -> Option<Pos2> {
        let (image_size, frame_size) = (self.image_size?, self.frame_size?);
        let relative = (pos.to_vec2() - frame_size * 0.5 - self.state.translate) / self.state.scale;
        Some((relative + image_size * 0.5).to_pos2())
    }

    /// Image pixel coordinates to a frame-local point.
    pub fn image_to_frame(&self, pos: Pos2) -> Option<Pos2> {
        let (image_size, frame_size) = (self.image_size?, self.frame_size?);
        let relative = (pos.to_vec2() - image_size * 0.5) * self.state.scale;
        Some((relative + frame_size * 0.5 + self.state.translate).to_pos2())
    }
}
