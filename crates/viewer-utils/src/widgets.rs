//! Contains widgets related utils

use crate::animation::color_lerp;
use eframe::egui::{self, Align2, Color32, CornerRadius, Sense, Vec2, Widget, WidgetText};

/// Just a button, with plain style
pub struct PlainButton {
    text: WidgetText,
    size: Vec2,
    font_size: Option<f32>,
    corner_radius: CornerRadius,
    fill: Option<Color32>,
    hover: Option<Color32>,
    selected: bool,
}

impl PlainButton {
    pub fn new(size: Vec2, text: impl Into<WidgetText>) -> Self {
        Self {
            text: text.into(),
            size,
            font_size: None,
            corner_radius: Default::default(),
            fill: None,
            hover: None,
            selected: false,
        }
    }

    #[inline]
    pub fn corner_radius(mut self, corner_radius: impl Into<CornerRadius>) -> Self {
        self.corner_radius = corner_radius.into();
        self
    }

    #[inline]
    pub fn fill(mut self, fill: impl Into<Color32>) -> Self {
        self.fill = Some(fill.into());
        self
    }

    #[inline]
    pub fn hover(mut self, hover: impl Into<Color32>) -> Self {
        self.hover = Some(hover.into());
        self
    }

    #[inline]
    pub fn font_size(mut self, font_size: f32) -> Self {
        self.font_size = Some(font_size);
        self
    }

    /// Keep the hover look while `selected` is set, for toggles such as fullscreen.
    #[inline]
    pub fn selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }
}

impl Widget for PlainButton {
    fn ui(self, ui: &mut egui::Ui) -> egui::Response {
        let (rect, response) = ui.allocate_exact_size(self.size, Sense::click());

        if ui.is_rect_visible(rect) {
            let lit = response.hovered() || self.selected;
            let factor = ui.ctx().animate_bool(response.id, lit);

            let fill = self.fill.unwrap_or(Color32::TRANSPARENT);
            let hover = self
                .hover
                .unwrap_or(ui.visuals().widgets.hovered.bg_fill);

            ui.painter()
                .rect_filled(rect, self.corner_radius, color_lerp(fill, hover, factor));

            let text_color = ui.style().visuals.text_color();
            let strong_text_color = ui.style().visuals.strong_text_color();
            let mut font_id = crate::get_body_font_id(ui);
            if let Some(font_size) = self.font_size {
                font_id.size = font_size;
            }

            ui.painter().text(
                rect.center(),
                Align2::CENTER_CENTER,
                self.text.text(),
                font_id,
                color_lerp(text_color, strong_text_color, factor),
            );
        }

        response
    }
}
