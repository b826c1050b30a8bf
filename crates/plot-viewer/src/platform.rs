//! Fullscreen and clipboard access behind one small trait.
//!
//! The app picks an implementation once at startup; the viewer only ever
//! talks to `dyn DisplayPlatform`.

use eframe::egui::{self, ColorImage, ViewportCommand};

pub trait DisplayPlatform {
    fn is_fullscreen(&self) -> bool;

    fn request_fullscreen(&mut self);

    fn exit_fullscreen(&mut self);

    fn write_image_to_clipboard(&mut self, image: ColorImage);

    fn toggle_fullscreen(&mut self) {
        if self.is_fullscreen() {
            self.exit_fullscreen();
        } else {
            self.request_fullscreen();
        }
    }
}

/// Drives the native window through egui viewport commands.
pub struct EguiPlatform {
    ctx: egui::Context,
}

impl EguiPlatform {
    pub fn new(ctx: &egui::Context) -> Self {
        Self { ctx: ctx.clone() }
    }
}

impl DisplayPlatform for EguiPlatform {
    fn is_fullscreen(&self) -> bool {
        viewer_utils::is_fullscreen(&self.ctx)
    }

    fn request_fullscreen(&mut self) {
        self.ctx.send_viewport_cmd(ViewportCommand::Fullscreen(true));
    }

    fn exit_fullscreen(&mut self) {
        self.ctx.send_viewport_cmd(ViewportCommand::Fullscreen(false));
    }

    fn write_image_to_clipboard(&mut self, image: ColorImage) {
        log::info!("copy {}x{} image to clipboard", image.size[0], image.size[1]);
        self.ctx.copy_image(image);
    }
}

/// Records requests instead of acting on them.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingPlatform {
    pub fullscreen: bool,
    pub fullscreen_requests: usize,
    /// Sizes of the images written to the clipboard.
    pub clipboard: Vec<[usize; 2]>,
}

#[cfg(test)]
impl DisplayPlatform for RecordingPlatform {
    fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    fn request_fullscreen(&mut self) {
        self.fullscreen = true;
        self.fullscreen_requests += 1;
    }

    fn exit_fullscreen(&mut self) {
        self.fullscreen = false;
        self.fullscreen_requests += 1;
    }

    fn write_image_to_clipboard(&mut self, image: ColorImage) {
        self.clipboard.push(image.size);
    }
}
