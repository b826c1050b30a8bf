use crate::{
    command::{Command, Keymap},
    config::ViewerConfig,
    gesture::{GesturePhase, GestureTracker, MOUSE_POINTER, PointerId},
    platform::DisplayPlatform,
    source::{ImageLoader, ImageSource},
    view::Viewport,
};
use eframe::egui::{
    self, Align, Align2, Color32, ColorImage, CornerRadius, CursorIcon, FontId, Key, Layout,
    MouseWheelUnit, PointerButton, Pos2, Rect, RichText, Sense, TouchPhase, UiBuilder, pos2, vec2,
};
use viewer_utils::widgets::PlainButton;

/// Points scrolled by one wheel "line".
const POINTS_PER_LINE: f32 = 50.0;

enum ImageState {
    Loading(ImageLoader),
    Ready {
        texture: egui::TextureHandle,
        pixels: ColorImage,
    },
    Failed(String),
}

/// What the host learns from one frame of the viewer.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ViewerResponse {
    /// The user asked to dismiss the viewer. The host decides what closing means.
    pub close_requested: bool,
    pub zoom_percent: f32,
}

/// Zoom factor for a wheel movement of `delta` points.
pub fn wheel_zoom_factor(delta: f32, speed: f32) -> f32 {
    (delta * speed).exp()
}

pub struct PlotViewer {
    id: egui::Id,
    title: String,
    source: ImageSource,
    config: ViewerConfig,
    keymap: Keymap,
    viewport: Viewport,
    gestures: GestureTracker,
    image: ImageState,
}

impl PlotViewer {
    /// Start decoding `source` in the background and show it once ready.
    pub fn open(
        ctx: &egui::Context,
        title: impl Into<String>,
        source: ImageSource,
        config: ViewerConfig,
    ) -> Self {
        let loader = ImageLoader::spawn(ctx, source.clone());
        Self::with_state(title.into(), source, config, ImageState::Loading(loader))
    }

    /// Show already decoded pixels.
    pub fn from_image(
        ctx: &egui::Context,
        title: impl Into<String>,
        pixels: ColorImage,
        config: ViewerConfig,
    ) -> Self {
        let title = title.into();
        let source = ImageSource::from_bytes(title.clone(), Vec::new());
        let mut this = Self::with_state(title, source, config, ImageState::Failed(String::new()));
        this.image = this.ready_state(ctx, pixels);
        this
    }

    fn with_state(
        title: String,
        source: ImageSource,
        config: ViewerConfig,
        image: ImageState,
    ) -> Self {
        let config = config.sanitized();
        Self {
            id: egui::Id::new("plot_viewer").with(&title),
            keymap: config.bindings.resolve(),
            viewport: Viewport::new(config.limits()),
            gestures: GestureTracker::default(),
            title,
            source,
            config,
            image,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn source(&self) -> &ImageSource {
        &self.source
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn gesture_phase(&self) -> GesturePhase {
        self.gestures.phase()
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.image, ImageState::Ready { .. })
    }

    pub fn load_error(&self) -> Option<&str> {
        match &self.image {
            ImageState::Failed(err) => Some(err),
            _ => None,
        }
    }

    pub fn set_config(&mut self, config: ViewerConfig) {
        let config = config.sanitized();
        self.keymap = config.bindings.resolve();
        self.viewport.set_limits(config.limits());
        self.config = config;
    }

    /// Run one command. Returns `true` when it asks for the viewer to close.
    pub fn execute(&mut self, command: Command, platform: &mut dyn DisplayPlatform) -> bool {
        log::debug!("execute {command:?}");

        match command {
            Command::ZoomIn => {
                self.viewport.zoom_by(self.config.zoom_step, None);
            }
            Command::ZoomOut => {
                self.viewport.zoom_by(1.0 / self.config.zoom_step, None);
            }
            Command::Reset => {
                self.gestures.cancel();
                self.viewport.reset_view();
            }
            Command::ToggleFullscreen => platform.toggle_fullscreen(),
            Command::CopyImage => match &self.image {
                ImageState::Ready { pixels, .. } => platform.write_image_to_clipboard(pixels.clone()),
                _ => log::warn!("nothing to copy, '{}' is not loaded", self.title),
            },
            Command::Close => return true,
        }

        false
    }

    pub fn show(&mut self, ui: &mut egui::Ui, platform: &mut dyn DisplayPlatform) -> ViewerResponse {
        self.poll_image(ui.ctx());

        let rect = ui.max_rect();
        let inset = self.config.frame_inset.min(rect.height());
        let header_rect = rect.with_max_y(rect.top() + inset);
        let frame_rect = rect.with_min_y(rect.top() + inset);
        self.viewport.set_frame_size(frame_rect.size());

        let response = ui.interact(frame_rect, self.id.with("frame"), Sense::click_and_drag());

        let mut close_requested = self.process_pointer(ui, frame_rect, &response);

        let mut commands = self.process_keys(ui, platform, &mut close_requested);
        commands.extend(self.ui_header(ui, header_rect, platform.is_fullscreen()));

        if !commands.is_empty() {
            ui.ctx().request_repaint();
        }
        for command in commands {
            close_requested |= self.execute(command, platform);
        }

        self.update_cursor(ui, frame_rect, &response);
        self.paint(ui, frame_rect);

        ViewerResponse {
            close_requested,
            zoom_percent: self.viewport.zoom_percent(),
        }
    }

    fn poll_image(&mut self, ctx: &egui::Context) {
        let ImageState::Loading(loader) = &self.image else {
            return;
        };
        let Some(result) = loader.poll() else {
            return;
        };

        self.image = match result {
            Ok(pixels) => self.ready_state(ctx, pixels),
            Err(err) => ImageState::Failed(err),
        };
    }

    fn ready_state(&mut self, ctx: &egui::Context, pixels: ColorImage) -> ImageState {
        let [width, height] = pixels.size;
        log::info!("show '{}' ({width}x{height})", self.title);

        let texture = ctx.load_texture(
            format!("plot_viewer/{}", self.title),
            pixels.clone(),
            egui::TextureOptions::LINEAR,
        );
        // Natural size is known now, which is what triggers the fit.
        self.viewport.set_image_size(vec2(width as f32, height as f32));

        ImageState::Ready { texture, pixels }
    }

    /// Touch, mouse and wheel input over the frame. Returns `true` on a backdrop click.
    fn process_pointer(&mut self, ui: &egui::Ui, frame_rect: Rect, response: &egui::Response) -> bool {
        let to_local = |pos: Pos2| (pos - frame_rect.min).to_pos2();
        let hovered = response.contains_pointer();

        let events = ui.input(|i| i.events.clone());
        let mut wheel_delta = 0.0;
        let mut zoom_factor = 1.0;

        for event in &events {
            match event {
                egui::Event::Touch { id, phase, pos, .. } => {
                    self.on_touch(id.0, *phase, to_local(*pos), frame_rect.contains(*pos));
                }
                egui::Event::MouseWheel { unit, delta, .. } if hovered => {
                    wheel_delta += match unit {
                        MouseWheelUnit::Point => delta.y,
                        MouseWheelUnit::Line => delta.y * POINTS_PER_LINE,
                        MouseWheelUnit::Page => delta.y * frame_rect.height(),
                    };
                }
                egui::Event::Zoom(factor) if hovered => zoom_factor *= factor,
                egui::Event::PointerGone => self.gestures.cancel(),
                _ => (),
            }
        }

        let factor = zoom_factor * wheel_zoom_factor(wheel_delta, self.config.wheel_zoom_speed);
        if (factor - 1.0).abs() > f32::EPSILON {
            let anchor = response.hover_pos().map(to_local);
            self.viewport.zoom_by(factor, anchor);
        }

        // Platforms emulate a mouse for the first finger; the touch events already cover it.
        if !self.gestures.has_touch() {
            let pointer_pos = response.interact_pointer_pos().map(to_local);

            if response.drag_started_by(PointerButton::Primary) {
                // Anchor where the button went down, not where the drag threshold was crossed.
                let press_origin = ui.input(|i| i.pointer.press_origin()).map(to_local);
                if let Some(pos) = press_origin.or(pointer_pos) {
                    self.gestures.pointer_down(&self.viewport, MOUSE_POINTER, pos);
                }
            }

            // Leaving the frame ends a mouse drag where it is.
            if self.gestures.phase() == GesturePhase::Dragging && !response.contains_pointer() {
                self.gestures.cancel();
            }

            if response.dragged_by(PointerButton::Primary) {
                if let Some(pos) = pointer_pos {
                    self.gestures.pointer_move(&mut self.viewport, MOUSE_POINTER, pos);
                }
            }
            if response.drag_stopped() {
                self.gestures.pointer_up(&self.viewport, MOUSE_POINTER);
            }
        }

        if response.double_clicked() {
            self.gestures.cancel();
            self.viewport.reset_view();
            return false;
        }

        if response.clicked() {
            let on_image = match (self.image_rect(frame_rect), response.interact_pointer_pos()) {
                (Some(image_rect), Some(pos)) => image_rect.contains(pos),
                _ => false,
            };
            let loading = matches!(self.image, ImageState::Loading(_));
            if !on_image && !loading {
                log::debug!("backdrop clicked");
                return true;
            }
        }

        false
    }

    fn on_touch(&mut self, id: PointerId, phase: TouchPhase, pos: Pos2, inside: bool) {
        match phase {
            TouchPhase::Start => {
                if !inside {
                    return;
                }
                if !self.gestures.has_touch() {
                    // A finger takes over from a mouse drag still in progress.
                    self.gestures.pointer_up(&self.viewport, MOUSE_POINTER);
                }
                self.gestures.pointer_down(&self.viewport, id, pos);
            }
            TouchPhase::Move => {
                self.gestures.pointer_move(&mut self.viewport, id, pos);
            }
            TouchPhase::End => self.gestures.pointer_up(&self.viewport, id),
            TouchPhase::Cancel => self.gestures.cancel(),
        }
    }

    /// Commands from key presses, only while nothing else holds keyboard focus.
    fn process_keys(
        &mut self,
        ui: &egui::Ui,
        platform: &mut dyn DisplayPlatform,
        close_requested: &mut bool,
    ) -> Vec<Command> {
        if ui.memory(|mem| mem.focused().is_some()) {
            return Vec::new();
        }

        let escape_bound = self.keymap.command_for(Key::Escape).is_some();
        let (commands, escape) = ui.input(|i| {
            (
                self.keymap.pressed(i),
                !escape_bound && i.key_pressed(Key::Escape),
            )
        });

        if escape {
            if platform.is_fullscreen() {
                platform.exit_fullscreen();
            } else {
                *close_requested = true;
            }
        }

        commands
    }

    fn ui_header(&self, ui: &mut egui::Ui, header_rect: Rect, fullscreen: bool) -> Vec<Command> {
        let mut commands = Vec::new();
        if header_rect.height() < 1.0 {
            return commands;
        }

        ui.painter().rect_filled(
            header_rect,
            CornerRadius::ZERO,
            Color32::from_black_alpha(180),
        );

        let height = header_rect.height() - 8.0;
        ui.scope_builder(
            UiBuilder::new().max_rect(header_rect.shrink2(vec2(8.0, 0.0))),
            |ui| {
                ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                    let mut button = |ui: &mut egui::Ui, text: &str, width: f32, command: Command| {
                        let selected = command == Command::ToggleFullscreen && fullscreen;
                        let response = ui
                            .add(
                                PlainButton::new(vec2(width, height), text.to_owned())
                                    .corner_radius(CornerRadius::same(4))
                                    .selected(selected),
                            )
                            .on_hover_text(self.keymap.describe(command));
                        if response.clicked() {
                            commands.push(command);
                        }
                    };

                    button(ui, "×", height, Command::Close);
                    button(ui, "Copy", height * 2.0, Command::CopyImage);
                    button(ui, "Full", height * 2.0, Command::ToggleFullscreen);
                    button(ui, "Fit", height * 2.0, Command::Reset);
                    button(ui, "+", height, Command::ZoomIn);
                    button(ui, "−", height, Command::ZoomOut);

                    ui.label(
                        RichText::new(format!("{:.0}%", self.viewport.zoom_percent()))
                            .monospace()
                            .color(Color32::LIGHT_GRAY),
                    );

                    ui.with_layout(Layout::left_to_right(Align::Center), |ui| {
                        ui.add(
                            egui::Label::new(RichText::new(&self.title).strong().color(Color32::WHITE))
                                .truncate(),
                        );
                    });
                });
            },
        );

        commands
    }

    fn image_rect(&self, frame_rect: Rect) -> Option<Rect> {
        match self.image {
            ImageState::Ready { .. } => self.viewport.image_rect(frame_rect),
            _ => None,
        }
    }

    fn update_cursor(&self, ui: &egui::Ui, frame_rect: Rect, response: &egui::Response) {
        if self.gestures.phase() == GesturePhase::Dragging {
            ui.ctx().set_cursor_icon(CursorIcon::Grabbing);
        } else if let (Some(image_rect), Some(pos)) = (self.image_rect(frame_rect), response.hover_pos()) {
            if image_rect.contains(pos) {
                ui.ctx().set_cursor_icon(CursorIcon::Grab);
            }
        }
    }

    fn paint(&self, ui: &egui::Ui, frame_rect: Rect) {
        let painter = ui.painter_at(frame_rect);
        let show_center_text = |text: String, color: Color32| {
            painter.text(
                frame_rect.center(),
                Align2::CENTER_CENTER,
                text,
                FontId::proportional(16.0),
                color,
            );
        };

        match &self.image {
            ImageState::Ready { texture, .. } => {
                if let Some(image_rect) = self.viewport.image_rect(frame_rect) {
                    painter.image(
                        texture.id(),
                        image_rect,
                        Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0)),
                        Color32::WHITE,
                    );
                }
            }
            ImageState::Loading(_) => {
                show_center_text(format!("Loading {}...", self.title), Color32::GRAY)
            }
            ImageState::Failed(err) => show_center_text(
                format!("Cannot show {}\n{err}", self.source.label()),
                ui.visuals().error_fg_color,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::RecordingPlatform;
    use eframe::egui::{Event, Modifiers, RawInput, TouchDeviceId, TouchId};

    const EPSILON: f32 = 1e-3;

    fn config() -> ViewerConfig {
        ViewerConfig {
            padding_factor: 1.0,
            frame_inset: 0.0,
            ..Default::default()
        }
    }

    fn pixels(width: usize, height: usize) -> ColorImage {
        ColorImage::from_rgba_unmultiplied([width, height], &vec![200; width * height * 4])
    }

    fn run_frame(
        ctx: &egui::Context,
        viewer: &mut PlotViewer,
        platform: &mut RecordingPlatform,
        events: Vec<Event>,
    ) -> ViewerResponse {
        let mut response = ViewerResponse::default();
        let input = RawInput {
            screen_rect: Some(Rect::from_min_size(Pos2::ZERO, vec2(100.0, 50.0))),
            events,
            ..Default::default()
        };
        let _ = ctx.run(input, |ctx| {
            egui::CentralPanel::default()
                .frame(egui::Frame::NONE)
                .show(ctx, |ui| {
                    response = viewer.show(ui, platform);
                });
        });
        response
    }

    fn key(key: Key) -> Event {
        Event::Key {
            key,
            physical_key: None,
            pressed: true,
            repeat: false,
            modifiers: Modifiers::NONE,
        }
    }

    fn touch(id: u64, phase: TouchPhase, pos: Pos2) -> Event {
        Event::Touch {
            device_id: TouchDeviceId(0),
            id: TouchId(id),
            phase,
            pos,
            force: None,
        }
    }

    fn moved(x: f32, y: f32) -> Event {
        Event::PointerMoved(pos2(x, y))
    }

    fn primary(x: f32, y: f32, pressed: bool) -> Event {
        Event::PointerButton {
            pos: pos2(x, y),
            button: PointerButton::Primary,
            pressed,
            modifiers: Modifiers::NONE,
        }
    }

    fn click(x: f32, y: f32) -> Vec<Event> {
        vec![moved(x, y), primary(x, y, true), primary(x, y, false)]
    }

    /// One frame per event. Returns whether any frame asked to close.
    fn run_frames(
        ctx: &egui::Context,
        viewer: &mut PlotViewer,
        platform: &mut RecordingPlatform,
        events: Vec<Event>,
    ) -> bool {
        let mut close_requested = false;
        for event in events {
            close_requested |= run_frame(ctx, viewer, platform, vec![event]).close_requested;
        }
        close_requested
    }

    fn opened() -> (egui::Context, PlotViewer, RecordingPlatform) {
        opened_with(config())
    }

    fn opened_with(config: ViewerConfig) -> (egui::Context, PlotViewer, RecordingPlatform) {
        let ctx = egui::Context::default();
        let mut viewer = PlotViewer::from_image(&ctx, "attack efficiency", pixels(200, 100), config);
        let mut platform = RecordingPlatform::default();
        run_frame(&ctx, &mut viewer, &mut platform, Vec::new());
        (ctx, viewer, platform)
    }

    #[test]
    fn wheel_factor_is_exponential() {
        assert_eq!(wheel_zoom_factor(0.0, 0.002), 1.0);
        let up = wheel_zoom_factor(100.0, 0.002);
        let down = wheel_zoom_factor(-100.0, 0.002);
        assert!(up > 1.0 && down < 1.0);
        assert!((up * down - 1.0).abs() < EPSILON);
    }

    #[test]
    fn opening_fits_the_frame() {
        let (_ctx, viewer, _platform) = opened();
        assert!(viewer.is_loaded());
        assert_eq!(viewer.viewport().frame_size(), Some(vec2(100.0, 50.0)));
        assert!((viewer.viewport().scale() - 0.5).abs() < EPSILON);
        assert_eq!(viewer.viewport().translate(), egui::Vec2::ZERO);
    }

    #[test]
    fn zoom_keys_then_reset() {
        let (ctx, mut viewer, mut platform) = opened();

        for _ in 0..3 {
            run_frame(&ctx, &mut viewer, &mut platform, vec![key(Key::I)]);
        }
        let response = run_frame(&ctx, &mut viewer, &mut platform, Vec::new());
        assert!((viewer.viewport().scale() - 0.864).abs() < EPSILON);
        assert!((response.zoom_percent - 86.4).abs() < 0.1);

        run_frame(&ctx, &mut viewer, &mut platform, vec![key(Key::O)]);
        assert!((viewer.viewport().scale() - 0.72).abs() < EPSILON);

        run_frame(&ctx, &mut viewer, &mut platform, vec![key(Key::R)]);
        assert!((viewer.viewport().scale() - 0.5).abs() < EPSILON);
        assert_eq!(viewer.viewport().translate(), egui::Vec2::ZERO);
    }

    #[test]
    fn close_key_requests_close() {
        let (ctx, mut viewer, mut platform) = opened();
        let response = run_frame(&ctx, &mut viewer, &mut platform, vec![key(Key::Q)]);
        assert!(response.close_requested);
    }

    #[test]
    fn escape_leaves_fullscreen_before_closing() {
        let (ctx, mut viewer, mut platform) = opened();

        run_frame(&ctx, &mut viewer, &mut platform, vec![key(Key::F)]);
        assert!(platform.fullscreen);

        let response = run_frame(&ctx, &mut viewer, &mut platform, vec![key(Key::Escape)]);
        assert!(!response.close_requested);
        assert!(!platform.fullscreen);

        let response = run_frame(&ctx, &mut viewer, &mut platform, vec![key(Key::Escape)]);
        assert!(response.close_requested);
    }

    #[test]
    fn copy_key_writes_pixels_to_clipboard() {
        let (ctx, mut viewer, mut platform) = opened();
        run_frame(&ctx, &mut viewer, &mut platform, vec![key(Key::C)]);
        assert_eq!(platform.clipboard, vec![[200, 100]]);
    }

    #[test]
    fn touch_pinch_zooms_and_releasing_returns_to_idle() {
        let (ctx, mut viewer, mut platform) = opened();

        run_frame(
            &ctx,
            &mut viewer,
            &mut platform,
            vec![
                touch(1, TouchPhase::Start, pos2(40.0, 25.0)),
                touch(2, TouchPhase::Start, pos2(60.0, 25.0)),
            ],
        );
        assert_eq!(viewer.gesture_phase(), GesturePhase::Pinching);

        run_frame(
            &ctx,
            &mut viewer,
            &mut platform,
            vec![touch(2, TouchPhase::Move, pos2(80.0, 25.0))],
        );
        assert!((viewer.viewport().scale() - 1.0).abs() < EPSILON);

        run_frame(
            &ctx,
            &mut viewer,
            &mut platform,
            vec![touch(1, TouchPhase::End, pos2(40.0, 25.0))],
        );
        assert_eq!(viewer.gesture_phase(), GesturePhase::Dragging);

        run_frame(
            &ctx,
            &mut viewer,
            &mut platform,
            vec![touch(2, TouchPhase::End, pos2(80.0, 25.0))],
        );
        assert_eq!(viewer.gesture_phase(), GesturePhase::Idle);
    }

    #[test]
    fn touches_outside_the_frame_are_ignored() {
        let (ctx, mut viewer, mut platform) = opened();
        run_frame(
            &ctx,
            &mut viewer,
            &mut platform,
            vec![touch(1, TouchPhase::Start, pos2(500.0, 500.0))],
        );
        assert_eq!(viewer.gesture_phase(), GesturePhase::Idle);
    }

    #[test]
    fn decode_failure_is_reported_not_fitted() {
        let ctx = egui::Context::default();
        let source = ImageSource::from_bytes("broken", vec![1u8, 2, 3]);
        let mut viewer = PlotViewer::open(&ctx, "broken plot", source, config());
        let mut platform = RecordingPlatform::default();

        for _ in 0..200 {
            run_frame(&ctx, &mut viewer, &mut platform, Vec::new());
            if viewer.load_error().is_some() {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(5));
        }

        assert!(viewer.load_error().is_some());
        assert!(!viewer.viewport().is_fitted());

        run_frame(&ctx, &mut viewer, &mut platform, vec![key(Key::C)]);
        assert!(platform.clipboard.is_empty());
    }

    #[test]
    fn set_config_rebinds_keys() {
        let (ctx, mut viewer, mut platform) = opened();
        let mut config = config();
        config.bindings.close = "x".to_owned();
        viewer.set_config(config);

        let response = run_frame(&ctx, &mut viewer, &mut platform, vec![key(Key::Q)]);
        assert!(!response.close_requested);
        let response = run_frame(&ctx, &mut viewer, &mut platform, vec![key(Key::X)]);
        assert!(response.close_requested);
    }

    #[test]
    fn mouse_drag_follows_the_pointer_from_where_it_was_pressed() {
        let (ctx, mut viewer, mut platform) = opened();

        let close_requested = run_frames(
            &ctx,
            &mut viewer,
            &mut platform,
            vec![
                moved(50.0, 25.0),
                primary(50.0, 25.0, true),
                moved(55.0, 25.0),
                moved(60.0, 25.0),
                moved(70.0, 25.0),
            ],
        );
        assert_eq!(viewer.gesture_phase(), GesturePhase::Dragging);
        assert!((viewer.viewport().translate() - vec2(20.0, 0.0)).length() < EPSILON);

        run_frame(&ctx, &mut viewer, &mut platform, vec![primary(70.0, 25.0, false)]);
        assert_eq!(viewer.gesture_phase(), GesturePhase::Idle);
        assert!((viewer.viewport().translate() - vec2(20.0, 0.0)).length() < EPSILON);
        assert!((viewer.viewport().scale() - 0.5).abs() < EPSILON);
        assert!(!close_requested);
    }

    #[test]
    fn mouse_drag_ends_when_the_pointer_leaves_the_frame() {
        let (ctx, mut viewer, mut platform) = opened();

        run_frames(
            &ctx,
            &mut viewer,
            &mut platform,
            vec![
                moved(50.0, 25.0),
                primary(50.0, 25.0, true),
                moved(60.0, 25.0),
            ],
        );
        assert_eq!(viewer.gesture_phase(), GesturePhase::Dragging);
        let translate = viewer.viewport().translate();

        run_frames(
            &ctx,
            &mut viewer,
            &mut platform,
            vec![moved(150.0, 25.0), moved(60.0, 40.0)],
        );
        assert_eq!(viewer.gesture_phase(), GesturePhase::Idle);
        assert_eq!(viewer.viewport().translate(), translate);

        run_frame(&ctx, &mut viewer, &mut platform, vec![primary(60.0, 40.0, false)]);
        assert_eq!(viewer.gesture_phase(), GesturePhase::Idle);
    }

    #[test]
    fn wheel_zoom_keeps_the_point_under_the_cursor() {
        let (ctx, mut viewer, mut platform) = opened();

        run_frame(&ctx, &mut viewer, &mut platform, vec![moved(80.0, 40.0)]);
        let grabbed = viewer.viewport().frame_to_image(pos2(80.0, 40.0)).unwrap();

        run_frame(
            &ctx,
            &mut viewer,
            &mut platform,
            vec![Event::MouseWheel {
                unit: MouseWheelUnit::Point,
                delta: vec2(0.0, 100.0),
                modifiers: Modifiers::NONE,
            }],
        );

        let expected_scale = 0.5 * wheel_zoom_factor(100.0, viewer.config().wheel_zoom_speed);
        assert!((viewer.viewport().scale() - expected_scale).abs() < EPSILON);
        let back = viewer.viewport().image_to_frame(grabbed).unwrap();
        assert!((back - pos2(80.0, 40.0)).length() < EPSILON);
    }

    #[test]
    fn double_click_resets_the_view() {
        let (ctx, mut viewer, mut platform) = opened();

        run_frame(&ctx, &mut viewer, &mut platform, vec![key(Key::I)]);
        run_frame(&ctx, &mut viewer, &mut platform, vec![key(Key::I)]);
        assert!((viewer.viewport().scale() - 0.72).abs() < EPSILON);

        let mut events = click(50.0, 25.0);
        events.extend([primary(50.0, 25.0, true), primary(50.0, 25.0, false)]);
        let close_requested = run_frames(&ctx, &mut viewer, &mut platform, events);

        assert!(!close_requested);
        assert!((viewer.viewport().scale() - 0.5).abs() < EPSILON);
        assert_eq!(viewer.viewport().translate(), egui::Vec2::ZERO);
    }

    #[test]
    fn backdrop_click_requests_close() {
        let (ctx, mut viewer, mut platform) = opened_with(ViewerConfig {
            padding_factor: 0.5,
            ..config()
        });

        // The image covers x 25..75 and y 12.5..37.5 of the 100x50 frame.
        assert!(run_frames(&ctx, &mut viewer, &mut platform, click(5.0, 5.0)));
    }

    #[test]
    fn click_on_the_image_does_not_close() {
        let (ctx, mut viewer, mut platform) = opened_with(ViewerConfig {
            padding_factor: 0.5,
            ..config()
        });

        assert!(!run_frames(&ctx, &mut viewer, &mut platform, click(50.0, 25.0)));
    }

    #[test]
    fn click_while_loading_does_not_close() {
        let ctx = egui::Context::default();
        let (_sender, loader) = ImageLoader::pending();
        let mut viewer = PlotViewer::with_state(
            "pending plot".to_owned(),
            ImageSource::from_bytes("pending plot", vec![1u8]),
            config(),
            ImageState::Loading(loader),
        );
        let mut platform = RecordingPlatform::default();
        run_frame(&ctx, &mut viewer, &mut platform, Vec::new());

        assert!(!run_frames(&ctx, &mut viewer, &mut platform, click(5.0, 5.0)));
        assert!(!viewer.is_loaded());
        assert!(viewer.load_error().is_none());
    }
}
