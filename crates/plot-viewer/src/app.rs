use crate::{
    config::ViewerConfig,
    platform::EguiPlatform,
    source::ImageSource,
    viewer::PlotViewer,
};
use anyhow::Context;
use eframe::egui::{self, Align2, Color32, FontId, Key, Sense, ViewportCommand, vec2};
use serde::{Deserialize, Serialize};
use viewer_utils::widgets::PlainButton;

const IMAGE_EXTENSIONS: [&str; 7] = ["png", "jpg", "jpeg", "gif", "bmp", "webp", "tiff"];
const TITLE_BAR_HEIGHT: f32 = 28.0;

/// What to open at startup.
#[derive(Debug, PartialEq)]
pub struct OpenRequest {
    pub source: ImageSource,
    pub title: String,
}

/// `plot-viewer [SRC] [TITLE]`, where `SRC` of `-` reads the image from stdin.
pub fn open_request_from_args(
    mut args: impl Iterator<Item = String>,
) -> anyhow::Result<Option<OpenRequest>> {
    let Some(src) = args.next() else {
        return Ok(None);
    };

    let source = if src == "-" {
        ImageSource::from_reader("stdin", std::io::stdin().lock()).context("read image from stdin")?
    } else {
        ImageSource::parse(&src)
    };

    let title = args
        .next()
        .filter(|title| !title.trim().is_empty())
        .unwrap_or_else(|| source.label());

    Ok(Some(OpenRequest { source, title }))
}

#[derive(Default, Deserialize, Serialize)]
#[serde(default)]
pub struct State {
    config: ViewerConfig,
}

pub struct App {
    state: State,
    viewer: Option<PlotViewer>,
}

impl App {
    pub fn new(cc: &eframe::CreationContext<'_>, request: Option<OpenRequest>) -> Self {
        cc.egui_ctx.style_mut(|style| style.animation_time = 0.11);

        let stored: Option<State> = cc
            .storage
            .and_then(|storage| eframe::get_value(storage, eframe::APP_KEY));
        let state = State {
            config: ViewerConfig::resolve(stored.map(|state| state.config)),
        };

        let viewer = request.map(|request| {
            PlotViewer::open(
                &cc.egui_ctx,
                request.title,
                request.source,
                state.config.clone(),
            )
        });

        Self { state, viewer }
    }

    fn open(&mut self, ctx: &egui::Context, source: ImageSource) {
        log::info!("open {source:?}");
        let title = source.label();
        self.viewer = Some(PlotViewer::open(
            ctx,
            title,
            source,
            self.state.config.clone(),
        ));
    }

    fn pick_file(&mut self, ctx: &egui::Context) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("image", &IMAGE_EXTENSIONS)
            .pick_file()
        {
            self.open(ctx, ImageSource::Path(path));
        }
    }

    fn process_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| {
            i.raw
                .dropped_files
                .first()
                .map(|file| (file.path.clone(), file.bytes.clone(), file.name.clone()))
        });

        match dropped {
            Some((Some(path), _, _)) => self.open(ctx, ImageSource::Path(path)),
            Some((None, Some(bytes), name)) => self.open(ctx, ImageSource::from_bytes(name, bytes)),
            Some((None, None, name)) => log::warn!("dropped file '{name}' has neither path nor bytes"),
            None => (),
        }
    }

    fn ui_title_bar(&self, ui: &mut egui::Ui, title_bar_rect: egui::Rect) {
        viewer_utils::borderless::title_bar(ui, title_bar_rect, |ui| {
            ui.add_space(8.0);
            let title = match &self.viewer {
                Some(viewer) => format!("plot-viewer - {}", viewer.title()),
                None => "plot-viewer".to_owned(),
            };
            ui.label(title);
        });
    }

    fn ui_landing(&mut self, ui: &mut egui::Ui, rect: egui::Rect) {
        let response = ui.interact(rect, egui::Id::new("landing"), Sense::click());
        ui.painter().text(
            rect.center() - vec2(0.0, 32.0),
            Align2::CENTER_CENTER,
            "Drop an image here",
            FontId::proportional(18.0),
            Color32::GRAY,
        );

        let button_rect = egui::Rect::from_center_size(rect.center() + vec2(0.0, 8.0), vec2(120.0, 32.0));
        let clicked = ui
            .put(
                button_rect,
                PlainButton::new(button_rect.size(), "Open...")
                    .corner_radius(egui::CornerRadius::same(6))
                    .fill(Color32::from_gray(40)),
            )
            .clicked();

        if clicked || response.double_clicked() {
            self.pick_file(ui.ctx());
        }

        if ui.input(|i| i.key_pressed(Key::Escape)) {
            ui.ctx().send_viewport_cmd(ViewportCommand::Close);
        }
    }
}

impl eframe::App for App {
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, &self.state);
    }

    fn clear_color(&self, _visuals: &egui::Visuals) -> [f32; 4] {
        egui::Rgba::TRANSPARENT.to_array()
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_dropped_files(ctx);

        viewer_utils::borderless::window_frame(ctx, Some(Color32::BLACK)).show(ctx, |ui| {
            viewer_utils::borderless::handle_resize(ui);

            let app_rect = ui.max_rect();
            let fullscreen = viewer_utils::is_fullscreen(ctx);
            let content_rect = if fullscreen {
                app_rect
            } else {
                let title_bar_rect = app_rect.with_max_y(app_rect.top() + TITLE_BAR_HEIGHT);
                self.ui_title_bar(ui, title_bar_rect);
                app_rect.with_min_y(title_bar_rect.bottom())
            };

            let mut platform = EguiPlatform::new(ctx);
            let close_requested = match &mut self.viewer {
                Some(viewer) => {
                    ui.scope_builder(egui::UiBuilder::new().max_rect(content_rect), |ui| {
                        viewer.show(ui, &mut platform)
                    })
                    .inner
                    .close_requested
                }
                None => {
                    self.ui_landing(ui, content_rect);
                    false
                }
            };

            if close_requested {
                if fullscreen {
                    ctx.send_viewport_cmd(ViewportCommand::Fullscreen(false));
                }
                ctx.send_viewport_cmd(ViewportCommand::Close);
            }
        });
    }
}
