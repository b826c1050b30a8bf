#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use plot_viewer::app::{self, App};

fn main() {
    if let Err(err) = viewer_utils::setup_loggers("plot-viewer.log") {
        eprintln!("setup loggers fails: {err:#}");
    }

    let request = match app::open_request_from_args(std::env::args().skip(1)) {
        Ok(request) => request,
        Err(err) => {
            log::error!("read command line fails: {err:#}");
            None
        }
    };

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_decorations(false)
            .with_inner_size([960.0, 640.0])
            .with_min_inner_size([480.0, 360.0])
            .with_transparent(true),
        ..Default::default()
    };

    if let Err(err) = eframe::run_native(
        "plot-viewer",
        options,
        Box::new(|cc| Ok(Box::new(App::new(cc, request)))),
    ) {
        log::error!("run native fails: {err}");
    }
}
