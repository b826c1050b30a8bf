use anyhow::Context;
use eframe::egui;
use std::path::PathBuf;

pub mod animation;
pub mod borderless;
pub mod widgets;

pub fn get_body_font_id(ui: &egui::Ui) -> egui::FontId {
    ui.style()
        .text_styles
        .get(&egui::TextStyle::Body)
        .cloned()
        .unwrap_or_else(|| egui::FontId::proportional(14.0))
}

/// Directory holding the running executable, where log and override files live.
pub fn exe_dir() -> anyhow::Result<PathBuf> {
    let exe = std::env::current_exe().context("locate current executable")?;
    exe.parent()
        .map(|dir| dir.to_path_buf())
        .with_context(|| format!("executable '{}' has no parent directory", exe.display()))
}

pub fn setup_loggers(log_filename: &str) -> anyhow::Result<()> {
    use simplelog::{Config, LevelFilter, WriteLogger};
    use std::fs::File;

    let log_path = exe_dir()?.join(log_filename);
    let log_file = File::create(&log_path)
        .with_context(|| format!("create log file '{}'", log_path.display()))?;

    #[cfg(debug_assertions)]
    {
        use simplelog::{CombinedLogger, SimpleLogger};
        CombinedLogger::init(vec![
            SimpleLogger::new(LevelFilter::Info, Config::default()),
            WriteLogger::new(LevelFilter::Warn, Config::default(), log_file),
        ])?;
    }

    #[cfg(not(debug_assertions))]
    WriteLogger::init(LevelFilter::Warn, Config::default(), log_file)?;

    Ok(())
}

/// Largest uniform scale at which `image_size` fits inside `available_size`.
#[inline]
pub fn calculate_fit_scale(available_size: egui::Vec2, image_size: egui::Vec2) -> f32 {
    let width_scale = available_size.x / image_size.x;
    let height_scale = available_size.y / image_size.y;
    width_scale.min(height_scale)
}

#[inline]
pub fn is_fullscreen(ctx: &egui::Context) -> bool {
    ctx.input(|i| i.viewport().fullscreen.unwrap_or(false))
}
