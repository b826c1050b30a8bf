use crate::{command::KeyBindings, view::ViewLimits};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Fraction of the frame the fitted image occupies.
    pub padding_factor: f32,
    pub max_scale: f32,

    /// Factor applied by one zoom-in step; zoom-out uses its inverse.
    pub zoom_step: f32,

    /// Zoom factor per scrolled point is `exp(wheel_zoom_speed * delta)`.
    pub wheel_zoom_speed: f32,

    /// Height reserved at the top of the viewer for the header.
    pub frame_inset: f32,

    pub bindings: KeyBindings,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            padding_factor: 0.9,
            max_scale: 5.0,
            zoom_step: 1.2,
            wheel_zoom_speed: 0.002,
            frame_inset: 36.0,
            bindings: KeyBindings::default(),
        }
    }
}

impl ViewerConfig {
    pub const FILE_NAME: &'static str = "plot-viewer.json";

    /// Bring every value back into a range the viewer can work with.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        let finite_or = |v: f32, d: f32| if v.is_finite() { v } else { d };

        self.padding_factor = finite_or(self.padding_factor, defaults.padding_factor);
        if self.padding_factor <= 0.0 || self.padding_factor > 1.0 {
            self.padding_factor = self.padding_factor.clamp(0.05, 1.0);
        }
        self.max_scale = finite_or(self.max_scale, defaults.max_scale).max(1.0);

        self.zoom_step = finite_or(self.zoom_step, defaults.zoom_step);
        if self.zoom_step <= 1.0 {
            self.zoom_step = defaults.zoom_step;
        }

        self.wheel_zoom_speed = finite_or(self.wheel_zoom_speed, defaults.wheel_zoom_speed).abs();
        self.frame_inset = finite_or(self.frame_inset, defaults.frame_inset).max(0.0);
        self
    }

    pub fn limits(&self) -> ViewLimits {
        ViewLimits {
            padding_factor: self.padding_factor,
            max_scale: self.max_scale,
        }
    }

    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        let config: Self = serde_json::from_str(text).context("parse viewer config")?;
        Ok(config.sanitized())
    }

    /// `Ok(None)` when there is no override file.
    pub fn load_override(path: &Path) -> anyhow::Result<Option<Self>> {
        if !path.is_file() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        let config = Self::from_json(&text)
            .with_context(|| format!("load config '{}'", path.display()))?;
        Ok(Some(config))
    }

    pub fn override_path() -> anyhow::Result<PathBuf> {
        Ok(viewer_utils::exe_dir()?.join(Self::FILE_NAME))
    }

    /// The override file next to the executable wins over `stored`.
    pub fn resolve(stored: Option<Self>) -> Self {
        let from_file = Self::override_path().and_then(|path| Self::load_override(&path));
        match from_file {
            Ok(Some(config)) => {
                log::info!("using viewer config from {}", Self::FILE_NAME);
                config
            }
            Ok(None) => stored.unwrap_or_default().sanitized(),
            Err(err) => {
                log::error!("load viewer config fails: {err:#}");
                stored.unwrap_or_default().sanitized()
            }
        }
    }
}
