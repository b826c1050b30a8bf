use anyhow::Context;
use eframe::egui::{self, ColorImage};
use std::{
    io::Read,
    path::{Path, PathBuf},
    sync::{Arc, mpsc},
};

/// Where the viewer gets its image from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImageSource {
    Path(PathBuf),
    /// Encoded raster data (PNG, JPEG, ...) handed over inline.
    Bytes { name: String, bytes: Arc<[u8]> },
}

impl ImageSource {
    /// Accepts a plain path or a `file://` URL.
    pub fn parse(src: &str) -> Self {
        let src = src.trim();
        let path = match src.strip_prefix("file://") {
            Some(rest) => {
                let rest = rest.strip_prefix("localhost").unwrap_or(rest);
                // file:///C:/plots/a.png
                match rest.as_bytes() {
                    [b'/', drive, b':', ..] if drive.is_ascii_alphabetic() => &rest[1..],
                    _ => rest,
                }
            }
            None => src,
        };
        Self::Path(PathBuf::from(path))
    }

    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self::Bytes {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn from_reader(name: impl Into<String>, mut reader: impl Read) -> anyhow::Result<Self> {
        let name = name.into();
        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .with_context(|| format!("read image bytes of '{name}'"))?;
        anyhow::ensure!(!bytes.is_empty(), "no image bytes in '{name}'");
        Ok(Self::from_bytes(name, bytes))
    }

    /// Short human readable name, used as the default title.
    pub fn label(&self) -> String {
        match self {
            ImageSource::Path(path) => path
                .file_name()
                .unwrap_or(path.as_os_str())
                .to_string_lossy()
                .into_owned(),
            ImageSource::Bytes { name, .. } => name.clone(),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            ImageSource::Path(path) => Some(path),
            ImageSource::Bytes { .. } => None,
        }
    }

    pub fn decode(&self) -> anyhow::Result<ColorImage> {
        let img = match self {
            ImageSource::Path(path) => {
                let content = std::fs::read(path)
                    .with_context(|| format!("read image '{}'", path.display()))?;
                image::load_from_memory(&content)
            }
            ImageSource::Bytes { bytes, .. } => image::load_from_memory(bytes),
        }
        .with_context(|| format!("decode image '{}'", self.label()))?;

        let size = [img.width() as _, img.height() as _];
        anyhow::ensure!(size[0] > 0 && size[1] > 0, "image '{}' is empty", self.label());

        let image_buffer = img.to_rgba8();
        let pixels = image_buffer.as_flat_samples();
        Ok(ColorImage::from_rgba_unmultiplied(size, pixels.as_slice()))
    }
}

pub type LoadResult = Result<ColorImage, String>;

/// Decodes one image off the UI thread.
pub struct ImageLoader {
    receiver: mpsc::Receiver<LoadResult>,
}

impl ImageLoader {
    pub fn spawn(ctx: &egui::Context, source: ImageSource) -> Self {
        let (sender, receiver) = mpsc::channel();
        let ctx = ctx.clone();

        std::thread::spawn(move || {
            let result = source.decode().map_err(|err| {
                log::error!("load image fails: {err:#}");
                format!("{err:#}")
            });
            if sender.send(result).is_err() {
                log::debug!("viewer closed before '{}' finished loading", source.label());
            }
            ctx.request_repaint();
        });

        Self { receiver }
    }

    /// A loader that stays pending until the returned sender delivers a result.
    #[cfg(test)]
    pub(crate) fn pending() -> (mpsc::Sender<LoadResult>, Self) {
        let (sender, receiver) = mpsc::channel();
        (sender, Self { receiver })
    }

    /// `Some` once, when decoding finished.
    pub fn poll(&self) -> Option<LoadResult> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(mpsc::TryRecvError::Empty) => None,
            Err(mpsc::TryRecvError::Disconnected) => {
                Some(Err("image loader stopped unexpectedly".to_owned()))
            }
        }
    }
}
