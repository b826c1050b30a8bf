//! Pan, zoom and fullscreen viewer for rendered plot images.
//!
//! [`view::Viewport`] is the pure transform engine; [`viewer::PlotViewer`] hosts it
//! in an egui `Ui`, and [`app::App`] wraps that into a standalone window.

pub mod app;
pub mod command;
pub mod config;
pub mod gesture;
pub mod platform;
pub mod source;
pub mod view;
pub mod viewer;
