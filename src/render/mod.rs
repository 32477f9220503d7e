//! Frame rendering
//!
//! Paints the header, price boxes and chart onto an RGB888 raster using
//! `embedded-graphics` primitives and its built-in monospace fonts.

pub mod canvas;
pub mod dashboard;
pub mod fonts;
pub mod palette;

pub use canvas::Canvas;
pub use dashboard::{DashboardRenderer, DashboardView, Frame, TITLE, format_price};
pub use fonts::FontSet;
pub use palette::Palette;
