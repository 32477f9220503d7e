//! Display sinks
//!
//! A frame either becomes a timestamped PNG on disk or is pushed to a Linux
//! framebuffer device as little-endian RGB565.

use crate::config::{DisplayConfig, SinkKind};
use crate::error::{OctodashError, Result};
use crate::logging::{StructuredLogger, get_logger};
use crate::render::Frame;
use embedded_graphics::pixelcolor::{Rgb565, Rgb888};
use embedded_graphics::prelude::IntoStorage;
use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Destination for rendered frames
pub trait DisplaySink {
    fn name(&self) -> &'static str;

    fn show(&mut self, frame: &Frame) -> Result<()>;
}

/// Build the configured sink
pub fn build_sink(config: &DisplayConfig) -> Result<Box<dyn DisplaySink>> {
    match config.sink {
        SinkKind::File => Ok(Box::new(FileSink::new(&config.output_dir)?)),
        SinkKind::Panel => Ok(Box::new(PanelSink::open(
            &config.panel_device,
            config.width,
            config.height,
        )?)),
    }
}

/// Writes `dashboard-YYYYmmdd-HHMMSS.png` files into a directory
pub struct FileSink {
    dir: PathBuf,
    last_path: Option<PathBuf>,
    logger: StructuredLogger,
}

impl FileSink {
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)
            .map_err(|e| OctodashError::display(format!("{}: {}", dir.display(), e)))?;
        Ok(Self {
            dir,
            last_path: None,
            logger: get_logger("sink"),
        })
    }

    pub fn last_path(&self) -> Option<&Path> {
        self.last_path.as_deref()
    }

    /// Next free file name for a frame; a numeric suffix avoids overwriting
    fn path_for(&self, frame: &Frame) -> PathBuf {
        let stem = format!("dashboard-{}", frame.rendered_at.format("%Y%m%d-%H%M%S"));
        let mut path = self.dir.join(format!("{}.png", stem));
        let mut n = 1;
        while path.exists() {
            path = self.dir.join(format!("{}-{}.png", stem, n));
            n += 1;
        }
        path
    }
}

impl DisplaySink for FileSink {
    fn name(&self) -> &'static str {
        "file"
    }

    fn show(&mut self, frame: &Frame) -> Result<()> {
        let path = self.path_for(frame);
        frame
            .image
            .save_with_format(&path, image::ImageFormat::Png)?;
        self.logger.info(&format!("Saved {}", path.display()));
        self.last_path = Some(path);
        Ok(())
    }
}

/// Writes frames to a framebuffer device
pub struct PanelSink {
    device: File,
    path: PathBuf,
    width: u32,
    height: u32,
    logger: StructuredLogger,
}

impl PanelSink {
    pub fn open<P: AsRef<Path>>(path: P, width: u32, height: u32) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let device = OpenOptions::new()
            .write(true)
            .open(&path)
            .map_err(|e| OctodashError::display(format!("{}: {}", path.display(), e)))?;
        Ok(Self {
            device,
            path,
            width,
            height,
            logger: get_logger("sink"),
        })
    }
}

impl DisplaySink for PanelSink {
    fn name(&self) -> &'static str {
        "panel"
    }

    fn show(&mut self, frame: &Frame) -> Result<()> {
        if frame.image.dimensions() != (self.width, self.height) {
            return Err(OctodashError::display(format!(
                "Frame is {}x{}, panel expects {}x{}",
                frame.image.width(),
                frame.image.height(),
                self.width,
                self.height
            )));
        }
        let bytes = to_rgb565_le(frame);
        self.device.seek(SeekFrom::Start(0))?;
        self.device.write_all(&bytes)?;
        self.device.flush()?;
        self.logger
            .debug(&format!("Wrote {} bytes to {}", bytes.len(), self.path.display()));
        Ok(())
    }
}

/// Row-major RGB565, two bytes per pixel, little-endian
pub fn to_rgb565_le(frame: &Frame) -> Vec<u8> {
    frame
        .image
        .pixels()
        .flat_map(|p| {
            let color = Rgb565::from(Rgb888::new(p[0], p[1], p[2]));
            color.into_storage().to_le_bytes()
        })
        .collect()
}
