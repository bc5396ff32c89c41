//! Linux framebuffer panel (fbtft ST7735 and friends).
//!
//! The kernel driver owns the SPI bus and its clock; the panel shows up as a
//! 16-bit RGB565 framebuffer at its native geometry. The fixed mounting
//! rotation is applied here, between the logical canvas and the native
//! scan-out order.

use enviro_core::{DisplayPanel, EnviroError, Result};
use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Clockwise rotation of the displayed image relative to the native panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    pub fn from_degrees(degrees: u16) -> Option<Self> {
        match degrees {
            0 => Some(Self::Deg0),
            90 => Some(Self::Deg90),
            180 => Some(Self::Deg180),
            270 => Some(Self::Deg270),
            _ => None,
        }
    }

    /// Logical `(width, height)` for a panel of native `width × height`.
    pub fn logical_size(self, width: u32, height: u32) -> (u32, u32) {
        match self {
            Self::Deg0 | Self::Deg180 => (width, height),
            Self::Deg90 | Self::Deg270 => (height, width),
        }
    }

    /// Native coordinate of logical pixel `(x, y)`.
    fn to_native(self, x: u32, y: u32, native_w: u32, native_h: u32) -> (u32, u32) {
        match self {
            Self::Deg0 => (x, y),
            Self::Deg90 => (native_w - 1 - y, x),
            Self::Deg180 => (native_w - 1 - x, native_h - 1 - y),
            Self::Deg270 => (y, native_h - 1 - x),
        }
    }
}

/// Re-order a logical frame into native scan-out order.
pub fn rotate_frame(pixels: &[u16], native_w: u32, native_h: u32, rotation: Rotation) -> Vec<u16> {
    let (logical_w, logical_h) = rotation.logical_size(native_w, native_h);
    let mut native = vec![0u16; (native_w * native_h) as usize];
    for y in 0..logical_h {
        for x in 0..logical_w {
            let (nx, ny) = rotation.to_native(x, y, native_w, native_h);
            native[(ny * native_w + nx) as usize] = pixels[(y * logical_w + x) as usize];
        }
    }
    native
}

pub struct FramebufferPanel {
    path:     PathBuf,
    device:   File,
    width:    u32,
    height:   u32,
    rotation: Rotation,
}

impl FramebufferPanel {
    /// Open the framebuffer device. Failure here is fatal for the process.
    pub fn open(path: impl AsRef<Path>, width: u32, height: u32, rotation: Rotation) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let device = OpenOptions::new().write(true).open(&path).map_err(|e| {
            EnviroError::Init(format!("cannot open framebuffer '{}': {e}", path.display()))
        })?;

        tracing::info!(
            "Panel {}x{} at {} (rotation {rotation:?})",
            width,
            height,
            path.display()
        );

        Ok(Self {
            path,
            device,
            width,
            height,
            rotation,
        })
    }
}

impl DisplayPanel for FramebufferPanel {
    fn size(&self) -> (u32, u32) {
        self.rotation.logical_size(self.width, self.height)
    }

    fn transfer(&mut self, pixels: &[u16]) -> Result<()> {
        let native = rotate_frame(pixels, self.width, self.height, self.rotation);
        let bytes: Vec<u8> = native.iter().flat_map(|p| p.to_le_bytes()).collect();

        let fail = |e: std::io::Error| {
            EnviroError::Display(format!("write to '{}': {e}", self.path.display()))
        };
        self.device.seek(SeekFrom::Start(0)).map_err(fail)?;
        self.device.write_all(&bytes).map_err(fail)?;
        self.device.flush().map_err(fail)
    }
}
