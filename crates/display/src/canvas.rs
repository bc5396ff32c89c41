use core::convert::Infallible;
use embedded_graphics::{
    pixelcolor::{
        raw::{RawData, RawU16},
        Rgb565,
    },
    prelude::*,
};

/// In-memory RGB565 frame in the panel's logical (rotated) geometry.
///
/// Drawn into with `embedded-graphics` primitives, then handed to the panel
/// as a whole via [`DisplayCanvas::pixels`].
#[derive(Debug, Clone)]
pub struct DisplayCanvas {
    width:  u32,
    height: u32,
    pixels: Vec<u16>,
}

impl DisplayCanvas {
    pub fn new(width: u32, height: u32, background: Rgb565) -> Self {
        let raw = RawU16::from(background).into_inner();
        Self {
            width,
            height,
            pixels: vec![raw; (width * height) as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGB565 words, row-major.
    pub fn pixels(&self) -> &[u16] {
        &self.pixels
    }

    /// Colour at `(x, y)`, `None` outside the canvas.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb565> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let raw = self.pixels[(y * self.width + x) as usize];
        Some(Rgb565::from(RawU16::new(raw)))
    }

    /// Number of pixels that differ from `color`.
    pub fn count_not(&self, color: Rgb565) -> usize {
        let raw = RawU16::from(color).into_inner();
        self.pixels.iter().filter(|&&p| p != raw).count()
    }
}

impl OriginDimensions for DisplayCanvas {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

impl DrawTarget for DisplayCanvas {
    type Color = Rgb565;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if point.x < 0 || point.y < 0 {
                continue;
            }
            let (x, y) = (point.x as u32, point.y as u32);
            if x < self.width && y < self.height {
                self.pixels[(y * self.width + x) as usize] = RawU16::from(color).into_inner();
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.pixels.fill(RawU16::from(color).into_inner());
        Ok(())
    }
}
