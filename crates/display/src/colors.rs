use embedded_graphics::pixelcolor::{Rgb565, Rgb888};

/// 8-bit-per-channel RGB colour as written in the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BACKGROUND: Self = Self { r: 13,  g: 13,  b: 13 };  // #0d0d0d
    pub const FOREGROUND: Self = Self { r: 217, g: 217, b: 217 }; // #d9d9d9

    /// Parse a CSS-style hex color string (`#RRGGBB`).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }

        let byte = |s: &str| -> Option<u8> { u8::from_str_radix(s, 16).ok() };

        Some(Self {
            r: byte(&hex[0..2])?,
            g: byte(&hex[2..4])?,
            b: byte(&hex[4..6])?,
        })
    }

    /// Linear blend towards `other`; `t` is clamped to `[0, 1]`.
    #[must_use]
    pub fn mix(self, other: Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let ch = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Self {
            r: ch(self.r, other.r),
            g: ch(self.g, other.g),
            b: ch(self.b, other.b),
        }
    }

    /// Convert to the panel's native pixel format.
    #[inline]
    pub fn to_rgb565(self) -> Rgb565 {
        Rgb888::new(self.r, self.g, self.b).into()
    }
}
