//! The host's two-color palette and its optional image source.
//!
//! Every simulation colors its sprites from the same two base colors, read
//! from the host's `u_colorA` / `u_colorB` parameters. An era may instead
//! name a swatch image; the first and last pixel of its top row become the
//! two colors.
//!
//! Loading never fails the caller. [`Palette::load_or_default`] logs a
//! warning and returns [`Palette::FALLBACK`] when the image is missing or
//! unreadable.
//!
//! # Supported Formats
//!
//! - PNG
//! - JPEG

use crate::error::PaletteError;
use crate::visuals::hex;
use glam::Vec3;
use std::path::Path;

/// Primary and secondary base colors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub primary: Vec3,
    pub secondary: Vec3,
}

impl Palette {
    /// Indigo and orange, used when no palette source is usable.
    pub const FALLBACK: Palette = Palette {
        primary: Vec3::new(24.0 / 255.0, 0.0, 173.0 / 255.0),
        secondary: Vec3::new(1.0, 117.0 / 255.0, 31.0 / 255.0),
    };

    pub fn new(primary: Vec3, secondary: Vec3) -> Self {
        Self { primary, secondary }
    }

    /// Build a palette from packed `0xRRGGBB` values.
    pub fn from_hex(primary: u32, secondary: u32) -> Self {
        Self::new(hex(primary), hex(secondary))
    }

    /// Palette with the two colors exchanged.
    pub fn swapped(&self) -> Self {
        Self::new(self.secondary, self.primary)
    }

    /// Read a swatch image from disk.
    pub fn from_image<P: AsRef<Path>>(path: P) -> Result<Self, PaletteError> {
        let bytes = std::fs::read(path.as_ref())?;
        Self::from_image_bytes(&bytes)
    }

    /// Decode a swatch image from memory.
    pub fn from_image_bytes(bytes: &[u8]) -> Result<Self, PaletteError> {
        let img = image::load_from_memory(bytes)?.into_rgb8();
        let (width, height) = img.dimensions();
        if width == 0 || height == 0 {
            return Err(PaletteError::Empty);
        }
        let to_color = |x: u32| {
            let p = img.get_pixel(x, 0);
            Vec3::new(
                p[0] as f32 / 255.0,
                p[1] as f32 / 255.0,
                p[2] as f32 / 255.0,
            )
        };
        Ok(Self::new(to_color(0), to_color(width - 1)))
    }

    /// Load a swatch image, falling back to [`Palette::FALLBACK`] on any error.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match Self::from_image(path) {
            Ok(palette) => {
                tracing::debug!(path = %path.display(), "loaded palette swatch");
                palette
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "palette unavailable, using fallback");
                Self::FALLBACK
            }
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::FALLBACK
    }
}
