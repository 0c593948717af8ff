//! Color operations for the software raster and blit paths.
//!
//! All pixels are ARGB8888 (0xAARRGGBB). The display modes the demo can be
//! asked for (15/16/24 bpp) only affect mode reporting; in-memory surfaces
//! are always 32-bit.

/// ARGB8888 color helpers.
pub struct ColorOps;

impl ColorOps {
    /// Extract the alpha channel.
    #[inline]
    pub fn alpha(color: u32) -> u8 {
        ((color >> 24) & 0xFF) as u8
    }

    /// Extract the red channel.
    #[inline]
    pub fn red(color: u32) -> u8 {
        ((color >> 16) & 0xFF) as u8
    }

    /// Extract the green channel.
    #[inline]
    pub fn green(color: u32) -> u8 {
        ((color >> 8) & 0xFF) as u8
    }

    /// Extract the blue channel.
    #[inline]
    pub fn blue(color: u32) -> u8 {
        (color & 0xFF) as u8
    }

    /// Construct a color from all four components.
    #[inline]
    pub fn from_argb(a: u8, r: u8, g: u8, b: u8) -> u32 {
        ((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | (b as u32)
    }

    /// Construct an opaque color.
    #[inline]
    pub fn from_rgb(r: u8, g: u8, b: u8) -> u32 {
        0xFF00_0000 | ((r as u32) << 16) | ((g as u32) << 8) | (b as u32)
    }

    /// Linear interpolation between two colors, all four channels.
    #[inline]
    pub fn lerp(c0: u32, c1: u32, t: f32) -> u32 {
        let a0 = ((c0 >> 24) & 0xFF) as f32;
        let r0 = ((c0 >> 16) & 0xFF) as f32;
        let g0 = ((c0 >> 8) & 0xFF) as f32;
        let b0 = (c0 & 0xFF) as f32;

        let a1 = ((c1 >> 24) & 0xFF) as f32;
        let r1 = ((c1 >> 16) & 0xFF) as f32;
        let g1 = ((c1 >> 8) & 0xFF) as f32;
        let b1 = (c1 & 0xFF) as f32;

        let a = (a0 + (a1 - a0) * t).round() as u32;
        let r = (r0 + (r1 - r0) * t).round() as u32;
        let g = (g0 + (g1 - g0) * t).round() as u32;
        let b = (b0 + (b1 - b0) * t).round() as u32;

        (a << 24) | (r << 16) | (g << 8) | b
    }

    /// Per-channel multiply of a texel by a lighting color (alpha from the
    /// texel). This is the "lit texture" modulate blend.
    #[inline]
    pub fn modulate(texel: u32, light: u32) -> u32 {
        let a = (texel >> 24) & 0xFF;
        let r = (((texel >> 16) & 0xFF) * ((light >> 16) & 0xFF)) / 255;
        let g = (((texel >> 8) & 0xFF) * ((light >> 8) & 0xFF)) / 255;
        let b = ((texel & 0xFF) * (light & 0xFF)) / 255;
        (a << 24) | (r << 16) | (g << 8) | b
    }

    /// Blend `src` over `dst` with the given 8-bit alpha (255 = src only).
    #[inline]
    pub fn blend_over(src: u32, dst: u32, alpha: u8) -> u32 {
        Self::lerp(dst, src, alpha as f32 / 255.0)
    }
}
