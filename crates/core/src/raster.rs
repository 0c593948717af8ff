//! Software triangle rasterizer.
//!
//! Scanline edge-walking with per-pixel attribute interpolation: depth,
//! vertex color, fog alpha, and texture coordinates (affine, or
//! perspective-correct via 1/w). This is the CPU stand-in for the vendor
//! rasterizer the demo drives; the presenter only talks to it through the
//! toolkit's render-state surface.

use crate::color::ColorOps;
use crate::geometry::Vertex;
use crate::zbuffer::DepthBuffer;

/// Mutable view of the draw surface a batch renders into.
pub struct RasterTarget<'a> {
    pub pixels: &'a mut [u32],
    pub width: u32,
    pub height: u32,
}

/// Read-only view of the active texture.
pub struct TextureView<'a> {
    pub pixels: &'a [u32],
    pub width: u32,
    pub height: u32,
}

impl TextureView<'_> {
    /// Point-sample with clamped coordinates.
    #[inline]
    fn sample_point(&self, u: f32, v: f32) -> u32 {
        let x = (u as i32).clamp(0, self.width as i32 - 1) as u32;
        let y = (v as i32).clamp(0, self.height as i32 - 1) as u32;
        self.pixels[(y * self.width + x) as usize]
    }

    /// Bilinear filter over the four neighboring texels.
    #[inline]
    fn sample_bilinear(&self, u: f32, v: f32) -> u32 {
        let u0 = u.floor();
        let v0 = v.floor();
        let fu = u - u0;
        let fv = v - v0;
        let c00 = self.sample_point(u0, v0);
        let c10 = self.sample_point(u0 + 1.0, v0);
        let c01 = self.sample_point(u0, v0 + 1.0);
        let c11 = self.sample_point(u0 + 1.0, v0 + 1.0);
        let top = ColorOps::lerp(c00, c10, fu);
        let bottom = ColorOps::lerp(c01, c11, fu);
        ColorOps::lerp(top, bottom, fv)
    }
}

/// Pixel pipeline configuration for one triangle batch, derived from the
/// toolkit render state.
#[derive(Debug, Clone, Copy)]
pub struct RasterConfig {
    pub textured: bool,
    /// Modulate texels by the interpolated vertex color.
    pub lit: bool,
    /// Perspective-correct texture interpolation (divide by w).
    pub perspective: bool,
    pub bilinear: bool,
    /// Blend the shaded pixel over the framebuffer using the texel alpha.
    pub alpha_texture: bool,
    /// Fog color to blend toward, weighted by `255 - vertex alpha`.
    /// `None` when fogging is disabled.
    pub fog_color: Option<u32>,
}

/// Interpolated attributes along an edge or span.
#[derive(Debug, Clone, Copy)]
struct Attr {
    x: f32,
    z: f32,
    inv_w: f32,
    u: f32,
    v: f32,
    r: f32,
    g: f32,
    b: f32,
    a: f32,
}

impl Attr {
    fn from_vertex(vtx: &Vertex, perspective: bool) -> Attr {
        // for perspective texturing, u/v are carried as u/w, v/w and
        // recovered per pixel; affine carries them directly (inv_w = 1)
        let inv_w = if perspective { 1.0 / vtx.w } else { 1.0 };
        Attr {
            x: vtx.sx,
            z: vtx.depth,
            inv_w,
            u: vtx.u * inv_w,
            v: vtx.v * inv_w,
            r: vtx.r as f32,
            g: vtx.g as f32,
            b: vtx.b as f32,
            a: vtx.a as f32,
        }
    }

    fn lerp(a: &Attr, b: &Attr, t: f32) -> Attr {
        Attr {
            x: a.x + (b.x - a.x) * t,
            z: a.z + (b.z - a.z) * t,
            inv_w: a.inv_w + (b.inv_w - a.inv_w) * t,
            u: a.u + (b.u - a.u) * t,
            v: a.v + (b.v - a.v) * t,
            r: a.r + (b.r - a.r) * t,
            g: a.g + (b.g - a.g) * t,
            b: a.b + (b.b - a.b) * t,
            a: a.a + (b.a - a.a) * t,
        }
    }
}

/// Shade one pixel from its interpolated attributes. Returns the color and
/// the blend alpha to apply against the framebuffer (255 = overwrite).
#[inline]
fn shade(cfg: &RasterConfig, texture: Option<&TextureView>, attr: &Attr) -> (u32, u8) {
    let vertex_color = ColorOps::from_rgb(attr.r as u8, attr.g as u8, attr.b as u8);

    let (mut color, texel_alpha) = match (cfg.textured, texture) {
        (true, Some(tex)) => {
            let (u, v) = if cfg.perspective {
                (attr.u / attr.inv_w, attr.v / attr.inv_w)
            } else {
                (attr.u, attr.v)
            };
            let texel = if cfg.bilinear {
                tex.sample_bilinear(u, v)
            } else {
                tex.sample_point(u, v)
            };
            let shaded = if cfg.lit {
                ColorOps::modulate(texel, vertex_color)
            } else {
                texel
            };
            (shaded, ColorOps::alpha(texel))
        }
        _ => (vertex_color, 255),
    };

    if let Some(fog) = cfg.fog_color {
        // vertex alpha 255 = untouched, 0 = fully fogged
        color = ColorOps::blend_over(color, fog, attr.a as u8);
    }

    let blend_alpha = if cfg.alpha_texture { texel_alpha } else { 255 };
    (color, blend_alpha)
}

/// Rasterize one triangle with depth testing.
///
/// Vertices carry transformed screen coordinates; the triangle is clipped
/// per scanline to the target bounds. Degenerate (zero-height) triangles
/// are skipped.
pub fn draw_triangle(
    target: &mut RasterTarget,
    depth: &mut DepthBuffer,
    texture: Option<&TextureView>,
    cfg: &RasterConfig,
    v0: &Vertex,
    v1: &Vertex,
    v2: &Vertex,
) {
    let mut verts = [
        (v0.sy as i32, Attr::from_vertex(v0, cfg.perspective)),
        (v1.sy as i32, Attr::from_vertex(v1, cfg.perspective)),
        (v2.sy as i32, Attr::from_vertex(v2, cfg.perspective)),
    ];
    verts.sort_by_key(|v| v.0);
    let [(y0, a0), (y1, a1), (y2, a2)] = verts;

    let total_height = y2 - y0;
    if total_height == 0 {
        return;
    }

    for y in y0..=y2 {
        if y < 0 || y >= target.height as i32 {
            continue;
        }
        let second_half = y >= y1;
        let segment_height = if second_half { y2 - y1 } else { y1 - y0 };
        if segment_height == 0 {
            continue;
        }

        let alpha = (y - y0) as f32 / total_height as f32;
        let beta = if second_half {
            (y - y1) as f32 / segment_height as f32
        } else {
            (y - y0) as f32 / segment_height as f32
        };

        let ea = Attr::lerp(&a0, &a2, alpha);
        let eb = if second_half {
            Attr::lerp(&a1, &a2, beta)
        } else {
            Attr::lerp(&a0, &a1, beta)
        };

        let (start, end) = if ea.x <= eb.x { (ea, eb) } else { (eb, ea) };
        let span_width = end.x - start.x;
        let x_start = start.x as i32;
        let x_end = end.x as i32;

        for x in x_start.max(0)..=x_end.min(target.width as i32 - 1) {
            let t = if span_width > 0.0 {
                (x as f32 - start.x) / span_width
            } else {
                0.0
            };
            let attr = Attr::lerp(&start, &end, t);
            let z = attr.z.clamp(0.0, 65535.0) as u16;
            if !depth.test_and_update(x as u32, y as u32, z) {
                continue;
            }
            let (color, blend_alpha) = shade(cfg, texture, &attr);
            let idx = (y as u32 * target.width + x as u32) as usize;
            target.pixels[idx] = if blend_alpha == 255 {
                color
            } else {
                ColorOps::blend_over(color, target.pixels[idx], blend_alpha)
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_config() -> RasterConfig {
        RasterConfig {
            textured: false,
            lit: false,
            perspective: false,
            bilinear: false,
            alpha_texture: false,
            fog_color: None,
        }
    }

    fn vertex(sx: f32, sy: f32, depth: f32, rgb: (u8, u8, u8)) -> Vertex {
        Vertex {
            sx,
            sy,
            depth,
            w: 1.0,
            a: 255,
            r: rgb.0,
            g: rgb.1,
            b: rgb.2,
            ..Default::default()
        }
    }

    fn raster_one(
        pixels: &mut [u32],
        depth: &mut DepthBuffer,
        cfg: &RasterConfig,
        tex: Option<&TextureView>,
        v: [&Vertex; 3],
    ) {
        let mut target = RasterTarget {
            pixels,
            width: 64,
            height: 64,
        };
        draw_triangle(&mut target, depth, tex, cfg, v[0], v[1], v[2]);
    }

    #[test]
    fn test_fills_triangle_interior() {
        let mut pixels = vec![0u32; 64 * 64];
        let mut depth = DepthBuffer::new(64, 64);
        let red = (255, 0, 0);
        let v0 = vertex(32.0, 8.0, 100.0, red);
        let v1 = vertex(56.0, 56.0, 100.0, red);
        let v2 = vertex(8.0, 56.0, 100.0, red);
        raster_one(&mut pixels, &mut depth, &flat_config(), None, [&v0, &v1, &v2]);

        assert_eq!(pixels[32 * 64 + 32], 0xFFFF0000);
        // outside the triangle stays untouched
        assert_eq!(pixels[10 * 64 + 2], 0);
    }

    #[test]
    fn test_depth_occlusion() {
        let mut pixels = vec![0u32; 64 * 64];
        let mut depth = DepthBuffer::new(64, 64);
        depth.set_enabled(true);

        let near = |c| vertex(32.0, 8.0, 200.0, c);
        let v0 = near((0, 255, 0));
        let v1 = vertex(56.0, 56.0, 200.0, (0, 255, 0));
        let v2 = vertex(8.0, 56.0, 200.0, (0, 255, 0));
        raster_one(&mut pixels, &mut depth, &flat_config(), None, [&v0, &v1, &v2]);

        // farther red triangle must lose everywhere it overlaps
        let f0 = vertex(32.0, 8.0, 900.0, (255, 0, 0));
        let f1 = vertex(56.0, 56.0, 900.0, (255, 0, 0));
        let f2 = vertex(8.0, 56.0, 900.0, (255, 0, 0));
        raster_one(&mut pixels, &mut depth, &flat_config(), None, [&f0, &f1, &f2]);

        assert_eq!(pixels[32 * 64 + 32], 0xFF00FF00);
    }

    #[test]
    fn test_gouraud_interpolates_between_vertex_colors() {
        let mut pixels = vec![0u32; 64 * 64];
        let mut depth = DepthBuffer::new(64, 64);
        let v0 = vertex(0.0, 10.0, 100.0, (255, 0, 0));
        let v1 = vertex(63.0, 10.0, 100.0, (0, 0, 255));
        let v2 = vertex(32.0, 60.0, 100.0, (255, 0, 0));
        raster_one(&mut pixels, &mut depth, &flat_config(), None, [&v0, &v1, &v2]);

        let mid = pixels[10 * 64 + 32];
        let r = ColorOps::red(mid);
        let b = ColorOps::blue(mid);
        assert!(r > 80 && r < 180, "red was {r}");
        assert!(b > 80 && b < 180, "blue was {b}");
    }

    #[test]
    fn test_textured_point_sampling() {
        // 2x2 texture: left column green, right column blue
        let tex_pixels = [0xFF00FF00u32, 0xFF0000FF, 0xFF00FF00, 0xFF0000FF];
        let tex = TextureView {
            pixels: &tex_pixels,
            width: 2,
            height: 2,
        };
        let cfg = RasterConfig {
            textured: true,
            ..flat_config()
        };

        let mut pixels = vec![0u32; 64 * 64];
        let mut depth = DepthBuffer::new(64, 64);
        let mut v0 = vertex(0.0, 0.0, 100.0, (255, 255, 255));
        let mut v1 = vertex(63.0, 0.0, 100.0, (255, 255, 255));
        let mut v2 = vertex(0.0, 63.0, 100.0, (255, 255, 255));
        v0.u = 0.0;
        v0.v = 0.0;
        v1.u = 1.0;
        v1.v = 0.0;
        v2.u = 0.0;
        v2.v = 1.0;
        raster_one(&mut pixels, &mut depth, &cfg, Some(&tex), [&v0, &v1, &v2]);

        assert_eq!(pixels[1 * 64 + 1], 0xFF00FF00);
    }

    #[test]
    fn test_fog_fully_fogged_vertex_takes_fog_color() {
        let cfg = RasterConfig {
            fog_color: Some(0x00FFFFFF),
            ..flat_config()
        };
        let mut pixels = vec![0u32; 64 * 64];
        let mut depth = DepthBuffer::new(64, 64);
        let mut v0 = vertex(8.0, 8.0, 100.0, (255, 0, 0));
        let mut v1 = vertex(56.0, 8.0, 100.0, (255, 0, 0));
        let mut v2 = vertex(32.0, 56.0, 100.0, (255, 0, 0));
        v0.a = 0;
        v1.a = 0;
        v2.a = 0;
        raster_one(&mut pixels, &mut depth, &cfg, None, [&v0, &v1, &v2]);

        let c = pixels[16 * 64 + 32];
        assert_eq!(ColorOps::red(c), 255);
        assert_eq!(ColorOps::green(c), 255);
        assert_eq!(ColorOps::blue(c), 255);
    }

    #[test]
    fn test_degenerate_triangle_is_skipped() {
        let mut pixels = vec![0u32; 64 * 64];
        let mut depth = DepthBuffer::new(64, 64);
        let v0 = vertex(0.0, 10.0, 100.0, (255, 0, 0));
        let v1 = vertex(30.0, 10.0, 100.0, (255, 0, 0));
        let v2 = vertex(60.0, 10.0, 100.0, (255, 0, 0));
        raster_one(&mut pixels, &mut depth, &flat_config(), None, [&v0, &v1, &v2]);
        assert!(pixels.iter().all(|&p| p == 0));
    }
}
