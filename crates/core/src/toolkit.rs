//! The rendering-toolkit API surface.
//!
//! `RenderToolkit` models the vendor 3D toolkit the demo drives: surface
//! management, blits and fills, render-state configuration, and triangle
//! batch submission. The presenter is written against the trait so tests
//! can substitute a recording implementation; `SoftwareToolkit` is the real
//! one, rasterizing on the CPU into the shared video-memory store.

use crate::geometry::{Topology, Vertex};
use crate::raster::{self, RasterConfig, RasterTarget, TextureView};
use crate::rect::Rect;
use crate::surface::{Backing, PixelFormat, Surface, SurfaceError, SurfaceId, SurfaceLocation, VideoMemory};
use crate::zbuffer::DepthBuffer;

/// Triangle shading mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Color-interpolated, untextured.
    Gouraud,
    UnlitTexture,
    LitTexture,
    UnlitTexturePerspective,
    LitTexturePerspective,
}

/// Texture sampling filter. The mip variants select from mipmapped
/// textures; sampling itself behaves as the corresponding single-level
/// filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    Point,
    Bilinear,
    PointMip,
    BilinearMip,
}

impl FilterMode {
    pub fn is_bilinear(self) -> bool {
        matches!(self, FilterMode::Bilinear | FilterMode::BilinearMip)
    }
}

/// Framebuffer alpha blending source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlphaMode {
    Off,
    /// Blend using the texel alpha channel.
    Texture,
}

/// The toolkit function list the frame pipeline consumes.
///
/// Fills and blits clip to surface bounds and silently do nothing when the
/// clipped region is empty, matching the forgiving vendor-call semantics.
pub trait RenderToolkit {
    fn create_surface(
        &mut self,
        width: u32,
        height: u32,
        format: PixelFormat,
        location: SurfaceLocation,
    ) -> Result<SurfaceId, SurfaceError>;

    /// Replace a surface's pixel content. The buffer length must match.
    fn upload(&mut self, id: SurfaceId, pixels: &[u32]) -> Result<(), SurfaceError>;

    /// Record the mipmap level count a texture file carried.
    fn set_mip_levels(&mut self, id: SurfaceId, levels: u32);

    fn surface(&self, id: SurfaceId) -> &Surface;

    /// Read access to a surface's pixels (presentation and tests).
    fn pixels(&self, id: SurfaceId) -> &[u32];

    fn fill(&mut self, dst: SurfaceId, rect: &Rect, color: u32);

    fn blit(&mut self, dst: SurfaceId, dst_rect: &Rect, src: SurfaceId, src_rect: &Rect);

    /// Blit skipping source pixels whose RGB equals the color key.
    fn blit_transparent(
        &mut self,
        dst: SurfaceId,
        dst_rect: &Rect,
        src: SurfaceId,
        src_rect: &Rect,
        key: u32,
    );

    /// Reset a depth-buffer region to the far sentinel.
    fn clear_depth(&mut self, rect: &Rect);

    fn set_draw_target(&mut self, id: SurfaceId);
    fn set_depth_test(&mut self, enabled: bool);
    fn set_render_mode(&mut self, mode: RenderMode);
    fn set_filter_mode(&mut self, mode: FilterMode);
    fn set_alpha_mode(&mut self, mode: AlphaMode);
    /// `None` disables fogging.
    fn set_fog_color(&mut self, color: Option<u32>);
    fn set_active_texture(&mut self, id: Option<SurfaceId>);

    /// Assemble and rasterize a triangle batch from transformed vertices.
    fn submit_triangles(&mut self, vertices: &[Vertex], indices: &[u16], topology: Topology);
}

/// CPU implementation over the shared video-memory store.
pub struct SoftwareToolkit {
    video: VideoMemory,
    surfaces: Vec<Surface>,
    depth: DepthBuffer,
    draw_target: Option<SurfaceId>,
    render_mode: RenderMode,
    filter: FilterMode,
    alpha: AlphaMode,
    fog_color: Option<u32>,
    texture: Option<SurfaceId>,
}

impl SoftwareToolkit {
    /// `video_capacity` is in pixels; the depth buffer always covers the
    /// full screen.
    pub fn new(screen_width: u32, screen_height: u32, video_capacity: usize) -> Self {
        SoftwareToolkit {
            video: VideoMemory::new(video_capacity),
            surfaces: Vec::new(),
            depth: DepthBuffer::new(screen_width, screen_height),
            draw_target: None,
            render_mode: RenderMode::Gouraud,
            filter: FilterMode::Point,
            alpha: AlphaMode::Off,
            fog_color: None,
            texture: None,
        }
    }

    pub fn render_mode(&self) -> RenderMode {
        self.render_mode
    }

    pub fn alpha_mode(&self) -> AlphaMode {
        self.alpha
    }

    fn surface_pixels(&self, id: SurfaceId) -> &[u32] {
        let s = &self.surfaces[id.0];
        match &s.backing {
            Backing::Video { offset } => &self.video.pixels()[*offset..*offset + s.pixel_count()],
            Backing::System(v) => v,
        }
    }

    /// Clip a blit so both rectangles stay in bounds, preserving the
    /// source/destination correspondence. Returns (dst_left, dst_top,
    /// src_left, src_top, width, height) or None when nothing remains.
    fn clip_blit(
        dst: (u32, u32),
        dst_rect: &Rect,
        src: (u32, u32),
        src_rect: &Rect,
    ) -> Option<(i32, i32, i32, i32, i32, i32)> {
        let mut dl = dst_rect.left;
        let mut dt = dst_rect.top;
        let mut sl = src_rect.left;
        let mut st = src_rect.top;
        let mut w = dst_rect.width().min(src_rect.width());
        let mut h = dst_rect.height().min(src_rect.height());

        if dl < 0 {
            sl -= dl;
            w += dl;
            dl = 0;
        }
        if dt < 0 {
            st -= dt;
            h += dt;
            dt = 0;
        }
        if sl < 0 {
            dl -= sl;
            w += sl;
            sl = 0;
        }
        if st < 0 {
            dt -= st;
            h += st;
            st = 0;
        }
        w = w.min(dst.0 as i32 - dl).min(src.0 as i32 - sl);
        h = h.min(dst.1 as i32 - dt).min(src.1 as i32 - st);
        if w <= 0 || h <= 0 {
            return None;
        }
        Some((dl, dt, sl, st, w, h))
    }

    fn blit_impl(
        &mut self,
        dst: SurfaceId,
        dst_rect: &Rect,
        src: SurfaceId,
        src_rect: &Rect,
        key: Option<u32>,
    ) {
        let (dw, dh) = {
            let s = &self.surfaces[dst.0];
            (s.width, s.height)
        };
        let (sw, sh) = {
            let s = &self.surfaces[src.0];
            (s.width, s.height)
        };
        let Some((dl, dt, sl, st, w, h)) = Self::clip_blit((dw, dh), dst_rect, (sw, sh), src_rect)
        else {
            return;
        };

        // two-phase copy avoids aliased borrows of the shared store
        let mut scratch = vec![0u32; (w * h) as usize];
        {
            let src_pixels = self.surface_pixels(src);
            for row in 0..h {
                let from = ((st + row) * sw as i32 + sl) as usize;
                let to = (row * w) as usize;
                scratch[to..to + w as usize].copy_from_slice(&src_pixels[from..from + w as usize]);
            }
        }

        let dst_pixels = self.surface_pixels_mut(dst);
        for row in 0..h {
            let to = ((dt + row) * dw as i32 + dl) as usize;
            let from = (row * w) as usize;
            match key {
                None => {
                    dst_pixels[to..to + w as usize]
                        .copy_from_slice(&scratch[from..from + w as usize]);
                }
                Some(key) => {
                    for col in 0..w as usize {
                        let p = scratch[from + col];
                        if p & 0x00FF_FFFF != key & 0x00FF_FFFF {
                            dst_pixels[to + col] = p;
                        }
                    }
                }
            }
        }
    }

    fn surface_pixels_mut(&mut self, id: SurfaceId) -> &mut [u32] {
        let s = &mut self.surfaces[id.0];
        match &mut s.backing {
            Backing::Video { offset } => {
                let start = *offset;
                let len = (s.width * s.height) as usize;
                &mut self.video.pixels_mut()[start..start + len]
            }
            Backing::System(v) => v,
        }
    }
}

impl RenderToolkit for SoftwareToolkit {
    fn create_surface(
        &mut self,
        width: u32,
        height: u32,
        format: PixelFormat,
        location: SurfaceLocation,
    ) -> Result<SurfaceId, SurfaceError> {
        let backing = match location {
            SurfaceLocation::Video => Backing::Video {
                offset: self.video.alloc(width, height)?,
            },
            SurfaceLocation::System => Backing::System(vec![0; (width * height) as usize]),
        };
        self.surfaces.push(Surface {
            width,
            height,
            format,
            mip_levels: 0,
            backing,
        });
        Ok(SurfaceId(self.surfaces.len() - 1))
    }

    fn upload(&mut self, id: SurfaceId, pixels: &[u32]) -> Result<(), SurfaceError> {
        let expected = self.surfaces[id.0].pixel_count();
        if pixels.len() != expected {
            return Err(SurfaceError::SizeMismatch {
                got: pixels.len(),
                expected,
            });
        }
        self.surface_pixels_mut(id).copy_from_slice(pixels);
        Ok(())
    }

    fn set_mip_levels(&mut self, id: SurfaceId, levels: u32) {
        self.surfaces[id.0].mip_levels = levels;
    }

    fn surface(&self, id: SurfaceId) -> &Surface {
        &self.surfaces[id.0]
    }

    fn pixels(&self, id: SurfaceId) -> &[u32] {
        self.surface_pixels(id)
    }

    fn fill(&mut self, dst: SurfaceId, rect: &Rect, color: u32) {
        let (w, h) = {
            let s = &self.surfaces[dst.0];
            (s.width, s.height)
        };
        let r = rect.clip_to_surface(w, h);
        if r.is_empty() {
            return;
        }
        let pixels = self.surface_pixels_mut(dst);
        for y in r.top..r.bottom {
            let row = (y as u32 * w) as usize;
            pixels[row + r.left as usize..row + r.right as usize].fill(color);
        }
    }

    fn blit(&mut self, dst: SurfaceId, dst_rect: &Rect, src: SurfaceId, src_rect: &Rect) {
        self.blit_impl(dst, dst_rect, src, src_rect, None);
    }

    fn blit_transparent(
        &mut self,
        dst: SurfaceId,
        dst_rect: &Rect,
        src: SurfaceId,
        src_rect: &Rect,
        key: u32,
    ) {
        self.blit_impl(dst, dst_rect, src, src_rect, Some(key));
    }

    fn clear_depth(&mut self, rect: &Rect) {
        self.depth.clear_rect(rect);
    }

    fn set_draw_target(&mut self, id: SurfaceId) {
        self.draw_target = Some(id);
    }

    fn set_depth_test(&mut self, enabled: bool) {
        self.depth.set_enabled(enabled);
    }

    fn set_render_mode(&mut self, mode: RenderMode) {
        self.render_mode = mode;
    }

    fn set_filter_mode(&mut self, mode: FilterMode) {
        self.filter = mode;
    }

    fn set_alpha_mode(&mut self, mode: AlphaMode) {
        self.alpha = mode;
    }

    fn set_fog_color(&mut self, color: Option<u32>) {
        self.fog_color = color;
    }

    fn set_active_texture(&mut self, id: Option<SurfaceId>) {
        self.texture = id;
    }

    fn submit_triangles(&mut self, vertices: &[Vertex], indices: &[u16], topology: Topology) {
        let Some(target_id) = self.draw_target else {
            log::error!("triangle batch submitted with no draw target");
            return;
        };

        let (textured, lit, perspective) = match self.render_mode {
            RenderMode::Gouraud => (false, false, false),
            RenderMode::UnlitTexture => (true, false, false),
            RenderMode::LitTexture => (true, true, false),
            RenderMode::UnlitTexturePerspective => (true, false, true),
            RenderMode::LitTexturePerspective => (true, true, true),
        };
        let cfg = RasterConfig {
            textured,
            lit,
            perspective,
            bilinear: self.filter.is_bilinear(),
            alpha_texture: textured && self.alpha == AlphaMode::Texture,
            fog_color: self.fog_color,
        };

        let target_surf = &self.surfaces[target_id.0];
        let (t_off, t_w, t_h) = match target_surf.backing {
            Backing::Video { offset } => (offset, target_surf.width, target_surf.height),
            Backing::System(_) => {
                log::error!("draw target must be video-backed");
                return;
            }
        };
        let t_len = (t_w * t_h) as usize;
        let tex_id = if textured { self.texture } else { None };

        let SoftwareToolkit {
            video,
            surfaces,
            depth,
            ..
        } = self;
        let store = video.pixels_mut();

        let triangles = assemble(indices, topology);
        let mut draw = |target: &mut [u32], texture: Option<&TextureView>| {
            let mut raster_target = RasterTarget {
                pixels: target,
                width: t_w,
                height: t_h,
            };
            for (i0, i1, i2) in &triangles {
                raster::draw_triangle(
                    &mut raster_target,
                    depth,
                    texture,
                    &cfg,
                    &vertices[*i0 as usize],
                    &vertices[*i1 as usize],
                    &vertices[*i2 as usize],
                );
            }
        };

        match tex_id.map(|id| &surfaces[id.0]) {
            None => draw(&mut store[t_off..t_off + t_len], None),
            Some(tex_surf) => {
                let view_dims = (tex_surf.width, tex_surf.height);
                match &tex_surf.backing {
                    Backing::System(v) => {
                        let view = TextureView {
                            pixels: v,
                            width: view_dims.0,
                            height: view_dims.1,
                        };
                        draw(&mut store[t_off..t_off + t_len], Some(&view));
                    }
                    Backing::Video { offset } => {
                        let tex_len = tex_surf.pixel_count();
                        let (target, tex) =
                            split_store(store, t_off..t_off + t_len, *offset..*offset + tex_len);
                        let view = TextureView {
                            pixels: tex,
                            width: view_dims.0,
                            height: view_dims.1,
                        };
                        draw(target, Some(&view));
                    }
                }
            }
        }
    }
}

/// Expand an index list into triangles for the given topology.
fn assemble(indices: &[u16], topology: Topology) -> Vec<(u16, u16, u16)> {
    match topology {
        Topology::List => indices
            .chunks_exact(3)
            .map(|t| (t[0], t[1], t[2]))
            .collect(),
        Topology::Strip => indices
            .windows(3)
            .map(|t| (t[0], t[1], t[2]))
            .collect(),
        Topology::Fan => indices
            .windows(2)
            .skip(1)
            .map(|t| (indices[0], t[0], t[1]))
            .collect(),
    }
}

/// Split the video store into a mutable draw-target slice and a read-only
/// texture slice. The packing allocator never hands out overlapping
/// regions.
fn split_store(
    store: &mut [u32],
    target: std::ops::Range<usize>,
    texture: std::ops::Range<usize>,
) -> (&mut [u32], &[u32]) {
    if texture.end <= target.start {
        let (lo, hi) = store.split_at_mut(target.start);
        (
            &mut hi[..target.end - target.start],
            &lo[texture.start..texture.end],
        )
    } else {
        let (lo, hi) = store.split_at_mut(texture.start);
        (
            &mut lo[target.start..target.end],
            &hi[..texture.end - texture.start],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toolkit() -> SoftwareToolkit {
        SoftwareToolkit::new(64, 64, 64 * 64 * 4)
    }

    fn video_surface(tk: &mut SoftwareToolkit, w: u32, h: u32) -> SurfaceId {
        tk.create_surface(w, h, PixelFormat::Argb32, SurfaceLocation::Video)
            .unwrap()
    }

    #[test]
    fn test_fill_clips_to_surface() {
        let mut tk = toolkit();
        let s = video_surface(&mut tk, 64, 64);
        tk.fill(s, &Rect::new(-10, -10, 10, 10), 0xFF123456);
        let px = tk.pixels(s);
        assert_eq!(px[0], 0xFF123456);
        assert_eq!(px[9], 0xFF123456);
        assert_eq!(px[10], 0);
    }

    #[test]
    fn test_blit_video_to_video() {
        let mut tk = toolkit();
        let dst = video_surface(&mut tk, 64, 64);
        let src = video_surface(&mut tk, 8, 8);
        tk.fill(src, &Rect::new(0, 0, 8, 8), 0xFFAA0000);
        tk.blit(dst, &Rect::new(4, 4, 12, 12), src, &Rect::new(0, 0, 8, 8));
        let px = tk.pixels(dst);
        assert_eq!(px[4 * 64 + 4], 0xFFAA0000);
        assert_eq!(px[11 * 64 + 11], 0xFFAA0000);
        assert_eq!(px[3 * 64 + 4], 0);
    }

    #[test]
    fn test_blit_from_system_surface() {
        let mut tk = toolkit();
        let dst = video_surface(&mut tk, 64, 64);
        let src = tk
            .create_surface(4, 4, PixelFormat::Argb32, SurfaceLocation::System)
            .unwrap();
        tk.upload(src, &[0xFF00FF00; 16]).unwrap();
        tk.blit(dst, &Rect::new(0, 0, 4, 4), src, &Rect::new(0, 0, 4, 4));
        assert_eq!(tk.pixels(dst)[0], 0xFF00FF00);
    }

    #[test]
    fn test_transparent_blit_skips_keyed_pixels() {
        let mut tk = toolkit();
        let dst = video_surface(&mut tk, 64, 64);
        tk.fill(dst, &Rect::new(0, 0, 64, 64), 0xFF0000FF);
        let src = tk
            .create_surface(2, 1, PixelFormat::Argb32, SurfaceLocation::System)
            .unwrap();
        // left pixel is the key color (black), right is white
        tk.upload(src, &[0xFF000000, 0xFFFFFFFF]).unwrap();
        tk.blit_transparent(dst, &Rect::new(0, 0, 2, 1), src, &Rect::new(0, 0, 2, 1), 0);
        let px = tk.pixels(dst);
        assert_eq!(px[0], 0xFF0000FF, "keyed pixel must not be copied");
        assert_eq!(px[1], 0xFFFFFFFF);
    }

    #[test]
    fn test_blit_clips_against_both_surfaces() {
        let mut tk = toolkit();
        let dst = video_surface(&mut tk, 64, 64);
        let src = video_surface(&mut tk, 8, 8);
        tk.fill(src, &Rect::new(0, 0, 8, 8), 0xFF00FFFF);
        // destination hangs off the top-left corner
        tk.blit(dst, &Rect::new(-4, -4, 4, 4), src, &Rect::new(0, 0, 8, 8));
        let px = tk.pixels(dst);
        assert_eq!(px[0], 0xFF00FFFF);
        assert_eq!(px[3 * 64 + 3], 0xFF00FFFF);
        assert_eq!(px[4 * 64 + 4], 0);
    }

    #[test]
    fn test_submit_gouraud_batch() {
        let mut tk = toolkit();
        let fb = video_surface(&mut tk, 64, 64);
        tk.set_draw_target(fb);
        tk.set_depth_test(true);
        tk.clear_depth(&Rect::new(0, 0, 64, 64));

        let v = |sx: f32, sy: f32| Vertex {
            sx,
            sy,
            depth: 100.0,
            w: 1.0,
            a: 255,
            r: 255,
            ..Default::default()
        };
        let vertices = [v(32.0, 8.0), v(56.0, 56.0), v(8.0, 56.0)];
        tk.submit_triangles(&vertices, &[0, 1, 2], Topology::List);

        assert_eq!(tk.pixels(fb)[32 * 64 + 32], 0xFFFF0000);
    }

    #[test]
    fn test_assemble_topologies() {
        assert_eq!(
            assemble(&[0, 1, 2, 3, 4, 5], Topology::List),
            vec![(0, 1, 2), (3, 4, 5)]
        );
        assert_eq!(
            assemble(&[0, 1, 2, 3], Topology::Strip),
            vec![(0, 1, 2), (1, 2, 3)]
        );
        assert_eq!(
            assemble(&[0, 1, 2, 3], Topology::Fan),
            vec![(0, 1, 2), (0, 2, 3)]
        );
    }

    #[test]
    fn test_split_store_disjoint_ranges() {
        let mut store = vec![0u32; 100];
        store[60] = 7;
        {
            let (target, tex) = split_store(&mut store, 0..50, 60..70);
            target[0] = 1;
            assert_eq!(tex[0], 7);
        }
        {
            let (target, tex) = split_store(&mut store, 60..70, 0..50);
            target[0] = 2;
            assert_eq!(tex[0], 1);
        }
        assert_eq!(store[60], 2);
    }
}
