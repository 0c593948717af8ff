//! The frame pipeline: repaint, render, flip.
//!
//! `Presenter` owns the demo state and drives one frame at a time against a
//! `RenderToolkit` and a `DisplayBackend`. The per-frame protocol follows a
//! fixed order: wait for the previous flip, clear the depth buffer, repaint
//! the stale regions of the incoming back buffer, stamp the option
//! checkmarks, transform and submit the object, draw the frame-rate digits,
//! then flip and swap.

use std::time::{Duration, Instant};

use crate::backend::DisplayBackend;
use crate::dirty::{BackgroundLayout, DirtyTracker, BG_COLOR};
use crate::error::{InitError, PresentError};
use crate::geometry::{Mesh, MeshVariant};
use crate::hud::{checkmark_dests, digit_blits, FrameRateCounter};
use crate::rect::Rect;
use crate::state::{FeatureFlags, KeyCommand};
use crate::surface::{PixelFormat, SurfaceError, SurfaceId, SurfaceLocation};
use crate::toolkit::{AlphaMode, FilterMode, RenderMode, RenderToolkit};
use crate::transform::{
    transform_mesh, Camera, Rotation, Viewport, OBJECT_Z_STEP, ROTATE_STEP,
};

/// Fog color applied while fogging is on (white).
pub const FOG_COLOR: u32 = 0x00FF_FFFF;
/// Transparent-blit color key shared by the digit and checkmark bitmaps.
pub const CHROMA_KEY: u32 = 0;

/// Give up waiting for flip completion after this long. A stuck backend
/// would otherwise spin the poll loop forever.
const FLIP_TIMEOUT: Duration = Duration::from_secs(2);

const BUFFER_COUNT: usize = 2;

/// Decoded image handed over by the frontend.
pub struct Bitmap {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u32>,
    /// Mipmap levels carried by the texture file; 0 for plain images.
    pub mip_levels: u32,
}

/// The four bitmaps the demo needs.
pub struct DemoAssets {
    pub background: Bitmap,
    pub digits: Bitmap,
    pub checkmark: Bitmap,
    pub texture: Bitmap,
}

pub struct Presenter<T: RenderToolkit, B: DisplayBackend> {
    toolkit: T,
    backend: B,
    viewport: Viewport,
    layout: BackgroundLayout,
    dirty: DirtyTracker,
    fps: FrameRateCounter,
    flags: FeatureFlags,
    camera: Camera,
    rotation: Rotation,
    mesh: Mesh,

    display: [SurfaceId; BUFFER_COUNT],
    back: usize,
    image: SurfaceId,
    digits: SurfaceId,
    checkmark: SurfaceId,
    texture: SurfaceId,
    digit_width: i32,
    digit_height: i32,
}

impl<T: RenderToolkit, B: DisplayBackend> Presenter<T, B> {
    pub fn new(
        mut toolkit: T,
        backend: B,
        assets: DemoAssets,
        variant: MeshVariant,
        width: u32,
        height: u32,
        format: PixelFormat,
    ) -> Result<Self, InitError> {
        let alloc_err = |what: &'static str, w: u32, h: u32| {
            move |source: SurfaceError| InitError::SurfaceAlloc {
                what,
                width: w,
                height: h,
                source,
            }
        };
        let upload_err = |name: &'static str| {
            move |e: SurfaceError| InitError::AssetLoad {
                name,
                reason: e.to_string(),
            }
        };

        let display = [
            toolkit
                .create_surface(width, height, format, SurfaceLocation::Video)
                .map_err(alloc_err("display", width, height))?,
            toolkit
                .create_surface(width, height, format, SurfaceLocation::Video)
                .map_err(alloc_err("display", width, height))?,
        ];

        let bg = &assets.background;
        let image = toolkit
            .create_surface(bg.width, bg.height, format, SurfaceLocation::System)
            .map_err(alloc_err("background", bg.width, bg.height))?;
        toolkit
            .upload(image, &bg.pixels)
            .map_err(upload_err("background"))?;

        let digits = create_with_fallback(&mut toolkit, &assets.digits, format, "digits")?;
        let checkmark = create_with_fallback(&mut toolkit, &assets.checkmark, format, "checkmark")?;

        let tex = &assets.texture;
        let texture = toolkit
            .create_surface(tex.width, tex.height, format, SurfaceLocation::Video)
            .map_err(alloc_err("texture", tex.width, tex.height))?;
        toolkit
            .upload(texture, &tex.pixels)
            .map_err(upload_err("texture"))?;
        toolkit.set_mip_levels(texture, tex.mip_levels);

        let mut mesh = Mesh::build(variant);
        mesh.assign_uvs(tex.width, tex.height, tex.mip_levels > 0)?;

        let digit_width = (assets.digits.width / 10) as i32;
        let digit_height = assets.digits.height as i32;
        let check_width = assets.checkmark.width as i32;
        let layout = BackgroundLayout::new(
            width,
            height,
            bg.width,
            bg.height,
            digit_width,
            digit_height,
            check_width,
        );
        let dirty = DirtyTracker::new(BUFFER_COUNT, &layout);

        log::info!(
            "presenter up: {}x{} {:?}, {:?} mesh ({} triangles), texture {}x{} ({} mip levels)",
            width,
            height,
            format,
            variant,
            mesh.triangle_count(),
            tex.width,
            tex.height,
            tex.mip_levels,
        );

        let mut p = Presenter {
            toolkit,
            backend,
            viewport: Viewport::new(width, height),
            layout,
            dirty,
            fps: FrameRateCounter::new(Instant::now()),
            flags: FeatureFlags::default(),
            camera: Camera::default(),
            rotation: Rotation::default(),
            mesh,
            display,
            back: 0,
            image,
            digits,
            checkmark,
            texture,
            digit_width,
            digit_height,
        };
        p.fill_background();
        Ok(p)
    }

    /// Draw and present one frame into the current back buffer.
    pub fn render_frame(&mut self, now: Instant) -> Result<(), PresentError> {
        self.wait_flip()?;

        self.toolkit.clear_depth(&self.layout.screen);
        self.repaint_background();

        let back = self.display[self.back];
        self.toolkit.set_draw_target(back);
        self.toolkit.set_depth_test(true);

        let object = transform_mesh(
            &mut self.mesh,
            self.rotation,
            &self.camera,
            &self.viewport,
            self.flags.fogging,
        );
        self.dirty.record(self.back, &object, &self.layout);
        self.toolkit
            .submit_triangles(&self.mesh.vertices, &self.mesh.indices, self.mesh.topology);

        self.draw_frame_rate(now);

        self.backend.present(
            self.toolkit.pixels(back),
            self.viewport.width as u32,
            self.viewport.height as u32,
        )?;
        self.back = 1 - self.back;
        Ok(())
    }

    /// Apply a key command. Returns false when the demo should exit.
    pub fn handle_command(&mut self, cmd: KeyCommand) -> bool {
        match cmd {
            KeyCommand::ToggleAlphaBlend => {
                self.flags.alpha_blend = !self.flags.alpha_blend;
                if self.flags.texture {
                    self.setup_texture();
                }
            }
            KeyCommand::ToggleBackground => {
                self.flags.background = !self.flags.background;
                self.fill_background();
            }
            KeyCommand::ToggleFogging => {
                self.flags.fogging = !self.flags.fogging;
                self.toolkit
                    .set_fog_color(self.flags.fogging.then_some(FOG_COLOR));
            }
            KeyCommand::ToggleLit => {
                self.flags.lit = !self.flags.lit;
                if self.flags.texture {
                    self.setup_texture();
                }
            }
            KeyCommand::TogglePerspective => {
                self.flags.perspective = !self.flags.perspective;
                if self.flags.texture {
                    self.setup_texture();
                }
            }
            KeyCommand::ToggleFrameRate => {
                self.flags.frame_rate = !self.flags.frame_rate;
            }
            KeyCommand::ToggleFiltering => {
                self.flags.filtering = !self.flags.filtering;
                if self.flags.texture {
                    self.setup_texture();
                }
            }
            KeyCommand::ToggleTexture => {
                self.flags.texture = !self.flags.texture;
                if self.flags.texture {
                    self.setup_texture();
                } else {
                    self.toolkit.set_alpha_mode(AlphaMode::Off);
                    self.toolkit.set_render_mode(RenderMode::Gouraud);
                }
            }
            KeyCommand::FreezeRotation => self.rotation = Rotation::default(),
            KeyCommand::RotateXDown => self.rotation.x -= ROTATE_STEP,
            KeyCommand::RotateXUp => self.rotation.x += ROTATE_STEP,
            KeyCommand::RotateYUp => self.rotation.y += ROTATE_STEP,
            KeyCommand::RotateYDown => self.rotation.y -= ROTATE_STEP,
            KeyCommand::RotateZUp => self.rotation.z += ROTATE_STEP,
            KeyCommand::RotateZDown => self.rotation.z -= ROTATE_STEP,
            KeyCommand::ObjectNearer => self.camera.object_z -= OBJECT_Z_STEP,
            KeyCommand::ObjectFarther => self.camera.object_z += OBJECT_Z_STEP,
            KeyCommand::ScreenFarther => self.camera.screen_d += ROTATE_STEP,
            KeyCommand::ScreenNearer => self.camera.screen_d -= ROTATE_STEP,
            KeyCommand::Quit => return false,
        }
        true
    }

    pub fn flags(&self) -> &FeatureFlags {
        &self.flags
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn set_camera(&mut self, camera: Camera) {
        self.camera = camera;
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn back_index(&self) -> usize {
        self.back
    }

    pub fn toolkit(&self) -> &T {
        &self.toolkit
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn layout(&self) -> &BackgroundLayout {
        &self.layout
    }

    fn wait_flip(&mut self) -> Result<(), PresentError> {
        let waited = Instant::now();
        while !self.backend.flip_done() {
            if waited.elapsed() >= FLIP_TIMEOUT {
                return Err(PresentError::FlipTimeout {
                    waited_ms: waited.elapsed().as_millis() as u64,
                });
            }
            std::hint::spin_loop();
        }
        Ok(())
    }

    /// Restore the background under everything drawn into this buffer two
    /// frames ago, or clear the whole screen when the image is off.
    fn repaint_background(&mut self) {
        let back = self.display[self.back];
        if !self.flags.background {
            self.toolkit.fill(back, &self.layout.screen, BG_COLOR);
            return;
        }

        let l = &self.layout;
        if l.fps_over_image {
            self.toolkit.blit(back, &l.fps_dest, self.image, &l.fps_src);
        } else {
            self.toolkit.fill(back, &l.fps_dest, BG_COLOR);
        }
        self.toolkit
            .blit(back, &l.left_options_dest, self.image, &l.left_options_src);
        if l.right_options_visible {
            self.toolkit
                .blit(back, &l.right_options_dest, self.image, &l.right_options_src);
        }

        let d = self.dirty.buffer(self.back).clone();
        if d.needs_fill {
            self.toolkit.fill(back, &d.fill_dest, BG_COLOR);
        }
        self.toolkit.blit(back, &d.image_dest, self.image, &d.image_src);

        let check = self.toolkit.surface(self.checkmark);
        let (cw, ch) = (check.width as i32, check.height as i32);
        let src = Rect::new(0, 0, cw, ch);
        for dest in checkmark_dests(&self.flags, &self.layout, cw, ch) {
            self.toolkit
                .blit_transparent(back, &dest, self.checkmark, &src, CHROMA_KEY);
        }
    }

    fn draw_frame_rate(&mut self, now: Instant) {
        let fps = self.fps.tick(now);
        if !self.flags.frame_rate {
            return;
        }
        let back = self.display[self.back];
        for (dst, src) in digit_blits(fps, self.digit_width, self.digit_height) {
            self.toolkit
                .blit_transparent(back, &dst, self.digits, &src, CHROMA_KEY);
        }
    }

    /// Push the full texture-dependent state block, mirroring what a
    /// texture-related toggle has to refresh.
    fn setup_texture(&mut self) {
        self.toolkit.set_active_texture(Some(self.texture));
        self.toolkit.set_alpha_mode(if self.flags.alpha_blend {
            AlphaMode::Texture
        } else {
            AlphaMode::Off
        });

        let mipmapped = self.toolkit.surface(self.texture).mip_levels > 0;
        self.toolkit
            .set_filter_mode(match (self.flags.filtering, mipmapped) {
                (true, true) => FilterMode::BilinearMip,
                (true, false) => FilterMode::Bilinear,
                (false, true) => FilterMode::PointMip,
                (false, false) => FilterMode::Point,
            });

        self.toolkit
            .set_render_mode(match (self.flags.perspective, self.flags.lit) {
                (true, true) => RenderMode::LitTexturePerspective,
                (true, false) => RenderMode::UnlitTexturePerspective,
                (false, true) => RenderMode::LitTexture,
                (false, false) => RenderMode::UnlitTexture,
            });
    }

    /// Repaint both buffers from scratch.
    fn fill_background(&mut self) {
        for i in 0..BUFFER_COUNT {
            let surf = self.display[i];
            self.toolkit.fill(surf, &self.layout.screen, BG_COLOR);
            if self.flags.background {
                self.toolkit
                    .blit(surf, &self.layout.image_dest, self.image, &self.layout.image_src);
            }
        }
    }
}

/// Create a HUD bitmap surface in video memory, falling back to system
/// memory when the store is full.
fn create_with_fallback<T: RenderToolkit>(
    toolkit: &mut T,
    bitmap: &Bitmap,
    format: PixelFormat,
    name: &'static str,
) -> Result<SurfaceId, InitError> {
    let id = match toolkit.create_surface(bitmap.width, bitmap.height, format, SurfaceLocation::Video)
    {
        Ok(id) => id,
        Err(e) => {
            log::warn!("{name} bitmap does not fit in video memory ({e}); using system memory");
            toolkit
                .create_surface(bitmap.width, bitmap.height, format, SurfaceLocation::System)
                .map_err(|source| InitError::SurfaceAlloc {
                    what: name,
                    width: bitmap.width,
                    height: bitmap.height,
                    source,
                })?
        }
    };
    toolkit
        .upload(id, &bitmap.pixels)
        .map_err(|e| InitError::AssetLoad {
            name,
            reason: e.to_string(),
        })?;
    Ok(id)
}
