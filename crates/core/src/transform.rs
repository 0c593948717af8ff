//! Per-frame object transformation.
//!
//! Rotation is *incremental*: the rotation deltas are per-frame rates, and
//! the rotated result overwrites each vertex's stored object-space position,
//! so orientation accumulates across frames. Re-running the transform with
//! the same deltas does not reproduce the same pose; this feedback loop is
//! the contract, not an accident.
//!
//! The screen plane spans a fixed -0.5..+0.5 vertically and
//! -aspect/2..+aspect/2 horizontally, at distance `screen_d` from the
//! camera.

use crate::geometry::Mesh;
use crate::rect::Rect;
use serde::{Deserialize, Serialize};

/// Step applied to a rotation rate per key press.
pub const ROTATE_STEP: f32 = 0.01;
/// Step applied to the object z offset per key press.
pub const OBJECT_Z_STEP: f32 = 0.05;

/// Camera/projection parameters. Key input mutates these without bounds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Camera {
    /// Distance of the projection screen from the camera.
    pub screen_d: f32,
    /// Z translation applied to the object after rotation.
    pub object_z: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Camera {
            screen_d: 1.0,
            object_z: 5.0,
        }
    }
}

/// Per-frame rotation rates about the three axes, in radians.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rotation {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Cached screen-dimension factors for the projection.
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub half_width: f32,
    pub half_height: f32,
    pub aspect_ratio: f32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        let w = width as f32;
        let h = height as f32;
        Viewport {
            width: w,
            height: h,
            half_width: w / 2.0,
            half_height: h / 2.0,
            aspect_ratio: w / h,
        }
    }
}

/// Rotate, project and bound the mesh for one frame.
///
/// Each vertex is rotated about X, then Y, then Z (a rotation is skipped
/// entirely when its delta is exactly zero), written back as the new rest
/// pose, translated by `camera.object_z`, fogged when `fogging` is set, and
/// projected to screen pixels. Returns the screen-space bounding rectangle
/// of the transformed object, grown by one pixel on the exclusive edges and
/// clipped to the viewport.
///
/// A camera-space depth of exactly zero makes the projection divide
/// non-finite; this is reported via a log warning rather than clamped.
pub fn transform_mesh(
    mesh: &mut Mesh,
    rotation: Rotation,
    camera: &Camera,
    viewport: &Viewport,
    fogging: bool,
) -> Rect {
    let mut top = viewport.height as i32;
    let mut bottom = 0i32;
    let mut right = 0i32;
    let mut left = viewport.width as i32;

    for vtx in &mut mesh.vertices {
        let mut x = vtx.x;
        let mut y = vtx.y;
        let mut z = vtx.z;

        if rotation.x != 0.0 {
            let (sin, cos) = rotation.x.sin_cos();
            let ty = y * cos + z * sin;
            let tz = z * cos - y * sin;
            y = ty;
            z = tz;
        }
        if rotation.y != 0.0 {
            let (sin, cos) = rotation.y.sin_cos();
            let tx = x * cos - z * sin;
            let tz = x * sin + z * cos;
            x = tx;
            z = tz;
        }
        if rotation.z != 0.0 {
            let (sin, cos) = rotation.z.sin_cos();
            let tx = x * cos + y * sin;
            let ty = y * cos - x * sin;
            x = tx;
            y = ty;
        }

        // the rotated pose becomes next frame's rest pose
        vtx.x = x;
        vtx.y = y;
        vtx.z = z;

        // translate to the object's actual position
        let z = z + camera.object_z;
        vtx.w = z;

        if fogging {
            // scale depth so the alpha values span a wider range
            let fade = ((z - 2.0) * 50.0).clamp(0.0, 255.0);
            vtx.a = (255.0 - fade) as u8;
        }

        if z == 0.0 {
            log::warn!("vertex at camera-space z=0; projection is non-finite");
        }
        let proj_ratio = camera.screen_d / z;
        let x = x * proj_ratio;
        let y = y * proj_ratio;
        vtx.sx = viewport.half_width - x * viewport.width / viewport.aspect_ratio;
        vtx.sy = viewport.half_height - y * viewport.height;
        // scale up for the 16-bit depth comparison
        vtx.depth = z * 100.0;

        let xi = vtx.sx as i32;
        let yi = vtx.sy as i32;
        right = right.max(xi);
        left = left.min(xi);
        bottom = bottom.max(yi);
        top = top.min(yi);
    }

    // right/bottom edges are exclusive, so take the next higher values
    right += 1;
    bottom += 1;

    Rect::new(left, top, right, bottom)
        .clip_to_surface(viewport.width as u32, viewport.height as u32)
}
