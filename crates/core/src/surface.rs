//! Pixel surfaces and the shared video-memory backing store.
//!
//! Surfaces are either *video-backed* (a region of the shared frame-buffer
//! store, handed out by a packing bump allocator so that several images
//! share one physical allocation) or *system-backed* (an owned pixel
//! vector, used for images blitted from "system memory"). All pixel data is
//! ARGB8888 regardless of the requested display format; `PixelFormat` only
//! records the mode identity.

use thiserror::Error;

/// Requested pixel depth of a display mode or surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Rgb15,
    Rgb16,
    Rgb24,
    Argb32,
}

impl PixelFormat {
    /// Map a display mode's byte-per-pixel count to the closest format.
    pub fn from_bytes_per_pixel(bpp: u32) -> PixelFormat {
        match bpp {
            2 => PixelFormat::Rgb15,
            3 => PixelFormat::Rgb24,
            _ => PixelFormat::Argb32,
        }
    }
}

/// Handle to a surface owned by the rendering toolkit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceId(pub(crate) usize);

/// Where a new surface should be placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceLocation {
    /// Packed into the shared video-memory store.
    Video,
    /// Owned allocation outside the store.
    System,
}

#[derive(Debug, Clone)]
pub(crate) enum Backing {
    Video { offset: usize },
    System(Vec<u32>),
}

/// Surface metadata plus backing location.
#[derive(Debug, Clone)]
pub struct Surface {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    /// Mipmap level count carried by texture files; 0 for plain images.
    pub mip_levels: u32,
    pub(crate) backing: Backing,
}

impl Surface {
    pub fn pixel_count(&self) -> usize {
        (self.width * self.height) as usize
    }

    pub fn is_video_backed(&self) -> bool {
        matches!(self.backing, Backing::Video { .. })
    }
}

/// Surface allocation and access failures.
#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("video memory exhausted: requested {requested} pixels, {available} free")]
    OutOfMemory { requested: usize, available: usize },

    #[error("pixel upload size mismatch: got {got}, surface holds {expected}")]
    SizeMismatch { got: usize, expected: usize },
}

/// The shared frame-buffer backing store.
///
/// Allocation is a bump pointer: each new surface is packed immediately
/// after the previous one, and nothing is ever freed individually — the
/// whole store is released at shutdown. This mirrors the frame-buffer
/// carving the direct-memory display variant performs.
pub struct VideoMemory {
    pixels: Vec<u32>,
    used: usize,
}

impl VideoMemory {
    pub fn new(capacity_pixels: usize) -> Self {
        VideoMemory {
            pixels: vec![0; capacity_pixels],
            used: 0,
        }
    }

    /// Pack a `width x height` region into the remaining store space.
    pub fn alloc(&mut self, width: u32, height: u32) -> Result<usize, SurfaceError> {
        let requested = (width * height) as usize;
        let available = self.pixels.len() - self.used;
        if requested > available {
            return Err(SurfaceError::OutOfMemory {
                requested,
                available,
            });
        }
        let offset = self.used;
        self.used += requested;
        Ok(offset)
    }

    pub fn used(&self) -> usize {
        self.used
    }

    pub fn capacity(&self) -> usize {
        self.pixels.len()
    }

    pub(crate) fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    pub(crate) fn pixels_mut(&mut self) -> &mut [u32] {
        &mut self.pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alloc_packs_sequentially() {
        let mut vm = VideoMemory::new(1000);
        let a = vm.alloc(10, 10).unwrap();
        let b = vm.alloc(20, 10).unwrap();
        assert_eq!(a, 0);
        assert_eq!(b, 100);
        assert_eq!(vm.used(), 300);
    }

    #[test]
    fn test_alloc_exhaustion() {
        let mut vm = VideoMemory::new(150);
        vm.alloc(10, 10).unwrap();
        let err = vm.alloc(10, 10).unwrap_err();
        match err {
            SurfaceError::OutOfMemory {
                requested,
                available,
            } => {
                assert_eq!(requested, 100);
                assert_eq!(available, 50);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_format_from_bpp() {
        assert_eq!(PixelFormat::from_bytes_per_pixel(2), PixelFormat::Rgb15);
        assert_eq!(PixelFormat::from_bytes_per_pixel(3), PixelFormat::Rgb24);
        assert_eq!(PixelFormat::from_bytes_per_pixel(4), PixelFormat::Argb32);
    }
}
