//! Depth buffer for hidden-surface removal.
//!
//! Stores one 16-bit depth per pixel. The presenter clears it to the far
//! sentinel (0xFFFF) at the top of every frame; the rasterizer submits
//! scaled camera-space depths (z * 100) and a pixel passes when its depth
//! is strictly less than the stored value.

use crate::rect::Rect;

/// Far-plane sentinel the buffer is cleared to.
pub const DEPTH_FAR: u16 = 0xFFFF;

pub struct DepthBuffer {
    width: u32,
    height: u32,
    buffer: Vec<u16>,
    enabled: bool,
}

impl DepthBuffer {
    /// Create a buffer initialized to the far plane, testing disabled.
    pub fn new(width: u32, height: u32) -> Self {
        DepthBuffer {
            width,
            height,
            buffer: vec![DEPTH_FAR; (width * height) as usize],
            enabled: false,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Reset a rectangular region to the far sentinel. The rectangle is
    /// clipped to the buffer bounds.
    pub fn clear_rect(&mut self, rect: &Rect) {
        let r = rect.clip_to_surface(self.width, self.height);
        for y in r.top..r.bottom {
            let row = (y as u32 * self.width) as usize;
            self.buffer[row + r.left as usize..row + r.right as usize].fill(DEPTH_FAR);
        }
    }

    /// Depth-test a pixel, updating the buffer on pass.
    ///
    /// Always passes (without writing) when testing is disabled. This is
    /// the innermost raster loop; coordinates are assumed pre-clipped.
    #[inline]
    pub fn test_and_update(&mut self, x: u32, y: u32, depth: u16) -> bool {
        if !self.enabled {
            return true;
        }
        let idx = (y * self.width + x) as usize;
        if idx >= self.buffer.len() {
            return false;
        }
        if depth < self.buffer[idx] {
            self.buffer[idx] = depth;
            true
        } else {
            false
        }
    }

    /// Read a depth value (tests and debugging).
    pub fn read(&self, x: u32, y: u32) -> Option<u16> {
        if x >= self.width {
            return None;
        }
        self.buffer.get((y * self.width + x) as usize).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_buffer_at_far_plane() {
        let z = DepthBuffer::new(8, 8);
        for y in 0..8 {
            for x in 0..8 {
                assert_eq!(z.read(x, y), Some(DEPTH_FAR));
            }
        }
        assert!(!z.is_enabled());
    }

    #[test]
    fn test_depth_test_pass_and_fail() {
        let mut z = DepthBuffer::new(8, 8);
        z.set_enabled(true);

        assert!(z.test_and_update(3, 3, 0x8000));
        assert_eq!(z.read(3, 3), Some(0x8000));

        // farther pixel rejected, buffer unchanged
        assert!(!z.test_and_update(3, 3, 0x9000));
        assert_eq!(z.read(3, 3), Some(0x8000));

        // equal depth rejected (strict less-than)
        assert!(!z.test_and_update(3, 3, 0x8000));

        // nearer pixel accepted
        assert!(z.test_and_update(3, 3, 0x7000));
        assert_eq!(z.read(3, 3), Some(0x7000));
    }

    #[test]
    fn test_disabled_always_passes_without_writing() {
        let mut z = DepthBuffer::new(8, 8);
        assert!(z.test_and_update(2, 2, 0x1234));
        assert_eq!(z.read(2, 2), Some(DEPTH_FAR));
    }

    #[test]
    fn test_clear_rect_partial() {
        let mut z = DepthBuffer::new(8, 8);
        z.set_enabled(true);
        z.test_and_update(1, 1, 0x1000);
        z.test_and_update(6, 6, 0x1000);

        z.clear_rect(&Rect::new(0, 0, 4, 4));
        assert_eq!(z.read(1, 1), Some(DEPTH_FAR));
        assert_eq!(z.read(6, 6), Some(0x1000));
    }

    #[test]
    fn test_clear_rect_clips_to_bounds() {
        let mut z = DepthBuffer::new(8, 8);
        z.set_enabled(true);
        z.test_and_update(7, 7, 0x1000);
        z.clear_rect(&Rect::new(-5, -5, 100, 100));
        assert_eq!(z.read(7, 7), Some(DEPTH_FAR));
    }

    #[test]
    fn test_out_of_bounds() {
        let mut z = DepthBuffer::new(8, 8);
        z.set_enabled(true);
        assert!(!z.test_and_update(100, 100, 0x1000));
        assert_eq!(z.read(100, 100), None);
    }
}
