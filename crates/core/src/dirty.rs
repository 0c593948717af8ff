//! Background layout and per-buffer dirty-region tracking.
//!
//! With two display surfaces alternating as the back buffer, the object
//! footprint painted two frames ago is still on screen in the buffer being
//! reused. Each buffer therefore carries its own repaint record, refreshed
//! every time that buffer is drawn into, so only the stale regions (object
//! footprint, frame-rate digits, option checkmarks) are repainted instead
//! of the whole background.

use crate::rect::Rect;

/// Screen x of the frame-rate readout.
pub const FPS_X: i32 = 0;
/// Screen y of the frame-rate readout.
pub const FPS_Y: i32 = 0;
/// Digits shown by the frame-rate readout.
pub const FPS_DIGITS: i32 = 3;

/// Left option column x, relative to the background image.
pub const MARK_XL: i32 = 12;
/// Right option column x, relative to the background image.
pub const MARK_XR: i32 = 332;
/// First option row y, relative to the background image.
pub const MARK_Y: i32 = 65;
/// Height of one option row.
pub const MARK_LINE_HEIGHT: i32 = 19;
/// Rows in the left option column.
pub const LEFT_OPTION_ROWS: i32 = 6;

/// Color the screen is cleared to where the image does not reach.
pub const BG_COLOR: u32 = 0xFF00_0000;

/// Static screen layout derived from the background image placement.
///
/// The image is centered on screen (or cropped to the screen when larger),
/// and the HUD repaint regions are precomputed from its position.
#[derive(Debug, Clone)]
pub struct BackgroundLayout {
    pub screen: Rect,
    /// Where the background image lands on screen.
    pub image_dest: Rect,
    /// The part of the image that is shown.
    pub image_src: Rect,
    /// Screen area covered by the frame-rate digits.
    pub fps_dest: Rect,
    /// Image region behind the digits; only meaningful with
    /// `fps_over_image`.
    pub fps_src: Rect,
    /// Whether the digit area overlaps the image (repaint by blit) or not
    /// (repaint by color fill).
    pub fps_over_image: bool,
    pub left_options_dest: Rect,
    pub left_options_src: Rect,
    pub right_options_dest: Rect,
    pub right_options_src: Rect,
    /// Whether the right option column lands inside the image at all.
    pub right_options_visible: bool,
}

impl BackgroundLayout {
    pub fn new(
        screen_width: u32,
        screen_height: u32,
        image_width: u32,
        image_height: u32,
        digit_width: i32,
        digit_height: i32,
        check_width: i32,
    ) -> Self {
        let sw = screen_width as i32;
        let sh = screen_height as i32;
        let iw = image_width as i32;
        let ih = image_height as i32;

        // center the image, cropping when it exceeds the screen
        let (dest_l, dest_r, src_l, src_r) = if iw >= sw {
            (0, sw, 0, sw)
        } else {
            let l = (sw - iw) / 2;
            (l, l + iw, 0, iw)
        };
        let (dest_t, dest_b, src_t, src_b) = if ih >= sh {
            (0, sh, 0, sh)
        } else {
            let t = (sh - ih) / 2;
            (t, t + ih, 0, ih)
        };
        let image_dest = Rect::new(dest_l, dest_t, dest_r, dest_b);
        let image_src = Rect::new(src_l, src_t, src_r, src_b);

        let fps_dest = Rect::from_size(FPS_X, FPS_Y, digit_width * FPS_DIGITS, digit_height);
        // the digit area counts as image-covered unless the image starts
        // past it entirely
        let fps_over_image = !(image_dest.top > fps_dest.bottom || image_dest.left > fps_dest.right);
        let fps_src = Rect::new(
            image_src.left + FPS_X,
            image_src.top + FPS_Y,
            image_src.left + FPS_X + digit_width * FPS_DIGITS,
            image_src.top + FPS_Y + digit_height,
        );

        let mut left_options_dest = Rect::new(
            image_dest.left + MARK_XL,
            image_dest.top + MARK_Y,
            image_dest.left + MARK_XL + check_width,
            image_dest.top + MARK_Y + MARK_LINE_HEIGHT * LEFT_OPTION_ROWS,
        );
        let mut left_options_src = Rect::new(
            image_src.left + MARK_XL,
            image_src.top + MARK_Y,
            image_src.left + MARK_XL + check_width,
            image_src.top + MARK_Y + MARK_LINE_HEIGHT * LEFT_OPTION_ROWS,
        );
        if left_options_dest.bottom > image_dest.bottom {
            left_options_dest.bottom = image_dest.bottom;
            left_options_src.bottom = left_options_src.top + left_options_dest.height();
        }

        let mut right_options_dest = Rect::new(
            image_dest.left + MARK_XR,
            image_dest.top + MARK_Y,
            image_dest.left + MARK_XR + check_width,
            image_dest.top + MARK_Y + MARK_LINE_HEIGHT,
        );
        let mut right_options_src = Rect::new(
            image_src.left + MARK_XR,
            image_src.top + MARK_Y,
            image_src.left + MARK_XR + check_width,
            image_src.top + MARK_Y + MARK_LINE_HEIGHT,
        );
        let right_options_visible = right_options_dest.left <= image_dest.right;
        if right_options_dest.bottom > image_dest.bottom {
            right_options_dest.bottom = image_dest.bottom;
            right_options_src.bottom = right_options_src.top + right_options_dest.height();
        }
        if right_options_dest.right > image_dest.right {
            right_options_dest.right = image_dest.right;
            right_options_src.right = right_options_src.left + right_options_dest.width();
        }

        BackgroundLayout {
            screen: Rect::new(0, 0, sw, sh),
            image_dest,
            image_src,
            fps_dest,
            fps_src,
            fps_over_image,
            left_options_dest,
            left_options_src,
            right_options_dest,
            right_options_src,
            right_options_visible,
        }
    }
}

/// Repaint record for one display buffer.
#[derive(Debug, Clone)]
pub struct BufferDirty {
    /// The footprint spilled outside the image and needs a color fill
    /// before the image blit.
    pub needs_fill: bool,
    /// Full object footprint (only filled when `needs_fill`).
    pub fill_dest: Rect,
    /// Image-covered part of the footprint.
    pub image_dest: Rect,
    /// Matching region in the image surface.
    pub image_src: Rect,
}

/// One `BufferDirty` per display surface.
pub struct DirtyTracker {
    buffers: Vec<BufferDirty>,
}

impl DirtyTracker {
    /// Seed every buffer with a whole-screen footprint so the first frames
    /// repaint everything.
    pub fn new(buffer_count: usize, layout: &BackgroundLayout) -> Self {
        let seed = BufferDirty {
            needs_fill: true,
            fill_dest: layout.screen,
            image_dest: layout.image_dest,
            image_src: layout.image_src,
        };
        DirtyTracker {
            buffers: vec![seed; buffer_count],
        }
    }

    pub fn buffer(&self, index: usize) -> &BufferDirty {
        &self.buffers[index]
    }

    /// Record the object footprint just drawn into a buffer.
    pub fn record(&mut self, index: usize, object: &Rect, layout: &BackgroundLayout) {
        let img = &layout.image_dest;
        let d = &mut self.buffers[index];
        if object.top < img.top
            || object.bottom > img.bottom
            || object.left < img.left
            || object.right > img.right
        {
            d.needs_fill = true;
            d.fill_dest = *object;
            d.image_dest = Rect::new(
                object.left.max(img.left),
                object.top.max(img.top),
                object.right.min(img.right),
                object.bottom.min(img.bottom),
            );
        } else {
            d.needs_fill = false;
            d.image_dest = *object;
        }
        d.image_src = d.image_dest.translate(-img.left, -img.top);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_screen_layout() -> BackgroundLayout {
        BackgroundLayout::new(640, 480, 640, 480, 14, 24, 16)
    }

    #[test]
    fn test_full_screen_image_layout() {
        let l = full_screen_layout();
        assert_eq!(l.image_dest, Rect::new(0, 0, 640, 480));
        assert_eq!(l.image_src, Rect::new(0, 0, 640, 480));
        assert!(l.fps_over_image);
        assert!(l.right_options_visible);
        assert_eq!(l.fps_dest, Rect::new(0, 0, 42, 24));
        assert_eq!(l.left_options_dest, Rect::new(12, 65, 28, 65 + 19 * 6));
        assert_eq!(l.right_options_dest, Rect::new(332, 65, 348, 84));
    }

    #[test]
    fn test_small_image_is_centered() {
        let l = BackgroundLayout::new(640, 480, 320, 240, 14, 24, 16);
        assert_eq!(l.image_dest, Rect::new(160, 120, 480, 360));
        assert_eq!(l.image_src, Rect::new(0, 0, 320, 240));
        // image starts below the digit row, digits sit on plain background
        assert!(!l.fps_over_image);
    }

    #[test]
    fn test_oversized_image_is_cropped() {
        let l = BackgroundLayout::new(640, 480, 800, 600, 14, 24, 16);
        assert_eq!(l.image_dest, Rect::new(0, 0, 640, 480));
        assert_eq!(l.image_src, Rect::new(0, 0, 640, 480));
    }

    #[test]
    fn test_tracker_seeds_whole_screen() {
        let l = full_screen_layout();
        let t = DirtyTracker::new(2, &l);
        for i in 0..2 {
            let d = t.buffer(i);
            assert!(d.needs_fill);
            assert_eq!(d.fill_dest, l.screen);
            assert_eq!(d.image_dest, l.image_dest);
        }
    }

    #[test]
    fn test_record_inside_image() {
        let l = BackgroundLayout::new(640, 480, 320, 240, 14, 24, 16);
        let mut t = DirtyTracker::new(2, &l);
        let object = Rect::new(200, 150, 300, 250);
        t.record(0, &object, &l);

        let d = t.buffer(0);
        assert!(!d.needs_fill);
        assert_eq!(d.image_dest, object);
        assert_eq!(d.image_src, Rect::new(40, 30, 140, 130));
        // the other buffer keeps its own record
        assert!(t.buffer(1).needs_fill);
    }

    #[test]
    fn test_record_spilling_off_image() {
        let l = BackgroundLayout::new(640, 480, 320, 240, 14, 24, 16);
        let mut t = DirtyTracker::new(2, &l);
        let object = Rect::new(100, 100, 500, 400);
        t.record(1, &object, &l);

        let d = t.buffer(1);
        assert!(d.needs_fill);
        assert_eq!(d.fill_dest, object);
        assert_eq!(d.image_dest, Rect::new(160, 120, 480, 360));
        assert_eq!(d.image_src, Rect::new(0, 0, 320, 240));
    }
}
