//! Frame-rate counter and HUD blit layout.

use std::time::Instant;

use crate::dirty::{BackgroundLayout, FPS_DIGITS, FPS_X, FPS_Y, MARK_LINE_HEIGHT, MARK_XL, MARK_XR, MARK_Y};
use crate::rect::Rect;
use crate::state::FeatureFlags;

/// Frames-per-second estimator.
///
/// Frames are counted and the rate recomputed once at least a second has
/// passed; between recomputations the last value keeps being reported.
pub struct FrameRateCounter {
    frame_count: u32,
    fps: u32,
    start: Instant,
}

impl FrameRateCounter {
    pub fn new(now: Instant) -> Self {
        FrameRateCounter {
            frame_count: 0,
            fps: 0,
            start: now,
        }
    }

    /// Count a frame and return the current estimate.
    pub fn tick(&mut self, now: Instant) -> u32 {
        let prev = self.frame_count;
        self.frame_count += 1;
        if prev == 0 {
            self.start = now;
            return self.fps;
        }
        let elapsed_ms = now.duration_since(self.start).as_millis();
        if elapsed_ms >= 1000 {
            self.fps = (u128::from(self.frame_count) * 1000 / elapsed_ms) as u32;
            self.frame_count = 0;
            self.start = now;
        }
        self.fps
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }
}

/// Destination and source rectangles for the three FPS digits, most
/// significant first. The digit strip holds glyphs 0-9 side by side.
pub fn digit_blits(fps: u32, digit_width: i32, digit_height: i32) -> [(Rect, Rect); 3] {
    let mut out = [(Rect::default(), Rect::default()); FPS_DIGITS as usize];
    let mut rest = fps;
    let mut divisor = 100;
    for (i, slot) in out.iter_mut().enumerate() {
        let digit = (rest / divisor) as i32;
        rest %= divisor;
        divisor /= 10;
        let x = FPS_X + i as i32 * digit_width;
        slot.0 = Rect::from_size(x, FPS_Y, digit_width, digit_height);
        slot.1 = Rect::from_size(digit * digit_width, 0, digit_width, digit_height);
    }
    out
}

/// Screen rectangles to stamp the checkmark into for each enabled option.
///
/// The left column lists background, texture, filtering, perspective, fog
/// and lighting; the right column holds alpha blending.
pub fn checkmark_dests(
    flags: &FeatureFlags,
    layout: &BackgroundLayout,
    check_width: i32,
    check_height: i32,
) -> Vec<Rect> {
    let img = &layout.image_dest;
    let left_rows = [
        flags.background,
        flags.texture,
        flags.filtering,
        flags.perspective,
        flags.fogging,
        flags.lit,
    ];

    let mut out = Vec::new();
    for (row, on) in left_rows.iter().enumerate() {
        if *on {
            out.push(Rect::from_size(
                img.left + MARK_XL,
                img.top + MARK_Y + row as i32 * MARK_LINE_HEIGHT,
                check_width,
                check_height,
            ));
        }
    }
    if flags.alpha_blend {
        out.push(Rect::from_size(
            img.left + MARK_XR,
            img.top + MARK_Y,
            check_width,
            check_height,
        ));
    }
    out
}
