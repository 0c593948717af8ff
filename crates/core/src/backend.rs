//! Display output seam.
//!
//! The presenter drives page flipping through this trait so the frame
//! pipeline stays independent of the windowing library. The in-memory
//! implementation lives here for tests and headless use; the windowed one
//! is in the frontend crate.

use crate::error::PresentError;

pub trait DisplayBackend {
    /// Whether the previously requested flip has reached the display.
    /// Polled in a busy loop before the next frame is drawn.
    fn flip_done(&mut self) -> bool;

    /// Show the finished back buffer.
    fn present(&mut self, pixels: &[u32], width: u32, height: u32) -> Result<(), PresentError>;
}

/// Headless backend that keeps the last presented frame.
///
/// `flip_latency` makes `flip_done` report false for that many polls after
/// each present, modelling a display controller that has not caught up yet.
pub struct MemoryBackend {
    flip_latency: u32,
    pending_polls: u32,
    frame: Vec<u32>,
    presents: u64,
}

impl MemoryBackend {
    pub fn new(flip_latency: u32) -> Self {
        MemoryBackend {
            flip_latency,
            pending_polls: 0,
            frame: Vec::new(),
            presents: 0,
        }
    }

    /// The last frame handed to `present`.
    pub fn frame(&self) -> &[u32] {
        &self.frame
    }

    pub fn presents(&self) -> u64 {
        self.presents
    }
}

impl DisplayBackend for MemoryBackend {
    fn flip_done(&mut self) -> bool {
        if self.pending_polls > 0 {
            self.pending_polls -= 1;
            false
        } else {
            true
        }
    }

    fn present(&mut self, pixels: &[u32], _width: u32, _height: u32) -> Result<(), PresentError> {
        self.frame.clear();
        self.frame.extend_from_slice(pixels);
        self.presents += 1;
        self.pending_polls = self.flip_latency;
        Ok(())
    }
}
