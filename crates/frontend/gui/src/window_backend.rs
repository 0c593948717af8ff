//! minifb-backed display output and key polling.

use minifb::{Key, KeyRepeat, Window, WindowOptions};
use triflip_core::{DisplayBackend, KeyCommand, PresentError};

/// Toggle keys, polled without key repeat.
const TOGGLE_KEYS: [(Key, KeyCommand); 9] = [
    (Key::A, KeyCommand::ToggleAlphaBlend),
    (Key::B, KeyCommand::ToggleBackground),
    (Key::F, KeyCommand::ToggleFogging),
    (Key::L, KeyCommand::ToggleLit),
    (Key::P, KeyCommand::TogglePerspective),
    (Key::R, KeyCommand::ToggleFrameRate),
    (Key::S, KeyCommand::ToggleFiltering),
    (Key::T, KeyCommand::ToggleTexture),
    (Key::Z, KeyCommand::FreezeRotation),
];

/// Adjustment keys, polled with repeat so holding them keeps stepping.
/// The arrow directions adjust the per-frame rotation rates, not the pose.
const ADJUST_KEYS: [(Key, KeyCommand); 12] = [
    (Key::Up, KeyCommand::RotateXDown),
    (Key::Down, KeyCommand::RotateXUp),
    (Key::Left, KeyCommand::RotateYUp),
    (Key::Right, KeyCommand::RotateYDown),
    (Key::PageUp, KeyCommand::RotateZUp),
    (Key::PageDown, KeyCommand::RotateZDown),
    (Key::Home, KeyCommand::ObjectNearer),
    (Key::End, KeyCommand::ObjectFarther),
    (Key::Equal, KeyCommand::ScreenFarther),
    (Key::NumPadPlus, KeyCommand::ScreenFarther),
    (Key::Minus, KeyCommand::ScreenNearer),
    (Key::NumPadMinus, KeyCommand::ScreenNearer),
];

pub struct MinifbBackend {
    window: Window,
}

impl MinifbBackend {
    pub fn new(title: &str, width: u32, height: u32) -> Result<Self, String> {
        let window = Window::new(
            title,
            width as usize,
            height as usize,
            WindowOptions::default(),
        )
        .map_err(|e| e.to_string())?;
        Ok(MinifbBackend { window })
    }

    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    /// Key state is refreshed by each `present`, so poll once per frame.
    pub fn poll_commands(&self) -> Vec<KeyCommand> {
        let mut out = Vec::new();
        if self.window.is_key_pressed(Key::Escape, KeyRepeat::No) {
            out.push(KeyCommand::Quit);
        }
        for (key, cmd) in TOGGLE_KEYS {
            if self.window.is_key_pressed(key, KeyRepeat::No) {
                out.push(cmd);
            }
        }
        for (key, cmd) in ADJUST_KEYS {
            if self.window.is_key_pressed(key, KeyRepeat::Yes) {
                out.push(cmd);
            }
        }
        out
    }
}

impl DisplayBackend for MinifbBackend {
    fn flip_done(&mut self) -> bool {
        // update_with_buffer blocks until the frame is handed over
        true
    }

    fn present(&mut self, pixels: &[u32], width: u32, height: u32) -> Result<(), PresentError> {
        self.window
            .update_with_buffer(pixels, width as usize, height as usize)
            .map_err(|e| PresentError::Backend(e.to_string()))
    }
}
