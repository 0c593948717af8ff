//! Demo option state and the key-command vocabulary.

use serde::{Deserialize, Serialize};

/// Toggleable rendering options.
///
/// Only the background blit starts enabled; everything else is off until
/// the user toggles it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureFlags {
    /// Blit the background image (off: flat background color).
    pub background: bool,
    /// Texture-map the object (off: Gouraud shading).
    pub texture: bool,
    /// Bilinear filtering (off: point sampling).
    pub filtering: bool,
    /// Perspective-corrected texture mapping.
    pub perspective: bool,
    /// Distance fog.
    pub fogging: bool,
    /// Modulate texels with the interpolated vertex color.
    pub lit: bool,
    /// Blend the object over the background using texture alpha.
    pub alpha_blend: bool,
    /// Draw the frames-per-second readout.
    pub frame_rate: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        FeatureFlags {
            background: true,
            texture: false,
            filtering: false,
            perspective: false,
            fogging: false,
            lit: false,
            alpha_blend: false,
            frame_rate: false,
        }
    }
}

/// Commands the frontend translates key presses into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    ToggleAlphaBlend,
    ToggleBackground,
    ToggleFogging,
    ToggleLit,
    TogglePerspective,
    ToggleFrameRate,
    ToggleFiltering,
    ToggleTexture,
    /// Zero all rotation rates.
    FreezeRotation,
    RotateXDown,
    RotateXUp,
    RotateYUp,
    RotateYDown,
    RotateZUp,
    RotateZDown,
    ObjectNearer,
    ObjectFarther,
    ScreenNearer,
    ScreenFarther,
    Quit,
}

impl KeyCommand {
    /// Translate a character key. Arrow and navigation keys have no
    /// character and are mapped by the frontend directly.
    pub fn from_char(c: char) -> Option<KeyCommand> {
        match c.to_ascii_lowercase() {
            'a' => Some(KeyCommand::ToggleAlphaBlend),
            'b' => Some(KeyCommand::ToggleBackground),
            'f' => Some(KeyCommand::ToggleFogging),
            'l' => Some(KeyCommand::ToggleLit),
            'p' => Some(KeyCommand::TogglePerspective),
            'r' => Some(KeyCommand::ToggleFrameRate),
            's' => Some(KeyCommand::ToggleFiltering),
            't' => Some(KeyCommand::ToggleTexture),
            'z' => Some(KeyCommand::FreezeRotation),
            '+' => Some(KeyCommand::ScreenFarther),
            '-' => Some(KeyCommand::ScreenNearer),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_background_only() {
        let f = FeatureFlags::default();
        assert!(f.background);
        assert!(!f.texture);
        assert!(!f.filtering);
        assert!(!f.perspective);
        assert!(!f.fogging);
        assert!(!f.lit);
        assert!(!f.alpha_blend);
        assert!(!f.frame_rate);
    }

    #[test]
    fn test_char_mapping_case_insensitive() {
        assert_eq!(KeyCommand::from_char('T'), Some(KeyCommand::ToggleTexture));
        assert_eq!(KeyCommand::from_char('t'), Some(KeyCommand::ToggleTexture));
        assert_eq!(KeyCommand::from_char('q'), None);
    }
}
