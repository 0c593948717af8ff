//! VESA-style display mode numbers.
//!
//! The mode is given on the command line as a hex number (`/m110` and so
//! on); unknown numbers fall back to 640x480. Only the low 12 bits carry
//! the mode identity.

/// 640x480, 15-bit color.
pub const DEFAULT_MODE: u32 = 0x110;

#[derive(Debug, Clone, Copy)]
pub struct DisplayMode {
    pub number: u32,
    pub width: u32,
    pub height: u32,
    pub bytes_per_pixel: u32,
}

pub fn lookup(number: u32) -> DisplayMode {
    let m = number & 0x0FFF;
    let (width, height) = match m {
        0x215 | 0x216 => (512, 384),
        0x13 | 0x10D | 0x10E | 0x10F => (320, 200),
        0x100 => (640, 400),
        0x101 | 0x110 | 0x111 | 0x112 => (640, 480),
        0x103 | 0x113 | 0x114 | 0x115 => (800, 600),
        0x105 | 0x116 | 0x117 | 0x118 => (1024, 768),
        0x107 | 0x119 | 0x11A | 0x11B => (1200, 1024),
        _ => (640, 480),
    };
    let bytes_per_pixel = match m {
        0x13 | 0x100 | 0x101 | 0x103 | 0x105 | 0x107 | 0x215 => 1,
        0x10D | 0x10E | 0x110 | 0x111 | 0x113 | 0x114 | 0x116 | 0x117 | 0x119 | 0x11A | 0x216 => 2,
        0x10F | 0x112 | 0x115 | 0x11B | 0x11F => 3,
        _ => 1,
    };
    DisplayMode {
        number,
        width,
        height,
        bytes_per_pixel,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_mode() {
        let m = lookup(DEFAULT_MODE);
        assert_eq!((m.width, m.height, m.bytes_per_pixel), (640, 480, 2));
    }

    #[test]
    fn test_high_bits_ignored() {
        let m = lookup(0x4113);
        assert_eq!((m.width, m.height, m.bytes_per_pixel), (800, 600, 2));
    }

    #[test]
    fn test_unknown_mode_falls_back() {
        let m = lookup(0x999);
        assert_eq!((m.width, m.height), (640, 480));
    }
}
