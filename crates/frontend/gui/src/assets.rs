//! Bitmap intake.
//!
//! The demo looks for `back.png`, `numbers.png`, `mark.png` and
//! `texture.png` in the asset directory and falls back to built-in
//! procedural bitmaps for any that are missing, so the binary always has
//! something to show.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use png::{ColorType, Decoder};
use triflip_core::{Bitmap, DemoAssets};

pub fn load_assets(dir: &Path, screen_width: u32, screen_height: u32) -> DemoAssets {
    DemoAssets {
        background: load_or(dir, "back.png", || gradient_background(screen_width, screen_height)),
        digits: load_or(dir, "numbers.png", digit_strip),
        checkmark: load_or(dir, "mark.png", checkmark),
        texture: load_or(dir, "texture.png", checker_texture),
    }
}

fn load_or(dir: &Path, name: &str, fallback: impl FnOnce() -> Bitmap) -> Bitmap {
    let path = dir.join(name);
    match load_png(&path) {
        Ok(bmp) => {
            log::info!("loaded {} ({}x{})", path.display(), bmp.width, bmp.height);
            bmp
        }
        Err(e) => {
            log::warn!("cannot load {} ({e}); using built-in bitmap", path.display());
            fallback()
        }
    }
}

/// Decode an 8-bit PNG into ARGB8888.
pub fn load_png(path: &Path) -> Result<Bitmap, String> {
    let file = File::open(path).map_err(|e| e.to_string())?;
    let decoder = Decoder::new(BufReader::new(file));
    let mut reader = decoder.read_info().map_err(|e| e.to_string())?;
    let mut buf = vec![0u8; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf).map_err(|e| e.to_string())?;
    if info.bit_depth != png::BitDepth::Eight {
        return Err(format!("unsupported bit depth {:?}", info.bit_depth));
    }

    let data = &buf[..info.buffer_size()];
    let pixels: Vec<u32> = match info.color_type {
        ColorType::Rgba => data
            .chunks_exact(4)
            .map(|p| u32::from_be_bytes([p[3], p[0], p[1], p[2]]))
            .collect(),
        ColorType::Rgb => data
            .chunks_exact(3)
            .map(|p| u32::from_be_bytes([0xFF, p[0], p[1], p[2]]))
            .collect(),
        ColorType::Grayscale => data
            .iter()
            .map(|&g| u32::from_be_bytes([0xFF, g, g, g]))
            .collect(),
        other => return Err(format!("unsupported color type {other:?}")),
    };

    Ok(Bitmap {
        width: info.width,
        height: info.height,
        pixels,
        mip_levels: 0,
    })
}

/// Blue-to-teal vertical gradient covering the screen.
fn gradient_background(width: u32, height: u32) -> Bitmap {
    let mut pixels = Vec::with_capacity((width * height) as usize);
    for y in 0..height {
        let t = y as u32 * 255 / height.max(1);
        let color = 0xFF00_0000 | ((16 + t / 4) << 16) | ((32 + t / 3) << 8) | (96 + t / 2);
        for _ in 0..width {
            pixels.push(color);
        }
    }
    Bitmap {
        width,
        height,
        pixels,
        mip_levels: 0,
    }
}

/// 3x5 glyphs for 0-9, one bit-packed row per line.
const DIGIT_GLYPHS: [[u8; 5]; 10] = [
    [0b111, 0b101, 0b101, 0b101, 0b111],
    [0b010, 0b110, 0b010, 0b010, 0b111],
    [0b111, 0b001, 0b111, 0b100, 0b111],
    [0b111, 0b001, 0b111, 0b001, 0b111],
    [0b101, 0b101, 0b111, 0b001, 0b001],
    [0b111, 0b100, 0b111, 0b001, 0b111],
    [0b111, 0b100, 0b111, 0b101, 0b111],
    [0b111, 0b001, 0b001, 0b001, 0b001],
    [0b111, 0b101, 0b111, 0b101, 0b111],
    [0b111, 0b101, 0b111, 0b001, 0b111],
];

const GLYPH_SCALE: u32 = 4;
/// Digit cell: scaled 3x5 glyph plus one scaled column/row of padding.
const DIGIT_W: u32 = 4 * GLYPH_SCALE;
const DIGIT_H: u32 = 6 * GLYPH_SCALE;

/// White-on-black strip of the ten digits side by side.
fn digit_strip() -> Bitmap {
    let width = DIGIT_W * 10;
    let mut pixels = vec![0u32; (width * DIGIT_H) as usize];
    for (digit, glyph) in DIGIT_GLYPHS.iter().enumerate() {
        let x0 = digit as u32 * DIGIT_W;
        for (row, bits) in glyph.iter().enumerate() {
            for col in 0..3u32 {
                if bits & (0b100 >> col) == 0 {
                    continue;
                }
                for dy in 0..GLYPH_SCALE {
                    for dx in 0..GLYPH_SCALE {
                        let x = x0 + col * GLYPH_SCALE + dx;
                        let y = row as u32 * GLYPH_SCALE + dy;
                        pixels[(y * width + x) as usize] = 0xFFFF_FFFF;
                    }
                }
            }
        }
    }
    Bitmap {
        width,
        height: DIGIT_H,
        pixels,
        mip_levels: 0,
    }
}

/// Green tick on a black (transparent) field.
fn checkmark() -> Bitmap {
    let size = 16u32;
    let mut pixels = vec![0u32; (size * size) as usize];
    let mut dot = |x: i32, y: i32| {
        if (0..size as i32).contains(&x) && (0..size as i32).contains(&y) {
            pixels[(y as u32 * size + x as u32) as usize] = 0xFF00_C000;
        }
    };
    for i in 0..5i32 {
        dot(2 + i, 8 + i);
        dot(2 + i, 9 + i);
    }
    for i in 0..8i32 {
        dot(6 + i, 12 - i);
        dot(6 + i, 13 - i);
    }
    Bitmap {
        width: size,
        height: size,
        pixels,
        mip_levels: 0,
    }
}

/// Two-tone checkerboard; the right half is semi-transparent so the alpha
/// blending toggle has something to show.
fn checker_texture() -> Bitmap {
    let size = 64u32;
    let mut pixels = Vec::with_capacity((size * size) as usize);
    for y in 0..size {
        for x in 0..size {
            let dark = ((x / 8) + (y / 8)) % 2 == 0;
            let rgb = if dark { 0x00B0_5020 } else { 0x00F0_E0C0 };
            let alpha = if x >= size / 2 { 0x60u32 } else { 0xFF };
            pixels.push((alpha << 24) | rgb);
        }
    }
    Bitmap {
        width: size,
        height: size,
        pixels,
        mip_levels: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digit_strip_layout() {
        let strip = digit_strip();
        assert_eq!(strip.width % 10, 0);
        let dw = strip.width / 10;
        // glyph "1" column: some lit pixels inside its cell, black padding
        let one_start = dw;
        let lit = (0..strip.height)
            .flat_map(|y| (one_start..one_start + dw).map(move |x| (x, y)))
            .filter(|&(x, y)| strip.pixels[(y * strip.width + x) as usize] != 0)
            .count();
        assert!(lit > 0);
        // rightmost padding column stays transparent
        for y in 0..strip.height {
            assert_eq!(strip.pixels[(y * strip.width + 2 * dw - 1) as usize], 0);
        }
    }

    #[test]
    fn test_checkmark_has_tick_and_key_pixels() {
        let mark = checkmark();
        assert!(mark.pixels.iter().any(|&p| p == 0xFF00_C000));
        assert_eq!(mark.pixels[0], 0, "corner must stay at the color key");
    }

    #[test]
    fn test_texture_alpha_split() {
        let tex = checker_texture();
        let left = tex.pixels[(10 * tex.width + 4) as usize];
        let right = tex.pixels[(10 * tex.width + tex.width - 4) as usize];
        assert_eq!(left >> 24, 0xFF);
        assert_eq!(right >> 24, 0x60);
    }

    #[test]
    fn test_gradient_background_no_key_pixels() {
        let bg = gradient_background(32, 32);
        assert!(bg.pixels.iter().all(|&p| p & 0x00FF_FFFF != 0));
    }
}
