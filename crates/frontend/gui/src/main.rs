mod assets;
mod mode;
mod settings;
mod window_backend;

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use settings::Settings;
use triflip_core::{MeshVariant, PixelFormat, Presenter, SoftwareToolkit};
use window_backend::MinifbBackend;

fn show_syntax() {
    println!("    /mxxxx : set display mode xxxx, default is 110");
    println!("    /?     : display this message");
}

/// Parse the command line; `Ok(Some(mode))` when `/m` was given.
fn parse_args(args: &[String]) -> Result<Option<u32>, ()> {
    let mut mode_override = None;
    let mut bad = false;
    for a in args {
        let mut chars = a.chars();
        match (chars.next(), chars.next()) {
            (Some('/') | Some('-'), Some('m' | 'M')) => {
                match u32::from_str_radix(chars.as_str(), 16) {
                    Ok(m) => mode_override = Some(m),
                    Err(_) => {
                        println!("Unknown option : [{a}]");
                        bad = true;
                    }
                }
            }
            (Some('/') | Some('-'), Some('?')) => bad = true,
            _ => {
                println!("Unknown option : [{a}]");
                bad = true;
            }
        }
    }
    if bad {
        Err(())
    } else {
        Ok(mode_override)
    }
}

fn asset_dir(settings: &Settings) -> PathBuf {
    if let Some(dir) = &settings.asset_dir {
        return PathBuf::from(dir);
    }
    let mut dir = env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."));
    dir.push("assets");
    if dir.is_dir() {
        dir
    } else {
        PathBuf::from("assets")
    }
}

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let mode_override = match parse_args(&args) {
        Ok(m) => m,
        Err(()) => {
            show_syntax();
            return ExitCode::FAILURE;
        }
    };

    let mut settings = Settings::load();
    let dm = mode::lookup(mode_override.unwrap_or(settings.mode));
    let format = PixelFormat::from_bytes_per_pixel(dm.bytes_per_pixel);
    let variant = MeshVariant::parse(&settings.mesh).unwrap_or_else(|| {
        log::warn!("unknown mesh \"{}\" in settings; using cube", settings.mesh);
        MeshVariant::Cube
    });
    log::info!(
        "mode {:x}: {}x{} ({} bytes/pixel), mesh {:?}",
        dm.number,
        dm.width,
        dm.height,
        dm.bytes_per_pixel,
        variant
    );

    let backend = match MinifbBackend::new("Triangle Flip Demo", dm.width, dm.height) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("Failed to create window: {e}");
            return ExitCode::FAILURE;
        }
    };

    // room for both display buffers, the texture and the HUD bitmaps
    let video_capacity = (dm.width * dm.height) as usize * 3;
    let toolkit = SoftwareToolkit::new(dm.width, dm.height, video_capacity);
    let demo_assets = assets::load_assets(&asset_dir(&settings), dm.width, dm.height);

    let mut presenter = match Presenter::new(
        toolkit,
        backend,
        demo_assets,
        variant,
        dm.width,
        dm.height,
        format,
    ) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Init. failed: {e}");
            return ExitCode::FAILURE;
        }
    };
    presenter.set_camera(settings.camera);

    'running: while presenter.backend().is_open() {
        let commands = presenter.backend().poll_commands();
        for cmd in commands {
            if !presenter.handle_command(cmd) {
                break 'running;
            }
        }
        if let Err(e) = presenter.render_frame(Instant::now()) {
            eprintln!("Frame update failed: {e}");
            break;
        }
    }

    settings.camera = *presenter.camera();
    if let Err(e) = settings.save() {
        log::warn!("cannot save settings: {e}");
    }
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_mode_switch() {
        assert_eq!(parse_args(&strings(&["/m113"])), Ok(Some(0x113)));
        assert_eq!(parse_args(&strings(&["-M110"])), Ok(Some(0x110)));
        assert_eq!(parse_args(&[]), Ok(None));
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert_eq!(parse_args(&strings(&["/x"])), Err(()));
        assert_eq!(parse_args(&strings(&["bare"])), Err(()));
        assert_eq!(parse_args(&strings(&["/?"])), Err(()));
        assert_eq!(parse_args(&strings(&["/mZZZ"])), Err(()));
    }
}
