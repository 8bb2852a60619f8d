use crate::{FrameSoA, RGB8, Vec3};
use clap::Parser;
use image::RgbImage;
use std::path::{Path, PathBuf};

#[derive(Parser)]
pub struct SceneArgs {
    /// Folder the rendered PNGs go to
    pub out: PathBuf,

    #[arg(long, default_value_t = 320)]
    pub width: u16,

    #[arg(long, default_value_t = 240)]
    pub height: u16,

    /// Number of frames to push through the engine
    #[arg(long, default_value_t = 10)]
    pub frames: u32,
}

/// One object of the synthetic scene: a disc facing the camera.
struct Disc {
    center: (f32, f32),
    radius: f32,
    depth: f32,
    color: Vec3,
    /// Horizontal drift per frame, in pixels
    speed: f32,
}

const DISCS: [Disc; 4] = [
    Disc {
        center: (0.25, 0.3),
        radius: 0.18,
        depth: 1.2,
        color: Vec3::new(220.0, 60.0, 40.0),
        speed: 1.0,
    },
    Disc {
        center: (0.7, 0.3),
        radius: 0.15,
        depth: 2.0,
        color: Vec3::new(40.0, 200.0, 80.0),
        speed: -0.5,
    },
    Disc {
        center: (0.3, 0.72),
        radius: 0.2,
        depth: 2.8,
        color: Vec3::new(50.0, 70.0, 230.0),
        speed: 0.5,
    },
    Disc {
        center: (0.72, 0.7),
        radius: 0.16,
        depth: 3.6,
        color: Vec3::new(230.0, 210.0, 60.0),
        speed: -1.0,
    },
];

/// Overwrites `frame` with frame number `t` of a scene of four discs at
/// different depths, drifting sideways. Pixels that hit no disc get no depth
/// and are invalid, as is a sparse grid of dropouts.
pub fn render_scene(frame: &mut FrameSoA, t: u32) {
    let width = frame.width() as usize;
    let height = frame.height() as usize;
    let focal = width as f32;
    let (cx, cy) = (width as f32 / 2.0, height as f32 / 2.0);
    let scale = width.min(height) as f32;

    for i in 0..frame.len() {
        let (u, v) = ((i % width) as f32, (i / width) as f32);

        let hit = DISCS.iter().find(|disc| {
            let du = u - (disc.center.0 * width as f32 + disc.speed * t as f32);
            let dv = v - disc.center.1 * height as f32;
            du * du + dv * dv <= (disc.radius * scale).powi(2)
        });
        let dropout = (i % 97) == (t as usize % 97);

        match hit {
            Some(disc) if !dropout => {
                let z = disc.depth;
                frame.positions_mut()[i] = Vec3::new((u - cx) / focal * z, (v - cy) / focal * z, z);
                frame.colors_mut()[i] = disc.color;
                frame.normals_mut()[i] = Vec3::new(0.0, 0.0, -1.0);
                frame.valid_mut()[i] = true;
            }
            _ => {
                frame.positions_mut()[i] = Vec3::ZERO;
                frame.colors_mut()[i] = Vec3::ZERO;
                frame.normals_mut()[i] = Vec3::ZERO;
                frame.valid_mut()[i] = false;
            }
        }
    }
}

pub fn ensure_out_dir(folder: &Path, name: &str) -> std::io::Result<PathBuf> {
    let dir = folder.join("debug_results").join(name);
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

pub fn to_image(width: u16, height: u16, pixels: &[RGB8]) -> RgbImage {
    RgbImage::from_fn(width as u32, height as u32, |x, y| {
        let p = pixels[y as usize * width as usize + x as usize];
        image::Rgb([p.r, p.g, p.b])
    })
}

/// The frame's own colors, black where invalid.
pub fn input_colors(frame: &FrameSoA) -> Vec<RGB8> {
    frame
        .colors()
        .iter()
        .zip(frame.valid())
        .map(|(c, &valid)| {
            if valid {
                RGB8::new(c.x as u8, c.y as u8, c.z as u8)
            } else {
                RGB8::new(0, 0, 0)
            }
        })
        .collect()
}
