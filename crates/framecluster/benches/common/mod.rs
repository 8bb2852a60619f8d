use framecluster::rng;
use framecluster::{FrameSoA, Vec3};
use rand::RngExt;

pub const SIZES: [(&str, u16, u16); 3] = [("100k", 400, 250), ("1M", 1000, 1000), ("2M", 2000, 1000)];

pub fn generate_random_frame(width: u16, height: u16) -> FrameSoA {
    let mut rng = rng::new();
    let mut frame = FrameSoA::new(width, height).unwrap();

    for i in 0..frame.len() {
        frame.positions_mut()[i] = Vec3::new(rng.random(), rng.random(), rng.random::<f32>() * 4.0);
        frame.colors_mut()[i] = Vec3::new(
            rng.random_range(0.0..255.0),
            rng.random_range(0.0..255.0),
            rng.random_range(0.0..255.0),
        );
        frame.normals_mut()[i] = Vec3::new(0.0, 0.0, -1.0);
        // Roughly what a depth sensor drops
        frame.valid_mut()[i] = rng.random::<f32>() > 0.1;
    }

    frame
}

pub fn generate_clustered_frame(width: u16, height: u16) -> FrameSoA {
    let mut rng = rng::new();
    let mut frame = FrameSoA::new(width, height).unwrap();

    let centers = [
        Vec3::new(-0.5, -0.5, 1.0),
        Vec3::new(0.5, -0.5, 2.0),
        Vec3::new(-0.5, 0.5, 3.0),
        Vec3::new(0.5, 0.5, 4.0),
    ];
    let noise = 0.05;

    for i in 0..frame.len() {
        let c = centers[i % 4];
        let jitter = Vec3::new(
            (rng.random::<f32>() - 0.5) * noise,
            (rng.random::<f32>() - 0.5) * noise,
            (rng.random::<f32>() - 0.5) * noise,
        );
        frame.positions_mut()[i] = c + jitter;
        frame.colors_mut()[i] = Vec3::new(64.0 * (i % 4) as f32, 128.0, 128.0);
        frame.normals_mut()[i] = Vec3::new(0.0, 0.0, -1.0);
        frame.valid_mut()[i] = true;
    }

    frame
}
