use crate::frame::FrameSoA;
use crate::kmeans::CHUNK_SIZE;
use crate::membership::Votes;
use crate::types::{NUM_CLUSTERS, Vec3};
use rand::RngExt;
use rayon::prelude::*;
use rgb::RGB8;

/// Per-channel intensity of the bit-pattern palette.
const PALETTE_LEVEL: f32 = 100.0;

/// Weight of the previous frame's output in the temporal filter.
pub const TEMPORAL_FACTOR: f32 = 0.5;

/// Fixed display color for each cluster.
pub type Palette = [Vec3; NUM_CLUSTERS];

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum DisplayMode {
    /// Membership-weighted sum of the cluster palette colors.
    #[default]
    Palette,
    /// Only the given cluster shows, in the samples' own colors scaled by their
    /// membership weight for it.
    Highlight(usize),
}

/// `k` visually disjoint colors.
///
/// For `1 < k < 8` cluster `j` gets the 3-bit pattern of `j + 1` on the red,
/// green and blue channels. Otherwise colors are drawn at random, rejecting
/// repeats.
pub fn palette(rng: &mut impl RngExt, k: usize) -> Vec<Vec3> {
    if k > 1 && k < 8 {
        return (1..=k)
            .map(|j| {
                Vec3::new(
                    (j % 2) as f32 * PALETTE_LEVEL,
                    ((j / 2) % 2) as f32 * PALETTE_LEVEL,
                    ((j / 4) % 2) as f32 * PALETTE_LEVEL,
                )
            })
            .collect();
    }

    let mut colors = Vec::<Vec3>::with_capacity(k);
    while colors.len() < k {
        let candidate = Vec3::new(
            rng.random_range(0..255u8) as f32,
            rng.random_range(0..255u8) as f32,
            rng.random_range(0..255u8) as f32,
        );
        if !colors.contains(&candidate) {
            colors.push(candidate);
        }
    }
    colors
}

pub fn cluster_palette(rng: &mut impl RngExt) -> Palette {
    let colors = palette(rng, NUM_CLUSTERS);
    std::array::from_fn(|j| colors[j])
}

#[inline(always)]
pub fn to_rgb8(color: Vec3) -> RGB8 {
    let channel = |v: f32| v.round().clamp(0.0, 255.0) as u8;
    RGB8::new(channel(color.x), channel(color.y), channel(color.z))
}

/// Writes one display color per sample.
///
/// For valid samples the mode's weighted color (not normalised by the vote sum)
/// is averaged with the sample's previous output; the result is both displayed
/// and kept in `history` for the next frame. Invalid samples display black and
/// keep their history.
pub fn blend(
    frame: &FrameSoA,
    membership: &[Votes],
    palette: &Palette,
    mode: DisplayMode,
    history: &mut [Vec3],
    display: &mut [RGB8],
) {
    assert_eq!(membership.len(), frame.len());
    assert_eq!(history.len(), frame.len());
    assert_eq!(display.len(), frame.len());

    let valid = frame.valid();
    let colors = frame.colors();

    display
        .par_chunks_mut(CHUNK_SIZE)
        .zip(history.par_chunks_mut(CHUNK_SIZE))
        .enumerate()
        .for_each(|(chunk, (display, history))| {
            let offset = chunk * CHUNK_SIZE;

            for (j, (out, previous)) in display.iter_mut().zip(history.iter_mut()).enumerate() {
                let i = offset + j;
                if !valid[i] {
                    *out = RGB8::new(0, 0, 0);
                    continue;
                }

                let votes = &membership[i];
                let weighted = match mode {
                    DisplayMode::Palette => votes
                        .iter()
                        .zip(palette)
                        .fold(Vec3::ZERO, |acc, (&w, &c)| acc + c * w),
                    DisplayMode::Highlight(cluster) => {
                        colors[i] * votes.get(cluster).copied().unwrap_or(0.0)
                    }
                };

                let blended = weighted * (1.0 - TEMPORAL_FACTOR) + *previous * TEMPORAL_FACTOR;
                *previous = blended;
                *out = to_rgb8(blended);
            }
        });
}

/// Palette color of each sample's hard label; black for invalid samples.
pub fn label_colors(frame: &FrameSoA, labels: &[u8], palette: &Palette, out: &mut [RGB8]) {
    assert_eq!(labels.len(), frame.len());
    assert_eq!(out.len(), frame.len());

    out.par_iter_mut()
        .zip(labels.par_iter())
        .zip(frame.valid().par_iter())
        .for_each(|((out, &label), &valid)| {
            *out = match palette.get(label as usize) {
                Some(&color) if valid => to_rgb8(color),
                _ => RGB8::new(0, 0, 0),
            };
        });
}
