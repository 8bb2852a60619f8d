use crate::frame::FrameSoA;
use crate::types::Vec3;
use rayon::prelude::*;
use std::array;

const NONE: (f32, usize) = (f32::INFINITY, usize::MAX);

// Smaller distance wins, ties go to the lower index so the result doesn't depend
// on how rayon splits the work.
#[inline(always)]
fn closer(a: (f32, usize), b: (f32, usize)) -> (f32, usize) {
    if b.0 < a.0 || (b.0 == a.0 && b.1 < a.1) {
        b
    } else {
        a
    }
}

/// For each point, the index of the valid sample with the closest position
/// (plain Euclidean, no color or normal weighting). All points are resolved in a
/// single pass over the frame.
///
/// Returns `None` when the frame has no valid sample.
pub fn nearest_valid_many<const M: usize>(
    frame: &FrameSoA,
    points: &[Vec3; M],
) -> Option<[usize; M]> {
    let best = frame
        .positions()
        .par_iter()
        .zip(frame.valid().par_iter())
        .enumerate()
        .fold(
            || [NONE; M],
            |mut acc, (i, (&position, &valid))| {
                if valid {
                    for (slot, &point) in acc.iter_mut().zip(points) {
                        let d = position.squared_distance(point);
                        if d < slot.0 {
                            *slot = (d, i);
                        }
                    }
                }
                acc
            },
        )
        .reduce(
            || [NONE; M],
            |a, b| array::from_fn(|j| closer(a[j], b[j])),
        );

    if best.iter().any(|&(_, i)| i == usize::MAX) {
        return None;
    }

    Some(best.map(|(_, i)| i))
}

pub fn nearest_valid(frame: &FrameSoA, point: Vec3) -> Option<usize> {
    nearest_valid_many(frame, &[point]).map(|[i]| i)
}
