use crate::types::{NUM_CLUSTERS, Vec3};

pub mod distance;
pub mod lloyds;
pub mod plus_plus_init;
pub mod snap;
pub mod uniform_init;

// References:
// - k-means++: The Advantages of Careful Seeding (D. Arthur, S. Vassilvitskii)
// - Noisy, Greedy and Not so Greedy k-Means++ (A. Bhattacharya et al)
//   https://drops.dagstuhl.de/storage/00lipics/lipics-vol173-esa2020/LIPIcs.ESA.2020.18/LIPIcs.ESA.2020.18.pdf
//
// Observations:
// - One Lloyd step per frame is enough once the centers are warm; consecutive depth
//   frames barely move, so convergence is spread over the stream.

/// Cluster centers, one position per cluster.
pub type Representatives = [Vec3; NUM_CLUSTERS];

/// Samples processed by one rayon task in the per-sample passes.
pub const CHUNK_SIZE: usize = 16 * 1024;
