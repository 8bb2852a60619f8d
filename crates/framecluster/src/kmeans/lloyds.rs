use super::distance::{DistanceWeights, Terms};
use super::{CHUNK_SIZE, Representatives, snap};
use crate::frame::FrameSoA;
use crate::membership::{self, Votes};
use crate::types::{Features, NUM_CLUSTERS, Vec3};
use rayon::prelude::*;

/// Per-cluster position sums and counts of one chunk of samples, merged after
/// the assignment pass.
#[derive(Debug, Copy, Clone, Default)]
pub struct PartialSums {
    sums: [[f64; 3]; NUM_CLUSTERS],
    counts: [u32; NUM_CLUSTERS],
}

impl PartialSums {
    #[inline(always)]
    fn add(&mut self, cluster: usize, position: Vec3) {
        let sum = &mut self.sums[cluster];
        sum[0] += position.x as f64;
        sum[1] += position.y as f64;
        sum[2] += position.z as f64;
        self.counts[cluster] += 1;
    }

    fn merge(mut self, other: Self) -> Self {
        for j in 0..NUM_CLUSTERS {
            for axis in 0..3 {
                self.sums[j][axis] += other.sums[j][axis];
            }
            self.counts[j] += other.counts[j];
        }
        self
    }

    pub fn counts(&self) -> [u32; NUM_CLUSTERS] {
        self.counts
    }
}

#[derive(Debug, Clone)]
pub struct StepReport {
    /// Sample index each representative snapped to at the start of the step.
    pub snapped: [usize; NUM_CLUSTERS],
    /// Feature tuples the samples were compared against.
    pub snapped_features: [Features; NUM_CLUSTERS],
    /// Samples assigned to each cluster.
    pub counts: [u32; NUM_CLUSTERS],
    pub valid: usize,
    /// Squared distance the representatives moved from their snapped positions,
    /// summed over clusters.
    pub shift_squared: f32,
}

impl StepReport {
    pub fn empty_clusters(&self) -> usize {
        self.counts.iter().filter(|&&c| c == 0).count()
    }
}

/// Nearest representative under the full metric. Ties go to the lower index.
#[inline(always)]
pub fn nearest_representative(
    weights: &DistanceWeights,
    sample: &Features,
    representatives: &[Features; NUM_CLUSTERS],
) -> usize {
    let mut min = f32::MAX;
    let mut min_idx = 0;
    for (j, representative) in representatives.iter().enumerate() {
        let d = weights.distance(sample, representative, Terms::ALL);
        if d < min {
            min = d;
            min_idx = j;
        }
    }
    min_idx
}

/// Labels every valid sample with its nearest representative and records the
/// vote in its membership vector. Invalid samples are left untouched.
///
/// Each rayon task owns a disjoint chunk of `labels` and `membership` and
/// returns its own partial sums; they are reduced before this returns.
pub fn assign_points(
    frame: &FrameSoA,
    weights: &DistanceWeights,
    representatives: &[Features; NUM_CLUSTERS],
    labels: &mut [u8],
    membership: &mut [Votes],
) -> PartialSums {
    assert_eq!(labels.len(), frame.len());
    assert_eq!(membership.len(), frame.len());

    let valid = frame.valid();

    labels
        .par_chunks_mut(CHUNK_SIZE)
        .zip(membership.par_chunks_mut(CHUNK_SIZE))
        .enumerate()
        .map(|(chunk, (labels, votes))| {
            let offset = chunk * CHUNK_SIZE;
            let mut partial = PartialSums::default();

            for (j, (label, votes)) in labels.iter_mut().zip(votes.iter_mut()).enumerate() {
                let i = offset + j;
                if !valid[i] {
                    continue;
                }

                let sample = frame.features(i);
                let cluster = nearest_representative(weights, &sample, representatives);

                *label = cluster as u8;
                membership::vote(votes, cluster);
                partial.add(cluster, sample.position);
            }

            partial
        })
        .reduce(PartialSums::default, PartialSums::merge)
}

/// Moves each representative to the mean position of its samples. A cluster
/// that got no samples goes to the origin.
///
/// Returns the summed squared shift relative to `snapped`.
pub fn update_centroids(
    partial: &PartialSums,
    snapped: &[Features; NUM_CLUSTERS],
    representatives: &mut Representatives,
) -> f32 {
    let mut shift_squared = 0f32;

    for j in 0..NUM_CLUSTERS {
        let count = partial.counts[j];
        let new = if count == 0 {
            Vec3::ZERO
        } else {
            let [x, y, z] = partial.sums[j].map(|s| (s / count as f64) as f32);
            Vec3::new(x, y, z)
        };

        shift_squared += new.squared_distance(snapped[j].position);
        representatives[j] = new;
    }

    shift_squared
}

/// One incremental Lloyd step: snap, assign, re-center.
///
/// Returns `None`, leaving every argument untouched, when the frame has no
/// valid sample.
pub fn step(
    frame: &FrameSoA,
    weights: &DistanceWeights,
    representatives: &mut Representatives,
    labels: &mut [u8],
    membership: &mut [Votes],
) -> Option<StepReport> {
    let snapped = snap::nearest_valid_many(frame, representatives)?;
    let snapped_features = snapped.map(|i| frame.features(i));

    let partial = assign_points(frame, weights, &snapped_features, labels, membership);
    let counts = partial.counts();
    let valid = counts.iter().map(|&c| c as usize).sum();

    let shift_squared = update_centroids(&partial, &snapped_features, representatives);

    Some(StepReport {
        snapped,
        snapped_features,
        counts,
        valid,
        shift_squared,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Sample;
    use pretty_assertions::assert_eq;

    const N_PER_CLUSTER: usize = 4096;
    const CENTERS: [(f32, f32, f32); 4] = [
        (0.0, 0.0, 0.0),
        (10.0, 0.0, 0.0),
        (0.0, 10.0, 0.0),
        (0.0, 0.0, 10.0),
    ];

    fn make_four_cluster_frame() -> FrameSoA {
        let n = N_PER_CLUSTER * 4;
        let mut frame = FrameSoA::new(N_PER_CLUSTER as u16, 4).unwrap();
        let positions = frame.positions_mut();
        for (ci, &(cx, cy, cz)) in CENTERS.iter().enumerate() {
            for i in 0..N_PER_CLUSTER {
                let offset = i as f32 * 0.0001;
                positions[ci * N_PER_CLUSTER + i] = Vec3::new(cx + offset, cy + offset, cz + offset);
            }
        }
        frame.valid_mut().fill(true);
        assert_eq!(frame.len(), n);
        frame
    }

    fn state(n: usize) -> (Vec<u8>, Vec<Votes>) {
        (vec![0u8; n], vec![[0.0; NUM_CLUSTERS]; n])
    }

    fn at(x: f32, y: f32, z: f32) -> Features {
        Features {
            position: Vec3::new(x, y, z),
            ..Default::default()
        }
    }

    #[test]
    fn test_assign_points() {
        let frame = make_four_cluster_frame();
        let (mut labels, mut membership) = state(frame.len());
        let representatives = CENTERS.map(|(x, y, z)| at(x, y, z));

        let partial = assign_points(
            &frame,
            &DistanceWeights::default(),
            &representatives,
            &mut labels,
            &mut membership,
        );

        // Each cluster's points should all get the cluster's own label
        for ci in 0..4 {
            let start = ci * N_PER_CLUSTER;
            let end = start + N_PER_CLUSTER;
            assert!(
                labels[start..end].iter().all(|&a| a == ci as u8),
                "cluster {ci}: not all points assigned to the same centroid",
            );
            assert!(
                membership[start..end]
                    .iter()
                    .all(|v| v[ci] == 1.0 && v.iter().sum::<f32>() == 1.0),
            );
        }
        assert_eq!(partial.counts(), [N_PER_CLUSTER as u32; 4]);
    }

    #[test]
    fn test_update_centroids() {
        let frame = make_four_cluster_frame();
        let (mut labels, mut membership) = state(frame.len());
        let snapped = CENTERS.map(|(x, y, z)| at(x, y, z));
        let partial = assign_points(
            &frame,
            &DistanceWeights::default(),
            &snapped,
            &mut labels,
            &mut membership,
        );

        // Start representatives far away
        let mut representatives = [Vec3::new(99.0, 99.0, 99.0); NUM_CLUSTERS];
        let shift_squared = update_centroids(&partial, &snapped, &mut representatives);

        // Per-cluster offsets are 0..4096 * 0.0001, so mean offset ~0.2.
        for (i, &(cx, cy, cz)) in CENTERS.iter().enumerate() {
            let r = representatives[i];
            assert!((r.x - cx).abs() < 0.3, "centroid {i} x: expected ~{cx}, got {}", r.x);
            assert!((r.y - cy).abs() < 0.3, "centroid {i} y: expected ~{cy}, got {}", r.y);
            assert!((r.z - cz).abs() < 0.3, "centroid {i} z: expected ~{cz}, got {}", r.z);
        }
        assert!(shift_squared > 0.0);
    }

    #[test]
    fn labels_are_argmin_over_snapped_representatives() {
        // Scattered samples with colors and normals so every term matters
        let mut rng = crate::rng::new();
        use rand::RngExt;
        let samples: Vec<Sample> = (0..2000)
            .map(|i| Sample {
                position: Vec3::new(rng.random(), rng.random(), rng.random()),
                color: Vec3::new(
                    rng.random_range(0.0..255.0),
                    rng.random_range(0.0..255.0),
                    rng.random_range(0.0..255.0),
                ),
                normal: if i % 5 == 0 {
                    Vec3::ZERO
                } else {
                    Vec3::new(0.0, 0.0, 1.0)
                },
                valid: i % 7 != 0,
            })
            .collect();
        let frame = FrameSoA::from_samples(100, 20, &samples).unwrap();
        let weights = DistanceWeights::default();

        let mut representatives = [
            Vec3::new(0.1, 0.1, 0.1),
            Vec3::new(0.9, 0.1, 0.5),
            Vec3::new(0.5, 0.9, 0.2),
            Vec3::new(0.5, 0.5, 0.9),
        ];
        let (mut labels, mut membership) = state(frame.len());
        let report = step(
            &frame,
            &weights,
            &mut representatives,
            &mut labels,
            &mut membership,
        )
        .unwrap();

        for i in 0..frame.len() {
            if !frame.valid()[i] {
                assert_eq!(labels[i], 0, "invalid sample {i} must not be labeled");
                continue;
            }
            let sample = frame.features(i);
            let expected = report
                .snapped_features
                .iter()
                .map(|r| weights.distance(&sample, r, Terms::ALL))
                .enumerate()
                .fold((0, f32::MAX), |best, (j, d)| if d < best.1 { (j, d) } else { best })
                .0;
            assert_eq!(labels[i] as usize, expected, "sample {i}");
        }

        // Every snapped representative is a real valid sample
        for (j, &idx) in report.snapped.iter().enumerate() {
            assert!(frame.valid()[idx]);
            assert_eq!(report.snapped_features[j], frame.features(idx));
        }
    }

    #[test]
    fn representatives_are_label_means_or_origin() {
        // Two tight groups, four representatives: two clusters end up empty
        let positions: Vec<Vec3> = (0..50)
            .map(|i| {
                let base = if i < 25 { 0.0 } else { 5.0 };
                Vec3::new(base + (i % 5) as f32 * 0.01, 1.0, 1.0)
            })
            .collect();
        let frame = crate::frame::from_positions(&positions);
        let mut representatives = [
            Vec3::new(0.0, 1.0, 1.0),
            Vec3::new(5.0, 1.0, 1.0),
            Vec3::new(0.0, 1.0, 1.0),
            Vec3::new(100.0, 100.0, 100.0),
        ];
        let (mut labels, mut membership) = state(frame.len());
        let report = step(
            &frame,
            &DistanceWeights::default(),
            &mut representatives,
            &mut labels,
            &mut membership,
        )
        .unwrap();

        // Representative 2 snaps to the same sample as 0 and loses every tie;
        // representative 3 snaps to the far end of the second group.
        assert_eq!(report.counts[2], 0);
        assert_eq!(representatives[2], Vec3::ZERO);

        for j in 0..NUM_CLUSTERS {
            let members: Vec<Vec3> = (0..frame.len())
                .filter(|&i| labels[i] as usize == j)
                .map(|i| positions[i])
                .collect();
            assert_eq!(members.len(), report.counts[j] as usize);
            if members.is_empty() {
                assert_eq!(representatives[j], Vec3::ZERO);
            } else {
                let mean = members.iter().fold(Vec3::ZERO, |acc, &p| acc + p) / members.len() as f32;
                assert!(
                    representatives[j].squared_distance(mean) < 1e-8,
                    "cluster {j}: {:?} vs {mean:?}",
                    representatives[j]
                );
            }
        }
        assert_eq!(report.valid, 50);
        assert_eq!(report.empty_clusters(), report.counts.iter().filter(|&&c| c == 0).count());
    }

    #[test]
    fn all_invalid_leaves_state_untouched() {
        let frame = FrameSoA::new(8, 8).unwrap();
        let original = [
            Vec3::new(1.0, 2.0, 3.0),
            Vec3::new(4.0, 5.0, 6.0),
            Vec3::new(7.0, 8.0, 9.0),
            Vec3::ZERO,
        ];
        let mut representatives = original;
        let (mut labels, mut membership) = state(frame.len());
        labels.fill(3);

        let report = step(
            &frame,
            &DistanceWeights::default(),
            &mut representatives,
            &mut labels,
            &mut membership,
        );
        assert!(report.is_none());
        assert_eq!(representatives, original);
        assert!(labels.iter().all(|&l| l == 3));
        assert!(membership.iter().all(|v| *v == [0.0; NUM_CLUSTERS]));
    }

    #[test]
    fn origin_representatives_still_step() {
        let frame = make_four_cluster_frame();
        let mut representatives = [Vec3::ZERO; NUM_CLUSTERS];
        let (mut labels, mut membership) = state(frame.len());

        let report = step(
            &frame,
            &DistanceWeights::default(),
            &mut representatives,
            &mut labels,
            &mut membership,
        )
        .unwrap();

        // All four snap to sample 0 and cluster 0 wins every tie
        assert_eq!(report.snapped, [0; NUM_CLUSTERS]);
        assert_eq!(report.counts[0] as usize, frame.len());
        assert_eq!(&representatives[1..], &[Vec3::ZERO; 3]);
    }
}
