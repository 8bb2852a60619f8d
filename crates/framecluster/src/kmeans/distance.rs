use crate::types::Features;

/// Weight of the color term (α). Position gets `1 - α`, so color only breaks
/// ties between spatially close samples.
pub const DEFAULT_COLOR_WEIGHT: f32 = 0.003_329_315_8;
/// Weight of the orientation penalty, which lies in `[0, 2w]`.
pub const DEFAULT_NORMAL_WEIGHT: f32 = 1e-4;

/// Which optional terms take part in a distance evaluation.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Terms {
    pub color: bool,
    pub normal: bool,
}

impl Terms {
    pub const ALL: Self = Self {
        color: true,
        normal: true,
    };
    pub const POSITION_ONLY: Self = Self {
        color: false,
        normal: false,
    };
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DistanceWeights {
    /// γ
    pub position: f32,
    /// α
    pub color: f32,
    pub normal: f32,
}

impl Default for DistanceWeights {
    fn default() -> Self {
        Self::from_color_weight(DEFAULT_COLOR_WEIGHT)
    }
}

impl DistanceWeights {
    /// Weights with `position = 1 - color`.
    pub fn from_color_weight(color: f32) -> Self {
        Self {
            position: 1.0 - color,
            color,
            normal: DEFAULT_NORMAL_WEIGHT,
        }
    }

    /// Weighted dissimilarity between a sample `a` and a representative `b`.
    ///
    /// Without the color term this is `γ·|pa - pb|`, the same scaling the color
    /// branch applies to position. The orientation penalty is only added when
    /// `a` has a non-zero normal, so the metric is not symmetric: callers pass the
    /// sample first and the representative second.
    #[inline(always)]
    pub fn distance(&self, a: &Features, b: &Features, terms: Terms) -> f32 {
        let p2 = a.position.squared_distance(b.position);
        let gamma2 = self.position * self.position;

        let mut dist = if terms.color {
            let c2 = a.color.squared_distance(b.color);
            let alpha2 = self.color * self.color;
            gamma2.mul_add(p2, alpha2 * c2).sqrt()
        } else {
            (gamma2 * p2).sqrt()
        };

        if terms.normal && !a.normal.is_zero() {
            dist += self.normal * (1.0 - a.normal.dot(b.normal));
        }

        dist
    }
}
