//! Sector-sampling kernel: angular partitioning, sample placement, weighted
//! color statistics, and minimum-variance sector selection.
//!
//! The neighborhood around a pixel is split into 8 angular sectors. Each
//! sector accumulates a weighted average color and a weighted variance from
//! samples taken at integer radii along 5 sub-angles; the sector with the
//! lowest variance supplies the output color, which is what produces the
//! brush-stroke look.

use std::f32::consts::{PI, TAU};

use crate::color::luminance;
use crate::tensor::{Mat2, Vec2};

/// Number of angular sectors, one every 45 degrees.
pub const SECTOR_COUNT: usize = 8;

/// Sub-angles sampled per radius step within one sector.
pub const SUBSECTOR_SAMPLES: usize = 5;

/// Half-width of one sector's sampling fan (22.5 degrees).
pub const SECTOR_HALF_WIDTH: f32 = PI / 8.0;

/// Angular step between sub-angle samples (11.25 degrees).
pub const SUBSECTOR_STEP: f32 = PI / 16.0;

/// Polynomial weight offset; lets samples on the sector axis near the
/// origin keep nonzero weight.
pub const WEIGHT_ETA: f32 = 0.1;

/// Polynomial weight falloff across the sector axis.
pub const WEIGHT_LAMBDA: f32 = 0.5;

/// Below this total weight a sector is treated as degenerate rather than
/// risking a near-zero division propagating NaN into the image.
pub const MIN_SECTOR_WEIGHT: f32 = 1e-6;

/// Central angle of a sector.
pub fn sector_angle(sector: usize) -> f32 {
    sector as f32 * TAU / SECTOR_COUNT as f32
}

/// Directional falloff weight evaluated at a warped sample offset.
///
/// The polynomial suppresses samples far from the sector's central axis,
/// giving each sector a soft directional footprint.
pub fn polynomial_weight(x: f32, y: f32) -> f32 {
    let poly = (x + WEIGHT_ETA) - WEIGHT_LAMBDA * (y * y);
    (poly * poly).max(0.0)
}

/// Unwarped sample offsets for one sector: radii 1..=radius, each swept
/// across the sector's +-22.5 degree fan in 11.25 degree steps.
pub fn sector_offsets(sector: usize, radius: u32) -> impl Iterator<Item = Vec2> {
    let angle = sector_angle(sector);
    (1..=radius).flat_map(move |r| {
        (-2i32..=2).map(move |step| {
            let sub = angle + step as f32 * SUBSECTOR_STEP;
            Vec2::new(sub.cos(), sub.sin()).scale(r as f32)
        })
    })
}

/// Weighted running statistics for one sector.
#[derive(Clone, Copy, Debug, Default)]
pub struct SectorStats {
    color_sum: [f32; 3],
    squared_sum: [f32; 3],
    weight_sum: f32,
    samples: u32,
}

impl SectorStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one warped sample into the sector.
    pub fn add_sample(&mut self, color: [f32; 3], weight: f32) {
        for c in 0..3 {
            self.color_sum[c] += color[c] * weight;
            self.squared_sum[c] += color[c] * color[c] * weight;
        }
        self.weight_sum += weight;
        self.samples += 1;
    }

    /// Number of samples folded in, independent of their weights.
    pub fn sample_count(&self) -> u32 {
        self.samples
    }

    pub fn total_weight(&self) -> f32 {
        self.weight_sum
    }

    /// Collapse the sums into an average color and scalar variance.
    ///
    /// A sector whose total weight is effectively zero reports `fallback`
    /// with maximal variance, so it can never beat a sector that actually
    /// observed the neighborhood.
    pub fn resolve(&self, fallback: [f32; 3]) -> SectorSummary {
        if self.weight_sum < MIN_SECTOR_WEIGHT {
            return SectorSummary {
                average: fallback,
                variance: f32::MAX,
            };
        }

        let mut average = [0.0f32; 3];
        let mut variance_rgb = [0.0f32; 3];
        for c in 0..3 {
            average[c] = self.color_sum[c] / self.weight_sum;
            variance_rgb[c] = self.squared_sum[c] / self.weight_sum - average[c] * average[c];
        }

        SectorSummary {
            average,
            variance: luminance(variance_rgb),
        }
    }
}

/// One sector's resolved average color and scalar (luminance) variance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SectorSummary {
    pub average: [f32; 3],
    pub variance: f32,
}

/// Index of the minimum-variance sector. Strict comparison keeps the
/// lowest-indexed sector on ties.
pub fn select_sector(summaries: &[SectorSummary; SECTOR_COUNT]) -> usize {
    let mut best = 0;
    for (index, summary) in summaries.iter().enumerate().skip(1) {
        if summary.variance < summaries[best].variance {
            best = index;
        }
    }
    best
}

/// Accumulate one sector's statistics by warping each sample offset and
/// weighting it at its warped position. `sample` maps a pixel-space offset
/// to a linear RGB color.
pub fn sector_statistics<F>(sector: usize, radius: u32, warp: Mat2, mut sample: F) -> SectorStats
where
    F: FnMut(Vec2) -> [f32; 3],
{
    let mut stats = SectorStats::new();
    for offset in sector_offsets(sector, radius) {
        let warped = warp.mul_vec(offset);
        let color = sample(warped);
        stats.add_sample(color, polynomial_weight(warped.x, warped.y));
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_count_scales_with_radius() {
        // 8 sectors x 5 sub-angles x r radii = 40 * r visited points.
        for radius in 1..=15u32 {
            let total: usize = (0..SECTOR_COUNT)
                .map(|s| sector_offsets(s, radius).count())
                .sum();
            assert_eq!(total, 40 * radius as usize);
        }
    }

    #[test]
    fn test_sector_statistics_visits_every_offset() {
        let stats = sector_statistics(0, 4, Mat2::IDENTITY, |_| [0.5, 0.5, 0.5]);
        assert_eq!(stats.sample_count(), 4 * SUBSECTOR_SAMPLES as u32);
    }

    #[test]
    fn test_offsets_stay_within_sector_fan() {
        for sector in 0..SECTOR_COUNT {
            let angle = sector_angle(sector);
            for offset in sector_offsets(sector, 3) {
                let sample_angle = offset.y.atan2(offset.x);
                let mut delta = sample_angle - angle;
                while delta > PI {
                    delta -= TAU;
                }
                while delta < -PI {
                    delta += TAU;
                }
                assert!(delta.abs() <= SECTOR_HALF_WIDTH + 1e-4);
            }
        }
    }

    #[test]
    fn test_uniform_color_has_zero_variance() {
        let color = [0.2, 0.6, 0.9];
        let stats = sector_statistics(2, 5, Mat2::IDENTITY, |_| color);
        let summary = stats.resolve([0.0; 3]);
        for c in 0..3 {
            assert!((summary.average[c] - color[c]).abs() < 1e-5);
        }
        assert!(summary.variance.abs() < 1e-5);
    }

    #[test]
    fn test_mixed_colors_have_positive_variance() {
        let mut flip = false;
        let stats = sector_statistics(0, 4, Mat2::IDENTITY, |_| {
            flip = !flip;
            if flip {
                [1.0, 1.0, 1.0]
            } else {
                [0.0, 0.0, 0.0]
            }
        });
        let summary = stats.resolve([0.0; 3]);
        assert!(summary.variance > 0.0);
    }

    #[test]
    fn test_degenerate_sector_reports_fallback() {
        let mut stats = SectorStats::new();
        stats.add_sample([1.0, 0.0, 0.0], 0.0);
        let summary = stats.resolve([0.3, 0.3, 0.3]);
        assert_eq!(summary.average, [0.3, 0.3, 0.3]);
        assert_eq!(summary.variance, f32::MAX);
    }

    #[test]
    fn test_tie_break_keeps_lowest_sector() {
        let tied = SectorSummary {
            average: [0.1, 0.1, 0.1],
            variance: 0.25,
        };
        let mut summaries = [tied; SECTOR_COUNT];
        summaries[3].average = [0.9, 0.9, 0.9];
        // Sector 3 ties sector 0 exactly; sector 0 must win.
        assert_eq!(select_sector(&summaries), 0);

        // A strictly lower variance anywhere must still win.
        summaries[5].variance = 0.1;
        assert_eq!(select_sector(&summaries), 5);
    }

    #[test]
    fn test_polynomial_weight_falloff() {
        // On-axis samples outweigh off-axis samples at the same x.
        assert!(polynomial_weight(1.0, 0.0) > polynomial_weight(1.0, 1.0));
        // Never negative.
        assert!(polynomial_weight(-2.0, 3.0) >= 0.0);
    }
}
