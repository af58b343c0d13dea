use bramble_core::{TrajectoryPoint, TrajectorySummary};

use crate::distribution;

const MIN_POINTS: usize = 3;

/// Turns tighter than this are "smooth" (near-collinear) continuations.
const SMOOTH_ANGLE_RAD: f64 = 0.1;

/// Moderate direction changes land in this band and read as human
/// micro-corrections. The band deliberately overlaps the smooth
/// threshold between 0.09 and 0.1: a borderline turn counts as both.
const CORRECTION_ANGLE_MIN_RAD: f64 = 0.09;
const CORRECTION_ANGLE_MAX_RAD: f64 = 0.52;

/// Computes path length and turn-angle geometry over an ordered cursor
/// trajectory, plus an interval distribution when timestamps exist.
pub fn analyze(points: &[TrajectoryPoint]) -> TrajectorySummary {
    if points.len() < MIN_POINTS {
        return TrajectorySummary::invalid();
    }

    let mut distance = 0.0f64;
    for pair in points.windows(2) {
        distance += ((pair[1].x - pair[0].x).powi(2) + (pair[1].y - pair[0].y).powi(2)).sqrt();
    }

    let mut smooth = 0usize;
    let mut corrections = 0usize;
    for i in 2..points.len() {
        let (ax, ay) = (
            points[i - 1].x - points[i - 2].x,
            points[i - 1].y - points[i - 2].y,
        );
        let (bx, by) = (points[i].x - points[i - 1].x, points[i].y - points[i - 1].y);

        let mag_a = (ax * ax + ay * ay).sqrt();
        let mag_b = (bx * bx + by * by).sqrt();
        if mag_a == 0.0 || mag_b == 0.0 {
            continue;
        }

        let cos = ((ax * bx + ay * by) / (mag_a * mag_b)).clamp(-1.0, 1.0);
        let angle = cos.acos();

        if angle < SMOOTH_ANGLE_RAD {
            smooth += 1;
        }
        if angle > CORRECTION_ANGLE_MIN_RAD && angle < CORRECTION_ANGLE_MAX_RAD {
            corrections += 1;
        }
    }

    let interior = (points.len() - 2) as f64;
    let intervals = if points.len() > 3 && points[0].t.is_some() {
        let deltas: Vec<f64> = points
            .windows(2)
            .map(|pair| pair[1].t.unwrap_or(0.0) - pair[0].t.unwrap_or(0.0))
            .collect();
        Some(distribution::analyze(&deltas))
    } else {
        None
    };

    TrajectorySummary {
        valid: true,
        points: points.len(),
        distance: distance.round() as i64,
        smooth_ratio: round2(smooth as f64 / interior),
        correction_ratio: round2(corrections as f64 / interior),
        intervals,
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(x: f64, y: f64) -> TrajectoryPoint {
        TrajectoryPoint { x, y, t: None }
    }

    fn timed(x: f64, y: f64, t: f64) -> TrajectoryPoint {
        TrajectoryPoint { x, y, t: Some(t) }
    }

    #[test]
    fn too_few_points_is_invalid() {
        let summary = analyze(&[point(0.0, 0.0), point(10.0, 0.0)]);
        assert!(!summary.valid);
        assert_eq!(summary.points, 0);
        assert_eq!(summary.distance, 0);
    }

    #[test]
    fn collinear_points_are_perfectly_smooth() {
        let summary = analyze(&[point(0.0, 0.0), point(10.0, 0.0), point(20.0, 0.0)]);
        assert!(summary.valid);
        assert_eq!(summary.distance, 20);
        assert_eq!(summary.smooth_ratio, 1.0);
        assert_eq!(summary.correction_ratio, 0.0);
    }

    #[test]
    fn right_angle_turns_are_neither_smooth_nor_corrections() {
        let summary = analyze(&[
            point(0.0, 0.0),
            point(10.0, 0.0),
            point(10.0, 10.0),
            point(20.0, 10.0),
        ]);
        assert_eq!(summary.smooth_ratio, 0.0);
        assert_eq!(summary.correction_ratio, 0.0);
        assert_eq!(summary.distance, 30);
    }

    #[test]
    fn borderline_angle_counts_as_both_smooth_and_correction() {
        // ~0.095 rad turn sits inside the deliberate overlap band
        let angle = 0.095f64;
        let summary = analyze(&[
            point(0.0, 0.0),
            point(100.0, 0.0),
            point(100.0 + 100.0 * angle.cos(), 100.0 * angle.sin()),
        ]);
        assert_eq!(summary.smooth_ratio, 1.0);
        assert_eq!(summary.correction_ratio, 1.0);
    }

    #[test]
    fn repeated_points_are_skipped_not_divided_by_zero() {
        let summary = analyze(&[
            point(0.0, 0.0),
            point(0.0, 0.0),
            point(10.0, 0.0),
            point(20.0, 0.0),
        ]);
        assert!(summary.valid);
        // interior count stays n-2 even though two turns were skipped
        assert_eq!(summary.smooth_ratio, 0.5);
    }

    #[test]
    fn timestamps_produce_an_interval_summary() {
        let summary = analyze(&[
            timed(0.0, 0.0, 0.0),
            timed(10.0, 0.0, 16.0),
            timed(20.0, 0.0, 32.0),
            timed(30.0, 0.0, 48.0),
            timed(40.0, 0.0, 64.0),
        ]);
        let intervals = summary.intervals.unwrap();
        assert!(intervals.valid);
        assert!(intervals.is_uniform);
        assert_eq!(intervals.mean, 16.0);
    }

    #[test]
    fn exactly_three_points_skip_interval_analysis() {
        let summary = analyze(&[
            timed(0.0, 0.0, 0.0),
            timed(10.0, 0.0, 16.0),
            timed(20.0, 0.0, 32.0),
        ]);
        assert!(summary.intervals.is_none());
    }
}
