//! On-the-fly trajectory generation between two poses.
//!
//! The path is a cubic hermite segment using each pose's heading as its
//! tangent direction, re-parameterized by arc length and profiled with a
//! trapezoidal (or, on short paths, triangular) speed profile.

use alloc::vec::Vec;

use snafu::Snafu;

use crate::geometry::{wrap_angle, Pose2d, Rotation2d, Translation2d};
use crate::trajectory::{Trajectory, TrajectoryState};

/// Kinematic limits applied while profiling a generated path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectoryConfig {
    pub max_velocity: f64,
    pub max_acceleration: f64,
}

impl TrajectoryConfig {
    pub fn new(max_velocity: f64, max_acceleration: f64) -> Self {
        Self {
            max_velocity,
            max_acceleration,
        }
    }
}

#[derive(Debug, Snafu)]
pub enum GenerationError {
    #[snafu(display("trajectory limits must be positive"))]
    InvalidLimits,
    #[snafu(display("start and end poses are coincident"))]
    ZeroLengthPath,
}

/// Number of samples along the hermite segment.
const SAMPLES: usize = 100;

/// Generate a trajectory from `start` to `end` honoring `config`'s limits.
/// The robot leaves `start` along its heading and arrives at `end` along its
/// heading, starting and ending at rest.
pub fn generate(
    start: Pose2d,
    end: Pose2d,
    config: &TrajectoryConfig,
) -> Result<Trajectory, GenerationError> {
    if config.max_velocity <= 0.0 || config.max_acceleration <= 0.0 {
        return Err(GenerationError::InvalidLimits);
    }

    let chord = start.translation.distance(&end.translation);
    if chord < 1e-6 {
        return Err(GenerationError::ZeroLengthPath);
    }

    // Tangent magnitudes equal to the chord keep the segment well behaved.
    let tangent_start = Translation2d::new(chord * start.rotation.cos(), chord * start.rotation.sin());
    let tangent_end = Translation2d::new(chord * end.rotation.cos(), chord * end.rotation.sin());

    let mut points = Vec::with_capacity(SAMPLES);
    let mut headings = Vec::with_capacity(SAMPLES);
    for i in 0..SAMPLES {
        let u = i as f64 / (SAMPLES - 1) as f64;
        points.push(hermite_point(
            start.translation,
            tangent_start,
            end.translation,
            tangent_end,
            u,
        ));
        let derivative = hermite_derivative(
            start.translation,
            tangent_start,
            end.translation,
            tangent_end,
            u,
        );
        headings.push(if derivative.norm() > 1e-9 {
            libm::atan2(derivative.y, derivative.x)
        } else {
            start.rotation.radians()
        });
    }

    let mut arc_lengths = Vec::with_capacity(SAMPLES);
    arc_lengths.push(0.0);
    for i in 1..SAMPLES {
        let segment = points[i].distance(&points[i - 1]);
        arc_lengths.push(arc_lengths[i - 1] + segment);
    }
    let total_length = arc_lengths[SAMPLES - 1];

    // Trapezoidal profile: accelerate from rest, cruise at the velocity cap,
    // decelerate to rest; the three constraints intersect on short paths.
    let mut velocities = Vec::with_capacity(SAMPLES);
    for &s in &arc_lengths {
        let accel_limited = libm::sqrt(2.0 * config.max_acceleration * s);
        let decel_limited = libm::sqrt(2.0 * config.max_acceleration * (total_length - s));
        velocities.push(accel_limited.min(decel_limited).min(config.max_velocity));
    }

    let mut states = Vec::with_capacity(SAMPLES);
    let mut time = 0.0;
    for i in 0..SAMPLES {
        if i > 0 {
            let ds = arc_lengths[i] - arc_lengths[i - 1];
            let average = (velocities[i] + velocities[i - 1]) / 2.0;
            time += ds / average.max(1e-6);
        }

        let curvature = if i > 0 {
            let ds = arc_lengths[i] - arc_lengths[i - 1];
            if ds > 1e-9 {
                wrap_angle(headings[i] - headings[i - 1]) / ds
            } else {
                0.0
            }
        } else {
            0.0
        };

        states.push(TrajectoryState {
            time,
            velocity: velocities[i],
            acceleration: 0.0,
            pose: Pose2d {
                translation: points[i],
                rotation: Rotation2d::new(headings[i]),
            },
            curvature,
        });
    }

    // Back-fill accelerations from the profiled velocities.
    for i in 0..SAMPLES - 1 {
        let dt = states[i + 1].time - states[i].time;
        states[i].acceleration = if dt > 1e-9 {
            (states[i + 1].velocity - states[i].velocity) / dt
        } else {
            0.0
        };
    }

    Ok(Trajectory::from_validated(states))
}

fn hermite_point(
    p0: Translation2d,
    t0: Translation2d,
    p1: Translation2d,
    t1: Translation2d,
    u: f64,
) -> Translation2d {
    let u2 = u * u;
    let u3 = u2 * u;
    let h00 = 2.0 * u3 - 3.0 * u2 + 1.0;
    let h10 = u3 - 2.0 * u2 + u;
    let h01 = -2.0 * u3 + 3.0 * u2;
    let h11 = u3 - u2;
    Translation2d::new(
        h00 * p0.x + h10 * t0.x + h01 * p1.x + h11 * t1.x,
        h00 * p0.y + h10 * t0.y + h01 * p1.y + h11 * t1.y,
    )
}

fn hermite_derivative(
    p0: Translation2d,
    t0: Translation2d,
    p1: Translation2d,
    t1: Translation2d,
    u: f64,
) -> Translation2d {
    let u2 = u * u;
    let h00 = 6.0 * u2 - 6.0 * u;
    let h10 = 3.0 * u2 - 4.0 * u + 1.0;
    let h01 = -6.0 * u2 + 6.0 * u;
    let h11 = 3.0 * u2 - 2.0 * u;
    Translation2d::new(
        h00 * p0.x + h10 * t0.x + h01 * p1.x + h11 * t1.x,
        h00 * p0.y + h10 * t0.y + h01 * p1.y + h11 * t1.y,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> TrajectoryConfig {
        TrajectoryConfig::new(1.2, 0.8)
    }

    #[test]
    fn rejects_bad_limits_and_degenerate_paths() {
        let start = Pose2d::default();
        let end = Pose2d::new(2.0, 0.0, 0.0);
        assert!(matches!(
            generate(start, end, &TrajectoryConfig::new(0.0, 1.0)),
            Err(GenerationError::InvalidLimits)
        ));
        assert!(matches!(
            generate(start, start, &config()),
            Err(GenerationError::ZeroLengthPath)
        ));
    }

    #[test]
    fn straight_path_hits_both_endpoints() {
        let start = Pose2d::default();
        let end = Pose2d::new(2.0, 0.0, 0.0);
        let trajectory = generate(start, end, &config()).unwrap();

        let first = trajectory.states()[0];
        let last = trajectory.states()[trajectory.states().len() - 1];
        assert!(first.pose.translation.distance(&start.translation) < 1e-6);
        assert!(last.pose.translation.distance(&end.translation) < 1e-6);
        assert!(first.velocity.abs() < 1e-9);
        assert!(last.velocity.abs() < 1e-9);
    }

    #[test]
    fn profile_respects_limits_and_time_increases() {
        let start = Pose2d::default();
        let end = Pose2d::new(3.0, 1.0, 0.0);
        let trajectory = generate(start, end, &config()).unwrap();

        let mut previous_time = -1.0;
        for state in trajectory.states() {
            assert!(state.velocity <= config().max_velocity + 1e-9);
            assert!(state.time > previous_time || state.time == 0.0);
            previous_time = state.time;
        }
        assert!(trajectory.total_time() > 0.0);
    }

    #[test]
    fn curved_path_reports_curvature() {
        // 90 degree turn: leave east, arrive north.
        let start = Pose2d::default();
        let end = Pose2d::new(1.0, 1.0, core::f64::consts::FRAC_PI_2);
        let trajectory = generate(start, end, &config()).unwrap();

        let curved = trajectory
            .states()
            .iter()
            .any(|state| state.curvature.abs() > 0.1);
        assert!(curved);
    }
}
