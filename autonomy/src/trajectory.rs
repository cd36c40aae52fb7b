//! Time-parameterized paths and the PathWeaver `.wpilib.json` interchange
//! format.
//!
//! A trajectory is a list of timestamped states produced by path-planning
//! tooling (or by [`crate::generator`] at runtime). Loading never panics:
//! malformed input comes back as a [`TrajectoryError`] so the caller can
//! report it and keep running.

use alloc::{
    string::{String, ToString},
    vec::Vec,
};

use serde::Deserialize;
use snafu::Snafu;

use crate::geometry::Pose2d;

/// One sample of a trajectory: where the robot should be at `time` seconds
/// from the start, and how fast it should be moving through that point.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct TrajectoryState {
    /// Seconds since the start of the trajectory.
    pub time: f64,
    /// Longitudinal velocity, m/s.
    pub velocity: f64,
    /// Longitudinal acceleration, m/s^2.
    pub acceleration: f64,
    pub pose: Pose2d,
    /// Path curvature, rad/m.
    pub curvature: f64,
}

#[derive(Debug, Snafu)]
pub enum TrajectoryError {
    #[snafu(display("trajectory contains no states"))]
    Empty,
    #[snafu(display("trajectory timestamps decrease at state {index}"))]
    OutOfOrder { index: usize },
    #[snafu(display("malformed trajectory json: {message}"))]
    Malformed { message: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    states: Vec<TrajectoryState>,
}

impl Trajectory {
    pub fn from_states(states: Vec<TrajectoryState>) -> Result<Self, TrajectoryError> {
        if states.is_empty() {
            return Err(TrajectoryError::Empty);
        }
        for (index, pair) in states.windows(2).enumerate() {
            if pair[1].time < pair[0].time {
                return Err(TrajectoryError::OutOfOrder { index: index + 1 });
            }
        }
        Ok(Self { states })
    }

    /// Parse a PathWeaver-style `.wpilib.json` document: a JSON array of
    /// states with poses as `translation` + `rotation.radians`.
    pub fn from_json(json: &str) -> Result<Self, TrajectoryError> {
        let states: Vec<TrajectoryState> =
            serde_json::from_str(json).map_err(|error| TrajectoryError::Malformed {
                message: error.to_string(),
            })?;
        Self::from_states(states)
    }

    /// Construction for states already known to be non-empty and ordered.
    pub(crate) fn from_validated(states: Vec<TrajectoryState>) -> Self {
        debug_assert!(!states.is_empty());
        Self { states }
    }

    pub fn states(&self) -> &[TrajectoryState] {
        &self.states
    }

    pub fn initial_pose(&self) -> Pose2d {
        self.states[0].pose
    }

    /// Duration of the trajectory in seconds.
    pub fn total_time(&self) -> f64 {
        self.states[self.states.len() - 1].time
    }

    /// Sample the trajectory at `time` seconds, clamping to the endpoints and
    /// interpolating linearly between neighboring states.
    pub fn sample(&self, time: f64) -> TrajectoryState {
        let first = self.states[0];
        let last = self.states[self.states.len() - 1];
        if time <= first.time {
            return first;
        }
        if time >= last.time {
            return last;
        }

        let upper = self.states.partition_point(|state| state.time < time);
        let after = self.states[upper];
        let before = self.states[upper - 1];

        let span = after.time - before.time;
        if span <= f64::EPSILON {
            return after;
        }
        let t = (time - before.time) / span;

        TrajectoryState {
            time,
            velocity: before.velocity + (after.velocity - before.velocity) * t,
            acceleration: before.acceleration + (after.acceleration - before.acceleration) * t,
            curvature: before.curvature + (after.curvature - before.curvature) * t,
            pose: Pose2d {
                translation: before
                    .pose
                    .translation
                    .interpolate(&after.pose.translation, t),
                rotation: before.pose.rotation.interpolate(after.pose.rotation, t),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WPILIB_JSON: &str = r#"[
        {"time": 0.0, "velocity": 0.0, "acceleration": 1.0, "curvature": 0.0,
         "pose": {"translation": {"x": 0.0, "y": 0.0}, "rotation": {"radians": 0.0}}},
        {"time": 1.0, "velocity": 1.0, "acceleration": 0.0, "curvature": 0.0,
         "pose": {"translation": {"x": 0.5, "y": 0.0}, "rotation": {"radians": 0.0}}},
        {"time": 2.0, "velocity": 0.0, "acceleration": -1.0, "curvature": 0.0,
         "pose": {"translation": {"x": 1.0, "y": 0.0}, "rotation": {"radians": 0.0}}}
    ]"#;

    #[test]
    fn loads_pathweaver_json() {
        let trajectory = Trajectory::from_json(WPILIB_JSON).unwrap();
        assert_eq!(trajectory.states().len(), 3);
        assert_eq!(trajectory.total_time(), 2.0);
        assert_eq!(trajectory.initial_pose(), Pose2d::default());
    }

    #[test]
    fn malformed_json_is_an_error_not_a_panic() {
        assert!(matches!(
            Trajectory::from_json("definitely not json"),
            Err(TrajectoryError::Malformed { .. })
        ));
        // Wrong shape: an object instead of an array of states.
        assert!(matches!(
            Trajectory::from_json(r#"{"states": []}"#),
            Err(TrajectoryError::Malformed { .. })
        ));
        // A state missing its pose.
        assert!(matches!(
            Trajectory::from_json(r#"[{"time": 0.0, "velocity": 0.0, "acceleration": 0.0, "curvature": 0.0}]"#),
            Err(TrajectoryError::Malformed { .. })
        ));
    }

    #[test]
    fn empty_document_is_rejected() {
        assert!(matches!(
            Trajectory::from_json("[]"),
            Err(TrajectoryError::Empty)
        ));
    }

    #[test]
    fn decreasing_timestamps_are_rejected() {
        let states = Trajectory::from_json(WPILIB_JSON).unwrap().states().to_vec();
        let mut reversed = states;
        reversed.swap(0, 2);
        assert!(matches!(
            Trajectory::from_states(reversed),
            Err(TrajectoryError::OutOfOrder { index: 1 })
        ));
    }

    #[test]
    fn sample_clamps_and_interpolates() {
        let trajectory = Trajectory::from_json(WPILIB_JSON).unwrap();

        let before = trajectory.sample(-1.0);
        assert_eq!(before.velocity, 0.0);
        assert_eq!(before.pose.x(), 0.0);

        let after = trajectory.sample(10.0);
        assert_eq!(after.pose.x(), 1.0);

        let mid = trajectory.sample(0.5);
        assert!((mid.velocity - 0.5).abs() < 1e-9);
        assert!((mid.pose.x() - 0.25).abs() < 1e-9);
        assert!((mid.acceleration - 0.5).abs() < 1e-9);
    }

    #[test]
    fn error_messages_name_the_problem() {
        let error = Trajectory::from_json("[").unwrap_err();
        let rendered = error.to_string();
        assert!(rendered.contains("malformed trajectory json"));
    }
}
