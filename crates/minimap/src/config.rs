use serde::{Deserialize, Serialize};

use crate::geometry::{Vec2, Vec3};

/// Measured constants for one host's map asset. Recalibrate per target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Calibration {
    pub map_scale: f32,
    pub normal_offset: Vec2,
    pub double_offset: Vec2,
    pub marker_match_epsilon: f32,
    pub transient_marker_correction_x: f32,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            map_scale: 1.248_709_8,
            normal_offset: Vec2::new(-61.0, -71.0),
            double_offset: Vec2::new(-131.0, -141.0),
            marker_match_epsilon: 0.1,
            transient_marker_correction_x: -5.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timings {
    pub initial_delay_seconds: f32,
    pub poll_interval_seconds: f32,
    pub max_attempts: u32,
    pub reconcile_interval_seconds: f32,
    pub clock_interval_seconds: f32,
    pub smoothing_rate: f32,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            initial_delay_seconds: 2.0,
            poll_interval_seconds: 0.5,
            max_attempts: 30,
            reconcile_interval_seconds: 20.0,
            clock_interval_seconds: 1.0,
            smoothing_rate: 10.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LandmarkStyle {
    Property,
    Waypoint,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub position: Vec3,
    pub style: LandmarkStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MinimapConfig {
    pub session_scene: String,
    pub transient_poi_prefix: String,
    pub direction_indicator_radius: f32,
    pub calibration: Calibration,
    pub timings: Timings,
    pub landmarks: Vec<Landmark>,
}

impl Default for MinimapConfig {
    fn default() -> Self {
        Self {
            session_scene: "Main".to_string(),
            transient_poi_prefix: "ContractPoI".to_string(),
            direction_indicator_radius: 15.0,
            calibration: Calibration::default(),
            timings: Timings::default(),
            landmarks: default_landmarks(),
        }
    }
}

fn default_landmarks() -> Vec<Landmark> {
    let property = |x, y, z| Landmark {
        position: Vec3::new(x, y, z),
        style: LandmarkStyle::Property,
    };
    let waypoint = |x, y, z| Landmark {
        position: Vec3::new(x, y, z),
        style: LandmarkStyle::Waypoint,
    };
    vec![
        property(-67.17, -3.03, 138.31),
        property(-79.88, -2.26, 85.13),
        property(-179.99, -3.03, 113.69),
        waypoint(-68.44, -1.49, 35.37),
        waypoint(-34.55, -1.54, 27.06),
        waypoint(70.33, 1.37, -10.01),
    ]
}
