use crate::config::Calibration;
use crate::geometry::{DisplayMode, Vec2, Vec3};

/// World to overlay mapping for a flat top-down map. The world height axis
/// is discarded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapProjection {
    calibration: Calibration,
}

impl Default for MapProjection {
    fn default() -> Self {
        Self::new(Calibration::default())
    }
}

impl MapProjection {
    pub fn new(calibration: Calibration) -> Self {
        Self { calibration }
    }

    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    pub fn preset_offset(&self, mode: DisplayMode) -> Vec2 {
        match mode {
            DisplayMode::Normal => self.calibration.normal_offset,
            DisplayMode::Double => self.calibration.double_offset,
        }
    }

    /// Anchored position of the map content that puts `world` under the
    /// centre of the mask.
    pub fn project(&self, world: Vec3, mode: DisplayMode, dynamic_center: Vec2) -> Vec2 {
        let scale = self.calibration.map_scale;
        let screen = Vec2::new(-world.x * scale, -world.z * scale);
        screen + dynamic_center + self.preset_offset(mode)
    }

    /// Position of a marker parented to the map content, at fixed 1x scale.
    pub fn content_local(&self, world: Vec3, correction_x: f32) -> Vec2 {
        let scale = self.calibration.map_scale;
        Vec2::new(world.x * scale + correction_x, world.z * scale)
    }

    pub fn transient_marker_position(&self, world: Vec3) -> Vec2 {
        self.content_local(world, self.calibration.transient_marker_correction_x)
    }
}

pub fn dynamic_center(mask_size: Vec2) -> Vec2 {
    mask_size * 0.5
}

/// One exponential smoothing step. The interpolation factor is clamped so a
/// long frame lands on the target instead of overshooting it.
pub fn smooth_toward(current: Vec2, target: Vec2, dt_seconds: f32, rate: f32) -> Vec2 {
    let t = (dt_seconds * rate).clamp(0.0, 1.0);
    current.lerp(target, t)
}

/// Offset of the heading dot from the player marker. Zero yaw points up and
/// clockwise world rotation moves the dot clockwise.
pub fn direction_indicator_offset(yaw_degrees: f32, radius: f32) -> Vec2 {
    let radians = (90.0 - yaw_degrees).to_radians();
    Vec2::new(radius * radians.cos(), radius * radians.sin())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CENTER: Vec2 = Vec2 { x: 70.0, y: 70.0 };

    fn assert_close(actual: Vec2, expected: Vec2) {
        assert!(
            actual.distance(expected) < 1e-3,
            "expected {expected:?}, got {actual:?}"
        );
    }

    #[test]
    fn origin_projects_to_center_plus_normal_offset() {
        let projection = MapProjection::default();
        let projected = projection.project(Vec3::default(), DisplayMode::Normal, CENTER);
        assert_close(projected, Vec2::new(9.0, -1.0));
    }

    #[test]
    fn double_mode_uses_double_offset() {
        let projection = MapProjection::default();
        let scale = projection.calibration().map_scale;
        let projected = projection.project(Vec3::new(10.0, 0.0, 5.0), DisplayMode::Double, CENTER);
        let expected = Vec2::new(-10.0 * scale, -5.0 * scale)
            + CENTER
            + Vec2::new(-131.0, -141.0);
        assert_close(projected, expected);
    }

    #[test]
    fn projection_is_deterministic_and_ignores_height() {
        let projection = MapProjection::default();
        let low = Vec3::new(12.5, -40.0, -3.25);
        let high = Vec3::new(12.5, 90.0, -3.25);

        let first = projection.project(low, DisplayMode::Normal, CENTER);
        let second = projection.project(low, DisplayMode::Normal, CENTER);
        assert_eq!(first, second);
        assert_eq!(first, projection.project(high, DisplayMode::Normal, CENTER));
    }

    #[test]
    fn doubled_mask_keeps_player_at_same_relative_spot() {
        let projection = MapProjection::default();
        let world = Vec3::new(-20.0, 0.0, 33.0);
        let normal = projection.project(world, DisplayMode::Normal, dynamic_center(Vec2::new(140.0, 140.0)));
        let double = projection.project(world, DisplayMode::Double, dynamic_center(Vec2::new(280.0, 280.0)));
        assert_close(normal, double);
    }

    #[test]
    fn transient_marker_position_applies_horizontal_correction() {
        let projection = MapProjection::default();
        let scale = projection.calibration().map_scale;
        let position = projection.transient_marker_position(Vec3::new(4.0, 1.0, -2.0));
        assert_close(position, Vec2::new(4.0 * scale - 5.0, -2.0 * scale));
    }

    #[test]
    fn smoothing_converges_monotonically() {
        let target = Vec2::new(100.0, -40.0);
        let mut current = Vec2::new(-20.0, 15.0);
        let dt = 1.0 / 60.0;
        let mut previous_distance = current.distance(target);
        let mut steps = 0;

        while previous_distance > 0.01 {
            current = smooth_toward(current, target, dt, 10.0);
            let distance = current.distance(target);
            assert!(distance < previous_distance, "step {steps} did not approach target");
            assert_ne!(current, target, "smoothing must not snap");
            previous_distance = distance;
            steps += 1;
            assert!(steps < 600, "did not converge within bound");
        }
    }

    #[test]
    fn smoothing_factor_is_clamped_for_long_frames() {
        let target = Vec2::new(5.0, 5.0);
        assert_eq!(smooth_toward(Vec2::ZERO, target, 0.5, 10.0), target);
    }

    #[test]
    fn direction_indicator_points_up_at_zero_yaw() {
        assert_close(direction_indicator_offset(0.0, 15.0), Vec2::new(0.0, 15.0));
    }

    #[test]
    fn direction_indicator_rotates_clockwise_with_yaw() {
        assert_close(direction_indicator_offset(90.0, 15.0), Vec2::new(15.0, 0.0));
        assert_close(direction_indicator_offset(180.0, 15.0), Vec2::new(0.0, -15.0));
    }
}
