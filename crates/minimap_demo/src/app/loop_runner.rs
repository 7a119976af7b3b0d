use std::process::ExitCode;

use minimap::{
    InputAction, InputSnapshot, MemorySurface, MinimapConfig, OverlayController, OverlaySurface,
    ScanPhase,
};
use tracing::info;

use super::bootstrap::{AppWiring, DemoConfig};
use super::world::SimulatedHost;

const KEY_HOLD_SECONDS: f32 = 0.2;

/// Key presses the demo plays back, as (seconds since start, action).
const INPUT_SCRIPT: &[(f32, InputAction)] = &[
    (30.0, InputAction::ToggleDoubleSize),
    (50.0, InputAction::ToggleDoubleSize),
    (60.0, InputAction::ToggleClock),
    (70.0, InputAction::ToggleOverlay),
    (75.0, InputAction::ToggleOverlay),
];

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DemoSummary {
    pub(crate) ticks: u64,
    pub(crate) scan_phase: Option<ScanPhase>,
    pub(crate) map_image_applied: bool,
    pub(crate) landmarks: usize,
    pub(crate) peak_transient_markers: usize,
    pub(crate) primitives_after_teardown: usize,
}

pub(crate) fn run(app: AppWiring) -> ExitCode {
    let summary = simulate(&app.demo, app.minimap);
    info!(
        ticks = summary.ticks,
        scan_phase = ?summary.scan_phase,
        map_image_applied = summary.map_image_applied,
        landmarks = summary.landmarks,
        peak_transient_markers = summary.peak_transient_markers,
        primitives_after_teardown = summary.primitives_after_teardown,
        "demo_finished"
    );
    ExitCode::SUCCESS
}

pub(crate) fn simulate(demo: &DemoConfig, minimap: MinimapConfig) -> DemoSummary {
    let tick_rate = demo.tick_rate_hz.max(1);
    let dt_seconds = 1.0 / tick_rate as f32;
    let total_ticks = (demo.duration.as_secs_f64() * f64::from(tick_rate)).round() as u64;
    let status_every = ((demo.status_log_interval.as_secs_f64() * f64::from(tick_rate)).round()
        as u64)
        .max(1);

    let session_scene = minimap.session_scene.clone();
    let mut controller = OverlayController::new(minimap);
    let mut surface = MemorySurface::new();
    let mut host = SimulatedHost::new(demo);
    controller.on_scene_loaded(&session_scene, &mut surface);

    let mut summary = DemoSummary {
        ticks: 0,
        scan_phase: None,
        map_image_applied: false,
        landmarks: 0,
        peak_transient_markers: 0,
        primitives_after_teardown: 0,
    };

    for tick in 1..=total_ticks {
        let elapsed_seconds = tick as f32 * dt_seconds;
        host.advance(dt_seconds);
        let input = scripted_input(elapsed_seconds);
        controller.tick(dt_seconds, &input, host.scene(), &mut surface);
        summary.ticks = tick;

        if let Some(session) = controller.session() {
            summary.peak_transient_markers = summary
                .peak_transient_markers
                .max(session.reconciler().len());
        }
        if tick % status_every == 0 {
            log_status(&controller, &host, &surface, elapsed_seconds);
        }
    }

    if let Some(session) = controller.session() {
        summary.scan_phase = Some(session.scanner().phase());
        summary.map_image_applied = session.map_image().is_some();
        summary.landmarks = session.landmarks().len();
    }
    controller.on_scene_unloaded(&mut surface);
    summary.primitives_after_teardown = surface.alive_count();
    summary
}

fn scripted_input(elapsed_seconds: f32) -> InputSnapshot {
    INPUT_SCRIPT
        .iter()
        .filter(|(at, _)| elapsed_seconds >= *at && elapsed_seconds < *at + KEY_HOLD_SECONDS)
        .fold(InputSnapshot::empty(), |snapshot, (_, action)| {
            snapshot.with_action_down(*action, true)
        })
}

fn log_status(
    controller: &OverlayController,
    host: &SimulatedHost,
    surface: &MemorySurface,
    elapsed_seconds: f32,
) {
    let Some(session) = controller.session() else {
        return;
    };
    let map_position = surface.anchored_position(session.layout().map_content);
    info!(
        elapsed_seconds,
        scan_phase = ?session.scanner().phase(),
        attempts = session.scanner().attempts_made(),
        mode = ?session.mode(),
        overlay_visible = controller.overlay_visible(),
        clock_visible = controller.clock_visible(),
        host_pois = host.live_poi_count(),
        transient_markers = session.reconciler().len(),
        map_x = map_position.map(|position| position.x),
        map_y = map_position.map(|position| position.y),
        "overlay_status"
    );
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn scripted_input_holds_key_briefly() {
        assert!(!scripted_input(29.9).is_down(InputAction::ToggleDoubleSize));
        assert!(scripted_input(30.1).is_down(InputAction::ToggleDoubleSize));
        assert!(!scripted_input(30.5).is_down(InputAction::ToggleDoubleSize));
        assert!(scripted_input(70.0).is_down(InputAction::ToggleOverlay));
    }

    #[test]
    fn default_demo_runs_a_full_session() {
        let summary = simulate(&DemoConfig::default(), MinimapConfig::default());

        assert_eq!(summary.ticks, 90 * 60);
        assert_eq!(summary.scan_phase, Some(ScanPhase::Done));
        assert!(summary.map_image_applied);
        assert_eq!(summary.landmarks, 6);
        assert!(summary.peak_transient_markers > 0);
        assert_eq!(summary.primitives_after_teardown, 0);
    }

    #[test]
    fn host_that_never_populates_ends_with_grid_fallback() {
        let demo = DemoConfig {
            host_startup_delay: Duration::from_secs(600),
            duration: Duration::from_secs(30),
            ..DemoConfig::default()
        };

        let summary = simulate(&demo, MinimapConfig::default());

        assert_eq!(summary.scan_phase, Some(ScanPhase::Done));
        assert!(!summary.map_image_applied);
        assert_eq!(summary.peak_transient_markers, 0);
    }
}
