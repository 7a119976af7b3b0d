//! Bounded, tick-driven discovery of the scene entities the overlay needs.
//!
//! The host populates its scene some time after the overlay session starts,
//! so lookups are retried on a fixed cadence instead of blocking. Every
//! target is looked up until found and never again afterwards.

use tracing::{debug, info, warn};

use crate::config::Timings;
use crate::host::{LocateError, SceneHandle};
use crate::locator::{SceneGraph, MAP_APP_PATH, PLAYER_PATH, VIEWPORT_PATH};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPhase {
    Idle,
    WaitingInitialDelay,
    Polling,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScanTarget {
    MapApp,
    Viewport,
    Player,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolvedEntities {
    pub player: Option<SceneHandle>,
    pub map_app: Option<SceneHandle>,
    pub viewport: Option<SceneHandle>,
}

impl ResolvedEntities {
    pub fn missing(&self) -> Vec<ScanTarget> {
        [
            (ScanTarget::MapApp, self.map_app),
            (ScanTarget::Viewport, self.viewport),
            (ScanTarget::Player, self.player),
        ]
        .into_iter()
        .filter(|(_, handle)| handle.is_none())
        .map(|(target, _)| target)
        .collect()
    }
}

/// Emitted once, on the tick the scanner reaches [`ScanPhase::Done`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanReport {
    pub attempts: u32,
    pub resolved: ResolvedEntities,
    pub missing: Vec<ScanTarget>,
}

#[derive(Debug, Clone)]
pub struct ResolutionScanner {
    initial_delay_seconds: f32,
    poll_interval_seconds: f32,
    max_attempts: u32,
    phase: ScanPhase,
    attempts_made: u32,
    time_since_last_attempt: f32,
    resolved: ResolvedEntities,
}

impl ResolutionScanner {
    pub fn new(timings: &Timings) -> Self {
        Self {
            initial_delay_seconds: timings.initial_delay_seconds,
            poll_interval_seconds: timings.poll_interval_seconds,
            max_attempts: timings.max_attempts.max(1),
            phase: ScanPhase::Idle,
            attempts_made: 0,
            time_since_last_attempt: 0.0,
            resolved: ResolvedEntities::default(),
        }
    }

    /// Begins a fresh scan, discarding anything resolved before.
    pub fn start(&mut self) {
        self.phase = ScanPhase::WaitingInitialDelay;
        self.attempts_made = 0;
        self.time_since_last_attempt = 0.0;
        self.resolved = ResolvedEntities::default();
        info!("resolution_scan_started");
    }

    pub fn phase(&self) -> ScanPhase {
        self.phase
    }

    pub fn attempts_made(&self) -> u32 {
        self.attempts_made
    }

    pub fn resolved(&self) -> &ResolvedEntities {
        &self.resolved
    }

    pub fn is_running(&self) -> bool {
        matches!(
            self.phase,
            ScanPhase::WaitingInitialDelay | ScanPhase::Polling
        )
    }

    pub fn is_waiting_for_initial_delay(&self) -> bool {
        self.phase == ScanPhase::WaitingInitialDelay
    }

    /// Advances the scan by one host frame. Runs at most one lookup pass.
    pub fn tick<G: SceneGraph + ?Sized>(&mut self, dt_seconds: f32, graph: &G) -> Option<ScanReport> {
        match self.phase {
            ScanPhase::Idle | ScanPhase::Done => None,
            ScanPhase::WaitingInitialDelay => {
                self.time_since_last_attempt += dt_seconds;
                if self.time_since_last_attempt < self.initial_delay_seconds {
                    return None;
                }
                self.phase = ScanPhase::Polling;
                self.attempt(graph)
            }
            ScanPhase::Polling => {
                self.time_since_last_attempt += dt_seconds;
                if self.time_since_last_attempt < self.poll_interval_seconds {
                    return None;
                }
                self.attempt(graph)
            }
        }
    }

    fn attempt<G: SceneGraph + ?Sized>(&mut self, graph: &G) -> Option<ScanReport> {
        self.time_since_last_attempt = 0.0;
        self.attempts_made = self.attempts_made.saturating_add(1);
        if let Err(error) = self.run_pass(graph) {
            warn!(attempt = self.attempts_made, error = %error, "resolution_pass_failed");
        }

        let found_required = self.resolved.map_app.is_some() && self.resolved.player.is_some();
        if !found_required && self.attempts_made < self.max_attempts {
            return None;
        }

        self.phase = ScanPhase::Done;
        Some(self.finish())
    }

    fn run_pass<G: SceneGraph + ?Sized>(&mut self, graph: &G) -> Result<(), LocateError> {
        if self.resolved.player.is_none() {
            self.resolved.player = graph.find(PLAYER_PATH)?;
            if self.resolved.player.is_some() {
                debug!(attempt = self.attempts_made, "player_resolved");
            }
        }
        if self.resolved.map_app.is_none() {
            self.resolved.map_app = graph.find(MAP_APP_PATH)?;
            if self.resolved.map_app.is_some() {
                debug!(attempt = self.attempts_made, "map_app_resolved");
            }
        }
        if let (Some(map_app), None) = (self.resolved.map_app, self.resolved.viewport) {
            self.resolved.viewport = graph.find_from(map_app, VIEWPORT_PATH)?;
            if self.resolved.viewport.is_some() {
                debug!(attempt = self.attempts_made, "viewport_resolved");
            }
        }
        Ok(())
    }

    fn finish(&self) -> ScanReport {
        let missing = self.resolved.missing();
        for target in &missing {
            warn!(scan_target = ?target, attempts = self.attempts_made, "resolution_target_missing");
        }
        info!(
            attempts = self.attempts_made,
            missing = missing.len(),
            "resolution_scan_completed"
        );
        ScanReport {
            attempts: self.attempts_made,
            resolved: self.resolved,
            missing,
        }
    }
}
