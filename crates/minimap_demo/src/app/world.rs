//! Scripted stand-in for the host game: populates its scene graph after a
//! startup delay, walks the player in a circle and spawns short-lived
//! contract PoIs.

use std::f32::consts::TAU;

use minimap::{
    ImageRef, MemoryScene, SceneHandle, Vec3, CLOCK_PATH, MAP_APP_PATH, PLAYER_PATH,
    POI_CONTAINER_PATH, POI_ICON_CHILD,
};
use tracing::{debug, info, warn};

use super::bootstrap::DemoConfig;

const MAP_IMAGE: ImageRef = ImageRef(1);
const PLAYER_ICON: ImageRef = ImageRef(2);
const PROPERTY_ICON: ImageRef = ImageRef(3);
const CONTRACT_ICON: ImageRef = ImageRef(4);
const CONTRACT_POI_NAME: &str = "ContractPoI(Clone)";
const GOLDEN_ANGLE_DEGREES: f32 = 137.5;
const CLOCK_START_MINUTES: u32 = 7 * 60;
const CLOCK_MINUTES_PER_SECOND: f32 = 10.0;
const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

#[derive(Debug, Clone, Copy)]
struct LivePoi {
    handle: SceneHandle,
    expires_at: f32,
}

#[derive(Debug)]
struct Populated {
    player: SceneHandle,
    poi_container: SceneHandle,
    clock: SceneHandle,
}

#[derive(Debug)]
pub(crate) struct SimulatedHost {
    scene: MemoryScene,
    elapsed_seconds: f32,
    startup_delay_seconds: f32,
    orbit_radius: f32,
    orbit_period_seconds: f32,
    spawn_interval_seconds: f32,
    poi_lifetime_seconds: f32,
    next_spawn_at: f32,
    spawned_total: u32,
    populated: Option<Populated>,
    pois: Vec<LivePoi>,
}

impl SimulatedHost {
    pub(crate) fn new(config: &DemoConfig) -> Self {
        Self {
            scene: MemoryScene::new(),
            elapsed_seconds: 0.0,
            startup_delay_seconds: config.host_startup_delay.as_secs_f32(),
            orbit_radius: config.player_orbit_radius,
            orbit_period_seconds: config.player_orbit_period.as_secs_f32().max(f32::EPSILON),
            spawn_interval_seconds: config.poi_spawn_interval.as_secs_f32(),
            poi_lifetime_seconds: config.poi_lifetime.as_secs_f32(),
            next_spawn_at: 0.0,
            spawned_total: 0,
            populated: None,
            pois: Vec::new(),
        }
    }

    pub(crate) fn scene(&self) -> &MemoryScene {
        &self.scene
    }

    pub(crate) fn is_populated(&self) -> bool {
        self.populated.is_some()
    }

    pub(crate) fn live_poi_count(&self) -> usize {
        self.pois.len()
    }

    pub(crate) fn advance(&mut self, dt_seconds: f32) {
        self.elapsed_seconds += dt_seconds;
        if self.populated.is_none() {
            if self.elapsed_seconds < self.startup_delay_seconds {
                return;
            }
            self.populated = self.populate();
            self.next_spawn_at = self.elapsed_seconds + self.spawn_interval_seconds;
        }
        let Some(handles) = self.populated.as_ref() else {
            return;
        };
        let (player, poi_container, clock) = (handles.player, handles.poi_container, handles.clock);

        self.move_player(player);
        self.scene
            .set_text(clock, &clock_text(self.elapsed_seconds));
        self.expire_pois();
        if self.spawn_interval_seconds > 0.0 && self.elapsed_seconds >= self.next_spawn_at {
            self.spawn_poi(poi_container);
            self.next_spawn_at = self.elapsed_seconds + self.spawn_interval_seconds;
        }
    }

    fn populate(&mut self) -> Option<Populated> {
        let (Some(player), Some(map_app), Some(poi_container), Some(clock)) = (
            self.scene.ensure_path(PLAYER_PATH),
            self.scene.ensure_path(MAP_APP_PATH),
            self.scene.ensure_path(POI_CONTAINER_PATH),
            self.scene.ensure_path(CLOCK_PATH),
        ) else {
            warn!("host_scene_populate_failed");
            return None;
        };
        self.scene.set_image(poi_container, Some(MAP_IMAGE));
        for (name, icon) in [
            ("PlayerPoI(Clone)", PLAYER_ICON),
            ("PropertyPoI(Clone)", PROPERTY_ICON),
        ] {
            let poi = self.scene.add_child(poi_container, name);
            let icon_node = self.scene.add_child(poi, POI_ICON_CHILD);
            self.scene.set_image(icon_node, Some(icon));
        }
        info!(
            elapsed_seconds = self.elapsed_seconds,
            map_app = map_app.0,
            "host_scene_populated"
        );
        Some(Populated {
            player,
            poi_container,
            clock,
        })
    }

    fn move_player(&mut self, player: SceneHandle) {
        let angle = self.elapsed_seconds / self.orbit_period_seconds * TAU;
        let position = Vec3::new(
            self.orbit_radius * angle.cos(),
            0.0,
            self.orbit_radius * angle.sin(),
        );
        // Walking counter-clockwise in x/z; yaw measured clockwise from +z.
        let heading = Vec3::new(-angle.sin(), 0.0, angle.cos());
        let yaw_degrees = heading.x.atan2(heading.z).to_degrees();
        self.scene.set_position(player, position);
        self.scene.set_yaw(player, yaw_degrees);
    }

    fn spawn_poi(&mut self, container: SceneHandle) {
        let index = self.spawned_total;
        self.spawned_total = self.spawned_total.saturating_add(1);
        let angle = (index as f32 * GOLDEN_ANGLE_DEGREES).to_radians();
        let radius = 20.0 + (index % 5) as f32 * 15.0;
        let position = Vec3::new(radius * angle.cos(), 0.0, radius * angle.sin());

        let handle = self.scene.add_child(container, CONTRACT_POI_NAME);
        self.scene.set_position(handle, position);
        let icon = self.scene.add_child(handle, POI_ICON_CHILD);
        self.scene.set_image(icon, Some(CONTRACT_ICON));
        self.pois.push(LivePoi {
            handle,
            expires_at: self.elapsed_seconds + self.poi_lifetime_seconds,
        });
        debug!(index, x = position.x, z = position.z, "host_poi_spawned");
    }

    fn expire_pois(&mut self) {
        let now = self.elapsed_seconds;
        let scene = &mut self.scene;
        self.pois.retain(|poi| {
            if poi.expires_at > now {
                return true;
            }
            scene.remove(poi.handle);
            debug!(handle = poi.handle.0, "host_poi_expired");
            false
        });
    }
}

/// Host clock widget text, e.g. "7:00 AM Monday".
fn clock_text(elapsed_seconds: f32) -> String {
    let total = CLOCK_START_MINUTES + (elapsed_seconds * CLOCK_MINUTES_PER_SECOND) as u32;
    let day = WEEKDAYS[(total / (24 * 60)) as usize % WEEKDAYS.len()];
    let minute_of_day = total % (24 * 60);
    let (hour, minute) = (minute_of_day / 60, minute_of_day % 60);
    let meridiem = if hour < 12 { "AM" } else { "PM" };
    let hour = match hour % 12 {
        0 => 12,
        other => other,
    };
    format!("{hour}:{minute:02} {meridiem} {day}")
}
