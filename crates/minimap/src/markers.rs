//! Keeps overlay markers in step with the host's transient points of
//! interest. PoIs carry no stable key visible to the overlay, so a marker
//! "is" the PoI whose desired position lies within epsilon of it.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::config::MinimapConfig;
use crate::geometry::Vec2;
use crate::host::{
    Anchor, ImageRef, LocateError, OverlaySurface, PrimitiveDesc, PrimitiveId, PrimitiveKind,
    SceneHandle,
};
use crate::locator::{SceneGraph, POI_CONTAINER_PATH, POI_ICON_CHILD};
use crate::projection::MapProjection;

const TRANSIENT_MARKER_NAME: &str = "TransientPoiMarker";
const TRANSIENT_MARKER_FALLBACK_SIZE: f32 = 5.0;
const TRANSIENT_MARKER_FALLBACK_COLOR: [u8; 4] = [255, 170, 40, 255];
const TRANSIENT_MARKER_ICON_SCALE: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerKind {
    Player,
    StaticLandmark,
    TransientPoi,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayMarker {
    pub id: PrimitiveId,
    pub anchored_position: Vec2,
    pub kind: MarkerKind,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub container_present: bool,
    pub added: usize,
    pub removed: usize,
    pub retained: usize,
    /// Markers whose primitive had already died through some other path.
    pub pruned: usize,
}

#[derive(Debug, Clone, Copy)]
struct LivePoi {
    position: Vec2,
    icon: Option<ImageRef>,
}

#[derive(Debug)]
pub struct MarkerReconciler {
    markers: HashMap<PrimitiveId, OverlayMarker>,
    interval_seconds: f32,
    elapsed_seconds: f32,
    epsilon: f32,
    poi_prefix: String,
}

impl MarkerReconciler {
    pub fn new(config: &MinimapConfig) -> Self {
        Self {
            markers: HashMap::new(),
            interval_seconds: config.timings.reconcile_interval_seconds,
            elapsed_seconds: 0.0,
            epsilon: config.calibration.marker_match_epsilon,
            poi_prefix: config.transient_poi_prefix.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn markers(&self) -> impl Iterator<Item = &OverlayMarker> {
        self.markers.values()
    }

    pub fn contains(&self, id: PrimitiveId) -> bool {
        self.markers.contains_key(&id)
    }

    /// Runs a reconciliation cycle once per interval. Faults are logged and
    /// leave the marker set untouched until the next cycle.
    pub fn tick<G, S>(
        &mut self,
        dt_seconds: f32,
        graph: &G,
        surface: &mut S,
        parent: Option<PrimitiveId>,
        projection: &MapProjection,
    ) -> Option<ReconcileReport>
    where
        G: SceneGraph + ?Sized,
        S: OverlaySurface + ?Sized,
    {
        self.elapsed_seconds += dt_seconds;
        if self.elapsed_seconds < self.interval_seconds {
            return None;
        }
        self.elapsed_seconds = 0.0;

        let Some(parent) = parent.filter(|parent| surface.is_alive(*parent)) else {
            debug!("marker_reconcile_skipped_without_map_content");
            return None;
        };

        match self.reconcile(graph, surface, parent, projection) {
            Ok(report) => {
                if report.added > 0 || report.removed > 0 || report.pruned > 0 {
                    info!(
                        added = report.added,
                        removed = report.removed,
                        retained = report.retained,
                        pruned = report.pruned,
                        "transient_markers_reconciled"
                    );
                }
                Some(report)
            }
            Err(error) => {
                warn!(error = %error, "transient_marker_reconcile_failed");
                None
            }
        }
    }

    pub fn reconcile<G, S>(
        &mut self,
        graph: &G,
        surface: &mut S,
        parent: PrimitiveId,
        projection: &MapProjection,
    ) -> Result<ReconcileReport, LocateError>
    where
        G: SceneGraph + ?Sized,
        S: OverlaySurface + ?Sized,
    {
        let before_prune = self.markers.len();
        self.markers.retain(|id, _| surface.is_alive(*id));
        let pruned = before_prune - self.markers.len();

        let Some(container) = graph.find(POI_CONTAINER_PATH)? else {
            let removed = self.clear(surface);
            if removed > 0 {
                warn!(removed, "poi_container_missing_markers_cleared");
            }
            return Ok(ReconcileReport {
                container_present: false,
                removed,
                pruned,
                ..ReconcileReport::default()
            });
        };

        let live = self.collect_live(graph, container, projection)?;

        let mut added = 0;
        for poi in &live {
            if self.has_marker_near(poi.position) {
                continue;
            }
            let id = surface.create(transient_marker_desc(parent, poi));
            self.markers.insert(
                id,
                OverlayMarker {
                    id,
                    anchored_position: poi.position,
                    kind: MarkerKind::TransientPoi,
                },
            );
            added += 1;
        }

        let stale = self
            .markers
            .values()
            .filter(|marker| {
                !live.iter().any(|poi| {
                    poi.position.distance(marker.anchored_position) < self.epsilon
                })
            })
            .map(|marker| marker.id)
            .collect::<Vec<_>>();
        for id in &stale {
            surface.destroy(*id);
            self.markers.remove(id);
        }

        Ok(ReconcileReport {
            container_present: true,
            added,
            removed: stale.len(),
            retained: self.markers.len() - added,
            pruned,
        })
    }

    /// Destroys every marker. Returns how many were removed.
    pub fn clear<S: OverlaySurface + ?Sized>(&mut self, surface: &mut S) -> usize {
        let count = self.markers.len();
        for (id, _) in self.markers.drain() {
            surface.destroy(id);
        }
        count
    }

    fn has_marker_near(&self, position: Vec2) -> bool {
        self.markers
            .values()
            .any(|marker| marker.anchored_position.distance(position) < self.epsilon)
    }

    fn collect_live<G: SceneGraph + ?Sized>(
        &self,
        graph: &G,
        container: SceneHandle,
        projection: &MapProjection,
    ) -> Result<Vec<LivePoi>, LocateError> {
        let mut live = Vec::new();
        for child in graph.children(container)? {
            let Some(node) = graph.node(child) else {
                continue;
            };
            if !node.active || !node.name.starts_with(&self.poi_prefix) {
                continue;
            }
            let icon = graph
                .find_from(child, &[POI_ICON_CHILD])?
                .and_then(|icon| graph.image(icon));
            live.push(LivePoi {
                position: projection.transient_marker_position(node.position),
                icon,
            });
        }
        Ok(live)
    }
}

fn transient_marker_desc(parent: PrimitiveId, poi: &LivePoi) -> PrimitiveDesc {
    let desc = match poi.icon {
        Some(icon) => PrimitiveDesc::new(
            TRANSIENT_MARKER_NAME,
            Some(parent),
            PrimitiveKind::Image {
                image: Some(icon),
                color: [255, 255, 255, 255],
            },
        )
        .with_scale(TRANSIENT_MARKER_ICON_SCALE),
        None => PrimitiveDesc::new(
            TRANSIENT_MARKER_NAME,
            Some(parent),
            PrimitiveKind::Panel {
                color: TRANSIENT_MARKER_FALLBACK_COLOR,
            },
        )
        .with_size(Vec2::new(
            TRANSIENT_MARKER_FALLBACK_SIZE,
            TRANSIENT_MARKER_FALLBACK_SIZE,
        )),
    };
    desc.with_anchor(Anchor::Center)
        .with_anchored_position(poi.position)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Vec3;
    use crate::host::{MemoryScene, MemorySurface};

    struct Fixture {
        scene: MemoryScene,
        surface: MemorySurface,
        container: SceneHandle,
        map_content: PrimitiveId,
        reconciler: MarkerReconciler,
        projection: MapProjection,
    }

    impl Fixture {
        fn new() -> Self {
            let mut scene = MemoryScene::new();
            let container = scene.ensure_path(POI_CONTAINER_PATH).expect("container");
            let mut surface = MemorySurface::new();
            let map_content =
                surface.create(PrimitiveDesc::new("MapContent", None, PrimitiveKind::Group));
            Self {
                scene,
                surface,
                container,
                map_content,
                reconciler: MarkerReconciler::new(&MinimapConfig::default()),
                projection: MapProjection::default(),
            }
        }

        fn spawn_poi(&mut self, x: f32, z: f32) -> SceneHandle {
            let poi = self.scene.add_child(self.container, "ContractPoI(Clone)");
            self.scene.set_position(poi, Vec3::new(x, 0.0, z));
            poi
        }

        fn reconcile(&mut self) -> ReconcileReport {
            self.reconciler
                .reconcile(&self.scene, &mut self.surface, self.map_content, &self.projection)
                .expect("reconcile")
        }

        fn marker_ids(&self) -> Vec<PrimitiveId> {
            let mut ids = self.reconciler.markers().map(|m| m.id).collect::<Vec<_>>();
            ids.sort();
            ids
        }

        fn marker_near(&self, x: f32, z: f32) -> Option<PrimitiveId> {
            let desired = self
                .projection
                .transient_marker_position(Vec3::new(x, 0.0, z));
            self.reconciler
                .markers()
                .find(|marker| marker.anchored_position.distance(desired) < 0.1)
                .map(|marker| marker.id)
        }
    }

    #[test]
    fn creates_one_marker_per_live_poi() {
        let mut fixture = Fixture::new();
        fixture.spawn_poi(10.0, 20.0);
        fixture.spawn_poi(-30.0, 5.0);
        fixture.spawn_poi(0.0, -12.0);

        let report = fixture.reconcile();

        assert_eq!(report.added, 3);
        assert_eq!(fixture.reconciler.len(), 3);
        for (x, z) in [(10.0, 20.0), (-30.0, 5.0), (0.0, -12.0)] {
            let id = fixture.marker_near(x, z).expect("marker near poi");
            let desired = fixture
                .projection
                .transient_marker_position(Vec3::new(x, 0.0, z));
            let placed = fixture.surface.anchored_position(id).expect("alive");
            assert!(placed.distance(desired) < 0.1);
        }
    }

    #[test]
    fn removing_a_poi_keeps_surviving_markers() {
        let mut fixture = Fixture::new();
        fixture.spawn_poi(10.0, 20.0);
        let doomed = fixture.spawn_poi(-30.0, 5.0);
        fixture.spawn_poi(0.0, -12.0);
        fixture.reconcile();
        let survivor_a = fixture.marker_near(10.0, 20.0).expect("a");
        let survivor_b = fixture.marker_near(0.0, -12.0).expect("b");
        let doomed_marker = fixture.marker_near(-30.0, 5.0).expect("doomed");

        fixture.scene.remove(doomed);
        let report = fixture.reconcile();

        assert_eq!(report.removed, 1);
        assert_eq!(report.retained, 2);
        let mut expected = vec![survivor_a, survivor_b];
        expected.sort();
        assert_eq!(fixture.marker_ids(), expected);
        assert!(!fixture.surface.is_alive(doomed_marker));
    }

    #[test]
    fn re_adding_a_poi_creates_a_new_marker() {
        let mut fixture = Fixture::new();
        let poi = fixture.spawn_poi(10.0, 20.0);
        fixture.reconcile();
        let original = fixture.marker_near(10.0, 20.0).expect("marker");

        fixture.scene.remove(poi);
        fixture.reconcile();
        assert!(fixture.reconciler.is_empty());

        fixture.spawn_poi(10.0, 20.0);
        fixture.reconcile();
        let recreated = fixture.marker_near(10.0, 20.0).expect("marker");

        assert_ne!(original, recreated);
    }

    #[test]
    fn repeated_cycles_are_stable() {
        let mut fixture = Fixture::new();
        fixture.spawn_poi(1.0, 1.0);
        fixture.spawn_poi(2.0, 2.0);
        fixture.reconcile();
        let first = fixture.marker_ids();

        let report = fixture.reconcile();

        assert_eq!(report.added, 0);
        assert_eq!(report.removed, 0);
        assert_eq!(report.retained, 2);
        assert_eq!(fixture.marker_ids(), first);
    }

    #[test]
    fn missing_container_destroys_every_marker() {
        let mut fixture = Fixture::new();
        for i in 0..5 {
            fixture.spawn_poi(i as f32 * 10.0, 0.0);
        }
        fixture.reconcile();
        let ids = fixture.marker_ids();
        assert_eq!(ids.len(), 5);

        fixture.scene.remove(fixture.container);
        let report = fixture.reconcile();

        assert!(!report.container_present);
        assert_eq!(report.removed, 5);
        assert!(fixture.reconciler.is_empty());
        assert!(ids.iter().all(|id| !fixture.surface.is_alive(*id)));
    }

    #[test]
    fn externally_destroyed_marker_is_pruned_and_replaced() {
        let mut fixture = Fixture::new();
        fixture.spawn_poi(4.0, 4.0);
        fixture.reconcile();
        let dead = fixture.marker_near(4.0, 4.0).expect("marker");

        fixture.surface.destroy(dead);
        let report = fixture.reconcile();

        assert_eq!(report.pruned, 1);
        assert_eq!(report.added, 1);
        assert!(!fixture.reconciler.contains(dead));
        assert_eq!(fixture.reconciler.len(), 1);
    }

    #[test]
    fn ignores_inactive_and_unrelated_children() {
        let mut fixture = Fixture::new();
        let hidden = fixture.spawn_poi(3.0, 3.0);
        fixture.scene.set_active(hidden, false);
        let property = fixture.scene.add_child(fixture.container, "PropertyPoI(Clone)");
        fixture.scene.set_position(property, Vec3::new(8.0, 0.0, 8.0));
        fixture.spawn_poi(-6.0, 2.0);

        fixture.reconcile();

        assert_eq!(fixture.reconciler.len(), 1);
        assert!(fixture.marker_near(-6.0, 2.0).is_some());
    }

    #[test]
    fn pois_closer_than_epsilon_share_one_marker() {
        let mut fixture = Fixture::new();
        fixture.spawn_poi(5.0, 5.0);
        fixture.spawn_poi(5.0 + 0.01, 5.0);

        fixture.reconcile();

        assert_eq!(fixture.reconciler.len(), 1);
    }

    #[test]
    fn converges_to_live_count_regardless_of_order() {
        let mut fixture = Fixture::new();
        let a = fixture.spawn_poi(1.0, 0.0);
        fixture.reconcile();
        let b = fixture.spawn_poi(2.0, 0.0);
        let c = fixture.spawn_poi(3.0, 0.0);
        fixture.scene.remove(a);
        fixture.reconcile();
        assert_eq!(fixture.reconciler.len(), 2);

        fixture.scene.remove(c);
        fixture.spawn_poi(1.0, 0.0);
        fixture.spawn_poi(4.0, 0.0);
        fixture.reconcile();
        assert_eq!(fixture.reconciler.len(), 3);

        fixture.scene.remove(b);
        fixture.reconcile();
        assert_eq!(fixture.reconciler.len(), 2);
        assert_eq!(fixture.surface.find_by_name(TRANSIENT_MARKER_NAME).len(), 2);
    }

    #[test]
    fn icon_image_is_used_when_present() {
        let mut fixture = Fixture::new();
        let poi = fixture.spawn_poi(7.0, 7.0);
        let icon = fixture.scene.add_child(poi, POI_ICON_CHILD);
        fixture.scene.set_image(icon, Some(ImageRef(42)));

        fixture.reconcile();

        let id = fixture.marker_near(7.0, 7.0).expect("marker");
        let record = fixture.surface.record(id).expect("record");
        assert_eq!(record.image, Some(ImageRef(42)));
        assert_eq!(record.desc.scale, 0.5);
    }

    #[test]
    fn tick_waits_for_interval() {
        let mut fixture = Fixture::new();
        fixture.spawn_poi(1.0, 1.0);
        let parent = Some(fixture.map_content);

        for _ in 0..79 {
            let report = fixture.reconciler.tick(
                0.25,
                &fixture.scene,
                &mut fixture.surface,
                parent,
                &fixture.projection,
            );
            assert!(report.is_none());
        }
        let report = fixture.reconciler.tick(
            0.25,
            &fixture.scene,
            &mut fixture.surface,
            parent,
            &fixture.projection,
        );

        assert_eq!(report.map(|r| r.added), Some(1));
    }

    #[test]
    fn tick_without_map_content_is_a_no_op() {
        let mut fixture = Fixture::new();
        fixture.spawn_poi(1.0, 1.0);

        let report = fixture.reconciler.tick(
            30.0,
            &fixture.scene,
            &mut fixture.surface,
            None,
            &fixture.projection,
        );

        assert!(report.is_none());
        assert!(fixture.reconciler.is_empty());
    }

    #[test]
    fn host_fault_leaves_markers_untouched() {
        let mut fixture = Fixture::new();
        fixture.spawn_poi(1.0, 1.0);
        fixture.reconcile();
        let before = fixture.marker_ids();
        fixture.scene.set_faulting(true);

        let report = fixture.reconciler.tick(
            30.0,
            &fixture.scene,
            &mut fixture.surface,
            Some(fixture.map_content),
            &fixture.projection,
        );

        assert!(report.is_none());
        assert_eq!(fixture.marker_ids(), before);
    }
}
