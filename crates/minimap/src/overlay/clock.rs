use tracing::debug;

use crate::host::{OverlaySurface, PrimitiveId, SceneHandle};
use crate::locator::{SceneGraph, CLOCK_PATH};

/// Rearranges the host's "10:20 AM Monday" into "Monday\n10:20 AM". Text
/// with fewer than three words is passed through.
pub fn format_clock_text(raw: &str) -> String {
    let tokens = raw.split_whitespace().collect::<Vec<_>>();
    match tokens.as_slice() {
        [time, meridiem, .., day] => format!("{day}\n{time} {meridiem}"),
        _ => raw.to_string(),
    }
}

/// Copies the host clock widget's text onto the overlay on a fixed cadence.
#[derive(Debug, Clone)]
pub(crate) struct ClockMirror {
    interval_seconds: f32,
    elapsed_seconds: f32,
    source: Option<SceneHandle>,
}

impl ClockMirror {
    pub(crate) fn new(interval_seconds: f32) -> Self {
        Self {
            interval_seconds,
            elapsed_seconds: 0.0,
            source: None,
        }
    }

    pub(crate) fn tick<G, S>(&mut self, dt_seconds: f32, graph: &G, surface: &mut S, target: PrimitiveId)
    where
        G: SceneGraph + ?Sized,
        S: OverlaySurface + ?Sized,
    {
        self.elapsed_seconds += dt_seconds;
        if self.elapsed_seconds < self.interval_seconds {
            return;
        }
        self.elapsed_seconds = 0.0;

        if self.source.is_some_and(|source| graph.node(source).is_none()) {
            self.source = None;
        }
        if self.source.is_none() {
            self.source = match graph.find(CLOCK_PATH) {
                Ok(found) => found,
                Err(error) => {
                    debug!(error = %error, "clock_lookup_failed");
                    None
                }
            };
        }

        if let Some(text) = self.source.and_then(|source| graph.text(source)) {
            surface.set_text(target, &format_clock_text(&text));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{MemoryScene, MemorySurface, PrimitiveDesc, PrimitiveKind};

    fn text_of(surface: &MemorySurface, id: PrimitiveId) -> String {
        match &surface.record(id).expect("record").desc.kind {
            PrimitiveKind::Text { text, .. } => text.clone(),
            other => panic!("not a text primitive: {other:?}"),
        }
    }

    fn text_target(surface: &mut MemorySurface) -> PrimitiveId {
        surface.create(PrimitiveDesc::new(
            "MinimapTime",
            None,
            PrimitiveKind::Text {
                text: "Time".to_string(),
                color: [255; 4],
            },
        ))
    }

    #[test]
    fn formats_day_above_time() {
        assert_eq!(format_clock_text("10:20 AM Monday"), "Monday\n10:20 AM");
        assert_eq!(format_clock_text("  7:05  PM   Friday "), "Friday\n7:05 PM");
    }

    #[test]
    fn short_text_passes_through() {
        assert_eq!(format_clock_text("Loading"), "Loading");
        assert_eq!(format_clock_text("10:20 AM"), "10:20 AM");
    }

    #[test]
    fn mirror_updates_once_per_interval() {
        let mut scene = MemoryScene::new();
        let clock = scene.ensure_path(CLOCK_PATH).expect("clock");
        scene.set_text(clock, "6:00 AM Sunday");
        let mut surface = MemorySurface::new();
        let target = text_target(&mut surface);
        let mut mirror = ClockMirror::new(1.0);

        mirror.tick(0.5, &scene, &mut surface, target);
        assert_eq!(text_of(&surface, target), "Time");

        mirror.tick(0.5, &scene, &mut surface, target);
        assert_eq!(text_of(&surface, target), "Sunday\n6:00 AM");
    }

    #[test]
    fn mirror_re_resolves_a_replaced_clock_widget() {
        let mut scene = MemoryScene::new();
        let clock = scene.ensure_path(CLOCK_PATH).expect("clock");
        scene.set_text(clock, "6:00 AM Sunday");
        let mut surface = MemorySurface::new();
        let target = text_target(&mut surface);
        let mut mirror = ClockMirror::new(1.0);
        mirror.tick(1.0, &scene, &mut surface, target);

        scene.remove(clock);
        let replacement = scene.ensure_path(CLOCK_PATH).expect("clock");
        scene.set_text(replacement, "6:01 AM Sunday");
        mirror.tick(1.0, &scene, &mut surface, target);

        assert_eq!(text_of(&surface, target), "Sunday\n6:01 AM");
    }
}
