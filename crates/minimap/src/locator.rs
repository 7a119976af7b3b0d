use crate::host::{ImageRef, LocateError, SceneHandle, SceneNode};

pub const PLAYER_PATH: &[&str] = &["Player_Local"];
pub const MAP_APP_PATH: &[&str] = &["GameplayMenu", "Phone", "phone", "AppsCanvas", "MapApp"];
/// Relative to the map app root.
pub const VIEWPORT_PATH: &[&str] = &["Container", "Scroll View", "Viewport"];
pub const CLOCK_PATH: &[&str] = &[
    "GameplayMenu",
    "Phone",
    "phone",
    "HomeScreen",
    "InfoBar",
    "Time",
];
pub const POI_CONTAINER_PATH: &[&str] = &[
    "GameplayMenu",
    "Phone",
    "phone",
    "AppsCanvas",
    "MapApp",
    "Container",
    "Scroll View",
    "Viewport",
    "Content",
];
pub const POI_ICON_CHILD: &str = "IconContainer";
/// Relative to the PoI container.
pub const PLAYER_ICON_PATH: &[&str] = &["PlayerPoI(Clone)", POI_ICON_CHILD];
/// Relative to the PoI container.
pub const PROPERTY_ICON_PATH: &[&str] = &["PropertyPoI(Clone)", POI_ICON_CHILD];

/// Live host scene graph. Absence is `Ok(None)`; `Err` means the host itself
/// failed to answer.
pub trait SceneGraph {
    fn root(&self, name: &str) -> Result<Option<SceneHandle>, LocateError>;
    fn child(&self, parent: SceneHandle, name: &str) -> Result<Option<SceneHandle>, LocateError>;
    fn children(&self, parent: SceneHandle) -> Result<Vec<SceneHandle>, LocateError>;
    /// `None` once the node has been destroyed.
    fn node(&self, handle: SceneHandle) -> Option<SceneNode>;
    fn image(&self, handle: SceneHandle) -> Option<ImageRef>;
    fn text(&self, handle: SceneHandle) -> Option<String>;

    fn find(&self, path: &[&str]) -> Result<Option<SceneHandle>, LocateError> {
        let Some((root, rest)) = path.split_first() else {
            return Ok(None);
        };
        match self.root(root)? {
            Some(start) => self.find_from(start, rest),
            None => Ok(None),
        }
    }

    fn find_from(
        &self,
        start: SceneHandle,
        path: &[&str],
    ) -> Result<Option<SceneHandle>, LocateError> {
        let mut current = start;
        for segment in path {
            match self.child(current, segment)? {
                Some(next) => current = next,
                None => return Ok(None),
            }
        }
        Ok(Some(current))
    }
}

/// Image on the viewport's first child, or failing that the first image on
/// one of that child's children.
pub fn first_child_image<G: SceneGraph + ?Sized>(
    graph: &G,
    viewport: SceneHandle,
) -> Result<Option<ImageRef>, LocateError> {
    let Some(content) = graph.children(viewport)?.first().copied() else {
        return Ok(None);
    };
    if let Some(image) = graph.image(content) {
        return Ok(Some(image));
    }
    Ok(graph
        .children(content)?
        .into_iter()
        .find_map(|child| graph.image(child)))
}
