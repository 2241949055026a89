use foundation::geo::GeoBounds;
use foundation::projection::ScreenPoint;
use scene::asset::Asset;
use scene::viewport::ViewportState;

/// Immutable per-frame render input.
///
/// The renderer consumes this and draws declaratively; it never reaches
/// back into engine state mid-frame. Road polylines are projected with
/// the user scale already applied; the pan offset in `viewport` is a
/// whole-layer translation the renderer applies to roads, assets, and
/// the position marker alike.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SceneSnapshot {
    pub bounds: Option<GeoBounds>,
    pub viewport: ViewportState,
    pub assets: Vec<Asset>,
    pub roads: Vec<Vec<ScreenPoint>>,
    /// Last accepted fix, projected, for the position marker.
    pub position: Option<ScreenPoint>,
    /// Legacy simulated route, stored pre-projected.
    pub sim_route: Vec<ScreenPoint>,
}

impl SceneSnapshot {
    pub fn total_road_points(&self) -> usize {
        self.roads.iter().map(Vec::len).sum()
    }
}
