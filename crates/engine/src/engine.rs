use foundation::geo::{GeoEnvelope, GeoPoint};
use foundation::projection::{CanvasSize, ScreenPoint, project};
use navigation::advisor::{Guidance, NavigationAdvisor};
use scene::asset::AssetKind;
use scene::layer::AssetLayer;
use scene::viewport::{ViewportController, ViewportState};
use tracking::filter::{FilterDecision, PositionFilter};
use tracking::source::{
    AcquisitionError, AcquisitionSupervisor, Fix, SourceCapability, SourceCommand, SourceStatus,
};
use tracking::track::{POINT_BUDGET, RoadSegment, RouteTrack};

use document::{
    CanvasPoint, DocumentError, DraftStore, Landmark, LatLng, MapData, MapDocument, OfflineDraft,
};
use tracing::warn;

use crate::snapshot::SceneSnapshot;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub canvas: CanvasSize,
    /// Run accepted fixes through the per-axis smoothers.
    pub smoothing: bool,
    pub point_budget: usize,
    pub capability: SourceCapability,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            canvas: CanvasSize::new(800.0, 600.0),
            smoothing: true,
            point_budget: POINT_BUDGET,
            capability: SourceCapability::ContinuousWatch,
        }
    }
}

/// What one delivered fix became.
#[derive(Debug, Clone, PartialEq)]
pub enum FixOutcome {
    /// Tracking is stopped; the fix arrived after teardown.
    Ignored,
    Rejected {
        distance_m: f64,
    },
    Accepted {
        point: GeoPoint,
        guidance: Option<Guidance>,
    },
}

/// The map editor core: one owned state object fed by host events.
///
/// Everything runs on the UI thread; fixes are processed strictly in
/// delivery order and state mutation never interleaves with a render
/// pass: hosts apply events, then take a [`SceneSnapshot`].
#[derive(Debug)]
pub struct MapEngine {
    config: EngineConfig,
    envelope: GeoEnvelope,
    filter: PositionFilter,
    track: RouteTrack,
    assets: AssetLayer,
    viewport: ViewportController,
    advisor: NavigationAdvisor,
    supervisor: AcquisitionSupervisor,
    sim_route: Vec<ScreenPoint>,
}

impl Default for MapEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl MapEngine {
    pub fn new(config: EngineConfig) -> Self {
        let smoothing = config.smoothing;
        let capability = config.capability;
        Self {
            config,
            envelope: GeoEnvelope::new(),
            filter: PositionFilter::new(smoothing),
            track: RouteTrack::new(),
            assets: AssetLayer::new(),
            viewport: ViewportController::new(),
            advisor: NavigationAdvisor::new(),
            supervisor: AcquisitionSupervisor::new(capability),
            sim_route: Vec::new(),
        }
    }

    pub fn assets(&self) -> &AssetLayer {
        &self.assets
    }

    pub fn assets_mut(&mut self) -> &mut AssetLayer {
        &mut self.assets
    }

    pub fn viewport(&self) -> &ViewportController {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut ViewportController {
        &mut self.viewport
    }

    pub fn track(&self) -> &RouteTrack {
        &self.track
    }

    pub fn source_status(&self) -> SourceStatus {
        self.supervisor.status()
    }

    pub fn set_canvas(&mut self, canvas: CanvasSize) {
        self.config.canvas = canvas;
    }

    // --- GPS tracking -----------------------------------------------------

    /// (Re)starts tracking: fresh filter state, fresh envelope, and a
    /// new open segment. Returns the platform commands to execute.
    pub fn start_tracking(&mut self) -> Vec<SourceCommand> {
        self.filter.reset();
        self.envelope.reset();
        self.track.start_segment();
        self.supervisor.start()
    }

    /// Stops tracking synchronously; no fix delivered after this call
    /// mutates state. Accumulated segments are retained.
    pub fn stop_tracking(&mut self) -> Vec<SourceCommand> {
        self.track.close_segment();
        self.supervisor.stop()
    }

    pub fn on_fix(&mut self, fix: Fix) -> FixOutcome {
        if !self.supervisor.accepts_fixes() {
            return FixOutcome::Ignored;
        }
        self.supervisor.on_fix();

        match self.filter.accept(GeoPoint::new(fix.lat, fix.lng)) {
            FilterDecision::Rejected { distance_m } => FixOutcome::Rejected { distance_m },
            FilterDecision::Accepted(point) => {
                self.envelope.expand(point);
                self.track.append(point);
                let guidance = self.advisor.on_position(point);
                FixOutcome::Accepted { point, guidance }
            }
        }
    }

    pub fn on_source_error(&mut self, error: &AcquisitionError) -> Vec<SourceCommand> {
        self.supervisor.on_error(error)
    }

    pub fn on_retry_timer(&mut self) -> Vec<SourceCommand> {
        self.supervisor.on_retry_timer()
    }

    /// Manual retry offered to the user after signal loss.
    pub fn retry_acquisition(&mut self) -> Vec<SourceCommand> {
        self.supervisor.retry_now()
    }

    // --- Navigation -------------------------------------------------------

    pub fn set_destination(&mut self, destination: GeoPoint) -> Option<Guidance> {
        self.advisor.set_destination(destination)
    }

    pub fn clear_destination(&mut self) {
        self.advisor.clear_destination()
    }

    pub fn on_heading(&mut self, heading_deg: f64) -> Option<Guidance> {
        self.advisor.on_heading(heading_deg)
    }

    // --- Rendering --------------------------------------------------------

    /// Builds the immutable render input for the current state.
    pub fn snapshot(&self) -> SceneSnapshot {
        let viewport = self.viewport.state();
        let bounds = self.envelope.bounds();

        let roads = match bounds {
            None => Vec::new(),
            Some(bounds) => self
                .track
                .downsampled(self.config.point_budget)
                .iter()
                .map(|segment| {
                    segment
                        .points
                        .iter()
                        .map(|&p| project(p, bounds, self.config.canvas, viewport.scale))
                        .collect()
                })
                .collect(),
        };

        let position = match (self.filter.last_accepted(), bounds) {
            (Some(p), Some(bounds)) => {
                Some(project(p, bounds, self.config.canvas, viewport.scale))
            }
            _ => None,
        };

        SceneSnapshot {
            bounds,
            viewport,
            assets: self.assets.assets().to_vec(),
            roads,
            position,
            sim_route: self.sim_route.clone(),
        }
    }

    // --- Persistence ------------------------------------------------------

    /// Full state in the save shape. Also used for JSON export.
    pub fn to_document(&self, name: impl Into<String>) -> MapDocument {
        let ViewportState {
            scale,
            pan_x,
            pan_y,
        } = self.viewport.state();

        let roads: Vec<Vec<LatLng>> = self
            .track
            .segments()
            .iter()
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.points
                    .iter()
                    .map(|p| LatLng {
                        lat: p.lat,
                        lng: p.lng,
                    })
                    .collect()
            })
            .collect();

        let landmarks: Vec<Landmark> = self
            .assets
            .assets()
            .iter()
            .map(|a| Landmark {
                kind: a.kind.as_str().to_string(),
                x: a.x,
                y: a.y,
                width: a.width,
                height: a.height,
                label: a.label.clone(),
            })
            .collect();

        let sim_route = if self.sim_route.is_empty() {
            None
        } else {
            Some(
                self.sim_route
                    .iter()
                    .map(|p| CanvasPoint { x: p.x, y: p.y })
                    .collect(),
            )
        };

        MapDocument {
            name: name.into(),
            data: MapData {
                roads: Some(roads),
                landmarks: Some(landmarks),
                sim_route,
                scale: Some(scale),
                pan: Some(document::Pan { x: pan_x, y: pan_y }),
            },
        }
    }

    pub fn export_json(&self, name: impl Into<String>) -> Result<String, DocumentError> {
        self.to_document(name).to_json()
    }

    /// Applies a loaded document additively: keys absent from the
    /// document leave the corresponding in-memory state untouched.
    pub fn apply_document(&mut self, doc: &MapDocument) {
        if let Some(roads) = &doc.data.roads {
            self.load_roads(roads);
        }

        if let Some(landmarks) = &doc.data.landmarks {
            self.load_landmarks(landmarks);
        }

        if let Some(route) = &doc.data.sim_route {
            self.sim_route = route.iter().map(|p| ScreenPoint::new(p.x, p.y)).collect();
        }

        let mut state = self.viewport.state();
        if let Some(scale) = doc.data.scale {
            state.scale = scale;
        }
        if let Some(pan) = doc.data.pan {
            state.pan_x = pan.x;
            state.pan_y = pan.y;
        }
        self.viewport.set_state(state);
    }

    // --- Offline draft ----------------------------------------------------

    /// Writes the current roads and landmarks to the local store.
    pub fn save_draft(&self, store: &mut impl DraftStore) -> Result<(), DocumentError> {
        let doc = self.to_document("");
        let draft = OfflineDraft {
            roads: doc.data.roads.unwrap_or_default(),
            landmarks: doc.data.landmarks.unwrap_or_default(),
        };
        store.save(&draft)
    }

    /// Restores a cached draft, if any. Returns whether one was found.
    pub fn restore_draft(&mut self, store: &impl DraftStore) -> Result<bool, DocumentError> {
        let Some(draft) = store.load()? else {
            return Ok(false);
        };
        self.load_roads(&draft.roads);
        self.load_landmarks(&draft.landmarks);
        Ok(true)
    }

    /// Drops the cached draft after a successful remote save or load.
    pub fn clear_draft(&self, store: &mut impl DraftStore) -> Result<(), DocumentError> {
        store.clear()
    }

    fn load_roads(&mut self, roads: &[Vec<LatLng>]) {
        let segments: Vec<RoadSegment> = roads
            .iter()
            .map(|road| RoadSegment {
                points: road.iter().map(|p| GeoPoint::new(p.lat, p.lng)).collect(),
            })
            .collect();
        self.envelope.reset();
        for segment in &segments {
            for &p in &segment.points {
                self.envelope.expand(p);
            }
        }
        self.track.replace(segments);
    }

    fn load_landmarks(&mut self, landmarks: &[Landmark]) {
        self.assets = AssetLayer::new();
        for lm in landmarks {
            let Some(kind) = AssetKind::from_wire_name(&lm.kind) else {
                warn!(kind = %lm.kind, "skipping landmark with unknown kind");
                continue;
            };
            self.assets
                .insert(kind, lm.x, lm.y, lm.width, lm.height, lm.label.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{EngineConfig, FixOutcome, MapEngine};
    use document::{InMemoryDraftStore, MapDocument};
    use foundation::geo::GeoPoint;
    use scene::asset::{AssetKind, Corner, MIN_SIZE};
    use scene::viewport::MAX_SCALE;
    use tracking::source::{Fix, SourceStatus};

    fn fix(lat: f64, lng: f64) -> Fix {
        Fix {
            lat,
            lng,
            accuracy_m: 5.0,
            timestamp_ms: 0,
        }
    }

    fn raw_engine() -> MapEngine {
        // Smoothing off so scenario coordinates survive verbatim.
        MapEngine::new(EngineConfig {
            smoothing: false,
            ..EngineConfig::default()
        })
    }

    #[test]
    fn adjacent_fixes_accepted_distant_fix_rejected() {
        let mut e = raw_engine();
        e.start_tracking();

        assert!(matches!(
            e.on_fix(fix(28.6139, 77.2090)),
            FixOutcome::Accepted { .. }
        ));
        assert!(matches!(
            e.on_fix(fix(28.6140, 77.2091)),
            FixOutcome::Accepted { .. }
        ));
        // ~10 km jump: rejected, segment untouched.
        assert!(matches!(
            e.on_fix(fix(28.7000, 77.3000)),
            FixOutcome::Rejected { .. }
        ));

        assert_eq!(e.track().segments().len(), 1);
        assert_eq!(e.track().segments()[0].len(), 2);
    }

    #[test]
    fn fixes_after_stop_are_ignored() {
        let mut e = raw_engine();
        e.start_tracking();
        e.on_fix(fix(28.6139, 77.2090));
        e.stop_tracking();
        assert_eq!(e.on_fix(fix(28.6140, 77.2091)), FixOutcome::Ignored);
        // History is retained through the stop.
        assert_eq!(e.track().segments()[0].len(), 1);
        assert_eq!(e.source_status(), SourceStatus::Idle);
    }

    #[test]
    fn restart_opens_a_new_segment_and_resets_filter() {
        let mut e = raw_engine();
        e.start_tracking();
        e.on_fix(fix(28.6139, 77.2090));
        e.stop_tracking();

        e.start_tracking();
        // Far from the old anchor, but the filter restarted so it lands.
        assert!(matches!(
            e.on_fix(fix(48.8566, 2.3522)),
            FixOutcome::Accepted { .. }
        ));
        assert_eq!(e.track().segments().len(), 2);
    }

    #[test]
    fn place_and_resize_clamp_scenario() {
        let mut e = raw_engine();
        let id = e.assets_mut().place(AssetKind::House, 100.0, 100.0);
        assert!(e.assets_mut().resize(id, Corner::Se, 90.0, 90.0));
        let a = e.assets().get(id).unwrap();
        assert_eq!((a.width, a.height), (MIN_SIZE, MIN_SIZE));
    }

    #[test]
    fn wheel_zoom_never_exceeds_max() {
        let mut e = raw_engine();
        for _ in 0..50 {
            e.viewport_mut().wheel_zoom(true);
        }
        assert_eq!(e.viewport().state().scale, MAX_SCALE);
    }

    #[test]
    fn guidance_flows_from_fixes() {
        let mut e = raw_engine();
        e.start_tracking();
        e.on_heading(0.0);
        e.set_destination(GeoPoint::new(28.6139, 77.2141));

        let outcome = e.on_fix(fix(28.6139, 77.2090));
        let FixOutcome::Accepted { guidance, .. } = outcome else {
            panic!("expected acceptance, got {outcome:?}");
        };
        let g = guidance.expect("destination set, guidance expected");
        assert_eq!(g.instruction, "Turn right. Head east.");
        assert!(g.announce);
    }

    #[test]
    fn snapshot_projects_roads_and_position() {
        let mut e = raw_engine();
        e.start_tracking();
        e.on_fix(fix(28.6139, 77.2090));
        e.on_fix(fix(28.6140, 77.2091));

        let snap = e.snapshot();
        assert!(snap.bounds.is_some());
        assert_eq!(snap.roads.len(), 1);
        assert_eq!(snap.roads[0].len(), 2);
        for p in &snap.roads[0] {
            assert!(p.x.is_finite() && p.y.is_finite());
        }
        assert!(snap.position.is_some());
    }

    #[test]
    fn snapshot_before_any_fix_is_empty_but_valid() {
        let e = raw_engine();
        let snap = e.snapshot();
        assert!(snap.bounds.is_none());
        assert!(snap.roads.is_empty());
        assert!(snap.position.is_none());
    }

    #[test]
    fn document_round_trip_preserves_state() {
        let mut e = raw_engine();
        e.start_tracking();
        e.on_fix(fix(28.6139, 77.2090));
        e.on_fix(fix(28.6140, 77.2091));
        let id = e.assets_mut().place(AssetKind::Library, 50.0, 60.0);
        e.assets_mut().set_label(id, "Old Library").unwrap();
        e.viewport_mut().wheel_zoom(true);

        let doc = e.to_document("campus");

        let mut fresh = raw_engine();
        fresh.apply_document(&doc);
        assert_eq!(fresh.track().segments().len(), 1);
        assert_eq!(fresh.track().segments()[0].len(), 2);
        assert_eq!(fresh.assets().assets().len(), 1);
        assert_eq!(fresh.assets().assets()[0].label, "Old Library");
        assert_eq!(fresh.viewport().state().scale, e.viewport().state().scale);
        // Loaded roads re-seed the envelope so projection works.
        assert!(fresh.snapshot().bounds.is_some());
    }

    #[test]
    fn partial_document_leaves_missing_parts_alone() {
        let mut e = raw_engine();
        let id = e.assets_mut().place(AssetKind::Cafe, 10.0, 10.0);
        e.assets_mut().set_label(id, "Corner Cafe").unwrap();

        // Only a scale update; landmarks and roads are absent.
        let doc = MapDocument::from_json(r#"{"name":"p","data":{"scale":2.0}}"#).unwrap();
        e.apply_document(&doc);

        assert_eq!(e.assets().assets().len(), 1);
        assert_eq!(e.viewport().state().scale, 2.0);
    }

    #[test]
    fn unknown_landmark_kind_is_skipped_not_fatal() {
        let mut e = raw_engine();
        let doc = MapDocument::from_json(
            r#"{"name":"m","data":{"landmarks":[
                {"type":"house","x":1.0,"y":2.0,"width":48.0,"height":48.0},
                {"type":"spaceship","x":3.0,"y":4.0,"width":48.0,"height":48.0}
            ]}}"#,
        )
        .unwrap();
        e.apply_document(&doc);
        assert_eq!(e.assets().assets().len(), 1);
        assert_eq!(e.assets().assets()[0].kind, AssetKind::House);
    }

    #[test]
    fn draft_cache_save_restore_clear() {
        let mut store = InMemoryDraftStore::new();

        let mut e = raw_engine();
        e.start_tracking();
        e.on_fix(fix(28.6139, 77.2090));
        e.assets_mut().place(AssetKind::Gate, 5.0, 5.0);
        e.save_draft(&mut store).unwrap();

        let mut restored = raw_engine();
        assert!(restored.restore_draft(&store).unwrap());
        assert_eq!(restored.track().total_points(), 1);
        assert_eq!(restored.assets().assets().len(), 1);

        // After a successful remote save the draft is dropped.
        restored.clear_draft(&mut store).unwrap();
        let mut empty = raw_engine();
        assert!(!empty.restore_draft(&store).unwrap());
    }
}
