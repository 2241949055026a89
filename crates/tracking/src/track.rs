use foundation::geo::GeoPoint;

/// Global render budget across all segments.
pub const POINT_BUDGET: usize = 1000;

/// One drawn road: an ordered polyline of accepted fixes.
///
/// Append-only while tracking is live; insertion order is significant.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RoadSegment {
    pub points: Vec<GeoPoint>,
}

impl RoadSegment {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Accumulates filtered fixes into road segments.
///
/// A new segment opens when tracking (re)starts or after an explicit
/// gap; consecutive duplicate fixes are coalesced.
#[derive(Debug, Default, Clone)]
pub struct RouteTrack {
    segments: Vec<RoadSegment>,
    open: bool,
}

impl RouteTrack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn segments(&self) -> &[RoadSegment] {
        &self.segments
    }

    pub fn total_points(&self) -> usize {
        self.segments.iter().map(RoadSegment::len).sum()
    }

    /// Opens a new segment. Called on tracking start and after a gap.
    /// An empty open segment is reused rather than stacked.
    pub fn start_segment(&mut self) {
        if self.open && self.segments.last().is_some_and(RoadSegment::is_empty) {
            return;
        }
        self.segments.push(RoadSegment::default());
        self.open = true;
    }

    /// Ends the open segment; subsequent appends start a new one.
    pub fn close_segment(&mut self) {
        self.open = false;
    }

    /// Appends a filtered fix to the open segment.
    ///
    /// Returns `false` when the fix was coalesced as a duplicate of the
    /// segment's last point (identical lat AND lng).
    pub fn append(&mut self, fix: GeoPoint) -> bool {
        if !self.open || self.segments.is_empty() {
            self.start_segment();
        }
        let Some(segment) = self.segments.last_mut() else {
            return false;
        };
        if segment.points.last() == Some(&fix) {
            return false;
        }
        segment.points.push(fix);
        true
    }

    pub fn clear(&mut self) {
        self.segments.clear();
        self.open = false;
    }

    /// Replaces the whole track, e.g. when loading a saved document.
    pub fn replace(&mut self, segments: Vec<RoadSegment>) {
        self.segments = segments;
        self.open = false;
    }

    /// Render-time view of the track, stride-sampled so the total point
    /// count stays within `budget` for any segment count.
    ///
    /// Each oversized segment keeps every `step`-th point plus, always,
    /// its final point; segments already under their share pass through
    /// untouched. Tracks with more segments than the budget fall back to
    /// thinning whole segments. The stored track is not mutated.
    pub fn downsampled(&self, budget: usize) -> Vec<RoadSegment> {
        let total = self.total_points();
        if total <= budget || self.segments.is_empty() || budget == 0 {
            return self.segments.clone();
        }

        if self.segments.len() > budget {
            // No per-segment share left. Keep one endpoint from every
            // step-th segment so the cap holds even here.
            let step = self.segments.len().div_ceil(budget);
            return self
                .segments
                .iter()
                .step_by(step)
                .filter_map(|segment| {
                    segment
                        .points
                        .last()
                        .map(|&last| RoadSegment { points: vec![last] })
                })
                .collect();
        }

        // floor(budget / n) points per segment caps the sum at budget.
        let per_segment = budget / self.segments.len();
        self.segments
            .iter()
            .map(|segment| {
                let len = segment.len();
                if len <= per_segment {
                    return segment.clone();
                }
                let step = len.div_ceil(per_segment);
                let mut points: Vec<GeoPoint> =
                    segment.points.iter().copied().step_by(step).collect();
                if let Some(&last) = segment.points.last()
                    && points.last() != Some(&last)
                {
                    // Never exceed the per-segment share: swap the tail
                    // sample for the true endpoint when at capacity.
                    if points.len() >= per_segment {
                        if let Some(tail) = points.last_mut() {
                            *tail = last;
                        }
                    } else {
                        points.push(last);
                    }
                }
                RoadSegment { points }
            })
            .collect()
    }
}
