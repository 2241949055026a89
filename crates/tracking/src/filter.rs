use foundation::geo::{GeoPoint, haversine_m};
use tracing::debug;

use crate::kalman::ScalarKalman;

/// Maximum plausible jump between consecutive accepted fixes (meters).
/// Anything farther is treated as GPS noise and dropped.
pub const OUTLIER_THRESHOLD_M: f64 = 30.0;

/// Outcome of feeding one raw fix through the filter.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum FilterDecision {
    Accepted(GeoPoint),
    /// The fix jumped too far from the last accepted one. No state was
    /// mutated; tracking continues from the previous fix.
    Rejected {
        distance_m: f64,
    },
}

/// Outlier rejection plus optional per-axis smoothing over a raw fix
/// stream.
///
/// Fixes are processed strictly in delivery order, one at a time. The
/// lat and lng smoothers are independent instances.
#[derive(Debug)]
pub struct PositionFilter {
    smoothing: bool,
    last_accepted: Option<GeoPoint>,
    lat_filter: ScalarKalman,
    lng_filter: ScalarKalman,
}

impl PositionFilter {
    pub fn new(smoothing: bool) -> Self {
        Self {
            smoothing,
            last_accepted: None,
            lat_filter: ScalarKalman::default(),
            lng_filter: ScalarKalman::default(),
        }
    }

    pub fn last_accepted(&self) -> Option<GeoPoint> {
        self.last_accepted
    }

    /// Drops all filter state. Required whenever tracking restarts, so a
    /// stale estimate cannot bleed into the new session.
    pub fn reset(&mut self) {
        self.last_accepted = None;
        self.lat_filter = ScalarKalman::default();
        self.lng_filter = ScalarKalman::default();
    }

    pub fn accept(&mut self, raw: GeoPoint) -> FilterDecision {
        if let Some(prev) = self.last_accepted {
            let distance_m = haversine_m(raw, prev);
            if distance_m > OUTLIER_THRESHOLD_M {
                debug!(distance_m, "rejected gps fix as outlier");
                return FilterDecision::Rejected { distance_m };
            }
        }

        let filtered = if self.smoothing {
            GeoPoint::new(self.lat_filter.update(raw.lat), self.lng_filter.update(raw.lng))
        } else {
            raw
        };

        self.last_accepted = Some(filtered);
        FilterDecision::Accepted(filtered)
    }
}
