/// Mean Earth radius (meters), as used by the haversine formula.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Geodetic coordinates in degrees.
///
/// A recorded fix is immutable; filtering produces new points rather than
/// editing old ones.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

/// Geographic envelope of everything recorded so far.
///
/// Invariant: `min_lat <= max_lat` and `min_lng <= max_lng` once at least
/// one point has been recorded.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GeoBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl GeoBounds {
    pub fn around(point: GeoPoint) -> Self {
        Self {
            min_lat: point.lat,
            max_lat: point.lat,
            min_lng: point.lng,
            max_lng: point.lng,
        }
    }

    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            (self.min_lat + self.max_lat) * 0.5,
            (self.min_lng + self.max_lng) * 0.5,
        )
    }
}

/// Running envelope over an incoming fix stream.
///
/// Widens monotonically; undefined before the first fix. Reset only when
/// tracking restarts.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct GeoEnvelope {
    bounds: Option<GeoBounds>,
}

impl GeoEnvelope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bounds(&self) -> Option<GeoBounds> {
        self.bounds
    }

    pub fn expand(&mut self, point: GeoPoint) {
        match &mut self.bounds {
            None => self.bounds = Some(GeoBounds::around(point)),
            Some(b) => {
                b.min_lat = b.min_lat.min(point.lat);
                b.max_lat = b.max_lat.max(point.lat);
                b.min_lng = b.min_lng.min(point.lng);
                b.max_lng = b.max_lng.max(point.lng);
            }
        }
    }

    pub fn reset(&mut self) {
        self.bounds = None;
    }
}

/// Great-circle distance between two points, in meters.
pub fn haversine_m(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlng = (b.lng - a.lng).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}

/// Initial bearing (forward azimuth) from `a` to `b`, degrees in `[0, 360)`.
pub fn initial_bearing_deg(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlng = (b.lng - a.lng).to_radians();

    let y = dlng.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlng.cos();

    (y.atan2(x).to_degrees() + 360.0) % 360.0
}

#[cfg(test)]
mod tests {
    use super::{GeoEnvelope, GeoPoint, haversine_m, initial_bearing_deg};

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn haversine_zero_for_identical_points() {
        let p = GeoPoint::new(28.6139, 77.2090);
        assert_close(haversine_m(p, p), 0.0, 1e-9);
    }

    #[test]
    fn haversine_adjacent_fixes_delhi() {
        let a = GeoPoint::new(28.6139, 77.2090);
        let b = GeoPoint::new(28.6140, 77.2091);
        let d = haversine_m(a, b);
        assert!(d > 10.0 && d < 20.0, "expected ~14m, got {d}");
    }

    #[test]
    fn haversine_equator_degree_of_longitude() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(0.0, 1.0);
        // One degree of longitude at the equator is ~111.2 km.
        assert_close(haversine_m(a, b), 111_194.9, 100.0);
    }

    #[test]
    fn bearing_due_east() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(0.0, 1.0);
        assert_close(initial_bearing_deg(a, b), 90.0, 1e-6);
    }

    #[test]
    fn bearing_due_north() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(1.0, 0.0);
        assert_close(initial_bearing_deg(a, b), 0.0, 1e-6);
    }

    #[test]
    fn bearing_wraps_into_0_360() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(0.0, -1.0);
        assert_close(initial_bearing_deg(a, b), 270.0, 1e-6);
    }

    #[test]
    fn envelope_widens_monotonically() {
        let mut env = GeoEnvelope::new();
        assert!(env.bounds().is_none());

        env.expand(GeoPoint::new(10.0, 20.0));
        let b = env.bounds().unwrap();
        assert_eq!(b.min_lat, 10.0);
        assert_eq!(b.max_lat, 10.0);

        env.expand(GeoPoint::new(12.0, 18.0));
        let b = env.bounds().unwrap();
        assert_eq!(b.min_lat, 10.0);
        assert_eq!(b.max_lat, 12.0);
        assert_eq!(b.min_lng, 18.0);
        assert_eq!(b.max_lng, 20.0);
    }

    #[test]
    fn envelope_reset_clears_bounds() {
        let mut env = GeoEnvelope::new();
        env.expand(GeoPoint::new(1.0, 1.0));
        env.reset();
        assert!(env.bounds().is_none());
    }
}
