use crate::geo::{GeoBounds, GeoPoint};

/// Padding applied to the fitted bounds on all sides (degrees), so a
/// track hugging the envelope edge does not render on the canvas border.
pub const BOUNDS_PAD_DEG: f64 = 0.0002;

/// Floor for lat/lng ranges. Keeps the fit scales finite when the
/// envelope is a single point.
pub const RANGE_EPSILON_DEG: f64 = 1e-9;

/// Canvas pixel coordinates. Derived from a `GeoPoint`, never stored as
/// the source of truth for anything geodetic.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Canvas size in pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CanvasSize {
    pub width: f64,
    pub height: f64,
}

impl CanvasSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width: width.max(1.0),
            height: height.max(1.0),
        }
    }
}

/// Projects a geodetic point onto the canvas by fitting the current
/// envelope into the viewport.
///
/// The fit is recomputed from the bounds passed in on every call, so as
/// the envelope grows with new fixes every previously drawn point shifts
/// to keep the whole track inside the viewport. Screen Y is inverted
/// relative to latitude (north is up).
///
/// Both fit scales derive from the longitude range; the vertical fit
/// matches the source projection rather than an isotropic one.
pub fn project(
    point: GeoPoint,
    bounds: GeoBounds,
    canvas: CanvasSize,
    user_scale: f64,
) -> ScreenPoint {
    let min_lat = bounds.min_lat - BOUNDS_PAD_DEG;
    let max_lat = bounds.max_lat + BOUNDS_PAD_DEG;
    let min_lng = bounds.min_lng - BOUNDS_PAD_DEG;
    let max_lng = bounds.max_lng + BOUNDS_PAD_DEG;

    let lng_range = (max_lng - min_lng).max(RANGE_EPSILON_DEG);

    let fit_scale_x = canvas.width / lng_range;
    let fit_scale_y = canvas.height / lng_range;
    let dynamic_scale = fit_scale_x.min(fit_scale_y);
    let effective_scale = dynamic_scale * user_scale;

    let center_lat = (min_lat + max_lat) * 0.5;
    let center_lng = (min_lng + max_lng) * 0.5;

    let x = canvas.width * 0.5 + (point.lng - center_lng) * effective_scale;
    let y = canvas.height * 0.5 - (point.lat - center_lat) * effective_scale;

    ScreenPoint::new(x, y)
}
