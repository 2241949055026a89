use foundation::projection::ScreenPoint;

/// Zoom clamp range.
pub const MIN_SCALE: f64 = 0.5;
pub const MAX_SCALE: f64 = 4.0;
/// Multiplicative step per wheel notch.
pub const WHEEL_ZOOM_STEP: f64 = 1.1;

/// Persisted pan/zoom state.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ViewportState {
    pub scale: f64,
    pub pan_x: f64,
    pub pan_y: f64,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            scale: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
        }
    }
}

/// Active gesture over the canvas background.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
enum Gesture {
    #[default]
    Idle,
    Panning {
        last: ScreenPoint,
    },
    Pinching {
        last_distance: f64,
        last_midpoint: ScreenPoint,
    },
}

/// Pan/zoom state machine: wheel zoom, single-pointer drag pan, and
/// two-pointer pinch (combined zoom and pan around the pinch center).
#[derive(Debug)]
pub struct ViewportController {
    state: ViewportState,
    gesture: Gesture,
    drag_enabled: bool,
}

impl Default for ViewportController {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewportController {
    pub fn new() -> Self {
        Self {
            state: ViewportState::default(),
            gesture: Gesture::Idle,
            drag_enabled: true,
        }
    }

    pub fn state(&self) -> ViewportState {
        self.state
    }

    pub fn set_state(&mut self, state: ViewportState) {
        self.state = ViewportState {
            scale: state.scale.clamp(MIN_SCALE, MAX_SCALE),
            ..state
        };
    }

    /// Disables drag-pan, e.g. while an asset gesture owns the pointer.
    pub fn set_drag_enabled(&mut self, enabled: bool) {
        self.drag_enabled = enabled;
        if !enabled && matches!(self.gesture, Gesture::Panning { .. }) {
            self.gesture = Gesture::Idle;
        }
    }

    /// Wheel zoom. Positive steps zoom in by `WHEEL_ZOOM_STEP` each,
    /// negative steps zoom out, always clamped to the scale range.
    pub fn wheel_zoom(&mut self, zoom_in: bool) {
        let next = if zoom_in {
            self.state.scale * WHEEL_ZOOM_STEP
        } else {
            self.state.scale / WHEEL_ZOOM_STEP
        };
        self.state.scale = next.clamp(MIN_SCALE, MAX_SCALE);
    }

    /// Pointer-down on empty canvas; starts panning when drag is enabled.
    pub fn pointer_down(&mut self, at: ScreenPoint) {
        if self.drag_enabled && self.gesture == Gesture::Idle {
            self.gesture = Gesture::Panning { last: at };
        }
    }

    pub fn pointer_move(&mut self, at: ScreenPoint) {
        if let Gesture::Panning { last } = self.gesture {
            self.state.pan_x += at.x - last.x;
            self.state.pan_y += at.y - last.y;
            self.gesture = Gesture::Panning { last: at };
        }
    }

    /// Pointer-up; the accumulated pan offset is already captured.
    pub fn pointer_up(&mut self) {
        if matches!(self.gesture, Gesture::Panning { .. }) {
            self.gesture = Gesture::Idle;
        }
    }

    /// Feeds the current set of active touches.
    ///
    /// Two touches enter (or continue) the pinch state; each move scales
    /// by the distance ratio and pans by the midpoint delta so the pinch
    /// center stays visually fixed. Fewer than two touches end it.
    pub fn touches(&mut self, active: &[ScreenPoint]) {
        if active.len() < 2 {
            if matches!(self.gesture, Gesture::Pinching { .. }) {
                self.gesture = Gesture::Idle;
            }
            return;
        }

        let distance = touch_distance(active[0], active[1]);
        let midpoint = touch_midpoint(active[0], active[1]);

        if let Gesture::Pinching {
            last_distance,
            last_midpoint,
        } = self.gesture
        {
            if last_distance > 0.0 {
                let next = self.state.scale * (distance / last_distance);
                self.state.scale = next.clamp(MIN_SCALE, MAX_SCALE);
            }
            self.state.pan_x += midpoint.x - last_midpoint.x;
            self.state.pan_y += midpoint.y - last_midpoint.y;
        }

        self.gesture = Gesture::Pinching {
            last_distance: distance,
            last_midpoint: midpoint,
        };
    }

    pub fn is_panning(&self) -> bool {
        matches!(self.gesture, Gesture::Panning { .. })
    }

    pub fn is_pinching(&self) -> bool {
        matches!(self.gesture, Gesture::Pinching { .. })
    }
}

fn touch_distance(a: ScreenPoint, b: ScreenPoint) -> f64 {
    ((b.x - a.x).powi(2) + (b.y - a.y).powi(2)).sqrt()
}

fn touch_midpoint(a: ScreenPoint, b: ScreenPoint) -> ScreenPoint {
    ScreenPoint::new((a.x + b.x) * 0.5, (a.y + b.y) * 0.5)
}
