use foundation::geo::{GeoPoint, haversine_m, initial_bearing_deg};

/// Within this distance of the destination the user has arrived,
/// whatever the bearing says.
pub const ARRIVAL_RADIUS_M: f64 = 30.0;

/// One turn-by-turn update.
#[derive(Debug, Clone, PartialEq)]
pub struct Guidance {
    pub distance_m: f64,
    pub instruction: String,
    /// True when the instruction text changed since the last update.
    /// Hosts gate spoken announcements on this so identical consecutive
    /// instructions are not re-announced.
    pub announce: bool,
}

/// Derives discrete turn instructions from live position, device
/// heading, and a chosen destination.
///
/// Recomputes on every filtered position and every heading update while
/// a destination is set.
#[derive(Debug, Default)]
pub struct NavigationAdvisor {
    destination: Option<GeoPoint>,
    position: Option<GeoPoint>,
    heading_deg: f64,
    last_instruction: Option<String>,
}

impl NavigationAdvisor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn destination(&self) -> Option<GeoPoint> {
        self.destination
    }

    pub fn set_destination(&mut self, destination: GeoPoint) -> Option<Guidance> {
        self.destination = Some(destination);
        self.last_instruction = None;
        self.recompute()
    }

    pub fn clear_destination(&mut self) {
        self.destination = None;
        self.last_instruction = None;
    }

    pub fn on_position(&mut self, position: GeoPoint) -> Option<Guidance> {
        self.position = Some(position);
        self.recompute()
    }

    pub fn on_heading(&mut self, heading_deg: f64) -> Option<Guidance> {
        self.heading_deg = heading_deg.rem_euclid(360.0);
        self.recompute()
    }

    fn recompute(&mut self) -> Option<Guidance> {
        let destination = self.destination?;
        let position = self.position?;

        let guidance = if !position.is_finite() || !destination.is_finite() {
            Guidance {
                distance_m: 0.0,
                instruction: "Waiting for location data.".to_string(),
                announce: false,
            }
        } else {
            let distance_m = haversine_m(position, destination);
            let instruction = if distance_m <= ARRIVAL_RADIUS_M {
                "You have arrived at your destination.".to_string()
            } else {
                let bearing = initial_bearing_deg(position, destination);
                let relative = (bearing - self.heading_deg + 360.0).rem_euclid(360.0);
                format!(
                    "{}. Head {}.",
                    turn_phrase(relative),
                    compass_phrase(bearing)
                )
            };
            Guidance {
                distance_m,
                instruction,
                announce: false,
            }
        };

        let announce = self.last_instruction.as_deref() != Some(guidance.instruction.as_str());
        self.last_instruction = Some(guidance.instruction.clone());
        Some(Guidance {
            announce,
            ..guidance
        })
    }
}

/// Maps a relative bearing onto eight 45°-wide turn buckets centered on
/// the cardinal relative directions.
fn turn_phrase(relative_deg: f64) -> &'static str {
    match bucket_45(relative_deg) {
        0 => "Continue straight",
        1 => "Make a slight right",
        2 => "Turn right",
        3 => "Make a sharp right",
        4 => "Turn around",
        5 => "Make a sharp left",
        6 => "Turn left",
        _ => "Make a slight left",
    }
}

/// Compass phrase from the raw (not relative) bearing.
fn compass_phrase(bearing_deg: f64) -> &'static str {
    match bucket_45(bearing_deg) {
        0 => "north",
        1 => "northeast",
        2 => "east",
        3 => "southeast",
        4 => "south",
        5 => "southwest",
        6 => "west",
        _ => "northwest",
    }
}

/// Index of the 45°-wide bucket centered on `index * 45°`.
fn bucket_45(deg: f64) -> usize {
    (((deg.rem_euclid(360.0) + 22.5) / 45.0).floor() as usize) % 8
}
