/// Default side length for a freshly placed asset (pixels).
pub const DEFAULT_SIZE: f64 = 48.0;
/// Hard floor for asset width/height (pixels). Resize clamps here.
pub const MIN_SIZE: f64 = 32.0;

/// Stable identifier for a placed asset. Allocated by the layer,
/// never reused within a session.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetId(pub u32);

/// The landmark icon catalog.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum AssetKind {
    House,
    Building,
    Tree,
    Bench,
    Fountain,
    Gate,
    Parking,
    Cafe,
    Library,
    Office,
    Lab,
    Dorm,
    Gym,
    Field,
    Pool,
    Statue,
    Shop,
    Restroom,
    BusStop,
    Tower,
}

impl AssetKind {
    pub const ALL: [AssetKind; 20] = [
        AssetKind::House,
        AssetKind::Building,
        AssetKind::Tree,
        AssetKind::Bench,
        AssetKind::Fountain,
        AssetKind::Gate,
        AssetKind::Parking,
        AssetKind::Cafe,
        AssetKind::Library,
        AssetKind::Office,
        AssetKind::Lab,
        AssetKind::Dorm,
        AssetKind::Gym,
        AssetKind::Field,
        AssetKind::Pool,
        AssetKind::Statue,
        AssetKind::Shop,
        AssetKind::Restroom,
        AssetKind::BusStop,
        AssetKind::Tower,
    ];

    /// Wire name used by the persisted document shape.
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetKind::House => "house",
            AssetKind::Building => "building",
            AssetKind::Tree => "tree",
            AssetKind::Bench => "bench",
            AssetKind::Fountain => "fountain",
            AssetKind::Gate => "gate",
            AssetKind::Parking => "parking",
            AssetKind::Cafe => "cafe",
            AssetKind::Library => "library",
            AssetKind::Office => "office",
            AssetKind::Lab => "lab",
            AssetKind::Dorm => "dorm",
            AssetKind::Gym => "gym",
            AssetKind::Field => "field",
            AssetKind::Pool => "pool",
            AssetKind::Statue => "statue",
            AssetKind::Shop => "shop",
            AssetKind::Restroom => "restroom",
            AssetKind::BusStop => "bus_stop",
            AssetKind::Tower => "tower",
        }
    }

    /// Inverse of [`as_str`](Self::as_str) for loading saved documents.
    pub fn from_wire_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.as_str() == name)
    }
}

/// Resize handle corners. Each fixes the opposite corner as the anchor.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Corner {
    Nw,
    Ne,
    Sw,
    Se,
}

/// A placed landmark. Position and size are canvas coordinates; the
/// layer owns creation, mutation, and deletion.
#[derive(Debug, Clone, PartialEq)]
pub struct Asset {
    pub id: AssetId,
    pub kind: AssetKind,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub label: String,
}

impl Asset {
    /// Corner position of the asset rectangle.
    pub fn corner(&self, corner: Corner) -> (f64, f64) {
        match corner {
            Corner::Nw => (self.x, self.y),
            Corner::Ne => (self.x + self.width, self.y),
            Corner::Sw => (self.x, self.y + self.height),
            Corner::Se => (self.x + self.width, self.y + self.height),
        }
    }

    /// Whether `(px, py)` lies within the rectangle grown by `tolerance`
    /// on every side.
    pub fn contains(&self, px: f64, py: f64, tolerance: f64) -> bool {
        px >= self.x - tolerance
            && px <= self.x + self.width + tolerance
            && py >= self.y - tolerance
            && py <= self.y + self.height + tolerance
    }
}

impl Corner {
    pub fn opposite(&self) -> Corner {
        match self {
            Corner::Nw => Corner::Se,
            Corner::Ne => Corner::Sw,
            Corner::Sw => Corner::Ne,
            Corner::Se => Corner::Nw,
        }
    }
}
