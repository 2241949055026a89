use crate::asset::{Asset, AssetId, AssetKind, Corner, DEFAULT_SIZE, MIN_SIZE};

/// Radius around an asset within which a release still counts as "near
/// an asset", so stray touch releases do not clear the selection.
pub const NEAR_TOLERANCE_PX: f64 = 16.0;

/// Per-layer interaction state.
///
/// One explicit machine instead of scattered booleans: an asset is
/// never dragged and resized at the same time.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub enum Interaction {
    #[default]
    Idle,
    Dragging {
        id: AssetId,
        grab_dx: f64,
        grab_dy: f64,
        moved: bool,
    },
    Resizing {
        id: AssetId,
        corner: Corner,
        anchor_x: f64,
        anchor_y: f64,
    },
}

/// What a pointer release resolved to.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ReleaseOutcome {
    /// A drag or resize ended. Motion suppresses the click-to-select
    /// that would otherwise fire on release.
    GestureEnded,
    Selected(AssetId),
    Deselected,
    /// Release near an asset without hitting one, or nothing to do.
    Ignored,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LabelError {
    /// Empty or whitespace-only input; the editor stays open.
    Empty,
    UnknownAsset,
}

impl std::fmt::Display for LabelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LabelError::Empty => write!(f, "label must not be empty"),
            LabelError::UnknownAsset => write!(f, "no such asset"),
        }
    }
}

impl std::error::Error for LabelError {}

/// Owns every placed landmark plus the single-item selection and the
/// drag/resize interaction state.
#[derive(Debug, Default)]
pub struct AssetLayer {
    next_id: u32,
    assets: Vec<Asset>,
    selected: Option<AssetId>,
    /// Asset whose label editor is open (newly placed or rejected edit).
    pending_label: Option<AssetId>,
    interaction: Interaction,
}

impl AssetLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    pub fn get(&self, id: AssetId) -> Option<&Asset> {
        self.assets.iter().find(|a| a.id == id)
    }

    pub fn selected(&self) -> Option<AssetId> {
        self.selected
    }

    pub fn pending_label(&self) -> Option<AssetId> {
        self.pending_label
    }

    pub fn interaction(&self) -> Interaction {
        self.interaction
    }

    /// Places a new asset with default size and an empty label, and
    /// opens the label editor for it.
    pub fn place(&mut self, kind: AssetKind, x: f64, y: f64) -> AssetId {
        let id = AssetId(self.next_id);
        self.next_id += 1;
        self.assets.push(Asset {
            id,
            kind,
            x,
            y,
            width: DEFAULT_SIZE,
            height: DEFAULT_SIZE,
            label: String::new(),
        });
        self.pending_label = Some(id);
        id
    }

    /// Restores an asset from a loaded document under a fresh session
    /// id, without opening the label editor.
    pub fn insert(&mut self, kind: AssetKind, x: f64, y: f64, width: f64, height: f64, label: String) -> AssetId {
        let id = AssetId(self.next_id);
        self.next_id += 1;
        self.assets.push(Asset {
            id,
            kind,
            x,
            y,
            width: width.max(MIN_SIZE),
            height: height.max(MIN_SIZE),
            label,
        });
        id
    }

    /// Selects `id`, deselecting any other asset.
    ///
    /// No-op while a drag or resize is in progress: a gesture that moved
    /// the pointer must not double as a click. Returns `true` if the
    /// selection changed.
    pub fn select(&mut self, id: AssetId) -> bool {
        if self.interaction != Interaction::Idle {
            return false;
        }
        if self.get(id).is_none() || self.selected == Some(id) {
            return false;
        }
        self.selected = Some(id);
        true
    }

    pub fn deselect(&mut self) -> bool {
        self.selected.take().is_some()
    }

    /// Moves an asset. Legal whenever the asset exists, selected or not.
    pub fn move_to(&mut self, id: AssetId, x: f64, y: f64) -> bool {
        match self.assets.iter_mut().find(|a| a.id == id) {
            Some(a) => {
                a.x = x;
                a.y = y;
                true
            }
            None => false,
        }
    }

    /// Sets the label from trimmed user input. Whitespace-only input is
    /// rejected without mutation and the editor stays open.
    pub fn set_label(&mut self, id: AssetId, text: &str) -> Result<(), LabelError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(LabelError::Empty);
        }
        let Some(asset) = self.assets.iter_mut().find(|a| a.id == id) else {
            return Err(LabelError::UnknownAsset);
        };
        asset.label = trimmed.to_string();
        if self.pending_label == Some(id) {
            self.pending_label = None;
        }
        Ok(())
    }

    /// Closes the label editor without saving (user dismissed it).
    pub fn cancel_label_edit(&mut self) {
        self.pending_label = None;
    }

    /// Deletes an asset. Selection clears only if it pointed here.
    pub fn remove(&mut self, id: AssetId) -> bool {
        let before = self.assets.len();
        self.assets.retain(|a| a.id != id);
        if self.assets.len() == before {
            return false;
        }
        if self.selected == Some(id) {
            self.selected = None;
        }
        if self.pending_label == Some(id) {
            self.pending_label = None;
        }
        match self.interaction {
            Interaction::Dragging { id: gid, .. } | Interaction::Resizing { id: gid, .. }
                if gid == id =>
            {
                self.interaction = Interaction::Idle;
            }
            _ => {}
        }
        true
    }

    /// Topmost asset under `(px, py)`; ties break toward the lower id,
    /// keeping hit testing deterministic.
    pub fn hit_test(&self, px: f64, py: f64, tolerance: f64) -> Option<AssetId> {
        self.assets
            .iter()
            .filter(|a| a.contains(px, py, tolerance))
            .map(|a| a.id)
            .min()
    }

    pub fn near_any_asset(&self, px: f64, py: f64) -> bool {
        self.hit_test(px, py, NEAR_TOLERANCE_PX).is_some()
    }

    /// Starts dragging from a press on the asset body. Only reachable
    /// from idle.
    pub fn begin_drag(&mut self, id: AssetId, px: f64, py: f64) -> bool {
        if self.interaction != Interaction::Idle {
            return false;
        }
        let Some(asset) = self.get(id) else {
            return false;
        };
        self.interaction = Interaction::Dragging {
            id,
            grab_dx: px - asset.x,
            grab_dy: py - asset.y,
            moved: false,
        };
        true
    }

    /// Starts resizing from a press on a corner handle. The opposite
    /// corner becomes the fixed anchor. Only reachable from idle.
    pub fn begin_resize(&mut self, id: AssetId, corner: Corner) -> bool {
        if self.interaction != Interaction::Idle {
            return false;
        }
        let Some(asset) = self.get(id) else {
            return false;
        };
        let (anchor_x, anchor_y) = asset.corner(corner.opposite());
        self.interaction = Interaction::Resizing {
            id,
            corner,
            anchor_x,
            anchor_y,
        };
        true
    }

    /// Advances the in-progress gesture to the current pointer position.
    pub fn pointer_move(&mut self, px: f64, py: f64) {
        match self.interaction {
            Interaction::Idle => {}
            Interaction::Dragging {
                id,
                grab_dx,
                grab_dy,
                ..
            } => {
                let x = px - grab_dx;
                let y = py - grab_dy;
                if self.move_to(id, x, y) {
                    self.interaction = Interaction::Dragging {
                        id,
                        grab_dx,
                        grab_dy,
                        moved: true,
                    };
                }
            }
            Interaction::Resizing {
                id,
                corner,
                anchor_x,
                anchor_y,
            } => {
                self.apply_resize(id, corner, anchor_x, anchor_y, px, py);
            }
        }
    }

    /// Resolves a pointer release at `(px, py)`.
    ///
    /// Ends any in-progress gesture (wherever the pointer is); a gesture
    /// that moved suppresses click-to-select. A plain release selects
    /// the hit asset, keeps the selection when near one, and deselects
    /// otherwise.
    pub fn pointer_up(&mut self, px: f64, py: f64) -> ReleaseOutcome {
        match std::mem::take(&mut self.interaction) {
            Interaction::Dragging { id, moved, .. } => {
                if moved {
                    ReleaseOutcome::GestureEnded
                } else if self.select(id) {
                    // Press-and-release on the body without motion is a click.
                    ReleaseOutcome::Selected(id)
                } else {
                    ReleaseOutcome::Ignored
                }
            }
            Interaction::Resizing { .. } => ReleaseOutcome::GestureEnded,
            Interaction::Idle => {
                if let Some(id) = self.hit_test(px, py, 0.0) {
                    if self.select(id) {
                        ReleaseOutcome::Selected(id)
                    } else {
                        ReleaseOutcome::Ignored
                    }
                } else if self.near_any_asset(px, py) {
                    ReleaseOutcome::Ignored
                } else if self.deselect() {
                    ReleaseOutcome::Deselected
                } else {
                    ReleaseOutcome::Ignored
                }
            }
        }
    }

    /// Direct resize entry point: recomputes the rect so the anchor
    /// (opposite corner) stays fixed, with both dimensions floored at
    /// `MIN_SIZE`.
    pub fn resize(&mut self, id: AssetId, corner: Corner, px: f64, py: f64) -> bool {
        let Some(asset) = self.get(id) else {
            return false;
        };
        let (anchor_x, anchor_y) = asset.corner(corner.opposite());
        self.apply_resize(id, corner, anchor_x, anchor_y, px, py)
    }

    fn apply_resize(
        &mut self,
        id: AssetId,
        corner: Corner,
        anchor_x: f64,
        anchor_y: f64,
        px: f64,
        py: f64,
    ) -> bool {
        let Some(asset) = self.assets.iter_mut().find(|a| a.id == id) else {
            return false;
        };

        // Clamp first, then rebuild the rect off the anchor so the
        // anchor never drifts even when the pointer crosses it.
        let width = (px - anchor_x).abs().max(MIN_SIZE);
        let height = (py - anchor_y).abs().max(MIN_SIZE);

        let (x, y) = match corner {
            // The dragged corner determines which side of the anchor the
            // rect extends toward.
            Corner::Se => (anchor_x, anchor_y),
            Corner::Ne => (anchor_x, anchor_y - height),
            Corner::Sw => (anchor_x - width, anchor_y),
            Corner::Nw => (anchor_x - width, anchor_y - height),
        };

        asset.x = x;
        asset.y = y;
        asset.width = width;
        asset.height = height;
        true
    }
}
