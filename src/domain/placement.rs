//! Placement Types
//!
//! The two coordinate representations a task carries: a discrete quadrant
//! coordinate for the Eisenhower board and a continuous canvas position for
//! the freeform board. Both live on the same record; each board reads its own
//! placement through a projection type and never touches the other board's
//! field directly.

use serde::{Deserialize, Serialize};

/// Margin (in percent) a canvas drop is clamped to on both axes,
/// so a task can never sit flush against or beyond the canvas edge.
pub const CANVAS_MARGIN_PCT: f64 = 5.0;

/// Discrete quadrant coordinate.
///
/// x: 0 = not urgent, 1 = urgent. y: 0 = not important, 1 = important.
/// (-1, -1) means unassigned (sidebar).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuadrantCoords {
    pub x: i8,
    pub y: i8,
}

impl QuadrantCoords {
    pub const UNASSIGNED: QuadrantCoords = QuadrantCoords { x: -1, y: -1 };

    pub fn new(x: i8, y: i8) -> Self {
        Self { x, y }
    }

    /// Whether this coordinate names one of the four quadrant cells
    pub fn is_assigned(&self) -> bool {
        self.x >= 0 && self.y >= 0
    }

    /// The quadrant this coordinate falls in, if assigned
    pub fn quadrant(&self) -> Option<Quadrant> {
        match (self.x, self.y) {
            (1, 1) => Some(Quadrant::Do),
            (0, 1) => Some(Quadrant::Schedule),
            (1, 0) => Some(Quadrant::Delegate),
            (0, 0) => Some(Quadrant::Eliminate),
            _ => None,
        }
    }
}

impl Default for QuadrantCoords {
    fn default() -> Self {
        Self::UNASSIGNED
    }
}

/// The four Eisenhower cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quadrant {
    /// Urgent & important
    Do,
    /// Not urgent & important
    Schedule,
    /// Urgent & not important
    Delegate,
    /// Not urgent & not important
    Eliminate,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [
        Quadrant::Do,
        Quadrant::Schedule,
        Quadrant::Delegate,
        Quadrant::Eliminate,
    ];

    pub fn coords(&self) -> QuadrantCoords {
        match self {
            Quadrant::Do => QuadrantCoords::new(1, 1),
            Quadrant::Schedule => QuadrantCoords::new(0, 1),
            Quadrant::Delegate => QuadrantCoords::new(1, 0),
            Quadrant::Eliminate => QuadrantCoords::new(0, 0),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Quadrant::Do => "Do",
            Quadrant::Schedule => "Schedule",
            Quadrant::Delegate => "Delegate",
            Quadrant::Eliminate => "Eliminate",
        }
    }
}

/// Continuous position on the freeform canvas, in percent of canvas size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasPosition {
    pub x: f64,
    pub y: f64,
}

impl CanvasPosition {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Clamp both axes into [CANVAS_MARGIN_PCT, 100 - CANVAS_MARGIN_PCT]
    pub fn clamped(self) -> Self {
        let lo = CANVAS_MARGIN_PCT;
        let hi = 100.0 - CANVAS_MARGIN_PCT;
        Self {
            x: self.x.clamp(lo, hi),
            y: self.y.clamp(lo, hi),
        }
    }
}

/// The quadrant board's view of a task's placement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuadrantPlacement {
    Cell(Quadrant),
    Sidebar,
}

/// The freeform board's view of a task's placement
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FreePlacement {
    /// Placed on the canvas, with stacking order
    Canvas { position: CanvasPosition, z: i64 },
    /// In the side list
    List,
}
