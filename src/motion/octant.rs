//! Octant classification of a move.
//!
//! Every displacement is mapped onto the first octant (`0 <= dy' <= dx'`) so a
//! single rasterization loop serves all directions. The branch order below
//! decides the boundary ties and must stay as is for reproducible step
//! sequences.

use crate::axis::Direction;

/// One of the two coordinated axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AxisId {
    /// Rotation axis.
    X,
    /// Pen-arm axis.
    Y,
}

impl AxisId {
    /// The other axis.
    #[inline]
    pub fn other(self) -> Self {
        match self {
            AxisId::X => AxisId::Y,
            AxisId::Y => AxisId::X,
        }
    }
}

/// Direction class of a displacement vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Octant {
    /// x major, x forward, y forward.
    Zero,
    /// y major, y forward, x forward.
    One,
    /// y major, y forward, x backward.
    Two,
    /// x major, x backward, y forward.
    Three,
    /// x major, x backward, y backward.
    Four,
    /// y major, y backward, x backward.
    Five,
    /// y major, y backward, x forward.
    Six,
    /// x major, x forward, y backward.
    Seven,
}

impl Octant {
    /// All octants in index order.
    pub const ALL: [Octant; 8] = [
        Octant::Zero,
        Octant::One,
        Octant::Two,
        Octant::Three,
        Octant::Four,
        Octant::Five,
        Octant::Six,
        Octant::Seven,
    ];

    /// Classify a displacement. `None` for the zero vector.
    pub fn classify(dx: i64, dy: i64) -> Option<Self> {
        if dx == 0 && dy == 0 {
            return None;
        }

        let octant = if dx > 0 {
            if dy > 0 {
                if dy < dx {
                    Octant::Zero
                } else {
                    Octant::One
                }
            } else if -dy < dx {
                Octant::Seven
            } else {
                Octant::Six
            }
        } else if dy > 0 {
            if dy < -dx {
                Octant::Three
            } else {
                Octant::Two
            }
        } else if -dy < -dx {
            Octant::Four
        } else {
            Octant::Five
        };

        Some(octant)
    }

    /// Numeric index, 0..=7.
    #[inline]
    pub fn index(self) -> u8 {
        self as u8
    }

    /// Axis that steps on every iteration.
    pub fn major_axis(self) -> AxisId {
        match self {
            Octant::Zero | Octant::Three | Octant::Four | Octant::Seven => AxisId::X,
            Octant::One | Octant::Two | Octant::Five | Octant::Six => AxisId::Y,
        }
    }

    /// Direction of the major axis.
    pub fn major_direction(self) -> Direction {
        match self {
            Octant::Zero | Octant::One | Octant::Two | Octant::Seven => Direction::Forward,
            Octant::Three | Octant::Four | Octant::Five | Octant::Six => Direction::Backward,
        }
    }

    /// Direction of the minor axis.
    pub fn minor_direction(self) -> Direction {
        match self {
            Octant::Zero | Octant::One | Octant::Three | Octant::Six => Direction::Forward,
            Octant::Two | Octant::Four | Octant::Five | Octant::Seven => Direction::Backward,
        }
    }

    /// Map `(dx, dy)` onto first-octant `(dx', dy')`.
    ///
    /// Only meaningful for a displacement this octant classified.
    pub fn transform(self, dx: i64, dy: i64) -> (i64, i64) {
        match self {
            Octant::Zero => (dx, dy),
            Octant::One => (dy, dx),
            Octant::Two => (dy, -dx),
            Octant::Three => (-dx, dy),
            Octant::Four => (-dx, -dy),
            Octant::Five => (-dy, -dx),
            Octant::Six => (-dy, dx),
            Octant::Seven => (dx, -dy),
        }
    }
}

/// Per-move rasterization plan.
///
/// Recomputed at the start of each move and dropped at its end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinePlan {
    /// Octant the move falls in.
    pub octant: Octant,

    /// Axis that steps every iteration.
    pub major: AxisId,

    /// Direction of the major axis.
    pub major_dir: Direction,

    /// Direction of the minor axis.
    pub minor_dir: Direction,

    /// Major axis step count (`dx'`).
    pub major_steps: u64,

    /// Minor axis step count (`dy'`), never above `major_steps`.
    pub minor_steps: u64,
}

impl LinePlan {
    /// Plan a move by `(dx, dy)`. `None` for the zero vector.
    pub fn new(dx: i64, dy: i64) -> Option<Self> {
        let octant = Octant::classify(dx, dy)?;
        let (major_steps, minor_steps) = octant.transform(dx, dy);

        Some(Self {
            octant,
            major: octant.major_axis(),
            major_dir: octant.major_direction(),
            minor_dir: octant.minor_direction(),
            major_steps: major_steps.unsigned_abs(),
            minor_steps: minor_steps.unsigned_abs(),
        })
    }

    /// Axis that steps only when the error term triggers.
    #[inline]
    pub fn minor(&self) -> AxisId {
        self.major.other()
    }

    /// Signed net displacement of `axis` once the plan has run.
    pub fn net_steps(&self, axis: AxisId) -> i64 {
        let (steps, dir) = if axis == self.major {
            (self.major_steps, self.major_dir)
        } else {
            (self.minor_steps, self.minor_dir)
        };
        steps as i64 * dir.sign()
    }
}
