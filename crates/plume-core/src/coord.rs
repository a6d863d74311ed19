//! Integer cell coordinates and axis helpers.

use glam::{DVec3, IVec3};
use std::fmt;
use std::ops::{Add, Sub};

/// One of the three grid axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Axis {
    /// The x axis (component 0).
    X,
    /// The y axis (component 1).
    Y,
    /// The z axis (component 2).
    Z,
}

impl Axis {
    /// All axes in component order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Component index of this axis (0, 1 or 2).
    pub fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }

    /// Unit coordinate step along this axis.
    pub fn unit(self) -> Coord {
        match self {
            Self::X => Coord::new(1, 0, 0),
            Self::Y => Coord::new(0, 1, 0),
            Self::Z => Coord::new(0, 0, 1),
        }
    }

    /// Unit vector along this axis, in index space.
    pub fn unit_vec(self) -> DVec3 {
        match self {
            Self::X => DVec3::X,
            Self::Y => DVec3::Y,
            Self::Z => DVec3::Z,
        }
    }
}

/// The six face-adjacent neighbour offsets, ordered `-x, +x, -y, +y, -z, +z`.
pub const NEIGHBOUR_OFFSETS: [Coord; 6] = [
    Coord::new(-1, 0, 0),
    Coord::new(1, 0, 0),
    Coord::new(0, -1, 0),
    Coord::new(0, 1, 0),
    Coord::new(0, 0, -1),
    Coord::new(0, 0, 1),
];

/// Integer coordinate of a voxel in index space.
///
/// Voxel centers sit at integer index positions; a staggered component
/// stored at `c` lives half a voxel below `c` along its own axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coord {
    /// Index along x.
    pub x: i32,
    /// Index along y.
    pub y: i32,
    /// Index along z.
    pub z: i32,
}

impl Coord {
    /// Largest component magnitude [`floor`](Self::floor) produces. Leaves
    /// headroom so stencil and neighbour offsets never overflow `i32`.
    pub const LIMIT: i32 = 1 << 30;

    /// Construct a coordinate from its components.
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Component along `axis`.
    pub fn get(self, axis: Axis) -> i32 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    /// Neighbour one step along `axis` in the positive direction.
    pub fn step_up(self, axis: Axis) -> Self {
        self + axis.unit()
    }

    /// Neighbour one step along `axis` in the negative direction.
    pub fn step_down(self, axis: Axis) -> Self {
        self - axis.unit()
    }

    /// The six face-adjacent neighbours in [`NEIGHBOUR_OFFSETS`] order.
    pub fn neighbours(self) -> [Coord; 6] {
        NEIGHBOUR_OFFSETS.map(|o| self + o)
    }

    /// Cell containing the index-space position `p` (componentwise floor).
    ///
    /// Components are clamped to `[-LIMIT, LIMIT]`, so positions beyond the
    /// lattice land on its edge. NaN maps to zero.
    pub fn floor(p: DVec3) -> Self {
        let lim = f64::from(Self::LIMIT);
        let f = p.floor();
        let clamp = |v: f64| v.clamp(-lim, lim) as i32;
        Self::new(clamp(f.x), clamp(f.y), clamp(f.z))
    }

    /// Index-space position of this voxel's center.
    pub fn as_dvec3(self) -> DVec3 {
        DVec3::new(self.x as f64, self.y as f64, self.z as f64)
    }
}

impl Add for Coord {
    type Output = Coord;

    fn add(self, rhs: Coord) -> Coord {
        Coord::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Coord {
    type Output = Coord;

    fn sub(self, rhs: Coord) -> Coord {
        Coord::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl From<IVec3> for Coord {
    fn from(v: IVec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl From<Coord> for IVec3 {
    fn from(c: Coord) -> Self {
        IVec3::new(c.x, c.y, c.z)
    }
}

impl From<[i32; 3]> for Coord {
    fn from(v: [i32; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}
