use crate::constants::*;
use serde::*;

/// Integer map position as reported by the game.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct Location {
    x: i32,
    y: i32,
}

impl Location {
    pub fn new(x: i32, y: i32) -> Self {
        Location { x, y }
    }

    #[inline]
    pub fn x(self) -> i32 {
        self.x
    }

    #[inline]
    pub fn y(self) -> i32 {
        self.y
    }

    #[inline]
    pub fn as_point(self) -> Point {
        Point::new(self.x as f64, self.y as f64)
    }

    pub fn distance_to(self, other: Self) -> f64 {
        self.as_point().distance_to(other.as_point())
    }
}

impl Serialize for Location {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (self.x, self.y).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Location {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        <(i32, i32)>::deserialize(deserializer).map(|(x, y)| Location::new(x, y))
    }
}

/// Continuous position or displacement used by the path planner.
#[derive(Copy, Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    pub fn magnitude(self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn distance_to(self, other: Self) -> f64 {
        (self - other).magnitude()
    }

    /// Unit vector in the same direction, or `None` for a (near) zero vector.
    pub fn normalized(self) -> Option<Point> {
        let length = self.magnitude();
        if length < EPSILON || !length.is_finite() {
            return None;
        }
        Some(self * (1.0 / length))
    }

    /// Rotates counter-clockwise by `degrees`.
    pub fn rotated(self, degrees: f64) -> Point {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Point::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn clamped_to_map(self) -> Point {
        Point::new(
            self.x.clamp(0.0, MAP_WIDTH as f64),
            self.y.clamp(0.0, MAP_HEIGHT as f64),
        )
    }

    pub fn round(self) -> Location {
        Location::new(self.x.round() as i32, self.y.round() as i32)
    }
}

impl std::ops::Add for Point {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Point::new(self.x + other.x, self.y + other.y)
    }
}

impl std::ops::Sub for Point {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Point::new(self.x - other.x, self.y - other.y)
    }
}

impl std::ops::Mul<f64> for Point {
    type Output = Self;
    fn mul(self, scale: f64) -> Self {
        Point::new(self.x * scale, self.y * scale)
    }
}

impl From<Location> for Point {
    fn from(loc: Location) -> Self {
        loc.as_point()
    }
}
