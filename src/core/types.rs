//! Strongly-typed wrappers for battle concepts
//!
//! Names, board coordinates, sides and attack phases get their own types so
//! they cannot be mixed up with bare strings and numbers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unit name (e.g. "Solar Knights")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitName(String);

impl UnitName {
    pub fn new(s: impl Into<String>) -> Self {
        UnitName(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UnitName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for UnitName {
    fn from(s: String) -> Self {
        UnitName(s)
    }
}

impl From<&str> for UnitName {
    fn from(s: &str) -> Self {
        UnitName(s.to_string())
    }
}

/// Player name (e.g. "Frank")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerName(String);

impl PlayerName {
    pub fn new(s: impl Into<String>) -> Self {
        PlayerName(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for PlayerName {
    fn from(s: String) -> Self {
        PlayerName(s)
    }
}

impl From<&str> for PlayerName {
    fn from(s: &str) -> Self {
        PlayerName(s.to_string())
    }
}

/// Which of the two forces a unit or player belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    A,
    B,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }

    /// Index into two-element per-side arrays
    pub fn index(self) -> usize {
        match self {
            Side::A => 0,
            Side::B => 1,
        }
    }

    pub fn both() -> [Side; 2] {
        [Side::A, Side::B]
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::A => write!(f, "A"),
            Side::B => write!(f, "B"),
        }
    }
}

/// Attack phase of an exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Missile,
    Melee,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Missile => write!(f, "missile"),
            Phase::Melee => write!(f, "melee"),
        }
    }
}

/// A point on the battlefield, in inches
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Position { x, y }
    }

    /// Straight-line distance
    pub fn distance_to(&self, other: &Position) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    /// Advance toward `target` by at most `max_distance`, stopping on it
    pub fn move_towards(&self, target: &Position, max_distance: f64) -> Position {
        let distance = self.distance_to(target);
        if distance <= max_distance || distance == 0.0 {
            return *target;
        }
        let ratio = max_distance / distance;
        Position::new(
            self.x + (target.x - self.x) * ratio,
            self.y + (target.y - self.y) * ratio,
        )
    }

    /// Move `distance` directly away from `from`
    ///
    /// Coincident points have no direction, so the unit backs off along +x.
    pub fn move_away(&self, from: &Position, distance: f64) -> Position {
        let dx = self.x - from.x;
        let dy = self.y - from.y;
        let len = (dx * dx + dy * dy).sqrt();
        if len == 0.0 {
            return Position::new(self.x + distance, self.y);
        }
        Position::new(self.x + dx / len * distance, self.y + dy / len * distance)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1})", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newtypes() {
        let name = UnitName::new("Solar Knights");
        assert_eq!(name.as_str(), "Solar Knights");
        assert_eq!(format!("{name}"), "Solar Knights");
        assert_eq!(PlayerName::from("Dee").as_str(), "Dee");
    }

    #[test]
    fn test_side_opponent() {
        assert_eq!(Side::A.opponent(), Side::B);
        assert_eq!(Side::B.opponent(), Side::A);
        assert_eq!(Side::B.index(), 1);
    }

    #[test]
    fn test_move_towards_never_overshoots() {
        let start = Position::new(0.0, 0.0);
        let target = Position::new(3.0, 4.0);

        let partial = start.move_towards(&target, 2.5);
        assert!((partial.distance_to(&start) - 2.5).abs() < 1e-9);
        assert!((partial.distance_to(&target) - 2.5).abs() < 1e-9);

        // Movement larger than the distance lands exactly on the target
        assert_eq!(start.move_towards(&target, 12.0), target);
    }

    #[test]
    fn test_move_away() {
        let me = Position::new(10.0, 10.0);
        let enemy = Position::new(10.0, 9.0);
        let moved = me.move_away(&enemy, 6.0);
        assert!((moved.y - 16.0).abs() < 1e-9);
        assert!((moved.x - 10.0).abs() < 1e-9);

        let stacked = me.move_away(&me, 3.0);
        assert_eq!(stacked, Position::new(13.0, 10.0));
    }
}
