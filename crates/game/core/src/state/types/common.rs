use std::fmt;

/// Unique identifier for any actor tracked by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActorId(pub u32);

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// World position in game units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Position {
    pub const ORIGIN: Self = Self { x: 0, y: 0, z: 0 };

    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Squared euclidean distance. Computed in i128: each axis delta fits in
    /// 33 bits, so three squares stay far below `i128::MAX`.
    pub fn distance_sq(self, other: Position) -> i128 {
        let dx = i128::from(self.x) - i128::from(other.x);
        let dy = i128::from(self.y) - i128::from(other.y);
        let dz = i128::from(self.z) - i128::from(other.z);
        dx * dx + dy * dy + dz * dz
    }

    /// Range test `dx² + dy² + dz² ≤ range²` (no square root).
    pub fn within_range(self, other: Position, range: u32) -> bool {
        let range = i128::from(range);
        self.distance_sq(other) <= range * range
    }
}

/// Coarse classification of an actor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum ActorKind {
    /// Human-controlled character.
    Player,
    /// Hostile NPC; always a valid offensive target.
    Monster,
    /// Servitor or pet bound to a player. Hostility is judged through its owner.
    Summon { owner: ActorId },
}

impl ActorKind {
    /// The player whose social standing governs this actor.
    pub fn acting_player(self, own_id: ActorId) -> ActorId {
        match self {
            ActorKind::Summon { owner } => owner,
            ActorKind::Player | ActorKind::Monster => own_id,
        }
    }

    pub fn is_monster(self) -> bool {
        matches!(self, ActorKind::Monster)
    }

    pub fn is_player(self) -> bool {
        matches!(self, ActorKind::Player)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_is_inclusive_and_three_dimensional() {
        let a = Position::new(0, 0, 0);
        assert!(a.within_range(Position::new(3, 4, 0), 5));
        assert!(!a.within_range(Position::new(3, 4, 1), 5));
        assert!(a.within_range(Position::new(0, 0, 900), 900));
    }

    #[test]
    fn opposite_corners_of_the_coordinate_space() {
        let low = Position::new(i32::MIN, i32::MIN, i32::MIN);
        let high = Position::new(i32::MAX, i32::MAX, i32::MAX);
        let span = i128::from(u32::MAX);
        assert_eq!(low.distance_sq(high), 3 * span * span);
        assert!(!low.within_range(high, 900));
        assert!(!low.within_range(high, u32::MAX));
        assert!(!Position::new(i32::MIN, 0, 0).within_range(Position::new(i32::MAX, 0, 0), 900));
    }

    #[test]
    fn widest_range_covers_a_full_axis() {
        assert!(Position::ORIGIN.within_range(Position::new(10, 0, 0), u32::MAX));
        assert!(Position::new(i32::MIN, 0, 0).within_range(Position::new(i32::MAX, 0, 0), u32::MAX));
    }
}
