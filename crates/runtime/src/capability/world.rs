use cast_core::{Pathfinding, Position};

/// Geometry without obstacles: everything is in sight.
#[derive(Clone, Copy, Debug, Default)]
pub struct OpenField;

impl Pathfinding for OpenField {
    fn can_see(&self, _from: Position, _to: Position) -> bool {
        true
    }
}
