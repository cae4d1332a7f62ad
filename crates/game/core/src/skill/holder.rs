use crate::skill::SkillRef;
use crate::state::{ActorId, Position};

/// Input modifiers attached to a cast request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CastOptions {
    /// Explicit target; falls back to the caster's selected target.
    pub target: Option<ActorId>,
    /// Point for ground-targeted skills.
    pub ground: Option<Position>,
    /// Force attack: offensive skills may hit unflagged players.
    pub force: bool,
    /// Alternate input (hold position): never step toward the target.
    pub alt_input: bool,
}

impl CastOptions {
    pub fn at(target: ActorId) -> Self {
        Self {
            target: Some(target),
            ..Self::default()
        }
    }

    pub fn on_ground(point: Position) -> Self {
        Self {
            ground: Some(point),
            ..Self::default()
        }
    }

    pub fn forced(mut self) -> Self {
        self.force = true;
        self
    }
}

/// One occupied skill-use slot on an actor (current, companion or queued).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SkillUseHolder {
    pub skill: SkillRef,
    pub force: bool,
    pub alt_input: bool,
    /// Target as requested; re-resolved whenever the holder is acted upon.
    pub target: Option<ActorId>,
    pub ground: Option<Position>,
}

impl SkillUseHolder {
    pub fn new(skill: SkillRef, options: CastOptions) -> Self {
        Self {
            skill,
            force: options.force,
            alt_input: options.alt_input,
            target: options.target,
            ground: options.ground,
        }
    }

    /// Rebuilds the request options this holder was created from.
    pub fn options(&self) -> CastOptions {
        CastOptions {
            target: self.target,
            ground: self.ground,
            force: self.force,
            alt_input: self.alt_input,
        }
    }
}
