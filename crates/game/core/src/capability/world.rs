use crate::skill::SkillTemplate;
use crate::state::{ActorView, Position, Vitals};

/// Line of sight, consumed from the pathfinding layer.
pub trait Pathfinding: Send + Sync {
    fn can_see(&self, from: Position, to: Position) -> bool;
}

/// A resource a skill may consume.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum Resource {
    Mana,
    Health,
    /// Reagents and other items, owned by the inventory system.
    Item,
}

/// Decides whether a caster can pay for a skill, and takes the payment.
pub trait ResourceGate: Send + Sync {
    fn check(&self, caster: &ActorView, skill: &SkillTemplate) -> Result<(), Resource>;

    /// Deducts the cost. Only called after a successful [`ResourceGate::check`].
    fn consume(&self, vitals: &mut Vitals, skill: &SkillTemplate) {
        vitals.mp = vitals.mp.saturating_sub(skill.mp_cost);
        vitals.hp = vitals.hp.saturating_sub(skill.hp_cost);
    }
}

/// MP/HP accounting only; a skill may never cost the caster's last HP.
#[derive(Clone, Copy, Debug, Default)]
pub struct VitalsGate;

impl ResourceGate for VitalsGate {
    fn check(&self, caster: &ActorView, skill: &SkillTemplate) -> Result<(), Resource> {
        if caster.vitals.mp < skill.mp_cost {
            return Err(Resource::Mana);
        }
        if skill.hp_cost > 0 && caster.vitals.hp <= skill.hp_cost {
            return Err(Resource::Health);
        }
        Ok(())
    }
}
