//! Target acquisition policy shared by explicit targeting and companion agents.
//!
//! Targets are never cached: every call re-resolves ids through the
//! [`TargetingContext`], which hands out snapshots so the policy never holds
//! an actor lock.

use crate::hostility;
use crate::state::{ActorId, ActorView, PartyId, Position, Targetable};

/// Read access to the world for targeting and validation.
pub trait TargetingContext {
    fn view(&self, id: ActorId) -> Option<ActorView>;

    /// Party members in join order.
    fn party_members(&self, party: PartyId) -> Vec<ActorId>;

    /// Actors within `radius` of `center`, in id order.
    fn nearby(&self, center: Position, radius: u32) -> Vec<ActorView>;
}

/// What kind of target a skill wants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TargetMode {
    /// Most wounded friendly actor.
    Supportive,
    /// The owner's current target, if it may be attacked.
    Offensive { force: bool },
}

/// Picks a target around `owner` within `radius`.
pub fn select_target(
    owner: &ActorView,
    mode: TargetMode,
    ctx: &dyn TargetingContext,
    radius: u32,
) -> Option<ActorId> {
    match mode {
        TargetMode::Supportive => select_supportive(owner, ctx, radius),
        TargetMode::Offensive { force } => select_offensive(owner, ctx, radius, force),
    }
}

/// Candidate ids for supportive selection, in scan order.
fn supportive_candidates(owner: &ActorView, ctx: &dyn TargetingContext) -> Vec<ActorId> {
    let scoped = owner.social.in_solo_duel() || owner.social.in_olympiad();
    match owner.social.party {
        Some(party) if !scoped => {
            let mut candidates = Vec::new();
            for member in ctx.party_members(party) {
                candidates.push(member);
                if let Some(summon) = ctx.view(member).and_then(|view| view.summon) {
                    candidates.push(summon);
                }
            }
            candidates
        }
        _ => std::iter::once(owner.id).chain(owner.summon).collect(),
    }
}

fn select_supportive(
    owner: &ActorView,
    ctx: &dyn TargetingContext,
    radius: u32,
) -> Option<ActorId> {
    let mut best: Option<ActorView> = None;
    for id in supportive_candidates(owner, ctx) {
        let Some(view) = ctx.view(id) else {
            continue;
        };
        if view.is_dead() || view.vitals.is_full_hp() {
            continue;
        }
        if !owner.position.within_range(view.position, radius) {
            continue;
        }
        // Strictly lower only: ties keep the first one found.
        let better = best
            .as_ref()
            .is_none_or(|current| view.vitals.hp_ratio_below(&current.vitals));
        if better {
            best = Some(view);
        }
    }
    best.map(|view| view.id)
}

fn select_offensive(
    owner: &ActorView,
    ctx: &dyn TargetingContext,
    radius: u32,
    force: bool,
) -> Option<ActorId> {
    let target = ctx.view(owner.target?)?;
    if target.is_dead() || !target.is_visible() {
        return None;
    }
    if !hostility::evaluate(owner, &target, force).is_hostile() {
        return None;
    }
    owner
        .position
        .within_range(target.position, radius)
        .then_some(target.id)
}
