//! Shared hostility policy.
//!
//! One ordered rule list decides whether an attacker may treat a target as an
//! enemy. Player casts, aura/ground target filtering and companion agents all
//! go through [`evaluate`], so a rule change applies to every caster at once.
//!
//! Summons are judged through their owner: views of a summon carry the owner's
//! social context and [`ActorView::acting_player`] resolves to the owner.

use crate::state::{ActorView, ZoneFlags};

/// Why a target is not a valid enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Immunity {
    /// Attacker and target are the same player, or one is the other's summon.
    SelfOrOwnSummon,
    /// Monsters do not fight each other.
    SameFaction,
    PartyMember,
    /// Olympiad fighters only fight their own opponent.
    OlympiadScope,
    /// Duelists only fight their own opponent, and nobody interferes.
    DuelScope,
    PeaceZone,
    AllianceMember,
    ClanMember,
    SiegeAlly,
    /// Target carries neither karma nor a pvp flag and the request was not forced.
    NotFlagged,
}

/// Verdict of the hostility policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hostility {
    Hostile,
    Friendly(Immunity),
}

impl Hostility {
    pub fn is_hostile(self) -> bool {
        matches!(self, Hostility::Hostile)
    }
}

/// Evaluates the rules in order; the first rule that decides wins.
///
/// `force` is the force-attack modifier and only lifts the final flag check.
pub fn evaluate(attacker: &ActorView, target: &ActorView, force: bool) -> Hostility {
    use Hostility::{Friendly, Hostile};

    if attacker.acting_player() == target.acting_player() {
        return Friendly(Immunity::SelfOrOwnSummon);
    }

    match (attacker.kind.is_monster(), target.kind.is_monster()) {
        (true, true) => return Friendly(Immunity::SameFaction),
        (false, true) | (true, false) => return Hostile,
        (false, false) => {}
    }

    let (mine, theirs) = (&attacker.social, &target.social);

    if mine.same_party(theirs) {
        return Friendly(Immunity::PartyMember);
    }

    if mine.olympiad.is_some() || theirs.olympiad.is_some() {
        return match (mine.olympiad, theirs.olympiad) {
            (Some(a), Some(b)) if a.game_id == b.game_id && a.side != b.side && a.started => {
                Hostile
            }
            _ => Friendly(Immunity::OlympiadScope),
        };
    }

    if mine.duel.is_some() || theirs.duel.is_some() {
        return match (mine.duel, theirs.duel) {
            (Some(a), Some(b)) if a.duel_id == b.duel_id && a.side != b.side => Hostile,
            _ => Friendly(Immunity::DuelScope),
        };
    }

    // Declared war overrides the peace, alliance and clan immunities below.
    if mine.at_mutual_war(theirs) {
        return Hostile;
    }

    if attacker.in_zone(ZoneFlags::PEACE) || target.in_zone(ZoneFlags::PEACE) {
        return Friendly(Immunity::PeaceZone);
    }

    if attacker.in_zone(ZoneFlags::PVP) && target.in_zone(ZoneFlags::PVP) {
        return Hostile;
    }

    if mine.same_ally(theirs) {
        return Friendly(Immunity::AllianceMember);
    }
    if mine.same_clan(theirs) {
        return Friendly(Immunity::ClanMember);
    }

    if attacker.in_zone(ZoneFlags::SIEGE) && target.in_zone(ZoneFlags::SIEGE) {
        if let (Some(a), Some(b)) = (mine.siege_side, theirs.siege_side) {
            return if a == b {
                Friendly(Immunity::SiegeAlly)
            } else {
                Hostile
            };
        }
    }

    if theirs.is_flagged() || force {
        Hostile
    } else {
        Friendly(Immunity::NotFlagged)
    }
}
