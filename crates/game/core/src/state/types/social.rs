//! Social standing used by the hostility policy.
//!
//! Party, clan and alliance membership, duel and olympiad participation,
//! siege side, karma and the pvp flag. Clan, siege and olympiad *logic*
//! lives elsewhere in the server; this module only carries the facts.

/// Party identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PartyId(pub u32);

/// Clan identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClanId(pub u32);

/// Alliance identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AllyId(pub u32);

/// Participation in a duel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DuelState {
    pub duel_id: u32,
    /// Side within the duel (team A = 0, team B = 1).
    pub side: u8,
    /// Party duels pit whole parties against each other.
    pub party_duel: bool,
}

/// Participation in an olympiad match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OlympiadState {
    pub game_id: u32,
    pub side: u8,
    /// Combat is only legal once the match has started.
    pub started: bool,
}

/// Everything the hostility policy needs to know about an actor's allegiances.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SocialContext {
    pub party: Option<PartyId>,
    pub clan: Option<ClanId>,
    pub ally: Option<AllyId>,
    /// Clans this actor's clan has declared war on.
    pub wars: Vec<ClanId>,
    pub karma: u32,
    pub pvp_flag: bool,
    pub duel: Option<DuelState>,
    pub olympiad: Option<OlympiadState>,
    pub siege_side: Option<u8>,
}

impl SocialContext {
    pub fn in_party(&self) -> bool {
        self.party.is_some()
    }

    /// In a duel that is not a party duel.
    pub fn in_solo_duel(&self) -> bool {
        self.duel.is_some_and(|duel| !duel.party_duel)
    }

    pub fn in_olympiad(&self) -> bool {
        self.olympiad.is_some()
    }

    pub fn same_party(&self, other: &SocialContext) -> bool {
        self.party.is_some() && self.party == other.party
    }

    pub fn same_clan(&self, other: &SocialContext) -> bool {
        self.clan.is_some() && self.clan == other.clan
    }

    pub fn same_ally(&self, other: &SocialContext) -> bool {
        self.ally.is_some() && self.ally == other.ally
    }

    /// Both clans have declared war on each other.
    pub fn at_mutual_war(&self, other: &SocialContext) -> bool {
        match (self.clan, other.clan) {
            (Some(mine), Some(theirs)) => {
                self.wars.contains(&theirs) && other.wars.contains(&mine)
            }
            _ => false,
        }
    }

    /// Karma or an active pvp flag make an actor attackable by anyone.
    pub fn is_flagged(&self) -> bool {
        self.karma > 0 || self.pvp_flag
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn war_must_be_mutual() {
        let mut a = SocialContext {
            clan: Some(ClanId(1)),
            wars: vec![ClanId(2)],
            ..Default::default()
        };
        let mut b = SocialContext {
            clan: Some(ClanId(2)),
            ..Default::default()
        };
        assert!(!a.at_mutual_war(&b));
        b.wars.push(ClanId(1));
        assert!(a.at_mutual_war(&b));
        a.clan = None;
        assert!(!a.at_mutual_war(&b));
    }

    #[test]
    fn missing_membership_never_matches() {
        let a = SocialContext::default();
        let b = SocialContext::default();
        assert!(!a.same_party(&b));
        assert!(!a.same_clan(&b));
        assert!(!a.same_ally(&b));
    }
}
