//! Cooldown bookkeeping.
//!
//! Entries are keyed by [`SkillFamilyId`] so every level of a skill shares one
//! cooldown lineage. Times are wall-clock epoch milliseconds; the runtime
//! supplies `now` and owns the expiry timers. An entry is present exactly while
//! its cooldown is running: the expiry task removes it, and restore prunes
//! entries that are already (nearly) over.

use std::collections::HashMap;

use crate::capability::SkillOracle;
use crate::skill::{SkillFamilyId, SkillRef};

/// One running cooldown.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CooldownEntry {
    pub family: SkillFamilyId,
    /// Skill whose use started the cooldown; persisted with the record.
    pub skill: SkillRef,
    pub reuse_ms: u64,
    pub expiry_epoch_ms: i64,
}

impl CooldownEntry {
    pub fn started_at(family: SkillFamilyId, skill: SkillRef, reuse_ms: u64, now_ms: i64) -> Self {
        Self {
            family,
            skill,
            reuse_ms,
            expiry_epoch_ms: now_ms.saturating_add(clamp_ms(reuse_ms)),
        }
    }

    /// Milliseconds left, zero once expired.
    pub fn remaining_ms(&self, now_ms: i64) -> u64 {
        u64::try_from(self.expiry_epoch_ms.saturating_sub(now_ms)).unwrap_or(0)
    }

    pub fn is_active(&self, now_ms: i64) -> bool {
        now_ms < self.expiry_epoch_ms
    }

    pub fn to_record(&self) -> CooldownRecord {
        CooldownRecord {
            skill_id: self.skill.id.0,
            skill_level: self.skill.level.0,
            expiry_epoch_ms: self.expiry_epoch_ms,
            original_duration_ms: clamp_ms(self.reuse_ms),
        }
    }
}

/// Persisted cooldown layout.
///
/// Stores the absolute expiry rather than the time left so that cooldowns keep
/// running while the owner is offline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CooldownRecord {
    pub skill_id: i32,
    pub skill_level: i32,
    pub expiry_epoch_ms: i64,
    pub original_duration_ms: i64,
}

impl CooldownRecord {
    pub fn skill(&self) -> SkillRef {
        SkillRef::new(self.skill_id, self.skill_level)
    }
}

/// Per-actor cooldown map.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CooldownMap {
    entries: HashMap<SkillFamilyId, CooldownEntry>,
}

impl CooldownMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites the family's entry, returning the replaced one.
    pub fn insert(&mut self, entry: CooldownEntry) -> Option<CooldownEntry> {
        self.entries.insert(entry.family, entry)
    }

    pub fn get(&self, family: SkillFamilyId) -> Option<&CooldownEntry> {
        self.entries.get(&family)
    }

    /// Removes the entry only if it still carries `expiry_epoch_ms`.
    ///
    /// An expiry task armed for an overwritten entry must not delete its
    /// replacement.
    pub fn remove_if_expiry(&mut self, family: SkillFamilyId, expiry_epoch_ms: i64) -> bool {
        match self.entries.get(&family) {
            Some(entry) if entry.expiry_epoch_ms == expiry_epoch_ms => {
                self.entries.remove(&family);
                true
            }
            _ => false,
        }
    }

    /// Time left on the family's cooldown, `None` when it is available.
    pub fn remaining_ms(&self, family: SkillFamilyId, now_ms: i64) -> Option<u64> {
        self.entries
            .get(&family)
            .filter(|entry| entry.is_active(now_ms))
            .map(|entry| entry.remaining_ms(now_ms))
    }

    pub fn is_on_cooldown(&self, family: SkillFamilyId, now_ms: i64) -> bool {
        self.remaining_ms(family, now_ms).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &CooldownEntry> {
        self.entries.values()
    }

    /// Records for every running cooldown, ordered by family.
    pub fn snapshot(&self, now_ms: i64) -> Vec<CooldownRecord> {
        let mut active: Vec<_> = self
            .entries
            .values()
            .filter(|entry| entry.is_active(now_ms))
            .collect();
        active.sort_by_key(|entry| entry.family);
        active.into_iter().map(CooldownEntry::to_record).collect()
    }
}

/// Turns persisted records back into entries worth re-arming.
///
/// Records with `epsilon_ms` or less remaining are dropped. When several
/// records map to one family (a skill was leveled while on cooldown), the one
/// expiring last wins.
pub fn plan_restore(
    records: &[CooldownRecord],
    now_ms: i64,
    epsilon_ms: u64,
    skills: &dyn SkillOracle,
) -> Vec<CooldownEntry> {
    let mut planned: HashMap<SkillFamilyId, CooldownEntry> = HashMap::new();
    for record in records {
        let skill = record.skill();
        let entry = CooldownEntry {
            family: skills.family(skill),
            skill,
            reuse_ms: u64::try_from(record.original_duration_ms).unwrap_or(0),
            expiry_epoch_ms: record.expiry_epoch_ms,
        };
        if entry.remaining_ms(now_ms) <= epsilon_ms {
            continue;
        }
        match planned.get(&entry.family) {
            Some(existing) if existing.expiry_epoch_ms >= entry.expiry_epoch_ms => {}
            _ => {
                planned.insert(entry.family, entry);
            }
        }
    }
    let mut entries: Vec<_> = planned.into_values().collect();
    entries.sort_by_key(|entry| entry.family);
    entries
}

fn clamp_ms(ms: u64) -> i64 {
    i64::try_from(ms).unwrap_or(i64::MAX)
}
