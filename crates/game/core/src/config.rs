/// Tunable parameters for casting, cooldowns and companions.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CastConfig {
    /// Restored cooldowns with at most this much time left are dropped.
    pub restore_epsilon_ms: u64,
    /// Radius around the owner in which companions look for targets.
    pub companion_radius: u32,
    pub max_companions_per_owner: usize,
    /// Period of the background cooldown flush to the repository.
    pub cooldown_flush_interval_ms: u64,
    /// Damage breaks the target's cast unless it is uninterruptible.
    pub interrupt_on_damage: bool,
}

impl CastConfig {
    // ===== runtime-tunable defaults =====
    pub const DEFAULT_RESTORE_EPSILON_MS: u64 = 1_000;
    pub const DEFAULT_COMPANION_RADIUS: u32 = 900;
    pub const DEFAULT_MAX_COMPANIONS: usize = 3;
    pub const DEFAULT_FLUSH_INTERVAL_MS: u64 = 300_000;

    pub fn new() -> Self {
        Self {
            restore_epsilon_ms: Self::DEFAULT_RESTORE_EPSILON_MS,
            companion_radius: Self::DEFAULT_COMPANION_RADIUS,
            max_companions_per_owner: Self::DEFAULT_MAX_COMPANIONS,
            cooldown_flush_interval_ms: Self::DEFAULT_FLUSH_INTERVAL_MS,
            interrupt_on_damage: true,
        }
    }
}

impl Default for CastConfig {
    fn default() -> Self {
        Self::new()
    }
}
