//! Resource pools and the combat numbers handed to the formulas capability.

/// Current and maximum HP/MP.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vitals {
    pub hp: u32,
    pub max_hp: u32,
    pub mp: u32,
    pub max_mp: u32,
}

impl Vitals {
    pub const fn full(max_hp: u32, max_mp: u32) -> Self {
        Self {
            hp: max_hp,
            max_hp,
            mp: max_mp,
            max_mp,
        }
    }

    pub fn is_full_hp(&self) -> bool {
        self.hp >= self.max_hp
    }

    /// Compares HP ratios without floating point: `self.hp/self.max < other.hp/other.max`.
    pub fn hp_ratio_below(&self, other: &Vitals) -> bool {
        let lhs = u64::from(self.hp) * u64::from(other.max_hp.max(1));
        let rhs = u64::from(other.hp) * u64::from(self.max_hp.max(1));
        lhs < rhs
    }

    /// Removes up to `amount` HP and returns what was actually removed.
    pub fn drain_hp(&mut self, amount: u32) -> u32 {
        let actual = amount.min(self.hp);
        self.hp -= actual;
        actual
    }

    /// Restores up to `amount` HP, capped at the maximum.
    pub fn restore_hp(&mut self, amount: u32) -> u32 {
        let actual = amount.min(self.max_hp.saturating_sub(self.hp));
        self.hp += actual;
        actual
    }
}

impl Default for Vitals {
    fn default() -> Self {
        Self::full(100, 100)
    }
}

/// Soulshot/spiritshot charge on the caster's weapon.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChargedShot {
    #[default]
    None,
    Spiritshot,
    BlessedSpiritshot,
}

impl ChargedShot {
    /// Magic attack multiplier granted by the charge.
    pub fn matk_multiplier(self) -> f64 {
        match self {
            ChargedShot::None => 1.0,
            ChargedShot::Spiritshot => 2.0,
            ChargedShot::BlessedSpiritshot => 4.0,
        }
    }
}

/// Stats consumed by the combat-formula capability.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatProfile {
    pub level: u32,
    pub m_atk: u32,
    pub m_def: u32,
    /// Magic critical rate in tenths of a percent.
    pub m_crit_rate: u32,
    /// Shield block rate in percent; zero when no shield is equipped.
    pub shield_rate: u32,
    /// Chance in percent to bounce magic skills back.
    pub reflect_rate: u32,
    pub charged: ChargedShot,
}

impl Default for CombatProfile {
    fn default() -> Self {
        Self {
            level: 1,
            m_atk: 10,
            m_def: 10,
            m_crit_rate: 20,
            shield_rate: 0,
            reflect_rate: 0,
            charged: ChargedShot::None,
        }
    }
}
