/// Randomness used by companion agents.
///
/// Combat rolls go through [`super::CombatFormulas`]; this source only
/// drives activation chance and skill choice.
pub trait RandomSource: Send + Sync {
    /// Uniform roll in `1..=100`.
    fn roll_percent(&self) -> u32;

    /// Uniform index in `0..len`. Callers never pass zero.
    fn pick(&self, len: usize) -> usize;
}
