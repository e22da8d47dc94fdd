//! Framework-wide tunables.

/// Central holder for gameplay constants.
///
/// Kept as associated consts so call sites read `GameConfig::STRONG_FACTOR`
/// rather than scattering magic numbers.
pub struct GameConfig;

impl GameConfig {
    /// Stat value reported when no stat formula has been registered.
    pub const DEFAULT_STAT: i32 = 1;

    /// Damage multiplier when the offensive element is strong over the
    /// defensive one.
    pub const STRONG_FACTOR: f64 = 2.0;

    /// Damage multiplier when the offensive element is weak over the
    /// defensive one.
    pub const WEAK_FACTOR: f64 = 0.5;

    /// Damage multiplier when the offensive element has no effect.
    pub const USELESS_FACTOR: f64 = 0.0;

    /// Damage multiplier for unrelated elements.
    pub const NEUTRAL_FACTOR: f64 = 1.0;

    /// Frame delta assumed when no frame-time source is configured (60 fps).
    pub const DEFAULT_FRAME_DELTA: f64 = 0.016666;
}
