//! Tick range alignment for the single concentrated position.

use amm_sandbox_domain::math::MAX_TICK;

/// Half-width of the default range, in tick spacings.
pub const DEFAULT_RANGE_SPACINGS: i32 = 10;

/// Outermost multiple of `spacing` inside the tick domain.
pub fn max_usable_tick(spacing: i32) -> i32 {
    let spacing = spacing.max(1);
    MAX_TICK / spacing * spacing
}

/// Mirror of [`max_usable_tick`]; `MIN_TICK == -MAX_TICK`.
pub fn min_usable_tick(spacing: i32) -> i32 {
    -max_usable_tick(spacing)
}

/// Largest multiple of `spacing` not above `tick`, within the usable domain.
pub fn align_tick_down(tick: i32, spacing: i32) -> i32 {
    let spacing = spacing.max(1);
    let safe = tick.clamp(min_usable_tick(spacing), max_usable_tick(spacing));
    safe - safe.rem_euclid(spacing)
}

/// Smallest multiple of `spacing` not below `tick`, within the usable domain.
pub fn align_tick_up(tick: i32, spacing: i32) -> i32 {
    let spacing = spacing.max(1);
    let down = align_tick_down(tick, spacing);
    if down >= tick {
        down
    } else {
        (down + spacing).min(max_usable_tick(spacing))
    }
}

/// Aligns a requested range outward to `spacing` and guarantees
/// `lower < upper`, both multiples of `spacing`. Returns `(tick_lower, tick_upper)`.
pub fn normalize_range(tick_lower: i32, tick_upper: i32, spacing: i32) -> (i32, i32) {
    let spacing = spacing.max(1);
    let mut lower = align_tick_down(tick_lower, spacing);
    let mut upper = align_tick_up(tick_upper, spacing);

    if upper <= lower {
        upper = max_usable_tick(spacing).min(lower + spacing);
    }
    if upper <= lower {
        lower = min_usable_tick(spacing).max(upper - spacing);
    }
    (lower, upper)
}

/// Range of `DEFAULT_RANGE_SPACINGS` spacings either side of `tick_current`.
pub fn default_range_around(tick_current: i32, spacing: i32) -> (i32, i32) {
    let width = spacing * DEFAULT_RANGE_SPACINGS;
    normalize_range(tick_current - width, tick_current + width, spacing)
}

/// The position earns and trades only while `lower <= tick < upper`.
pub fn is_tick_in_range(tick: i32, tick_lower: i32, tick_upper: i32) -> bool {
    tick >= tick_lower && tick < tick_upper
}
