//! Scoring module - line clear bonuses, leveling and drop speed
//!
//! Bonuses are flat per lock event and never multiplied by level.
//! Level is derived from the running total of cleared lines.

use crate::types::{BASE_DROP_MS, DROP_INTERVAL_MIN_MS, DROP_STEP_MS, LINES_PER_LEVEL, LINE_SCORES};

/// Points for clearing `lines` rows in a single lock event
/// lines: 0-4, anything larger scores nothing
pub fn line_clear_score(lines: usize) -> u32 {
    LINE_SCORES.get(lines).copied().unwrap_or(0)
}

/// Level management
/// Level starts at 1 and increases every 10 lines cleared
pub fn level_for_lines(total_lines: u32) -> u32 {
    total_lines / LINES_PER_LEVEL + 1
}

/// Get drop interval for a level (in milliseconds)
/// 1000ms at level 1, 100ms faster per level, never below 100ms
pub fn drop_interval_ms(level: u32) -> u32 {
    let speedup = level.saturating_sub(1).saturating_mul(DROP_STEP_MS);
    BASE_DROP_MS.saturating_sub(speedup).max(DROP_INTERVAL_MIN_MS)
}
