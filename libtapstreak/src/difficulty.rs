//! Streak-parameterized difficulty
//!
//! Each cycle recomputes its windows and square size from the current
//! streak. Nothing is carried over from the previous cycle.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A timing window that shrinks linearly with the streak down to a floor
///
/// `at(streak) = max(start_ms - step_ms * streak, floor_ms)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowCurve {
    pub start_ms: u64,
    pub step_ms: u64,
    pub floor_ms: u64,
}

impl Default for WindowCurve {
    fn default() -> Self {
        Self {
            start_ms: 1250,
            step_ms: 10,
            floor_ms: 500,
        }
    }
}

impl WindowCurve {
    pub fn at(&self, streak: u32) -> Duration {
        let shrink = self.step_ms.saturating_mul(u64::from(streak));
        Duration::from_millis(self.start_ms.saturating_sub(shrink).max(self.floor_ms))
    }
}

/// Square size as a fraction of the board, shrinking with the streak
///
/// `at(board, streak) = max(board / divisor - streak / streak_divisor, board / floor_divisor)`
///
/// `streak_divisor = 1` shrinks by one unit per hit; `10` shrinks by one
/// unit every ten hits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizeCurve {
    pub divisor: u32,
    pub floor_divisor: u32,
    pub streak_divisor: u32,
}

impl Default for SizeCurve {
    fn default() -> Self {
        Self {
            divisor: 8,
            floor_divisor: 18,
            streak_divisor: 1,
        }
    }
}

impl SizeCurve {
    pub fn at(&self, board_size: u32, streak: u32) -> u32 {
        // Zero divisors are rejected by config validation; clamp anyway so this stays total
        let base = board_size / self.divisor.max(1);
        let floor = board_size / self.floor_divisor.max(1);
        base.saturating_sub(streak / self.streak_divisor.max(1)).max(floor)
    }
}

/// All three difficulty functions together
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Difficulty {
    /// Pause between a hit (or game start) and the next square
    pub delay: WindowCurve,

    /// How long a square stays hittable
    pub duration: WindowCurve,

    pub size: SizeCurve,
}

impl Difficulty {
    pub fn delay(&self, streak: u32) -> Duration {
        self.delay.at(streak)
    }

    pub fn duration(&self, streak: u32) -> Duration {
        self.duration.at(streak)
    }

    pub fn square_size(&self, board_size: u32, streak: u32) -> u32 {
        self.size.at(board_size, streak)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_windows_start_at_1250ms() {
        let difficulty = Difficulty::default();
        assert_eq!(difficulty.delay(0), Duration::from_millis(1250));
        assert_eq!(difficulty.duration(0), Duration::from_millis(1250));
    }

    #[test]
    fn test_windows_shrink_ten_ms_per_hit() {
        let difficulty = Difficulty::default();
        assert_eq!(difficulty.delay(4), Duration::from_millis(1210));
        assert_eq!(difficulty.duration(50), Duration::from_millis(750));
    }

    #[test]
    fn test_windows_reach_floor_at_streak_75() {
        let difficulty = Difficulty::default();
        assert_eq!(difficulty.duration(74), Duration::from_millis(510));
        assert_eq!(difficulty.duration(75), Duration::from_millis(500));
        assert_eq!(difficulty.duration(76), Duration::from_millis(500));
    }

    #[test]
    fn test_windows_never_below_floor() {
        let difficulty = Difficulty::default();
        for streak in 0..=1000 {
            assert!(difficulty.delay(streak) >= Duration::from_millis(500));
            assert!(difficulty.duration(streak) >= Duration::from_millis(500));
        }
        assert_eq!(difficulty.delay(u32::MAX), Duration::from_millis(500));
    }

    #[test]
    fn test_size_on_default_board() {
        let size = SizeCurve::default();
        assert_eq!(size.at(100, 0), 12);
        assert_eq!(size.at(100, 4), 8);
        assert_eq!(size.at(100, 7), 5);
        assert_eq!(size.at(100, 8), 5);
    }

    #[test]
    fn test_size_never_below_floor() {
        let size = SizeCurve::default();
        for board in [18, 100, 720, 1080] {
            let floor = board / 18;
            for streak in 0..=1000 {
                assert!(size.at(board, streak) >= floor);
            }
        }
    }

    #[test]
    fn test_size_with_slow_streak_divisor() {
        let size = SizeCurve {
            streak_divisor: 10,
            ..SizeCurve::default()
        };
        assert_eq!(size.at(100, 9), 12);
        assert_eq!(size.at(100, 10), 11);
        assert_eq!(size.at(100, 69), 6);
        assert_eq!(size.at(100, 1000), 5);
    }

    #[test]
    fn test_zero_divisors_do_not_panic() {
        let size = SizeCurve {
            divisor: 0,
            floor_divisor: 0,
            streak_divisor: 0,
        };
        assert_eq!(size.at(100, 3), 100);
    }

    #[test]
    fn test_difficulty_from_partial_toml() {
        let difficulty: Difficulty = toml::from_str(
            r#"
            [duration]
            floor_ms = 300

            [size]
            streak_divisor = 10
            "#,
        )
        .unwrap();

        assert_eq!(difficulty.delay, WindowCurve::default());
        assert_eq!(difficulty.duration.start_ms, 1250);
        assert_eq!(difficulty.duration.floor_ms, 300);
        assert_eq!(difficulty.size.streak_divisor, 10);
        assert_eq!(difficulty.size.divisor, 8);
    }
}
