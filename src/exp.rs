//! Experience points to user level conversion.

/// Minimum experience for levels 1 through 10.
const LEVEL_TABLE: [i64; 10] = [0, 100, 250, 500, 950, 1600, 2500, 3600, 5100, 7200];

/// Highest reachable level.
pub const MAX_LEVEL: u32 = 10;

/// Sentinel returned by [`next_level_exp`] once the top level is reached.
pub const MAX_LEVEL_EXP: i64 = 999_999;

pub fn exp_to_level(exp: i64) -> u32 {
    let mut level = 1;
    for (idx, threshold) in LEVEL_TABLE.iter().enumerate() {
        if exp >= *threshold {
            level = idx as u32 + 1;
        } else {
            break;
        }
    }
    level
}

/// Experience needed to reach the level after the one `exp` grants.
pub fn next_level_exp(exp: i64) -> i64 {
    let next = exp_to_level(exp) + 1;
    if next > MAX_LEVEL {
        return MAX_LEVEL_EXP;
    }
    LEVEL_TABLE[(next - 1) as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds() {
        assert_eq!(exp_to_level(-5), 1);
        assert_eq!(exp_to_level(0), 1);
        assert_eq!(exp_to_level(99), 1);
        assert_eq!(exp_to_level(100), 2);
        assert_eq!(exp_to_level(949), 4);
        assert_eq!(exp_to_level(7200), 10);
        assert_eq!(exp_to_level(1_000_000), 10);
    }

    #[test]
    fn next_level() {
        assert_eq!(next_level_exp(0), 100);
        assert_eq!(next_level_exp(260), 500);
        assert_eq!(next_level_exp(5100), 7200);
        assert_eq!(next_level_exp(7200), MAX_LEVEL_EXP);
    }
}
