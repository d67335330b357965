//! Static level progression and referral bonus tables.
//!
//! Presentation columns (artwork, colors) live client-side; the server
//! only needs the thresholds and bonus amounts.

/// One tier of the level progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Level {
    pub name: &'static str,
    /// Minimum lifetime points to hold this level.
    pub min_points: u64,
    /// Bonus granted per invited friend at this level.
    pub friend_bonus: u64,
    /// Bonus granted per invited Telegram-premium friend.
    pub friend_bonus_premium: u64,
}

/// Level tiers, ordered by ascending `min_points`.
pub const LEVELS: &[Level] = &[
    Level {
        name: "Meme Newbie",
        min_points: 0,
        friend_bonus: 0,
        friend_bonus_premium: 0,
    },
    Level {
        name: "GIF Jockey",
        min_points: 5_000,
        friend_bonus: 5_000,
        friend_bonus_premium: 10_000,
    },
    Level {
        name: "Meme Scout",
        min_points: 25_000,
        friend_bonus: 10_000,
        friend_bonus_premium: 20_000,
    },
    Level {
        name: "Viral Rookie",
        min_points: 100_000,
        friend_bonus: 20_000,
        friend_bonus_premium: 40_000,
    },
    Level {
        name: "Dank Dealer",
        min_points: 1_000_000,
        friend_bonus: 50_000,
        friend_bonus_premium: 100_000,
    },
    Level {
        name: "Meme Mystic",
        min_points: 2_500_000,
        friend_bonus: 100_000,
        friend_bonus_premium: 150_000,
    },
    Level {
        name: "Laugh Lord",
        min_points: 10_000_000,
        friend_bonus: 200_000,
        friend_bonus_premium: 300_000,
    },
    Level {
        name: "Troll Boss",
        min_points: 25_000_000,
        friend_bonus: 400_000,
        friend_bonus_premium: 600_000,
    },
    Level {
        name: "Meme Titan",
        min_points: 50_000_000,
        friend_bonus: 750_000,
        friend_bonus_premium: 1_000_000,
    },
    Level {
        name: "Cosmic Memelord",
        min_points: 100_000_000,
        friend_bonus: 1_000_000,
        friend_bonus_premium: 2_000_000,
    },
];

/// Flat bonus granted to the referrer for a standard invite.
pub const REFERRAL_BONUS_BASE: u64 = 5_000;

/// Flat bonus granted to the referrer for a Telegram-premium invite.
pub const REFERRAL_BONUS_PREMIUM: u64 = 25_000;

/// How long a started task must wait before completion can be claimed.
pub const TASK_WAIT_TIME_SECS: u64 = 60 * 60;

/// Index into [`LEVELS`] for a points total.
pub fn level_index_for_points(points: u64) -> usize {
    LEVELS
        .iter()
        .rposition(|level| points >= level.min_points)
        .unwrap_or(0)
}

/// The level a points total places the player at.
pub fn level_for_points(points: u64) -> &'static Level {
    &LEVELS[level_index_for_points(points)]
}

/// Percentage progress (0–100) from the current level to the next.
///
/// The final level always reports 100.
pub fn progress_to_next_level(points: u64) -> u8 {
    let index = level_index_for_points(points);
    let current = &LEVELS[index];
    let Some(next) = LEVELS.get(index + 1) else {
        return 100;
    };

    let span = next.min_points - current.min_points;
    let gained = points - current.min_points;
    ((gained * 100) / span).min(100) as u8
}
