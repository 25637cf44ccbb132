//! Values derived from a player's experience.

/// Returns the level reached with the given experience.
///
/// The square root is taken in double precision and the difference
/// truncated to an integer before the integer division by 100.
///
/// ```
/// use players::level::level;
/// assert_eq!(level(0), 0);
/// assert_eq!(level(100), 1);
/// ```
pub fn level(experience: i32) -> i32 {
    let radicand = 2500 + 200 * i64::from(experience);

    ((radicand as f64).sqrt() - 50.0) as i32 / 100
}

/// Returns how much experience is still missing to reach the level
/// after `level`.
pub fn until_next_level(experience: i32, level: i32) -> i32 {
    50 * (level + 1) * (level + 2) - experience
}
