/// Vertical metres credited per ride, multiplied by the lift number.
pub const VERTICAL_PER_LIFT: u64 = 10;

/// Season reported in every vertical read; the stub keeps a single season.
pub const SEASON_ID: &str = "2024";
