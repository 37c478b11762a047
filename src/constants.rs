//! Task constants: alphabets, pattern catalogs, timing, and adaptation bounds.
//!
//! The pattern catalogs are fixed data tables. Cell indices are row-major over
//! the 3×3 grid:
//!
//! ```text
//! 0 1 2
//! 3 4 5
//! 6 7 8
//! ```
//!
//! Rows and columns are the only valid carriers for 3-cell relations —
//! diagonals never count. The five- and seven-cell catalogs are hand-chosen
//! shape lists reproduced as-is, not derived geometrically.

/// Number of cells in a grid.
pub const GRID_CELLS: usize = 9;

/// Number of symbols per cell string. Only the last symbol participates in
/// relation logic; the first two are noise.
pub const CELL_LEN: usize = 3;

/// Consonant-like alphabet for letter-task trials.
pub const CONSONANTS: [u8; 10] = *b"BCDFGHJKLM";

/// Digit alphabet for number-task trials. Disjoint from [`CONSONANTS`].
pub const DIGITS: [u8; 10] = *b"0123456789";

/// Row and column triples (no diagonals).
pub const THREE_PATTERNS: [[usize; 3]; 6] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
];

/// Cross and T-pentomino shapes: cross, T-up, T-down, T-left, T-right.
pub const FIVE_PATTERNS: [[usize; 5]; 5] = [
    [1, 3, 4, 5, 7],
    [0, 1, 2, 4, 7],
    [1, 3, 4, 5, 6],
    [0, 3, 4, 6, 7],
    [1, 2, 4, 5, 8],
];

/// Seven-cell shapes used by the highest difficulty tier.
pub const SEVEN_PATTERNS: [[usize; 7]; 4] = [
    [0, 1, 2, 3, 4, 5, 6],
    [0, 1, 2, 4, 6, 7, 8],
    [0, 1, 3, 4, 5, 7, 8],
    [1, 2, 3, 4, 5, 6, 7],
];

/// Cell-overlay colors for the multirelational mode.
pub const COLOR_NAMES: [&str; 10] = [
    "red", "blue", "green", "yellow", "purple", "orange", "pink", "cyan", "teal", "indigo",
];

/// Default response window per trial (ms).
pub const TRIAL_DURATION_MS: u32 = 5500;

/// Maximum number of extra cells the high-interference overlay forces to one
/// symbol. The overlay approximates the source study's 12-distractor
/// manipulation on a 9-cell grid; see `relation::add_high_interference`.
pub const INTERFERENCE_EXTRA_CELLS: usize = 6;

/// Carryover count bounds under the default persistence policy.
pub const CARRYOVER_MIN: usize = 1;
pub const CARRYOVER_MAX: usize = 4;

// ── Staircase bounds ────────────────────────────────────────────────────────

/// Trials between staircase checkpoints, and the rolling window width.
pub const STAIRCASE_WINDOW: usize = 10;
/// Rolling accuracy at or above which difficulty increases.
pub const STAIRCASE_RAISE: f64 = 0.8;
/// Rolling accuracy below which difficulty decreases.
pub const STAIRCASE_LOWER: f64 = 0.6;
/// Duration adjustment step (ms).
pub const STAIRCASE_DURATION_STEP: u32 = 500;
/// Shortest trial duration the staircase will reach (ms).
pub const STAIRCASE_DURATION_FLOOR: u32 = 3000;
/// Longest trial duration the staircase will reach (ms).
pub const STAIRCASE_DURATION_CEIL: u32 = 8000;
/// Duration restored when the object count steps up (ms).
pub const STAIRCASE_DURATION_RESET: u32 = 6000;
/// Object-count adjustment step.
pub const STAIRCASE_OBJECT_STEP: u32 = 2;
/// Object-count bounds.
pub const STAIRCASE_OBJECT_FLOOR: u32 = 3;
pub const STAIRCASE_OBJECT_CEIL: u32 = 7;

// ── N-back bounds ───────────────────────────────────────────────────────────

/// Trials between n-back checkpoints, and the rolling window width.
pub const NBACK_WINDOW: usize = 20;
/// Rolling accuracy at or above which the n-back depth advances.
pub const NBACK_ADVANCE: f64 = 0.75;
/// Maximum n-back depth.
pub const NBACK_MAX_DEPTH: usize = 3;

// ── Progress history caps ───────────────────────────────────────────────────

/// Rolling accuracy history entries kept in cross-session progress.
pub const ACCURACY_HISTORY_CAP: usize = 20;
/// Session history entries kept in cross-session progress.
pub const SESSION_HISTORY_CAP: usize = 50;
