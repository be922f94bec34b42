//! Named default constants for every config knob.

/// Maximum hop count when scoring graph paths.
pub const DEFAULT_HOP_LIMIT: usize = 3;
/// Per-strategy retrieval deadline (milliseconds). A strategy that misses
/// it contributes nothing; the query still returns.
pub const DEFAULT_STRATEGY_TIMEOUT_MS: u64 = 2_000;
/// Graph score assigned to chunks with no bridge links, so unlinked
/// content is not unfairly penalized. Configurable, not a fixed constant.
pub const DEFAULT_UNLINKED_GRAPH_SCORE: f64 = 0.5;
/// Default vector/graph mixing coefficient.
pub const DEFAULT_ALPHA: f64 = 0.6;
/// Candidates fetched per strategy before combination.
pub const DEFAULT_TOP_N_PER_STRATEGY: usize = 20;

/// Policy-gradient learning rate.
pub const DEFAULT_LEARNING_RATE: f64 = 0.05;
/// Smoothing factor for the moving-average reward baseline.
pub const DEFAULT_BASELINE_SMOOTHING: f64 = 0.9;
/// Credit decay per retrieval iteration, counted back from the final one.
pub const DEFAULT_ITERATION_CREDIT_DECAY: f64 = 0.5;
/// Bounded retries for a conflicting parameter update.
pub const DEFAULT_UPDATE_MAX_RETRIES: u32 = 8;
/// Base backoff between update retries (milliseconds).
pub const DEFAULT_UPDATE_RETRY_BACKOFF_MS: u64 = 2;
/// Retrieval traces retained while awaiting feedback; oldest evicted first.
pub const DEFAULT_MAX_PENDING_TRACES: usize = 10_000;

/// Authority mix: baseline credential share.
pub const DEFAULT_AUTHORITY_BASELINE_SHARE: f64 = 0.3;
/// Authority mix: track-record share.
pub const DEFAULT_AUTHORITY_TRACK_RECORD_SHARE: f64 = 0.5;
/// Authority mix: recent-performance share.
pub const DEFAULT_AUTHORITY_RECENT_SHARE: f64 = 0.2;
/// Neutral authority for unseen users.
pub const DEFAULT_AUTHORITY_PRIOR: f64 = 0.5;
/// Window size for recent-performance accuracy.
pub const DEFAULT_RECENT_WINDOW: usize = 20;

/// Per-day retention factor for unreinforced traversal weights.
pub const DEFAULT_DECAY_RATE: f64 = 0.995;
/// Weights reinforced within this many days are skipped by the sweep.
pub const DEFAULT_FRESHNESS_WINDOW_DAYS: i64 = 7;
/// Interval between decay sweeps (seconds).
pub const DEFAULT_DECAY_SWEEP_INTERVAL_SECS: u64 = 3_600;
