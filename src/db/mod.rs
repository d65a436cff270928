//! Database layer (Firestore, plus an in-memory store for development).

pub mod firestore;
pub mod memory;
pub mod store;

pub use firestore::FirestoreDb;
pub use memory::MemoryDb;
pub use store::{ActivityLog, BadgeStore, ChallengeStore, ExerciseCatalog, Store, UserDirectory};

/// Collection names as constants.
///
/// Free-text ID parts are URL-encoded with `_` escaped as `%5F`.
pub mod collections {
    pub const USERS: &str = "users";
    pub const EXERCISES: &str = "exercises";
    /// Exercise completions, keyed by `{user_id}_{exercise_id}_{date}`
    pub const ACTIVITIES: &str = "activities";
    /// Streak badges, keyed by `{user_id}_{milestone}`
    pub const STREAK_BADGES: &str = "streak_badges";
    /// Daily challenges, keyed by `{user_id}_{date}`
    pub const DAILY_CHALLENGES: &str = "daily_challenges";
}
