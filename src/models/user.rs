//! User model (read-only view of the user directory).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User profile as stored by the registration flow.
///
/// Credentials live with the registration flow and are never read here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// User ID (also used as document ID)
    pub id: String,
    pub username: String,
    pub email: String,
    /// When the account was created
    pub created_at: DateTime<Utc>,
}
