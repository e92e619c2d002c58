use serde::{Deserialize, Serialize};
use surrealdb::sql::{Datetime, Thing};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UserRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Thing>,
    pub username: String,
    #[serde(default)]
    pub default_playlist: Option<Thing>,
    pub created_at: Datetime,

    // Listening stats
    #[serde(default)]
    pub listen_count: u64,
    #[serde(default)]
    pub total_listening_time: f64,
}
