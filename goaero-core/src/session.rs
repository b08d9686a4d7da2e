use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Passenger,
    FlightOwner,
    Admin,
    Guest,
}

/// The authenticated caller, passed explicitly into every workflow call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    pub user_id: Uuid,
    pub email: Option<String>,
    pub role: Role,
}

impl Session {
    pub fn new(user_id: Uuid, email: Option<String>, role: Role) -> Self {
        Self { user_id, email, role }
    }

    pub fn guest() -> Self {
        Self::new(Uuid::new_v4(), None, Role::Guest)
    }
}
