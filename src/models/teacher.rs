use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Entry of the teacher directory. Existence of the row is the whole
/// authorization check; no field is inspected beyond the key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Teacher {
    pub username: String,
    pub display_name: Option<String>,
}

impl Teacher {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            display_name: None,
        }
    }
}
