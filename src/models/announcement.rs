use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A message with a validity window. `id` is assigned by the store and is
/// always the canonical string form; timestamps are ISO-8601 text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Announcement {
    pub id: String,
    pub message: String,
    pub expiration: String,
    pub start: Option<String>,
}

/// Record handed to the store on insert; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAnnouncement {
    pub message: String,
    pub expiration: String,
    pub start: Option<String>,
}

impl NewAnnouncement {
    pub fn with_id(self, id: String) -> Announcement {
        Announcement {
            id,
            message: self.message,
            expiration: self.expiration,
            start: self.start,
        }
    }
}

/// Partial update: `None` means "leave unchanged". `Some("")` is a real
/// value and is written as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnouncementUpdate {
    pub message: Option<String>,
    pub expiration: Option<String>,
    pub start: Option<String>,
}

impl AnnouncementUpdate {
    pub fn is_empty(&self) -> bool {
        self.message.is_none() && self.expiration.is_none() && self.start.is_none()
    }

    pub fn apply_to(&self, ann: &mut Announcement) {
        if let Some(message) = &self.message {
            ann.message = message.clone();
        }
        if let Some(expiration) = &self.expiration {
            ann.expiration = expiration.clone();
        }
        if let Some(start) = &self.start {
            ann.start = Some(start.clone());
        }
    }
}

/// Body returned by DELETE.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedAnnouncement {
    pub id: String,
    pub deleted: bool,
}

/// A request field as received: not sent, sent empty, or sent with text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldInput {
    #[default]
    Absent,
    Empty,
    Value(String),
}

impl FieldInput {
    /// Only a non-empty value counts; used where the field is required.
    pub fn non_empty(self) -> Option<String> {
        match self {
            FieldInput::Value(v) => Some(v),
            FieldInput::Absent | FieldInput::Empty => None,
        }
    }

    /// Anything the caller actually sent, empty string included.
    pub fn supplied(self) -> Option<String> {
        match self {
            FieldInput::Absent => None,
            FieldInput::Empty => Some(String::new()),
            FieldInput::Value(v) => Some(v),
        }
    }
}

impl From<Option<String>> for FieldInput {
    fn from(raw: Option<String>) -> Self {
        match raw {
            None => FieldInput::Absent,
            Some(v) if v.is_empty() => FieldInput::Empty,
            Some(v) => FieldInput::Value(v),
        }
    }
}

/// Query parameters for POST and PUT, extracted leniently (last value wins).
/// `username` is read separately by the `Credential` extractor.
#[derive(Debug, Default)]
pub struct AnnouncementParams {
    pub message: Option<String>,
    pub expiration: Option<String>,
    pub start: Option<String>,
}

/// Fields of a create or update request, with absent and empty kept apart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnouncementInput {
    pub message: FieldInput,
    pub expiration: FieldInput,
    pub start: FieldInput,
}

impl From<AnnouncementParams> for AnnouncementInput {
    fn from(params: AnnouncementParams) -> Self {
        Self {
            message: params.message.into(),
            expiration: params.expiration.into(),
            start: params.start.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_input_keeps_empty_apart_from_absent() {
        assert_eq!(FieldInput::from(None), FieldInput::Absent);
        assert_eq!(FieldInput::from(Some(String::new())), FieldInput::Empty);
        assert_eq!(
            FieldInput::from(Some("hi".to_string())),
            FieldInput::Value("hi".to_string())
        );
    }

    #[test]
    fn empty_field_is_supplied_but_not_non_empty() {
        assert_eq!(FieldInput::Empty.supplied(), Some(String::new()));
        assert_eq!(FieldInput::Empty.non_empty(), None);
        assert_eq!(FieldInput::Absent.supplied(), None);
    }

    #[test]
    fn update_applies_only_supplied_fields() {
        let mut ann = Announcement {
            id: "a".into(),
            message: "old".into(),
            expiration: "2099-01-01T00:00:00".into(),
            start: None,
        };
        let update = AnnouncementUpdate {
            start: Some(String::new()),
            ..Default::default()
        };
        update.apply_to(&mut ann);

        assert_eq!(ann.message, "old");
        assert_eq!(ann.start.as_deref(), Some(""));
    }
}
