//! Client records and the field sets used to write them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// Server-assigned identifier of a client row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(i64);

impl ClientId {
    /// Wraps a raw row id.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw row id.
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ClientId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl std::str::FromStr for ClientId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

/// A row of the `clients` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientRecord {
    /// Row id, assigned by the server.
    pub id: ClientId,
    /// Creation time, assigned by the server and never changed.
    pub created_at: DateTime<Utc>,
    /// Client name.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// Phone number.
    pub phone: Option<String>,
    /// Free-text note.
    pub text: Option<String>,
    /// Bucket-relative path of the car photo.
    pub image_url: Option<String>,
}

impl ClientRecord {
    /// Returns a copy with the written values laid over this record.
    ///
    /// Identity and creation time are kept.
    pub fn merged(&self, payload: &ClientPayload) -> Self {
        Self {
            id: self.id,
            created_at: self.created_at,
            name: payload.name.clone(),
            email: payload.email.clone(),
            phone: payload.phone.clone(),
            text: payload.text.clone(),
            image_url: payload.image_url.clone(),
        }
    }

    /// Editable fields of this record, as an edit form would be prefilled.
    pub fn fields(&self) -> ClientFields {
        ClientFields {
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone().unwrap_or_default(),
            text: self.text.clone().unwrap_or_default(),
        }
    }
}

/// Editable client fields as typed by the admin.
///
/// Optional values are plain strings; an empty string means "not set".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientFields {
    /// Client name (required).
    pub name: String,
    /// Contact email (required).
    pub email: String,
    /// Phone number (optional).
    pub phone: String,
    /// Free-text note (optional).
    pub text: String,
}

impl ClientFields {
    /// Creates fields with the two required values.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            ..Default::default()
        }
    }

    /// Sets the phone number.
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = phone.into();
        self
    }

    /// Sets the note.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Checks that name and email are present after trimming.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::validation_field(
                "name",
                "name and email are required",
            ));
        }
        if self.email.trim().is_empty() {
            return Err(Error::validation_field(
                "email",
                "name and email are required",
            ));
        }
        Ok(())
    }

    /// Returns `true` when every field is empty.
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.email.is_empty() && self.phone.is_empty() && self.text.is_empty()
    }

    /// Validates and builds the row payload with the given image path.
    pub fn to_payload(&self, image_url: Option<String>) -> Result<ClientPayload> {
        self.validate()?;
        Ok(ClientPayload {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: non_empty(&self.phone),
            text: non_empty(&self.text),
            image_url,
        })
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Normalised values written by an insert or an update.
///
/// Every column is serialised, so `None` clears a value on update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientPayload {
    /// Trimmed name.
    pub name: String,
    /// Trimmed email.
    pub email: String,
    /// Trimmed phone, `None` when blank.
    pub phone: Option<String>,
    /// Trimmed note, `None` when blank.
    pub text: Option<String>,
    /// Object path of the photo.
    pub image_url: Option<String>,
}
