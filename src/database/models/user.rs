use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::validation::date::is_zero_instant;

/// A row of the `users` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub cpf: String,
    pub birthdate: DateTime<Utc>,
}

/// Body of `POST /api/v1/users`. Every field is required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct NewUser {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub cpf: String,
    pub birthdate: DateTime<Utc>,
}

/// Body of `PUT|PATCH /api/v1/users/:id`.
///
/// Absent fields keep their stored value. For compatibility with older
/// clients an empty string or the zero timestamp also counts as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub cpf: Option<String>,
    #[serde(default)]
    pub birthdate: Option<DateTime<Utc>>,
}

fn provided_str(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

impl UserUpdate {
    pub fn provided_name(&self) -> Option<&str> {
        provided_str(&self.name)
    }

    pub fn provided_email(&self) -> Option<&str> {
        provided_str(&self.email)
    }

    pub fn provided_cpf(&self) -> Option<&str> {
        provided_str(&self.cpf)
    }

    pub fn provided_birthdate(&self) -> Option<DateTime<Utc>> {
        self.birthdate.filter(|ts| !is_zero_instant(ts))
    }

    /// True when no field would change the stored row
    pub fn is_empty(&self) -> bool {
        self.provided_name().is_none()
            && self.provided_email().is_none()
            && self.provided_cpf().is_none()
            && self.provided_birthdate().is_none()
    }
}
