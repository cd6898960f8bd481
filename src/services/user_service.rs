use std::sync::Arc;
use uuid::Uuid;

use crate::database::models::{NewUser, User, UserUpdate};
use crate::database::repository::UserRepository;
use crate::error::ApiError;
use crate::validation::{is_underage, is_valid_cpf, is_valid_email};

/// Business rules for user records, in front of a [`UserRepository`]
#[derive(Clone)]
pub struct UserService {
    repository: Arc<dyn UserRepository>,
}

fn parse_id(id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id).map_err(|_| ApiError::bad_request("invalid id"))
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepository>) -> Self {
        Self { repository }
    }

    pub async fn get_all(&self, name: &str) -> Result<Vec<User>, ApiError> {
        Ok(self.repository.get_all(name).await?)
    }

    pub async fn get_by_id(&self, id: &str) -> Result<User, ApiError> {
        let uid = parse_id(id)?;
        Ok(self.repository.get_by_id(uid).await?)
    }

    /// Reject minors and bad CPFs before anything is written
    pub async fn create(&self, user: NewUser) -> Result<User, ApiError> {
        if is_underage(user.birthdate) {
            return Err(ApiError::bad_request("underage"));
        }

        if !is_valid_cpf(&user.cpf) {
            return Err(ApiError::bad_request("cpf invalid"));
        }

        if !is_valid_email(&user.email) {
            return Err(ApiError::bad_request("invalid e-mail"));
        }

        Ok(self.repository.create(&user).await?)
    }

    /// Validate only the fields the caller provided, then apply them.
    pub async fn update(&self, id: &str, update: UserUpdate) -> Result<User, ApiError> {
        if let Some(birthdate) = update.provided_birthdate() {
            if is_underage(birthdate) {
                return Err(ApiError::bad_request("underage"));
            }
        }

        if let Some(cpf) = update.provided_cpf() {
            if !is_valid_cpf(cpf) {
                return Err(ApiError::bad_request("cpf invalid"));
            }
        }

        if let Some(email) = update.provided_email() {
            if !is_valid_email(email) {
                return Err(ApiError::bad_request("invalid e-mail"));
            }
        }

        let uid = parse_id(id)?;
        if update.is_empty() {
            tracing::debug!("Update for user {} changes no fields", uid);
        }
        Ok(self.repository.update(uid, &update).await?)
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        let uid = parse_id(id)?;
        Ok(self.repository.delete(uid).await?)
    }

    pub async fn health_check(&self) -> Result<(), ApiError> {
        self.repository
            .health_check()
            .await
            .map_err(|e| ApiError::service_unavailable(format!("database unavailable: {}", e)))
    }
}
