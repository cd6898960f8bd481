use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{NewUser, User, UserUpdate};
use crate::database::repository::UserRepository;
use crate::database::sanitize::sanitize_update_params;

/// In-memory stand-in for the PostgreSQL repository.
///
/// Mirrors the SQL semantics the service relies on: unique email and cpf,
/// substring name filter, COALESCE-style partial updates.
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<Uuid, User>>,
    calls: AtomicUsize,
    broken: bool,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            calls: AtomicUsize::new(0),
            broken: false,
        }
    }

    /// A repository whose every call fails like a dropped connection
    pub fn broken() -> Self {
        Self { broken: true, ..Self::new() }
    }

    /// Number of repository calls made so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn enter(&self) -> Result<(), DatabaseError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.broken {
            return Err(DatabaseError::Sqlx(sqlx::Error::PoolClosed));
        }
        Ok(())
    }

    fn check_unique(users: &HashMap<Uuid, User>, candidate: &User) -> Result<(), DatabaseError> {
        for existing in users.values().filter(|u| u.id != candidate.id) {
            if existing.email == candidate.email {
                return Err(DatabaseError::Conflict {
                    name: "user".into(),
                    detail: format!("Key (email)=({}) already exists.", candidate.email),
                });
            }
            if existing.cpf == candidate.cpf {
                return Err(DatabaseError::Conflict {
                    name: "user".into(),
                    detail: format!("Key (cpf)=({}) already exists.", candidate.cpf),
                });
            }
        }
        Ok(())
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn get_all(&self, name: &str) -> Result<Vec<User>, DatabaseError> {
        self.enter()?;
        let users = self.users.read().await;
        let mut found: Vec<User> = users
            .values()
            .filter(|u| name.is_empty() || u.name.contains(name))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(found)
    }

    async fn get_by_id(&self, id: Uuid) -> Result<User, DatabaseError> {
        self.enter()?;
        self.users
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| DatabaseError::not_found("id", id.to_string()))
    }

    async fn create(&self, user: &NewUser) -> Result<User, DatabaseError> {
        self.enter()?;
        let created = User {
            id: Uuid::new_v4(),
            name: user.name.clone(),
            email: user.email.clone(),
            cpf: user.cpf.clone(),
            birthdate: user.birthdate,
        };

        let mut users = self.users.write().await;
        Self::check_unique(&users, &created)?;
        users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update(&self, id: Uuid, update: &UserUpdate) -> Result<User, DatabaseError> {
        self.enter()?;
        let params = sanitize_update_params(update)?;

        let mut users = self.users.write().await;
        let current = users
            .get(&id)
            .cloned()
            .ok_or_else(|| DatabaseError::not_found("id", id.to_string()))?;

        let next = User {
            id,
            name: params.text("name").unwrap_or(current.name),
            email: params.text("email").unwrap_or(current.email),
            cpf: params.text("cpf").unwrap_or(current.cpf),
            birthdate: params.timestamp("birthdate").unwrap_or(current.birthdate),
        };

        Self::check_unique(&users, &next)?;
        users.insert(id, next.clone());
        Ok(next)
    }

    async fn delete(&self, id: Uuid) -> Result<(), DatabaseError> {
        self.enter()?;
        match self.users.write().await.remove(&id) {
            Some(_) => Ok(()),
            None => Err(DatabaseError::not_found("user", id.to_string())),
        }
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        self.enter()
    }
}
