use async_trait::async_trait;
use sqlx::{postgres::PgDatabaseError, PgPool};
use tracing::{error, warn};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{NewUser, User, UserUpdate};
use crate::database::sanitize::sanitize_update_params;

/// Persistence operations the user service depends on
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// All users, optionally filtered by a substring of the name. An empty
    /// `name` means no filter.
    async fn get_all(&self, name: &str) -> Result<Vec<User>, DatabaseError>;

    async fn get_by_id(&self, id: Uuid) -> Result<User, DatabaseError>;

    async fn create(&self, user: &NewUser) -> Result<User, DatabaseError>;

    /// Overwrite only the provided fields of the user with `id`
    async fn update(&self, id: Uuid, update: &UserUpdate) -> Result<User, DatabaseError>;

    async fn delete(&self, id: Uuid) -> Result<(), DatabaseError>;

    async fn health_check(&self) -> Result<(), DatabaseError>;
}

const SELECT_ALL_SQL: &str = "SELECT id, name, email, cpf, birthdate FROM users u";

const SELECT_BY_NAME_SQL: &str =
    "SELECT id, name, email, cpf, birthdate FROM users u WHERE u.name LIKE $1";

const SELECT_BY_ID_SQL: &str =
    "SELECT id, name, email, cpf, birthdate FROM users WHERE id = $1";

const INSERT_SQL: &str = "INSERT INTO users (name, email, cpf, birthdate) VALUES ($1, $2, $3, $4) \
     RETURNING id, name, email, cpf, birthdate";

/// Columns of the partial update, in bind order ($1..$4; the id is $5)
pub const UPDATE_COLUMNS: [&str; 4] = ["name", "email", "cpf", "birthdate"];

const UPDATE_SQL: &str = r#"
    UPDATE users u SET
        name = COALESCE($1, u.name),
        email = COALESCE($2, u.email),
        cpf = COALESCE($3, u.cpf),
        birthdate = COALESCE($4, u.birthdate)
    WHERE u.id = $5
    RETURNING u.id, u.name, u.email, u.cpf, u.birthdate
"#;

const DELETE_SQL: &str = "DELETE FROM users u WHERE u.id = $1";

/// `%name%` with LIKE wildcards in the input escaped
fn like_pattern(name: &str) -> String {
    let escaped = name
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// Unique violations become conflicts; everything else stays a query failure
fn map_write_error(err: sqlx::Error) -> DatabaseError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            let detail = db_err
                .try_downcast_ref::<PgDatabaseError>()
                .and_then(|pg| pg.detail())
                .unwrap_or_else(|| db_err.message())
                .to_string();
            warn!("could not write user: {}", detail);
            return DatabaseError::Conflict { name: "user".to_string(), detail };
        }
    }
    error!("failed to write user: {}", err);
    DatabaseError::Sqlx(err)
}

/// PostgreSQL-backed user repository
#[derive(Debug, Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn get_all(&self, name: &str) -> Result<Vec<User>, DatabaseError> {
        let query = if name.is_empty() {
            sqlx::query_as::<_, User>(SELECT_ALL_SQL)
        } else {
            sqlx::query_as::<_, User>(SELECT_BY_NAME_SQL).bind(like_pattern(name))
        };

        query.fetch_all(&self.pool).await.map_err(|e| {
            error!("failed to list users: {}", e);
            DatabaseError::Sqlx(e)
        })
    }

    async fn get_by_id(&self, id: Uuid) -> Result<User, DatabaseError> {
        sqlx::query_as::<_, User>(SELECT_BY_ID_SQL)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("id", id.to_string()))
    }

    async fn create(&self, user: &NewUser) -> Result<User, DatabaseError> {
        sqlx::query_as::<_, User>(INSERT_SQL)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.cpf)
            .bind(user.birthdate)
            .fetch_one(&self.pool)
            .await
            .map_err(map_write_error)
    }

    async fn update(&self, id: Uuid, update: &UserUpdate) -> Result<User, DatabaseError> {
        let params = sanitize_update_params(update)?;

        sqlx::query_as::<_, User>(UPDATE_SQL)
            .bind(params.text("name"))
            .bind(params.text("email"))
            .bind(params.text("cpf"))
            .bind(params.timestamp("birthdate"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_write_error)?
            .ok_or_else(|| DatabaseError::not_found("id", id.to_string()))
    }

    async fn delete(&self, id: Uuid) -> Result<(), DatabaseError> {
        let result = sqlx::query(DELETE_SQL).bind(id).execute(&self.pool).await.map_err(|e| {
            error!("failed to delete user {}: {}", id, e);
            DatabaseError::Sqlx(e)
        })?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("user", id.to_string()));
        }
        Ok(())
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::sanitize::SqlParam;
    use chrono::{TimeZone, Utc};

    #[test]
    fn like_pattern_wraps_and_escapes() {
        assert_eq!(like_pattern("John"), "%John%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }

    #[test]
    fn update_params_cover_every_update_column() {
        let params = sanitize_update_params(&UserUpdate::default()).unwrap();
        let mut keys: Vec<&str> = params.keys().collect();
        keys.sort_unstable();
        let mut columns = UPDATE_COLUMNS.to_vec();
        columns.sort_unstable();
        assert_eq!(keys, columns);

        for column in UPDATE_COLUMNS {
            assert!(UPDATE_SQL.contains(&format!("{column} = COALESCE(")), "{column}");
        }
    }

    #[test]
    fn unset_update_fields_bind_as_null() {
        let update = UserUpdate {
            name: Some(String::new()),
            email: None,
            cpf: Some("313.716.772-80".into()),
            birthdate: Some(crate::validation::date::zero_instant()),
        };
        let params = sanitize_update_params(&update).unwrap();
        assert_eq!(params.get("name"), Some(&SqlParam::Null));
        assert_eq!(params.text("email"), None);
        assert_eq!(params.text("cpf").as_deref(), Some("313.716.772-80"));
        assert_eq!(params.timestamp("birthdate"), None);
    }

    #[test]
    fn provided_birthdate_binds_as_timestamp() {
        let born = Utc.with_ymd_and_hms(1990, 1, 1, 1, 1, 1).unwrap();
        let update = UserUpdate { birthdate: Some(born), ..Default::default() };
        let params = sanitize_update_params(&update).unwrap();
        assert_eq!(params.timestamp("birthdate"), Some(born));
    }
}
