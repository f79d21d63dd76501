use crate::db::errors::RepositoryError;
use crate::db::{DbConnection, DbPool};
use crate::models::user::{User, UserProfile};
use chrono::Utc;
use diesel::prelude::*;
use diesel::result::Error;
use log::{debug, error};

#[derive(Clone)]
pub struct UserOperations {
    pool: DbPool,
}

impl UserOperations {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Inserts the user on first login and refreshes name, contact fields
    /// and role on every later one. Keyed by the provider's external id.
    pub fn upsert_user(&self, profile: UserProfile) -> Result<User, RepositoryError> {
        let external = profile.external_id.trim();
        if external.is_empty() {
            return Err(RepositoryError::ValidationError(
                "external id missing from identity".to_string(),
            ));
        }
        let email_val = profile.email.trim();
        if email_val.is_empty() {
            return Err(RepositoryError::ValidationError(format!(
                "email missing from identity {external}"
            )));
        }
        let name_val = match profile.name.trim() {
            "" => email_val,
            n => n,
        };

        let mut conn = DbConnection::new(&self.pool).map_err(|e| {
            error!("upsert_user: failed to acquire DB connection: {}", e);
            e
        })?;

        use crate::db::schema::users::dsl as u;
        let user = diesel::insert_into(u::users)
            .values((
                u::external_id.eq(external),
                u::name.eq(name_val),
                u::email.eq(email_val),
                u::phone.eq(profile.phone.as_deref()),
                u::role.eq(profile.role),
            ))
            .on_conflict(u::external_id)
            .do_update()
            .set((
                u::name.eq(name_val),
                u::email.eq(email_val),
                u::phone.eq(profile.phone.as_deref()),
                u::role.eq(profile.role),
                u::updated_at.eq(Utc::now()),
            ))
            .returning(User::as_returning())
            .get_result::<User>(conn.connection())
            .map_err(|e| {
                error!("upsert_user: error upserting user '{}': {}", external, e);
                RepositoryError::DatabaseError(e)
            })?;

        debug!(
            "upsert_user: external id '{}' is user {} ({})",
            external,
            user.user_id,
            user.role.as_str()
        );
        Ok(user)
    }

    pub fn get_user(&self, search_user_id: i32) -> Result<User, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool).map_err(|e| {
            error!(
                "get_user: failed to acquire DB connection for user {}: {}",
                search_user_id, e
            );
            e
        })?;

        use crate::db::schema::users::dsl::*;
        users
            .filter(user_id.eq(search_user_id))
            .select(User::as_select())
            .first::<User>(conn.connection())
            .map_err(|e| match e {
                Error::NotFound => RepositoryError::NotFound(format!("users: {search_user_id}")),
                other => {
                    error!("get_user: error fetching user {}: {}", search_user_id, other);
                    RepositoryError::DatabaseError(other)
                }
            })
    }
}
