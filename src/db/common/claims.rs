use crate::db::{DbConnection, DbPool, RepositoryError};
use crate::models::claim::{ClaimDetails, ClaimWithFood, FoodClaim, NewFoodClaim};
use crate::models::common::ClaimStatus;
use crate::models::food::FoodItem;
use crate::models::user::UserContact;
use crate::services::claim_code::{generate_claim_code, normalize_claim_code};
use crate::traits::Expiring;
use chrono::{DateTime, Duration, Utc};
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error};
use diesel::PgConnection;
use log::{debug, error, info, warn};

/// Time a student has to redeem a reservation at the counter.
pub const RESERVATION_WINDOW_SECS: i64 = 2 * 60 * 60;

const CLAIM_CODE_CONSTRAINT: &str = "food_claims_claim_code_key";
const CLAIM_CODE_ATTEMPTS: usize = 5;

#[derive(Clone)]
pub struct ClaimOperations {
    pool: DbPool,
    reservation_window: Duration,
}

impl ClaimOperations {
    pub fn new(pool: DbPool, reservation_window_secs: i64) -> Self {
        Self {
            pool,
            reservation_window: Duration::seconds(reservation_window_secs),
        }
    }

    /// Reserves `quantity` portions of an item for a student.
    ///
    /// The stock decrement is a single conditional UPDATE, so concurrent
    /// reservations for the last portions cannot both succeed and
    /// `quantity_available` never goes negative.
    pub fn reserve_food(
        &self,
        student_id: i32,
        search_food_id: i32,
        quantity: i32,
    ) -> Result<FoodClaim, RepositoryError> {
        if quantity < 1 {
            return Err(RepositoryError::ValidationError(format!(
                "quantity must be at least 1, got {quantity}"
            )));
        }

        let mut conn = DbConnection::new(&self.pool).map_err(|e| {
            error!("reserve_food: failed to acquire DB connection: {}", e);
            e
        })?;

        let window = self.reservation_window;
        conn.connection().transaction(|conn| {
            let now = Utc::now();
            let decremented = {
                use crate::db::schema::food_items::dsl::*;
                diesel::update(
                    food_items
                        .filter(food_id.eq(search_food_id))
                        .filter(is_active.eq(true))
                        .filter(available_until.gt(now))
                        .filter(quantity_available.ge(quantity)),
                )
                .set((
                    quantity_available.eq(quantity_available - quantity),
                    updated_at.eq(now),
                ))
                .execute(conn)
                .map_err(|e| {
                    error!(
                        "reserve_food: error decrementing item {} by {}: {}",
                        search_food_id, quantity, e
                    );
                    RepositoryError::DatabaseError(e)
                })?
            };

            if decremented == 0 {
                return Err(Self::unavailable_reason(conn, search_food_id, quantity, now));
            }

            let claim = Self::insert_with_fresh_code(
                conn,
                student_id,
                search_food_id,
                quantity,
                now + window,
            )?;

            debug!(
                "reserve_food: student {} reserved {} of item {} as claim {} until {}",
                student_id, quantity, search_food_id, claim.claim_id, claim.expires_at
            );
            Ok(claim)
        })
    }

    /// Looks up a code presented at the counter. A lapsed reservation is
    /// marked expired on the way out.
    pub fn verify_claim_code(&self, raw_code: &str) -> Result<ClaimDetails, RepositoryError> {
        let code = normalize_claim_code(raw_code);
        if code.is_empty() {
            return Err(RepositoryError::InvalidCode("empty code".to_string()));
        }

        let mut conn = DbConnection::new(&self.pool).map_err(|e| {
            error!("verify_claim_code: failed to acquire DB connection: {}", e);
            e
        })?;

        use crate::db::schema::{food_claims, food_items, users};
        let found = food_claims::table
            .inner_join(users::table)
            .inner_join(food_items::table)
            .filter(food_claims::claim_code.eq(&code))
            .select((
                FoodClaim::as_select(),
                UserContact::as_select(),
                FoodItem::as_select(),
            ))
            .first::<(FoodClaim, UserContact, FoodItem)>(conn.connection())
            .optional()
            .map_err(|e| {
                error!("verify_claim_code: error looking up code {}: {}", code, e);
                RepositoryError::DatabaseError(e)
            })?;

        let (claim, student, food) = found.ok_or_else(|| RepositoryError::InvalidCode(code.clone()))?;

        if claim.status.is_terminal() {
            return Err(RepositoryError::WrongState(
                format!("claim {}", claim.claim_id),
                claim.status.as_str().to_string(),
            ));
        }

        if claim.is_lapsed_at(Utc::now()) {
            Self::mark_expired(conn.connection(), claim.claim_id)?;
            return Err(RepositoryError::Expired(format!(
                "claim {} expired at {}",
                claim.claim_id, claim.expires_at
            )));
        }

        Ok(ClaimDetails {
            claim,
            student,
            food,
        })
    }

    /// Marks a reservation as redeemed. The transition only happens while the
    /// claim is still reserved and unexpired, so a second call fails.
    pub fn complete_claim(&self, search_claim_id: i32) -> Result<FoodClaim, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool).map_err(|e| {
            error!("complete_claim: failed to acquire DB connection: {}", e);
            e
        })?;

        let now = Utc::now();
        let completed = {
            use crate::db::schema::food_claims::dsl::*;
            diesel::update(
                food_claims
                    .filter(claim_id.eq(search_claim_id))
                    .filter(status.eq(ClaimStatus::Reserved))
                    .filter(expires_at.ge(now)),
            )
            .set((status.eq(ClaimStatus::Claimed), claimed_at.eq(Some(now))))
            .returning(FoodClaim::as_returning())
            .get_result::<FoodClaim>(conn.connection())
            .optional()
            .map_err(|e| {
                error!(
                    "complete_claim: error completing claim {}: {}",
                    search_claim_id, e
                );
                RepositoryError::DatabaseError(e)
            })?
        };

        match completed {
            Some(claim) => {
                debug!(
                    "complete_claim: claim {} redeemed at {}",
                    search_claim_id, now
                );
                Ok(claim)
            }
            None => Err(Self::explain_rejected_transition(
                conn.connection(),
                search_claim_id,
                None,
                now,
            )),
        }
    }

    /// Student withdraws a reservation. The portions go back to the item, or
    /// to its donation when the item has already been transferred.
    pub fn cancel_claim(
        &self,
        search_claim_id: i32,
        student_id: i32,
    ) -> Result<FoodClaim, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool).map_err(|e| {
            error!("cancel_claim: failed to acquire DB connection: {}", e);
            e
        })?;

        let now = Utc::now();
        let cancelled = conn
            .connection()
            .transaction::<Option<FoodClaim>, RepositoryError, _>(|conn| {
                let claim = {
                    use crate::db::schema::food_claims::dsl::*;
                    diesel::update(
                        food_claims
                            .filter(claim_id.eq(search_claim_id))
                            .filter(user_id.eq(student_id))
                            .filter(status.eq(ClaimStatus::Reserved))
                            .filter(expires_at.ge(now)),
                    )
                    .set(status.eq(ClaimStatus::Cancelled))
                    .returning(FoodClaim::as_returning())
                    .get_result::<FoodClaim>(conn)
                    .optional()
                    .map_err(RepositoryError::DatabaseError)?
                };

                let Some(claim) = claim else {
                    return Ok(None);
                };

                // Once the item has been handed to donations the portions
                // belong to the donation, not the student catalog.
                let donated = {
                    use crate::db::schema::food_donations::dsl::*;
                    diesel::update(food_donations.filter(food_id.eq(claim.food_id)))
                        .set(quantity_donated.eq(quantity_donated + claim.quantity_claimed))
                        .execute(conn)
                        .map_err(|e| {
                            error!(
                                "cancel_claim: error adding {} portions to donation of item {}: {}",
                                claim.quantity_claimed, claim.food_id, e
                            );
                            RepositoryError::DatabaseError(e)
                        })?
                };

                if donated == 0 {
                    use crate::db::schema::food_items::dsl::*;
                    diesel::update(food_items.filter(food_id.eq(claim.food_id)))
                        .set((
                            quantity_available.eq(quantity_available + claim.quantity_claimed),
                            updated_at.eq(now),
                        ))
                        .execute(conn)
                        .map_err(|e| {
                            error!(
                                "cancel_claim: error restoring {} portions to item {}: {}",
                                claim.quantity_claimed, claim.food_id, e
                            );
                            RepositoryError::DatabaseError(e)
                        })?;
                }

                Ok(Some(claim))
            })?;

        match cancelled {
            Some(claim) => {
                debug!(
                    "cancel_claim: student {} cancelled claim {}, {} portions released",
                    student_id, search_claim_id, claim.quantity_claimed
                );
                Ok(claim)
            }
            None => Err(Self::explain_rejected_transition(
                conn.connection(),
                search_claim_id,
                Some(student_id),
                now,
            )),
        }
    }

    pub fn get_claim(&self, search_claim_id: i32) -> Result<FoodClaim, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool).map_err(|e| {
            error!("get_claim: failed to acquire DB connection: {}", e);
            e
        })?;

        use crate::db::schema::food_claims::dsl::*;
        food_claims
            .filter(claim_id.eq(search_claim_id))
            .select(FoodClaim::as_select())
            .first::<FoodClaim>(conn.connection())
            .map_err(|e| match e {
                Error::NotFound => RepositoryError::NotFound(format!("food_claims: {search_claim_id}")),
                other => {
                    error!("get_claim: error fetching claim {}: {}", search_claim_id, other);
                    RepositoryError::DatabaseError(other)
                }
            })
    }

    pub fn list_claims_by_user(&self, student_id: i32) -> Result<Vec<ClaimWithFood>, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool).map_err(|e| {
            error!(
                "list_claims_by_user: failed to acquire DB connection for user {}: {}",
                student_id, e
            );
            e
        })?;

        Self::expire_lapsed(conn.connection(), Utc::now())?;

        use crate::db::schema::{food_claims, food_items};
        let rows = food_claims::table
            .inner_join(food_items::table)
            .filter(food_claims::user_id.eq(student_id))
            .order(food_claims::created_at.desc())
            .select((FoodClaim::as_select(), FoodItem::as_select()))
            .load::<(FoodClaim, FoodItem)>(conn.connection())
            .map_err(|e| {
                error!(
                    "list_claims_by_user: error loading claims of user {}: {}",
                    student_id, e
                );
                RepositoryError::DatabaseError(e)
            })?;

        Ok(rows
            .into_iter()
            .map(|(claim, food)| ClaimWithFood { claim, food })
            .collect())
    }

    /// Open, unexpired reservations across all items.
    pub fn list_active_reservations(&self) -> Result<Vec<ClaimDetails>, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool).map_err(|e| {
            error!(
                "list_active_reservations: failed to acquire DB connection: {}",
                e
            );
            e
        })?;

        let now = Utc::now();
        Self::expire_lapsed(conn.connection(), now)?;

        use crate::db::schema::{food_claims, food_items, users};
        let rows = food_claims::table
            .inner_join(users::table)
            .inner_join(food_items::table)
            .filter(food_claims::status.eq(ClaimStatus::Reserved))
            .filter(food_claims::expires_at.ge(now))
            .order(food_claims::created_at.desc())
            .select((
                FoodClaim::as_select(),
                UserContact::as_select(),
                FoodItem::as_select(),
            ))
            .load::<(FoodClaim, UserContact, FoodItem)>(conn.connection())
            .map_err(|e| {
                error!(
                    "list_active_reservations: error loading reservations: {}",
                    e
                );
                RepositoryError::DatabaseError(e)
            })?;

        Ok(rows
            .into_iter()
            .map(|(claim, student, food)| ClaimDetails {
                claim,
                student,
                food,
            })
            .collect())
    }

    /// Moves every lapsed reservation to `expired`. Returns how many moved.
    pub fn expire_lapsed_claims(&self) -> Result<usize, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool).map_err(|e| {
            error!("expire_lapsed_claims: failed to acquire DB connection: {}", e);
            e
        })?;
        let count = Self::expire_lapsed(conn.connection(), Utc::now())?;
        if count > 0 {
            info!("expire_lapsed_claims: expired {} reservations", count);
        }
        Ok(count)
    }

    fn expire_lapsed(conn: &mut PgConnection, now: DateTime<Utc>) -> Result<usize, RepositoryError> {
        use crate::db::schema::food_claims::dsl::*;
        diesel::update(
            food_claims
                .filter(status.eq(ClaimStatus::Reserved))
                .filter(expires_at.lt(now)),
        )
        .set(status.eq(ClaimStatus::Expired))
        .execute(conn)
        .map_err(|e| {
            error!("expire_lapsed: error expiring reservations: {}", e);
            RepositoryError::DatabaseError(e)
        })
    }

    fn mark_expired(conn: &mut PgConnection, search_claim_id: i32) -> Result<(), RepositoryError> {
        use crate::db::schema::food_claims::dsl::*;
        diesel::update(
            food_claims
                .filter(claim_id.eq(search_claim_id))
                .filter(status.eq(ClaimStatus::Reserved)),
        )
        .set(status.eq(ClaimStatus::Expired))
        .execute(conn)
        .map_err(|e| {
            error!("mark_expired: error expiring claim {}: {}", search_claim_id, e);
            RepositoryError::DatabaseError(e)
        })?;
        debug!("mark_expired: claim {} lapsed", search_claim_id);
        Ok(())
    }

    fn insert_with_fresh_code(
        conn: &mut PgConnection,
        student_id: i32,
        search_food_id: i32,
        quantity: i32,
        expiry: DateTime<Utc>,
    ) -> Result<FoodClaim, RepositoryError> {
        use crate::db::schema::food_claims::dsl::*;

        let mut last_error = Error::RollbackTransaction;
        for attempt in 1..=CLAIM_CODE_ATTEMPTS {
            let new_claim = NewFoodClaim {
                user_id: student_id,
                food_id: search_food_id,
                quantity_claimed: quantity,
                claim_code: generate_claim_code(),
                status: ClaimStatus::Reserved,
                expires_at: expiry,
            };

            // Savepoint, so a code collision does not abort the reservation.
            let inserted = conn.transaction::<FoodClaim, Error, _>(|conn| {
                diesel::insert_into(food_claims)
                    .values(&new_claim)
                    .returning(FoodClaim::as_returning())
                    .get_result(conn)
            });

            match inserted {
                Ok(claim) => return Ok(claim),
                Err(Error::DatabaseError(DatabaseErrorKind::UniqueViolation, info))
                    if info.constraint_name() == Some(CLAIM_CODE_CONSTRAINT) =>
                {
                    warn!(
                        "insert_with_fresh_code: code collision on attempt {}, retrying",
                        attempt
                    );
                    last_error = Error::DatabaseError(DatabaseErrorKind::UniqueViolation, info);
                }
                Err(e) => {
                    error!(
                        "insert_with_fresh_code: error inserting claim for item {}: {}",
                        search_food_id, e
                    );
                    return Err(RepositoryError::DatabaseError(e));
                }
            }
        }

        error!(
            "insert_with_fresh_code: no free claim code after {} attempts",
            CLAIM_CODE_ATTEMPTS
        );
        Err(RepositoryError::DatabaseError(last_error))
    }

    fn unavailable_reason(
        conn: &mut PgConnection,
        search_food_id: i32,
        quantity: i32,
        now: DateTime<Utc>,
    ) -> RepositoryError {
        use crate::db::schema::food_items::dsl::*;
        let item = food_items
            .filter(food_id.eq(search_food_id))
            .select(FoodItem::as_select())
            .first::<FoodItem>(conn)
            .optional();

        match item {
            Ok(None) => RepositoryError::NotAvailable(search_food_id, "No such item".to_string()),
            Ok(Some(item)) => {
                let reason = if !item.is_offered_at(now) {
                    "No longer offered".to_string()
                } else {
                    format!(
                        "Only {} left, {} requested",
                        item.quantity_available, quantity
                    )
                };
                RepositoryError::NotAvailable(search_food_id, reason)
            }
            Err(e) => {
                error!(
                    "unavailable_reason: error loading item {}: {}",
                    search_food_id, e
                );
                RepositoryError::DatabaseError(e)
            }
        }
    }

    /// Works out why a guarded status transition touched no row.
    fn explain_rejected_transition(
        conn: &mut PgConnection,
        search_claim_id: i32,
        owner: Option<i32>,
        now: DateTime<Utc>,
    ) -> RepositoryError {
        use crate::db::schema::food_claims::dsl::*;
        let claim = food_claims
            .filter(claim_id.eq(search_claim_id))
            .select(FoodClaim::as_select())
            .first::<FoodClaim>(conn)
            .optional();

        let claim = match claim {
            Ok(Some(claim)) => claim,
            Ok(None) => {
                return RepositoryError::NotFound(format!("food_claims: {search_claim_id}"));
            }
            Err(e) => {
                error!(
                    "explain_rejected_transition: error loading claim {}: {}",
                    search_claim_id, e
                );
                return RepositoryError::DatabaseError(e);
            }
        };

        if owner.is_some_and(|uid| uid != claim.user_id) {
            return RepositoryError::NotFound(format!("food_claims: {search_claim_id}"));
        }

        if claim.status.is_terminal() {
            return RepositoryError::WrongState(
                format!("claim {search_claim_id}"),
                claim.status.as_str().to_string(),
            );
        }

        if claim.is_lapsed_at(now) {
            if let Err(e) = Self::mark_expired(conn, search_claim_id) {
                return e;
            }
            return RepositoryError::Expired(format!(
                "claim {} expired at {}",
                search_claim_id, claim.expires_at
            ));
        }

        // Status flipped concurrently between the update and this read.
        RepositoryError::WrongState(
            format!("claim {search_claim_id}"),
            "changed concurrently".to_string(),
        )
    }
}
