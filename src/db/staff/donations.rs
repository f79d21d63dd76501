use crate::db::common::sweeper::reconcile_item_status;
use crate::db::{DbConnection, DbPool, RepositoryError};
use crate::models::common::DonationStatus;
use crate::models::donation::{DonationWithFood, FoodDonation, NewFoodDonation, NgoReservation};
use crate::models::food::FoodItem;
use chrono::Utc;
use diesel::dsl::{exists, not};
use diesel::prelude::*;
use diesel::result::Error;
use diesel::PgConnection;
use log::{debug, error, info};

#[derive(Clone)]
pub struct DonationOperations {
    pool: DbPool,
}

impl DonationOperations {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Sweeps the catalog, then opens one `available` donation for every
    /// lapsed item that still has portions and no donation yet.
    /// Returns the number of donations created.
    pub fn transfer_expired_items(&self) -> Result<usize, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool).map_err(|e| {
            error!("transfer_expired_items: failed to acquire DB connection: {}", e);
            e
        })?;

        let now = Utc::now();
        conn.connection().transaction(|conn| {
            reconcile_item_status(conn, now)?;

            use crate::db::schema::{food_donations, food_items};
            let leftovers = food_items::table
                .filter(food_items::is_active.eq(false))
                .filter(food_items::available_until.lt(now))
                .filter(food_items::quantity_available.gt(0))
                .filter(not(exists(
                    food_donations::table.filter(food_donations::food_id.eq(food_items::food_id)),
                )))
                .select((food_items::food_id, food_items::quantity_available))
                .load::<(i32, i32)>(conn)
                .map_err(|e| {
                    error!("transfer_expired_items: error loading expired items: {}", e);
                    RepositoryError::DatabaseError(e)
                })?;

            if leftovers.is_empty() {
                return Ok(0);
            }

            let new_donations: Vec<NewFoodDonation> = leftovers
                .iter()
                .map(|&(item, remaining)| NewFoodDonation {
                    food_id: item,
                    quantity_donated: remaining,
                    status: DonationStatus::Available,
                })
                .collect();

            let created = diesel::insert_into(food_donations::table)
                .values(&new_donations)
                .on_conflict(food_donations::food_id)
                .do_nothing()
                .execute(conn)
                .map_err(|e| {
                    error!("transfer_expired_items: error inserting donations: {}", e);
                    RepositoryError::DatabaseError(e)
                })?;

            info!(
                "transfer_expired_items: moved {} expired items to donations",
                created
            );
            Ok(created)
        })
    }

    pub fn reserve_for_ngo(
        &self,
        search_donation_id: i32,
        reservation: &NgoReservation,
    ) -> Result<FoodDonation, RepositoryError> {
        let (name_val, contact_val, phone_val) = reservation.validated().map_err(|field| {
            RepositoryError::ValidationError(format!("{field} must not be empty"))
        })?;

        let mut conn = DbConnection::new(&self.pool).map_err(|e| {
            error!("reserve_for_ngo: failed to acquire DB connection: {}", e);
            e
        })?;

        let reserved = {
            use crate::db::schema::food_donations::dsl::*;
            diesel::update(
                food_donations
                    .filter(donation_id.eq(search_donation_id))
                    .filter(status.eq(DonationStatus::Available)),
            )
            .set((
                status.eq(DonationStatus::ReservedForNgo),
                ngo_name.eq(Some(name_val.clone())),
                ngo_contact.eq(Some(contact_val)),
                ngo_phone.eq(Some(phone_val)),
                reserved_at.eq(Some(Utc::now())),
            ))
            .returning(FoodDonation::as_returning())
            .get_result::<FoodDonation>(conn.connection())
            .optional()
            .map_err(|e| {
                error!(
                    "reserve_for_ngo: error reserving donation {}: {}",
                    search_donation_id, e
                );
                RepositoryError::DatabaseError(e)
            })?
        };

        match reserved {
            Some(donation) => {
                debug!(
                    "reserve_for_ngo: donation {} reserved for '{}'",
                    search_donation_id, name_val
                );
                Ok(donation)
            }
            None => Err(Self::explain_rejected_transition(
                conn.connection(),
                search_donation_id,
            )),
        }
    }

    /// Closes a donation once the NGO has picked it up. Only donations
    /// reserved for an NGO can be collected.
    pub fn mark_collected(&self, search_donation_id: i32) -> Result<FoodDonation, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool).map_err(|e| {
            error!("mark_collected: failed to acquire DB connection: {}", e);
            e
        })?;

        let collected = {
            use crate::db::schema::food_donations::dsl::*;
            diesel::update(
                food_donations
                    .filter(donation_id.eq(search_donation_id))
                    .filter(status.eq(DonationStatus::ReservedForNgo)),
            )
            .set((
                status.eq(DonationStatus::Collected),
                collected_at.eq(Some(Utc::now())),
            ))
            .returning(FoodDonation::as_returning())
            .get_result::<FoodDonation>(conn.connection())
            .optional()
            .map_err(|e| {
                error!(
                    "mark_collected: error collecting donation {}: {}",
                    search_donation_id, e
                );
                RepositoryError::DatabaseError(e)
            })?
        };

        match collected {
            Some(donation) => {
                debug!("mark_collected: donation {} collected", search_donation_id);
                Ok(donation)
            }
            None => Err(Self::explain_rejected_transition(
                conn.connection(),
                search_donation_id,
            )),
        }
    }

    pub fn get_donation(&self, search_donation_id: i32) -> Result<FoodDonation, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool).map_err(|e| {
            error!("get_donation: failed to acquire DB connection: {}", e);
            e
        })?;
        Self::load_donation(conn.connection(), search_donation_id)
    }

    pub fn list_all_donations(&self) -> Result<Vec<DonationWithFood>, RepositoryError> {
        self.list_donations(None)
    }

    pub fn list_donations_by_creator(
        &self,
        staff_id: i32,
    ) -> Result<Vec<DonationWithFood>, RepositoryError> {
        self.list_donations(Some(staff_id))
    }

    fn list_donations(&self, creator: Option<i32>) -> Result<Vec<DonationWithFood>, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool).map_err(|e| {
            error!("list_donations: failed to acquire DB connection: {}", e);
            e
        })?;

        use crate::db::schema::{food_donations, food_items};
        let mut query = food_donations::table
            .inner_join(food_items::table)
            .select((FoodDonation::as_select(), FoodItem::as_select()))
            .order(food_donations::donated_at.desc())
            .into_boxed();
        if let Some(staff_id) = creator {
            query = query.filter(food_items::created_by.eq(staff_id));
        }

        let rows = query
            .load::<(FoodDonation, FoodItem)>(conn.connection())
            .map_err(|e| {
                error!(
                    "list_donations: error loading donations (creator {:?}): {}",
                    creator, e
                );
                RepositoryError::DatabaseError(e)
            })?;

        Ok(rows
            .into_iter()
            .map(|(donation, food)| DonationWithFood { donation, food })
            .collect())
    }

    fn load_donation(
        conn: &mut PgConnection,
        search_donation_id: i32,
    ) -> Result<FoodDonation, RepositoryError> {
        use crate::db::schema::food_donations::dsl::*;
        food_donations
            .filter(donation_id.eq(search_donation_id))
            .select(FoodDonation::as_select())
            .first::<FoodDonation>(conn)
            .map_err(|e| match e {
                Error::NotFound => {
                    RepositoryError::NotFound(format!("food_donations: {search_donation_id}"))
                }
                other => {
                    error!(
                        "load_donation: error fetching donation {}: {}",
                        search_donation_id, other
                    );
                    RepositoryError::DatabaseError(other)
                }
            })
    }

    fn explain_rejected_transition(
        conn: &mut PgConnection,
        search_donation_id: i32,
    ) -> RepositoryError {
        match Self::load_donation(conn, search_donation_id) {
            Ok(donation) => RepositoryError::WrongState(
                format!("donation {search_donation_id}"),
                donation.status.as_str().to_string(),
            ),
            Err(e) => e,
        }
    }
}
