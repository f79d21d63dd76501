use diesel::r2d2::{ConnectionManager, Pool};
use diesel::{r2d2, PgConnection};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

mod common;
mod errors;
pub mod schema;
mod staff;
mod users;

pub use common::claims::{ClaimOperations, RESERVATION_WINDOW_SECS};
pub use common::stats::{MealStats, StatsOperations};
pub use common::sweeper::{reconcile_item_status, SweepOutcome};
pub use errors::RepositoryError;
pub use staff::donations::DonationOperations;
pub use staff::food::{FoodOperations, DEFAULT_MIN_ITEM_QUANTITY};
pub use users::user::UserOperations;

pub type DbPool = Pool<ConnectionManager<PgConnection>>;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

pub fn establish_connection_pool(database_url: &str) -> Result<DbPool, RepositoryError> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);

    Pool::builder()
        .max_size(20)
        .build(manager)
        .map_err(RepositoryError::ConnectionPoolError)
}

pub fn run_db_migrations(pool: DbPool) -> Result<(), String> {
    let mut conn = DbConnection::new(&pool).map_err(|e| e.to_string())?;
    let applied = conn
        .connection()
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| format!("failed to run migrations: {e}"))?;
    for version in applied {
        info!("Applied migration {}", version);
    }
    Ok(())
}

// Connection Guard - Manages pool
pub struct DbConnection<'a> {
    conn: r2d2::PooledConnection<ConnectionManager<PgConnection>>,
    _lifetime: std::marker::PhantomData<&'a ()>,
}

impl DbConnection<'_> {
    pub fn new(pool: &DbPool) -> Result<Self, RepositoryError> {
        Ok(Self {
            conn: pool.get().map_err(RepositoryError::ConnectionPoolError)?,
            _lifetime: std::marker::PhantomData,
        })
    }

    pub fn connection(&mut self) -> &mut PgConnection {
        &mut self.conn
    }
}
