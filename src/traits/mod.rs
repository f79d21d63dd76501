use chrono::{DateTime, Utc};

/// Records that stop being usable once their deadline has passed.
pub trait Expiring {
    fn deadline(&self) -> DateTime<Utc>;

    fn is_lapsed_at(&self, now: DateTime<Utc>) -> bool {
        now > self.deadline()
    }
}
