use crate::models::common::DonationStatus;
use crate::models::food::FoodItem;
use chrono::{DateTime, Utc};
use diesel::{Identifiable, Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Queryable, Selectable, Identifiable, Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema,
)]
#[diesel(table_name = crate::db::schema::food_donations)]
#[diesel(primary_key(donation_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct FoodDonation {
    pub donation_id: i32,
    pub food_id: i32,
    pub quantity_donated: i32,
    pub status: DonationStatus,
    pub ngo_name: Option<String>,
    pub ngo_contact: Option<String>,
    pub ngo_phone: Option<String>,
    pub donated_at: DateTime<Utc>,
    pub reserved_at: Option<DateTime<Utc>>,
    pub collected_at: Option<DateTime<Utc>>,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::db::schema::food_donations)]
pub struct NewFoodDonation {
    pub food_id: i32,
    pub quantity_donated: i32,
    pub status: DonationStatus,
}

#[derive(Serialize, Debug, Clone, ToSchema)]
pub struct DonationWithFood {
    #[serde(flatten)]
    pub donation: FoodDonation,
    pub food: FoodItem,
}

/// Pickup details an NGO leaves when reserving a donation.
#[derive(Deserialize, Debug, Clone, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct NgoReservation {
    pub ngo_name: String,
    pub ngo_contact: String,
    pub ngo_phone: String,
}

impl NgoReservation {
    /// Returns the trimmed fields, or the name of the first empty one.
    pub fn validated(&self) -> Result<(String, String, String), &'static str> {
        let name = self.ngo_name.trim();
        let contact = self.ngo_contact.trim();
        let phone = self.ngo_phone.trim();
        if name.is_empty() {
            return Err("ngo_name");
        }
        if contact.is_empty() {
            return Err("ngo_contact");
        }
        if phone.is_empty() {
            return Err("ngo_phone");
        }
        Ok((name.to_string(), contact.to_string(), phone.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_ngo_fields_are_rejected() {
        let req = NgoReservation {
            ngo_name: "Robin Hood Army".to_string(),
            ngo_contact: "Asha".to_string(),
            ngo_phone: "   ".to_string(),
        };
        assert_eq!(req.validated(), Err("ngo_phone"));

        let req = NgoReservation {
            ngo_name: "".to_string(),
            ngo_contact: "Asha".to_string(),
            ngo_phone: "98450".to_string(),
        };
        assert_eq!(req.validated(), Err("ngo_name"));
    }

    #[test]
    fn ngo_fields_are_trimmed() {
        let req = NgoReservation {
            ngo_name: " Feeding India ".to_string(),
            ngo_contact: "Ravi ".to_string(),
            ngo_phone: " 98450 12345".to_string(),
        };
        assert_eq!(
            req.validated(),
            Ok((
                "Feeding India".to_string(),
                "Ravi".to_string(),
                "98450 12345".to_string()
            ))
        );
    }
}
