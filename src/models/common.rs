use diesel::deserialize::{self, FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::pg::{Pg, PgValue};
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::Text;
use serde::{Deserialize, Serialize};
use std::io::Write;
use utoipa::ToSchema;

/// Implements text-column mapping for a status enum in terms of its
/// `as_str` / `get_enum_from_str` pair.
macro_rules! text_enum_sql {
    ($ty:ty) => {
        impl ToSql<Text, Pg> for $ty {
            fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
                out.write_all(self.as_str().as_bytes())?;
                Ok(IsNull::No)
            }
        }

        impl FromSql<Text, Pg> for $ty {
            fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
                let raw = std::str::from_utf8(bytes.as_bytes())?;
                <$ty>::get_enum_from_str(raw)
                    .ok_or_else(|| format!("Unrecognized {} value: {}", stringify!($ty), raw).into())
            }
        }
    };
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, AsExpression, FromSqlRow, Serialize, Deserialize, ToSchema,
)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Student,
    Staff,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Student => "student",
            UserRole::Staff => "staff",
            UserRole::Admin => "admin",
        }
    }

    pub fn get_enum_from_str(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "student" => Some(UserRole::Student),
            "staff" => Some(UserRole::Staff),
            "admin" => Some(UserRole::Admin),
            _ => None,
        }
    }

    /// Staff-facing operations are open to admins as well.
    pub fn is_staff(&self) -> bool {
        matches!(self, UserRole::Staff | UserRole::Admin)
    }
}

text_enum_sql!(UserRole);

/// Lifecycle of a claim. `Reserved` is the only non-terminal state.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, AsExpression, FromSqlRow, Serialize, Deserialize, ToSchema,
)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "snake_case")]
pub enum ClaimStatus {
    Reserved,
    Claimed,
    Expired,
    Cancelled,
}

impl ClaimStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimStatus::Reserved => "reserved",
            ClaimStatus::Claimed => "claimed",
            ClaimStatus::Expired => "expired",
            ClaimStatus::Cancelled => "cancelled",
        }
    }

    pub fn get_enum_from_str(value: &str) -> Option<Self> {
        match value {
            "reserved" => Some(ClaimStatus::Reserved),
            "claimed" => Some(ClaimStatus::Claimed),
            "expired" => Some(ClaimStatus::Expired),
            "cancelled" => Some(ClaimStatus::Cancelled),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, ClaimStatus::Reserved)
    }
}

text_enum_sql!(ClaimStatus);

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, AsExpression, FromSqlRow, Serialize, Deserialize, ToSchema,
)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "snake_case")]
pub enum DonationStatus {
    Available,
    ReservedForNgo,
    Collected,
}

impl DonationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DonationStatus::Available => "available",
            DonationStatus::ReservedForNgo => "reserved_for_ngo",
            DonationStatus::Collected => "collected",
        }
    }

    pub fn get_enum_from_str(value: &str) -> Option<Self> {
        match value {
            "available" => Some(DonationStatus::Available),
            "reserved_for_ngo" => Some(DonationStatus::ReservedForNgo),
            "collected" => Some(DonationStatus::Collected),
            _ => None,
        }
    }
}

text_enum_sql!(DonationStatus);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parsing_is_case_insensitive() {
        assert_eq!(UserRole::get_enum_from_str("Staff"), Some(UserRole::Staff));
        assert_eq!(UserRole::get_enum_from_str(" admin "), Some(UserRole::Admin));
        assert_eq!(UserRole::get_enum_from_str("ngo"), None);
    }

    #[test]
    fn admin_counts_as_staff() {
        assert!(UserRole::Admin.is_staff());
        assert!(UserRole::Staff.is_staff());
        assert!(!UserRole::Student.is_staff());
    }

    #[test]
    fn only_reserved_is_open() {
        assert!(!ClaimStatus::Reserved.is_terminal());
        assert!(ClaimStatus::Claimed.is_terminal());
        assert!(ClaimStatus::Expired.is_terminal());
        assert!(ClaimStatus::Cancelled.is_terminal());
    }

    #[test]
    fn status_strings_match_serde_names() {
        for status in [
            ClaimStatus::Reserved,
            ClaimStatus::Claimed,
            ClaimStatus::Expired,
            ClaimStatus::Cancelled,
        ] {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
        let json = serde_json::to_string(&DonationStatus::ReservedForNgo).unwrap();
        assert_eq!(json, "\"reserved_for_ngo\"");
        assert_eq!(
            DonationStatus::get_enum_from_str("reserved_for_ngo"),
            Some(DonationStatus::ReservedForNgo)
        );
    }
}
