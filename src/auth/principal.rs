use crate::models::common::UserRole;

/// Authenticated caller attached to each request by `AuthLayer`.
#[derive(Clone, Debug, PartialEq)]
pub struct Principal {
    pub user_id: i32,
    pub role: UserRole,
}

impl Principal {
    /// Parses the dev-bypass `as` parameter, e.g. `staff-4` or `student-12`.
    pub fn from_dev_param(value: &str) -> Option<Self> {
        let (role_part, id_part) = value.rsplit_once('-')?;
        let role = UserRole::get_enum_from_str(role_part)?;
        let user_id = id_part.parse::<i32>().ok()?;
        Some(Principal { user_id, role })
    }
}
