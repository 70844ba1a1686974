use serde::{Deserialize, Serialize};

use crate::auth::dto::PublicUser;
use crate::auth::repo_types::Role;

/// Query parameters for the user listing.
#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    #[serde(default)]
    pub search: String,
    pub role: Option<Role>,
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_per_page")]
    pub per_page: i64,
}

fn default_page() -> i64 {
    1
}
fn default_per_page() -> i64 {
    20
}

#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub users: Vec<PublicUser>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}

#[derive(Debug, Deserialize)]
pub struct AssignRoleRequest {
    pub role: Role,
}

#[derive(Debug, Serialize)]
pub struct AssignRoleResponse {
    pub message: String,
    pub user: PublicUser,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_query_defaults() {
        let q: ListUsersQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(q.search, "");
        assert!(q.role.is_none());
        assert_eq!(q.page, 1);
        assert_eq!(q.per_page, 20);
    }

    #[test]
    fn role_filter_parses_lowercase() {
        let q: ListUsersQuery = serde_json::from_str(r#"{"role":"superadmin"}"#).unwrap();
        assert_eq!(q.role, Some(Role::Superadmin));
    }
}
