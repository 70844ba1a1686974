use crate::auth::repo_types::Role;

/// Listing accounts is an administrative operation.
pub fn can_list_users(role: Role) -> bool {
    matches!(role, Role::Admin | Role::Superadmin)
}

/// Only a superadmin may change roles.
pub fn can_assign_roles(role: Role) -> bool {
    role == Role::Superadmin
}

/// Accounts on the configured list are exempt from role changes entirely.
pub fn is_protected(email: &str, protected_emails: &[String]) -> bool {
    let email = email.to_lowercase();
    protected_emails.iter().any(|p| *p == email)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_admins_list_users() {
        assert!(!can_list_users(Role::User));
        assert!(can_list_users(Role::Admin));
        assert!(can_list_users(Role::Superadmin));
    }

    #[test]
    fn only_superadmin_assigns_roles() {
        assert!(!can_assign_roles(Role::User));
        assert!(!can_assign_roles(Role::Admin));
        assert!(can_assign_roles(Role::Superadmin));
    }

    #[test]
    fn protected_match_is_case_insensitive() {
        let protected = vec!["owner@example.com".to_string()];
        assert!(is_protected("owner@example.com", &protected));
        assert!(is_protected("Owner@Example.COM", &protected));
        assert!(!is_protected("someone@example.com", &protected));
    }

    #[test]
    fn empty_list_protects_nobody() {
        assert!(!is_protected("owner@example.com", &[]));
    }
}
