use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Role granting platform-wide administration
pub const ROLE_SUPER_ADMIN: &str = "super_admin";

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatedUser {
    /// Stable identifier issued by the identity provider (`sub` claim)
    pub user_id: String,
    pub roles: Vec<String>,
}

impl AuthenticatedUser {
    /// Check if user has a specific role
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Check if user is super admin
    pub fn is_super_admin(&self) -> bool {
        self.has_role(ROLE_SUPER_ADMIN)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomClaims {
    #[serde(default)]
    pub roles: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_super_admin_detection() {
        let user = AuthenticatedUser {
            user_id: "user-1".to_string(),
            roles: vec!["member".to_string(), ROLE_SUPER_ADMIN.to_string()],
        };
        assert!(user.is_super_admin());
        assert!(user.has_role("member"));
        assert!(!user.has_role("coach"));
    }
}
