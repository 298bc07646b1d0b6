use serde_json::Value;

use super::AuthClaims;

/// Decides whether verified claims grant administrative access
pub trait ClaimsValidator: Send + Sync {
    fn is_admin(&self, claims: &AuthClaims) -> bool;
}

/// Admin when `claim` equals `role`, or is an array containing it
#[derive(Debug, Clone)]
pub struct RoleClaimsValidator {
    claim: String,
    role: String,
}

impl RoleClaimsValidator {
    pub fn new(claim: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            claim: claim.into(),
            role: role.into(),
        }
    }
}

impl Default for RoleClaimsValidator {
    fn default() -> Self {
        Self::new("role", "admin")
    }
}

impl ClaimsValidator for RoleClaimsValidator {
    fn is_admin(&self, claims: &AuthClaims) -> bool {
        match claims.get(&self.claim) {
            Some(Value::String(value)) => *value == self.role,
            Some(Value::Array(values)) => values.iter().any(|v| v.as_str() == Some(self.role.as_str())),
            _ => false,
        }
    }
}
