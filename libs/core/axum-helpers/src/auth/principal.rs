use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use utoipa::ToSchema;

/// The validated identity behind a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Principal {
    /// Identity provider subject (`sub`)
    pub user_id: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub roles: BTreeSet<String>,
    pub email_verified: bool,
}

impl Principal {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoleClaim {
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Keycloak access token claims.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeycloakClaims {
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub preferred_username: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default)]
    pub realm_access: Option<RoleClaim>,
    #[serde(default)]
    pub resource_access: HashMap<String, RoleClaim>,
    pub exp: i64,
    #[serde(default)]
    pub iat: Option<i64>,
    #[serde(default)]
    pub iss: Option<String>,
}

impl KeycloakClaims {
    /// Realm roles plus the roles granted on `client_id`.
    pub fn into_principal(self, client_id: &str) -> Principal {
        let mut roles: BTreeSet<String> = self
            .realm_access
            .map(|access| access.roles.into_iter().collect())
            .unwrap_or_default();

        if let Some(client) = self.resource_access.get(client_id) {
            roles.extend(client.roles.iter().cloned());
        }

        Principal {
            user_id: self.sub,
            email: self.email,
            name: self.name.or(self.preferred_username),
            roles,
            email_verified: self.email_verified,
        }
    }
}
