use serde::Deserialize;
use serde_json::Value;
use utoipa::ToSchema;

use crate::{
    gateway::{Gateway, NewProfile},
    models::{Identity, Role},
    store::StoreResult,
};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ExternalEmail {
    pub email_address: String,
}

/// A user record as reported by a hosted identity provider.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ExternalUser {
    pub id: String,
    #[serde(default)]
    pub email_addresses: Vec<ExternalEmail>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub public_metadata: Value,
}

impl ExternalUser {
    pub fn primary_email(&self) -> Option<&str> {
        self.email_addresses
            .first()
            .map(|e| e.email_address.as_str())
    }

    /// Role claimed in provider metadata; missing or unknown values mean `None`.
    pub fn metadata_role(&self) -> Option<Role> {
        self.public_metadata
            .get("role")
            .and_then(Value::as_str)
            .and_then(|role| role.parse().ok())
    }

    /// Provider-keyed identity. Its id is usually not a gateway user key, so
    /// stores treat it as unconfirmed until [`ExternalUser::bridge`] runs.
    pub fn identity(&self) -> Identity {
        Identity {
            id: self.id.clone(),
            email: self.primary_email().unwrap_or_default().to_string(),
            display_name: self.full_name.clone().unwrap_or_default(),
            role: self.metadata_role().unwrap_or(Role::User),
        }
    }

    /// Resolves the provider user to a gateway profile, creating one on first sight.
    ///
    /// The metadata role only seeds a new profile; afterwards the stored role wins.
    pub async fn bridge<G: Gateway>(&self, gateway: &G) -> StoreResult<Identity> {
        let provider = self.identity();
        if provider.user_id().is_some() || provider.email.is_empty() {
            return Ok(provider);
        }

        let profile = match gateway.credentials_by_email(&provider.email).await? {
            Some(stored) => stored.profile,
            None => {
                let profile = gateway
                    .insert_profile(NewProfile {
                        email: provider.email.clone(),
                        full_name: provider.display_name.clone(),
                        role: provider.role,
                        password_hash: None,
                    })
                    .await?;
                tracing::info!(
                    user = %profile.id,
                    provider_id = %self.id,
                    "bridged external account"
                );
                profile
            }
        };
        Ok(profile.identity())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::gateway::MemoryGateway;

    fn provider_user(metadata: Value) -> ExternalUser {
        serde_json::from_value(json!({
            "id": "user_2abcDEF",
            "email_addresses": [{ "email_address": "karim@example.com" }],
            "full_name": "Karim Uddin",
            "public_metadata": metadata,
        }))
        .unwrap()
    }

    #[test]
    fn maps_first_email_name_and_role() {
        let identity = provider_user(json!({ "role": "staff" })).identity();
        assert_eq!(identity.email, "karim@example.com");
        assert_eq!(identity.display_name, "Karim Uddin");
        assert_eq!(identity.role, Role::Staff);
        assert_eq!(identity.user_id(), None);
    }

    #[test]
    fn missing_or_unknown_role_defaults_to_user() {
        assert_eq!(provider_user(json!({})).identity().role, Role::User);
        assert_eq!(
            provider_user(json!({ "role": "owner" })).identity().role,
            Role::User
        );
    }

    #[tokio::test]
    async fn bridge_creates_profile_once_and_reuses_it() {
        let gateway = MemoryGateway::new();
        let user = provider_user(json!({}));

        let first = user.bridge(&gateway).await.unwrap();
        let second = user.bridge(&gateway).await.unwrap();
        assert!(first.user_id().is_some());
        assert_eq!(first.id, second.id);
        assert_eq!(first.display_name, "Karim Uddin");
    }

    #[tokio::test]
    async fn stored_role_outranks_provider_metadata() {
        let gateway = MemoryGateway::new();
        let user = provider_user(json!({ "role": "staff" }));

        let first = user.bridge(&gateway).await.unwrap();
        assert_eq!(first.role, Role::Staff);

        let id = first.user_id().unwrap();
        gateway.set_role(id, Role::User).await.unwrap();
        let again = user.bridge(&gateway).await.unwrap();
        assert_eq!(again.id, first.id);
        assert_eq!(again.role, Role::User);
    }
}
