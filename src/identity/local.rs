use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use password_hash::rand_core::OsRng;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::ExternalUser;
use crate::{
    gateway::{Gateway, NewProfile},
    models::{Identity, Role, UserProfile},
    store::{StoreError, StoreResult},
};

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub name: String,
    pub role: String,
    pub exp: usize,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct Registration {
    pub email: String,
    #[serde(default)]
    pub full_name: String,
    pub password: String,
    pub confirm_password: String,
}

impl Registration {
    fn validate(&self) -> StoreResult<()> {
        let email = self.email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(StoreError::Validation("A valid email is required".into()));
        }
        if self.password != self.confirm_password {
            return Err(StoreError::Validation("Passwords do not match".into()));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(StoreError::Validation(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters long"
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SignedIn {
    pub token: String,
    pub identity: Identity,
}

/// Self-hosted identity: argon2 password hashes in the profile table, HS256 bearer tokens.
#[derive(Clone)]
pub struct LocalAuth<G> {
    gateway: G,
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl<G: Gateway> LocalAuth<G> {
    pub fn new(gateway: G, secret: &str, ttl_hours: i64) -> Self {
        Self {
            gateway,
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::hours(ttl_hours),
        }
    }

    /// Creates a shopper account. Back-office roles are only granted by an admin.
    pub async fn register(&self, input: Registration) -> StoreResult<UserProfile> {
        input.validate()?;
        let email = input.email.trim().to_lowercase();
        if self.gateway.credentials_by_email(&email).await?.is_some() {
            return Err(StoreError::Validation("Email is already taken".into()));
        }

        let password_hash = hash_password(&input.password)?;
        let full_name = match input.full_name.trim() {
            "" => email.split('@').next().unwrap_or_default().to_string(),
            name => name.to_string(),
        };
        let profile = self
            .gateway
            .insert_profile(NewProfile {
                email,
                full_name,
                role: Role::User,
                password_hash: Some(password_hash),
            })
            .await?;
        tracing::info!(user = %profile.id, "account registered");
        Ok(profile)
    }

    pub async fn login(&self, email: &str, password: &str) -> StoreResult<SignedIn> {
        let email = email.trim().to_lowercase();
        let Some(stored) = self.gateway.credentials_by_email(&email).await? else {
            return Err(StoreError::InvalidCredentials);
        };
        // Accounts bridged from an external provider have no local password.
        let Some(hash) = stored.password_hash.as_deref() else {
            return Err(StoreError::InvalidCredentials);
        };
        if !verify_password(password, hash)? {
            return Err(StoreError::InvalidCredentials);
        }

        let identity = stored.profile.identity();
        let token = self.issue(&identity)?;
        tracing::info!(user = %identity.id, "signed in");
        Ok(SignedIn { token, identity })
    }

    /// Exchanges a provider user record for a local token, bridging it to a profile.
    pub async fn sign_in_external(&self, user: &ExternalUser) -> StoreResult<SignedIn> {
        let identity = user.bridge(&self.gateway).await?;
        if identity.user_id().is_none() {
            return Err(StoreError::Validation(
                "provider user has no email address".into(),
            ));
        }
        let token = self.issue(&identity)?;
        tracing::info!(user = %identity.id, "signed in through provider");
        Ok(SignedIn { token, identity })
    }

    pub fn issue(&self, identity: &Identity) -> StoreResult<String> {
        let expiration = Utc::now()
            .checked_add_signed(self.ttl)
            .ok_or_else(|| StoreError::Internal("Failed to set expiration".into()))?;

        let claims = Claims {
            sub: identity.id.clone(),
            email: identity.email.clone(),
            name: identity.display_name.clone(),
            role: identity.role.as_str().to_string(),
            exp: expiration.timestamp() as usize,
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| StoreError::Internal(e.to_string()))
    }

    pub fn verify(&self, token: &str) -> StoreResult<Identity> {
        let token = token.strip_prefix("Bearer ").unwrap_or(token).trim();
        let decoded = decode::<Claims>(token, &self.decoding, &Validation::default())
            .map_err(|_| StoreError::InvalidToken)?;
        let claims = decoded.claims;
        let role = claims.role.parse().map_err(|_| StoreError::InvalidToken)?;
        Ok(Identity {
            id: claims.sub,
            email: claims.email,
            display_name: claims.name,
            role,
        })
    }
}

pub(crate) fn hash_password(password: &str) -> StoreResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| StoreError::Internal(e.to_string()))
}

fn verify_password(password: &str, hash: &str) -> StoreResult<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|_| StoreError::Internal("Invalid password hash".into()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::MemoryGateway;

    fn auth() -> LocalAuth<MemoryGateway> {
        LocalAuth::new(MemoryGateway::new(), "test-secret", 1)
    }

    fn registration(password: &str, confirm: &str) -> Registration {
        Registration {
            email: "Rahim@Example.com ".into(),
            full_name: "Rahim".into(),
            password: password.into(),
            confirm_password: confirm.into(),
        }
    }

    #[tokio::test]
    async fn register_then_login_round_trips_identity() {
        let auth = auth();
        let profile = auth.register(registration("secret1", "secret1")).await.unwrap();
        assert_eq!(profile.email, "rahim@example.com");
        assert_eq!(profile.role, Role::User);

        let signed_in = auth.login("rahim@example.com", "secret1").await.unwrap();
        assert_eq!(signed_in.identity.user_id(), Some(profile.id));

        let verified = auth.verify(&format!("Bearer {}", signed_in.token)).unwrap();
        assert_eq!(verified, signed_in.identity);
    }

    #[tokio::test]
    async fn register_rejects_mismatch_short_and_taken() {
        let auth = auth();
        let err = auth.register(registration("secret1", "secret2")).await.unwrap_err();
        assert!(matches!(err, StoreError::Validation(ref m) if m == "Passwords do not match"));

        let err = auth.register(registration("abc", "abc")).await.unwrap_err();
        assert!(matches!(err, StoreError::Validation(ref m) if m.contains("at least 6")));

        auth.register(registration("secret1", "secret1")).await.unwrap();
        let err = auth.register(registration("secret1", "secret1")).await.unwrap_err();
        assert!(matches!(err, StoreError::Validation(ref m) if m == "Email is already taken"));
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let auth = auth();
        auth.register(registration("secret1", "secret1")).await.unwrap();
        let err = auth.login("rahim@example.com", "nope").await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidCredentials));
    }

    #[test]
    fn tokens_signed_with_another_secret_are_rejected() {
        let issuer = LocalAuth::new(MemoryGateway::new(), "one", 1);
        let verifier = LocalAuth::new(MemoryGateway::new(), "two", 1);
        let identity = Identity {
            id: uuid::Uuid::new_v4().to_string(),
            email: "a@b.c".into(),
            display_name: "A".into(),
            role: Role::Staff,
        };
        let token = issuer.issue(&identity).unwrap();
        assert!(matches!(verifier.verify(&token), Err(StoreError::InvalidToken)));
        assert_eq!(issuer.verify(&token).unwrap().role, Role::Staff);
    }

    #[tokio::test]
    async fn provider_users_get_a_local_token() {
        let auth = auth();
        let user: ExternalUser = serde_json::from_value(serde_json::json!({
            "id": "user_2xyz",
            "email_addresses": [{ "email_address": "nadia@example.com" }],
            "full_name": "Nadia Islam",
        }))
        .unwrap();

        let signed_in = auth.sign_in_external(&user).await.unwrap();
        assert!(signed_in.identity.user_id().is_some());
        assert_eq!(auth.verify(&signed_in.token).unwrap(), signed_in.identity);

        let nameless: ExternalUser =
            serde_json::from_value(serde_json::json!({ "id": "user_0" })).unwrap();
        let err = auth.sign_in_external(&nameless).await.unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }
}
