use serde::Deserialize;
use utoipa::ToSchema;

use super::{StoreError, StoreResult, confirmed_user};
use crate::{
    gateway::{Gateway, GatewayError, ProfileUpdate},
    identity::Session,
    models::UserProfile,
};

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ProfileEdit {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

fn cleaned(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string())
}

pub async fn load_profile<G: Gateway>(gateway: &G, session: &Session) -> StoreResult<UserProfile> {
    let user_id = confirmed_user(session)?;
    gateway
        .profile_by_id(user_id)
        .await?
        .ok_or(StoreError::Gateway(GatewayError::NotFound))
}

/// Saves the editable profile fields and refreshes the session's display name.
pub async fn update_profile<G: Gateway>(
    gateway: &G,
    session: &Session,
    edit: ProfileEdit,
) -> StoreResult<UserProfile> {
    let user_id = confirmed_user(session)?;
    let full_name = cleaned(edit.full_name);
    if full_name.as_deref() == Some("") {
        return Err(StoreError::Validation("full name cannot be blank".into()));
    }
    let update = ProfileUpdate {
        full_name,
        phone: cleaned(edit.phone),
        address: cleaned(edit.address),
    };
    let profile = gateway.update_profile(user_id, update).await.map_err(|err| {
        tracing::warn!(error = %err, user = %user_id, "profile update failed");
        StoreError::from(err)
    })?;

    if let Some(mut identity) = session.current_identity() {
        identity.display_name = profile.full_name.clone();
        session.sign_in(identity);
    }
    Ok(profile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        gateway::{MemoryGateway, NewProfile},
        models::Role,
    };

    async fn registered(gateway: &MemoryGateway) -> Session {
        let profile = gateway
            .insert_profile(NewProfile {
                email: "nadia@example.com".into(),
                full_name: "Nadia".into(),
                role: Role::User,
                password_hash: None,
            })
            .await
            .unwrap();
        Session::signed_in(profile.identity())
    }

    #[tokio::test]
    async fn edit_updates_profile_and_session_name() {
        let gateway = MemoryGateway::new();
        let session = registered(&gateway).await;

        let profile = update_profile(
            &gateway,
            &session,
            ProfileEdit {
                full_name: Some(" Nadia Islam ".into()),
                phone: Some("01900000000".into()),
                address: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(profile.full_name, "Nadia Islam");
        assert_eq!(profile.phone.as_deref(), Some("01900000000"));
        assert_eq!(
            session.current_identity().map(|i| i.display_name),
            Some("Nadia Islam".to_string())
        );

        let loaded = load_profile(&gateway, &session).await.unwrap();
        assert_eq!(loaded, profile);
    }

    #[tokio::test]
    async fn blank_name_is_rejected() {
        let gateway = MemoryGateway::new();
        let session = registered(&gateway).await;
        let edit = ProfileEdit {
            full_name: Some("  ".into()),
            ..ProfileEdit::default()
        };
        assert!(matches!(
            update_profile(&gateway, &session, edit).await,
            Err(StoreError::Validation(_))
        ));
    }
}
