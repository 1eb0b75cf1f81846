use uuid::Uuid;

use crate::core::security;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::repositories;

/// Makes sure the configured administrator exists, is active and has the configured password.
pub(crate) async fn ensure_superuser(state: &AppState) -> anyhow::Result<()> {
    let admin = state.settings().admin();
    if admin.first_superuser_password.is_empty() {
        tracing::warn!("FIRST_SUPERUSER_PASSWORD not configured; skipping superuser creation");
        return Ok(());
    }

    let username = &admin.first_superuser_username;
    let now = primitive_now_utc();

    if let Some(user) = repositories::users::find_by_username(state.db(), username).await? {
        let verified =
            security::verify_password(&admin.first_superuser_password, &user.hashed_password)
                .unwrap_or(false);

        if verified && user.is_admin && user.is_active {
            tracing::info!("Default superuser already up to date");
            return Ok(());
        }

        let hashed_password = if verified {
            None
        } else {
            Some(security::hash_password(&admin.first_superuser_password)?)
        };

        repositories::users::update(
            state.db(),
            &user.id,
            repositories::users::UpdateUser {
                hashed_password,
                is_admin: Some(true),
                is_active: Some(true),
                updated_at: now,
            },
        )
        .await?;

        tracing::info!(username = %username, "Updated default superuser");
        return Ok(());
    }

    let hashed_password = security::hash_password(&admin.first_superuser_password)?;

    let created = repositories::users::create(
        state.db(),
        repositories::users::CreateUser {
            id: &Uuid::new_v4().to_string(),
            username,
            hashed_password,
            is_admin: true,
            is_active: true,
            created_at: now,
            updated_at: now,
        },
    )
    .await?;

    if created.is_some() {
        tracing::info!(username = %username, "Created default superuser");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::ensure_superuser;
    use crate::core::{config::Settings, security, state::AppState};
    use crate::repositories;
    use crate::test_support;

    #[tokio::test]
    async fn existing_user_is_promoted_and_password_reset() {
        let ctx = test_support::setup_test_context().await;
        std::env::set_var("FIRST_SUPERUSER_USERNAME", "root");
        std::env::set_var("FIRST_SUPERUSER_PASSWORD", "root-password");
        let settings = Settings::load();
        std::env::remove_var("FIRST_SUPERUSER_USERNAME");
        std::env::remove_var("FIRST_SUPERUSER_PASSWORD");
        let state = AppState::new(
            settings.expect("settings"),
            ctx.state.db().clone(),
            ctx.state.redis().clone(),
        );

        let user = test_support::insert_user(state.db(), "root", "some-other-password").await;

        ensure_superuser(&state).await.expect("bootstrap");

        let refreshed = repositories::users::find_by_id(state.db(), &user.id)
            .await
            .expect("lookup")
            .expect("user exists");
        assert!(refreshed.is_admin);
        assert!(security::verify_password("root-password", &refreshed.hashed_password)
            .expect("verify"));
    }

    #[tokio::test]
    async fn missing_password_skips_bootstrap() {
        let ctx = test_support::setup_test_context().await;

        ensure_superuser(&ctx.state).await.expect("bootstrap");

        let user = repositories::users::find_by_username(ctx.state.db(), "admin")
            .await
            .expect("lookup");
        assert!(user.is_none());
    }
}
