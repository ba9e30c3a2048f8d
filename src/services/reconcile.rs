use std::sync::Arc;

use crate::models::{RegistrationMethod, User};
use crate::services::directory::{DirectoryError, UserDirectory};
use crate::services::google::ProviderClaims;

/// Maps a verified provider identity to a local user record, creating one
/// on first login.
#[derive(Clone)]
pub struct IdentityReconciler {
    directory: Arc<dyn UserDirectory>,
}

impl IdentityReconciler {
    pub fn new(directory: Arc<dyn UserDirectory>) -> Self {
        Self { directory }
    }

    /// Find-or-create by email. An existing record is returned unchanged;
    /// later logins never refresh profile fields. Losing a uniqueness race
    /// retries the whole attempt once, with a fresh email lookup and
    /// username probe, before the conflict is surfaced.
    pub async fn reconcile(&self, claims: &ProviderClaims) -> Result<User, DirectoryError> {
        match self.attempt(claims).await {
            Err(DirectoryError::Duplicate(reason)) => {
                tracing::warn!(email = %claims.email, %reason, "Lost registration race, retrying");
                self.attempt(claims).await
            }
            other => other,
        }
    }

    async fn attempt(&self, claims: &ProviderClaims) -> Result<User, DirectoryError> {
        if let Some(existing) = self.directory.find_by_email(&claims.email).await? {
            return Ok(existing);
        }

        let username = self.next_free_username(base_username(&claims.email)).await?;
        let user = User::new(
            username,
            claims.email.clone(),
            claims.given_name.clone(),
            claims.family_name.clone(),
            RegistrationMethod::Google,
        );

        let created = self.directory.create(user).await?;
        tracing::info!(
            user_id = %created.user_id,
            username = %created.username,
            "Created user from Google identity"
        );
        Ok(created)
    }

    /// Probe `base`, `base_1`, `base_2`, ... until an unused username is
    /// found. The probe is advisory only; `create` still enforces
    /// uniqueness atomically.
    async fn next_free_username(&self, base: &str) -> Result<String, DirectoryError> {
        if !self.directory.exists_by_username(base).await? {
            return Ok(base.to_string());
        }

        let mut suffix = 1u32;
        loop {
            let candidate = format!("{}_{}", base, suffix);
            if !self.directory.exists_by_username(&candidate).await? {
                return Ok(candidate);
            }
            suffix += 1;
        }
    }
}

fn base_username(email: &str) -> &str {
    email.split('@').next().unwrap_or(email)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::directory::InMemoryDirectory;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn claims(email: &str, given: &str, family: &str) -> ProviderClaims {
        ProviderClaims {
            email: email.to_string(),
            given_name: given.to_string(),
            family_name: family.to_string(),
        }
    }

    fn reconciler(directory: Arc<dyn UserDirectory>) -> IdentityReconciler {
        IdentityReconciler::new(directory)
    }

    #[test]
    fn base_username_is_email_local_part() {
        assert_eq!(base_username("a@x.com"), "a");
        assert_eq!(base_username("first.last@example.org"), "first.last");
        assert_eq!(base_username("no-at-sign"), "no-at-sign");
    }

    #[tokio::test]
    async fn novel_email_creates_user_with_local_part_username() {
        let directory = Arc::new(InMemoryDirectory::new());
        let user = reconciler(directory.clone())
            .reconcile(&claims("a@x.com", "A", "B"))
            .await
            .unwrap();

        assert_eq!(user.username, "a");
        assert_eq!(user.email, "a@x.com");
        assert_eq!(user.first_name, "A");
        assert_eq!(user.last_name, "B");
        assert_eq!(user.registration_method, "google");
        assert_eq!(directory.user_count(), 1);
    }

    #[tokio::test]
    async fn existing_email_returns_record_unchanged() {
        let directory = Arc::new(InMemoryDirectory::new());
        let service = reconciler(directory.clone());

        let first = service
            .reconcile(&claims("a@x.com", "Original", "Name"))
            .await
            .unwrap();
        // Same email, different profile claims: first write wins.
        let second = service
            .reconcile(&claims("a@x.com", "Changed", "Claims"))
            .await
            .unwrap();

        assert_eq!(second.user_id, first.user_id);
        assert_eq!(second.first_name, "Original");
        assert_eq!(directory.user_count(), 1);
    }

    #[tokio::test]
    async fn username_collision_probes_numeric_suffixes() {
        let directory = Arc::new(InMemoryDirectory::new());
        let service = reconciler(directory.clone());

        let first = service.reconcile(&claims("a@x.com", "", "")).await.unwrap();
        let second = service.reconcile(&claims("a@y.com", "", "")).await.unwrap();
        let third = service.reconcile(&claims("a@z.com", "", "")).await.unwrap();

        assert_eq!(first.username, "a");
        assert_eq!(second.username, "a_1");
        assert_eq!(third.username, "a_2");
    }

    #[tokio::test]
    async fn concurrent_registrations_never_share_a_username() {
        let directory = Arc::new(InMemoryDirectory::new());
        let service = reconciler(directory.clone());

        let left_claims = claims("a@x.com", "", "");
        let right_claims = claims("a@y.com", "", "");
        let (left, right) = tokio::join!(
            service.reconcile(&left_claims),
            service.reconcile(&right_claims),
        );

        let left = left.unwrap();
        let right = right.unwrap();
        assert_ne!(left.username, right.username);
        assert!(left.username == "a" || right.username == "a");
        assert_eq!(directory.user_count(), 2);
    }

    /// Directory double whose probe lies once: the first `exists_by_username`
    /// reports the name as free even when it is taken, forcing `create` to
    /// lose the uniqueness race exactly once.
    struct RacingDirectory {
        inner: InMemoryDirectory,
        lied: AtomicBool,
    }

    #[async_trait]
    impl UserDirectory for RacingDirectory {
        async fn find_by_email(&self, email: &str) -> Result<Option<User>, DirectoryError> {
            self.inner.find_by_email(email).await
        }

        async fn exists_by_username(&self, username: &str) -> Result<bool, DirectoryError> {
            if !self.lied.swap(true, Ordering::SeqCst) {
                return Ok(false);
            }
            self.inner.exists_by_username(username).await
        }

        async fn create(&self, user: User) -> Result<User, DirectoryError> {
            self.inner.create(user).await
        }
    }

    #[tokio::test]
    async fn lost_race_is_retried_once_with_a_fresh_probe() {
        let racing = RacingDirectory {
            inner: InMemoryDirectory::new(),
            lied: AtomicBool::new(false),
        };
        racing
            .inner
            .create(User::new(
                "a".to_string(),
                "other@y.com".to_string(),
                String::new(),
                String::new(),
                RegistrationMethod::Google,
            ))
            .await
            .unwrap();

        let user = reconciler(Arc::new(racing))
            .reconcile(&claims("a@x.com", "", ""))
            .await
            .unwrap();

        // First attempt raced into the taken base name and failed; the
        // retry probed honestly and landed on the suffixed name.
        assert_eq!(user.username, "a_1");
    }
}
