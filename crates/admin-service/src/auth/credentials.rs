//! Password hashing off the async executor.

use std::sync::Arc;

use tokio::sync::OnceCell;

use admin_auth::PasswordHasher;
use admin_core::error::{AppError, ErrorKind};
use admin_core::result::AppResult;

/// Hash `password` on the blocking pool.
pub(crate) async fn hash(hasher: &Arc<dyn PasswordHasher>, password: String) -> AppResult<String> {
    let hasher = Arc::clone(hasher);
    tokio::task::spawn_blocking(move || hasher.hash_password(&password))
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Internal, "Password hashing task failed", e))?
}

/// Verify `password` against `hash` on the blocking pool.
pub(crate) async fn verify(
    hasher: &Arc<dyn PasswordHasher>,
    password: String,
    hash: String,
) -> AppResult<bool> {
    let hasher = Arc::clone(hasher);
    tokio::task::spawn_blocking(move || hasher.verify_password(&password, &hash))
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Internal, "Password verification task failed", e)
        })?
}

/// Stand-in hash verified when the username does not exist, so that path
/// spends the same hashing work as a wrong password.
#[derive(Debug, Default)]
pub(crate) struct DecoyHash {
    hash: OnceCell<String>,
}

impl DecoyHash {
    /// Verify `password` against the decoy, hashing it on first use. The
    /// outcome is discarded.
    pub(crate) async fn verify(
        &self,
        hasher: &Arc<dyn PasswordHasher>,
        password: String,
    ) -> AppResult<()> {
        let decoy = self
            .hash
            .get_or_try_init(|| hash(hasher, "decoy-credential".to_string()))
            .await?
            .clone();
        verify(hasher, password, decoy).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[derive(Debug, Default)]
    struct CountingHasher {
        hashed: AtomicUsize,
        verified: AtomicUsize,
    }

    impl PasswordHasher for CountingHasher {
        fn hash_password(&self, password: &str) -> AppResult<String> {
            self.hashed.fetch_add(1, Ordering::SeqCst);
            Ok(format!("h:{password}"))
        }

        fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool> {
            self.verified.fetch_add(1, Ordering::SeqCst);
            Ok(hash == format!("h:{password}"))
        }
    }

    #[tokio::test]
    async fn test_decoy_verifies_every_call_and_hashes_once() {
        let counting = Arc::new(CountingHasher::default());
        let hasher: Arc<dyn PasswordHasher> = counting.clone();
        let decoy = DecoyHash::default();

        decoy.verify(&hasher, "guess-1".to_string()).await.unwrap();
        decoy.verify(&hasher, "guess-2".to_string()).await.unwrap();

        assert_eq!(counting.hashed.load(Ordering::SeqCst), 1);
        assert_eq!(counting.verified.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_verify_reports_mismatch() {
        let hasher: Arc<dyn PasswordHasher> = Arc::new(CountingHasher::default());
        let stored = hash(&hasher, "secret".to_string()).await.unwrap();
        assert!(verify(&hasher, "secret".to_string(), stored.clone()).await.unwrap());
        assert!(!verify(&hasher, "other".to_string(), stored).await.unwrap());
    }
}
