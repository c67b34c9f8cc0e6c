use tms_core::error::{Result, TmsError};

/// Hash used when the username does not exist, so both failure paths run one
/// bcrypt verification.
const DUMMY_HASH: &str = "$2b$10$CCCCCCCCCCCCCCCCCCCCC.E5YPO9kmyuRGyh0XouQYb4YMJKvyOeW";

pub fn hash_password(password: &str, cost: u32) -> Result<String> {
    bcrypt::hash(password, cost).map_err(|e| TmsError::Internal(format!("password hash failed: {e}")))
}

/// Verify `password` against a stored bcrypt hash. `None` means the user is
/// unknown; the result is then always `false`.
pub fn verify_password(password: &str, stored_hash: Option<&str>) -> bool {
    match stored_hash {
        Some(hash) => bcrypt::verify(password, hash).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "stored password hash is not a valid bcrypt hash");
            false
        }),
        None => {
            let _ = bcrypt::verify(password, DUMMY_HASH);
            false
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hash = hash_password("correct", 4).unwrap();
        assert!(hash.starts_with("$2"));
        assert!(verify_password("correct", Some(&hash)));
        assert!(!verify_password("wrong", Some(&hash)));
    }

    #[test]
    fn unknown_user_and_garbage_hash_never_verify() {
        assert!(!verify_password("anything", None));
        assert!(!verify_password("correct", Some("correct")));
    }
}
