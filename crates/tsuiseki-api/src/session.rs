use std::sync::{PoisonError, RwLock};

/// In-memory access token of one client.
///
/// Readers clone the current value before awaiting anything, so a token set
/// mid-request only affects requests issued afterwards.
#[derive(Default)]
pub struct AccessToken {
    inner: RwLock<Option<String>>,
}

impl AccessToken {
    /// Replace the token. Blank input clears it.
    pub fn set(&self, token: &str) {
        let token = token.trim();
        let value = (!token.is_empty()).then(|| token.to_string());
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = value;
    }

    pub fn get(&self) -> Option<String> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_set(&self) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = if self.is_set() { "<set>" } else { "<unset>" };
        f.debug_tuple("AccessToken").field(&state).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_write_wins() {
        let token = AccessToken::default();
        assert!(token.get().is_none());
        token.set("first");
        token.set("second");
        assert_eq!(token.get().as_deref(), Some("second"));
    }

    #[test]
    fn test_blank_clears() {
        let token = AccessToken::default();
        token.set("abc");
        token.set("  ");
        assert!(!token.is_set());
    }

    #[test]
    fn test_debug_hides_value() {
        let token = AccessToken::default();
        token.set("secret");
        assert!(!format!("{token:?}").contains("secret"));
    }
}
