use keyring::Entry;
use patrakosh_core::AuthSession;
use thiserror::Error;

const SERVICE_NAME: &str = "com.patrakosh.client";
const TOKEN_KEY: &str = "patrakosh_token";
const USER_KEY: &str = "patrakosh_user";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),
    #[error("stored profile is corrupt: {0}")]
    Profile(#[from] serde_json::Error),
}

/// Bearer token and user profile persisted under two fixed keys. Written at
/// login/signup, read at startup, cleared on logout. The sync layer only
/// ever consumes the token it is constructed with; it never touches this.
pub struct SessionStore {
    token: Entry,
    user: Entry,
}

impl SessionStore {
    pub fn new() -> Result<Self, SessionError> {
        Ok(Self {
            token: Entry::new(SERVICE_NAME, TOKEN_KEY)?,
            user: Entry::new(SERVICE_NAME, USER_KEY)?,
        })
    }

    pub fn save(&self, session: &AuthSession) -> Result<(), SessionError> {
        self.token.set_password(&session.token)?;
        self.user
            .set_password(&serde_json::to_string(&session.user)?)?;
        Ok(())
    }

    pub fn load(&self) -> Result<Option<AuthSession>, SessionError> {
        let token = match self.token.get_password() {
            Ok(token) => token,
            Err(keyring::Error::NoEntry) => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let user = match self.user.get_password() {
            Ok(raw) => serde_json::from_str(&raw)?,
            Err(keyring::Error::NoEntry) => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        Ok(Some(AuthSession { token, user }))
    }

    pub fn clear(&self) -> Result<(), SessionError> {
        match self.token.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => {}
            Err(err) => return Err(err.into()),
        }
        match self.user.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => {}
            Err(err) => return Err(err.into()),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use patrakosh_core::UserProfile;

    #[test]
    fn save_load_clear_round_trip() {
        keyring::set_default_credential_builder(keyring::mock::default_credential_builder());

        let store = SessionStore::new().unwrap();
        assert!(store.load().unwrap().is_none());

        let session = AuthSession {
            token: "jwt-token".to_string(),
            user: UserProfile {
                id: 1,
                username: "asha".to_string(),
                email: "asha@example.com".to_string(),
            },
        };
        store.save(&session).unwrap();
        assert_eq!(store.load().unwrap(), Some(session));

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
        // Clearing twice is fine.
        store.clear().unwrap();
    }
}
