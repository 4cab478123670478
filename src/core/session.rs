use crate::api::ApiClient;
use crate::core::KeyValueStore;
use crate::domain::sentiment::User;
use crate::utils::error::{ClientError, Result};

pub const USER_KEY: &str = "bt:user";

/// Signed-in state for one client, backed by a key-value store.
///
/// Lifecycle: [`load`](Self::load) on start, [`verify`](Self::verify)
/// against the backend, cleared on an invalid token or on sign-out. The
/// context is passed to whatever needs it; there is no global session.
pub struct SessionContext<K: KeyValueStore> {
    store: K,
    user: Option<User>,
}

impl<K: KeyValueStore> SessionContext<K> {
    pub fn new(store: K) -> Self {
        Self { store, user: None }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn token(&self) -> Option<&str> {
        self.user.as_ref().and_then(|u| u.token.as_deref())
    }

    pub fn is_signed_in(&self) -> bool {
        self.token().is_some()
    }

    pub fn store(&self) -> &K {
        &self.store
    }

    /// Rehydrates the persisted user. A corrupt entry is removed.
    pub fn load(&mut self) -> Result<Option<&User>> {
        self.user = match self.store.get(USER_KEY)? {
            Some(raw) => match serde_json::from_str::<User>(&raw) {
                Ok(user) => Some(user),
                Err(e) => {
                    tracing::warn!("⚠️ Discarding unreadable saved session: {}", e);
                    self.store.remove(USER_KEY)?;
                    None
                }
            },
            None => None,
        };
        Ok(self.user.as_ref())
    }

    /// Checks the saved token with the backend and clears the session when it
    /// is rejected or the backend is unreachable. Returns whether a valid
    /// session remains.
    pub async fn verify(&mut self, api: &ApiClient) -> Result<bool> {
        let Some(token) = self.token().map(str::to_string) else {
            return Ok(false);
        };

        match api.clone().with_token(Some(token)).me().await {
            Ok(()) => Ok(true),
            Err(e) => {
                tracing::info!("🔒 Saved session is no longer valid: {}", e);
                self.clear()?;
                Ok(false)
            }
        }
    }

    pub async fn sign_in(&mut self, api: &ApiClient, email: &str, password: &str) -> Result<&User> {
        let user = api.login(email, password).await?;
        self.persist(user)
    }

    pub async fn sign_up(
        &mut self,
        api: &ApiClient,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<&User> {
        let user = api.register(name, email, password).await?;
        self.persist(user)
    }

    /// Stores a user obtained elsewhere, e.g. from a password reset or an OAuth callback.
    pub fn set_user(&mut self, user: User) -> Result<&User> {
        self.persist(user)
    }

    /// Best-effort logout call; local state is cleared regardless.
    pub async fn sign_out(&mut self, api: &ApiClient) -> Result<()> {
        if let Some(token) = self.token().map(str::to_string) {
            if let Err(e) = api.clone().with_token(Some(token)).logout().await {
                tracing::error!("Logout error: {}", e);
            }
        }
        self.clear()
    }

    pub fn clear(&mut self) -> Result<()> {
        self.user = None;
        self.store.remove(USER_KEY)
    }

    /// API client authenticated as the current user.
    pub fn api_client(&self, api: &ApiClient) -> ApiClient {
        api.clone().with_token(self.token().map(str::to_string))
    }

    /// Like [`api_client`](Self::api_client) but fails when nobody is signed in.
    pub fn require_api_client(&self, api: &ApiClient) -> Result<ApiClient> {
        if !self.is_signed_in() {
            return Err(ClientError::NotAuthenticated);
        }
        Ok(self.api_client(api))
    }

    fn persist(&mut self, user: User) -> Result<&User> {
        self.store.set(USER_KEY, &serde_json::to_string(&user)?)?;
        Ok(self.user.insert(user))
    }
}
