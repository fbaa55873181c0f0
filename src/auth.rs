use std::sync::{Arc, PoisonError, RwLock};

/// Authentication facts the watchlist needs, read at call time
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub is_authenticated: bool,
    pub user_id: Option<String>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(user_id: impl Into<String>) -> Self {
        Self {
            is_authenticated: true,
            user_id: Some(user_id.into()),
        }
    }

    /// The user id to use for remote calls, if this session may make them
    pub fn user_id(&self) -> Option<&str> {
        if self.is_authenticated {
            self.user_id.as_deref().filter(|id| !id.is_empty())
        } else {
            None
        }
    }
}

/// Read-only view of the application's authentication state
pub trait AuthContext: Send + Sync {
    fn session(&self) -> Session;
}

impl AuthContext for Session {
    fn session(&self) -> Session {
        self.clone()
    }
}

/// Authentication state shared between the application shell and the store
#[derive(Debug, Clone, Default)]
pub struct SharedAuth {
    inner: Arc<RwLock<Session>>,
}

impl SharedAuth {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn login(&self, user_id: impl Into<String>) {
        let user_id = user_id.into();
        tracing::info!(user_id = %user_id, "Session authenticated");
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) =
            Session::authenticated(user_id);
    }

    pub fn logout(&self) {
        tracing::info!("Session cleared");
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = Session::anonymous();
    }
}

impl AuthContext for SharedAuth {
    fn session(&self) -> Session {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
