// src/session.rs
//! Authentication state derived from the `userId` cookie and the stored token

use anyhow::Result;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

use crate::core::database::{Cookie, SessionStore};

pub const TOKEN_KEY: &str = "token";
pub const USER_ID_COOKIE: &str = "userId";
const USER_ID_COOKIE_DAYS: i64 = 7;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationEvent {
    /// Overwrite the current history entry so "back" cannot return to it
    ReplaceHistory(String),
    /// Leave for another URL, replacing the current entry
    Replace(String),
    /// Leave for another URL, keeping history
    Assign(String),
    /// Move between the wizard's own pages
    Route(String),
}

pub trait Navigator: Send + Sync {
    fn navigate(&self, event: NavigationEvent);
}

/// Prints navigation to the terminal; used by the CLI
pub struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn navigate(&self, event: NavigationEvent) {
        match event {
            NavigationEvent::ReplaceHistory(url) => info!("History replaced with {}", url),
            NavigationEvent::Replace(url) | NavigationEvent::Assign(url) => {
                info!("Navigating to {}", url);
                println!("→ Continue at {}", url);
            }
            NavigationEvent::Route(path) => {
                info!("Route changed to {}", path);
                println!("→ {}", path);
            }
        }
    }
}

/// Keeps every navigation in memory
#[derive(Default)]
pub struct RecordingNavigator {
    events: Mutex<Vec<NavigationEvent>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<NavigationEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, event: NavigationEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

pub struct Session {
    store: SessionStore,
    navigator: Arc<dyn Navigator>,
    host_app_url: String,
    hostname: String,
    secure: bool,
    authenticated: AtomicBool,
}

impl Session {
    pub async fn open(
        store: SessionStore,
        navigator: Arc<dyn Navigator>,
        host_app_url: String,
        hostname: String,
        secure: bool,
    ) -> Result<Self> {
        let session = Self {
            store,
            navigator,
            host_app_url,
            hostname,
            secure,
            authenticated: AtomicBool::new(false),
        };

        let user_id = session.user_id().await?;
        let token = session.token().await?;
        info!(
            "Initial auth check: userId={}, token={}",
            user_id.is_some(),
            token.is_some()
        );
        session
            .authenticated
            .store(user_id.is_some() && token.is_some(), Ordering::SeqCst);

        Ok(session)
    }

    pub fn host_app_url(&self) -> &str {
        &self.host_app_url
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn navigator(&self) -> Arc<dyn Navigator> {
        self.navigator.clone()
    }

    pub async fn user_id(&self) -> Result<Option<String>> {
        Ok(self
            .store
            .cookie_get(USER_ID_COOKIE)
            .await?
            .map(|cookie| cookie.value)
            .filter(|value| !value.is_empty()))
    }

    pub async fn token(&self) -> Result<Option<String>> {
        Ok(self
            .store
            .storage_get(TOKEN_KEY)
            .await?
            .filter(|value| !value.is_empty()))
    }

    /// Authenticated iff both the user id cookie and the token are present
    pub async fn is_authenticated(&self) -> Result<bool> {
        Ok(self.user_id().await?.is_some() && self.token().await?.is_some())
    }

    /// Re-derive the auth status; when the token vanished while we believed
    /// ourselves logged in (another process logged out), return to the host app.
    pub async fn handle_token_removed(&self) -> Result<bool> {
        let is_auth = self.is_authenticated().await?;
        let was_auth = self.authenticated.swap(is_auth, Ordering::SeqCst);

        if was_auth != is_auth {
            info!("Auth status changed: authenticated={}", is_auth);
            if was_auth && self.token().await?.is_none() {
                info!("Token removed elsewhere, leaving the wizard");
                self.navigator
                    .navigate(NavigationEvent::Replace(self.host_app_url.clone()));
            }
        }

        Ok(is_auth)
    }

    /// Persist the bootstrap credentials: token in local storage, user id cookie for 7 days
    pub async fn store_credentials(&self, user_id: &str, token: &str) -> Result<()> {
        self.store.storage_set(TOKEN_KEY, token).await?;
        self.store
            .cookie_set(
                &Cookie::new(USER_ID_COOKIE, user_id)
                    .expires_in_days(USER_ID_COOKIE_DAYS)
                    .secure(self.secure),
            )
            .await?;
        self.authenticated.store(true, Ordering::SeqCst);
        info!("Token generated and stored successfully");
        Ok(())
    }

    /// Clear all local state and hand the user back to the host application
    pub async fn logout(&self) {
        info!("Performing secure logout...");

        if let Err(e) = self.store.storage_clear().await {
            warn!("Failed to clear local storage: {}", e);
        }
        self.clear_cookies().await;
        self.authenticated.store(false, Ordering::SeqCst);

        self.navigator
            .navigate(NavigationEvent::ReplaceHistory(self.host_app_url.clone()));
        self.navigator
            .navigate(NavigationEvent::Replace(self.host_app_url.clone()));
    }

    /// Called by the HTTP client on every 401
    pub async fn handle_unauthorized(&self) {
        let was_authenticated = match self.is_authenticated().await {
            Ok(is_auth) => is_auth || self.authenticated.load(Ordering::SeqCst),
            Err(e) => {
                warn!("Could not read session state: {}", e);
                self.authenticated.load(Ordering::SeqCst)
            }
        };

        if was_authenticated {
            info!("401 error detected, logging out...");
            self.logout().await;
        } else {
            warn!("401 received without an authenticated session");
        }
    }

    async fn clear_cookies(&self) {
        let cookies = match self.store.cookies().await {
            Ok(cookies) => cookies,
            Err(e) => {
                warn!("Failed to list cookies: {}", e);
                return;
            }
        };

        let names: BTreeSet<String> = cookies.iter().map(|c| c.name.clone()).collect();

        for cookie in &cookies {
            self.remove_cookie_variant(&cookie.name, &cookie.path, &cookie.domain)
                .await;
        }
        for name in &names {
            self.remove_cookie_variant(name, "/", "").await;
            self.remove_cookie_variant(name, "/", &self.hostname).await;
        }
    }

    async fn remove_cookie_variant(&self, name: &str, path: &str, domain: &str) {
        if let Err(e) = self.store.cookie_remove(name, path, domain).await {
            warn!(
                "Failed to remove cookie {} (path={}, domain={}): {}",
                name, path, domain, e
            );
        }
    }
}
