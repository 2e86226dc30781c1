// src/router.rs
//! Decides which page the user lands on: import, editor or the external dashboard

use anyhow::Result;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::environment::{RunMode, WizardConfig, IN_APP_BASE_PATH};
use crate::services::ProfileService;
use crate::session::{NavigationEvent, Navigator};
use crate::types::profile::{ImportedProfile, Profile};

pub const IMPORT_PATH: &str = "/profile-import";
pub const EDITOR_PATH: &str = "/profile-editor";
const LEGACY_WIZARD_PATH: &str = "/profile-wizard";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Import,
    Editor,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Import => IMPORT_PATH,
            Route::Editor => EDITOR_PATH,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub route: Route,
    /// The requested path was not canonical and the user is redirected
    pub redirect: bool,
}

/// Map a requested path (with or without the in-app base path) to a page.
/// Legacy and unknown paths land on the import page.
pub fn resolve_path(path: &str) -> Resolution {
    let relative = path
        .strip_prefix(IN_APP_BASE_PATH)
        .unwrap_or(path);
    let relative = relative.trim_end_matches('/');

    match relative {
        IMPORT_PATH => Resolution {
            route: Route::Import,
            redirect: false,
        },
        EDITOR_PATH => Resolution {
            route: Route::Editor,
            redirect: false,
        },
        LEGACY_WIZARD_PATH => Resolution {
            route: Route::Import,
            redirect: true,
        },
        other => {
            info!("Unknown path {:?}, redirecting to import", other);
            Resolution {
                route: Route::Import,
                redirect: true,
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// Leave the wizard for the dashboard application
    Dashboard(String),
    Page(Route),
}

pub fn decide(profile: Option<&Profile>, dashboard_url: &str) -> Destination {
    match profile {
        Some(p) if p.is_basic_profile_completed => Destination::Dashboard(dashboard_url.to_string()),
        Some(p) if p.has_name() => Destination::Page(Route::Editor),
        _ => Destination::Page(Route::Import),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitOutcome {
    AlreadyAttempted,
    /// No user id in the cookie (in-app) or in the configuration (standalone)
    NoUserId,
    TokenUnavailable,
    Routed(Destination),
    /// Navigation had already happened, the route was left alone
    Skipped,
}

#[derive(Debug, PartialEq)]
pub enum View<'a> {
    Loading,
    Import,
    Editor {
        profile: &'a Profile,
        generated_summary: &'a str,
    },
}

pub struct ProfileRouter {
    config: WizardConfig,
    profiles: Arc<ProfileService>,
    navigator: Arc<dyn Navigator>,
    current: Route,
    initializing: bool,
    init_attempted: bool,
    has_navigated: bool,
    profile: Option<Profile>,
    generated_summary: String,
}

impl ProfileRouter {
    /// Start on `path`; a non-canonical path is replaced by its page at once
    pub fn new(config: WizardConfig, profiles: Arc<ProfileService>, path: &str) -> Self {
        let navigator = profiles.client().session().navigator();
        let resolution = resolve_path(path);

        let router = Self {
            config,
            profiles,
            navigator,
            current: resolution.route,
            initializing: true,
            init_attempted: false,
            has_navigated: false,
            profile: None,
            generated_summary: String::new(),
        };
        if resolution.redirect {
            router.emit_route(resolution.route);
        }
        router
    }

    pub fn current_route(&self) -> Route {
        self.current
    }

    pub fn is_initializing(&self) -> bool {
        self.initializing
    }

    pub fn has_navigated(&self) -> bool {
        self.has_navigated
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    pub fn generated_summary(&self) -> &str {
        &self.generated_summary
    }

    /// Bootstrap the session and route the user. Runs once per router.
    pub async fn initialize(&mut self) -> Result<InitOutcome> {
        if self.init_attempted {
            return Ok(InitOutcome::AlreadyAttempted);
        }
        self.init_attempted = true;

        let outcome = self.bootstrap().await;
        self.initializing = false;

        if let Err(e) = &outcome {
            error!("Initialization error: {:#}", e);
        }
        outcome
    }

    async fn bootstrap(&mut self) -> Result<InitOutcome> {
        let client = self.profiles.client().clone();
        let session = client.session().clone();

        let user_id = match self.config.run_mode {
            RunMode::Standalone => self
                .config
                .standalone_user_id
                .clone()
                .filter(|id| !id.is_empty()),
            RunMode::InApp => {
                let from_cookie = session.user_id().await?;
                if let Some(id) = &from_cookie {
                    info!("userId from cookies: {}", id);
                }
                from_cookie
            }
        };
        let Some(user_id) = user_id else {
            error!("No user ID found in cookies");
            return Ok(InitOutcome::NoUserId);
        };

        info!("Starting initialization for user: {}", user_id);

        let Some(token) = client.generate_token(&user_id).await? else {
            error!("Failed to obtain token");
            return Ok(InitOutcome::TokenUnavailable);
        };
        session.store_credentials(&user_id, &token).await?;

        let profile = self.profiles.get_profile(Some(&user_id)).await;
        info!(
            "Profile fetched: {}",
            if profile.is_some() { "Success" } else { "Not found" }
        );
        if profile.is_some() {
            self.profile = profile;
        }

        if self.has_navigated {
            info!("Navigation already happened, skipping route change");
            return Ok(InitOutcome::Skipped);
        }
        self.has_navigated = true;

        let destination = decide(self.profile.as_ref(), self.config.dashboard_url());
        self.apply(&destination);
        Ok(InitOutcome::Routed(destination))
    }

    fn apply(&mut self, destination: &Destination) {
        match destination {
            Destination::Dashboard(url) => {
                if url.is_empty() {
                    warn!("Profile complete but no dashboard URL is configured");
                    return;
                }
                info!("Profile complete, redirecting to dashboard");
                self.navigator.navigate(NavigationEvent::Assign(url.clone()));
            }
            Destination::Page(route) => {
                if self.current != *route {
                    info!("Navigating to {}", route.path());
                    self.current = *route;
                    self.emit_route(*route);
                }
            }
        }
    }

    fn emit_route(&self, route: Route) {
        let base = self.config.base_path().trim_end_matches('/');
        self.navigator
            .navigate(NavigationEvent::Route(format!("{}{}", base, route.path())));
    }

    /// A finished import always continues in the editor
    pub fn handle_imported(&mut self, imported: ImportedProfile) {
        self.profile = Some(imported.profile);
        self.generated_summary = imported.generated_summary;
        self.has_navigated = true;
        self.current = Route::Editor;
        self.emit_route(Route::Editor);
    }

    pub fn view(&self) -> View<'_> {
        if self.initializing {
            return View::Loading;
        }
        match self.current {
            Route::Import => View::Import,
            Route::Editor => match &self.profile {
                Some(profile) => View::Editor {
                    profile,
                    generated_summary: &self.generated_summary,
                },
                None => View::Loading,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_path() {
        assert_eq!(
            resolve_path("/profile-import"),
            Resolution {
                route: Route::Import,
                redirect: false
            }
        );
        assert_eq!(resolve_path("/repcreationprofile/profile-editor").route, Route::Editor);
        assert!(!resolve_path("/repcreationprofile/profile-editor").redirect);

        let legacy = resolve_path("/profile-wizard");
        assert_eq!(legacy.route, Route::Import);
        assert!(legacy.redirect);

        let unknown = resolve_path("/somewhere/else");
        assert_eq!(unknown.route, Route::Import);
        assert!(unknown.redirect);
        assert!(resolve_path("/").redirect);
    }

    #[test]
    fn test_decide() {
        let dashboard = "https://dash.example.com";
        assert_eq!(decide(None, dashboard), Destination::Page(Route::Import));

        let mut profile = Profile::default();
        assert_eq!(decide(Some(&profile), dashboard), Destination::Page(Route::Import));

        profile.personal_info.name = "Jane Doe".to_string();
        assert_eq!(decide(Some(&profile), dashboard), Destination::Page(Route::Editor));

        profile.is_basic_profile_completed = true;
        assert_eq!(
            decide(Some(&profile), dashboard),
            Destination::Dashboard(dashboard.to_string())
        );
    }
}
