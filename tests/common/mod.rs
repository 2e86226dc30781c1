//! In-process mock of the profile backend

#![allow(dead_code)]

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

use profile_wizard::core::{Cookie, ServiceClient, SessionStore};
use profile_wizard::session::{RecordingNavigator, Session, TOKEN_KEY, USER_ID_COOKIE};
use profile_wizard::ProfileService;

pub const HOST_APP_URL: &str = "http://localhost:5174/app1";
pub const TOKEN: &str = "token-123";

/// Canned answers of the mock backend
#[derive(Clone)]
pub struct MockConfig {
    pub profile: Option<Value>,
    pub basic_info: Value,
    pub experience: Value,
    pub skills: Value,
    pub achievements: Value,
    pub availability: Value,
    /// Empty summaries returned before the real one
    pub empty_summaries: usize,
    pub summary: String,
    pub summary_status: Option<u16>,
    /// Every request is answered with 401
    pub reject_all: bool,
    pub delay: Duration,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            profile: None,
            basic_info: json!({
                "name": "Jane Doe",
                "country": "MA",
                "email": "jane@example.com",
                "phone": "+212 600 000 000",
                "yearsOfExperience": "6",
                "currentRole": "Customer Success Lead"
            }),
            experience: json!({
                "roles": [
                    {
                        "title": "Customer Success Lead",
                        "company": "Acme",
                        "startDate": "2020-02",
                        "endDate": "present",
                        "responsibilities": ["Led a team of 8"],
                        "achievements": ["NPS +20"]
                    },
                    {
                        "title": "Support Agent",
                        "company": "Globex",
                        "startDate": "early days",
                        "endDate": "2020-01-31"
                    }
                ],
                "keyAreas": ["Customer retention"],
                "notableCompanies": ["Acme"],
                "technicalSkills": ["Zendesk"],
                "professionalSkills": ["Coaching"],
                "softSkills": ["Empathy"]
            }),
            skills: json!({
                "languages": [
                    {"language": "French", "iso639_1": "fr", "proficiency": "C2"},
                    {"language": "English", "iso639_1": "EN", "proficiency": "C1"},
                    {"language": "Klingon", "iso639_1": "tlh", "proficiency": "A1"}
                ]
            }),
            achievements: json!({"items": [{"description": "Cut churn by 15%"}]}),
            availability: json!({"schedule": [], "timeZone": "Africa/Casablanca", "flexibility": ["Remote"]}),
            empty_summaries: 0,
            summary: "Customer success lead with six years of experience.".to_string(),
            summary_status: None,
            reject_all: false,
            delay: Duration::ZERO,
        }
    }
}

pub struct MockState {
    config: MockConfig,
    hits: Mutex<HashMap<String, usize>>,
    created: Mutex<Vec<Value>>,
    updated: Mutex<Vec<Value>>,
}

impl MockState {
    fn hit(&self, key: &str) -> usize {
        let mut hits = self.hits.lock().unwrap();
        let count = hits.entry(key.to_string()).or_insert(0);
        *count += 1;
        *count
    }
}

pub struct MockBackend {
    pub base_url: String,
    state: Arc<MockState>,
}

impl MockBackend {
    pub async fn start(config: MockConfig) -> Self {
        let state = Arc::new(MockState {
            config,
            hits: Mutex::new(HashMap::new()),
            created: Mutex::new(Vec::new()),
            updated: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/auth/generate-token", post(generate_token))
            .route("/profiles", post(create_profile).delete(delete_profile))
            .route("/profiles/:id", get(get_profile).put(update_profile))
            .route("/profiles/:id/exists", get(profile_exists))
            .route("/languages", get(all_languages))
            .route("/languages/:code", get(language_by_code))
            .route("/timezones", get(timezones))
            .route("/cv/extract-basic-info", post(extract_basic_info))
            .route("/cv/analyze-experience", post(analyze_experience))
            .route("/cv/analyze-skills", post(analyze_skills))
            .route("/cv/analyze-achievements", post(analyze_achievements))
            .route("/cv/analyze-availability", post(analyze_availability))
            .route("/cv/generate-summary", post(generate_summary))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    /// Requests seen for `"METHOD /path"`
    pub fn hits(&self, key: &str) -> usize {
        self.state.hits.lock().unwrap().get(key).copied().unwrap_or(0)
    }

    pub fn total_hits(&self) -> usize {
        self.state.hits.lock().unwrap().values().sum()
    }

    pub fn created(&self) -> Vec<Value> {
        self.state.created.lock().unwrap().clone()
    }

    pub fn updated(&self) -> Vec<Value> {
        self.state.updated.lock().unwrap().clone()
    }
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"message": "Invalid token"})),
    )
        .into_response()
}

async fn answer(state: &MockState, key: &str, body: Value) -> Response {
    state.hit(key);
    if state.config.reject_all {
        return unauthorized();
    }
    if !state.config.delay.is_zero() {
        tokio::time::sleep(state.config.delay).await;
    }
    Json(body).into_response()
}

async fn generate_token(State(state): State<Arc<MockState>>) -> Response {
    answer(&state, "POST /auth/generate-token", json!({"token": TOKEN})).await
}

async fn get_profile(State(state): State<Arc<MockState>>, Path(id): Path<String>) -> Response {
    let body = state.config.profile.clone().unwrap_or(Value::Null);
    answer(&state, &format!("GET /profiles/{}", id), body).await
}

async fn profile_exists(State(state): State<Arc<MockState>>, Path(id): Path<String>) -> Response {
    let exists = state.config.profile.is_some();
    answer(&state, &format!("GET /profiles/{}/exists", id), json!({"exists": exists})).await
}

/// The document as the backend stores it: dates become timestamps,
/// absent contact fields come back as null
fn stored(mut profile: Value, id: &str) -> Value {
    profile["_id"] = json!(id);
    profile["__v"] = json!(0);
    profile["createdAt"] = json!("2024-05-01T09:30:00.000Z");

    if let Some(roles) = profile["experience"].as_array_mut() {
        for role in roles {
            for key in ["startDate", "endDate"] {
                let stamped = role[key]
                    .as_str()
                    .filter(|d| d.len() == 10)
                    .map(|d| format!("{}T00:00:00.000Z", d));
                if let Some(stamped) = stamped {
                    role[key] = json!(stamped);
                }
            }
        }
    }
    for key in ["email", "phone"] {
        if profile["personalInfo"][key] == json!("") {
            profile["personalInfo"][key] = Value::Null;
        }
    }
    profile
}

async fn create_profile(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Response {
    if !state.config.reject_all {
        state.created.lock().unwrap().push(body.clone());
    }
    answer(&state, "POST /profiles", stored(body, "p-1")).await
}

async fn update_profile(
    State(state): State<Arc<MockState>>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    state.updated.lock().unwrap().push(body.clone());
    let body = stored(body, &id);
    answer(&state, &format!("PUT /profiles/{}", id), body).await
}

async fn delete_profile(State(state): State<Arc<MockState>>) -> Response {
    answer(&state, "DELETE /profiles", json!({"message": "Profile deleted"})).await
}

fn language(code: &str) -> Option<Value> {
    match code {
        "fr" => Some(json!({"_id": "lang-fr", "name": "French", "code": "fr", "nativeName": "Français"})),
        "en" => Some(json!({"_id": "lang-en", "name": "English", "code": "en", "nativeName": "English"})),
        _ => None,
    }
}

async fn all_languages(State(state): State<Arc<MockState>>) -> Response {
    let data: Vec<Value> = ["fr", "en"].iter().filter_map(|c| language(c)).collect();
    answer(&state, "GET /languages", json!({"data": data})).await
}

async fn language_by_code(State(state): State<Arc<MockState>>, Path(code): Path<String>) -> Response {
    let key = format!("GET /languages/{}", code);
    match language(&code) {
        Some(lang) => answer(&state, &key, json!({"data": lang})).await,
        None => {
            state.hit(&key);
            (
                StatusCode::NOT_FOUND,
                Json(json!({"message": "Language not found"})),
            )
                .into_response()
        }
    }
}

async fn timezones(State(state): State<Arc<MockState>>) -> Response {
    let data = json!([
        {"countryCode": "MA", "countryName": "Morocco", "timezone": "Africa/Casablanca"},
        {"countryCode": "FR", "countryName": "France", "timezone": "Europe/Paris"}
    ]);
    answer(&state, "GET /timezones", json!({"data": data})).await
}

async fn extract_basic_info(State(state): State<Arc<MockState>>) -> Response {
    let body = state.config.basic_info.clone();
    answer(&state, "POST /cv/extract-basic-info", body).await
}

async fn analyze_experience(State(state): State<Arc<MockState>>) -> Response {
    let body = state.config.experience.clone();
    answer(&state, "POST /cv/analyze-experience", body).await
}

async fn analyze_skills(State(state): State<Arc<MockState>>) -> Response {
    let body = state.config.skills.clone();
    answer(&state, "POST /cv/analyze-skills", body).await
}

async fn analyze_achievements(State(state): State<Arc<MockState>>) -> Response {
    let body = state.config.achievements.clone();
    answer(&state, "POST /cv/analyze-achievements", body).await
}

async fn analyze_availability(State(state): State<Arc<MockState>>) -> Response {
    let body = state.config.availability.clone();
    answer(&state, "POST /cv/analyze-availability", body).await
}

async fn generate_summary(State(state): State<Arc<MockState>>) -> Response {
    let key = "POST /cv/generate-summary";
    if let Some(status) = state.config.summary_status {
        state.hit(key);
        let status = StatusCode::from_u16(status).unwrap();
        return (status, Json(json!({"message": "summary unavailable"}))).into_response();
    }

    let previous = state.hits.lock().unwrap().get(key).copied().unwrap_or(0);
    let summary = if previous < state.config.empty_summaries {
        String::new()
    } else {
        state.config.summary.clone()
    };
    answer(&state, key, json!({"summary": summary})).await
}

/// Session, client and profile service wired against `base_url`
pub struct Wizard {
    pub dir: TempDir,
    pub navigator: Arc<RecordingNavigator>,
    pub session: Arc<Session>,
    pub client: Arc<ServiceClient>,
    pub profiles: Arc<ProfileService>,
}

impl Wizard {
    pub async fn open(base_url: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::open(&dir.path().join("session.db")).await.unwrap();
        let navigator = Arc::new(RecordingNavigator::new());
        let session = Arc::new(
            Session::open(
                store,
                navigator.clone(),
                HOST_APP_URL.to_string(),
                "localhost".to_string(),
                false,
            )
            .await
            .unwrap(),
        );
        let client = Arc::new(
            ServiceClient::new(
                base_url,
                Duration::from_secs(5),
                Duration::from_millis(500),
                session.clone(),
            )
            .unwrap(),
        );
        let profiles = Arc::new(ProfileService::new(client.clone()));

        Self {
            dir,
            navigator,
            session,
            client,
            profiles,
        }
    }

    /// Open a wizard whose session already holds credentials for `user_id`
    pub async fn signed_in(base_url: &str, user_id: &str) -> Self {
        let wizard = Self::open(base_url).await;
        wizard.session.store_credentials(user_id, TOKEN).await.unwrap();
        wizard
    }

    /// Only the host application's cookie, no token yet
    pub async fn with_user_cookie(base_url: &str, user_id: &str) -> Self {
        let wizard = Self::open(base_url).await;
        wizard
            .session
            .store()
            .cookie_set(&Cookie::new(USER_ID_COOKIE, user_id))
            .await
            .unwrap();
        wizard
    }

    pub async fn token(&self) -> Option<String> {
        self.session.store().storage_get(TOKEN_KEY).await.unwrap()
    }
}
