// src/core/database.rs
//! SQLite-backed session persistence: local storage entries and cookies

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::core::fs_ops::FsOps;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl SameSite {
    fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }

    fn parse(value: &str) -> Self {
        match value {
            "Strict" => SameSite::Strict,
            "None" => SameSite::None,
            _ => SameSite::Lax,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub path: String,
    /// Empty for host-only cookies
    pub domain: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub secure: bool,
    pub same_site: SameSite,
}

impl Cookie {
    pub fn new(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
            path: "/".to_string(),
            domain: String::new(),
            expires_at: None,
            secure: false,
            same_site: SameSite::Lax,
        }
    }

    pub fn expires_in_days(mut self, days: i64) -> Self {
        self.expires_at = Some(Utc::now() + Duration::days(days));
        self
    }

    pub fn with_domain(mut self, domain: &str) -> Self {
        self.domain = domain.to_string();
        self
    }

    pub fn with_path(mut self, path: &str) -> Self {
        self.path = path.to_string();
        self
    }

    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at.map_or(false, |at| at <= Utc::now())
    }
}

#[derive(sqlx::FromRow)]
struct CookieRow {
    name: String,
    value: String,
    path: String,
    domain: String,
    expires_at: Option<DateTime<Utc>>,
    secure: bool,
    same_site: String,
}

impl From<CookieRow> for Cookie {
    fn from(row: CookieRow) -> Self {
        Self {
            name: row.name,
            value: row.value,
            path: row.path,
            domain: row.domain,
            expires_at: row.expires_at,
            secure: row.secure,
            same_site: SameSite::parse(&row.same_site),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionStore {
    database_path: PathBuf,
    pool: SqlitePool,
}

impl SessionStore {
    /// Open (creating if needed) the session database and run migrations
    pub async fn open(database_path: &Path) -> Result<Self> {
        if let Some(parent) = database_path.parent() {
            if !parent.as_os_str().is_empty() {
                FsOps::ensure_dir_exists(parent).await?;
            }
        }

        let database_url = format!("sqlite:{}?mode=rwc", database_path.display());
        let pool = SqlitePool::connect(&database_url)
            .await
            .context("Failed to connect to SQLite database")?;

        let store = Self {
            database_path: database_path.to_path_buf(),
            pool,
        };
        store.migrate().await?;

        info!("Session store initialized: {}", database_url);
        Ok(store)
    }

    pub fn database_path(&self) -> &Path {
        &self.database_path
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS local_storage (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create local_storage table")?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS cookies (
                name TEXT NOT NULL,
                value TEXT NOT NULL,
                path TEXT NOT NULL DEFAULT '/',
                domain TEXT NOT NULL DEFAULT '',
                expires_at TEXT,
                secure BOOLEAN NOT NULL DEFAULT FALSE,
                same_site TEXT NOT NULL DEFAULT 'Lax',
                PRIMARY KEY (name, path, domain)
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create cookies table")?;

        Ok(())
    }

    // ===== Local storage =====

    pub async fn storage_get(&self, key: &str) -> Result<Option<String>> {
        let value: Option<String> =
            sqlx::query_scalar("SELECT value FROM local_storage WHERE key = ?")
                .bind(key)
                .fetch_optional(&self.pool)
                .await
                .with_context(|| format!("Failed to read local storage key {}", key))?;
        Ok(value)
    }

    pub async fn storage_set(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO local_storage (key, value) VALUES (?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to write local storage key {}", key))?;
        Ok(())
    }

    pub async fn storage_remove(&self, key: &str) -> Result<()> {
        sqlx::query("DELETE FROM local_storage WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to remove local storage key {}", key))?;
        Ok(())
    }

    pub async fn storage_clear(&self) -> Result<()> {
        let result = sqlx::query("DELETE FROM local_storage")
            .execute(&self.pool)
            .await
            .context("Failed to clear local storage")?;
        debug!("Cleared {} local storage entries", result.rows_affected());
        Ok(())
    }

    pub async fn storage_keys(&self) -> Result<Vec<String>> {
        let keys: Vec<String> = sqlx::query_scalar("SELECT key FROM local_storage ORDER BY key")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list local storage keys")?;
        Ok(keys)
    }

    // ===== Cookies =====

    /// First unexpired cookie with this name, whatever its path or domain
    pub async fn cookie_get(&self, name: &str) -> Result<Option<Cookie>> {
        let rows = sqlx::query_as::<_, CookieRow>(
            "SELECT name, value, path, domain, expires_at, secure, same_site
             FROM cookies WHERE name = ? ORDER BY path, domain",
        )
        .bind(name)
        .fetch_all(&self.pool)
        .await
        .with_context(|| format!("Failed to read cookie {}", name))?;

        Ok(rows
            .into_iter()
            .map(Cookie::from)
            .find(|cookie| !cookie.is_expired()))
    }

    pub async fn cookie_set(&self, cookie: &Cookie) -> Result<()> {
        sqlx::query(
            "INSERT INTO cookies (name, value, path, domain, expires_at, secure, same_site)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(name, path, domain) DO UPDATE SET
                value = excluded.value,
                expires_at = excluded.expires_at,
                secure = excluded.secure,
                same_site = excluded.same_site",
        )
        .bind(&cookie.name)
        .bind(&cookie.value)
        .bind(&cookie.path)
        .bind(&cookie.domain)
        .bind(cookie.expires_at)
        .bind(cookie.secure)
        .bind(cookie.same_site.as_str())
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to write cookie {}", cookie.name))?;
        Ok(())
    }

    /// Remove one cookie variant. Returns whether anything was deleted.
    pub async fn cookie_remove(&self, name: &str, path: &str, domain: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM cookies WHERE name = ? AND path = ? AND domain = ?")
            .bind(name)
            .bind(path)
            .bind(domain)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to remove cookie {}", name))?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn cookies(&self) -> Result<Vec<Cookie>> {
        let rows = sqlx::query_as::<_, CookieRow>(
            "SELECT name, value, path, domain, expires_at, secure, same_site
             FROM cookies ORDER BY name, path, domain",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list cookies")?;

        Ok(rows.into_iter().map(Cookie::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn open_store() -> (TempDir, SessionStore) {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::open(&dir.path().join("nested/session.db"))
            .await
            .unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn test_local_storage_roundtrip() {
        let (_dir, store) = open_store().await;

        assert_eq!(store.storage_get("token").await.unwrap(), None);
        store.storage_set("token", "abc").await.unwrap();
        store.storage_set("token", "def").await.unwrap();
        store.storage_set("theme", "dark").await.unwrap();

        assert_eq!(store.storage_get("token").await.unwrap().as_deref(), Some("def"));
        assert_eq!(store.storage_keys().await.unwrap(), vec!["theme", "token"]);

        store.storage_remove("theme").await.unwrap();
        assert_eq!(store.storage_keys().await.unwrap(), vec!["token"]);

        store.storage_clear().await.unwrap();
        assert!(store.storage_keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cookie_variants_are_distinct() {
        let (_dir, store) = open_store().await;

        store
            .cookie_set(&Cookie::new("userId", "u1").expires_in_days(7))
            .await
            .unwrap();
        store
            .cookie_set(&Cookie::new("userId", "u1").with_domain("localhost"))
            .await
            .unwrap();

        assert_eq!(store.cookies().await.unwrap().len(), 2);
        assert!(store.cookie_remove("userId", "/", "").await.unwrap());
        assert!(!store.cookie_remove("userId", "/", "").await.unwrap());

        let remaining = store.cookie_get("userId").await.unwrap().unwrap();
        assert_eq!(remaining.domain, "localhost");
    }

    #[tokio::test]
    async fn test_expired_cookie_is_ignored() {
        let (_dir, store) = open_store().await;

        store
            .cookie_set(&Cookie::new("userId", "old").expires_in_days(-1))
            .await
            .unwrap();

        assert!(store.cookie_get("userId").await.unwrap().is_none());
        // still listed so logout can remove it
        assert_eq!(store.cookies().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_cookie_attributes_persist() {
        let (_dir, store) = open_store().await;

        let cookie = Cookie::new("userId", "u9")
            .with_path("/repcreationprofile")
            .secure(true)
            .expires_in_days(7);
        store.cookie_set(&cookie).await.unwrap();

        let loaded = store.cookie_get("userId").await.unwrap().unwrap();
        assert_eq!(loaded.path, "/repcreationprofile");
        assert!(loaded.secure);
        assert_eq!(loaded.same_site, SameSite::Lax);
        assert!(loaded.expires_at.is_some());
    }
}
