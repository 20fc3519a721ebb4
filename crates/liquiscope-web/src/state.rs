//! Shared server state: the pipeline, the startup catalog and per-session
//! themes.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use axum::response::Response;
use liquiscope_core::{Dashboard, RecordSource, SymbolOption, ThemeMode};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Most sessions kept at once. The least recently toggled is dropped first.
pub const DEFAULT_SESSION_CAPACITY: usize = 10_000;

/// Name of the cookie carrying the session id.
pub const SESSION_COOKIE: &str = "liquiscope_session";

/// The pipeline as shared across handlers.
pub type SharedDashboard = Arc<Dashboard<Arc<dyn RecordSource>>>;

/// State handed to every handler.
pub struct AppState {
    pub dashboard: SharedDashboard,
    pub catalog: Vec<SymbolOption>,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(dashboard: SharedDashboard, catalog: Vec<SymbolOption>) -> Self {
        Self {
            dashboard,
            catalog,
            sessions: SessionStore::default(),
        }
    }

    /// Read the symbol catalog once and build the state around it.
    ///
    /// An unreadable cache leaves the catalog empty; the server still starts
    /// and each dashboard request reports the cache error on its own.
    pub async fn load(dashboard: SharedDashboard) -> Arc<Self> {
        let reader = Arc::clone(&dashboard);
        let catalog = match tokio::task::spawn_blocking(move || reader.symbol_options()).await {
            Ok(Ok(catalog)) => {
                info!(symbols = catalog.len(), "symbol catalog loaded");
                catalog
            }
            Ok(Err(error)) => {
                warn!(%error, "cache unavailable at startup, serving an empty catalog");
                Vec::new()
            }
            Err(error) => {
                warn!(%error, "catalog task failed, serving an empty catalog");
                Vec::new()
            }
        };
        Arc::new(Self::new(dashboard, catalog))
    }
}

/// Theme per browser session. Unknown sessions start dark.
///
/// Only sessions away from the default theme are stored, and at most
/// `capacity` of them. An evicted session falls back to dark.
#[derive(Debug)]
pub struct SessionStore {
    capacity: usize,
    inner: RwLock<SessionThemes>,
}

#[derive(Debug, Default)]
struct SessionThemes {
    themes: HashMap<String, ThemeMode>,
    // Oldest toggle at the front.
    order: VecDeque<String>,
}

impl SessionThemes {
    fn forget(&mut self, session_id: &str) {
        if self.themes.remove(session_id).is_some() {
            self.order.retain(|id| id != session_id);
        }
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_SESSION_CAPACITY)
    }
}

impl SessionStore {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            inner: RwLock::new(SessionThemes::default()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub async fn theme(&self, session_id: &str) -> ThemeMode {
        self.inner
            .read()
            .await
            .themes
            .get(session_id)
            .copied()
            .unwrap_or_default()
    }

    /// Flip the session's theme and return the new value.
    pub async fn toggle(&self, session_id: &str) -> ThemeMode {
        let mut inner = self.inner.write().await;
        let theme = inner
            .themes
            .get(session_id)
            .copied()
            .unwrap_or_default()
            .toggle();

        inner.forget(session_id);
        if theme != ThemeMode::default() {
            inner.themes.insert(session_id.to_owned(), theme);
            inner.order.push_back(session_id.to_owned());
            while inner.themes.len() > self.capacity {
                let Some(oldest) = inner.order.pop_front() else {
                    break;
                };
                inner.themes.remove(&oldest);
                debug!(capacity = self.capacity, "evicted oldest session theme");
            }
        }
        theme
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.themes.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.themes.is_empty()
    }
}

/// Session id resolved from the request cookie, or freshly issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    id: String,
    issued: bool,
}

impl Session {
    /// Use the session cookie if it holds a valid id, otherwise start a new
    /// session.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        match session_cookie(headers) {
            Some(id) => Self { id, issued: false },
            None => Self {
                id: Uuid::new_v4().to_string(),
                issued: true,
            },
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// True when this request started the session.
    pub const fn is_new(&self) -> bool {
        self.issued
    }

    /// Add `Set-Cookie` to the response for a newly issued session.
    pub fn attach(&self, mut response: Response) -> Response {
        if self.issued {
            let cookie = format!("{SESSION_COOKIE}={}; HttpOnly; SameSite=Lax; Path=/", self.id);
            if let Ok(value) = HeaderValue::from_str(&cookie) {
                response.headers_mut().append(SET_COOKIE, value);
            }
        }
        response
    }
}

fn session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
        .map(|id| id.to_string())
}
