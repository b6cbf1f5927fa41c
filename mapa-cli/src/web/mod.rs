//! Password-gated lookup page over the launch-map store

pub mod render;
pub mod session;

use std::io::ErrorKind;
use std::net::SocketAddr;

use anyhow::{Result, anyhow};
use axum::{
    Form, Router,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;

use crate::config::repository::records::{LoadedTable, load_records};
use crate::config::repository::{StoreUnavailableError, open_for_read};
use crate::config::{AccessConfig, ServerConfig, StoreConfig};
use crate::services::search::{SearchIndex, SearchQuery};
use render::{FormValues, SearchOutcome};
use session::{AccessGate, SessionStore, Verdict};

const WRONG_SECRET_MESSAGE: &str = "Senha incorreta. Tente novamente.";

#[derive(Clone)]
pub struct AppState {
    store: StoreConfig,
    gate: AccessGate,
    sessions: SessionStore,
}

impl AppState {
    pub fn new(store: StoreConfig, access: AccessConfig) -> Self {
        Self {
            store,
            gate: AccessGate::new(access.secrets),
            sessions: SessionStore::default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    codigo: Option<String>,
    solicitante: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    senha: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .with_state(state)
}

pub async fn run_server(store: StoreConfig, access: AccessConfig, server: ServerConfig) -> Result<()> {
    let state = AppState::new(store, access);
    if !state.gate.has_secrets() {
        log::warn!("No access secrets configured; nobody will be able to log in");
    }

    let bind = format!("{}:{}", server.host, server.port)
        .parse::<SocketAddr>()
        .map_err(|err| anyhow!("invalid bind address: {err}"))?;

    log::info!(
        "Serving lookup page at http://{} from {}",
        bind,
        state.store.database.display()
    );

    let listener = tokio::net::TcpListener::bind(bind).await.map_err(|error| {
        if error.kind() == ErrorKind::AddrInUse {
            anyhow!("failed to bind {bind}: address already in use. rerun with --port <free-port>")
        } else {
            anyhow!("failed to bind {bind}: {error}")
        }
    })?;
    axum::serve(listener, router(state)).await?;
    Ok(())
}

fn is_authenticated(state: &AppState, headers: &HeaderMap) -> bool {
    session::session_id(headers).is_some_and(|id| state.sessions.is_authenticated(id))
}

/// Full read of the store for one request
async fn load_table(store: &StoreConfig) -> Result<LoadedTable, StoreUnavailableError> {
    let pool = open_for_read(&store.database).await?;
    let loaded = load_records(&pool, &store.table).await;
    pool.close().await;

    loaded.map_err(|err| StoreUnavailableError {
        database: store.database.clone(),
        reason: format!("{err:#}"),
    })
}

async fn index(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<SearchParams>,
) -> Response {
    if !is_authenticated(&state, &headers) {
        return Html(render::login_page(None)).into_response();
    }

    let form = FormValues {
        code: params.codigo.as_deref().unwrap_or_default(),
        requester: params.solicitante.as_deref().unwrap_or_default(),
    };

    let loaded = match load_table(&state.store).await {
        Ok(loaded) => loaded,
        Err(err) => {
            log::error!("{}", err);
            let outcome = SearchOutcome::Unavailable(err.reason);
            return Html(render::search_page(form, &[], &outcome)).into_response();
        }
    };

    let index = SearchIndex::new(loaded.records);
    if index.is_empty() {
        log::warn!("Table '{}' has no records", state.store.table);
    }
    let query = SearchQuery::from_inputs(params.codigo.as_deref(), params.solicitante.as_deref());
    let result = index.search(&query);
    log::debug!("Query {:?} over {} records", query, index.len());

    let outcome = match result.matches {
        None => SearchOutcome::Prompt {
            counts: result.counts,
        },
        Some(records) => SearchOutcome::Results {
            counts: result.counts,
            records,
        },
    };

    Html(render::search_page(form, &loaded.warnings, &outcome)).into_response()
}

async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<LoginForm>,
) -> Response {
    match state.gate.verify(&form.senha) {
        Verdict::Empty => Html(render::login_page(None)).into_response(),
        Verdict::Rejected => {
            log::warn!("Rejected access attempt");
            (
                StatusCode::UNAUTHORIZED,
                Html(render::login_page(Some(WRONG_SECRET_MESSAGE))),
            )
                .into_response()
        }
        Verdict::Accepted => {
            if let Some(previous) = session::session_id(&headers) {
                state.sessions.end(previous);
            }
            let id = state.sessions.authenticate();
            log::info!("Session authenticated ({} active)", state.sessions.active());
            (
                [(header::SET_COOKIE, session::session_cookie(id))],
                Redirect::to("/"),
            )
                .into_response()
        }
    }
}

async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(id) = session::session_id(&headers) {
        state.sessions.end(id);
    }
    (
        [(header::SET_COOKIE, session::expired_cookie())],
        Redirect::to("/"),
    )
        .into_response()
}
