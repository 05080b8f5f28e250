use crate::cache::TimedCache;
use crate::config::BriefingConfig;
use crate::error::{BriefingError, Result};
use crate::export::load_raw_reports;
use crate::llm::{DataAssistant, NarrativeClient};
use crate::normalizer::{normalize_with, ZeroGuard};
use crate::renderer::render;
use crate::resolver::{available_dates, resolve, sort_by_report_date};
use crate::schema::{FlatRecord, RawReport};
use crate::series::ChartData;
use crate::source::SupabaseSource;
use axum::{
    extract::{Query, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{Duration, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Where fresh balance sheets come from when the cache is cold.
#[derive(Clone)]
pub enum DataSource {
    Supabase(SupabaseSource),
    Snapshot(PathBuf),
}

impl DataSource {
    async fn fetch(&self) -> Result<Vec<RawReport>> {
        match self {
            Self::Supabase(source) => source.fetch_balance_sheets().await,
            Self::Snapshot(path) => load_raw_reports(path),
        }
    }
}

pub struct AppState {
    cache: RwLock<TimedCache<Arc<Vec<FlatRecord>>>>,
    source: Option<DataSource>,
    narrative: Option<NarrativeClient>,
    assistant: Option<DataAssistant>,
    guard: ZeroGuard,
}

impl AppState {
    pub fn new(source: Option<DataSource>, narrative: Option<NarrativeClient>, ttl: Duration) -> Self {
        let assistant = match (&source, &narrative) {
            (Some(DataSource::Supabase(supabase)), Some(client)) => {
                Some(DataAssistant::new(client.clone(), supabase.clone()))
            }
            _ => None,
        };

        Self {
            cache: RwLock::new(TimedCache::new(ttl)),
            source,
            narrative,
            assistant,
            guard: ZeroGuard::default(),
        }
    }

    pub fn from_config(config: &BriefingConfig, snapshot: Option<PathBuf>) -> Result<Self> {
        let source = match (snapshot, &config.supabase) {
            (Some(path), _) => Some(DataSource::Snapshot(path)),
            (None, Some(settings)) => Some(DataSource::Supabase(SupabaseSource::new(settings)?)),
            (None, None) => None,
        };
        let narrative = config.llm.as_ref().map(NarrativeClient::new).transpose()?;

        if source.is_none() {
            warn!("No balance sheet source configured; the API will serve an empty state");
        }
        if narrative.is_none() {
            warn!("OPENAI_API_KEY not set; narrative analysis is disabled");
        }

        Ok(Self::new(source, narrative, Duration::hours(config.cache_ttl_hours)))
    }

    pub fn with_zero_guard(mut self, guard: ZeroGuard) -> Self {
        self.guard = guard;
        self
    }

    /// Pre-populates the cache, stamped with the current time.
    pub async fn seed(&self, records: Vec<FlatRecord>) {
        self.cache.write().await.store(Arc::new(records), Utc::now());
    }

    /// Cached records when fresh, otherwise a fresh fetch. Fetch and normalization
    /// failures degrade to an empty list that is not cached, so the next request retries.
    /// A sort failure keeps the records in fetch order.
    pub async fn balance_sheets(&self) -> Arc<Vec<FlatRecord>> {
        if let Some(records) = self.cache.read().await.get(Utc::now()) {
            info!("Using cached balance sheets data");
            return records.clone();
        }

        info!("Fetching fresh balance sheets data");
        let raw = match &self.source {
            Some(source) => source.fetch().await,
            None => Ok(Vec::new()),
        };

        let mut records = match raw.and_then(|raw| normalize_with(&raw, &self.guard)) {
            Ok(records) => records,
            Err(e) => {
                warn!("Error loading balance sheets: {}", e);
                return Arc::new(Vec::new());
            }
        };
        if let Err(e) = sort_by_report_date(&mut records) {
            warn!("Error sorting balance sheets: {}", e);
        }

        let records = Arc::new(records);
        self.cache.write().await.store(records.clone(), Utc::now());
        records
    }
}

pub enum AppError {
    BadRequest(String),
    Unavailable(String),
    Briefing(BriefingError),
}

impl From<BriefingError> for AppError {
    fn from(e: BriefingError) -> Self {
        Self::Briefing(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            AppError::Unavailable(message) => (StatusCode::SERVICE_UNAVAILABLE, message),
            AppError::Briefing(e) => {
                let status = match &e {
                    BriefingError::ParseError { .. } => StatusCode::BAD_REQUEST,
                    BriefingError::EmptyInput => StatusCode::NOT_FOUND,
                    BriefingError::FetchFailed(_)
                    | BriefingError::NarrativeFailed(_)
                    | BriefingError::HttpError(_) => StatusCode::BAD_GATEWAY,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, e.to_string())
            }
        };

        (status, Json(json!({ "error": error_message }))).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub target_date: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReportResponse {
    pub target_date: String,
    pub date: String,
    pub markdown: String,
    pub record: FlatRecord,
}

#[derive(Debug, Deserialize)]
pub struct ChartQuery {
    pub selected: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AnalysisRequest {
    pub target_date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: Option<String>,
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/api/balance_sheets", get(balance_sheets))
        .route("/api/dates", get(dates))
        .route("/api/report", get(report))
        .route("/api/chart_data", get(chart_data))
        .route("/api/analysis", post(analysis))
        .route("/api/ask", post(ask))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

pub async fn serve(state: Arc<AppState>, bind_address: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind_address).await?;
    info!("Balance sheet briefing listening on {}", bind_address);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn balance_sheets(State(state): State<Arc<AppState>>) -> Json<Vec<FlatRecord>> {
    Json(state.balance_sheets().await.as_ref().clone())
}

async fn dates(State(state): State<Arc<AppState>>) -> Json<Vec<String>> {
    Json(available_dates(&state.balance_sheets().await))
}

async fn report(
    Query(query): Query<ReportQuery>,
    State(state): State<Arc<AppState>>,
) -> std::result::Result<Json<ReportResponse>, AppError> {
    let target_date = required(query.target_date, "No target date provided")?;
    let records = state.balance_sheets().await;
    let record = resolve(&records, &target_date)?;

    Ok(Json(ReportResponse {
        date: record.date.clone(),
        markdown: render(record),
        record: record.clone(),
        target_date,
    }))
}

async fn chart_data(
    Query(query): Query<ChartQuery>,
    State(state): State<Arc<AppState>>,
) -> Json<ChartData> {
    let records = state.balance_sheets().await;
    Json(ChartData::from_records(&records, query.selected.as_deref()))
}

async fn analysis(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AnalysisRequest>,
) -> std::result::Result<Json<serde_json::Value>, AppError> {
    let target_date = required(request.target_date, "No target date provided")?;
    let client = state
        .narrative
        .as_ref()
        .ok_or_else(|| AppError::Unavailable("Narrative analysis is not configured".to_string()))?;

    let records = state.balance_sheets().await;
    let record = resolve(&records, &target_date)?;
    let summary = client.analyze(record, &target_date).await?;

    Ok(Json(json!({ "summary": summary })))
}

async fn ask(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AskRequest>,
) -> std::result::Result<Json<serde_json::Value>, AppError> {
    let question = required(request.question, "No question provided")?;
    let assistant = state
        .assistant
        .as_ref()
        .ok_or_else(|| AppError::Unavailable("Data assistant is not configured".to_string()))?;

    let answer = assistant.ask(&question).await?;
    Ok(Json(json!({ "answer": answer })))
}

fn required(value: Option<String>, message: &str) -> std::result::Result<String, AppError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest(message.to_string()))
}
