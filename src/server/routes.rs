use crate::errors::{EngineError, PricingError};
use crate::facade::PricingFacade;
use crate::feeds::treasury_api::RateQuote;
use crate::state::{AppState, ModelKind, ParameterSet, SweepAxis};
use crate::sweep::SweepPoint;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use std::sync::Arc;

/// Upper bound on per-request lattice depth (cost grows as N^2)
const MAX_STEPS: usize = 20_000;
const MAX_SWEEP_POINTS: usize = 10_000;
/// Node updates one request may spend on lattice pricing: steps^2 x evaluations
const MAX_LATTICE_WORK: u128 = 1_000_000_000;

// ── Requests ──

/// All five inputs are required: no partial updates.
#[derive(Debug, serde::Deserialize)]
pub struct PriceQuery {
    pub spot: f64,
    pub strike: f64,
    pub time_to_expiry: f64,
    pub risk_free_rate: f64,
    pub volatility: f64,
    pub model: Option<String>,
    pub steps: Option<usize>,
}

#[derive(Debug, serde::Deserialize)]
pub struct SweepQuery {
    pub spot: f64,
    pub strike: f64,
    pub time_to_expiry: f64,
    pub risk_free_rate: f64,
    pub volatility: f64,
    pub axis: SweepAxis,
    pub from: f64,
    pub to: f64,
    pub points: usize,
    pub model: Option<String>,
    pub steps: Option<usize>,
}

// ── Responses ──

#[derive(Debug, serde::Serialize)]
pub struct ModelPrice {
    pub model: ModelKind,
    pub name: &'static str,
    pub call: f64,
    pub put: f64,
}

#[derive(Debug, serde::Serialize)]
pub struct PriceResponse {
    pub params: ParameterSet,
    pub steps: usize,
    pub results: Vec<ModelPrice>,
}

#[derive(Debug, serde::Serialize)]
pub struct SweepResponse {
    pub model: ModelKind,
    pub axis: SweepAxis,
    pub steps: usize,
    pub series: Vec<SweepPoint>,
}

/// Handler failures, mapped to a status code plus `{"error": msg}`.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Pricing(PricingError),
    Upstream(String),
    Unavailable(&'static str),
    Internal(String),
}

impl From<PricingError> for ApiError {
    fn from(e: PricingError) -> Self {
        ApiError::Pricing(e)
    }
}

impl From<EngineError> for ApiError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::Pricing(p) => ApiError::Pricing(p),
            EngineError::Config(msg) => ApiError::BadRequest(msg),
            other => ApiError::Upstream(other.to_string()),
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Pricing(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::BadRequest(msg) | ApiError::Upstream(msg) | ApiError::Internal(msg) => msg,
            ApiError::Pricing(e) => e.to_string(),
            ApiError::Unavailable(msg) => msg.to_string(),
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

fn parse_model(raw: Option<&str>) -> Result<Option<ModelKind>, ApiError> {
    raw.map(|m| m.parse::<ModelKind>().map_err(ApiError::BadRequest))
        .transpose()
}

fn resolve_steps(state: &AppState, requested: Option<usize>) -> Result<usize, ApiError> {
    let steps = requested.unwrap_or(state.config.lattice_steps);
    if steps > MAX_STEPS {
        return Err(ApiError::BadRequest(format!("steps must be <= {MAX_STEPS}")));
    }
    Ok(steps)
}

/// Reject requests whose total lattice cost would pin a worker.
fn check_lattice_budget(
    kind: ModelKind,
    steps: usize,
    evaluations: usize,
) -> Result<(), ApiError> {
    if kind != ModelKind::Lattice {
        return Ok(());
    }
    let work = (steps as u128) * (steps as u128) * (evaluations as u128);
    if work > MAX_LATTICE_WORK {
        return Err(ApiError::BadRequest(format!(
            "lattice work steps^2 x points = {work} exceeds {MAX_LATTICE_WORK}"
        )));
    }
    Ok(())
}

fn join_error(e: tokio::task::JoinError) -> ApiError {
    tracing::error!(error = %e, "pricing task failed");
    ApiError::Internal(format!("pricing task failed: {e}"))
}

// ── Handlers ──

/// GET /api/price -- price one or both models (fresh facade per request)
pub async fn get_price(
    State(state): State<Arc<AppState>>,
    Query(q): Query<PriceQuery>,
) -> Result<Json<PriceResponse>, ApiError> {
    let kinds = match parse_model(q.model.as_deref())? {
        Some(kind) => vec![kind],
        None => ModelKind::ALL.to_vec(),
    };
    let steps = resolve_steps(&state, q.steps)?;
    for &kind in &kinds {
        check_lattice_budget(kind, steps, 1)?;
    }

    let mut facade = PricingFacade::new(steps);
    facade.update(q.spot, q.strike, q.time_to_expiry, q.risk_free_rate, q.volatility);

    // Lattice pricing is CPU-bound: keep it off the async workers
    let (params, results) = tokio::task::spawn_blocking(move || {
        let mut results = Vec::with_capacity(kinds.len());
        for kind in kinds {
            let res = facade.price(kind)?;
            results.push(ModelPrice {
                model: kind,
                name: facade.model(kind).name(),
                call: res.call,
                put: res.put,
            });
        }
        let params = *facade.params().ok_or(PricingError::ParametersNotSet)?;
        Ok::<_, PricingError>((params, results))
    })
    .await
    .map_err(join_error)??;

    Ok(Json(PriceResponse {
        params,
        steps,
        results,
    }))
}

/// GET /api/sweep -- one model over a range of one input (plot series)
pub async fn get_sweep(
    State(state): State<Arc<AppState>>,
    Query(q): Query<SweepQuery>,
) -> Result<Json<SweepResponse>, ApiError> {
    let kind = parse_model(q.model.as_deref())?.unwrap_or(ModelKind::Analytic);
    let steps = resolve_steps(&state, q.steps)?;
    if q.points > MAX_SWEEP_POINTS {
        return Err(ApiError::BadRequest(format!(
            "points must be <= {MAX_SWEEP_POINTS}"
        )));
    }
    check_lattice_budget(kind, steps, q.points)?;

    let facade = PricingFacade::with_params(
        steps,
        ParameterSet::new(q.spot, q.strike, q.time_to_expiry, q.risk_free_rate, q.volatility),
    );
    let (axis, from, to, points) = (q.axis, q.from, q.to, q.points);
    let series = tokio::task::spawn_blocking(move || facade.sweep(kind, axis, from, to, points))
        .await
        .map_err(join_error)??;

    Ok(Json(SweepResponse {
        model: kind,
        axis,
        steps,
        series,
    }))
}

/// GET /api/rate -- latest 10-year treasury yield (one-shot upstream call)
pub async fn get_rate(
    State(state): State<Arc<AppState>>,
) -> Result<Json<RateQuote>, ApiError> {
    let client = state
        .treasury
        .as_ref()
        .ok_or(ApiError::Unavailable("ALPHA_VANTAGE_API_KEY not configured"))?;
    let quote = client.fetch_ten_year_yield().await.map_err(|e| {
        tracing::warn!(error = %e, "treasury yield fetch failed");
        ApiError::from(e)
    })?;
    Ok(Json(quote))
}

/// GET /api/defaults -- configured starting inputs
pub async fn get_defaults(
    State(state): State<Arc<AppState>>,
) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "params": state.config.default_params,
        "steps": state.config.lattice_steps,
    }))
}
