mod config;
mod errors;
mod facade;
mod feeds;
mod models;
mod server;
mod state;
mod sweep;

use crate::facade::PricingFacade;
use crate::models::black_scholes::BlackScholes;
use crate::state::{AppState, ModelKind, ParameterSet};

#[tokio::main]
async fn main() {
    // Structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("option_pricer starting");

    // Load config
    let cfg = match config::AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("config error: {e}");
            std::process::exit(1);
        }
    };

    let app_state = AppState::new(cfg.clone());

    // Startup rate: the feed only ever supplies the r scalar
    let mut risk_free_rate = cfg.default_params.risk_free_rate;
    match (&app_state.treasury, cfg.fetch_rate_on_startup) {
        (Some(client), true) => match client.fetch_ten_year_yield().await {
            Ok(quote) => risk_free_rate = quote.rate,
            Err(e) => tracing::warn!(
                error = %e,
                fallback = risk_free_rate,
                "treasury yield unavailable, using configured rate"
            ),
        },
        (None, true) => tracing::info!("ALPHA_VANTAGE_API_KEY not set, using configured rate"),
        _ => {}
    }

    log_startup_prices(&cfg, risk_free_rate);

    let port = cfg.server_port;
    let app = axum::Router::new()
        .route("/api/price", axum::routing::get(server::routes::get_price))
        .route("/api/sweep", axum::routing::get(server::routes::get_sweep))
        .route("/api/rate", axum::routing::get(server::routes::get_rate))
        .route("/api/defaults", axum::routing::get(server::routes::get_defaults))
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        .with_state(app_state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!("server listening on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("bind error: {e}");
            std::process::exit(1);
        });

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("server error: {e}");
    }
}

/// Price the configured defaults once with both models.
fn log_startup_prices(cfg: &config::AppConfig, risk_free_rate: f64) {
    let d = cfg.default_params;
    let params = ParameterSet::new(
        d.spot,
        d.strike,
        d.time_to_expiry,
        risk_free_rate,
        d.volatility,
    );
    let facade = PricingFacade::with_params(cfg.lattice_steps, params);

    if let Ok((d1, d2)) = BlackScholes::new().d1_d2(&params) {
        tracing::info!(d1, d2, "closed-form terms");
    }

    for kind in ModelKind::ALL {
        match facade.price(kind) {
            Ok(res) => tracing::info!(
                model = facade.model(kind).name(),
                steps = facade.steps(),
                spot = params.spot,
                strike = params.strike,
                t = params.time_to_expiry,
                r = params.risk_free_rate,
                v = params.volatility,
                call = res.call,
                put = res.put,
                "startup price"
            ),
            Err(e) => tracing::warn!(model = %kind, error = %e, "startup pricing failed"),
        }
    }
}
