use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Request, State};
use axum::http::header::{self, HeaderValue};
use axum::http::Method;
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use contracts::{
    ApiError, CropType, CustomerOrder, DailyStatus, ErrorCode, Oven, PieType, Player, Plot,
    Resource, SeasonalChallenge, SCHEMA_VERSION_V1,
};
use farm_core::{ActionReport, ErrorKind, Farm};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

use crate::config::DEFAULT_PLAYER_ID;
use crate::service::{Applied, FarmService, ServiceError};

include!("error.rs");
include!("state.rs");
include!("routes/query.rs");
include!("routes/actions.rs");
include!("util.rs");

pub async fn serve(
    addr: SocketAddr,
    service: Arc<FarmService>,
    debug_routes: bool,
) -> Result<(), ServerError> {
    let app = router(AppState::new(service, debug_routes));

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, debug_routes, "pumpkin patch api listening");
    axum::serve(listener, app).await?;

    Ok(())
}

pub fn router(state: AppState) -> Router {
    let mut api = Router::new()
        .route("/api/health", get(get_health))
        .route("/api/players", post(create_player))
        .route("/api/player/{player_id}", get(get_player))
        .route("/api/player/{player_id}/plots", get(get_plots))
        .route("/api/player/{player_id}/ovens", get(get_ovens))
        .route("/api/player/{player_id}/orders", get(get_orders))
        .route("/api/player/{player_id}/challenges", get(get_challenges))
        .route("/api/plant", post(plant))
        .route("/api/harvest", post(harvest))
        .route("/api/fertilize", post(fertilize))
        .route("/api/bake", post(bake))
        .route("/api/collect-pie", post(collect_pie))
        .route("/api/buy", post(buy))
        .route("/api/sell", post(sell))
        .route("/api/expand", post(expand_field))
        .route("/api/expand-kitchen", post(expand_kitchen))
        .route("/api/collect-daily-coins", post(collect_daily_coins))
        .route("/api/fulfill-order", post(fulfill_order))
        .route("/api/orders/generate", post(generate_orders))
        .route("/api/challenge/progress", post(challenge_progress))
        .route("/api/challenges/generate", post(generate_challenges))
        .route("/api/unlock-level", post(unlock_level));

    if state.debug_routes {
        api = api.route(
            "/api/debug/reset-daily-coins/{player_id}",
            post(reset_daily_coins),
        );
    }

    api.layer(middleware::from_fn(cors_middleware))
        .with_state(state)
}

async fn cors_middleware(request: Request, next: Next) -> Response {
    if request.method() == Method::OPTIONS {
        let mut response = Response::new(axum::body::Body::empty());
        *response.status_mut() = StatusCode::NO_CONTENT;
        apply_cors_headers(response.headers_mut());
        return response;
    }

    let mut response = next.run(request).await;
    apply_cors_headers(response.headers_mut());
    response
}
