#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    status: &'static str,
    schema_version: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PlayerResponse {
    #[serde(flatten)]
    player: Player,
    daily: DailyStatus,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreatedPlayerResponse {
    player: Player,
    plots: Vec<PlotView>,
    ovens: Vec<OvenView>,
    message: String,
}

async fn get_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        schema_version: SCHEMA_VERSION_V1,
    })
}

async fn get_player(
    State(state): State<AppState>,
    Path(player_id): Path<String>,
) -> Result<Json<PlayerResponse>, HttpApiError> {
    let farm = state
        .service
        .view(&player_id)
        .await
        .map_err(HttpApiError::from_service)?;
    let daily = farm.daily_status(state.service.now(), state.service.balance());

    Ok(Json(PlayerResponse {
        player: farm.player,
        daily,
    }))
}

async fn get_plots(
    State(state): State<AppState>,
    Path(player_id): Path<String>,
) -> Result<Json<Vec<PlotView>>, HttpApiError> {
    let farm = state
        .service
        .view(&player_id)
        .await
        .map_err(HttpApiError::from_service)?;
    Ok(Json(plot_views(&farm, &state.service)))
}

async fn get_ovens(
    State(state): State<AppState>,
    Path(player_id): Path<String>,
) -> Result<Json<Vec<OvenView>>, HttpApiError> {
    let farm = state
        .service
        .view(&player_id)
        .await
        .map_err(HttpApiError::from_service)?;
    Ok(Json(oven_views(&farm, &state.service)))
}

/// Expires stale orders and tops pending ones back up before listing.
async fn get_orders(
    State(state): State<AppState>,
    Path(player_id): Path<String>,
) -> Result<Json<Vec<CustomerOrder>>, HttpApiError> {
    let applied = state
        .service
        .generate_orders(&player_id)
        .await
        .map_err(HttpApiError::from_service)?;
    Ok(Json(applied.farm.orders().cloned().collect()))
}

async fn get_challenges(
    State(state): State<AppState>,
    Path(player_id): Path<String>,
) -> Result<Json<Vec<SeasonalChallenge>>, HttpApiError> {
    let farm = state
        .service
        .view(&player_id)
        .await
        .map_err(HttpApiError::from_service)?;
    Ok(Json(farm.challenges().cloned().collect()))
}

async fn create_player(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<CreatedPlayerResponse>), HttpApiError> {
    let farm = state
        .service
        .create_player()
        .await
        .map_err(HttpApiError::from_service)?;
    tracing::info!(player_id = %farm.id(), "player created via api");

    Ok((
        StatusCode::CREATED,
        Json(CreatedPlayerResponse {
            message: "Welcome to your pumpkin patch!".to_string(),
            plots: plot_views(&farm, &state.service),
            ovens: oven_views(&farm, &state.service),
            player: farm.player,
        }),
    ))
}
