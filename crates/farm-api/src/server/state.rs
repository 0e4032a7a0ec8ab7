#[derive(Clone)]
pub struct AppState {
    service: Arc<FarmService>,
    debug_routes: bool,
}

impl AppState {
    pub fn new(service: Arc<FarmService>, debug_routes: bool) -> Self {
        Self {
            service,
            debug_routes,
        }
    }
}

fn default_player_id() -> String {
    DEFAULT_PLAYER_ID.to_string()
}

/// Unwraps a JSON body, turning axum's rejection into the API error shape.
fn read_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, HttpApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(HttpApiError::from_rejection)
}

/// A plot plus the countdown the client shows on its tile.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PlotView {
    #[serde(flatten)]
    plot: Plot,
    #[serde(skip_serializing_if = "Option::is_none")]
    minutes_remaining: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OvenView {
    #[serde(flatten)]
    oven: Oven,
    #[serde(skip_serializing_if = "Option::is_none")]
    minutes_remaining: Option<i64>,
}

fn plot_views(farm: &Farm, service: &FarmService) -> Vec<PlotView> {
    let now = service.now();
    farm.plots()
        .map(|plot| PlotView {
            minutes_remaining: farm_core::plot::minutes_until_mature(plot, now, service.balance()),
            plot: plot.clone(),
        })
        .collect()
}

fn oven_views(farm: &Farm, service: &FarmService) -> Vec<OvenView> {
    let now = service.now();
    farm.ovens()
        .map(|oven| OvenView {
            minutes_remaining: farm_core::oven::minutes_until_ready(oven, now, service.balance()),
            oven: oven.clone(),
        })
        .collect()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ActionResponse {
    player: Player,
    #[serde(skip_serializing_if = "Option::is_none")]
    plots: Option<Vec<PlotView>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ovens: Option<Vec<OvenView>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    orders: Option<Vec<CustomerOrder>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    challenges: Option<Vec<SeasonalChallenge>>,
    #[serde(flatten)]
    report: ActionReport,
}

/// Which child collection a mutating route echoes back.
#[derive(Debug, Clone, Copy)]
enum Echo {
    Player,
    Plots,
    Ovens,
    Orders,
    Challenges,
}

impl ActionResponse {
    fn build(farm: &Farm, report: ActionReport, echo: Echo, service: &FarmService) -> Self {
        Self {
            player: farm.player.clone(),
            plots: matches!(echo, Echo::Plots).then(|| plot_views(farm, service)),
            ovens: matches!(echo, Echo::Ovens).then(|| oven_views(farm, service)),
            orders: matches!(echo, Echo::Orders).then(|| farm.orders().cloned().collect()),
            challenges: matches!(echo, Echo::Challenges)
                .then(|| farm.challenges().cloned().collect()),
            report,
        }
    }
}

fn respond(
    state: &AppState,
    action: &'static str,
    result: Result<Applied<ActionReport>, ServiceError>,
    echo: Echo,
) -> Result<Json<ActionResponse>, HttpApiError> {
    let applied = result.map_err(HttpApiError::from_service)?;
    tracing::info!(
        player_id = %applied.farm.id(),
        action,
        level_up = applied.outcome.level_up.is_some(),
        "action applied"
    );
    Ok(Json(ActionResponse::build(
        &applied.farm,
        applied.outcome,
        echo,
        &state.service,
    )))
}
