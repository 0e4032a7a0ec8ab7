#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayerRequest {
    #[serde(default = "default_player_id")]
    player_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlotRequest {
    #[serde(default = "default_player_id")]
    player_id: String,
    row: u32,
    col: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlantRequest {
    #[serde(default = "default_player_id")]
    player_id: String,
    row: u32,
    col: u32,
    #[serde(default = "default_crop")]
    crop_type: CropType,
}

fn default_crop() -> CropType {
    CropType::Pumpkin
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BakeRequest {
    #[serde(default = "default_player_id")]
    player_id: String,
    slot_number: u32,
    #[serde(default = "default_pie")]
    pie_type: PieType,
}

fn default_pie() -> PieType {
    PieType::Pumpkin
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OvenRequest {
    #[serde(default = "default_player_id")]
    player_id: String,
    slot_number: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TradeRequest {
    #[serde(default = "default_player_id")]
    player_id: String,
    item: Resource,
    quantity: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FulfillOrderRequest {
    #[serde(default = "default_player_id")]
    player_id: String,
    order_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChallengeProgressRequest {
    #[serde(default = "default_player_id")]
    player_id: String,
    challenge_id: String,
    progress: u32,
}

async fn plant(
    State(state): State<AppState>,
    payload: Result<Json<PlantRequest>, JsonRejection>,
) -> Result<Json<ActionResponse>, HttpApiError> {
    let request = read_body(payload)?;
    let result = state
        .service
        .plant(&request.player_id, request.row, request.col, request.crop_type)
        .await;
    respond(&state, "plant", result, Echo::Plots)
}

async fn harvest(
    State(state): State<AppState>,
    payload: Result<Json<PlotRequest>, JsonRejection>,
) -> Result<Json<ActionResponse>, HttpApiError> {
    let request = read_body(payload)?;
    let result = state
        .service
        .harvest(&request.player_id, request.row, request.col)
        .await;
    respond(&state, "harvest", result, Echo::Plots)
}

async fn fertilize(
    State(state): State<AppState>,
    payload: Result<Json<PlotRequest>, JsonRejection>,
) -> Result<Json<ActionResponse>, HttpApiError> {
    let request = read_body(payload)?;
    let result = state
        .service
        .fertilize(&request.player_id, request.row, request.col)
        .await;
    respond(&state, "fertilize", result, Echo::Plots)
}

async fn bake(
    State(state): State<AppState>,
    payload: Result<Json<BakeRequest>, JsonRejection>,
) -> Result<Json<ActionResponse>, HttpApiError> {
    let request = read_body(payload)?;
    let result = state
        .service
        .start_baking(&request.player_id, request.slot_number, request.pie_type)
        .await;
    respond(&state, "bake", result, Echo::Ovens)
}

async fn collect_pie(
    State(state): State<AppState>,
    payload: Result<Json<OvenRequest>, JsonRejection>,
) -> Result<Json<ActionResponse>, HttpApiError> {
    let request = read_body(payload)?;
    let result = state
        .service
        .collect_pie(&request.player_id, request.slot_number)
        .await;
    respond(&state, "collect-pie", result, Echo::Ovens)
}

async fn buy(
    State(state): State<AppState>,
    payload: Result<Json<TradeRequest>, JsonRejection>,
) -> Result<Json<ActionResponse>, HttpApiError> {
    let request = read_body(payload)?;
    let result = state
        .service
        .buy(&request.player_id, request.item, request.quantity)
        .await;
    respond(&state, "buy", result, Echo::Player)
}

async fn sell(
    State(state): State<AppState>,
    payload: Result<Json<TradeRequest>, JsonRejection>,
) -> Result<Json<ActionResponse>, HttpApiError> {
    let request = read_body(payload)?;
    let result = state
        .service
        .sell(&request.player_id, request.item, request.quantity)
        .await;
    respond(&state, "sell", result, Echo::Player)
}

async fn expand_field(
    State(state): State<AppState>,
    payload: Result<Json<PlayerRequest>, JsonRejection>,
) -> Result<Json<ActionResponse>, HttpApiError> {
    let request = read_body(payload)?;
    let result = state.service.expand_field(&request.player_id).await;
    respond(&state, "expand", result, Echo::Plots)
}

async fn expand_kitchen(
    State(state): State<AppState>,
    payload: Result<Json<PlayerRequest>, JsonRejection>,
) -> Result<Json<ActionResponse>, HttpApiError> {
    let request = read_body(payload)?;
    let result = state.service.expand_kitchen(&request.player_id).await;
    respond(&state, "expand-kitchen", result, Echo::Ovens)
}

async fn collect_daily_coins(
    State(state): State<AppState>,
    payload: Result<Json<PlayerRequest>, JsonRejection>,
) -> Result<Json<ActionResponse>, HttpApiError> {
    let request = read_body(payload)?;
    let result = state.service.collect_daily_coins(&request.player_id).await;
    respond(&state, "collect-daily-coins", result, Echo::Player)
}

async fn fulfill_order(
    State(state): State<AppState>,
    payload: Result<Json<FulfillOrderRequest>, JsonRejection>,
) -> Result<Json<ActionResponse>, HttpApiError> {
    let request = read_body(payload)?;
    let result = state
        .service
        .fulfill_order(&request.player_id, &request.order_id)
        .await;
    respond(&state, "fulfill-order", result, Echo::Orders)
}

async fn generate_orders(
    State(state): State<AppState>,
    payload: Result<Json<PlayerRequest>, JsonRejection>,
) -> Result<Json<ActionResponse>, HttpApiError> {
    let request = read_body(payload)?;
    let result = state
        .service
        .generate_orders(&request.player_id)
        .await
        .map(|applied| Applied {
            outcome: ActionReport {
                message: format!("{} new customer orders", applied.outcome),
                ..ActionReport::default()
            },
            farm: applied.farm,
        });
    respond(&state, "orders-generate", result, Echo::Orders)
}

async fn challenge_progress(
    State(state): State<AppState>,
    payload: Result<Json<ChallengeProgressRequest>, JsonRejection>,
) -> Result<Json<ActionResponse>, HttpApiError> {
    let request = read_body(payload)?;
    let result = state
        .service
        .update_challenge_progress(&request.player_id, &request.challenge_id, request.progress)
        .await;
    respond(&state, "challenge-progress", result, Echo::Challenges)
}

async fn generate_challenges(
    State(state): State<AppState>,
    payload: Result<Json<PlayerRequest>, JsonRejection>,
) -> Result<Json<ActionResponse>, HttpApiError> {
    let request = read_body(payload)?;
    let result = state
        .service
        .generate_challenges(&request.player_id)
        .await
        .map(|applied| Applied {
            outcome: ActionReport {
                message: format!("{} new seasonal challenges", applied.outcome),
                ..ActionReport::default()
            },
            farm: applied.farm,
        });
    respond(&state, "challenges-generate", result, Echo::Challenges)
}

async fn unlock_level(
    State(state): State<AppState>,
    payload: Result<Json<PlayerRequest>, JsonRejection>,
) -> Result<Json<ActionResponse>, HttpApiError> {
    let request = read_body(payload)?;
    let result = state.service.unlock_next_level(&request.player_id).await;
    respond(&state, "unlock-level", result, Echo::Player)
}

async fn reset_daily_coins(
    State(state): State<AppState>,
    Path(player_id): Path<String>,
) -> Result<Json<ActionResponse>, HttpApiError> {
    let result = state.service.reset_daily_timer(&player_id).await;
    respond(&state, "debug-reset-daily-coins", result, Echo::Player)
}
