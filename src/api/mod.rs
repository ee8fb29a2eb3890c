use axum::{
    Router,
    extract::Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::analysis::{AnalysisOptions, AnalysisReport, Department, Stage, analyze};
use crate::core::{
    BusinessType, CostInputs, DEFAULT_MONTHS, MarketplaceInputs, ScenarioComparison,
    SimulationError, SimulationRequest, SimulationResult, SubscriptionInputs, UnitEconomicsInputs,
    run_scenarios, run_simulation, validate_request,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliBusinessType {
    Saas,
    Manufacturing,
    B2cPlatform,
    Hybrid,
}

impl From<CliBusinessType> for BusinessType {
    fn from(value: CliBusinessType) -> Self {
        match value {
            CliBusinessType::Saas => BusinessType::Subscription,
            CliBusinessType::Manufacturing => BusinessType::UnitEconomics,
            CliBusinessType::B2cPlatform => BusinessType::Marketplace,
            CliBusinessType::Hybrid => BusinessType::Hybrid,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliStage {
    Startup,
    Growth,
    Mature,
}

impl From<CliStage> for Stage {
    fn from(value: CliStage) -> Self {
        match value {
            CliStage::Startup => Stage::Startup,
            CliStage::Growth => Stage::Growth,
            CliStage::Mature => Stage::Mature,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
enum ResponseMode {
    Simulate,
    Analyze,
    Scenarios,
}

/// Request body shared by every endpoint and by `--input` files.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SimulatePayload {
    business_type: Option<BusinessType>,
    start_month: Option<String>,
    months: Option<u32>,
    cost_inputs: Option<CostInputs>,
    #[serde(alias = "saasInputs")]
    subscription: Option<SubscriptionInputs>,
    #[serde(alias = "manufacturingInputs")]
    unit_economics: Option<UnitEconomicsInputs>,
    #[serde(alias = "b2cPlatformInputs")]
    marketplace: Option<MarketplaceInputs>,

    stage: Option<Stage>,
    fixed_costs: Option<f64>,
    variable_cost_ratio: Option<f64>,
    fixed_marketing_ratio: Option<f64>,
    fixed_cost_share: Option<f64>,
    departments: Option<Vec<Department>>,
}

#[derive(Parser, Debug)]
#[command(
    name = "runway",
    about = "Monthly revenue, cost and profit projections for subscription, unit-economics, marketplace and hybrid startups"
)]
pub struct Cli {
    #[arg(long, help = "JSON request body, same shape as POST /api/simulate")]
    input: Option<PathBuf>,
    #[arg(long, value_enum)]
    business_type: Option<CliBusinessType>,
    #[arg(long, help = "First simulated month, YYYY-MM")]
    start_month: Option<String>,
    #[arg(long)]
    months: Option<u32>,
    #[arg(long, value_enum, help = "Benchmark stage used with --analyze")]
    stage: Option<CliStage>,
    #[arg(long, conflicts_with = "scenarios")]
    analyze: bool,
    #[arg(long)]
    scenarios: bool,
    #[arg(long, default_value_t = false)]
    pretty: bool,
}

#[derive(Debug)]
struct ApiRequest {
    request: SimulationRequest,
    options: AnalysisOptions,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SimulateResponse {
    mode: ResponseMode,
    business_type: BusinessType,
    start_month: String,
    months: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<SimulationResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    analysis: Option<AnalysisReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    scenarios: Option<ScenarioComparison>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn api_request_from_payload(payload: SimulatePayload) -> Result<ApiRequest, String> {
    let business_type = payload
        .business_type
        .ok_or("businessType is required (saas, manufacturing, b2c-platform or hybrid)")?;
    let start_month = payload.start_month.ok_or("startMonth is required (YYYY-MM)")?;
    let request = SimulationRequest {
        business_type,
        cost_inputs: payload.cost_inputs.unwrap_or_default(),
        start_month,
        months: payload.months.unwrap_or(DEFAULT_MONTHS),
        subscription: payload.subscription,
        unit_economics: payload.unit_economics,
        marketplace: payload.marketplace,
    };
    validate_request(&request).map_err(|e| e.to_string())?;

    let defaults = AnalysisOptions::default();
    let options = AnalysisOptions {
        fixed_costs: payload.fixed_costs,
        variable_cost_ratio: payload.variable_cost_ratio,
        fixed_marketing_ratio: payload
            .fixed_marketing_ratio
            .unwrap_or(defaults.fixed_marketing_ratio),
        fixed_cost_share: payload.fixed_cost_share.unwrap_or(defaults.fixed_cost_share),
        departments: payload.departments,
        stage: payload.stage.unwrap_or(defaults.stage),
    };
    for (field, ratio) in [
        ("fixedMarketingRatio", options.fixed_marketing_ratio),
        ("fixedCostShare", options.fixed_cost_share),
    ] {
        if !(0.0..=1.0).contains(&ratio) {
            return Err(format!("{field} must be within [0, 1], got {ratio}"));
        }
    }
    Ok(ApiRequest { request, options })
}

#[cfg(test)]
fn api_request_from_json(json: &str) -> Result<ApiRequest, String> {
    let payload = serde_json::from_str::<SimulatePayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    api_request_from_payload(payload)
}

fn build_response(api: &ApiRequest, mode: ResponseMode) -> Result<SimulateResponse, SimulationError> {
    let request = &api.request;
    let mut response = SimulateResponse {
        mode,
        business_type: request.business_type,
        start_month: request.start_month.clone(),
        months: request.months,
        result: None,
        analysis: None,
        scenarios: None,
    };
    match mode {
        ResponseMode::Simulate => {
            response.result = Some(run_simulation(request)?);
        }
        ResponseMode::Analyze => {
            let result = run_simulation(request)?;
            response.analysis = Some(analyze(request, &result, &api.options)?);
            response.result = Some(result);
        }
        ResponseMode::Scenarios => {
            response.scenarios = Some(run_scenarios(request)?);
        }
    }
    Ok(response)
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route("/api/simulate", post(simulate_post_handler))
        .route("/api/analyze", post(analyze_post_handler))
        .route("/api/scenarios", post(scenarios_post_handler))
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "runway HTTP API listening");
    info!("local access: http://127.0.0.1:{port}/api/simulate");

    axum::serve(listener, app).await
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn simulate_post_handler(Json(payload): Json<SimulatePayload>) -> Response {
    handler_impl(payload, ResponseMode::Simulate)
}

async fn analyze_post_handler(Json(payload): Json<SimulatePayload>) -> Response {
    handler_impl(payload, ResponseMode::Analyze)
}

async fn scenarios_post_handler(Json(payload): Json<SimulatePayload>) -> Response {
    handler_impl(payload, ResponseMode::Scenarios)
}

fn handler_impl(payload: SimulatePayload, mode: ResponseMode) -> Response {
    let request = match api_request_from_payload(payload) {
        Ok(request) => request,
        Err(msg) => {
            warn!(?mode, error = %msg, "rejected request");
            return error_response(StatusCode::BAD_REQUEST, &msg);
        }
    };
    match build_response(&request, mode) {
        Ok(response) => json_response(StatusCode::OK, response),
        Err(e) => error_response(StatusCode::BAD_REQUEST, &e.to_string()),
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

/// Runs one CLI invocation and returns the JSON it should print.
pub fn run_cli(cli: Cli) -> Result<String, String> {
    let mut payload = match &cli.input {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
            serde_json::from_str::<SimulatePayload>(&raw)
                .map_err(|e| format!("invalid JSON in {}: {e}", path.display()))?
        }
        None => SimulatePayload::default(),
    };
    if let Some(business_type) = cli.business_type {
        payload.business_type = Some(business_type.into());
    }
    if let Some(start_month) = cli.start_month {
        payload.start_month = Some(start_month);
    }
    if let Some(months) = cli.months {
        payload.months = Some(months);
    }
    if let Some(stage) = cli.stage {
        payload.stage = Some(stage.into());
    }

    let mode = if cli.analyze {
        ResponseMode::Analyze
    } else if cli.scenarios {
        ResponseMode::Scenarios
    } else {
        ResponseMode::Simulate
    };
    let request = api_request_from_payload(payload)?;
    let response = build_response(&request, mode).map_err(|e| e.to_string())?;
    let json = if cli.pretty {
        serde_json::to_string_pretty(&response)
    } else {
        serde_json::to_string(&response)
    };
    json.map_err(|e| format!("failed to encode response: {e}"))
}
