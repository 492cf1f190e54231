//! Plugin server – axum 0.8, JSON in / JSON out
//!
//! The host talks to the provider over loopback HTTP. Every lifecycle call
//! answers `200` with `{ "state": …, "diagnostics": […] }`; failures are
//! diagnostics, never HTTP errors.

use crate::{
    cfg::ServerCfg,
    provider::{DnsimpleProvider, ProviderMetadata, ProviderSchema},
};
use axum::{
    Extension, Json, Router,
    body::Body,
    extract::{Path, State, connect_info::ConnectInfo},
    http::{Request, StatusCode, header},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};
use subtle::ConstantTimeEq;
use tf_resource::{Diagnostics, PlannedChange, ResourceResponse, State as ResourceState};
use tokio::net::TcpListener;
use tracing::info;

/// Protocol version announced in the handshake line.
pub const PROTOCOL_VERSION: u32 = 1;
pub const HANDSHAKE_PREFIX: &str = "DNSIMPLE_PROVIDER";

/*───────────────── private-network check ─────────────────*/
fn is_private(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            let o = v4.octets();
            v4.is_loopback()
                || o[0] == 10
                || (o[0] == 172 && (16..=31).contains(&o[1]))
                || (o[0] == 192 && o[1] == 168)
        }
        IpAddr::V6(v6) => v6.is_loopback() || (v6.segments()[0] & 0xfe00) == 0xfc00,
    }
}

/*──────────────────── middlewares ────────────────────*/

/// `intranet_only` gate
async fn intranet_guard(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Extension(cfg): Extension<Arc<ServerCfg>>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    if !cfg.intranet_only || is_private(addr.ip()) {
        Ok(next.run(req).await)
    } else {
        Err(StatusCode::FORBIDDEN)
    }
}

/// Bearer check; bypassed when `server.auth_token` is not configured.
async fn auth_guard(
    Extension(cfg): Extension<Arc<ServerCfg>>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(expected) = cfg.auth_token.as_deref() else {
        return Ok(next.run(req).await);
    };

    let presented = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    if bearer_matches(presented, expected) {
        Ok(next.run(req).await)
    } else {
        Err(StatusCode::UNAUTHORIZED)
    }
}

/// Constant-time comparison of an `Authorization` value against the token.
fn bearer_matches(presented: Option<&str>, expected: &str) -> bool {
    presented
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|t| bool::from(t.as_bytes().ct_eq(expected.as_bytes())))
        .unwrap_or(false)
}

/*──────────────────── router bootstrap ────────────────────*/

pub fn router(provider: Arc<DnsimpleProvider>, cfg: Arc<ServerCfg>) -> Router {
    Router::new()
        .route("/v1/metadata", get(api_metadata))
        .route("/v1/schema", get(api_schema))
        .route("/v1/configure", post(api_configure))
        .route("/v1/resources/{type_name}/create", post(api_create))
        .route("/v1/resources/{type_name}/read", post(api_read))
        .route("/v1/resources/{type_name}/update", post(api_update))
        .route("/v1/resources/{type_name}/delete", post(api_delete))
        .route("/v1/resources/{type_name}/import", post(api_import))
        .route("/v1/resources/{type_name}/plan", post(api_plan))
        .with_state(provider)
        // middlewares (inside-out)
        .layer(middleware::from_fn(auth_guard))
        .layer(middleware::from_fn(intranet_guard))
        .layer(Extension(cfg))
}

/// Serve on an already bound listener until ctrl-c.
pub async fn serve(
    listener: TcpListener,
    provider: Arc<DnsimpleProvider>,
    cfg: ServerCfg,
) -> anyhow::Result<()> {
    let app = router(provider, Arc::new(cfg));
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await?;
    Ok(())
}

/// Bind, announce the address on stdout for the host, then serve.
pub async fn run_plugin_server(provider: Arc<DnsimpleProvider>, cfg: ServerCfg) -> anyhow::Result<()> {
    let listener = TcpListener::bind(&cfg.listen).await?;
    let addr = listener.local_addr()?;
    announce(addr);
    info!("plugin server listening at http://{addr}");
    serve(listener, provider, cfg).await
}

#[allow(clippy::print_stdout)]
fn announce(addr: SocketAddr) {
    println!("{}", handshake_line(addr));
}

pub fn handshake_line(addr: SocketAddr) -> String {
    format!("{HANDSHAKE_PREFIX}|{PROTOCOL_VERSION}|{addr}")
}

/*──────── payloads ────────*/

type AppState = Arc<DnsimpleProvider>;

#[derive(Debug, Serialize, Deserialize)]
pub struct CallResp {
    pub state: Option<ResourceState>,
    pub diagnostics: Diagnostics,
}

impl From<ResourceResponse> for CallResp {
    fn from(r: ResourceResponse) -> Self {
        Self {
            state: r.state,
            diagnostics: r.diagnostics,
        }
    }
}

#[derive(Deserialize)]
struct ConfigureReq {
    #[serde(default)]
    config: Option<ResourceState>,
}

#[derive(Serialize)]
struct ConfigureResp {
    diagnostics: Diagnostics,
}

#[derive(Deserialize)]
struct CreateReq {
    plan: ResourceState,
}

#[derive(Deserialize)]
struct StateReq {
    state: ResourceState,
}

#[derive(Deserialize)]
struct UpdateReq {
    plan: ResourceState,
    prior_state: ResourceState,
}

#[derive(Deserialize)]
struct ImportReq {
    id: String,
}

#[derive(Deserialize)]
struct PlanReq {
    #[serde(default)]
    prior_state: Option<ResourceState>,
    #[serde(default)]
    proposed: Option<ResourceState>,
}

#[derive(Serialize)]
struct PlanResp {
    plan: Option<PlannedChange>,
    diagnostics: Diagnostics,
}

/*──────── handlers ────────*/

async fn api_metadata(State(p): State<AppState>) -> Json<ProviderMetadata> {
    Json(p.metadata())
}

async fn api_schema(State(p): State<AppState>) -> Json<ProviderSchema> {
    Json(p.schema())
}

async fn api_configure(
    State(p): State<AppState>,
    Json(req): Json<ConfigureReq>,
) -> Json<ConfigureResp> {
    let block = req.config.unwrap_or_default();
    Json(ConfigureResp {
        diagnostics: p.configure(&block),
    })
}

async fn api_create(
    State(p): State<AppState>,
    Path(type_name): Path<String>,
    Json(req): Json<CreateReq>,
) -> Json<CallResp> {
    Json(p.create(&type_name, req.plan).await.into())
}

async fn api_read(
    State(p): State<AppState>,
    Path(type_name): Path<String>,
    Json(req): Json<StateReq>,
) -> Json<CallResp> {
    Json(p.read(&type_name, req.state).await.into())
}

async fn api_update(
    State(p): State<AppState>,
    Path(type_name): Path<String>,
    Json(req): Json<UpdateReq>,
) -> Json<CallResp> {
    Json(p.update(&type_name, req.plan, req.prior_state).await.into())
}

async fn api_delete(
    State(p): State<AppState>,
    Path(type_name): Path<String>,
    Json(req): Json<StateReq>,
) -> Json<CallResp> {
    Json(p.delete(&type_name, req.state).await.into())
}

async fn api_import(
    State(p): State<AppState>,
    Path(type_name): Path<String>,
    Json(req): Json<ImportReq>,
) -> Json<CallResp> {
    Json(p.import(&type_name, &req.id).await.into())
}

async fn api_plan(
    State(p): State<AppState>,
    Path(type_name): Path<String>,
    Json(req): Json<PlanReq>,
) -> Json<PlanResp> {
    match p.plan(&type_name, req.prior_state.as_ref(), req.proposed.as_ref()) {
        Ok(plan) => Json(PlanResp {
            plan: Some(plan),
            diagnostics: Diagnostics::new(),
        }),
        Err(diagnostics) => Json(PlanResp {
            plan: None,
            diagnostics,
        }),
    }
}
