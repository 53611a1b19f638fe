//! `spiderjar serve` – HTTP endpoint for TVBox clients.
//!
//! `/spider.jar` always answers 200 with a jar; degraded state is only visible
//! in the `X-Spider-*` headers and in `/spider-status`.

use anyhow::{Context, Result};
use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use spiderjar_core::config::SpiderConfig;
use spiderjar_core::diagnostics;
use spiderjar_core::environment::{EnvSignals, Region};
use spiderjar_core::fallback::fallback_result;
use spiderjar_core::{ResolutionResult, ResolutionStatus, SpiderJarResolver};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::SystemTime;

type Shared = Arc<SpiderJarResolver>;

const JAR_CONTENT_TYPE: &str = "application/java-archive";
const CACHE_SUCCESS: &str = "public, max-age=7200";
const CACHE_FALLBACK: &str = "public, max-age=300";

const X_SPIDER_SOURCE: &str = "x-spider-source";
const X_SPIDER_SUCCESS: &str = "x-spider-success";
const X_SPIDER_CACHED: &str = "x-spider-cached";
const X_SPIDER_SIZE: &str = "x-spider-size";
const X_SPIDER_SHA256: &str = "x-spider-sha256";
const CF_IPCOUNTRY: &str = "cf-ipcountry";

/// Query string of `/spider.jar`. Only `refresh=1`, `refresh=true` and
/// `refresh=yes` force a new resolution; a bare `?refresh` or any other value
/// is served from the cache.
#[derive(Debug, Default, Deserialize)]
struct JarQuery {
    refresh: Option<String>,
}

impl JarQuery {
    fn force_refresh(&self) -> bool {
        matches!(self.refresh.as_deref(), Some("1" | "true" | "yes"))
    }
}

#[derive(Debug, Serialize)]
struct StatusBody {
    status: Option<ResolutionStatus>,
    cache_remaining_secs: u64,
    recommendations: Vec<String>,
    blacklist: Vec<String>,
    region: Region,
    candidates: Vec<String>,
}

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Classifier signals carried by the request. The timezone is left to the
/// server default since browsers do not send one.
fn request_signals(headers: &HeaderMap) -> EnvSignals {
    EnvSignals {
        timezone: None,
        accept_language: header_str(headers, header::ACCEPT_LANGUAGE.as_str()),
        ip_country: header_str(headers, CF_IPCOUNTRY),
    }
}

fn text_value(s: &str) -> HeaderValue {
    HeaderValue::from_str(s).unwrap_or_else(|_| HeaderValue::from_static("invalid"))
}

fn jar_response(result: &ResolutionResult) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(JAR_CONTENT_TYPE));
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(result.bytes.len()));
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(if result.success {
            CACHE_SUCCESS
        } else {
            CACHE_FALLBACK
        }),
    );
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(X_SPIDER_SOURCE, text_value(result.origin.as_str()));
    headers.insert(X_SPIDER_SUCCESS, text_value(&result.success.to_string()));
    headers.insert(X_SPIDER_CACHED, text_value(&result.cached.to_string()));
    headers.insert(X_SPIDER_SIZE, HeaderValue::from(result.size));
    headers.insert(X_SPIDER_SHA256, text_value(&result.sha256));
    let body = Body::from(Bytes::from_owner(Arc::clone(&result.bytes)));
    (StatusCode::OK, headers, body).into_response()
}

/// Run a resolution on the blocking pool. A panicked task still yields a jar.
async fn resolve_blocking(resolver: &Shared, force: bool, signals: EnvSignals) -> ResolutionResult {
    let resolver = Arc::clone(resolver);
    match tokio::task::spawn_blocking(move || resolver.resolve_for(force, &signals)).await {
        Ok(result) => result,
        Err(e) => {
            tracing::error!("resolution task failed: {}", e);
            fallback_result(SystemTime::now(), 0)
        }
    }
}

/// `GET|HEAD /spider.jar[?refresh=1]`. Always 200; see [`JarQuery`] for the
/// accepted refresh values.
async fn spider_jar(
    State(resolver): State<Shared>,
    Query(query): Query<JarQuery>,
    headers: HeaderMap,
) -> Response {
    let signals = request_signals(&headers);
    let result = resolve_blocking(&resolver, query.force_refresh(), signals).await;
    tracing::debug!(
        source = %result.origin,
        cached = result.cached,
        success = result.success,
        "served spider.jar"
    );
    jar_response(&result)
}

fn status_body(resolver: &SpiderJarResolver, signals: &EnvSignals) -> StatusBody {
    let status = resolver.status();
    let recommendations = status
        .as_ref()
        .map(diagnostics::recommendations)
        .unwrap_or_default();
    let (classification, candidates) = resolver.preview(signals);
    StatusBody {
        status,
        cache_remaining_secs: resolver.cache_remaining().as_secs(),
        recommendations,
        blacklist: resolver.blacklisted(),
        region: classification.region,
        candidates: candidates.into_iter().map(|c| c.url).collect(),
    }
}

async fn spider_status(State(resolver): State<Shared>, headers: HeaderMap) -> Json<StatusBody> {
    Json(status_body(&resolver, &request_signals(&headers)))
}

async fn refresh_status(State(resolver): State<Shared>, headers: HeaderMap) -> Json<StatusBody> {
    let signals = request_signals(&headers);
    resolve_blocking(&resolver, true, signals.clone()).await;
    Json(status_body(&resolver, &signals))
}

fn router(resolver: Shared) -> Router {
    Router::new()
        .route("/spider.jar", get(spider_jar))
        .route("/spider-status", get(spider_status).post(refresh_status))
        .with_state(resolver)
}

async fn shutdown_signal(resolver: Shared) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("ctrl-c handler failed: {}", e);
    }
    tracing::info!("shutting down");
    resolver.shutdown();
}

pub async fn run_serve(cfg: &SpiderConfig, bind: Option<&str>) -> Result<()> {
    let bind = bind.unwrap_or(&cfg.serve.bind);
    let addr: SocketAddr = bind
        .parse()
        .with_context(|| format!("invalid bind address: {}", bind))?;
    let resolver: Shared = Arc::new(SpiderJarResolver::from_config(cfg)?);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {}", addr))?;
    tracing::info!("serving spider.jar on http://{}", addr);
    println!("listening on http://{}/spider.jar", addr);

    axum::serve(listener, router(Arc::clone(&resolver)))
        .with_graceful_shutdown(shutdown_signal(resolver))
        .await
        .context("http server")?;
    Ok(())
}
