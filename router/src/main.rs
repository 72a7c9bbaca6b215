mod config;
mod shard;

use actix_web::{
    http::{header::CONTENT_TYPE, StatusCode},
    web::{self, Data},
    App, HttpRequest, HttpResponse, HttpServer,
};
use anyhow::{Context, Result};
use clap::Parser;
use config::RouterConfig;
use log::{error, info};
use shard::{extract_client_id, shard_index};
use tokio::sync::Semaphore;

struct Backend {
    base_url: String,
    // in-flight cap; None means unlimited
    permits: Option<Semaphore>,
}

struct RouterState {
    client: reqwest::Client,
    backends: Vec<Backend>,
}

// Forward one request to the backend that owns the account. The proxy
// adds nothing to the response; the backend's status and body pass
// through untouched.
async fn forward(state: Data<RouterState>, request: HttpRequest, body: web::Bytes) -> HttpResponse {
    let client_id = extract_client_id(request.path());
    let backend = &state.backends[shard_index(client_id, state.backends.len())];

    let _permit = match &backend.permits {
        Some(permits) => match permits.acquire().await {
            Ok(permit) => Some(permit),
            Err(_) => return HttpResponse::ServiceUnavailable().finish(),
        },
        None => None,
    };

    let path_and_query = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let url = format!("{}{}", backend.base_url, path_and_query);

    let method = match reqwest::Method::from_bytes(request.method().as_str().as_bytes()) {
        Ok(method) => method,
        Err(_) => return HttpResponse::MethodNotAllowed().finish(),
    };

    let mut upstream = state.client.request(method, &url);
    if let Some(content_type) = request.headers().get(CONTENT_TYPE) {
        if let Ok(value) = content_type.to_str() {
            upstream = upstream.header(reqwest::header::CONTENT_TYPE, value);
        }
    }

    let response = match upstream.body(body.to_vec()).send().await {
        Ok(response) => response,
        Err(err) => {
            error!("forward to {} failed: {}", url, err);
            return HttpResponse::BadGateway()
                .json(serde_json::json!({"error": "backend unreachable"}));
        }
    };

    let status =
        StatusCode::from_u16(response.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);

    match response.bytes().await {
        Ok(bytes) => {
            let mut builder = HttpResponse::build(status);
            if let Some(content_type) = content_type {
                builder.insert_header((CONTENT_TYPE, content_type));
            }
            builder.body(bytes.to_vec())
        }
        Err(err) => {
            error!("reading response from {} failed: {}", url, err);
            HttpResponse::BadGateway().json(serde_json::json!({"error": "backend read failed"}))
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let config = RouterConfig::parse();

    let mut builder = reqwest::Client::builder().pool_idle_timeout(config.idle_conn_timeout());
    if let Some(idle) = config.idle_per_host() {
        builder = builder.pool_max_idle_per_host(idle);
    }
    let client = builder.build().context("failed to build upstream client")?;

    let backends = config
        .backends
        .iter()
        .map(|base_url| Backend {
            base_url: base_url.trim_end_matches('/').to_string(),
            permits: config.max_conns_per_host.map(Semaphore::new),
        })
        .collect();
    let state = Data::new(RouterState { client, backends });

    info!(
        "load balancer listening on {}, routing to {} backends",
        config.listen_address(),
        config.backends.len()
    );

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .default_service(web::route().to(forward))
    })
    .bind(config.listen_address())?
    .run()
    .await
    .context("server error")
}
