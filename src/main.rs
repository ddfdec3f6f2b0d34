// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Formation Cloud

use std::{env, net::SocketAddr};

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use formation_auth_server::{api::router, config::Settings, state::AppState};

#[tokio::main]
async fn main() {
    init_tracing();

    // Missing or invalid key material is fatal: better to refuse to
    // start than to serve a JWKS endpoint that can only answer 500.
    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };

    let state = match AppState::from_settings(settings) {
        Ok(state) => state,
        Err(e) => {
            error!(error = %e, "failed to load key material");
            std::process::exit(1);
        }
    };

    let app = router(state);

    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse()
        .unwrap_or(8080);

    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .expect("Failed to parse bind address");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listen address");

    info!(%addr, "Formation auth server listening (docs at /docs)");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server failed");
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    info!("shutdown signal received");
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if env::var("LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
