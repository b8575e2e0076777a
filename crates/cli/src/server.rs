//! HTTP surface: a health probe and the connectivity status endpoint.

use std::time::Instant;

use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde_json::{Value, json};
use tower_http::cors::CorsLayer;
use tracing::info;
use wa::SharedSnapshot;

#[derive(Clone)]
pub struct AppState {
	pub snapshot: SharedSnapshot,
	pub started_at: Instant,
}

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/api/status", get(api_status))
		.layer(CorsLayer::permissive())
		.with_state(state)
}

/// Binds and serves until the process is stopped.
pub async fn serve(port: u16, state: AppState) -> Result<()> {
	let addr = format!("0.0.0.0:{port}");
	let listener = tokio::net::TcpListener::bind(&addr)
		.await
		.with_context(|| format!("failed to bind {addr}"))?;

	info!(target = "wa.http", %addr, "listening");
	axum::serve(listener, router(state))
		.await
		.context("HTTP server error")?;
	Ok(())
}

async fn health(State(state): State<AppState>) -> Json<Value> {
	Json(json!({
		"status": "ok",
		"timestamp": Utc::now(),
		"uptime": state.started_at.elapsed().as_secs_f64(),
	}))
}

async fn api_status(State(state): State<AppState>) -> impl IntoResponse {
	match status_body(&state) {
		Ok(body) => (StatusCode::OK, Json(body)),
		Err(err) => (
			StatusCode::INTERNAL_SERVER_ERROR,
			Json(json!({ "success": false, "error": err.to_string() })),
		),
	}
}

fn status_body(state: &AppState) -> Result<Value> {
	let snapshot = state.snapshot.read();
	Ok(json!({
		"success": true,
		"status": snapshot.status(),
		"isReady": snapshot.is_ready(),
		"clientInfo": snapshot.client_info(),
		"qr": snapshot.qr(),
		"reconnectAttempts": snapshot.reconnect_attempts(),
		"timestamp": Utc::now(),
	}))
}
