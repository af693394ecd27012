use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, routing::post, Json, Router};
use serde_json::Value;
use tower_http::trace::TraceLayer;

use stonk_core::bridge::dispatch::{dispatch, DispatchError};
use stonk_core::bridge::mock::MockBridge;
use stonk_core::bridge::wire::{CallRequest, CallResponse};
use stonk_core::runtime::mock::MockRuntime;
use stonk_core::runtime::{LogLevel, Runtime};

#[derive(Clone, Default)]
pub struct AppState {
    pub bridge: Arc<MockBridge>,
    pub runtime: Arc<MockRuntime>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/call", post(call))
        .route("/runtime", post(runtime_call))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> &'static str {
    "ok"
}

type Reply = (StatusCode, Json<CallResponse>);

async fn call(State(state): State<AppState>, Json(req): Json<CallRequest>) -> Reply {
    match dispatch(state.bridge.as_ref(), &req.name, &req.args).await {
        Ok(result) => (StatusCode::OK, Json(CallResponse::ok(result))),
        Err(err) => {
            let status = match &err {
                DispatchError::UnknownMethod(_) => StatusCode::NOT_FOUND,
                DispatchError::BadArgs { .. } => StatusCode::BAD_REQUEST,
                DispatchError::Failed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };
            tracing::warn!(name = %req.name, %status, error = %err, "bridge call rejected");
            (status, Json(CallResponse::err(err.to_string())))
        }
    }
}

async fn runtime_call(State(state): State<AppState>, Json(req): Json<CallRequest>) -> Reply {
    let rt = state.runtime.as_ref();
    let text = |i: usize| req.args.get(i).and_then(Value::as_str).unwrap_or_default();

    match req.name.as_str() {
        "WindowSetDarkTheme" => rt.window_set_dark_theme().await,
        "WindowSetLightTheme" => rt.window_set_light_theme().await,
        "WindowReload" => rt.window_reload().await,
        "BrowserOpenURL" => rt.browser_open_url(text(0)).await,
        "EventsOff" => rt.events_off(text(0)),
        "EventsEmit" => {
            let args = req.args.iter().skip(1).cloned().collect();
            rt.events_emit(text(0), args).await
        }
        name => match name.strip_prefix("Log").and_then(LogLevel::parse) {
            Some(level) => rt.log(level, text(0)).await,
            None => {
                tracing::warn!(name, "unknown runtime call");
                return (
                    StatusCode::NOT_FOUND,
                    Json(CallResponse::err(format!("unknown runtime call: {name}"))),
                );
            }
        },
    }

    (StatusCode::OK, Json(CallResponse::ok(Value::Null)))
}
