//! Stub HTTP endpoints for the integration tests

#![allow(dead_code)]

use axum::body::Bytes;
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::{Json, Router};
use serde_json::Value;
use std::sync::{Arc, Mutex};

/// One request seen by a stub
#[derive(Debug, Clone)]
pub struct Recorded {
    pub path: String,
    pub api_key: Option<String>,
    pub body: Value,
}

#[derive(Clone)]
pub struct Stub {
    pub base: String,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl Stub {
    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

/// Serve `reply` with `status` for every request on an ephemeral port
pub async fn serve(status: StatusCode, reply: Value) -> Stub {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&requests);

    let app = Router::new().fallback(move |uri: Uri, headers: HeaderMap, body: Bytes| {
        let recorded = Arc::clone(&recorded);
        let reply = reply.clone();
        async move {
            let api_key = headers
                .get("x-api-key")
                .or_else(|| headers.get("x-goog-api-key"))
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            recorded.lock().unwrap().push(Recorded {
                path: uri.path().to_string(),
                api_key,
                body: serde_json::from_slice(&body).unwrap_or(Value::Null),
            });
            (status, Json(reply))
        }
    });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    Stub {
        base: format!("http://{addr}"),
        requests,
    }
}

pub fn chart_reply(symbol: &str, price: f64, previous_close: f64) -> Value {
    serde_json::json!({
        "chart": {
            "result": [{
                "meta": {
                    "symbol": symbol,
                    "regularMarketPrice": price,
                    "previousClose": previous_close,
                    "regularMarketVolume": 1_000_000,
                    "marketCap": 2.5e9,
                    "regularMarketTime": 1_700_000_000
                }
            }],
            "error": null
        }
    })
}

pub fn gemini_reply(text: &str) -> Value {
    serde_json::json!({
        "candidates": [{ "content": { "parts": [{ "text": text }], "role": "model" } }]
    })
}
