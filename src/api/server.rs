//! API Server Module
//!
//! This module implements a JSON-RPC server in front of the ledger.
//! Clients queue candidates for the next epoch, query validity and outputs, or run
//! an epoch directly.

use crate::{
    ConfirmationStatus, SoftConfirmation, Transaction, UtxoId,
    config::ApiConfig,
    pool::CandidatePool,
    registry::Registry,
    state::LedgerState,
};
use axum::{Json, Router, extract::State, routing::post};
use ethers::types::H256;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info, warn};

const METHOD_NOT_FOUND: i32 = -32601;
const INVALID_PARAMS: i32 = -32602;
const INTERNAL_ERROR: i32 = -32603;

/// Shared application state that is accessible across all request handlers
///
/// - `ledger`: The transaction handler behind its lock
/// - `candidates`: Candidates queued for the next epoch
/// - `registry`: Epoch metadata storage
#[derive(Clone)]
pub struct AppState {
    ledger: LedgerState,
    candidates: Arc<CandidatePool>,
    registry: Arc<Registry>,
}

/// The main API server struct
pub struct Server {
    config: ApiConfig,
    state: AppState,
}

impl Server {
    /// Creates a new API server instance
    ///
    /// # Arguments
    /// * `config` - Host and port to bind
    /// * `ledger` - Shared ledger state
    /// * `candidates` - Queue shared with the epoch orchestrator
    /// * `registry` - Epoch metadata registry
    pub fn new(
        config: ApiConfig,
        ledger: LedgerState,
        candidates: Arc<CandidatePool>,
        registry: Arc<Registry>,
    ) -> Self {
        let state = AppState {
            ledger,
            candidates,
            registry,
        };
        Self { config, state }
    }

    /// Router with a single POST endpoint at "/"
    pub fn router(&self) -> Router {
        Router::new()
            .route("/", post(handle_rpc))
            .with_state(self.state.clone())
    }

    /// Binds to the configured host and port and serves requests
    pub async fn start(self) -> anyhow::Result<()> {
        let app = self.router();

        let addr = format!("{}:{}", self.config.host, self.config.port);
        info!("API server listening on {}", addr);

        let listener = tokio::net::TcpListener::bind(&addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}

/// JSON-RPC 2.0 request structure
#[derive(Debug, Deserialize)]
struct JsonRpcRequest {
    #[allow(dead_code)]
    jsonrpc: String,
    method: String,
    #[serde(default)]
    params: Value,
    id: Value,
}

/// JSON-RPC 2.0 response structure
///
/// Either `result` or `error` is populated, never both.
#[derive(Debug, Serialize)]
struct JsonRpcResponse {
    jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcError>,
    id: Value,
}

#[derive(Debug, Serialize)]
struct JsonRpcError {
    code: i32,
    message: String,
}

impl JsonRpcResponse {
    fn success<T: Serialize>(id: Value, result: &T) -> Self {
        match serde_json::to_value(result) {
            Ok(value) => Self {
                jsonrpc: "2.0".to_string(),
                result: Some(value),
                error: None,
                id,
            },
            Err(e) => Self::failure(id, INTERNAL_ERROR, format!("Failed to encode result: {}", e)),
        }
    }

    fn failure(id: Value, code: i32, message: String) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(JsonRpcError { code, message }),
            id,
        }
    }
}

/// Main RPC request handler
///
/// Routes the request to the method handler by name.
async fn handle_rpc(
    State(state): State<AppState>,
    Json(request): Json<JsonRpcRequest>,
) -> Json<JsonRpcResponse> {
    info!("Received RPC request: {}", request.method);

    let JsonRpcRequest { method, params, id, .. } = request;
    let response = match method.as_str() {
        "sendTransaction" => handle_send_transaction(state, params, id).await,
        "isValid" => handle_is_valid(state, params, id).await,
        "getUtxo" => handle_get_utxo(state, params, id).await,
        "handleEpoch" => handle_epoch(state, params, id).await,
        _ => JsonRpcResponse::failure(id, METHOD_NOT_FOUND, "Method not found".to_string()),
    };
    Json(response)
}

/// Deserialize method parameters, or produce the invalid params response
fn parse_params<T: for<'de> Deserialize<'de>>(params: Value, id: &Value) -> Result<T, JsonRpcResponse> {
    serde_json::from_value(params).map_err(|e| {
        error!("Failed to deserialize params: {}", e);
        JsonRpcResponse::failure(id.clone(), INVALID_PARAMS, format!("Invalid params: {}", e))
    })
}

/// Handles the "sendTransaction" RPC method
///
/// Structurally invalid candidates are refused immediately since no epoch could
/// accept them. Everything else is queued: a candidate invalid against today's
/// pool may become valid once its producer is accepted in the same epoch.
async fn handle_send_transaction(state: AppState, params: Value, id: Value) -> JsonRpcResponse {
    let tx: Transaction = match parse_params(params, &id) {
        Ok(tx) => tx,
        Err(response) => return response,
    };
    let tx_hash = tx.content_hash();

    let status = match state.ledger.check(&tx).await {
        Err(rejection) if rejection.is_structural() => {
            warn!("Transaction {:?} refused: {}", tx_hash, rejection);
            ConfirmationStatus::Rejected {
                reason: rejection.to_string(),
            }
        }
        _ => {
            state.candidates.add(tx).await;
            info!("Transaction {:?} queued for next epoch", tx_hash);
            ConfirmationStatus::Queued
        }
    };

    let confirmation = SoftConfirmation {
        tx_hash,
        status,
        timestamp: chrono::Utc::now().timestamp() as u64,
    };
    JsonRpcResponse::success(id, &confirmation)
}

/// Handles the "isValid" RPC method against the current pool
async fn handle_is_valid(state: AppState, params: Value, id: Value) -> JsonRpcResponse {
    let tx: Transaction = match parse_params(params, &id) {
        Ok(tx) => tx,
        Err(response) => return response,
    };
    let valid = state.ledger.is_valid(&tx).await;
    JsonRpcResponse::success(id, &valid)
}

/// Handles the "getUtxo" RPC method; returns null for an unknown identifier
async fn handle_get_utxo(state: AppState, params: Value, id: Value) -> JsonRpcResponse {
    let utxo: UtxoId = match parse_params(params, &id) {
        Ok(utxo) => utxo,
        Err(response) => return response,
    };
    let output = state.ledger.get_utxo(&utxo).await;
    JsonRpcResponse::success(id, &output)
}

#[derive(Debug, Serialize)]
struct RejectedEntry {
    tx_hash: H256,
    reason: String,
}

/// Result of the "handleEpoch" method
#[derive(Debug, Serialize)]
struct EpochResult {
    epoch_id: u64,
    accepted: Vec<Transaction>,
    rejected: Vec<RejectedEntry>,
}

/// Handles the "handleEpoch" RPC method
///
/// Runs an epoch over the given candidates right away, bypassing the queue.
async fn handle_epoch(state: AppState, params: Value, id: Value) -> JsonRpcResponse {
    let candidates: Vec<Transaction> = match parse_params(params, &id) {
        Ok(candidates) => candidates,
        Err(response) => return response,
    };

    let (metadata, outcome) = match state.ledger.run_epoch(candidates).await {
        Ok(result) => result,
        Err(e) => {
            error!("Epoch failed: {}", e);
            return JsonRpcResponse::failure(id, INTERNAL_ERROR, e.to_string());
        }
    };

    if let Err(e) = state.registry.store(&metadata).await {
        warn!("Failed to record epoch #{}: {:?}", metadata.epoch_id, e);
    }

    let rejected: Vec<RejectedEntry> = outcome
        .rejected
        .into_iter()
        .map(|(tx_hash, rejection)| RejectedEntry {
            tx_hash,
            reason: rejection.to_string(),
        })
        .collect();

    let result = EpochResult {
        epoch_id: metadata.epoch_id,
        accepted: outcome.accepted,
        rejected,
    };
    JsonRpcResponse::success(id, &result)
}
