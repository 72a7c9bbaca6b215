// Internal RPC surface: the same two operations as the REST routes,
// exposed as JSON-RPC methods for backend-to-backend callers.

use crate::core::{
    error::LedgerError,
    manager::ActorManager,
    message::{AccountMessage, AccountResponse},
    storage::Storage,
};
use ledger_common::{
    api::{DoTransactionParams, GetHistoryParams},
    rpc::{parse_params, InternalRpcError, RPCHandler},
};
use serde_json::Value;
use std::sync::Arc;

// Application error codes of this surface. The transport reserves
// -32000..-32768; custom codes live outside that band.
pub const ACCOUNT_NOT_FOUND_CODE: i16 = -100;
pub const TRANSACTION_REJECTED_CODE: i16 = -200;
pub const STORAGE_ERROR_CODE: i16 = -300;

pub fn register_methods<S: Storage>(handler: &mut RPCHandler<Arc<ActorManager<S>>>) {
    info!("registering RPC methods...");
    handler.register_method(
        "do_transaction",
        Box::new(|manager, params| Box::pin(do_transaction(manager, params))),
    );
    handler.register_method(
        "get_history",
        Box::new(|manager, params| Box::pin(get_history(manager, params))),
    );
}

fn map_ledger_error(err: LedgerError) -> InternalRpcError {
    if err.is_not_found() {
        InternalRpcError::Custom(ACCOUNT_NOT_FOUND_CODE, err.to_string())
    } else if err.is_unprocessable() {
        InternalRpcError::Custom(TRANSACTION_REJECTED_CODE, err.to_string())
    } else {
        error!("rpc request failed: {}", err);
        InternalRpcError::Custom(STORAGE_ERROR_CODE, err.to_string())
    }
}

async fn do_transaction<S: Storage>(
    manager: Arc<ActorManager<S>>,
    params: Value,
) -> Result<Value, InternalRpcError> {
    let params: DoTransactionParams = parse_params(params)?;
    super::validate_request(&params.request).map_err(map_ledger_error)?;
    let handle = manager
        .spawn(params.client_id)
        .await
        .map_err(map_ledger_error)?;
    match handle
        .send(AccountMessage::Transact(params.request))
        .await
        .map_err(map_ledger_error)?
    {
        AccountResponse::Transacted(success) => {
            serde_json::to_value(success).map_err(InternalRpcError::SerializeResponse)
        }
        _ => Err(InternalRpcError::InternalError("unexpected actor response")),
    }
}

async fn get_history<S: Storage>(
    manager: Arc<ActorManager<S>>,
    params: Value,
) -> Result<Value, InternalRpcError> {
    let params: GetHistoryParams = parse_params(params)?;
    let handle = manager
        .spawn(params.client_id)
        .await
        .map_err(map_ledger_error)?;
    match handle
        .send(AccountMessage::QueryHistory)
        .await
        .map_err(map_ledger_error)?
    {
        AccountResponse::Statement(statement) => {
            serde_json::to_value(statement).map_err(InternalRpcError::SerializeResponse)
        }
        _ => Err(InternalRpcError::InternalError("unexpected actor response")),
    }
}
