pub mod rpc;

use crate::core::{
    error::LedgerError,
    manager::ActorManager,
    message::{AccountMessage, AccountResponse},
    storage::Storage,
};
use actix_web::{
    dev::ServerHandle,
    error::InternalError,
    http::StatusCode,
    web::{self, Data, JsonConfig},
    App, HttpResponse, HttpServer, ResponseError,
};
use ledger_common::{
    account::ClientId,
    api::TransactionRequest,
    rpc::{
        server::{json_rpc, RPCServerHandler},
        RPCHandler,
    },
    transaction::{normalize_description, TransactionKind},
};
use serde_json::json;
use std::{fmt, sync::Arc};
use tokio::sync::Mutex;

pub type SharedDaemonRpcServer = Arc<DaemonRpcServer>;

/// The daemon's request surface: the two public REST routes plus the
/// internal JSON-RPC endpoint, served by one actix server.
pub struct DaemonRpcServer {
    handle: Mutex<Option<ServerHandle>>,
}

// Shared data of the /json_rpc route.
pub struct JsonRpcContext<S: Storage> {
    handler: RPCHandler<Arc<ActorManager<S>>>,
}

impl<S: Storage> RPCServerHandler<Arc<ActorManager<S>>> for JsonRpcContext<S> {
    fn get_rpc_handler(&self) -> &RPCHandler<Arc<ActorManager<S>>> {
        &self.handler
    }
}

impl DaemonRpcServer {
    pub async fn new<S: Storage>(
        manager: Arc<ActorManager<S>>,
        bind_address: String,
    ) -> Result<SharedDaemonRpcServer, LedgerError> {
        let mut rpc_handler = RPCHandler::new(manager.clone());
        rpc::register_methods(&mut rpc_handler);

        let manager_data = Data::new(manager);
        let rpc_context = Data::new(JsonRpcContext {
            handler: rpc_handler,
        });

        let http_server = HttpServer::new(move || {
            App::new().configure(|cfg| {
                configure_app(cfg, manager_data.clone(), rpc_context.clone())
            })
        })
        .disable_signals()
        .bind(&bind_address)?
        .run();

        info!("RPC server listening on {}", bind_address);

        let server = Arc::new(Self {
            handle: Mutex::new(Some(http_server.handle())),
        });
        tokio::spawn(http_server);

        Ok(server)
    }

    pub async fn stop(&self, graceful: bool) {
        info!("stopping RPC server");
        let handle = self.handle.lock().await.take();
        if let Some(handle) = handle {
            handle.stop(graceful).await;
        }
    }
}

// Route and extractor wiring, shared with the test harness.
pub fn configure_app<S: Storage>(
    cfg: &mut web::ServiceConfig,
    manager: Data<Arc<ActorManager<S>>>,
    rpc_context: Data<JsonRpcContext<S>>,
) {
    cfg.app_data(manager)
        .app_data(rpc_context)
        .app_data(json_config())
        .route(
            "/clientes/{id}/transacoes",
            web::post().to(create_transaction::<S>),
        )
        .route("/clientes/{id}/extrato", web::get().to(get_statement::<S>))
        .route(
            "/json_rpc",
            web::post().to(json_rpc::<Arc<ActorManager<S>>, JsonRpcContext<S>>),
        );
}

// An undecodable body is a validation failure, not a bad request.
fn json_config() -> JsonConfig {
    JsonConfig::default().error_handler(|err, _| {
        let response =
            HttpResponse::UnprocessableEntity().json(json!({"error": "invalid request body"}));
        InternalError::from_response(err, response).into()
    })
}

/// Boundary wrapper mapping the core error taxonomy onto HTTP statuses.
#[derive(Debug)]
pub struct ApiError(LedgerError);

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        Self(err)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        if self.0.is_not_found() {
            StatusCode::NOT_FOUND
        } else if self.0.is_unprocessable() {
            StatusCode::UNPROCESSABLE_ENTITY
        } else {
            error!("request failed: {}", self.0);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({"error": self.0.to_string()}))
    }
}

fn parse_client_id(raw: &str) -> Result<ClientId, ApiError> {
    raw.parse::<ClientId>()
        .map_err(|_| ApiError(LedgerError::InvalidClientId))
}

// Boundary validation, performed before the account is even looked up.
// The actor re-checks everything; only it can rule on the limit.
pub(crate) fn validate_request(request: &TransactionRequest) -> Result<(), LedgerError> {
    if request.amount <= 0 {
        return Err(LedgerError::InvalidAmount);
    }
    if TransactionKind::from_tag(&request.kind).is_none() {
        return Err(LedgerError::InvalidKind);
    }
    if normalize_description(&request.description).is_none() {
        return Err(LedgerError::InvalidDescription);
    }
    Ok(())
}

async fn create_transaction<S: Storage>(
    manager: Data<Arc<ActorManager<S>>>,
    path: web::Path<String>,
    body: web::Json<TransactionRequest>,
) -> Result<HttpResponse, ApiError> {
    let client_id = parse_client_id(&path)?;
    validate_request(&body)?;
    let handle = manager.spawn(client_id).await?;
    match handle
        .send(AccountMessage::Transact(body.into_inner()))
        .await?
    {
        AccountResponse::Transacted(success) => Ok(HttpResponse::Ok().json(success)),
        _ => Err(ApiError(LedgerError::Internal("unexpected actor response"))),
    }
}

async fn get_statement<S: Storage>(
    manager: Data<Arc<ActorManager<S>>>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let client_id = parse_client_id(&path)?;
    let handle = manager.spawn(client_id).await?;
    match handle.send(AccountMessage::QueryHistory).await? {
        AccountResponse::Statement(statement) => Ok(HttpResponse::Ok().json(statement)),
        _ => Err(ApiError(LedgerError::Internal("unexpected actor response"))),
    }
}
