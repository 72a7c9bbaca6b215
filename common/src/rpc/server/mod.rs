use actix_web::{
    web::{self, Data},
    HttpResponse, Responder,
};

use super::{RPCHandler, RpcResponseError};

// trait to retrieve easily a JSON RPC handler for registered route
pub trait RPCServerHandler<T: Send + Sync + Clone + 'static> {
    fn get_rpc_handler(&self) -> &RPCHandler<T>;
}

// JSON RPC handler endpoint
pub async fn json_rpc<T, H>(
    server: Data<H>,
    body: web::Bytes,
) -> Result<impl Responder, RpcResponseError>
where
    T: Send + Sync + Clone + 'static,
    H: RPCServerHandler<T>,
{
    let result = server.get_rpc_handler().handle_request(&body).await?;
    Ok(HttpResponse::Ok().json(result))
}
