use crate::rpc::{InternalRpcError, RpcRequest, RpcResponse, RpcResponseError, JSON_RPC_VERSION};
use futures::future::BoxFuture;
use log::trace;
use serde_json::Value;
use std::collections::HashMap;

// A registered RPC method: receives a clone of the shared data and the
// (possibly null) params value, returns the result value.
pub type Handler<T> =
    Box<dyn Fn(T, Value) -> BoxFuture<'static, Result<Value, InternalRpcError>> + Send + Sync>;

/// Method registry for the JSON-RPC surface. Holds the shared
/// application data handed to every invocation.
pub struct RPCHandler<T>
where
    T: Send + Sync + Clone + 'static,
{
    methods: HashMap<&'static str, Handler<T>>,
    data: T,
}

impl<T> RPCHandler<T>
where
    T: Send + Sync + Clone + 'static,
{
    pub fn new(data: T) -> Self {
        Self {
            methods: HashMap::new(),
            data,
        }
    }

    pub fn register_method(&mut self, name: &'static str, handler: Handler<T>) {
        self.methods.insert(name, handler);
    }

    pub fn has_method(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    pub fn get_data(&self) -> &T {
        &self.data
    }

    // Parse and execute one request body, mapping every failure to the
    // JSON-RPC error envelope with the request id when one was supplied.
    pub async fn handle_request(&self, body: &[u8]) -> Result<Value, RpcResponseError> {
        let request: RpcRequest = serde_json::from_slice(body)
            .map_err(|_| RpcResponseError::new(None, InternalRpcError::ParseBodyError))?;

        if request.jsonrpc != JSON_RPC_VERSION {
            return Err(RpcResponseError::new(
                request.id,
                InternalRpcError::InvalidVersion,
            ));
        }

        trace!("executing method '{}'", request.method);

        let handler = match self.methods.get(request.method.as_str()) {
            Some(handler) => handler,
            None => {
                return Err(RpcResponseError::new(
                    request.id,
                    InternalRpcError::MethodNotFound(request.method),
                ))
            }
        };

        let params = request.params.unwrap_or(Value::Null);
        let result = handler(self.data.clone(), params)
            .await
            .map_err(|err| RpcResponseError::new(request.id.clone(), err))?;

        serde_json::to_value(RpcResponse::new(request.id.as_ref(), result)).map_err(|err| {
            RpcResponseError::new(request.id.clone(), InternalRpcError::SerializeResponse(err))
        })
    }
}

// Deserialize the params value for a method that requires them.
pub fn parse_params<P: serde::de::DeserializeOwned>(params: Value) -> Result<P, InternalRpcError> {
    if params.is_null() {
        return Err(InternalRpcError::ExpectedParams);
    }
    serde_json::from_value(params).map_err(InternalRpcError::InvalidJSONParams)
}
