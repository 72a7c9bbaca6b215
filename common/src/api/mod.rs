// Wire types for the public HTTP surface and the internal RPC variant.
//
// The Portuguese JSON field names are bit-exact requirements of the
// external load generator; do not rename them.

use crate::{
    account::ClientId,
    time::Timestamp,
    transaction::{Transaction, TransactionKind},
};
use serde::{Deserialize, Serialize};

/// Inbound transaction request.
///
/// `tipo` is carried as the raw wire tag instead of a parsed
/// `TransactionKind`: the account actor is the validation authority and
/// must be able to reject an unknown tag itself, after the amount check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRequest {
    #[serde(rename = "valor")]
    pub amount: i64,
    #[serde(rename = "tipo")]
    pub kind: String,
    #[serde(rename = "descricao")]
    pub description: String,
}

/// Successful transaction reply: the post-mutation balance next to the
/// immutable credit limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionSuccess {
    #[serde(rename = "limite")]
    pub credit_limit: u64,
    #[serde(rename = "saldo")]
    pub balance: i64,
}

/// Statement header: current balance, read timestamp, credit limit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatementBalance {
    pub total: i64,
    #[serde(rename = "data_extrato")]
    pub as_of: Timestamp,
    #[serde(rename = "limite")]
    pub credit_limit: u64,
}

/// One statement line. Mirrors the committed event minus the account id
/// and revision, which the statement reader does not need.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatementEntry {
    #[serde(rename = "valor")]
    pub amount: u64,
    #[serde(rename = "tipo")]
    pub kind: TransactionKind,
    #[serde(rename = "descricao")]
    pub description: String,
    #[serde(rename = "realizada_em")]
    pub performed_at: Timestamp,
}

impl From<&Transaction> for StatementEntry {
    fn from(tx: &Transaction) -> Self {
        Self {
            amount: tx.amount,
            kind: tx.kind,
            description: tx.description.clone(),
            performed_at: tx.created_at,
        }
    }
}

/// The recent-history view: balance header plus at most `HISTORY_SIZE`
/// transactions, newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountStatement {
    #[serde(rename = "saldo")]
    pub balance: StatementBalance,
    #[serde(rename = "ultimas_transacoes")]
    pub last_transactions: Vec<StatementEntry>,
}

/// Params of the internal `do_transaction` RPC method. Same semantics as
/// the HTTP POST, addressed by client id instead of path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoTransactionParams {
    pub client_id: ClientId,
    #[serde(flatten)]
    pub request: TransactionRequest,
}

/// Params of the internal `get_history` RPC method.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GetHistoryParams {
    pub client_id: ClientId,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::now;

    #[test]
    fn test_request_wire_names() {
        let req: TransactionRequest =
            serde_json::from_str(r#"{"valor": 100, "tipo": "c", "descricao": "x"}"#).unwrap();
        assert_eq!(req.amount, 100);
        assert_eq!(req.kind, "c");
        assert_eq!(req.description, "x");
    }

    #[test]
    fn test_request_rejects_fractional_amount() {
        let result = serde_json::from_str::<TransactionRequest>(
            r#"{"valor": 1.5, "tipo": "d", "descricao": "x"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_success_wire_names() {
        let reply = TransactionSuccess {
            credit_limit: 100_000,
            balance: -250,
        };
        let value = serde_json::to_value(reply).unwrap();
        assert_eq!(value["limite"], 100_000);
        assert_eq!(value["saldo"], -250);
    }

    #[test]
    fn test_statement_wire_names() {
        let statement = AccountStatement {
            balance: StatementBalance {
                total: 10,
                as_of: now(),
                credit_limit: 500,
            },
            last_transactions: vec![StatementEntry {
                amount: 10,
                kind: TransactionKind::Credit,
                description: "x".to_string(),
                performed_at: now(),
            }],
        };
        let value = serde_json::to_value(&statement).unwrap();
        assert_eq!(value["saldo"]["total"], 10);
        assert_eq!(value["saldo"]["limite"], 500);
        assert!(value["saldo"]["data_extrato"].is_string());
        let entry = &value["ultimas_transacoes"][0];
        assert_eq!(entry["valor"], 10);
        assert_eq!(entry["tipo"], "c");
        assert_eq!(entry["descricao"], "x");
        assert!(entry["realizada_em"].is_string());
    }

    #[test]
    fn test_do_transaction_params_flatten() {
        let params: DoTransactionParams = serde_json::from_str(
            r#"{"client_id": 2, "valor": 50, "tipo": "d", "descricao": "pix"}"#,
        )
        .unwrap();
        assert_eq!(params.client_id, 2);
        assert_eq!(params.request.amount, 50);
        assert_eq!(params.request.kind, "d");
    }
}
