use ledger_common::account::ClientId;
use thiserror::Error;

/// Error taxonomy of the ledger core. The user-facing messages of the
/// validation and limit variants are part of the external contract and
/// must not be reworded.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("cliente nao encontrado")]
    ClientNotFound(ClientId),

    #[error("id de cliente invalido")]
    InvalidClientId,

    #[error("o valor deve ser maior que zero")]
    InvalidAmount,

    #[error("tipo de transacao invalida")]
    InvalidKind,

    #[error("descricao deve ter entre 1 e 10 caracteres")]
    InvalidDescription,

    #[error("sem limite para realizar a transacao")]
    LimitExceeded,

    #[error("balance arithmetic overflow")]
    BalanceOverflow,

    #[error("account actor is not initialized")]
    NotReady,

    #[error("account actor is gone")]
    ActorClosed,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Sled(#[from] sled::Error),

    #[error("storage encoding error: {0}")]
    Encoding(#[from] bincode::Error),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("internal error: {0}")]
    Internal(&'static str),
}

impl LedgerError {
    // Business rejections: the request was understood and refused.
    // Everything else is an infrastructure failure.
    pub fn is_unprocessable(&self) -> bool {
        matches!(
            self,
            Self::InvalidClientId
                | Self::InvalidAmount
                | Self::InvalidKind
                | Self::InvalidDescription
                | Self::LimitExceeded
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ClientNotFound(_))
    }
}
