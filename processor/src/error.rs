use std::fmt::Debug;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Log has no topics")]
    MissingTopic,

    #[error("Unknown event topic: {0}")]
    UnknownEventTopic(String),

    #[error("Log emitted by untracked contract {0}")]
    UntrackedContract(String),

    #[error(transparent)]
    Store(#[from] analytics_store::StoreError),

    #[error(transparent)]
    Rpc(#[from] listener::AppError),
}
