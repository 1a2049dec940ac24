//! Error types shared by both sides of the bridge

use thiserror::Error;

/// Failures on the protocol path between the UI thread and the render worker
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The host surface cannot hand out a transferable handle
    #[error("surface transfer is not supported by this host")]
    Unsupported,

    /// The surface was already transferred; ownership moves exactly once
    #[error("surface has already been transferred")]
    AlreadyTransferred,

    /// The peer end of the channel is gone
    #[error("bridge channel is closed")]
    ChannelClosed,

    /// A transfer list was attached to a message that cannot carry one
    #[error("message `{0}` cannot carry a transferred surface")]
    InvalidTransfer(String),

    #[error("malformed payload: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Failures while building a render root on the worker
#[derive(Debug, Error)]
pub enum EngineError {
    /// `init` arrived without the surface named in its payload
    #[error("init payload names surface {expected} but the transfer list holds {found:?}")]
    MissingSurface { expected: u64, found: Option<u64> },

    /// The engine rejected the surface or failed to start
    #[error("render root construction failed: {0}")]
    Construction(String),

    /// The engine panicked while constructing the root
    #[error("render root construction panicked: {0}")]
    Panicked(String),
}
