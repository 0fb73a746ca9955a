use thiserror::Error;

/// Problems with the command-line configuration, caught before any request is sent.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("a target URL is required, pass it with --url")]
    MissingUrl,

    #[error("invalid target URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("unsupported URL scheme {0:?}, expected http or https")]
    UnsupportedScheme(String),

    #[error("concurrency must be at least 1")]
    ZeroConcurrency,
}

/// A single call that produced no HTTP response.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Other(String),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("worker {id} terminated abnormally: {source}")]
    Worker {
        id: usize,
        #[source]
        source: tokio::task::JoinError,
    },

    #[error("worker pool needs at least one client")]
    EmptyPool,

    #[error("failed to create latency histogram: {0}")]
    Histogram(#[from] hdrhistogram::errors::CreationError),
}

pub type Result<T> = std::result::Result<T, Error>;
