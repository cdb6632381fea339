use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid value {value:?} for {name}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("error getting DB connection: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),

    #[error("query failed: {0}")]
    Query(#[from] diesel::result::Error),

    #[error("migrations failed: {0}")]
    Migration(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SendingError {
    #[error("invalid address {0:?}")]
    InvalidAddress(String),

    #[error("invalid message: {0}")]
    InvalidMessage(String),

    #[error("connection error: {0}")]
    ConnectionError(String),

    #[error("transient error: {0}")]
    TransientError(String),

    #[error("permanent error: {0}")]
    PermanentError(String),
}

impl From<lettre::address::AddressError> for SendingError {
    fn from(from: lettre::address::AddressError) -> Self {
        Self::InvalidAddress(from.to_string())
    }
}

impl From<lettre::error::Error> for SendingError {
    fn from(from: lettre::error::Error) -> Self {
        Self::InvalidMessage(from.to_string())
    }
}

impl From<lettre::transport::smtp::Error> for SendingError {
    fn from(from: lettre::transport::smtp::Error) -> Self {
        if from.is_permanent() {
            Self::PermanentError(from.to_string())
        } else if from.is_transient() {
            Self::TransientError(from.to_string())
        } else {
            Self::ConnectionError(from.to_string())
        }
    }
}

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("failed to send autoreply message: {0}")]
    Sending(#[from] SendingError),
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("unable to parse message headers: {0}")]
    Headers(#[from] mailparse::MailParseError),
}
