use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("no servo on channel {0}")]
    NoSuchChannel(u8),
    #[error("bus timeout")]
    Timeout,
    #[error("bus error: {0}")]
    Bus(String),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HwError>;
