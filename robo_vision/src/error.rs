use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum VisionError {
    #[error("frame buffer holds {len} bytes, expected {width}x{height}")]
    FrameSize { width: u32, height: u32, len: usize },
    #[error("boresight reference vector has zero length")]
    DegenerateBoresight,
    #[error("invalid vision parameter: {0}")]
    InvalidParams(&'static str),
    #[error("frame source error: {0}")]
    Source(String),
}

pub type Result<T> = std::result::Result<T, VisionError>;
