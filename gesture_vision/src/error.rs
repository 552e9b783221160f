use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, GestureError>;

#[derive(Debug, thiserror::Error)]
pub enum GestureError {
    /// The frame source stopped producing frames (device disconnected).
    #[error("frame source failed to produce a frame")]
    FrameUnavailable,

    #[error("frame has no pixels ({width}x{height})")]
    EmptyFrame { width: u32, height: u32 },

    /// An image-processing call into OpenCV failed.
    #[error("vision backend error: {0}")]
    Vision(#[from] opencv::Error),

    #[error("session has already terminated")]
    SessionTerminated,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to read configuration file {}: {source}", .path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),
}
