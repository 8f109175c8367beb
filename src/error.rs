use std::path::PathBuf;

/// Failures that can only happen while the viewer is being set up.
/// Once the screen and the driver are running nothing on the hot path can fail.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("failed to read font {}: {source}", path.display())]
    FontRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{} is not a TrueType/OpenType font", path.display())]
    FontFormat { path: PathBuf },
    #[error("failed to spawn route driver thread: {0}")]
    DriverSpawn(#[source] std::io::Error),
}
