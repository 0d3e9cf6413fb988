use thiserror::Error;

/// Failures while building a demo. Fatal to that demo instance: the render
/// loop is only built once setup succeeded, so the surface stays blank.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("shader `{label}` failed to compile or link: {message}")]
    Shader { label: &'static str, message: String },
    #[error("no GPU adapter available")]
    NoAdapter,
    #[error("GPU device request failed: {0}")]
    Device(String),
    #[error("surface creation failed: {0}")]
    Surface(String),
    #[error("missing DOM element #{0}")]
    MissingElement(&'static str),
    #[error("audio engine unavailable: {0}")]
    Audio(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LoopError {
    #[error("render loop is already running")]
    AlreadyRunning,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlaybackError {
    #[error("select an audio file first")]
    NoFileSelected,
    #[error("decode finished for a file that is no longer selected")]
    StaleDecode,
}

/// Non-fatal: callers log these and carry on.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TriggerError {
    #[error("audio engine is not ready")]
    EngineUnavailable,
    #[error("audio node error: {0}")]
    Node(String),
}
