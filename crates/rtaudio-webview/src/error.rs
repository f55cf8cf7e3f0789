//! Error types for UI runtime operations.

/// Errors that can occur while loading or talking to the UI runtime.
#[derive(Debug, thiserror::Error)]
pub enum WebViewError {
    /// The current platform provides no way to perform the operation.
    #[error("platform not supported")]
    PlatformNotSupported,
    /// The runtime rejected the initial document.
    #[error("webview load failed: {0}")]
    LoadFailed(String),
    /// The runtime refused a script.
    #[error("script evaluation failed: {0}")]
    EvalFailed(String),
    /// No WebView is currently attached.
    #[error("no webview attached")]
    NotAttached,
    /// Event data could not be encoded.
    #[error("event serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for WebView operations.
pub type Result<T> = std::result::Result<T, WebViewError>;
