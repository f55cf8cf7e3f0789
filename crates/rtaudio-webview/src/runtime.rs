//! Capability interface for the UI scripting runtime.
//!
//! The bridge needs exactly two things from a runtime: load the initial
//! document once, and accept a script. Readiness lives entirely inside the
//! runtime and is checked by a guard in every payload, never from Rust.

use crate::error::Result;

/// Script evaluated once after load in [`RuntimeMode::Embedded`].
///
/// Marks the page as hosted inside a plugin so it hides its standalone
/// input (demo keyboard, microphone capture).
pub const EMBEDDED_MODE_SCRIPT: &str =
    "window.__VST3_MODE = true; if (window.__setVST3Mode) { window.__setVST3Mode(); }";

/// How the page should behave once loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RuntimeMode {
    /// Running inside a plugin host; audio arrives from the bridge.
    #[default]
    Embedded,
    /// Running on its own (browser, dev server).
    Standalone,
}

/// One-time load parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadRequest<'a> {
    /// Entry document relative to the bundle's web resources.
    pub entry_document: &'a str,
    /// Bundle identifier used to resolve resources.
    pub identifier: &'a str,
    /// Page mode, fixed for the lifetime of the load.
    pub mode: RuntimeMode,
    /// Enable inspector and console.
    pub dev_tools: bool,
}

impl LoadRequest<'_> {
    /// Script to evaluate right after the document is loaded, if any.
    pub fn bootstrap_script(&self) -> Option<&'static str> {
        match self.mode {
            RuntimeMode::Embedded => Some(EMBEDDED_MODE_SCRIPT),
            RuntimeMode::Standalone => None,
        }
    }
}

/// A UI runtime that can load a document and evaluate scripts.
///
/// Implementations are driven from the UI thread only.
pub trait UiRuntime: Send {
    /// Load the entry document. Called once per editor open.
    ///
    /// Implementations evaluate [`LoadRequest::bootstrap_script`] after the
    /// document is loaded.
    fn load(&mut self, request: &LoadRequest<'_>) -> Result<()>;

    /// Hand a script to the runtime.
    ///
    /// Returns once the runtime accepted the script, not once it ran.
    fn evaluate(&mut self, script: &str) -> Result<()>;
}

impl<R: UiRuntime + ?Sized> UiRuntime for Box<R> {
    fn load(&mut self, request: &LoadRequest<'_>) -> Result<()> {
        (**self).load(request)
    }

    fn evaluate(&mut self, script: &str) -> Result<()> {
        (**self).evaluate(script)
    }
}
