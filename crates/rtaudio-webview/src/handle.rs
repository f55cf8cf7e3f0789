//! Handle to a platform WebView.
//!
//! The platform layer (host editor window) supplies two C callbacks and an
//! opaque context pointer. [`WebViewHandle`] wraps them behind the
//! [`UiRuntime`] capability so the bridge never sees the platform type.

use std::ffi::c_void;
use std::sync::atomic::{AtomicPtr, Ordering};
use std::sync::Arc;

use crate::error::{Result, WebViewError};
use crate::runtime::{LoadRequest, UiRuntime};

/// Function pointer type for evaluating JavaScript in the WebView.
///
/// Called with the context pointer and a UTF-8 script. Returns `true` if the
/// WebView accepted the script. Must be called on the main thread.
pub type EvalJsFn =
    unsafe extern "C-unwind" fn(context: *mut c_void, script: *const u8, len: usize) -> bool;

/// Function pointer type for loading a bundled document.
///
/// Called with the context pointer, the document path, the bundle
/// identifier and the dev-tools flag. Returns `true` on success.
pub type LoadFileFn = unsafe extern "C-unwind" fn(
    context: *mut c_void,
    path: *const u8,
    path_len: usize,
    identifier: *const u8,
    identifier_len: usize,
    dev_tools: bool,
) -> bool;

/// Handle for sending scripts and events from Rust to the WebView.
///
/// Clones share the same context; [`invalidate`](Self::invalidate) on one
/// detaches all of them.
///
/// **Not audio-thread safe.** Scripts are built and passed on the UI thread.
#[derive(Clone)]
pub struct WebViewHandle {
    eval_fn: EvalJsFn,
    load_fn: Option<LoadFileFn>,
    context: Arc<AtomicPtr<c_void>>,
}

// SAFETY: The context pointer is only dereferenced on the main thread
// inside the platform callbacks. The Arc<AtomicPtr> ensures thread-safe
// access to the pointer itself.
unsafe impl Send for WebViewHandle {}
// SAFETY: Same reasoning as Send - context is only dereferenced on the
// main thread inside the callbacks and Arc<AtomicPtr> is inherently Sync.
unsafe impl Sync for WebViewHandle {}

impl WebViewHandle {
    /// Create a new WebView handle.
    ///
    /// # Safety
    ///
    /// - `eval_fn` must be a valid function pointer that remains valid for
    ///   the lifetime of the handle
    /// - `context` must remain valid until `invalidate()` is called
    pub unsafe fn new(eval_fn: EvalJsFn, context: *mut c_void) -> Self {
        Self {
            eval_fn,
            load_fn: None,
            context: Arc::new(AtomicPtr::new(context)),
        }
    }

    /// Attach a document loader.
    ///
    /// # Safety
    ///
    /// `load_fn` must remain valid for the lifetime of the handle.
    pub unsafe fn with_loader(mut self, load_fn: LoadFileFn) -> Self {
        self.load_fn = Some(load_fn);
        self
    }

    /// Whether the WebView is still attached.
    pub fn is_attached(&self) -> bool {
        !self.context.load(Ordering::Acquire).is_null()
    }

    /// Emit a named event to JavaScript as `window.dispatchEvent(CustomEvent)`.
    pub fn emit(&self, name: &str, data: &impl serde::Serialize) -> Result<()> {
        let script = format!(
            "window.dispatchEvent(new CustomEvent({}, {{ detail: {} }}))",
            serde_json::to_string(name)?,
            serde_json::to_string(data)?,
        );
        self.eval(&script)
    }

    /// Invalidate the handle, preventing further calls.
    ///
    /// Called when the WebView is detached. After this, every call fails
    /// with [`WebViewError::NotAttached`].
    pub fn invalidate(&self) {
        self.context.store(std::ptr::null_mut(), Ordering::Release);
    }

    fn eval(&self, script: &str) -> Result<()> {
        let ctx = self.context.load(Ordering::Acquire);
        if ctx.is_null() {
            return Err(WebViewError::NotAttached);
        }

        // SAFETY: eval_fn is a valid function pointer (guaranteed by new()),
        // and ctx was checked non-null above.
        let accepted = unsafe { (self.eval_fn)(ctx, script.as_ptr(), script.len()) };
        if accepted {
            Ok(())
        } else {
            Err(WebViewError::EvalFailed(format!(
                "webview rejected a {} byte script",
                script.len()
            )))
        }
    }
}

impl UiRuntime for WebViewHandle {
    fn load(&mut self, request: &LoadRequest<'_>) -> Result<()> {
        let load_fn = self.load_fn.ok_or(WebViewError::PlatformNotSupported)?;
        let ctx = self.context.load(Ordering::Acquire);
        if ctx.is_null() {
            return Err(WebViewError::NotAttached);
        }

        // SAFETY: load_fn is valid (guaranteed by with_loader()), ctx is
        // non-null, and both strings outlive the call.
        let loaded = unsafe {
            load_fn(
                ctx,
                request.entry_document.as_ptr(),
                request.entry_document.len(),
                request.identifier.as_ptr(),
                request.identifier.len(),
                request.dev_tools,
            )
        };
        if !loaded {
            return Err(WebViewError::LoadFailed(request.entry_document.to_string()));
        }

        match request.bootstrap_script() {
            Some(script) => self.eval(script),
            None => Ok(()),
        }
    }

    fn evaluate(&mut self, script: &str) -> Result<()> {
        self.eval(script)
    }
}
