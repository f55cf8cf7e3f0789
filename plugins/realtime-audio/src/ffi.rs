//! C-ABI host surface.
//!
//! The host integration layer (format wrapper, editor window) drives the
//! plugin through these functions:
//!
//! ```text
//! Host / format wrapper
//!        ↓ (C-ABI calls)
//! ffi.rs (this module)
//!        ↓
//! RealTimeAudio (audio thread) / Editor (UI thread)
//! ```
//!
//! # Safety
//!
//! Every function catches panics so they never cross the boundary, checks
//! pointers for null before dereferencing, and reports failures as status
//! codes. The audio entry points never block: if the instance is locked by a
//! reset they write silence and return [`RTA_ERR_BUSY`].

// These are C-ABI entry points. The host is responsible for passing valid
// pointers; marking them `unsafe` would be unusual for C FFI.
#![allow(clippy::not_unsafe_ptr_arg_deref)]

use std::ffi::{c_char, c_void, CStr};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::ptr;
use std::slice;
use std::sync::{Arc, Mutex, MutexGuard};

use rtaudio_core::{
    BridgeConfig, ChannelLayout, ParameterRef, Parameters, Sample, MAX_BLOCK_FRAMES, MAX_CHANNELS,
    MAX_SAMPLE_RATE,
};
use rtaudio_webview::{EvalJsFn, LoadFileFn, WebViewHandle};

use crate::editor::Editor;
use crate::params::RealTimeAudioParameters;
use crate::plugin::RealTimeAudio;

// =============================================================================
// Status codes
// =============================================================================

/// Success.
pub const RTA_OK: i32 = 0;
/// A required pointer was null or an argument was malformed.
pub const RTA_ERR_INVALID_PARAMETER: i32 = -1;
/// A value was outside its supported range.
pub const RTA_ERR_INVALID_VALUE: i32 = -2;
/// The instance is busy (reset in progress); the block was silenced.
pub const RTA_ERR_BUSY: i32 = -3;
/// The block exceeds the prepared maximum; the block was silenced.
pub const RTA_ERR_TOO_MANY_FRAMES: i32 = -4;
/// Saved state could not be read or written.
pub const RTA_ERR_STATE: i32 = -5;
/// The editor could not be opened.
pub const RTA_ERR_EDITOR: i32 = -6;
/// A panic was caught.
pub const RTA_ERR_INTERNAL: i32 = -7;

/// Maximum length of parameter name/unit strings.
const RTA_MAX_PARAM_NAME_LENGTH: usize = 128;

// =============================================================================
// Macros
// =============================================================================

/// Safely execute code with an instance handle, handling null checks and panics.
macro_rules! with_instance {
    ($instance:expr, $default:expr, |$handle:ident| $body:expr) => {{
        if $instance.is_null() {
            return $default;
        }
        catch_unwind(AssertUnwindSafe(|| {
            // SAFETY: checked non-null above; the host guarantees the handle
            // came from `rta_create` and has not been destroyed.
            let $handle = unsafe { &*$instance };
            $body
        }))
        .unwrap_or($default)
    }};
}

/// Variant of `with_instance!` for functions that return `()`.
macro_rules! with_instance_void {
    ($instance:expr, |$handle:ident| $body:expr) => {{
        if $instance.is_null() {
            return;
        }
        let _ = catch_unwind(AssertUnwindSafe(|| {
            // SAFETY: checked non-null above; the host guarantees the handle
            // came from `rta_create` and has not been destroyed.
            let $handle = unsafe { &*$instance };
            $body
        }));
    }};
}

// =============================================================================
// C-ABI structs
// =============================================================================

/// Parameter metadata.
#[repr(C)]
pub struct RtaParameterInfo {
    /// Parameter ID (host index).
    pub id: u32,
    /// Parameter name (UTF-8, null-terminated).
    pub name: [c_char; RTA_MAX_PARAM_NAME_LENGTH],
    /// Unit label (UTF-8, null-terminated).
    pub units: [c_char; RTA_MAX_PARAM_NAME_LENGTH],
    /// Unit type hint (0 = generic, 13 = decibels).
    pub unit_type: u32,
    /// Default normalized value.
    pub default_value: f64,
    /// Current normalized value.
    pub current_value: f64,
    /// Number of discrete steps (0 = continuous).
    pub step_count: i32,
    /// Bit 0 automatable, bit 1 hidden, bit 2 read-only.
    pub flags: u32,
}

/// Audio bridge counters.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy)]
pub struct RtaBridgeStats {
    /// Blocks queued by the audio thread.
    pub sent: u64,
    /// Blocks dropped because the hand-off was full.
    pub dropped: u64,
    /// Blocks accepted by the UI runtime.
    pub delivered: u64,
    /// Blocks the UI runtime refused.
    pub delivery_failures: u64,
}

// =============================================================================
// Instance
// =============================================================================

/// One plugin instance as seen by the host.
pub struct RtaInstance {
    plugin: Mutex<RealTimeAudio>,
    editor: Mutex<Editor>,
    params: Arc<RealTimeAudioParameters>,
}

/// Opaque handle passed across the boundary.
pub type RtaInstanceHandle = *mut RtaInstance;

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, i32> {
    mutex.lock().map_err(|_| RTA_ERR_INTERNAL)
}

/// Copy a Rust string into a fixed-size C char array.
fn copy_str_to_char_array(s: &str, dest: &mut [c_char]) {
    let copy_len = s.len().min(dest.len() - 1);
    for (slot, &b) in dest.iter_mut().zip(&s.as_bytes()[..copy_len]) {
        *slot = b as c_char;
    }
    dest[copy_len] = 0;
}

/// Write silence to every connected output.
///
/// # Safety
///
/// Same pointer contract as the process entry points.
unsafe fn silence_outputs<S: Sample>(outputs: *const *mut S, num_outputs: usize, frames: usize) {
    if outputs.is_null() {
        return;
    }
    for i in 0..num_outputs.min(MAX_CHANNELS) {
        // SAFETY: caller guarantees `outputs` holds `num_outputs` pointers.
        let channel = unsafe { *outputs.add(i) };
        if channel.is_null() {
            continue;
        }
        // SAFETY: caller guarantees each output holds `frames` samples.
        unsafe { slice::from_raw_parts_mut(channel, frames) }.fill(S::ZERO);
    }
}

// =============================================================================
// Lifecycle
// =============================================================================

/// Create a plugin instance.
///
/// `bridge_config` is an optional JSON object (`{"max_block_frames": 1024,
/// "queued_blocks": 8}`); null selects the defaults. Returns null on failure.
///
/// # Safety
///
/// - `bridge_config` must be null or a valid null-terminated string
/// - The returned handle must be released with `rta_destroy`
#[no_mangle]
pub extern "C" fn rta_create(
    num_inputs: u32,
    num_outputs: u32,
    bridge_config: *const c_char,
) -> RtaInstanceHandle {
    let result = catch_unwind(|| {
        let bridge = if bridge_config.is_null() {
            BridgeConfig::default()
        } else {
            // SAFETY: checked non-null; caller guarantees null termination.
            let text = unsafe { CStr::from_ptr(bridge_config) };
            match serde_json::from_slice(text.to_bytes()) {
                Ok(config) => config,
                Err(e) => {
                    log::error!("Invalid bridge config: {e}");
                    return None;
                }
            }
        };

        let layout = ChannelLayout::new(num_inputs as usize, num_outputs as usize);
        let (plugin, editor) = match RealTimeAudio::new(layout, bridge) {
            Ok(pair) => pair,
            Err(e) => {
                log::error!("Failed to create instance: {e}");
                return None;
            }
        };

        let handle = Box::new(RtaInstance {
            params: Arc::clone(plugin.params()),
            plugin: Mutex::new(plugin),
            editor: Mutex::new(editor),
        });
        Some(Box::into_raw(handle))
    });

    match result {
        Ok(Some(ptr)) => ptr,
        Ok(None) | Err(_) => ptr::null_mut(),
    }
}

/// Destroy a plugin instance.
///
/// # Safety
///
/// - `instance` must be null or a handle from `rta_create` not yet destroyed
/// - Must not be called concurrently with any other function on `instance`
#[no_mangle]
pub extern "C" fn rta_destroy(instance: RtaInstanceHandle) {
    if instance.is_null() {
        return;
    }

    let _ = catch_unwind(AssertUnwindSafe(|| {
        // SAFETY: non-null and owned by the caller, who gives it up here.
        drop(unsafe { Box::from_raw(instance) });
    }));
}

/// Reset notification with the host's processing setup.
///
/// Not real-time safe: may allocate.
#[no_mangle]
pub extern "C" fn rta_reset(instance: RtaInstanceHandle, sample_rate: f64, max_frames: u32) -> i32 {
    if sample_rate <= 0.0 || sample_rate > MAX_SAMPLE_RATE || !sample_rate.is_finite() {
        log::error!("Invalid sample rate: {sample_rate}");
        return RTA_ERR_INVALID_VALUE;
    }
    if max_frames == 0 || max_frames as usize > MAX_BLOCK_FRAMES {
        log::error!("Invalid max frames: {max_frames} (must be 1..={MAX_BLOCK_FRAMES})");
        return RTA_ERR_INVALID_VALUE;
    }

    with_instance!(instance, RTA_ERR_INVALID_PARAMETER, |handle| {
        let mut plugin = match lock(&handle.plugin) {
            Ok(guard) => guard,
            Err(status) => return status,
        };
        match plugin.reset(sample_rate, max_frames as usize) {
            Ok(()) => RTA_OK,
            Err(e) => {
                log::error!("Reset failed: {e}");
                RTA_ERR_INVALID_VALUE
            }
        }
    })
}

// =============================================================================
// Audio processing
// =============================================================================

fn process_entry<S: Sample>(
    instance: RtaInstanceHandle,
    outputs: *const *mut S,
    num_outputs: usize,
    num_frames: i32,
    run: impl FnOnce(&mut RealTimeAudio, usize),
) -> i32 {
    if instance.is_null() {
        return RTA_ERR_INVALID_PARAMETER;
    }
    if num_frames <= 0 {
        return RTA_OK;
    }
    let frames = num_frames as usize;

    catch_unwind(AssertUnwindSafe(|| {
        // SAFETY: checked non-null above; valid per the handle contract.
        let handle = unsafe { &*instance };

        // Never wait on the audio thread
        let Ok(mut plugin) = handle.plugin.try_lock() else {
            // SAFETY: forwarded caller contract.
            unsafe { silence_outputs(outputs, num_outputs, frames) };
            return RTA_ERR_BUSY;
        };

        if frames > plugin.max_buffer_size().frames() {
            // SAFETY: forwarded caller contract.
            unsafe { silence_outputs(outputs, num_outputs, frames) };
            return RTA_ERR_TOO_MANY_FRAMES;
        }

        run(&mut *plugin, frames);
        RTA_OK
    }))
    .unwrap_or(RTA_ERR_INTERNAL)
}

/// Process one block of single-precision audio.
///
/// Copies `min(num_inputs, num_outputs)` channels to the outputs, silences
/// the rest, and queues input channels 0/1 for the editor. `num_frames <= 0`
/// is a no-op.
///
/// # Safety
///
/// - `inputs` must be null or hold `num_inputs` channel pointers
/// - `outputs` must be null or hold `num_outputs` channel pointers
/// - Every non-null channel must hold `num_frames` samples; outputs must not
///   alias inputs or each other
/// - Real-time safe: never blocks, allocates or logs
#[no_mangle]
pub extern "C" fn rta_process_f32(
    instance: RtaInstanceHandle,
    inputs: *const *const f32,
    num_inputs: i32,
    outputs: *const *mut f32,
    num_outputs: i32,
    num_frames: i32,
) -> i32 {
    let num_inputs = num_inputs.max(0) as usize;
    let num_outputs = num_outputs.max(0) as usize;
    process_entry(instance, outputs, num_outputs, num_frames, |plugin, frames| {
        // SAFETY: forwarded caller contract.
        unsafe { plugin.process_raw_f32(inputs, num_inputs, outputs, num_outputs, frames) }
    })
}

/// Process one block of double-precision audio.
///
/// # Safety
///
/// Same contract as `rta_process_f32`.
#[no_mangle]
pub extern "C" fn rta_process_f64(
    instance: RtaInstanceHandle,
    inputs: *const *const f64,
    num_inputs: i32,
    outputs: *const *mut f64,
    num_outputs: i32,
    num_frames: i32,
) -> i32 {
    let num_inputs = num_inputs.max(0) as usize;
    let num_outputs = num_outputs.max(0) as usize;
    process_entry(instance, outputs, num_outputs, num_frames, |plugin, frames| {
        // SAFETY: forwarded caller contract.
        unsafe { plugin.process_raw_f64(inputs, num_inputs, outputs, num_outputs, frames) }
    })
}

// =============================================================================
// Parameters
// =============================================================================

/// Number of parameters exposed by the plugin.
#[no_mangle]
pub extern "C" fn rta_get_parameter_count(instance: RtaInstanceHandle) -> u32 {
    with_instance!(instance, 0, |handle| handle.params.count() as u32)
}

/// Fill `out_info` for the parameter at `index`.
///
/// # Safety
///
/// `out_info` must be null or point to writable `RtaParameterInfo`.
#[no_mangle]
pub extern "C" fn rta_get_parameter_info(
    instance: RtaInstanceHandle,
    index: u32,
    out_info: *mut RtaParameterInfo,
) -> bool {
    if out_info.is_null() {
        return false;
    }

    with_instance!(instance, false, |handle| {
        let Some(param) = handle.params.iter().nth(index as usize) else {
            return false;
        };
        let info = param.info();

        // SAFETY: out_info was validated as non-null above
        let out = unsafe { &mut *out_info };
        out.id = info.id;
        copy_str_to_char_array(info.name, &mut out.name);
        copy_str_to_char_array(info.units, &mut out.units);
        out.unit_type = info.unit as u32;
        out.default_value = info.default_normalized;
        out.current_value = param.get_normalized();
        out.step_count = info.step_count;
        out.flags = {
            let mut flags = 0u32;
            if info.flags.can_automate {
                flags |= 1 << 0;
            }
            if info.flags.is_hidden {
                flags |= 1 << 1;
            }
            if info.flags.is_readonly {
                flags |= 1 << 2;
            }
            flags
        };
        true
    })
}

/// Current normalized value of a parameter (0.0 for unknown ids).
#[no_mangle]
pub extern "C" fn rta_get_parameter_value(instance: RtaInstanceHandle, param_id: u32) -> f64 {
    with_instance!(instance, 0.0, |handle| {
        handle
            .params
            .by_id(param_id)
            .map_or(0.0, |p| p.get_normalized())
    })
}

/// Set a parameter's normalized value and raise the change notification.
#[no_mangle]
pub extern "C" fn rta_set_parameter_value(instance: RtaInstanceHandle, param_id: u32, value: f64) {
    with_instance_void!(instance, |handle| {
        // Non-finite values are not a change
        let param = handle.params.by_id(param_id).filter(|_| value.is_finite());
        if let Some(param) = param {
            param.set_normalized(value);
            handle.params.on_param_change(param_id);
        }
    })
}

/// Display string for a parameter's current value, written to `out`.
///
/// # Safety
///
/// `out` must be null or point to `capacity` writable bytes.
#[no_mangle]
pub extern "C" fn rta_get_parameter_display(
    instance: RtaInstanceHandle,
    param_id: u32,
    out: *mut c_char,
    capacity: u32,
) -> bool {
    if out.is_null() || capacity == 0 {
        return false;
    }

    with_instance!(instance, false, |handle| {
        let Some(param) = handle.params.by_id(param_id) else {
            return false;
        };
        // SAFETY: out is non-null with `capacity` bytes (caller contract).
        let dest = unsafe { slice::from_raw_parts_mut(out, capacity as usize) };
        copy_str_to_char_array(&param.display(), dest);
        true
    })
}

// =============================================================================
// State
// =============================================================================

/// Serialize plugin state into `out`.
///
/// Always writes the required size to `out_len`. Returns
/// [`RTA_ERR_INVALID_VALUE`] if `out` is null or smaller than that.
///
/// # Safety
///
/// - `out` must be null or point to `capacity` writable bytes
/// - `out_len` must point to a writable `u32`
#[no_mangle]
pub extern "C" fn rta_get_state(
    instance: RtaInstanceHandle,
    out: *mut u8,
    capacity: u32,
    out_len: *mut u32,
) -> i32 {
    if out_len.is_null() {
        return RTA_ERR_INVALID_PARAMETER;
    }

    with_instance!(instance, RTA_ERR_INVALID_PARAMETER, |handle| {
        let state = match handle.params.save_state() {
            Ok(state) => state,
            Err(e) => {
                log::error!("Failed to save state: {e}");
                return RTA_ERR_STATE;
            }
        };

        // SAFETY: out_len was validated as non-null above
        unsafe { *out_len = state.len() as u32 };
        if out.is_null() || (capacity as usize) < state.len() {
            return RTA_ERR_INVALID_VALUE;
        }

        // SAFETY: out holds at least state.len() bytes (checked above).
        unsafe { ptr::copy_nonoverlapping(state.as_ptr(), out, state.len()) };
        RTA_OK
    })
}

/// Restore plugin state saved by `rta_get_state`.
///
/// # Safety
///
/// `data` must be null or point to `len` readable bytes.
#[no_mangle]
pub extern "C" fn rta_set_state(instance: RtaInstanceHandle, data: *const u8, len: u32) -> i32 {
    if data.is_null() {
        return RTA_ERR_INVALID_PARAMETER;
    }

    with_instance!(instance, RTA_ERR_INVALID_PARAMETER, |handle| {
        // SAFETY: data is non-null with `len` bytes (caller contract).
        let bytes = unsafe { slice::from_raw_parts(data, len as usize) };
        match handle.params.load_state(bytes) {
            Ok(()) => RTA_OK,
            Err(e) => {
                log::warn!("Ignoring unreadable state: {e}");
                RTA_ERR_STATE
            }
        }
    })
}

// =============================================================================
// Editor
// =============================================================================

/// Open the editor in a platform WebView.
///
/// `eval_fn` and `context` are required; `load_fn` may be null, in which
/// case opening fails on platforms that cannot load bundled documents.
///
/// # Safety
///
/// - The callbacks must stay valid until `rta_editor_close`
/// - `context` must stay valid until `rta_editor_close`
/// - Must be called on the UI thread
#[no_mangle]
pub extern "C" fn rta_editor_open(
    instance: RtaInstanceHandle,
    eval_fn: Option<EvalJsFn>,
    load_fn: Option<LoadFileFn>,
    context: *mut c_void,
) -> i32 {
    let Some(eval_fn) = eval_fn else {
        return RTA_ERR_INVALID_PARAMETER;
    };
    if context.is_null() {
        return RTA_ERR_INVALID_PARAMETER;
    }

    with_instance!(instance, RTA_ERR_INVALID_PARAMETER, |handle| {
        // SAFETY: callbacks and context outlive the editor (caller contract).
        let mut webview = unsafe { WebViewHandle::new(eval_fn, context) };
        if let Some(load_fn) = load_fn {
            // SAFETY: as above.
            webview = unsafe { webview.with_loader(load_fn) };
        }

        let mut editor = match lock(&handle.editor) {
            Ok(guard) => guard,
            Err(status) => return status,
        };
        match editor.open(Box::new(webview)) {
            Ok(()) => RTA_OK,
            Err(e) => {
                log::error!("Failed to open editor: {e}");
                RTA_ERR_EDITOR
            }
        }
    })
}

/// Deliver queued audio to the editor. Call from the UI timer.
///
/// Returns the number of blocks delivered.
#[no_mangle]
pub extern "C" fn rta_editor_idle(instance: RtaInstanceHandle) -> u32 {
    with_instance!(instance, 0, |handle| {
        match lock(&handle.editor) {
            Ok(mut editor) => editor.idle() as u32,
            Err(_) => 0,
        }
    })
}

/// Close the editor. After this the audio thread stops queueing blocks.
#[no_mangle]
pub extern "C" fn rta_editor_close(instance: RtaInstanceHandle) {
    with_instance_void!(instance, |handle| {
        if let Ok(mut editor) = lock(&handle.editor) {
            editor.close();
        }
    })
}

/// Initial editor size in pixels.
///
/// # Safety
///
/// `width` and `height` must point to writable `u32`s.
#[no_mangle]
pub extern "C" fn rta_editor_get_size(
    instance: RtaInstanceHandle,
    width: *mut u32,
    height: *mut u32,
) -> bool {
    if width.is_null() || height.is_null() {
        return false;
    }

    with_instance!(instance, false, |handle| {
        let Ok(editor) = lock(&handle.editor) else {
            return false;
        };
        let size = editor.size();
        // SAFETY: both pointers were validated as non-null above
        unsafe {
            *width = size.width;
            *height = size.height;
        }
        true
    })
}

/// Copy the audio bridge counters into `out`.
#[no_mangle]
pub extern "C" fn rta_get_bridge_stats(
    instance: RtaInstanceHandle,
    out: *mut RtaBridgeStats,
) -> bool {
    if out.is_null() {
        return false;
    }

    with_instance!(instance, false, |handle| {
        let Ok(editor) = lock(&handle.editor) else {
            return false;
        };
        let stats = editor.stats();
        // SAFETY: out was validated as non-null above
        unsafe {
            *out = RtaBridgeStats {
                sent: stats.sent,
                dropped: stats.dropped,
                delivered: stats.delivered,
                delivery_failures: stats.delivery_failures,
            };
        }
        true
    })
}
