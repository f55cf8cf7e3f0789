//! End-to-end scenarios: host blocks in, outputs and page payloads out.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use realtime_audio::{Editor, RealTimeAudio};
use rtaudio_core::{BridgeConfig, Buffer, ChannelLayout};
use rtaudio_webview::{LoadRequest, Result, UiRuntime, EMBEDDED_MODE_SCRIPT};

/// Runtime double that records every script it is handed.
#[derive(Clone, Default)]
struct RecordingRuntime {
    scripts: Arc<Mutex<Vec<String>>>,
    delay: Duration,
}

impl UiRuntime for RecordingRuntime {
    fn load(&mut self, request: &LoadRequest<'_>) -> Result<()> {
        if let Some(script) = request.bootstrap_script() {
            self.evaluate(script)?;
        }
        Ok(())
    }

    fn evaluate(&mut self, script: &str) -> Result<()> {
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
        self.scripts.lock().unwrap().push(script.to_string());
        Ok(())
    }
}

impl RecordingRuntime {
    /// Payload scripts, without the bootstrap.
    fn payloads(&self) -> Vec<String> {
        self.scripts
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.as_str() != EMBEDDED_MODE_SCRIPT)
            .cloned()
            .collect()
    }
}

struct Payload {
    left: Vec<f32>,
    right: Vec<f32>,
    sample_rate: f64,
}

fn parse_array(script: &str, name: &str) -> Vec<f32> {
    let start_marker = format!("const {name} = new Float32Array([");
    let start = script.find(&start_marker).unwrap() + start_marker.len();
    let end = start + script[start..].find("]);").unwrap();
    let body = &script[start..end];
    if body.is_empty() {
        return Vec::new();
    }
    body.split(',').map(|v| v.parse().unwrap()).collect()
}

fn parse_payload(script: &str) -> Payload {
    let guard = "if (window.processDAWAudioBuffer && window.__pitchDetectorReady) {";
    assert!(script.starts_with(guard));
    let marker = "window.processDAWAudioBuffer(left, right, ";
    let start = script.find(marker).unwrap() + marker.len();
    let end = start + script[start..].find(");}").unwrap();

    Payload {
        left: parse_array(script, "left"),
        right: parse_array(script, "right"),
        sample_rate: script[start..end].parse().unwrap(),
    }
}

fn open(layout: ChannelLayout) -> (RealTimeAudio, Editor, RecordingRuntime) {
    let (mut plugin, mut editor) = RealTimeAudio::new(layout, BridgeConfig::default()).unwrap();
    plugin.reset(44_100.0, 512).unwrap();

    let runtime = RecordingRuntime::default();
    editor.open(Box::new(runtime.clone())).unwrap();
    (plugin, editor, runtime)
}

#[test]
fn stereo_block_passes_through_and_reaches_page() {
    let (mut plugin, mut editor, runtime) = open(ChannelLayout::new(2, 2));
    let left = [0.1f32, 0.2, 0.3, 0.4];
    let right = [-0.1f32, -0.2, -0.3, -0.4];
    let mut out_l = [0.0f32; 4];
    let mut out_r = [0.0f32; 4];

    let mut buffer = Buffer::new(
        [&left[..], &right[..]],
        [&mut out_l[..], &mut out_r[..]],
        4,
    );
    plugin.process_block(&mut buffer);
    assert_eq!(out_l, left);
    assert_eq!(out_r, right);

    assert_eq!(editor.idle(), 1);
    let payloads = runtime.payloads();
    assert_eq!(payloads.len(), 1);
    assert_eq!(
        payloads[0],
        "if (window.processDAWAudioBuffer && window.__pitchDetectorReady) {\
         const left = new Float32Array([0.100000,0.200000,0.300000,0.400000]);\n\
         const right = new Float32Array([-0.100000,-0.200000,-0.300000,-0.400000]);\n\
         window.processDAWAudioBuffer(left, right, 44100.000000);}"
    );
}

#[test]
fn mono_input_feeds_both_bridge_channels() {
    let (mut plugin, mut editor, runtime) = open(ChannelLayout::new(1, 2));
    let input = [0.5f32, 0.5];
    let mut out_l = [9.0f32; 2];
    let mut out_r = [9.0f32; 2];

    let mut buffer = Buffer::new([&input[..]], [&mut out_l[..], &mut out_r[..]], 2);
    plugin.process_block(&mut buffer);
    assert_eq!(out_l, [0.5, 0.5]);
    assert_eq!(out_r, [0.0, 0.0]);

    editor.idle();
    let payload = parse_payload(&runtime.payloads()[0]);
    assert_eq!(payload.left, [0.5, 0.5]);
    assert_eq!(payload.right, [0.5, 0.5]);
    assert_eq!(payload.sample_rate, 44_100.0);
}

#[test]
fn no_input_gives_silence_everywhere() {
    let (mut plugin, mut editor, runtime) = open(ChannelLayout::new(0, 2));
    let mut out_l = [9.0f64; 3];
    let mut out_r = [9.0f64; 3];

    let mut buffer: Buffer<f64> = Buffer::new([], [&mut out_l[..], &mut out_r[..]], 3);
    plugin.process_block(&mut buffer);
    assert_eq!(out_l, [0.0; 3]);
    assert_eq!(out_r, [0.0; 3]);

    editor.idle();
    let payload = parse_payload(&runtime.payloads()[0]);
    assert_eq!(payload.left, [0.0; 3]);
    assert_eq!(payload.right, [0.0; 3]);
}

#[test]
fn missing_left_input_bridges_right_only() {
    let (mut plugin, mut editor, runtime) = open(ChannelLayout::new(2, 2));
    let right = [0.75f32; 3];
    let mut out_l = [9.0f32; 3];
    let mut out_r = [9.0f32; 3];
    let inputs = [std::ptr::null(), right.as_ptr()];
    let outputs = [out_l.as_mut_ptr(), out_r.as_mut_ptr()];

    unsafe {
        plugin.process_raw_f32(inputs.as_ptr(), 2, outputs.as_ptr(), 2, 3);
    }
    assert_eq!(out_l, [0.0; 3]);
    assert_eq!(out_r, right);

    editor.idle();
    let payload = parse_payload(&runtime.payloads()[0]);
    assert_eq!(payload.left, [0.0; 3]);
    assert_eq!(payload.right, right);
}

#[test]
fn closed_editor_sees_nothing() {
    let (mut plugin, mut editor) =
        RealTimeAudio::new(ChannelLayout::new(2, 2), BridgeConfig::default()).unwrap();
    let input = [0.25f32; 8];
    let mut output = [0.0f32; 8];

    let mut buffer = Buffer::new([&input[..]], [&mut output[..]], 8);
    plugin.process_block(&mut buffer);

    assert_eq!(output, input);
    assert_eq!(editor.idle(), 0);
    assert_eq!(editor.stats().sent, 0);
    assert_eq!(editor.stats().dropped, 0);
}

#[test]
fn slow_runtime_never_disturbs_audio() {
    const BLOCKS: usize = 400;
    const FRAMES: usize = 64;

    let (mut plugin, mut editor) = RealTimeAudio::new(
        ChannelLayout::new(2, 2),
        BridgeConfig {
            max_block_frames: FRAMES,
            queued_blocks: 4,
        },
    )
    .unwrap();
    plugin.reset(48_000.0, FRAMES).unwrap();

    let runtime = RecordingRuntime {
        delay: Duration::from_millis(2),
        ..Default::default()
    };
    editor.open(Box::new(runtime.clone())).unwrap();

    let done = Arc::new(AtomicBool::new(false));
    let ui = {
        let done = Arc::clone(&done);
        thread::spawn(move || {
            while !done.load(Ordering::Acquire) {
                editor.idle();
                thread::sleep(Duration::from_millis(1));
            }
            editor.idle();
            editor
        })
    };

    let mut out_l = [0.0f32; FRAMES];
    let mut out_r = [0.0f32; FRAMES];
    for block in 0..BLOCKS {
        let left: Vec<f32> = (0..FRAMES).map(|i| (block * FRAMES + i) as f32 * 1e-6).collect();
        let right: Vec<f32> = left.iter().map(|s| -s).collect();

        let mut buffer = Buffer::new(
            [&left[..], &right[..]],
            [&mut out_l[..], &mut out_r[..]],
            FRAMES,
        );
        plugin.process_block(&mut buffer);

        assert_eq!(out_l[..], left[..], "block {block}");
        assert_eq!(out_r[..], right[..], "block {block}");
    }

    done.store(true, Ordering::Release);
    let editor = ui.join().unwrap();
    let stats = editor.stats();

    assert_eq!(stats.sent + stats.dropped, BLOCKS as u64);
    assert_eq!(stats.delivered, stats.sent);
    assert_eq!(stats.delivery_failures, 0);
    assert_eq!(runtime.payloads().len() as u64, stats.delivered);

    // Delivered blocks arrive whole and in order
    let mut last_first_sample = -1.0f32;
    for script in runtime.payloads() {
        let payload = parse_payload(&script);
        assert_eq!(payload.left.len(), FRAMES);
        assert_eq!(payload.sample_rate, 48_000.0);
        assert!(payload.left[0] > last_first_sample);
        last_first_sample = payload.left[0];
    }
}
