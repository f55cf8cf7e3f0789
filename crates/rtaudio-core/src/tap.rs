//! Audio tap: lock-free hand-off of input blocks from the audio thread.
//!
//! The audio thread owns an [`AudioTap`] and copies each block's bridge
//! channels into a bounded SPSC ring as [`StereoFrame`]s. The UI thread owns
//! the matching [`TapReader`] and pops whole blocks at its own pace.
//!
//! ```text
//! audio thread                         UI thread
//! ─────────────                        ─────────
//! AudioTap::push ──► frame ring ──┐
//!                └─► header ring ─┴──► TapReader::pop_block
//! ```
//!
//! # Real-Time Safety
//!
//! - Both rings are allocated in [`channel`]; `push` never allocates
//! - `push` never blocks and never logs; a full ring drops the newest block
//!   and bumps [`TapStats::dropped`]
//! - Frames are published before their header, so a visible header always
//!   has all of its frames behind it
//!
//! # Channel derivation
//!
//! | ch0 | ch1 | left | right |
//! |-----|-----|------|-------|
//! | yes | yes | ch0 | ch1 |
//! | yes | no | ch0 | ch0 |
//! | no | yes | 0 | ch1 |
//! | no | no | 0 | 0 |

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use ringbuf::traits::{Consumer, Observer, Producer, Split};
use ringbuf::{HeapCons, HeapProd, HeapRb};
use serde::{Deserialize, Serialize};

use crate::buffer::Buffer;
use crate::sample::Sample;
use crate::types::MAX_BLOCK_FRAMES;

/// One bridged frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StereoFrame {
    /// Left sample.
    pub left: f32,
    /// Right sample.
    pub right: f32,
}

/// Describes one queued block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockHeader {
    /// Frames queued for this block.
    pub frames: usize,
    /// Sample rate at the time the block was processed.
    pub sample_rate: f64,
}

/// Hand-off capacity.
///
/// The frame ring holds `max_block_frames * queued_blocks` frames and the
/// header ring holds `queued_blocks` headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Largest block queued in one piece. Longer blocks are split.
    ///
    /// Defaults to [`MAX_BLOCK_FRAMES`], so every host block the plugin
    /// accepts reaches the page as a single payload.
    pub max_block_frames: usize,
    /// Blocks that may wait for the UI thread before new ones are dropped.
    pub queued_blocks: usize,
}

impl BridgeConfig {
    /// Clamp to usable values (`1..=MAX_BLOCK_FRAMES` frames, at least one block).
    pub fn sanitized(self) -> Self {
        Self {
            max_block_frames: self.max_block_frames.clamp(1, MAX_BLOCK_FRAMES),
            queued_blocks: self.queued_blocks.max(1),
        }
    }

    /// Frame ring capacity.
    pub fn frame_capacity(&self) -> usize {
        self.max_block_frames * self.queued_blocks
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            max_block_frames: MAX_BLOCK_FRAMES,
            queued_blocks: 8,
        }
    }
}

/// Hand-off counters, shared by both ends.
#[derive(Debug, Default)]
pub struct TapStats {
    sent: AtomicU64,
    dropped: AtomicU64,
    delivered: AtomicU64,
    delivery_failures: AtomicU64,
}

impl TapStats {
    /// Blocks queued by the audio thread.
    pub fn sent(&self) -> u64 {
        self.sent.load(Ordering::Relaxed)
    }

    /// Blocks dropped because the hand-off was full.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Blocks accepted by the UI runtime.
    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    /// Blocks the UI runtime refused.
    pub fn delivery_failures(&self) -> u64 {
        self.delivery_failures.load(Ordering::Relaxed)
    }

    /// Record a block accepted by the UI runtime.
    pub fn record_delivered(&self) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a block the UI runtime refused.
    pub fn record_delivery_failure(&self) {
        self.delivery_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of all counters.
    pub fn snapshot(&self) -> TapStatsSnapshot {
        TapStatsSnapshot {
            sent: self.sent(),
            dropped: self.dropped(),
            delivered: self.delivered(),
            delivery_failures: self.delivery_failures(),
        }
    }
}

/// Serializable copy of [`TapStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TapStatsSnapshot {
    /// See [`TapStats::sent`].
    pub sent: u64,
    /// See [`TapStats::dropped`].
    pub dropped: u64,
    /// See [`TapStats::delivered`].
    pub delivered: u64,
    /// See [`TapStats::delivery_failures`].
    pub delivery_failures: u64,
}

#[derive(Debug, Default)]
struct Shared {
    attached: AtomicBool,
    stats: TapStats,
}

/// Create a connected tap/reader pair.
///
/// Allocates both rings; call from a non-real-time thread.
pub fn channel(config: BridgeConfig) -> (AudioTap, TapReader) {
    let config = config.sanitized();
    let (frames_tx, frames_rx) = HeapRb::<StereoFrame>::new(config.frame_capacity()).split();
    let (headers_tx, headers_rx) = HeapRb::<BlockHeader>::new(config.queued_blocks).split();
    let shared = Arc::new(Shared::default());
    log::debug!(
        "Audio tap: {} blocks of up to {} frames",
        config.queued_blocks,
        config.max_block_frames
    );

    let tap = AudioTap {
        frames: frames_tx,
        headers: headers_tx,
        shared: Arc::clone(&shared),
        max_block_frames: config.max_block_frames,
    };
    let reader = TapReader {
        frames: frames_rx,
        headers: headers_rx,
        shared,
    };
    (tap, reader)
}

/// Producer end, owned by the audio thread.
pub struct AudioTap {
    frames: HeapProd<StereoFrame>,
    headers: HeapProd<BlockHeader>,
    shared: Arc<Shared>,
    max_block_frames: usize,
}

impl AudioTap {
    /// Whether a UI runtime is currently attached to the reader.
    #[inline]
    pub fn is_attached(&self) -> bool {
        self.shared.attached.load(Ordering::Acquire)
    }

    /// Shared counters.
    pub fn stats(&self) -> &TapStats {
        &self.shared.stats
    }

    /// Queue the bridge channels of `buffer` (input channels 0 and 1).
    ///
    /// Returns `true` if every frame of the block was queued.
    #[inline]
    pub fn push_buffer<S: Sample>(&mut self, buffer: &Buffer<'_, S>, sample_rate: f64) -> bool {
        self.push(buffer.input(0), buffer.input(1), buffer.num_samples(), sample_rate)
    }

    /// Queue one block.
    ///
    /// No-op (returns `false`) when nothing is attached or `frames` is 0.
    /// Blocks longer than `max_block_frames` are queued in pieces, each with
    /// its own header. A piece that does not fit is dropped and counted.
    pub fn push<S: Sample>(
        &mut self,
        ch0: Option<&[S]>,
        ch1: Option<&[S]>,
        frames: usize,
        sample_rate: f64,
    ) -> bool {
        let frames = [ch0, ch1]
            .iter()
            .flatten()
            .fold(frames, |n, channel| n.min(channel.len()));
        if frames == 0 || !self.is_attached() {
            return false;
        }

        let mut all_queued = true;
        let mut start = 0;
        while start < frames {
            let end = (start + self.max_block_frames).min(frames);
            all_queued &= self.push_piece(
                ch0.map(|c| &c[start..end]),
                ch1.map(|c| &c[start..end]),
                end - start,
                sample_rate,
            );
            start = end;
        }
        all_queued
    }

    fn push_piece<S: Sample>(
        &mut self,
        ch0: Option<&[S]>,
        ch1: Option<&[S]>,
        frames: usize,
        sample_rate: f64,
    ) -> bool {
        if self.frames.vacant_len() < frames || self.headers.is_full() {
            self.shared.stats.dropped.fetch_add(1, Ordering::Relaxed);
            return false;
        }

        let sample = |channel: Option<&[S]>, i: usize| channel.map_or(0.0, |c| c[i].to_f32());
        let right = ch1.or(ch0);
        let pushed = self.frames.push_iter((0..frames).map(|i| StereoFrame {
            left: sample(ch0, i),
            right: sample(right, i),
        }));
        debug_assert_eq!(pushed, frames);

        // Only this thread fills the header ring, so the vacancy checked above still holds.
        let header = BlockHeader {
            frames: pushed,
            sample_rate,
        };
        if self.headers.try_push(header).is_err() {
            self.shared.stats.dropped.fetch_add(1, Ordering::Relaxed);
            return false;
        }

        self.shared.stats.sent.fetch_add(1, Ordering::Relaxed);
        true
    }
}

/// Consumer end, owned by the UI thread.
pub struct TapReader {
    frames: HeapCons<StereoFrame>,
    headers: HeapCons<BlockHeader>,
    shared: Arc<Shared>,
}

impl TapReader {
    /// Start or stop accepting blocks on the audio side.
    pub fn set_attached(&self, attached: bool) {
        self.shared.attached.store(attached, Ordering::Release);
    }

    /// Whether the audio side is accepting blocks.
    pub fn is_attached(&self) -> bool {
        self.shared.attached.load(Ordering::Acquire)
    }

    /// Shared counters.
    pub fn stats(&self) -> &TapStats {
        &self.shared.stats
    }

    /// Blocks waiting to be popped.
    pub fn pending_blocks(&self) -> usize {
        self.headers.occupied_len()
    }

    /// Pop the oldest block into `frames` (cleared first).
    ///
    /// Returns `None` when no complete block is queued.
    pub fn pop_block(&mut self, frames: &mut Vec<StereoFrame>) -> Option<BlockHeader> {
        let header = self.headers.try_pop()?;
        frames.clear();
        frames.reserve(header.frames);
        for _ in 0..header.frames {
            match self.frames.try_pop() {
                Some(frame) => frames.push(frame),
                None => break,
            }
        }
        Some(header)
    }

    /// Discard every complete block that is queued. Returns how many.
    ///
    /// Frames of a block still being written stay in place with their
    /// header to follow, so the rings stay in step.
    pub fn discard_pending(&mut self) -> usize {
        let mut discarded = 0;
        while let Some(header) = self.headers.try_pop() {
            self.frames.skip(header.frames);
            discarded += 1;
        }
        discarded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attached(config: BridgeConfig) -> (AudioTap, TapReader) {
        let (tap, reader) = channel(config);
        reader.set_attached(true);
        (tap, reader)
    }

    #[test]
    fn test_detached_tap_is_noop() {
        let (mut tap, mut reader) = channel(BridgeConfig::default());
        let samples = [0.5f32; 4];

        assert!(!tap.push(Some(&samples[..]), None, 4, 48_000.0));
        assert_eq!(reader.pending_blocks(), 0);
        assert_eq!(tap.stats().sent(), 0);
        assert!(reader.pop_block(&mut Vec::new()).is_none());
    }

    #[test]
    fn test_zero_frames_is_noop() {
        let (mut tap, reader) = attached(BridgeConfig::default());
        assert!(!tap.push::<f32>(None, None, 0, 48_000.0));
        assert_eq!(reader.pending_blocks(), 0);
    }

    #[test]
    fn test_stereo_block() {
        let (mut tap, mut reader) = attached(BridgeConfig::default());
        let left = [0.1f32, 0.2, 0.3, 0.4];
        let right = [-0.1f32, -0.2, -0.3, -0.4];

        assert!(tap.push(Some(&left[..]), Some(&right[..]), 4, 44_100.0));

        let mut frames = Vec::new();
        let header = reader.pop_block(&mut frames).unwrap();
        assert_eq!(header.frames, 4);
        assert_eq!(header.sample_rate, 44_100.0);
        assert_eq!(frames.iter().map(|f| f.left).collect::<Vec<_>>(), left);
        assert_eq!(frames.iter().map(|f| f.right).collect::<Vec<_>>(), right);
    }

    #[test]
    fn test_mono_input_mirrors_left() {
        let (mut tap, mut reader) = attached(BridgeConfig::default());
        let mono = [0.5f64, -0.25];

        tap.push(Some(&mono[..]), None, 2, 48_000.0);

        let mut frames = Vec::new();
        reader.pop_block(&mut frames).unwrap();
        assert!(frames.iter().all(|f| f.left == f.right));
        assert_eq!(frames[1].left, -0.25);
    }

    #[test]
    fn test_missing_first_channel_keeps_second_on_right() {
        let (mut tap, mut reader) = attached(BridgeConfig::default());
        let ch1 = [0.75f32; 3];

        tap.push(None, Some(&ch1[..]), 3, 48_000.0);

        let mut frames = Vec::new();
        reader.pop_block(&mut frames).unwrap();
        assert!(frames.iter().all(|f| f.left == 0.0 && f.right == 0.75));
    }

    #[test]
    fn test_no_input_is_silent() {
        let (mut tap, mut reader) = attached(BridgeConfig::default());

        tap.push::<f32>(None, None, 5, 48_000.0);

        let mut frames = Vec::new();
        let header = reader.pop_block(&mut frames).unwrap();
        assert_eq!(header.frames, 5);
        assert!(frames.iter().all(|f| *f == StereoFrame::default()));
    }

    #[test]
    fn test_full_ring_drops_newest_block() {
        let config = BridgeConfig {
            max_block_frames: 4,
            queued_blocks: 2,
        };
        let (mut tap, mut reader) = attached(config);
        let first = [1.0f32; 4];
        let second = [2.0f32; 4];
        let third = [3.0f32; 4];

        assert!(tap.push(Some(&first[..]), None, 4, 48_000.0));
        assert!(tap.push(Some(&second[..]), None, 4, 48_000.0));
        assert!(!tap.push(Some(&third[..]), None, 4, 48_000.0));

        assert_eq!(tap.stats().sent(), 2);
        assert_eq!(tap.stats().dropped(), 1);

        let mut frames = Vec::new();
        reader.pop_block(&mut frames).unwrap();
        assert_eq!(frames[0].left, 1.0);
        reader.pop_block(&mut frames).unwrap();
        assert_eq!(frames[0].left, 2.0);
        assert!(reader.pop_block(&mut frames).is_none());
    }

    #[test]
    fn test_long_block_is_split() {
        let config = BridgeConfig {
            max_block_frames: 3,
            queued_blocks: 4,
        };
        let (mut tap, mut reader) = attached(config);
        let samples: Vec<f32> = (0..7).map(|i| i as f32).collect();

        assert!(tap.push(Some(&samples[..]), None, 7, 48_000.0));
        assert_eq!(reader.pending_blocks(), 3);

        let mut frames = Vec::new();
        let mut collected = Vec::new();
        while reader.pop_block(&mut frames).is_some() {
            collected.extend(frames.iter().map(|f| f.left));
        }
        assert_eq!(collected, samples);
    }

    #[test]
    fn test_largest_host_block_stays_whole() {
        let (mut tap, mut reader) = attached(BridgeConfig::default());
        let samples = vec![0.25f32; MAX_BLOCK_FRAMES];

        assert!(tap.push(Some(&samples[..]), None, MAX_BLOCK_FRAMES, 48_000.0));
        assert_eq!(reader.pending_blocks(), 1);

        let mut frames = Vec::new();
        assert_eq!(reader.pop_block(&mut frames).unwrap().frames, MAX_BLOCK_FRAMES);
    }

    #[test]
    fn test_frames_clamped_to_channel_length() {
        let (mut tap, mut reader) = attached(BridgeConfig::default());
        let short = [0.1f32; 2];

        tap.push(Some(&short[..]), None, 16, 48_000.0);

        let mut frames = Vec::new();
        assert_eq!(reader.pop_block(&mut frames).unwrap().frames, 2);
    }

    #[test]
    fn test_discard_pending() {
        let (mut tap, mut reader) = attached(BridgeConfig::default());
        let samples = [0.0f32; 8];
        tap.push(Some(&samples[..]), None, 8, 48_000.0);
        tap.push(Some(&samples[..]), None, 8, 48_000.0);

        assert_eq!(reader.discard_pending(), 2);
        assert_eq!(reader.pending_blocks(), 0);

        // Capacity is fully available again
        let big = vec![0.0f32; BridgeConfig::default().frame_capacity()];
        assert!(tap.push(Some(&big[..]), None, big.len(), 48_000.0));
    }

    #[test]
    fn test_config_sanitized_and_serde() {
        let config: BridgeConfig = serde_json::from_str(r#"{"queued_blocks": 0}"#).unwrap();
        let config = config.sanitized();
        assert_eq!(config.queued_blocks, 1);
        assert_eq!(config.max_block_frames, BridgeConfig::default().max_block_frames);

        let huge = BridgeConfig {
            max_block_frames: 1 << 20,
            queued_blocks: 2,
        };
        assert_eq!(huge.sanitized().max_block_frames, MAX_BLOCK_FRAMES);
    }

    #[test]
    fn test_stats_snapshot_serializes() {
        let stats = TapStats::default();
        stats.record_delivered();
        stats.record_delivery_failure();

        let json = serde_json::to_value(stats.snapshot()).unwrap();
        assert_eq!(json["delivered"], 1);
        assert_eq!(json["delivery_failures"], 1);
        assert_eq!(json["dropped"], 0);
    }
}
