//! Audio payload rendering.
//!
//! Each block becomes one guarded script for the page's analyzer intake:
//!
//! ```text
//! if (window.processDAWAudioBuffer && window.__pitchDetectorReady) {const left = new Float32Array([a,b,..]);
//! const right = new Float32Array([c,d,..]);
//! window.processDAWAudioBuffer(left, right, 48000.000000);}
//! ```
//!
//! Samples use six decimals, oldest first. The guard keeps the payload inert
//! until the page has both installed its intake and finished warming up.

use std::fmt::Write;

use rtaudio_core::StereoFrame;

/// Renders payloads into a reused buffer.
///
/// The buffer grows to the largest block seen and is then reused, so the
/// steady state does not allocate.
#[derive(Debug, Default)]
pub struct PayloadWriter {
    text: String,
}

impl PayloadWriter {
    /// Create a writer with room for `frames` frames per block.
    pub fn with_capacity(frames: usize) -> Self {
        // "-0.123456," is ten bytes, two channels, plus the fixed wrapper
        Self {
            text: String::with_capacity(frames * 2 * 10 + 192),
        }
    }

    /// Render one block and return the script.
    pub fn render(&mut self, frames: &[StereoFrame], sample_rate: f64) -> &str {
        let text = &mut self.text;
        text.clear();
        text.push_str("if (window.processDAWAudioBuffer && window.__pitchDetectorReady) {");

        text.push_str("const left = new Float32Array([");
        write_samples(text, frames.iter().map(|f| f.left));
        text.push_str("]);\n");

        text.push_str("const right = new Float32Array([");
        write_samples(text, frames.iter().map(|f| f.right));
        text.push_str("]);\n");

        text.push_str("window.processDAWAudioBuffer(left, right, ");
        write_number(text, sample_rate);
        text.push_str(");}");

        &self.text
    }
}

fn write_samples(text: &mut String, samples: impl Iterator<Item = f32>) {
    for (i, sample) in samples.enumerate() {
        if i > 0 {
            text.push(',');
        }
        write_number(text, f64::from(sample));
    }
}

/// Non-finite values are written as 0 so the script always parses.
fn write_number(text: &mut String, value: f64) {
    let value = if value.is_finite() { value } else { 0.0 };
    // Writing into a String cannot fail
    let _ = write!(text, "{value:.6}");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frames(left: &[f32], right: &[f32]) -> Vec<StereoFrame> {
        left.iter()
            .zip(right)
            .map(|(&left, &right)| StereoFrame { left, right })
            .collect()
    }

    #[test]
    fn test_render_stereo_block() {
        let block = frames(&[0.1, 0.2, 0.3, 0.4], &[-0.1, -0.2, -0.3, -0.4]);
        let mut writer = PayloadWriter::default();

        assert_eq!(
            writer.render(&block, 44_100.0),
            "if (window.processDAWAudioBuffer && window.__pitchDetectorReady) {\
             const left = new Float32Array([0.100000,0.200000,0.300000,0.400000]);\n\
             const right = new Float32Array([-0.100000,-0.200000,-0.300000,-0.400000]);\n\
             window.processDAWAudioBuffer(left, right, 44100.000000);}"
        );
    }

    #[test]
    fn test_render_empty_block() {
        let mut writer = PayloadWriter::default();
        let script = writer.render(&[], 48_000.0);

        assert!(script.contains("const left = new Float32Array([]);\n"));
        assert!(script.contains("const right = new Float32Array([]);\n"));
        assert!(script.ends_with("window.processDAWAudioBuffer(left, right, 48000.000000);}"));
    }

    #[test]
    fn test_non_finite_samples_render_as_zero() {
        let block = frames(&[f32::NAN, f32::INFINITY], &[f32::NEG_INFINITY, 1.0]);
        let mut writer = PayloadWriter::default();
        let script = writer.render(&block, 48_000.0);

        assert!(script.contains("[0.000000,0.000000]"));
        assert!(script.contains("[0.000000,1.000000]"));
        assert!(!script.contains("NaN"));
        assert!(!script.contains("inf"));
    }

    #[test]
    fn test_writer_reuses_buffer() {
        let block = frames(&[0.5; 64], &[0.5; 64]);
        let mut writer = PayloadWriter::with_capacity(64);
        writer.render(&block, 48_000.0);
        let capacity = writer.text.capacity();

        writer.render(&block, 48_000.0);
        assert_eq!(writer.text.capacity(), capacity);
    }

    #[test]
    fn test_sample_rate_has_six_decimals() {
        let mut writer = PayloadWriter::default();
        let script = writer.render(&frames(&[0.0], &[0.0]), 88_200.5);
        assert!(script.contains("(left, right, 88200.500000);"));
    }
}
