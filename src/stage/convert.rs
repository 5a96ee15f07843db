/*!
Streaming PCM format conversion between two concrete decoder specs.

Converts sample format (S16/S32/F32), channel layout, and sample rate in one
pass, operating on interleaved frames. Rate conversion uses linear
interpolation with the phase carried across calls, so sequential blocks
produce a continuous output with no clicks at chunk boundaries.

Unlike a grow-output resampler, `process` works against a fixed output
budget: it may consume fewer input frames than offered and produce fewer
output frames than requested, and reports both counts so the caller can
advance its cursors. Same-rate conversion is exact: every input frame is
emitted once, with no latency and no dropped tail frame.
*/

use crate::error::StageError;
use crate::models::{DecoderSpec, SampleFormat, MAX_CHANNELS};

/// Sample-format, channel-layout and sample-rate converter with streaming
/// phase state.
#[derive(Debug, Clone)]
pub struct FormatConverter {
    in_spec: DecoderSpec,
    out_spec: DecoderSpec,

    // Source frames advanced per output frame (in_rate / out_rate)
    step: f64,

    // Streaming state: `prev_frame` is the last retired source frame
    // (already remapped to the output channel layout); `pos` is the phase
    // past it, in source frames.
    pos: f64,
    prev_frame: [f32; MAX_CHANNELS as usize],
    have_prev: bool,
}

impl FormatConverter {
    /// Configure a converter for exactly the (in -> out) pair. Both specs
    /// must be concrete; resolve a wanted spec against the upstream spec
    /// before calling this.
    pub fn new(in_spec: DecoderSpec, out_spec: DecoderSpec) -> Result<Self, StageError> {
        if !in_spec.is_concrete() {
            return Err(StageError::InvalidSpec {
                reason: format!("upstream spec is not concrete: {}", in_spec),
            });
        }
        if !out_spec.is_concrete() {
            return Err(StageError::InvalidSpec {
                reason: format!("output spec is not concrete: {}", out_spec),
            });
        }
        if in_spec.channel_count > MAX_CHANNELS || out_spec.channel_count > MAX_CHANNELS {
            return Err(StageError::InvalidSpec {
                reason: format!(
                    "channel count exceeds supported maximum of {}",
                    MAX_CHANNELS
                ),
            });
        }

        Ok(Self {
            in_spec,
            out_spec,
            step: in_spec.sample_rate as f64 / out_spec.sample_rate as f64,
            pos: 0.0,
            prev_frame: [0.0; MAX_CHANNELS as usize],
            have_prev: false,
        })
    }

    pub fn in_spec(&self) -> &DecoderSpec {
        &self.in_spec
    }

    pub fn out_spec(&self) -> &DecoderSpec {
        &self.out_spec
    }

    /// Reconfigure the output rate in place. Phase state is preserved, so a
    /// running stream continues without a discontinuity.
    pub fn set_output_rate(&mut self, sample_rate: u32) {
        self.out_spec.sample_rate = sample_rate;
        self.step = self.in_spec.sample_rate as f64 / sample_rate as f64;
    }

    /// Drop all streaming state, as after a rewind.
    pub fn reset(&mut self) {
        self.pos = 0.0;
        self.have_prev = false;
    }

    /// Convert whole input frames against an output-frame budget.
    ///
    /// `input` must hold whole frames of the input format; `output` receives
    /// whole frames of the output format. Returns `(consumed, produced)`
    /// frame counts - both are authoritative and may be smaller than what was
    /// offered or requested.
    pub fn process(
        &mut self,
        input: &[u8],
        output: &mut [u8],
        max_out_frames: usize,
    ) -> (usize, usize) {
        let in_frame = self.in_spec.frame_size();
        let out_frame = self.out_spec.frame_size();
        let ch_out = self.out_spec.channel_count as usize;
        let n_in = input.len() / in_frame;
        let budget = max_out_frames.min(output.len() / out_frame);

        let mut consumed = 0;
        let mut produced = 0;

        if !self.have_prev {
            if n_in == 0 {
                return (0, 0);
            }
            decode_frame(&input[..in_frame], &self.in_spec, ch_out, &mut self.prev_frame);
            self.have_prev = true;
            consumed = 1;
            self.pos = 0.0;
        }

        let mut next_frame = [0.0f32; MAX_CHANNELS as usize];
        loop {
            // Retire source frames the phase has fully passed
            while self.pos >= 1.0 {
                if consumed == n_in {
                    return (consumed, produced);
                }
                decode_frame(
                    &input[consumed * in_frame..(consumed + 1) * in_frame],
                    &self.in_spec,
                    ch_out,
                    &mut self.prev_frame,
                );
                consumed += 1;
                self.pos -= 1.0;
            }

            if produced == budget {
                break;
            }

            let frac = self.pos as f32;
            let dst = &mut output[produced * out_frame..(produced + 1) * out_frame];
            if frac == 0.0 {
                // Exact phase hit: emit the retired frame as-is
                encode_frame(&self.prev_frame[..ch_out], self.out_spec.format, dst);
            } else {
                if consumed == n_in {
                    // Interpolation needs a lookahead frame we don't have yet
                    break;
                }
                decode_frame(
                    &input[consumed * in_frame..(consumed + 1) * in_frame],
                    &self.in_spec,
                    ch_out,
                    &mut next_frame,
                );
                let mut mixed = [0.0f32; MAX_CHANNELS as usize];
                for c in 0..ch_out {
                    let s0 = self.prev_frame[c];
                    let s1 = next_frame[c];
                    mixed[c] = s0 + (s1 - s0) * frac;
                }
                encode_frame(&mixed[..ch_out], self.out_spec.format, dst);
            }
            produced += 1;
            self.pos += self.step;
        }

        (consumed, produced)
    }
}

/// Decode one raw input frame to f32 and remap it to `ch_out` channels.
/// Mono is fanned out to every output channel; otherwise overlapping
/// channels are copied and the remainder silenced.
fn decode_frame(frame: &[u8], in_spec: &DecoderSpec, ch_out: usize, dst: &mut [f32]) {
    let ch_in = in_spec.channel_count as usize;
    let bps = in_spec.format.bytes_per_sample();

    let mut samples = [0.0f32; MAX_CHANNELS as usize];
    for (c, sample) in samples.iter_mut().enumerate().take(ch_in) {
        let bytes = &frame[c * bps..(c + 1) * bps];
        *sample = match in_spec.format {
            SampleFormat::S16 => {
                i16::from_ne_bytes([bytes[0], bytes[1]]) as f32 / 32768.0
            }
            SampleFormat::S32 => {
                i32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as f32
                    / 2147483648.0
            }
            SampleFormat::F32 => f32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
        };
    }

    for c in 0..ch_out {
        dst[c] = if ch_in == 1 {
            samples[0]
        } else if c < ch_in {
            samples[c]
        } else {
            0.0
        };
    }
}

/// Encode one f32 frame into the output sample format, clamping to range.
fn encode_frame(src: &[f32], format: SampleFormat, dst: &mut [u8]) {
    let bps = format.bytes_per_sample();
    for (c, &sample) in src.iter().enumerate() {
        let bytes = &mut dst[c * bps..(c + 1) * bps];
        match format {
            SampleFormat::S16 => {
                let v = (sample.clamp(-1.0, 1.0) * 32767.0) as i16;
                bytes.copy_from_slice(&v.to_ne_bytes());
            }
            SampleFormat::S32 => {
                let v = (sample.clamp(-1.0, 1.0) * 2147483647.0) as i32;
                bytes.copy_from_slice(&v.to_ne_bytes());
            }
            SampleFormat::F32 => {
                bytes.copy_from_slice(&sample.to_ne_bytes());
            }
        }
    }
}
