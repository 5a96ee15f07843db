use log::{debug, warn};

use crate::error::StageError;
use crate::models::{DecoderSpec, MAX_CHANNELS};
use crate::stage::convert::FormatConverter;
use crate::stage::Stage;

/// Capacity of the raw staging buffer holding upstream frames between
/// conversion calls.
pub const STAGING_BUFFER_SIZE: usize = 0x1000;

// The widest representable frame (MAX_CHANNELS samples of 4 bytes) must fit
// the staging buffer.
const _: () = assert!(MAX_CHANNELS as usize * 4 <= STAGING_BUFFER_SIZE);

/// A stage that adapts one PCM format/rate/channel layout to another by
/// pulling from an upstream stage.
///
/// Raw upstream frames are staged in a fixed buffer; `done`/`end` cursors
/// (counted in upstream frames) mark the unconsumed region between
/// conversion calls. Looping is the upstream's responsibility: this stage
/// merely forwards `set_loop` and stops when the upstream reports
/// exhaustion.
pub struct ResampleStage {
    converter: FormatConverter,
    staging: Box<[u8; STAGING_BUFFER_SIZE]>,
    done: usize,
    end: usize,
    in_frame_size: usize,
    out_frame_size: usize,
    dynamic_rate: bool,
    // Declared last: the wrapper's own state drops before the upstream chain
    upstream: Box<dyn Stage>,
}

impl ResampleStage {
    /// Wrap `upstream`, taking ownership of it, and configure a converter for
    /// the (upstream -> wanted) pair. Zero-valued fields in `wanted` inherit
    /// the upstream value. On failure the upstream stage is released before
    /// returning; the caller must not destroy it separately.
    pub fn new(
        upstream: Box<dyn Stage>,
        dynamic_rate: bool,
        wanted: &DecoderSpec,
        upstream_spec: &DecoderSpec,
    ) -> Result<Self, StageError> {
        let out_spec = wanted.resolve(upstream_spec);
        let converter = FormatConverter::new(*upstream_spec, out_spec)?;

        let in_frame_size = upstream_spec.frame_size();
        if in_frame_size > STAGING_BUFFER_SIZE {
            return Err(StageError::FrameTooLarge {
                frame_size: in_frame_size,
                capacity: STAGING_BUFFER_SIZE,
            });
        }

        debug!("Resample stage configured: {} -> {}", upstream_spec, out_spec);

        Ok(Self {
            converter,
            staging: Box::new([0; STAGING_BUFFER_SIZE]),
            done: 0,
            end: 0,
            in_frame_size,
            out_frame_size: out_spec.frame_size(),
            dynamic_rate,
            upstream,
        })
    }

    /// The concrete output spec this stage produces
    pub fn spec(&self) -> DecoderSpec {
        *self.converter.out_spec()
    }

    /// Change the output sample rate of a stage constructed with
    /// `dynamic_rate`. The converter is reconfigured in place; buffers and
    /// resampler phase are untouched. A zero rate restores the upstream rate.
    pub fn set_sample_rate(&mut self, sample_rate: u32) {
        if !self.dynamic_rate {
            warn!("set_sample_rate called on a stage without dynamic rate; ignoring");
            return;
        }
        let rate = if sample_rate == 0 {
            self.converter.in_spec().sample_rate
        } else {
            sample_rate
        };
        self.converter.set_output_rate(rate);
    }
}

impl Stage for ResampleStage {
    fn get_samples(&mut self, buffer: &mut [u8], frames: usize) -> usize {
        let mut frames_done = 0;

        while frames_done < frames {
            if self.done == self.end {
                // Staging buffer drained; refill from upstream
                self.done = 0;
                let capacity_frames = STAGING_BUFFER_SIZE / self.in_frame_size;
                self.end = self.upstream.get_samples(
                    &mut self.staging[..capacity_frames * self.in_frame_size],
                    capacity_frames,
                );
                if self.end == 0 {
                    return frames_done;
                }
            }

            let input = &self.staging[self.done * self.in_frame_size..self.end * self.in_frame_size];
            let output = &mut buffer[frames_done * self.out_frame_size..];
            let (consumed, produced) =
                self.converter
                    .process(input, output, frames - frames_done);

            self.done += consumed;
            frames_done += produced;
        }

        frames_done
    }

    fn rewind(&mut self) {
        self.upstream.rewind();
        // Staged frames and resampler phase belong to the old position
        self.done = 0;
        self.end = 0;
        self.converter.reset();
    }

    fn set_loop(&mut self, looping: bool) {
        self.upstream.set_loop(looping);
    }
}
