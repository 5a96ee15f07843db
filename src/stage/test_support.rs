//! Shared fixtures for stage tests: an in-memory upstream stage and a
//! drop-counting probe.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::models::DecoderSpec;
use crate::stage::Stage;

/// Interleaved ramp signal: frame `f`, channel `c` holds `(f * channels + c)`.
/// Every sample is distinct, which makes frame accounting mistakes visible.
pub fn ramp_frames(frames: usize, channels: usize) -> Vec<f32> {
    (0..frames * channels).map(|i| i as f32).collect()
}

/// In-memory upstream stage serving pre-rendered raw frames, with loop and
/// rewind support matching the stage contract.
pub struct BufferStage {
    data: Vec<u8>,
    frame_size: usize,
    pos: usize,
    looping: bool,
}

impl BufferStage {
    pub fn new(data: Vec<u8>, spec: DecoderSpec) -> Self {
        let frame_size = spec.frame_size();
        assert_eq!(data.len() % frame_size, 0, "data must hold whole frames");
        Self {
            data,
            frame_size,
            pos: 0,
            looping: false,
        }
    }

    pub fn from_f32(samples: &[f32], spec: DecoderSpec) -> Self {
        let data = samples.iter().flat_map(|s| s.to_ne_bytes()).collect();
        Self::new(data, spec)
    }

    pub fn from_i16(samples: &[i16], spec: DecoderSpec) -> Self {
        let data = samples.iter().flat_map(|s| s.to_ne_bytes()).collect();
        Self::new(data, spec)
    }
}

impl Stage for BufferStage {
    fn get_samples(&mut self, buffer: &mut [u8], frames: usize) -> usize {
        let total = self.data.len() / self.frame_size;
        let mut done = 0;
        loop {
            let take = (total - self.pos).min(frames - done);
            buffer[done * self.frame_size..(done + take) * self.frame_size].copy_from_slice(
                &self.data[self.pos * self.frame_size..(self.pos + take) * self.frame_size],
            );
            self.pos += take;
            done += take;
            if done != frames && self.looping && total > 0 {
                self.pos = 0;
            } else {
                break;
            }
        }
        done
    }

    fn rewind(&mut self) {
        self.pos = 0;
    }

    fn set_loop(&mut self, looping: bool) {
        self.looping = looping;
    }
}

/// Wraps a stage and counts how many times it is dropped, for teardown tests.
pub struct DropProbe {
    inner: BufferStage,
    drops: Arc<AtomicUsize>,
}

impl DropProbe {
    pub fn new(inner: BufferStage, drops: Arc<AtomicUsize>) -> Self {
        Self { inner, drops }
    }
}

impl Stage for DropProbe {
    fn get_samples(&mut self, buffer: &mut [u8], frames: usize) -> usize {
        self.inner.get_samples(buffer, frames)
    }

    fn rewind(&mut self) {
        self.inner.rewind();
    }

    fn set_loop(&mut self, looping: bool) {
        self.inner.set_loop(looping);
    }
}

impl Drop for DropProbe {
    fn drop(&mut self) {
        self.drops.fetch_add(1, Ordering::SeqCst);
    }
}
