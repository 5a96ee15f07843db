use std::sync::Arc;
use std::time::Duration;

use log::info;

use crate::error::StageError;
use crate::logging::OperationTimer;
use crate::models::DecoderSpec;
use crate::stage::resample::ResampleStage;
use crate::stage::Stage;
use crate::stream::{MemoryStream, RoMemoryStream};

// Pull size for the bake loop, in bytes of canonical-format output
const BAKE_CHUNK_SIZE: usize = 0x1000;

/// A fully decoded source held in memory at the canonical format.
///
/// Produced once by [`PredecodedData::bake`], then used to construct any
/// number of independent [`Predecoder`] playback instances. Instances keep
/// their own shared view of the bytes, so the artifact record may be dropped
/// while they still play; the bytes live until the last reader is gone.
#[derive(Debug, Clone)]
pub struct PredecodedData {
    bytes: Arc<[u8]>,
    sample_rate: u32,
}

impl PredecodedData {
    /// Eagerly decode `upstream` to completion into memory.
    ///
    /// The upstream chain is wrapped in a resampling stage converting to the
    /// canonical format (float samples, stereo) at `target_sample_rate`, or
    /// at the upstream rate when `target_sample_rate` is 0. The upstream
    /// stage is always released before returning, on success and on failure
    /// alike.
    pub fn bake(
        upstream: Box<dyn Stage>,
        upstream_spec: &DecoderSpec,
        target_sample_rate: u32,
    ) -> Result<Self, StageError> {
        let timer = OperationTimer::new("predecode bake".to_string());

        let wanted = DecoderSpec::canonical(target_sample_rate);
        let mut stage = ResampleStage::new(upstream, false, &wanted, upstream_spec)?;

        let out_spec = stage.spec();
        let frame_size = out_spec.frame_size();
        let chunk_frames = BAKE_CHUNK_SIZE / frame_size;

        let mut stream = MemoryStream::new();
        let mut chunk = [0u8; BAKE_CHUNK_SIZE];
        loop {
            let frames_done =
                stage.get_samples(&mut chunk[..chunk_frames * frame_size], chunk_frames);
            if frames_done == 0 {
                break;
            }
            stream.write(&chunk[..frames_done * frame_size]);
        }

        info!(
            "Baked {} frames at {} Hz",
            stream.len() / frame_size,
            out_spec.sample_rate
        );
        timer.finish_with_threshold(Duration::from_millis(500));

        Ok(Self {
            bytes: stream.into_bytes().into(),
            sample_rate: out_spec.sample_rate,
        })
    }

    /// Sample rate the artifact was baked at
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Length of the decoded data in bytes
    pub fn len_bytes(&self) -> usize {
        self.bytes.len()
    }

    /// Length of the decoded data in canonical frames
    pub fn frames(&self) -> usize {
        self.bytes.len() / DecoderSpec::canonical(self.sample_rate).frame_size()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Playback stage over a baked artifact.
///
/// Serves reads directly from memory without re-invoking the original
/// decoder, with loop support. Output is always the canonical format at the
/// baked sample rate.
pub struct Predecoder {
    stream: RoMemoryStream,
    spec: DecoderSpec,
    looping: bool,
}

impl Predecoder {
    /// Create a playback instance over `data`. `wanted_spec` is accepted for
    /// interface uniformity but ignored: predecoded data's format is fixed by
    /// the bake phase, and `spec()` reports it.
    pub fn new(data: &PredecodedData, looping: bool, _wanted_spec: &DecoderSpec) -> Self {
        Self {
            stream: RoMemoryStream::new(Arc::clone(&data.bytes)),
            spec: DecoderSpec::canonical(data.sample_rate),
            looping,
        }
    }

    /// The output spec of this stage: canonical format at the baked rate
    pub fn spec(&self) -> DecoderSpec {
        self.spec
    }
}

impl Stage for Predecoder {
    fn get_samples(&mut self, buffer: &mut [u8], frames: usize) -> usize {
        let frame_size = self.spec.frame_size();
        let mut frames_done = 0;

        loop {
            let read = self
                .stream
                .read(&mut buffer[frames_done * frame_size..frames * frame_size]);
            frames_done += read / frame_size;

            // An empty artifact can never satisfy a looped read
            if frames_done != frames && self.looping && !self.stream.is_empty() {
                self.stream.rewind();
            } else {
                break;
            }
        }

        frames_done
    }

    fn rewind(&mut self) {
        self.stream.rewind();
    }

    fn set_loop(&mut self, looping: bool) {
        self.looping = looping;
    }
}
