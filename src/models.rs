use serde::{Deserialize, Serialize};

/// Number of channels every predecoded artifact is baked with.
pub const CANONICAL_CHANNELS: u16 = 2;

/// Sample format every predecoded artifact is baked with.
pub const CANONICAL_FORMAT: SampleFormat = SampleFormat::F32;

/// Upper bound on the channel count a stage will accept.
///
/// Keeps the widest possible frame within the fixed staging buffer used by
/// the resampling stage; see `stage::resample`.
pub const MAX_CHANNELS: u16 = 32;

/// PCM sample formats understood by the pipeline
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SampleFormat {
    S16,
    S32,
    F32,
}

impl SampleFormat {
    /// Size of a single sample of this format in bytes
    pub fn bytes_per_sample(&self) -> usize {
        match self {
            SampleFormat::S16 => 2,
            SampleFormat::S32 => 4,
            SampleFormat::F32 => 4,
        }
    }

    /// Get a human-readable name for the format
    pub fn name(&self) -> &'static str {
        match self {
            SampleFormat::S16 => "16-bit signed",
            SampleFormat::S32 => "32-bit signed",
            SampleFormat::F32 => "32-bit float",
        }
    }
}

impl std::fmt::Display for SampleFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Describes one PCM stream flowing between stages.
///
/// In a *wanted* spec, a zero sample rate or channel count means "same as
/// upstream" and is resolved with [`DecoderSpec::resolve`] before any
/// converter is configured. A spec describing an actual upstream stage must
/// be concrete.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DecoderSpec {
    pub sample_rate: u32,
    pub channel_count: u16,
    pub format: SampleFormat,
    /// Carried through for downstream decoder selection; not interpreted here.
    pub complex: bool,
}

impl DecoderSpec {
    pub fn new(sample_rate: u32, channel_count: u16, format: SampleFormat) -> Self {
        Self {
            sample_rate,
            channel_count,
            format,
            complex: false,
        }
    }

    /// The canonical bake format: float samples, stereo, at the given rate.
    /// A zero rate keeps the upstream rate once resolved.
    pub fn canonical(sample_rate: u32) -> Self {
        Self::new(sample_rate, CANONICAL_CHANNELS, CANONICAL_FORMAT)
    }

    /// Size of one frame (one sample per channel) in bytes
    pub fn frame_size(&self) -> usize {
        self.format.bytes_per_sample() * self.channel_count as usize
    }

    /// Fill zero-valued fields from the upstream spec, producing a concrete spec.
    pub fn resolve(&self, upstream: &DecoderSpec) -> DecoderSpec {
        DecoderSpec {
            sample_rate: if self.sample_rate == 0 {
                upstream.sample_rate
            } else {
                self.sample_rate
            },
            channel_count: if self.channel_count == 0 {
                upstream.channel_count
            } else {
                self.channel_count
            },
            format: self.format,
            complex: self.complex,
        }
    }

    /// Check whether every field holds a concrete (non-zero) value
    pub fn is_concrete(&self) -> bool {
        self.sample_rate > 0 && self.channel_count > 0
    }
}

impl std::fmt::Display for DecoderSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} - {} Hz - {} channel{}",
            self.format,
            self.sample_rate,
            self.channel_count,
            if self.channel_count == 1 { "" } else { "s" }
        )
    }
}
