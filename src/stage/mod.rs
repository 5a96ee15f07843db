pub mod convert;
pub mod predecode;
pub mod resample;

#[cfg(test)]
pub(crate) mod test_support;

pub use convert::FormatConverter;
pub use predecode::{PredecodedData, Predecoder};
pub use resample::ResampleStage;

/// One link in a chained decode pipeline.
///
/// A stage produces interleaved PCM frames on demand in the output format it
/// declares. Stages compose: a wrapping stage owns its upstream as a
/// `Box<dyn Stage>`, and dropping the wrapper releases the whole chain in
/// child-to-parent order.
pub trait Stage: Send {
    /// Write up to `frames` whole frames into `buffer` and return the number
    /// actually produced. `buffer` is caller-allocated and must hold at least
    /// `frames` frames of this stage's output format. A short count signals
    /// end of stream; 0 means exhausted with no loop in effect. Partial
    /// frames are never written.
    fn get_samples(&mut self, buffer: &mut [u8], frames: usize) -> usize;

    /// Reset the playback position to the start. Safe to call at any time,
    /// including before the first `get_samples`.
    fn rewind(&mut self);

    /// Toggle whether exhaustion automatically rewinds and continues. Takes
    /// effect on the next exhaustion event.
    fn set_loop(&mut self, looping: bool);
}
