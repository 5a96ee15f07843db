use std::sync::Arc;

/// Growable byte buffer with position tracking, used by the bake phase to
/// accumulate decoded frames.
#[derive(Debug, Default)]
pub struct MemoryStream {
    buf: Vec<u8>,
    pos: usize,
}

impl MemoryStream {
    pub fn new() -> Self {
        Self {
            buf: Vec::new(),
            pos: 0,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
            pos: 0,
        }
    }

    /// Write bytes at the current position, growing the buffer as needed.
    pub fn write(&mut self, data: &[u8]) {
        let end = self.pos + data.len();
        if end > self.buf.len() {
            self.buf.resize(end, 0);
        }
        self.buf[self.pos..end].copy_from_slice(data);
        self.pos = end;
    }

    /// Current position in bytes
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Total length of the accumulated buffer in bytes
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Reset the position to the start without discarding the buffer
    pub fn rewind(&mut self) {
        self.pos = 0;
    }

    /// Consume the stream, keeping only the accumulated bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// Read-only cursor over a shared byte buffer.
///
/// Cloning the cursor is cheap and gives an independent read position over
/// the same bytes; the underlying buffer lives as long as any cursor does.
#[derive(Debug, Clone)]
pub struct RoMemoryStream {
    data: Arc<[u8]>,
    pos: usize,
}

impl RoMemoryStream {
    pub fn new(data: Arc<[u8]>) -> Self {
        Self { data, pos: 0 }
    }

    /// Copy up to `dst.len()` bytes from the current position into `dst`.
    /// Returns the number of bytes actually copied.
    pub fn read(&mut self, dst: &mut [u8]) -> usize {
        let available = self.data.len() - self.pos;
        let to_read = dst.len().min(available);
        dst[..to_read].copy_from_slice(&self.data[self.pos..self.pos + to_read]);
        self.pos += to_read;
        to_read
    }

    /// Reset the read position to the start
    pub fn rewind(&mut self) {
        self.pos = 0;
    }

    /// Current read position in bytes
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Total length of the underlying buffer in bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bytes left between the current position and the end
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_stream_write_and_grow() {
        let mut stream = MemoryStream::new();
        assert!(stream.is_empty());
        assert_eq!(stream.position(), 0);

        stream.write(&[1, 2, 3]);
        assert_eq!(stream.len(), 3);
        assert_eq!(stream.position(), 3);

        stream.write(&[4, 5]);
        assert_eq!(stream.len(), 5);
        assert_eq!(stream.into_bytes(), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_memory_stream_rewind_overwrites() {
        let mut stream = MemoryStream::new();
        stream.write(&[1, 2, 3, 4]);

        stream.rewind();
        assert_eq!(stream.position(), 0);

        // Overwrite the first two bytes; the tail stays
        stream.write(&[9, 9]);
        assert_eq!(stream.position(), 2);
        assert_eq!(stream.len(), 4);
        assert_eq!(stream.into_bytes(), vec![9, 9, 3, 4]);
    }

    #[test]
    fn test_memory_stream_with_capacity() {
        let stream = MemoryStream::with_capacity(64);
        assert!(stream.is_empty());
        assert_eq!(stream.len(), 0);
    }

    #[test]
    fn test_ro_stream_sequential_read() {
        let data: Arc<[u8]> = vec![1u8, 2, 3, 4, 5, 6].into();
        let mut stream = RoMemoryStream::new(data);

        assert_eq!(stream.len(), 6);
        assert_eq!(stream.remaining(), 6);

        let mut dst = [0u8; 4];
        assert_eq!(stream.read(&mut dst), 4);
        assert_eq!(dst, [1, 2, 3, 4]);
        assert_eq!(stream.position(), 4);
        assert_eq!(stream.remaining(), 2);

        // Short read at the end
        let mut dst = [0u8; 4];
        assert_eq!(stream.read(&mut dst), 2);
        assert_eq!(&dst[..2], &[5, 6]);
        assert_eq!(stream.remaining(), 0);

        // Exhausted
        assert_eq!(stream.read(&mut dst), 0);
    }

    #[test]
    fn test_ro_stream_rewind() {
        let data: Arc<[u8]> = vec![7u8, 8, 9].into();
        let mut stream = RoMemoryStream::new(data);

        let mut dst = [0u8; 3];
        assert_eq!(stream.read(&mut dst), 3);
        assert_eq!(stream.read(&mut dst), 0);

        stream.rewind();
        assert_eq!(stream.read(&mut dst), 3);
        assert_eq!(dst, [7, 8, 9]);
    }

    #[test]
    fn test_ro_stream_independent_clones() {
        let data: Arc<[u8]> = vec![1u8, 2, 3, 4].into();
        let mut a = RoMemoryStream::new(data);
        let mut b = a.clone();

        let mut dst = [0u8; 2];
        assert_eq!(a.read(&mut dst), 2);
        assert_eq!(a.position(), 2);

        // The clone keeps its own cursor
        assert_eq!(b.position(), 0);
        assert_eq!(b.read(&mut dst), 2);
        assert_eq!(dst, [1, 2]);
    }

    #[test]
    fn test_ro_stream_empty() {
        let data: Arc<[u8]> = Vec::new().into();
        let mut stream = RoMemoryStream::new(data);
        assert!(stream.is_empty());

        let mut dst = [0u8; 8];
        assert_eq!(stream.read(&mut dst), 0);
    }
}
