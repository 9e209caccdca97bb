//! Infallible byte sinks used by the encoding engine
//!
//! [`Target`] plays a role similar to [`std::io::Write`], with the key
//! difference that its push methods are total: they return the number
//! of bytes appended purely for book-keeping, never as a partial-write
//! or failure signal. This lets the encoder thread a running byte count
//! through the schema walk without inspecting results at every step.

/// Append-only byte buffer abstraction for encoding.
///
/// Implementors must make every `push_*` method infallible, with the
/// return value equal to the number of bytes logically appended.
pub trait Target {
    /// Pre-reserves capacity for `extra` upcoming bytes where the
    /// underlying buffer has a notion of capacity; otherwise a no-op.
    ///
    /// May be called with partial knowledge of the total write size, so
    /// further pushes and further `anticipate` calls should be expected.
    fn anticipate(&mut self, extra: usize);

    /// Returns a fresh, empty buffer of the `Self` type.
    fn create() -> Self;

    /// Appends a single byte. Always returns `1`.
    fn push_one(&mut self, b: u8) -> usize;

    /// Appends a fixed-size byte array. Always returns `N`, and must be
    /// equivalent to pushing each element in order with [`Target::push_one`].
    fn push_many<const N: usize>(&mut self, arr: [u8; N]) -> usize;

    /// Appends an arbitrary byte slice. Always returns `buf.len()`.
    fn push_all(&mut self, buf: &[u8]) -> usize;
}

/// Alias for [`std::io::Sink`] used to measure the serialized width of
/// a value without touching memory.
pub type ByteCounter = std::io::Sink;

impl Target for ByteCounter {
    #[inline(always)]
    fn anticipate(&mut self, _: usize) {}

    #[inline]
    fn create() -> Self {
        std::io::sink()
    }

    #[inline(always)]
    fn push_one(&mut self, _: u8) -> usize {
        1
    }

    #[inline(always)]
    fn push_many<const N: usize>(&mut self, _: [u8; N]) -> usize {
        N
    }

    #[inline(always)]
    fn push_all(&mut self, buf: &[u8]) -> usize {
        buf.len()
    }
}

impl Target for Vec<u8> {
    #[inline]
    fn anticipate(&mut self, extra: usize) {
        self.reserve(extra);
    }

    #[inline]
    fn create() -> Self {
        Self::new()
    }

    #[inline]
    fn push_one(&mut self, b: u8) -> usize {
        self.push(b);
        1
    }

    #[inline]
    fn push_many<const N: usize>(&mut self, arr: [u8; N]) -> usize {
        self.extend(&arr);
        N
    }

    #[inline]
    fn push_all(&mut self, buf: &[u8]) -> usize {
        self.extend_from_slice(buf);
        buf.len()
    }
}
