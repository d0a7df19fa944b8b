use std::sync::Arc;
use parking_lot::Mutex;

/// Pool of reusable byte buffers for per-search scratch allocations
/// (`bestSegments`, the LCS/word-hit cache). Modeled on the reference
/// engine's buffer-pool concept, but redesigned (see REDESIGN FLAGS) as a
/// safe, heap-backed `Vec<u8>` store behind a mutex instead of raw
/// `alloc`/`dealloc` pointers behind atomics: identical pooling/reuse
/// behavior, no `unsafe`.
pub struct ScratchArena {
    inner: Mutex<Vec<Vec<u8>>>,
}

impl ScratchArena {
    pub fn new() -> Self {
        ScratchArena { inner: Mutex::new(Vec::new()) }
    }

    /// Checks out a zeroed buffer of at least `size` bytes, reusing a
    /// pooled one if available. Released back to the pool when the
    /// returned guard drops, on every exit path of the borrowing call.
    pub fn checkout(self: &Arc<Self>, size: usize) -> ScratchBuffer {
        let mut buf = {
            let mut pool = self.inner.lock();
            pool.pop().unwrap_or_default()
        };
        buf.clear();
        buf.resize(size, 0);
        ScratchBuffer { buf: Some(buf), arena: Arc::clone(self) }
    }
}

impl Default for ScratchArena {
    fn default() -> Self {
        Self::new()
    }
}

/// An arena-owned buffer, returned to its pool on drop regardless of
/// whether the borrowing search call returned normally, early, or via a
/// propagated error.
pub struct ScratchBuffer {
    buf: Option<Vec<u8>>,
    arena: Arc<ScratchArena>,
}

impl ScratchBuffer {
    pub fn as_slice(&self) -> &[u8] {
        self.buf.as_deref().unwrap_or(&[])
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        self.buf.as_deref_mut().unwrap_or(&mut [])
    }
}

impl Drop for ScratchBuffer {
    fn drop(&mut self) {
        if let Some(buf) = self.buf.take() {
            self.arena.inner.lock().push(buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checked_out_buffers_are_zeroed_and_sized() {
        let arena = Arc::new(ScratchArena::new());
        let mut buf = arena.checkout(16);
        assert_eq!(buf.as_slice().len(), 16);
        assert!(buf.as_slice().iter().all(|&b| b == 0));
        buf.as_mut_slice()[0] = 42;
    }

    #[test]
    fn dropped_buffers_are_returned_to_the_pool() {
        let arena = Arc::new(ScratchArena::new());
        {
            let _buf = arena.checkout(64);
        }
        assert_eq!(arena.inner.lock().len(), 1);
        let buf2 = arena.checkout(8);
        assert_eq!(arena.inner.lock().len(), 0);
        drop(buf2);
        assert_eq!(arena.inner.lock().len(), 1);
    }
}
