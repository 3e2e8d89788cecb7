//! Arena owning the memory behind segmented index sets.
//!
//! Index sets never own memory: offset arrays, cumulative size tables and
//! segment tables live in an [`IndexArena`] and the sets borrow them for the
//! arena's lifetime. The arena only grows. Everything it holds is released at
//! once when the arena is dropped.
//!
//! Allocation takes `&self`, so any number of sets can be built from one arena
//! while earlier sets remain in use, and worker threads can allocate through a
//! shared reference. Buffers built on worker threads are adopted without a
//! copy.

use std::ptr::NonNull;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::error::{Error, Result};
use crate::segment::Segment;

/// Storage for the offset arrays, size tables and segment tables of one or
/// more [`IndexSet`](crate::IndexSet)s.
///
/// Returned slices stay valid and unchanged until the arena is dropped. The
/// arena is `Send + Sync`.
pub struct IndexArena {
    offsets: ChunkList<u16>,
    sizes: ChunkList<i64>,
    segments: ChunkList<Segment<'static>>,
    allocated_bytes: AtomicUsize,
}

impl IndexArena {
    pub fn new() -> IndexArena {
        IndexArena {
            offsets: ChunkList::new(),
            sizes: ChunkList::new(),
            segments: ChunkList::new(),
            allocated_bytes: AtomicUsize::new(0),
        }
    }

    /// Copies `values` into the arena.
    pub fn alloc_offsets(&self, values: &[u16]) -> &[u16] {
        self.adopt_offsets(values.to_vec())
    }

    /// Copies `values` into the arena, reporting allocation failure instead of
    /// aborting.
    pub fn try_alloc_offsets(&self, values: &[u16]) -> Result<&[u16]> {
        let buf = try_copy(values, "segment offsets")?;
        Ok(self.adopt_offsets(buf))
    }

    /// Takes ownership of `values` without copying them.
    pub fn adopt_offsets(&self, values: Vec<u16>) -> &[u16] {
        let ptr = self.adopt(&self.offsets, values);
        // SAFETY: the chunk stays alive and untouched until `self` is dropped.
        unsafe { &*ptr.as_ptr() }
    }

    /// Takes ownership of a cumulative size table without copying it.
    pub fn adopt_sizes(&self, values: Vec<i64>) -> &[i64] {
        let ptr = self.adopt(&self.sizes, values);
        // SAFETY: the chunk stays alive and untouched until `self` is dropped.
        unsafe { &*ptr.as_ptr() }
    }

    /// Copies a cumulative size table into the arena, reporting allocation
    /// failure instead of aborting.
    pub fn try_alloc_sizes(&self, values: &[i64]) -> Result<&[i64]> {
        let buf = try_copy(values, "segment sizes")?;
        Ok(self.adopt_sizes(buf))
    }

    /// Takes ownership of a segment table.
    ///
    /// The segments may reference memory that lives at least as long as the
    /// arena borrow; the returned table is valid for that same borrow.
    pub fn adopt_segments<'a>(&'a self, segments: Vec<Segment<'a>>) -> &'a [Segment<'a>] {
        if segments.is_empty() {
            return &[];
        }
        self.track::<Segment<'a>>(segments.len());
        let leaked: &'a mut [Segment<'a>] = Box::leak(segments.into_boxed_slice());
        let ptr = NonNull::from(leaked);
        // SAFETY: only the lifetime parameter changes. The stored chunk is never
        // read through the erased type; it is only freed on drop, and every
        // reference handed out is bounded by `'a`.
        let erased = unsafe { NonNull::new_unchecked(ptr.as_ptr() as *mut [Segment<'static>]) };
        self.segments.push(Chunk { ptr: erased });
        // SAFETY: see `adopt_offsets`.
        unsafe { &*ptr.as_ptr() }
    }

    /// Total bytes held by the arena.
    pub fn allocated_bytes(&self) -> usize {
        self.allocated_bytes.load(Ordering::Relaxed)
    }

    /// Number of separate buffers held by the arena.
    pub fn chunk_count(&self) -> usize {
        self.offsets.len() + self.sizes.len() + self.segments.len()
    }

    fn adopt<T>(&self, list: &ChunkList<T>, values: Vec<T>) -> NonNull<[T]> {
        self.track::<T>(values.len());
        let chunk = Chunk::new(values.into_boxed_slice());
        let ptr = chunk.ptr;
        if !ptr.is_empty() {
            list.push(chunk);
        }
        ptr
    }

    fn track<T>(&self, len: usize) {
        self.allocated_bytes
            .fetch_add(len * std::mem::size_of::<T>(), Ordering::Relaxed);
    }
}

impl Default for IndexArena {
    fn default() -> Self {
        IndexArena::new()
    }
}

impl std::fmt::Debug for IndexArena {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexArena")
            .field("chunks", &self.chunk_count())
            .field("allocated_bytes", &self.allocated_bytes())
            .finish()
    }
}

fn try_copy<T: Copy>(values: &[T], context: &str) -> Result<Vec<T>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(values.len())
        .map_err(|_| Error::out_of_memory(context, std::mem::size_of_val(values)))?;
    buf.extend_from_slice(values);
    Ok(buf)
}

/// A leaked boxed slice, reclaimed on drop.
struct Chunk<T> {
    ptr: NonNull<[T]>,
}

impl<T> Chunk<T> {
    fn new(values: Box<[T]>) -> Chunk<T> {
        Chunk {
            ptr: NonNull::from(Box::leak(values)),
        }
    }
}

impl<T> Drop for Chunk<T> {
    fn drop(&mut self) {
        // SAFETY: `ptr` came from `Box::leak` and is freed exactly once.
        drop(unsafe { Box::from_raw(self.ptr.as_ptr()) });
    }
}

// SAFETY: a chunk is a uniquely owned boxed slice.
unsafe impl<T: Send> Send for Chunk<T> {}
// SAFETY: the arena only hands out shared references to chunk contents.
unsafe impl<T: Sync> Sync for Chunk<T> {}

struct ChunkList<T> {
    chunks: Mutex<Vec<Chunk<T>>>,
}

impl<T> ChunkList<T> {
    fn new() -> ChunkList<T> {
        ChunkList {
            chunks: Mutex::new(Vec::new()),
        }
    }

    fn push(&self, chunk: Chunk<T>) {
        self.chunks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(chunk);
    }

    fn len(&self) -> usize {
        self.chunks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
