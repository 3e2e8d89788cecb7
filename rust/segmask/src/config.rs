//! Tunables for the parallel construction and set-algebra passes.

/// Smallest number of elements handed to a single task.
pub const MIN_GRAIN_SIZE: usize = 64;

/// Largest number of elements handed to a single task.
pub const MAX_GRAIN_SIZE: usize = 1 << 17;

/// Grain size used when the caller does not pick one.
pub const DEFAULT_GRAIN_SIZE: usize = 4096;

/// Minimum amount of work, in elements, assigned to one task.
///
/// Always within `[MIN_GRAIN_SIZE, MAX_GRAIN_SIZE]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GrainSize(usize);

impl GrainSize {
    /// Creates a grain size, clamping `size` into the supported bounds.
    pub fn new(size: usize) -> GrainSize {
        GrainSize(size.clamp(MIN_GRAIN_SIZE, MAX_GRAIN_SIZE))
    }

    #[inline]
    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for GrainSize {
    fn default() -> Self {
        GrainSize(DEFAULT_GRAIN_SIZE)
    }
}

impl From<usize> for GrainSize {
    fn from(size: usize) -> Self {
        GrainSize::new(size)
    }
}

/// Controls how an operation splits its input across worker threads.
///
/// Work runs on rayon's global pool. Thread-local results are always merged
/// in input order, so the produced index set does not depend on these
/// settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionConfig {
    /// Minimum number of elements per task.
    pub grain_size: GrainSize,
    /// Upper bound on the number of tasks running at once. `Some(0)` and
    /// `Some(1)` force sequential execution; `None` lets the pool decide.
    pub max_threads: Option<usize>,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        ExecutionConfig {
            grain_size: GrainSize::default(),
            max_threads: None,
        }
    }
}

impl ExecutionConfig {
    /// A configuration that never leaves the calling thread.
    pub fn sequential() -> ExecutionConfig {
        ExecutionConfig {
            grain_size: GrainSize::default(),
            max_threads: Some(1),
        }
    }

    pub fn with_grain_size(mut self, grain_size: impl Into<GrainSize>) -> ExecutionConfig {
        self.grain_size = grain_size.into();
        self
    }

    pub fn with_max_threads(mut self, max_threads: Option<usize>) -> ExecutionConfig {
        self.max_threads = max_threads;
        self
    }

    /// Returns `true` if `len` elements are worth splitting across threads.
    pub fn is_parallel_for(&self, len: usize) -> bool {
        self.max_threads.is_none_or(|n| n > 1) && len > self.grain_size.get()
    }

    /// Number of elements per task for an input of `len` elements.
    ///
    /// At least one grain; large enough that the task count never exceeds
    /// `max_threads`.
    pub fn chunk_len(&self, len: usize) -> usize {
        let grain = self.grain_size.get();
        match self.max_threads {
            Some(n) if n > 1 => grain.max(len.div_ceil(n)),
            Some(_) => len.max(1),
            None => grain,
        }
    }
}
