//! Logical memory buffer
//!
//! An owned, zero-initialized byte region standing in for a memory-mapped
//! area. Access is bounds-checked structurally: out-of-range offsets are
//! no-ops and reads/writes near the end are clamped, never errors.

use std::fmt;

/// Error raised when the logical buffer cannot be allocated
#[derive(Debug, Clone)]
pub enum BufferError {
    /// Allocation refused by the allocator
    AllocationFailed { requested: usize, message: String },
}

impl fmt::Display for BufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BufferError::AllocationFailed { requested, message } => {
                write!(f, "Failed to allocate {} byte buffer: {}", requested, message)
            }
        }
    }
}

impl std::error::Error for BufferError {}

/// Contiguous zero-initialized byte region of a fixed size
#[derive(Debug)]
pub struct LogicalBuffer {
    data: Vec<u8>,
}

impl LogicalBuffer {
    /// Allocate a zeroed buffer of `size` bytes
    ///
    /// Uses fallible allocation so an exhausted allocator surfaces as a
    /// recoverable error instead of an abort.
    pub fn new(size: usize) -> Result<Self, BufferError> {
        let mut data = Vec::new();
        data.try_reserve_exact(size)
            .map_err(|e| BufferError::AllocationFailed {
                requested: size,
                message: e.to_string(),
            })?;
        data.resize(size, 0);
        Ok(Self { data })
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Write `bytes` starting at `offset`, clamped to the buffer end.
    /// Returns the number of bytes written; an out-of-range offset writes
    /// nothing.
    pub fn write_at(&mut self, offset: usize, bytes: &[u8]) -> usize {
        if offset >= self.data.len() {
            return 0;
        }
        let available = self.data.len() - offset;
        let count = bytes.len().min(available);
        self.data[offset..offset + count].copy_from_slice(&bytes[..count]);
        count
    }

    /// Read up to `len` bytes starting at `offset`, clamped to the buffer
    /// end. An out-of-range offset yields an empty slice.
    pub fn read_at(&self, offset: usize, len: usize) -> &[u8] {
        if offset >= self.data.len() {
            return &[];
        }
        let end = (offset + len).min(self.data.len());
        &self.data[offset..end]
    }

    /// Fill up to `len` bytes with `byte` starting at `offset`, clamped.
    /// Returns the number of bytes filled.
    pub fn fill_at(&mut self, offset: usize, len: usize, byte: u8) -> usize {
        if offset >= self.data.len() {
            return 0;
        }
        let end = (offset + len).min(self.data.len());
        self.data[offset..end].fill(byte);
        end - offset
    }
}

/// Owner of the logical buffer's lifecycle
///
/// The buffer can be absent: after a failed allocation, or after release.
/// All access paths treat an absent buffer as a silent no-op.
#[derive(Debug, Default)]
pub struct BufferSlot {
    inner: Option<LogicalBuffer>,
}

impl BufferSlot {
    pub fn empty() -> Self {
        Self { inner: None }
    }

    /// Drop any existing buffer and allocate a fresh zeroed one of `size`
    /// bytes. On failure the slot is left unset.
    pub fn create(&mut self, size: usize) -> Result<(), BufferError> {
        self.inner = None;
        self.inner = Some(LogicalBuffer::new(size)?);
        Ok(())
    }

    /// Drop the buffer if present; idempotent
    pub fn release(&mut self) {
        self.inner = None;
    }

    pub fn is_ready(&self) -> bool {
        self.inner.is_some()
    }

    pub fn get(&self) -> Option<&LogicalBuffer> {
        self.inner.as_ref()
    }

    pub fn get_mut(&mut self) -> Option<&mut LogicalBuffer> {
        self.inner.as_mut()
    }
}
