//! Error types for the paging simulator.
//!
//! Page faults and illegal references are not errors; they are counted by
//! the kernel and never surface here.

use thiserror::Error;

/// Rejected machine configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("page size must be at least 1")]
    ZeroPageSize,

    #[error("the address space must have at least one page")]
    ZeroPages,

    #[error("physical memory must have at least one frame")]
    ZeroFrames,

    /// `count` units of `page_size` bytes do not fit in a 32-bit address.
    /// Physical memory must also leave the all-ones address unused.
    #[error("{count} {what} of {page_size} bytes exceed the 32-bit address range")]
    AddressSpaceOverflow {
        what: &'static str,
        count: u32,
        page_size: u32,
    },
}

/// Malformed reference trace. Line numbers are 1-based.
#[derive(Error, Debug)]
pub enum TraceError {
    #[error("line {line}: expected `<R|W> <address>`")]
    MissingField { line: usize },

    #[error("line {line}: unknown operation `{token}`")]
    InvalidOperation { line: usize, token: String },

    #[error("line {line}: invalid address `{token}`")]
    InvalidAddress { line: usize, token: String },

    #[error("line {line}: unexpected trailing field `{token}`")]
    TrailingField { line: usize, token: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A broken page table / frame table invariant.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuditError {
    #[error("frame F{frame} is linked into the rings more than once")]
    DuplicateFrame { frame: usize },

    #[error("frame F{frame} is in neither the free nor the occupied ring")]
    MissingFrame { frame: usize },

    #[error("free frame F{frame} still holds P{page}")]
    FreeFrameInUse { frame: usize, page: usize },

    #[error("occupied frame F{frame} holds no page")]
    EmptyOccupiedFrame { frame: usize },

    #[error("frame F{frame} holds P{page}, but P{page} is not mapped to it")]
    FrameMismatch { frame: usize, page: usize },

    #[error("P{page} is present in F{frame}, but F{frame} does not hold it")]
    PageMismatch { page: usize, frame: usize },
}
