//! Paging simulator: address translation, page faults and frame eviction
//! under pluggable replacement policies (FIFO, random, second chance, LRU).

pub mod config;
pub mod error;
pub mod event;
pub mod hardware;
pub mod kernel;
pub mod memory;
pub mod paging;
pub mod report;
pub mod ring;
pub mod trace;
pub mod workload;

pub use config::Config;
pub use error::{AuditError, ConfigError, TraceError};
pub use hardware::mmu::{INVALID_ADDRESS, Operation};
pub use kernel::{AccessResult, Kernel};
pub use paging::{Clock, Fifo, Lru, PageReplacementPolicy, PolicyKind, Random};
pub use trace::Reference;
