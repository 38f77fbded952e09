use std::fmt;

use crate::memory::FrameTable;

mod clock;
mod fifo;
mod lru;
mod random;

pub use clock::Clock;
pub use fifo::Fifo;
pub use lru::Lru;
pub use random::Random;

pub struct PageTable {
    pub entries: Vec<PageTableEntry>,
}
impl PageTable {
    pub fn new(page_count: usize) -> Self {
        let mut entries = Vec::with_capacity(page_count);
        for _ in 0..page_count {
            entries.push(PageTableEntry::new());
        }
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, vpn: Vpn) -> &PageTableEntry {
        &self.entries[vpn.0]
    }

    pub fn get_mut(&mut self, vpn: Vpn) -> &mut PageTableEntry {
        &mut self.entries[vpn.0]
    }

    /// Pages currently resident, in page-number order.
    pub fn resident(&self) -> impl Iterator<Item = (Vpn, &PageTableEntry)> + '_ {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, pte)| pte.present)
            .map(|(vpn, pte)| (Vpn(vpn), pte))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Vpn(pub usize);

impl fmt::Display for Vpn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pfn(pub usize);

impl fmt::Display for Pfn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "F{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTableEntry {
    /// Meaningful only while `present` is set.
    pub pfn: Pfn,
    pub present: bool,
    pub referenced: bool,
    pub modified: bool,
    pub timestamp: u64,
}
impl PageTableEntry {
    pub fn new() -> Self {
        Self {
            pfn: Pfn(0),
            present: false,
            referenced: false,
            modified: false,
            timestamp: 0,
        }
    }
}

impl Default for PageTableEntry {
    fn default() -> Self {
        Self::new()
    }
}

/// Victim selection plus the bookkeeping hooks the memory manager calls on
/// every load and every access.
///
/// `pick_victim` is only called when every frame is occupied, so the
/// occupied ring is never empty there. Implementations may move the
/// occupied-ring anchor and touch their own per-page bits, but the eviction
/// itself is done by the caller.
pub trait PageReplacementPolicy {
    fn name(&self) -> &'static str;

    fn pick_victim(&mut self, frame_table: &mut FrameTable, page_table: &mut PageTable) -> Vpn;

    /// Called after `pte` has been given a frame, either a free one or a
    /// victim's.
    fn on_load(&mut self, _pte: &mut PageTableEntry) {}

    /// Called once per translated access, after any fault has been resolved.
    /// `hit` is false for the access that triggered the load.
    fn on_access(&mut self, _pte: &mut PageTableEntry, _hit: bool) {}

    /// Policy-specific state for the replacement report.
    fn report(&self, _frame_table: &FrameTable, _page_table: &PageTable) -> String {
        format!("{} (no specific information)", self.name())
    }
}

/// The four policies, for picking one by name at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyKind {
    Fifo,
    Random,
    SecondChance,
    Lru,
}

impl PolicyKind {
    pub const ALL: [PolicyKind; 4] = [
        PolicyKind::Fifo,
        PolicyKind::Random,
        PolicyKind::SecondChance,
        PolicyKind::Lru,
    ];

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "fifo" => Some(PolicyKind::Fifo),
            "random" | "rand" => Some(PolicyKind::Random),
            "second-chance" | "fifo2ch" | "clock" => Some(PolicyKind::SecondChance),
            "lru" => Some(PolicyKind::Lru),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyKind::Fifo => "fifo",
            PolicyKind::Random => "random",
            PolicyKind::SecondChance => "second-chance",
            PolicyKind::Lru => "lru",
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
