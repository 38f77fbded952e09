use crate::{
    event::{Event, EventLog},
    hardware::mmu::{Mmu, Operation},
    paging::{PageReplacementPolicy, PageTable, PageTableEntry, Pfn, Vpn},
    ring::{Ring, RingIter},
};

pub struct MemoryManager<P: PageReplacementPolicy> {
    pub frame_table: FrameTable,
    pub mmu: Mmu,
    policy: P,
    pub stats: MemoryStats,
    pub events: EventLog,
}
impl<P: PageReplacementPolicy> MemoryManager<P> {
    pub fn new(mmu: Mmu, frame_count: usize, policy: P, detailed: bool) -> Self {
        Self {
            frame_table: FrameTable::new(frame_count),
            mmu,
            policy,
            stats: MemoryStats::new(),
            events: EventLog::new(detailed),
        }
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Brings `vpn` in, from the free ring if possible and by eviction
    /// otherwise. On return the page is present.
    pub fn handle_page_fault(&mut self, vpn: Vpn, page_table: &mut PageTable) {
        self.stats.page_faults += 1;
        self.events.push(Event::PageFault { page: vpn });

        if let Some(pfn) = self.frame_table.take_free() {
            self.allocate(pfn, vpn, page_table);
            return;
        }

        let victim = self.policy.pick_victim(&mut self.frame_table, page_table);
        self.events.push(Event::Choose {
            policy: self.policy.name(),
            page: victim,
            frame: page_table.get(victim).pfn,
        });
        self.replace(victim, vpn, page_table);
    }

    /// Loads `vpn` into a frame just taken off the free ring.
    pub fn allocate(&mut self, pfn: Pfn, vpn: Vpn, page_table: &mut PageTable) {
        self.events.push(Event::Store {
            page: vpn,
            frame: pfn,
        });

        self.frame_table.occupy(pfn, vpn);

        let pte = page_table.get_mut(vpn);
        pte.pfn = pfn;
        pte.present = true;
        pte.modified = false;
        self.policy.on_load(pte);
    }

    /// Evicts `victim` and loads `vpn` into the frame it leaves behind. The
    /// frame keeps its place in the occupied ring.
    pub fn replace(&mut self, victim: Vpn, vpn: Vpn, page_table: &mut PageTable) {
        let victim_pte = page_table.get_mut(victim);
        let pfn = victim_pte.pfn;

        if victim_pte.modified {
            self.stats.write_backs += 1;
            self.events.push(Event::WriteBack { page: victim });
        }
        victim_pte.present = false;

        self.events.push(Event::Replace {
            victim,
            page: vpn,
            frame: pfn,
        });

        let pte = page_table.get_mut(vpn);
        pte.pfn = pfn;
        pte.present = true;
        pte.modified = false;
        self.policy.on_load(pte);

        self.frame_table.entries[pfn.0].page = Some(vpn);
    }

    /// Reference accounting for one translated access to a resident page.
    pub fn record_reference(&mut self, pte: &mut PageTableEntry, operation: Operation, hit: bool) {
        match operation {
            Operation::Read => self.stats.reads += 1,
            Operation::Write => {
                pte.modified = true;
                self.stats.writes += 1;
            }
        }
        self.policy.on_access(pte, hit);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryStats {
    pub illegal_references: u64,
    pub reads: u64,
    pub writes: u64,
    pub page_faults: u64,
    pub write_backs: u64,
}
impl MemoryStats {
    pub fn new() -> Self {
        Self {
            illegal_references: 0,
            reads: 0,
            writes: 0,
            page_faults: 0,
            write_backs: 0,
        }
    }

    /// Legal references, i.e. every access that reached a frame.
    pub fn references(&self) -> u64 {
        self.reads + self.writes
    }

    pub fn hits(&self) -> u64 {
        self.references().saturating_sub(self.page_faults)
    }

    pub fn fault_rate(&self) -> f64 {
        if self.references() == 0 {
            0.0
        } else {
            (self.page_faults as f64 / self.references() as f64) * 100.0
        }
    }

    pub fn hit_rate(&self) -> f64 {
        if self.references() == 0 {
            0.0
        } else {
            100.0 - self.fault_rate()
        }
    }
}

/// Frame descriptors plus the free and occupied rings threaded through them.
/// Every frame is in exactly one of the two rings.
pub struct FrameTable {
    pub entries: Vec<FrameTableEntry>,
    free: Ring,
    occupied: Ring,
}
impl FrameTable {
    pub fn new(frame_count: usize) -> Self {
        let mut entries = Vec::with_capacity(frame_count);
        for _ in 0..frame_count {
            entries.push(FrameTableEntry::new());
        }
        let free = Ring::full(&mut entries);
        Self {
            entries,
            free,
            occupied: Ring::empty(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn page(&self, pfn: Pfn) -> Option<Vpn> {
        self.entries[pfn.0].page
    }

    /// Detaches the head of the free ring.
    pub fn take_free(&mut self) -> Option<Pfn> {
        self.free.pop_head(&mut self.entries)
    }

    /// Gives `pfn`, already detached from the free ring, to `vpn` and links
    /// it in as the youngest occupied frame.
    pub fn occupy(&mut self, pfn: Pfn, vpn: Vpn) {
        self.entries[pfn.0].page = Some(vpn);
        self.occupied.push_tail(&mut self.entries, pfn);
    }

    /// The longest-resident frame, or the clock hand's next candidate.
    pub fn occupied_head(&self) -> Option<Pfn> {
        self.occupied.head(&self.entries)
    }

    /// Makes `pfn` the occupied ring's tail, so the walk continues after it.
    pub fn advance_occupied(&mut self, pfn: Pfn) {
        self.occupied.advance_to(pfn);
    }

    pub fn free_frames(&self) -> RingIter<'_> {
        self.free.iter(&self.entries)
    }

    pub fn occupied_frames(&self) -> RingIter<'_> {
        self.occupied.iter(&self.entries)
    }

    pub fn free_count(&self) -> usize {
        self.free.len(&self.entries)
    }

    pub fn occupied_count(&self) -> usize {
        self.occupied.len(&self.entries)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameTableEntry {
    pub page: Option<Vpn>,
    /// Successor in whichever ring this frame is on.
    pub next: Pfn,
}
impl FrameTableEntry {
    pub fn new() -> Self {
        FrameTableEntry {
            page: None,
            next: Pfn(0),
        }
    }

    pub fn is_free(&self) -> bool {
        self.page.is_none()
    }
}

impl Default for FrameTableEntry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paging::Fifo;

    fn manager(frames: usize) -> (MemoryManager<Fifo>, PageTable) {
        let mm = MemoryManager::new(Mmu::new(16, 8), frames, Fifo::new(), true);
        (mm, PageTable::new(8))
    }

    #[test]
    fn test_new_frame_table_is_all_free() {
        let frame_table = FrameTable::new(4);
        assert_eq!(frame_table.free_count(), 4);
        assert_eq!(frame_table.occupied_count(), 0);
        assert!(frame_table.entries.iter().all(|fte| fte.is_free()));
        assert_eq!(frame_table.occupied_head(), None);
    }

    #[test]
    fn test_occupy_moves_frame_between_rings() {
        let mut frame_table = FrameTable::new(3);
        let pfn = frame_table.take_free().unwrap();
        frame_table.occupy(pfn, Vpn(5));

        assert_eq!(pfn, Pfn(0));
        assert_eq!(frame_table.page(pfn), Some(Vpn(5)));
        assert_eq!(frame_table.free_count(), 2);
        assert_eq!(frame_table.occupied_frames().collect::<Vec<_>>(), vec![Pfn(0)]);
    }

    #[test]
    fn test_fault_with_free_frame_allocates() {
        let (mut mm, mut page_table) = manager(2);
        mm.handle_page_fault(Vpn(4), &mut page_table);

        let pte = page_table.get(Vpn(4));
        assert!(pte.present);
        assert_eq!(pte.pfn, Pfn(0));
        assert!(!pte.modified);
        assert_eq!(mm.frame_table.page(Pfn(0)), Some(Vpn(4)));
        assert_eq!(mm.stats.page_faults, 1);
        assert_eq!(mm.stats.write_backs, 0);

        let events: Vec<Event> = mm.events.drain().collect();
        assert_eq!(
            events,
            vec![
                Event::PageFault { page: Vpn(4) },
                Event::Store {
                    page: Vpn(4),
                    frame: Pfn(0)
                },
            ]
        );
    }

    #[test]
    fn test_fault_without_free_frame_replaces() {
        let (mut mm, mut page_table) = manager(1);
        mm.handle_page_fault(Vpn(1), &mut page_table);
        page_table.get_mut(Vpn(1)).modified = true;
        mm.events.drain();

        mm.handle_page_fault(Vpn(2), &mut page_table);

        assert!(!page_table.get(Vpn(1)).present);
        assert!(page_table.get(Vpn(2)).present);
        assert_eq!(page_table.get(Vpn(2)).pfn, Pfn(0));
        assert_eq!(mm.frame_table.page(Pfn(0)), Some(Vpn(2)));
        assert_eq!(mm.frame_table.occupied_count(), 1);
        assert_eq!(mm.stats.page_faults, 2);
        assert_eq!(mm.stats.write_backs, 1);

        let events: Vec<Event> = mm.events.drain().collect();
        assert_eq!(
            events,
            vec![
                Event::PageFault { page: Vpn(2) },
                Event::Choose {
                    policy: "FIFO",
                    page: Vpn(1),
                    frame: Pfn(0)
                },
                Event::WriteBack { page: Vpn(1) },
                Event::Replace {
                    victim: Vpn(1),
                    page: Vpn(2),
                    frame: Pfn(0)
                },
            ]
        );
    }

    #[test]
    fn test_replace_clean_victim_costs_nothing() {
        let (mut mm, mut page_table) = manager(1);
        mm.handle_page_fault(Vpn(1), &mut page_table);
        mm.replace(Vpn(1), Vpn(3), &mut page_table);
        assert_eq!(mm.stats.write_backs, 0);
        assert_eq!(mm.frame_table.page(Pfn(0)), Some(Vpn(3)));
    }

    #[test]
    fn test_replaced_page_starts_clean() {
        let (mut mm, mut page_table) = manager(1);
        page_table.get_mut(Vpn(3)).modified = true;
        mm.handle_page_fault(Vpn(1), &mut page_table);
        mm.replace(Vpn(1), Vpn(3), &mut page_table);
        assert!(!page_table.get(Vpn(3)).modified);
    }

    #[test]
    fn test_record_reference_counts_and_marks_writes() {
        let (mut mm, mut page_table) = manager(1);
        mm.handle_page_fault(Vpn(0), &mut page_table);

        let pte = page_table.get_mut(Vpn(0));
        mm.record_reference(pte, Operation::Read, false);
        assert!(!pte.modified);
        mm.record_reference(pte, Operation::Write, true);
        assert!(pte.modified);

        assert_eq!(mm.stats.reads, 1);
        assert_eq!(mm.stats.writes, 1);
    }

    #[test]
    fn test_stats_rates() {
        let stats = MemoryStats {
            reads: 6,
            writes: 2,
            page_faults: 2,
            ..MemoryStats::new()
        };
        assert_eq!(stats.references(), 8);
        assert_eq!(stats.hits(), 6);
        assert!((stats.fault_rate() - 25.0).abs() < 1e-9);
        assert!((stats.hit_rate() - 75.0).abs() < 1e-9);

        assert_eq!(MemoryStats::new().fault_rate(), 0.0);
        assert_eq!(MemoryStats::new().hit_rate(), 0.0);
    }
}
