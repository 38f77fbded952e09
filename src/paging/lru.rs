use super::{PageReplacementPolicy, PageTable, PageTableEntry, Vpn};
use crate::memory::FrameTable;

/// Exact least-recently-used replacement over a logical clock.
///
/// Every access stamps the page with the current tick and advances it. The
/// victim is the occupied frame whose page has the smallest stamp, lowest
/// frame index on ties. O(frames) per eviction.
///
/// The clock saturates at `u64::MAX` instead of wrapping. From then on every
/// access gets the same stamp and ties fall back to frame order.
#[derive(Debug, Default)]
pub struct Lru {
    clock: u64,
    saturated: bool,
}

impl Lru {
    pub fn new() -> Self {
        Self {
            clock: 0,
            saturated: false,
        }
    }

    /// Starts the logical clock at `clock` instead of zero.
    pub fn starting_at(clock: u64) -> Self {
        Self {
            clock,
            saturated: false,
        }
    }

    pub fn clock(&self) -> u64 {
        self.clock
    }

    fn tick(&mut self) {
        match self.clock.checked_add(1) {
            Some(next) => self.clock = next,
            None => {
                if !self.saturated {
                    log::warn!("LRU clock saturated at {}", self.clock);
                    self.saturated = true;
                }
            }
        }
    }
}

impl PageReplacementPolicy for Lru {
    fn name(&self) -> &'static str {
        "LRU"
    }

    fn pick_victim(&mut self, frame_table: &mut FrameTable, page_table: &mut PageTable) -> Vpn {
        frame_table
            .occupied_frames()
            .filter_map(|pfn| frame_table.page(pfn).map(|vpn| (pfn, vpn)))
            .min_by_key(|&(pfn, vpn)| (page_table.get(vpn).timestamp, pfn))
            .map(|(_, vpn)| vpn)
            .expect("occupied ring must be non-empty, otherwise pick_victim wouldn't be called")
    }

    fn on_load(&mut self, pte: &mut PageTableEntry) {
        pte.timestamp = self.clock;
    }

    fn on_access(&mut self, pte: &mut PageTableEntry, _hit: bool) {
        pte.timestamp = self.clock;
        self.tick();
    }

    fn report(&self, _frame_table: &FrameTable, page_table: &PageTable) -> String {
        let min = page_table.entries.iter().map(|pte| pte.timestamp).min();
        let max = page_table.entries.iter().map(|pte| pte.timestamp).max();
        format!(
            "LRU replacement (Clock value: {:>10}, Min timestamp: {:>10}, Max timestamp: {:>10})",
            self.clock,
            min.unwrap_or(0),
            max.unwrap_or(0)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paging::{Pfn, tests::fill};

    #[test]
    fn test_access_stamps_and_ticks() {
        let mut lru = Lru::new();
        let mut pte = PageTableEntry::new();

        lru.on_access(&mut pte, false);
        assert_eq!(pte.timestamp, 0);
        lru.on_access(&mut pte, true);
        assert_eq!(pte.timestamp, 1);
        assert_eq!(lru.clock(), 2);
    }

    #[test]
    fn test_evicts_least_recently_used() {
        let mut lru = Lru::new();
        let (mut frame_table, mut page_table) = fill(&mut lru, 3, 8);

        lru.on_access(page_table.get_mut(Vpn(0)), true);
        assert_eq!(lru.pick_victim(&mut frame_table, &mut page_table), Vpn(1));

        lru.on_access(page_table.get_mut(Vpn(1)), true);
        assert_eq!(lru.pick_victim(&mut frame_table, &mut page_table), Vpn(2));
    }

    #[test]
    fn test_ties_go_to_lowest_frame() {
        let mut lru = Lru::new();
        let (mut frame_table, mut page_table) = fill(&mut lru, 3, 8);
        for pte in page_table.entries.iter_mut() {
            pte.timestamp = 5;
        }
        assert_eq!(lru.pick_victim(&mut frame_table, &mut page_table), Vpn(0));
    }

    #[test]
    fn test_scan_skips_free_frames() {
        let mut lru = Lru::new();
        let mut frame_table = FrameTable::new(3);
        let mut page_table = PageTable::new(8);

        // Leave frame 0 free and occupy frames 1 and 2.
        let _free = frame_table.take_free().unwrap();
        for vpn in [Vpn(4), Vpn(5)] {
            let pfn = frame_table.take_free().unwrap();
            frame_table.occupy(pfn, vpn);
            let pte = page_table.get_mut(vpn);
            pte.present = true;
            pte.pfn = pfn;
            lru.on_access(pte, false);
        }

        assert_eq!(lru.pick_victim(&mut frame_table, &mut page_table), Vpn(4));
        assert_eq!(page_table.get(Vpn(4)).pfn, Pfn(1));
    }

    #[test]
    fn test_clock_saturates() {
        let mut lru = Lru::starting_at(u64::MAX - 1);
        let mut pte = PageTableEntry::new();

        lru.on_access(&mut pte, true);
        assert_eq!(pte.timestamp, u64::MAX - 1);
        assert_eq!(lru.clock(), u64::MAX);

        lru.on_access(&mut pte, true);
        lru.on_access(&mut pte, true);
        assert_eq!(pte.timestamp, u64::MAX);
        assert_eq!(lru.clock(), u64::MAX);
    }

    #[test]
    fn test_report() {
        let mut lru = Lru::new();
        let (_, page_table) = fill(&mut lru, 3, 3);
        assert_eq!(
            lru.report(&FrameTable::new(3), &page_table),
            format!(
                "LRU replacement (Clock value: {:>10}, Min timestamp: {:>10}, Max timestamp: {:>10})",
                3, 0, 2
            )
        );
    }
}
