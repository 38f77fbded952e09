//! First-in, first-out replacement.
//!
//! Frames are linked into the occupied ring in load order, so the ring's
//! head is always the longest-resident frame. Evicting advances the anchor
//! onto that frame: the page loaded into it becomes the youngest, and the
//! next victim is the following frame. O(1) per eviction.

use super::{PageReplacementPolicy, PageTable, Vpn};
use crate::memory::FrameTable;

#[derive(Debug, Default)]
pub struct Fifo;

impl Fifo {
    pub fn new() -> Self {
        Self
    }
}

impl PageReplacementPolicy for Fifo {
    fn name(&self) -> &'static str {
        "FIFO"
    }

    fn pick_victim(&mut self, frame_table: &mut FrameTable, _page_table: &mut PageTable) -> Vpn {
        let pfn = frame_table
            .occupied_head()
            .expect("occupied ring must be non-empty, otherwise pick_victim wouldn't be called");
        frame_table.advance_occupied(pfn);
        frame_table
            .page(pfn)
            .expect("occupied frame must hold a page")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paging::{Pfn, tests::fill};

    #[test]
    fn test_evicts_in_load_order() {
        let mut fifo = Fifo::new();
        let (mut frame_table, mut page_table) = fill(&mut fifo, 3, 8);

        assert_eq!(fifo.pick_victim(&mut frame_table, &mut page_table), Vpn(0));
        assert_eq!(fifo.pick_victim(&mut frame_table, &mut page_table), Vpn(1));
        assert_eq!(fifo.pick_victim(&mut frame_table, &mut page_table), Vpn(2));
        // Back around to the first frame.
        assert_eq!(fifo.pick_victim(&mut frame_table, &mut page_table), Vpn(0));
    }

    #[test]
    fn test_recency_is_ignored() {
        let mut fifo = Fifo::new();
        let (mut frame_table, mut page_table) = fill(&mut fifo, 2, 8);

        for _ in 0..5 {
            fifo.on_access(page_table.get_mut(Vpn(0)), true);
        }
        assert_eq!(fifo.pick_victim(&mut frame_table, &mut page_table), Vpn(0));
    }

    #[test]
    fn test_victim_frame_becomes_the_tail() {
        let mut fifo = Fifo::new();
        let (mut frame_table, mut page_table) = fill(&mut fifo, 3, 8);

        fifo.pick_victim(&mut frame_table, &mut page_table);
        let order: Vec<Pfn> = frame_table.occupied_frames().collect();
        assert_eq!(order, vec![Pfn(1), Pfn(2), Pfn(0)]);
    }

    #[test]
    fn test_leaves_page_table_alone() {
        let mut fifo = Fifo::new();
        let (mut frame_table, mut page_table) = fill(&mut fifo, 2, 4);
        let before = page_table.entries.clone();

        fifo.pick_victim(&mut frame_table, &mut page_table);
        assert_eq!(page_table.entries, before);
    }
}
