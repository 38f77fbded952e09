use super::{PageReplacementPolicy, PageTable, PageTableEntry, Vpn};
use crate::memory::FrameTable;

/// FIFO with second chance. The occupied ring's anchor is the clock hand.
///
/// A page's reference bit means "referenced since it was loaded": loading
/// clears it and only later hits set it. Walking from the head, a set bit is
/// cleared and the hand moves past that frame; the first clear bit names the
/// victim and the hand moves onto its frame. One sweep clears every bit, so
/// the walk visits at most `frames + 1` frames.
#[derive(Debug, Default)]
pub struct Clock {
    pardons: u64,
}

impl Clock {
    pub fn new() -> Self {
        Self { pardons: 0 }
    }

    /// Total number of pages spared because their reference bit was set.
    pub fn pardons(&self) -> u64 {
        self.pardons
    }
}

impl PageReplacementPolicy for Clock {
    fn name(&self) -> &'static str {
        "FIFO 2nd chance"
    }

    fn pick_victim(&mut self, frame_table: &mut FrameTable, page_table: &mut PageTable) -> Vpn {
        loop {
            let pfn = frame_table
                .occupied_head()
                .expect("occupied ring must be non-empty, otherwise pick_victim wouldn't be called");
            let vpn = frame_table
                .page(pfn)
                .expect("occupied frame must hold a page");
            frame_table.advance_occupied(pfn);

            let pte = page_table.get_mut(vpn);
            if pte.referenced {
                pte.referenced = false;
                self.pardons += 1;
            } else {
                return vpn;
            }
        }
    }

    fn on_load(&mut self, pte: &mut PageTableEntry) {
        pte.referenced = false;
    }

    fn on_access(&mut self, pte: &mut PageTableEntry, hit: bool) {
        if hit {
            pte.referenced = true;
        }
    }

    fn report(&self, frame_table: &FrameTable, page_table: &PageTable) -> String {
        let mut report = format!("FIFO second chance ({} pardons)\n Frames:", self.pardons);
        for (idx, fte) in frame_table.entries.iter().enumerate() {
            match fte.page {
                Some(vpn) => report.push_str(&format!(
                    "\nFrame: {idx}   Page: {}  Reference bit: {}",
                    vpn.0,
                    page_table.get(vpn).referenced as u8
                )),
                None => report.push_str(&format!("\nFrame: {idx}   Page: -  Reference bit: -")),
            }
        }
        report
    }
}
