use rand::{Rng, SeedableRng, rngs::StdRng};

use super::{PageReplacementPolicy, PageTable, Pfn, Vpn};
use crate::memory::FrameTable;

/// Evicts the page in a uniformly chosen frame. Seed it for reproducible
/// runs.
pub struct Random {
    rng: StdRng,
}

impl Random {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_os_rng() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }
}

impl PageReplacementPolicy for Random {
    fn name(&self) -> &'static str {
        "random"
    }

    fn pick_victim(&mut self, frame_table: &mut FrameTable, _page_table: &mut PageTable) -> Vpn {
        // Integer range sampling, no float rounding at the edges.
        let pfn = Pfn(self.rng.random_range(0..frame_table.len()));
        frame_table
            .page(pfn)
            .expect("every frame is occupied, otherwise pick_victim wouldn't be called")
    }

    fn report(&self, _frame_table: &FrameTable, _page_table: &PageTable) -> String {
        "Random replacement (no specific information)".to_string()
    }
}
