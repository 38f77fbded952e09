use crate::{
    config::Config,
    error::{AuditError, ConfigError},
    event::Event,
    hardware::mmu::{INVALID_ADDRESS, Mmu, Operation, TranslationResult},
    memory::{FrameTable, MemoryManager, MemoryStats},
    paging::{PageReplacementPolicy, PageTable, PageTableEntry, Pfn, Vpn},
};

/// One simulated machine: a single address space, its physical frames and
/// the replacement policy chosen at construction.
///
/// Not meant to be shared. Every operation takes `&mut self` and runs to
/// completion; independent kernels can run side by side.
pub struct Kernel<P: PageReplacementPolicy> {
    pub mm: MemoryManager<P>,
    pub page_table: PageTable,
}

impl<P: PageReplacementPolicy> Kernel<P> {
    pub fn new(config: Config, policy: P) -> Result<Self, ConfigError> {
        config.validate()?;

        let page_count = config.num_pages as usize;
        let mmu = Mmu::new(config.page_size, page_count);
        log::info!(
            "{} policy: {} pages, {} frames of {} bytes",
            policy.name(),
            config.num_pages,
            config.num_frames,
            config.page_size
        );

        Ok(Self {
            mm: MemoryManager::new(mmu, config.num_frames as usize, policy, config.detailed),
            page_table: PageTable::new(page_count),
        })
    }

    /// Translates `address`, faulting the page in if needed. Never fails:
    /// out-of-range references are counted and yield `INVALID_ADDRESS`.
    pub fn translate(&mut self, address: u32, operation: Operation) -> u32 {
        self.access_memory(address, operation).physical_address()
    }

    pub fn access_memory(&mut self, address: u32, operation: Operation) -> AccessResult {
        match self.mm.mmu.translate(&self.page_table, address) {
            TranslationResult::Success { vpn, offset, .. } => {
                AccessResult::Hit(self.reference(address, vpn, offset, operation, true))
            }
            TranslationResult::PageFault { vpn, offset } => {
                self.mm.handle_page_fault(vpn, &mut self.page_table);
                AccessResult::Miss(self.reference(address, vpn, offset, operation, false))
            }
            TranslationResult::IllegalReference { page } => {
                self.mm.stats.illegal_references += 1;
                self.mm.events.push(Event::Illegal { address, page });
                AccessResult::IllegalReference
            }
        }
    }

    fn reference(
        &mut self,
        address: u32,
        vpn: Vpn,
        offset: u32,
        operation: Operation,
        hit: bool,
    ) -> u32 {
        let pte = self.page_table.get_mut(vpn);
        let pfn = pte.pfn;
        self.mm.record_reference(pte, operation, hit);

        self.mm.events.push(Event::Access {
            operation,
            address,
            page: vpn,
            frame: pfn,
            offset,
        });
        self.mm.mmu.physical_address(pfn, offset)
    }

    pub fn policy(&self) -> &P {
        self.mm.policy()
    }

    pub fn stats(&self) -> &MemoryStats {
        &self.mm.stats
    }

    pub fn page(&self, vpn: Vpn) -> &PageTableEntry {
        self.page_table.get(vpn)
    }

    pub fn frame(&self, pfn: Pfn) -> Option<Vpn> {
        self.mm.frame_table.page(pfn)
    }

    pub fn frame_table(&self) -> &FrameTable {
        &self.mm.frame_table
    }

    /// Takes the events buffered since the last call. Always empty unless
    /// the kernel was configured as detailed.
    pub fn drain_events(&mut self) -> Vec<Event> {
        self.mm.events.drain().collect()
    }

    /// Policy-specific state, one or more lines.
    pub fn replacement_report(&self) -> String {
        self.policy()
            .report(&self.mm.frame_table, &self.page_table)
    }

    /// Checks that the rings partition the frames and that the page table and
    /// frame table agree with each other.
    pub fn audit(&self) -> Result<(), AuditError> {
        let frame_table = &self.mm.frame_table;
        let mut seen = vec![false; frame_table.len()];

        for pfn in frame_table.free_frames() {
            if std::mem::replace(&mut seen[pfn.0], true) {
                return Err(AuditError::DuplicateFrame { frame: pfn.0 });
            }
            if let Some(vpn) = frame_table.page(pfn) {
                return Err(AuditError::FreeFrameInUse {
                    frame: pfn.0,
                    page: vpn.0,
                });
            }
        }

        for pfn in frame_table.occupied_frames() {
            if std::mem::replace(&mut seen[pfn.0], true) {
                return Err(AuditError::DuplicateFrame { frame: pfn.0 });
            }
            let vpn = frame_table
                .page(pfn)
                .ok_or(AuditError::EmptyOccupiedFrame { frame: pfn.0 })?;
            let pte = self.page_table.get(vpn);
            if !pte.present || pte.pfn != pfn {
                return Err(AuditError::FrameMismatch {
                    frame: pfn.0,
                    page: vpn.0,
                });
            }
        }

        if let Some(frame) = seen.iter().position(|seen| !seen) {
            return Err(AuditError::MissingFrame { frame });
        }

        for (vpn, pte) in self.page_table.resident() {
            if pte.pfn.0 >= frame_table.len() || frame_table.page(pte.pfn) != Some(vpn) {
                return Err(AuditError::PageMismatch {
                    page: vpn.0,
                    frame: pte.pfn.0,
                });
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessResult {
    Hit(u32),
    Miss(u32),
    IllegalReference,
}

impl AccessResult {
    pub fn physical_address(&self) -> u32 {
        match self {
            AccessResult::Hit(pa) | AccessResult::Miss(pa) => *pa,
            AccessResult::IllegalReference => INVALID_ADDRESS,
        }
    }

    pub fn is_fault(&self) -> bool {
        matches!(self, AccessResult::Miss(_))
    }
}
