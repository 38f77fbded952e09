use std::fmt;

use crate::paging::{PageTable, Pfn, Vpn};

/// Physical address returned for references outside the address space.
pub const INVALID_ADDRESS: u32 = !0;

pub struct Mmu {
    page_size: u32,
    page_count: usize,
}

impl Mmu {
    pub fn new(page_size: u32, page_count: usize) -> Self {
        Self {
            page_size,
            page_count,
        }
    }

    /// Splits a virtual address into page number and offset.
    pub fn split(&self, address: u32) -> (usize, u32) {
        (
            (address / self.page_size) as usize,
            address % self.page_size,
        )
    }

    pub fn translate(&self, page_table: &PageTable, address: u32) -> TranslationResult {
        let (page, offset) = self.split(address);

        if page >= self.page_count {
            return TranslationResult::IllegalReference { page };
        }

        let vpn = Vpn(page);
        let pte = page_table.get(vpn);

        if !pte.present {
            return TranslationResult::PageFault { vpn, offset };
        }

        TranslationResult::Success {
            vpn,
            pfn: pte.pfn,
            offset,
        }
    }

    pub fn physical_address(&self, pfn: Pfn, offset: u32) -> u32 {
        pfn.0 as u32 * self.page_size + offset
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Read,
    Write,
}

impl Operation {
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "R" | "r" => Some(Operation::Read),
            "W" | "w" => Some(Operation::Write),
            _ => None,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Read => f.write_str("R"),
            Operation::Write => f.write_str("W"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslationResult {
    Success { vpn: Vpn, pfn: Pfn, offset: u32 },
    PageFault { vpn: Vpn, offset: u32 },
    IllegalReference { page: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split() {
        let mmu = Mmu::new(1024, 8);
        assert_eq!(mmu.split(0), (0, 0));
        assert_eq!(mmu.split(1023), (0, 1023));
        assert_eq!(mmu.split(1024), (1, 0));
        assert_eq!(mmu.split(5 * 1024 + 17), (5, 17));
    }

    #[test]
    fn test_split_with_non_power_of_two_page_size() {
        let mmu = Mmu::new(100, 8);
        assert_eq!(mmu.split(250), (2, 50));
    }

    #[test]
    fn test_translate_absent_page_faults() {
        let mmu = Mmu::new(1024, 8);
        let page_table = PageTable::new(8);

        assert_eq!(
            mmu.translate(&page_table, 3 * 1024 + 5),
            TranslationResult::PageFault {
                vpn: Vpn(3),
                offset: 5
            }
        );
    }

    #[test]
    fn test_translate_present_page() {
        let mmu = Mmu::new(1024, 8);
        let mut page_table = PageTable::new(8);
        let pte = page_table.get_mut(Vpn(3));
        pte.present = true;
        pte.pfn = Pfn(2);

        let result = mmu.translate(&page_table, 3 * 1024 + 5);
        assert_eq!(
            result,
            TranslationResult::Success {
                vpn: Vpn(3),
                pfn: Pfn(2),
                offset: 5
            }
        );
        assert_eq!(mmu.physical_address(Pfn(2), 5), 2 * 1024 + 5);
    }

    #[test]
    fn test_translate_out_of_range() {
        let mmu = Mmu::new(1024, 8);
        let page_table = PageTable::new(8);

        assert_eq!(
            mmu.translate(&page_table, 8 * 1024),
            TranslationResult::IllegalReference { page: 8 }
        );
        assert_eq!(
            mmu.translate(&page_table, u32::MAX),
            TranslationResult::IllegalReference {
                page: (u32::MAX / 1024) as usize
            }
        );
    }

    #[test]
    fn test_operation_parse() {
        assert_eq!(Operation::parse("R"), Some(Operation::Read));
        assert_eq!(Operation::parse("w"), Some(Operation::Write));
        assert_eq!(Operation::parse("X"), None);
        assert_eq!(Operation::Write.to_string(), "W");
    }
}
