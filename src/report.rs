//! Text tables over a kernel's state.

use std::fmt::Display;
use std::io::{self, Write};

use crate::{
    kernel::Kernel,
    memory::MemoryStats,
    paging::{PageReplacementPolicy, Pfn},
};

pub fn write_row_header<W: Write>(out: &mut W, title: &str) -> io::Result<()> {
    writeln!(out, "{}", title)?;
    writeln!(out, "| {:<20} | {:<20} |", "Metric", "Value")?;
    writeln!(out, "| {:-<20} | {:-<20} |", "-", "-")
}

pub fn write_row<W: Write>(out: &mut W, label: &str, value: &dyn Display) -> io::Result<()> {
    writeln!(out, "| {:<20} | {:<20} |", label, value)
}

/// Counter summary for one run.
pub fn write_stats<W: Write>(out: &mut W, policy: &str, stats: &MemoryStats) -> io::Result<()> {
    write_row_header(out, &format!("## Stats for the `{}` policy", policy))?;
    write_row(out, "References", &stats.references())?;
    write_row(out, "Reads", &stats.reads)?;
    write_row(out, "Writes", &stats.writes)?;
    write_row(out, "Illegal references", &stats.illegal_references)?;
    write_row(out, "Hits", &stats.hits())?;
    write_row(out, "Page faults", &stats.page_faults)?;
    write_row(out, "Write-backs", &stats.write_backs)?;
    write_row(out, "Hit rate", &format!("{:.2}%", stats.hit_rate()))?;
    write_row(out, "Fault rate", &format!("{:.2}%", stats.fault_rate()))?;
    writeln!(out)
}

pub fn write_page_table<W: Write, P: PageReplacementPolicy>(
    out: &mut W,
    kernel: &Kernel<P>,
) -> io::Result<()> {
    writeln!(
        out,
        "{:>10} {:>10} {:>10} {:>10} {:>10} {:>10}",
        "PAGE", "Present", "Frame", "Modified", "Referenced", "Timestamp"
    )?;
    for (vpn, pte) in kernel.page_table.entries.iter().enumerate() {
        if pte.present {
            writeln!(
                out,
                "{:>10} {:>10} {:>10} {:>10} {:>10} {:>10}",
                vpn,
                pte.present as u8,
                pte.pfn.0,
                pte.modified as u8,
                pte.referenced as u8,
                pte.timestamp
            )?;
        } else {
            writeln!(
                out,
                "{:>10} {:>10} {:>10} {:>10} {:>10} {:>10}",
                vpn, 0, "-", "-", pte.referenced as u8, pte.timestamp
            )?;
        }
    }
    Ok(())
}

/// One row per frame. A frame whose page does not map back to it is
/// flagged `ERROR!`.
pub fn write_frame_table<W: Write, P: PageReplacementPolicy>(
    out: &mut W,
    kernel: &Kernel<P>,
) -> io::Result<()> {
    writeln!(
        out,
        "{:>10} {:>10} {:>10} {:>10}",
        "FRAME", "Page", "Present", "Modified"
    )?;
    for idx in 0..kernel.frame_table().len() {
        let pfn = Pfn(idx);
        match kernel.frame(pfn) {
            None => writeln!(out, "{:>10} {:>10} {:>10} {:>10}", idx, "-", "-", "-")?,
            Some(vpn) => {
                let pte = kernel.page(vpn);
                if pte.present && pte.pfn == pfn {
                    writeln!(
                        out,
                        "{:>10} {:>10} {:>10} {:>10}",
                        idx, vpn.0, 1, pte.modified as u8
                    )?;
                } else {
                    writeln!(
                        out,
                        "{:>10} {:>10} {:>10} {:>10}   ERROR!",
                        idx, vpn.0, pte.present as u8, "-"
                    )?;
                }
            }
        }
    }
    Ok(())
}

pub fn write_replacement_report<W: Write, P: PageReplacementPolicy>(
    out: &mut W,
    kernel: &Kernel<P>,
) -> io::Result<()> {
    writeln!(out, "{}", kernel.replacement_report())
}
