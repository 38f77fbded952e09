use std::fmt;

use crate::{
    hardware::mmu::Operation,
    paging::{Pfn, Vpn},
};

/// One step of the detailed trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Illegal {
        address: u32,
        page: usize,
    },
    PageFault {
        page: Vpn,
    },
    Store {
        page: Vpn,
        frame: Pfn,
    },
    Choose {
        policy: &'static str,
        page: Vpn,
        frame: Pfn,
    },
    WriteBack {
        page: Vpn,
    },
    Replace {
        victim: Vpn,
        page: Vpn,
        frame: Pfn,
    },
    Access {
        operation: Operation,
        address: u32,
        page: Vpn,
        frame: Pfn,
        offset: u32,
    },
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Illegal { address, page } => {
                write!(f, "@ ILLEGAL reference {address} (P{page})")
            }
            Event::PageFault { page } => write!(f, "@ PAGE_FAULT in {page}!"),
            Event::Store { page, frame } => write!(f, "@ Storing {page} in {frame}"),
            Event::Choose {
                policy,
                page,
                frame,
            } => write!(f, "@ Choosing (at {policy}) {page} of {frame} to be replaced"),
            Event::WriteBack { page } => {
                write!(f, "@ Writing modified {page} back (to disc) to replace it")
            }
            Event::Replace {
                victim,
                page,
                frame,
            } => write!(f, "@ Replacing victim {victim} with {page} in {frame}"),
            Event::Access {
                operation,
                address,
                page,
                frame,
                offset,
            } => write!(f, "\t{operation} {address}=={page}({frame})+{offset}"),
        }
    }
}

/// Buffers events while detailed mode is on. Every event also goes to the
/// `log` facade whether or not it is buffered.
pub struct EventLog {
    enabled: bool,
    events: Vec<Event>,
}
impl EventLog {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            events: Vec::new(),
        }
    }

    pub fn push(&mut self, event: Event) {
        match event {
            Event::Access { .. } => log::trace!("{event}"),
            _ => log::debug!("{event}"),
        }
        if self.enabled {
            self.events.push(event);
        }
    }

    pub fn drain(&mut self) -> std::vec::Drain<'_, Event> {
        self.events.drain(..)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
