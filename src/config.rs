use crate::error::ConfigError;

const ADDRESS_RANGE: u64 = 1 << 32;

/// Machine geometry. Everything else about a run is fixed by the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub page_size: u32,
    pub num_pages: u32,
    pub num_frames: u32,
    /// Buffer an `Event` for every step so the caller can print a trace.
    pub detailed: bool,
}

impl Config {
    pub fn new(page_size: u32, num_pages: u32, num_frames: u32) -> Self {
        Self {
            page_size,
            num_pages,
            num_frames,
            detailed: false,
        }
    }

    pub fn with_detailed(mut self, detailed: bool) -> Self {
        self.detailed = detailed;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::ZeroPageSize);
        }
        if self.num_pages == 0 {
            return Err(ConfigError::ZeroPages);
        }
        if self.num_frames == 0 {
            return Err(ConfigError::ZeroFrames);
        }
        // Virtual addresses may use the whole range. Physical memory stops one
        // byte short so no legal translation collides with `INVALID_ADDRESS`.
        let virtual_size = self.num_pages as u64 * self.page_size as u64;
        if virtual_size > ADDRESS_RANGE {
            return Err(self.overflow("pages", self.num_pages));
        }
        let physical_size = self.num_frames as u64 * self.page_size as u64;
        if physical_size >= ADDRESS_RANGE {
            return Err(self.overflow("frames", self.num_frames));
        }
        Ok(())
    }

    fn overflow(&self, what: &'static str, count: u32) -> ConfigError {
        ConfigError::AddressSpaceOverflow {
            what,
            count,
            page_size: self.page_size,
        }
    }
}
