use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{hardware::mmu::Operation, trace::Reference};

const WORKING_SET_HIT_RATE: f64 = 0.9;

/// Shape of a synthetic reference stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkloadConfig {
    pub page_size: u32,
    pub page_count: usize,
    pub working_set_size: usize,
    /// References between working set re-scrambles.
    pub working_set_lifespan: usize,
    /// Total references before the stream ends.
    pub lifespan: usize,
    pub read_rate: f64,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            page_size: 4096,
            page_count: 64,
            working_set_size: 8,
            working_set_lifespan: 1_024,
            lifespan: 10_000,
            read_rate: 0.8,
        }
    }
}

/// A process with a drifting working set. Most references land in the
/// working set, the rest anywhere in the address space. Determined entirely
/// by the seed.
pub struct Workload {
    config: WorkloadConfig,
    working_set: WorkingSet,
    state: WorkloadState,
    rng: StdRng,
}

impl Workload {
    pub fn new(config: WorkloadConfig, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut working_set = WorkingSet::new(config.working_set_size);
        working_set.scramble(config.page_count, &mut rng);

        Self {
            config,
            working_set,
            state: WorkloadState::new(config.lifespan, config.working_set_lifespan),
            rng,
        }
    }

    pub fn request(&mut self) -> Option<Reference> {
        if self.state.age >= self.state.lifespan || self.config.page_count == 0 {
            return None;
        }

        if self.state.working_set_age >= self.state.working_set_lifespan {
            self.working_set
                .scramble(self.config.page_count, &mut self.rng);
            self.state.working_set_age = 0;
        }

        self.state.age += 1;
        self.state.working_set_age += 1;

        let working_set_hit =
            !self.working_set.vpns.is_empty() && self.rng.random_bool(WORKING_SET_HIT_RATE);
        let vpn = if working_set_hit {
            let idx = self.rng.random_range(0..self.working_set.vpns.len());
            self.working_set.vpns[idx]
        } else {
            self.rng.random_range(0..self.config.page_count)
        };

        let operation = if self.rng.random_bool(self.config.read_rate) {
            Operation::Read
        } else {
            Operation::Write
        };

        let offset = self.rng.random_range(0..self.config.page_size.max(1));
        let address = (vpn as u64 * self.config.page_size as u64 + offset as u64)
            .min(u32::MAX as u64) as u32;

        Some(Reference { operation, address })
    }
}

impl Iterator for Workload {
    type Item = Reference;

    fn next(&mut self) -> Option<Reference> {
        self.request()
    }
}

struct WorkloadState {
    age: usize,
    lifespan: usize,

    working_set_age: usize,
    working_set_lifespan: usize,
}

impl WorkloadState {
    fn new(lifespan: usize, working_set_lifespan: usize) -> Self {
        Self {
            age: 0,
            lifespan,

            working_set_age: 0,
            working_set_lifespan,
        }
    }
}

struct WorkingSet {
    size: usize,
    vpns: Vec<usize>,
}

impl WorkingSet {
    fn new(size: usize) -> Self {
        Self {
            size,
            vpns: Vec::with_capacity(size),
        }
    }

    fn scramble(&mut self, page_count: usize, rng: &mut StdRng) {
        self.vpns.clear();
        if page_count == 0 {
            return;
        }
        for _ in 0..self.size {
            let vpn = rng.random_range(0..page_count);
            self.vpns.push(vpn);
        }
    }
}
