// scheduler/resource_pool.rs
//
// Fixed pools of reservation stations and functional units, partitioned
// by unit class. Grounded on the reservation-station/functional-unit
// pair in timing_simulator/tomasulo.rs, reworked from a single flat
// Vec<ReservationStation> into one array-of-classes so allocation can
// be scoped to the class an instruction actually needs, and so the
// lowest-index tie-break allocation requires is trivial to state.

use std::collections::HashMap;

use crate::scheduler::{RSTag, UnitClass};

/// A single reservation station slot. Fields are meaningless when
/// `busy` is false; `allocate_rs` re-initializes them on next use.
#[derive(Debug, Clone)]
pub struct ReservationStation {
    pub busy: bool,
    pub src1_ready: bool,
    pub src2_ready: bool,
    pub src1_producer: Option<RSTag>,
    pub src2_producer: Option<RSTag>,
    pub destination: Option<RSTag>,
}

impl ReservationStation {
    fn idle() -> Self {
        Self {
            busy: false,
            src1_ready: false,
            src2_ready: false,
            src1_producer: None,
            src2_producer: None,
            destination: None,
        }
    }

    fn reset_for_allocation(&mut self) {
        self.busy = true;
        self.src1_ready = false;
        self.src2_ready = false;
        self.src1_producer = None;
        self.src2_producer = None;
        self.destination = None;
    }
}

/// A single functional unit slot.
#[derive(Debug, Clone)]
pub struct FunctionalUnit {
    pub busy: bool,
    pub rs_index: usize,
    pub instructions_executed: usize,
}

impl FunctionalUnit {
    fn idle() -> Self {
        Self {
            busy: false,
            rs_index: 0,
            instructions_executed: 0,
        }
    }
}

/// Per-class reservation station array, functional unit array, and
/// execute latency. Immutable after `ResourcePool::new`.
struct ClassPool {
    reservation_stations: Vec<ReservationStation>,
    functional_units: Vec<FunctionalUnit>,
    latency: usize,
}

/// Owns all reservation-station and functional-unit storage for the
/// whole machine, keyed by `UnitClass`. Allocation always returns the
/// lowest free index within a class, which keeps schedules reproducible.
pub struct ResourcePool {
    classes: HashMap<UnitClass, ClassPool>,
}

impl ResourcePool {
    pub fn new(configs: &[crate::config::UnitClassConfig]) -> Self {
        let mut classes = HashMap::new();
        for class in UnitClass::ALL {
            let cfg = configs.iter().find(|c| c.class == class);
            let (num_fu, num_rs, latency) = match cfg {
                Some(c) => (c.num_fus, c.num_rs, c.latency),
                // A class absent from the config file gets zero resources,
                // which deadlocks any program that needs it.
                None => (0, 0, 1),
            };
            classes.insert(
                class,
                ClassPool {
                    reservation_stations: (0..num_rs).map(|_| ReservationStation::idle()).collect(),
                    functional_units: (0..num_fu).map(|_| FunctionalUnit::idle()).collect(),
                    latency,
                },
            );
        }
        Self { classes }
    }

    fn pool(&self, class: UnitClass) -> &ClassPool {
        self.classes.get(&class).expect("every UnitClass is populated in new()")
    }

    fn pool_mut(&mut self, class: UnitClass) -> &mut ClassPool {
        self.classes.get_mut(&class).expect("every UnitClass is populated in new()")
    }

    pub fn latency(&self, class: UnitClass) -> usize {
        self.pool(class).latency
    }

    pub fn rs(&self, tag: RSTag) -> &ReservationStation {
        &self.pool(tag.class).reservation_stations[tag.index]
    }

    pub fn rs_mut(&mut self, tag: RSTag) -> &mut ReservationStation {
        &mut self.pool_mut(tag.class).reservation_stations[tag.index]
    }

    pub fn fu(&self, class: UnitClass, index: usize) -> &FunctionalUnit {
        &self.pool(class).functional_units[index]
    }

    pub fn functional_units(&self, class: UnitClass) -> &[FunctionalUnit] {
        &self.pool(class).functional_units
    }

    /// Returns the lowest-indexed free reservation station of `class`,
    /// marking it busy, or `None` if all are occupied.
    pub fn allocate_rs(&mut self, class: UnitClass) -> Option<RSTag> {
        let pool = self.pool_mut(class);
        let index = pool.reservation_stations.iter().position(|rs| !rs.busy)?;
        pool.reservation_stations[index].reset_for_allocation();
        Some(RSTag::new(class, index))
    }

    /// Returns the lowest-indexed free functional unit of `class`,
    /// binding it to `rs_index` and bumping its lifetime counter, or
    /// `None` if all are busy.
    pub fn allocate_fu(&mut self, class: UnitClass, rs_index: usize) -> Option<usize> {
        let pool = self.pool_mut(class);
        let index = pool.functional_units.iter().position(|fu| !fu.busy)?;
        let fu = &mut pool.functional_units[index];
        fu.busy = true;
        fu.rs_index = rs_index;
        fu.instructions_executed += 1;
        Some(index)
    }

    pub fn release_rs(&mut self, tag: RSTag) {
        self.pool_mut(tag.class).reservation_stations[tag.index].busy = false;
    }

    pub fn release_fu(&mut self, class: UnitClass, index: usize) {
        self.pool_mut(class).functional_units[index].busy = false;
    }
}
