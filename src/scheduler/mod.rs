// scheduler/mod.rs
//
// The core: a Tomasulo scheduler operating over a fixed pool of
// reservation stations and functional units, partitioned by unit
// class. Split into resource_pool (resource pool), rrst (register
// result status table), instruction (per-instruction pipeline state),
// stages (the five stage handlers), driver (the cycle loop and report).

pub mod driver;
pub mod instruction;
pub mod resource_pool;
pub mod rrst;
pub mod stages;

pub use driver::Scheduler;
pub use instruction::{ActiveInstruction, DecodedInstruction, Operands, Stage, WaitCause};
pub use resource_pool::ResourcePool;
pub use rrst::RegisterResultStatus;

/// The five functional-unit classes a machine configuration can describe.
/// Every reservation station, functional unit, and instruction is typed
/// by exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UnitClass {
    Integer,
    Divider,
    Multiplier,
    Load,
    Store,
}

impl UnitClass {
    /// All classes, in a fixed order used anywhere the report or config
    /// needs to enumerate them deterministically.
    pub const ALL: [UnitClass; 5] = [
        UnitClass::Integer,
        UnitClass::Divider,
        UnitClass::Multiplier,
        UnitClass::Load,
        UnitClass::Store,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UnitClass::Integer => "integer",
            UnitClass::Divider => "divider",
            UnitClass::Multiplier => "multiplier",
            UnitClass::Load => "load",
            UnitClass::Store => "store",
        }
    }
}

/// The (class, index-within-class) pair that uniquely names a
/// reservation station across the machine. This is the dataflow
/// dependency handle broadcast at write-back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RSTag {
    pub class: UnitClass,
    pub index: usize,
}

impl RSTag {
    pub fn new(class: UnitClass, index: usize) -> Self {
        Self { class, index }
    }
}
