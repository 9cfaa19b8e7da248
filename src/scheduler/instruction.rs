// scheduler/instruction.rs
//
// The decoded-instruction payload (produced by the trace decoder) and
// the mutable per-instruction pipeline state the scheduler tracks while
// it's in flight. Grounded on InstructionStatus /
// ReservationStation.instruction in timing_simulator/tomasulo.rs, but
// the operand shape is a tagged variant (Operands) rather than a
// generic Instruction enum, since this scheduler never touches
// operation semantics — only which registers are read and written.

use crate::scheduler::{RSTag, UnitClass};

/// The operand shape of a decoded instruction. The scheduler dispatches
/// on this to know which registers to rename and wait on; it never
/// inspects *which* opcode produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operands {
    /// Two source registers, one destination (add/sub/and/nor/div/mod/exp/mul).
    Rrr { rd: u32, rs: u32, rt: u32 },
    /// One source register, one destination (lw).
    LoadRr { rd: u32, rs: u32 },
    /// Two source registers, no destination: rt is the store data, rs
    /// the store address (sw).
    StoreRr { rt: u32, rs: u32 },
    /// Destination only (liz, lis).
    ImmDest { rd: u32 },
    /// A destination that is also re-read as a source (lui).
    DestSrc { rd: u32, rs: u32 },
    /// One source, no destination (put).
    SrcOnly { rs: u32 },
    /// No operands (halt).
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedInstruction {
    pub class: UnitClass,
    pub operands: Operands,
}

impl DecodedInstruction {
    pub fn new(class: UnitClass, operands: Operands) -> Self {
        Self { class, operands }
    }

    pub fn destination(&self) -> Option<u32> {
        match self.operands {
            Operands::Rrr { rd, .. }
            | Operands::LoadRr { rd, .. }
            | Operands::ImmDest { rd }
            | Operands::DestSrc { rd, .. } => Some(rd),
            Operands::StoreRr { .. } | Operands::SrcOnly { .. } | Operands::None => None,
        }
    }
}

/// Which pipeline stage an in-flight instruction currently occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Issue,
    Read,
    Execute,
    Write,
    Wait,
}

/// Why an instruction in `Stage::Wait` is stalled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitCause {
    StructuralHazard,
    WaitingForOperand,
    WaitingForFunctionalUnit,
}

/// The in-flight record for one instruction: the immutable decoded
/// payload plus everything the stage handlers mutate as it moves
/// through Issue -> Read -> Execute -> Write.
#[derive(Debug, Clone)]
pub struct ActiveInstruction {
    pub decoded: DecodedInstruction,
    pub stage: Stage,
    pub wait_cause: Option<WaitCause>,
    pub rs: Option<RSTag>,
    pub fu: Option<(UnitClass, usize)>,
    pub execute_started_cycle: Option<usize>,
    pub cycles_executed: usize,
}

impl ActiveInstruction {
    pub fn new(decoded: DecodedInstruction) -> Self {
        Self {
            decoded,
            stage: Stage::Issue,
            wait_cause: None,
            rs: None,
            fu: None,
            execute_started_cycle: None,
            cycles_executed: 0,
        }
    }
}
