// scheduler/stages.rs
//
// The six stage-transition procedures: Issue, Read, Execute,
// WriteBack-broadcast, WriteBack-release, Stall-resume. Each takes an
// index into the active-instruction list and mutates state in place;
// none of them advance the clock. Grounded on
// IssueInstruction/ReadOperands/ExecuteInstruction/WriteBackStage1/
// WriteBackStage2/StallPipeline in tomsim.cpp, reworked so operand
// capture dispatches on the Operands tagged variant instead of on
// inst.size().

use log::debug;

use crate::scheduler::driver::Scheduler;
use crate::scheduler::instruction::{Operands, Stage, WaitCause};
use crate::scheduler::RSTag;

impl Scheduler {
    /// Attempt to allocate a reservation station of the instruction's
    /// class. On success, move to Read; on failure, stall for a
    /// structural hazard. Also the retry path for Wait/StructuralHazard —
    /// each retry that fails increments the counter again, matching the
    /// reference implementation's documented (if debatable) counter
    /// semantics.
    pub(crate) fn issue(&mut self, i: usize) {
        let class = self.active[i].decoded.class;
        match self.resource_pool.allocate_rs(class) {
            Some(tag) => {
                debug!("cycle {}: issue[{}] -> {:?}", self.cycles, i, tag);
                self.active[i].rs = Some(tag);
                self.active[i].stage = Stage::Read;
            },
            None => {
                self.active[i].stage = Stage::Wait;
                self.active[i].wait_cause = Some(WaitCause::StructuralHazard);
                self.structural_hazard_stalls += 1;
            },
        }
    }

    /// Write the instruction's own tag into its RS's `destination`
    /// field, capture operands per the instruction's operand format,
    /// rename the destination register if the instruction has one, and
    /// move to Execute if both operands are already available.
    pub(crate) fn read(&mut self, i: usize) {
        let tag = self.active[i].rs.expect("Read stage requires an assigned RS");
        self.resource_pool.rs_mut(tag).destination = Some(tag);

        let operands = self.active[i].decoded.operands;
        let (src1, src2) = source_registers(operands);

        if let Some(reg) = src1 {
            self.capture_source(tag, reg, true);
        } else {
            self.resource_pool.rs_mut(tag).src1_ready = true;
        }
        if let Some(reg) = src2 {
            self.capture_source(tag, reg, false);
        } else {
            self.resource_pool.rs_mut(tag).src2_ready = true;
        }

        if let Some(dest) = self.active[i].decoded.destination() {
            self.rrst.set_producer(dest, tag);
        }

        let rs = self.resource_pool.rs(tag);
        self.active[i].stage = if rs.src1_ready && rs.src2_ready {
            Stage::Execute
        } else {
            self.active[i].wait_cause = Some(WaitCause::WaitingForOperand);
            Stage::Wait
        };
    }

    /// Consult the RRST for `reg` and record either readiness (reading
    /// from the architectural register file) or a producer tag to wait
    /// on, into the RS's src1 or src2 slot.
    fn capture_source(&mut self, tag: RSTag, reg: u32, is_src1: bool) {
        match self.rrst.producer(reg) {
            Some(producer) => {
                let rs = self.resource_pool.rs_mut(tag);
                if is_src1 {
                    rs.src1_ready = false;
                    rs.src1_producer = Some(producer);
                } else {
                    rs.src2_ready = false;
                    rs.src2_producer = Some(producer);
                }
            },
            None => {
                let rs = self.resource_pool.rs_mut(tag);
                if is_src1 {
                    rs.src1_ready = true;
                } else {
                    rs.src2_ready = true;
                }
                self.register_file_reads += 1;
            },
        }
    }

    /// Allocate a functional unit if none is bound yet, then consume one
    /// cycle of latency. Moves to Write once `cycles_executed` reaches
    /// the class's latency.
    pub(crate) fn execute(&mut self, i: usize, current_cycle: usize) {
        let class = self.active[i].decoded.class;
        if self.active[i].fu.is_none() {
            let rs_index = self.active[i].rs.expect("Execute stage requires an assigned RS").index;
            match self.resource_pool.allocate_fu(class, rs_index) {
                Some(fu_index) => {
                    self.active[i].fu = Some((class, fu_index));
                    self.active[i].execute_started_cycle = Some(current_cycle);
                },
                None => {
                    self.active[i].stage = Stage::Wait;
                    self.active[i].wait_cause = Some(WaitCause::WaitingForFunctionalUnit);
                    return;
                },
            }
        }

        self.active[i].cycles_executed += 1;
        if self.active[i].cycles_executed == self.resource_pool.latency(class) {
            self.active[i].stage = Stage::Write;
        }
    }

    /// Broadcast phase: expose this Write-stage instruction's tag to
    /// every other active instruction waiting on it, flipping their
    /// src_ready flags. Does not transition anyone's stage — a consumer
    /// left in Wait/WaitingForOperand transitions later this same cycle
    /// via `stall_resume`, in the advance phase.
    pub(crate) fn writeback_broadcast(&mut self, i: usize) {
        let tag = self.active[i].rs.expect("Write stage requires an assigned RS");
        for j in 0..self.active.len() {
            if j == i {
                continue;
            }
            if let Some(rs_tag) = self.active[j].rs {
                let rs = self.resource_pool.rs_mut(rs_tag);
                if !rs.src1_ready && rs.src1_producer == Some(tag) {
                    rs.src1_ready = true;
                }
                if !rs.src2_ready && rs.src2_producer == Some(tag) {
                    rs.src2_ready = true;
                }
            }
        }
    }

    /// Release phase: clear the RRST of this tag, free the FU and RS,
    /// and drop the instruction from the active list.
    pub(crate) fn writeback_release(&mut self, i: usize) {
        let tag = self.active[i].rs.expect("Write stage requires an assigned RS");
        let (fu_class, fu_index) = self.active[i].fu.expect("Write stage requires an assigned FU");

        self.rrst.clear_by_tag(tag);
        self.resource_pool.release_fu(fu_class, fu_index);
        self.resource_pool.release_rs(tag);
        self.active.remove(i);
    }

    /// Dispatch a Wait-stage instruction on its wait cause: retry Issue
    /// for a structural hazard, check readiness for an operand wait, or
    /// retry Execute for a functional-unit wait.
    pub(crate) fn stall_resume(&mut self, i: usize, current_cycle: usize) {
        match self.active[i].wait_cause.expect("Wait stage requires a wait cause") {
            WaitCause::StructuralHazard => self.issue(i),
            WaitCause::WaitingForOperand => {
                let tag = self.active[i].rs.expect("operand wait requires an assigned RS");
                let rs = self.resource_pool.rs(tag);
                if rs.src1_ready && rs.src2_ready {
                    self.active[i].stage = Stage::Execute;
                }
            },
            WaitCause::WaitingForFunctionalUnit => self.execute(i, current_cycle),
        }
    }
}

/// Maps an instruction's operand variant to its (src1, src2) register
/// numbers. `None` means the slot is unused and should be marked ready
/// without consulting the RRST.
fn source_registers(operands: Operands) -> (Option<u32>, Option<u32>) {
    match operands {
        Operands::Rrr { rs, rt, .. } => (Some(rs), Some(rt)),
        Operands::LoadRr { rs, .. } => (Some(rs), None),
        Operands::StoreRr { rt, rs } => (Some(rt), Some(rs)),
        Operands::ImmDest { .. } => (None, None),
        Operands::DestSrc { rs, .. } => (Some(rs), None),
        // A stalled `put` should wait like any other operand-dependent
        // instruction rather than skip straight past Wait: treating it
        // as a single-source format with an unused second slot gets
        // that for free, since both slots must be ready before Execute.
        Operands::SrcOnly { rs } => (Some(rs), None),
        Operands::None => (None, None),
    }
}
