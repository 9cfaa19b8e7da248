// scheduler/driver.rs
//
// The cycle driver: owns every piece of scheduler state and runs the
// five-phase per-cycle loop (admit, broadcast, advance, [no phase 4],
// release). Grounded on executeProgram() in tomsim.cpp and on the
// tick()/process_cdb split in timing_simulator/tomasulo.rs, but the
// phase ordering here is tomsim.cpp's (broadcast-before-advance,
// release-after-advance) rather than vmips-simulator's (which processes
// the CDB at the start of the *next* cycle, one cycle later).

use std::collections::VecDeque;

use log::{debug, info, log_enabled, trace, warn, Level};

use crate::config::UnitClassConfig;
use crate::errors::SimError;
use crate::report::{SimulationReport, UnitInstanceStats};
use crate::scheduler::instruction::{ActiveInstruction, DecodedInstruction, Stage};
use crate::scheduler::resource_pool::ResourcePool;
use crate::scheduler::rrst::RegisterResultStatus;
use crate::scheduler::UnitClass;
use crate::utils::logger::RunLog;

/// Safety margin for the deadlock heuristic: if the active list and the
/// decoded queue stop shrinking for this many consecutive cycles while
/// the active list is non-empty, something in the simulated program (or
/// a scheduler bug) has wedged the pipeline.
const STALL_DETECTION_MARGIN: usize = 4096;

pub struct Scheduler {
    pub(crate) resource_pool: ResourcePool,
    pub(crate) rrst: RegisterResultStatus,
    pub(crate) active: Vec<ActiveInstruction>,
    decoded_queue: VecDeque<DecodedInstruction>,

    pub(crate) cycles: usize,
    pub(crate) register_file_reads: usize,
    pub(crate) structural_hazard_stalls: usize,

    cycles_since_progress: usize,
    run_log: Option<RunLog>,
}

impl Scheduler {
    pub fn new(configs: &[UnitClassConfig], program: Vec<DecodedInstruction>) -> Self {
        Self {
            resource_pool: ResourcePool::new(configs),
            rrst: RegisterResultStatus::new(),
            active: Vec::new(),
            decoded_queue: program.into_iter().collect(),
            cycles: 0,
            register_file_reads: 0,
            structural_hazard_stalls: 0,
            cycles_since_progress: 0,
            run_log: None,
        }
    }

    /// Attaches a cycle-trace mirror; `run` emits one line per cycle to
    /// it while the simulation runs. Without this, `run` never touches
    /// a `RunLog` at all.
    pub fn attach_run_log(&mut self, run_log: RunLog) {
        self.run_log = Some(run_log);
    }

    /// Hands back the attached `RunLog`, if any, so the caller can write
    /// a final summary line to it after `run` completes.
    pub fn take_run_log(&mut self) -> Option<RunLog> {
        self.run_log.take()
    }

    /// Runs the simulation to completion, returning the final report.
    pub fn run(&mut self) -> Result<SimulationReport, SimError> {
        info!(
            "scheduler: starting run with {} decoded instructions",
            self.decoded_queue.len()
        );
        while !self.decoded_queue.is_empty() || !self.active.is_empty() {
            self.run_cycle()?;
        }
        info!(
            "scheduler: run complete after {} cycles ({} reg reads, {} structural stalls)",
            self.cycles, self.register_file_reads, self.structural_hazard_stalls
        );
        let report = self.build_report();
        for class in UnitClass::ALL {
            let units = report.units_for(class);
            let completed: usize = units.iter().map(|u| u.instructions).sum();
            debug!("scheduler: {} -> {} unit(s), {} instructions completed", class.as_str(), units.len(), completed);
        }
        Ok(report)
    }

    fn run_cycle(&mut self) -> Result<(), SimError> {
        self.cycles += 1;
        let cycle = self.cycles;
        trace!("cycle {}: begin, {} active", cycle, self.active.len());

        // Phase 1: admit at most one new instruction this cycle.
        let admitted = self.admit();

        // Phase 2: broadcast scan. Collect indices in Write stage and
        // expose their results to waiting consumers before this cycle's
        // advance, so a consumer can move Wait -> Execute this cycle.
        let writing: Vec<usize> = self
            .active
            .iter()
            .enumerate()
            .filter(|(_, instr)| instr.stage == Stage::Write)
            .map(|(i, _)| i)
            .collect();
        for &i in &writing {
            self.writeback_broadcast(i);
        }

        // Phase 3: advance every active instruction by its current stage.
        let mut any_transitioned = false;
        for i in 0..self.active.len() {
            let stage_before = self.active[i].stage;
            match stage_before {
                Stage::Issue => self.issue(i),
                Stage::Read => self.read(i),
                Stage::Execute => self.execute(i, cycle),
                Stage::Write => {}, // release happens in phase 5
                Stage::Wait => self.stall_resume(i, cycle),
            }
            if self.active[i].stage != stage_before {
                any_transitioned = true;
            }
        }

        // Phase 5 (no phase 4): release resources held by this cycle's
        // Write-stage instructions, in reverse index order so earlier
        // indices stay meaningful while we remove from the active list.
        for &i in writing.iter().rev() {
            self.writeback_release(i);
        }

        let made_progress = admitted || !writing.is_empty() || any_transitioned;
        if made_progress {
            self.cycles_since_progress = 0;
        } else {
            self.cycles_since_progress += 1;
        }
        if !self.active.is_empty() && self.cycles_since_progress > STALL_DETECTION_MARGIN {
            warn!(
                "cycle {}: no instruction advanced and no resource was released for {} cycles",
                cycle, self.cycles_since_progress
            );
            return Err(SimError::SchedulerInvariant(format!(
                "simulation deadlocked: {} instructions stuck after {} idle cycles",
                self.active.len(),
                self.cycles_since_progress
            )));
        }

        if log_enabled!(Level::Trace) {
            trace!("{}", self.dump_state());
        }
        if let Some(log) = self.run_log.as_mut() {
            log.cycle(
                cycle,
                &format!(
                    "active={} admitted={} stalls={}",
                    self.active.len(),
                    admitted,
                    self.structural_hazard_stalls
                ),
            );
        }

        trace!("cycle {}: end, {} active", cycle, self.active.len());
        Ok(())
    }

    fn admit(&mut self) -> bool {
        if let Some(decoded) = self.decoded_queue.pop_front() {
            debug!("cycle {}: admit {:?}", self.cycles, decoded);
            self.active.push(ActiveInstruction::new(decoded));
            true
        } else {
            false
        }
    }

    fn build_report(&self) -> SimulationReport {
        let unit_stats = |class: UnitClass| {
            self.resource_pool
                .functional_units(class)
                .iter()
                .enumerate()
                .map(|(id, fu)| UnitInstanceStats { id, instructions: fu.instructions_executed })
                .collect::<Vec<_>>()
        };
        SimulationReport {
            cycles: self.cycles,
            integer: unit_stats(UnitClass::Integer),
            multiplier: unit_stats(UnitClass::Multiplier),
            divider: unit_stats(UnitClass::Divider),
            load: unit_stats(UnitClass::Load),
            store: unit_stats(UnitClass::Store),
            reg_reads: self.register_file_reads,
            stalls: self.structural_hazard_stalls,
        }
    }

    /// A formatted dump of functional units and in-flight instructions,
    /// emitted once per cycle at `--log-level trace`. Grounded on
    /// dump_state() in timing_simulator/tomasulo.rs and on the original
    /// tool's printReservationStations/printFunctionalUnits/
    /// printRegisterStatus.
    pub(crate) fn dump_state(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("=== cycle {} ===\n", self.cycles));
        for class in UnitClass::ALL {
            out.push_str(&format!("-- {} functional units --\n", class.as_str()));
            for (i, fu) in self.resource_pool.functional_units(class).iter().enumerate() {
                out.push_str(&format!(
                    "  [{}] busy={} rs={} executed={}\n",
                    i, fu.busy, fu.rs_index, fu.instructions_executed
                ));
            }
        }
        out.push_str("-- active instructions --\n");
        for (i, instr) in self.active.iter().enumerate() {
            out.push_str(&format!(
                "  [{}] stage={:?} wait={:?} rs={:?} fu={:?} cycles_executed={}\n",
                i, instr.stage, instr.wait_cause, instr.rs, instr.fu, instr.cycles_executed
            ));
        }
        out
    }
}
