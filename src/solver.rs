use std::collections::VecDeque;
use serde_derive::{Deserialize, Serialize};
use crate::core::Counters;
use crate::events::{Event, StepStatus};
use crate::graph::{ConstraintGraph, PruneRecord};
use crate::heuristics::{order_values, select_variable};

/// Which heuristics the search runs with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    pub use_mrv: bool,
    pub use_lcv: bool,
    pub use_forward_checking: bool,
}

impl SearchConfig {
    pub fn all() -> Self {
        SearchConfig { use_mrv: true, use_lcv: true, use_forward_checking: true }
    }
}

/// One suspended recursion level: the chosen cell, its ordered candidates,
/// the index of the next candidate to try, the value currently applied to
/// the board, and the forward-checking record protecting that value.
#[derive(Debug)]
struct Frame {
    cell: usize,
    candidates: Vec<u8>,
    next: usize,
    applied: Option<u8>,
    record: Option<PruneRecord>,
}

/// Where the state machine resumes on the next call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Start,
    Descend,
    TryValue,
    Unwind,
    Finished(bool),
}

/// Callback for drained runs. Injecting an observer is much lighter than
/// inverting control when all you want is to watch the stream go by.
pub trait StepObserver {
    fn after_event(&mut self, event: &Event);
}

/// The backtracking search as a suspendable state machine. The conceptually
/// recursive search is flattened into an explicit stack of frames so that
/// the partially-tried candidate list at every depth survives across
/// suspensions; `next_event` hands out exactly one observation per call.
///
/// The solver never owns the instance: pass the same graph handle to every
/// call for the lifetime of one solve. Requesting events after `Done` is
/// safe and re-signals completion.
#[derive(Debug)]
pub struct StepSolver {
    config: SearchConfig,
    stack: Vec<Frame>,
    phase: Phase,
    counters: Counters,
    pending: VecDeque<Event>,
}

impl StepSolver {
    pub fn new(config: SearchConfig) -> Self {
        StepSolver {
            config,
            stack: Vec::new(),
            phase: Phase::Start,
            counters: Counters::default(),
            pending: VecDeque::new(),
        }
    }

    pub fn config(&self) -> SearchConfig { self.config }

    pub fn counters(&self) -> Counters { self.counters }

    /// True once the terminal event has been handed out.
    pub fn is_done(&self) -> bool {
        matches!(self.phase, Phase::Finished(_)) && self.pending.is_empty()
    }

    /// Produces the next observation, running the machine just far enough to
    /// have one.
    pub fn next_event(&mut self, graph: &mut ConstraintGraph) -> Event {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return event;
            }
            self.advance(graph);
        }
    }

    /// Runs to completion, feeding every event to the observer. Returns
    /// overall success.
    pub fn drain(&mut self, graph: &mut ConstraintGraph, observer: &mut dyn StepObserver) -> bool {
        loop {
            let event = self.next_event(graph);
            observer.after_event(&event);
            if let Event::Done { success } = event {
                return success;
            }
        }
    }

    /// Runs to completion, discarding intermediate events. The solved board
    /// is left in the graph.
    pub fn solve(&mut self, graph: &mut ConstraintGraph) -> bool {
        loop {
            if let Event::Done { success } = self.next_event(graph) {
                return success;
            }
        }
    }

    fn advance(&mut self, graph: &mut ConstraintGraph) {
        match self.phase {
            Phase::Start => {
                self.log(format!(
                    "Starting... MRV:{} LCV:{} FC:{}",
                    self.config.use_mrv, self.config.use_lcv, self.config.use_forward_checking,
                ));
                self.phase = Phase::Descend;
            }
            Phase::Descend => self.descend(graph),
            Phase::TryValue => self.try_value(graph),
            Phase::Unwind => self.unwind(graph),
            Phase::Finished(success) => {
                // Post-completion requests just re-signal completion.
                self.pending.push_back(Event::Done { success });
            }
        }
    }

    /// Opens a new recursion level: succeed if the board is full, otherwise
    /// select a variable, order its candidates, and announce the choice.
    fn descend(&mut self, graph: &mut ConstraintGraph) {
        if graph.is_complete() {
            self.log("Puzzle Solved!".to_string());
            self.finish(true);
            return;
        }
        let cell = match select_variable(graph, self.config.use_mrv) {
            Some(cell) => cell,
            // Unreachable on an incomplete board, but the recursive form
            // treats it as a failed branch, so keep that meaning.
            None => {
                self.phase = Phase::Unwind;
                return;
            }
        };
        self.counters.nodes_expanded += 1;
        let candidates = order_values(graph, cell, self.config.use_lcv);
        self.push_step(graph, cell, StepStatus::Thinking);
        if candidates.is_empty() {
            // Emptied by earlier forward checking or the AC-3 pass.
            self.log(format!("[Backtrack] Cell {} has no valid candidates left.", cell));
            self.push_backtrack(graph, cell, StepStatus::Error);
            self.phase = Phase::Unwind;
        } else {
            self.stack.push(Frame { cell, candidates, next: 0, applied: None, record: None });
            self.phase = Phase::TryValue;
        }
    }

    /// Tries the top frame's next candidate: assign it, forward-check it,
    /// and either descend or move on to the following candidate.
    fn try_value(&mut self, graph: &mut ConstraintGraph) {
        let frame = self.stack.last_mut().expect("TryValue requires an open frame");
        let cell = frame.cell;
        let mut chosen = None;
        while frame.next < frame.candidates.len() {
            let v = frame.candidates[frame.next];
            frame.next += 1;
            // Values conflicting with an assigned neighbor are skipped
            // without an observation.
            if graph.is_consistent(cell, v) {
                chosen = Some(v);
                break;
            }
        }
        let value = match chosen {
            Some(v) => v,
            None => {
                self.log(format!("[Exhausted] No valid values left for Cell {}. Going up.", cell));
                self.push_backtrack(graph, cell, StepStatus::Error);
                self.stack.pop();
                self.phase = Phase::Unwind;
                return;
            }
        };
        graph.assign(cell, value);
        self.stack.last_mut().unwrap().applied = Some(value);
        self.log(format!("Assigning {} to Cell {}", value, cell));
        self.push_step(graph, cell, StepStatus::Tentative);
        if self.config.use_forward_checking {
            let outcome = graph.prune_neighbors(cell, value);
            if !outcome.success {
                graph.unassign(cell);
                graph.restore_pruned(outcome.record);
                self.stack.last_mut().unwrap().applied = None;
                self.counters.backtracks += 1;
                self.log(format!("FC: Conflict caused by {} at {}", value, cell));
                self.push_prune_fail(graph, cell);
                // Stay in TryValue for the next candidate.
                return;
            }
            self.stack.last_mut().unwrap().record = Some(outcome.record);
        }
        self.phase = Phase::Descend;
    }

    /// A deeper branch failed: undo the top frame's assignment, restore its
    /// prune record, and resume its candidate loop. With an empty stack the
    /// whole search has failed.
    fn unwind(&mut self, graph: &mut ConstraintGraph) {
        if self.stack.is_empty() {
            self.log("Search finished. No solution found.".to_string());
            self.finish(false);
            return;
        }
        let (cell, value, record) = {
            let frame = self.stack.last_mut().unwrap();
            (frame.cell, frame.applied.take(), frame.record.take())
        };
        // Every frame below a failed branch holds an applied value.
        let value = value.expect("unwound frame with no applied value");
        graph.unassign(cell);
        if let Some(record) = record {
            graph.restore_pruned(record);
        }
        self.counters.backtracks += 1;
        self.log(format!(
            "<- Backtracking from Cell {} (Value {} led to dead end)", cell, value,
        ));
        self.push_backtrack(graph, cell, StepStatus::Backtrack);
        self.phase = Phase::TryValue;
    }

    fn finish(&mut self, success: bool) {
        self.pending.push_back(Event::Done { success });
        self.phase = Phase::Finished(success);
    }

    fn log(&mut self, message: String) {
        self.pending.push_back(Event::Log { message });
    }

    fn push_step(&mut self, graph: &ConstraintGraph, cell: usize, status: StepStatus) {
        self.pending.push_back(Event::Step {
            board: graph.board_snapshot(),
            active_cell: cell,
            domains: graph.domains_snapshot(),
            counters: self.counters,
            status,
        });
    }

    fn push_backtrack(&mut self, graph: &ConstraintGraph, cell: usize, status: StepStatus) {
        self.pending.push_back(Event::Backtrack {
            board: graph.board_snapshot(),
            active_cell: cell,
            domains: graph.domains_snapshot(),
            counters: self.counters,
            status,
        });
    }

    fn push_prune_fail(&mut self, graph: &ConstraintGraph, cell: usize) {
        self.pending.push_back(Event::PruneFail {
            active_cell: cell,
            domains: graph.domains_snapshot(),
            counters: self.counters,
        });
    }
}
