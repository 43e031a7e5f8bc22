use crate::ac3::{Ac3Outcome, Ac3Pass};
use crate::core::{Counters, Error};
use crate::events::{Event, Mood};
use crate::graph::ConstraintGraph;
use crate::regions::RegionMap;
use crate::replay::ReplayBuffer;
use crate::solver::{SearchConfig, StepSolver};

/// Owns the single live instance: the constraint graph, the suspended
/// search continuation, and the replay history, all discarded together on
/// load. Exactly one instance is live at a time; overlapping solves cannot
/// share state. Inter-step pacing (animation delays and the like) is the
/// host's business — the session just hands out one event per request.
#[derive(Debug)]
pub struct Session {
    graph: ConstraintGraph,
    solver: StepSolver,
    replay: ReplayBuffer,
    preprocess: Option<Ac3Outcome>,
    started: bool,
}

impl Session {
    pub fn new(
        board: Vec<u8>,
        region: Box<dyn RegionMap>,
        config: SearchConfig,
    ) -> Result<Self, Error> {
        Ok(Session {
            graph: ConstraintGraph::new(board, region)?,
            solver: StepSolver::new(config),
            replay: ReplayBuffer::new(),
            preprocess: None,
            started: false,
        })
    }

    /// Replaces the live instance wholesale: previous board, domains,
    /// continuation and history are all dropped before the new solve can
    /// begin.
    pub fn load(
        &mut self,
        board: Vec<u8>,
        region: Box<dyn RegionMap>,
        config: SearchConfig,
    ) -> Result<(), Error> {
        *self = Session::new(board, region, config)?;
        Ok(())
    }

    /// Runs the AC-3 pass over the live instance. Only available before the
    /// first step; afterwards it is a no-op returning None.
    pub fn preprocess(&mut self) -> Option<Ac3Outcome> {
        if self.started {
            return None;
        }
        let outcome = Ac3Pass::new(&self.graph).run(&mut self.graph);
        self.preprocess = Some(outcome);
        Some(outcome)
    }

    pub fn preprocess_outcome(&self) -> Option<Ac3Outcome> {
        self.preprocess
    }

    /// Pulls one live event from the search and records it. Once the
    /// terminal event is in the history, further calls re-deliver it
    /// without re-entering the solver or growing the history.
    pub fn step(&mut self) -> &Event {
        self.started = true;
        if matches!(self.replay.last(), Some(Event::Done { .. })) {
            return self.replay.last().unwrap();
        }
        // An AC-3 pass that emptied a domain already proved the instance
        // unsatisfiable; surface that as the terminal event instead of
        // grinding through a search that cannot succeed.
        if self.preprocess.map_or(false, |o| !o.consistent) {
            self.replay.record(Event::Done { success: false });
            return self.replay.last().unwrap();
        }
        let event = self.solver.next_event(&mut self.graph);
        self.replay.record(event);
        self.replay.last().unwrap()
    }

    /// Replays one event backward. Pure cache read; the live instance is
    /// untouched.
    pub fn back(&mut self) -> Option<&Event> {
        self.replay.back()
    }

    /// Replays one event forward. Pure cache read; the live instance is
    /// untouched.
    pub fn forward(&mut self) -> Option<&Event> {
        self.replay.forward()
    }

    /// The event under the replay cursor.
    pub fn current(&self) -> Option<&Event> {
        self.replay.current()
    }

    /// Companion mood for the event under the cursor.
    pub fn mood(&self) -> Mood {
        self.replay.current().map_or(Mood::Idle, Mood::for_event)
    }

    pub fn is_done(&self) -> bool {
        matches!(self.replay.last(), Some(Event::Done { .. }))
    }

    pub fn board(&self) -> &[u8] {
        self.graph.board()
    }

    pub fn graph(&self) -> &ConstraintGraph {
        &self.graph
    }

    pub fn counters(&self) -> Counters {
        self.solver.counters()
    }

    pub fn config(&self) -> SearchConfig {
        self.solver.config()
    }

    pub fn history(&self) -> &[Event] {
        self.replay.events()
    }

    /// Drives the live solve to completion, recording everything. Returns
    /// overall success.
    pub fn run_to_completion(&mut self) -> bool {
        loop {
            if let Event::Done { success } = self.step() {
                return *success;
            }
        }
    }
}
