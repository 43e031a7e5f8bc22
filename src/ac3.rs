use std::collections::VecDeque;
use serde_derive::{Deserialize, Serialize};
use crate::graph::ConstraintGraph;

/// What one AC-3 step observed: either a successful revision (the domain of
/// `cell` lost at least one value), or the terminal verdict. The terminal
/// event is re-delivered on every call after completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Ac3Event {
    Pruned { cell: usize },
    Finished { consistent: bool, revisions: usize },
}

/// Terminal result of a pass: whether the instance survived, and how many
/// successful revisions it took to get there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ac3Outcome {
    pub consistent: bool,
    pub revisions: usize,
}

/// Removes from `domain(xi)` every value for which `domain(xj)` offers no
/// different value; returns whether anything was removed. At a fixed point
/// this is false for every arc.
pub fn revise(graph: &mut ConstraintGraph, xi: usize, xj: usize) -> bool {
    let mut revised = false;
    for v in graph.domain(xi).values() {
        let allowed = graph.domain(xj).iter().any(|y| y != v);
        if !allowed {
            graph.remove_candidate(xi, v);
            revised = true;
        }
    }
    revised
}

/// The AC-3 preprocessing pass as a resumable worklist machine. It only
/// prunes domains, never assigns board values. Feed it the same graph on
/// every call.
#[derive(Debug)]
pub struct Ac3Pass {
    queue: VecDeque<(usize, usize)>,
    revisions: usize,
    finished: Option<bool>,
}

impl Ac3Pass {
    /// Seeds the worklist with every ordered neighbor arc of the instance.
    pub fn new(graph: &ConstraintGraph) -> Self {
        let mut queue = VecDeque::new();
        for i in 0..graph.cell_count() {
            for &n in graph.neighbors(i) {
                queue.push_back((i, n));
            }
        }
        Ac3Pass { queue, revisions: 0, finished: None }
    }

    pub fn revisions(&self) -> usize { self.revisions }

    pub fn is_finished(&self) -> bool { self.finished.is_some() }

    /// Works the queue until one observable event happens and returns it.
    pub fn step(&mut self, graph: &mut ConstraintGraph) -> Ac3Event {
        if let Some(consistent) = self.finished {
            return Ac3Event::Finished { consistent, revisions: self.revisions };
        }
        while let Some((xi, xj)) = self.queue.pop_front() {
            if !revise(graph, xi, xj) {
                continue;
            }
            self.revisions += 1;
            if graph.domain(xi).is_empty() {
                // Unsatisfiable before any assignment.
                self.finished = Some(false);
                return Ac3Event::Finished { consistent: false, revisions: self.revisions };
            }
            for k in 0..graph.neighbors(xi).len() {
                let n = graph.neighbors(xi)[k];
                if n != xj {
                    self.queue.push_back((n, xi));
                }
            }
            return Ac3Event::Pruned { cell: xi };
        }
        self.finished = Some(true);
        Ac3Event::Finished { consistent: true, revisions: self.revisions }
    }

    /// Drains the pass to completion.
    pub fn run(&mut self, graph: &mut ConstraintGraph) -> Ac3Outcome {
        loop {
            if let Ac3Event::Finished { consistent, revisions } = self.step(graph) {
                return Ac3Outcome { consistent, revisions };
            }
        }
    }
}

/// One-shot convenience over a fresh pass.
pub fn enforce_arc_consistency(graph: &mut ConstraintGraph) -> Ac3Outcome {
    Ac3Pass::new(graph).run(graph)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::regions::{BoxRegions, NoRegions};

    fn nine_by_nine(givens: &[(usize, u8)]) -> ConstraintGraph {
        let mut board = vec![0u8; 81];
        for &(cell, v) in givens {
            board[cell] = v;
        }
        ConstraintGraph::new(board, Box::new(BoxRegions::standard())).unwrap()
    }

    #[test]
    fn test_revise_drops_singleton_conflicts() {
        let mut g = nine_by_nine(&[(0, 5)]);
        // Cell 0's domain is {5}, so the arc (1, 0) loses exactly the 5.
        assert!(revise(&mut g, 1, 0));
        assert_eq!(g.domain(1).values(), vec![1, 2, 3, 4, 6, 7, 8, 9]);
        // A second revision of the same arc removes nothing further.
        assert!(!revise(&mut g, 1, 0));
        // The reverse arc never fires: cell 1 still offers non-5 values.
        assert!(!revise(&mut g, 0, 1));
    }

    #[test]
    fn test_pass_reaches_fixed_point() {
        let mut g = nine_by_nine(&[(0, 5), (1, 3), (40, 7)]);
        let outcome = enforce_arc_consistency(&mut g);
        assert!(outcome.consistent);
        assert!(outcome.revisions > 0);
        for i in 0..g.cell_count() {
            for j in Vec::from(g.neighbors(i)) {
                assert!(!revise(&mut g, i, j), "arc ({}, {}) not at fixed point", i, j);
            }
        }
    }

    #[test]
    fn test_pass_never_assigns() {
        let mut g = nine_by_nine(&[(0, 5), (10, 2)]);
        let before = g.board_snapshot();
        enforce_arc_consistency(&mut g);
        assert_eq!(g.board(), &before[..]);
    }

    #[test]
    fn test_pass_proves_unsatisfiable() {
        // Row 0 pins values 1..=5 and the column supplies the 6, leaving
        // cell (0, 5) with nothing.
        let mut board = vec![0u8; 36];
        for c in 0..5 {
            board[c] = (c + 1) as u8;
        }
        board[11] = 6; // (1, 5)
        let mut g = ConstraintGraph::new(board, Box::new(NoRegions::new(6))).unwrap();
        let outcome = enforce_arc_consistency(&mut g);
        assert!(!outcome.consistent);
        assert!(g.domain(5).is_empty());
    }

    #[test]
    fn test_step_events_and_completion_resignal() {
        let mut g = nine_by_nine(&[(0, 5)]);
        let mut pass = Ac3Pass::new(&g);
        let mut pruned = 0;
        let outcome = loop {
            match pass.step(&mut g) {
                Ac3Event::Pruned { cell } => {
                    assert!(cell < g.cell_count());
                    pruned += 1;
                }
                Ac3Event::Finished { consistent, revisions } => {
                    break Ac3Outcome { consistent, revisions };
                }
            }
        };
        assert!(outcome.consistent);
        assert_eq!(pruned, outcome.revisions);
        assert!(pass.is_finished());
        // Stepping a finished pass re-signals the terminal event.
        assert_eq!(
            pass.step(&mut g),
            Ac3Event::Finished { consistent: true, revisions: outcome.revisions },
        );
    }
}
