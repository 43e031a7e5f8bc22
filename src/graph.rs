use std::fmt::Display;
use crate::core::{board_to_string, DomainSet, Error};
use crate::regions::RegionMap;

/// The values removed from neighboring domains by one forward-checking call,
/// in removal order. Replaying it through `restore_pruned` exactly undoes
/// that call. Each record must be restored exactly once; taking it by value
/// makes a second restore unrepresentable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PruneRecord {
    removed: Vec<(usize, u8)>,
}

impl PruneRecord {
    fn push(&mut self, cell: usize, value: u8) {
        self.removed.push((cell, value));
    }

    pub fn len(&self) -> usize { self.removed.len() }

    pub fn is_empty(&self) -> bool { self.removed.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = (usize, u8)> + '_ {
        self.removed.iter().copied()
    }
}

/// Result of a forward-checking call. On failure the record is partial: it
/// holds everything removed up to and including the removal that emptied a
/// domain, and must still be restored by the caller.
#[derive(Debug)]
pub struct PruneOutcome {
    pub success: bool,
    pub record: PruneRecord,
}

/// One puzzle instance: the board, the per-cell candidate domains, and the
/// all-different neighbor relation derived from rows, columns and the region
/// classifier. Constructed once per puzzle and mutated in place by the
/// AC-3 pass and the search; discarded wholesale on reset.
#[derive(Debug)]
pub struct ConstraintGraph {
    size: usize,
    board: Vec<u8>,
    domains: Vec<DomainSet>,
    neighbors: Vec<Vec<usize>>,
    region: Box<dyn RegionMap>,
}

impl ConstraintGraph {
    pub fn new(board: Vec<u8>, region: Box<dyn RegionMap>) -> Result<Self, Error> {
        let size = region.size();
        if board.len() != size * size {
            return Err(Error::new(format!(
                "Board must have {} cells; got {}", size * size, board.len(),
            )));
        }
        if let Some(&v) = board.iter().find(|&&v| v as usize > size) {
            return Err(Error::new(format!(
                "Board value {} out of range 1..={}", v, size,
            )));
        }
        let domains = board.iter()
            .map(|&v| {
                if v != 0 {
                    DomainSet::singleton(size as u8, v)
                } else {
                    DomainSet::full(size as u8)
                }
            })
            .collect();
        let neighbors = build_neighbors(size, region.as_ref());
        Ok(ConstraintGraph { size, board, domains, neighbors, region })
    }

    pub fn size(&self) -> usize { self.size }

    pub fn cell_count(&self) -> usize { self.size * self.size }

    pub fn board(&self) -> &[u8] { &self.board }

    pub fn value(&self, cell: usize) -> u8 { self.board[cell] }

    pub fn is_complete(&self) -> bool {
        self.board.iter().all(|&v| v != 0)
    }

    pub fn domain(&self, cell: usize) -> &DomainSet { &self.domains[cell] }

    pub fn neighbors(&self, cell: usize) -> &[usize] { &self.neighbors[cell] }

    pub fn region_map(&self) -> &dyn RegionMap { self.region.as_ref() }

    pub fn assign(&mut self, cell: usize, value: u8) {
        debug_assert!(value >= 1 && value as usize <= self.size);
        self.board[cell] = value;
    }

    pub fn unassign(&mut self, cell: usize) {
        self.board[cell] = 0;
    }

    /// Removes a candidate from a cell's domain; returns whether it was
    /// present. Used by the AC-3 pass, which prunes without assigning.
    pub fn remove_candidate(&mut self, cell: usize, value: u8) -> bool {
        self.domains[cell].remove(value)
    }

    /// True iff no neighbor's board entry currently equals `value`. Pure and
    /// board-based; domains are not consulted.
    pub fn is_consistent(&self, cell: usize, value: u8) -> bool {
        self.neighbors[cell].iter().all(|&n| self.board[n] != value)
    }

    /// Forward checking: removes `value` from the domain of every unassigned
    /// neighbor that still holds it. Short-circuits with failure the moment
    /// a neighbor's domain empties; the partial record accumulated so far is
    /// returned either way and must be restored by the caller.
    pub fn prune_neighbors(&mut self, cell: usize, value: u8) -> PruneOutcome {
        let mut record = PruneRecord::default();
        for i in 0..self.neighbors[cell].len() {
            let neighbor = self.neighbors[cell][i];
            if self.board[neighbor] != 0 {
                continue;
            }
            if self.domains[neighbor].remove(value) {
                record.push(neighbor, value);
                if self.domains[neighbor].is_empty() {
                    return PruneOutcome { success: false, record };
                }
            }
        }
        PruneOutcome { success: true, record }
    }

    /// Undoes one prune call. Set semantics keep the restored domains
    /// ascending and duplicate-free.
    pub fn restore_pruned(&mut self, record: PruneRecord) {
        for (cell, value) in record.iter() {
            self.domains[cell].insert(value);
        }
    }

    /// Independent deep copy of the board, for observation events.
    pub fn board_snapshot(&self) -> Vec<u8> {
        self.board.clone()
    }

    /// Independent deep copy of every cell's candidate list, ascending.
    pub fn domains_snapshot(&self) -> Vec<Vec<u8>> {
        self.domains.iter().map(|d| d.values()).collect()
    }
}

impl Display for ConstraintGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", board_to_string(&self.board, self.size))
    }
}

fn build_neighbors(size: usize, region: &dyn RegionMap) -> Vec<Vec<usize>> {
    let total = size * size;
    let mut neighbors = Vec::with_capacity(total);
    for i in 0..total {
        let (row, col) = (i / size, i % size);
        let my_region = region.region_of(row, col);
        let mut mine = Vec::new();
        for j in 0..total {
            if i == j {
                continue;
            }
            let (r, c) = (j / size, j % size);
            let same_region = match (my_region, region.region_of(r, c)) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            };
            if r == row || c == col || same_region {
                mine.push(j);
            }
        }
        neighbors.push(mine);
    }
    neighbors
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::regions::{builtin_jigsaw, BoxRegions, NoRegions};

    fn standard_empty() -> ConstraintGraph {
        ConstraintGraph::new(vec![0; 81], Box::new(BoxRegions::standard())).unwrap()
    }

    #[test]
    fn test_rejects_malformed_boards() {
        assert!(ConstraintGraph::new(vec![0; 80], Box::new(BoxRegions::standard())).is_err());
        let mut board = vec![0; 81];
        board[3] = 10;
        assert!(ConstraintGraph::new(board, Box::new(BoxRegions::standard())).is_err());
    }

    #[test]
    fn test_initial_domains() {
        let mut b = vec![0; 81];
        b[0] = 5;
        let g = ConstraintGraph::new(b, Box::new(BoxRegions::standard())).unwrap();
        assert_eq!(g.domain(0).values(), vec![5]);
        assert_eq!(g.domain(1).values(), vec![1, 2, 3, 4, 5, 6, 7, 8, 9]);
    }

    #[test]
    fn test_neighbor_symmetry_and_irreflexivity() {
        for g in [
            standard_empty(),
            ConstraintGraph::new(
                vec![0; 36],
                Box::new(builtin_jigsaw("Snake").unwrap().clone()),
            ).unwrap(),
            ConstraintGraph::new(vec![0; 36], Box::new(NoRegions::new(6))).unwrap(),
        ] {
            for i in 0..g.cell_count() {
                assert!(!g.neighbors(i).contains(&i));
                for &j in g.neighbors(i) {
                    assert!(
                        g.neighbors(j).contains(&i),
                        "{} ~ {} but not {} ~ {}", i, j, j, i,
                    );
                }
            }
        }
    }

    #[test]
    fn test_standard_neighbor_count() {
        // 8 in the row + 8 in the column + 4 more in the box.
        let g = standard_empty();
        for i in 0..81 {
            assert_eq!(g.neighbors(i).len(), 20, "cell {}", i);
        }
    }

    #[test]
    fn test_no_regions_neighbor_count() {
        let g = ConstraintGraph::new(vec![0; 36], Box::new(NoRegions::new(6))).unwrap();
        for i in 0..36 {
            assert_eq!(g.neighbors(i).len(), 10);
        }
    }

    #[test]
    fn test_is_consistent() {
        let mut g = standard_empty();
        g.assign(0, 5);
        // Same row.
        assert!(!g.is_consistent(8, 5));
        // Same column.
        assert!(!g.is_consistent(72, 5));
        // Same box.
        assert!(!g.is_consistent(10, 5));
        // Unrelated cell.
        assert!(g.is_consistent(40, 5));
        assert!(g.is_consistent(8, 6));
    }

    #[test]
    fn test_prune_restore_round_trip() {
        let mut g = standard_empty();
        let before = g.domains_snapshot();
        let outcome = g.prune_neighbors(0, 5);
        assert!(outcome.success);
        assert_eq!(outcome.record.len(), 20);
        for &n in &[1usize, 9, 10] {
            assert!(!g.domain(n).contains(5));
        }
        g.restore_pruned(outcome.record);
        assert_eq!(g.domains_snapshot(), before);
    }

    #[test]
    fn test_prune_skips_assigned_and_missing() {
        let mut g = standard_empty();
        g.assign(1, 3);
        g.remove_candidate(9, 5);
        let outcome = g.prune_neighbors(0, 5);
        assert!(outcome.success);
        // Cell 1 is assigned and cell 9 already lost the 5; 18 removals left.
        assert_eq!(outcome.record.len(), 18);
        assert!(outcome.record.iter().all(|(c, _)| c != 1 && c != 9));
        g.restore_pruned(outcome.record);
    }

    #[test]
    fn test_prune_short_circuits_on_emptied_domain() {
        let mut g = standard_empty();
        // Leave cell 1 with nothing but a 5, so pruning 5s from cell 0's
        // neighbors empties it immediately.
        for v in [1u8, 2, 3, 4, 6, 7, 8, 9] {
            g.remove_candidate(1, v);
        }
        let outcome = g.prune_neighbors(0, 5);
        assert!(!outcome.success);
        // Cell 1 is the first neighbor, so the partial record stops there.
        assert_eq!(outcome.record.iter().collect::<Vec<_>>(), vec![(1, 5)]);
        assert!(g.domain(1).is_empty());
        // Untouched neighbors keep their 5s.
        assert!(g.domain(2).contains(5));
        // Restoring the partial record still applies, per the contract.
        g.restore_pruned(outcome.record);
        assert_eq!(g.domain(1).values(), vec![5]);
    }

    #[test]
    fn test_snapshots_are_deep_copies() {
        let mut g = standard_empty();
        let board = g.board_snapshot();
        let domains = g.domains_snapshot();
        g.assign(0, 9);
        g.remove_candidate(1, 9);
        assert_eq!(board[0], 0);
        assert!(domains[1].contains(&9));
    }
}
