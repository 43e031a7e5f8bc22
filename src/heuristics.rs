use crate::graph::ConstraintGraph;

/// Picks the next cell to branch on: the first unassigned cell in index
/// order, or with MRV the unassigned cell with the smallest current domain
/// (the first such cell wins ties). None when every cell is assigned.
pub fn select_variable(graph: &ConstraintGraph, use_mrv: bool) -> Option<usize> {
    let mut best = None;
    let mut best_size = usize::MAX;
    for cell in 0..graph.cell_count() {
        if graph.value(cell) != 0 {
            continue;
        }
        if !use_mrv {
            return Some(cell);
        }
        let len = graph.domain(cell).len();
        if len < best_size {
            best_size = len;
            best = Some(cell);
        }
    }
    best
}

/// Orders a cell's candidates: plain ascending, or with LCV ascending by how
/// many unassigned neighbors still hold the value in their domain (fewer
/// conflicts first, ties keep the ascending order).
pub fn order_values(graph: &ConstraintGraph, cell: usize, use_lcv: bool) -> Vec<u8> {
    let mut values = graph.domain(cell).values();
    if use_lcv {
        values.sort_by_key(|&v| conflict_count(graph, cell, v));
    }
    values
}

/// How many unassigned neighbors of `cell` would lose `value` if it were
/// placed there.
pub fn conflict_count(graph: &ConstraintGraph, cell: usize, value: u8) -> usize {
    graph.neighbors(cell)
        .iter()
        .filter(|&&n| graph.value(n) == 0 && graph.domain(n).contains(value))
        .count()
}
