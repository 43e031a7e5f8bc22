use rand::seq::SliceRandom;
use rand::Rng;
use crate::regions::RegionMap;

pub const STANDARD_MIN_HOLES: usize = 30;
pub const STANDARD_MAX_HOLES: usize = 58;
pub const JIGSAW_BASE_HOLES: usize = 10;
pub const JIGSAW_HOLE_SPREAD: usize = 15;

// Bounds the retry loop in hole punching so a pathological draw sequence
// cannot spin forever.
const HOLE_RETRY_BUDGET: usize = 500;

/// Fills a complete valid board by randomized backtracking: for each empty
/// cell in index order, try a shuffled candidate list, recurse, undo on a
/// dead end. No heuristics, no observations. Returns `None` when the region
/// map admits no complete assignment at all; termination is the natural
/// exhaustion of the search.
pub fn generate_full_solution<R: Rng>(region: &dyn RegionMap, rng: &mut R) -> Option<Vec<u8>> {
    let size = region.size();
    let mut board = vec![0u8; size * size];
    if fill_from(&mut board, region, 0, rng) {
        Some(board)
    } else {
        None
    }
}

fn fill_from<R: Rng>(board: &mut [u8], region: &dyn RegionMap, cell: usize, rng: &mut R) -> bool {
    if cell == board.len() {
        return true;
    }
    let size = region.size();
    let mut values: Vec<u8> = (1..=size as u8).collect();
    values.shuffle(rng);
    for v in values {
        if placement_valid(board, region, cell, v) {
            board[cell] = v;
            if fill_from(board, region, cell + 1, rng) {
                return true;
            }
            board[cell] = 0;
        }
    }
    false
}

fn placement_valid(board: &[u8], region: &dyn RegionMap, cell: usize, value: u8) -> bool {
    let size = region.size();
    let (row, col) = (cell / size, cell % size);
    let my_region = region.region_of(row, col);
    for other in 0..board.len() {
        if board[other] != value {
            continue;
        }
        let (r, c) = (other / size, other % size);
        if r == row || c == col {
            return false;
        }
        if let (Some(a), Some(b)) = (my_region, region.region_of(r, c)) {
            if a == b {
                return false;
            }
        }
    }
    true
}

/// Number of cells emptied for a difficulty in [0, 1]: 6x6 jigsaw boards
/// scale 10..=25, standard boards 30..=58.
pub fn hole_count(size: usize, difficulty: f64) -> usize {
    let d = difficulty.clamp(0.0, 1.0);
    match size {
        6 => (JIGSAW_BASE_HOLES as f64 + d * JIGSAW_HOLE_SPREAD as f64).floor() as usize,
        _ => {
            let spread = (STANDARD_MAX_HOLES - STANDARD_MIN_HOLES) as f64;
            (STANDARD_MIN_HOLES as f64 + d * spread).floor() as usize
        }
    }
}

/// Generates a playable puzzle: a full random solution with `hole_count`
/// holes punched at uniformly random cells. Selection retries on
/// already-empty cells, so under an extremely unlucky draw sequence the
/// retry budget can leave the board a few holes short. If the region map
/// admits no full solution, the all-empty board is returned instead of
/// stalling. Solutions are not guaranteed to be unique.
pub fn generate_puzzle<R: Rng>(region: &dyn RegionMap, difficulty: f64, rng: &mut R) -> Vec<u8> {
    let size = region.size();
    let total = size * size;
    let mut board = match generate_full_solution(region, rng) {
        Some(board) => board,
        None => return vec![0; total],
    };
    let mut remaining = hole_count(size, difficulty);
    let mut budget = HOLE_RETRY_BUDGET;
    while remaining > 0 && budget > 0 {
        let cell = rng.random_range(0..total);
        if board[cell] != 0 {
            board[cell] = 0;
            remaining -= 1;
        }
        budget -= 1;
    }
    board
}
