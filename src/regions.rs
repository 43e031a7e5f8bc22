use std::collections::HashMap;
use std::fmt::Debug;
use crate::core::Error;

/// A region classifier: assigns cells to all-different regions, generalizing
/// the fixed 3x3 box of standard Sudoku. Returning `None` means the cell is
/// under no regional constraint (rows and columns still apply).
pub trait RegionMap: Debug {
    fn size(&self) -> usize;
    fn region_of(&self, row: usize, col: usize) -> Option<usize>;
}

/// Rectangular boxes tiling the grid, e.g. the standard 3x3 boxes of 9x9
/// Sudoku.
#[derive(Debug, Clone)]
pub struct BoxRegions {
    size: usize,
    box_rows: usize,
    box_cols: usize,
}

impl BoxRegions {
    pub fn new(size: usize, box_rows: usize, box_cols: usize) -> Result<Self, Error> {
        if box_rows == 0 || box_cols == 0 || size % box_rows != 0 || size % box_cols != 0 {
            return Err(Error::new(format!(
                "{}x{} boxes do not tile a {}x{} grid", box_rows, box_cols, size, size,
            )));
        }
        Ok(BoxRegions { size, box_rows, box_cols })
    }

    /// The classic 9x9 layout.
    pub fn standard() -> Self {
        BoxRegions { size: 9, box_rows: 3, box_cols: 3 }
    }
}

impl RegionMap for BoxRegions {
    fn size(&self) -> usize { self.size }

    fn region_of(&self, row: usize, col: usize) -> Option<usize> {
        let boxes_per_row = self.size / self.box_cols;
        Some((row / self.box_rows) * boxes_per_row + col / self.box_cols)
    }
}

/// Rows and columns only; every cell reports the no-region sentinel. Solving
/// under this classifier produces Latin squares.
#[derive(Debug, Clone)]
pub struct NoRegions {
    size: usize,
}

impl NoRegions {
    pub fn new(size: usize) -> Self { NoRegions { size } }
}

impl RegionMap for NoRegions {
    fn size(&self) -> usize { self.size }
    fn region_of(&self, _: usize, _: usize) -> Option<usize> { None }
}

/// Broken left diagonals: cell (r, c) belongs to region (r + c) % size.
/// Regions are not contiguous, and for some even sizes no complete
/// assignment exists at all, so generation on this map can fail.
#[derive(Debug, Clone)]
pub struct DiagonalRegions {
    size: usize,
}

impl DiagonalRegions {
    pub fn new(size: usize) -> Self { DiagonalRegions { size } }
}

impl RegionMap for DiagonalRegions {
    fn size(&self) -> usize { self.size }
    fn region_of(&self, row: usize, col: usize) -> Option<usize> {
        Some((row + col) % self.size)
    }
}

/// An irregular ("jigsaw") partition of the grid into `size` orthogonally
/// connected regions of `size` cells each.
#[derive(Debug, Clone)]
pub struct JigsawMap {
    size: usize,
    cells: Vec<usize>,
}

impl JigsawMap {
    pub fn from_cells(size: usize, cells: Vec<usize>) -> Result<Self, Error> {
        if cells.len() != size * size {
            return Err(Error::new(format!(
                "Region map must cover all {} cells; got {}", size * size, cells.len(),
            )));
        }
        let mut members: Vec<Vec<usize>> = vec![Vec::new(); size];
        for (i, &region) in cells.iter().enumerate() {
            if region >= size {
                return Err(Error::new(format!(
                    "Region id {} out of range for a size-{} map", region, size,
                )));
            }
            members[region].push(i);
        }
        for (region, cells_in_region) in members.iter().enumerate() {
            if cells_in_region.len() != size {
                return Err(Error::new(format!(
                    "Region {} has {} cells; every region must have {}",
                    region, cells_in_region.len(), size,
                )));
            }
            check_orthogonally_connected(size, region, cells_in_region)?;
        }
        Ok(JigsawMap { size, cells })
    }

    /// Parses a drawn region grid: one non-whitespace character per cell,
    /// equal characters meaning the same region. Region ids are assigned in
    /// sorted character order.
    pub fn from_grid(size: usize, s: &str) -> Result<Self, Error> {
        let labels: Vec<char> = s.chars().filter(|c| !c.is_whitespace()).collect();
        if labels.len() != size * size {
            return Err(Error::new(format!(
                "Expected {} region labels, got {}", size * size, labels.len(),
            )));
        }
        let mut sorted = labels.clone();
        sorted.sort();
        sorted.dedup();
        let ids: HashMap<char, usize> =
            sorted.into_iter().enumerate().map(|(id, ch)| (ch, id)).collect();
        Self::from_cells(size, labels.into_iter().map(|ch| ids[&ch]).collect())
    }

    pub fn region_at(&self, cell: usize) -> usize {
        self.cells[cell]
    }
}

impl RegionMap for JigsawMap {
    fn size(&self) -> usize { self.size }

    fn region_of(&self, row: usize, col: usize) -> Option<usize> {
        Some(self.cells[row * self.size + col])
    }
}

/// Union-find over linear cell indices, for the connectivity check.
struct DisjointSet {
    parents: Vec<usize>,
}

impl DisjointSet {
    fn new(n: usize) -> Self {
        Self { parents: (0..n).collect() }
    }

    fn unite(&mut self, a: usize, b: usize) {
        let pa = self.find(a);
        let pb = self.find(b);
        self.parents[pa] = pb;
    }

    fn find(&mut self, x: usize) -> usize {
        let parent = self.parents[x];
        if parent == x {
            x
        } else {
            let p = self.find(parent);
            self.parents[x] = p;
            p
        }
    }
}

fn check_orthogonally_connected(size: usize, region: usize, cells: &[usize]) -> Result<(), Error> {
    let mut uf = DisjointSet::new(size * size);
    let in_region = |cell: usize| cells.contains(&cell);
    for &cell in cells {
        let (r, c) = (cell / size, cell % size);
        if r > 0 && in_region(cell - size) {
            uf.unite(cell - size, cell);
        }
        if c > 0 && in_region(cell - 1) {
            uf.unite(cell - 1, cell);
        }
    }
    let rep = uf.find(cells[0]);
    for &cell in cells {
        if uf.find(cell) != rep {
            return Err(Error::new(format!(
                "Region {} is not orthogonally connected (cell {} is cut off)",
                region, cell,
            )));
        }
    }
    Ok(())
}

/// A jigsaw map with a display name, for menus and the demo binary.
pub struct NamedMap {
    pub name: &'static str,
    pub map: JigsawMap,
}

const MAP_VERTICAL: [usize; 36] = [
    0, 0, 1, 1, 2, 2,
    0, 0, 1, 1, 2, 2,
    0, 0, 1, 1, 2, 2,
    3, 3, 4, 4, 5, 5,
    3, 3, 4, 4, 5, 5,
    3, 3, 4, 4, 5, 5,
];

const MAP_HORIZONTAL: [usize; 36] = [
    0, 0, 0, 1, 1, 1,
    0, 0, 0, 1, 1, 1,
    2, 2, 2, 3, 3, 3,
    2, 2, 2, 3, 3, 3,
    4, 4, 4, 5, 5, 5,
    4, 4, 4, 5, 5, 5,
];

const MAP_SNAKE: [usize; 36] = [
    0, 0, 1, 1, 1, 5,
    0, 2, 1, 1, 3, 5,
    0, 2, 1, 3, 3, 5,
    0, 2, 2, 2, 3, 5,
    0, 4, 4, 2, 3, 5,
    4, 4, 4, 4, 3, 5,
];

const MAP_STEPS: [usize; 36] = [
    0, 0, 0, 1, 1, 1,
    2, 0, 0, 0, 1, 1,
    2, 2, 3, 3, 1, 4,
    2, 2, 2, 3, 4, 4,
    5, 5, 3, 3, 3, 4,
    5, 5, 5, 5, 4, 4,
];

lazy_static::lazy_static! {
    /// The built-in 6x6 jigsaw library.
    pub static ref JIGSAW_MAPS: Vec<NamedMap> = vec![
        NamedMap {
            name: "Vertical (2x3)",
            map: JigsawMap::from_cells(6, MAP_VERTICAL.to_vec()).unwrap(),
        },
        NamedMap {
            name: "Horizontal (3x2)",
            map: JigsawMap::from_cells(6, MAP_HORIZONTAL.to_vec()).unwrap(),
        },
        NamedMap {
            name: "Snake",
            map: JigsawMap::from_cells(6, MAP_SNAKE.to_vec()).unwrap(),
        },
        NamedMap {
            name: "Steps",
            map: JigsawMap::from_cells(6, MAP_STEPS.to_vec()).unwrap(),
        },
    ];
}

pub fn builtin_jigsaw(name: &str) -> Option<&'static JigsawMap> {
    JIGSAW_MAPS.iter().find(|m| m.name == name).map(|m| &m.map)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_standard_boxes() {
        let boxes = BoxRegions::standard();
        assert_eq!(boxes.size(), 9);
        assert_eq!(boxes.region_of(0, 0), Some(0));
        assert_eq!(boxes.region_of(0, 8), Some(2));
        assert_eq!(boxes.region_of(4, 4), Some(4));
        assert_eq!(boxes.region_of(8, 0), Some(6));
        assert_eq!(boxes.region_of(8, 8), Some(8));
    }

    #[test]
    fn test_box_regions_must_tile() {
        assert!(BoxRegions::new(6, 2, 3).is_ok());
        assert!(BoxRegions::new(6, 3, 2).is_ok());
        assert!(BoxRegions::new(6, 4, 3).is_err());
        assert!(BoxRegions::new(9, 0, 3).is_err());
    }

    #[test]
    fn test_no_regions_sentinel() {
        let none = NoRegions::new(6);
        for r in 0..6 {
            for c in 0..6 {
                assert_eq!(none.region_of(r, c), None);
            }
        }
    }

    #[test]
    fn test_builtin_maps_validate() {
        assert_eq!(JIGSAW_MAPS.len(), 4);
        for named in JIGSAW_MAPS.iter() {
            assert_eq!(named.map.size(), 6);
        }
        assert!(builtin_jigsaw("Snake").is_some());
        assert!(builtin_jigsaw("Spiral").is_none());
    }

    #[test]
    fn test_vertical_map_layout() {
        let map = builtin_jigsaw("Vertical (2x3)").unwrap();
        assert_eq!(map.region_of(0, 0), Some(0));
        assert_eq!(map.region_of(2, 1), Some(0));
        assert_eq!(map.region_of(0, 2), Some(1));
        assert_eq!(map.region_of(5, 5), Some(5));
    }

    #[test]
    fn test_from_grid() {
        let map = JigsawMap::from_grid(6, "
            aabbcc
            aabbcc
            aabbcc
            ddeeff
            ddeeff
            ddeeff
        ").unwrap();
        assert_eq!(map.cells, MAP_VERTICAL.to_vec());
    }

    #[test]
    fn test_rejects_uneven_regions() {
        // Region 0 has 7 cells, region 5 has 5.
        let mut cells = MAP_VERTICAL.to_vec();
        cells[35] = 0;
        assert!(JigsawMap::from_cells(6, cells).is_err());
    }

    #[test]
    fn test_rejects_out_of_range_region() {
        let mut cells = MAP_VERTICAL.to_vec();
        cells[0] = 6;
        assert!(JigsawMap::from_cells(6, cells).is_err());
    }

    #[test]
    fn test_rejects_disconnected_region() {
        // Swap two far-apart cells between regions 0 and 5; both end up split.
        let mut cells = MAP_VERTICAL.to_vec();
        cells.swap(0, 35);
        assert!(JigsawMap::from_cells(6, cells).is_err());
    }

    #[test]
    fn test_diagonal_regions() {
        let diag = DiagonalRegions::new(6);
        assert_eq!(diag.region_of(0, 0), Some(0));
        assert_eq!(diag.region_of(2, 3), Some(5));
        assert_eq!(diag.region_of(5, 5), Some(4));
    }
}
