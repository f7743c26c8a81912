//! Occupancy grid and widget footprints

use serde::{Deserialize, Serialize};

/// A rectangular cell range owned by one widget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Footprint {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Footprint {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        debug_assert!(width >= 1 && height >= 1, "empty footprint");
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Number of cells covered
    pub fn area(&self) -> u32 {
        self.width * self.height
    }

    /// 2x2 block
    pub fn is_large(&self) -> bool {
        self.width == 2 && self.height == 2
    }

    /// Whether the cell (cx, cy) lies inside
    pub fn contains(&self, cx: u32, cy: u32) -> bool {
        cx >= self.x && cx < self.x + self.width && cy >= self.y && cy < self.y + self.height
    }

    /// Whether two footprints share at least one cell
    pub fn intersects(&self, other: &Footprint) -> bool {
        self.x < other.x + other.width
            && other.x < self.x + self.width
            && self.y < other.y + other.height
            && other.y < self.y + self.height
    }

    /// Iterate the covered cells column by column
    pub fn cells(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        (self.x..self.x + self.width)
            .flat_map(move |cx| (self.y..self.y + self.height).map(move |cy| (cx, cy)))
    }
}

/// `cols x rows` boolean matrix, `true` = cell already claimed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccupancyGrid {
    cols: u32,
    rows: u32,
    /// Column-major: index = x * rows + y
    cells: Vec<bool>,
}

impl OccupancyGrid {
    /// Create an empty grid
    pub fn new(cols: u32, rows: u32) -> Self {
        debug_assert!(cols >= 1 && rows >= 1, "grid dimensions must be positive");
        Self {
            cols,
            rows,
            cells: vec![false; (cols * rows) as usize],
        }
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        (x * self.rows + y) as usize
    }

    /// Whether (x, y) is claimed; out-of-bounds cells count as claimed
    #[inline]
    pub fn is_occupied(&self, x: u32, y: u32) -> bool {
        if x >= self.cols || y >= self.rows {
            return true;
        }
        self.cells[self.index(x, y)]
    }

    /// Whether a `w x h` block at (x, y) is in bounds and entirely free
    pub fn can_place(&self, x: u32, y: u32, w: u32, h: u32) -> bool {
        if x + w > self.cols || y + h > self.rows {
            return false;
        }
        (x..x + w).all(|cx| (y..y + h).all(|cy| !self.cells[self.index(cx, cy)]))
    }

    /// Claim every cell of a footprint
    pub fn occupy(&mut self, footprint: &Footprint) {
        debug_assert!(
            self.can_place(footprint.x, footprint.y, footprint.width, footprint.height),
            "footprint {:?} overlaps or leaves the grid",
            footprint
        );
        for (cx, cy) in footprint.cells() {
            let i = self.index(cx, cy);
            self.cells[i] = true;
        }
    }

    /// Length of the free run starting at (x, y) and going down
    pub fn free_run_down(&self, x: u32, y: u32) -> u32 {
        (y..self.rows)
            .take_while(|&cy| !self.is_occupied(x, cy))
            .count() as u32
    }

    /// Length of the free run starting at (x, y) and going right
    pub fn free_run_right(&self, x: u32, y: u32) -> u32 {
        (x..self.cols)
            .take_while(|&cx| !self.is_occupied(cx, y))
            .count() as u32
    }

    /// Every cell claimed
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|&c| c)
    }

    /// Number of free cells left
    pub fn free_count(&self) -> usize {
        self.cells.iter().filter(|&&c| !c).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_can_place_bounds_and_overlap() {
        let mut grid = OccupancyGrid::new(3, 6);
        assert!(grid.can_place(1, 4, 2, 2));
        assert!(!grid.can_place(2, 4, 2, 2));
        assert!(!grid.can_place(0, 5, 1, 2));

        grid.occupy(&Footprint::new(1, 1, 2, 2));
        assert!(!grid.can_place(0, 0, 2, 2));
        assert!(grid.can_place(0, 0, 1, 6));
        assert_eq!(grid.free_count(), 14);
    }

    #[test]
    fn test_free_runs_stop_at_claimed_cells() {
        let mut grid = OccupancyGrid::new(3, 6);
        grid.occupy(&Footprint::new(0, 3, 1, 1));
        assert_eq!(grid.free_run_down(0, 0), 3);
        assert_eq!(grid.free_run_down(0, 4), 2);
        assert_eq!(grid.free_run_right(0, 0), 3);
        assert_eq!(grid.free_run_right(1, 3), 2);
        assert_eq!(grid.free_run_right(0, 3), 0);
    }

    #[test]
    fn test_footprint_intersects() {
        let a = Footprint::new(0, 0, 2, 2);
        assert!(a.intersects(&Footprint::new(1, 1, 1, 3)));
        assert!(!a.intersects(&Footprint::new(2, 0, 1, 2)));
        assert!(!a.intersects(&Footprint::new(0, 2, 3, 1)));
        assert_eq!(a.cells().count(), 4);
        assert!(a.contains(1, 1));
        assert!(!a.contains(2, 1));
    }
}
