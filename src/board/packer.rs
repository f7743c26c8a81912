//! Procedural board packing
//!
//! Greedy, non-backtracking tiling of the occupancy grid:
//! 1. drop a few 2x2 blocks at random positions (bounded retries)
//! 2. scan the rest column-major, claiming a 2x2, a strip, or a single cell
//!    at every still-free cell
//!
//! The scan always falls back to 1x1, so the grid is always fully tiled. The
//! result is valid, not maximal: retries that run out simply leave fewer
//! large blocks on the board.

use rand::Rng;

use super::grid::{Footprint, OccupancyGrid};

/// Random large blocks attempted before the scan (inclusive range)
pub const LARGE_COUNT_MIN: u32 = 1;
pub const LARGE_COUNT_MAX: u32 = 3;
/// Random positions tried per large block before giving up on it
pub const LARGE_PLACEMENT_ATTEMPTS: u32 = 10;
/// Chance the scan claims a free 2x2 block
pub const SCAN_LARGE_CHANCE: f32 = 0.3;
/// Roll below this claims a vertical strip
pub const VERTICAL_STRIP_CHANCE: f32 = 0.35;
/// Roll below this (and above the vertical band) claims a horizontal strip
pub const HORIZONTAL_STRIP_CHANCE: f32 = 0.70;
/// Longest strip the scan will claim
pub const MAX_STRIP_LENGTH: u32 = 3;

/// A fully tiled board
#[derive(Debug, Clone)]
pub struct PackedBoard {
    pub grid: OccupancyGrid,
    /// In placement order: random large blocks first, then scan order
    pub footprints: Vec<Footprint>,
}

/// Tile a `cols x rows` grid with non-overlapping footprints
pub fn pack<R: Rng + ?Sized>(cols: u32, rows: u32, rng: &mut R) -> PackedBoard {
    let mut grid = OccupancyGrid::new(cols, rows);
    let mut footprints = Vec::new();

    let num_large = rng.random_range(LARGE_COUNT_MIN..=LARGE_COUNT_MAX);
    let mut placed_large = 0;
    for _ in 0..num_large {
        if let Some(footprint) = try_place_large(&grid, rng) {
            grid.occupy(&footprint);
            footprints.push(footprint);
            placed_large += 1;
        }
    }

    for x in 0..cols {
        for y in 0..rows {
            if !grid.is_occupied(x, y) {
                let footprint = choose_footprint(&grid, x, y, rng);
                grid.occupy(&footprint);
                footprints.push(footprint);
            }
        }
    }

    debug_assert!(grid.is_full(), "packer left free cells");
    log::debug!(
        "Packed {}x{}: {} footprints ({}/{} random large)",
        cols,
        rows,
        footprints.len(),
        placed_large,
        num_large
    );

    PackedBoard { grid, footprints }
}

/// Try a handful of random positions for a 2x2 block
fn try_place_large<R: Rng + ?Sized>(grid: &OccupancyGrid, rng: &mut R) -> Option<Footprint> {
    if grid.cols() < 2 || grid.rows() < 2 {
        return None;
    }
    for _ in 0..LARGE_PLACEMENT_ATTEMPTS {
        let x = rng.random_range(0..=grid.cols() - 2);
        let y = rng.random_range(0..=grid.rows() - 2);
        if grid.can_place(x, y, 2, 2) {
            return Some(Footprint::new(x, y, 2, 2));
        }
    }
    None
}

/// Pick the footprint anchored at the free cell (x, y)
fn choose_footprint<R: Rng + ?Sized>(
    grid: &OccupancyGrid,
    x: u32,
    y: u32,
    rng: &mut R,
) -> Footprint {
    let max_h = grid.free_run_down(x, y);
    let max_w = grid.free_run_right(x, y);

    if grid.can_place(x, y, 2, 2) && rng.random::<f32>() < SCAN_LARGE_CHANCE {
        return Footprint::new(x, y, 2, 2);
    }

    let roll = rng.random::<f32>();
    if roll < VERTICAL_STRIP_CHANCE && max_h > 1 {
        let h = rng.random_range(1..=max_h.min(MAX_STRIP_LENGTH));
        Footprint::new(x, y, 1, h)
    } else if roll < HORIZONTAL_STRIP_CHANCE && max_w > 1 {
        let w = rng.random_range(1..=max_w.min(MAX_STRIP_LENGTH));
        Footprint::new(x, y, w, 1)
    } else {
        Footprint::new(x, y, 1, 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    /// Full tiling, no overlap, in bounds, one footprint per cell
    fn assert_valid(board: &PackedBoard, cols: u32, rows: u32) {
        assert!(board.grid.is_full());
        for fp in &board.footprints {
            assert!(fp.width >= 1 && fp.height >= 1);
            assert!(fp.x + fp.width <= cols, "{:?} out of bounds", fp);
            assert!(fp.y + fp.height <= rows, "{:?} out of bounds", fp);
        }
        for (i, a) in board.footprints.iter().enumerate() {
            for b in &board.footprints[i + 1..] {
                assert!(!a.intersects(b), "{:?} overlaps {:?}", a, b);
            }
        }
        for x in 0..cols {
            for y in 0..rows {
                let owners = board.footprints.iter().filter(|f| f.contains(x, y)).count();
                assert_eq!(owners, 1, "cell ({}, {}) has {} owners", x, y, owners);
            }
        }
    }

    #[test]
    fn test_pack_3x6_thousand_trials() {
        let mut rng = Pcg32::seed_from_u64(0xC0FFEE);
        for _ in 0..1000 {
            let board = pack(3, 6, &mut rng);
            assert_valid(&board, 3, 6);
        }
    }

    #[test]
    fn test_pack_shapes_are_known() {
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..200 {
            let board = pack(3, 6, &mut rng);
            for fp in &board.footprints {
                let strip = (fp.width == 1 && fp.height <= MAX_STRIP_LENGTH)
                    || (fp.height == 1 && fp.width <= MAX_STRIP_LENGTH);
                assert!(fp.is_large() || strip, "unexpected shape {:?}", fp);
            }
        }
    }

    #[test]
    fn test_pack_single_cell() {
        let mut rng = Pcg32::seed_from_u64(1);
        let board = pack(1, 1, &mut rng);
        assert_eq!(board.footprints, vec![Footprint::new(0, 0, 1, 1)]);
    }

    #[test]
    fn test_pack_single_column_has_no_large() {
        let mut rng = Pcg32::seed_from_u64(99);
        for _ in 0..100 {
            let board = pack(1, 6, &mut rng);
            assert_valid(&board, 1, 6);
            assert!(board.footprints.iter().all(|f| f.width == 1));
        }
    }

    #[test]
    fn test_pack_deterministic_for_seed() {
        let a = pack(3, 6, &mut Pcg32::seed_from_u64(42));
        let b = pack(3, 6, &mut Pcg32::seed_from_u64(42));
        assert_eq!(a.footprints, b.footprints);
    }

    #[test]
    fn test_pack_places_some_large_blocks() {
        // Not guaranteed per board, but over many boards large blocks appear
        let mut rng = Pcg32::seed_from_u64(3);
        let large = (0..100)
            .map(|_| pack(3, 6, &mut rng))
            .filter(|b| b.footprints.iter().any(Footprint::is_large))
            .count();
        assert!(large > 50);
    }

    proptest! {
        #[test]
        fn prop_pack_tiles_any_grid(cols in 1u32..10, rows in 1u32..12, seed in any::<u64>()) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let board = pack(cols, rows, &mut rng);
            assert_valid(&board, cols, rows);
            let area: u32 = board.footprints.iter().map(Footprint::area).sum();
            prop_assert_eq!(area, cols * rows);
        }
    }
}
