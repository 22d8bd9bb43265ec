use alloc::vec::Vec;
use core::ops::Index;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::*;

/// Tile as remembered by the history buffer, without transient flags.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileSnapshot {
    pub id: TileId,
    pub value: TileValue,
}

pub type BoardSnapshot = Array2<Option<TileSnapshot>>;

/// Everything a single shift did to the board.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ShiftReport {
    pub moved: bool,
    pub merged: bool,
    pub score_gained: u64,
    pub energy_gained: u32,
    /// Sum of the values of every tile created by a merge.
    pub merged_value: u32,
    pub changes: SmallVec<[TileEvent; CELL_COUNT]>,
}

/// The 4x4 board and the slide/merge algorithm.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    cells: Array2<Option<Tile>>,
    next_id: TileId,
}

impl Grid {
    pub fn new() -> Self {
        Self {
            cells: Array2::default([SIZE as usize, SIZE as usize]),
            next_id: 0,
        }
    }

    pub fn next_id(&self) -> TileId {
        self.next_id
    }

    pub fn tile_at(&self, coords: Coord2) -> Option<Tile> {
        self.cells[coords.to_nd_index()]
    }

    pub fn tile_at_index(&self, index: CellIndex) -> Option<Tile> {
        coords_of(index).and_then(|coords| self.tile_at(coords))
    }

    /// Occupied cells in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = (CellIndex, Tile)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(i, cell)| cell.map(|tile| (i as CellIndex, tile)))
    }

    pub fn empty_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_none()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.empty_count() == CELL_COUNT
    }

    pub fn max_value(&self) -> Option<TileValue> {
        self.tiles().map(|(_, tile)| tile.value).max()
    }

    /// Row-major face values, `0` for empty cells.
    pub fn values(&self) -> [TileValue; CELL_COUNT] {
        let mut values = [0; CELL_COUNT];
        for (index, tile) in self.tiles() {
            values[usize::from(index)] = tile.value;
        }
        values
    }

    /// Puts a fresh tile at `index`, replacing whatever was there.
    pub fn place(&mut self, index: CellIndex, value: TileValue) -> Result<Tile> {
        let coords = coords_of(index).ok_or(GameError::InvalidCoords)?;
        if !Tile::is_valid_value(value) {
            return Err(GameError::InvalidTileValue);
        }
        let tile = self.create_tile(value);
        self.cells[coords.to_nd_index()] = Some(tile);
        Ok(tile)
    }

    pub fn remove(&mut self, index: CellIndex) -> Option<Tile> {
        let coords = coords_of(index)?;
        self.cells[coords.to_nd_index()].take()
    }

    /// Removes every tile valued `max_value` or less, returning them with their positions.
    pub fn clear_up_to(&mut self, max_value: TileValue) -> Vec<(CellIndex, Tile)> {
        let doomed: Vec<_> = self
            .tiles()
            .filter(|(_, tile)| tile.value <= max_value)
            .collect();
        for &(index, _) in &doomed {
            self.remove(index);
        }
        doomed
    }

    pub fn spawn_random_tile(&mut self, rng: &mut SmallRng) -> Option<(CellIndex, Tile)> {
        self.spawn_random_tile_with(rng, Rules::STANDARD.four_probability)
    }

    /// Places a 2 (or a 4 with `four_probability`) on a uniformly chosen empty cell.
    pub fn spawn_random_tile_with(
        &mut self,
        rng: &mut SmallRng,
        four_probability: f64,
    ) -> Option<(CellIndex, Tile)> {
        use rand::prelude::*;

        let empty: SmallVec<[CellIndex; CELL_COUNT]> = self
            .cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.is_none())
            .map(|(i, _)| i as CellIndex)
            .collect();
        if empty.is_empty() {
            return None;
        }

        let index = empty[rng.random_range(0..empty.len())];
        let value = if rng.random_bool(four_probability) { 4 } else { 2 };
        let mut tile = self.create_tile(value);
        tile.is_new = true;
        let coords = coords_of(index)?;
        self.cells[coords.to_nd_index()] = Some(tile);
        Some((index, tile))
    }

    pub fn moves_available(&self) -> bool {
        if self.cells.iter().any(Option::is_none) {
            return true;
        }
        for y in 0..SIZE {
            for x in 0..SIZE {
                let value = self.value_at((x, y));
                if x + 1 < SIZE && self.value_at((x + 1, y)) == value {
                    return true;
                }
                if y + 1 < SIZE && self.value_at((x, y + 1)) == value {
                    return true;
                }
            }
        }
        false
    }

    /// Slides every tile towards `direction`, merging equal neighbours once per destination.
    ///
    /// Cells are visited farthest-first along the direction of travel, so a row of three equal
    /// tiles merges the pair nearest the wall and leaves the third one alone.
    pub fn shift(&mut self, direction: Direction) -> ShiftReport {
        let vector = direction.vector();
        let mut merged_into = [false; CELL_COUNT];
        let mut report = ShiftReport::default();

        for x in traversal(vector.0) {
            for y in traversal(vector.1) {
                let pos = (x, y);
                let Some(tile) = self.tile_at(pos) else {
                    continue;
                };
                let (farthest, next) = self.find_farthest_position(pos, vector);

                let mergeable = next.filter(|&next| {
                    !merged_into[usize::from(next.cell_index())]
                        && self.tile_at(next).is_some_and(|other| other.value == tile.value)
                });

                match mergeable {
                    Some(next) => {
                        let Some(other) = self.tile_at(next) else {
                            continue;
                        };
                        let mut merged = self.create_tile(tile.value * 2);
                        merged.just_merged = true;
                        self.cells[next.to_nd_index()] = Some(merged);
                        self.cells[pos.to_nd_index()] = None;
                        merged_into[usize::from(next.cell_index())] = true;

                        report.moved = true;
                        report.merged = true;
                        report.score_gained += u64::from(merged.value);
                        report.energy_gained += merged.merge_energy();
                        report.merged_value = report.merged_value.saturating_add(merged.value);
                        report.changes.push(TileEvent::Merged {
                            id: merged.id,
                            index: next.cell_index(),
                            value: merged.value,
                            sources: [tile.id, other.id],
                        });
                    }
                    None if farthest != pos => {
                        self.cells[farthest.to_nd_index()] = Some(tile);
                        self.cells[pos.to_nd_index()] = None;
                        report.moved = true;
                        report.changes.push(TileEvent::Moved {
                            id: tile.id,
                            from: pos.cell_index(),
                            to: farthest.cell_index(),
                        });
                    }
                    None => {}
                }
            }
        }

        // flags describe the previous move until the board actually changes
        if report.moved {
            for (i, cell) in self.cells.iter_mut().enumerate() {
                if let Some(tile) = cell.as_mut().filter(|_| !merged_into[i]) {
                    tile.clear_transient();
                }
            }
        }

        report
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        self.cells.map(|cell| {
            cell.map(|tile| TileSnapshot {
                id: tile.id,
                value: tile.value,
            })
        })
    }

    /// Restores tiles from a snapshot. Ids keep counting up from where they are now.
    pub fn restore(&mut self, snapshot: &BoardSnapshot) {
        self.cells = snapshot.map(|cell| cell.map(|tile| Tile::new(tile.id, tile.value)));
    }

    /// Last empty cell along `vector` and the first cell after it that is on the board.
    fn find_farthest_position(&self, start: Coord2, vector: (i8, i8)) -> (Coord2, Option<Coord2>) {
        let mut farthest = start;
        loop {
            match apply_delta(farthest, vector) {
                Some(next) if self.tile_at(next).is_none() => farthest = next,
                next => return (farthest, next),
            }
        }
    }

    fn value_at(&self, coords: Coord2) -> Option<TileValue> {
        self.tile_at(coords).map(|tile| tile.value)
    }

    fn create_tile(&mut self, value: TileValue) -> Tile {
        let tile = Tile::new(self.next_id, value);
        self.next_id += 1;
        tile
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<Coord2> for Grid {
    type Output = Option<Tile>;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.cells[coords.to_nd_index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    /// Builds a grid from row-major face values, `0` meaning empty.
    fn fill(values: [TileValue; CELL_COUNT]) -> Grid {
        let mut grid = Grid::new();
        for (i, &value) in values.iter().enumerate() {
            if value != 0 {
                grid.place(i as CellIndex, value).unwrap();
            }
        }
        grid
    }

    #[rustfmt::skip]
    const STUCK: [TileValue; CELL_COUNT] = [
        2, 4, 2, 4,
        4, 2, 4, 2,
        2, 4, 2, 4,
        4, 2, 4, 2,
    ];

    #[test]
    fn two_adjacent_tiles_merge_left() {
        let mut grid = fill([0, 2, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);

        let report = grid.shift(Direction::Left);

        assert!(report.moved && report.merged);
        assert_eq!(report.score_gained, 4);
        assert_eq!(report.energy_gained, 2);
        assert_eq!(report.merged_value, 4);
        assert_eq!(grid.values()[..4], [4, 0, 0, 0]);
        let merged = grid.tile_at((0, 0)).unwrap();
        assert!(merged.just_merged);
    }

    #[test]
    fn three_in_a_row_merges_farthest_pair_first() {
        let mut grid = fill([2, 2, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);

        let report = grid.shift(Direction::Right);

        assert_eq!(grid.values()[..4], [0, 0, 2, 4]);
        assert_eq!(report.merged_value, 4);

        let mut grid = grid_left_populated();
        grid.shift(Direction::Left);
        assert_eq!(grid.values()[..4], [4, 2, 0, 0]);
    }

    fn grid_left_populated() -> Grid {
        fill([0, 2, 2, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0])
    }

    #[test]
    fn merge_once_per_destination() {
        let mut grid = fill([4, 2, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);

        grid.shift(Direction::Left);

        assert_eq!(grid.values()[..4], [4, 4, 0, 0]);

        let mut grid = grid_full_row();
        let report = grid.shift(Direction::Left);
        assert_eq!(grid.values()[..4], [4, 4, 0, 0]);
        assert_eq!(report.score_gained, 8);
    }

    fn grid_full_row() -> Grid {
        fill([2, 2, 2, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0])
    }

    #[test]
    fn vertical_shift_moves_columns() {
        #[rustfmt::skip]
        let mut grid = fill([
            2, 0, 0, 0,
            0, 0, 0, 0,
            2, 0, 0, 8,
            4, 0, 0, 0,
        ]);

        let report = grid.shift(Direction::Down);

        #[rustfmt::skip]
        assert_eq!(grid.values(), [
            0, 0, 0, 0,
            0, 0, 0, 0,
            4, 0, 0, 0,
            4, 0, 0, 8,
        ]);
        assert!(report.merged);

        grid.shift(Direction::Up);
        #[rustfmt::skip]
        assert_eq!(grid.values(), [
            8, 0, 0, 8,
            0, 0, 0, 0,
            0, 0, 0, 0,
            0, 0, 0, 0,
        ]);
    }

    #[test]
    fn moving_preserves_identity() {
        let mut grid = fill([0, 0, 0, 8, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        let before = grid.tile_at((3, 0)).unwrap();

        let report = grid.shift(Direction::Left);

        assert_eq!(grid.tile_at((0, 0)).unwrap().id, before.id);
        assert_eq!(
            report.changes.as_slice(),
            [TileEvent::Moved {
                id: before.id,
                from: 3,
                to: 0
            }]
        );
    }

    #[test]
    fn merge_creates_new_identity() {
        let mut grid = fill([2, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        let left = grid.tile_at((0, 0)).unwrap();
        let right = grid.tile_at((1, 0)).unwrap();

        let report = grid.shift(Direction::Left);

        let merged = grid.tile_at((0, 0)).unwrap();
        assert_ne!(merged.id, left.id);
        assert_ne!(merged.id, right.id);
        assert_eq!(
            report.changes.as_slice(),
            [TileEvent::Merged {
                id: merged.id,
                index: 0,
                value: 4,
                sources: [right.id, left.id],
            }]
        );
    }

    #[test]
    fn blocked_shift_changes_nothing() {
        let mut grid = fill(STUCK);
        let before = grid.clone();

        for direction in Direction::ALL {
            let report = grid.shift(direction);
            assert!(!report.moved);
            assert!(report.changes.is_empty());
        }
        assert_eq!(grid, before);
    }

    #[test]
    fn repeated_shift_is_idempotent() {
        let mut grid = fill([0, 2, 0, 4, 0, 0, 8, 0, 0, 0, 0, 0, 16, 0, 0, 2]);

        assert!(grid.shift(Direction::Left).moved);
        let after_first = grid.values();
        assert!(!grid.shift(Direction::Left).moved);
        assert_eq!(grid.values(), after_first);
    }

    #[test]
    fn moves_available_detects_stuck_board() {
        assert!(!fill(STUCK).moves_available());

        let mut pair = STUCK;
        pair[5] = 4;
        assert!(fill(pair).moves_available());

        let mut hole = STUCK;
        hole[15] = 0;
        assert!(fill(hole).moves_available());
    }

    #[test]
    fn moves_available_does_not_wrap_rows() {
        let mut values = STUCK;
        values[3] = 8;
        values[4] = 8;
        assert!(!fill(values).moves_available());
    }

    #[test]
    fn spawn_fills_empty_cells_only() {
        let mut rng = SmallRng::seed_from_u64(7);
        let mut grid = Grid::new();

        for _ in 0..CELL_COUNT {
            let (index, tile) = grid.spawn_random_tile(&mut rng).unwrap();
            assert!(tile.is_new);
            assert!(tile.value == 2 || tile.value == 4);
            assert_eq!(grid.tile_at_index(index), Some(tile));
        }
        assert_eq!(grid.empty_count(), 0);
        assert_eq!(grid.spawn_random_tile(&mut rng), None);
    }

    #[test]
    fn spawn_probability_is_respected() {
        let mut rng = SmallRng::seed_from_u64(11);
        let mut grid = Grid::new();
        let (_, tile) = grid.spawn_random_tile_with(&mut rng, 1.0).unwrap();
        assert_eq!(tile.value, 4);
        let (_, tile) = grid.spawn_random_tile_with(&mut rng, 0.0).unwrap();
        assert_eq!(tile.value, 2);
    }

    #[test]
    fn snapshot_strips_transient_flags() {
        let mut grid = fill([2, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        let snapshot = grid.snapshot();
        grid.shift(Direction::Left);
        let after = grid.snapshot();
        assert!(grid.tile_at((0, 0)).unwrap().just_merged);

        grid.restore(&after);
        assert!(!grid.tile_at((0, 0)).unwrap().just_merged);

        grid.restore(&snapshot);
        assert_eq!(grid.values()[..4], [2, 2, 0, 0]);
        assert_eq!(grid.next_id(), 3);
    }

    #[test]
    fn clear_up_to_removes_small_tiles() {
        let mut grid = fill([2, 4, 8, 0, 4, 16, 0, 0, 0, 0, 0, 0, 0, 0, 0, 2]);

        let removed = grid.clear_up_to(4);

        assert_eq!(removed.len(), 4);
        assert_eq!(grid.values()[..6], [0, 0, 8, 0, 0, 16]);
        assert_eq!(grid.max_value(), Some(16));
    }

    #[test]
    fn place_rejects_bad_input() {
        let mut grid = Grid::new();
        assert_eq!(grid.place(16, 2), Err(GameError::InvalidCoords));
        assert_eq!(grid.place(0, 3), Err(GameError::InvalidTileValue));
        assert!(grid.is_empty());
    }
}
