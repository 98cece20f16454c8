use std::collections::VecDeque;

use crate::alphabet;
use crate::cell::{Cell, CellKind};
use crate::error::GridError;
use crate::pos::Pos;
use crate::slot::{Direction, Slot, SlotId, DEFAULT_MIN_LEN};

/// The character representing a block, i.e. a shaded cell.
pub const BLOCK: char = '#';

/// The character representing an open, unfilled cell.
pub const EMPTY: char = '.';

/// A crossword grid: a square of [`Cell`]s with a 180°-rotational-symmetry invariant.
#[derive(Clone, Debug)]
pub struct GridModel {
    rows: Vec<Vec<Cell>>,
    min_word_length: usize,
}

impl GridModel {
    /// Builds a grid from one string per row (`#` block, `.` open, `A`-`Z` prefilled).
    ///
    /// Rejects inconsistent row lengths and invalid characters, but does not check the
    /// structural invariants (symmetry, connectivity, checked squares) — call
    /// [`GridModel::validate`] for those, since a grid under construction (e.g. while a
    /// caller is placing blocks interactively) is legitimately allowed to violate them
    /// transiently.
    pub fn from_rows(rows: Vec<String>, min_word_length: usize) -> Result<Self, GridError> {
        if rows.is_empty() {
            return Ok(GridModel {
                rows: vec![],
                min_word_length,
            });
        }
        let width = rows[0].chars().count();
        if rows.len() != width {
            log::warn!(
                "grid is {}x{}, not square; proceeding, but slot numbering may surprise callers",
                rows.len(),
                width
            );
        }
        if rows.len() % 2 == 0 {
            log::warn!("grid side length {} is even; odd is conventional", rows.len());
        }

        let mut cells = Vec::with_capacity(rows.len());
        for (row_index, row) in rows.iter().enumerate() {
            let row_width = row.chars().count();
            if row_width != width {
                return Err(GridError::InconsistentRowLength {
                    row: row_index,
                    expected: width,
                    actual: row_width,
                });
            }
            let mut row_cells = Vec::with_capacity(width);
            for (col_index, value) in row.chars().enumerate() {
                let cell = match value {
                    BLOCK => Cell::block(row_index, col_index),
                    EMPTY => Cell::open(row_index, col_index),
                    letter if alphabet::contains(letter) => {
                        let mut cell = Cell::open(row_index, col_index);
                        cell.letter = Some(letter);
                        cell
                    }
                    invalid => {
                        return Err(GridError::InvalidCharacter {
                            row: row_index,
                            col: col_index,
                            value: invalid,
                        })
                    }
                };
                row_cells.push(cell);
            }
            cells.push(row_cells);
        }

        Ok(GridModel {
            rows: cells,
            min_word_length,
        })
    }

    /// Builds an all-open grid of the given odd size.
    pub fn blank(size: usize, min_word_length: usize) -> Self {
        let rows = (0..size)
            .map(|r| (0..size).map(|c| Cell::open(r, c)).collect())
            .collect();
        GridModel {
            rows,
            min_word_length,
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.rows.first().map_or(0, |row| row.len())
    }

    pub fn min_word_length(&self) -> usize {
        self.min_word_length
    }

    fn mirror(&self, row: usize, col: usize) -> Pos {
        Pos::new(self.row_count() - 1 - row, self.column_count() - 1 - col)
    }

    pub fn cell_at(&self, row: usize, col: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Sets both `(row, col)` and its 180°-rotational mirror to [`CellKind::Block`] in
    /// one atomic step.
    pub fn set_block(&mut self, row: usize, col: usize) -> Result<(), GridError> {
        let size_row = self.row_count();
        let size_col = self.column_count();
        if row >= size_row || col >= size_col {
            return Err(GridError::OutOfBounds {
                row,
                col,
                size: size_row.max(size_col),
            });
        }
        let mirror = self.mirror(row, col);
        self.rows[row][col] = Cell::block(row, col);
        self.rows[mirror.row][mirror.col] = Cell::block(mirror.row, mirror.col);
        Ok(())
    }

    /// Returns the slot list, numbered by a single left-to-right, top-to-bottom scan.
    /// Deterministic: calling this twice yields the same list in the same order.
    pub fn find_slots(&self) -> Vec<Slot> {
        let row_count = self.row_count();
        let col_count = self.column_count();
        if row_count == 0 || col_count == 0 {
            return vec![];
        }

        let mut slots = Vec::new();
        let mut number = 1u32;

        for row in 0..row_count {
            for col in 0..col_count {
                if self.rows[row][col].is_block() {
                    continue;
                }
                let starts_across =
                    col == 0 || self.rows[row][col - 1].is_block();
                let starts_down = row == 0 || self.rows[row - 1][col].is_block();

                let across_len = if starts_across {
                    Self::run_length(&self.rows[row][col..])
                } else {
                    0
                };
                let down_len = if starts_down {
                    self.down_run_length(row, col)
                } else {
                    0
                };

                let makes_across_slot = starts_across && across_len >= self.min_word_length;
                let makes_down_slot = starts_down && down_len >= self.min_word_length;

                if makes_across_slot || makes_down_slot {
                    let cell_number = number;
                    number += 1;

                    if makes_across_slot {
                        let cells: Vec<Pos> =
                            (0..across_len).map(|i| Pos::new(row, col + i)).collect();
                        let id = slots.len();
                        slots.push(Slot::new(id, Direction::Across, cell_number, cells));
                    }
                    if makes_down_slot {
                        let cells: Vec<Pos> =
                            (0..down_len).map(|i| Pos::new(row + i, col)).collect();
                        let id = slots.len();
                        slots.push(Slot::new(id, Direction::Down, cell_number, cells));
                    }
                }
            }
        }

        slots
    }

    fn run_length(row_cells: &[Cell]) -> usize {
        row_cells.iter().take_while(|c| !c.is_block()).count()
    }

    fn down_run_length(&self, row: usize, col: usize) -> usize {
        let mut len = 0;
        let mut r = row;
        while r < self.row_count() && !self.rows[r][col].is_block() {
            len += 1;
            r += 1;
        }
        len
    }

    /// Returns the `A.P.E`-style pattern of a slot: current letters, `.` for unfilled
    /// open cells.
    pub fn pattern_for(&self, slot: &Slot) -> String {
        slot.cells()
            .iter()
            .map(|pos| {
                self.cell_at(pos.row, pos.col)
                    .and_then(|cell| cell.letter)
                    .unwrap_or(EMPTY)
            })
            .collect()
    }

    /// Writes `word` into the cells of `slot`.
    pub fn apply_word(&mut self, slot: &Slot, word: &str) {
        for (pos, letter) in slot.cells().iter().zip(word.chars()) {
            self.rows[pos.row][pos.col].letter = Some(letter);
        }
    }

    /// The current letter, if any, of every cell of `slot`, in slot order. Paired with
    /// [`GridModel::restore_letters`] to undo an [`GridModel::apply_word`] on backtrack.
    pub fn letters_of(&self, slot: &Slot) -> Vec<Option<char>> {
        slot.cells()
            .iter()
            .map(|pos| self.cell_at(pos.row, pos.col).and_then(|cell| cell.letter))
            .collect()
    }

    /// Restores the cells of `slot` to the letters previously captured by
    /// [`GridModel::letters_of`].
    pub fn restore_letters(&mut self, slot: &Slot, letters: &[Option<char>]) {
        for (pos, &letter) in slot.cells().iter().zip(letters) {
            self.rows[pos.row][pos.col].letter = letter;
        }
    }

    /// BFS over open cells from any open seed; true iff every open cell is reached.
    pub fn is_connected(&self) -> bool {
        let seed = self
            .rows
            .iter()
            .flatten()
            .find(|cell| cell.is_open())
            .map(|cell| Pos::new(cell.row, cell.col));
        let Some(seed) = seed else {
            return true; // An all-block (or empty) grid is trivially connected.
        };

        let total_open = self.rows.iter().flatten().filter(|c| c.is_open()).count();
        let mut visited = vec![vec![false; self.column_count()]; self.row_count()];
        let mut queue = VecDeque::new();
        visited[seed.row][seed.col] = true;
        queue.push_back(seed);
        let mut reached = 0usize;

        while let Some(pos) = queue.pop_front() {
            reached += 1;
            for (dr, dc) in [(-1i32, 0i32), (1, 0), (0, -1), (0, 1)] {
                let nr = pos.row as i32 + dr;
                let nc = pos.col as i32 + dc;
                if nr < 0 || nc < 0 {
                    continue;
                }
                let (nr, nc) = (nr as usize, nc as usize);
                if nr >= self.row_count() || nc >= self.column_count() {
                    continue;
                }
                if visited[nr][nc] || self.rows[nr][nc].is_block() {
                    continue;
                }
                visited[nr][nc] = true;
                queue.push_back(Pos::new(nr, nc));
            }
        }

        reached == total_open
    }

    /// Runs every Structural check from the grid's validation contract and returns the
    /// concrete list of violations (empty iff the grid is valid).
    pub fn validate(&self) -> Vec<GridError> {
        let mut errors = Vec::new();

        for row in 0..self.row_count() {
            for col in 0..self.column_count() {
                let mirror = self.mirror(row, col);
                // Each asymmetric pair would otherwise be reported twice; only report
                // once per pair by requiring `(row, col) <= mirror` lexicographically.
                if (row, col) > (mirror.row, mirror.col) {
                    continue;
                }
                let block = self.rows[row][col].is_block();
                let mirror_block = self.rows[mirror.row][mirror.col].is_block();
                if block != mirror_block {
                    errors.push(GridError::AsymmetricBlock {
                        row,
                        col,
                        block,
                        mirror_row: mirror.row,
                        mirror_col: mirror.col,
                        mirror_block,
                    });
                }
            }
        }

        if !self.is_connected() {
            let total_open = self.rows.iter().flatten().filter(|c| c.is_open()).count();
            errors.push(GridError::Disconnected {
                unreached: total_open,
            });
        }

        let slots = self.find_slots();
        for slot in &slots {
            if slot.length() < self.min_word_length {
                let start = slot.start();
                errors.push(GridError::SlotTooShort {
                    row: start.row,
                    col: start.col,
                    direction: slot.direction(),
                    length: slot.length(),
                    min_length: self.min_word_length,
                });
            }
        }

        errors.extend(self.checked_square_violations(&slots));
        errors
    }

    /// Every open cell must be covered by exactly one Across slot and exactly one Down
    /// slot.
    fn checked_square_violations(&self, slots: &[Slot]) -> Vec<GridError> {
        let mut across_coverage = vec![0u8; self.row_count() * self.column_count()];
        let mut down_coverage = vec![0u8; self.row_count() * self.column_count()];
        for slot in slots {
            let coverage = match slot.direction() {
                Direction::Across => &mut across_coverage,
                Direction::Down => &mut down_coverage,
            };
            for pos in slot.cells() {
                coverage[pos.row * self.column_count() + pos.col] += 1;
            }
        }

        let mut errors = Vec::new();
        for row in 0..self.row_count() {
            for col in 0..self.column_count() {
                if self.rows[row][col].is_block() {
                    continue;
                }
                let idx = row * self.column_count() + col;
                if across_coverage[idx] != 1 {
                    errors.push(GridError::NotChecked {
                        row,
                        col,
                        direction: Direction::Across,
                        count: across_coverage[idx] as usize,
                    });
                }
                if down_coverage[idx] != 1 {
                    errors.push(GridError::NotChecked {
                        row,
                        col,
                        direction: Direction::Down,
                        count: down_coverage[idx] as usize,
                    });
                }
            }
        }
        errors
    }
}

/// A (slot_a, index_in_a, slot_b, index_in_b) relation between a crossing Across/Down
/// pair of slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Crossing {
    pub slot_a: SlotId,
    pub index_a: usize,
    pub slot_b: SlotId,
    pub index_b: usize,
}

/// The static backbone of AC-3: a bipartite set of slots and their pairwise crossings.
#[derive(Debug, Clone)]
pub struct ConstraintGraph {
    slots: Vec<Slot>,
    /// `neighbors[slot_id]` lists, for each crossing the slot participates in, the
    /// neighbor slot id and the index of the shared cell in each slot.
    neighbors: Vec<Vec<(SlotId, usize, usize)>>,
    crossings: Vec<Crossing>,
}

impl ConstraintGraph {
    pub fn build(slots: Vec<Slot>) -> Self {
        let mut neighbors = vec![Vec::new(); slots.len()];
        let mut crossings = Vec::new();
        for i in 0..slots.len() {
            for j in (i + 1)..slots.len() {
                if let Some((idx_i, idx_j)) = slots[i].crossing_with(&slots[j]) {
                    neighbors[i].push((j, idx_i, idx_j));
                    neighbors[j].push((i, idx_j, idx_i));
                    crossings.push(Crossing {
                        slot_a: i,
                        index_a: idx_i,
                        slot_b: j,
                        index_b: idx_j,
                    });
                }
            }
        }
        ConstraintGraph {
            slots,
            neighbors,
            crossings,
        }
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn slot(&self, id: SlotId) -> &Slot {
        &self.slots[id]
    }

    pub fn crossings(&self) -> &[Crossing] {
        &self.crossings
    }

    /// Neighbors of `slot_id`: (neighbor_id, index_in_slot, index_in_neighbor).
    pub fn neighbors(&self, slot_id: SlotId) -> &[(SlotId, usize, usize)] {
        &self.neighbors[slot_id]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&str]) -> GridModel {
        GridModel::from_rows(
            rows.iter().map(|s| s.to_string()).collect(),
            DEFAULT_MIN_LEN,
        )
        .unwrap()
    }

    #[test]
    fn from_rows_rejects_inconsistent_length() {
        let result = GridModel::from_rows(
            vec!["ABC".to_string(), "AB".to_string()],
            DEFAULT_MIN_LEN,
        );
        assert_eq!(
            Err(GridError::InconsistentRowLength {
                row: 1,
                expected: 3,
                actual: 2
            }),
            result
        );
    }

    #[test]
    fn from_rows_rejects_invalid_character() {
        let result = GridModel::from_rows(vec!["A#@".to_string()], DEFAULT_MIN_LEN);
        assert_eq!(
            Err(GridError::InvalidCharacter {
                row: 0,
                col: 2,
                value: '@'
            }),
            result
        );
    }

    #[test]
    fn set_block_sets_mirror() {
        let mut g = GridModel::blank(5, DEFAULT_MIN_LEN);
        g.set_block(0, 0).unwrap();
        assert!(g.cell_at(0, 0).unwrap().is_block());
        assert!(g.cell_at(4, 4).unwrap().is_block());
    }

    #[test]
    fn set_block_out_of_bounds() {
        let mut g = GridModel::blank(3, DEFAULT_MIN_LEN);
        assert_eq!(
            Err(GridError::OutOfBounds {
                row: 3,
                col: 0,
                size: 3
            }),
            g.set_block(3, 0)
        );
    }

    #[test]
    fn find_slots_simple() {
        let g = grid(&["...", "...", "..."]);
        let slots = g.find_slots();
        assert_eq!(6, slots.len());
        assert_eq!(3, slots.iter().filter(|s| s.direction() == Direction::Across).count());
        assert_eq!(3, slots.iter().filter(|s| s.direction() == Direction::Down).count());
    }

    #[test]
    fn find_slots_with_blocks() {
        let g = grid(&[".#.", "...", "..#"]);
        let slots = g.find_slots();
        // Across: row0 has only a single isolated cell each side of the block (too
        // short); row1 is one full run of 3; row2 is a run of 2 (too short at min=3).
        let across: Vec<_> = slots.iter().filter(|s| s.direction() == Direction::Across).collect();
        assert_eq!(1, across.len());
        assert_eq!(3, across[0].length());
    }

    #[test]
    fn find_slots_deterministic() {
        let g = grid(&["...", "...", "..."]);
        assert_eq!(g.find_slots(), g.find_slots());
    }

    #[test]
    fn find_slots_all_block_grid_is_empty() {
        let mut g = GridModel::blank(3, DEFAULT_MIN_LEN);
        for r in 0..3 {
            for c in 0..3 {
                let _ = g.set_block(r, c);
            }
        }
        assert!(g.find_slots().is_empty());
        assert!(g.validate().is_empty());
    }

    #[test]
    fn pattern_for_reflects_prefilled_letters() {
        let g = grid(&["A..", "...", "..."]);
        let slots = g.find_slots();
        let across_row0 = slots
            .iter()
            .find(|s| s.direction() == Direction::Across && s.start().row == 0)
            .unwrap();
        assert_eq!("A..", g.pattern_for(across_row0));
    }

    #[test]
    fn letters_of_and_restore_letters_round_trip() {
        let mut g = grid(&["A..", "...", "..."]);
        let slots = g.find_slots();
        let across_row1 = slots
            .iter()
            .find(|s| s.direction() == Direction::Across && s.start().row == 1)
            .unwrap();
        let before = g.letters_of(across_row1);
        assert_eq!(vec![None, None, None], before);

        g.apply_word(across_row1, "CAT");
        assert_eq!("CAT", g.pattern_for(across_row1));

        g.restore_letters(across_row1, &before);
        assert_eq!("...", g.pattern_for(across_row1));
    }

    #[test]
    fn is_connected_true_for_open_grid() {
        let g = grid(&["...", "...", "..."]);
        assert!(g.is_connected());
    }

    #[test]
    fn is_connected_false_when_split() {
        let mut g = GridModel::blank(5, DEFAULT_MIN_LEN);
        for r in 0..5 {
            g.set_block(r, 2).unwrap();
        }
        assert!(!g.is_connected());
    }

    #[test]
    fn validate_reports_asymmetry() {
        let mut g = GridModel::blank(5, DEFAULT_MIN_LEN);
        g.rows[0][0] = Cell::block(0, 0); // bypass set_block to create an asymmetry
        let errors = g.validate();
        assert!(errors.iter().any(|e| matches!(
            e,
            GridError::AsymmetricBlock { row: 0, col: 0, .. }
        )));
    }

    #[test]
    fn validate_clean_grid_has_no_errors() {
        let g = grid(&["...", "...", "..."]);
        assert!(g.validate().is_empty());
    }

    #[test]
    fn constraint_graph_builds_crossings() {
        let g = grid(&["...", "...", "..."]);
        let slots = g.find_slots();
        let graph = ConstraintGraph::build(slots);
        // Every across slot crosses every down slot exactly once on a blank 3x3 grid.
        assert_eq!(9, graph.crossings().len());
    }
}
