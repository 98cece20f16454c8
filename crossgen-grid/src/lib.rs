//! Grid, slot, and constraint-graph data model for the crossword constraint-satisfaction
//! core. See [`grid::GridModel`] for the entry point.

pub mod alphabet;
pub mod cell;
pub mod error;
pub mod grid;
pub mod pos;
pub mod slot;

pub use cell::{Cell, CellKind};
pub use error::GridError;
pub use grid::{ConstraintGraph, Crossing, GridModel};
pub use pos::Pos;
pub use slot::{Direction, Slot, SlotId};
