use std::fmt::{Display, Formatter};
use std::ops::{Index, IndexMut};

use generic_array::typenum::Unsigned;
use generic_array::{ArrayLength, GenericArray};

/// Row/column position of a cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GridIndex {
    row: usize,
    col: usize,
}

impl GridIndex {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn col(&self) -> usize {
        self.col
    }
}

/// `R` x `C` board stored row-major, sized at compile time.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid<T, R: ArrayLength, C: ArrayLength> {
    rows: GenericArray<GenericArray<T, C>, R>,
}

impl<T: Default, R: ArrayLength, C: ArrayLength> Default for Grid<T, R, C> {
    fn default() -> Self {
        Self {
            rows: GenericArray::default(),
        }
    }
}

/// One line per row, cells printed back to back.
impl<T: Display, R: ArrayLength, C: ArrayLength> Display for Grid<T, R, C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut rows = self.rows.iter().peekable();
        while let Some(row) = rows.next() {
            row.iter().try_for_each(|cell| cell.fmt(f))?;
            if rows.peek().is_some() {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

impl<T, R: ArrayLength, C: ArrayLength> Index<GridIndex> for Grid<T, R, C> {
    type Output = T;

    fn index(&self, at: GridIndex) -> &T {
        &self.rows[at.row()][at.col()]
    }
}

impl<T, R: ArrayLength, C: ArrayLength> IndexMut<GridIndex> for Grid<T, R, C> {
    fn index_mut(&mut self, at: GridIndex) -> &mut T {
        &mut self.rows[at.row()][at.col()]
    }
}

impl<T, R: ArrayLength, C: ArrayLength> Grid<T, R, C> {
    /// Total number of cells.
    pub fn len(&self) -> usize {
        R::to_usize() * C::to_usize()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Converts a row-major flat position into a [`GridIndex`], `None` if it is out of the grid.
    pub fn flat_index(&self, position: usize) -> Option<GridIndex> {
        if position >= self.len() {
            return None;
        }
        Some(GridIndex::new(position / C::to_usize(), position % C::to_usize()))
    }

    /// Returns an iterator over the cells row by row.
    pub fn cells(&self) -> impl Iterator<Item = &T> {
        self.rows.iter().flatten()
    }
}
