use serde::{Deserialize, Serialize};

use crate::item::ItemStack;

/// Side length of the crafting grid
pub const GRID_SIZE: usize = 3;

/// Cell count of the crafting grid
pub const GRID_CELLS: usize = GRID_SIZE * GRID_SIZE;

/// Nine cells in row-major order; index = row * 3 + col
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CraftingGrid {
    cells: [Option<ItemStack>; GRID_CELLS],
}

impl CraftingGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from up to nine cells; missing trailing cells are empty.
    pub fn from_cells(cells: Vec<Option<ItemStack>>) -> Self {
        let mut grid = Self::default();
        for (index, cell) in cells.into_iter().take(GRID_CELLS).enumerate() {
            grid.cells[index] = cell.filter(|s| s.amount > 0);
        }
        grid
    }

    pub fn index(row: usize, col: usize) -> usize {
        row * GRID_SIZE + col
    }

    pub fn get(&self, index: usize) -> Option<&ItemStack> {
        self.cells.get(index).and_then(|c| c.as_ref())
    }

    pub fn at(&self, row: usize, col: usize) -> Option<&ItemStack> {
        if row >= GRID_SIZE || col >= GRID_SIZE {
            return None;
        }
        self.get(Self::index(row, col))
    }

    /// Replace a cell, returning what was there. Zero-sized stacks clear the cell.
    pub fn set(&mut self, index: usize, stack: Option<ItemStack>) -> Option<ItemStack> {
        let slot = self.cells.get_mut(index)?;
        std::mem::replace(slot, stack.filter(|s| s.amount > 0))
    }

    pub fn take(&mut self, index: usize) -> Option<ItemStack> {
        self.cells.get_mut(index).and_then(Option::take)
    }

    /// Occupied cells with their indices
    pub fn occupied(&self) -> impl Iterator<Item = (usize, &ItemStack)> {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(i, c)| c.as_ref().map(|s| (i, s)))
    }

    pub fn occupied_count(&self) -> usize {
        self.occupied().count()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }

    /// Remove `amount` from a cell, clearing it when nothing is left
    pub fn decrement(&mut self, index: usize, amount: u32) {
        if let Some(slot) = self.cells.get_mut(index) {
            if let Some(stack) = slot {
                stack.amount = stack.amount.saturating_sub(amount);
                if stack.amount == 0 {
                    *slot = None;
                }
            }
        }
    }

    /// Empty the grid, returning every stack it held
    pub fn drain(&mut self) -> Vec<ItemStack> {
        self.cells.iter_mut().filter_map(Option::take).collect()
    }

    pub fn cells(&self) -> &[Option<ItemStack>; GRID_CELLS] {
        &self.cells
    }
}
