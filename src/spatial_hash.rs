use macroquad::prelude::*;

use crate::entity::EntityArena;

/// Uniform grid over the screen. Positions outside the grid are clamped into
/// the border cells, so queries stay exact (candidates are distance-checked).
pub struct SpatialHash {
    inv_cell_size: f32,
    origin: Vec2,
    pub cols: usize,
    pub rows: usize,
    cells: Vec<Vec<u32>>,
}

impl SpatialHash {
    pub fn new(origin: Vec2, width: f32, height: f32, cell_size: f32) -> Self {
        let cols = ((width / cell_size).ceil() as usize).max(1);
        let rows = ((height / cell_size).ceil() as usize).max(1);
        let cells = (0..cols * rows).map(|_| Vec::with_capacity(8)).collect();
        Self {
            inv_cell_size: 1.0 / cell_size,
            origin,
            cols,
            rows,
            cells,
        }
    }

    fn cell_coords(&self, pos: Vec2) -> (i32, i32) {
        let local = (pos - self.origin) * self.inv_cell_size;
        let cx = (local.x.floor() as i32).clamp(0, self.cols as i32 - 1);
        let cy = (local.y.floor() as i32).clamp(0, self.rows as i32 - 1);
        (cx, cy)
    }

    /// Clear all cells and re-insert every entity.
    pub fn rebuild(&mut self, arena: &EntityArena) {
        for cell in &mut self.cells {
            cell.clear();
        }
        for (idx, e) in arena.iter_alive() {
            if !e.pos.is_finite() {
                continue;
            }
            let (cx, cy) = self.cell_coords(e.pos);
            self.cells[cy as usize * self.cols + cx as usize].push(idx as u32);
        }
    }

    /// Query all entity indices within `radius` of `pos`.
    pub fn query_radius(&self, pos: Vec2, radius: f32, arena: &EntityArena) -> Vec<u32> {
        let mut result = Vec::new();
        if !pos.is_finite() {
            return result;
        }
        let radius_sq = radius * radius;
        let (x0, y0) = self.cell_coords(pos - Vec2::splat(radius));
        let (x1, y1) = self.cell_coords(pos + Vec2::splat(radius));

        for gy in y0..=y1 {
            for gx in x0..=x1 {
                let cell_idx = gy as usize * self.cols + gx as usize;
                for &entity_idx in &self.cells[cell_idx] {
                    if let Some(e) = arena.get_by_index(entity_idx as usize) {
                        if pos.distance_squared(e.pos) <= radius_sq {
                            result.push(entity_idx);
                        }
                    }
                }
            }
        }

        result
    }

    /// Query all entity indices within `radius` of `pos`, excluding a specific index.
    pub fn query_radius_excluding(
        &self,
        pos: Vec2,
        radius: f32,
        exclude_idx: u32,
        arena: &EntityArena,
    ) -> Vec<u32> {
        let mut result = self.query_radius(pos, radius, arena);
        result.retain(|&idx| idx != exclude_idx);
        result
    }
}
