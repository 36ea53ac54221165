use crate::game::grid::Board;
use crate::game::types::{Location, LowResolutionCell};

/// Coarse overview of `board`: square blocks of `block_size` cells (edge blocks
/// may be smaller), each reporting its rounded average difficulty. Row-major order.
pub fn low_resolution_map(board: &Board, block_size: usize) -> Vec<LowResolutionCell> {
    let block_size = block_size.clamp(1, board.width().max(board.height()));
    let mut blocks = Vec::new();

    for bottom in (1..=board.height()).step_by(block_size) {
        for left in (1..=board.width()).step_by(block_size) {
            let right = left.saturating_add(block_size - 1).min(board.width());
            let top = bottom.saturating_add(block_size - 1).min(board.height());
            let lower_left = Location::new(left as i32, bottom as i32);
            let upper_right = Location::new(right as i32, top as i32);

            let mut total = 0u64;
            let mut count = 0u64;
            for y in lower_left.y..=upper_right.y {
                for x in lower_left.x..=upper_right.x {
                    if let Some(cell) = board.cell(Location::new(x, y)) {
                        total += u64::from(cell.difficulty);
                        count += 1;
                    }
                }
            }

            blocks.push(LowResolutionCell {
                average_difficulty: ((total + count / 2) / count.max(1)) as u32,
                lower_left,
                upper_right,
            });
        }
    }
    blocks
}
