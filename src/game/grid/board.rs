use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::seq::IteratorRandom;
use rand::{Rng, SeedableRng};

use crate::config::game::MIN_BOARD_DIMENSION;
use crate::game::error::{GameError, Result};
use crate::game::types::{Cell, Location};

/// Highest difficulty generated for rugged maps.
const MAX_GENERATED_DIFFICULTY: u32 = 9;

/// Terrain of one game. Read-only once built, so it is shared between threads without locking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    width: usize,
    height: usize,
    map_number: u32,
    // Row-major, row 0 is y = 1.
    difficulties: Vec<u32>,
}

impl Board {
    /// Builds the stock terrain for `map_number`: map 1 is flat, other numbers
    /// produce a rugged map derived from the number.
    pub fn new(width: usize, height: usize, map_number: u32) -> Result<Self> {
        check_dimensions(width, height)?;
        let difficulties = generate_terrain(width, height, map_number);
        Ok(Self { width, height, map_number, difficulties })
    }

    /// Builds a board from authored terrain. `rows[0]` is the row at `y = 1`.
    pub fn from_difficulties(map_number: u32, rows: Vec<Vec<u32>>) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map(|row| row.len()).unwrap_or(0);
        check_dimensions(width, height)?;
        if rows.iter().any(|row| row.len() != width) {
            return Err(GameError::InvalidOptions("terrain rows must all have the same length"));
        }
        if rows.iter().flatten().any(|difficulty| *difficulty == 0) {
            return Err(GameError::InvalidOptions("cell difficulty must be positive"));
        }
        Ok(Self {
            width,
            height,
            map_number,
            difficulties: rows.into_iter().flatten().collect(),
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn map_number(&self) -> u32 {
        self.map_number
    }

    pub fn contains(&self, location: Location) -> bool {
        location.x >= 1
            && location.y >= 1
            && location.x as usize <= self.width
            && location.y as usize <= self.height
    }

    pub fn cell(&self, location: Location) -> Option<Cell> {
        if !self.contains(location) {
            return None;
        }
        let index = (location.y as usize - 1) * self.width + (location.x as usize - 1);
        Some(Cell { location, difficulty: self.difficulties[index] })
    }

    /// Every cell in row-major order (`y` ascending, then `x`).
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        let width = self.width;
        self.difficulties.iter().enumerate().map(move |(i, difficulty)| Cell {
            location: Location::new((i % width) as i32 + 1, (i / width) as i32 + 1),
            difficulty: *difficulty,
        })
    }

    /// Cells within `radius` (Chebyshev distance) of `location`, clipped to the board,
    /// in row-major order.
    pub fn get_neighbors(&self, location: Location, radius: usize) -> Vec<Cell> {
        let radius = i64::try_from(radius).unwrap_or(i64::MAX);
        let (x, y) = (i64::from(location.x), i64::from(location.y));
        let left = x.saturating_sub(radius).max(1);
        let right = x.saturating_add(radius).min(self.width as i64);
        let bottom = y.saturating_sub(radius).max(1);
        let top = y.saturating_add(radius).min(self.height as i64);

        let mut neighbors = Vec::new();
        for y in bottom..=top {
            for x in left..=right {
                if let Some(cell) = self.cell(Location::new(x as i32, y as i32)) {
                    neighbors.push(cell);
                }
            }
        }
        neighbors
    }

    /// Picks a uniformly random cell that is neither `excluded` nor in `occupied`.
    /// Only reads occupancy; the caller registers the player afterwards.
    pub fn place_new_player<R: Rng + ?Sized>(
        &self,
        occupied: &HashSet<Location>,
        excluded: Location,
        rng: &mut R,
    ) -> Option<Location> {
        self.cells()
            .map(|cell| cell.location)
            .filter(|location| *location != excluded && !occupied.contains(location))
            .choose(rng)
    }
}

fn check_dimensions(width: usize, height: usize) -> Result<()> {
    if width < MIN_BOARD_DIMENSION || height < MIN_BOARD_DIMENSION {
        return Err(GameError::BoardTooSmall { width, height });
    }
    Ok(())
}

fn generate_terrain(width: usize, height: usize, map_number: u32) -> Vec<u32> {
    if map_number <= 1 {
        return vec![1; width * height];
    }
    let mut rng = StdRng::seed_from_u64(u64::from(map_number));
    (0..width * height)
        .map(|_| rng.random_range(1..=MAX_GENERATED_DIFFICULTY))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_boards_smaller_than_three() {
        assert_eq!(
            Board::new(2, 5, 1),
            Err(GameError::BoardTooSmall { width: 2, height: 5 })
        );
        assert!(Board::new(5, 2, 1).is_err());
        assert!(Board::new(3, 3, 1).is_ok());
    }

    #[test]
    fn flat_map_costs_one_everywhere() {
        let board = Board::new(4, 6, 1).unwrap();
        assert_eq!(board.cells().count(), 24);
        assert!(board.cells().all(|cell| cell.difficulty == 1));
    }

    #[test]
    fn rugged_maps_are_stable_per_number() {
        let first = Board::new(8, 8, 3).unwrap();
        let second = Board::new(8, 8, 3).unwrap();
        assert_eq!(first, second);
        assert!(first.cells().all(|cell| (1..=MAX_GENERATED_DIFFICULTY).contains(&cell.difficulty)));
    }

    #[test]
    fn bounds_are_one_based() {
        let board = Board::new(5, 4, 1).unwrap();
        assert!(board.contains(Location::new(1, 1)));
        assert!(board.contains(Location::new(5, 4)));
        assert!(!board.contains(Location::new(0, 1)));
        assert!(!board.contains(Location::new(6, 1)));
        assert!(!board.contains(Location::new(1, 5)));
        assert!(board.cell(Location::new(3, 0)).is_none());
    }

    #[test]
    fn authored_terrain_maps_first_row_to_y_one() {
        let board = Board::from_difficulties(7, vec![vec![1, 2, 3], vec![4, 5, 6], vec![7, 8, 9]]).unwrap();
        assert_eq!(board.map_number(), 7);
        assert_eq!(board.cell(Location::new(1, 1)).unwrap().difficulty, 1);
        assert_eq!(board.cell(Location::new(3, 1)).unwrap().difficulty, 3);
        assert_eq!(board.cell(Location::new(2, 3)).unwrap().difficulty, 8);
    }

    #[test]
    fn authored_terrain_is_validated() {
        assert!(Board::from_difficulties(1, vec![vec![1, 1, 1], vec![1, 1], vec![1, 1, 1]]).is_err());
        assert!(Board::from_difficulties(1, vec![vec![1, 1, 1], vec![1, 0, 1], vec![1, 1, 1]]).is_err());
        assert!(matches!(
            Board::from_difficulties(1, vec![vec![1, 1, 1]]),
            Err(GameError::BoardTooSmall { .. })
        ));
    }

    #[test]
    fn neighbors_are_clipped_and_row_major() {
        let board = Board::new(5, 5, 1).unwrap();
        let corner = board.get_neighbors(Location::new(1, 1), 1);
        let locations: Vec<Location> = corner.iter().map(|c| c.location).collect();
        assert_eq!(
            locations,
            vec![
                Location::new(1, 1),
                Location::new(2, 1),
                Location::new(1, 2),
                Location::new(2, 2),
            ]
        );
        assert_eq!(board.get_neighbors(Location::new(3, 3), 2).len(), 25);
        assert_eq!(board.get_neighbors(Location::new(3, 3), 0).len(), 1);
    }

    #[test]
    fn huge_radius_is_clipped_to_the_board() {
        let board = Board::new(5, 5, 1).unwrap();
        let centre = Location::new(3, 3);
        for radius in [20_000, i32::MAX as usize, 1usize << 32, usize::MAX] {
            let neighbors = board.get_neighbors(centre, radius);
            assert_eq!(neighbors.len(), 25, "radius {radius}");
            assert_eq!(neighbors[0].location, Location::new(1, 1));
            assert_eq!(neighbors[24].location, Location::new(5, 5));
        }
    }

    #[test]
    fn placement_skips_target_and_occupied_cells() {
        let board = Board::new(3, 3, 1).unwrap();
        let target = Location::new(2, 2);
        let mut occupied = HashSet::new();
        let mut rng = StdRng::seed_from_u64(11);

        for _ in 0..8 {
            let location = board.place_new_player(&occupied, target, &mut rng).unwrap();
            assert_ne!(location, target);
            assert!(board.contains(location));
            assert!(occupied.insert(location));
        }
        assert_eq!(board.place_new_player(&occupied, target, &mut rng), None);
    }
}
