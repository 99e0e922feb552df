//! Two-dimensional treasure hunt
//!
//! A square grid of paths, walls, and traps with the treasure in the
//! bottom-right corner. The agent starts at the top-left corner; stepping on
//! a trap or the treasure ends the episode.

use std::{fs::File, path::Path};

use rand::{Rng, seq::IndexedRandom};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, ports::Environment};

/// Grid coordinate as `(row, column)`
pub type Coord = (usize, usize);

/// Agent move on the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Move {
    Right,
    Down,
    Left,
    Up,
}

impl Move {
    /// Action order of the grid (fixes the value table's column layout)
    pub const ALL: [Move; 4] = [Move::Right, Move::Down, Move::Left, Move::Up];

    /// `(row, column)` offset
    pub fn delta(self) -> (isize, isize) {
        match self {
            Move::Right => (0, 1),
            Move::Down => (1, 0),
            Move::Left => (0, -1),
            Move::Up => (-1, 0),
        }
    }

    pub fn arrow(self) -> char {
        match self {
            Move::Right => '→',
            Move::Down => '↓',
            Move::Left => '←',
            Move::Up => '↑',
        }
    }
}

/// Contents of a grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    Trap,
    Path,
    Wall,
    Treasure,
}

impl Cell {
    /// Code used in map files
    pub fn code(self) -> i8 {
        match self {
            Cell::Trap => -1,
            Cell::Path => 0,
            Cell::Wall => 1,
            Cell::Treasure => 2,
        }
    }

    pub fn from_code(code: i8) -> Option<Self> {
        match code {
            -1 => Some(Cell::Trap),
            0 => Some(Cell::Path),
            1 => Some(Cell::Wall),
            2 => Some(Cell::Treasure),
            _ => None,
        }
    }

    fn glyph(self) -> char {
        match self {
            Cell::Trap => 'X',
            Cell::Path => ' ',
            Cell::Wall => '-',
            Cell::Treasure => '#',
        }
    }
}

/// Square map of cells
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridMap {
    size: usize,
    cells: Vec<Cell>,
}

impl GridMap {
    /// Build a map from row-major cells.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidMap`] unless the map is at least 2x2 and square, has
    /// exactly one treasure, and the top-left start cell is a path.
    pub fn new(size: usize, cells: Vec<Cell>) -> Result<Self> {
        let invalid = |message: String| Err(Error::InvalidMap { message });
        if size < 2 {
            return invalid(format!("grid size must be at least 2, got {size}"));
        }
        if cells.len() != size * size {
            return invalid(format!(
                "expected {} cells for a {size}x{size} grid, got {}",
                size * size,
                cells.len()
            ));
        }
        let treasures = cells.iter().filter(|&&c| c == Cell::Treasure).count();
        if treasures != 1 {
            return invalid(format!("expected exactly one treasure, found {treasures}"));
        }
        if cells[0] != Cell::Path {
            return invalid("start cell (0, 0) must be a path".to_string());
        }
        Ok(Self { size, cells })
    }

    /// Random map: treasure in the bottom-right corner, `size - 3` walls and
    /// one more trap than walls on distinct cells other than start and
    /// treasure.
    pub fn generate<R: Rng + ?Sized>(size: usize, rng: &mut R) -> Result<Self> {
        if size < 2 {
            return Err(Error::InvalidMap {
                message: format!("grid size must be at least 2, got {size}"),
            });
        }
        let total = size * size;
        let mut cells = vec![Cell::Path; total];
        cells[total - 1] = Cell::Treasure;

        let wall_count = size.saturating_sub(3);
        let trap_count = wall_count + 1;
        let candidates: Vec<usize> = (1..total - 1).collect();
        let picked: Vec<usize> = candidates
            .choose_multiple(rng, wall_count + trap_count)
            .copied()
            .collect();
        for (i, &index) in picked.iter().enumerate() {
            cells[index] = if i < wall_count { Cell::Wall } else { Cell::Trap };
        }

        Self::new(size, cells)
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn cell(&self, (row, col): Coord) -> Cell {
        self.cells[row * self.size + col]
    }

    /// All coordinates in row-major order
    pub fn coords(&self) -> Vec<Coord> {
        (0..self.size)
            .flat_map(|row| (0..self.size).map(move |col| (row, col)))
            .collect()
    }

    pub fn treasure(&self) -> Coord {
        let index = self
            .cells
            .iter()
            .position(|&c| c == Cell::Treasure)
            .unwrap_or(self.cells.len() - 1);
        (index / self.size, index % self.size)
    }

    pub fn cells_of(&self, kind: Cell) -> Vec<Coord> {
        self.coords()
            .into_iter()
            .filter(|&coord| self.cell(coord) == kind)
            .collect()
    }

    /// Neighbor of `coord` under `mv`, if it lies on the grid
    pub fn neighbor(&self, (row, col): Coord, mv: Move) -> Option<Coord> {
        let (dr, dc) = mv.delta();
        let row = row.checked_add_signed(dr)?;
        let col = col.checked_add_signed(dc)?;
        (row < self.size && col < self.size).then_some((row, col))
    }

    /// Load a header-less CSV of cell codes
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::StorageNotFound {
                path: path.to_path_buf(),
            });
        }
        let file = File::open(path).map_err(|source| Error::Io {
            operation: format!("open map {}", path.display()),
            source,
        })?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(file);

        let mut rows = 0;
        let mut width = None;
        let mut cells = Vec::new();
        for record in reader.records() {
            let record = record?;
            if let Some(width) = width {
                if record.len() != width {
                    return Err(Error::InvalidMap {
                        message: format!(
                            "row {rows} has {} cells, expected {width}",
                            record.len()
                        ),
                    });
                }
            }
            width = Some(record.len());
            for field in record.iter() {
                let cell = field
                    .trim()
                    .parse::<i8>()
                    .ok()
                    .and_then(Cell::from_code)
                    .ok_or_else(|| Error::InvalidMap {
                        message: format!("unknown cell code '{field}' in row {rows}"),
                    })?;
                cells.push(cell);
            }
            rows += 1;
        }
        Self::new(rows, cells)
    }

    /// Write the map as a header-less CSV of cell codes
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| Error::Io {
            operation: format!("create map {}", path.display()),
            source,
        })?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        for row in self.cells.chunks(self.size) {
            writer.write_record(row.iter().map(|c| c.code().to_string()))?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Parameters of a [`GridWorld`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridConfig {
    /// Side length of generated maps
    pub size: usize,
    /// Add a Manhattan-distance bonus to non-terminal rewards
    pub shaped_rewards: bool,
    pub trap_reward: f64,
    pub path_reward: f64,
    pub treasure_reward: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            size: 8,
            shaped_rewards: false,
            trap_reward: -10.0,
            path_reward: -0.5,
            treasure_reward: 10.0,
        }
    }
}

impl GridConfig {
    pub fn validate(&self) -> Result<()> {
        if self.size < 2 {
            return Err(Error::InvalidConfiguration {
                message: format!("grid size must be at least 2, got {}", self.size),
            });
        }
        let rewards = [self.trap_reward, self.path_reward, self.treasure_reward];
        if rewards.iter().any(|r| !r.is_finite()) {
            return Err(Error::InvalidConfiguration {
                message: "grid rewards must be finite".to_string(),
            });
        }
        Ok(())
    }
}

/// Weight of the distance-shaping bonus
const SHAPING_WEIGHT: f64 = 0.1;

/// Grid treasure hunt over a [`GridMap`]
#[derive(Debug, Clone)]
pub struct GridWorld {
    map: GridMap,
    config: GridConfig,
    position: Coord,
    history: Vec<Coord>,
}

impl GridWorld {
    pub fn new(map: GridMap, config: GridConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            map,
            config,
            position: (0, 0),
            history: Vec::new(),
        })
    }

    /// World over a freshly generated map of `config.size`
    pub fn generate<R: Rng + ?Sized>(config: GridConfig, rng: &mut R) -> Result<Self> {
        config.validate()?;
        let map = GridMap::generate(config.size, rng)?;
        Self::new(map, config)
    }

    pub fn map(&self) -> &GridMap {
        &self.map
    }

    /// Current agent position
    pub fn position(&self) -> Coord {
        self.position
    }

    /// Cells visited since the last reset
    pub fn history(&self) -> &[Coord] {
        &self.history
    }

    fn manhattan(&self, (row, col): Coord) -> usize {
        let (tr, tc) = self.map.treasure();
        row.abs_diff(tr) + col.abs_diff(tc)
    }

    fn cell_reward(&self, cell: Cell) -> f64 {
        match cell {
            Cell::Trap => self.config.trap_reward,
            Cell::Treasure => self.config.treasure_reward,
            Cell::Path | Cell::Wall => self.config.path_reward,
        }
    }

    /// Destination of a move; blocked moves stay in place
    fn destination(&self, state: Coord, mv: Move) -> Coord {
        match self.map.neighbor(state, mv) {
            Some(next) if self.map.cell(next) != Cell::Wall => next,
            _ => state,
        }
    }

    /// ASCII frame with the agent at `agent`
    pub fn render(&self, agent: Coord) -> String {
        let mut out = String::new();
        for row in 0..self.map.size() {
            out.push('|');
            for col in 0..self.map.size() {
                let coord = (row, col);
                let glyph = if coord == agent {
                    '@'
                } else if self.history.contains(&coord) {
                    '.'
                } else {
                    self.map.cell(coord).glyph()
                };
                out.push(glyph);
                out.push('|');
            }
            out.push('\n');
        }
        out
    }
}

impl Environment for GridWorld {
    type State = Coord;
    type Action = Move;

    fn states(&self) -> Vec<Coord> {
        self.map.coords()
    }

    fn actions(&self) -> Vec<Move> {
        Move::ALL.to_vec()
    }

    fn available_actions(&self, state: &Coord) -> Vec<Move> {
        Move::ALL
            .into_iter()
            .filter(|&mv| {
                self.map
                    .neighbor(*state, mv)
                    .is_some_and(|next| self.map.cell(next) != Cell::Wall)
            })
            .collect()
    }

    fn reward(&self, state: &Coord, action: &Move) -> f64 {
        let next = self.destination(*state, *action);
        let cell = self.map.cell(next);
        let base = self.cell_reward(cell);
        match cell {
            Cell::Trap | Cell::Treasure => base,
            _ if self.config.shaped_rewards => {
                let before = self.manhattan(*state) as f64;
                let after = self.manhattan(next) as f64;
                base + SHAPING_WEIGHT * (before - after)
            }
            _ => base,
        }
    }

    fn transition(&mut self, state: &Coord, action: &Move) -> Coord {
        self.history.push(*state);
        self.position = self.destination(*state, *action);
        self.position
    }

    fn init(&mut self) {
        self.position = (0, 0);
        self.history.clear();
    }

    fn start_state(&self) -> Coord {
        (0, 0)
    }

    fn terminal_states(&self) -> Vec<Coord> {
        let mut terminals = self.map.cells_of(Cell::Trap);
        terminals.push(self.map.treasure());
        terminals
    }

    fn display(&self, state: &Coord) {
        println!("{}", self.render(*state));
    }
}
