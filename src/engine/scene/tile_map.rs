use serde::{Deserialize, Serialize};

use crate::core::{EngineError, Result, Vector2};
use crate::engine::renderer::Rect;

/// Grid of tile numbers laid over a tile sheet.
///
/// Negative numbers are empty cells. Every placed tile becomes a static
/// object with its own body when the engine builds the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileMap {
    pub tile_width: u32,
    pub tile_height: u32,
    /// Columns of the tile sheet image
    pub sheet_columns: u32,
    /// Map size in tiles
    pub columns: u32,
    pub rows: u32,
    /// Tile sheet image name in the textures directory
    #[serde(default)]
    pub texture: Option<String>,
    /// Row-major tile numbers
    pub tiles: Vec<i32>,
}

impl TileMap {
    /// Build a map from comma separated rows of tile numbers
    pub fn from_csv(csv: &str, tile_width: u32, tile_height: u32, sheet_columns: u32) -> Result<Self> {
        let mut tiles = Vec::new();
        let mut columns = None;
        let mut rows = 0;

        for (line_no, line) in csv.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let row = line
                .split(',')
                .map(|cell| cell.trim().parse::<i32>())
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|e| EngineError::Scene(format!("tile map line {}: {}", line_no + 1, e)))?;

            match columns {
                None => columns = Some(row.len() as u32),
                Some(n) if n as usize != row.len() => {
                    return Err(EngineError::Scene(format!(
                        "tile map line {} has {} cells, expected {}",
                        line_no + 1,
                        row.len(),
                        n
                    )));
                }
                Some(_) => {}
            }
            tiles.extend(row);
            rows += 1;
        }

        let map = Self {
            tile_width,
            tile_height,
            sheet_columns,
            columns: columns.unwrap_or(0),
            rows,
            texture: None,
            tiles,
        };
        map.validate()?;
        Ok(map)
    }

    pub fn validate(&self) -> Result<()> {
        if self.tile_width == 0 || self.tile_height == 0 || self.sheet_columns == 0 {
            return Err(EngineError::Scene(
                "tile size and sheet columns must be positive".to_string(),
            ));
        }
        if self.tiles.len() != (self.columns * self.rows) as usize {
            return Err(EngineError::Scene(format!(
                "tile map has {} tiles, expected {}x{}",
                self.tiles.len(),
                self.columns,
                self.rows
            )));
        }
        Ok(())
    }

    pub fn tile(&self, col: u32, row: u32) -> Option<i32> {
        if col >= self.columns || row >= self.rows {
            return None;
        }
        self.tiles.get((row * self.columns + col) as usize).copied()
    }

    /// Source rectangle of a tile number on the sheet
    pub fn tile_rect(&self, number: u32) -> Rect {
        let col = number % self.sheet_columns;
        let row = number / self.sheet_columns;
        Rect::new(
            (col * self.tile_width) as f32,
            (row * self.tile_height) as f32,
            self.tile_width as f32,
            self.tile_height as f32,
        )
    }

    /// Pixel center of a grid cell
    pub fn tile_center(&self, col: u32, row: u32) -> Vector2 {
        Vector2::new(
            (col as f32 + 0.5) * self.tile_width as f32,
            (row as f32 + 0.5) * self.tile_height as f32,
        )
    }

    pub fn tile_size(&self) -> Vector2 {
        Vector2::new(self.tile_width as f32, self.tile_height as f32)
    }

    /// Non-empty cells as (column, row, tile number)
    pub fn placed_tiles(&self) -> impl Iterator<Item = (u32, u32, u32)> + '_ {
        let columns = self.columns.max(1);
        self.tiles
            .iter()
            .enumerate()
            .filter(|(_, number)| **number >= 0)
            .map(move |(i, number)| (i as u32 % columns, i as u32 / columns, *number as u32))
    }
}
