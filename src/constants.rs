use enum_map::Enum;

pub const WINDOW_SIZE: (u32, u32) = (640, 480);
pub const BLOCK_SIZE: usize = 24;
pub const BOARD_WIDTH: usize = 10;
pub const BOARD_HEIGHT: usize = 24;
// Spawn buffer above the visible playfield; rendering shifts up by this much.
pub const HIDDEN_ROWS: usize = 4;
pub const BOARD_OFFSET_X: usize = (WINDOW_SIZE.0 as usize - BOARD_WIDTH * BLOCK_SIZE) / 2;

pub const UPDATES_PER_SECOND: u64 = 60;
pub const FRAMES_PER_SECOND: u64 = 60;
pub const DROP_INTERVAL: f64 = 0.5;
pub const MIN_DROP_INTERVAL: f64 = 0.1;
pub const LEVEL_SPEEDUP: f64 = 0.05;
pub const LINES_PER_LEVEL: u32 = 10;
pub const LINE_SCORE: u32 = 100;
pub const FLASH_COUNT: usize = 5;
pub const FLASH_INTERVAL: f64 = 0.15;

pub const NEXT_BOX_X: usize = 10;
pub const NEXT_BOX_Y: usize = 10;
pub const NEXT_BOX_SIZE: usize = 120;

pub const CLEAR_COLOR: [f32; 4] = [0.0, 0.0, 0.0, 1.0];
pub const WALL_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
pub const TEXT_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
pub const GAME_OVER_COLOR: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
pub const FONT_SIZE: u32 = 16;

pub const FONT: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Enum)]
pub enum Action {
    Rotate,
    Left,
    Right,
    SoftDrop,
}
