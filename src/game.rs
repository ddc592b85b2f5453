use crate::board::Board;
use crate::constants::*;
use crate::tetromino::rotated_cw;
use crate::tetromino::Piece;
use enum_map::EnumMap;
use nanorand::Rng;
use nanorand::WyRand;
use piston_window::graphics;
use piston_window::prelude::*;

#[derive(Debug)]
pub struct Game {
    rng: WyRand,
    board: Board,
    current: Option<Piece>,
    next: Piece,
    score: u32,
    level: u32,
    lines: u32,
    level_lines: u32,
    drop_interval: f64,
    animation: Option<(f64, Animation)>,
    elapsed_time: f64,
    next_drop: f64,
    pressed: EnumMap<Action, bool>,
    over: bool,
}

impl Game {
    pub fn new(mut rng: WyRand) -> Self {
        let current = Piece::spawn(rng.generate());
        let next = Piece::spawn(rng.generate());
        Self {
            rng,
            board: Board::new(),
            current: Some(current),
            next,
            score: 0,
            level: 1,
            lines: 0,
            level_lines: 0,
            drop_interval: DROP_INTERVAL,
            animation: None,
            elapsed_time: 0.0,
            next_drop: DROP_INTERVAL,
            pressed: Default::default(),
            over: false,
        }
    }

    pub fn handle_event(&mut self, event: &Event) {
        if let Some(button) = event.press_args() {
            match button {
                Button::Keyboard(key) => match key {
                    Key::Up => self.press(Action::Rotate),
                    Key::Left => self.press(Action::Left),
                    Key::Right => self.press(Action::Right),
                    Key::Down => self.press(Action::SoftDrop),
                    _ => {}
                },
                _ => {}
            }
        }
        if let Some(button) = event.release_args() {
            match button {
                Button::Keyboard(key) => match key {
                    Key::Up => self.release(Action::Rotate),
                    Key::Left => self.release(Action::Left),
                    Key::Right => self.release(Action::Right),
                    Key::Down => self.release(Action::SoftDrop),
                    _ => {}
                },
                _ => {}
            }
        }
    }

    // A held key acts once; it only re-arms when the key is released.
    fn press(&mut self, action: Action) {
        if self.pressed[action] {
            return;
        }
        self.pressed[action] = true;

        if self.over {
            return;
        }
        match action {
            Action::Rotate => self.rotate_current(),
            Action::Left => self.shift_current(-1),
            Action::Right => self.shift_current(1),
            Action::SoftDrop => self.advance_current(),
        }
    }

    fn release(&mut self, action: Action) {
        self.pressed[action] = false;
    }

    fn shift_current(&mut self, dx: i32) {
        let Some(piece) = self.current.as_mut() else {
            return;
        };
        piece.x += dx;
        if self.board.collides(piece) {
            piece.x -= dx;
        }
    }

    fn rotate_current(&mut self) {
        let Some(piece) = self.current.as_mut() else {
            return;
        };
        let rotated = rotated_cw(&piece.shape);
        let previous = std::mem::replace(&mut piece.shape, rotated);
        if self.board.collides(piece) {
            // No wall kicks; a turn that does not fit is simply dropped
            piece.shape = previous;
        }
    }

    // One step of gravity. A piece that can no longer fall locks in place.
    fn advance_current(&mut self) {
        let Some(piece) = self.current.as_mut() else {
            return;
        };
        piece.y += 1;
        if self.board.collides(piece) {
            piece.y -= 1;
            self.lock_current();
        }
    }

    fn lock_current(&mut self) {
        let Some(piece) = self.current.take() else {
            return;
        };
        self.board.place(&piece);

        let rows = self.board.full_rows();
        if rows.is_empty() {
            self.spawn_next();
        } else {
            // Clearing and scoring wait until the flash has played out
            self.animation = Some((
                0.0,
                Animation::LineClear {
                    flash_on: false,
                    rows,
                },
            ));
        }
    }

    fn apply_line_clear(&mut self, rows: &[usize]) {
        let cleared = rows.len() as u32;
        self.score += cleared * cleared * LINE_SCORE;
        self.lines += cleared;
        self.level_lines += cleared;
        self.board.clear_rows(rows);
        // Overshoot past the threshold carries into the next level
        while self.level_lines >= LINES_PER_LEVEL {
            self.level_lines -= LINES_PER_LEVEL;
            self.level += 1;
            self.drop_interval = (self.drop_interval - LEVEL_SPEEDUP).max(MIN_DROP_INTERVAL);
        }
    }

    fn spawn_next(&mut self) {
        let piece = std::mem::replace(&mut self.next, Piece::spawn(self.rng.generate()));
        if self.board.collides(&piece) {
            // The piece still becomes current so the stuck spawn is drawn
            self.over = true;
        }
        self.current = Some(piece);
    }

    pub fn update(&mut self, dt: f64) {
        if self.over {
            return;
        }

        if self.run_animation(dt) {
            // If we are in the middle of an animation, let run_animation() handle it, the game is
            // effectively frozen
            return;
        } else if let Some((_, animation)) = self.animation.take() {
            // The animation is complete, do whatever needs to be done now that the animation's
            // finished
            match animation {
                Animation::LineClear { rows, .. } => {
                    self.apply_line_clear(&rows);
                    self.spawn_next();
                }
            }
            if self.over {
                return;
            }
        }

        self.elapsed_time += dt;

        if self.elapsed_time >= self.next_drop {
            self.advance_current();
            self.next_drop = self.elapsed_time + self.drop_interval;
        }
    }

    fn run_animation(&mut self, delta: f64) -> bool {
        let Some((animation_ts, animation)) = &mut self.animation else {
            return false;
        };

        *animation_ts += delta;

        match animation {
            Animation::LineClear { flash_on, .. } => {
                if *animation_ts >= FLASH_COUNT as f64 * FLASH_INTERVAL {
                    return false;
                }
                *flash_on = (*animation_ts / FLASH_INTERVAL) as usize % 2 == 1;
            }
        };

        return true;
    }

    // Board coordinates to pixels. Callers skip the hidden rows.
    fn draw_block(
        &self,
        x: usize,
        y: usize,
        color: [f32; 4],
        context: graphics::Context,
        g: &mut G2d,
    ) {
        let (px, py) = (
            (BOARD_OFFSET_X + x * BLOCK_SIZE) as f64,
            ((y - HIDDEN_ROWS) * BLOCK_SIZE) as f64,
        );
        graphics::rectangle_from_to(
            color,
            [px + 1.0, py + 1.0],
            [px + BLOCK_SIZE as f64 - 1.0, py + BLOCK_SIZE as f64 - 1.0],
            context.transform,
            g,
        );
    }

    pub fn render(&self, glyphs: &mut Glyphs, context: graphics::Context, g: &mut G2d) {
        graphics::clear(CLEAR_COLOR, g);

        // Playfield walls
        for wall_x in [BOARD_OFFSET_X - 3, BOARD_OFFSET_X + BOARD_WIDTH * BLOCK_SIZE] {
            graphics::rectangle_from_to(
                WALL_COLOR,
                [wall_x as f64, 0.0],
                [wall_x as f64 + 3.0, WINDOW_SIZE.1 as f64],
                context.transform,
                g,
            );
        }

        for (x, y, kind) in self.board.filled() {
            if y < HIDDEN_ROWS {
                continue;
            }
            if let Some((
                _,
                Animation::LineClear {
                    flash_on: false,
                    rows,
                },
            )) = &self.animation
            {
                if rows.contains(&y) {
                    continue;
                }
            }
            self.draw_block(x, y, kind.color(), context, g);
        }

        if let Some(piece) = &self.current {
            for (x, y) in piece.cells() {
                if y >= HIDDEN_ROWS as i32 {
                    self.draw_block(x as usize, y as usize, piece.kind.color(), context, g);
                }
            }
        }

        // Next piece preview, centered in its box
        graphics::Rectangle::new_border(WALL_COLOR, 1.0).draw(
            [
                NEXT_BOX_X as f64,
                NEXT_BOX_Y as f64,
                NEXT_BOX_SIZE as f64,
                NEXT_BOX_SIZE as f64,
            ],
            &context.draw_state,
            context.transform,
            g,
        );
        let (rows, cols) = self.next.shape.dim();
        let origin = (
            NEXT_BOX_X as f64 + (NEXT_BOX_SIZE - cols * BLOCK_SIZE) as f64 / 2.0,
            NEXT_BOX_Y as f64 + (NEXT_BOX_SIZE - rows * BLOCK_SIZE) as f64 / 2.0,
        );
        for ((row, col), &filled) in self.next.shape.indexed_iter() {
            if !filled {
                continue;
            }
            let (px, py) = (
                origin.0 + (col * BLOCK_SIZE) as f64,
                origin.1 + (row * BLOCK_SIZE) as f64,
            );
            graphics::rectangle_from_to(
                self.next.kind.color(),
                [px + 1.0, py + 1.0],
                [px + BLOCK_SIZE as f64 - 1.0, py + BLOCK_SIZE as f64 - 1.0],
                context.transform,
                g,
            );
        }

        // Score readout
        for (i, line) in [
            format!("Score: {}", self.score),
            format!("Level: {}", self.level),
            format!("Lines: {}", self.lines),
        ]
        .iter()
        .enumerate()
        {
            piston_window::Text::new_color(TEXT_COLOR, FONT_SIZE)
                .draw_pos(
                    line,
                    [460.0, 40.0 + i as f64 * 30.0],
                    glyphs,
                    &Default::default(),
                    context.transform,
                    g,
                )
                .unwrap();
        }

        if self.over {
            piston_window::Text::new_color(GAME_OVER_COLOR, FONT_SIZE)
                .draw_pos(
                    "Game Over",
                    [270.0, 240.0],
                    glyphs,
                    &Default::default(),
                    context.transform,
                    g,
                )
                .unwrap();
        }
    }
}

#[derive(Debug, Clone)]
enum Animation {
    LineClear { flash_on: bool, rows: Vec<usize> },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tetromino::Tetromino;

    fn game_with(kind: Tetromino) -> Game {
        let mut game = Game::new(WyRand::new_seed(42));
        game.current = Some(Piece::spawn(kind));
        game
    }

    fn tap(game: &mut Game, action: Action) {
        game.press(action);
        game.release(action);
    }

    #[test]
    fn test_gravity_steps_the_piece_down() {
        let mut game = game_with(Tetromino::T);

        game.update(DROP_INTERVAL / 2.0);
        assert_eq!(game.current.as_ref().map(|piece| piece.y), Some(0));

        game.update(DROP_INTERVAL / 2.0);
        assert_eq!(game.current.as_ref().map(|piece| piece.y), Some(1));

        game.update(DROP_INTERVAL / 4.0);
        assert_eq!(game.current.as_ref().map(|piece| piece.y), Some(1));
    }

    #[test]
    fn test_gravity_uses_the_leveled_interval() {
        let mut game = game_with(Tetromino::T);
        for _ in 0..10 {
            game.board.fill_row(23, Tetromino::I);
            game.apply_line_clear(&[23]);
        }
        assert_eq!(game.level, 2);
        assert_eq!(game.level_lines, 0);
        assert_eq!(game.drop_interval, DROP_INTERVAL - LEVEL_SPEEDUP);

        game.update(DROP_INTERVAL);
        assert_eq!(game.current.as_ref().map(|piece| piece.y), Some(1));

        // The next step fires a whole speedup earlier
        game.update(game.drop_interval);
        assert_eq!(game.current.as_ref().map(|piece| piece.y), Some(2));
    }

    #[test]
    fn test_held_key_acts_once() {
        let mut game = game_with(Tetromino::T);

        game.press(Action::Left);
        game.press(Action::Left);
        assert_eq!(game.current.as_ref().map(|piece| piece.x), Some(2));

        game.release(Action::Left);
        game.press(Action::Left);
        assert_eq!(game.current.as_ref().map(|piece| piece.x), Some(1));
    }

    #[test]
    fn test_walls_block_shifts() {
        let mut game = game_with(Tetromino::O);
        for _ in 0..BOARD_WIDTH {
            tap(&mut game, Action::Left);
        }
        assert_eq!(game.current.as_ref().map(|piece| piece.x), Some(0));

        for _ in 0..BOARD_WIDTH {
            tap(&mut game, Action::Right);
        }
        assert_eq!(
            game.current.as_ref().map(|piece| piece.x),
            Some(BOARD_WIDTH as i32 - 2)
        );
    }

    #[test]
    fn test_rotation_turns_the_piece_in_place() {
        let mut game = game_with(Tetromino::T);
        let before = game.current.clone().map(|piece| piece.shape);

        tap(&mut game, Action::Rotate);
        let piece = game.current.as_ref().map(|piece| piece.shape.clone());
        assert_eq!(piece, before.as_ref().map(rotated_cw));
        assert_eq!(game.current.as_ref().map(|piece| (piece.x, piece.y)), Some((3, 0)));
    }

    #[test]
    fn test_blocked_rotation_is_dropped() {
        let mut game = game_with(Tetromino::I);
        let Some(piece) = game.current.as_mut() else {
            panic!("no current piece");
        };
        piece.y = BOARD_HEIGHT as i32 - 1;
        let before = piece.shape.clone();

        // Turning the flat I upright here would poke through the floor
        tap(&mut game, Action::Rotate);
        assert_eq!(game.current.as_ref().map(|piece| piece.shape.clone()), Some(before));
    }

    #[test]
    fn test_soft_drop_locks_on_the_floor() {
        let mut game = game_with(Tetromino::O);
        // 22 steps to the floor, one more to lock
        for _ in 0..BOARD_HEIGHT - 1 {
            tap(&mut game, Action::SoftDrop);
        }

        for (x, y) in [(4, 22), (5, 22), (4, 23), (5, 23)] {
            assert_eq!(game.board.cell(x, y), Some(Tetromino::O));
        }
        assert!(game.animation.is_none());
        assert_eq!(game.score, 0);
        // The preview piece was promoted and a fresh one queued up
        assert_eq!(game.current.as_ref().map(|piece| piece.y), Some(0));
        assert!(!game.over);
    }

    #[test]
    fn test_line_clear_flashes_before_scoring() {
        let mut game = game_with(Tetromino::O);
        for y in [22, 23] {
            for x in 0..BOARD_WIDTH {
                if x != 4 && x != 5 {
                    game.board.set(x, y, Tetromino::J);
                }
            }
        }

        // Drop the O into the double gap
        for _ in 0..BOARD_HEIGHT {
            tap(&mut game, Action::SoftDrop);
        }

        let Some((_, Animation::LineClear { rows, flash_on })) = &game.animation else {
            panic!("no line clear animation");
        };
        assert_eq!(rows, &vec![22, 23]);
        assert!(!flash_on);
        // Nothing is cleared or scored until the flash has played out
        assert_eq!(game.board.cell(0, 23), Some(Tetromino::J));
        assert_eq!(game.score, 0);
        assert!(game.current.is_none());

        // The game clock is frozen while the rows flash
        game.update(FLASH_INTERVAL);
        assert_eq!(game.elapsed_time, 0.0);
        let Some((_, Animation::LineClear { flash_on, .. })) = &game.animation else {
            panic!("animation ended early");
        };
        assert!(flash_on);

        for _ in 0..FLASH_COUNT {
            game.update(FLASH_INTERVAL);
        }
        assert!(game.animation.is_none());
        assert_eq!(game.score, 4 * LINE_SCORE);
        assert_eq!(game.lines, 2);
        assert_eq!(game.board.filled().count(), 0);
        assert!(game.current.is_some());
    }

    #[test]
    fn test_gap_fill_clears_a_single_row() {
        let mut game = game_with(Tetromino::O);
        for x in 0..BOARD_WIDTH {
            if x != 4 && x != 5 {
                game.board.set(x, 23, Tetromino::L);
            }
        }

        for _ in 0..BOARD_HEIGHT - 1 {
            tap(&mut game, Action::SoftDrop);
        }
        for _ in 0..=FLASH_COUNT {
            game.update(FLASH_INTERVAL);
        }

        assert_eq!(game.score, LINE_SCORE);
        assert_eq!(game.lines, 1);
        // Only the O's top half survives, shifted onto the bottom row
        assert_eq!(game.board.cell(4, 23), Some(Tetromino::O));
        assert_eq!(game.board.cell(5, 23), Some(Tetromino::O));
        assert_eq!(game.board.cell(0, 23), None);
        assert_eq!(game.board.filled().count(), 2);
    }

    #[test]
    fn test_scoring_is_quadratic_in_lines_cleared() {
        for cleared in 1..=4 {
            let mut game = game_with(Tetromino::T);
            let rows: Vec<usize> = (BOARD_HEIGHT - cleared..BOARD_HEIGHT).collect();
            for &y in &rows {
                game.board.fill_row(y, Tetromino::S);
            }
            game.apply_line_clear(&rows);
            assert_eq!(game.score, (cleared * cleared) as u32 * LINE_SCORE);
            assert_eq!(game.lines, cleared as u32);
        }
    }

    #[test]
    fn test_drop_interval_bottoms_out() {
        let mut game = game_with(Tetromino::T);
        for _ in 0..150 {
            game.board.fill_row(23, Tetromino::I);
            game.apply_line_clear(&[23]);
        }
        assert_eq!(game.level, 16);
        assert_eq!(game.drop_interval, MIN_DROP_INTERVAL);
    }

    #[test]
    fn test_blocked_spawn_ends_the_game() {
        let mut game = game_with(Tetromino::T);
        game.board.fill_row(0, Tetromino::Z);
        game.board.fill_row(1, Tetromino::Z);

        game.current = None;
        game.spawn_next();
        assert!(game.over);
        // The stuck piece stays visible
        assert!(game.current.is_some());

        // A finished game ignores both the clock and the keys
        let before = game.current.clone();
        game.update(DROP_INTERVAL);
        tap(&mut game, Action::Left);
        assert_eq!(game.current, before);
        assert_eq!(game.elapsed_time, 0.0);
    }
}
