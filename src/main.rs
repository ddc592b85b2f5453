mod board;
mod constants;
mod game;
mod tetromino;

use anyhow::{anyhow, Result};
use nanorand::WyRand;
use piston_window::prelude::*;

use crate::constants::{FONT, FRAMES_PER_SECOND, UPDATES_PER_SECOND, WINDOW_SIZE};

fn main() -> Result<()> {
    let opengl = OpenGL::V3_2;
    // 10 * 20 visible blocks, centered
    let mut window: PistonWindow = WindowSettings::new("tetris_rs", WINDOW_SIZE)
        .exit_on_esc(true)
        .graphics_api(opengl)
        .build()
        .map_err(|e| anyhow!("failed to open the game window: {}", e))?;
    window.set_ups(UPDATES_PER_SECOND);
    window.set_max_fps(FRAMES_PER_SECOND);

    let mut glyphs = Glyphs::from_bytes(
        FONT,
        window.create_texture_context(),
        TextureSettings::new(),
    )
    .map_err(|()| anyhow!("failed to load the embedded font"))?;

    let mut game = game::Game::new(WyRand::new());

    while let Some(e) = window.next() {
        game.handle_event(&e);
        e.update(|args| game.update(args.dt));
        window.draw_2d(&e, |c, g, device| {
            game.render(&mut glyphs, c, g);
            glyphs.factory.encoder.flush(device);
        });
    }

    Ok(())
}
