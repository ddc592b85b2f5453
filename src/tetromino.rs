use enum_map::{enum_map, Enum, EnumMap};
use lazy_static::lazy_static;
use nanorand::{RandomGen, Rng};
use ndarray::{Array2, Axis};

#[rustfmt::skip]
lazy_static! {
    static ref SHAPES: EnumMap<Tetromino, Array2<bool>> = enum_map! {
        Tetromino::I => Array2::from_shape_vec([1, 4], vec![
            true , true , true , true ,
        ]).unwrap(),
        Tetromino::J => Array2::from_shape_vec([2, 3], vec![
            true , true , true ,
            true , false, false,
        ]).unwrap(),
        Tetromino::L => Array2::from_shape_vec([2, 3], vec![
            true , true , true ,
            false, false, true ,
        ]).unwrap(),
        Tetromino::O => Array2::from_shape_vec([2, 2], vec![
            true , true ,
            true , true ,
        ]).unwrap(),
        Tetromino::S => Array2::from_shape_vec([2, 3], vec![
            false, true , true ,
            true , true , false,
        ]).unwrap(),
        Tetromino::T => Array2::from_shape_vec([2, 3], vec![
            true , true , true ,
            false, true , false,
        ]).unwrap(),
        Tetromino::Z => Array2::from_shape_vec([2, 3], vec![
            true , true , false,
            false, true , true ,
        ]).unwrap(),
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Enum)]
pub enum Tetromino {
    I,
    J,
    L,
    O,
    S,
    T,
    Z,
}

impl Tetromino {
    const COLORS: EnumMap<Tetromino, [u8; 4]> = EnumMap::from_array([
        [0, 255, 255, 255],
        [0, 0, 255, 255],
        [255, 165, 0, 255],
        [255, 255, 0, 255],
        [0, 255, 0, 255],
        [128, 0, 128, 255],
        [255, 0, 0, 255],
    ]);

    pub fn color(&self) -> [f32; 4] {
        Self::COLORS[*self].map(|c| c as f32 / 255.0)
    }

    fn spawn_offset(&self) -> (i32, i32) {
        match self {
            Tetromino::O => (4, 0),
            _ => (3, 0),
        }
    }
}

impl<Generator: Rng<OUTPUT>, const OUTPUT: usize> RandomGen<Generator, OUTPUT> for Tetromino {
    fn random(rng: &mut Generator) -> Self {
        [
            Tetromino::I,
            Tetromino::J,
            Tetromino::L,
            Tetromino::O,
            Tetromino::S,
            Tetromino::T,
            Tetromino::Z,
        ][rng.generate_range(0..7)]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Piece {
    pub shape: Array2<bool>,
    pub x: i32,
    pub y: i32,
    pub kind: Tetromino,
}

impl Piece {
    pub fn spawn(kind: Tetromino) -> Self {
        let (x, y) = kind.spawn_offset();
        Self {
            shape: SHAPES[kind].clone(),
            x,
            y,
            kind,
        }
    }

    /// Absolute board coordinates of every occupied mask cell.
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.shape
            .indexed_iter()
            .filter_map(move |((row, col), &filled)| {
                filled.then_some((self.x + col as i32, self.y + row as i32))
            })
    }
}

// 90 degree clockwise turn of a dense mask: transpose, then reverse each
// row. Pieces rotate about their bounding box, not a lookup-table center.
pub fn rotated_cw(shape: &Array2<bool>) -> Array2<bool> {
    let mut rotated = shape.t().to_owned();
    rotated.invert_axis(Axis(1));
    rotated
}
