pub mod attacks;
pub mod board;
pub mod make_move;
pub mod moves;
pub mod zobrist;

pub use attacks::movegen::*;
pub use board::*;
pub use make_move::*;
pub use moves::*;
