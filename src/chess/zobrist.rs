use crate::chess::board::{Color, Piece, Square, BOARD_SIZE, BOARD_WIDTH, PIECE_TYPES};
use rand::{Rng, SeedableRng};
use std::array::from_fn;
use std::sync::LazyLock;

/// Random 64-bit signatures for every hashable position feature. A
/// position's key is the XOR-fold of the signatures of its features, so
/// it can be maintained incrementally: placing or removing a piece,
/// flipping the side to move, or changing the castling or en passant
/// state each XOR a single signature in or out.
pub struct Zobrist {
    piece: [[[u64; BOARD_SIZE]; PIECE_TYPES.len()]; 2],
    side: u64,
    castling: [u64; 16],
    en_passant_file: [u64; BOARD_WIDTH],
}

/// All signatures come from one seeded stream, so keys are reproducible
/// run to run (and across the incremental/recomputed audit in tests).
const ZOBRIST_SEED: u64 = 0x5AB1E;

pub static ZOBRIST: LazyLock<Zobrist> = LazyLock::new(|| {
    let mut rng = rand::rngs::SmallRng::seed_from_u64(ZOBRIST_SEED);
    Zobrist {
        piece: from_fn(|_| from_fn(|_| from_fn(|_| rng.random()))),
        side: rng.random(),
        castling: from_fn(|_| rng.random()),
        en_passant_file: from_fn(|_| rng.random()),
    }
});

impl Zobrist {
    #[inline(always)]
    pub fn piece(&self, piece: Piece, color: Color, square: Square) -> u64 {
        debug_assert!(piece != Piece::None);
        self.piece[color as usize][piece as usize][square as usize]
    }

    /// XORed in whenever white is to move.
    #[inline(always)]
    pub fn side(&self) -> u64 {
        self.side
    }

    /// One signature per 4-bit rights mask, not per individual right.
    #[inline(always)]
    pub fn castling(&self, rights: u8) -> u64 {
        self.castling[rights as usize]
    }

    /// Keyed by file only: the en passant rank is already implied by the
    /// side to move, which carries its own signature.
    #[inline(always)]
    pub fn en_passant(&self, square: Square) -> u64 {
        self.en_passant_file[(square % BOARD_WIDTH as Square) as usize]
    }
}
