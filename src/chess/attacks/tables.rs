use crate::chess::board::*;
use std::sync::LazyLock;

// (rank, file) deltas for the leapers and slider ray directions.

pub const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (2, 1),
    (1, 2),
    (-1, 2),
    (-2, 1),
    (-2, -1),
    (-1, -2),
    (1, -2),
    (2, -1),
];

pub const KING_OFFSETS: [(i8, i8); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

pub const WPAWN_OFFSETS: [(i8, i8); 2] = [(1, -1), (1, 1)];
pub const BPAWN_OFFSETS: [(i8, i8); 2] = [(-1, -1), (-1, 1)];

pub const ROOK_DIRECTIONS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
pub const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

pub fn gen_jumping_attacks(square: Square, offsets: &[(i8, i8)]) -> u64 {
    debug_assert!(square < BOARD_SIZE as u8);

    let rank = square as i8 / BOARD_WIDTH as i8;
    let file = square as i8 % BOARD_WIDTH as i8;

    offsets.iter().fold(0u64, |attacks, &(dr, df)| {
        let (r, f) = (rank + dr, file + df);
        if valid_axis(r) && valid_axis(f) {
            attacks | bit(to_square(r, f))
        } else {
            attacks
        }
    })
}

/// Ray walk stopping at (and including) the first blocker in each
/// direction. Slow; used only to fill the magic attack tables.
pub fn gen_sliding_attacks(square: Square, occupancy: u64, directions: &[(i8, i8)]) -> u64 {
    debug_assert!(square < BOARD_SIZE as u8);

    let rank = square as i8 / BOARD_WIDTH as i8;
    let file = square as i8 % BOARD_WIDTH as i8;

    let mut attacks: u64 = 0;
    for &(dr, df) in directions {
        let (mut r, mut f) = (rank + dr, file + df);
        while valid_axis(r) && valid_axis(f) {
            attacks |= bit(to_square(r, f));
            if occupancy & bit(to_square(r, f)) != 0 {
                break;
            }
            r += dr;
            f += df;
        }
    }
    attacks
}

/// Board edges a blocker mask must exclude: a piece on the last square of
/// a ray cannot block anything. Edges the square itself sits on stay.
pub fn gen_edge_mask(square: Square) -> u64 {
    debug_assert!(square < BOARD_SIZE as u8);

    let square_bit = bit(square);
    [RANKS[0], RANKS[7], FILES[0], FILES[7]]
        .iter()
        .fold(0u64, |mask, &edge| {
            if square_bit & edge == 0 {
                mask | edge
            } else {
                mask
            }
        })
}

/// Expand the index `variant` into an occupancy over the set bits of
/// `relevant_mask`, lowest square first. Enumerating all 2^popcount
/// variants visits every blocker configuration of the mask.
pub fn get_occupancy(mut variant: usize, mut relevant_mask: u64) -> u64 {
    debug_assert!(variant < (1 << relevant_mask.count_ones()));

    let mut occupancy: u64 = 0;
    while variant != 0 {
        if variant & 1 != 0 {
            occupancy |= relevant_mask & relevant_mask.wrapping_neg();
        }
        variant >>= 1;
        relevant_mask &= relevant_mask - 1;
    }
    occupancy
}

pub static KNIGHT_ATTACKS: LazyLock<[u64; BOARD_SIZE]> = LazyLock::new(|| {
    std::array::from_fn(|square| gen_jumping_attacks(square as Square, &KNIGHT_OFFSETS))
});
pub static KING_ATTACKS: LazyLock<[u64; BOARD_SIZE]> = LazyLock::new(|| {
    std::array::from_fn(|square| gen_jumping_attacks(square as Square, &KING_OFFSETS))
});
pub static WPAWN_ATTACKS: LazyLock<[u64; BOARD_SIZE]> = LazyLock::new(|| {
    std::array::from_fn(|square| gen_jumping_attacks(square as Square, &WPAWN_OFFSETS))
});
pub static BPAWN_ATTACKS: LazyLock<[u64; BOARD_SIZE]> = LazyLock::new(|| {
    std::array::from_fn(|square| gen_jumping_attacks(square as Square, &BPAWN_OFFSETS))
});

/// Relevant blocker masks for the magic lookups: every square a slider
/// on `square` could be blocked by, edges excluded.
pub static BISHOP_RM: LazyLock<[u64; BOARD_SIZE]> = LazyLock::new(|| {
    std::array::from_fn(|square| {
        gen_sliding_attacks(square as Square, 0, &BISHOP_DIRECTIONS)
            & !gen_edge_mask(square as Square)
    })
});
pub static ROOK_RM: LazyLock<[u64; BOARD_SIZE]> = LazyLock::new(|| {
    std::array::from_fn(|square| {
        gen_sliding_attacks(square as Square, 0, &ROOK_DIRECTIONS) & !gen_edge_mask(square as Square)
    })
});
