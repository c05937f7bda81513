use crate::chess::attacks::{magics, tables};
use crate::chess::{board::*, moves::Move};
use tinyvec::ArrayVec;

pub const MAX_MOVES: usize = 256;

pub type MoveList = ArrayVec<[Move; MAX_MOVES]>;

/// Attack bitboard of a single piece over the given total occupancy.
/// Own pieces are not masked out here; callers intersect with whatever
/// target set they need.
#[inline(always)]
pub fn piece_attacks(piece: Piece, square: Square, occupancy: u64) -> u64 {
    match piece {
        Piece::Knight => tables::KNIGHT_ATTACKS[square as usize],
        Piece::Bishop => magics::bishop_attacks(square, occupancy),
        Piece::Rook => magics::rook_attacks(square, occupancy),
        Piece::Queen => magics::queen_attacks(square, occupancy),
        Piece::King => tables::KING_ATTACKS[square as usize],
        Piece::Pawn | Piece::None => unreachable!("pawns and empty squares have no attack getter"),
    }
}

/// Pawn moves reaching the back rank fan out into the four promotions.
fn push_pawn_move(list: &mut MoveList, from: Square, to: Square, victim: Piece) {
    if bit(to) & (RANKS[0] | RANKS[7]) != 0 {
        for promotion in [Piece::Knight, Piece::Bishop, Piece::Rook, Piece::Queen] {
            list.push(Move::promotion(from, to, victim, promotion));
        }
    } else if victim != Piece::None {
        list.push(Move::capture(from, to, victim));
    } else {
        list.push(Move::quiet(from, to));
    }
}

fn gen_pawn_moves(board: &Board, list: &mut MoveList, captures_only: bool) {
    let color = board.side_to_move;
    let enemy = color.toggle();
    let pawns = board.bitboards[color as usize][Piece::Pawn as usize];
    let occupied = board.occupancies[BOTH];

    // Single pushes in bulk, double pushes relayed through the single
    // push set on the third (or sixth) rank.
    let (pushes, doubles, back): (u64, u64, i8) = match color {
        Color::White => {
            let single = (pawns << BOARD_WIDTH) & !occupied;
            let double = ((single & RANKS[2]) << BOARD_WIDTH) & !occupied;
            (single, double, -(BOARD_WIDTH as i8))
        }
        Color::Black => {
            let single = (pawns >> BOARD_WIDTH) & !occupied;
            let double = ((single & RANKS[5]) >> BOARD_WIDTH) & !occupied;
            (single, double, BOARD_WIDTH as i8)
        }
    };

    // Quiescence still wants promotion pushes: they swing the material
    // balance as hard as any capture.
    let push_targets = if captures_only {
        pushes & (RANKS[0] | RANKS[7])
    } else {
        pushes
    };
    for to in push_targets.ones_iter() {
        push_pawn_move(list, (to as i8 + back) as Square, to, Piece::None);
    }
    if !captures_only {
        for to in doubles.ones_iter() {
            list.push(Move::double_push((to as i8 + 2 * back) as Square, to));
        }
    }

    let attack_table: &[u64; BOARD_SIZE] = match color {
        Color::White => &tables::WPAWN_ATTACKS,
        Color::Black => &tables::BPAWN_ATTACKS,
    };
    for from in pawns.ones_iter() {
        let targets = attack_table[from as usize] & board.occupancies[enemy as usize];
        for to in targets.ones_iter() {
            push_pawn_move(list, from, to, board.pieces[to as usize].0);
        }
    }

    // The capturing pawn origins are exactly the squares a pawn of the
    // opposite color on the en passant square would attack.
    if let Some(ep) = board.en_passant_square {
        let origin_table: &[u64; BOARD_SIZE] = match color {
            Color::White => &tables::BPAWN_ATTACKS,
            Color::Black => &tables::WPAWN_ATTACKS,
        };
        for from in (origin_table[ep as usize] & pawns).ones_iter() {
            list.push(Move::en_passant(from, ep));
        }
    }
}

// Castle path masks: the squares that must be empty between king and
// rook, and the king start/transit/end squares that must be safe.
const WK_EMPTY: u64 = 0x60;
const WK_SAFE: u64 = 0x70;
const WQ_EMPTY: u64 = 0x0E;
const WQ_SAFE: u64 = 0x1C;
const BK_EMPTY: u64 = WK_EMPTY << 56;
const BK_SAFE: u64 = WK_SAFE << 56;
const BQ_EMPTY: u64 = WQ_EMPTY << 56;
const BQ_SAFE: u64 = WQ_SAFE << 56;

fn gen_castle_moves(board: &Board, list: &mut MoveList) {
    let rights = board.castling_rights;
    let occupied = board.occupancies[BOTH];

    match board.side_to_move {
        Color::White => {
            if rights & Castling::WK != 0
                && occupied & WK_EMPTY == 0
                && !board.squares_attacked(WK_SAFE, Color::Black)
            {
                list.push(Move::castle(4, 6));
            }
            if rights & Castling::WQ != 0
                && occupied & WQ_EMPTY == 0
                && !board.squares_attacked(WQ_SAFE, Color::Black)
            {
                list.push(Move::castle(4, 2));
            }
        }
        Color::Black => {
            if rights & Castling::BK != 0
                && occupied & BK_EMPTY == 0
                && !board.squares_attacked(BK_SAFE, Color::White)
            {
                list.push(Move::castle(60, 62));
            }
            if rights & Castling::BQ != 0
                && occupied & BQ_EMPTY == 0
                && !board.squares_attacked(BQ_SAFE, Color::White)
            {
                list.push(Move::castle(60, 58));
            }
        }
    }
}

fn gen_piece_moves(board: &Board, list: &mut MoveList, target: u64) {
    let color = board.side_to_move;
    let occupied = board.occupancies[BOTH];

    for piece in [
        Piece::Knight,
        Piece::Bishop,
        Piece::Rook,
        Piece::Queen,
        Piece::King,
    ] {
        for from in board.bitboards[color as usize][piece as usize].ones_iter() {
            let attacks = piece_attacks(piece, from, occupied) & target;
            for to in attacks.ones_iter() {
                let (victim, _) = board.pieces[to as usize];
                if victim == Piece::None {
                    list.push(Move::quiet(from, to));
                } else {
                    list.push(Move::capture(from, to, victim));
                }
            }
        }
    }
}

/// Every pseudo-legal move for the side to move. Moves that leave the
/// own king attacked are filtered later by `Board::make_move`.
pub fn gen_moves(board: &Board) -> MoveList {
    let mut list = MoveList::new();
    gen_pawn_moves(board, &mut list, false);
    gen_castle_moves(board, &mut list);
    gen_piece_moves(board, &mut list, !board.occupancies[board.side_to_move as usize]);
    list
}

/// Capture-only generation for quiescence: pawn captures, promotions and
/// en passant stay in; quiet pushes, double pushes and castling drop out.
pub fn gen_captures(board: &Board) -> MoveList {
    let mut list = MoveList::new();
    gen_pawn_moves(board, &mut list, true);
    gen_piece_moves(
        board,
        &mut list,
        board.occupancies[board.side_to_move.toggle() as usize],
    );
    list
}
