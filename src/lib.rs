//! A UCI chess engine built on magic bitboards, a negamax alpha-beta
//! search with quiescence, and a zobrist-keyed transposition table.

pub mod chess;
pub mod engine;
