use sable::chess::*;
use sable::engine::search::{SearchLimits, Searcher, MATE, MATE_THRESHOLD};
use sable::engine::transposition::TranspositionTable;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

fn searcher_for(fen: &str, hash_mb: usize) -> (Searcher, Arc<AtomicBool>) {
    let stop = Arc::new(AtomicBool::new(false));
    let tt = Arc::new(TranspositionTable::new(hash_mb));
    let board = Board::from_fen(fen).unwrap();
    (Searcher::new(board, &tt, &stop), stop)
}

fn assert_legal(fen: &str, mov: Move) {
    let mut board = Board::from_fen(fen).unwrap();
    let found = gen_moves(&board)
        .iter()
        .copied()
        .find(|m| *m == mov)
        .unwrap_or_else(|| panic!("{} was never generated", mov.to_uci()));
    assert!(board.make_move(found), "{} is illegal", mov.to_uci());
}

#[test]
fn finds_the_forced_mate() {
    // White mates in three starting with the rook lift to a6: the rook
    // clears the e5-h8 diagonal with tempo and swings to the back rank.
    let fen = "r5rk/5p1p/5R2/4B3/8/8/7P/7K w - - 0 1";
    let (mut searcher, _stop) = searcher_for(fen, 16);
    let limits = SearchLimits {
        depth: Some(6),
        ..SearchLimits::default()
    };

    let best = searcher.search_position(&limits);
    assert_eq!(best.to_uci(), "f6a6");
    assert!(
        searcher.last_eval() > MATE_THRESHOLD,
        "expected a mate score, got {}",
        searcher.last_eval()
    );
    assert_eq!(searcher.last_eval(), MATE - 5); // mate in 3 = 5 plies
}

#[test]
fn start_position_search_terminates() {
    let (mut searcher, _stop) = searcher_for(STARTPOS_FEN, 16);
    let limits = SearchLimits {
        depth: Some(6),
        ..SearchLimits::default()
    };

    let best = searcher.search_position(&limits);
    assert_legal(STARTPOS_FEN, best);
    assert!(searcher.last_eval().abs() < MATE_THRESHOLD);
}

#[test]
fn movetime_is_honored() {
    let (mut searcher, _stop) = searcher_for(STARTPOS_FEN, 16);
    let limits = SearchLimits {
        movetime: Some(200),
        move_overhead: 0,
        ..SearchLimits::default()
    };

    let start = Instant::now();
    let best = searcher.search_position(&limits);
    let elapsed = start.elapsed();

    assert_legal(STARTPOS_FEN, best);
    // The clock is polled every 4096 nodes, so allow some slack on top
    // of the 200 ms budget.
    assert!(elapsed < Duration::from_millis(1_000), "took {elapsed:?}");
}

#[test]
fn preset_stop_flag_still_yields_a_legal_move() {
    let (mut searcher, stop) = searcher_for(STARTPOS_FEN, 1);
    stop.store(true, Ordering::Relaxed);
    let best = searcher.search_position(&SearchLimits::default());
    assert_legal(STARTPOS_FEN, best);
}

#[test]
fn exhausted_fifty_move_clock_scores_zero() {
    // With the halfmove clock already at 100 every line is a draw, no
    // matter how lopsided the material is.
    let fen = "k7/8/8/8/8/5q2/8/K7 b - - 100 1";
    let (mut searcher, _stop) = searcher_for(fen, 16);
    let limits = SearchLimits {
        depth: Some(3),
        ..SearchLimits::default()
    };
    searcher.search_position(&limits);
    assert_eq!(searcher.last_eval(), 0);
}
