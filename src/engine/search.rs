use crate::chess::*;
use crate::engine::ordering::*;
use crate::engine::transposition::{Bound, TranspositionTable};
use crate::send;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::{Duration, Instant};

pub const MAX_DEPTH: usize = 128;
pub const MATE: i16 = 30_000;
pub const INF: i16 = 32_000;
/// Scores beyond this are reserved for mates; the static evaluation
/// never reaches it.
pub const MATE_THRESHOLD: i16 = 20_000;

/// Search limits as given by `go`: an optional depth cap plus whatever
/// the GUI told us about the clocks. Times are milliseconds.
#[derive(Clone, Copy, Debug)]
pub struct SearchLimits {
    pub depth: Option<usize>,
    pub movetime: Option<u64>,
    pub time: [Option<u64>; 2],
    pub inc: [u64; 2],
    pub movestogo: u64,
    pub move_overhead: u64,
}

impl Default for SearchLimits {
    fn default() -> SearchLimits {
        SearchLimits {
            depth: None,
            movetime: None,
            time: [None; 2],
            inc: [0; 2],
            movestogo: 30,
            move_overhead: 100,
        }
    }
}

impl SearchLimits {
    /// The moment the search must stop, if any clock constraint applies.
    /// With an explicit movetime the whole budget goes to this move;
    /// otherwise a slice of the remaining clock plus the increment,
    /// minus the overhead margin for transmission delays.
    fn stop_time(&self, side: Color, start: Instant) -> Option<Instant> {
        let (mut time_left, mut movestogo) = (self.time[side as usize], self.movestogo.max(1));
        if self.movetime.is_some() {
            time_left = self.movetime;
            movestogo = 1;
        }
        time_left.map(|t| {
            let budget =
                (t / movestogo + self.inc[side as usize]).saturating_sub(self.move_overhead);
            start + Duration::from_millis(budget)
        })
    }
}

/// Owns a private copy of the position and all search state for one
/// `go`. Runs on its own thread; the only outside contact is the shared
/// stop flag (set by the UCI thread, or by the searcher itself when the
/// clock runs out) and the transposition table it shares across moves.
pub struct Searcher {
    board: Board,
    tt: Arc<TranspositionTable>,
    stop: Arc<AtomicBool>,

    nodes: u64,
    stop_time: Option<Instant>,
    root_best: Move,
    last_eval: i16,

    killers: [[Option<Move>; 2]; MAX_DEPTH],
    history: [[i32; BOARD_SIZE]; 12],
    counter_moves: [[Option<Move>; BOARD_SIZE]; 12],
}

impl Searcher {
    pub fn new(board: Board, tt: &Arc<TranspositionTable>, stop: &Arc<AtomicBool>) -> Searcher {
        Searcher {
            board,
            tt: Arc::clone(tt),
            stop: Arc::clone(stop),

            nodes: 0,
            stop_time: None,
            root_best: Move::default(),
            last_eval: 0,

            killers: [[None; 2]; MAX_DEPTH],
            history: [[0; BOARD_SIZE]; 12],
            counter_moves: [[None; BOARD_SIZE]; 12],
        }
    }

    /// Poll the wall clock; called every 4096 nodes from the recursion.
    fn checkup(&mut self) {
        if let Some(stop_time) = self.stop_time {
            if Instant::now() >= stop_time {
                self.stop.store(true, Ordering::Relaxed);
            }
        }
    }

    #[inline(always)]
    fn stopped(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    fn ordering_context(&self, ply: usize, hash_move: Option<Move>) -> OrderingContext<'_> {
        let counter_move = self.board.previous_move().and_then(|prev| {
            let (piece, color) = self.board.pieces[prev.to() as usize];
            self.counter_moves[piece_index(piece, color)][prev.to() as usize]
        });
        OrderingContext {
            board: &self.board,
            hash_move,
            killers: &self.killers[ply],
            counter_move,
            history: &self.history,
        }
    }

    /// Reward a quiet move that refuted the node: it becomes the top
    /// killer for this ply, the counter to the opponent's previous move,
    /// and earns depth-squared history weight.
    fn record_cutoff(&mut self, mov: Move, ply: usize, depth: i32) {
        if self.killers[ply][0] != Some(mov) {
            self.killers[ply][1] = self.killers[ply][0];
            self.killers[ply][0] = Some(mov);
        }

        if let Some(prev) = self.board.previous_move() {
            let (piece, color) = self.board.pieces[prev.to() as usize];
            self.counter_moves[piece_index(piece, color)][prev.to() as usize] = Some(mov);
        }

        let (piece, color) = self.board.pieces[mov.from() as usize];
        self.history[piece_index(piece, color)][mov.to() as usize] += depth * depth;
    }

    fn alpha_beta(&mut self, mut alpha: i16, beta: i16, depth: i32, ply: usize) -> i16 {
        if depth <= 0 {
            return self.quiescence(alpha, beta, ply);
        }

        self.nodes += 1;
        if self.nodes & 4095 == 0 {
            self.checkup();
        }
        if self.stopped() {
            return 0;
        }
        if ply > 0 && self.board.is_repetition() {
            return 0;
        }
        if self.board.fifty_move_count >= 100 {
            return 0;
        }
        if ply >= MAX_DEPTH {
            return self.board.evaluate();
        }

        let mut hash_move = None;
        if let Some(entry) = self.tt.probe(self.board.zobrist) {
            if !entry.mov.is_null() {
                hash_move = Some(entry.mov);
            }
            if let Some(eval) = entry.cutoff(depth as u8, alpha, beta, ply) {
                if ply == 0 && !entry.mov.is_null() {
                    self.root_best = entry.mov;
                }
                return eval;
            }
        }

        let in_check = self.board.in_check();
        let old_alpha = alpha;
        let mut best_eval = -INF;
        let mut best_move = Move::default();
        let mut legal_moves = 0;

        let mut scored = score(&gen_moves(&self.board), &self.ordering_context(ply, hash_move));
        for mov in scored.scored_iter() {
            if !self.board.make_move(mov) {
                continue;
            }
            legal_moves += 1;
            let eval = -self.alpha_beta(-beta, -alpha, depth - 1, ply + 1);
            self.board.undo_move();
            if self.stopped() {
                return 0;
            }

            if eval > best_eval {
                best_eval = eval;
                best_move = mov;
                if ply == 0 {
                    self.root_best = mov;
                }
                if eval > alpha {
                    if eval >= beta {
                        if mov.is_quiet() {
                            self.record_cutoff(mov, ply, depth);
                        }
                        self.tt.store(
                            self.board.zobrist,
                            best_move,
                            beta,
                            depth as u8,
                            Bound::Lower,
                            ply,
                        );
                        return beta;
                    }
                    alpha = eval;
                }
            }
        }

        if legal_moves == 0 {
            // Mates closer to the root score higher, so the search
            // prefers the shortest forced line.
            return if in_check { -(MATE - ply as i16) } else { 0 };
        }

        if alpha != old_alpha {
            self.tt
                .store(self.board.zobrist, best_move, best_eval, depth as u8, Bound::Exact, ply);
        } else {
            self.tt
                .store(self.board.zobrist, best_move, alpha, depth as u8, Bound::Upper, ply);
        }
        alpha
    }

    /// Capture-only extension past the nominal depth: keeps the static
    /// evaluation from being consulted in the middle of an exchange.
    fn quiescence(&mut self, mut alpha: i16, beta: i16, ply: usize) -> i16 {
        self.nodes += 1;
        if self.nodes & 4095 == 0 {
            self.checkup();
        }
        if self.stopped() {
            return 0;
        }
        if self.board.is_repetition() || self.board.fifty_move_count >= 100 {
            return 0;
        }

        let stand_pat = self.board.evaluate();
        if ply >= MAX_DEPTH {
            return stand_pat;
        }
        if stand_pat >= beta {
            return beta;
        }
        if stand_pat > alpha {
            alpha = stand_pat;
        }

        let mut scored = score(&gen_captures(&self.board), &self.ordering_context(ply, None));
        for mov in scored.scored_iter() {
            if !self.board.make_move(mov) {
                continue;
            }
            let eval = -self.quiescence(-beta, -alpha, ply + 1);
            self.board.undo_move();
            if self.stopped() {
                return 0;
            }

            if eval > alpha {
                if eval >= beta {
                    return beta;
                }
                alpha = eval;
            }
        }
        alpha
    }

    /// Walk the table's best moves forward from the current position to
    /// recover the expected line. Every stored move is checked against
    /// the generated list first: a hash collision must not corrupt the
    /// board. The walked moves are undone before returning.
    fn pv_line(&mut self, depth: usize) -> Vec<String> {
        let mut line = Vec::new();
        for _ in 0..depth {
            let Some(entry) = self.tt.probe(self.board.zobrist) else {
                break;
            };
            if entry.mov.is_null() || !gen_moves(&self.board).contains(&entry.mov) {
                break;
            }
            if !self.board.make_move(entry.mov) {
                break;
            }
            line.push(entry.mov.to_uci());
        }
        for _ in 0..line.len() {
            self.board.undo_move();
        }
        line
    }

    fn print_info(&mut self, eval: i16, depth: usize, elapsed: Duration) {
        let score = if eval > MATE_THRESHOLD {
            format!("mate {}", (MATE - eval + 1) / 2)
        } else if eval < -MATE_THRESHOLD {
            format!("mate -{}", (MATE + eval + 1) / 2)
        } else {
            format!("cp {eval}")
        };

        let millis = elapsed.as_millis() as u64;
        let mut info = format!(
            "info score {score} depth {depth} nodes {} time {millis}",
            self.nodes
        );
        if millis > 0 {
            info += &format!(" nps {}", self.nodes * 1000 / millis);
        }
        info += &format!(" pv {}", self.pv_line(depth).join(" "));

        send!("{info}");
        log::info!("{info}");
    }

    /// Iterative deepening driver. Returns the best move found by the
    /// deepest fully completed iteration; if the stop flag fires before
    /// depth 1 completes, that is the first legal root move.
    pub fn search_position(&mut self, limits: &SearchLimits) -> Move {
        let start = Instant::now();
        self.nodes = 0;
        self.stop_time = limits.stop_time(self.board.side_to_move, start);
        self.killers = [[None; 2]; MAX_DEPTH];
        self.history = [[0; BOARD_SIZE]; 12];
        self.counter_moves = [[None; BOARD_SIZE]; 12];

        // Fallback so a stop before the first iteration still yields a
        // legal reply.
        self.root_best = Move::default();
        for &mov in gen_moves(&self.board).iter() {
            if self.board.make_move(mov) {
                self.board.undo_move();
                self.root_best = mov;
                break;
            }
        }

        let mut best_move = self.root_best;
        let max_depth = limits.depth.unwrap_or(MAX_DEPTH - 1).min(MAX_DEPTH - 1);

        for depth in 1..=max_depth {
            let eval = self.alpha_beta(-INF, INF, depth as i32, 0);
            if self.stopped() {
                // Partial iteration: keep the previous depth's move.
                break;
            }
            best_move = self.root_best;
            self.last_eval = eval;
            self.print_info(eval, depth, start.elapsed());
            if eval > MATE_THRESHOLD {
                break;
            }
        }

        best_move
    }

    /// Score of the deepest fully completed iteration of the last
    /// search, from the root side's point of view.
    pub fn last_eval(&self) -> i16 {
        self.last_eval
    }
}
