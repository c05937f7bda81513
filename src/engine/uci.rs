use crate::chess::*;
use crate::engine::logger;
use crate::engine::search::{SearchLimits, Searcher};
use crate::engine::transposition::TranspositionTable;
use std::path::Path;
use std::str::SplitWhitespace;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::thread::JoinHandle;

/// Write a protocol line to stdout and flush it immediately; GUIs read
/// the engine through a pipe and buffering would stall them.
#[macro_export]
macro_rules! send {
    ($($arg:tt)*) => {{
        use std::io::Write;
        println!($($arg)*);
        std::io::stdout().flush().ok();
    }};
}

fn perft(board: &mut Board, depth: usize) -> u64 {
    if depth == 0 {
        return 1;
    }
    let mut nodes = 0;
    for &mov in gen_moves(board).iter() {
        if board.make_move(mov) {
            nodes += perft(board, depth - 1);
            board.undo_move();
        }
    }
    nodes
}

fn divide(board: &mut Board, depth: usize) -> u64 {
    if depth == 0 {
        return 1;
    }
    let mut nodes = 0;
    for &mov in gen_moves(board).iter() {
        if board.make_move(mov) {
            let subtree = perft(board, depth - 1);
            board.undo_move();
            nodes += subtree;
            send!("{}: {subtree}", mov.to_uci());
        }
    }
    nodes
}

/// The UCI front end. Owns the canonical position built from `position`
/// commands and hands a clone to a dedicated search thread on `go`; the
/// shared stop flag is the only channel back into a running search.
pub struct Uci {
    board: Board,
    tt: Arc<TranspositionTable>,
    stop: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
    move_overhead: u64,
}

impl Uci {
    pub fn new(hash_megabytes: usize) -> Uci {
        Uci {
            board: Board::start_position(),
            tt: Arc::new(TranspositionTable::new(hash_megabytes)),
            stop: Arc::new(AtomicBool::new(false)),
            worker: None,
            move_overhead: 100,
        }
    }

    pub fn uci_loop(&mut self) {
        let stdin = std::io::stdin();
        let mut input = String::new();

        loop {
            input.clear();
            if stdin.read_line(&mut input).is_err() || input.is_empty() {
                break;
            }
            log::info!(">> {}", input.trim_end());
            if self.execute_command(&mut input.split_whitespace()) {
                break;
            }
        }
        self.stop_and_join();
    }

    /// Dispatch one command line. Returns true only for `quit`; anything
    /// unrecognized is logged and ignored so the loop survives malformed
    /// input.
    fn execute_command(&mut self, tokens: &mut SplitWhitespace) -> bool {
        match tokens.next() {
            Some("uci") => {
                send!("id name Sable {}", env!("CARGO_PKG_VERSION"));
                send!("id author the Sable authors");
                send!(
                    "option name Hash type spin default {} min 1 max 4096",
                    TranspositionTable::DEFAULT_MEGABYTES
                );
                send!("option name Move Overhead type spin default 100 min 0 max 5000");
                send!("option name Log File type string default <empty>");
                send!("uciok");
            }
            Some("isready") => {
                crate::chess::attacks::initialize();
                send!("readyok");
            }
            Some("setoption") => self.handle_setoption(tokens),
            Some("ucinewgame") => {
                self.stop_and_join();
                self.board = Board::start_position();
            }
            Some("position") => self.handle_position(tokens),
            Some("go") => self.handle_go(tokens),
            // debugging aid: dump the board and its static evaluation
            Some("eval") => {
                send!("{}", self.board);
                send!("material: {:?}", self.board.material);
                send!("static eval: {}", self.board.evaluate());
            }
            Some("stop") => self.stop.store(true, Ordering::Relaxed),
            Some("quit") => return true,
            Some(other) => {
                log::warn!("unknown command: {other}");
                send!("info string unknown command");
            }
            None => {}
        }
        false
    }

    fn stop_and_join(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
        self.stop.store(false, Ordering::Relaxed);
    }

    /// `setoption name <name...> [value <value...>]`; option names can
    /// contain spaces.
    fn handle_setoption(&mut self, tokens: &mut SplitWhitespace) {
        if tokens.next() != Some("name") {
            log::warn!("setoption without a name");
            return;
        }
        let mut name = String::new();
        let mut value = String::new();
        let mut in_value = false;
        for token in tokens {
            if token == "value" && !in_value {
                in_value = true;
            } else if in_value {
                if !value.is_empty() {
                    value.push(' ');
                }
                value.push_str(token);
            } else {
                if !name.is_empty() {
                    name.push(' ');
                }
                name.push_str(token);
            }
        }

        match name.as_str() {
            "Hash" => match value.parse::<usize>() {
                Ok(megabytes @ 1..=4096) => {
                    self.stop_and_join();
                    self.tt = Arc::new(TranspositionTable::new(megabytes));
                    log::info!("hash table resized to {megabytes} MB");
                }
                _ => log::warn!("Hash must be 1..=4096 MB, got '{value}'"),
            },
            "Move Overhead" => match value.parse::<u64>() {
                Ok(overhead @ 0..=5000) => {
                    self.move_overhead = overhead;
                    log::info!("move overhead set to {overhead} ms");
                }
                _ => log::warn!("Move Overhead must be 0..=5000 ms, got '{value}'"),
            },
            "Log File" => {
                if value.is_empty() || value == "<empty>" || value == "\"\"" {
                    logger::set_file(None);
                } else {
                    logger::set_file(Some(Path::new(&value)));
                    log::info!("logging to {value}");
                }
            }
            _ => log::warn!("unknown option: {name}"),
        }
    }

    /// `position {startpos | fen <fen>} [moves <move>...]`. A FEN that
    /// fails validation leaves the current position untouched; an
    /// unknown or illegal move aborts the rest of the move list.
    fn handle_position(&mut self, tokens: &mut SplitWhitespace) {
        let board = match tokens.next() {
            Some("startpos") => Board::start_position(),
            Some("fen") => {
                let fen: Vec<&str> = tokens.by_ref().take_while(|&t| t != "moves").collect();
                match Board::from_fen(&fen.join(" ")) {
                    Ok(board) => board,
                    Err(err) => {
                        log::warn!("rejected position: {err}");
                        send!("info string invalid fen: {err}");
                        return;
                    }
                }
            }
            _ => {
                log::warn!("malformed position command");
                return;
            }
        };
        self.board = board;

        // `startpos` leaves the "moves" token unconsumed; `fen` already
        // swallowed it in take_while.
        let mut tokens = tokens.skip_while(|&t| t == "moves");
        for uci_move in &mut tokens {
            let candidates = gen_moves(&self.board);
            let Some(&mov) = candidates.iter().find(|m| m.to_uci() == uci_move) else {
                log::warn!("unknown move '{uci_move}' in position command");
                break;
            };
            if !self.board.make_move(mov) {
                log::warn!("illegal move '{uci_move}' in position command");
                break;
            }
        }
    }

    fn handle_go(&mut self, tokens: &mut SplitWhitespace) {
        let mut limits = SearchLimits {
            move_overhead: self.move_overhead,
            ..SearchLimits::default()
        };

        while let Some(key) = tokens.next() {
            match key {
                "depth" | "wtime" | "btime" | "winc" | "binc" | "movetime" | "movestogo"
                | "perft" => {
                    let Some(value) = tokens.next().and_then(|v| v.parse::<u64>().ok()) else {
                        log::warn!("go: '{key}' needs a numeric argument");
                        continue;
                    };
                    match key {
                        "depth" => limits.depth = Some(value as usize),
                        "wtime" => limits.time[Color::White as usize] = Some(value),
                        "btime" => limits.time[Color::Black as usize] = Some(value),
                        "winc" => limits.inc[Color::White as usize] = value,
                        "binc" => limits.inc[Color::Black as usize] = value,
                        "movetime" => limits.movetime = Some(value),
                        "movestogo" => limits.movestogo = value.max(1),
                        "perft" => {
                            crate::chess::attacks::initialize();
                            let nodes = divide(&mut self.board, value as usize);
                            send!("Nodes searched: {nodes}");
                            return;
                        }
                        _ => unreachable!(),
                    }
                }
                "infinite" => {}
                _ => log::warn!("go: ignoring token '{key}'"),
            }
        }

        // One search thread at a time; a previous search must be done
        // before its position and table can be rebound.
        self.stop_and_join();
        crate::chess::attacks::initialize();

        let mut searcher = Searcher::new(self.board.clone(), &self.tt, &self.stop);
        self.worker = Some(std::thread::spawn(move || {
            let best_move = searcher.search_position(&limits);
            send!("bestmove {}", best_move.to_uci());
            log::info!("bestmove {}", best_move.to_uci());
        }));
    }
}
