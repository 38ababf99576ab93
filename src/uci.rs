use std::io::{self, BufRead};
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use crate::board::{Board, Color};

use crate::notation::{parse_coordinate_move, parse_position_text};
use crate::search::{self, SearchState};
use crate::types::{EngineConfig, DEFAULT_DEPTH};

pub fn run() {
    log::info!("engine starting, reading UCI commands from stdin");
    let stdin = io::stdin();

    let mut board = Board::default();
    let mut config = EngineConfig::default();
    let mut search_state: Option<SearchState> = Some(SearchState::new());
    let mut stop_flag: Arc<AtomicBool> = Arc::new(AtomicBool::new(false));
    let mut search_thread: Option<thread::JoinHandle<SearchState>> = None;
    let mut position_history: Vec<u64> = Vec::new();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };
        let line = line.trim().to_string();
        if line.is_empty() {
            continue;
        }

        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() {
            continue;
        }

        match tokens[0] {
            "uci" => {
                println!("id name chess-engine");
                println!("id author yourname");
                println!("option name Hash type spin default 24 min 1 max 4096");
                println!("uciok");
            }
            "isready" => {
                wait_for_search(&mut search_thread, &mut search_state);
                println!("readyok");
            }
            "ucinewgame" => {
                log::debug!("ucinewgame: resetting TT, killers, history");
                wait_for_search(&mut search_thread, &mut search_state);
                board = Board::default();
                position_history.clear();
                if let Some(ref mut ss) = search_state {
                    ss.new_game();
                }
            }
            "position" => {
                wait_for_search(&mut search_thread, &mut search_state);
                parse_position(&tokens, &mut board, &mut position_history);
            }
            "go" => {
                wait_for_search(&mut search_thread, &mut search_state);

                let go_params = parse_go(&tokens);
                let max_depth = go_params.depth.unwrap_or(DEFAULT_DEPTH);

                let mut ss = search_state.take().expect("search state missing");
                ss.reset();
                ss.time_limit_ms = go_params.compute_time_ms(board.side_to_move());
                ss.position_history = position_history.clone();

                let flag = Arc::new(AtomicBool::new(false));
                stop_flag = flag.clone();
                ss.stop = flag;

                let board_copy = board;

                search_thread = Some(thread::spawn(move || {
                    let result = search::search(&board_copy, &mut ss, max_depth);

                    if let Some(m) = result.best_move {
                        println!("bestmove {}", m);
                    } else {
                        println!("bestmove 0000");
                    }

                    ss
                }));
            }
            "stop" => {
                stop_flag.store(true, Ordering::SeqCst);
                wait_for_search(&mut search_thread, &mut search_state);
            }
            "setoption" => {
                wait_for_search(&mut search_thread, &mut search_state);
                if let Some(ref mut ss) = search_state {
                    parse_setoption(&tokens, &mut config, ss);
                }
            }
            "quit" => {
                stop_flag.store(true, Ordering::SeqCst);
                wait_for_search(&mut search_thread, &mut search_state);
                break;
            }
            "d" | "print" => {
                println!("{}", board);
            }
            _ => {}
        }
    }
}

/// Wait for a running search thread to finish and recover the SearchState.
fn wait_for_search(
    handle: &mut Option<thread::JoinHandle<SearchState>>,
    state: &mut Option<SearchState>,
) {
    if let Some(h) = handle.take() {
        match h.join() {
            Ok(ss) => *state = Some(ss),
            Err(_) => {
                log::warn!("search thread panicked; replacing with fresh search state");
                *state = Some(SearchState::new());
            }
        }
    }
}

/// Parsed `go` command parameters.
struct GoParams {
    depth: Option<u8>,
    movetime: Option<u64>,
    wtime: Option<u64>,
    btime: Option<u64>,
    winc: Option<u64>,
    binc: Option<u64>,
    moves_to_go: Option<u64>,
    infinite: bool,
}

impl GoParams {
    fn new() -> Self {
        Self {
            depth: None,
            movetime: None,
            wtime: None,
            btime: None,
            winc: None,
            binc: None,
            moves_to_go: None,
            infinite: false,
        }
    }

    /// Time budget in milliseconds for this search. `movetime` is used
    /// verbatim when present; otherwise derived from clock + increment,
    /// clamped to at most a third of the remaining clock and, when the
    /// clock exceeds 200ms, to at least 50ms.
    fn compute_time_ms(&self, side: Color) -> u64 {
        if self.infinite {
            return 0;
        }
        if let Some(mt) = self.movetime {
            return mt;
        }

        let (my_time, my_inc) = if side == Color::White {
            (self.wtime.unwrap_or(0), self.winc.unwrap_or(0))
        } else {
            (self.btime.unwrap_or(0), self.binc.unwrap_or(0))
        };

        if my_time == 0 {
            return 0;
        }

        let budget = if let Some(m) = self.moves_to_go.filter(|&m| m > 0) {
            my_time / (m + 2) + my_inc
        } else {
            my_time / 30 + my_inc * 3 / 4
        };

        let mut budget = budget.min(my_time / 3);
        if my_time > 200 {
            budget = budget.max(50);
        }
        budget.max(10)
    }
}

fn parse_go(tokens: &[&str]) -> GoParams {
    let mut params = GoParams::new();
    let mut i = 1;

    while i < tokens.len() {
        match tokens[i] {
            "depth" => {
                i += 1;
                if i < tokens.len() {
                    params.depth = tokens[i].parse().ok();
                }
            }
            "movetime" => {
                i += 1;
                if i < tokens.len() {
                    params.movetime = tokens[i].parse().ok();
                }
            }
            "wtime" => {
                i += 1;
                if i < tokens.len() {
                    params.wtime = tokens[i].parse().ok();
                }
            }
            "btime" => {
                i += 1;
                if i < tokens.len() {
                    params.btime = tokens[i].parse().ok();
                }
            }
            "winc" => {
                i += 1;
                if i < tokens.len() {
                    params.winc = tokens[i].parse().ok();
                }
            }
            "binc" => {
                i += 1;
                if i < tokens.len() {
                    params.binc = tokens[i].parse().ok();
                }
            }
            "movestogo" => {
                i += 1;
                if i < tokens.len() {
                    params.moves_to_go = tokens[i].parse().ok();
                }
            }
            "infinite" => {
                params.infinite = true;
            }
            _ => {}
        }
        i += 1;
    }

    params
}

fn parse_position(tokens: &[&str], board: &mut Board, history: &mut Vec<u64>) {
    if tokens.len() < 2 {
        return;
    }

    let mut idx = 1;

    if tokens[idx] == "startpos" {
        match parse_position_text("startpos") {
            Ok(b) => *board = b,
            Err(_) => return,
        }
        idx += 1;
    } else if tokens[idx] == "fen" {
        idx += 1;
        let mut fen_parts: Vec<&str> = Vec::new();
        while idx < tokens.len() && tokens[idx] != "moves" && fen_parts.len() < 6 {
            fen_parts.push(tokens[idx]);
            idx += 1;
        }
        if fen_parts.len() >= 4 {
            match Board::from_str(&fen_parts.join(" ")) {
                Ok(b) => *board = b,
                Err(_) => return,
            }
        } else {
            return;
        }
    } else {
        return;
    }

    history.clear();
    history.push(board.get_hash());

    if idx < tokens.len() && tokens[idx] == "moves" {
        idx += 1;
        for &move_str in &tokens[idx..] {
            if let Ok(m) = parse_coordinate_move(board, move_str) {
                *board = board.make_move_new(m);
                history.push(board.get_hash());
            }
        }
    }
}

fn parse_setoption(tokens: &[&str], config: &mut EngineConfig, state: &mut SearchState) {
    let name_idx = tokens.iter().position(|&t| t == "name");
    let value_idx = tokens.iter().position(|&t| t == "value");

    if let (Some(ni), Some(vi)) = (name_idx, value_idx) {
        let name: String = tokens[ni + 1..vi].join(" ");
        let value: String = tokens[vi + 1..].join(" ");

        if name.to_lowercase().as_str() == "hash" {
            if let Ok(mb) = value.parse::<usize>() {
                config.hash_mb = mb.clamp(1, 4096);
                log::debug!("resizing transposition table to {} MB", config.hash_mb);
                state.resize_tt(config.hash_mb);
            }
        }
    }
}
