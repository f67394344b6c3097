use std::process;
use std::thread;
use std::time::Duration;

use clap::Parser;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use solver_2048::engine::{Game, GameState};
use solver_2048::search::{build_policy, MovePolicy, SearchConfig, DEFAULT_DEPTH};
use solver_2048::serialization::{decode_board, ErrorResponse, EvalResponse};

#[derive(Debug, Parser)]
#[command(name = "solver-2048", about = "Pick 2048 moves with a corner-weighted depth-limited search")]
struct Args {
    /// Evaluate this board once and print the answer as JSON,
    /// e.g. '{"grid":[[0,0,2,0],[0,0,0,0],[0,4,0,0],[0,0,0,0]]}'
    #[arg(long)]
    grid: Option<String>,

    /// Search depth in plies
    #[arg(long, default_value_t = DEFAULT_DEPTH)]
    depth: u32,

    /// Seed for spawns and search; random when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Explore the four root directions in parallel
    #[arg(long)]
    parallel: bool,

    /// Pause between moves in continuous play
    #[arg(long, default_value_t = 100)]
    delay_ms: u64,

    /// Do not clear the screen between frames
    #[arg(long)]
    no_clear: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    let cfg = SearchConfig { depth: args.depth };

    // Single evaluation vs. continuous play
    if let Some(raw) = &args.grid {
        let mut policy = build_policy(cfg, args.seed, args.parallel);
        run_single_evaluation(raw, policy.as_mut())?;
        return Ok(());
    }

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut policy = build_policy(cfg, args.seed.map(|s| s.wrapping_add(1)), args.parallel);
    run_auto_player(&args, &mut rng, policy.as_mut())
}

fn run_single_evaluation(raw: &str, policy: &mut dyn MovePolicy) -> anyhow::Result<()> {
    // Tolerate shell quoting that leaves the single quotes in place
    let raw = raw.trim().trim_matches('\'');
    match decode_board(raw) {
        Ok(board) => {
            let resp = EvalResponse::evaluate(board, policy);
            debug!("evaluated {} nodes", policy.last_stats().nodes);
            println!("{}", serde_json::to_string(&resp)?);
            Ok(())
        }
        Err(e) => {
            let doc = ErrorResponse { error: format!("unmarshal failed: {e}") };
            println!("{}", serde_json::to_string(&doc)?);
            process::exit(1);
        }
    }
}

fn run_auto_player(args: &Args, rng: &mut StdRng, policy: &mut dyn MovePolicy) -> anyhow::Result<()> {
    let mut game = Game::new(rng);
    let mut moves = 0u64;
    info!("starting new game at depth {}", args.depth);

    loop {
        print_grid(&game, !args.no_clear);

        match game.state() {
            GameState::Won => {
                println!("2048 reached! The solver wins.");
                break;
            }
            GameState::Lost => {
                println!("Game over! No moves left.");
                break;
            }
            GameState::Ongoing => {}
        }

        let dir = policy.best_move(game.board());
        if !game.play(dir, rng) {
            anyhow::bail!("search chose {dir}, which does not move {:?}", game.board());
        }
        moves += 1;
        debug!("move {moves}: {dir} ({} nodes)", policy.last_stats().nodes);

        thread::sleep(Duration::from_millis(args.delay_ms));
    }

    info!("finished after {moves} moves, highest tile {}", game.board().highest_tile());
    Ok(())
}

fn print_grid(game: &Game, clear: bool) {
    if clear {
        print!("\x1b[H\x1b[2J");
    }
    println!("--- 2048 SOLVER ---");
    print!("{}", game.board());
    println!("-------------------");
}
