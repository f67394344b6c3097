use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use clap::Parser;
use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use solver_2048::engine::{Game, GameState};
use solver_2048::search::{build_policy, SearchConfig, DEFAULT_DEPTH};
use solver_2048::serialization::{load_game, save_game};

#[derive(Debug, Parser)]
#[command(name = "autoplay", about = "Play 2048 with the solver, resuming from and saving to a JSON file")]
struct Args {
    /// Save file to resume from and auto-save to
    #[arg(long, default_value = "savegame.json")]
    save: PathBuf,

    /// Search depth in plies
    #[arg(long, default_value_t = DEFAULT_DEPTH)]
    depth: u32,

    /// Seed for spawns and search; random when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Explore the four root directions in parallel
    #[arg(long)]
    parallel: bool,

    /// Pause between moves
    #[arg(long, default_value_t = 100)]
    delay_ms: u64,

    /// Stop after this many moves even if the game is still going
    #[arg(long)]
    max_moves: Option<u64>,

    /// Do not clear the screen between frames
    #[arg(long)]
    no_clear: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut policy = build_policy(SearchConfig { depth: args.depth }, args.seed.map(|s| s.wrapping_add(1)), args.parallel);
    let mut game = load_or_new(&args.save, &mut rng);
    let mut moves = 0u64;

    loop {
        print_grid(&game, !args.no_clear);

        // Check if the game is already over before calculating moves
        match game.state() {
            GameState::Won => {
                println!("You reached 2048! You win!");
                break;
            }
            GameState::Lost => {
                println!("Game over! No moves left.");
                // Keep the final position for post-mortem
                save_or_warn(&args.save, &game);
                break;
            }
            GameState::Ongoing => {}
        }
        if args.max_moves.is_some_and(|limit| moves >= limit) {
            info!("stopping after {moves} moves");
            break;
        }

        let dir = policy.best_move(game.board());
        if !game.play(dir, &mut rng) {
            anyhow::bail!("search chose {dir}, which does not move {:?}", game.board());
        }
        moves += 1;
        save_or_warn(&args.save, &game);

        thread::sleep(Duration::from_millis(args.delay_ms));
    }

    Ok(())
}

/// Resume from the save file if it decodes, otherwise start fresh.
fn load_or_new(path: &Path, rng: &mut StdRng) -> Game {
    if path.exists() {
        match load_game(path) {
            Ok(game) => {
                info!("resuming existing game from {}", path.display());
                return game;
            }
            Err(e) => warn!("ignoring unreadable save file {}: {e}", path.display()),
        }
    }
    info!("starting new game");
    Game::new(rng)
}

fn save_or_warn(path: &Path, game: &Game) {
    if let Err(e) = save_game(path, game) {
        warn!("failed to save game to {}: {e}", path.display());
    }
}

fn print_grid(game: &Game, clear: bool) {
    if clear {
        print!("\x1b[H\x1b[2J");
    }
    println!("--- 2048 AUTOPLAY ---");
    print!("{}", game.board());
    println!("---------------------");
}
