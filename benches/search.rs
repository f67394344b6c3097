use criterion::{criterion_group, criterion_main, Criterion};
use rand::{rngs::StdRng, SeedableRng};
use rayon::ThreadPoolBuilder;
use solver_2048::engine::{Board, Game, GameState, Move};
use solver_2048::search::{warm_engine_and_heuristics, Search, SearchConfig, SearchParallel};
use std::hint::black_box;

fn corpus() -> Vec<Board> {
    let mut rng = StdRng::seed_from_u64(7777);
    let mut boards = Vec::new();
    let mut b = Board::EMPTY.with_random_tile(&mut rng).with_random_tile(&mut rng);
    boards.push(b);
    let seq = [Move::Left, Move::Up, Move::Right, Move::Down];
    for i in 0..16 {
        let dir = seq[i % seq.len()];
        if b.apply(dir) {
            b.spawn(&mut rng);
        }
        boards.push(b);
    }
    boards
}

fn bench_best_move(c: &mut Criterion) {
    warm_engine_and_heuristics();
    let boards = corpus();
    let cfg = SearchConfig { depth: 4 };

    let mut seq = Search::seeded(cfg, 11);
    c.bench_function("search_seq/best_move_d4", |bch| {
        bch.iter(|| {
            let mut acc = 0u32;
            for &bd in &boards {
                acc ^= seq.best_move(bd).index() as u32;
            }
            black_box(acc)
        })
    });

    // Pin a small pool for stability
    let pool = ThreadPoolBuilder::new().num_threads(4).build().unwrap();
    let mut par = SearchParallel::seeded(cfg, 11);
    c.bench_function("search_par/best_move_d4", |bch| {
        bch.iter(|| {
            pool.install(|| {
                let mut acc = 0u32;
                for &bd in &boards {
                    acc ^= par.best_move(bd).index() as u32;
                }
                black_box(acc)
            })
        })
    });
}

fn bench_e2e(c: &mut Criterion) {
    warm_engine_and_heuristics();
    let mut search = Search::seeded(SearchConfig { depth: 3 }, 5);
    c.bench_function("e2e_seq/32_moves_d3", |bch| {
        bch.iter(|| {
            let mut rng = StdRng::seed_from_u64(13);
            let mut game = Game::new(&mut rng);
            let mut steps = 0;
            while steps < 32 && game.state() == GameState::Ongoing {
                let dir = search.best_move(game.board());
                if !game.play(dir, &mut rng) {
                    break;
                }
                steps += 1;
            }
            black_box((game.board().raw(), steps))
        })
    });
}

criterion_group!(search_bench, bench_best_move, bench_e2e);
criterion_main!(search_bench);
