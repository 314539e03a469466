use bees_journey::grid::distances_from;
use bees_journey::{generate, Dir, Grid, GridConfig, GridError, MoveEvent, Outcome, Pos, Session, Tile};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::{HashSet, VecDeque};

fn path_exists(grid: &Grid) -> bool {
    let mut seen = HashSet::new();
    let mut q = VecDeque::from([grid.start()]);
    seen.insert(grid.start());
    while let Some(pos) = q.pop_front() {
        if pos == grid.goal() {
            return true;
        }
        for dir in Dir::ALL {
            if let Some(next) = grid.step(pos, dir) {
                if grid.get(next) != Tile::Obstacle && seen.insert(next) {
                    q.push_back(next);
                }
            }
        }
    }
    false
}

#[test]
fn invariants_hold_across_sizes_and_seeds() {
    for size in 2..=10 {
        let cells = size * size;
        let items = (cells / 8).min(5);
        let obstacles = (2 * size).min((cells - 2 - items) / 2);
        let config = GridConfig {
            size,
            items,
            obstacles,
            max_attempts: 1000,
        };
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed * 31 + size as u64);
            let grid = generate(&mut rng, &config)
                .unwrap_or_else(|err| panic!("size {} seed {}: {}", size, seed, err));
            assert_eq!(grid.get(Pos::new(0, 0)), Tile::Start);
            assert_eq!(grid.get(Pos::new(size - 1, size - 1)), Tile::Goal);
            assert_eq!(grid.count(Tile::Start), 1);
            assert_eq!(grid.count(Tile::Goal), 1);
            assert_eq!(grid.count(Tile::Item), items);
            assert_eq!(grid.count(Tile::Obstacle), obstacles);
            assert_eq!(grid.count(Tile::Empty), cells - 2 - items - obstacles);
            assert!(path_exists(&grid), "unsolvable grid:\n{}", grid);
        }
    }
}

#[test]
fn seeded_sessions_replay_identically() {
    let config = GridConfig::default();
    let moves = [Dir::Right, Dir::Down, Dir::Down, Dir::Right, Dir::Left, Dir::Down];

    let play = || {
        let mut rng = StdRng::seed_from_u64(2024);
        let mut session = Session::new(config, &mut rng).unwrap();
        for dir in moves {
            session.move_player(dir);
        }
        (
            session.grid().clone(),
            session.player(),
            session.moves(),
            session.collected(),
        )
    };

    assert_eq!(play(), play());
}

#[test]
fn impossible_boards_fail_fast() {
    let mut rng = StdRng::seed_from_u64(5);
    let config = GridConfig {
        size: 4,
        items: 0,
        obstacles: 14,
        max_attempts: 50,
    };
    assert_eq!(
        Session::new(config, &mut rng).unwrap_err(),
        GridError::GenerationExhausted { attempts: 50 }
    );
}

#[test]
fn shortest_route_brings_the_bee_home() {
    let mut rng = StdRng::seed_from_u64(77);
    let mut session = Session::new(GridConfig::default(), &mut rng).unwrap();
    let goal = session.grid().goal();
    let to_goal = distances_from(session.grid(), goal);
    let start = session.grid().start();
    let shortest = to_goal[start.y][start.x].unwrap();

    while !session.is_over() {
        let here = session.player();
        let remaining = to_goal[here.y][here.x].unwrap();
        let dir = Dir::ALL
            .into_iter()
            .find(|dir| {
                session
                    .grid()
                    .step(here, *dir)
                    .and_then(|next| to_goal[next.y][next.x])
                    == Some(remaining - 1)
            })
            .unwrap();
        assert_ne!(session.move_player(dir), MoveEvent::Blocked);
    }

    assert_eq!(session.outcome(), Some(Outcome::Won));
    assert_eq!(session.moves() as usize, shortest);
    assert!(session.collected() <= session.total_items());
    assert_eq!(
        session.grid().count(Tile::Item) + session.collected(),
        session.total_items()
    );
}
