use std::sync::Arc;

use rand::{Rng, SeedableRng, rngs::StdRng};
use tempfile::TempDir;

use edpath_core::{
    Coords, Error, SearchMode, SolveConfig, Solver, Waypoint, WaypointPath,
    algo::{BranchAndBound, SplitSolver, cursor_search, factorial},
    cache::FileCache,
    memo::{MemoBand, MemoEntry, MemoStore, Signature},
    order_length,
};

const TOLERANCE: f64 = 1e-9;

fn wp(name: &str, x: f64, y: f64, z: f64) -> Arc<Waypoint> {
    Waypoint::new(name, Coords::new(x, y, z)).shared()
}

fn scattered(interior: usize, seed: u64) -> WaypointPath {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut waypoints = vec![wp("start", 0.0, 0.0, 0.0)];
    for i in 0..interior {
        waypoints.push(wp(
            &format!("w{i}"),
            rng.random_range(-50.0..50.0),
            rng.random_range(-50.0..50.0),
            rng.random_range(-50.0..50.0),
        ));
    }
    waypoints.push(wp("finish", 100.0, 0.0, 0.0));
    WaypointPath::new(waypoints).expect("valid path")
}

fn config(split_threshold: usize) -> SolveConfig {
    SolveConfig {
        split_threshold,
        split_window: 3,
        seed: 7,
        search: SearchMode::Recursive,
        parallel: false,
        skip_minor: false,
    }
}

/// Shortest length over every interior ordering, computed without pruning.
fn brute_force(path: &WaypointPath) -> f64 {
    fn walk(
        order: &mut Vec<Arc<Waypoint>>,
        rest: &mut Vec<Arc<Waypoint>>,
        finish: &Arc<Waypoint>,
        best: &mut f64,
    ) {
        if rest.is_empty() {
            order.push(Arc::clone(finish));
            *best = best.min(order_length(order));
            order.pop();
            return;
        }
        for i in 0..rest.len() {
            let next = rest.remove(i);
            order.push(next);
            walk(order, rest, finish, best);
            let back = order.pop().expect("pushed above");
            rest.insert(i, back);
        }
    }

    let mut best = f64::INFINITY;
    let mut order = vec![Arc::clone(path.start())];
    walk(&mut order, &mut path.interior().to_vec(), path.finish(), &mut best);
    best
}

#[test]
fn empty_interior_is_the_direct_hop() {
    let path = WaypointPath::new(vec![wp("s", 0.0, 0.0, 0.0), wp("f", 3.0, 4.0, 0.0)])
        .expect("valid path");

    let route = Solver::new(config(10), None).solve(&path).expect("solve");
    assert_eq!(route.names(), vec!["s", "f"]);
    assert!((route.length - 5.0).abs() < TOLERANCE);
    assert_eq!(route.stats.considered, 1);
    assert_eq!(route.stats.rejected, 0);
}

#[test]
fn single_interior_waypoint_is_kept_between_the_endpoints() {
    let path = WaypointPath::new(vec![
        wp("s", 0.0, 0.0, 0.0),
        wp("m", 0.0, 10.0, 0.0),
        wp("f", 10.0, 0.0, 0.0),
    ])
    .expect("valid path");

    let route = Solver::new(config(10), None).solve(&path).expect("solve");
    assert_eq!(route.names(), vec!["s", "m", "f"]);
    assert_eq!(route.stats.visited(), 1);
}

#[test]
fn three_waypoints_match_brute_force() {
    let path = WaypointPath::new(vec![
        wp("s", 0.0, 0.0, 0.0),
        wp("c", 9.0, 1.0, 0.0),
        wp("a", 1.0, 2.0, 0.0),
        wp("b", 4.0, -3.0, 2.0),
        wp("f", 10.0, 0.0, 0.0),
    ])
    .expect("valid path");

    let route = Solver::new(config(10), None).solve(&path).expect("solve");
    assert!((route.length - brute_force(&path)).abs() < TOLERANCE);
    assert_eq!(route.names().first(), Some(&"s"));
    assert_eq!(route.names().last(), Some(&"f"));
    assert_eq!(route.stats.visited(), 6);
}

#[test]
fn exhaustive_search_accounts_for_every_ordering() {
    for n in 2..=7 {
        let path = scattered(n, n as u64);
        let mut bnb = BranchAndBound::new(None);
        let solution = bnb.solve(&path, 99).expect("solve");

        assert_eq!(bnb.stats().visited(), factorial(n), "n={n}");
        assert!((solution.length - brute_force(&path)).abs() < TOLERANCE, "n={n}");
    }
}

#[test]
fn result_is_never_longer_than_the_given_order() {
    for seed in 0..5 {
        let path = scattered(8, seed);
        let route = Solver::new(config(4), None).solve(&path).expect("solve");
        assert!(route.length <= path.length() + TOLERANCE, "seed={seed}");
        assert_eq!(route.order.len(), path.len());
        assert!((order_length(&route.order) - route.length).abs() < 1e-6);
    }
}

#[test]
fn cursor_and_recursive_agree_on_length() {
    let path = scattered(7, 21);
    let recursive = Solver::new(config(10), None).solve(&path).expect("solve");

    let cursor_config = SolveConfig {
        search: SearchMode::Cursor,
        ..config(10)
    };
    let cursor = Solver::new(cursor_config, None).solve(&path).expect("solve");

    assert!((recursive.length - cursor.length).abs() < TOLERANCE);
    assert_eq!(cursor.stats.visited(), factorial(7));

    let (solution, stats) = cursor_search(&path, 3);
    assert!((solution.length - recursive.length).abs() < TOLERANCE);
    assert_eq!(stats.visited(), factorial(7));
}

#[test]
fn signature_ignores_interior_order() {
    let (s, f) = (wp("s", 0.0, 0.0, 0.0), wp("f", 1.0, 0.0, 0.0));
    let (a, b, c) = (
        wp("a", 0.0, 1.0, 0.0),
        wp("b", 0.0, 2.0, 0.0),
        wp("c", 0.0, 3.0, 0.0),
    );

    let one = Signature::new(&s, &[a.clone(), b.clone(), c.clone()], &f);
    let two = Signature::new(&s, &[c.clone(), a.clone(), b.clone()], &f);
    let swapped = Signature::new(&f, &[a, b, c], &s);

    assert_eq!(one, two);
    assert_ne!(one, swapped);
    assert_eq!(one.interior_len(), 3);
}

#[test]
fn split_produces_a_complete_route() {
    let path = scattered(12, 4);
    let cfg = SolveConfig {
        parallel: true,
        ..config(5)
    };

    let solved = SplitSolver::new(&cfg, None)
        .solve(path.start(), path.interior(), path.finish())
        .expect("split solve");
    assert!(solved.approximate);

    let names = solved.solution.names();
    assert_eq!(names.first(), Some(&"start"));
    assert_eq!(names.last(), Some(&"finish"));
    let mut sorted: Vec<&str> = names.clone();
    sorted.sort_unstable();
    let mut expected = path.names();
    expected.sort_unstable();
    assert_eq!(sorted, expected);
    assert!(
        (order_length(&solved.solution.order) - solved.solution.length).abs() < 1e-6
    );
}

#[test]
fn split_can_miss_the_exact_optimum() {
    // The axial ranking puts x before y, but the shortest route visits y
    // first and comes back through x on the way to the finish.
    let path = WaypointPath::new(vec![
        wp("s", 0.0, 0.0, 0.0),
        wp("x", 1.0, 0.0, 0.0),
        wp("y", -8.0, 6.0, 0.0),
        wp("f", 10.0, 0.0, 0.0),
    ])
    .expect("valid path");

    let exact = Solver::new(config(10), None).solve(&path).expect("solve");
    assert_eq!(exact.names(), vec!["s", "y", "x", "f"]);
    assert!(!exact.approximate);

    let cfg = config(1);
    let split = SplitSolver::new(&cfg, None)
        .solve(path.start(), path.interior(), path.finish())
        .expect("split solve");
    assert!(split.approximate);
    assert_eq!(split.solution.names(), vec!["s", "x", "y", "f"]);
    assert!(split.solution.length > exact.length + 0.5);
}

#[test]
fn memo_warms_a_second_run_from_disk() {
    let dir = TempDir::new().expect("temp dir");
    let path = scattered(5, 11);

    let cold_store = MemoStore::new(MemoBand::new(2, 6), Some(FileCache::new(dir.path())));
    let mut cold = BranchAndBound::new(Some(&cold_store));
    let first = cold.solve(&path, 1).expect("cold solve");
    assert_eq!(cold_store.disk_hits(), 0);
    assert!(!cold_store.is_empty());

    let warm_store = MemoStore::new(MemoBand::new(2, 6), Some(FileCache::new(dir.path())));
    let mut warm = BranchAndBound::new(Some(&warm_store));
    let second = warm.solve(&path, 2).expect("warm solve");

    assert_eq!(warm.stats().memo_hits, 1);
    assert_eq!(warm.stats().considered, 0);
    assert_eq!(warm_store.disk_hits(), 1);
    assert!((first.length - second.length).abs() < TOLERANCE);
    assert_eq!(first.names(), second.names());
}

#[test]
fn foreign_disk_entry_does_not_abort_the_search() {
    let dir = TempDir::new().expect("temp dir");
    let cache = FileCache::new(dir.path());
    let path = scattered(3, 5);
    let sig = Signature::new(path.start(), path.interior(), path.finish());
    cache
        .write(
            sig.as_str(),
            r#"{"length":1.0,"order":["start","zz","yy","xx","finish"]}"#,
        )
        .expect("write");

    let store = MemoStore::new(MemoBand::new(3, 3), Some(cache.clone()));
    let mut bnb = BranchAndBound::new(Some(&store));
    let solution = bnb.solve(&path, 1).expect("solve");

    assert!((solution.length - brute_force(&path)).abs() < TOLERANCE);
    assert_eq!(bnb.stats().memo_hits, 0);
    assert_eq!(store.disk_hits(), 0);

    let rewritten = cache.read(sig.as_str()).expect("read").expect("re-persisted");
    assert!(!rewritten.contains("zz"));
}

#[test]
fn memo_entries_are_write_once() {
    let store = MemoStore::in_memory(MemoBand::new(0, 10));
    let sig = Signature::new(
        &wp("s", 0.0, 0.0, 0.0),
        &[wp("a", 1.0, 0.0, 0.0)],
        &wp("f", 2.0, 0.0, 0.0),
    );
    let entry = MemoEntry {
        length: 2.0,
        order: vec!["s".into(), "a".into(), "f".into()],
    };

    store
        .store(&sig, entry.clone(), Default::default())
        .expect("first store");
    let err = store
        .store(&sig, entry, Default::default())
        .expect_err("second store");
    assert!(matches!(err, Error::DuplicateKey { .. }));
}
