use std::{process, time::Instant};

use log::info;

use edpath_core::{
    MemoReport, MemoStore, Result, RouteReport, SolveConfig, Solver, SolverOptions,
    WaypointResolver, logging, provider, read_waypoint_list,
};

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let now = Instant::now();
    let options = SolverOptions::from_args()?;
    logging::init_logger(&options)?;
    info!("options: {options}");

    let inputs = options.input_paths();
    let lists = if inputs.is_empty() {
        vec![read_waypoint_list(None)?]
    } else {
        inputs
            .into_iter()
            .map(|path| read_waypoint_list(Some(path)))
            .collect::<Result<Vec<_>>>()?
    };

    let mut resolver = WaypointResolver::new(provider::from_options(&options)?);
    let legs = lists
        .iter()
        .map(|entries| resolver.path(entries))
        .collect::<Result<Vec<_>>>()?;
    info!(
        "input: legs={} waypoints={}",
        legs.len(),
        resolver.len()
    );

    let memo = MemoStore::from_options(&options);
    let solver = Solver::new(SolveConfig::from(&options), Some(&memo));
    let route = solver.solve_legs(&legs)?;

    println!("{}", RouteReport::new(&route));

    info!("{}", MemoReport::from_store(&memo));
    info!(
        "output: waypoints={} length={:.2} time={:.2}s",
        route.order.len(),
        route.length,
        now.elapsed().as_secs_f32()
    );
    Ok(())
}
