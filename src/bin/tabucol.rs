use std::time::Instant;

use clap::{App, load_yaml};
use serde_json::json;

use tabu_color::search::tabucol::{tabucol, TabucolResult};
use tabu_color::util::{read_params, export_solution, export_stats};

/** colors a conflict instance with a fixed number of slots using tabucol */
pub fn main() {
    env_logger::init();
    // parse arguments
    let yaml = load_yaml!("tabucol.yml");
    let main_args = App::from_yaml(yaml).get_matches();
    let sol_file = main_args.value_of("solution").map(String::from);
    let perf_file = main_args.value_of("perf").map(String::from);
    let (inst_filename, instance, nb_colors, config) = read_params(&main_args);

    // solve it
    let start = Instant::now();
    let result = tabucol(&instance, nb_colors, &config)
        .unwrap_or_else(|e| panic!("invalid input: {}", e));
    let elapsed = start.elapsed().as_secs_f64();
    match &result {
        TabucolResult::Solved { coloring, nb_iterations } => {
            println!(
                "found a {}-coloring in {} iterations ({:.3}s)",
                nb_colors, nb_iterations, elapsed
            );
            export_solution(&instance, nb_colors, coloring, sol_file.as_deref());
        }
        TabucolResult::Exhausted { nb_iterations } => {
            println!(
                "no coloring found with {} colors ({} iterations, {:.3}s)",
                nb_colors, nb_iterations, elapsed
            );
        }
    }

    // export results
    let stats = json!({
        "inst_name": inst_filename,
        "nb_colors": nb_colors,
        "nb_iterations": result.nb_iterations(),
        "solved": result.is_solved(),
        "time_searched": elapsed,
    });
    export_stats(&stats, perf_file.as_deref());
}
