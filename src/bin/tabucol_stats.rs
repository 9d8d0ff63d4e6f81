use std::fs::File;

use clap::{App, load_yaml};
use serde_json::json;

use tabu_color::search::stats::{run_trials, StatsRecord};
use tabu_color::util::{read_params, export_stats};

/** repeats independent tabucol runs on an instance and reports the mean
iteration count; optionally writes the per-trial record log consumed by the
external plotting tool. */
pub fn main() {
    env_logger::init();
    // parse arguments
    let yaml = load_yaml!("tabucol_stats.yml");
    let main_args = App::from_yaml(yaml).get_matches();
    let nb_trials: usize = main_args.value_of("trials").unwrap().parse()
        .expect("unable to parse the number of trials");
    let records_file = main_args.value_of("records").map(String::from);
    let perf_file = main_args.value_of("perf").map(String::from);
    let (inst_filename, instance, nb_colors, config) = read_params(&main_args);

    // run the trials
    let outcomes = run_trials(&instance, nb_colors, &config, nb_trials)
        .unwrap_or_else(|e| panic!("invalid input: {}", e));
    let nb_solved = outcomes.iter().filter(|t| t.solved).count();
    let mean = outcomes.iter().map(|t| t.nb_iterations).sum::<usize>() as f64
        / nb_trials.max(1) as f64;
    println!(
        "{} trials with {} colors: {} solved, mean {} iterations",
        nb_trials, nb_colors, nb_solved, mean
    );

    // write the record log
    if let Some(filename) = records_file {
        let mut file = File::create(&filename)
            .unwrap_or_else(|why| panic!("couldn't create {}: {}", filename, why));
        for (trial, outcome) in outcomes.iter().enumerate() {
            let record = StatsRecord {
                label: format!("{} trial {}", inst_filename, trial),
                outcome: (if outcome.solved { "converged" } else { "exhausted" }).to_string(),
                nb_vertices: instance.nb_vertices(),
                nb_colors,
                nb_iterations: outcome.nb_iterations,
                elapsed: outcome.elapsed,
            };
            record.write(&mut file)
                .unwrap_or_else(|why| panic!("couldn't write {}: {}", filename, why));
        }
        println!("records written in: {}", filename);
    }

    // export results
    let stats = json!({
        "inst_name": inst_filename,
        "nb_colors": nb_colors,
        "nb_trials": nb_trials,
        "nb_solved": nb_solved,
        "mean_iterations": mean,
        "outcomes": outcomes,
    });
    export_stats(&stats, perf_file.as_deref());
}
