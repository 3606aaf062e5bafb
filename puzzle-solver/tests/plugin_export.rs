use chrono::{DateTime, Utc};
use puzzle_solver::{
    FnProblem, PLUGIN_ABI_VERSION, PluginRegistrar, Problem, ProblemSet, advent_release,
};
use std::sync::Arc;

#[derive(Default)]
struct Warmup;

impl ProblemSet for Warmup {
    fn name(&self) -> &str {
        "Warmup"
    }

    fn release_time(&self) -> DateTime<Utc> {
        advent_release(2024, 1).unwrap()
    }

    fn problems(&self) -> Vec<Arc<dyn Problem>> {
        vec![
            FnProblem::new("Part 1", |input, reporter| {
                reporter.solved(input.len().to_string());
                Ok(())
            })
            .shared(),
        ]
    }
}

#[derive(Default)]
struct Cooldown;

impl ProblemSet for Cooldown {
    fn name(&self) -> &str {
        "Cooldown"
    }

    fn release_time(&self) -> DateTime<Utc> {
        advent_release(2024, 25).unwrap()
    }

    fn problems(&self) -> Vec<Arc<dyn Problem>> {
        Vec::new()
    }
}

puzzle_solver::export_problem_sets!(Warmup, Cooldown);

#[test]
fn test_exported_abi_version() {
    assert_eq!(PUZZLE_PLUGIN_ABI_VERSION, PLUGIN_ABI_VERSION);
}

#[test]
fn test_entry_registers_every_listed_set() {
    let mut registrar = PluginRegistrar::new();
    puzzle_plugin_entry(&mut registrar);

    let names: Vec<String> = registrar
        .into_sets()
        .iter()
        .map(|set| set.name().to_string())
        .collect();
    assert_eq!(names, ["Warmup", "Cooldown"]);
}
