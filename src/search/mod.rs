//! Search procedures for the conflict-graph coloring problem.

/// tabu search with aspiration overrides (tabucol)
pub mod tabucol;

/// stopping rule (convergence / iteration budget)
pub mod termination;

/// repeated independent trials and their summary statistics
pub mod stats;
