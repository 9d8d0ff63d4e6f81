//! Tabu search (tabucol) for conflict-graph coloring: assign each entity
//! (e.g. a course) to one of a fixed number of slots so that no two
//! conflicting entities share a slot.

// #![warn(clippy::all, clippy::pedantic)]
// useful additional warnings if docs are missing, or crates imported but unused, etc.
#![warn(missing_debug_implementations)]
#![warn(missing_docs)]
#![warn(trivial_casts, trivial_numeric_casts)]
#![warn(unsafe_code)]
#![warn(unused_extern_crates)]
#![warn(variant_size_differences)]

// not sure if already by default in clippy
#![warn(clippy::similar_names)]
#![warn(clippy::shadow_unrelated)]
#![warn(clippy::shadow_same)]
#![warn(clippy::shadow_reuse)]


/// conflict graphs, colorings and the solution checker
pub mod color;

/// read/write DIMACS formats
pub mod dimacs;

/// helper and utility methods for executables
pub mod util;

/// search procedures (tabu search, termination, repeated-trial statistics)
pub mod search;
