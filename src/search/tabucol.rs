use std::collections::{HashMap, VecDeque};

use bit_set::BitSet;
use fastrand::Rng;

use crate::color::{
    checker, CheckerResult, ColorId, Coloring, ConflictGraph, InputError, VertexId
};
use crate::search::termination::{SearchStatus, TerminationPolicy};

/**
Recoloring of a single vertex: assign color c to vertex v.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    /// vertex to recolor
    pub v: VertexId,
    /// color to assign
    pub c: ColorId,
}

/** bounded FIFO of recently reverted (vertex, color) pairs. A contained
move is forbidden to reinstate unless the aspiration criterion removes it
first. */
#[derive(Debug, Clone)]
pub struct TabuList {
    /// forbidden moves, oldest first
    queue: VecDeque<Move>,
    /// maximum number of moves remembered
    capacity: usize,
}

impl TabuList {

    /// creates an empty list with the given capacity
    pub fn new(capacity: usize) -> Self {
        Self { queue: VecDeque::new(), capacity }
    }

    /// number of moves currently forbidden
    pub fn len(&self) -> usize { self.queue.len() }

    /// true if no move is forbidden
    pub fn is_empty(&self) -> bool { self.queue.is_empty() }

    /// is this move currently forbidden
    pub fn contains(&self, mv: &Move) -> bool { self.queue.contains(mv) }

    /** removes a move from anywhere in the list; returns true if it was
    present (the aspiration override path). */
    pub fn remove(&mut self, mv: &Move) -> bool {
        match self.queue.iter().position(|e| e == mv) {
            Some(i) => { self.queue.remove(i); true }
            None => false,
        }
    }

    /// appends a move, evicting the oldest entry past capacity
    pub fn push(&mut self, mv: Move) {
        self.queue.push_back(mv);
        if self.queue.len() > self.capacity { // queue full
            self.queue.pop_front(); // forget the oldest move
        }
    }
}

/** aspiration levels A(z): for a state with z conflicts, the threshold a
candidate must reach to be taken even when tabu. First access installs the
optimistic default z-1; each qualifying improvement overwrites the entry
with (new conflict count - 1). Values are signed because an improvement to
zero conflicts stores -1. */
#[derive(Debug, Clone, Default)]
pub struct AspirationTable {
    /// levels[z]: acceptance threshold when departing a state with z conflicts
    levels: HashMap<usize, i64>,
}

impl AspirationTable {

    /** acceptance threshold for a state with nb_conflicts conflicts,
    inserting the default (nb_conflicts - 1) on first access. */
    pub fn threshold(&mut self, nb_conflicts: usize) -> i64 {
        *self.levels.entry(nb_conflicts).or_insert(nb_conflicts as i64 - 1)
    }

    /** records the conflict count reached when departing a state with
    nb_conflicts conflicts. Last write wins: the entry is overwritten even
    if a strictly lower value was recorded before. */
    pub fn record(&mut self, nb_conflicts: usize, new_conflicts: usize) {
        self.levels.insert(nb_conflicts, new_conflicts as i64 - 1);
    }
}

/** behavior when no candidate is accepted within `reps` attempts */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepExhaustion {
    /// install the last generated candidate, even a worsening one
    AcceptLast,
    /// keep the current coloring and spend the iteration
    KeepCurrent,
}

/**
Tabucol parameters.

# Examples

```
use tabu_color::search::tabucol::TabucolConfig;

let config = TabucolConfig::default()
    .with_tabu_size(10)
    .with_max_iterations(1_000)
    .with_seed(42);
assert_eq!(config.tabu_size, 10);
assert_eq!(config.reps, 100);
```
*/
#[derive(Debug, Clone)]
pub struct TabucolConfig {
    /// tabu list capacity
    pub tabu_size: usize,
    /// candidate attempts per iteration
    pub reps: usize,
    /// hard iteration ceiling
    pub max_iterations: usize,
    /// random seed (None draws one from the system)
    pub seed: Option<u64>,
    /// what to do when no candidate is accepted within `reps` attempts
    pub rep_exhaustion: RepExhaustion,
}

impl Default for TabucolConfig {
    fn default() -> Self {
        Self {
            tabu_size: 7,
            reps: 100,
            max_iterations: 10_000,
            seed: None,
            rep_exhaustion: RepExhaustion::AcceptLast,
        }
    }
}

impl TabucolConfig {
    /// sets the tabu list capacity
    pub fn with_tabu_size(mut self, tabu_size: usize) -> Self {
        self.tabu_size = tabu_size; self
    }

    /// sets the number of candidate attempts per iteration
    pub fn with_reps(mut self, reps: usize) -> Self {
        self.reps = reps; self
    }

    /// sets the iteration budget
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations; self
    }

    /// sets the random seed (runs with the same seed are identical)
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed); self
    }

    /// sets the behavior on rep exhaustion
    pub fn with_rep_exhaustion(mut self, rep_exhaustion: RepExhaustion) -> Self {
        self.rep_exhaustion = rep_exhaustion; self
    }
}

/** outcome of a tabucol run */
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TabucolResult {
    /// a conflict-free coloring was found
    Solved {
        /// the coloring (one color per vertex)
        coloring: Coloring,
        /// iterations spent to reach it
        nb_iterations: usize,
    },
    /// the iteration budget was spent with conflicts remaining. This is the
    /// normal outcome for an insufficient color count, not a fault.
    Exhausted {
        /// iterations spent (the whole budget)
        nb_iterations: usize,
    },
}

impl TabucolResult {

    /// true if a conflict-free coloring was found
    pub fn is_solved(&self) -> bool {
        matches!(self, TabucolResult::Solved { .. })
    }

    /// iterations spent, whatever the outcome (statistics mode reads this)
    pub fn nb_iterations(&self) -> usize {
        match self {
            TabucolResult::Solved { nb_iterations, .. }
            | TabucolResult::Exhausted { nb_iterations } => *nb_iterations,
        }
    }

    /// the coloring if one was found
    pub fn coloring(&self) -> Option<&Coloring> {
        match self {
            TabucolResult::Solved { coloring, .. } => Some(coloring),
            TabucolResult::Exhausted { .. } => None,
        }
    }

    /// consumes the result, returning the coloring if one was found
    pub fn into_coloring(self) -> Option<Coloring> {
        match self {
            TabucolResult::Solved { coloring, .. } => Some(coloring),
            TabucolResult::Exhausted { .. } => None,
        }
    }
}

/** (see https://doi.org/10.1016/0305-0548(87)90090-0 for the scheme)
Local search for conflict-graph coloring with a fixed number of colors.
Starts from a uniformly random coloring and recolors one conflicting vertex
per iteration, minimizing the number of monochromatic edges. Recently
reverted (vertex, color) pairs are tabu; a tabu move is taken only when it
beats every improvement previously reached from the current conflict count
(aspiration).

Owns the working coloring, the tabu list, the aspiration table and the
random generator; all of it lives for a single run and nothing is shared
across runs.

main procedure, each iteration:
 1. scan the edges, count conflicts, mark conflicting endpoints as
    move candidates
 2. sample up to `reps` single-vertex recolorings until one is accepted
 3. make the departed (vertex, color) pair tabu and install the move
*/
#[derive(Debug)]
pub struct TabucolSearch<'a> {
    /// reference instance
    inst: &'a ConflictGraph,
    /// number of available colors
    nb_colors: usize,
    /// colors[v]: color of the vertex v
    colors: Coloring,
    /// recently reverted moves
    tabu: TabuList,
    /// aspiration levels by conflict count
    aspiration: AspirationTable,
    /// stopping rule
    termination: TerminationPolicy,
    /// candidate attempts per iteration
    reps: usize,
    /// behavior on rep exhaustion
    rep_exhaustion: RepExhaustion,
    /// iterations spent so far
    nb_iterations: usize,
    /// random number generator (owned by the run)
    rng: Rng,
}

impl<'a> TabucolSearch<'a> {

    /** creates a search with a uniformly random initial coloring. A zero
    color count or a zero rep count is rejected before anything runs. */
    pub fn new(
        inst: &'a ConflictGraph,
        nb_colors: usize,
        config: &TabucolConfig,
    ) -> Result<Self, InputError> {
        if nb_colors == 0 { return Err(InputError::ZeroColors); }
        if config.reps == 0 { return Err(InputError::ZeroReps); }
        let mut rng = match config.seed {
            Some(seed) => Rng::with_seed(seed),
            None => Rng::new(),
        };
        let colors: Coloring = (0..inst.nb_vertices())
            .map(|_| rng.usize(0..nb_colors))
            .collect();
        Ok(Self {
            inst,
            nb_colors,
            colors,
            tabu: TabuList::new(config.tabu_size),
            aspiration: AspirationTable::default(),
            termination: TerminationPolicy::new(config.max_iterations),
            reps: config.reps,
            rep_exhaustion: config.rep_exhaustion,
            nb_iterations: 0,
            rng,
        })
    }

    /// working coloring
    pub fn coloring(&self) -> &Coloring { &self.colors }

    /// iterations spent so far
    pub fn nb_iterations(&self) -> usize { self.nb_iterations }

    /// number of moves currently forbidden
    pub fn tabu_len(&self) -> usize { self.tabu.len() }

    /** runs the search to completion: a conflict-free coloring or an
    exhausted iteration budget. */
    pub fn run(&mut self) -> TabucolResult {
        loop {
            let (nb_conflicts, candidates) = self.conflict_scan();
            match self.termination.status(nb_conflicts, self.nb_iterations) {
                SearchStatus::Converged => {
                    return TabucolResult::Solved {
                        coloring: self.colors.clone(),
                        nb_iterations: self.nb_iterations,
                    };
                }
                SearchStatus::Exhausted => {
                    log::debug!("no coloring found with {} colors", self.nb_colors);
                    return TabucolResult::Exhausted {
                        nb_iterations: self.nb_iterations,
                    };
                }
                SearchStatus::Running => self.step(nb_conflicts, &candidates),
            }
        }
    }

    /** counts monochromatic edges and collects their endpoints (the
    vertices worth recoloring), in first-seen order. */
    fn conflict_scan(&self) -> (usize, Vec<VertexId>) {
        let mut nb_conflicts = 0;
        let mut candidates = Vec::new();
        let mut marked: BitSet = BitSet::with_capacity(self.inst.nb_vertices());
        for &(u, v) in self.inst.edges() {
            if self.colors[u] == self.colors[v] {
                nb_conflicts += 1;
                if !marked.contains(u) {
                    marked.insert(u);
                    candidates.push(u);
                }
                if !marked.contains(v) {
                    marked.insert(v);
                    candidates.push(v);
                }
            }
        }
        (nb_conflicts, candidates)
    }

    /** runs one iteration: select a move, make the departed (vertex, color)
    pair tabu, install the move. */
    fn step(&mut self, nb_conflicts: usize, candidates: &[VertexId]) {
        assert!(
            !candidates.is_empty(),
            "tabucol: conflicts without conflicting vertices (internal error)"
        );
        if let Some(mv) = self.select_move(nb_conflicts, candidates) {
            // the color being left becomes tabu
            self.tabu.push(Move { v: mv.v, c: self.colors[mv.v] });
            self.colors[mv.v] = mv.c;
        }
        self.nb_iterations += 1;
        if self.nb_iterations % 500 == 0 {
            log::debug!("iteration: {}", self.nb_iterations);
        }
    }

    /** attempts up to `reps` candidates, returning the first accepted one.
    Only strictly improving candidates are accepted here; the aspiration
    test gates tabu candidates only. When every attempt is rejected, the
    last generated candidate is returned anyway (`AcceptLast`, even if it
    worsens the coloring) or the round yields None (`KeepCurrent`). */
    fn select_move(&mut self, nb_conflicts: usize, candidates: &[VertexId]) -> Option<Move> {
        let mut last = None;
        for _ in 0..self.reps {
            let mv = self.propose(candidates);
            let new_conflicts = self.conflicts_after(&mv);
            last = Some(mv);
            if new_conflicts < nb_conflicts { // improving candidate
                if (new_conflicts as i64) <= self.aspiration.threshold(nb_conflicts) {
                    self.aspiration.record(nb_conflicts, new_conflicts);
                    if self.tabu.remove(&mv) { // tabu permitted: beats any prior
                        log::debug!("tabu permitted; {} -> {}", nb_conflicts, new_conflicts);
                        return Some(mv);
                    }
                } else if self.tabu.contains(&mv) {
                    continue; // tabu move isn't good enough
                }
                log::trace!("{} -> {}", nb_conflicts, new_conflicts);
                return Some(mv);
            }
        }
        match self.rep_exhaustion {
            RepExhaustion::AcceptLast => last,
            RepExhaustion::KeepCurrent => None,
        }
    }

    /** proposes one candidate: a random conflicting vertex and a color
    differing from its current one. The color is drawn among the first
    nb_colors-1 colors; a draw equal to the current color is swapped for the
    last color, which is therefore reachable two ways (a slight, deliberate
    non-uniformity of the procedure). */
    fn propose(&mut self, candidates: &[VertexId]) -> Move {
        let v = candidates[self.rng.usize(0..candidates.len())];
        // with a single color there is no alternative color: proposals are
        // no-ops and the run exhausts its budget
        let mut c = if self.nb_colors > 1 {
            self.rng.usize(0..self.nb_colors - 1)
        } else {
            0
        };
        if c == self.colors[v] {
            c = self.nb_colors - 1;
        }
        Move { v, c }
    }

    /** conflict count of the coloring obtained by applying mv, rescanning
    the whole edge set (the count matches a scan of the rebuilt coloring). */
    fn conflicts_after(&self, mv: &Move) -> usize {
        self.inst.edges().iter()
            .filter(|&&(u, v)| {
                let cu = if u == mv.v { mv.c } else { self.colors[u] };
                let cv = if v == mv.v { mv.c } else { self.colors[v] };
                cu == cv
            })
            .count()
    }
}

/**
Runs tabucol on an instance: random initial coloring, bounded-memory tabu
list, aspiration overrides, fixed iteration budget. An exhausted budget is
reported as [`TabucolResult::Exhausted`], not as an error; [`InputError`]
covers ill-formed caller input only.
*/
pub fn tabucol(
    inst: &ConflictGraph,
    nb_colors: usize,
    config: &TabucolConfig,
) -> Result<TabucolResult, InputError> {
    let mut search = TabucolSearch::new(inst, nb_colors, config)?;
    let res = search.run();
    if let TabucolResult::Solved { coloring, .. } = &res {
        debug_assert!(matches!(
            checker(inst, nb_colors, coloring),
            CheckerResult::Ok(_)
        ));
    }
    Ok(res)
}
