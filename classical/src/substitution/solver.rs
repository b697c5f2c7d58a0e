//! Automatic substitution solving by local search over mappings
//!
//! Each restart starts from the frequency-seeded mapping perturbed by a few
//! random swaps, then proposes random pairwise swaps:
//!
//! - **Hill-climbing** keeps a swap only when the score improves and stops
//!   after `patience` proposals in a row fail to improve it.
//! - **Simulated annealing** also keeps a worse swap with probability
//!   `exp(delta / temperature)`; the temperature starts at `initial_temp` and
//!   is multiplied by `cooling_rate` after every proposal.
//!
//! Restarts are independent and run on a pool of scoped threads. Restart `i`
//! draws from its own ChaCha stream, so the outcome does not depend on the
//! number of workers.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

use super::mapping::SubstitutionMapping;
use crate::error::{AnalysisError, Result};
use crate::frequency::ALPHABET_LEN;
use crate::scoring::Scorer;

/// Random swaps applied to the frequency-seeded mapping at the start of a restart.
const SEED_SWAPS: usize = 15;

pub const MAX_RESTARTS: usize = 1_000;
pub const MAX_ITERATIONS: usize = 1_000_000;

/// Local search strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Algorithm {
    HillClimbing,
    #[default]
    SimulatedAnnealing,
}

impl Algorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::HillClimbing => "hill-climbing",
            Algorithm::SimulatedAnnealing => "simulated-annealing",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "hill-climbing" | "hillclimbing" | "hill" | "hc" => Ok(Algorithm::HillClimbing),
            "simulated-annealing" | "simulatedannealing" | "annealing" | "sa" => Ok(Algorithm::SimulatedAnnealing),
            other => Err(format!("unknown algorithm: {other}")),
        }
    }
}

/// Parameters of one solve run.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverConfig {
    pub algorithm: Algorithm,
    /// Independent searches; the best result across all of them wins
    pub restarts: usize,
    /// Swap proposals per restart
    pub iterations: usize,
    pub initial_temp: f64,
    /// Per-proposal temperature multiplier, in (0, 1)
    pub cooling_rate: f64,
    /// Hill-climbing gives up after this many proposals without improvement
    pub patience: usize,
    pub seed: u64,
    /// Wall-clock budget, checked before each restart starts
    pub deadline: Option<Duration>,
    /// Worker threads; 0 uses the available parallelism
    pub workers: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::SimulatedAnnealing,
            restarts: 20,
            iterations: 3_000,
            initial_temp: 10.0,
            cooling_rate: 0.95,
            patience: 1_000,
            seed: 0,
            deadline: None,
            workers: 0,
        }
    }
}

impl SolverConfig {
    /// Clamps every field into its usable range. Non-finite or
    /// non-positive temperatures and cooling rates outside (0, 1) fall back
    /// to the defaults.
    pub fn validated(&self) -> Self {
        let defaults = Self::default();

        let initial_temp = if self.initial_temp.is_finite() && self.initial_temp > 0.0 {
            self.initial_temp
        } else {
            defaults.initial_temp
        };
        let cooling_rate = if self.cooling_rate > 0.0 && self.cooling_rate < 1.0 {
            self.cooling_rate
        } else {
            defaults.cooling_rate
        };
        let workers = match self.workers {
            0 => thread::available_parallelism().map_or(1, |n| n.get()),
            n => n,
        };

        Self {
            algorithm: self.algorithm,
            restarts: self.restarts.clamp(1, MAX_RESTARTS),
            iterations: self.iterations.clamp(1, MAX_ITERATIONS),
            initial_temp,
            cooling_rate,
            patience: self.patience.max(1),
            seed: self.seed,
            deadline: self.deadline,
            workers: workers.min(self.restarts.clamp(1, MAX_RESTARTS)),
        }
    }
}

/// The result of one restart.
#[derive(Debug, Clone)]
pub struct RestartOutcome {
    pub index: usize,
    pub mapping: SubstitutionMapping,
    pub score: f64,
    /// Proposals made before the restart stopped
    pub proposals: usize,
}

impl RestartOutcome {
    /// Higher score wins; equal scores go to the lower restart index.
    fn beats(&self, other: &RestartOutcome) -> bool {
        self.score > other.score || (self.score == other.score && self.index < other.index)
    }
}

/// Running reduction over finished restarts. Holds at most one outcome no
/// matter how many restarts are offered.
#[derive(Debug, Default)]
struct BestRestart {
    best: Option<RestartOutcome>,
    completed: usize,
}

impl BestRestart {
    fn offer(&mut self, outcome: RestartOutcome) {
        self.completed += 1;
        match &self.best {
            Some(best) if !outcome.beats(best) => {}
            _ => self.best = Some(outcome),
        }
    }

    fn merge(mut self, other: BestRestart) -> BestRestart {
        let completed = self.completed + other.completed;
        if let Some(outcome) = other.best {
            self.offer(outcome);
        }
        self.completed = completed;
        self
    }
}

/// The best mapping across all finished restarts.
#[derive(Debug, Clone)]
pub struct SolveOutcome {
    pub mapping: SubstitutionMapping,
    pub plaintext: String,
    pub score: f64,
    /// Restart that produced the mapping, `None` when no restart finished
    pub best_restart: Option<usize>,
    pub restarts_completed: usize,
    /// The deadline stopped the run before every restart had started
    pub timed_out: bool,
}

/// Searches substitution mappings for the most English-like decryption.
pub struct SubstitutionSolver<'s, S: ?Sized> {
    scorer: &'s S,
    config: SolverConfig,
}

impl<'s, S: Scorer + ?Sized> SubstitutionSolver<'s, S> {
    pub fn new(scorer: &'s S, config: &SolverConfig) -> Self {
        Self {
            scorer,
            config: config.validated(),
        }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Runs all restarts and returns the highest-scoring mapping. Equal
    /// scores go to the lowest restart index. When the deadline cuts the run
    /// short, the best mapping found so far is returned.
    pub fn solve(&self, ciphertext: &str) -> Result<SolveOutcome> {
        if ciphertext.trim().is_empty() {
            return Err(AnalysisError::EmptyInput);
        }

        let seed_mapping = SubstitutionMapping::frequency_seeded(ciphertext);
        if !ciphertext.chars().any(|c| c.is_ascii_alphabetic()) {
            warn!("ciphertext has no letters, returning the seed mapping");
            return Ok(self.fallback(ciphertext, seed_mapping, 0, false));
        }

        let started = Instant::now();
        let expires = self.config.deadline.map(|d| started + d);
        let next = AtomicUsize::new(0);

        info!(
            algorithm = %self.config.algorithm,
            restarts = self.config.restarts,
            iterations = self.config.iterations,
            workers = self.config.workers,
            "solving substitution cipher"
        );

        let next = &next;
        let seed = &seed_mapping;

        let reduced: BestRestart = thread::scope(|scope| {
            let handles: Vec<_> = (0..self.config.workers)
                .map(|_| {
                    scope.spawn(move || {
                        let mut local = BestRestart::default();
                        loop {
                            if expires.is_some_and(|at| Instant::now() >= at) {
                                break;
                            }
                            let index = next.fetch_add(1, Ordering::Relaxed);
                            if index >= self.config.restarts {
                                break;
                            }
                            local.offer(self.run_restart(ciphertext, seed, index));
                        }
                        local
                    })
                })
                .collect();

            handles
                .into_iter()
                .map(|handle| handle.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic)))
                .fold(BestRestart::default(), BestRestart::merge)
        });

        let completed = reduced.completed;
        let timed_out = completed < self.config.restarts;
        if timed_out {
            warn!(completed, restarts = self.config.restarts, "deadline reached before all restarts ran");
        }

        let Some(best) = reduced.best else {
            return Ok(self.fallback(ciphertext, seed_mapping, 0, timed_out));
        };

        debug!(
            restart = best.index,
            score = best.score,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "substitution solve finished"
        );

        Ok(SolveOutcome {
            plaintext: best.mapping.apply(ciphertext),
            mapping: best.mapping,
            score: best.score,
            best_restart: Some(best.index),
            restarts_completed: completed,
            timed_out,
        })
    }

    fn fallback(&self, ciphertext: &str, mapping: SubstitutionMapping, completed: usize, timed_out: bool) -> SolveOutcome {
        let plaintext = mapping.apply(ciphertext);
        SolveOutcome {
            score: self.scorer.score(&plaintext),
            plaintext,
            mapping,
            best_restart: None,
            restarts_completed: completed,
            timed_out,
        }
    }

    /// Runs restart `index` from `seed_mapping`.
    pub fn run_restart(&self, ciphertext: &str, seed_mapping: &SubstitutionMapping, index: usize) -> RestartOutcome {
        self.search(ciphertext, seed_mapping, index, None)
    }

    /// Like [`SubstitutionSolver::run_restart`], also returning the best
    /// score seen after the seed and after every proposal.
    pub fn trace_restart(
        &self,
        ciphertext: &str,
        seed_mapping: &SubstitutionMapping,
        index: usize,
    ) -> (RestartOutcome, Vec<f64>) {
        let mut trace = Vec::new();
        let outcome = self.search(ciphertext, seed_mapping, index, Some(&mut trace));
        (outcome, trace)
    }

    fn search(
        &self,
        ciphertext: &str,
        seed_mapping: &SubstitutionMapping,
        index: usize,
        mut trace: Option<&mut Vec<f64>>,
    ) -> RestartOutcome {
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        rng.set_stream(index as u64);

        let mut current = *seed_mapping;
        for _ in 0..SEED_SWAPS {
            let a = rng.gen_range(0..ALPHABET_LEN);
            let b = rng.gen_range(0..ALPHABET_LEN);
            current.swap_positions(a, b);
        }

        let mut current_score = self.scorer.score(&current.apply(ciphertext));
        let mut best = current;
        let mut best_score = current_score;
        if let Some(trace) = trace.as_deref_mut() {
            trace.push(best_score);
        }
        let mut proposals = 0;

        let mut temperature = self.config.initial_temp;
        let mut stale = 0;

        for _ in 0..self.config.iterations {
            let a = rng.gen_range(0..ALPHABET_LEN);
            let mut b = rng.gen_range(0..ALPHABET_LEN - 1);
            if b >= a {
                b += 1;
            }

            proposals += 1;
            let mut candidate = current;
            candidate.swap_positions(a, b);
            let candidate_score = self.scorer.score(&candidate.apply(ciphertext));
            let delta = candidate_score - current_score;

            let accept = match self.config.algorithm {
                Algorithm::HillClimbing => delta > 0.0,
                Algorithm::SimulatedAnnealing => {
                    delta >= 0.0 || rng.gen::<f64>() < (delta / temperature).exp()
                }
            };

            if accept {
                current = candidate;
                current_score = candidate_score;
            }

            if current_score > best_score {
                best = current;
                best_score = current_score;
                stale = 0;
            } else {
                stale += 1;
            }
            if let Some(trace) = trace.as_deref_mut() {
                trace.push(best_score);
            }

            temperature *= self.config.cooling_rate;

            if self.config.algorithm == Algorithm::HillClimbing && stale >= self.config.patience {
                break;
            }
        }

        debug!(restart = index, score = best_score, proposals, "restart finished");

        RestartOutcome {
            index,
            mapping: best,
            score: best_score,
            proposals,
        }
    }
}
