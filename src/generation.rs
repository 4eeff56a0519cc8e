mod candidate;
mod heights;
mod perturb;
mod scramble;
mod support;
mod template;
mod validation;

use crate::difficulty::{assess, Difficulty, DifficultyWeights};
use crate::pour::{Bottle, Color, Move, Params, PourError, PourState, Slot};
use crate::solver::{NoProfile, SolutionCount};
use candidate::FillOptions;
pub use heights::HeightMode;
use log::{debug, info};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
pub use scramble::{goal_for, relaxed_moves, scramble};
use serde::{Deserialize, Serialize};
use std::time::Duration;
pub use support::Support;
pub use template::{Template, TemplateBottle, TemplateError, TemplateRequest};
use thiserror::Error;
pub use validation::{validate_candidate, Rejection};

/// A bottom-to-top colour list per bottle, replacing the generated start contents.
pub type InitialDistribution = Vec<Vec<Color>>;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub mix_min: usize,
    pub mix_max: usize,
    pub seed: u64,
    /// Candidates tried by `make_one` before giving up.
    pub attempts: usize,
    pub solve_time_ms: u64,
    /// Deal randomly instead of scrambling the sorted arrangement.
    pub start_mixed: bool,
    pub height_mode: HeightMode,
    pub reserved_empty: usize,
    /// Longest same-colour run a fill may stack. Zero disables the limit.
    pub max_run_per_bottle: usize,
    pub placement_tries: usize,
    pub presolved_retries: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            mix_min: 60,
            mix_max: 180,
            seed: 0xA17C_3B5E_CAFE_BEEF,
            attempts: 30,
            solve_time_ms: 2500,
            start_mixed: true,
            height_mode: HeightMode::LeftToRight,
            reserved_empty: 2,
            max_run_per_bottle: 2,
            placement_tries: 64,
            presolved_retries: 8,
        }
    }
}

impl GeneratorConfig {
    pub fn solve_time(&self) -> Duration {
        Duration::from_millis(self.solve_time_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("no solvable candidate found in {attempts} attempts")]
    NoCandidate { attempts: usize },
    #[error("initial distribution has {found} bottles, the puzzle has {expected}")]
    DistributionBottles { found: usize, expected: usize },
    #[error("bottle {bottle} of the initial distribution overflows its capacity")]
    DistributionOverflow { bottle: usize },
    #[error("initial distribution holds {found} units, the puzzle needs {expected}")]
    DistributionUnits { found: usize, expected: usize },
    #[error("colour {color} of the initial distribution is outside the palette")]
    DistributionColor { color: Color },
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error(transparent)]
    Pour(#[from] PourError),
}

#[derive(Clone, Debug)]
pub struct GeneratedPuzzle {
    pub state: PourState,
    pub mix_intensity: usize,
    pub min_moves: u32,
    pub solution_count: SolutionCount,
    pub solution_moves: Vec<Move>,
    /// Moves that produced the start state in scramble mode, empty otherwise.
    pub scramble_trace: Vec<Move>,
    pub difficulty: Difficulty,
}

impl GeneratedPuzzle {
    /// The state after the first `step` solution moves.
    pub fn playback(&self, step: usize) -> Result<PourState, PourError> {
        let mut state = self.state.clone();

        for pour_move in self.solution_moves.iter().take(step) {
            state.apply(*pour_move)?;
        }

        Ok(state)
    }
}

struct Candidate {
    state: PourState,
    mix_intensity: usize,
    scramble_trace: Vec<Move>,
}

pub struct Generator<R: Rng> {
    params: Params,
    config: GeneratorConfig,
    weights: DifficultyWeights,
    template: Option<Template>,
    rng: R,
}

impl Generator<SmallRng> {
    /// A generator seeded from `config.seed`.
    pub fn from_config(params: Params, config: GeneratorConfig) -> Generator<SmallRng> {
        let rng = SmallRng::seed_from_u64(config.seed);

        Generator::new(params, config, rng)
    }
}

impl<R: Rng> Generator<R> {
    pub fn new(params: Params, config: GeneratorConfig, rng: R) -> Generator<R> {
        Generator {
            params,
            config,
            weights: DifficultyWeights::default(),
            template: None,
            rng,
        }
    }

    pub fn with_weights(mut self, weights: DifficultyWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn params(&self) -> Params {
        self.params
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn template(&self) -> Option<&Template> {
        self.template.as_ref()
    }

    /// Every later attempt keeps the template's heights, gimmicks and hidden layout.
    pub fn set_template(&mut self, template: Template) -> Result<(), TemplateError> {
        template.check(self.params)?;
        self.template = Some(template);

        Ok(())
    }

    pub fn clear_template(&mut self) {
        self.template = None;
    }

    /// Places the requested gimmicks and hidden slots over freshly allocated heights.
    pub fn build_auto_template(
        &mut self,
        request: &TemplateRequest,
    ) -> Result<Template, TemplateError> {
        let heights = heights::allocate(
            self.config.height_mode,
            self.params,
            self.config.reserved_empty,
            None,
            &mut self.rng,
        );

        template::build(self.params, &heights, request, &mut self.rng)
    }

    pub fn make_one(
        &mut self,
        initial: Option<&InitialDistribution>,
    ) -> Result<GeneratedPuzzle, GenerationError> {
        if let Some(distribution) = initial {
            self.check_distribution(distribution)?;
        }

        // A fixed, unscrambled start gives the same verdict every time.
        let attempts = if initial.is_some() && self.config.start_mixed {
            1
        } else {
            self.config.attempts
        };

        for attempt in 0..attempts {
            let candidate = match initial {
                Some(distribution) => self.distribution_candidate(distribution),
                None if self.config.start_mixed => self.mixed_candidate(),
                None => self.scrambled_candidate(),
            }?;

            match validate_candidate::<NoProfile>(&candidate.state, self.config.solve_time()) {
                Ok(solution) => {
                    let difficulty = assess(&candidate.state, &solution, &self.weights);

                    info!(
                        "accepted attempt {}: {} moves, difficulty {:.2} ({})",
                        attempt, solution.min_moves, difficulty.score, difficulty.label
                    );

                    return Ok(GeneratedPuzzle {
                        state: candidate.state,
                        mix_intensity: candidate.mix_intensity,
                        min_moves: solution.min_moves,
                        solution_count: solution.solution_count,
                        solution_moves: solution.moves,
                        scramble_trace: candidate.scramble_trace,
                        difficulty,
                    });
                }
                Err(rejection) => debug!("attempt {} rejected: {}", attempt, rejection),
            }
        }

        Err(GenerationError::NoCandidate { attempts })
    }

    fn check_distribution(&self, distribution: &[Vec<Color>]) -> Result<(), GenerationError> {
        let params = self.params;

        if distribution.len() > params.num_bottles {
            return Err(GenerationError::DistributionBottles {
                found: distribution.len(),
                expected: params.num_bottles,
            });
        }

        if let Some(bottle) = distribution
            .iter()
            .position(|colors| colors.len() > params.capacity)
        {
            return Err(GenerationError::DistributionOverflow { bottle });
        }

        if let Some(&color) = distribution
            .iter()
            .flatten()
            .find(|color| usize::from(color.get()) > params.num_colors)
        {
            return Err(GenerationError::DistributionColor { color });
        }

        let found = distribution.iter().map(Vec::len).sum();
        if found != params.total_units() {
            return Err(GenerationError::DistributionUnits {
                found,
                expected: params.total_units(),
            });
        }

        Ok(())
    }

    fn distribution_candidate(
        &mut self,
        distribution: &[Vec<Color>],
    ) -> Result<Candidate, GenerationError> {
        let params = self.params;
        let bottles = (0..params.num_bottles)
            .map(|index| {
                let colors = distribution.get(index).map(Vec::as_slice).unwrap_or(&[]);
                Bottle::with_slots(params.capacity, colors.iter().copied().map(Slot::new).collect())
            })
            .collect();

        let mut state = PourState::new(params, bottles);
        if let Some(template) = &self.template {
            template.apply_gimmicks(&mut state)?;
        }

        let (mix_intensity, scramble_trace) = if self.config.start_mixed {
            (params.total_units(), Vec::new())
        } else {
            let trace = self.scramble_steps(&mut state);
            (trace.len(), trace)
        };

        self.finish(state, mix_intensity, scramble_trace)
    }

    fn mixed_candidate(&mut self) -> Result<Candidate, GenerationError> {
        let params = self.params;
        let heights = heights::allocate(
            self.config.height_mode,
            params,
            self.config.reserved_empty,
            self.template.as_ref(),
            &mut self.rng,
        );
        let gimmicks = self
            .template
            .as_ref()
            .map(Template::gimmicks)
            .unwrap_or_else(|| vec![Default::default(); params.num_bottles]);
        let supports = support::plan(params, &heights, &gimmicks);
        let options = FillOptions {
            max_run: self.config.max_run_per_bottle,
            tries: self.config.placement_tries,
        };

        let mut bottles = Vec::new();
        for retry in 0..=self.config.presolved_retries {
            bottles =
                candidate::fill(params, &heights, &gimmicks, &supports, options, &mut self.rng);
            perturb::scatter_supports(&mut bottles, &supports, &mut self.rng);
            perturb::fix_cloth_targets(&mut bottles, &mut self.rng);

            if perturb::presolved(&bottles).is_empty() {
                break;
            }
            debug!("fill {} dealt a sorted bottle, refilling", retry);
        }

        if !perturb::presolved(&bottles).is_empty()
            && !perturb::break_presolved(&mut bottles, &mut self.rng)
        {
            debug!("could not break every sorted bottle");
        }

        self.finish(PourState::new(params, bottles), params.total_units(), Vec::new())
    }

    fn scrambled_candidate(&mut self) -> Result<Candidate, GenerationError> {
        let mut state = goal_for(self.params, self.template.as_ref())?;
        let trace = self.scramble_steps(&mut state);

        self.finish(state, trace.len(), trace)
    }

    fn scramble_steps(&mut self, state: &mut PourState) -> Vec<Move> {
        let low = self.config.mix_min.min(self.config.mix_max);
        let high = self.config.mix_min.max(self.config.mix_max);
        let steps = self.rng.gen_range(low, high + 1);

        scramble(state, steps, &mut self.rng)
    }

    fn finish(
        &self,
        mut state: PourState,
        mix_intensity: usize,
        scramble_trace: Vec<Move>,
    ) -> Result<Candidate, GenerationError> {
        if let Some(template) = &self.template {
            template.apply_hidden(&mut state)?;
        }
        state.refresh_locks();

        Ok(Candidate {
            state,
            mix_intensity,
            scramble_trace,
        })
    }
}
