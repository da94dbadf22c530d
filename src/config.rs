//! Run configuration for one enumeration: dimensions, step budget, limits,
//! sink paths, and the `config.toml` deployment overlay.
//!
//! Grounded on `config.rs`'s `Config`/`ConfigBuilder` shape (builder over a
//! `Default`-backed struct, per-`n_states` default step budgets) and on the
//! `cpu_utilization_percent`/`user_locale` helpers kept close to verbatim;
//! trimmed of the teacher's decider-chain-specific fields (bouncer/cycler
//! step limits, HTML report flags, bb_challenge file ids) that have no
//! counterpart in SPEC_FULL.md.

use std::fmt::Display;
use std::sync::LazyLock;
use std::time::SystemTime;

use num_format::ToFormattedString;

use crate::toml_config::ConfigToml;

pub static CONFIG_TOML: LazyLock<ConfigToml> = LazyLock::new(ConfigToml::read_toml);

/// Number type for step budgets and step counts kept as `u32`-scale
/// collection indices (matches the teacher's `StepBig`).
pub type StepBig = u32;

/// Count of machines processed/total during an enumeration run, used by
/// `reporter.rs`'s progress tracking (matches the teacher's `IdNormalized`).
pub type IdNormalized = u64;

/// Stack-snapshot / sink-file persistence helper: `true` unless the caller
/// explicitly asked not to compress (SPEC_FULL.md §6).
const COMPRESS_DEFAULT: bool = false;
const ONLY_UNDECIDED_DEFAULT: bool = false;
const ALLOW_NO_HALT_DEFAULT: bool = true;
const CPU_UTILIZATION_DEFAULT: usize = 100;
const TAPE_SIZE_LIMIT_CELLS_DEFAULT: u32 = 20_000;

/// Output sink paths for one run (SPEC_FULL.md §6, "Work sinks").
#[derive(Debug, Clone)]
pub struct SinkPaths {
    pub halt: String,
    pub infinite: String,
    pub undecided: String,
    pub stack_snapshot: String,
}

impl Default for SinkPaths {
    fn default() -> Self {
        Self {
            halt: "out_halt.txt".to_string(),
            infinite: "out_infinite.txt".to_string(),
            undecided: "out_undecided.txt".to_string(),
            stack_snapshot: "stack_snapshot.txt".to_string(),
        }
    }
}

/// Run parameters for one enumeration (SPEC_FULL.md §6a). Use
/// [`Config::builder`] (or [`Config::builder_from_config`] to copy an
/// existing one) to construct it.
///
/// ```
/// use tnf_beaver::config::Config;
///
/// let config = Config::builder(5, 2).build();
/// assert_eq!(5, config.n_states());
/// assert_eq!(2, config.n_symbols());
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    n_states: usize,
    n_symbols: usize,
    /// Step budget an individual machine's filter may consume before being
    /// recorded `Undecided` rather than fatally failing (SPEC_FULL.md §4.7).
    step_budget: StepBig,
    tape_size_limit_cells: u32,
    /// CPU utilization in percent, e.g. 75 -> 6 of 8 cores used. 0-150 allowed.
    cpu_utilization_percent: usize,
    /// When false, the last remaining undefined cell of a machine is not
    /// expanded, so every enumerated machine retains at least one halt
    /// transition (SPEC_FULL.md §4.7).
    allow_no_halt: bool,
    sinks: SinkPaths,
    compress: bool,
    only_undecided: bool,
    creation_time: SystemTime,
}

impl Config {
    pub fn builder(n_states: usize, n_symbols: usize) -> ConfigBuilder {
        ConfigBuilder::new(n_states, n_symbols)
    }

    pub fn builder_from_config(config: &Config) -> ConfigBuilder {
        ConfigBuilder::new_config(config.clone())
    }

    /// Default per-(N, S) step budget, generalized from the teacher's
    /// per-`n_states` match arms (`step_limit_decider_halt_default`):
    /// small dimensions get a small, fast-exhausting budget; (5, 2) keeps
    /// the teacher's tuned 50M; other dimensions scale from there.
    pub fn step_budget_default(n_states: usize, n_symbols: usize) -> StepBig {
        match (n_states, n_symbols) {
            (1, _) => 10,
            (2, _) => 10,
            (3, _) => 25,
            (4, _) => 110,
            (5, 2) => 50_000_000,
            _ => 1_000_000,
        }
    }

    pub fn n_states(&self) -> usize {
        self.n_states
    }

    pub fn n_symbols(&self) -> usize {
        self.n_symbols
    }

    pub fn step_budget(&self) -> StepBig {
        self.step_budget
    }

    pub fn tape_size_limit_cells(&self) -> u32 {
        self.tape_size_limit_cells
    }

    pub fn cpu_utilization_percent(&self) -> usize {
        self.cpu_utilization_percent
    }

    pub fn allow_no_halt(&self) -> bool {
        self.allow_no_halt
    }

    pub fn sinks(&self) -> &SinkPaths {
        &self.sinks
    }

    pub fn compress(&self) -> bool {
        self.compress
    }

    pub fn only_undecided(&self) -> bool {
        self.only_undecided
    }

    pub fn creation_time(&self) -> SystemTime {
        self.creation_time
    }

    pub fn config_toml(&self) -> &ConfigToml {
        &CONFIG_TOML
    }
}

#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
    step_budget: Option<StepBig>,
    tape_size_limit_cells: Option<u32>,
    cpu_utilization_percent: Option<usize>,
    allow_no_halt: Option<bool>,
    sinks: Option<SinkPaths>,
    compress: Option<bool>,
    only_undecided: Option<bool>,
}

impl ConfigBuilder {
    fn new(n_states: usize, n_symbols: usize) -> Self {
        Self {
            config: Config {
                n_states,
                n_symbols,
                step_budget: Config::step_budget_default(n_states, n_symbols),
                tape_size_limit_cells: TAPE_SIZE_LIMIT_CELLS_DEFAULT,
                cpu_utilization_percent: CPU_UTILIZATION_DEFAULT,
                allow_no_halt: ALLOW_NO_HALT_DEFAULT,
                sinks: SinkPaths::default(),
                compress: COMPRESS_DEFAULT,
                only_undecided: ONLY_UNDECIDED_DEFAULT,
                creation_time: SystemTime::now(),
            },
            ..Default::default()
        }
    }

    fn new_config(config: Config) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn step_budget(mut self, step_budget: StepBig) -> Self {
        self.step_budget = Some(step_budget);
        self
    }

    pub fn tape_size_limit_cells(mut self, cells: u32) -> Self {
        self.tape_size_limit_cells = Some(cells);
        self
    }

    pub fn cpu_utilization(mut self, percent: usize) -> Self {
        self.cpu_utilization_percent = Some(percent);
        self
    }

    pub fn allow_no_halt(mut self, value: bool) -> Self {
        self.allow_no_halt = Some(value);
        self
    }

    pub fn sinks(mut self, sinks: SinkPaths) -> Self {
        self.sinks = Some(sinks);
        self
    }

    pub fn compress(mut self, value: bool) -> Self {
        self.compress = Some(value);
        self
    }

    pub fn only_undecided(mut self, value: bool) -> Self {
        self.only_undecided = Some(value);
        self
    }

    pub fn build(self) -> Config {
        Config {
            n_states: self.config.n_states,
            n_symbols: self.config.n_symbols,
            step_budget: self.step_budget.unwrap_or(self.config.step_budget),
            tape_size_limit_cells: self
                .tape_size_limit_cells
                .unwrap_or(self.config.tape_size_limit_cells),
            cpu_utilization_percent: self
                .cpu_utilization_percent
                .unwrap_or(self.config.cpu_utilization_percent),
            allow_no_halt: self.allow_no_halt.unwrap_or(self.config.allow_no_halt),
            sinks: self.sinks.unwrap_or(self.config.sinks),
            compress: self.compress.unwrap_or(self.config.compress),
            only_undecided: self.only_undecided.unwrap_or(self.config.only_undecided),
            creation_time: SystemTime::now(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::builder(5, 2).build()
    }
}

impl Display for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let locale = user_locale();
        write!(
            f,
            "N={} S={}, step budget {}, cpu {}%, allow_no_halt {}",
            self.n_states,
            self.n_symbols,
            self.step_budget.to_formatted_string(&locale),
            self.cpu_utilization_percent,
            self.allow_no_halt,
        )
    }
}

pub fn user_locale() -> num_format::Locale {
    num_format::Locale::en
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_step_budget_matches_small_dimensions() {
        let config = Config::builder(2, 2).build();
        assert_eq!(config.step_budget(), 10);
    }

    #[test]
    fn builder_overrides_win_over_defaults() {
        let config = Config::builder(5, 2).step_budget(100).build();
        assert_eq!(config.step_budget(), 100);
    }

    #[test]
    fn builder_from_config_copies_values() {
        let base = Config::builder(4, 2).cpu_utilization(50).build();
        let copy = Config::builder_from_config(&base).build();
        assert_eq!(copy.cpu_utilization_percent(), 50);
        assert_eq!(copy.n_states(), 4);
    }
}
