//! Tunables for the solver and the result formatter.
//!
//! Nothing in here is global: a `SolverConfig` is passed by reference into each
//! request, so two requests with different settings never interfere.

use std::time::Duration;

use crate::errors::ConfigError;

/// Settings for the numeric root search and result rendering.
///
/// # Example
/// ```
/// use evalexpr_solve::SolverConfig;
/// use std::time::Duration;
///
/// let config = SolverConfig::default()
///     .with_window(-10.0, 10.0)
///     .with_timeout(Some(Duration::from_millis(500)));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SolverConfig {
    /// Lower end of the interval scanned for real roots
    pub search_min: f64,
    /// Upper end of the interval scanned for real roots
    pub search_max: f64,
    /// Number of sample points laid over the search window
    pub samples: usize,
    /// Absolute tolerance for bisection and for merging duplicate roots
    pub tolerance: f64,
    /// Iteration cap for each bisection refinement
    pub max_iterations: usize,
    /// Upper bound on the number of solution mappings returned
    pub max_solutions: usize,
    /// Deadline for a single solve call, `None` to search without a limit
    pub timeout: Option<Duration>,
    /// Decimal places used when rendering solution values
    pub decimals: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            search_min: -100.0,
            search_max: 100.0,
            samples: 4000,
            tolerance: 1e-10,
            max_iterations: 200,
            max_solutions: 32,
            timeout: Some(Duration::from_secs(5)),
            decimals: 4,
        }
    }
}

impl SolverConfig {
    /// Sets the interval scanned by the numeric root search.
    pub fn with_window(mut self, min: f64, max: f64) -> Self {
        self.search_min = min;
        self.search_max = max;
        self
    }

    /// Sets the number of sample points in the search window.
    pub fn with_samples(mut self, samples: usize) -> Self {
        self.samples = samples;
        self
    }

    /// Sets the deadline for a single solve call.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the maximum number of solution mappings.
    pub fn with_max_solutions(mut self, max_solutions: usize) -> Self {
        self.max_solutions = max_solutions;
        self
    }

    /// Checks that the settings describe a usable search.
    ///
    /// # Errors
    /// Returns `ConfigError` if the window is empty or not finite, if fewer than two
    /// samples are requested, or if the tolerance is not a positive finite number.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.search_min.is_finite()
            && self.search_max.is_finite()
            && self.search_min < self.search_max)
        {
            return Err(ConfigError::EmptyWindow {
                min: self.search_min,
                max: self.search_max,
            });
        }
        if self.samples < 2 {
            return Err(ConfigError::TooFewSamples(self.samples));
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(ConfigError::InvalidTolerance(self.tolerance));
        }
        Ok(())
    }
}
