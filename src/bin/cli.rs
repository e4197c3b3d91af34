use std::io::{self, BufRead};
use std::process;
use std::time::Duration;

use clap::Parser;
use colored::Colorize;
use env_logger::Env;
use evalexpr_solve::{api, solve_equation, SolverConfig};

#[derive(Parser)]
#[command(name = "evalexpr-solve")]
#[command(about = "Solve informally written equations such as '2x + x^2 = 90'")]
#[command(version)]
#[command(after_help = r#"
Equations are read from standard input, one per line, when none is given.

Environment Variables:
  RUST_LOG=debug                       Log filter (default: warn)
  EVALEXPR_SOLVE_TIMEOUT_MS=5000       Deadline per equation, 0 for none
  EVALEXPR_SOLVE_DECIMALS=4            Decimal places of solution values
"#)]
struct Cli {
    /// Equation to solve
    #[arg(allow_hyphen_values = true)]
    equation: Option<String>,

    /// Print the JSON response of the HTTP service instead of plain text
    #[arg(long)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long, env = "EVALEXPR_SOLVE_DEBUG")]
    debug: bool,

    /// Lower end of the numeric root search window
    #[arg(long, env = "EVALEXPR_SOLVE_SEARCH_MIN", default_value_t = -100.0, allow_hyphen_values = true)]
    search_min: f64,

    /// Upper end of the numeric root search window
    #[arg(long, env = "EVALEXPR_SOLVE_SEARCH_MAX", default_value_t = 100.0, allow_hyphen_values = true)]
    search_max: f64,

    /// Sample points laid over the search window
    #[arg(long, env = "EVALEXPR_SOLVE_SAMPLES", default_value_t = 4000)]
    samples: usize,

    /// Bisection tolerance
    #[arg(long, env = "EVALEXPR_SOLVE_TOLERANCE", default_value_t = 1e-10)]
    tolerance: f64,

    /// Bisection iteration cap
    #[arg(long, env = "EVALEXPR_SOLVE_MAX_ITERATIONS", default_value_t = 200)]
    max_iterations: usize,

    /// Maximum number of solutions reported
    #[arg(long, env = "EVALEXPR_SOLVE_MAX_SOLUTIONS", default_value_t = 32)]
    max_solutions: usize,

    /// Deadline per equation in milliseconds, 0 for none
    #[arg(long, env = "EVALEXPR_SOLVE_TIMEOUT_MS", default_value_t = 5000)]
    timeout_ms: u64,

    /// Decimal places of solution values
    #[arg(long, env = "EVALEXPR_SOLVE_DECIMALS", default_value_t = 4)]
    decimals: usize,
}

impl Cli {
    fn solver_config(&self) -> SolverConfig {
        SolverConfig {
            search_min: self.search_min,
            search_max: self.search_max,
            samples: self.samples,
            tolerance: self.tolerance,
            max_iterations: self.max_iterations,
            max_solutions: self.max_solutions,
            timeout: (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms)),
            decimals: self.decimals,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let mut logger = env_logger::Builder::from_env(Env::default().default_filter_or("warn"));
    if cli.debug {
        logger.filter_level(log::LevelFilter::Debug);
    }
    logger.init();

    let config = cli.solver_config();
    if let Err(e) = config.validate() {
        eprintln!("{}: {}", "invalid configuration".red().bold(), e);
        process::exit(2);
    }

    let succeeded = match &cli.equation {
        Some(equation) => run(equation, cli.json, &config),
        None => io::stdin()
            .lock()
            .lines()
            .map_while(Result::ok)
            .filter(|line| !line.trim().is_empty())
            .fold(true, |ok, line| run(&line, cli.json, &config) && ok),
    };

    if !succeeded {
        process::exit(1);
    }
}

/// Solves one equation and prints the outcome, returning whether it succeeded.
fn run(equation: &str, json: bool, config: &SolverConfig) -> bool {
    if json {
        let response = api::handle_solve(Some(equation), config);
        match response.body_text() {
            Ok(body) => println!("{body}"),
            Err(e) => eprintln!("{}: {}", "error".red().bold(), e),
        }
        return response.is_success();
    }

    match solve_equation(equation, config) {
        Ok(result) => {
            println!("{result}");
            true
        }
        Err(e) => {
            eprintln!("{} {}: {}", "error in".red().bold(), equation.yellow(), e);
            false
        }
    }
}
