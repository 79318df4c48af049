use std::path::PathBuf;

use anyhow::{bail, Context as _};
use clap::Parser;
use mimalloc::MiMalloc;
use xor_matrix_finder::{parse_dimacs, Context, GaussConfig, SATStatus, SolverConfig, Var};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Find Gauss-Jordan matrices among the XOR constraints of a CNF file
#[derive(Parser)]
struct Args {
    input: PathBuf,
    #[arg(long)]
    no_matrix_find: bool,
    #[arg(long)]
    min_gauss_xor_clauses: Option<usize>,
    #[arg(long)]
    max_gauss_xor_clauses: Option<usize>,
    #[arg(long)]
    max_matrix_rows: Option<usize>,
    #[arg(long)]
    max_matrix_columns: Option<usize>,
    #[arg(long)]
    min_matrix_rows: Option<usize>,
    #[arg(long)]
    max_num_matrices: Option<usize>,
    /// Sampling variables (1-based, comma separated). Replaces the set given
    /// in the input file
    #[arg(long, value_delimiter = ',')]
    sampling: Option<Vec<u64>>,
    #[arg(short, long, default_value_t = 1)]
    verbosity: u32,
    #[arg(short, long)]
    markdown_output: Vec<PathBuf>,
    #[arg(long)]
    stats: bool,
}

impl Args {
    fn gauss_config(&self) -> GaussConfig {
        let defaults = GaussConfig::default();
        GaussConfig {
            do_matrix_find: !self.no_matrix_find,
            min_gauss_xor_clauses: self
                .min_gauss_xor_clauses
                .unwrap_or(defaults.min_gauss_xor_clauses),
            max_gauss_xor_clauses: self
                .max_gauss_xor_clauses
                .unwrap_or(defaults.max_gauss_xor_clauses),
            max_matrix_rows: self.max_matrix_rows.unwrap_or(defaults.max_matrix_rows),
            max_matrix_columns: self
                .max_matrix_columns
                .unwrap_or(defaults.max_matrix_columns),
            min_matrix_rows: self.min_matrix_rows.unwrap_or(defaults.min_matrix_rows),
            max_num_matrices: self.max_num_matrices.unwrap_or(defaults.max_num_matrices),
        }
    }

    /// Command line sampling set converted to 0-based variables
    fn sampling_vars(&self, num_vars: usize) -> anyhow::Result<Option<Vec<Var>>> {
        let Some(sampling) = &self.sampling else {
            return Ok(None);
        };
        let mut vars = vec![];
        for &var in sampling {
            if var == 0 || var > num_vars as u64 {
                bail!("Sampling variable {var} is out of range 1..={num_vars}");
            }
            vars.push((var - 1) as Var);
        }
        Ok(Some(vars))
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let file = std::fs::File::open(&args.input)
        .with_context(|| format!("Can't open `{}`", args.input.display()))?;
    let problem = parse_dimacs(std::io::BufReader::new(file))
        .with_context(|| format!("Can't parse `{}`", args.input.display()))?;

    let sampling_vars = match args.sampling_vars(problem.num_vars)? {
        Some(vars) => Some(vars),
        None => problem.sampling_vars.clone(),
    };
    let conf = SolverConfig {
        gauss: args.gauss_config(),
        sampling_vars,
        verbosity: args.verbosity,
    };

    let mut ctx = Context::new(problem.num_vars, conf);
    ctx.print_results_to_stdout();
    for out in args.markdown_output.iter() {
        ctx.add_markdown_sink(out)?;
    }
    if args.stats {
        ctx.enable_stats();
    }

    println!(
        "c {} vars, {} xors, {} units, {} other clauses ignored",
        problem.num_vars,
        problem.xors.len(),
        problem.units.len(),
        problem.skipped_clauses
    );

    let status = match ctx.add_problem(&problem) {
        Ok(()) => match ctx.find_matrices() {
            Ok(report) => {
                for line in report.to_string().lines() {
                    println!("c {line}");
                }
                SATStatus::Unknown
            }
            Err(_) => SATStatus::UnSat,
        },
        Err(contradiction) => {
            println!("c {contradiction}");
            SATStatus::UnSat
        }
    };

    ctx.print_stats()?;
    ctx.report_status(status)
}
