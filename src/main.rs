use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rref::{reduce_with, replay_inspect, Matrix, PivotPolicy, ReduceConfig, DEFAULT_TOLERANCE};
use tracing_subscriber::EnvFilter;

const BOLD_ANSI_CODE: &str = "\x1b[1m";
const RESET_ANSI_CODE: &str = "\x1b[0m";

/// Put a matrix in reduced row echelon form.
#[derive(Debug, Parser)]
#[command(name = "rref", about, long_about = None)]
struct Cli {
    /// JSON file containing the matrix as an array of rows. Reads stdin if absent or `-`.
    input: Option<PathBuf>,

    /// How to choose the pivot row: `first-nonzero` or `largest-magnitude`
    #[arg(long, default_value_t = PivotPolicy::LargestMagnitude)]
    pivot: PivotPolicy,

    /// Entries with absolute value at most this times the largest entry (or 1) count as zero
    #[arg(long, default_value_t = DEFAULT_TOLERANCE)]
    tolerance: f64,

    /// Print every row operation together with the matrix after it
    #[arg(long)]
    steps: bool,

    /// Print the result and the log as JSON
    #[arg(long, conflicts_with = "steps")]
    json: bool,

    /// Reduce a handful of built-in sample matrices instead of reading input
    #[arg(long, conflicts_with = "input")]
    demo: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = ReduceConfig::new(cli.pivot, cli.tolerance)?;

    let matrices = if cli.demo {
        demo_matrices()
    } else {
        vec![read_matrix(cli.input.as_ref())?]
    };

    for matrix in matrices {
        run(&cli, &config, matrix)?;
    }
    Ok(())
}

fn run(cli: &Cli, config: &ReduceConfig, matrix: Matrix) -> Result<()> {
    let result = reduce_with(matrix.clone(), cli.steps || cli.json, config)
        .context("Failed to row reduce matrix")?;

    if cli.json {
        println!("{}", serde_json::to_string(&result)?);
        return Ok(());
    }

    if cli.steps {
        println!("Putting {matrix} in reduced row echelon form\n");
        if let Some(log) = &result.log {
            replay_inspect(matrix, log, |op, m| println!("{op} =>\n{m}\n"))?;
        }
    }
    println!("{BOLD_ANSI_CODE}{}{RESET_ANSI_CODE}", result.matrix);
    Ok(())
}

fn read_matrix(path: Option<&PathBuf>) -> Result<Matrix> {
    let mut input = String::new();
    match path {
        Some(path) if path.as_os_str() != "-" => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open {}", path.to_string_lossy()))?;
            BufReader::new(file).read_to_string(&mut input)?;
        }
        _ => {
            io::stdin().read_to_string(&mut input)?;
        }
    }
    let rows: Vec<Vec<f64>> =
        serde_json::from_str(&input).context("Input is not a JSON array of rows")?;
    Ok(Matrix::try_from_vec(&rows)?)
}

fn demo_matrices() -> Vec<Matrix> {
    [
        vec![vec![2., 4., 2.], vec![3., 6., 3.]],
        vec![
            vec![1., 2., 3., 8.],
            vec![1., 3., 3., 10.],
            vec![1., 2., 4., 9.],
        ],
        vec![vec![1., 1., 0., 3.], vec![2., 3., 4., 2.]],
        vec![vec![1., 1., 1.], vec![2., -1., 5.], vec![3., 4., 2.]],
        vec![
            vec![4., 3., 2., -1., 4.],
            vec![5., 4., 3., -1., 4.],
            vec![-2., -2., -1., 2., -3.],
            vec![11., 6., 4., 1., 11.],
        ],
        vec![
            vec![3., 6., 9., 5., 25., 53.],
            vec![7., 14., 21., 9., 53., 105.],
            vec![-4., -8., -12., 5., 10., 11.],
        ],
    ]
    .iter()
    .map(|rows| Matrix::from_vec(rows))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_args() {
        let cli =
            Cli::try_parse_from(["rref", "--pivot", "first-nonzero", "--steps", "m.json"]).unwrap();
        assert_eq!(cli.pivot, PivotPolicy::FirstNonzero);
        assert_eq!(cli.tolerance, DEFAULT_TOLERANCE);
        assert!(cli.steps);
        assert!(Cli::try_parse_from(["rref", "--pivot", "biggest"]).is_err());
        assert!(Cli::try_parse_from(["rref", "--demo", "m.json"]).is_err());
    }

    #[test]
    fn test_demo_matrices_reduce() {
        for m in demo_matrices() {
            let result = reduce_with(m, false, &ReduceConfig::default()).unwrap();
            assert!(result.matrix.is_rref(1e-9));
        }
    }
}
