//! Command-line argument parsing.
//!
//! Accepts any iterator of strings so parsing can be tested without
//! touching `std::env::args()`.

use std::path::PathBuf;

use itertools::Itertools;

use crate::models::AnalysisType;

/// Parsed command-line arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    pub command: Command,
    /// Print the structured result as JSON instead of the text report
    pub json: bool,
    /// Show clustering progress bars
    pub progress: bool,
    /// Dedicated clustering thread count
    pub threads: Option<usize>,
}

/// What the binary should do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Analyze input files
    Analyze {
        micro: Vec<PathBuf>,
        transfers: Vec<PathBuf>,
        /// Analysis to run on the loaded files
        analysis: AnalysisType,
    },
    /// Analyze a generated dataset
    Demo { seed: u64 },
    Help,
    Version,
}

impl Args {
    /// Parse arguments; the first item is the program name
    #[must_use]
    pub fn parse_from<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();
        Self::parse_from_vec(&args)
    }

    /// Parse arguments from the environment
    #[must_use]
    pub fn parse() -> Self {
        Self::parse_from(std::env::args())
    }

    fn parse_from_vec(args: &[String]) -> Self {
        let mut parsed = Self {
            command: Command::Help,
            json: false,
            progress: false,
            threads: None,
        };
        let mut micro = Vec::new();
        let mut transfers = Vec::new();
        let mut analysis = AnalysisType::default();
        let mut demo = None;

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--micro" => i = collect_values(args, i + 1, &mut micro),
                "--transfers" => i = collect_values(args, i + 1, &mut transfers),
                "--json" => {
                    parsed.json = true;
                    i += 1;
                }
                "--profile" => {
                    analysis = AnalysisType::DatasetProfile;
                    i += 1;
                }
                "--analysis" => {
                    match args.get(i + 1).and_then(|name| AnalysisType::from_name(name)) {
                        Some(selected) => analysis = selected,
                        None => {
                            eprintln!("Error: '--analysis' requires one of: {}", analysis_names());
                            return parsed;
                        }
                    }
                    i += 2;
                }
                "--progress" => {
                    parsed.progress = true;
                    i += 1;
                }
                "--demo" => {
                    demo = Some(args.get(i + 1).and_then(|s| s.parse().ok()).unwrap_or(42));
                    i += if args.get(i + 1).is_some_and(|s| s.parse::<u64>().is_ok()) {
                        2
                    } else {
                        1
                    };
                }
                "--threads" => {
                    match args.get(i + 1).map(|s| s.parse::<usize>()) {
                        Some(Ok(n)) => parsed.threads = Some(n),
                        _ => eprintln!("Error: '--threads' requires a number"),
                    }
                    i += 2;
                }
                "-h" | "--help" => return parsed,
                "-V" | "--version" => {
                    parsed.command = Command::Version;
                    return parsed;
                }
                unknown => {
                    eprintln!("Unknown argument: {unknown}");
                    return parsed;
                }
            }
        }

        parsed.command = if let Some(seed) = demo {
            Command::Demo { seed }
        } else if micro.is_empty() && transfers.is_empty() {
            Command::Help
        } else {
            Command::Analyze {
                micro,
                transfers,
                analysis,
            }
        };
        parsed
    }
}

/// Collect values up to the next flag; returns the index of that flag
fn collect_values(args: &[String], from: usize, into: &mut Vec<PathBuf>) -> usize {
    let mut i = from;
    while i < args.len() && !args[i].starts_with('-') {
        into.push(PathBuf::from(&args[i]));
        i += 1;
    }
    i
}

/// Usage text
pub const USAGE: &str = "\
Usage: infection-clusters --micro <file>... --transfers <file>... [options]
       infection-clusters --demo [seed] [options]

Options:
  --micro <file>...      Microbiology tables (.csv or .parquet)
  --transfers <file>...  Transfer tables (.csv or .parquet)
  --analysis <name>      Analysis to run (see below)
  --profile              Same as --analysis profile
  --demo [seed]          Analyze a generated dataset
  --json                 Print the structured result as JSON
  --threads <n>          Clustering threads
  --progress             Show clustering progress
  -h, --help             Show this help
  -V, --version          Show version

Environment:
  CLUSTER_GAP_DAYS, CLUSTER_BUFFER_DAYS, CLUSTER_DEDUP_PRESENCE, CLUSTER_THREADS
  RUST_LOG               Log filter (default: info)
";

fn analysis_names() -> String {
    AnalysisType::all_types().into_iter().map(AnalysisType::name).join(", ")
}

/// Usage text followed by the available analyses
#[must_use]
pub fn help_text() -> String {
    let mut help = String::from(USAGE);
    help.push_str("\nAnalyses:\n");
    for analysis in AnalysisType::all_types() {
        help.push_str(&format!(
            "  {:<10} {}: {}\n",
            analysis.name(),
            analysis.display_name(),
            analysis.description()
        ));
    }
    help
}
