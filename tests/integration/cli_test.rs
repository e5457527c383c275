use std::path::PathBuf;

use infection_clusters::analysis::{AnalysisOutcome, MISSING_DATA_MESSAGE, SUCCESS_MESSAGE};
use infection_clusters::cli::{Args, Command, USAGE, help_text};
use infection_clusters::synthetic::{SyntheticConfig, generate_dataset};
use infection_clusters::{
    AnalysisConfig, AnalysisType, load_datasets_async, run_analysis, run_analysis_on_tables,
};

/// The demo command runs end to end and serializes to JSON
#[test]
fn test_demo_command_json() {
    let args = Args::parse_from(["infection-clusters", "--demo", "3", "--json"]);
    let Command::Demo { seed } = args.command else {
        panic!("expected demo command, got {:?}", args.command);
    };

    let dataset = generate_dataset(&SyntheticConfig {
        seed,
        ..SyntheticConfig::default()
    });
    let outcome = run_analysis(
        Some(&dataset.microbiology),
        Some(&dataset.transfers),
        &AnalysisConfig::default(),
    );
    assert!(outcome.success);
    assert_eq!(outcome.message, SUCCESS_MESSAGE);

    let json: serde_json::Value = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["results"]["analysis_type"], "EpisodeClustering");
    assert!(json["results"]["clusters_by_pathogen"].is_object());
    assert!(json["profile"].is_null());
}

/// Thread overrides from the command line reach the configuration
#[test]
fn test_threads_override() {
    let args = Args::parse_from(["x", "--micro", "m.csv", "--transfers", "t.csv", "--threads", "0"]);
    let config = AnalysisConfig {
        threads: args.threads,
        ..AnalysisConfig::default()
    };
    assert!(config.validate().is_err());

    let args = Args::parse_from(["x", "--threads", "2", "--micro", "m.csv", "--transfers", "t.csv"]);
    assert_eq!(args.threads, Some(2));
    assert_eq!(
        args.command,
        Command::Analyze {
            micro: vec![PathBuf::from("m.csv")],
            transfers: vec![PathBuf::from("t.csv")],
            analysis: AnalysisType::EpisodeClustering,
        }
    );
}

/// Omitting the transfers tables reports the missing dataset
#[tokio::test]
async fn test_micro_only_reports_missing_dataset() {
    let dir = tempfile::tempdir().unwrap();
    let micro = crate::utils::write_file(
        dir.path(),
        "micro.csv",
        b"patient_id,infection,collection_date,result\nP1,CRE,2024-01-01,positive\n",
    );
    let args = Args::parse_from(["x".to_string(), "--micro".to_string(), micro.display().to_string()]);
    let Command::Analyze { micro, transfers, .. } = args.command else {
        panic!("expected analyze command");
    };
    assert!(transfers.is_empty());

    let outcome = match load_datasets_async(&micro, &transfers).await {
        Ok((m, t)) => run_analysis_on_tables(&m, &t, &AnalysisConfig::default()),
        Err(e) => AnalysisOutcome::from_error(&e),
    };
    assert!(!outcome.success);
    assert_eq!(outcome.message, MISSING_DATA_MESSAGE);
}

#[test]
fn test_usage_lists_every_flag() {
    for flag in [
        "--micro",
        "--transfers",
        "--analysis",
        "--profile",
        "--demo",
        "--json",
        "--threads",
        "--progress",
    ] {
        assert!(USAGE.contains(flag), "usage lacks {flag}");
    }
}

/// Every analysis listed in the help can be selected by its name
#[test]
fn test_help_names_select_analyses() {
    let help = help_text();
    for analysis in AnalysisType::all_types() {
        assert!(help.contains(analysis.description()));
        let args = Args::parse_from(["x", "--analysis", analysis.name(), "--micro", "m.csv"]);
        let Command::Analyze { analysis: selected, .. } = args.command else {
            panic!("expected analyze command for {}", analysis.name());
        };
        assert_eq!(selected, analysis);
    }
}
