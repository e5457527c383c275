use std::fs::File;
use std::sync::Arc;

use arrow::array::{ArrayRef, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use parquet::arrow::ArrowWriter;

use crate::utils::write_file;
use infection_clusters::analysis::MISSING_DATA_MESSAGE;
use infection_clusters::reader::dataset_batches;
use infection_clusters::reader::schema::{decode_microbiology, decode_transfers};
use infection_clusters::synthetic::{SyntheticConfig, generate_dataset};
use infection_clusters::{
    AnalysisConfig, AnalysisType, RecordBatch, Result, load_table, load_tables, run_analysis,
    run_analysis_on_tables,
};

const TRANSFERS_CSV: &str = "patient_id,location,date\n\
P1,Ward-A,2024-03-12\n\
P2,Ward-A,2024-03-12\n";

/// Tables loaded from CSV give the same result as the records they hold
#[test]
fn test_csv_tables_match_records() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let dataset = generate_dataset(&SyntheticConfig::default());
    let micro_path = write_file(dir.path(), "micro.csv", dataset.microbiology_csv().as_bytes());
    let transfer_path = write_file(dir.path(), "transfers.csv", dataset.transfers_csv().as_bytes());

    let micro = load_tables(&[micro_path])?;
    let transfers = load_tables(&[transfer_path])?;
    assert_eq!(micro[0].num_rows(), dataset.microbiology.len());
    assert_eq!(transfers[0].num_rows(), dataset.transfers.len());

    let config = AnalysisConfig::default();
    let from_tables = run_analysis_on_tables(&micro, &transfers, &config);
    let from_records = run_analysis(
        Some(&dataset.microbiology),
        Some(&dataset.transfers),
        &config,
    );

    assert!(from_tables.success, "{}", from_tables.message);
    assert_eq!(from_tables.results.total_episodes, from_records.results.total_episodes);
    assert_eq!(from_tables.results.total_contacts, from_records.results.total_contacts);
    assert_eq!(from_tables.formatted, from_records.formatted);
    Ok(())
}

/// Headers match after trimming and ignoring case; extra columns are ignored
#[test]
fn test_loose_headers_are_accepted() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let micro_path = write_file(
        dir.path(),
        "micro.csv",
        b" Patient_ID ,INFECTION,Collection_Date,Result,notes\n\
P1,CRE,2024-03-01,positive,first\n\
P1,CRE,2024-03-06,positive,\n\
P2,CRE,10.03.2024,positive,european date\n\
P3,CRE,2024-03-10,negative,\n",
    );

    let table = load_table(&micro_path)?;
    let records = decode_microbiology(&table.batches, &AnalysisConfig::default())?;
    assert_eq!(records.len(), 4);
    assert_eq!(records[2].collection_date, crate::utils::d(3, 10));

    let transfers_path = write_file(dir.path(), "transfers.csv", TRANSFERS_CSV.as_bytes());
    let outcome = run_analysis_on_tables(
        &[table],
        &load_tables(&[transfers_path])?,
        &AnalysisConfig::default(),
    );
    assert!(outcome.success);
    assert_eq!(outcome.results.total_clusters, 1);
    Ok(())
}

/// A table without a required column fails with an input-shape error
#[test]
fn test_missing_column_fails() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = write_file(dir.path(), "transfers.csv", b"patient_id,location\nP1,Ward-A\n");
    let table = load_table(&path)?;

    let err = decode_transfers(&table.batches, &AnalysisConfig::default()).unwrap_err();
    assert!(err.is_input_shape());

    let micro_path = write_file(
        dir.path(),
        "micro.csv",
        b"patient_id,infection,collection_date,result\nP1,CRE,2024-03-01,positive\n",
    );
    let outcome = run_analysis_on_tables(
        &[load_table(&micro_path)?],
        &[table],
        &AnalysisConfig::default(),
    );
    assert!(!outcome.success);
    assert!(outcome.message.starts_with("Analysis failed: Table 'transfers' is missing"));
    assert!(outcome.message.ends_with("date"));
    assert!(outcome.formatted.is_none());
    Ok(())
}

/// An unparseable date names the table, row and value
#[test]
fn test_bad_date_is_reported() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let micro_path = write_file(
        dir.path(),
        "micro.csv",
        b"patient_id,infection,collection_date,result\n\
P1,CRE,2024-03-01,positive\n\
P2,CRE,sometime,positive\n",
    );
    let transfers_path = write_file(dir.path(), "transfers.csv", TRANSFERS_CSV.as_bytes());

    let outcome = run_analysis_on_tables(
        &load_tables(&[micro_path])?,
        &load_tables(&[transfers_path])?,
        &AnalysisConfig::default(),
    );
    assert!(!outcome.success);
    assert_eq!(
        outcome.message,
        "Analysis failed: Table 'microbiology', row 2: cannot parse collection_date value 'sometime' as a date"
    );
    assert!(outcome.results.is_error());
    Ok(())
}

/// Header-only files load as empty tables and produce empty results
#[test]
fn test_header_only_tables() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let micro_path = write_file(
        dir.path(),
        "micro.csv",
        b"patient_id,infection,collection_date,result\n",
    );
    let transfers_path = write_file(dir.path(), "transfers.csv", TRANSFERS_CSV.as_bytes());

    let outcome = run_analysis_on_tables(
        &load_tables(&[micro_path])?,
        &load_tables(&[transfers_path])?,
        &AnalysisConfig::default(),
    );
    assert!(outcome.success, "{}", outcome.message);
    assert_eq!(outcome.results.total_episodes, 0);
    assert_eq!(outcome.results.total_clusters, 0);

    let outcome = run_analysis_on_tables(&[], &[], &AnalysisConfig::default());
    assert_eq!(outcome.message, MISSING_DATA_MESSAGE);
    Ok(())
}

/// A header-only file is still checked for its required columns
#[test]
fn test_header_only_table_with_wrong_columns_fails() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let micro_path = write_file(
        dir.path(),
        "micro.csv",
        b"patient_id,infection,collection_date,result\nP1,CRE,2024-03-01,positive\n",
    );
    let transfers_path = write_file(dir.path(), "transfers.csv", b"ward,day\n");

    let transfers = load_tables(&[transfers_path])?;
    assert!(transfers[0].batches.is_empty());

    let outcome = run_analysis_on_tables(
        &load_tables(&[micro_path])?,
        &transfers,
        &AnalysisConfig::default(),
    );
    assert!(!outcome.success);
    assert_eq!(
        outcome.message,
        "Analysis failed: Table 'transfers' is missing required columns: patient_id, location, date"
    );
    assert!(outcome.results.is_error());
    Ok(())
}

/// Files that repeat in name and content are loaded once
#[test]
fn test_duplicate_files_are_skipped() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = write_file(dir.path(), "transfers.csv", TRANSFERS_CSV.as_bytes());

    let tables = load_tables(&[path.clone(), path])?;
    assert_eq!(tables.len(), 1);
    assert_eq!(dataset_batches(&tables).len(), 1);

    let err = load_tables(&[dir.path().join("transfers.xlsx")]).unwrap_err();
    assert!(err.is_input_shape());
    Ok(())
}

fn text_batch(columns: &[(&str, Vec<&str>)]) -> RecordBatch {
    let schema = Schema::new(
        columns
            .iter()
            .map(|(name, _)| Field::new(*name, DataType::Utf8, true))
            .collect::<Vec<_>>(),
    );
    let arrays: Vec<ArrayRef> = columns
        .iter()
        .map(|(_, values)| Arc::new(StringArray::from(values.clone())) as ArrayRef)
        .collect();
    RecordBatch::try_new(Arc::new(schema), arrays).unwrap()
}

fn write_parquet(path: &std::path::Path, batch: &RecordBatch) {
    let file = File::create(path).unwrap();
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None).unwrap();
    writer.write(batch).unwrap();
    writer.close().unwrap();
}

/// Parquet and CSV inputs can be mixed
#[test]
fn test_parquet_input() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let micro_path = dir.path().join("micro.parquet");
    write_parquet(
        &micro_path,
        &text_batch(&[
            ("patient_id", vec!["P1", "P2"]),
            ("infection", vec!["CRE", "CRE"]),
            ("collection_date", vec!["2024-03-01", "2024-03-10"]),
            ("result", vec!["positive", "positive"]),
        ]),
    );
    let transfers_path = write_file(dir.path(), "transfers.csv", TRANSFERS_CSV.as_bytes());

    let micro = load_tables(&[micro_path])?;
    assert_eq!(micro[0].name, "micro.parquet");
    assert_eq!(micro[0].num_rows(), 2);

    let outcome = run_analysis_on_tables(
        &micro,
        &load_tables(&[transfers_path])?,
        &AnalysisConfig::default(),
    );
    assert!(outcome.success, "{}", outcome.message);
    assert_eq!(outcome.results.total_contacts, 1);
    assert_eq!(outcome.results.total_clusters, 1);
    Ok(())
}

/// Profile mode describes the files instead of clustering
#[test]
fn test_dataset_profile_mode() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let micro_path = write_file(
        dir.path(),
        "micro.csv",
        b"patient_id,infection,collection_date,result,ct_value\n\
P1,CRE,2024-03-01,positive,21.5\n\
P2,CRE,2024-03-10,positive,\n",
    );
    let transfers_path = write_file(dir.path(), "transfers.csv", TRANSFERS_CSV.as_bytes());
    let config = AnalysisConfig {
        analysis_type: AnalysisType::DatasetProfile,
        ..AnalysisConfig::default()
    };

    let outcome = run_analysis_on_tables(
        &load_tables(&[micro_path])?,
        &load_tables(&[transfers_path])?,
        &config,
    );
    assert!(outcome.success);
    assert_eq!(outcome.results.analysis_type, AnalysisType::DatasetProfile);
    assert_eq!(outcome.results.total_clusters, 0);

    let profile = outcome.profile.unwrap();
    assert_eq!(profile.total_files, 2);
    assert_eq!(profile.total_rows, 4);
    assert_eq!(profile.tables[0].name, "microbiology_micro.csv");
    assert_eq!(profile.tables[1].name, "transfers_transfers.csv");
    assert_eq!(profile.tables[0].numeric_columns(), vec!["ct_value"]);
    assert_eq!(profile.tables[0].columns[4].missing, 1);

    let report = outcome.formatted.unwrap();
    assert!(report.contains("Files Processed: 2"));
    assert!(report.contains("ct_value: appears in 1 file(s)"));
    Ok(())
}
