use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::Connection;

use instrument_csv_import::ingestion::{
    DEFAULT_PATTERN, ImportOptions, import_directory, import_file, match_files,
};
use instrument_csv_import::types::AggregateStats;

static NEXT: AtomicUsize = AtomicUsize::new(0);

fn tmp_dir() -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let dir = std::env::temp_dir().join(format!(
        "instrument-csv-import-dir-{}-{nanos}-{}",
        std::process::id(),
        NEXT.fetch_add(1, Ordering::SeqCst)
    ));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM \"{table}\""), [], |r| r.get(0))
        .unwrap()
}

#[test]
fn unreadable_file_contributes_nothing() {
    let dir = tmp_dir();
    fs::write(dir.join("balance.csv"), "Mass (g),Operator\n1.25,JD\n,\n1.31,JD\n").unwrap();
    fs::write(dir.join("ph_meter.csv"), "pH\n7.01\n6.98\n").unwrap();

    // Listed but never created: opening it fails.
    let files = vec![
        dir.join("balance.csv"),
        dir.join("missing.csv"),
        dir.join("ph_meter.csv"),
    ];

    let mut conn = Connection::open_in_memory().unwrap();
    let totals = import_directory(&mut conn, &files, &ImportOptions::default());

    assert_eq!(
        totals,
        AggregateStats {
            files_processed: 2,
            total: 5,
            imported: 4,
            skipped: 1,
            error: 0,
        }
    );
    assert_eq!(count(&conn, "balance"), 2);
    assert_eq!(count(&conn, "ph_meter"), 2);
}

#[test]
fn totals_are_the_sum_of_per_file_stats() {
    let dir = tmp_dir();
    fs::write(dir.join("a.csv"), "X,Y\n1,2\n,\n3\n").unwrap();
    fs::write(dir.join("b.csv"), "Z\nfoo\nbar\nbaz\n").unwrap();
    fs::write(dir.join("c.csv"), "Only Header\n").unwrap();
    let files = match_files(&dir, DEFAULT_PATTERN).unwrap();
    assert_eq!(files.len(), 3);

    let mut per_file_conn = Connection::open_in_memory().unwrap();
    let mut expected = AggregateStats::default();
    for f in &files {
        expected += import_file(&mut per_file_conn, f, &ImportOptions::default()).unwrap();
    }

    let mut conn = Connection::open_in_memory().unwrap();
    let totals = import_directory(&mut conn, &files, &ImportOptions::default());

    assert_eq!(totals, expected);
    assert_eq!(totals.files_processed, 3);
    assert_eq!(totals.total, totals.imported + totals.skipped + totals.error);
}

#[test]
fn each_file_gets_its_own_table_even_with_table_name_set() {
    let dir = tmp_dir();
    fs::write(dir.join("run_1.csv"), "V\n1\n").unwrap();
    fs::write(dir.join("run_2.csv"), "V\n2\n").unwrap();
    let files = match_files(&dir, "run_*.csv").unwrap();

    let mut conn = Connection::open_in_memory().unwrap();
    let opts = ImportOptions {
        table_name: Some("ignored".to_string()),
        batch_size: 1,
        ..Default::default()
    };
    let totals = import_directory(&mut conn, &files, &opts);

    assert_eq!(totals.files_processed, 2);
    assert_eq!(count(&conn, "run_1"), 1);
    assert_eq!(count(&conn, "run_2"), 1);
}

#[test]
fn schema_failure_in_one_file_does_not_stop_the_run() {
    let dir = tmp_dir();
    fs::write(dir.join("a_dup.csv"), "Run #,Run %\n1,2\n").unwrap();
    fs::write(dir.join("b_ok.csv"), "V\n1\n2\n").unwrap();
    let files = match_files(&dir, DEFAULT_PATTERN).unwrap();

    let mut conn = Connection::open_in_memory().unwrap();
    let totals = import_directory(&mut conn, &files, &ImportOptions::default());

    assert_eq!(totals.files_processed, 1);
    assert_eq!(totals.imported, 2);
}

#[test]
fn same_stem_in_two_files_appends_to_one_table() {
    let dir_a = tmp_dir();
    let dir_b = tmp_dir();
    fs::write(dir_a.join("hplc.csv"), "Peak,Area\n1,10.5\n").unwrap();
    fs::write(dir_b.join("hplc.csv"), "Peak,Area\n2,11.0\n3,9.5\n").unwrap();

    let mut conn = Connection::open_in_memory().unwrap();
    let totals = import_directory(
        &mut conn,
        &[dir_a.join("hplc.csv"), dir_b.join("hplc.csv")],
        &ImportOptions::default(),
    );

    assert_eq!(totals.files_processed, 2);
    assert_eq!(count(&conn, "hplc"), 3);
}
