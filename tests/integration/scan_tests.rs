use iocharvest::config::Config;
use iocharvest::pipeline::{Pipeline, RunSummary};
use iocharvest::report::YearRange;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const SHA256: &str = "DEADBEEF00112233445566778899AABBCCDDEEFF00112233445566778899AABB";
const MD5: &str = "9E107D9D372BB6826BD81D3542A419D6";

fn run(root: &Path) -> RunSummary {
    let config = Config {
        corpus_root: Some(root.to_path_buf()),
        year_range: YearRange::new(2006, 2024),
        threads: 2,
        ..Config::default()
    };
    Pipeline::new(config).run().unwrap()
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();
    let summary = run(dir.path());

    assert!(summary.reports.is_empty());
    assert_eq!(summary.files_walked, 0);
    assert_eq!(summary.archives_found, 0);
}

#[test]
fn test_lone_sha256() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), format!("SHA256: {}", SHA256.to_lowercase())).unwrap();

    let summary = run(dir.path());

    assert_eq!(summary.reports.len(), 1);
    let report = &summary.reports[0];
    assert_eq!(report.sha256_hashes().len(), 1);
    assert!(report.sha256_hashes().contains(SHA256));
    assert!(report.sha1_hashes().is_empty());
    assert!(report.md5_hashes().is_empty());
}

#[test]
fn test_sha1_prefix_of_sha256_is_excluded() {
    let dir = tempdir().unwrap();
    let text = format!("sha256 {}\nsha1 {}\n", SHA256, &SHA256[..40]);
    fs::write(dir.path().join("b.txt"), text).unwrap();

    let summary = run(dir.path());

    let report = &summary.reports[0];
    assert!(report.sha1_hashes().is_empty());
    assert_eq!(report.sha256_hashes().len(), 1);
}

#[test]
fn test_independent_md5_survives() {
    let dir = tempdir().unwrap();
    let text = format!("{}\n{}\n", SHA256, MD5);
    fs::write(dir.path().join("c.txt"), text).unwrap();

    let summary = run(dir.path());

    let report = &summary.reports[0];
    assert_eq!(report.md5_hashes().len(), 1);
    assert!(report.md5_hashes().contains(MD5));
}

#[test]
fn test_md5_inside_sha256_is_excluded() {
    let dir = tempdir().unwrap();
    let text = format!("{}\nfragment {}\n", SHA256, &SHA256[10..42]);
    fs::write(dir.path().join("d.txt"), text).unwrap();

    let summary = run(dir.path());

    assert!(summary.reports[0].md5_hashes().is_empty());
}

#[test]
fn test_failed_extraction_does_not_stop_run() {
    let dir = tempdir().unwrap();
    // Zip magic with a .docx name, but no document inside
    fs::write(dir.path().join("fake.docx"), b"PK\x03\x04\x14\x00\x00\x00garbage").unwrap();
    fs::write(dir.path().join("bad.pdf"), b"%PDF-1.7\n\x00\x01\x02").unwrap();
    fs::write(dir.path().join("good.txt"), MD5).unwrap();

    let summary = run(dir.path());

    assert_eq!(summary.documents_found, 3);
    assert_eq!(summary.documents_failed, 2);
    assert_eq!(summary.reports.len(), 1);
    assert_eq!(summary.reports[0].path(), "good.txt");
}

#[test]
fn test_year_from_path() {
    let dir = tempdir().unwrap();
    let nested = dir.path().join("APT_2013_Operation").join("files");
    fs::create_dir_all(&nested).unwrap();
    fs::write(nested.join("report.txt"), MD5).unwrap();
    fs::write(dir.path().join("undated.txt"), MD5).unwrap();

    let summary = run(dir.path());

    assert_eq!(summary.reports.len(), 2);
    let dated = summary
        .reports
        .iter()
        .find(|r| r.path() == "APT_2013_Operation/files/report.txt")
        .unwrap();
    assert_eq!(dated.year(), Some(2013));

    let undated = summary.reports.iter().find(|r| r.path() == "undated.txt").unwrap();
    assert_eq!(undated.year(), None);
}

#[test]
fn test_year_outside_range_is_ignored() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("1999")).unwrap();
    fs::write(dir.path().join("1999").join("old.txt"), MD5).unwrap();

    let summary = run(dir.path());

    assert_eq!(summary.reports[0].year(), None);
}

#[test]
fn test_reports_sorted_and_relative() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("b")).unwrap();
    fs::write(dir.path().join("b").join("x.txt"), MD5).unwrap();
    fs::write(dir.path().join("a.txt"), MD5).unwrap();
    fs::write(dir.path().join("c.txt"), MD5).unwrap();

    let summary = run(dir.path());

    let paths: Vec<_> = summary.reports.iter().map(|r| r.path()).collect();
    assert_eq!(paths, vec!["a.txt", "b/x.txt", "c.txt"]);
}

#[test]
fn test_document_without_indicators_still_reported() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("notes.txt"), "no hashes here").unwrap();

    let summary = run(dir.path());

    assert_eq!(summary.reports.len(), 1);
    assert_eq!(summary.reports[0].indicator_count(), 0);
}

#[test]
fn test_binary_files_are_ignored() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("sample.exe"), b"MZ\x90\x00\x03\x00\x00\x00").unwrap();

    let summary = run(dir.path());

    assert_eq!(summary.files_walked, 1);
    assert_eq!(summary.documents_found, 0);
    assert!(summary.reports.is_empty());
}

#[test]
fn test_single_worker_thread() {
    let dir = tempdir().unwrap();
    for i in 0..5 {
        fs::write(dir.path().join(format!("{}.txt", i)), MD5).unwrap();
    }

    let config = Config {
        corpus_root: Some(dir.path().to_path_buf()),
        threads: 1,
        ..Config::default()
    };
    let summary = Pipeline::new(config).run().unwrap();

    assert_eq!(summary.reports.len(), 5);
}
