use iocharvest::archive::{ArchiveBackend, ArchiveExpander, AttemptOutcome, SevenZip};
use iocharvest::config::Config;
use iocharvest::pipeline::Pipeline;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::{Arc, Mutex};
use tempfile::tempdir;

const MD5: &str = "9E107D9D372BB6826BD81D3542A419D6";
const ZIP_HEADER: &[u8] = b"PK\x03\x04\x14\x00\x01\x00payload";

/// Fake archive tool: each archive "contains" one text file and opens with
/// a fixed password. Archives named `corrupt*` always fail.
struct FakeTool {
    password: Option<&'static str>,
    attempts: Mutex<Vec<(PathBuf, Option<String>)>>,
}

impl FakeTool {
    fn new(password: Option<&'static str>) -> Arc<Self> {
        Arc::new(Self {
            password,
            attempts: Mutex::new(Vec::new()),
        })
    }

    fn attempts_for(&self, name: &str) -> Vec<Option<String>> {
        self.attempts
            .lock()
            .unwrap()
            .iter()
            .filter(|(path, _)| path.file_name().unwrap() == name)
            .map(|(_, password)| password.clone())
            .collect()
    }
}

impl ArchiveBackend for FakeTool {
    fn attempt(
        &self,
        archive: &Path,
        dest: &Path,
        password: Option<&str>,
    ) -> std::io::Result<AttemptOutcome> {
        self.attempts
            .lock()
            .unwrap()
            .push((archive.to_path_buf(), password.map(str::to_string)));

        let stem = archive.file_stem().unwrap().to_string_lossy().into_owned();
        if stem.starts_with("corrupt") {
            return Ok(AttemptOutcome::Failed("Can not open the file as archive".into()));
        }
        if password != self.password {
            return Ok(AttemptOutcome::WrongPassword);
        }

        fs::write(dest.join(format!("{}_extracted.txt", stem)), MD5)?;
        Ok(AttemptOutcome::Extracted)
    }

    fn name(&self) -> &str {
        "fake"
    }
}

fn config_for(root: &Path) -> Config {
    Config {
        corpus_root: Some(root.to_path_buf()),
        threads: 4,
        ..Config::default()
    }
}

#[test]
fn test_extracted_documents_are_scanned() {
    let dir = tempdir().unwrap();
    let sub = dir.path().join("2011");
    fs::create_dir(&sub).unwrap();
    fs::write(sub.join("sample.zip"), ZIP_HEADER).unwrap();

    let tool = FakeTool::new(Some("infected"));
    let summary = Pipeline::new(config_for(dir.path()))
        .with_archive_backend(tool.clone())
        .run()
        .unwrap();

    assert_eq!(summary.archives_found, 1);
    assert_eq!(summary.archives_expanded, 1);
    assert_eq!(summary.reports.len(), 1);
    assert_eq!(summary.reports[0].path(), "2011/sample_extracted.txt");
    assert_eq!(summary.reports[0].year(), Some(2011));

    assert_eq!(
        tool.attempts_for("sample.zip"),
        vec![None, Some("infected".to_string())]
    );
}

#[test]
fn test_unprotected_archive_needs_one_attempt() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("open.zip"), ZIP_HEADER).unwrap();

    let tool = FakeTool::new(None);
    Pipeline::new(config_for(dir.path()))
        .with_archive_backend(tool.clone())
        .run()
        .unwrap();

    assert_eq!(tool.attempts_for("open.zip"), vec![None]);
}

#[test]
fn test_unknown_password_exhausts_candidates() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("locked.zip"), ZIP_HEADER).unwrap();

    let tool = FakeTool::new(Some("s3cret"));
    let summary = Pipeline::new(config_for(dir.path()))
        .with_archive_backend(tool.clone())
        .run()
        .unwrap();

    assert_eq!(summary.archives_failed, 1);
    assert!(summary.reports.is_empty());
    assert_eq!(
        tool.attempts_for("locked.zip"),
        vec![
            None,
            Some("infected".to_string()),
            Some("malware".to_string()),
            Some("virus".to_string()),
        ]
    );
}

#[test]
fn test_corrupt_archive_is_not_retried_and_run_continues() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("corrupt.zip"), ZIP_HEADER).unwrap();
    fs::write(dir.path().join("good.7z"), b"7z\xBC\xAF\x27\x1C\x00\x04").unwrap();
    fs::write(dir.path().join("notes.txt"), "plain notes").unwrap();

    let tool = FakeTool::new(Some("malware"));
    let summary = Pipeline::new(config_for(dir.path()))
        .with_archive_backend(tool.clone())
        .run()
        .unwrap();

    assert_eq!(summary.archives_found, 2);
    assert_eq!(summary.archives_expanded, 1);
    assert_eq!(summary.archives_failed, 1);
    assert_eq!(tool.attempts_for("corrupt.zip"), vec![None]);

    let paths: Vec<_> = summary.reports.iter().map(|r| r.path()).collect();
    assert_eq!(paths, vec!["good_extracted.txt", "notes.txt"]);
}

#[test]
fn test_custom_password_list_order() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.rar"), b"Rar!\x1A\x07\x01\x00").unwrap();

    let mut config = config_for(dir.path());
    config.candidate_passwords = vec!["first".into(), "second".into()];

    let tool = FakeTool::new(Some("second"));
    let summary = Pipeline::new(config)
        .with_archive_backend(tool.clone())
        .run()
        .unwrap();

    assert_eq!(summary.archives_expanded, 1);
    assert_eq!(
        tool.attempts_for("a.rar"),
        vec![None, Some("first".to_string()), Some("second".to_string())]
    );
}

#[test]
fn test_every_archive_expanded_before_scanning() {
    let dir = tempdir().unwrap();
    for i in 0..16 {
        fs::write(dir.path().join(format!("batch{:02}.zip", i)), ZIP_HEADER).unwrap();
    }

    let summary = Pipeline::new(config_for(dir.path()))
        .with_archive_backend(FakeTool::new(Some("virus")))
        .run()
        .unwrap();

    assert_eq!(summary.archives_expanded, 16);
    assert_eq!(summary.reports.len(), 16);
}

#[test]
fn test_expander_directly() {
    let dir = tempdir().unwrap();
    let archive = dir.path().join("direct.zip");
    fs::write(&archive, ZIP_HEADER).unwrap();

    let expander = ArchiveExpander::new(
        FakeTool::new(Some("virus")),
        vec!["infected".into(), "malware".into(), "virus".into()],
    );

    assert_eq!(expander.expand(&archive).unwrap().as_deref(), Some("virus"));
    assert!(dir.path().join("direct_extracted.txt").exists());
}

fn seven_zip_available() -> bool {
    Command::new("7z")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok()
}

#[test]
fn test_real_seven_zip_password_protected_archive() {
    if !seven_zip_available() {
        eprintln!("7z not available, skipping");
        return;
    }

    let staging = tempdir().unwrap();
    let corpus = tempdir().unwrap();
    let inner = staging.path().join("iocs_2016.txt");
    fs::write(&inner, format!("md5 {}", MD5.to_lowercase())).unwrap();

    let archive = corpus.path().join("sample.zip");
    let status = Command::new("7z")
        .arg("a")
        .arg("-pinfected")
        .arg(&archive)
        .arg(&inner)
        .stdout(Stdio::null())
        .status()
        .unwrap();
    assert!(status.success());

    let summary = Pipeline::new(config_for(corpus.path())).run().unwrap();

    assert_eq!(summary.archives_expanded, 1);
    assert_eq!(summary.reports.len(), 1);
    assert_eq!(summary.reports[0].path(), "iocs_2016.txt");
    assert_eq!(summary.reports[0].year(), Some(2016));
    assert!(summary.reports[0].md5_hashes().contains(MD5));
}

#[test]
fn test_real_seven_zip_rejects_garbage() {
    if !seven_zip_available() {
        eprintln!("7z not available, skipping");
        return;
    }

    let dir = tempdir().unwrap();
    let archive = dir.path().join("broken.7z");
    fs::write(&archive, b"7z\xBC\xAF\x27\x1C\x00\x04 this is not an archive").unwrap();

    let expander = ArchiveExpander::new(Arc::new(SevenZip::default()), vec!["infected".into()]);
    assert!(expander.expand(&archive).is_err());
}
