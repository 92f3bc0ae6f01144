use docx_rs::{Docx, Hyperlink, HyperlinkType, Paragraph, Run, Table, TableCell, TableRow};
use iocharvest::config::Config;
use iocharvest::pipeline::Pipeline;
use iocharvest::scanner::{classify, ContentType};
use std::fs::{self, File};
use std::path::Path;
use tempfile::tempdir;

const SHA256: &str = "E3B0C44298FC1C149AFBF4C8996FB92427AE41E4649B934CA495991B7852B855";
const SHA1: &str = "2FD4E1C67A2D28FCED849EE1BB76E7391B93EB12";
const MD5: &str = "9E107D9D372BB6826BD81D3542A419D6";

fn text_cell(text: &str) -> TableCell {
    TableCell::new().add_paragraph(Paragraph::new().add_run(Run::new().add_text(text)))
}

/// Write a report-style DOCX: a heading paragraph and an indicator table.
fn write_docx(path: &Path) {
    let file = File::create(path).unwrap();
    Docx::new()
        .add_paragraph(Paragraph::new().add_run(Run::new().add_text("Indicators of compromise")))
        .add_table(Table::new(vec![
            TableRow::new(vec![text_cell("dropper.exe"), text_cell(&SHA256.to_lowercase())]),
            TableRow::new(vec![text_cell("loader.dll"), text_cell(SHA1)]),
            TableRow::new(vec![text_cell("config.bin"), text_cell(MD5)]),
        ]))
        .build()
        .pack(file)
        .unwrap();
}

/// Build a one-page PDF that shows `line` in Helvetica.
fn minimal_pdf(line: &str) -> Vec<u8> {
    let content = format!("BT /F1 12 Tf 72 720 Td ({}) Tj ET", line);
    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
         /Resources << /Font << /F1 4 0 R >> >> /Contents 5 0 R >>"
            .to_string(),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
            .to_string(),
        format!("<< /Length {} >>\nstream\n{}\nendstream", content.len(), content),
    ];

    let mut pdf = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::new();
    for (i, body) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
    }

    let xref_offset = pdf.len();
    let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
    for offset in offsets {
        xref.push_str(&format!("{:010} 00000 n \n", offset));
    }
    pdf.extend_from_slice(xref.as_bytes());
    pdf.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_offset
        )
        .as_bytes(),
    );
    pdf
}

#[test]
fn test_docx_is_classified_as_document() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("report.docx");
    write_docx(&path);

    assert_eq!(classify(&path).unwrap(), ContentType::Docx);
}

#[test]
fn test_docx_report() {
    let dir = tempdir().unwrap();
    let year_dir = dir.path().join("2015");
    fs::create_dir(&year_dir).unwrap();
    write_docx(&year_dir.join("report.docx"));

    let config = Config {
        corpus_root: Some(dir.path().to_path_buf()),
        ..Config::default()
    };
    let summary = Pipeline::new(config).run().unwrap();

    assert_eq!(summary.reports.len(), 1);
    let report = &summary.reports[0];
    assert_eq!(report.path(), "2015/report.docx");
    assert_eq!(report.year(), Some(2015));
    assert!(report.sha256_hashes().contains(SHA256));
    assert!(report.sha1_hashes().contains(SHA1));
    assert!(report.md5_hashes().contains(MD5));
}

#[test]
fn test_docx_without_extension() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("attachment_0001");
    write_docx(&path);

    let config = Config {
        corpus_root: Some(dir.path().to_path_buf()),
        ..Config::default()
    };
    let summary = Pipeline::new(config).run().unwrap();

    assert_eq!(summary.documents_found, 1);
    assert_eq!(summary.reports.len(), 1);
    assert_eq!(summary.reports[0].indicator_count(), 3);
}

#[test]
fn test_truncated_docx_is_excluded() {
    let dir = tempdir().unwrap();
    let good = dir.path().join("good.docx");
    write_docx(&good);

    let bytes = fs::read(&good).unwrap();
    fs::write(dir.path().join("truncated.docx"), &bytes[..bytes.len() / 2]).unwrap();

    let config = Config {
        corpus_root: Some(dir.path().to_path_buf()),
        ..Config::default()
    };
    let summary = Pipeline::new(config).run().unwrap();

    assert_eq!(summary.documents_failed, 1);
    let paths: Vec<_> = summary.reports.iter().map(|r| r.path()).collect();
    assert_eq!(paths, vec!["good.docx"]);
}

#[test]
fn test_nfd_path_is_normalized() {
    let dir = tempdir().unwrap();
    let folder = dir.path().join("Rapport_cafe\u{0301}_2012");
    fs::create_dir(&folder).unwrap();
    fs::write(folder.join("iocs.txt"), MD5).unwrap();

    let config = Config {
        corpus_root: Some(dir.path().to_path_buf()),
        ..Config::default()
    };
    let summary = Pipeline::new(config).run().unwrap();

    assert_eq!(summary.reports[0].path(), "Rapport_café_2012/iocs.txt");
    assert_eq!(summary.reports[0].year(), Some(2012));
}

#[test]
fn test_hash_inside_hyperlink_is_reported() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("linked.docx");
    let lookup = format!("https://www.virustotal.com/gui/file/{}", MD5.to_lowercase());

    Docx::new()
        .add_paragraph(
            Paragraph::new()
                .add_run(Run::new().add_text("Payload: "))
                .add_hyperlink(
                    Hyperlink::new(lookup, HyperlinkType::External)
                        .add_run(Run::new().add_text(MD5.to_lowercase())),
                ),
        )
        .build()
        .pack(File::create(&path).unwrap())
        .unwrap();

    let config = Config {
        corpus_root: Some(dir.path().to_path_buf()),
        ..Config::default()
    };
    let summary = Pipeline::new(config).run().unwrap();

    assert_eq!(summary.reports.len(), 1);
    assert!(summary.reports[0].md5_hashes().contains(MD5));
}

#[test]
fn test_pdf_report() {
    let dir = tempdir().unwrap();
    let year_dir = dir.path().join("2013");
    fs::create_dir(&year_dir).unwrap();
    let path = year_dir.join("report.pdf");
    fs::write(&path, minimal_pdf(&format!("md5 {}", MD5.to_lowercase()))).unwrap();

    assert_eq!(classify(&path).unwrap(), ContentType::Pdf);

    let config = Config {
        corpus_root: Some(dir.path().to_path_buf()),
        ..Config::default()
    };
    let summary = Pipeline::new(config).run().unwrap();

    assert_eq!(summary.documents_failed, 0);
    assert_eq!(summary.reports.len(), 1);
    let report = &summary.reports[0];
    assert_eq!(report.path(), "2013/report.pdf");
    assert_eq!(report.year(), Some(2013));
    assert!(report.md5_hashes().contains(MD5));
}
