use std::fs;

use assert_matches::assert_matches;
use camino::Utf8PathBuf;
use tracing::Span;

use kira_ncbi_data::domain::FileKind;
use kira_ncbi_data::error::NcbiDataError;
use kira_ncbi_data::layout::OutputLayout;
use kira_ncbi_data::report::REPORT_COLUMNS;
use kira_ncbi_data::retrieve::{FileRetriever, read_remote_paths};

mod common;

use common::MockTransport;

const HUMAN: &str =
    "ftp://ftp.ncbi.nlm.nih.gov/genomes/all/GCF/000/001/405/GCF_000001405.40_GRCh38.p14";
const ECOLI: &str = "ftp://ftp.ncbi.nlm.nih.gov/genomes/all/GCA/000/005/845/GCA_000005845.2_ASM584v2";

fn layout(temp: &tempfile::TempDir) -> OutputLayout {
    OutputLayout::new(Utf8PathBuf::from_path_buf(temp.path().join("out")).unwrap())
}

fn report_row(accession: &str, has_annotation: bool, genbank: &str, refseq: &str) -> String {
    let mut row = vec![String::new(); REPORT_COLUMNS.len()];
    let mut set = |name: &str, value: &str| {
        let index = REPORT_COLUMNS.iter().position(|c| *c == name).unwrap();
        row[index] = value.to_string();
    };
    set("AssemblyAccession", accession);
    set("has_annotation", if has_annotation { "true" } else { "false" });
    set("FtpPath_GenBank", genbank);
    set("FtpPath_RefSeq", refseq);
    row.join(",")
}

fn write_report(path: &std::path::Path, rows: &[String]) {
    let mut content = REPORT_COLUMNS.join(",");
    content.push('\n');
    for row in rows {
        content.push_str(row);
        content.push('\n');
    }
    fs::write(path, content).unwrap();
}

#[test]
fn report_selects_annotated_and_prefers_refseq() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("report.csv");
    write_report(
        &path,
        &[
            report_row("GCF_000001405.40", true, "ftp://gb/GCA_000001405.29_GRCh38.p14", HUMAN),
            report_row("GCA_000005845.2", true, ECOLI, ""),
            report_row("GCA_999999999.1", false, "ftp://gb/GCA_999999999.1_x", ""),
            report_row("GCA_888888888.1", true, "", ""),
        ],
    );

    assert_eq!(read_remote_paths(&path).unwrap(), vec![HUMAN, ECOLI]);
}

#[test]
fn unknown_kind_fails_before_any_transfer() {
    let temp = tempfile::tempdir().unwrap();
    let table = temp.path().join("paths.txt");
    fs::write(&table, format!("{HUMAN}\n")).unwrap();
    let layout = layout(&temp);
    let transport = MockTransport::serving(&["_genomic.fna.gz"]);
    let retriever = FileRetriever::new(&transport, &layout, &Span::none());

    let err = retriever.retrieve(&table, &["fna", "bam"]).unwrap_err();

    assert_matches!(err, NcbiDataError::InvalidFileKind(kind) if kind == "bam");
    assert!(transport.requests().is_empty());
    assert!(!layout.root().as_std_path().exists());
}

#[test]
fn retrieves_into_accession_dirs_and_counts_successes() {
    let temp = tempfile::tempdir().unwrap();
    let table = temp.path().join("paths.txt");
    fs::write(&table, format!("{HUMAN}\n{ECOLI}/\n")).unwrap();
    let layout = layout(&temp);
    let transport = MockTransport::serving(&["_genomic.fna.gz", "_genomic.gbff.gz"]);
    let retriever = FileRetriever::new(&transport, &layout, &Span::none());

    let summary = retriever
        .retrieve(&table, &["gbk", "fna", "faa"])
        .unwrap();

    assert_eq!(summary.entries.len(), 2);
    let human = &summary.entries[0];
    assert_eq!(human.accession, "GCF_000001405.40");
    assert_eq!(human.downloaded_files(), 2);
    let dir = layout.accession_dir("GCF_000001405.40");
    assert!(dir.join("GCF_000001405.40_genomic.gbk.gz").as_std_path().exists());
    assert!(dir.join("GCF_000001405.40_genomic.fna.gz").as_std_path().exists());
    assert!(!dir.join("GCF_000001405.40_protein.faa.gz").as_std_path().exists());
    assert!(
        human
            .files
            .iter()
            .any(|file| file.kind == FileKind::Faa && !file.present)
    );

    assert_eq!(summary.entries[1].accession, "GCA_000005845.2");
    assert!(transport.requests().contains(&format!(
        "{ECOLI}/GCA_000005845.2_ASM584v2_genomic.gbff.gz"
    )));
    assert_eq!(transport.requests().len(), 6);
}

#[test]
fn rerun_over_existing_destination_is_harmless() {
    let temp = tempfile::tempdir().unwrap();
    let layout = layout(&temp);
    let transport = MockTransport::serving(&["_genomic.gff.gz"]);
    let retriever = FileRetriever::new(&transport, &layout, &Span::none());
    let paths = vec![HUMAN.to_string()];

    let first = retriever.retrieve_paths(&paths, &[FileKind::Gff]).unwrap();
    let second = retriever.retrieve_paths(&paths, &[FileKind::Gff]).unwrap();

    assert_eq!(first.entries[0].downloaded_files(), 1);
    assert_eq!(second.entries[0].downloaded_files(), 1);
    let dirs: Vec<_> = fs::read_dir(layout.root().as_std_path())
        .unwrap()
        .flatten()
        .collect();
    assert_eq!(dirs.len(), 1);
    assert!(
        layout
            .accession_dir("GCF_000001405.40")
            .join("GCF_000001405.40_genomic.gff3.gz")
            .as_std_path()
            .exists()
    );
}

#[test]
fn summary_csv_has_one_row_per_path() {
    let temp = tempfile::tempdir().unwrap();
    let layout = layout(&temp);
    let transport = MockTransport::serving(&["_protein.faa.gz"]);
    let retriever = FileRetriever::new(&transport, &layout, &Span::none());
    let summary = retriever
        .retrieve_paths(&[HUMAN.to_string(), ECOLI.to_string()], &[FileKind::Faa, FileKind::Fna])
        .unwrap();

    let path = temp.path().join("summary.csv");
    summary.write_csv(&path).unwrap();

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "accession,downloaded_files\nGCF_000001405.40,1\nGCA_000005845.2,1\n"
    );
}

#[test]
fn transcript_and_genomic_fasta_are_separate_files() {
    let temp = tempfile::tempdir().unwrap();
    let layout = layout(&temp);
    let transport = MockTransport::serving(&["_genomic.fna.gz"]);
    let retriever = FileRetriever::new(&transport, &layout, &Span::none());

    let summary = retriever
        .retrieve_paths(&[HUMAN.to_string()], &[FileKind::Fna, FileKind::TranscriptFna])
        .unwrap();

    let entry = &summary.entries[0];
    assert_eq!(entry.downloaded_files(), 1);
    assert!(entry.files[0].present);
    assert!(!entry.files[1].present);
    assert_eq!(
        transport.requests(),
        vec![
            format!("{HUMAN}/GCF_000001405.40_GRCh38.p14_genomic.fna.gz"),
            format!("{HUMAN}/GCF_000001405.40_GRCh38.p14_cds_from_genomic.fna.gz"),
        ]
    );
    let dir = layout.accession_dir("GCF_000001405.40");
    assert!(dir.join("GCF_000001405.40_genomic.fna.gz").as_std_path().exists());
    assert!(
        !dir.join("GCF_000001405.40_cds_from_genomic.fna.gz")
            .as_std_path()
            .exists()
    );
}

#[test]
fn paths_without_an_accession_are_skipped() {
    let temp = tempfile::tempdir().unwrap();
    let layout = layout(&temp);
    let transport = MockTransport::serving(&["_genomic.fna.gz"]);
    let retriever = FileRetriever::new(&transport, &layout, &Span::none());

    let summary = retriever
        .retrieve_paths(
            &["ftp://host/..".to_string(), HUMAN.to_string()],
            &[FileKind::Fna],
        )
        .unwrap();

    assert_eq!(summary.entries.len(), 1);
    assert_eq!(summary.entries[0].accession, "GCF_000001405.40");
    assert!(transport.requests().iter().all(|url| !url.contains("host/..")));
    let names: Vec<_> = fs::read_dir(temp.path())
        .unwrap()
        .flatten()
        .map(|entry| entry.file_name())
        .collect();
    assert_eq!(names, vec![std::ffi::OsString::from("out")]);
}
