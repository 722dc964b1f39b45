use std::io::{self, Write};

use serde::Serialize;

use crate::app::RunResult;

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_run(result: &RunResult) -> io::Result<()> {
        Self::print_json(result)
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

pub struct TextOutput;

impl TextOutput {
    pub fn print_run(result: &RunResult) {
        println!(
            "taxid {}: {} accessions, {} report rows -> {}",
            result.taxid, result.accessions, result.report_rows, result.report_path
        );
        if let Some(download) = &result.download {
            let files: usize = download
                .accessions
                .iter()
                .map(|entry| entry.downloaded_files)
                .sum();
            println!(
                "downloaded {} files for {} assemblies -> {}",
                files,
                download.accessions.len(),
                download.summary_path
            );
        }
    }
}
