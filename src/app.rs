use std::sync::Arc;

use serde::Serialize;
use tracing::{info, info_span};

use crate::config::ResolvedConfig;
use crate::discovery::AccessionDiscovery;
use crate::enrich::EnrichmentPipeline;
use crate::error::NcbiDataError;
use crate::eutils::EutilsClient;
use crate::ftp::FileTransport;
use crate::layout::OutputLayout;
use crate::ncbi::DatasetsClient;
use crate::report::ReportWriter;
use crate::retrieve::FileRetriever;
use crate::retry::{Retrier, Sleeper, ThreadSleeper};

#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    pub taxid: String,
    pub accessions: usize,
    pub report_path: String,
    pub report_rows: usize,
    pub download: Option<DownloadResult>,
    pub started_at: String,
    pub finished_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DownloadResult {
    pub summary_path: String,
    pub accessions: Vec<DownloadedAccession>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DownloadedAccession {
    pub accession: String,
    pub downloaded_files: usize,
}

pub struct App<D: DatasetsClient, E: EutilsClient, T: FileTransport> {
    datasets: D,
    eutils: E,
    transport: T,
    sleeper: Arc<dyn Sleeper>,
}

impl<D: DatasetsClient, E: EutilsClient, T: FileTransport> App<D, E, T> {
    pub fn new(datasets: D, eutils: E, transport: T) -> Self {
        Self {
            datasets,
            eutils,
            transport,
            sleeper: Arc::new(ThreadSleeper),
        }
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn run(&self, config: &ResolvedConfig) -> Result<RunResult, NcbiDataError> {
        let started_at = iso_timestamp();
        let span = info_span!("taxon_run", taxid = %config.taxid);
        let retrier = Retrier::new(config.retry, self.sleeper.clone());
        let layout = OutputLayout::new(config.outdir.clone());

        span.in_scope(|| info!("start processing tax id"));
        let accessions = AccessionDiscovery::new(&self.datasets, &retrier, config.page_size, &span)
            .discover(&config.taxid)?;

        layout.ensure_root()?;
        let report_path = layout.report_path(&config.taxid);
        let mut writer = ReportWriter::create(report_path.as_std_path())?;
        EnrichmentPipeline::new(&self.eutils, &retrier, config.throttle, &span)
            .enrich_into(&accessions, &mut writer)?;
        let report_rows = writer.finish()?;
        span.in_scope(|| info!(path = %report_path, rows = report_rows, "assembly report written"));

        let download = if config.download_files {
            let kinds: Vec<String> = config.file_kinds.iter().map(ToString::to_string).collect();
            let summary = FileRetriever::new(&self.transport, &layout, &span)
                .with_decompress(config.decompress)
                .retrieve(report_path.as_std_path(), &kinds)?;
            let summary_path = layout.download_summary_path(&config.taxid);
            summary.write_csv(summary_path.as_std_path())?;
            span.in_scope(|| info!(path = %summary_path, "download summary written"));
            Some(DownloadResult {
                summary_path: summary_path.to_string(),
                accessions: summary
                    .entries
                    .iter()
                    .map(|entry| DownloadedAccession {
                        accession: entry.accession.clone(),
                        downloaded_files: entry.downloaded_files(),
                    })
                    .collect(),
            })
        } else {
            None
        };

        Ok(RunResult {
            taxid: config.taxid.to_string(),
            accessions: accessions.len(),
            report_path: report_path.to_string(),
            report_rows,
            download,
            started_at,
            finished_at: iso_timestamp(),
        })
    }
}

fn iso_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}
