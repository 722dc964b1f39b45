use std::process::ExitCode;

use clap::Parser;
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use kira_ncbi_data::app::App;
use kira_ncbi_data::config::{ConfigLoader, ConfigOverrides};
use kira_ncbi_data::domain::FileKind;
use kira_ncbi_data::error::NcbiDataError;
use kira_ncbi_data::eutils::EutilsHttpClient;
use kira_ncbi_data::ftp::FtpHttpClient;
use kira_ncbi_data::ncbi::NcbiHttpClient;
use kira_ncbi_data::output::{JsonOutput, TextOutput};

#[derive(Parser)]
#[command(name = "kira-ncbi-data")]
#[command(about = "NCBI assembly report and genome file fetcher for a taxonomy id")]
#[command(version, author)]
struct Cli {
    #[arg(
        short = 'i',
        long = "tax-id",
        alias = "tax_id",
        help = "Query taxonomy id, e.g. 9606"
    )]
    tax_id: Option<String>,

    #[arg(
        short = 'd',
        long = "download-files",
        alias = "download_files",
        help = "Also download annotation files (gbk, fna, faa, gff, transcript_fna)"
    )]
    download_files: bool,

    #[arg(short = 'o', long, help = "Output directory (default: ./outdir)")]
    outdir: Option<String>,

    #[arg(
        long = "file-kind",
        value_enum,
        help = "File kind to download; repeat for several (default: all kinds)"
    )]
    file_kinds: Vec<FileKind>,

    #[arg(long, help = "Decompress downloaded files")]
    decompress: bool,

    #[arg(long, help = "JSON config file")]
    config: Option<String>,

    #[arg(long, help = "Print the run result as JSON")]
    json: bool,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(error) = report.downcast_ref::<NcbiDataError>() {
            return ExitCode::from(map_exit_code(error));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &NcbiDataError) -> u8 {
    match error {
        NcbiDataError::InvalidTaxid(_)
        | NcbiDataError::InvalidFileKind(_)
        | NcbiDataError::MissingTaxid
        | NcbiDataError::ConfigRead(_)
        | NcbiDataError::ConfigParse(_)
        | NcbiDataError::InvalidTable(_) => 2,
        NcbiDataError::NcbiHttp(_)
        | NcbiDataError::NcbiStatus { .. }
        | NcbiDataError::EutilsHttp(_)
        | NcbiDataError::EutilsStatus { .. }
        | NcbiDataError::SummaryMissing { .. }
        | NcbiDataError::RetriesExhausted { .. } => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let overrides = ConfigOverrides {
        taxid: cli.tax_id,
        download_files: cli.download_files,
        outdir: cli.outdir,
        file_kinds: (!cli.file_kinds.is_empty()).then_some(cli.file_kinds),
        decompress: cli.decompress,
    };
    let config = ConfigLoader::resolve(cli.config.as_deref(), overrides)?;

    let app = App::new(
        NcbiHttpClient::new()?,
        EutilsHttpClient::new()?,
        FtpHttpClient::new()?,
    );
    let result = app.run(&config)?;

    if cli.json {
        JsonOutput::print_run(&result).into_diagnostic()?;
    } else {
        TextOutput::print_run(&result);
    }
    Ok(())
}
