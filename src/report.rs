use std::fs::File;
use std::path::Path;

use crate::error::NcbiDataError;
use crate::eutils::AssemblySummary;
use crate::markup::SequenceStats;

pub const REPORT_COLUMNS: [&str; 30] = [
    "AssemblyAccession",
    "SRA",
    "Organism",
    "SpeciesName",
    "Taxid",
    "AssemblyStatus",
    "BioSampleAccn",
    "BioSampleId",
    "BioprojectAccn",
    "Coverage",
    "ContigN50",
    "contig_count",
    "contig_l50",
    "scaffold_n50",
    "scaffold_count",
    "scaffold_l50",
    "total_length",
    "RefSeq_category",
    "PartialGenomeRepresentation",
    "full-genome-representation",
    "genbank_has_annotation",
    "refseq_has_annotation",
    "has_annotation",
    "WGS",
    "Platform",
    "FtpPath_GenBank",
    "FtpPath_RefSeq",
    "LastMajorReleaseAccession",
    "LastUpdateDate",
    "SubmitterOrganization",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnnotationFlags {
    pub full_genome_representation: bool,
    pub genbank_has_annotation: bool,
    pub refseq_has_annotation: bool,
    pub wgs: bool,
    pub has_annotation: bool,
}

impl AnnotationFlags {
    pub fn from_properties<S: AsRef<str>>(properties: &[S]) -> Self {
        let has = |name: &str| properties.iter().any(|p| p.as_ref() == name);
        Self {
            full_genome_representation: has("full-genome-representation"),
            genbank_has_annotation: has("genbank_has_annotation"),
            refseq_has_annotation: has("refseq_has_annotation"),
            wgs: has("wgs"),
            has_annotation: has("has_annotation"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SraLinkage {
    pub runs: Vec<String>,
    pub platforms: Vec<String>,
}

impl SraLinkage {
    pub fn runs_joined(&self) -> String {
        self.runs.join(";")
    }

    pub fn platforms_joined(&self) -> String {
        self.platforms.join(";")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyRecord {
    pub assembly_accession: String,
    pub sra: String,
    pub organism: String,
    pub species_name: String,
    pub taxid: String,
    pub assembly_status: String,
    pub biosample_accn: String,
    pub biosample_id: String,
    pub bioproject_accn: String,
    pub coverage: String,
    pub contig_n50: String,
    pub contig_count: String,
    pub contig_l50: String,
    pub scaffold_n50: String,
    pub scaffold_count: String,
    pub scaffold_l50: String,
    pub total_length: String,
    pub refseq_category: String,
    pub partial_genome_representation: String,
    pub flags: AnnotationFlags,
    pub platform: String,
    pub ftp_path_genbank: String,
    pub ftp_path_refseq: String,
    pub last_major_release_accession: String,
    pub last_update_date: String,
    pub submitter_organization: String,
}

impl AssemblyRecord {
    pub fn new(summary: AssemblySummary, stats: &SequenceStats, linkage: &SraLinkage) -> Self {
        let flags = AnnotationFlags::from_properties(&summary.property_list);
        Self {
            assembly_accession: summary.assembly_accession,
            sra: linkage.runs_joined(),
            organism: summary.organism,
            species_name: summary.species_name,
            taxid: summary.taxid,
            assembly_status: summary.assembly_status,
            biosample_accn: summary.biosample_accn,
            biosample_id: summary.biosample_id,
            bioproject_accn: summary.bioproject_accn,
            coverage: summary.coverage,
            contig_n50: summary.contig_n50,
            contig_count: stats.get("contig_count").to_string(),
            contig_l50: stats.get("contig_l50").to_string(),
            scaffold_n50: stats.get("scaffold_n50").to_string(),
            scaffold_count: stats.get("scaffold_count").to_string(),
            scaffold_l50: stats.get("scaffold_l50").to_string(),
            total_length: stats.get("total_length").to_string(),
            refseq_category: summary.refseq_category,
            partial_genome_representation: summary.partial_genome_representation,
            flags,
            platform: linkage.platforms_joined(),
            ftp_path_genbank: summary.ftp_path_genbank,
            ftp_path_refseq: summary.ftp_path_refseq,
            last_major_release_accession: summary.last_major_release_accession,
            last_update_date: summary.last_update_date,
            submitter_organization: summary.submitter_organization,
        }
    }

    pub fn to_row(&self) -> [String; 30] {
        let flag = |value: bool| value.to_string();
        [
            self.assembly_accession.clone(),
            self.sra.clone(),
            self.organism.clone(),
            self.species_name.clone(),
            self.taxid.clone(),
            self.assembly_status.clone(),
            self.biosample_accn.clone(),
            self.biosample_id.clone(),
            self.bioproject_accn.clone(),
            self.coverage.clone(),
            self.contig_n50.clone(),
            self.contig_count.clone(),
            self.contig_l50.clone(),
            self.scaffold_n50.clone(),
            self.scaffold_count.clone(),
            self.scaffold_l50.clone(),
            self.total_length.clone(),
            self.refseq_category.clone(),
            self.partial_genome_representation.clone(),
            flag(self.flags.full_genome_representation),
            flag(self.flags.genbank_has_annotation),
            flag(self.flags.refseq_has_annotation),
            flag(self.flags.has_annotation),
            flag(self.flags.wgs),
            self.platform.clone(),
            self.ftp_path_genbank.clone(),
            self.ftp_path_refseq.clone(),
            self.last_major_release_accession.clone(),
            self.last_update_date.clone(),
            self.submitter_organization.clone(),
        ]
    }
}

pub trait ReportSink {
    fn push(&mut self, record: AssemblyRecord) -> Result<(), NcbiDataError>;
}

#[derive(Debug, Clone, Default)]
pub struct GenomeReport {
    pub rows: Vec<AssemblyRecord>,
}

impl GenomeReport {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl ReportSink for GenomeReport {
    fn push(&mut self, record: AssemblyRecord) -> Result<(), NcbiDataError> {
        self.rows.push(record);
        Ok(())
    }
}

pub struct ReportWriter {
    writer: csv::Writer<File>,
    rows: usize,
}

impl ReportWriter {
    pub fn create(path: &Path) -> Result<Self, NcbiDataError> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(path)
            .map_err(|err| NcbiDataError::Csv(format!("{}: {err}", path.display())))?;
        writer
            .write_record(REPORT_COLUMNS)
            .map_err(|err| NcbiDataError::Csv(err.to_string()))?;
        writer
            .flush()
            .map_err(|err| NcbiDataError::Filesystem(err.to_string()))?;
        Ok(Self {
            writer,
            rows: 0,
        })
    }

    pub fn finish(mut self) -> Result<usize, NcbiDataError> {
        self.writer
            .flush()
            .map_err(|err| NcbiDataError::Filesystem(err.to_string()))?;
        Ok(self.rows)
    }
}

impl ReportSink for ReportWriter {
    fn push(&mut self, record: AssemblyRecord) -> Result<(), NcbiDataError> {
        self.writer
            .write_record(record.to_row())
            .map_err(|err| NcbiDataError::Csv(err.to_string()))?;
        self.writer
            .flush()
            .map_err(|err| NcbiDataError::Filesystem(err.to_string()))?;
        self.rows += 1;
        Ok(())
    }
}
