use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::process::{Command, Stdio};
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use itertools::Itertools;

use crate::cli::Options;


/// A protein-to-contig alignment record (one PAF line produced by miniprot).
/// The query is a protein, the target a contig of the assembly.
#[derive(Debug, Clone)]
pub struct ProteinAlignment {
    pub protein_name: String,
    pub protein_length: usize,
    pub protein_beg: usize,
    pub protein_end: usize,
    pub strand: u8,
    pub contig_name: String,
    pub contig_length: usize,
    pub contig_beg: usize,
    pub contig_end: usize,
    pub matches: usize, // exact matches
    pub mapping_length: usize,
    pub mapq: u8,
}


fn parse_paf_uint(cols: &[&str], idx: usize) -> Result<usize> {
    cols[idx].parse::<usize>()
        .with_context(|| format!("PAF field {} expected to be an unsigned integer: {}", idx + 1, cols[idx]))
}


impl FromStr for ProteinAlignment {

    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self> {

        let cols = line.split('\t').collect_vec();
        if cols.len() < 12 { bail!("cannot parse PAF line (missing fields)") }

        let protein_name = cols[0].to_string();
        let contig_name = cols[5].to_string();
        if protein_name.is_empty() || contig_name.is_empty() {
            bail!("cannot parse PAF line (empty sequence name)");
        }

        let strand = match cols[4] {
            "+" => b'+',
            "-" => b'-',
            _ => bail!("unrecognised strand field: {}", cols[4]),
        };

        Ok(ProteinAlignment {
            protein_name,
            protein_length: parse_paf_uint(&cols, 1)?,
            protein_beg: parse_paf_uint(&cols, 2)?,
            protein_end: parse_paf_uint(&cols, 3)?,
            strand,
            contig_name,
            contig_length: parse_paf_uint(&cols, 6)?,
            contig_beg: parse_paf_uint(&cols, 7)?,
            contig_end: parse_paf_uint(&cols, 8)?,
            matches: parse_paf_uint(&cols, 9)?,
            mapping_length: parse_paf_uint(&cols, 10)?,
            mapq: parse_paf_uint(&cols, 11)? as u8,
        })
    }
}


/// Aligns the protein set against the assembly with miniprot and returns the
/// parsed records. The raw PAF stream is persisted as `prot_align.paf` in the
/// output directory; the file is written under a temporary name and renamed
/// once miniprot has terminated successfully, so a truncated artifact can
/// never be mistaken for a complete one.
pub fn align_proteins(proteins_path: &Path, assembly_path: &Path, work_dir: &Path, opts: &Options) -> Result<Vec<ProteinAlignment>> {

    let proteins_str = proteins_path.to_str().context("invalid proteins path")?;
    let assembly_str = assembly_path.to_str().context("invalid assembly path")?;

    let nb_secondary = (opts.ploidy - 1).to_string();
    let nb_threads = opts.nb_threads.to_string();
    let args = ["-N", &nb_secondary, "-t", &nb_threads, assembly_str, proteins_str];

    spdlog::debug!("running command: miniprot {}", args.join(" "));
    let mut child = Command::new("miniprot").args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn().context("cannot run miniprot")?;
    let stdout = child.stdout.take()
        .context("could not capture miniprot standard output")?;

    let paf_path = work_dir.join("prot_align.paf");
    let tmp_path = work_dir.join("prot_align.paf.tmp");
    let mut paf_writer = crate::utils::get_file_writer(&tmp_path)?;

    let mut alignments = Vec::new();
    for line in BufReader::new(stdout).lines() {
        let line = line.context("error reading miniprot output")?;
        let line = line.trim();
        if line.is_empty() {
            continue
        }
        paf_writer.write_all(line.as_bytes())?;
        paf_writer.write_all(b"\n")?;
        let alignment = ProteinAlignment::from_str(line)
            .with_context(|| format!("error parsing PAF line:\n{line}"))?;
        alignments.push(alignment);
    }
    paf_writer.flush()?;
    drop(paf_writer);

    let status = child.wait().context("miniprot did not terminate properly")?;
    if !status.success() {
        bail!("miniprot exited with status {status}");
    }
    if alignments.is_empty() {
        bail!("miniprot produced no protein alignments, nothing to separate");
    }

    std::fs::rename(&tmp_path, &paf_path)
        .with_context(|| format!("cannot move file \"{}\" to \"{}\"", tmp_path.display(), paf_path.display()))?;

    Ok(alignments)
}
