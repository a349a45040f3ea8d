use std::io::{BufRead, Write};
use std::path::Path;

use ahash::{AHashMap as HashMap, AHashSet as HashSet};
use anyhow::{bail, Context, Result};
use itertools::Itertools;

use crate::align::ProteinAlignment;


/// Protein evidence aggregated per contig. Contigs are kept in first-seen
/// order; this order is the variable declaration order of the optimization
/// instance and must therefore be stable across encoding and decoding.
pub struct Evidence {
    contigs: Vec<String>,
    proteins: Vec<HashSet<String>>,
    index: HashMap<String, usize>,
}


impl Evidence {

    fn new() -> Evidence {
        Evidence {
            contigs: Vec::new(),
            proteins: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Groups alignment records by contig: each evidenced contig maps to the
    /// set of proteins that aligned to it.
    pub fn from_alignments(alignments: &[ProteinAlignment]) -> Evidence {
        let mut evidence = Evidence::new();
        for a in alignments {
            let contig_idx = evidence.get_or_insert(&a.contig_name);
            evidence.proteins[contig_idx].insert(a.protein_name.clone());
        }
        evidence
    }

    fn get_or_insert(&mut self, contig_name: &str) -> usize {
        match self.index.get(contig_name) {
            Some(&idx) => idx,
            None => {
                let idx = self.contigs.len();
                self.index.insert(contig_name.to_string(), idx);
                self.contigs.push(contig_name.to_string());
                self.proteins.push(HashSet::new());
                idx
            }
        }
    }

    /// Number of evidenced contigs.
    pub fn len(&self) -> usize {
        self.contigs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contigs.is_empty()
    }

    /// Evidenced contig names in declaration order.
    pub fn contigs(&self) -> &[String] {
        &self.contigs
    }

    pub fn protein_set(&self, contig_idx: usize) -> &HashSet<String> {
        &self.proteins[contig_idx]
    }

    /// Writes the link file: one line per evidenced contig, in declaration
    /// order, `contig<TAB>protein1,protein2,...`. Protein names are sorted so
    /// that two runs on the same input produce byte-identical files.
    pub fn write_link_file(&self, path: &Path) -> Result<()> {
        let tmp_path = path.with_extension("links.tmp");
        let mut writer = crate::utils::get_file_writer(&tmp_path)?;
        for (contig, proteins) in self.contigs.iter().zip(&self.proteins) {
            let proteins = proteins.iter().sorted_unstable().join(",");
            writeln!(writer, "{contig}\t{proteins}")?;
        }
        writer.flush()?;
        drop(writer);
        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("cannot move file \"{}\" to \"{}\"", tmp_path.display(), path.display()))?;
        Ok(())
    }

    /// Reads a link file back into an evidence map, preserving line order as
    /// declaration order. A line without exactly two tab-separated fields is
    /// a fatal input error: silently dropping it would silently change the
    /// optimization model.
    pub fn from_link_file(path: &Path) -> Result<Evidence> {
        let mut evidence = Evidence::new();
        let reader = crate::utils::get_file_reader(path)?;
        for (line_idx, line) in reader.lines().enumerate() {
            let line = line.with_context(|| format!("error reading link file \"{}\"", path.display()))?;
            if line.trim().is_empty() {
                continue
            }
            let cols = line.split('\t').collect_vec();
            if cols.len() != 2 {
                bail!("malformed link file line {} (expected 2 tab-separated fields, found {})", line_idx + 1, cols.len());
            }
            if evidence.index.contains_key(cols[0]) {
                bail!("duplicate contig \"{}\" at link file line {}", cols[0], line_idx + 1);
            }
            let contig_idx = evidence.get_or_insert(cols[0]);
            for protein in cols[1].split(',') {
                if protein.is_empty() {
                    bail!("malformed link file line {} (empty protein name)", line_idx + 1);
                }
                evidence.proteins[contig_idx].insert(protein.to_string());
            }
        }
        Ok(evidence)
    }
}
