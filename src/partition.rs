use std::io::Write;
use std::path::{Path, PathBuf};

use ahash::AHashSet as HashSet;
use anyhow::{bail, Context, Result};

use crate::seq::SeqDatabase;

const FASTA_LINE_WIDTH: usize = 120;


/// Haplotype groups decoded from a solver labeling. Group `i` (0-based) holds
/// the contigs assigned to haplotype `i+1`.
pub struct HaplotypePartition {
    groups: Vec<Vec<String>>,
}


impl HaplotypePartition {

    /// Decodes a labeling into haplotype groups. `contigs` must be the same
    /// declaration-ordered list the instance was encoded from; the label at
    /// position `j` belongs to the contig at position `j`. Cardinality and
    /// label-range mismatches are hard failures since they would silently
    /// corrupt the partition.
    pub fn from_labels(contigs: &[String], labels: &[usize], ploidy: usize) -> Result<HaplotypePartition> {
        if labels.len() != contigs.len() {
            bail!("solution size ({}) does not match the number of declared contigs ({})", labels.len(), contigs.len());
        }
        let mut groups = vec![Vec::new(); ploidy];
        for (contig, &label) in contigs.iter().zip(labels) {
            if label >= ploidy {
                bail!("haplotype label {label} of contig \"{contig}\" is out of range for ploidy {ploidy}");
            }
            groups[label].push(contig.clone());
        }
        Ok(HaplotypePartition { groups })
    }

    pub fn ploidy(&self) -> usize {
        self.groups.len()
    }

    /// Contigs of haplotype `hap` (1-based).
    pub fn haplotype(&self, hap: usize) -> &[String] {
        &self.groups[hap - 1]
    }

    /// Contigs of the sequence store that carry no protein evidence and
    /// therefore belong to no haplotype group.
    pub fn unplaced<'a>(&self, seq_db: &'a SeqDatabase) -> Vec<&'a str> {
        let placed: HashSet<&str> = self.groups.iter()
            .flatten()
            .map(String::as_str)
            .collect();
        seq_db.names.iter()
            .map(String::as_str)
            .filter(|name| !placed.contains(name))
            .collect()
    }

    /// Writes one FASTA file per haplotype, `<prefix><i>.fasta` for `i` in
    /// `1..=ploidy`, each holding the sequences assigned to that haplotype.
    pub fn write_fasta(&self, seq_db: &SeqDatabase, work_dir: &Path, prefix: &str) -> Result<Vec<PathBuf>> {
        let mut paths = Vec::with_capacity(self.groups.len());
        for (group_idx, group) in self.groups.iter().enumerate() {
            let path = work_dir.join(format!("{prefix}{}.fasta", group_idx + 1));
            write_fasta_records(seq_db, group.iter().map(String::as_str), &path)?;
            paths.push(path);
        }
        Ok(paths)
    }
}


/// Writes contigs without protein evidence to `<prefix>unplaced.fasta`.
pub fn write_unplaced_fasta(seq_db: &SeqDatabase, unplaced: &[&str], work_dir: &Path, prefix: &str) -> Result<PathBuf> {
    let path = work_dir.join(format!("{prefix}unplaced.fasta"));
    write_fasta_records(seq_db, unplaced.iter().copied(), &path)?;
    Ok(path)
}


fn write_fasta_records<'a>(seq_db: &SeqDatabase, names: impl Iterator<Item = &'a str>, path: &Path) -> Result<()> {
    let mut writer = crate::utils::get_file_writer(path)?;
    for name in names {
        let seq_idx = seq_db.get_index(name)
            .with_context(|| format!("contig \"{name}\" not found in the assembly"))?;
        writer.write_all(format!(">{name}\n").as_bytes())?;
        for chunk in seq_db.sequences[seq_idx].chunks(FASTA_LINE_WIDTH) {
            writer.write_all(chunk)?;
            writer.write_all(b"\n")?;
        }
    }
    writer.flush()?;
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as IoWrite;

    fn contig_names(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn labels_to_groups() {
        // diploid end-to-end scenario: labeling c1=0, c2=1, c3=0
        let contigs = contig_names(&["c1", "c2", "c3"]);
        let partition = HaplotypePartition::from_labels(&contigs, &[0, 1, 0], 2).unwrap();
        assert_eq!(partition.ploidy(), 2);
        assert_eq!(partition.haplotype(1), &["c1", "c3"]);
        assert_eq!(partition.haplotype(2), &["c2"]);
    }

    #[test]
    fn every_evidenced_contig_in_exactly_one_group() {
        let contigs = contig_names(&["c1", "c2", "c3", "c4", "c5"]);
        let partition = HaplotypePartition::from_labels(&contigs, &[0, 2, 1, 2, 0], 3).unwrap();
        let mut seen = Vec::new();
        for hap in 1..=partition.ploidy() {
            seen.extend_from_slice(partition.haplotype(hap));
        }
        seen.sort_unstable();
        assert_eq!(seen, contigs);
    }

    #[test]
    fn cardinality_mismatch_is_an_error() {
        let contigs = contig_names(&["c1", "c2"]);
        assert!(HaplotypePartition::from_labels(&contigs, &[0], 2).is_err());
        assert!(HaplotypePartition::from_labels(&contigs, &[0, 1, 0], 2).is_err());
    }

    #[test]
    fn out_of_range_label_is_an_error() {
        let contigs = contig_names(&["c1", "c2"]);
        assert!(HaplotypePartition::from_labels(&contigs, &[0, 2], 2).is_err());
    }

    fn test_seq_db() -> SeqDatabase {
        let mut fasta = tempfile::NamedTempFile::with_suffix(".fasta").unwrap();
        write!(fasta, ">c1\nAAAA\n>c2\nCCCC\n>c3\nGGGG\n>c4\nTTTT\n").unwrap();
        SeqDatabase::from_fasta(fasta.path()).unwrap()
    }

    #[test]
    fn fasta_output_per_haplotype() {
        let seq_db = test_seq_db();
        let contigs = contig_names(&["c1", "c2", "c3"]);
        let partition = HaplotypePartition::from_labels(&contigs, &[0, 1, 0], 2).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let paths = partition.write_fasta(&seq_db, dir.path(), "hap_").unwrap();
        assert_eq!(paths.len(), 2);
        assert!(paths[0].ends_with("hap_1.fasta"));

        let hap1 = std::fs::read_to_string(&paths[0]).unwrap();
        assert_eq!(hap1, ">c1\nAAAA\n>c3\nGGGG\n");
        let hap2 = std::fs::read_to_string(&paths[1]).unwrap();
        assert_eq!(hap2, ">c2\nCCCC\n");
    }

    #[test]
    fn contigs_without_evidence_are_unplaced() {
        let seq_db = test_seq_db();
        let contigs = contig_names(&["c1", "c2", "c3"]);
        let partition = HaplotypePartition::from_labels(&contigs, &[0, 1, 0], 2).unwrap();
        assert_eq!(partition.unplaced(&seq_db), vec!["c4"]);

        let dir = tempfile::tempdir().unwrap();
        let path = write_unplaced_fasta(&seq_db, &["c4"], dir.path(), "hap_").unwrap();
        assert!(path.ends_with("hap_unplaced.fasta"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), ">c4\nTTTT\n");
    }

    #[test]
    fn long_sequences_are_wrapped() {
        let mut fasta = tempfile::NamedTempFile::with_suffix(".fasta").unwrap();
        let sequence = "A".repeat(250);
        write!(fasta, ">c1\n{sequence}\n").unwrap();
        let seq_db = SeqDatabase::from_fasta(fasta.path()).unwrap();

        let contigs = contig_names(&["c1"]);
        let partition = HaplotypePartition::from_labels(&contigs, &[0], 2).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let paths = partition.write_fasta(&seq_db, dir.path(), "hap_").unwrap();

        let content = std::fs::read_to_string(&paths[0]).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        let expected = vec![">c1".to_string(), "A".repeat(120), "A".repeat(120), "A".repeat(10)];
        assert_eq!(lines, expected);
    }
}
