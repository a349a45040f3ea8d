use std::path::Path;

use ahash::AHashMap as HashMap;
use anyhow::{bail, Context, Result};


/// Assembly sequences indexed by name, in file order.
pub struct SeqDatabase {
    pub names: Vec<String>,
    pub sequences: Vec<Vec<u8>>,
    index: HashMap<String, usize>,
}


impl SeqDatabase {

    pub fn from_fasta(fasta_path: &Path) -> Result<SeqDatabase> {
        let mut db = SeqDatabase {
            names: Vec::new(),
            sequences: Vec::new(),
            index: HashMap::new(),
        };

        let mut fasta_reader = needletail::parse_fastx_file(fasta_path)
            .with_context(|| format!("cannot open fasta file \"{}\"", fasta_path.display()))?;
        while let Some(record) = fasta_reader.next() {
            let record = record
                .with_context(|| format!("error parsing fasta file \"{}\"", fasta_path.display()))?;
            // the sequence name is the header up to the first whitespace,
            // matching the target names reported by the aligner
            let header = record.id();
            let name_end = header.iter().position(|&b| b == b' ' || b == b'\t').unwrap_or(header.len());
            let name = String::from_utf8_lossy(&header[..name_end]).to_string();
            if db.index.contains_key(&name) {
                bail!("duplicate sequence name \"{name}\" in \"{}\"", fasta_path.display());
            }
            db.index.insert(name.clone(), db.names.len());
            db.names.push(name);
            db.sequences.push(record.seq().to_vec());
        }

        Ok(db)
    }

    pub fn size(&self) -> usize {
        self.names.len()
    }

    pub fn get_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn load_fasta() {
        let mut fasta = tempfile::NamedTempFile::with_suffix(".fasta").unwrap();
        write!(fasta, ">ctg1\nACGTACGT\nACGT\n>ctg2 description\nTTTT\n").unwrap();
        let db = SeqDatabase::from_fasta(fasta.path()).unwrap();
        assert_eq!(db.size(), 2);
        assert_eq!(db.names, vec!["ctg1", "ctg2"]);
        assert_eq!(db.sequences[0], b"ACGTACGTACGT");
        assert_eq!(db.get_index("ctg2"), Some(1));
        assert!(!db.contains("ctg3"));
    }

    #[test]
    fn duplicate_names_rejected() {
        let mut fasta = tempfile::NamedTempFile::with_suffix(".fasta").unwrap();
        write!(fasta, ">ctg1\nACGT\n>ctg1\nTTTT\n").unwrap();
        assert!(SeqDatabase::from_fasta(fasta.path()).is_err());
    }
}
