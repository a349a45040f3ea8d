use anyhow::{bail, Result};
use clap::Parser;

#[derive(Parser)]
#[command(version)]
#[command(about = "Haplosplit: protein-evidence haplotype separation of polyploid assemblies", long_about = None)]
pub struct Options {

    /// Input assembly in FASTA format
    #[arg(short = 'a', long = "assembly", value_name = "PATH")]
    pub assembly_file: String,

    /// Input proteins in FASTA format
    #[arg(short = 'p', long = "proteins", value_name = "PATH")]
    pub proteins_file: String,

    /// Expected ploidy of the assembly
    #[arg(short = 'n', long = "ploidy", value_name = "NUM")]
    pub ploidy: usize,

    /// Output directory
    #[arg(short = 'o', long = "out-dir", value_name = "PATH", default_value = ".")]
    pub output_dir: String,

    /// Prefix of the output haplotype files
    #[arg(long = "output", value_name = "STR", default_value = "hap_")]
    pub output_prefix: String,

    /// Maximum number of threads for protein alignment
    #[arg(short = 't', long = "threads", value_name = "NUM", default_value_t = 4)]
    pub nb_threads: usize,

    /// Optimization time budget in seconds
    #[arg(long = "optime", value_name = "NUM", default_value_t = 900)]
    pub optime: usize,

    /// Verbosity level of the external solver
    #[arg(long = "solver-verbosity", value_name = "NUM", default_value_t = 0)]
    pub solver_verbosity: usize,

    /// Write contigs without protein evidence to <PREFIX>unplaced.fasta
    #[arg(long = "write-unplaced")]
    pub write_unplaced: bool,
}


impl Options {

    /// Rejects invalid configurations before any file is written.
    pub fn validate(&self) -> Result<()> {
        if self.ploidy < 2 {
            bail!("ploidy must be at least 2 (got {})", self.ploidy);
        }
        if self.optime == 0 {
            bail!("optimization time budget must be a positive number of seconds");
        }
        if self.nb_threads == 0 {
            bail!("number of threads must be positive");
        }
        Ok(())
    }
}
