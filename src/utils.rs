use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::mem::MaybeUninit;
use std::path::Path;

use anyhow::{bail, Context, Result};
use flate2::read::MultiGzDecoder;


pub fn get_maxrss() -> f64 {
    let usage = unsafe {
        let mut usage = MaybeUninit::uninit();
        assert_eq!(libc::getrusage(libc::RUSAGE_SELF, usage.as_mut_ptr()), 0);
        usage.assume_init()
    };
    usage.ru_maxrss as f64 / (1024.0 * 1024.0)
}


pub fn get_file_reader(path: &Path) -> Result<Box<dyn BufRead>> {
    let file = File::open(path)
        .with_context(|| format!("cannot open file \"{}\"", path.display()))?;
    let reader: Box<dyn BufRead> = match path.extension() {
        Some(ext) if ext == "gz" => Box::new(BufReader::new(MultiGzDecoder::new(file))),
        _ => Box::new(BufReader::new(file)),
    };
    Ok(reader)
}


pub fn get_file_writer(path: &Path) -> Result<Box<dyn Write>> {
    let file = File::create(path)
        .with_context(|| format!("cannot create file \"{}\"", path.display()))?;
    Ok(Box::new(BufWriter::new(file)))
}


/// Checks that every external tool is available in the system PATH.
/// All tools are probed before reporting, so a single run surfaces every
/// missing dependency at once.
pub fn check_dependencies(tools: &[&str]) -> Result<()> {
    let mut missing: Vec<&str> = Vec::new();
    for &tool in tools {
        match which::which(tool) {
            Ok(path) => spdlog::debug!("found {tool}: {}", path.display()),
            Err(_) => {
                println!("The {tool} command is not accessible");
                missing.push(tool);
            }
        }
    }
    if !missing.is_empty() {
        bail!("missing dependencies ({}), please check your system PATH", missing.join(", "));
    }
    Ok(())
}
