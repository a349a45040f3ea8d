use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::{bail, Context, Result};

use crate::cli::Options;


/// Compresses the instance in place with xz (`file.cfn` -> `file.cfn.xz`).
fn compress_instance(cfn_path: &Path) -> Result<PathBuf> {
    let cfn_str = cfn_path.to_str().context("invalid instance path")?;
    let status = Command::new("xz").args(["-f", "-z", cfn_str])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status().context("cannot run xz")?;
    if !status.success() {
        bail!("xz exited with status {status}");
    }
    let xz_path = cfn_path.with_extension("cfn.xz");
    if !xz_path.is_file() {
        bail!("compressed instance \"{}\" was not produced", xz_path.display());
    }
    Ok(xz_path)
}


/// Runs toulbar2 on the encoded instance with a wall-clock time budget.
/// toulbar2 has anytime semantics: within the budget it returns the best
/// labeling found, which is feasible but not necessarily optimal. The
/// verbosity level is passed explicitly on the command line.
pub fn solve(cfn_path: &Path, work_dir: &Path, opts: &Options) -> Result<Vec<usize>> {

    let xz_path = compress_instance(cfn_path)?;
    let xz_str = xz_path.to_str().context("invalid instance path")?;

    let solution_path = work_dir.join("solution");
    let solution_str = solution_path.to_str().context("invalid solution path")?;

    let write_arg = format!("-w={solution_str}");
    let timer_arg = format!("-timer={}", opts.optime);
    let verbose_arg = format!("-v={}", opts.solver_verbosity);
    let args = ["-vns", xz_str, "-s=3", &write_arg, &timer_arg, &verbose_arg];

    spdlog::debug!("running command: toulbar2 {}", args.join(" "));
    let mut command = Command::new("toulbar2");
    command.args(args).stderr(Stdio::null());
    if opts.solver_verbosity == 0 {
        command.stdout(Stdio::null());
    }
    let status = command.status().context("cannot run toulbar2")?;
    if !status.success() {
        bail!("toulbar2 exited with status {status}");
    }

    read_solution(&solution_path)
}


/// Parses the solver output: a single line of whitespace-separated labels,
/// one per declared variable in declaration order. An absent or malformed
/// file is a hard failure, never an empty labeling.
pub fn read_solution(path: &Path) -> Result<Vec<usize>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("solution file \"{}\" not found", path.display()))?;
    let line = match content.lines().next() {
        Some(line) if !line.trim().is_empty() => line,
        _ => bail!("solution file \"{}\" is empty", path.display()),
    };
    line.split_whitespace()
        .map(|field| {
            field.parse::<usize>()
                .with_context(|| format!("malformed label in solution file: {field}"))
        })
        .collect()
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solution_parse() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("solution");
        std::fs::write(&path, "0 1 0 2\n").unwrap();
        assert_eq!(read_solution(&path).unwrap(), vec![0, 1, 0, 2]);
    }

    #[test]
    fn solution_first_line_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("solution");
        std::fs::write(&path, "1 0\n0 1\n").unwrap();
        assert_eq!(read_solution(&path).unwrap(), vec![1, 0]);
    }

    #[test]
    fn missing_solution_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_solution(&dir.path().join("solution")).is_err());
    }

    #[test]
    fn empty_solution_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("solution");
        std::fs::write(&path, "\n").unwrap();
        assert!(read_solution(&path).is_err());
    }

    #[test]
    fn malformed_solution_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("solution");
        std::fs::write(&path, "0 x 1\n").unwrap();
        assert!(read_solution(&path).is_err());
    }
}
