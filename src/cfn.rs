use std::io::Write;
use std::path::Path;

use anyhow::{bail, Context, Result};
use itertools::Itertools;

use crate::graph::ConflictGraph;


/// Prohibitive cost: any assignment paying it cannot be part of a finite-cost
/// optimum, so unary tables using it act as hard constraints.
pub const TOP_COST: u64 = 100_000_000;


/// Pairwise cost table for an edge of weight `weight`, flattened domain-major
/// (row = first variable's label, column = second variable's label). Equal
/// labels pay the edge weight, different labels pay nothing, so minimizing
/// total cost maximizes the edge weight cut across haplotypes.
pub fn pairwise_costs(weight: u64, ploidy: usize) -> Vec<u64> {
    (0..ploidy).cartesian_product(0..ploidy)
        .map(|(row, col)| if row == col { weight } else { 0 })
        .collect_vec()
}


/// Unary symmetry-breaking table for the variable at declaration index
/// `var_index`: labels greater than the index are prohibitive. Applied to the
/// first `ploidy-1` variables, this forces one canonical representative per
/// label-permutation equivalence class without changing the reachable
/// minimum cost.
pub fn symmetry_costs(var_index: usize, ploidy: usize) -> Vec<u64> {
    (0..ploidy)
        .map(|label| if label > var_index { TOP_COST } else { 0 })
        .collect_vec()
}


/// Serializes the labeling problem as a cost-function network consumable by
/// toulbar2: one variable per contig in declaration order with domain
/// `{0..ploidy-1}`, one pairwise table per conflict edge and one unary table
/// per symmetry-breaking constraint. Written under a temporary name and
/// renamed on success.
pub fn write_cfn(graph: &ConflictGraph, ploidy: usize, cfn_path: &Path) -> Result<()> {

    if ploidy < 2 {
        bail!("ploidy must be at least 2 (got {ploidy})");
    }
    if graph.order() == 0 {
        bail!("no evidenced contigs, nothing to encode");
    }

    let tmp_path = cfn_path.with_extension("cfn.tmp");
    let mut writer = crate::utils::get_file_writer(&tmp_path)?;

    writeln!(writer, "{{")?;
    writeln!(writer, "\"problem\": {{\"name\": \"haplosplit\", \"mustbe\": \"<{TOP_COST}\"}},")?;

    let variables = graph.contigs().iter()
        .map(|contig| format!("\"{contig}\": {ploidy}"))
        .join(", ");
    writeln!(writer, "\"variables\": {{{variables}}},")?;

    writeln!(writer, "\"functions\": {{")?;
    let mut functions = Vec::with_capacity(graph.size() + ploidy - 1);
    for &(i, j, weight) in graph.edges() {
        let costs = pairwise_costs(weight, ploidy).iter().join(", ");
        functions.push(format!(
            "\"cut_{i}_{j}\": {{\"scope\": [\"{}\", \"{}\"], \"costs\": [{costs}]}}",
            graph.contigs()[i], graph.contigs()[j]
        ));
    }
    for var_index in 0..(ploidy - 1).min(graph.order()) {
        let costs = symmetry_costs(var_index, ploidy).iter().join(", ");
        functions.push(format!(
            "\"sym_{var_index}\": {{\"scope\": [\"{}\"], \"costs\": [{costs}]}}",
            graph.contigs()[var_index]
        ));
    }
    writeln!(writer, "{}", functions.join(",\n"))?;
    writeln!(writer, "}}")?;
    writeln!(writer, "}}")?;

    writer.flush()?;
    drop(writer);

    std::fs::rename(&tmp_path, cfn_path)
        .with_context(|| format!("cannot move file \"{}\" to \"{}\"", tmp_path.display(), cfn_path.display()))?;

    spdlog::debug!("encoded {} variables, {} cut functions, {} symmetry constraints",
        graph.order(), graph.size(), (ploidy - 1).min(graph.order()));

    Ok(())
}
