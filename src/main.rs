use std::fs;
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;

use haplosplit::{align, cfn, cli, evidence, graph, partition, seq, solver, utils};


fn main() {

    let t_start = Instant::now();

    let opts = cli::Options::parse();

    if let Err(err) = run(&opts) {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }

    println!("Finished!");
    println!("Time: {:.2}s | MaxRSS: {:.2}GB", t_start.elapsed().as_secs_f64(), utils::get_maxrss());
}


fn run(opts: &cli::Options) -> Result<()> {

    opts.validate()?;
    utils::check_dependencies(&["miniprot", "toulbar2", "xz"])?;

    let output_dir = Path::new(&opts.output_dir);
    fs::create_dir_all(output_dir)
        .with_context(|| format!("cannot create output directory: \"{}\"", output_dir.display()))?;

    let assembly_path = Path::new(&opts.assembly_file);
    println!("Loading sequences from: {}", assembly_path.display());
    let seq_db = seq::SeqDatabase::from_fasta(assembly_path)?;
    println!("  {} sequences loaded", seq_db.size());

    println!("Aligning proteins (this can take some time)");
    let alignments = align::align_proteins(Path::new(&opts.proteins_file), assembly_path, output_dir, opts)
        .context("protein alignment failed")?;
    println!("  {} protein alignments", alignments.len());

    let evidence = evidence::Evidence::from_alignments(&alignments);
    evidence.write_link_file(&output_dir.join("prot.links"))
        .context("cannot write protein link file")?;
    println!("  {} contigs with protein links", evidence.len());

    println!("Building conflict graph");
    let conflict_graph = graph::ConflictGraph::from_evidence(&evidence);
    println!("  {} contigs, {} edges", conflict_graph.order(), conflict_graph.size());

    println!("Writing constraint file");
    let cfn_path = output_dir.join("constraints.cfn");
    cfn::write_cfn(&conflict_graph, opts.ploidy, &cfn_path)
        .context("cannot encode the optimization instance")?;

    println!("Solving constraints, this will run at most {} seconds", opts.optime);
    let labels = solver::solve(&cfn_path, output_dir, opts)
        .context("constraint solving failed")?;
    println!("  {} contigs to classify, solution size {}", conflict_graph.order(), labels.len());

    let haplotypes = partition::HaplotypePartition::from_labels(conflict_graph.contigs(), &labels, opts.ploidy)?;

    println!("Writing haplotype files");
    haplotypes.write_fasta(&seq_db, output_dir, &opts.output_prefix)
        .context("cannot write haplotype files")?;

    let unplaced = haplotypes.unplaced(&seq_db);
    if !unplaced.is_empty() {
        // contigs without protein evidence are absent from the model and are
        // not assigned to any haplotype
        println!("  {} contigs without protein evidence left unplaced", unplaced.len());
        if opts.write_unplaced {
            let path = partition::write_unplaced_fasta(&seq_db, &unplaced, output_dir, &opts.output_prefix)
                .context("cannot write unplaced contigs")?;
            println!("  unplaced contigs written to: {}", path.display());
        }
    }

    Ok(())
}
