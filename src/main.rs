use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use log::{info, warn};

use seedmap::align::{AlignMode, Scoring};
use seedmap::index::{IndexMeta, MinimizerIndex};
use seedmap::io::{self, paf::PafWriter, stats};
use seedmap::map::{MapOpt, Mapper};
use seedmap::seq::Sequence;
use seedmap::util::logging;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Parser, Debug)]
#[command(name = "seedmap", author, version, about = "Minimizer seed-and-extend fragment mapper", arg_required_else_help = true)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build a minimizer index of the reference
    Index {
        /// Reference FASTA/FASTQ file (first record is used)
        reference: PathBuf,
        /// Output prefix; the index is written to <prefix>.mmi
        #[arg(short, long, default_value = "ref")]
        output: String,
        #[arg(short = 'k', default_value_t = 15)]
        k: usize,
        #[arg(short = 'w', default_value_t = 25)]
        w: usize,
        /// Fraction of the most frequent minimizers to discard
        #[arg(short = 'f', default_value_t = 0.001)]
        f: f64,
    },
    /// Map fragments onto the reference
    Map {
        /// Reference FASTA/FASTQ file (first record is used)
        reference: PathBuf,
        /// Fragments FASTA/FASTQ file
        fragments: PathBuf,
        /// Prebuilt index (.mmi); built on the fly if omitted
        #[arg(short = 'i', long = "index")]
        index: Option<PathBuf>,
        /// Output path (output_<date>_<time>.txt if omitted)
        #[arg(short, long)]
        out: Option<PathBuf>,
        #[arg(short = 'k', default_value_t = 15)]
        k: usize,
        #[arg(short = 'w', default_value_t = 25)]
        w: usize,
        #[arg(short = 'f', default_value_t = 0.001)]
        f: f64,
        #[arg(long = "match", default_value_t = 1, allow_hyphen_values = true)]
        match_score: i32,
        #[arg(long = "mismatch", default_value_t = -1, allow_hyphen_values = true)]
        mismatch_score: i32,
        #[arg(long = "gap", default_value_t = -1, allow_hyphen_values = true)]
        gap_score: i32,
        #[arg(short = 't', long = "threads", default_value_t = 1)]
        threads: usize,
        /// Per-fragment wall-clock limit in seconds
        #[arg(long = "timeout")]
        timeout: Option<f64>,
        #[arg(long = "mode", value_enum, default_value_t = AlignMode::Global)]
        mode: AlignMode,
        /// Append a CIGAR tag to each record (global mode only)
        #[arg(long = "cigar")]
        cigar: bool,
        /// Skip fragments longer than this
        #[arg(long = "max-fragment-len")]
        max_fragment_len: Option<usize>,
        /// Map at most this many fragments
        #[arg(long = "limit")]
        limit: Option<usize>,
    },
    /// Print (contig_count, min, max, avg, n_50) of a sequence file
    Stats {
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Commands::Index { reference, output, k, w, f } => run_index(&reference, &output, k, w, f),
        Commands::Map {
            reference,
            fragments,
            index,
            out,
            k,
            w,
            f,
            match_score,
            mismatch_score,
            gap_score,
            threads,
            timeout,
            mode,
            cigar,
            max_fragment_len,
            limit,
        } => {
            let timeout = timeout.map(parse_timeout).transpose()?;
            let opt = MapOpt {
                k,
                w,
                f,
                scoring: Scoring { match_score, mismatch_score, gap_score },
                mode,
                threads,
                timeout,
                emit_cigar: cigar,
            };
            let out = out.unwrap_or_else(default_output_path);
            run_map(&reference, &fragments, index.as_deref(), &out, opt, max_fragment_len, limit)
        }
        Commands::Stats { file } => run_stats(&file),
    }
}

fn parse_timeout(secs: f64) -> Result<Duration> {
    if !(secs.is_finite() && secs > 0.0) {
        bail!("--timeout must be a positive number of seconds, got {}", secs);
    }
    match Duration::try_from_secs_f64(secs) {
        Ok(d) => Ok(d),
        Err(e) => bail!("--timeout {} is out of range: {}", secs, e),
    }
}

fn default_output_path() -> PathBuf {
    PathBuf::from(chrono::Local::now().format("output_%Y-%m-%d_%H-%M-%S.txt").to_string())
}

fn load_reference(path: &Path) -> Result<Sequence> {
    let mut records = io::load_records(path)?;
    if records.is_empty() {
        bail!("reference file '{}' contains no sequences", path.display());
    }
    if records.len() > 1 {
        warn!("reference file '{}' holds {} records, only the first is used", path.display(), records.len());
    }
    let reference = records.swap_remove(0);
    if reference.is_empty() {
        bail!("reference '{}' is empty", reference.name);
    }
    Ok(reference)
}

fn run_index(reference: &Path, output: &str, k: usize, w: usize, f: f64) -> Result<()> {
    let seq = load_reference(reference)?;
    info!("Creating minimizer index for '{}' ({} bp)...", seq.name, seq.len());

    let mut index = MinimizerIndex::build(&seq.seq, k, w, f)
        .with_context(|| format!("cannot index reference '{}'", seq.name))?;
    index.set_meta(IndexMeta {
        reference_file: Some(reference.display().to_string()),
        reference_name: Some(seq.name.clone()),
        reference_len: Some(seq.len()),
        build_args: Some(std::env::args().collect::<Vec<_>>().join(" ")),
        build_timestamp: Some(chrono::Utc::now().to_rfc3339()),
    });

    println!("reference: {}", seq.name);
    println!("length:    {}", seq.len());
    println!("distinct:  {}", index.len());
    println!("filtered:  {}", index.filter().removed.len());

    let out_path = format!("{}.mmi", output);
    index
        .save_to_file(&out_path)
        .with_context(|| format!("cannot write index to '{}'", out_path))?;
    println!("minimizer index saved: {}", out_path);
    Ok(())
}

fn run_map(
    reference_path: &Path,
    fragments_path: &Path,
    index_path: Option<&Path>,
    out_path: &Path,
    opt: MapOpt,
    max_fragment_len: Option<usize>,
    limit: Option<usize>,
) -> Result<()> {
    let reference = load_reference(reference_path)?;
    let mut fragments = io::load_records(fragments_path)?;
    if let Some(max_len) = max_fragment_len {
        let before = fragments.len();
        fragments.retain(|s| s.len() <= max_len);
        info!("Skipped {} fragments longer than {} bp", before - fragments.len(), max_len);
    }
    if let Some(n) = limit {
        fragments.truncate(n);
    }

    let ref_stats = stats::analyze(std::slice::from_ref(&reference));
    let frag_stats = stats::analyze(&fragments);

    let mapper = match index_path {
        Some(p) => {
            let p = p.display().to_string();
            info!("Loading minimizer index from '{}'...", p);
            let index = MinimizerIndex::load_from_file(&p).with_context(|| format!("cannot load index '{}'", p))?;
            Mapper::with_index(reference, index, opt)?
        }
        None => Mapper::new(reference, opt)?,
    };

    let writer = PafWriter::append(out_path)?;
    if let (Some(r), Some(q)) = (ref_stats, frag_stats) {
        writer
            .write_stats(&r, &q)
            .with_context(|| format!("cannot write to '{}'", out_path.display()))?;
    }

    let report = mapper.map_all(&fragments, &writer)?;
    println!("{}", report);
    println!("output: {}", out_path.display());
    Ok(())
}

fn run_stats(path: &Path) -> Result<()> {
    let records = io::load_records(path)?;
    match stats::analyze(&records) {
        Some(s) => {
            println!("(contig_count, min, max, avg, n_50)");
            println!("{}", s);
            println!("total_len: {}", s.total_len);
        }
        None => println!("'{}' contains no sequences", path.display()),
    }
    Ok(())
}
