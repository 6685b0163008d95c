use std::io::Write;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;

use kmer_extender::extend::{format, ExtendOpt, WindowBatch};
use kmer_extender::io::fasta::{self, FastaRecord};
use kmer_extender::util::{dna, random};

const DEMO_MEMORY: &[u8] = b"AAAGTGTTTCTGACTAATGCTGGAAAGAATAT";
const DEMO_ANCHORS: [i64; 5] = [0, 5, 15, 21, 28];

#[derive(Parser, Debug)]
#[command(name = "kmer-extender", author, version, about = "Encode nucleotide sequences and extract extended k-mer windows", arg_required_else_help = true)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Encode a sequence into one-hot codes (A=8, C=4, G=2, T=1, N=0)
    Encode {
        /// Sequence text over ACGTN
        #[arg(conflicts_with = "fasta", required_unless_present = "fasta")]
        seq: Option<String>,
        /// Read sequences from a FASTA file instead
        #[arg(short, long)]
        fasta: Option<String>,
    },
    /// Decode a list of codes back into sequence text
    Decode {
        /// Codes, decimal or 0x-prefixed hex, comma or space separated
        #[arg(required = true, num_args = 1.., value_delimiter = ',', value_parser = parse_code)]
        codes: Vec<u8>,
    },
    /// Extract fixed-length windows centered on anchor positions
    Extend {
        /// Reference sequence text over ACGTN
        #[arg(short, long, conflicts_with = "fasta", required_unless_present = "fasta")]
        seq: Option<String>,
        /// Reference FASTA file; every record is processed with the same anchors
        #[arg(short, long)]
        fasta: Option<String>,
        /// Anchor positions (0-based, may be negative or past the end)
        #[arg(short, long, required = true, value_delimiter = ',', allow_hyphen_values = true)]
        anchors: Vec<i64>,
        #[arg(long = "frag-len", default_value_t = 8)]
        frag_len: usize,
        #[arg(long = "kmer-len", default_value_t = 4)]
        kmer_len: usize,
        #[arg(short = 't', long = "threads", default_value_t = 1)]
        threads: usize,
        /// Emit each batch as JSON instead of bracketed text
        #[arg(long)]
        json: bool,
    },
    /// Generate a random sequence over ACGT
    Random {
        #[arg(short = 'n', long = "len", default_value_t = 32)]
        len: usize,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Walk through encode, extend and decode on a small example
    Demo {
        /// Use a random 32 bp memory and 3 random anchors instead of the fixed example
        #[arg(long)]
        random: bool,
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn parse_code(s: &str) -> std::result::Result<u8, String> {
    let s = s.trim();
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => s.parse::<u8>(),
    };
    parsed.map_err(|e| format!("'{}' is not a code: {}", s, e))
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let stdout = std::io::stdout();
    let mut out = std::io::BufWriter::new(stdout.lock());
    match cli.command {
        Commands::Encode { seq, fasta } => run_encode(seq, fasta.as_deref(), &mut out)?,
        Commands::Decode { codes } => run_decode(&codes, &mut out)?,
        Commands::Extend { seq, fasta, anchors, frag_len, kmer_len, threads, json } => {
            let opt = ExtendOpt { frag_len, kmer_len, threads };
            run_extend(seq, fasta.as_deref(), &anchors, opt, json, &mut out)?;
        }
        Commands::Random { len, seed } => {
            let seq = random::random_sequence(len, &mut make_rng(seed));
            writeln!(out, "{}", String::from_utf8_lossy(&seq))?;
        }
        Commands::Demo { random, seed } => run_demo(random, seed, &mut out)?,
    }
    out.flush()?;
    Ok(())
}

fn load_references(seq: Option<String>, fasta_path: Option<&str>) -> Result<Vec<FastaRecord>> {
    match (seq, fasta_path) {
        (Some(s), _) => Ok(vec![FastaRecord { id: "seq".to_string(), desc: None, seq: s.into_bytes() }]),
        (None, Some(p)) => fasta::read_fasta_file(p),
        (None, None) => anyhow::bail!("either a sequence or --fasta must be given"),
    }
}

fn write_header<W: Write>(out: &mut W, rec: &FastaRecord) -> Result<()> {
    match &rec.desc {
        Some(d) => writeln!(out, ">{} {}", rec.id, d)?,
        None => writeln!(out, ">{}", rec.id)?,
    }
    Ok(())
}

fn run_encode<W: Write>(seq: Option<String>, fasta_path: Option<&str>, out: &mut W) -> Result<()> {
    let records = load_references(seq, fasta_path)?;
    let multi = records.len() > 1;
    for rec in &records {
        let codes = dna::encode_seq(&rec.seq).with_context(|| format!("cannot encode record '{}'", rec.id))?;
        if multi {
            write_header(out, rec)?;
        }
        writeln!(out, "{}", format::format_codes(&codes))?;
    }
    Ok(())
}

fn run_decode<W: Write>(codes: &[u8], out: &mut W) -> Result<()> {
    let text = dna::decode_seq(codes)?;
    writeln!(out, "{}", text)?;
    Ok(())
}

fn run_extend<W: Write>(
    seq: Option<String>,
    fasta_path: Option<&str>,
    anchors: &[i64],
    opt: ExtendOpt,
    json: bool,
    out: &mut W,
) -> Result<()> {
    opt.validate()?;

    let records = load_references(seq, fasta_path)?;
    tracing::info!(records = records.len(), anchors = anchors.len(), threads = opt.threads, "extending anchors");
    let multi = records.len() > 1;
    for rec in &records {
        let memory = dna::encode_seq(&rec.seq).with_context(|| format!("cannot encode record '{}'", rec.id))?;
        let batch = WindowBatch::extract(anchors, opt, &memory)?;
        if json {
            writeln!(out, "{}", serde_json::to_string(&batch)?)?;
            continue;
        }
        if multi {
            write_header(out, rec)?;
        }
        writeln!(out, "{}", format::format_batch(&batch.windows)?)?;
    }
    Ok(())
}

fn run_demo<W: Write>(use_random: bool, seed: Option<u64>, out: &mut W) -> Result<()> {
    let opt = ExtendOpt::default();
    let (memory, anchors) = if use_random {
        let mut rng = make_rng(seed);
        let memory = random::random_sequence(32, &mut rng);
        let anchors = random::random_anchors(memory.len(), opt.kmer_len, 3, &mut rng);
        (memory, anchors)
    } else {
        (DEMO_MEMORY.to_vec(), DEMO_ANCHORS.to_vec())
    };

    writeln!(out, "Sequence: {}", String::from_utf8_lossy(&memory))?;

    let codes = dna::encode_seq(&memory)?;
    writeln!(out, "Encoded:\n{}", format::format_codes(&codes))?;
    writeln!(out, "Anchors: {:?}", anchors)?;

    let batch = WindowBatch::extract(&anchors, opt, &codes)?;
    let rows: Vec<String> = batch.windows.iter().map(|w| format::format_codes(w)).collect();
    writeln!(out, "Extended k-mers:\n[{}]", rows.join("\n "))?;
    writeln!(out, "ACGTN windows:\n{}", format::format_batch(&batch.windows)?)?;

    writeln!(out, "Reconstructed: {}", dna::decode_seq(&codes)?)?;
    Ok(())
}
