use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use lexigraph::lexicon::graph::Provenance;
use lexigraph::lexicon::lookup::LookupEngine;
use lexigraph::{
    BinaryDict, DirectoryCatalog, ImportRequest, LexicalGraphStore, LexiconConfig, MemoryGraphStore, OffsetBits, Result,
    RuleLayer, TeiImporter, TranslateMode,
};
use log::info;

/// Bilingual dictionary reader, importer and word-by-word translator
#[derive(Parser, Debug)]
#[command(name = "lexigraph")]
#[command(version)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true, env = "LEXIGRAPH_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding one `<src>-<dst>/` folder per binary dictionary
    #[arg(long, global = true)]
    dictionary_root: Option<PathBuf>,

    /// Graph snapshot file
    #[arg(long, global = true)]
    graph: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show metadata and the first index records of a binary dictionary
    Inspect {
        /// Dictionary directory
        dir: PathBuf,
        /// Number of records to show
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
        /// Only print the first headword with a value preview
        #[arg(long)]
        first: bool,
        /// Offset width to decode with instead of the declared `idxoffsetbits`
        #[arg(long, value_parser = clap::builder::PossibleValuesParser::new(["32", "64"]))]
        offset_bits: Option<String>,
    },
    /// Import a TEI lexicon into the graph
    Import {
        /// Language pair, e.g. "eng-spa"
        pair: String,
        /// TEI document
        tei: PathBuf,
        /// Replace existing edges of this pair
        #[arg(short = 'f', long)]
        truncate: bool,
        /// Stop after this many entries
        #[arg(short = 'L', long)]
        limit: Option<usize>,
        #[arg(long)]
        source_url: Option<String>,
        #[arg(long)]
        edition: Option<String>,
        #[arg(long)]
        release_version: Option<String>,
        /// Entries per commit
        #[arg(long)]
        batch_size: Option<usize>,
    },
    /// Translate text word by word
    Translate {
        src: String,
        dst: String,
        #[arg(required = true)]
        text: Vec<String>,
        #[arg(short, long, value_enum, default_value_t = Mode::Rules)]
        mode: Mode,
    },
    /// Look up a single word
    Lookup { src: String, dst: String, word: String },
    /// List available language pairs
    Pairs {
        /// List language codes instead of pairs
        #[arg(long)]
        codes: bool,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Mode {
    Rules,
    Word,
}

impl From<Mode> for TranslateMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Rules => TranslateMode::Rules,
            Mode::Word => TranslateMode::WordByWord,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    if let Err(e) = run(cli) {
        eprintln!("\nERROR: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = LexiconConfig::resolve(cli.config.as_deref())?;
    if let Some(root) = cli.dictionary_root {
        config.dictionary_root = root;
    }
    if let Some(graph) = cli.graph {
        config.graph_path = graph;
    }

    match cli.command {
        Command::Inspect {
            dir,
            limit,
            first,
            offset_bits,
        } => {
            let bits = offset_bits.and_then(|b| b.parse::<u32>().ok()).map(OffsetBits::from);
            inspect(&config, &dir, limit, first, bits)
        }
        Command::Import {
            pair,
            tei,
            truncate,
            limit,
            source_url,
            edition,
            release_version,
            batch_size,
        } => {
            let request = ImportRequest {
                pair,
                provenance: Provenance {
                    source_url,
                    edition,
                    release_version,
                },
                truncate,
                limit,
            };
            import(&config, &request, &tei, batch_size)
        }
        Command::Translate { src, dst, text, mode } => {
            let engine = engine(&config)?;
            let layer = RuleLayer::with_rules(&engine, config.rules.clone());
            println!("{}", layer.translate(&src, &dst, &text.join(" "), mode.into())?);
            Ok(())
        }
        Command::Lookup { src, dst, word } => {
            let engine = engine(&config)?;
            match engine.lookup_one(&src, &dst, &word)? {
                Some(value) => println!("{}", value),
                None => println!("(no entry for '{}')", word),
            }
            Ok(())
        }
        Command::Pairs { codes } => {
            let engine = engine(&config)?;
            let items = if codes {
                engine.available_language_codes()?
            } else {
                engine.available_language_pairs()?
            };
            for item in items {
                println!("{}", item);
            }
            Ok(())
        }
    }
}

fn engine(config: &LexiconConfig) -> Result<LookupEngine> {
    let graph = MemoryGraphStore::open_or_default(&config.graph_path)?;
    Ok(LookupEngine::new(config.lookup.options())
        .with_source(DirectoryCatalog::new(&config.dictionary_root))
        .with_graph(Arc::new(graph)))
}

fn inspect(config: &LexiconConfig, dir: &Path, limit: usize, first: bool, bits: Option<OffsetBits>) -> Result<()> {
    let mut dict = BinaryDict::open(dir)?;
    if let Some(bits) = bits {
        dict = dict.with_offset_bits(bits);
    }

    if first {
        match dict.first_record()? {
            Some(record) => {
                println!("Bookname: {}", record.bookname);
                println!("Headword: {}", record.headword);
                println!("Endian:   {}", record.endian);
                println!("Value:    {}", record.value_snippet);
            }
            None => println!("Index is empty."),
        }
        return Ok(());
    }

    println!("{}", "=".repeat(60));
    println!("Dictionary Information:");
    println!("  Bookname: {}", dict.bookname());
    println!("  Version: {}", dict.metadata.version);
    println!("  Word count: {}", dict.metadata.word_count.map(|n| n.to_string()).unwrap_or_else(|| "?".into()));
    println!("  Offset bits: {}", dict.metadata.idx_offset_bits.bits());
    if let Some(seq) = &dict.metadata.same_type_sequence {
        println!("  Same type sequence: {}", seq);
    }
    println!("  Index: {}", dict.index_path.display());
    println!("  Payload: {} ({} bytes)", dict.payload_path.display(), dict.payload_len);
    println!("{}", "=".repeat(60));

    let reports = dict.inspect(limit, config.inspect.max_len, config.inspect.preview_chars)?;
    for (i, report) in reports.iter().enumerate() {
        let record = &report.record;
        println!("\n{}. {}", i + 1, record.headword);
        println!(
            "  BE offset={} ({}) size={} ({})",
            record.offset_be,
            report.offset_be_hex(),
            record.size_be,
            report.size_be_hex()
        );
        println!(
            "  LE offset={} ({}) size={} ({})",
            record.offset_le,
            report.offset_le_hex(),
            record.size_le,
            report.size_le_hex()
        );
        println!(
            "  Chosen: {} offset={} size={}{}",
            report.choice.endian,
            report.choice.offset,
            report.choice.size,
            if report.choice.in_bounds { "" } else { " [OUT OF BOUNDS]" }
        );
        println!("  UTF-8: {}", if report.utf8 { "yes" } else { "no" });
        println!("  Preview: {}", report.preview);
        println!("{}", report.hex_dump);
    }
    if reports.is_empty() {
        println!("\nIndex is empty.");
    }
    Ok(())
}

fn import(config: &LexiconConfig, request: &ImportRequest, tei: &Path, batch_size: Option<usize>) -> Result<()> {
    let store = MemoryGraphStore::open_or_default(&config.graph_path)?.with_checkpoint(&config.graph_path);
    let importer = TeiImporter::new(&store).with_batch_size(batch_size.unwrap_or(config.import.batch_size));

    println!("TEI import for {}", request.pair);
    let mut report = |n: usize| {
        if n % 1000 == 0 {
            println!("Imported {} entries...", n);
        }
    };
    let outcome = importer.import_path(request, tei, Some(&mut report as &mut dyn FnMut(usize)))?;

    info!("Graph now holds {} translation edges", store.edge_count()?);
    println!(
        "Imported {} entries into dictionary {} ({} skipped).",
        outcome.processed, outcome.dictionary.name, outcome.skipped
    );
    Ok(())
}
