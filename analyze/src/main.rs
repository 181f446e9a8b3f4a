//! 意味的変動性の分析を実行するユーティリティ
//!
//! このバイナリは、語彙資源とコーパスを読み込んで見出し語ごとの意味的変動性を計算し、
//! 結果をCSVで出力します。`RUST_LOG` 環境変数でログの詳細度を指定できます。

use std::error::Error;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::str::FromStr;

use medvar::{
    Analyzer, ConstructionType, Corpus, CorpusFormat, DomainLexicon, DomainTaxonomy,
    LexiconResolver, SensePolicy, SvoArguments, export,
};

use clap::Parser;

/// 語義クラスの対応表の指定
#[derive(Clone, Debug)]
enum TaxonomyArg {
    WordnetPt,
    Identity,
    File(PathBuf),
}

impl FromStr for TaxonomyArg {
    type Err = &'static str;

    /// `wordnet_pt`、`identity`、またはファイルパスを受け付けます。
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "wordnet_pt" => Ok(Self::WordnetPt),
            "identity" => Ok(Self::Identity),
            "" => Err("Could not parse a taxonomy"),
            path => Ok(Self::File(PathBuf::from(path))),
        }
    }
}

/// コマンドライン引数
#[derive(Parser, Debug)]
#[clap(name = "analyze", about = "Measures the semantic variability of verbs and adjectives")]
struct Args {
    /// Lexical resource mapping noun lemmas to sense classes (CSV or binary, optionally in zstd).
    #[clap(short = 'l', long)]
    lexicon: PathBuf,

    /// Mapping from sense classes to domains. Choices are wordnet_pt, identity, or a file of
    /// `class<TAB>domain` lines.
    #[clap(short = 't', long, default_value = "wordnet_pt")]
    taxonomy: TaxonomyArg,

    /// Corpus file.
    #[clap(short = 'c', long)]
    corpus: PathBuf,

    /// Corpus format. Choices are tagged and kwic. Inferred from the extension if omitted.
    #[clap(short = 'f', long)]
    format: Option<CorpusFormat>,

    /// Construction type of records that do not declare one. Choices are svo, n_adj, and adj_n.
    #[clap(short = 'k', long, default_value = "svo")]
    construction: ConstructionType,

    /// Handling of SVO subjects and objects. Choices are merged and separate.
    #[clap(long, default_value = "merged")]
    svo_arguments: SvoArguments,

    /// Also measures, for each noun of n_adj and adj_n records, the domains of the adjectives
    /// modifying it.
    #[clap(long)]
    noun_profiles: bool,

    /// Senses used for each noun. Choices are all and first.
    #[clap(long, default_value = "all")]
    senses: SensePolicy,

    /// Number of worker threads.
    #[clap(short = 'j', long, default_value = "1")]
    threads: usize,

    /// File to which the variability table is written. Defaults to stdout.
    #[clap(short = 'o', long)]
    out: Option<PathBuf>,

    /// File to which the extracted constructions are written.
    #[clap(long)]
    constructions_out: Option<PathBuf>,
}

/// メイン関数
///
/// 語彙資源とコーパスを読み込み、分析結果を書き出します。
///
/// # 戻り値
///
/// 実行が成功した場合は `Ok(())`、エラーが発生した場合はエラー情報
fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    eprintln!("Loading the lexicon...");
    let lexicon = DomainLexicon::open(&args.lexicon)?;
    let taxonomy = match &args.taxonomy {
        TaxonomyArg::WordnetPt => DomainTaxonomy::wordnet_pt(),
        TaxonomyArg::Identity => DomainTaxonomy::identity(),
        TaxonomyArg::File(path) => DomainTaxonomy::from_reader(File::open(path)?)?,
    };
    log::info!("{} lemmas in the lexicon", lexicon.num_lemmas());
    let resolver = LexiconResolver::new(lexicon, taxonomy).sense_policy(args.senses);

    eprintln!("Loading the corpus...");
    let format = args.format.unwrap_or_else(|| CorpusFormat::infer(&args.corpus));
    let corpus = Corpus::from_path(&args.corpus, format, args.construction)?;

    let analyzer = Analyzer::new(resolver)?
        .svo_arguments(args.svo_arguments)
        .noun_profiles(args.noun_profiles)
        .keep_trace(args.constructions_out.is_some());

    eprintln!("Analyzing {} records...", corpus.len());
    let report = analyzer.run_parallel(&corpus, args.threads)?;

    let cache = analyzer.resolver().stats();
    log::info!(
        "{} distinct nouns resolved ({} cache hits)",
        cache.entries,
        cache.hits
    );

    match &args.out {
        Some(path) => export::write_variability_to_path(&report, path)?,
        None => {
            let out = std::io::stdout();
            export::write_variability(&report, BufWriter::new(out.lock()))?;
        }
    }
    if let Some(path) = &args.constructions_out {
        export::write_constructions_to_path(&report, path)?;
    }

    Ok(())
}
