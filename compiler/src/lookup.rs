//! 見出し語の検索モジュール
//!
//! 語彙資源と対応表を読み込み、標準入力の見出し語ごとに
//! 語義クラスと概念ドメインを出力します。

use std::fs::File;
use std::io::{self, BufRead, BufWriter, Write};
use std::path::PathBuf;

use medvar::errors::AnalysisError;
use medvar::{DomainLexicon, DomainResolver, DomainTaxonomy, LexiconResolver};

use clap::Parser;

/// 検索コマンドの引数
#[derive(Parser, Debug)]
#[clap(
    name = "lookup",
    about = "Prints the sense classes and domains of lemmas read from stdin."
)]
pub struct Args {
    /// Lexicon file (CSV or binary, optionally in zstd).
    #[clap(short = 'l', long)]
    lexicon: PathBuf,

    /// Taxonomy file of `class<TAB>domain` lines. The built-in Portuguese labels are used if omitted.
    #[clap(short = 't', long)]
    taxonomy: Option<PathBuf>,
}

/// 検索中に発生する可能性のあるエラー
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    /// 入出力エラー
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// 語彙資源の読み込みエラー
    #[error(transparent)]
    Medvar(#[from] AnalysisError),
}

/// 検索コマンドを実行する
///
/// 1行に1つの見出し語を読み、`見出し語<TAB>語義クラス<TAB>ドメイン` の形式で出力します。
/// 複数の値は `,` で連結されます。
pub fn run(args: Args) -> Result<(), LookupError> {
    eprintln!("Loading the lexicon...");
    let lexicon = DomainLexicon::open(&args.lexicon)?;
    let taxonomy = match &args.taxonomy {
        Some(path) => DomainTaxonomy::from_reader(File::open(path)?)?,
        None => DomainTaxonomy::wordnet_pt(),
    };
    let resolver = LexiconResolver::new(lexicon, taxonomy);

    let out = io::stdout();
    let mut out = BufWriter::new(out.lock());
    for line in io::stdin().lock().lines() {
        let line = line?;
        let lemma = line.trim();
        if lemma.is_empty() {
            continue;
        }
        let classes = resolver.lexicon().sense_classes(lemma).join(",");
        let domains = resolver.resolve(lemma).iter().collect::<Vec<_>>().join(",");
        writeln!(&mut out, "{lemma}\t{classes}\t{domains}")?;
    }
    out.flush()?;
    Ok(())
}
