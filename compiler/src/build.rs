//! 語彙資源のビルドモジュール
//!
//! CSV形式の語彙資源 (`見出し語,語義クラス`) を読み込み、
//! zstdで圧縮したバイナリ形式で書き出します。

use std::fs::File;
use std::io;
use std::path::PathBuf;

use medvar::DomainLexicon;
use medvar::errors::AnalysisError;

use clap::Parser;

/// ビルドコマンドの引数
#[derive(Parser, Debug)]
#[clap(
    name = "build",
    about = "A program to build the binary lexical resource."
)]
pub struct Args {
    /// Lexicon file in CSV (lemma,sense_class).
    #[clap(short = 'l', long)]
    lexicon_in: PathBuf,

    /// File to which the binary lexicon is output (in zstd).
    #[clap(short = 'o', long)]
    lexicon_out: PathBuf,

    /// zstd compression level.
    #[clap(long, default_value = "19")]
    level: i32,
}

/// ビルド処理中に発生する可能性のあるエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// 語彙資源が空
    #[error("The lexicon {0} contains no entries")]
    EmptyLexicon(PathBuf),

    /// 入出力エラー
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// 語彙資源の構築エラー
    #[error("Lexicon building failed: {0}")]
    Medvar(#[from] AnalysisError),
}

/// ビルドコマンドを実行する
///
/// # エラー
///
/// ファイルの読み書きや語彙資源の構築に失敗した場合、`BuildError`を返します。
pub fn run(args: Args) -> Result<(), BuildError> {
    println!("Compiling the lexicon...");
    let lexicon = DomainLexicon::from_reader(File::open(&args.lexicon_in)?)?;
    if lexicon.is_empty() {
        return Err(BuildError::EmptyLexicon(args.lexicon_in));
    }
    println!("{} lemmas", lexicon.num_lemmas());

    println!("Writing the lexicon...");
    let file = File::create(&args.lexicon_out)?;
    let mut encoder = zstd::Encoder::new(file, args.level)?;
    lexicon.write(&mut encoder)?;
    encoder.finish()?;

    println!("Successfully built the lexicon to {}", args.lexicon_out.display());
    Ok(())
}
