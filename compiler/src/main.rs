//! medvar 語彙資源コンパイラのメインエントリーポイント
//!
//! CSV形式の語彙資源をバイナリ形式に変換するサブコマンドと、
//! 変換済みの資源で見出し語を引くサブコマンドを提供します。

mod build;
mod lookup;

use clap::Parser;
use thiserror::Error;

use crate::{build::BuildError, lookup::LookupError};

/// コマンドライン引数の構造体
#[derive(Parser, Debug)]
#[clap(name = "compile", version)]
struct Cli {
    /// 実行するサブコマンド
    #[clap(subcommand)]
    command: Command,
}

/// 利用可能なサブコマンド
#[derive(Parser, Debug)]
enum Command {
    /// CSV形式の語彙資源からバイナリ形式の語彙資源を構築します
    Build(build::Args),

    /// 語彙資源で見出し語の語義クラスと概念ドメインを引きます
    Lookup(lookup::Args),
}

/// コンパイラの実行中に発生する可能性のあるエラー
#[derive(Debug, Error)]
pub enum CompileError {
    /// 語彙資源のビルド中のエラー
    #[error(transparent)]
    BuildError(#[from] BuildError),
    /// 見出し語の検索中のエラー
    #[error(transparent)]
    LookupError(#[from] LookupError),
}

/// メイン関数
///
/// コマンドライン引数をパースし、指定されたサブコマンドを実行します。
///
/// # エラー
///
/// 各サブコマンドの実行中にエラーが発生した場合、そのエラーが返されます。
fn main() -> Result<(), CompileError> {
    let cli = Cli::parse();
    match cli.command {
        Command::Build(args) => Ok(build::run(args)?),
        Command::Lookup(args) => Ok(lookup::run(args)?),
    }
}
