//! エラー型の定義
//!
//! このモジュールは、medvarライブラリで使用されるすべてのエラー型を定義します。
//! 実行全体を中断する致命的なエラーは [`AnalysisError`] で、
//! レコード単位で読み飛ばされる非致命的な抽出失敗は [`ExtractionFailure`] で表現します。

use std::error::Error;
use std::fmt::{self, Debug};

/// medvar専用のResult型
///
/// エラー型としてデフォルトで[`AnalysisError`]を使用します。
pub type Result<T, E = AnalysisError> = std::result::Result<T, E>;

/// medvarのエラー型
///
/// 実行を中断させる可能性のあるすべてのエラーを表現します。
/// レコード単位の失敗は含みません（[`ExtractionFailure`]を参照）。
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// 無効な引数エラー
    ///
    /// [`InvalidArgumentError`]のエラーバリアント。
    #[error(transparent)]
    InvalidArgument(InvalidArgumentError),

    /// 無効なフォーマットエラー
    ///
    /// [`InvalidFormatError`]のエラーバリアント。
    #[error(transparent)]
    InvalidFormat(InvalidFormatError),

    /// 無効な状態エラー
    ///
    /// [`InvalidStateError`]のエラーバリアント。
    #[error(transparent)]
    InvalidState(InvalidStateError),

    /// 語彙資源が利用できないエラー
    ///
    /// 語彙資源の読み込みに失敗した場合、または資源が空の場合に発生します。
    /// 処理開始前に実行を中断します。
    #[error("Lexical resource unavailable: {cause}")]
    ResourceUnavailable {
        /// 原因の説明
        cause: String,
    },

    /// コーパス読み込みエラー
    ///
    /// 入力ファイルが存在しない、読み込めない、またはトップレベルの形式が
    /// 不正な場合に発生します。処理開始前に実行を中断します。
    #[error("Failed to read the corpus: {cause}")]
    CorpusRead {
        /// 原因の説明
        cause: String,
    },

    /// 結果の書き出しエラー
    ///
    /// 計算済みの結果は失われず、呼び出し側で再試行できます。
    #[error("Failed to export the results: {0}")]
    Export(std::io::Error),

    /// 協調的な停止要求により実行が中断されたエラー
    #[error("The run was cancelled after {processed} records")]
    Cancelled {
        /// 停止までに処理したレコード数
        processed: usize,
    },

    /// バックグラウンドスレッドパニックエラー
    ///
    /// 並列実行中のワーカースレッドがパニックした場合に発生します。
    #[error("Worker thread panicked: {0}")]
    ThreadPanic(String),

    /// 整数変換エラー
    ///
    /// [`TryFromIntError`](std::num::TryFromIntError)のエラーバリアント。
    #[error(transparent)]
    TryFromInt(std::num::TryFromIntError),

    /// I/Oエラー
    #[error(transparent)]
    IoError(#[from] std::io::Error),
}

impl AnalysisError {
    /// 無効な引数エラーを生成します
    ///
    /// # 引数
    ///
    /// * `arg` - 引数の名前
    /// * `msg` - エラーメッセージ
    pub(crate) fn invalid_argument<S>(arg: &'static str, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidArgument(InvalidArgumentError {
            arg,
            msg: msg.into(),
        })
    }

    /// 無効なフォーマットエラーを生成します
    ///
    /// # 引数
    ///
    /// * `arg` - フォーマット名
    /// * `msg` - エラーメッセージ
    pub(crate) fn invalid_format<S>(arg: &'static str, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidFormat(InvalidFormatError {
            arg,
            msg: msg.into(),
        })
    }

    /// 無効な状態エラーを生成します
    ///
    /// # 引数
    ///
    /// * `msg` - エラーメッセージ
    /// * `cause` - エラーの原因
    pub(crate) fn invalid_state<S, M>(msg: S, cause: M) -> Self
    where
        S: Into<String>,
        M: Into<String>,
    {
        Self::InvalidState(InvalidStateError {
            msg: msg.into(),
            cause: cause.into(),
        })
    }

    /// 語彙資源が利用できないエラーを生成します
    pub(crate) fn resource_unavailable<S>(cause: S) -> Self
    where
        S: fmt::Display,
    {
        Self::ResourceUnavailable {
            cause: cause.to_string(),
        }
    }

    /// コーパス読み込みエラーを生成します
    pub(crate) fn corpus_read<S>(cause: S) -> Self
    where
        S: fmt::Display,
    {
        Self::CorpusRead {
            cause: cause.to_string(),
        }
    }
}

/// 引数が無効な場合に使用されるエラー
#[derive(Debug)]
pub struct InvalidArgumentError {
    /// 引数の名前
    pub(crate) arg: &'static str,

    /// エラーメッセージ
    pub(crate) msg: String,
}

impl fmt::Display for InvalidArgumentError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InvalidArgumentError: {}: {}", self.arg, self.msg)
    }
}

impl Error for InvalidArgumentError {}

/// 入力フォーマットが無効な場合に使用されるエラー
#[derive(Debug)]
pub struct InvalidFormatError {
    /// フォーマットの名前
    pub(crate) arg: &'static str,

    /// エラーメッセージ
    pub(crate) msg: String,
}

impl fmt::Display for InvalidFormatError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InvalidFormatError: {}: {}", self.arg, self.msg)
    }
}

impl Error for InvalidFormatError {}

/// 状態が無効な場合に使用されるエラー
#[derive(Debug)]
pub struct InvalidStateError {
    /// エラーメッセージ
    pub(crate) msg: String,

    /// エラーの根本原因
    pub(crate) cause: String,
}

impl fmt::Display for InvalidStateError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InvalidStateError: {}: {}", self.msg, self.cause)
    }
}

impl Error for InvalidStateError {}

/// 構文構造の役割
///
/// [`ExtractionFailure::MissingRole`] で、見つからなかった役割を示すために使用します。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    /// 主語（名詞）
    Subject,
    /// 動詞
    Verb,
    /// 目的語（名詞）
    Object,
    /// 形容詞
    Adjective,
    /// 形容詞が修飾する名詞
    Noun,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Self::Subject => "subject",
            Self::Verb => "verb",
            Self::Object => "object",
            Self::Adjective => "adjective",
            Self::Noun => "noun",
        };
        f.write_str(name)
    }
}

/// レコードが宣言された構文パターンに一致しない場合の失敗
///
/// 非致命的です。該当レコードは読み飛ばされ、種類ごとに集計されます。
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ExtractionFailure {
    /// トークンを1つも含まないレコード
    #[error("The record contains no tokens")]
    EmptyRecord,

    /// 構文構造に選ばれたトークンの見出し語が空
    #[error("Token {index} has an empty lemma")]
    MalformedToken {
        /// トークンの位置
        index: usize,
    },

    /// 構文パターンに必要な役割が見つからない
    #[error("No {0} found for the declared construction")]
    MissingRole(Role),
}

impl ExtractionFailure {
    /// 集計に使用する失敗の種類名を返します。
    pub fn kind(&self) -> &'static str {
        match self {
            Self::EmptyRecord => "empty_record",
            Self::MalformedToken { .. } => "malformed_token",
            Self::MissingRole(Role::Subject) => "missing_subject",
            Self::MissingRole(Role::Verb) => "missing_verb",
            Self::MissingRole(Role::Object) => "missing_object",
            Self::MissingRole(Role::Adjective) => "missing_adjective",
            Self::MissingRole(Role::Noun) => "missing_noun",
        }
    }
}

impl From<std::num::TryFromIntError> for AnalysisError {
    fn from(error: std::num::TryFromIntError) -> Self {
        Self::TryFromInt(error)
    }
}
