//! # medvar
//!
//! 動詞と形容詞の意味的変動性を、共起する名詞の概念ドメインの多様性として測定します。
//!
//! ## 概要
//!
//! 品詞付きコーパスから主語・動詞・目的語 (`svo`)、名詞・形容詞 (`n_adj`)、
//! 形容詞・名詞 (`adj_n`) の構文構造を抽出し、名詞を語彙意味資源で概念ドメインに写像します。
//! 対象語ごとにドメインの和集合を蓄積し、異なりドメイン数とそれを出現回数で正規化した値を
//! スコアとして報告します。
//!
//! ## 主な機能
//!
//! - **構文構造の抽出**: 構文構造の種類ごとの抽出規則
//! - **ドメイン解決**: rkyv形式またはCSV形式の語彙資源と、スレッド間で共有されるキャッシュ
//! - **集約とスコア計算**: 可換かつ冪等な和集合による集約と、並列実行
//! - **入出力**: タグ付き形式とKWIC形式のコーパス、CSVでの結果の書き出し
//!
//! ## 使用例
//!
//! ```
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use medvar::{Analyzer, ConstructionType, Corpus, DomainLexicon, DomainTaxonomy, LexiconResolver};
//!
//! let lexicon_csv = "fruta,noun.food\npeixe,noun.food\ngoverno,noun.group";
//! let corpus_xml = "<corpus>
//!   <kwic>fruta/n fresca/adj/fresco</kwic>
//!   <kwic>peixe/n fresco/adj</kwic>
//!   <kwic>governo/n fresco/adj</kwic>
//! </corpus>";
//!
//! let lexicon = DomainLexicon::from_reader(lexicon_csv.as_bytes())?;
//! let resolver = LexiconResolver::new(lexicon, DomainTaxonomy::wordnet_pt());
//! let corpus = Corpus::from_kwic_reader(corpus_xml.as_bytes(), ConstructionType::NounAdj)?;
//!
//! let report = Analyzer::new(resolver)?.run(corpus.iter())?;
//! let fresco = &report.results[0];
//! assert_eq!(fresco.lemma, "fresco");
//! assert_eq!(fresco.occurrences, 3);
//! assert_eq!(fresco.raw_score, 2);
//! assert_eq!(fresco.domains, vec!["comida", "organização"]);
//! # Ok(())
//! # }
//! ```

/// 見出し語ごとのドメイン集約
pub mod aggregate;

/// アナライザーとワーカー
pub mod analyzer;

/// 構文構造の抽出規則
pub mod construction;

/// コーパスの読み込み
pub mod corpus;

/// エラー型の定義
pub mod errors;

/// 結果の書き出し
pub mod export;

/// 語彙意味資源
pub mod lexicon;

/// コーパスレコードの表現
pub mod record;

/// 実行結果の表現
pub mod report;

/// 概念ドメインの解決
pub mod resolver;

/// スコア計算
pub mod score;

/// 内部ユーティリティ関数
pub mod utils;


// Re-exports
pub use aggregate::{Scope, SvoArguments};
pub use analyzer::{Analyzer, Stage, StopFlag, Worker};
pub use construction::{ArgumentSlot, Construction};
pub use corpus::{Corpus, CorpusFormat};
pub use errors::{AnalysisError, ExtractionFailure, Result};
pub use lexicon::{DomainLexicon, DomainTaxonomy};
pub use record::{ConstructionType, CorpusRecord, PosTag, TaggedToken};
pub use report::{ConstructionTrace, NounTrace, Report, RunStats};
pub use resolver::{CachedResolver, DomainResolver, DomainSet, LexiconResolver, SensePolicy};
pub use score::VariabilityResult;

/// このライブラリのバージョン番号
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
