//! 実行結果の表現
//!
//! 1回の実行の最終結果、実行統計、抽出された構文構造の記録を保持します。

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::construction::Construction;
use crate::errors::ExtractionFailure;
use crate::resolver::DomainSet;
use crate::score::VariabilityResult;

/// 実行統計
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunStats {
    /// 処理したレコード数
    pub records: u64,
    /// 構文構造を抽出できたレコード数
    pub extracted: u64,
    /// 読み飛ばしたレコード数
    pub skipped: u64,
    /// 抽出失敗の種類ごとの件数
    pub failures: BTreeMap<&'static str, u64>,
    /// ドメインが1つ以上得られた名詞の数
    pub resolved_nouns: u64,
    /// 語彙資源に存在しない、またはドメインを持たない名詞の数
    pub unresolved_nouns: u64,
}

impl RunStats {
    pub(crate) fn skip(&mut self, failure: &ExtractionFailure) {
        self.skipped += 1;
        *self.failures.entry(failure.kind()).or_default() += 1;
    }

    /// 別の統計を加算します。
    pub fn merge(&mut self, other: RunStats) {
        self.records += other.records;
        self.extracted += other.extracted;
        self.skipped += other.skipped;
        for (kind, count) in other.failures {
            *self.failures.entry(kind).or_default() += count;
        }
        self.resolved_nouns += other.resolved_nouns;
        self.unresolved_nouns += other.unresolved_nouns;
    }
}

/// 構文構造の名詞1つに対する解決結果
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NounTrace {
    pub noun: String,
    /// 解決に使われた語義クラス
    pub sense_classes: Vec<String>,
    pub domains: Arc<DomainSet>,
}

/// 抽出された構文構造と、その名詞に割り当てられたドメインの記録
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConstructionTrace {
    /// レコードの表層形を空白で連結した文字列
    pub text: String,
    pub construction: Construction,
    /// [`Construction::nouns`] の順に並んだ名詞
    pub nouns: Vec<NounTrace>,
}

/// 1回の実行の結果
///
/// 書き出しに失敗しても結果は保持され、再計算せずに書き出しを再試行できます。
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Report {
    /// 表示用の並び順に並んだ結果
    pub results: Vec<VariabilityResult>,
    pub stats: RunStats,
    /// `keep_trace` が有効な場合の構文構造の記録
    pub traces: Vec<ConstructionTrace>,
}

impl Report {
    /// 見出し語と構文構造の種類で結果を検索します。
    pub fn find(
        &self,
        lemma: &str,
        construction: crate::record::ConstructionType,
    ) -> impl Iterator<Item = &VariabilityResult> {
        self.results
            .iter()
            .filter(move |r| r.lemma == lemma && r.construction == construction)
    }
}
