//! 意味的変動性のスコア計算

use std::cmp::Ordering;

use crate::aggregate::{LemmaProfile, Scope};
use crate::record::ConstructionType;

/// 1つのプロファイルの最終結果
#[derive(Clone, Debug, PartialEq)]
pub struct VariabilityResult {
    pub lemma: String,
    pub construction: ConstructionType,
    pub scope: Scope,
    pub occurrences: u64,
    pub domain_count: usize,
    /// 異なりドメイン数
    pub raw_score: u64,
    /// 異なりドメイン数を出現回数で正規化した値
    pub normalized_score: f64,
    /// 辞書順に並んだドメイン
    pub domains: Vec<String>,
}

/// プロファイルからスコアを計算します。
///
/// 生のスコアは異なりドメイン数です。正規化スコアは
/// `min(異なりドメイン数, 出現回数) / 出現回数` で、1つの出現が複数のドメインを
/// もたらした場合も1.0を超えません。ドメインが1つ以上あれば (0, 1] に収まり、
/// 0.0になるのはどの名詞もドメインを持たなかった場合だけです。
pub fn score(profile: &LemmaProfile) -> VariabilityResult {
    let key = profile.key();
    let domain_count = profile.domains().len();
    let raw_score = domain_count as u64;
    let occurrences = profile.occurrences();
    let normalized_score = if occurrences == 0 {
        0.0
    } else {
        raw_score.min(occurrences) as f64 / occurrences as f64
    };
    VariabilityResult {
        lemma: key.lemma.clone(),
        construction: key.construction,
        scope: key.scope,
        occurrences,
        domain_count,
        raw_score,
        normalized_score,
        domains: profile.domains().iter().map(str::to_string).collect(),
    }
}

/// 表示用の並び順で結果を比較します。
///
/// 構文構造の種類、範囲、生のスコアの降順、正規化スコアの降順、見出し語の順です。
pub fn presentation_order(a: &VariabilityResult, b: &VariabilityResult) -> Ordering {
    a.construction
        .cmp(&b.construction)
        .then(a.scope.cmp(&b.scope))
        .then(b.raw_score.cmp(&a.raw_score))
        .then(b.normalized_score.total_cmp(&a.normalized_score))
        .then_with(|| a.lemma.cmp(&b.lemma))
}
