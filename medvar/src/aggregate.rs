//! 見出し語ごとのドメイン集約
//!
//! (対象語, 構文構造の種類, 範囲) をキーとして、出現ごとに名詞から得られた
//! 概念ドメインの和集合と出現回数を蓄積します。
//!
//! 和集合は冪等かつ可換・結合的なので、同じ構文構造を2回処理してもドメイン集合は変わらず、
//! 処理順序にもよりません。並列実行では各ワーカーの集約結果を [`AggregationContext::merge`]
//! で統合します。

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use hashbrown::HashMap;

use crate::construction::{ArgumentSlot, Construction};
use crate::record::ConstructionType;
use crate::resolver::DomainSet;

/// SVOの主語と目的語のドメインの扱い方
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SvoArguments {
    /// 主語と目的語のドメインを1つのプロファイルにまとめます。
    #[default]
    Merged,
    /// 主語と目的語を別々のプロファイルとして追跡します。
    Separate,
}

impl FromStr for SvoArguments {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "merged" => Ok(Self::Merged),
            "separate" => Ok(Self::Separate),
            _ => Err("Could not parse an SVO argument policy"),
        }
    }
}

/// プロファイルが対象とする名詞の範囲
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Scope {
    /// 構文構造のすべての名詞
    All,
    /// SVOの主語のみ
    Subject,
    /// SVOの目的語のみ
    Object,
    /// 名詞を見出し語とし、それを修飾する形容詞のドメインを数えるプロファイル
    Noun,
}

impl Scope {
    /// 出力で使用される名前を返します。
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Subject => "subject",
            Self::Object => "object",
            Self::Noun => "noun",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// プロファイルのキー
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProfileKey {
    pub construction: ConstructionType,
    pub scope: Scope,
    pub lemma: String,
}

/// 名詞の見出し語から概念ドメイン集合への対応
pub type NounDomains = HashMap<String, Arc<DomainSet>>;

/// 1つの対象語についてコーパス全体で蓄積された状態
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LemmaProfile {
    key: ProfileKey,
    domains: DomainSet,
    occurrences: u64,
}

impl LemmaProfile {
    /// 空のプロファイルを作成します。
    pub fn new(key: ProfileKey) -> Self {
        Self {
            key,
            domains: DomainSet::new(),
            occurrences: 0,
        }
    }

    /// プロファイルのキーを返します。
    #[inline(always)]
    pub fn key(&self) -> &ProfileKey {
        &self.key
    }

    /// これまでに観測されたドメインの集合を返します。
    #[inline(always)]
    pub fn domains(&self) -> &DomainSet {
        &self.domains
    }

    /// 観測された出現回数を返します。
    #[inline(always)]
    pub fn occurrences(&self) -> u64 {
        self.occurrences
    }

    /// 1回の出現を記録し、そのドメイン集合を和集合に加えます。
    ///
    /// 名詞が資源に存在せずドメイン集合が空でも、出現回数は増えます。
    pub fn record<'a, I>(&mut self, domains: I)
    where
        I: IntoIterator<Item = &'a DomainSet>,
    {
        self.occurrences += 1;
        for set in domains {
            self.domains.union_with(set);
        }
    }

    /// 同じキーの別のプロファイルを統合します。
    pub fn merge(&mut self, other: &LemmaProfile) {
        debug_assert_eq!(self.key, other.key);
        self.domains.union_with(&other.domains);
        self.occurrences += other.occurrences;
    }
}

/// 1回の実行における集約状態
///
/// キーごとのプロファイルを保持します。異なるキーのプロファイルは互いに独立です。
#[derive(Clone, Debug, Default)]
pub struct AggregationContext {
    svo_arguments: SvoArguments,
    profiles: HashMap<ProfileKey, LemmaProfile>,
}

impl AggregationContext {
    /// 空の集約状態を作成します。
    pub fn new(svo_arguments: SvoArguments) -> Self {
        Self {
            svo_arguments,
            profiles: HashMap::new(),
        }
    }

    /// 構文構造1つ分の出現を蓄積します。
    ///
    /// `domains` に含まれない名詞は空のドメイン集合として扱われます。
    pub fn accumulate(&mut self, construction: &Construction, domains: &NounDomains) {
        let empty = DomainSet::new();
        let lookup = |noun: &str| domains.get(noun).map_or(&empty, |d| d.as_ref());

        match (construction.kind(), self.svo_arguments) {
            (ConstructionType::Svo, SvoArguments::Separate) => {
                for (slot, noun) in construction.nouns() {
                    let scope = match slot {
                        ArgumentSlot::Subject => Scope::Subject,
                        _ => Scope::Object,
                    };
                    self.profile_mut(construction.kind(), scope, construction.target())
                        .record([lookup(noun)]);
                }
            }
            _ => {
                let sets: Vec<&DomainSet> =
                    construction.nouns().map(|(_, noun)| lookup(noun)).collect();
                self.profile_mut(construction.kind(), Scope::All, construction.target())
                    .record(sets);
            }
        }
    }

    /// 対象語のドメインを、それが修飾する名詞のプロファイルに蓄積します。
    ///
    /// プロファイルの見出し語は名詞、範囲は [`Scope::Noun`] です。
    /// `target_domains` は形容詞の見出し語を解決した結果です。
    pub fn accumulate_modifier(
        &mut self,
        construction: &Construction,
        target_domains: &DomainSet,
    ) {
        for (_, noun) in construction.nouns() {
            self.profile_mut(construction.kind(), Scope::Noun, noun)
                .record([target_domains]);
        }
    }

    fn profile_mut(
        &mut self,
        construction: ConstructionType,
        scope: Scope,
        lemma: &str,
    ) -> &mut LemmaProfile {
        let key = ProfileKey {
            construction,
            scope,
            lemma: lemma.to_string(),
        };
        self.profiles
            .entry(key.clone())
            .or_insert_with(|| LemmaProfile::new(key))
    }

    /// 別の集約状態を統合します。
    ///
    /// 統合は可換かつ結合的です。
    pub fn merge(&mut self, other: AggregationContext) {
        for (key, profile) in other.profiles {
            match self.profiles.get_mut(&key) {
                Some(mine) => mine.merge(&profile),
                None => {
                    self.profiles.insert(key, profile);
                }
            }
        }
    }

    /// プロファイルを取得します。
    pub fn profile(&self, key: &ProfileKey) -> Option<&LemmaProfile> {
        self.profiles.get(key)
    }

    /// プロファイルの数を返します。
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// プロファイルが1つもない場合に `true` を返します。
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// すべてのプロファイルを取り出します（順序は不定）。
    pub fn into_profiles(self) -> impl Iterator<Item = LemmaProfile> {
        self.profiles.into_values()
    }
}
