//! 名詞の見出し語から概念ドメイン集合を求めるモジュール
//!
//! [`DomainResolver`] は語彙資源による解決を抽象化したトレイトで、
//! テストでは別の実装に差し替えられます。
//! [`CachedResolver`] は見出し語ごとの結果を1回の実行の間メモ化し、
//! ワーカースレッド間で共有できます。

use std::collections::BTreeSet;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use hashbrown::HashMap;

use crate::errors::{AnalysisError, Result};
use crate::lexicon::{DomainLexicon, DomainTaxonomy};

/// 1つの名詞に対応する概念ドメインの集合
///
/// 名詞が語彙資源に存在しない場合は空になります。要素は辞書順に保持されます。
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DomainSet(BTreeSet<String>);

impl DomainSet {
    /// 空の集合を作成します。
    pub fn new() -> Self {
        Self::default()
    }

    /// 要素数を返します。
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// 空の場合に `true` を返します。
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// ドメインを含む場合に `true` を返します。
    pub fn contains(&self, domain: &str) -> bool {
        self.0.contains(domain)
    }

    /// ドメインを追加します。新しく追加された場合は `true` を返します。
    pub fn insert<S>(&mut self, domain: S) -> bool
    where
        S: Into<String>,
    {
        self.0.insert(domain.into())
    }

    /// 別の集合との和集合をとります。
    ///
    /// # 戻り値
    ///
    /// 新しく加わったドメインの数
    pub fn union_with(&mut self, other: &DomainSet) -> usize {
        let before = self.0.len();
        for domain in &other.0 {
            if !self.0.contains(domain) {
                self.0.insert(domain.clone());
            }
        }
        self.0.len() - before
    }

    /// ドメインを辞書順に列挙します。
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S> FromIterator<S> for DomainSet
where
    S: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// 名詞の見出し語から概念ドメイン集合を求める機能
pub trait DomainResolver {
    /// 見出し語の概念ドメイン集合を返します。
    ///
    /// 見出し語が資源に存在しない場合は空の集合を返します。これはエラーではありません。
    /// 同じ資源に対して同じ見出し語を与えた場合、常に同じ集合を返す必要があります。
    fn resolve(&self, lemma: &str) -> DomainSet;

    /// ドメインの解決に使われた語義クラスを順位の順に返します。
    ///
    /// 語義クラスを持たない解決器は空のベクターを返します。
    fn sense_classes(&self, _lemma: &str) -> Vec<String> {
        vec![]
    }

    /// 資源が利用可能かどうかを確認します。
    ///
    /// # エラー
    ///
    /// 資源がまったく利用できない場合、[`AnalysisError::ResourceUnavailable`] を返します。
    fn check(&self) -> Result<()> {
        Ok(())
    }
}

impl<R> DomainResolver for Arc<R>
where
    R: DomainResolver + ?Sized,
{
    fn resolve(&self, lemma: &str) -> DomainSet {
        (**self).resolve(lemma)
    }

    fn sense_classes(&self, lemma: &str) -> Vec<String> {
        (**self).sense_classes(lemma)
    }

    fn check(&self) -> Result<()> {
        (**self).check()
    }
}

/// 語義の扱い方
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SensePolicy {
    /// すべての語義のドメインの和集合をとります。
    #[default]
    AllSenses,
    /// 最も順位の高い語義のドメインだけを使用します。
    FirstSense,
}

impl FromStr for SensePolicy {
    type Err = &'static str;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::AllSenses),
            "first" => Ok(Self::FirstSense),
            _ => Err("Could not parse a sense policy"),
        }
    }
}

/// [`DomainLexicon`] と [`DomainTaxonomy`] による解決器
pub struct LexiconResolver {
    lexicon: DomainLexicon,
    taxonomy: DomainTaxonomy,
    senses: SensePolicy,
}

impl LexiconResolver {
    /// 新しい解決器を作成します。
    pub fn new(lexicon: DomainLexicon, taxonomy: DomainTaxonomy) -> Self {
        Self {
            lexicon,
            taxonomy,
            senses: SensePolicy::default(),
        }
    }

    /// 語義の扱い方を設定します。
    pub fn sense_policy(mut self, senses: SensePolicy) -> Self {
        self.senses = senses;
        self
    }

    /// 語彙資源への参照を返します。
    pub fn lexicon(&self) -> &DomainLexicon {
        &self.lexicon
    }

    fn selected_classes(&self, lemma: &str) -> Vec<&str> {
        let mut classes = self.lexicon.sense_classes(lemma);
        if self.senses == SensePolicy::FirstSense {
            classes.truncate(1);
        }
        classes
    }
}

impl DomainResolver for LexiconResolver {
    fn resolve(&self, lemma: &str) -> DomainSet {
        self.selected_classes(lemma)
            .into_iter()
            .filter_map(|class| self.taxonomy.domain(class))
            .collect()
    }

    fn sense_classes(&self, lemma: &str) -> Vec<String> {
        self.selected_classes(lemma)
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    fn check(&self) -> Result<()> {
        if self.lexicon.is_empty() {
            return Err(AnalysisError::resource_unavailable(
                "the lexicon contains no entries",
            ));
        }
        Ok(())
    }
}

/// キャッシュの利用状況
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// 見出し語ごとの結果をメモ化する解決器
///
/// 読み取りが大半を占めるため `RwLock` で保護します。
/// 複数のスレッドが同じ見出し語を同時に解決した場合、計算は重複しますが、
/// 最初に登録された結果だけが保持されます。
pub struct CachedResolver<R> {
    inner: R,
    cache: RwLock<HashMap<String, Arc<DomainSet>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<R> CachedResolver<R>
where
    R: DomainResolver,
{
    /// 新しいインスタンスを作成します。
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            cache: RwLock::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// キャッシュから結果を返します。存在しない場合は解決して登録します。
    pub fn get_or_resolve(&self, lemma: &str) -> Arc<DomainSet> {
        if let Some(domains) = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(lemma)
        {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Arc::clone(domains);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let resolved = Arc::new(self.inner.resolve(lemma));

        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(cache.entry(lemma.to_string()).or_insert(resolved))
    }

    /// 内部の解決器への参照を返します。
    pub fn inner(&self) -> &R {
        &self.inner
    }

    /// キャッシュの利用状況を返します。
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.cache.read().unwrap_or_else(PoisonError::into_inner).len(),
        }
    }
}

impl<R> DomainResolver for CachedResolver<R>
where
    R: DomainResolver,
{
    fn resolve(&self, lemma: &str) -> DomainSet {
        DomainSet::clone(&self.get_or_resolve(lemma))
    }

    fn sense_classes(&self, lemma: &str) -> Vec<String> {
        self.inner.sense_classes(lemma)
    }

    fn check(&self) -> Result<()> {
        self.inner.check()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;

    const LEXICON_CSV: &str = "\
banco,noun.artifact
banco,noun.group
fruta,noun.food
pedra,noun.plant
";

    fn resolver() -> LexiconResolver {
        LexiconResolver::new(
            DomainLexicon::from_reader(LEXICON_CSV.as_bytes()).unwrap(),
            DomainTaxonomy::wordnet_pt(),
        )
    }

    #[test]
    fn test_union_with() {
        let mut a: DomainSet = ["FOOD"].into_iter().collect();
        let b: DomainSet = ["FOOD", "POLITICS"].into_iter().collect();
        assert_eq!(1, a.union_with(&b));
        assert_eq!(0, a.union_with(&b));
        assert_eq!(vec!["FOOD", "POLITICS"], a.iter().collect::<Vec<_>>());
    }

    #[test]
    fn test_all_senses() {
        let domains = resolver().resolve("banco");
        assert_eq!(vec!["objeto", "organização"], domains.iter().collect::<Vec<_>>());
        assert_eq!(vec!["outro"], resolver().resolve("pedra").iter().collect::<Vec<_>>());
    }

    #[test]
    fn test_first_sense() {
        let r = resolver().sense_policy(SensePolicy::FirstSense);
        assert_eq!(vec!["objeto"], r.resolve("banco").iter().collect::<Vec<_>>());
    }

    #[test]
    fn test_sense_classes_follow_policy() {
        let all = CachedResolver::new(resolver());
        assert_eq!(vec!["noun.artifact", "noun.group"], all.sense_classes("Banco"));
        assert!(all.sense_classes("cadeira").is_empty());

        let first = resolver().sense_policy(SensePolicy::FirstSense);
        assert_eq!(vec!["noun.artifact"], first.sense_classes("banco"));
    }

    #[test]
    fn test_missing_lemma_is_empty() {
        let r = resolver();
        assert!(r.resolve("cadeira").is_empty());
        assert_eq!(r.resolve("cadeira"), r.resolve("cadeira"));
    }

    #[test]
    fn test_empty_lexicon_is_unavailable() {
        let r = LexiconResolver::new(DomainLexicon::default(), DomainTaxonomy::identity());
        assert!(matches!(
            r.check(),
            Err(AnalysisError::ResourceUnavailable { .. })
        ));
        assert!(resolver().check().is_ok());
    }

    struct CountingResolver {
        calls: AtomicUsize,
    }

    impl DomainResolver for CountingResolver {
        fn resolve(&self, lemma: &str) -> DomainSet {
            self.calls.fetch_add(1, Ordering::SeqCst);
            [lemma.to_uppercase()].into_iter().collect()
        }
    }

    #[test]
    fn test_cache_resolves_once() {
        let cached = CachedResolver::new(CountingResolver {
            calls: AtomicUsize::new(0),
        });
        let first = cached.get_or_resolve("fruta");
        let second = cached.get_or_resolve("fruta");
        assert_eq!(first, second);
        assert_eq!(1, cached.inner().calls.load(Ordering::SeqCst));
        assert_eq!(
            CacheStats {
                hits: 1,
                misses: 1,
                entries: 1
            },
            cached.stats()
        );
    }

    #[test]
    fn test_cache_shared_between_threads() {
        let cached = CachedResolver::new(CountingResolver {
            calls: AtomicUsize::new(0),
        });
        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for lemma in ["fruta", "governo", "banco"] {
                        assert_eq!(1, cached.get_or_resolve(lemma).len());
                    }
                });
            }
        });
        assert_eq!(3, cached.stats().entries);
        assert_eq!(12, cached.stats().hits + cached.stats().misses);
    }
}
