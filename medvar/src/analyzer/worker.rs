//! レコードを1件ずつ処理するワーカー。
//!
//! ワーカーは集約状態と名詞ドメインの作業領域を保持し、
//! それらを再利用することで不要なメモリアロケーションを避けます。
use std::sync::Arc;

use crate::aggregate::NounDomains;
use crate::analyzer::{Analyzer, Partial};
use crate::construction::{self, Construction};
use crate::errors::ExtractionFailure;
use crate::record::{ConstructionType, CorpusRecord};
use crate::report::{ConstructionTrace, NounTrace, Report};
use crate::resolver::DomainResolver;

/// ワーカーの処理段階
///
/// 段階は `Init` から始まり、レコードごとに `Extracting`、`Resolving`、`Aggregating`
/// の順に進みます。抽出に失敗したレコードは `Extracting` で止まり、次のレコードに移ります。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Init,
    Extracting,
    Resolving,
    Aggregating,
    Scoring,
    Done,
}

/// 分析処理のためのルーチンを提供する構造体。
///
/// # 例
///
/// ```
/// use medvar::{Analyzer, CorpusRecord, ConstructionType, DomainLexicon, DomainTaxonomy, LexiconResolver, PosTag, Stage, TaggedToken};
///
/// let lexicon = DomainLexicon::from_reader("pedra,noun.object\n".as_bytes())?;
/// let analyzer = Analyzer::new(LexiconResolver::new(lexicon, DomainTaxonomy::wordnet_pt()))?;
/// let mut worker = analyzer.new_worker();
/// assert_eq!(Stage::Init, worker.stage());
///
/// worker.process(&CorpusRecord::new(
///     ConstructionType::AdjNoun,
///     vec![
///         TaggedToken::from_surface("dura", PosTag::Adjective),
///         TaggedToken::from_surface("pedra", PosTag::Noun),
///     ],
/// ))?;
/// assert_eq!(Stage::Aggregating, worker.stage());
///
/// let report = worker.finish();
/// assert_eq!(vec!["objeto"], report.results[0].domains);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Worker<R> {
    analyzer: Analyzer<R>,
    partial: Partial,
    nouns: NounDomains,
    stage: Stage,
}

impl<R> Worker<R>
where
    R: DomainResolver,
{
    pub(crate) fn new(analyzer: Analyzer<R>) -> Self {
        let partial = Partial::new(analyzer.svo_arguments);
        Self {
            analyzer,
            partial,
            nouns: NounDomains::new(),
            stage: Stage::Init,
        }
    }

    /// 現在の処理段階を返します。
    #[inline(always)]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// これまでに処理したレコード数を返します。
    pub fn num_records(&self) -> u64 {
        self.partial.stats.records
    }

    fn set_stage(&mut self, stage: Stage) {
        log::trace!("{:?} -> {:?}", self.stage, stage);
        self.stage = stage;
    }

    /// レコードを1件処理します。
    ///
    /// 構文構造を抽出し、名詞のドメインを解決して集約状態に加えます。
    ///
    /// # エラー
    ///
    /// 抽出に失敗した場合、[`ExtractionFailure`] が返されます。
    /// 失敗は実行統計に計上され、集約状態は変わりません。
    pub fn process(&mut self, record: &CorpusRecord) -> Result<(), ExtractionFailure> {
        self.partial.stats.records += 1;

        self.set_stage(Stage::Extracting);
        let construction = match construction::extract(record) {
            Ok(construction) => construction,
            Err(failure) => {
                self.partial.stats.skip(&failure);
                return Err(failure);
            }
        };
        self.partial.stats.extracted += 1;

        self.set_stage(Stage::Resolving);
        self.resolve_nouns(&construction);

        self.set_stage(Stage::Aggregating);
        self.partial.context.accumulate(&construction, &self.nouns);
        if self.analyzer.noun_profiles && construction.kind() != ConstructionType::Svo {
            let modifier = self.analyzer.resolver.get_or_resolve(construction.target());
            self.partial.context.accumulate_modifier(&construction, &modifier);
        }

        if self.analyzer.keep_trace {
            let nouns = construction
                .nouns()
                .map(|(_, noun)| NounTrace {
                    noun: noun.to_string(),
                    sense_classes: self.analyzer.resolver.sense_classes(noun),
                    domains: self.nouns.get(noun).map(Arc::clone).unwrap_or_default(),
                })
                .collect();
            self.partial.traces.push(ConstructionTrace {
                text: record.text(),
                construction,
                nouns,
            });
        }
        Ok(())
    }

    fn resolve_nouns(&mut self, construction: &Construction) {
        self.nouns.clear();
        for (_, noun) in construction.nouns() {
            let domains = self.analyzer.resolver.get_or_resolve(noun);
            if domains.is_empty() {
                self.partial.stats.unresolved_nouns += 1;
            } else {
                self.partial.stats.resolved_nouns += 1;
            }
            self.nouns.insert(noun.to_string(), domains);
        }
    }

    pub(crate) fn into_partial(self) -> Partial {
        self.partial
    }

    /// スコアを計算して結果を返します。
    pub fn finish(mut self) -> Report {
        self.set_stage(Stage::Scoring);
        let report = self.partial.finish();
        self.stage = Stage::Done;
        log::debug!("{:?}", self.stage);
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::aggregate::Scope;
    use crate::record::{PosTag, TaggedToken};
    use crate::resolver::DomainSet;

    struct Upper;

    impl DomainResolver for Upper {
        fn resolve(&self, lemma: &str) -> DomainSet {
            if lemma == "nada" {
                return DomainSet::new();
            }
            [lemma.to_uppercase()].into_iter().collect()
        }
    }

    #[test]
    fn test_stages() {
        let analyzer = Analyzer::new(Upper).unwrap();
        let mut worker = analyzer.new_worker();
        assert_eq!(Stage::Init, worker.stage());

        let bad = CorpusRecord::new(ConstructionType::NounAdj, vec![]);
        assert_eq!(Err(ExtractionFailure::EmptyRecord), worker.process(&bad));
        assert_eq!(Stage::Extracting, worker.stage());

        let good = CorpusRecord::new(
            ConstructionType::NounAdj,
            vec![
                TaggedToken::from_surface("nada", PosTag::Noun),
                TaggedToken::from_surface("novo", PosTag::Adjective),
            ],
        );
        assert_eq!(Ok(()), worker.process(&good));
        assert_eq!(Stage::Aggregating, worker.stage());
        assert_eq!(2, worker.num_records());

        let report = worker.finish();
        assert_eq!(1, report.stats.skipped);
        assert_eq!(Some(&1), report.stats.failures.get("empty_record"));
        assert_eq!(1, report.stats.unresolved_nouns);
        assert_eq!(1, report.results[0].occurrences);
        assert!(report.results[0].domains.is_empty());
    }

    #[test]
    fn test_noun_profiles() {
        let analyzer = Analyzer::new(Upper).unwrap().noun_profiles(true);
        let mut worker = analyzer.new_worker();
        let n_adj = CorpusRecord::new(
            ConstructionType::NounAdj,
            vec![
                TaggedToken::from_surface("peixe", PosTag::Noun),
                TaggedToken::from_surface("fresco", PosTag::Adjective),
            ],
        );
        let svo = CorpusRecord::new(
            ConstructionType::Svo,
            vec![
                TaggedToken::from_surface("menino", PosTag::Noun),
                TaggedToken::from_surface("come", PosTag::Verb),
                TaggedToken::from_surface("peixe", PosTag::Noun),
            ],
        );
        worker.process(&n_adj).unwrap();
        worker.process(&svo).unwrap();

        let report = worker.finish();
        assert_eq!(3, report.results.len());
        let peixe = &report.results[2];
        assert_eq!(
            ("peixe", ConstructionType::NounAdj, Scope::Noun),
            (peixe.lemma.as_str(), peixe.construction, peixe.scope)
        );
        assert_eq!(vec!["FRESCO"], peixe.domains);
        assert_eq!(3, report.stats.resolved_nouns);
    }

    #[test]
    fn test_resolver_cache_is_shared() {
        let analyzer = Analyzer::new(Upper).unwrap();
        let record = CorpusRecord::new(
            ConstructionType::NounAdj,
            vec![
                TaggedToken::from_surface("fruta", PosTag::Noun),
                TaggedToken::from_surface("fresca", PosTag::Adjective),
            ],
        );
        let mut w1 = analyzer.new_worker();
        let mut w2 = analyzer.new_worker();
        w1.process(&record).unwrap();
        w2.process(&record).unwrap();
        let stats = analyzer.resolver().stats();
        assert_eq!(1, stats.misses);
        assert_eq!(1, stats.hits);
    }
}
