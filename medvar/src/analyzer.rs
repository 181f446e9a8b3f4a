//! コーパス全体の分析を行うアナライザー。
//!
//! 抽出、ドメイン解決、集約、スコア計算の各段階を順に実行し、
//! 見出し語ごとの意味的変動性を求めます。
//!
//! # 主要な構造体
//!
//! - [`Analyzer`]: 解決器と実行時の設定を保持するアナライザー
//! - [`Worker`]: レコードを1件ずつ処理して集約状態を蓄積するワーカー
//!
//! # 例
//!
//! ```
//! use medvar::{Analyzer, CorpusRecord, ConstructionType, DomainLexicon, DomainTaxonomy, LexiconResolver, PosTag, TaggedToken};
//!
//! let lexicon = DomainLexicon::from_reader("fruta,FOOD\n".as_bytes())?;
//! let resolver = LexiconResolver::new(lexicon, DomainTaxonomy::identity());
//! let analyzer = Analyzer::new(resolver)?;
//!
//! let record = CorpusRecord::new(
//!     ConstructionType::NounAdj,
//!     vec![
//!         TaggedToken::from_surface("fruta", PosTag::Noun),
//!         TaggedToken::from_surface("fresca", PosTag::Adjective),
//!     ],
//! );
//! let report = analyzer.run([&record])?;
//! assert_eq!(1, report.results[0].raw_score);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
pub mod worker;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::aggregate::{AggregationContext, SvoArguments};
use crate::errors::{AnalysisError, Result};
use crate::record::CorpusRecord;
use crate::report::{ConstructionTrace, Report, RunStats};
use crate::resolver::{CachedResolver, DomainResolver};
use crate::score;

pub use crate::analyzer::worker::{Stage, Worker};

/// 協調的な停止要求を伝えるフラグ
///
/// クローンは同じフラグを共有します。
#[derive(Clone, Debug, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    /// 新しいフラグを作成します。
    pub fn new() -> Self {
        Self::default()
    }

    /// 停止を要求します。
    pub fn stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// 停止が要求されている場合に `true` を返します。
    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// 意味的変動性を求めるアナライザー
///
/// 解決器は [`CachedResolver`] で包まれ、[`Analyzer::new_worker`] で生成した
/// すべてのワーカーの間で共有されます。キャッシュは1回の実行ごとではなく
/// アナライザーの寿命の間保持されますが、解決結果は見出し語に対して決定的なので
/// 結果には影響しません。
pub struct Analyzer<R> {
    resolver: Arc<CachedResolver<R>>,
    svo_arguments: SvoArguments,
    noun_profiles: bool,
    keep_trace: bool,
    stop: Option<StopFlag>,
}

impl<R> Clone for Analyzer<R> {
    fn clone(&self) -> Self {
        Self {
            resolver: Arc::clone(&self.resolver),
            svo_arguments: self.svo_arguments,
            noun_profiles: self.noun_profiles,
            keep_trace: self.keep_trace,
            stop: self.stop.clone(),
        }
    }
}

impl<R> Analyzer<R>
where
    R: DomainResolver,
{
    /// 新しいアナライザーを作成します。
    ///
    /// # 引数
    ///
    /// * `resolver` - 名詞のドメインを求める解決器
    ///
    /// # エラー
    ///
    /// 解決器の資源が利用できない場合、[`AnalysisError::ResourceUnavailable`] が返されます。
    /// この場合、レコードは1件も処理されません。
    pub fn new(resolver: R) -> Result<Self> {
        resolver.check()?;
        Ok(Self {
            resolver: Arc::new(CachedResolver::new(resolver)),
            svo_arguments: SvoArguments::default(),
            noun_profiles: false,
            keep_trace: false,
            stop: None,
        })
    }

    /// SVOの主語と目的語の扱い方を設定します。
    pub fn svo_arguments(mut self, svo_arguments: SvoArguments) -> Self {
        self.svo_arguments = svo_arguments;
        self
    }

    /// 形容詞の構文構造について、名詞ごとのプロファイルも作るかどうかを設定します。
    ///
    /// 有効にすると、`n_adj` と `adj_n` の形容詞の見出し語を同じ解決器で解決し、
    /// 修飾される名詞を見出し語とする [`Scope::Noun`](crate::Scope::Noun)
    /// のプロファイルに加えます。形容詞の解決は名詞の統計には計上されません。
    pub fn noun_profiles(mut self, yes: bool) -> Self {
        self.noun_profiles = yes;
        self
    }

    /// 抽出された構文構造を [`Report::traces`] に残すかどうかを設定します。
    pub fn keep_trace(mut self, yes: bool) -> Self {
        self.keep_trace = yes;
        self
    }

    /// 停止要求を受け取るフラグを設定します。
    pub fn stop_flag(mut self, flag: StopFlag) -> Self {
        self.stop = Some(flag);
        self
    }

    /// 共有されている解決器を返します。
    pub fn resolver(&self) -> &CachedResolver<R> {
        &self.resolver
    }

    /// 新しいワーカーを作成します。
    pub fn new_worker(&self) -> Worker<R> {
        Worker::new(self.clone())
    }

    fn is_stopped(&self) -> bool {
        self.stop.as_ref().is_some_and(StopFlag::is_stopped)
    }

    /// レコード列を順に処理し、結果を返します。
    ///
    /// 抽出に失敗したレコードは読み飛ばされ、[`RunStats`] に計上されます。
    ///
    /// # エラー
    ///
    /// 停止が要求された場合、[`AnalysisError::Cancelled`] が返されます。
    /// 途中までの結果は返されません。
    pub fn run<'a, I>(&self, records: I) -> Result<Report>
    where
        I: IntoIterator<Item = &'a CorpusRecord>,
    {
        let mut worker = self.new_worker();
        for (i, record) in records.into_iter().enumerate() {
            if self.is_stopped() {
                return Err(AnalysisError::Cancelled { processed: i });
            }
            if let Err(failure) = worker.process(record) {
                log::debug!("Skipped record {i}: {failure}");
            }
        }
        Ok(worker.finish())
    }

    /// レコード列を複数のスレッドで処理し、結果を返します。
    ///
    /// レコードは連続する区間に分割され、各スレッドが1つのワーカーで処理します。
    /// 集約は可換かつ結合的なので、結果は [`Analyzer::run`] と一致します。
    /// 構文構造の記録は入力の順に並びます。
    ///
    /// # 引数
    ///
    /// * `records` - 処理するレコード
    /// * `num_threads` - スレッド数。0は1として扱われます。
    ///
    /// # エラー
    ///
    /// 停止が要求された場合は [`AnalysisError::Cancelled`]、
    /// ワーカースレッドがパニックした場合は [`AnalysisError::ThreadPanic`] が返されます。
    pub fn run_parallel(&self, records: &[CorpusRecord], num_threads: usize) -> Result<Report>
    where
        R: Send + Sync,
    {
        let num_threads = num_threads.max(1);
        if num_threads == 1 || records.len() <= 1 {
            return self.run(records);
        }
        let chunk_size = records.len().div_ceil(num_threads);

        let partials = std::thread::scope(|s| {
            let handles: Vec<_> = records
                .chunks(chunk_size)
                .enumerate()
                .map(|(chunk_idx, chunk)| {
                    let offset = chunk_idx * chunk_size;
                    s.spawn(move || -> Result<Partial> {
                        let mut worker = self.new_worker();
                        for (i, record) in chunk.iter().enumerate() {
                            if self.is_stopped() {
                                return Err(AnalysisError::Cancelled { processed: i });
                            }
                            if let Err(failure) = worker.process(record) {
                                log::debug!("Skipped record {}: {failure}", offset + i);
                            }
                        }
                        Ok(worker.into_partial())
                    })
                })
                .collect();

            handles
                .into_iter()
                .map(|handle| {
                    handle
                        .join()
                        .map_err(|e| AnalysisError::ThreadPanic(panic_message(e.as_ref())))
                })
                .collect::<Vec<_>>()
        });

        let mut merged = Partial::new(self.svo_arguments);
        let mut cancelled = None;
        for partial in partials {
            match partial? {
                Ok(partial) => merged.merge(partial),
                Err(AnalysisError::Cancelled { processed }) => {
                    *cancelled.get_or_insert(0) += processed;
                }
                Err(e) => return Err(e),
            }
        }
        if let Some(processed) = cancelled {
            return Err(AnalysisError::Cancelled {
                processed: processed + merged.stats.records as usize,
            });
        }
        Ok(merged.finish())
    }
}

fn panic_message(e: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = e.downcast_ref::<&'static str>() {
        s.to_string()
    } else if let Some(s) = e.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

/// スコア計算前の集約状態
pub(crate) struct Partial {
    pub(crate) context: AggregationContext,
    pub(crate) stats: RunStats,
    pub(crate) traces: Vec<ConstructionTrace>,
}

impl Partial {
    pub(crate) fn new(svo_arguments: SvoArguments) -> Self {
        Self {
            context: AggregationContext::new(svo_arguments),
            stats: RunStats::default(),
            traces: vec![],
        }
    }

    fn merge(&mut self, other: Partial) {
        self.context.merge(other.context);
        self.stats.merge(other.stats);
        self.traces.extend(other.traces);
    }

    /// すべてのプロファイルのスコアを計算し、表示用の順に並べます。
    pub(crate) fn finish(self) -> Report {
        let num_profiles = self.context.len();
        let mut results: Vec<_> = self
            .context
            .into_profiles()
            .map(|profile| score::score(&profile))
            .collect();
        results.sort_by(score::presentation_order);

        let stats = self.stats;
        log::info!(
            "{} records: {} extracted, {} skipped; {} resolved nouns, {} unresolved nouns; {} profiles",
            stats.records,
            stats.extracted,
            stats.skipped,
            stats.resolved_nouns,
            stats.unresolved_nouns,
            num_profiles,
        );
        for (kind, count) in &stats.failures {
            log::info!("  {kind}: {count}");
        }

        Report {
            results,
            stats,
            traces: self.traces,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::lexicon::{DomainLexicon, DomainTaxonomy};
    use crate::record::{ConstructionType, PosTag, TaggedToken};
    use crate::resolver::{DomainSet, LexiconResolver};

    fn n(s: &str) -> TaggedToken {
        TaggedToken::from_surface(s, PosTag::Noun)
    }

    fn a(s: &str) -> TaggedToken {
        TaggedToken::from_surface(s, PosTag::Adjective)
    }

    fn v(s: &str) -> TaggedToken {
        TaggedToken::from_surface(s, PosTag::Verb)
    }

    fn analyzer() -> Analyzer<LexiconResolver> {
        let lexicon = DomainLexicon::from_reader(
            "\
fruta,FOOD
peixe,FOOD
governo,POLITICS
menino,PERSON
"
            .as_bytes(),
        )
        .unwrap();
        Analyzer::new(LexiconResolver::new(lexicon, DomainTaxonomy::identity())).unwrap()
    }

    fn records() -> Vec<CorpusRecord> {
        vec![
            CorpusRecord::new(ConstructionType::NounAdj, vec![n("fruta"), a("fresca")]),
            CorpusRecord::new(ConstructionType::NounAdj, vec![n("peixe"), a("fresco")]),
            CorpusRecord::new(ConstructionType::NounAdj, vec![n("governo"), a("fresco")]),
            CorpusRecord::new(ConstructionType::Svo, vec![n("menino"), v("comer"), n("fruta")]),
            CorpusRecord::new(ConstructionType::Svo, vec![n("menino"), n("fruta")]),
            CorpusRecord::new(ConstructionType::AdjNoun, vec![a("novo"), n("cadeira")]),
        ]
    }

    #[test]
    fn test_run() {
        let report = analyzer().run(&records()).unwrap();

        let fresco = report.find("fresco", ConstructionType::NounAdj).next().unwrap();
        assert_eq!(2, fresco.raw_score);
        assert_eq!(2, fresco.occurrences);
        assert_eq!(vec!["FOOD", "POLITICS"], fresco.domains);

        let comer = report.find("comer", ConstructionType::Svo).next().unwrap();
        assert_eq!(vec!["FOOD", "PERSON"], comer.domains);

        let novo = report.find("novo", ConstructionType::AdjNoun).next().unwrap();
        assert_eq!(1, novo.occurrences);
        assert_eq!(0, novo.raw_score);
        assert_eq!(0.0, novo.normalized_score);

        assert_eq!(6, report.stats.records);
        assert_eq!(5, report.stats.extracted);
        assert_eq!(1, report.stats.skipped);
        assert_eq!(Some(&1), report.stats.failures.get("missing_verb"));
        assert_eq!(1, report.stats.unresolved_nouns);
        assert!(report.traces.is_empty());
    }

    #[test]
    fn test_results_are_ordered() {
        let report = analyzer().run(&records()).unwrap();
        let kinds: Vec<_> = report.results.iter().map(|r| r.construction).collect();
        let mut sorted = kinds.clone();
        sorted.sort();
        assert_eq!(sorted, kinds);
        assert_eq!("comer", report.results[0].lemma);
        assert_eq!("fresco", report.results[1].lemma);
    }

    #[test]
    fn test_separate_svo_arguments() {
        let report = analyzer()
            .svo_arguments(SvoArguments::Separate)
            .run(&records())
            .unwrap();
        let comer: Vec<_> = report.find("comer", ConstructionType::Svo).collect();
        assert_eq!(2, comer.len());
        assert_eq!(vec!["PERSON"], comer[0].domains);
        assert_eq!(vec!["FOOD"], comer[1].domains);
    }

    #[test]
    fn test_keep_trace() {
        let report = analyzer().keep_trace(true).run(&records()).unwrap();
        assert_eq!(5, report.traces.len());
        assert_eq!("governo fresco", report.traces[2].text);
        let noun = &report.traces[2].nouns[0];
        assert_eq!("governo", noun.noun);
        assert_eq!(vec!["POLITICS"], noun.sense_classes);
        assert!(noun.domains.contains("POLITICS"));
    }

    #[test]
    fn test_run_parallel() {
        let analyzer = analyzer().keep_trace(true);
        let mut records = records();
        for _ in 0..5 {
            records.extend_from_within(..6);
        }
        let sequential = analyzer.run(&records).unwrap();
        for num_threads in [0, 1, 2, 3, 7, 64] {
            let parallel = analyzer.run_parallel(&records, num_threads).unwrap();
            assert_eq!(sequential, parallel);
        }
    }

    #[test]
    fn test_cancelled() {
        let flag = StopFlag::new();
        let analyzer = analyzer().stop_flag(flag.clone());
        assert!(analyzer.run(&records()).is_ok());

        flag.stop();
        assert!(matches!(
            analyzer.run(&records()),
            Err(AnalysisError::Cancelled { processed: 0 })
        ));
        assert!(matches!(
            analyzer.run_parallel(&records(), 2),
            Err(AnalysisError::Cancelled { .. })
        ));
    }

    struct Unavailable;

    impl DomainResolver for Unavailable {
        fn resolve(&self, _lemma: &str) -> DomainSet {
            DomainSet::new()
        }

        fn check(&self) -> Result<()> {
            Err(AnalysisError::resource_unavailable("offline"))
        }
    }

    #[test]
    fn test_unavailable_resource() {
        assert!(matches!(
            Analyzer::new(Unavailable),
            Err(AnalysisError::ResourceUnavailable { .. })
        ));
    }

    struct Panicking;

    impl DomainResolver for Panicking {
        fn resolve(&self, lemma: &str) -> DomainSet {
            panic!("cannot resolve {lemma}");
        }
    }

    #[test]
    fn test_thread_panic() {
        let analyzer = Analyzer::new(Panicking).unwrap();
        let result = analyzer.run_parallel(&records(), 2);
        assert!(matches!(result, Err(AnalysisError::ThreadPanic(_))));
    }
}
