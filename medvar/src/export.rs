//! 分析結果の書き出し
//!
//! [`Report`] をCSVとして書き出します。書き出しに失敗しても [`Report`] は変更されないため、
//! 呼び出し側は再計算せずに書き出しを再試行できます。

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::errors::{AnalysisError, Result};
use crate::report::Report;
use crate::utils;

/// 変動性の表の見出し行
pub const VARIABILITY_HEADER: &[&str] = &[
    "lemma",
    "construction",
    "scope",
    "occurrences",
    "domain_count",
    "raw_score",
    "normalized_score",
    "domains",
];

/// 構文構造の表の見出し行
pub const CONSTRUCTIONS_HEADER: &[&str] = &[
    "construction",
    "target",
    "scope",
    "noun",
    "sense_classes",
    "domains",
    "text",
];

const DOMAIN_SEPARATOR: &str = "; ";

/// 見出し語ごとの変動性をCSVで書き出します。
///
/// 1行が1つのプロファイルに対応し、[`Report::results`] の順に並びます。
/// ドメインは `; ` で連結されます。
///
/// # エラー
///
/// 書き込みに失敗した場合、[`AnalysisError::Export`] が返されます。
pub fn write_variability<W>(report: &Report, wtr: W) -> Result<()>
where
    W: Write,
{
    write_variability_inner(report, wtr).map_err(AnalysisError::Export)
}

fn write_variability_inner<W>(report: &Report, wtr: W) -> std::io::Result<()>
where
    W: Write,
{
    let mut wtr = BufWriter::new(wtr);
    utils::write_csv_row(&mut wtr, VARIABILITY_HEADER)?;
    for r in &report.results {
        let row = [
            r.lemma.clone(),
            r.construction.to_string(),
            r.scope.to_string(),
            r.occurrences.to_string(),
            r.domain_count.to_string(),
            r.raw_score.to_string(),
            format!("{:.6}", r.normalized_score),
            r.domains.join(DOMAIN_SEPARATOR),
        ];
        utils::write_csv_row(&mut wtr, &row)?;
    }
    wtr.flush()
}

/// 抽出された構文構造をCSVで書き出します。
///
/// 構文構造の名詞1つにつき1行です。[`Analyzer::keep_trace`](crate::Analyzer::keep_trace)
/// を有効にして実行した場合にだけ行が出力されます。
///
/// # エラー
///
/// 書き込みに失敗した場合、[`AnalysisError::Export`] が返されます。
pub fn write_constructions<W>(report: &Report, wtr: W) -> Result<()>
where
    W: Write,
{
    write_constructions_inner(report, wtr).map_err(AnalysisError::Export)
}

fn write_constructions_inner<W>(report: &Report, wtr: W) -> std::io::Result<()>
where
    W: Write,
{
    let mut wtr = BufWriter::new(wtr);
    utils::write_csv_row(&mut wtr, CONSTRUCTIONS_HEADER)?;
    for trace in &report.traces {
        let construction = &trace.construction;
        for ((slot, _), noun) in construction.nouns().zip(&trace.nouns) {
            let sense_classes = noun.sense_classes.join(DOMAIN_SEPARATOR);
            let domains = noun.domains.iter().collect::<Vec<_>>().join(DOMAIN_SEPARATOR);
            let row = [
                construction.kind().as_str(),
                construction.target(),
                slot.as_str(),
                noun.noun.as_str(),
                sense_classes.as_str(),
                domains.as_str(),
                trace.text.as_str(),
            ];
            utils::write_csv_row(&mut wtr, &row)?;
        }
    }
    wtr.flush()
}

fn create_file(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    File::create(path)
}

/// [`write_variability`] の結果をファイルに書き出します。親ディレクトリは必要に応じて作成されます。
pub fn write_variability_to_path<P>(report: &Report, path: P) -> Result<()>
where
    P: AsRef<Path>,
{
    let file = create_file(path.as_ref()).map_err(AnalysisError::Export)?;
    write_variability(report, file)
}

/// [`write_constructions`] の結果をファイルに書き出します。親ディレクトリは必要に応じて作成されます。
pub fn write_constructions_to_path<P>(report: &Report, path: P) -> Result<()>
where
    P: AsRef<Path>,
{
    let file = create_file(path.as_ref()).map_err(AnalysisError::Export)?;
    write_constructions(report, file)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::aggregate::Scope;
    use crate::analyzer::Analyzer;
    use crate::record::{ConstructionType, CorpusRecord, PosTag, TaggedToken};
    use crate::resolver::{DomainResolver, DomainSet};
    use crate::score::VariabilityResult;

    fn report() -> Report {
        Report {
            results: vec![VariabilityResult {
                lemma: "fresco".to_string(),
                construction: ConstructionType::NounAdj,
                scope: Scope::All,
                occurrences: 3,
                domain_count: 2,
                raw_score: 2,
                normalized_score: 2.0 / 3.0,
                domains: vec!["FOOD".to_string(), "POLITICS, LAW".to_string()],
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_write_variability() {
        let mut buf = vec![];
        write_variability(&report(), &mut buf).unwrap();
        let expected = "\
lemma,construction,scope,occurrences,domain_count,raw_score,normalized_score,domains
fresco,n_adj,all,3,2,2,0.666667,\"FOOD; POLITICS, LAW\"
";
        assert_eq!(expected, String::from_utf8(buf).unwrap());
    }

    struct Upper;

    impl DomainResolver for Upper {
        fn resolve(&self, lemma: &str) -> DomainSet {
            [lemma.to_uppercase()].into_iter().collect()
        }
    }

    #[test]
    fn test_write_constructions() {
        let record = CorpusRecord::new(
            ConstructionType::Svo,
            vec![
                TaggedToken::from_surface("Menino", PosTag::Noun),
                TaggedToken::from_surface("come", PosTag::Verb),
                TaggedToken::new("fruta", PosTag::Noun, "fruta"),
            ],
        );
        let report = Analyzer::new(Upper)
            .unwrap()
            .keep_trace(true)
            .run([&record])
            .unwrap();
        let mut buf = vec![];
        write_constructions(&report, &mut buf).unwrap();
        let expected = "\
construction,target,scope,noun,sense_classes,domains,text
svo,come,subject,menino,,MENINO,Menino come fruta
svo,come,object,fruta,,FRUTA,Menino come fruta
";
        assert_eq!(expected, String::from_utf8(buf).unwrap());
    }

    #[test]
    fn test_write_to_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("variability.csv");
        write_variability_to_path(&report(), &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_write_to_unwritable_path() {
        let dir = tempfile::tempdir().unwrap();
        let report = report();
        let result = write_variability_to_path(&report, dir.path());
        assert!(matches!(result, Err(AnalysisError::Export(_))));
        assert_eq!(1, report.results.len());
    }
}
