//! 語彙意味資源の管理モジュール
//!
//! このモジュールは、名詞の見出し語から語義クラス（WordNetの辞書ファイル名
//! `noun.food` など）を引くための語彙資源 [`DomainLexicon`] を提供します。
//! 語義クラスから概念ドメインへの対応付けは [`DomainTaxonomy`] が担います。
//!
//! # 資源の形式
//!
//! - テキスト形式: 1行1語義のCSV `見出し語,語義クラス`。行の順序が語義の順位です。
//! - バイナリ形式: マジックバイトとパディングに続くrkyvアーカイブ。
//!   zstdで圧縮されていても構いません。
//!
//! [`DomainLexicon::from_path`] はどちらの形式も受け付けます。

pub mod taxonomy;

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Write};
use std::path::Path;

use hashbrown::HashMap;
use rkyv::rancor::Error;
use rkyv::util::AlignedVec;
use rkyv::{Archive, Deserialize, Serialize};

use crate::errors::{AnalysisError, Result};
use crate::utils;

pub use crate::lexicon::taxonomy::DomainTaxonomy;

/// バイナリ語彙資源を識別するマジックバイト。
pub const LEXICON_MAGIC: &[u8] = b"MedvarDomainLexicon 0.1\n";

const LEXICON_MAGIC_LEN: usize = LEXICON_MAGIC.len();
const RKYV_ALIGNMENT: usize = 16;
const PADDING_LEN: usize =
    (RKYV_ALIGNMENT - (LEXICON_MAGIC_LEN % RKYV_ALIGNMENT)) % RKYV_ALIGNMENT;

/// 見出し語ごとの語義クラスを保持する語彙資源
///
/// 見出し語は小文字化して昇順に格納され、二分探索で引かれます。
/// 各見出し語の語義は `offsets` で区切られた `senses` の範囲に、語義の順位の順で並びます。
#[derive(Archive, Serialize, Deserialize, Debug, Default, PartialEq, Eq)]
pub struct DomainLexicon {
    lemmas: Vec<String>,
    offsets: Vec<u32>,
    senses: Vec<u32>,
    classes: Vec<String>,
}

impl DomainLexicon {
    /// `(見出し語, 語義クラス)` の組から新しいインスタンスを構築します。
    ///
    /// 組は語義の順位の順に与えてください。同じ見出し語で重複する語義クラスは
    /// 最初に現れたものだけが残ります。
    ///
    /// # エラー
    ///
    /// エントリ数が `u32` の範囲を超える場合にエラーを返します。
    pub fn from_entries<I, L, C>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (L, C)>,
        L: AsRef<str>,
        C: AsRef<str>,
    {
        let mut class_ids: HashMap<String, u32> = HashMap::new();
        let mut classes = vec![];
        let mut map: BTreeMap<String, Vec<u32>> = BTreeMap::new();

        for (lemma, class) in entries {
            let lemma = normalize(lemma.as_ref());
            let class = class.as_ref().trim();
            if lemma.is_empty() || class.is_empty() {
                continue;
            }
            let class_id = match class_ids.get(class) {
                Some(&id) => id,
                None => {
                    let id = u32::try_from(classes.len())?;
                    classes.push(class.to_string());
                    class_ids.insert(class.to_string(), id);
                    id
                }
            };
            let senses = map.entry(lemma).or_default();
            if !senses.contains(&class_id) {
                senses.push(class_id);
            }
        }

        let mut lemmas = Vec::with_capacity(map.len());
        let mut offsets = Vec::with_capacity(map.len() + 1);
        let mut senses = vec![];
        offsets.push(0);
        for (lemma, ids) in map {
            lemmas.push(lemma);
            senses.extend_from_slice(&ids);
            offsets.push(u32::try_from(senses.len())?);
        }

        Ok(Self {
            lemmas,
            offsets,
            senses,
            classes,
        })
    }

    /// CSV形式の語彙資源から新しいインスタンスを構築します。
    ///
    /// 空行と `#` で始まる行は無視されます。見出し語が空の行は警告を出して読み飛ばします。
    ///
    /// # 引数
    ///
    /// * `rdr` - 語彙資源ファイルのリーダー
    ///
    /// # エラー
    ///
    /// 2列に満たない行がある場合、[`AnalysisError`] が返されます。
    pub fn from_reader<R>(rdr: R) -> Result<Self>
    where
        R: Read,
    {
        let entries = Self::parse_csv(BufReader::new(rdr), "lexicon.csv")?;
        Self::from_entries(entries)
    }

    pub(crate) fn parse_csv<R>(rdr: R, name: &'static str) -> Result<Vec<(String, String)>>
    where
        R: BufRead,
    {
        let mut entries = vec![];
        for (i, line) in rdr.lines().enumerate() {
            let line = line?;
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }
            let mut fields = utils::parse_csv_row(line).into_iter();
            let (Some(lemma), Some(class)) = (fields.next(), fields.next()) else {
                let msg = format!(
                    "A csv row of the lexicon must have two items at least, line {}: {:?}",
                    i + 1,
                    line,
                );
                return Err(AnalysisError::invalid_format(name, msg));
            };
            if lemma.trim().is_empty() {
                log::warn!("Skipped an empty lemma at line {}: {:?}", i + 1, line);
                continue;
            }
            entries.push((lemma, class));
        }
        Ok(entries)
    }

    /// 見出し語の数を返します。
    #[inline(always)]
    pub fn num_lemmas(&self) -> usize {
        self.lemmas.len()
    }

    /// 見出し語を1つも含まない場合に `true` を返します。
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.lemmas.is_empty()
    }

    /// 見出し語の語義クラスを語義の順位の順に返します。
    ///
    /// 見出し語は小文字化して検索されます。見つからない場合は空のベクターを返します。
    pub fn sense_classes(&self, lemma: &str) -> Vec<&str> {
        let key = normalize(lemma);
        let Ok(idx) = self.lemmas.binary_search(&key) else {
            return vec![];
        };
        let start = self.offsets[idx] as usize;
        let end = self.offsets[idx + 1] as usize;
        self.senses[start..end]
            .iter()
            .map(|&id| self.classes[id as usize].as_str())
            .collect()
    }

    /// バイナリ形式で語彙資源を書き出します。
    ///
    /// # エラー
    ///
    /// シリアライズまたは書き込みに失敗した場合にエラーを返します。
    pub fn write<W>(&self, mut wtr: W) -> Result<()>
    where
        W: Write,
    {
        wtr.write_all(LEXICON_MAGIC)?;
        wtr.write_all(&[0xFF; PADDING_LEN])?;
        let bytes = rkyv::to_bytes::<Error>(self).map_err(|e| {
            AnalysisError::invalid_state("rkyv serialization failed".to_string(), e.to_string())
        })?;
        wtr.write_all(&bytes)?;
        Ok(())
    }

    /// バイナリ形式の語彙資源を読み込みます。
    ///
    /// アーカイブはrkyvの検証付きアクセスで検証されます。
    ///
    /// # エラー
    ///
    /// マジックバイトが一致しない場合、データが破損している場合、
    /// または索引が矛盾している場合にエラーを返します。
    pub fn read<R: Read>(mut rdr: R) -> Result<Self> {
        let mut magic = [0; LEXICON_MAGIC_LEN];
        rdr.read_exact(&mut magic)?;
        if magic != LEXICON_MAGIC {
            return Err(AnalysisError::invalid_argument(
                "rdr",
                "The magic number of the input lexicon mismatches.",
            ));
        }

        let mut padding_buf = [0; PADDING_LEN];
        rdr.read_exact(&mut padding_buf)?;

        let mut buffer = Vec::new();
        rdr.read_to_end(&mut buffer)?;

        let mut aligned_bytes: AlignedVec = AlignedVec::with_capacity(buffer.len());
        aligned_bytes.extend_from_slice(&buffer);

        let lexicon = rkyv::from_bytes::<Self, Error>(&aligned_bytes).map_err(|e| {
            AnalysisError::invalid_state(
                "rkyv validation failed. The lexicon file may be corrupted or incompatible."
                    .to_string(),
                e.to_string(),
            )
        })?;
        lexicon.verify()?;
        Ok(lexicon)
    }

    /// 索引の整合性を検証します。
    ///
    /// アーカイブとして正しくても、`sense_classes` が範囲外を参照する資源は拒否されます。
    fn verify(&self) -> Result<()> {
        let invalid = |msg: String| -> Result<()> {
            Err(AnalysisError::invalid_format("lexicon", msg))
        };

        if self.offsets.len() != self.lemmas.len() + 1 {
            return invalid(format!(
                "{} offsets for {} lemmas, expected {}",
                self.offsets.len(),
                self.lemmas.len(),
                self.lemmas.len() + 1,
            ));
        }
        if self.offsets[0] != 0 {
            return invalid(format!("The first offset must be 0, got {}", self.offsets[0]));
        }
        for (i, w) in self.offsets.windows(2).enumerate() {
            if w[0] > w[1] {
                return invalid(format!("Offsets decrease at lemma {i}: {} > {}", w[0], w[1]));
            }
        }
        let num_senses = self.senses.len();
        if let Some(&last) = self.offsets.last()
            && last as usize != num_senses
        {
            return invalid(format!(
                "The last offset is {last}, but there are {num_senses} senses"
            ));
        }
        if let Some(&id) = self.senses.iter().find(|&&id| id as usize >= self.classes.len()) {
            return invalid(format!(
                "Sense class id {id} is out of range for {} classes",
                self.classes.len(),
            ));
        }
        for w in self.lemmas.windows(2) {
            if w[0] >= w[1] {
                return invalid(format!("Lemmas are not sorted: {:?} >= {:?}", w[0], w[1]));
            }
        }
        Ok(())
    }

    /// ファイルパスから語彙資源を読み込みます。
    ///
    /// 拡張子が `.zst` の場合はzstdで展開します。先頭がマジックバイトで始まる場合は
    /// バイナリ形式、それ以外はCSV形式として扱います。
    ///
    /// # エラー
    ///
    /// ファイルが存在しない、ディレクトリである、または形式が不正な場合にエラーを返します。
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.is_dir() {
            return Err(AnalysisError::invalid_argument(
                "path",
                format!("The path '{}' is a directory, but a file was expected.", path.display()),
            ));
        }
        let file = File::open(path)?;

        let mut bytes = vec![];
        if path.extension().is_some_and(|ext| ext == "zst") {
            zstd::Decoder::new(file)?.read_to_end(&mut bytes)?;
        } else {
            BufReader::new(file).read_to_end(&mut bytes)?;
        }

        if bytes.starts_with(LEXICON_MAGIC) {
            Self::read(bytes.as_slice())
        } else {
            Self::from_reader(bytes.as_slice())
        }
    }

    /// 分析に使用する語彙資源を読み込みます。
    ///
    /// [`DomainLexicon::from_path`] と同じですが、失敗はすべて
    /// [`AnalysisError::ResourceUnavailable`] として返されます。
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        Self::from_path(path).map_err(|e| {
            AnalysisError::resource_unavailable(format!("{}: {e}", path.display()))
        })
    }
}

#[inline(always)]
fn normalize(lemma: &str) -> String {
    lemma.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEXICON_CSV: &str = "\
# lemma,class
banco,noun.artifact
banco,noun.group
Fruta,noun.food
banco,noun.artifact
,noun.food

governo,noun.group
";

    #[test]
    fn test_from_reader() {
        let lexicon = DomainLexicon::from_reader(LEXICON_CSV.as_bytes()).unwrap();
        assert_eq!(3, lexicon.num_lemmas());
        assert_eq!(vec!["noun.artifact", "noun.group"], lexicon.sense_classes("banco"));
        assert_eq!(vec!["noun.food"], lexicon.sense_classes("fruta"));
        assert_eq!(vec!["noun.food"], lexicon.sense_classes(" FRUTA "));
        assert!(lexicon.sense_classes("cadeira").is_empty());
    }

    #[test]
    fn test_from_reader_rejects_single_column() {
        let result = DomainLexicon::from_reader("banco\n".as_bytes());
        assert!(matches!(result, Err(AnalysisError::InvalidFormat(_))));
    }

    #[test]
    fn test_write_and_read() {
        let lexicon = DomainLexicon::from_reader(LEXICON_CSV.as_bytes()).unwrap();
        let mut buf = vec![];
        lexicon.write(&mut buf).unwrap();
        assert!(buf.starts_with(LEXICON_MAGIC));

        let other = DomainLexicon::read(buf.as_slice()).unwrap();
        assert_eq!(lexicon, other);
    }

    #[test]
    fn test_read_rejects_wrong_magic() {
        let data = b"NotALexicon 0.0\n\xff\xff\xff\xff\xff\xff\xff\xff";
        let result = DomainLexicon::read(&data[..]);
        assert!(matches!(result, Err(AnalysisError::InvalidArgument(_))));
    }

    fn write_raw(lexicon: &DomainLexicon) -> Vec<u8> {
        let mut buf = vec![];
        lexicon.write(&mut buf).unwrap();
        buf
    }

    fn strings(xs: &[&str]) -> Vec<String> {
        xs.iter().map(|x| x.to_string()).collect()
    }

    #[test]
    fn test_read_rejects_inconsistent_index() {
        let broken = [
            DomainLexicon {
                lemmas: strings(&["fruta"]),
                offsets: vec![],
                senses: vec![7],
                classes: vec![],
            },
            DomainLexicon {
                lemmas: strings(&["fruta", "peixe"]),
                offsets: vec![0, 2, 1],
                senses: vec![0, 0],
                classes: strings(&["noun.food"]),
            },
            DomainLexicon {
                lemmas: strings(&["fruta"]),
                offsets: vec![0, 3],
                senses: vec![0],
                classes: strings(&["noun.food"]),
            },
            DomainLexicon {
                lemmas: strings(&["fruta"]),
                offsets: vec![0, 1],
                senses: vec![1],
                classes: strings(&["noun.food"]),
            },
            DomainLexicon {
                lemmas: strings(&["peixe", "fruta"]),
                offsets: vec![0, 1, 2],
                senses: vec![0, 0],
                classes: strings(&["noun.food"]),
            },
        ];
        for lexicon in &broken {
            let result = DomainLexicon::read(write_raw(lexicon).as_slice());
            assert!(
                matches!(result, Err(AnalysisError::InvalidFormat(_))),
                "{lexicon:?}"
            );
        }

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.dic");
        std::fs::write(&path, write_raw(&broken[0])).unwrap();
        assert!(matches!(
            DomainLexicon::open(&path),
            Err(AnalysisError::ResourceUnavailable { .. })
        ));
    }

    #[test]
    fn test_read_accepts_empty_lexicon() {
        let empty = DomainLexicon::from_entries(Vec::<(&str, &str)>::new()).unwrap();
        let other = DomainLexicon::read(write_raw(&empty).as_slice()).unwrap();
        assert!(other.is_empty());
    }

    #[test]
    fn test_from_path_accepts_all_forms() {
        let dir = tempfile::tempdir().unwrap();
        let lexicon = DomainLexicon::from_reader(LEXICON_CSV.as_bytes()).unwrap();

        let csv_path = dir.path().join("lexicon.csv");
        std::fs::write(&csv_path, LEXICON_CSV).unwrap();
        assert_eq!(lexicon, DomainLexicon::from_path(&csv_path).unwrap());

        let zst_path = dir.path().join("lexicon.dic.zst");
        let mut wtr = zstd::Encoder::new(File::create(&zst_path).unwrap(), 3).unwrap();
        lexicon.write(&mut wtr).unwrap();
        wtr.finish().unwrap();
        assert_eq!(lexicon, DomainLexicon::from_path(&zst_path).unwrap());

        assert!(DomainLexicon::from_path(dir.path()).is_err());
        assert!(DomainLexicon::from_path(dir.path().join("missing.csv")).is_err());
    }
}
