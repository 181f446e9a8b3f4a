//! コーパスの読み込み
//!
//! 品詞付きコーパスを [`CorpusRecord`] の列として読み込みます。
//! 次の2つの形式に対応します。
//!
//! - タグ付き形式: 1行1トークンの `表層形<TAB>品詞,見出し語`。レコードは `EOS` 行で区切られます。
//! - KWIC形式: `<kwic>` 要素1つが1レコードのXML。要素の本文は空白区切りの
//!   `表層形/品詞` または `表層形/品詞/見出し語` です。

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::ops::Deref;
use std::path::Path;
use std::str::FromStr;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::errors::{AnalysisError, Result};
use crate::record::{ConstructionType, CorpusRecord, PosTag, TaggedToken};

/// コーパスファイルの形式
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CorpusFormat {
    /// `表層形<TAB>品詞,見出し語` の行と `EOS` 行からなる形式
    Tagged,
    /// `<kwic>` 要素からなるXML
    Kwic,
}

impl CorpusFormat {
    /// 拡張子から形式を推定します。`.xml` はKWIC形式、それ以外はタグ付き形式です。
    pub fn infer<P: AsRef<Path>>(path: P) -> Self {
        match path.as_ref().extension() {
            Some(ext) if ext.eq_ignore_ascii_case("xml") => Self::Kwic,
            _ => Self::Tagged,
        }
    }
}

impl FromStr for CorpusFormat {
    type Err = &'static str;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "tagged" => Ok(Self::Tagged),
            "kwic" => Ok(Self::Kwic),
            _ => Err("Could not parse a corpus format"),
        }
    }
}

/// レコードの列
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Corpus {
    records: Vec<CorpusRecord>,
}

impl Corpus {
    /// レコードの列からコーパスを作成します。
    pub fn new(records: Vec<CorpusRecord>) -> Self {
        Self { records }
    }

    /// タグ付き形式のコーパスを読み込みます。
    ///
    /// 見出し語が省略されているか `*` の場合、表層形を小文字化したものを見出し語とします。
    /// トークンを含まない `EOS` 区切りも空のレコードとして残されます。
    ///
    /// # 引数
    ///
    /// * `rdr` - コーパスのリーダー
    /// * `construction` - 各レコードの構文構造の種類
    ///
    /// # エラー
    ///
    /// 行の形式が不正な場合、[`AnalysisError::CorpusRead`] が返されます。
    pub fn from_tagged_reader<R>(rdr: R, construction: ConstructionType) -> Result<Self>
    where
        R: Read,
    {
        let buf = BufReader::new(rdr);

        let mut records = vec![];
        let mut tokens = vec![];
        for (lineno, line) in buf.lines().enumerate() {
            let line = line.map_err(AnalysisError::corpus_read)?;
            let line = line.trim_end_matches('\r');
            if line.is_empty() {
                continue;
            }
            let mut spl = line.split('\t');
            let surface = spl.next();
            let feature = spl.next();
            let rest = spl.next();
            match (surface, feature, rest) {
                (Some("EOS"), None, None) => {
                    records.push(CorpusRecord::new(construction, std::mem::take(&mut tokens)));
                }
                (Some(surface), Some(feature), None) if !surface.is_empty() => {
                    let mut fields = feature.splitn(2, ',');
                    let pos = PosTag::parse(fields.next().unwrap_or(""));
                    let token = match fields.next().map(str::trim) {
                        Some(lemma) if !lemma.is_empty() && lemma != "*" => {
                            TaggedToken::new(surface, pos, lemma)
                        }
                        _ => TaggedToken::from_surface(surface, pos),
                    };
                    tokens.push(token);
                }
                _ => {
                    return Err(AnalysisError::corpus_read(format!(
                        "line {}: each line must be a pair of a surface and `POS,lemma` or `EOS`",
                        lineno + 1,
                    )));
                }
            }
        }
        if !tokens.is_empty() {
            records.push(CorpusRecord::new(construction, tokens));
        }

        Ok(Self { records })
    }

    /// KWIC形式のコーパスを読み込みます。
    ///
    /// `<kwic>` 要素は任意の深さに置けます。`construction` 属性があれば
    /// その値が既定の構文構造の種類より優先されます。品詞が付与されていないトークンは
    /// [`PosTag::Other`] として残されます。
    ///
    /// # エラー
    ///
    /// XMLが不正な場合、または `construction` 属性の値が未知の場合、
    /// [`AnalysisError::CorpusRead`] が返されます。
    pub fn from_kwic_reader<R>(rdr: R, construction: ConstructionType) -> Result<Self>
    where
        R: Read,
    {
        let mut reader = Reader::from_reader(BufReader::new(rdr));
        let mut buf = vec![];

        let mut records = vec![];
        // 読み込み中の <kwic> 要素の構文構造の種類と本文
        let mut current: Option<(ConstructionType, String)> = None;
        let mut depth = 0usize;

        loop {
            let event = reader
                .read_event_into(&mut buf)
                .map_err(|e| kwic_error(&reader, e))?;
            match event {
                Event::Start(e) => {
                    if current.is_some() {
                        depth += 1;
                    } else if e.name().as_ref() == b"kwic" {
                        current = Some((kwic_construction(&e, construction)?, String::new()));
                        depth = 0;
                    }
                }
                Event::Empty(e) => {
                    if current.is_none() && e.name().as_ref() == b"kwic" {
                        let kind = kwic_construction(&e, construction)?;
                        records.push(CorpusRecord::new(kind, vec![]));
                    }
                }
                Event::Text(e) => {
                    if let Some((_, text)) = current.as_mut() {
                        let unescaped = e.unescape().map_err(|e| kwic_error(&reader, e))?;
                        text.push(' ');
                        text.push_str(&unescaped);
                    }
                }
                Event::CData(e) => {
                    if let Some((_, text)) = current.as_mut() {
                        text.push(' ');
                        text.push_str(&String::from_utf8_lossy(&e));
                    }
                }
                Event::End(_) => {
                    if depth > 0 {
                        depth -= 1;
                    } else if let Some((kind, text)) = current.take() {
                        records.push(CorpusRecord::new(kind, parse_kwic_text(&text)));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }
        if current.is_some() {
            return Err(AnalysisError::corpus_read(
                "unexpected end of input inside a <kwic> element",
            ));
        }

        Ok(Self { records })
    }

    /// ファイルからコーパスを読み込みます。
    ///
    /// # エラー
    ///
    /// ファイルを開けない場合や形式が不正な場合、[`AnalysisError::CorpusRead`] が返されます。
    pub fn from_path<P>(
        path: P,
        format: CorpusFormat,
        construction: ConstructionType,
    ) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            AnalysisError::corpus_read(format!("{}: {e}", path.display()))
        })?;
        match format {
            CorpusFormat::Tagged => Self::from_tagged_reader(file, construction),
            CorpusFormat::Kwic => Self::from_kwic_reader(file, construction),
        }
    }

    /// レコードを取り出します。
    pub fn into_records(self) -> Vec<CorpusRecord> {
        self.records
    }
}

impl Deref for Corpus {
    type Target = [CorpusRecord];

    fn deref(&self) -> &Self::Target {
        &self.records
    }
}

fn kwic_error<B>(reader: &Reader<B>, e: quick_xml::Error) -> AnalysisError {
    AnalysisError::corpus_read(format!("at byte {}: {e}", reader.buffer_position()))
}

fn kwic_construction(e: &BytesStart, default: ConstructionType) -> Result<ConstructionType> {
    let attr = e
        .try_get_attribute("construction")
        .map_err(|e| AnalysisError::corpus_read(quick_xml::Error::from(e)))?;
    let Some(attr) = attr else {
        return Ok(default);
    };
    let value = attr.unescape_value().map_err(AnalysisError::corpus_read)?;
    value
        .trim()
        .parse()
        .map_err(|msg: &'static str| AnalysisError::corpus_read(format!("{msg}: {value:?}")))
}

/// `表層形/品詞[/見出し語]` の並びを解釈します。
fn parse_kwic_text(text: &str) -> Vec<TaggedToken> {
    text.split_whitespace()
        .map(|item| {
            let mut spl = item.splitn(3, '/');
            let surface = spl.next().unwrap_or(item);
            match (spl.next(), spl.next()) {
                (Some(pos), Some(lemma)) if !lemma.is_empty() => {
                    TaggedToken::new(surface, PosTag::parse(pos), lemma.to_lowercase())
                }
                (Some(pos), _) => TaggedToken::from_surface(surface, PosTag::parse(pos)),
                (None, _) => TaggedToken::from_surface(surface, PosTag::Other),
            }
        })
        .collect()
}
