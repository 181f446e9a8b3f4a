//! コーパスレコードの表現
//!
//! このモジュールは、構文解析器から受け取る品詞付きトークン列と、
//! レコードが宣言する構文構造の種類を定義します。

use std::fmt;
use std::str::FromStr;

/// 構文構造の種類
///
/// 列挙順（`svo`、`n_adj`、`adj_n`）は結果の並び順としても使用されます。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConstructionType {
    /// 主語 + 動詞 + 目的語
    Svo,
    /// 名詞 + 形容詞
    NounAdj,
    /// 形容詞 + 名詞
    AdjNoun,
}

impl ConstructionType {
    /// すべての構文構造の種類
    pub const ALL: [Self; 3] = [Self::Svo, Self::NounAdj, Self::AdjNoun];

    /// 入力や出力で使用される名前を返します。
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Svo => "svo",
            Self::NounAdj => "n_adj",
            Self::AdjNoun => "adj_n",
        }
    }

    /// この構文構造で抽出される名詞の数を返します。
    pub const fn num_nouns(self) -> usize {
        match self {
            Self::Svo => 2,
            Self::NounAdj | Self::AdjNoun => 1,
        }
    }
}

impl fmt::Display for ConstructionType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConstructionType {
    type Err = &'static str;

    /// 文字列から構文構造の種類をパースする
    ///
    /// # 引数
    ///
    /// * `kind` - パース対象の文字列（"svo"、"n_adj"、"adj_n"のいずれか）
    fn from_str(kind: &str) -> Result<Self, Self::Err> {
        match kind {
            "svo" => Ok(Self::Svo),
            "n_adj" => Ok(Self::NounAdj),
            "adj_n" => Ok(Self::AdjNoun),
            _ => Err("Could not parse a construction type"),
        }
    }
}

/// 品詞タグ
///
/// 抽出規則が区別する3つの品詞と、それ以外をまとめた `Other` からなります。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PosTag {
    Noun,
    Verb,
    Adjective,
    Other,
}

impl PosTag {
    /// タグ文字列を大文字小文字を区別せずに解釈します。
    ///
    /// 未知のタグは `Other` になります。
    pub fn parse(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "n" | "noun" | "nom" | "nome" => Self::Noun,
            "v" | "verb" | "verbo" => Self::Verb,
            "a" | "adj" | "adjective" | "adjetivo" => Self::Adjective,
            _ => Self::Other,
        }
    }
}

/// 品詞と見出し語が付与されたトークン
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaggedToken {
    surface: String,
    pos: PosTag,
    lemma: String,
}

impl TaggedToken {
    /// 新しいトークンを作成します。
    ///
    /// # 引数
    ///
    /// * `surface` - 表層形
    /// * `pos` - 品詞タグ
    /// * `lemma` - 見出し語
    pub fn new<S, L>(surface: S, pos: PosTag, lemma: L) -> Self
    where
        S: Into<String>,
        L: Into<String>,
    {
        Self {
            surface: surface.into(),
            pos,
            lemma: lemma.into(),
        }
    }

    /// 見出し語を表層形の小文字から補うトークンを作成します。
    pub fn from_surface<S>(surface: S, pos: PosTag) -> Self
    where
        S: Into<String>,
    {
        let surface = surface.into();
        let lemma = surface.to_lowercase();
        Self {
            surface,
            pos,
            lemma,
        }
    }

    /// 表層形を返します。
    #[inline(always)]
    pub fn surface(&self) -> &str {
        &self.surface
    }

    /// 品詞タグを返します。
    #[inline(always)]
    pub fn pos(&self) -> PosTag {
        self.pos
    }

    /// 見出し語を返します。
    #[inline(always)]
    pub fn lemma(&self) -> &str {
        &self.lemma
    }
}

/// コーパスから抽出された1つの断片（KWIC）
///
/// 宣言された構文構造の種類と、品詞付きトークン列を保持します。
/// 作成後は変更されません。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CorpusRecord {
    construction: ConstructionType,
    tokens: Vec<TaggedToken>,
}

impl CorpusRecord {
    /// 新しいレコードを作成します。
    pub fn new(construction: ConstructionType, tokens: Vec<TaggedToken>) -> Self {
        Self {
            construction,
            tokens,
        }
    }

    /// 宣言された構文構造の種類を返します。
    #[inline(always)]
    pub fn construction(&self) -> ConstructionType {
        self.construction
    }

    /// トークンのスライスを返します。
    #[inline(always)]
    pub fn tokens(&self) -> &[TaggedToken] {
        &self.tokens
    }

    /// 表層形を空白で連結した文字列を返します。
    pub fn text(&self) -> String {
        let mut text = String::new();
        for (i, token) in self.tokens.iter().enumerate() {
            if i != 0 {
                text.push(' ');
            }
            text.push_str(token.surface());
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pos_tags() {
        assert_eq!(PosTag::Noun, PosTag::parse("n"));
        assert_eq!(PosTag::Noun, PosTag::parse("NOUN"));
        assert_eq!(PosTag::Verb, PosTag::parse("Verbo"));
        assert_eq!(PosTag::Adjective, PosTag::parse("adj"));
        assert_eq!(PosTag::Other, PosTag::parse("prp"));
    }

    #[test]
    fn test_construction_type_round_trip_names() {
        for kind in ConstructionType::ALL {
            assert_eq!(Ok(kind), kind.as_str().parse());
        }
        assert!("vso".parse::<ConstructionType>().is_err());
    }

    #[test]
    fn test_record_text() {
        let record = CorpusRecord::new(
            ConstructionType::NounAdj,
            vec![
                TaggedToken::from_surface("peixe", PosTag::Noun),
                TaggedToken::from_surface("fresco", PosTag::Adjective),
            ],
        );
        assert_eq!("peixe fresco", record.text());
        assert_eq!("fresco", record.tokens()[1].lemma());
    }
}
