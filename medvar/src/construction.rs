//! 構文構造の抽出
//!
//! このモジュールは、コーパスレコードから対象語（動詞または形容詞）と
//! 共起する名詞を取り出す抽出規則を提供します。
//! 規則は構文構造の種類ごとに1つずつ定義され、個別にテストできます。

use crate::errors::{ExtractionFailure, Role};
use crate::record::{ConstructionType, CorpusRecord, PosTag, TaggedToken};

/// 名詞が構文構造の中で占める位置
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ArgumentSlot {
    /// SVOの主語
    Subject,
    /// SVOの目的語
    Object,
    /// 形容詞に修飾される名詞
    Modified,
}

impl ArgumentSlot {
    /// 出力で使用される名前を返します。
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Subject => "subject",
            Self::Object => "object",
            Self::Modified => "modified",
        }
    }
}

/// 構文構造の名詞項
///
/// 名詞の数は構文構造の種類によって決まります（SVOは2つ、それ以外は1つ）。
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Arguments {
    /// 主語と目的語
    SubjectObject { subject: String, object: String },
    /// 形容詞と共起する名詞
    Modified(String),
}

/// 1つのレコードから抽出された構文構造
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Construction {
    kind: ConstructionType,
    target: String,
    arguments: Arguments,
}

impl Construction {
    /// 構文構造の種類を返します。
    #[inline(always)]
    pub fn kind(&self) -> ConstructionType {
        self.kind
    }

    /// 分析対象の見出し語（動詞または形容詞）を返します。
    #[inline(always)]
    pub fn target(&self) -> &str {
        &self.target
    }

    /// 名詞項を返します。
    #[inline(always)]
    pub fn arguments(&self) -> &Arguments {
        &self.arguments
    }

    /// 名詞の見出し語を位置とともに列挙します。
    pub fn nouns(&self) -> impl Iterator<Item = (ArgumentSlot, &str)> {
        let (first, second) = match &self.arguments {
            Arguments::SubjectObject { subject, object } => (
                (ArgumentSlot::Subject, subject.as_str()),
                Some((ArgumentSlot::Object, object.as_str())),
            ),
            Arguments::Modified(noun) => ((ArgumentSlot::Modified, noun.as_str()), None),
        };
        std::iter::once(first).chain(second)
    }
}

/// レコードから構文構造を抽出します。
///
/// レコードが宣言する構文構造の種類に対応する規則を適用します。
/// 入力のみに依存する純粋関数です。
///
/// # 引数
///
/// * `record` - 抽出対象のレコード
///
/// # 戻り値
///
/// 抽出された構文構造
///
/// # エラー
///
/// トークン列が宣言されたパターンに一致しない場合、[`ExtractionFailure`] が返されます。
pub fn extract(record: &CorpusRecord) -> Result<Construction, ExtractionFailure> {
    let tokens = record.tokens();
    if tokens.is_empty() {
        return Err(ExtractionFailure::EmptyRecord);
    }
    match record.construction() {
        ConstructionType::Svo => extract_svo(tokens),
        ConstructionType::NounAdj => extract_noun_adj(tokens),
        ConstructionType::AdjNoun => extract_adj_noun(tokens),
    }
}

/// 規則が選んだトークンの見出し語を返します。
///
/// 見出し語が空白のみのトークンは不正なトークンとして扱います。
/// 規則が選ばなかったトークンは検査しません。
fn lemma_at(tokens: &[TaggedToken], index: usize) -> Result<String, ExtractionFailure> {
    let lemma = tokens[index].lemma();
    if lemma.trim().is_empty() {
        return Err(ExtractionFailure::MalformedToken { index });
    }
    Ok(lemma.to_string())
}

/// SVOの抽出規則。
///
/// 名詞・動詞・名詞がこの順に現れる必要があります（隣接している必要はありません）。
/// 前後に名詞を持つ最初の動詞を対象とし、その直前の名詞を主語、直後の名詞を目的語とします。
fn extract_svo(tokens: &[TaggedToken]) -> Result<Construction, ExtractionFailure> {
    let mut has_verb = false;
    let mut subject_seen = false;
    for (i, token) in tokens.iter().enumerate() {
        if token.pos() != PosTag::Verb {
            continue;
        }
        has_verb = true;
        let subject = tokens[..i].iter().rposition(|t| t.pos() == PosTag::Noun);
        let object = tokens[i + 1..]
            .iter()
            .position(|t| t.pos() == PosTag::Noun)
            .map(|j| i + 1 + j);
        subject_seen |= subject.is_some();
        if let (Some(subject), Some(object)) = (subject, object) {
            return Ok(Construction {
                kind: ConstructionType::Svo,
                target: lemma_at(tokens, i)?,
                arguments: Arguments::SubjectObject {
                    subject: lemma_at(tokens, subject)?,
                    object: lemma_at(tokens, object)?,
                },
            });
        }
    }
    let missing = if !has_verb {
        Role::Verb
    } else if !subject_seen {
        Role::Subject
    } else {
        Role::Object
    };
    Err(ExtractionFailure::MissingRole(missing))
}

/// 名詞 + 形容詞の抽出規則。
///
/// 名詞の直後に形容詞が続く最初の組を使用します。
fn extract_noun_adj(tokens: &[TaggedToken]) -> Result<Construction, ExtractionFailure> {
    let i = adjacent_pair(tokens, PosTag::Noun, PosTag::Adjective)
        .ok_or_else(|| missing_in_pair(tokens))?;
    Ok(Construction {
        kind: ConstructionType::NounAdj,
        target: lemma_at(tokens, i + 1)?,
        arguments: Arguments::Modified(lemma_at(tokens, i)?),
    })
}

/// 形容詞 + 名詞の抽出規則。
///
/// 形容詞の直後に名詞が続く最初の組を使用します。
fn extract_adj_noun(tokens: &[TaggedToken]) -> Result<Construction, ExtractionFailure> {
    let i = adjacent_pair(tokens, PosTag::Adjective, PosTag::Noun)
        .ok_or_else(|| missing_in_pair(tokens))?;
    Ok(Construction {
        kind: ConstructionType::AdjNoun,
        target: lemma_at(tokens, i)?,
        arguments: Arguments::Modified(lemma_at(tokens, i + 1)?),
    })
}

// Index of the first token of the pair.
fn adjacent_pair(tokens: &[TaggedToken], first: PosTag, second: PosTag) -> Option<usize> {
    tokens
        .windows(2)
        .position(|w| w[0].pos() == first && w[1].pos() == second)
}

// Both tags present but never adjacent is reported as a missing noun.
fn missing_in_pair(tokens: &[TaggedToken]) -> ExtractionFailure {
    if !tokens.iter().any(|t| t.pos() == PosTag::Adjective) {
        ExtractionFailure::MissingRole(Role::Adjective)
    } else {
        ExtractionFailure::MissingRole(Role::Noun)
    }
}
