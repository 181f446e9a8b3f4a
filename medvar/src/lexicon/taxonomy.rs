//! 語義クラスから概念ドメインへの対応表
//!
//! WordNetの辞書ファイル名のような細かい語義クラスを、
//! 分析で数える粗い概念ドメインへ写像します。

use std::io::{BufRead, BufReader, Read};

use hashbrown::HashMap;

use crate::errors::{AnalysisError, Result};

/// ポルトガル語ラベルによる既定の対応表
const WORDNET_PT: &[(&str, &str)] = &[
    ("noun.person", "pessoa"),
    ("noun.artifact", "objeto"),
    ("noun.act", "evento"),
    ("noun.event", "evento"),
    ("noun.group", "organização"),
    ("noun.location", "lugar"),
    ("noun.communication", "comunicação"),
    ("noun.state", "estado"),
    ("noun.cognition", "conhecimento"),
    ("noun.quantity", "quantidade"),
    ("noun.attribute", "característica"),
    ("noun.time", "tempo"),
    ("noun.animal", "animal"),
    ("noun.body", "corpo"),
    ("noun.food", "comida"),
    ("noun.substance", "matéria"),
    ("noun.object", "objeto"),
    ("noun.feeling", "emoção"),
    ("noun.phenomenon", "fenómeno"),
];

/// 対応表にない語義クラスに割り当てる既定のラベル
const WORDNET_PT_FALLBACK: &str = "outro";

/// 語義クラスから概念ドメインへの対応表
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DomainTaxonomy {
    map: HashMap<String, String>,
    fallback: Option<String>,
    passthrough: bool,
}

impl DomainTaxonomy {
    /// 語義クラスをそのまま概念ドメインとして扱う対応表を作成します。
    pub fn identity() -> Self {
        Self {
            map: HashMap::new(),
            fallback: None,
            passthrough: true,
        }
    }

    /// WordNetの名詞辞書ファイル名をポルトガル語のドメインラベルへ写像する既定の対応表です。
    ///
    /// 対応表にない語義クラスは `outro` になります。
    pub fn wordnet_pt() -> Self {
        Self {
            map: WORDNET_PT
                .iter()
                .map(|&(class, domain)| (class.to_string(), domain.to_string()))
                .collect(),
            fallback: Some(WORDNET_PT_FALLBACK.to_string()),
            passthrough: false,
        }
    }

    /// 対応表ファイルを読み込みます。
    ///
    /// 各行は `語義クラス<TAB>ドメイン` の形式です。語義クラスに `*` を指定すると
    /// 対応表にない語義クラスの既定ラベルになります。空行と `#` で始まる行は無視されます。
    ///
    /// # 引数
    ///
    /// * `rdr` - 対応表ファイルのリーダー
    ///
    /// # エラー
    ///
    /// 行の形式が不正な場合、[`AnalysisError`] が返されます。
    pub fn from_reader<R>(rdr: R) -> Result<Self>
    where
        R: Read,
    {
        let reader = BufReader::new(rdr);

        let mut map = HashMap::new();
        let mut fallback = None;

        for line in reader.lines() {
            let line = line?;
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut spl = line.split('\t');
            let class = spl.next().map(str::trim);
            let domain = spl.next().map(str::trim);
            let rest = spl.next();
            match (class, domain, rest) {
                (Some("*"), Some(domain), None) if !domain.is_empty() => {
                    fallback = Some(domain.to_string());
                }
                (Some(class), Some(domain), None) if !class.is_empty() && !domain.is_empty() => {
                    map.insert(class.to_string(), domain.to_string());
                }
                _ => {
                    return Err(AnalysisError::invalid_format(
                        "taxonomy",
                        format!("Each line must be a pair of a sense class and a domain: {line:?}"),
                    ));
                }
            }
        }

        Ok(Self {
            map,
            fallback,
            passthrough: false,
        })
    }

    /// 既定ラベルを差し替えます。`None` の場合、対応表にない語義クラスは無視されます。
    pub fn with_fallback<S>(mut self, fallback: Option<S>) -> Self
    where
        S: Into<String>,
    {
        self.fallback = fallback.map(Into::into);
        self
    }

    /// 語義クラスに対応する概念ドメインを返します。
    pub fn domain<'a>(&'a self, class: &'a str) -> Option<&'a str> {
        if self.passthrough {
            return Some(class);
        }
        self.map
            .get(class)
            .or(self.fallback.as_ref())
            .map(String::as_str)
    }
}

impl Default for DomainTaxonomy {
    fn default() -> Self {
        Self::wordnet_pt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wordnet_pt() {
        let taxonomy = DomainTaxonomy::wordnet_pt();
        assert_eq!(Some("comida"), taxonomy.domain("noun.food"));
        assert_eq!(Some("objeto"), taxonomy.domain("noun.object"));
        assert_eq!(Some("outro"), taxonomy.domain("noun.plant"));
    }

    #[test]
    fn test_identity() {
        let taxonomy = DomainTaxonomy::identity();
        assert_eq!(Some("FOOD"), taxonomy.domain("FOOD"));
    }

    #[test]
    fn test_from_reader() {
        let data = "\
# class\tdomain
noun.food\tFOOD
noun.group\tPOLITICS

*\tOTHER
";
        let taxonomy = DomainTaxonomy::from_reader(data.as_bytes()).unwrap();
        assert_eq!(Some("FOOD"), taxonomy.domain("noun.food"));
        assert_eq!(Some("OTHER"), taxonomy.domain("noun.act"));

        let strict = taxonomy.with_fallback(None::<String>);
        assert_eq!(None, strict.domain("noun.act"));
    }

    #[test]
    fn test_from_reader_invalid() {
        let result = DomainTaxonomy::from_reader("noun.food FOOD\n".as_bytes());
        assert!(matches!(result, Err(AnalysisError::InvalidFormat(_))));
    }
}
