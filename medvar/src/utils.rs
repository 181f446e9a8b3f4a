//! ユーティリティ関数を提供するモジュール
//!
//! CSV行の解析と引用符処理、テスト用のマクロが含まれています。
//! 語彙資源とコーパスの読み込み、結果の書き出しで共通に使用されます。

use std::io::Write;

use csv_core::{ReadFieldResult, WriteResult};

/// CSVの1行を書き出す
///
/// 1行を1つのレコードとして `csv_core::Writer` に渡し、セルごとに必要な引用符処理を行います。
/// 空のセルは何も出力せず、区切りのカンマだけが残ります。
///
/// # 引数
///
/// * `wtr` - 書き込み先のWriterオブジェクト
/// * `cells` - 行のセル
///
/// # 戻り値
///
/// * `Ok(())` - 書き込みに成功した場合
/// * `Err(std::io::Error)` - 書き込み中にI/Oエラーが発生した場合
pub fn write_csv_row<W, I, S>(mut wtr: W, cells: I) -> std::io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut output = [0; 4096];
    let mut writer = csv_core::Writer::new();
    for (i, cell) in cells.into_iter().enumerate() {
        if i != 0 {
            let (_, nout) = writer.delimiter(&mut output);
            wtr.write_all(&output[..nout])?;
        }
        let mut data = cell.as_ref().as_bytes();
        loop {
            let (result, nin, nout) = writer.field(data, &mut output);
            wtr.write_all(&output[..nout])?;
            if result == WriteResult::InputEmpty {
                break;
            }
            data = &data[nin..];
        }
    }
    let (_, nout) = writer.terminator(&mut output);
    wtr.write_all(&output[..nout])
}

/// CSV形式の行を解析してフィールドのベクターに分割する
///
/// この関数は、CSV形式の文字列を解析し、各フィールドを個別の文字列として抽出します。
/// ダブルクォートで囲まれたフィールドや、フィールド内のカンマも正しく処理します。
///
/// # 引数
///
/// * `row` - 解析するCSV形式の文字列
///
/// # 戻り値
///
/// 解析されたフィールドを格納する文字列のベクター
///
/// # 例
///
/// ```
/// # use medvar::utils::parse_csv_row;
/// let fields = parse_csv_row("fruta,noun.food");
/// assert_eq!(fields, vec!["fruta", "noun.food"]);
///
/// let fields_with_quote = parse_csv_row("n,\"guarda-chuva, grande\"");
/// assert_eq!(fields_with_quote, vec!["n", "guarda-chuva, grande"]);
/// ```
pub fn parse_csv_row(row: &str) -> Vec<String> {
    let mut features = vec![];
    let mut rdr = csv_core::Reader::new();
    let mut bytes = row.as_bytes();
    let mut output = [0; 4096];
    loop {
        let (result, nin, nout) = rdr.read_field(bytes, &mut output);
        let end = match result {
            ReadFieldResult::InputEmpty => true,
            ReadFieldResult::Field { .. } => false,
            ReadFieldResult::End => true,
            ReadFieldResult::OutputFull => true,
        };
        features.push(String::from_utf8_lossy(&output[..nout]).into_owned());
        if end {
            break;
        }
        bytes = &bytes[nin..];
    }
    features
}

#[cfg(test)]
/// HashMapリテラルを簡潔に記述するためのマクロ
///
/// キーと値のペアを`=>`演算子で指定し、カンマで区切って記述します。
///
/// # 例
///
/// ```ignore
/// let map = hashmap! {
///     "fruta" => vec!["FOOD"],
///     "governo" => vec!["POLITICS"],
/// };
/// ```
macro_rules! hashmap {
    ( $($k:expr => $v:expr,)* ) => {
        {
            #[allow(unused_mut)]
            let mut h = hashbrown::HashMap::new();
            $(
                h.insert($k, $v);
            )*
            h
        }
    };
    ( $($k:expr => $v:expr),* ) => {
        hashmap![$( $k => $v, )*]
    };
}

#[cfg(test)]
pub(crate) use hashmap;
