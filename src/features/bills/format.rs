//! 審査状態と日付の表示用フォーマット
//!
//! どの関数もパニックしない。解析に失敗した値は呼び出し側で記録できるよう
//! `try_*`系の関数が型付きエラーを返す。

use super::models::BillStatus;
use chrono::{DateTime, Datelike, NaiveDate};
use thiserror::Error;

/// 月の略称（フランス語、先頭大文字・3文字）
const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Fév", "Mar", "Avr", "Mai", "Jui", "Jui", "Aoû", "Sep", "Oct", "Nov", "Déc",
];

/// レコードのフォーマット失敗
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("日付がありません")]
    MissingDate,

    #[error("日付を解析できません: {raw}")]
    InvalidDate { raw: String },

    #[error("審査状態がありません")]
    MissingStatus,
}

/// 審査状態を表示用ラベルに変換する（未知の値はそのまま返す）
pub fn format_status(status: &str) -> String {
    match status.parse::<BillStatus>() {
        Ok(known) => known.label().to_string(),
        Err(_) => status.to_string(),
    }
}

/// 保存形式の日付を解析する
///
/// `YYYY-MM-DD`とRFC3339のタイムスタンプを受け付ける
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(trimmed)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

/// 日付を表示用の短い形式（例: `4 Avr. 04`）に変換する
pub fn try_format_date(raw: &str) -> Result<String, FormatError> {
    let date = parse_date(raw).ok_or_else(|| FormatError::InvalidDate {
        raw: raw.to_string(),
    })?;

    let month = MONTH_ABBREVIATIONS[date.month0() as usize];
    Ok(format!(
        "{} {month}. {:02}",
        date.day(),
        date.year().rem_euclid(100)
    ))
}

/// 日付を表示用に変換する（解析できない場合は元の文字列を返す）
pub fn format_date(raw: &str) -> String {
    try_format_date(raw).unwrap_or_else(|_| raw.to_string())
}
