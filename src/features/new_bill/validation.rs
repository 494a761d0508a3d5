use crate::features::bills::models::ReceiptFile;
use crate::shared::errors::{AppError, AppResult};

/// 受け付ける領収書の拡張子
pub const ALLOWED_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// 不正な形式のファイルが選択された場合のアラートメッセージ
pub const INVALID_FORMAT_MESSAGE: &str = "Format invalide. Formats acceptés: jpg, jpeg, png";

/// 領収書ファイルの形式を検証する（拡張子の大文字・小文字は区別しない）
pub fn validate_receipt_format(file: &ReceiptFile) -> AppResult<()> {
    match file.extension() {
        Some(ext) if ALLOWED_EXTENSIONS.contains(&ext.as_str()) => Ok(()),
        _ => Err(AppError::validation(INVALID_FORMAT_MESSAGE)),
    }
}

/// 数値入力を整数として解釈する（先頭の数字部分のみを使う）
///
/// 数字で始まらない場合はNone
pub fn parse_int(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (sign, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let end = digits
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}
