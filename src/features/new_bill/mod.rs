/// 新規請求書機能モジュール
///
/// このモジュールは新規請求書ページに関連するすべての機能を提供します：
/// - 入力フォームの描画
/// - 領収書ファイルの形式検証（jpg / jpeg / png）
/// - ファイルのアップロードと請求書の送信
pub mod container;
pub mod validation;
pub mod views;

pub use container::{NewBillContainer, UploadState};
pub use validation::{validate_receipt_format, ALLOWED_EXTENSIONS, INVALID_FORMAT_MESSAGE};
pub use views::{new_bill_page, DEFAULT_PCT, EXPENSE_TYPES};
