/// 請求書一覧機能モジュール
///
/// このモジュールは請求書一覧ページに関連するすべての機能を提供します：
/// - 請求書データモデル（ストアとの送受信形式）
/// - 審査状態・日付の表示用フォーマット
/// - 一覧の取得・並び替え・整形（整形失敗は記録して未整形のまま表示）
/// - 領収書プレビューモーダル
pub mod container;
pub mod format;
pub mod models;
pub mod views;

pub use container::{BillsContainer, BillsReport, FormatAnomaly};
pub use format::{format_date, format_status, FormatError};
pub use models::{Bill, BillStatus, BillUpdate, BillUploadForm, CreatedBill, ReceiptFile};
