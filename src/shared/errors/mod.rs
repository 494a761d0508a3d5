use thiserror::Error;

/// アプリケーション全体で使用される統一エラー型
#[derive(Debug, Error)]
pub enum AppError {
    /// バリデーション関連のエラー
    #[error("バリデーションエラー: {0}")]
    Validation(String),

    /// リソースが見つからない場合のエラー
    #[error("リソースが見つかりません: {0}")]
    NotFound(String),

    /// 外部サービス（ストアAPI）連携でのエラー
    ///
    /// メッセージはストアから返されたものをそのまま保持する（例: "Erreur 404"）
    #[error("{0}")]
    ExternalService(String),

    /// 設定関連のエラー
    #[error("設定エラー: {0}")]
    Configuration(String),

    /// セッションストレージ関連のエラー
    #[error("ストレージエラー: {0}")]
    Storage(String),

    /// I/O関連のエラー
    #[error("I/Oエラー: {0}")]
    Io(#[from] std::io::Error),

    /// JSON解析エラー
    #[error("JSON解析エラー: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    /// ユーザーに表示するためのメッセージを取得
    ///
    /// ストアのエラーはエラーページにそのまま埋め込まれるため、
    /// 元のメッセージを返す
    pub fn user_message(&self) -> &str {
        match self {
            AppError::Validation(msg) => msg,
            AppError::NotFound(msg) => msg,
            AppError::ExternalService(msg) => msg,
            AppError::Configuration(_) => "設定エラーが発生しました",
            AppError::Storage(_) => "セッション情報の読み書きでエラーが発生しました",
            AppError::Io(_) => "ファイル操作でエラーが発生しました",
            AppError::Json(_) => "データ形式の解析でエラーが発生しました",
        }
    }

    /// バリデーションエラーを作成するヘルパー関数
    pub fn validation<S: Into<String>>(message: S) -> Self {
        AppError::Validation(message.into())
    }

    /// リソース未発見エラーを作成するヘルパー関数
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        AppError::NotFound(format!("{}が見つかりません", resource.into()))
    }

    /// 外部サービスエラーを作成するヘルパー関数
    pub fn external_service<S: Into<String>>(message: S) -> Self {
        AppError::ExternalService(message.into())
    }

    /// 設定エラーを作成するヘルパー関数
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        AppError::Configuration(message.into())
    }

    /// ストレージエラーを作成するヘルパー関数
    pub fn storage<S: Into<String>>(message: S) -> Self {
        AppError::Storage(message.into())
    }
}

/// Result型のエイリアス（アプリケーション全体で使用）
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_external_service_message_is_kept_verbatim() {
        // ストアのエラーメッセージはエラーページにそのまま表示される
        let error = AppError::external_service("Erreur 404");
        assert_eq!(error.to_string(), "Erreur 404");
        assert_eq!(error.user_message(), "Erreur 404");
    }

    #[test]
    fn test_user_message() {
        let validation_error = AppError::validation("金額が不正です");
        assert_eq!(validation_error.user_message(), "金額が不正です");

        let not_found_error = AppError::not_found("請求書");
        assert_eq!(not_found_error.user_message(), "請求書が見つかりません");

        let storage_error = AppError::storage("書き込み失敗");
        assert_eq!(
            storage_error.user_message(),
            "セッション情報の読み書きでエラーが発生しました"
        );
    }

    #[test]
    fn test_json_error_conversion() {
        let parse_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error: AppError = parse_error.into();
        assert!(matches!(error, AppError::Json(_)));
        assert!(error.to_string().contains("JSON解析エラー"));
    }
}
