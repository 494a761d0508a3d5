/// 汎用APIクライアント
///
/// Billed APIサーバーとの通信を行うクライアント。
/// 接続失敗時は指数バックオフでリトライし、HTTPエラーはサーバーのメッセージ
/// （なければ`Erreur <ステータス>`）を保持した`AppError::ExternalService`に変換する。
use crate::shared::config::ApiConfig;
use crate::shared::errors::{AppError, AppResult};
use log::{debug, info, warn};
use reqwest::{multipart, Client, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;

/// リトライ待機時間の指数の上限
const MAX_BACKOFF_EXPONENT: u32 = 6;

/// APIサーバーからのエラーレスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
}

/// 汎用APIクライアント
pub struct ApiClient {
    client: Client,
    config: ApiConfig,
}

impl ApiClient {
    /// 設定を指定してAPIクライアントを作成
    pub fn new_with_config(config: ApiConfig) -> AppResult<Self> {
        config.validate().map_err(AppError::Configuration)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| AppError::configuration(format!("HTTPクライアント初期化失敗: {e}")))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{endpoint}", self.config.base_url.trim_end_matches('/'))
    }

    fn authorize(request: RequestBuilder, auth_token: Option<&str>) -> RequestBuilder {
        match auth_token {
            Some(token) => request.header("Authorization", format!("Bearer {token}")),
            None => request,
        }
    }

    /// GETリクエストを送信
    pub async fn get<T>(&self, endpoint: &str, auth_token: Option<&str>) -> AppResult<T>
    where
        T: DeserializeOwned,
    {
        info!("GETリクエスト送信: endpoint={endpoint}");

        let request = Self::authorize(self.client.get(self.url(endpoint)), auth_token);
        self.send_request_with_retry(|| request.try_clone(), "GET", endpoint)
            .await
    }

    /// PATCHリクエストを送信
    pub async fn patch<B, T>(
        &self,
        endpoint: &str,
        body: &B,
        auth_token: Option<&str>,
    ) -> AppResult<T>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        info!("PATCHリクエスト送信: endpoint={endpoint}");

        let request = Self::authorize(self.client.patch(self.url(endpoint)).json(body), auth_token);
        self.send_request_with_retry(|| request.try_clone(), "PATCH", endpoint)
            .await
    }

    /// マルチパートPOSTリクエストを送信
    ///
    /// `multipart::Form`は複製できないため、リトライごとに`build_form`で再構築する
    pub async fn post_multipart<F, T>(
        &self,
        endpoint: &str,
        build_form: F,
        auth_token: Option<&str>,
    ) -> AppResult<T>
    where
        F: Fn() -> AppResult<multipart::Form>,
        T: DeserializeOwned,
    {
        info!("マルチパートPOSTリクエスト送信: endpoint={endpoint}");

        // フォーム構築エラーはリトライしない
        build_form()?;

        let url = self.url(endpoint);
        self.send_request_with_retry(
            || {
                let form = build_form().ok()?;
                Some(Self::authorize(
                    self.client.post(&url).multipart(form),
                    auth_token,
                ))
            },
            "POST",
            endpoint,
        )
        .await
    }

    /// リトライ機能付きでリクエストを送信
    async fn send_request_with_retry<R, T>(
        &self,
        next_request: R,
        method: &str,
        endpoint: &str,
    ) -> AppResult<T>
    where
        R: Fn() -> Option<RequestBuilder>,
        T: DeserializeOwned,
    {
        let mut attempts = 0;
        loop {
            let request = next_request().ok_or_else(|| {
                AppError::external_service("リクエストの構築に失敗しました")
            })?;

            match request.send().await {
                Ok(response) => {
                    if response.status().is_success() {
                        let result: T = response.json().await.map_err(|e| {
                            AppError::external_service(format!("レスポンス解析エラー: {e}"))
                        })?;

                        info!("{method}リクエスト成功: endpoint={endpoint}");
                        return Ok(result);
                    }
                    return Err(self.handle_error_response(response).await);
                }
                // 接続確立前の失敗のみリトライする（送信済みのリクエストは再送しない）
                Err(e) if e.is_connect() && attempts < self.config.max_retries => {
                    attempts += 1;
                    let delay = backoff_delay(attempts);
                    warn!(
                        "APIサーバーへの接続に失敗、リトライします: attempt={attempts}/{}, delay={delay:?}, error={e}",
                        self.config.max_retries
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    return Err(AppError::external_service(format!(
                        "APIサーバーへの接続に失敗しました: {e}"
                    )));
                }
            }
        }
    }

    /// エラーレスポンスをストアエラーに変換
    async fn handle_error_response(&self, response: Response) -> AppError {
        let status = response.status();
        let response_text = response.text().await.unwrap_or_default();

        let message = error_message(status, &response_text);
        debug!(
            "APIサーバーからエラーレスポンスを受信: status={}, message={message}",
            status.as_u16()
        );
        AppError::external_service(message)
    }
}

/// リトライ前の待機時間（2^attempts秒、最大64秒）
fn backoff_delay(attempts: u32) -> Duration {
    Duration::from_secs(2_u64.pow(attempts.min(MAX_BACKOFF_EXPONENT)))
}

/// エラーレスポンス本文からユーザー向けメッセージを決定する
///
/// 構造化された`{"message": ...}`があればそれを、なければ`Erreur <ステータス>`を返す
pub fn error_message(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(error_response) if !error_response.message.trim().is_empty() => error_response.message,
        _ => {
            if !body.trim().is_empty() {
                warn!(
                    "APIサーバーから非構造化エラーレスポンス: status={}, body={body}",
                    status.as_u16()
                );
            }
            format!("Erreur {}", status.as_u16())
        }
    }
}
