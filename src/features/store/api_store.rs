// Billed APIサーバーと通信するストア実装

use super::{BillsResource, StoreClient};
use crate::features::bills::models::{Bill, BillUpdate, BillUploadForm, CreatedBill};
use crate::shared::api_client::ApiClient;
use crate::shared::errors::{AppError, AppResult};
use crate::shared::storage::{SessionKeys, SessionStorage};
use async_trait::async_trait;
use log::{info, warn};
use reqwest::multipart;
use std::sync::Arc;

/// APIサーバー経由のストア
pub struct ApiStore {
    api_client: ApiClient,
    storage: Arc<dyn SessionStorage>,
}

impl ApiStore {
    /// 新しいAPIストアを作成
    ///
    /// # 引数
    /// * `api_client` - APIクライアント
    /// * `storage` - 認証トークン（`jwt`）を読み出すセッションストレージ
    pub fn new(api_client: ApiClient, storage: Arc<dyn SessionStorage>) -> Self {
        Self {
            api_client,
            storage,
        }
    }

    fn auth_token(&self) -> Option<String> {
        self.storage.get_item(SessionKeys::JWT)
    }
}

impl StoreClient for ApiStore {
    fn bills(&self) -> &dyn BillsResource {
        self
    }
}

#[async_trait]
impl BillsResource for ApiStore {
    async fn list(&self) -> AppResult<Vec<Bill>> {
        let token = self.auth_token();
        let bills: Vec<Bill> = self.api_client.get("/bills", token.as_deref()).await?;

        info!("請求書一覧取得成功: count={}", bills.len());
        Ok(bills)
    }

    async fn create(&self, form: BillUploadForm) -> AppResult<CreatedBill> {
        let token = self.auth_token();
        let file = form.file;
        let email = form.email.unwrap_or_else(|| {
            warn!("送信者のメールアドレスがないため、空のemailでアップロードします");
            String::new()
        });

        let build_form = || -> AppResult<multipart::Form> {
            let part = multipart::Part::bytes(file.content.clone())
                .file_name(file.file_name.clone())
                .mime_str(file.content_type())
                .map_err(|e| AppError::validation(format!("MIMEタイプ設定エラー: {e}")))?;
            Ok(multipart::Form::new()
                .part("file", part)
                .text("email", email.clone()))
        };

        let created: CreatedBill = self
            .api_client
            .post_multipart("/bills", build_form, token.as_deref())
            .await?;

        info!(
            "領収書アップロード成功: key={}, file_url={}",
            created.key, created.file_url
        );
        Ok(created)
    }

    async fn update(&self, request: BillUpdate) -> AppResult<Bill> {
        let id = request
            .id
            .as_deref()
            .ok_or_else(|| AppError::validation("更新対象の請求書IDがありません"))?;
        let bill = request.bill()?;
        let token = self.auth_token();

        let endpoint = format!("/bills/{}", urlencoding::encode(id));
        let updated: Bill = self
            .api_client
            .patch(&endpoint, &bill, token.as_deref())
            .await?;

        info!("請求書更新成功: id={id}");
        Ok(updated)
    }
}
