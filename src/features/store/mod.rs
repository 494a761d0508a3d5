/// ストアクライアント機能モジュール
///
/// リモートの請求書ストアへのアクセスを抽象化します：
/// - `StoreClient` / `BillsResource` トレイト（`store.bills().list()` 形式）
/// - Billed APIサーバー向けのHTTP実装
/// - フィクスチャを保持するメモリ実装（テスト・オフライン用）
pub mod api_store;
pub mod mock_store;

use crate::features::bills::models::{Bill, BillUpdate, BillUploadForm, CreatedBill};
use crate::shared::errors::AppResult;
use async_trait::async_trait;

pub use api_store::ApiStore;
pub use mock_store::MockStore;

/// 請求書リソースの操作
#[async_trait]
pub trait BillsResource: Send + Sync {
    /// 請求書一覧を取得する
    async fn list(&self) -> AppResult<Vec<Bill>>;

    /// 領収書ファイルをアップロードし、請求書を仮作成する
    async fn create(&self, form: BillUploadForm) -> AppResult<CreatedBill>;

    /// 請求書を更新する
    async fn update(&self, request: BillUpdate) -> AppResult<Bill>;
}

/// リモートストアクライアント
pub trait StoreClient: Send + Sync {
    fn bills(&self) -> &dyn BillsResource;
}
