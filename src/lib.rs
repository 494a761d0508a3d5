pub mod features;
pub mod shared;

use features::router::Router;
use features::store::{ApiStore, MockStore, StoreClient};
use log::{error, info, warn};
use shared::api_client::ApiClient;
use shared::config::{
    initialize_logging_system, load_environment_variables, ApiConfig, EnvironmentConfig,
    StorageConfig,
};
use shared::dom::Document;
use shared::errors::AppResult;
use shared::storage::{FileStorage, SessionStorage};
use std::sync::Arc;

/// 組み立て済みのアプリケーション
pub struct App {
    pub document: Arc<Document>,
    pub storage: Arc<dyn SessionStorage>,
    pub router: Router,
}

/// 使用するストアの種類（`BILLED_STORE`）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Api,
    Mock,
}

impl StoreKind {
    pub fn from_env() -> Self {
        match crate::get_env_var_or_default!("BILLED_STORE", "api")
            .to_lowercase()
            .as_str()
        {
            "mock" => Self::Mock,
            "api" => Self::Api,
            other => {
                warn!("不明なBILLED_STORE値です: {other}（apiを使用します）");
                Self::Api
            }
        }
    }
}

/// ストアクライアントを作成する
///
/// API設定が不正な場合、開発環境ではフィクスチャ入りのメモリストアに切り替え、
/// 本番環境では設定エラーを返す
pub fn build_store(
    kind: StoreKind,
    config: ApiConfig,
    storage: Arc<dyn SessionStorage>,
    env_config: &EnvironmentConfig,
) -> AppResult<Arc<dyn StoreClient>> {
    if kind == StoreKind::Mock {
        info!("メモリストアを使用します");
        return Ok(Arc::new(MockStore::with_fixtures()));
    }

    match ApiClient::new_with_config(config) {
        Ok(client) => {
            info!("APIストアを使用します: {}", client.config().base_url);
            Ok(Arc::new(ApiStore::new(client, storage)))
        }
        Err(e) if env_config.is_production() => {
            error!("本番環境でのAPI設定エラー: {e}");
            Err(e)
        }
        Err(e) => {
            warn!("API設定が不正なため、メモリストアに切り替えます: {e}");
            Ok(Arc::new(MockStore::with_fixtures()))
        }
    }
}

/// 環境変数・ログ・セッション・ストアを初期化してアプリケーションを組み立てる
pub fn bootstrap() -> AppResult<App> {
    load_environment_variables();
    initialize_logging_system();

    info!("アプリケーション初期化を開始します...");

    let storage_config = StorageConfig::from_env();
    let storage: Arc<dyn SessionStorage> =
        Arc::new(FileStorage::open(storage_config.session_file)?);

    let env_config = EnvironmentConfig::from_env();
    let store = build_store(
        StoreKind::from_env(),
        ApiConfig::from_env(),
        storage.clone(),
        &env_config,
    )?;
    let document = Arc::new(Document::new());
    let router = Router::new(document.clone(), Some(store), storage.clone());

    info!("アプリケーション初期化が完了しました");
    Ok(App {
        document,
        storage,
        router,
    })
}
