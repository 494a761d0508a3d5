/// ルーター機能モジュール
///
/// 論理パスに応じてページを差し替え、ページごとのコンテナを生成します：
/// - 請求書一覧: 読み込み中ページ → 一覧取得 → 一覧またはエラーページ
/// - 新規請求書: フォームページ
/// - ログイン: プレースホルダー
pub mod navigation;

use crate::features::bills::container::BillsContainer;
use crate::features::bills::views::bills_page;
use crate::features::new_bill::container::NewBillContainer;
use crate::features::new_bill::views::new_bill_page;
use crate::features::store::StoreClient;
use crate::shared::dom::Document;
use crate::shared::layout::{error_page, loading_page, ActiveIcon};
use crate::shared::storage::{load_user, SessionStorage, UserType};
use async_trait::async_trait;
use log::{error, info, warn};
use std::sync::{Arc, Mutex, Weak};

pub use navigation::{login_page, render_static, Navigator, RoutePath, StaticNavigator};

/// ページコンテナに渡す依存関係
#[derive(Clone)]
pub struct ContainerDeps {
    pub document: Arc<Document>,
    pub navigator: Arc<dyn Navigator>,
    /// 未設定の場合、ストアを使う操作は何もしない
    pub store: Option<Arc<dyn StoreClient>>,
    pub storage: Arc<dyn SessionStorage>,
}

/// 表示中のページのコンテナ
#[derive(Clone)]
pub enum ActivePage {
    Login,
    Bills(Arc<BillsContainer>),
    NewBill(Arc<NewBillContainer>),
}

impl ActivePage {
    pub fn path(&self) -> RoutePath {
        match self {
            Self::Login => RoutePath::Login,
            Self::Bills(_) => RoutePath::Bills,
            Self::NewBill(_) => RoutePath::NewBill,
        }
    }
}

/// ルーター
#[derive(Clone)]
pub struct Router {
    document: Arc<Document>,
    store: Option<Arc<dyn StoreClient>>,
    storage: Arc<dyn SessionStorage>,
    active: Arc<Mutex<Option<ActivePage>>>,
}

impl Router {
    pub fn new(
        document: Arc<Document>,
        store: Option<Arc<dyn StoreClient>>,
        storage: Arc<dyn SessionStorage>,
    ) -> Self {
        Self {
            document,
            store,
            storage,
            active: Arc::new(Mutex::new(None)),
        }
    }

    /// コンテナ用の依存関係（遷移先はこのルーター自身）
    ///
    /// コンテナは表示中ページとしてルーターに保持されるため、
    /// 遷移先はルーターへの弱参照で渡す
    pub fn deps(&self) -> ContainerDeps {
        ContainerDeps {
            document: self.document.clone(),
            navigator: Arc::new(RouterHandle {
                document: self.document.clone(),
                store: self.store.clone(),
                storage: self.storage.clone(),
                active: Arc::downgrade(&self.active),
            }),
            store: self.store.clone(),
            storage: self.storage.clone(),
        }
    }

    /// 表示中のページのコンテナ
    pub fn active_page(&self) -> Option<ActivePage> {
        self.active
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn set_active(&self, page: ActivePage) {
        *self.active.lock().unwrap_or_else(|e| e.into_inner()) = Some(page);
    }

    /// セッション状態に応じた最初のページを表示する
    pub async fn start(&self) {
        let path = match load_user(self.storage.as_ref()) {
            Ok(Some(user)) if user.user_type == UserType::Employee => RoutePath::Bills,
            Ok(Some(_)) => {
                warn!("管理者ページは未対応のため、ログインページを表示します");
                RoutePath::Login
            }
            Ok(None) => RoutePath::Login,
            Err(e) => {
                error!("セッション情報の読み込みに失敗しました: {e}");
                RoutePath::Login
            }
        };
        self.navigate(path).await;
    }

    async fn show_bills(&self) {
        self.document.render(loading_page(Some(ActiveIcon::Window)));

        let container = Arc::new(BillsContainer::new(self.deps()));
        self.set_active(ActivePage::Bills(container.clone()));

        match container.get_bills().await {
            Ok(bills) => self.document.render(bills_page(&bills)),
            Err(e) => {
                error!("請求書一覧の取得に失敗しました: {e}");
                self.document
                    .render(error_page(Some(ActiveIcon::Window), e.user_message()));
            }
        }
    }

    fn show_new_bill(&self) {
        self.document.render(new_bill_page());
        let container = Arc::new(NewBillContainer::new(self.deps()));
        self.set_active(ActivePage::NewBill(container));
    }
}

#[async_trait]
impl Navigator for Router {
    async fn navigate(&self, path: RoutePath) {
        info!("ページ遷移: {path}");
        match path {
            RoutePath::Login => {
                self.document.render(login_page());
                self.set_active(ActivePage::Login);
            }
            RoutePath::Bills => self.show_bills().await,
            RoutePath::NewBill => self.show_new_bill(),
        }
    }
}

/// コンテナに渡すルーターへの弱参照
struct RouterHandle {
    document: Arc<Document>,
    store: Option<Arc<dyn StoreClient>>,
    storage: Arc<dyn SessionStorage>,
    active: Weak<Mutex<Option<ActivePage>>>,
}

impl RouterHandle {
    fn upgrade(&self) -> Option<Router> {
        let active = self.active.upgrade()?;
        Some(Router {
            document: self.document.clone(),
            store: self.store.clone(),
            storage: self.storage.clone(),
            active,
        })
    }
}

#[async_trait]
impl Navigator for RouterHandle {
    async fn navigate(&self, path: RoutePath) {
        match self.upgrade() {
            Some(router) => router.navigate(path).await,
            None => warn!("ルーターが破棄済みのため遷移しません: {path}"),
        }
    }
}
