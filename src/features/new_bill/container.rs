// 新規請求書ページのコンテナ（ファイル選択・送信処理）

use super::validation::{parse_int, validate_receipt_format, INVALID_FORMAT_MESSAGE};
use super::views::DEFAULT_PCT;
use crate::features::bills::models::{Bill, BillStatus, BillUpdate, BillUploadForm, ReceiptFile};
use crate::features::router::{ContainerDeps, RoutePath};
use crate::shared::errors::AppResult;
use crate::shared::storage::load_user;
use log::{debug, error, info, warn};
use std::sync::{Mutex, MutexGuard};

/// 選択済みファイルとアップロード結果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadState {
    pub file_name: Option<String>,
    pub file_url: Option<String>,
    /// ストアが仮作成した請求書のID
    pub bill_id: Option<String>,
}

/// 新規請求書コンテナ
pub struct NewBillContainer {
    deps: ContainerDeps,
    state: Mutex<UploadState>,
}

impl NewBillContainer {
    pub fn new(deps: ContainerDeps) -> Self {
        Self {
            deps,
            state: Mutex::new(UploadState::default()),
        }
    }

    fn state_guard(&self) -> MutexGuard<'_, UploadState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// 現在のアップロード状態
    pub fn upload_state(&self) -> UploadState {
        self.state_guard().clone()
    }

    fn session_email(&self) -> Option<String> {
        match load_user(self.deps.storage.as_ref()) {
            Ok(Some(user)) => user.email,
            Ok(None) => {
                warn!("セッションにユーザー情報がありません");
                None
            }
            Err(e) => {
                error!("セッションのユーザー情報を読み込めませんでした: {e}");
                None
            }
        }
    }

    /// ファイル入力の変更
    ///
    /// jpg / jpeg / png 以外はアラートを表示し、入力を空に戻してエラーを返す。
    /// ストアが設定されていれば受け付けたファイルをすぐにアップロードする。
    /// アップロードの失敗は記録のみ行う。
    pub async fn handle_change_file(&self, file: ReceiptFile) -> AppResult<()> {
        if let Err(e) = validate_receipt_format(&file) {
            warn!("領収書の形式が不正です: file_name={}", file.file_name);
            self.deps.document.alert(INVALID_FORMAT_MESSAGE);
            self.deps.document.update_by_test_id("file", |input| {
                input.value.clear();
                input.files.clear();
            });
            *self.state_guard() = UploadState::default();
            return Err(e);
        }

        let file_name = file.file_name.clone();
        self.deps.document.update_by_test_id("file", |input| {
            input.value = file_name.clone();
            input.files = vec![file_name.clone()];
        });
        *self.state_guard() = UploadState {
            file_name: Some(file_name.clone()),
            ..UploadState::default()
        };
        debug!("領収書ファイルを受け付けました: file_name={file_name}");

        let Some(store) = &self.deps.store else {
            return Ok(());
        };

        let form = BillUploadForm {
            file,
            email: self.session_email(),
        };
        match store.bills().create(form).await {
            Ok(created) => {
                info!(
                    "領収書をアップロードしました: key={}, file_url={}",
                    created.key, created.file_url
                );
                let mut state = self.state_guard();
                state.file_url = Some(created.file_url);
                state.bill_id = Some(created.key);
            }
            Err(e) => error!("領収書のアップロードに失敗しました: {e}"),
        }
        Ok(())
    }

    /// フォームの入力値から請求書の下書きを組み立てる
    pub fn collect_draft(&self) -> Bill {
        let document = &self.deps.document;
        let text = |test_id: &str| {
            document
                .value_of(test_id)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let state = self.upload_state();

        Bill {
            id: None,
            email: self.session_email(),
            expense_type: text("expense-type"),
            name: text("expense-name"),
            date: text("datepicker"),
            amount: text("amount").and_then(|v| parse_int(&v)).map(|n| n as f64),
            vat: text("vat").and_then(|v| v.parse::<f64>().ok()),
            pct: Some(
                text("pct")
                    .and_then(|v| parse_int(&v))
                    .filter(|pct| *pct != 0)
                    .unwrap_or(DEFAULT_PCT) as f64,
            ),
            commentary: text("commentary"),
            comment_admin: None,
            file_url: state.file_url,
            file_name: state.file_name,
            status: Some(BillStatus::Pending.to_string()),
        }
    }

    /// フォーム送信
    ///
    /// 下書きを`update_bill`で一度だけ送信し、請求書一覧ページへ遷移する。
    /// ファイル未選択でも送信を止めない。
    pub async fn handle_submit(&self) {
        let bill = self.collect_draft();
        if bill.file_name.is_none() {
            warn!("領収書ファイルが選択されていない状態で送信します");
        }

        self.update_bill(&bill).await;
        self.deps.navigator.navigate(RoutePath::Bills).await;
    }

    /// 請求書をストアに送信する（ベストエフォート）
    ///
    /// 失敗は記録のみ行い、呼び出し側には返さない
    pub async fn update_bill(&self, bill: &Bill) {
        let Some(store) = &self.deps.store else {
            debug!("ストアが未設定のため請求書を送信しません");
            return;
        };

        let bill_id = self.upload_state().bill_id;
        let request = match BillUpdate::new(bill_id, bill) {
            Ok(request) => request,
            Err(e) => {
                error!("請求書をシリアライズできませんでした: {e}");
                return;
            }
        };

        match store.bills().update(request).await {
            Ok(updated) => info!("請求書を送信しました: id={:?}", updated.id),
            Err(e) => error!("請求書の送信に失敗しました: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::new_bill::views::new_bill_page;
    use crate::features::router::StaticNavigator;
    use crate::features::store::{MockStore, StoreClient};
    use crate::shared::dom::Document;
    use crate::shared::storage::{save_user, MemoryStorage, SessionUser};
    use std::sync::Arc;

    struct Harness {
        document: Arc<Document>,
        navigator: Arc<StaticNavigator>,
        container: NewBillContainer,
    }

    fn harness(store: Option<Arc<dyn StoreClient>>) -> Harness {
        let document = Arc::new(Document::new());
        document.render(new_bill_page());
        let navigator = Arc::new(StaticNavigator::new(document.clone()));
        let storage = Arc::new(MemoryStorage::new());
        save_user(storage.as_ref(), &SessionUser::employee("a@a")).unwrap();

        let container = NewBillContainer::new(ContainerDeps {
            document: document.clone(),
            navigator: navigator.clone(),
            store,
            storage,
        });
        Harness {
            document,
            navigator,
            container,
        }
    }

    fn fill_form(document: &Document) {
        document.set_value("expense-type", "Transports");
        document.set_value("expense-name", "Test name");
        document.set_value("datepicker", "2022-05-25");
        document.set_value("amount", "800");
        document.set_value("vat", "30");
        document.set_value("pct", "10");
        document.set_value("commentary", "");
    }

    #[tokio::test]
    async fn test_wrong_format_raises_alert() {
        let store = Arc::new(MockStore::new());
        let h = harness(Some(store.clone()));

        let result = h
            .container
            .handle_change_file(ReceiptFile::new("test.ods", b"test-file".to_vec()))
            .await;

        assert!(result.is_err());
        assert_eq!(h.document.alerts(), vec![INVALID_FORMAT_MESSAGE.to_string()]);
        assert!(h.document.query_by_test_id("file").unwrap().files.is_empty());
        assert_eq!(store.create_calls(), 0);
        assert_eq!(h.container.upload_state(), UploadState::default());
    }

    #[tokio::test]
    async fn test_accepted_file_name_is_kept_on_input() {
        let h = harness(None);

        h.container
            .handle_change_file(ReceiptFile::new("test-file.png", b"test-file".to_vec()))
            .await
            .unwrap();

        let input = h.document.query_by_test_id("file").unwrap();
        assert_eq!(input.files, vec!["test-file.png".to_string()]);
        assert!(h.document.alerts().is_empty());
        assert_eq!(
            h.container.upload_state().file_name.as_deref(),
            Some("test-file.png")
        );
    }

    #[tokio::test]
    async fn test_accepted_file_is_uploaded_when_store_is_configured() {
        let store = Arc::new(MockStore::new());
        let h = harness(Some(store.clone()));

        h.container
            .handle_change_file(ReceiptFile::new("Ticket.JPG", b"jpg".to_vec()))
            .await
            .unwrap();

        let state = h.container.upload_state();
        assert_eq!(store.create_calls(), 1);
        assert!(state.bill_id.is_some());
        assert!(state.file_url.unwrap().ends_with("Ticket.JPG"));
        assert_eq!(store.snapshot()[0].email.as_deref(), Some("a@a"));
    }

    #[tokio::test]
    async fn test_upload_failure_is_not_raised() {
        let store = Arc::new(MockStore::new().fail_create_with("Erreur 500"));
        let h = harness(Some(store.clone()));

        let result = h
            .container
            .handle_change_file(ReceiptFile::new("ticket.png", b"png".to_vec()))
            .await;

        assert!(result.is_ok());
        assert_eq!(h.container.upload_state().bill_id, None);
    }

    #[test]
    fn test_collect_draft_reads_form_and_session() {
        let h = harness(None);
        fill_form(&h.document);

        let draft = h.container.collect_draft();
        assert_eq!(draft.email.as_deref(), Some("a@a"));
        assert_eq!(draft.expense_type.as_deref(), Some("Transports"));
        assert_eq!(draft.name.as_deref(), Some("Test name"));
        assert_eq!(draft.date.as_deref(), Some("2022-05-25"));
        assert_eq!(draft.amount, Some(800.0));
        assert_eq!(draft.vat, Some(30.0));
        assert_eq!(draft.pct, Some(10.0));
        assert_eq!(draft.commentary, None);
        assert_eq!(draft.status.as_deref(), Some("pending"));
    }

    #[test]
    fn test_pct_defaults_to_twenty() {
        let h = harness(None);
        assert_eq!(h.container.collect_draft().pct, Some(20.0));

        h.document.set_value("pct", "0");
        assert_eq!(h.container.collect_draft().pct, Some(20.0));
    }

    #[tokio::test]
    async fn test_submit_updates_once_then_shows_bills() {
        let store = Arc::new(MockStore::new());
        let h = harness(Some(store.clone()));

        h.container
            .handle_change_file(ReceiptFile::new("bill.jpg", b"jpg".to_vec()))
            .await
            .unwrap();
        fill_form(&h.document);
        h.container.handle_submit().await;

        assert_eq!(store.update_calls(), 1);
        assert_eq!(h.navigator.history(), vec![RoutePath::Bills]);
        assert!(h.document.query_by_test_id("note-de-frais-heading").is_some());

        let saved = &store.snapshot()[0];
        assert_eq!(saved.name.as_deref(), Some("Test name"));
        assert_eq!(saved.file_name.as_deref(), Some("bill.jpg"));
        assert_eq!(saved.status.as_deref(), Some("pending"));
    }

    #[tokio::test]
    async fn test_submit_without_store_still_navigates() {
        let h = harness(None);
        h.container.handle_submit().await;
        assert!(h.document.query_by_test_id("note-de-frais-heading").is_some());
    }

    #[tokio::test]
    async fn test_update_failure_still_navigates() {
        let store = Arc::new(MockStore::new().fail_update_with("Erreur 500"));
        let h = harness(Some(store.clone()));
        fill_form(&h.document);

        h.container.handle_submit().await;

        assert_eq!(store.update_calls(), 1);
        assert_eq!(h.navigator.history(), vec![RoutePath::Bills]);
    }

    #[tokio::test]
    async fn test_submit_without_file_is_not_blocked() {
        // ファイル未選択でも送信される（既知の仕様上の抜け）
        let store = Arc::new(MockStore::new());
        let h = harness(Some(store.clone()));
        fill_form(&h.document);

        h.container.handle_submit().await;

        assert_eq!(store.update_calls(), 1);
        assert_eq!(h.navigator.history(), vec![RoutePath::Bills]);
    }
}
