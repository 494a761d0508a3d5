// メモリ上で動作するストア実装（テスト・オフライン動作用）

use super::{BillsResource, StoreClient};
use crate::features::bills::models::{Bill, BillStatus, BillUpdate, BillUploadForm, CreatedBill};
use crate::shared::errors::{AppError, AppResult};
use async_trait::async_trait;
use log::{debug, info};
use nanoid::nanoid;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

/// アップロード済みファイルの公開URLの接頭辞
const FILE_URL_PREFIX: &str = "https://localhost:3456/images";

/// 呼び出し回数の記録
#[derive(Debug, Default)]
struct CallCounters {
    list: AtomicUsize,
    create: AtomicUsize,
    update: AtomicUsize,
}

/// 注入する失敗
#[derive(Debug, Default, Clone)]
struct Failures {
    list: Option<String>,
    create: Option<String>,
    update: Option<String>,
}

/// メモリストア
#[derive(Debug, Default)]
pub struct MockStore {
    bills: Mutex<Vec<Bill>>,
    failures: Mutex<Failures>,
    calls: CallCounters,
}

impl MockStore {
    /// 空のストアを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// 指定した請求書を保持するストアを作成
    pub fn with_bills(bills: Vec<Bill>) -> Self {
        Self {
            bills: Mutex::new(bills),
            ..Self::default()
        }
    }

    /// フィクスチャの請求書4件を保持するストアを作成
    pub fn with_fixtures() -> Self {
        Self::with_bills(fixture_bills())
    }

    /// 一覧取得を指定メッセージで失敗させる
    pub fn fail_list_with(self, message: &str) -> Self {
        self.failures_guard().list = Some(message.to_string());
        self
    }

    /// アップロードを指定メッセージで失敗させる
    pub fn fail_create_with(self, message: &str) -> Self {
        self.failures_guard().create = Some(message.to_string());
        self
    }

    /// 更新を指定メッセージで失敗させる
    pub fn fail_update_with(self, message: &str) -> Self {
        self.failures_guard().update = Some(message.to_string());
        self
    }

    pub fn list_calls(&self) -> usize {
        self.calls.list.load(Ordering::SeqCst)
    }

    pub fn create_calls(&self) -> usize {
        self.calls.create.load(Ordering::SeqCst)
    }

    pub fn update_calls(&self) -> usize {
        self.calls.update.load(Ordering::SeqCst)
    }

    /// 保持している請求書のスナップショット
    pub fn snapshot(&self) -> Vec<Bill> {
        self.bills_guard().clone()
    }

    fn bills_guard(&self) -> MutexGuard<'_, Vec<Bill>> {
        self.bills.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn failures_guard(&self) -> MutexGuard<'_, Failures> {
        self.failures.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn injected_failure(&self, pick: fn(&Failures) -> Option<String>) -> AppResult<()> {
        match pick(&self.failures_guard()) {
            Some(message) => Err(AppError::external_service(message)),
            None => Ok(()),
        }
    }
}

impl StoreClient for MockStore {
    fn bills(&self) -> &dyn BillsResource {
        self
    }
}

#[async_trait]
impl BillsResource for MockStore {
    async fn list(&self) -> AppResult<Vec<Bill>> {
        self.calls.list.fetch_add(1, Ordering::SeqCst);
        self.injected_failure(|f| f.list.clone())?;

        let bills = self.snapshot();
        debug!("メモリストアから請求書一覧を返します: count={}", bills.len());
        Ok(bills)
    }

    async fn create(&self, form: BillUploadForm) -> AppResult<CreatedBill> {
        self.calls.create.fetch_add(1, Ordering::SeqCst);
        self.injected_failure(|f| f.create.clone())?;

        let key = nanoid!();
        let file_url = format!(
            "{FILE_URL_PREFIX}/{}",
            urlencoding::encode(&form.file.file_name)
        );

        self.bills_guard().push(Bill {
            id: Some(key.clone()),
            email: form.email,
            file_url: Some(file_url.clone()),
            file_name: Some(form.file.file_name),
            status: Some(BillStatus::Pending.to_string()),
            ..Bill::default()
        });

        info!("メモリストアに請求書を仮作成しました: key={key}");
        Ok(CreatedBill { file_url, key })
    }

    async fn update(&self, request: BillUpdate) -> AppResult<Bill> {
        self.calls.update.fetch_add(1, Ordering::SeqCst);
        self.injected_failure(|f| f.update.clone())?;

        let id = request
            .id
            .clone()
            .ok_or_else(|| AppError::validation("更新対象の請求書IDがありません"))?;
        let mut updated = request.bill()?;
        updated.id = Some(id.clone());

        let mut bills = self.bills_guard();
        let existing = bills
            .iter_mut()
            .find(|bill| bill.id.as_deref() == Some(id.as_str()))
            .ok_or_else(|| AppError::not_found(format!("請求書 {id}")))?;
        *existing = updated.clone();

        info!("メモリストアの請求書を更新しました: id={id}");
        Ok(updated)
    }
}

/// フィクスチャの請求書（日付順は意図的にばらばら）
pub fn fixture_bills() -> Vec<Bill> {
    vec![
        Bill {
            id: Some("47qAXb6fIm2zOKkLzMro".to_string()),
            email: Some("a@a".to_string()),
            expense_type: Some("Hôtel et logement".to_string()),
            name: Some("encore".to_string()),
            date: Some("2004-04-04".to_string()),
            amount: Some(400.0),
            vat: Some(80.0),
            pct: Some(20.0),
            commentary: Some("séminaire billed".to_string()),
            comment_admin: Some("ok".to_string()),
            file_url: Some(format!("{FILE_URL_PREFIX}/preview-facture-free-201801-pdf-1.jpg")),
            file_name: Some("preview-facture-free-201801-pdf-1.jpg".to_string()),
            status: Some("pending".to_string()),
        },
        Bill {
            id: Some("BeKy5Mo4jkmdfPGYpTxZ".to_string()),
            email: Some("a@a".to_string()),
            expense_type: Some("Transports".to_string()),
            name: Some("test1".to_string()),
            date: Some("2001-01-01".to_string()),
            amount: Some(100.0),
            vat: None,
            pct: Some(20.0),
            commentary: Some("plop".to_string()),
            comment_admin: Some("en fait non".to_string()),
            file_url: Some(format!("{FILE_URL_PREFIX}/1592770761.jpeg")),
            file_name: Some("1592770761.jpeg".to_string()),
            status: Some("refused".to_string()),
        },
        Bill {
            id: Some("UIUZtnPQvnbFnB0ozvJh".to_string()),
            email: Some("a@a".to_string()),
            expense_type: Some("Services en ligne".to_string()),
            name: Some("test3".to_string()),
            date: Some("2003-03-03".to_string()),
            amount: Some(300.0),
            vat: Some(60.0),
            pct: Some(20.0),
            commentary: None,
            comment_admin: Some("bon bah d'accord".to_string()),
            file_url: Some(format!(
                "{FILE_URL_PREFIX}/facture-client-php-exemple-format-pdf.png"
            )),
            file_name: Some("facture-client-php-exemple-format-pdf.png".to_string()),
            status: Some("accepted".to_string()),
        },
        Bill {
            id: Some("qcCK3SzECmaZAGRrHjaC".to_string()),
            email: Some("a@a".to_string()),
            expense_type: Some("Restaurants et bars".to_string()),
            name: Some("test2".to_string()),
            date: Some("2002-02-02".to_string()),
            amount: Some(200.0),
            vat: Some(40.0),
            pct: Some(20.0),
            commentary: Some("test2".to_string()),
            comment_admin: Some("pas la bonne facture".to_string()),
            file_url: Some(format!("{FILE_URL_PREFIX}/preview-facture-free-201801-pdf-1.jpg")),
            file_name: Some("preview-facture-free-201801-pdf-1.jpg".to_string()),
            status: Some("refused".to_string()),
        },
    ]
}
