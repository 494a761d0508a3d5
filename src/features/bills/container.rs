// 請求書一覧ページのコンテナ（一覧取得とイベント処理）

use super::format::{format_status, parse_date, try_format_date, FormatError};
use super::models::Bill;
use super::views::RECEIPT_MODAL_ID;
use crate::features::router::{ContainerDeps, RoutePath};
use crate::shared::dom::Element;
use crate::shared::errors::AppResult;
use chrono::NaiveDate;
use log::{debug, error, info};
use std::cmp::Reverse;

/// 領収書モーダルの既定幅（ピクセル）
pub const DEFAULT_MODAL_WIDTH: u32 = 800;

/// 整形できなかったレコードの記録
#[derive(Debug, Clone, PartialEq)]
pub struct FormatAnomaly {
    /// ストアから受け取ったままのレコード
    pub bill: Bill,
    pub error: FormatError,
}

/// 一覧取得の結果（整形済みの一覧と整形できなかったレコード）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BillsReport {
    pub bills: Vec<Bill>,
    pub anomalies: Vec<FormatAnomaly>,
}

/// 請求書一覧コンテナ
pub struct BillsContainer {
    deps: ContainerDeps,
    modal_width: u32,
}

impl BillsContainer {
    pub fn new(deps: ContainerDeps) -> Self {
        Self {
            deps,
            modal_width: DEFAULT_MODAL_WIDTH,
        }
    }

    pub fn with_modal_width(mut self, modal_width: u32) -> Self {
        self.modal_width = modal_width;
        self
    }

    /// 「新規請求書」ボタンのクリック
    pub async fn handle_click_new_bill(&self) {
        self.deps.navigator.navigate(RoutePath::NewBill).await;
    }

    /// 目のアイコンのクリック：領収書をモーダルで表示する
    ///
    /// アイコンに`data-bill-url`がなければ何もしない
    pub fn handle_click_icon_eye(&self, icon: &Element) {
        let Some(bill_url) = icon.attr("data-bill-url").filter(|url| !url.is_empty()) else {
            debug!("領収書URLがないためプレビューを表示しません");
            return;
        };

        let image_width = self.modal_width / 2;
        let preview = Element::new("div")
            .with_class("bill-proof-container")
            .with_attr("style", "text-align: center;")
            .with_child(
                Element::new("img")
                    .with_attr("width", &image_width.to_string())
                    .with_attr("src", bill_url)
                    .with_attr("alt", "Bill"),
            );

        let shown = self.deps.document.update_by_id(RECEIPT_MODAL_ID, |modal| {
            if let Some(body) = modal.find_mut(&|e: &Element| e.has_class("modal-body")) {
                body.children = vec![preview];
            }
            modal.add_class("show");
        });

        if shown {
            info!("領収書プレビューを表示しました: url={bill_url}");
        } else {
            error!("領収書モーダルが見つかりません: id={RECEIPT_MODAL_ID}");
        }
    }

    /// 請求書一覧を取得する（日付の新しい順、表示用に整形済み）
    ///
    /// 整形できないレコードはログに記録し、未整形のまま一覧に含める。
    /// ストアのエラーは呼び出し側に返す。
    pub async fn get_bills(&self) -> AppResult<Vec<Bill>> {
        let report = self.get_bills_report().await?;
        Ok(report.bills)
    }

    /// 請求書一覧と整形失敗の記録を取得する
    pub async fn get_bills_report(&self) -> AppResult<BillsReport> {
        let Some(store) = &self.deps.store else {
            debug!("ストアが未設定のため空の一覧を返します");
            return Ok(BillsReport::default());
        };

        let mut bills = store.bills().list().await?;
        sort_by_date_desc(&mut bills);

        let mut report = BillsReport::default();
        for bill in bills {
            match format_bill(&bill) {
                Ok(formatted) => report.bills.push(formatted),
                Err(error) => {
                    error!("請求書を整形できませんでした: error={error}, bill={bill:?}");
                    report.bills.push(pass_through(&bill));
                    report.anomalies.push(FormatAnomaly { bill, error });
                }
            }
        }

        info!(
            "請求書一覧を取得しました: count={}, anomalies={}",
            report.bills.len(),
            report.anomalies.len()
        );
        Ok(report)
    }
}

/// 1件の請求書を表示用に整形する
pub fn format_bill(bill: &Bill) -> Result<Bill, FormatError> {
    let raw_date = bill.date.as_deref().ok_or(FormatError::MissingDate)?;
    let raw_status = bill.status.as_deref().ok_or(FormatError::MissingStatus)?;

    Ok(Bill {
        date: Some(try_format_date(raw_date)?),
        status: Some(format_status(raw_status)),
        ..bill.clone()
    })
}

/// 整形に失敗したレコード：日付は未加工のまま、審査状態は可能な範囲で変換する
fn pass_through(bill: &Bill) -> Bill {
    Bill {
        status: bill.status.as_deref().map(format_status),
        ..bill.clone()
    }
}

/// 日付の新しい順に並べる
///
/// 解析できる日付を持つレコードを日付の新しい順に先頭へ、
/// 解析できない日付は文字列の降順でその後ろへ、日付のないレコードは末尾に置く
pub fn sort_by_date_desc(bills: &mut [Bill]) {
    bills.sort_by_cached_key(|bill| Reverse(date_sort_key(bill.date.as_deref())));
}

fn date_sort_key(raw: Option<&str>) -> (u8, Option<NaiveDate>, String) {
    match raw {
        Some(raw) => match parse_date(raw) {
            Some(date) => (2, Some(date), raw.to_string()),
            None => (1, None, raw.to_string()),
        },
        None => (0, None, String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::bills::views::bills_page;
    use crate::features::router::StaticNavigator;
    use crate::features::store::mock_store::fixture_bills;
    use crate::features::store::{MockStore, StoreClient};
    use crate::shared::dom::Document;
    use crate::shared::storage::MemoryStorage;
    use quickcheck_macros::quickcheck;
    use std::sync::Arc;

    struct Harness {
        document: Arc<Document>,
        navigator: Arc<StaticNavigator>,
        container: BillsContainer,
    }

    fn harness(store: Option<Arc<dyn StoreClient>>) -> Harness {
        let document = Arc::new(Document::new());
        let navigator = Arc::new(StaticNavigator::new(document.clone()));
        let container = BillsContainer::new(ContainerDeps {
            document: document.clone(),
            navigator: navigator.clone(),
            store,
            storage: Arc::new(MemoryStorage::new()),
        });
        Harness {
            document,
            navigator,
            container,
        }
    }

    #[tokio::test]
    async fn test_get_bills_formats_and_sorts_fixtures() {
        let store = Arc::new(MockStore::with_fixtures());
        let h = harness(Some(store.clone()));

        let bills = h.container.get_bills().await.unwrap();
        let raw = store.bills().list().await.unwrap();

        assert_eq!(bills.len(), raw.len());
        assert_eq!(bills[0].id.as_deref(), Some("47qAXb6fIm2zOKkLzMro"));
        assert_eq!(bills[0].status.as_deref(), Some("En attente"));
        assert_eq!(bills[0].date.as_deref(), Some("4 Avr. 04"));

        let names: Vec<_> = bills.iter().filter_map(|b| b.name.as_deref()).collect();
        assert_eq!(names, vec!["encore", "test3", "test2", "test1"]);
    }

    #[tokio::test]
    async fn test_corrupted_record_is_logged_and_kept() {
        let corrupted: Bill = serde_json::from_str(
            r#"{"corruptedDate": "corrupted", "corruptedStatus": "corrupted"}"#,
        )
        .unwrap();
        let h = harness(Some(Arc::new(MockStore::with_bills(vec![corrupted.clone()]))));

        let report = h.container.get_bills_report().await.unwrap();
        assert_eq!(report.bills, vec![corrupted.clone()]);
        assert_eq!(report.anomalies.len(), 1);
        assert_eq!(report.anomalies[0].bill, corrupted);
        assert_eq!(report.anomalies[0].error, FormatError::MissingDate);
    }

    #[tokio::test]
    async fn test_unparseable_date_passes_through_raw() {
        let bill = Bill {
            id: Some("x".to_string()),
            date: Some("hier".to_string()),
            status: Some("accepted".to_string()),
            ..Bill::default()
        };
        let h = harness(Some(Arc::new(MockStore::with_bills(vec![bill]))));

        let report = h.container.get_bills_report().await.unwrap();
        assert_eq!(report.bills[0].date.as_deref(), Some("hier"));
        assert_eq!(report.bills[0].status.as_deref(), Some("Accepté"));
        assert!(matches!(
            report.anomalies[0].error,
            FormatError::InvalidDate { .. }
        ));
    }

    #[tokio::test]
    async fn test_store_rejection_propagates() {
        let h = harness(Some(Arc::new(
            MockStore::with_fixtures().fail_list_with("Erreur 500"),
        )));
        let error = h.container.get_bills().await.unwrap_err();
        assert_eq!(error.to_string(), "Erreur 500");
    }

    #[tokio::test]
    async fn test_without_store_returns_empty_list() {
        let h = harness(None);
        assert!(h.container.get_bills().await.unwrap().is_empty());
    }

    #[test]
    fn test_click_icon_eye_opens_modal() {
        let h = harness(None);
        h.document.render(bills_page(&fixture_bills()));

        let icons = h.document.query_all_by_test_id("icon-eye");
        h.container.handle_click_icon_eye(&icons[0]);

        let modal = h.document.query_by_test_id("modal-show").unwrap();
        assert!(modal.has_class("show"));
        let image = modal.find(&|e: &Element| e.tag == "img").unwrap();
        assert_eq!(image.attr("src"), icons[0].attr("data-bill-url"));
        assert_eq!(image.attr("width"), Some("400"));
    }

    #[test]
    fn test_preview_width_follows_modal_width() {
        let h = harness(None);
        let container = BillsContainer::new(ContainerDeps {
            document: h.document.clone(),
            navigator: h.navigator.clone(),
            store: None,
            storage: Arc::new(MemoryStorage::new()),
        })
        .with_modal_width(1000);
        h.document.render(bills_page(&fixture_bills()));

        let icon = h.document.query_by_test_id("icon-eye").unwrap();
        container.handle_click_icon_eye(&icon);

        let modal = h.document.query_by_test_id("modal-show").unwrap();
        let image = modal.find(&|e: &Element| e.tag == "img").unwrap();
        assert_eq!(image.attr("width"), Some("500"));
    }

    #[test]
    fn test_click_icon_eye_without_url_is_noop() {
        let h = harness(None);
        h.document.render(bills_page(&[Bill::default()]));

        let icon = h.document.query_by_test_id("icon-eye").unwrap();
        h.container.handle_click_icon_eye(&icon);

        let modal = h.document.query_by_test_id("modal-show").unwrap();
        assert!(!modal.has_class("show"));
    }

    #[tokio::test]
    async fn test_click_new_bill_navigates_to_form() {
        let h = harness(None);
        h.container.handle_click_new_bill().await;

        assert_eq!(h.navigator.history(), vec![RoutePath::NewBill]);
        assert!(h.document.query_by_test_id("form-new-bill").is_some());
    }

    #[test]
    fn test_sort_puts_undated_last_and_falls_back_to_text() {
        let mut bills: Vec<Bill> = [None, Some("zzz"), Some("2020-01-01"), Some("2021-06-30")]
            .into_iter()
            .map(|date| Bill {
                date: date.map(str::to_string),
                ..Bill::default()
            })
            .collect();
        sort_by_date_desc(&mut bills);

        let dates: Vec<_> = bills.iter().map(|b| b.date.as_deref()).collect();
        assert_eq!(
            dates,
            vec![Some("2021-06-30"), Some("2020-01-01"), Some("zzz"), None]
        );
    }

    #[quickcheck]
    fn prop_sorted_dates_are_descending(days: Vec<u16>) -> bool {
        let base = chrono::NaiveDate::from_ymd_opt(1990, 1, 1).unwrap();
        let mut bills: Vec<Bill> = days
            .iter()
            .map(|offset| Bill {
                date: Some(
                    (base + chrono::Duration::days(i64::from(*offset)))
                        .format("%Y-%m-%d")
                        .to_string(),
                ),
                ..Bill::default()
            })
            .collect();
        sort_by_date_desc(&mut bills);

        bills.windows(2).all(|pair| {
            let a = parse_date(pair[0].date.as_deref().unwrap_or_default());
            let b = parse_date(pair[1].date.as_deref().unwrap_or_default());
            a >= b
        })
    }
}
