// 請求書一覧ページの描画

use super::models::Bill;
use crate::shared::dom::Element;
use crate::shared::layout::{page_with_layout, ActiveIcon};

/// 領収書プレビューモーダルのID
pub const RECEIPT_MODAL_ID: &str = "modaleFile";

/// 金額の表示（小数部がなければ整数表示）
fn format_amount(amount: Option<f64>) -> String {
    match amount {
        Some(value) if value.fract() == 0.0 => format!("{value:.0} €"),
        Some(value) => format!("{value:.2} €"),
        None => String::new(),
    }
}

fn cell(text: &str) -> Element {
    Element::new("td").with_text(text)
}

fn row(bill: &Bill) -> Element {
    let mut icon_eye = Element::new("div")
        .with_id("eye")
        .with_test_id("icon-eye")
        .with_class("icon-actions");
    if let Some(url) = &bill.file_url {
        icon_eye.set_attr("data-bill-url", url);
    }

    Element::new("tr")
        .with_child(cell(bill.expense_type.as_deref().unwrap_or_default()))
        .with_child(cell(bill.name.as_deref().unwrap_or_default()))
        .with_child(cell(bill.date.as_deref().unwrap_or_default()))
        .with_child(cell(&format_amount(bill.amount)))
        .with_child(cell(bill.status.as_deref().unwrap_or_default()))
        .with_child(Element::new("td").with_child(icon_eye))
}

/// 領収書プレビュー用のモーダル（初期状態は非表示）
pub fn receipt_modal() -> Element {
    Element::new("div")
        .with_id(RECEIPT_MODAL_ID)
        .with_test_id("modal-show")
        .with_class("modal fade")
        .with_child(
            Element::new("div")
                .with_class("modal-header")
                .with_child(
                    Element::new("h5")
                        .with_class("modal-title")
                        .with_text("Justificatif"),
                ),
        )
        .with_child(Element::new("div").with_class("modal-body"))
}

/// 請求書一覧ページ
///
/// `bills`は表示用に整形・並び替え済みであること
pub fn bills_page(bills: &[Bill]) -> Element {
    let table = Element::new("table")
        .with_id("example")
        .with_class("table table-striped")
        .with_child(
            Element::new("thead").with_child(Element::new("tr").with_children(
                ["Type", "Nom", "Date", "Montant", "Statut", "Actions"]
                    .iter()
                    .map(|title| Element::new("th").with_text(title)),
            )),
        )
        .with_child(
            Element::new("tbody")
                .with_test_id("tbody")
                .with_children(bills.iter().map(row)),
        );

    let content = Element::new("div")
        .with_class("content")
        .with_child(
            Element::new("div")
                .with_class("content-header")
                .with_child(
                    Element::new("div")
                        .with_class("content-title")
                        .with_test_id("note-de-frais-heading")
                        .with_text("Mes notes de frais"),
                )
                .with_child(
                    Element::new("button")
                        .with_test_id("btn-new-bill")
                        .with_class("btn btn-primary")
                        .with_attr("type", "button")
                        .with_text("Nouvelle note de frais"),
                ),
        )
        .with_child(
            Element::new("div")
                .with_id("data-table")
                .with_child(table),
        )
        .with_child(receipt_modal());

    page_with_layout(Some(ActiveIcon::Window), content)
}
