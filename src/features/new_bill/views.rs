// 新規請求書フォームページの描画

use crate::shared::dom::Element;
use crate::shared::layout::{page_with_layout, ActiveIcon};

/// 経費種別の選択肢
pub const EXPENSE_TYPES: [&str; 7] = [
    "Transports",
    "Restaurants et bars",
    "Hôtel et logement",
    "Services en ligne",
    "IT et électronique",
    "Equipement et matériel",
    "Fournitures de bureau",
];

/// TVA率の既定値（%）
pub const DEFAULT_PCT: i64 = 20;

fn labeled(label: &str, control: Element) -> Element {
    Element::new("div")
        .with_class("col-half")
        .with_child(
            Element::new("label")
                .with_class("bold-label")
                .with_text(label),
        )
        .with_child(control)
}

fn input(test_id: &str, input_type: &str) -> Element {
    Element::new("input")
        .with_test_id(test_id)
        .with_class("form-control blue-border")
        .with_attr("type", input_type)
}

/// 新規請求書ページ
pub fn new_bill_page() -> Element {
    let expense_type = Element::new("select")
        .with_test_id("expense-type")
        .with_class("form-control blue-border")
        .with_attr("required", "")
        .with_value(EXPENSE_TYPES[0])
        .with_children(
            EXPENSE_TYPES
                .iter()
                .map(|label| Element::new("option").with_text(label)),
        );

    let form = Element::new("form")
        .with_test_id("form-new-bill")
        .with_child(labeled("Type de dépense", expense_type))
        .with_child(labeled(
            "Nom de la dépense",
            input("expense-name", "text").with_attr("placeholder", "Vol Paris Londres"),
        ))
        .with_child(labeled(
            "Date",
            input("datepicker", "date").with_attr("required", ""),
        ))
        .with_child(labeled(
            "Montant TTC",
            input("amount", "number")
                .with_attr("placeholder", "348")
                .with_attr("required", ""),
        ))
        .with_child(labeled(
            "TVA",
            Element::new("div")
                .with_class("flex-input")
                .with_child(input("vat", "number").with_attr("placeholder", "70"))
                .with_child(
                    input("pct", "number")
                        .with_attr("placeholder", &DEFAULT_PCT.to_string())
                        .with_attr("required", ""),
                ),
        ))
        .with_child(labeled(
            "Commentaire",
            Element::new("textarea")
                .with_test_id("commentary")
                .with_class("form-control blue-border")
                .with_attr("rows", "3"),
        ))
        .with_child(labeled(
            "Justificatif",
            input("file", "file")
                .with_attr("accept", ".jpg,.jpeg,.png")
                .with_attr("required", ""),
        ))
        .with_child(
            Element::new("button")
                .with_id("btn-send-bill")
                .with_test_id("btn-send-bill")
                .with_class("btn btn-primary")
                .with_attr("type", "submit")
                .with_text("Envoyer"),
        );

    let content = Element::new("div")
        .with_class("content")
        .with_child(
            Element::new("div")
                .with_class("content-header")
                .with_child(
                    Element::new("div")
                        .with_class("content-title")
                        .with_text("Envoyer une note de frais"),
                ),
        )
        .with_child(Element::new("div").with_class("form-newbill-container").with_child(form));

    page_with_layout(Some(ActiveIcon::Mail), content)
}
