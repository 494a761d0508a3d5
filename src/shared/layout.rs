/// 全ページ共通のレイアウト（縦ナビゲーション、エラーページ、読み込み中ページ）
use crate::shared::dom::Element;

/// 縦ナビゲーションで強調表示するアイコン
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveIcon {
    /// 請求書一覧
    Window,
    /// 新規請求書
    Mail,
}

/// 縦ナビゲーションを描画する
pub fn vertical_layout(active: Option<ActiveIcon>) -> Element {
    let mut window_icon = Element::new("div")
        .with_id("layout-icon1")
        .with_test_id("icon-window")
        .with_attr("title", "Mes notes de frais");
    let mut mail_icon = Element::new("div")
        .with_id("layout-icon2")
        .with_test_id("icon-mail")
        .with_attr("title", "Nouvelle note de frais");

    match active {
        Some(ActiveIcon::Window) => window_icon.add_class("active-icon"),
        Some(ActiveIcon::Mail) => mail_icon.add_class("active-icon"),
        None => {}
    }

    Element::new("div")
        .with_class("vertical-navbar")
        .with_child(Element::new("div").with_class("layout-title").with_text("Billed"))
        .with_child(window_icon)
        .with_child(mail_icon)
        .with_child(
            Element::new("div")
                .with_class("layout-disconnect")
                .with_test_id("layout-disconnect"),
        )
}

/// レイアウトで包んだページを組み立てる
pub fn page_with_layout(active: Option<ActiveIcon>, content: Element) -> Element {
    Element::new("div")
        .with_class("layout")
        .with_child(vertical_layout(active))
        .with_child(content)
}

/// エラーページ（ストアのエラーメッセージをそのまま埋め込む）
pub fn error_page(active: Option<ActiveIcon>, message: &str) -> Element {
    page_with_layout(
        active,
        Element::new("div")
            .with_class("content")
            .with_child(
                Element::new("div")
                    .with_class("content-header")
                    .with_child(
                        Element::new("div")
                            .with_class("content-title")
                            .with_text("Erreur"),
                    ),
            )
            .with_child(
                Element::new("div")
                    .with_test_id("error-message")
                    .with_text(message),
            ),
    )
}

/// 読み込み中ページ
pub fn loading_page(active: Option<ActiveIcon>) -> Element {
    page_with_layout(
        active,
        Element::new("div")
            .with_class("content")
            .with_test_id("loading")
            .with_child(Element::new("div").with_id("loading").with_text("Loading...")),
    )
}
