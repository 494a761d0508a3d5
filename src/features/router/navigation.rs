// ページ遷移のインターフェースと静的な遷移実装

use crate::features::bills::views::bills_page;
use crate::features::new_bill::views::new_bill_page;
use crate::shared::dom::{Document, Element};
use crate::shared::errors::AppError;
use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

/// 論理的なページパス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoutePath {
    Login,
    Bills,
    NewBill,
}

impl RoutePath {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoutePath::Login => "/",
            RoutePath::Bills => "#employee/bills",
            RoutePath::NewBill => "#employee/bill/new",
        }
    }
}

impl fmt::Display for RoutePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoutePath {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "/" | "" => Ok(RoutePath::Login),
            "#employee/bills" => Ok(RoutePath::Bills),
            "#employee/bill/new" => Ok(RoutePath::NewBill),
            other => Err(AppError::not_found(format!("ページ {other}"))),
        }
    }
}

/// ページ遷移
///
/// 表示中のページ内容を指定パスのページに置き換える
#[async_trait]
pub trait Navigator: Send + Sync {
    async fn navigate(&self, path: RoutePath);
}

/// ログインページ（認証フローは対象外のためプレースホルダーのみ）
pub fn login_page() -> Element {
    Element::new("div")
        .with_test_id("login-page")
        .with_child(Element::new("h2").with_text("Billed"))
}

/// データ取得を伴わない静的なページを描画する
pub fn render_static(path: RoutePath) -> Element {
    match path {
        RoutePath::Login => login_page(),
        RoutePath::Bills => bills_page(&[]),
        RoutePath::NewBill => new_bill_page(),
    }
}

/// データ取得を行わずにページを差し替える遷移実装
///
/// 遷移履歴を保持するため、遷移の検証にも使用できる
pub struct StaticNavigator {
    document: Arc<Document>,
    history: Mutex<Vec<RoutePath>>,
}

impl StaticNavigator {
    pub fn new(document: Arc<Document>) -> Self {
        Self {
            document,
            history: Mutex::new(Vec::new()),
        }
    }

    /// これまでに遷移したパス
    pub fn history(&self) -> Vec<RoutePath> {
        self.history
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl Navigator for StaticNavigator {
    async fn navigate(&self, path: RoutePath) {
        log::debug!("静的ページへ遷移します: {path}");
        self.history
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(path);
        self.document.render(render_static(path));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_paths_roundtrip() {
        for path in [RoutePath::Login, RoutePath::Bills, RoutePath::NewBill] {
            assert_eq!(path.as_str().parse::<RoutePath>().unwrap(), path);
        }
        assert!("#admin/dashboard".parse::<RoutePath>().is_err());
    }

    #[tokio::test]
    async fn test_static_navigator_renders_and_records() {
        let document = Arc::new(Document::new());
        let navigator = StaticNavigator::new(document.clone());

        navigator.navigate(RoutePath::NewBill).await;
        assert!(document.query_by_test_id("form-new-bill").is_some());

        navigator.navigate(RoutePath::Bills).await;
        assert!(document.query_by_test_id("note-de-frais-heading").is_some());
        assert_eq!(navigator.history(), vec![RoutePath::NewBill, RoutePath::Bills]);
    }
}
