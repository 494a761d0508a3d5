/// 画面ドキュメントモデル
///
/// 各ページはテストIDで参照可能な要素ツリーとして描画されます。
/// テストIDはテストおよびルーターとの結合契約であり、変更してはいけません。
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

/// 要素ツリーのノード
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    pub tag: String,
    pub id: Option<String>,
    pub test_id: Option<String>,
    pub classes: Vec<String>,
    pub attributes: BTreeMap<String, String>,
    pub text: String,
    /// フォーム入力値（input / select / textarea）
    pub value: String,
    /// ファイル入力で選択されているファイル名
    pub files: Vec<String>,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn with_test_id(mut self, test_id: &str) -> Self {
        self.test_id = Some(test_id.to_string());
        self
    }

    pub fn with_class(mut self, classes: &str) -> Self {
        for class in classes.split_whitespace() {
            self.add_class(class);
        }
        self
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn with_value(mut self, value: &str) -> Self {
        self.value = value.to_string();
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children<I>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = Element>,
    {
        self.children.extend(children);
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn set_attr(&mut self, name: &str, value: &str) {
        self.attributes.insert(name.to_string(), value.to_string());
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn add_class(&mut self, class: &str) {
        if !self.has_class(class) {
            self.classes.push(class.to_string());
        }
    }

    pub fn remove_class(&mut self, class: &str) {
        self.classes.retain(|c| c != class);
    }

    /// 深さ優先で条件に一致する最初の要素を探す
    pub fn find<P>(&self, predicate: &P) -> Option<&Element>
    where
        P: Fn(&Element) -> bool,
    {
        if predicate(self) {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(predicate))
    }

    pub fn find_mut<P>(&mut self, predicate: &P) -> Option<&mut Element>
    where
        P: Fn(&Element) -> bool,
    {
        if predicate(self) {
            return Some(self);
        }
        self.children
            .iter_mut()
            .find_map(|child| child.find_mut(predicate))
    }

    /// 条件に一致するすべての要素を文書順で集める
    pub fn find_all<'a, P>(&'a self, predicate: &P, found: &mut Vec<&'a Element>)
    where
        P: Fn(&Element) -> bool,
    {
        if predicate(self) {
            found.push(self);
        }
        for child in &self.children {
            child.find_all(predicate, found);
        }
    }

    pub fn find_by_test_id(&self, test_id: &str) -> Option<&Element> {
        self.find(&|e: &Element| e.test_id.as_deref() == Some(test_id))
    }

    pub fn find_all_by_test_id(&self, test_id: &str) -> Vec<&Element> {
        let mut found = Vec::new();
        self.find_all(&|e: &Element| e.test_id.as_deref() == Some(test_id), &mut found);
        found
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Element> {
        self.find(&|e: &Element| e.id.as_deref() == Some(id))
    }

    /// 自身と子孫のテキストを空白区切りで連結する
    pub fn text_content(&self) -> String {
        let mut parts = Vec::new();
        self.collect_text(&mut parts);
        parts.join(" ")
    }

    fn collect_text<'a>(&'a self, parts: &mut Vec<&'a str>) {
        let text = self.text.trim();
        if !text.is_empty() {
            parts.push(text);
        }
        for child in &self.children {
            child.collect_text(parts);
        }
    }

    /// HTML文字列に変換する
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.tag);
        if let Some(id) = &self.id {
            push_attr(out, "id", id);
        }
        if let Some(test_id) = &self.test_id {
            push_attr(out, "data-testid", test_id);
        }
        if !self.classes.is_empty() {
            push_attr(out, "class", &self.classes.join(" "));
        }
        for (name, value) in &self.attributes {
            push_attr(out, name, value);
        }
        if !self.value.is_empty() {
            push_attr(out, "value", &self.value);
        }
        out.push('>');

        if is_void_tag(&self.tag) {
            return;
        }

        out.push_str(&escape_html(&self.text));
        for child in &self.children {
            child.write_html(out);
        }
        out.push_str("</");
        out.push_str(&self.tag);
        out.push('>');
    }
}

fn push_attr(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(&escape_html(value));
    out.push('"');
}

fn is_void_tag(tag: &str) -> bool {
    matches!(tag, "img" | "input" | "br" | "hr")
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// 表示中のページとアラート履歴を保持するドキュメント
///
/// コンテナとルーターで共有されるため内部可変性を持つ
#[derive(Debug)]
pub struct Document {
    body: Mutex<Element>,
    alerts: Mutex<Vec<String>>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            body: Mutex::new(Element::new("body")),
            alerts: Mutex::new(Vec::new()),
        }
    }

    fn body_guard(&self) -> MutexGuard<'_, Element> {
        // 描画途中のパニックでロックが汚染されても、最後に描画されたツリーを使い続ける
        self.body.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// ページ内容を置き換える
    pub fn render(&self, page: Element) {
        let mut body = self.body_guard();
        body.children = vec![page];
    }

    /// 現在のページ内容のスナップショット
    pub fn snapshot(&self) -> Element {
        self.body_guard().clone()
    }

    pub fn query_by_test_id(&self, test_id: &str) -> Option<Element> {
        self.body_guard().find_by_test_id(test_id).cloned()
    }

    pub fn query_all_by_test_id(&self, test_id: &str) -> Vec<Element> {
        self.body_guard()
            .find_all_by_test_id(test_id)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn query_by_id(&self, id: &str) -> Option<Element> {
        self.body_guard().find_by_id(id).cloned()
    }

    /// テストIDで要素を更新する
    ///
    /// # 戻り値
    /// 要素が見つかった場合はtrue
    pub fn update_by_test_id<F>(&self, test_id: &str, update: F) -> bool
    where
        F: FnOnce(&mut Element),
    {
        let mut body = self.body_guard();
        match body.find_mut(&|e: &Element| e.test_id.as_deref() == Some(test_id)) {
            Some(element) => {
                update(element);
                true
            }
            None => false,
        }
    }

    pub fn update_by_id<F>(&self, id: &str, update: F) -> bool
    where
        F: FnOnce(&mut Element),
    {
        let mut body = self.body_guard();
        match body.find_mut(&|e: &Element| e.id.as_deref() == Some(id)) {
            Some(element) => {
                update(element);
                true
            }
            None => false,
        }
    }

    /// フォーム要素の値を取得する
    pub fn value_of(&self, test_id: &str) -> Option<String> {
        self.body_guard()
            .find_by_test_id(test_id)
            .map(|e| e.value.clone())
    }

    /// フォーム要素の値を変更する（changeイベント相当）
    pub fn set_value(&self, test_id: &str, value: &str) -> bool {
        self.update_by_test_id(test_id, |e| e.value = value.to_string())
    }

    pub fn contains_text(&self, needle: &str) -> bool {
        self.body_guard().text_content().contains(needle)
    }

    /// ユーザーへのブロッキング通知（`window.alert`相当）
    pub fn alert(&self, message: &str) {
        log::warn!("アラート表示: {message}");
        self.alerts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(message.to_string());
    }

    /// これまでに表示されたアラート
    pub fn alerts(&self) -> Vec<String> {
        self.alerts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn to_html(&self) -> String {
        self.body_guard().to_html()
    }
}
