/// セッションストレージモジュール
///
/// ブラウザの`localStorage`に相当するキー/値ストアへのアクセスを
/// `SessionStorage`トレイトの背後に隔離します。
/// メモリ版（テスト・一時利用）とJSONファイル版（永続化）を提供します。
use crate::shared::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// セッションストレージのキー定義
pub struct SessionKeys;

impl SessionKeys {
    /// ログインユーザー情報のキー（`{type, email}`のJSON）
    pub const USER: &'static str = "user";
    /// APIトークンのキー
    pub const JWT: &'static str = "jwt";
}

/// キー/値ストアへのアクセスインターフェース
pub trait SessionStorage: Send + Sync {
    /// 値を取得する（存在しない場合はNone）
    fn get_item(&self, key: &str) -> Option<String>;

    /// 値を保存する
    fn set_item(&self, key: &str, value: &str) -> AppResult<()>;

    /// 値を削除する
    fn remove_item(&self, key: &str) -> AppResult<()>;

    /// すべての値を削除する
    fn clear(&self) -> AppResult<()>;
}

/// ユーザー種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserType {
    Employee,
    Admin,
}

/// セッションに保存されるログインユーザー
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    #[serde(rename = "type")]
    pub user_type: UserType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl SessionUser {
    pub fn employee(email: impl Into<String>) -> Self {
        Self {
            user_type: UserType::Employee,
            email: Some(email.into()),
        }
    }
}

/// セッションからログインユーザーを読み込む
///
/// # 戻り値
/// ユーザー情報（未ログインの場合はNone）。JSONが壊れている場合はエラー
pub fn load_user(storage: &dyn SessionStorage) -> AppResult<Option<SessionUser>> {
    match storage.get_item(SessionKeys::USER) {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// ログインユーザーをセッションに保存する
pub fn save_user(storage: &dyn SessionStorage, user: &SessionUser) -> AppResult<()> {
    let raw = serde_json::to_string(user)?;
    storage.set_item(SessionKeys::USER, &raw)
}

/// メモリ上のセッションストレージ
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> AppResult<std::sync::MutexGuard<'_, BTreeMap<String, String>>> {
        self.items
            .lock()
            .map_err(|e| AppError::storage(format!("ストレージのロック取得に失敗しました: {e}")))
    }
}

impl SessionStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.lock().ok().and_then(|items| items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> AppResult<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> AppResult<()> {
        self.lock()?.remove(key);
        Ok(())
    }

    fn clear(&self) -> AppResult<()> {
        self.lock()?.clear();
        Ok(())
    }
}

/// JSONファイルに永続化するセッションストレージ
///
/// 書き込みのたびにファイル全体を保存する
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    items: Mutex<BTreeMap<String, String>>,
}

impl FileStorage {
    /// ファイルを開く（存在しない場合は空のストレージとして扱う）
    pub fn open(path: impl Into<PathBuf>) -> AppResult<Self> {
        let path = path.into();
        let items = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            if raw.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&raw)?
            }
        } else {
            BTreeMap::new()
        };

        log::debug!(
            "セッションファイルを開きました: path={}, items={}",
            path.display(),
            items.len()
        );

        Ok(Self {
            path,
            items: Mutex::new(items),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, items: &BTreeMap<String, String>) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(items)?;
        fs::write(&self.path, raw)?;
        Ok(())
    }

    fn update<F>(&self, mutate: F) -> AppResult<()>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        let mut items = self
            .items
            .lock()
            .map_err(|e| AppError::storage(format!("ストレージのロック取得に失敗しました: {e}")))?;
        mutate(&mut items);
        self.persist(&items)
    }
}

impl SessionStorage for FileStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items
            .lock()
            .ok()
            .and_then(|items| items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> AppResult<()> {
        self.update(|items| {
            items.insert(key.to_string(), value.to_string());
        })
    }

    fn remove_item(&self, key: &str) -> AppResult<()> {
        self.update(|items| {
            items.remove(key);
        })
    }

    fn clear(&self) -> AppResult<()> {
        log::info!("セッション情報をクリアします: {}", self.path.display());
        self.update(|items| items.clear())
    }
}
