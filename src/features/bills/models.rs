use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// 請求書（経費申請）データモデル
///
/// ストアから受け取るレコードは欠損や型揺れがあり得るため、
/// すべてのフィールドを任意項目として受け入れる
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    /// ストアが採番するID（作成後は不変）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// 経費種別（例: "Transports"）
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub expense_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// 保存形式は`YYYY-MM-DD`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub amount: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub vat: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commentary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment_admin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    /// ストアが管理する審査状態（クライアントは更新APIでのみ変更する）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// 数値または数値文字列を受け入れる（空文字列や解析不能な値はNone）
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrText {
        Number(f64),
        Text(String),
        Other(serde_json::Value),
    }

    Ok(match Option::<NumberOrText>::deserialize(deserializer)? {
        Some(NumberOrText::Number(n)) => Some(n),
        Some(NumberOrText::Text(s)) => s.trim().parse().ok(),
        Some(NumberOrText::Other(_)) | None => None,
    })
}

/// 審査状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillStatus {
    Pending,
    Accepted,
    Refused,
}

impl BillStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillStatus::Pending => "pending",
            BillStatus::Accepted => "accepted",
            BillStatus::Refused => "refused",
        }
    }

    /// 画面表示用ラベル
    pub fn label(&self) -> &'static str {
        match self {
            BillStatus::Pending => "En attente",
            BillStatus::Accepted => "Accepté",
            BillStatus::Refused => "Refused",
        }
    }
}

impl fmt::Display for BillStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BillStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BillStatus::Pending),
            "accepted" => Ok(BillStatus::Accepted),
            "refused" => Ok(BillStatus::Refused),
            other => Err(format!("未知の審査状態です: {other}")),
        }
    }
}

/// ファイルアップロード（請求書の仮作成）の結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedBill {
    pub file_url: String,
    /// 仮作成された請求書のID。以降の更新で使用する
    pub key: String,
}

/// 請求書更新リクエスト（`{id, data}`）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillUpdate {
    pub id: Option<String>,
    /// シリアライズ済みの請求書
    pub data: String,
}

impl BillUpdate {
    pub fn new(id: Option<String>, bill: &Bill) -> serde_json::Result<Self> {
        Ok(Self {
            id,
            data: serde_json::to_string(bill)?,
        })
    }

    /// `data`を請求書として復元する
    pub fn bill(&self) -> serde_json::Result<Bill> {
        serde_json::from_str(&self.data)
    }
}

/// アップロードする領収書ファイル
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptFile {
    pub file_name: String,
    pub content: Vec<u8>,
}

impl ReceiptFile {
    pub fn new(file_name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            content: content.into(),
        }
    }

    /// 拡張子（小文字）。拡張子がなければNone
    pub fn extension(&self) -> Option<String> {
        std::path::Path::new(&self.file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
    }

    /// Content-Typeを推定
    pub fn content_type(&self) -> &'static str {
        match self.extension().as_deref() {
            Some("jpg") | Some("jpeg") => "image/jpeg",
            Some("png") => "image/png",
            _ => "application/octet-stream",
        }
    }
}

/// 領収書アップロード用フォーム（ファイルと申請者メール）
#[derive(Debug, Clone, PartialEq)]
pub struct BillUploadForm {
    pub file: ReceiptFile,
    pub email: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bill_deserialization_accepts_string_numbers() {
        let json = r#"{
            "id": "47qAXb6fIm2zOKkLzMro",
            "vat": "80",
            "amount": 400,
            "pct": 20,
            "type": "Hôtel et logement",
            "fileName": "facture.jpg",
            "commentAdmin": "ok",
            "status": "pending",
            "date": "2004-04-04"
        }"#;

        let bill: Bill = serde_json::from_str(json).unwrap();
        assert_eq!(bill.id.as_deref(), Some("47qAXb6fIm2zOKkLzMro"));
        assert_eq!(bill.vat, Some(80.0));
        assert_eq!(bill.amount, Some(400.0));
        assert_eq!(bill.expense_type.as_deref(), Some("Hôtel et logement"));
        assert_eq!(bill.file_name.as_deref(), Some("facture.jpg"));
        assert_eq!(bill.comment_admin.as_deref(), Some("ok"));
    }

    #[test]
    fn test_empty_or_garbage_numbers_are_absent() {
        let bill: Bill =
            serde_json::from_str(r#"{"vat": "", "amount": "abc", "pct": null}"#).unwrap();
        assert_eq!(bill.vat, None);
        assert_eq!(bill.amount, None);
        assert_eq!(bill.pct, None);

        let bill: Bill = serde_json::from_str(r#"{"vat": true}"#).unwrap();
        assert_eq!(bill.vat, None);
    }

    #[test]
    fn test_corrupted_record_still_deserializes() {
        let bill: Bill = serde_json::from_str(
            r#"{"corruptedDate": "corrupted", "corruptedStatus": "corrupted"}"#,
        )
        .unwrap();
        assert_eq!(bill, Bill::default());
    }

    #[test]
    fn test_serialization_uses_wire_names() {
        let bill = Bill {
            expense_type: Some("Transports".to_string()),
            file_url: Some("https://example.com/bill.jpg".to_string()),
            status: Some(BillStatus::Pending.to_string()),
            ..Bill::default()
        };
        let json = serde_json::to_string(&bill).unwrap();
        assert!(json.contains("\"type\":\"Transports\""));
        assert!(json.contains("\"fileUrl\":\"https://example.com/bill.jpg\""));
        assert!(json.contains("\"status\":\"pending\""));
        assert!(!json.contains("\"id\""));
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("refused".parse::<BillStatus>(), Ok(BillStatus::Refused));
        assert!("corrupted".parse::<BillStatus>().is_err());
        assert_eq!(BillStatus::Accepted.label(), "Accepté");
    }

    #[test]
    fn test_bill_update_roundtrips_draft() {
        let bill = Bill {
            name: Some("Vol Paris Londres".to_string()),
            amount: Some(348.0),
            ..Bill::default()
        };
        let update = BillUpdate::new(Some("key-1".to_string()), &bill).unwrap();
        assert_eq!(update.bill().unwrap(), bill);
    }

    #[test]
    fn test_receipt_file_extension_is_case_insensitive() {
        let file = ReceiptFile::new("Facture.JPEG", b"img".to_vec());
        assert_eq!(file.extension().as_deref(), Some("jpeg"));
        assert_eq!(file.content_type(), "image/jpeg");
        assert_eq!(ReceiptFile::new("archive", Vec::new()).extension(), None);
    }
}
