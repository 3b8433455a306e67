//! メンテナンス記録の型定義と正規化
//!
//! 記録は点検者・是正・再点検の3セクションから成る。
//! 上流の形（ネスト/フラット、別名キー）は `MaintenanceRecord::from_value` で吸収する。

use crate::normalize::{first_id, first_text};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// 設備状態
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaintenanceStatus {
    #[default]
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "Needs Maintenance")]
    NeedsMaintenance,
    #[serde(rename = "Urgent Attention")]
    UrgentAttention,
}

impl MaintenanceStatus {
    pub const ALL: [MaintenanceStatus; 3] = [
        MaintenanceStatus::Ok,
        MaintenanceStatus::NeedsMaintenance,
        MaintenanceStatus::UrgentAttention,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MaintenanceStatus::Ok => "OK",
            MaintenanceStatus::NeedsMaintenance => "Needs Maintenance",
            MaintenanceStatus::UrgentAttention => "Urgent Attention",
        }
    }

    /// 表記ゆれを許容してパース（大文字小文字・前後空白）
    pub fn parse(s: &str) -> Option<Self> {
        let normalized = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().to_lowercase() == normalized)
    }
}

impl std::fmt::Display for MaintenanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 記録のセクション
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Inspector,
    Rectification,
    Reinspection,
}

impl Section {
    pub const ALL: [Section; 3] = [Section::Inspector, Section::Rectification, Section::Reinspection];

    pub fn key(&self) -> &'static str {
        match self {
            Section::Inspector => "inspector",
            Section::Rectification => "rectification",
            Section::Reinspection => "reinspection",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Section::Inspector => "Inspector",
            Section::Rectification => "Rectification",
            Section::Reinspection => "Re-inspection",
        }
    }
}

/// セクション内の項目
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Status,
    Voltage,
    Current,
    RecommendedAction,
    AdditionalRemarks,
    Timestamp,
}

impl Field {
    pub const ALL: [Field; 7] = [
        Field::Name,
        Field::Status,
        Field::Voltage,
        Field::Current,
        Field::RecommendedAction,
        Field::AdditionalRemarks,
        Field::Timestamp,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Status => "status",
            Field::Voltage => "voltage",
            Field::Current => "current",
            Field::RecommendedAction => "recommendedAction",
            Field::AdditionalRemarks => "additionalRemarks",
            Field::Timestamp => "timestamp",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Field::Name => "Name",
            Field::Status => "Status",
            Field::Voltage => "Voltage",
            Field::Current => "Current",
            Field::RecommendedAction => "Recommended Action",
            Field::AdditionalRemarks => "Additional Remarks",
            Field::Timestamp => "Timestamp",
        }
    }
}

/// 1セクション分の記録
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SectionRecord {
    pub name: String,
    pub status: MaintenanceStatus,
    pub voltage: String,
    pub current: String,
    pub recommended_action: String,
    pub additional_remarks: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl SectionRecord {
    pub fn get(&self, field: Field) -> String {
        match field {
            Field::Name => self.name.clone(),
            Field::Status => self.status.as_str().to_string(),
            Field::Voltage => self.voltage.clone(),
            Field::Current => self.current.clone(),
            Field::RecommendedAction => self.recommended_action.clone(),
            Field::AdditionalRemarks => self.additional_remarks.clone(),
            Field::Timestamp => self.timestamp.clone().unwrap_or_default(),
        }
    }

    /// 項目を更新する。未知のステータス文字列は `OK` になる
    pub fn set(&mut self, field: Field, value: &str) {
        match field {
            Field::Name => self.name = value.to_string(),
            Field::Status => self.status = MaintenanceStatus::parse(value).unwrap_or_default(),
            Field::Voltage => self.voltage = value.to_string(),
            Field::Current => self.current = value.to_string(),
            Field::RecommendedAction => self.recommended_action = value.to_string(),
            Field::AdditionalRemarks => self.additional_remarks = value.to_string(),
            Field::Timestamp => {
                self.timestamp = if value.is_empty() { None } else { Some(value.to_string()) }
            }
        }
    }

    /// 何か入力されているか（表示判定用）
    pub fn has_content(&self) -> bool {
        self.status != MaintenanceStatus::Ok
            || [
                &self.name,
                &self.voltage,
                &self.current,
                &self.recommended_action,
                &self.additional_remarks,
            ]
            .iter()
            .any(|s| !s.trim().is_empty())
    }
}

/// 記録の識別子（保存キーと解決に使う）
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordIdentity {
    pub transformer_id: Option<String>,
    pub inspection_id: Option<String>,
}

impl RecordIdentity {
    pub fn new(transformer_id: Option<&str>, inspection_id: Option<&str>) -> Self {
        let clean = |s: Option<&str>| s.map(str::trim).filter(|s| !s.is_empty()).map(String::from);
        Self {
            transformer_id: clean(transformer_id),
            inspection_id: clean(inspection_id),
        }
    }
}

/// 点検1件に紐づくメンテナンス記録
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceRecord {
    #[serde(rename = "inspectionID", skip_serializing_if = "Option::is_none")]
    pub inspection_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transformer_id: Option<String>,
    pub timestamp: String,
    pub inspector: SectionRecord,
    pub rectification: SectionRecord,
    pub reinspection: SectionRecord,
}

struct SectionAliases<'a> {
    name: &'a [&'a str],
    status: &'a [&'a str],
    voltage: &'a [&'a str],
    current: &'a [&'a str],
    recommended_action: &'a [&'a str],
    additional_remarks: &'a [&'a str],
    timestamp: &'a [&'a str],
}

impl SectionAliases<'_> {
    fn read(&self, value: &Value) -> SectionRecord {
        let status = first_text(value, self.status);
        SectionRecord {
            name: first_text(value, self.name).unwrap_or_default(),
            status: match status {
                Some(s) => MaintenanceStatus::parse(&s).unwrap_or_else(|| {
                    tracing::debug!(status = %s, "unknown maintenance status, using OK");
                    MaintenanceStatus::Ok
                }),
                None => MaintenanceStatus::Ok,
            },
            voltage: first_text(value, self.voltage).unwrap_or_default(),
            current: first_text(value, self.current).unwrap_or_default(),
            recommended_action: first_text(value, self.recommended_action).unwrap_or_default(),
            additional_remarks: first_text(value, self.additional_remarks).unwrap_or_default(),
            timestamp: first_text(value, self.timestamp),
        }
    }
}

const INSPECTOR_ALIASES: SectionAliases<'static> = SectionAliases {
    name: &["inspector.name", "inspectorName", "inspectedBy"],
    status: &["inspector.status", "status", "inspectorStatus"],
    voltage: &["inspector.voltage", "voltage", "voltageReading"],
    current: &["inspector.current", "current", "currentReading"],
    recommended_action: &["inspector.recommendedAction", "recommendedAction", "recommendation"],
    additional_remarks: &["inspector.additionalRemarks", "additionalRemarks", "remarks"],
    timestamp: &["inspector.timestamp"],
};

const RECTIFICATION_ALIASES: SectionAliases<'static> = SectionAliases {
    name: &["rectification.name", "rectifierName", "rectification.rectifierName"],
    status: &["rectification.status", "rectifierStatus"],
    voltage: &["rectification.voltage", "rectifierVoltage"],
    current: &["rectification.current", "rectifierCurrent"],
    recommended_action: &["rectification.recommendedAction", "rectifierRecommendedAction"],
    additional_remarks: &["rectification.additionalRemarks", "rectifierAdditionalRemarks"],
    timestamp: &["rectification.timestamp", "rectifierTimestamp"],
};

const REINSPECTION_ALIASES: SectionAliases<'static> = SectionAliases {
    name: &["reinspection.name", "reinspectorName", "reinspection.reinspectorName"],
    status: &["reinspection.status", "reinspectorStatus"],
    voltage: &["reinspection.voltage", "reinspectorVoltage"],
    current: &["reinspection.current", "reinspectorCurrent"],
    recommended_action: &["reinspection.recommendedAction", "reinspectorRecommendedAction"],
    additional_remarks: &["reinspection.additionalRemarks", "reinspectorAdditionalRemarks"],
    timestamp: &["reinspection.timestamp", "reinspectorTimestamp"],
};

impl MaintenanceRecord {
    /// 任意形のJSONから正規形を作る。オブジェクト以外は `None`
    pub fn from_value(value: &Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }

        Some(Self {
            inspection_id: first_id(value, &["inspectionID", "inspectionId", "id"]),
            transformer_id: first_id(value, &["transformerId", "transformerID"]),
            timestamp: first_text(value, &["timestamp", "date", "savedAt"]).unwrap_or_default(),
            inspector: INSPECTOR_ALIASES.read(value),
            rectification: RECTIFICATION_ALIASES.read(value),
            reinspection: REINSPECTION_ALIASES.read(value),
        })
    }

    /// JSON文字列から。パース失敗・非オブジェクトは `None`
    pub fn from_json_str(json: &str) -> Option<Self> {
        serde_json::from_str::<Value>(json)
            .ok()
            .and_then(|v| Self::from_value(&v))
    }

    pub fn identity(&self) -> RecordIdentity {
        RecordIdentity {
            transformer_id: self.transformer_id.clone(),
            inspection_id: self.inspection_id.clone(),
        }
    }

    pub fn section(&self, section: Section) -> &SectionRecord {
        match section {
            Section::Inspector => &self.inspector,
            Section::Rectification => &self.rectification,
            Section::Reinspection => &self.reinspection,
        }
    }

    pub fn section_mut(&mut self, section: Section) -> &mut SectionRecord {
        match section {
            Section::Inspector => &mut self.inspector,
            Section::Rectification => &mut self.rectification,
            Section::Reinspection => &mut self.reinspection,
        }
    }

    pub fn get_field(&self, section: Section, field: Field) -> String {
        self.section(section).get(field)
    }

    pub fn set_field(&mut self, section: Section, field: Field, value: &str) {
        self.section_mut(section).set(field, value);
    }
}

impl<'de> Deserialize<'de> for MaintenanceRecord {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(&value)
            .ok_or_else(|| serde::de::Error::custom("maintenance record must be a JSON object"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_parse() {
        assert_eq!(MaintenanceStatus::parse("ok"), Some(MaintenanceStatus::Ok));
        assert_eq!(
            MaintenanceStatus::parse(" needs maintenance "),
            Some(MaintenanceStatus::NeedsMaintenance)
        );
        assert_eq!(
            MaintenanceStatus::parse("Urgent Attention"),
            Some(MaintenanceStatus::UrgentAttention)
        );
        assert_eq!(MaintenanceStatus::parse("broken"), None);
    }

    #[test]
    fn test_status_serialize() {
        let json = serde_json::to_string(&MaintenanceStatus::NeedsMaintenance).unwrap();
        assert_eq!(json, "\"Needs Maintenance\"");
    }

    #[test]
    fn test_from_value_nested_shape() {
        let v = json!({
            "inspectionID": 12,
            "transformerId": "7",
            "timestamp": "2025-10-01T10:00:00Z",
            "inspector": {"name": "Nimal", "status": "Urgent Attention", "voltage": "230"},
            "rectification": {"name": "Sunil", "status": "OK"},
            "reinspection": {"name": "", "status": "Needs Maintenance"}
        });

        let record = MaintenanceRecord::from_value(&v).expect("オブジェクトのはず");
        assert_eq!(record.inspection_id.as_deref(), Some("12"));
        assert_eq!(record.transformer_id.as_deref(), Some("7"));
        assert_eq!(record.inspector.name, "Nimal");
        assert_eq!(record.inspector.status, MaintenanceStatus::UrgentAttention);
        assert_eq!(record.inspector.voltage, "230");
        assert_eq!(record.rectification.name, "Sunil");
        assert_eq!(record.reinspection.status, MaintenanceStatus::NeedsMaintenance);
    }

    #[test]
    fn test_from_value_flat_aliases() {
        let v = json!({
            "inspectionId": "5",
            "transformerID": 3,
            "savedAt": "yesterday",
            "inspectedBy": "Kamal",
            "inspectorStatus": "needs maintenance",
            "voltageReading": 11000,
            "remarks": "oil leak",
            "rectifierName": "Ruwan",
            "reinspectorCurrent": "40"
        });

        let record = MaintenanceRecord::from_value(&v).unwrap();
        assert_eq!(record.inspection_id.as_deref(), Some("5"));
        assert_eq!(record.transformer_id.as_deref(), Some("3"));
        assert_eq!(record.timestamp, "yesterday");
        assert_eq!(record.inspector.name, "Kamal");
        assert_eq!(record.inspector.status, MaintenanceStatus::NeedsMaintenance);
        assert_eq!(record.inspector.voltage, "11000");
        assert_eq!(record.inspector.additional_remarks, "oil leak");
        assert_eq!(record.rectification.name, "Ruwan");
        assert_eq!(record.reinspection.current, "40");
    }

    #[test]
    fn test_from_value_unknown_status_defaults_ok() {
        let record = MaintenanceRecord::from_value(&json!({"status": "???"})).unwrap();
        assert_eq!(record.inspector.status, MaintenanceStatus::Ok);
    }

    #[test]
    fn test_from_value_rejects_non_object() {
        assert!(MaintenanceRecord::from_value(&json!([1, 2])).is_none());
        assert!(MaintenanceRecord::from_value(&json!("text")).is_none());
        assert!(MaintenanceRecord::from_json_str("{broken").is_none());
    }

    #[test]
    fn test_serialize_canonical_shape() {
        let mut record = MaintenanceRecord {
            inspection_id: Some("12".into()),
            transformer_id: None,
            timestamp: "t".into(),
            ..Default::default()
        };
        record.set_field(Section::Inspector, Field::Voltage, "230");

        let v = serde_json::to_value(&record).unwrap();
        assert_eq!(v["inspectionID"], json!("12"));
        assert!(v.get("transformerId").is_none());
        assert_eq!(v["inspector"]["voltage"], json!("230"));
        assert_eq!(v["inspector"]["status"], json!("OK"));
        assert_eq!(v["rectification"]["recommendedAction"], json!(""));
    }

    #[test]
    fn test_serialize_then_normalize_is_stable() {
        let mut record = MaintenanceRecord::default();
        record.set_field(Section::Reinspection, Field::Status, "Urgent Attention");
        record.set_field(Section::Rectification, Field::Timestamp, "2025-10-02");

        let restored = MaintenanceRecord::from_value(&serde_json::to_value(&record).unwrap()).unwrap();
        assert_eq!(restored, record);
    }

    #[test]
    fn test_section_has_content() {
        let mut section = SectionRecord::default();
        assert!(!section.has_content());
        section.set(Field::Status, "Needs Maintenance");
        assert!(section.has_content());
    }

    #[test]
    fn test_record_identity_trims_blank_ids() {
        let identity = RecordIdentity::new(Some("  "), Some(" 12 "));
        assert_eq!(identity.transformer_id, None);
        assert_eq!(identity.inspection_id.as_deref(), Some("12"));
    }
}
