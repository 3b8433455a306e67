//! PDF export core utilities shared by CLI/WASM.
//!
//! CLIはテキスト行をページに流し込み、Webは画面のラスタ画像をページ単位にずらして貼る。
//! どちらも用紙はA4縦。

use crate::record::{Field, Section};
use crate::types::Transformer;
use crate::view::RecordView;

pub const A4_WIDTH_MM: f32 = 210.0;
pub const A4_HEIGHT_MM: f32 = 297.0;
pub const MARGIN_MM: f32 = 12.0;

pub fn mm_to_pt(mm: f32) -> f32 {
    mm * 72.0 / 25.4
}

/// ラスタ画像を用紙幅に合わせたときの高さ
pub fn scaled_height(image_width: f64, image_height: f64, page_width: f64) -> f64 {
    if image_width <= 0.0 || !image_width.is_finite() || !image_height.is_finite() {
        return 0.0;
    }
    image_height * page_width / image_width
}

/// 各ページで画像を置くY位置
///
/// k枚目は `-k * page_height`。内容が空でも1ページは出す。
pub fn page_offsets(content_height: f64, page_height: f64) -> Vec<f64> {
    if page_height <= 0.0 || !page_height.is_finite() || !content_height.is_finite() {
        return vec![0.0];
    }
    let pages = (content_height / page_height).ceil().max(1.0) as usize;
    (0..pages).map(|k| -(k as f64) * page_height).collect()
}

/// 出力ファイル名: 点検番号 → 点検ID → `view`
pub fn export_file_name(inspection_number: Option<&str>, inspection_id: Option<&str>) -> String {
    let stem = inspection_number
        .or(inspection_id)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("view");
    let safe: String = stem
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    format!("record_{}.pdf", safe)
}

/// テキストレポートのページ寸法（mm）
#[derive(Debug, Clone, Copy)]
pub struct ReportLayout {
    pub page_width_mm: f32,
    pub page_height_mm: f32,
    pub margin_mm: f32,
    pub line_height_mm: f32,
}

impl Default for ReportLayout {
    fn default() -> Self {
        Self {
            page_width_mm: A4_WIDTH_MM,
            page_height_mm: A4_HEIGHT_MM,
            margin_mm: MARGIN_MM,
            line_height_mm: 6.0,
        }
    }
}

impl ReportLayout {
    pub fn lines_per_page(&self) -> usize {
        let usable = self.page_height_mm - self.margin_mm * 2.0;
        ((usable / self.line_height_mm).floor() as usize).max(1)
    }

    /// ページ内 `row` 行目のベースライン（下端からのmm）
    pub fn line_y_mm(&self, row: usize) -> f32 {
        self.page_height_mm - self.margin_mm - (row as f32 + 1.0) * self.line_height_mm
    }
}

/// レポート1行
#[derive(Debug, Clone, PartialEq)]
pub enum ReportLine {
    Title(String),
    Heading(String),
    Item { label: String, value: String },
    Blank,
}

impl ReportLine {
    fn item(label: &str, value: impl Into<String>) -> Self {
        let value = value.into();
        ReportLine::Item {
            label: label.to_string(),
            value: if value.trim().is_empty() { "-".to_string() } else { value },
        }
    }

    pub fn font_size(&self) -> f32 {
        match self {
            ReportLine::Title(_) => 16.0,
            ReportLine::Heading(_) => 12.0,
            _ => 10.0,
        }
    }

    pub fn text(&self) -> String {
        match self {
            ReportLine::Title(t) | ReportLine::Heading(t) => t.clone(),
            ReportLine::Item { label, value } => format!("{}: {}", label, value),
            ReportLine::Blank => String::new(),
        }
    }
}

fn transformer_lines(transformer: &Transformer) -> Vec<ReportLine> {
    vec![
        ReportLine::item("Transformer No", transformer.transformer_no.clone().unwrap_or_default()),
        ReportLine::item("Pole No", transformer.pole_no.clone().unwrap_or_default()),
        ReportLine::item("Region", transformer.region.clone().unwrap_or_default()),
        ReportLine::item("Type", transformer.kind.clone().unwrap_or_default()),
        ReportLine::item(
            "Capacity (kVA)",
            transformer.capacity_kva.map(|c| c.to_string()).unwrap_or_default(),
        ),
    ]
}

/// 表示データをレポート行に展開する
pub fn build_report_lines(view: &RecordView) -> Vec<ReportLine> {
    let mut lines = vec![ReportLine::Title(format!(
        "Maintenance Record - Inspection {}",
        view.inspection_label().unwrap_or("-")
    ))];

    if let Some(transformer) = &view.transformer {
        lines.extend(transformer_lines(transformer));
    }
    if let Some(inspection) = &view.inspection {
        lines.push(ReportLine::item("Inspected", inspection.inspected_date.clone().unwrap_or_default()));
        lines.push(ReportLine::item("Branch", inspection.branch.clone().unwrap_or_default()));
    }
    lines.push(ReportLine::Blank);

    lines.push(ReportLine::Heading("Anomalies".to_string()));
    let visible: Vec<_> = view.visible_anomalies().collect();
    if visible.is_empty() {
        lines.push(ReportLine::item("Detected", "none"));
    }
    for (i, anomaly) in visible.iter().enumerate() {
        lines.push(ReportLine::item(
            &format!("#{}", i + 1),
            format!(
                "{} | {} | {} | {}",
                anomaly.display_name(),
                anomaly.severity_summary(),
                anomaly.location_summary(),
                anomaly.source()
            ),
        ));
    }
    lines.push(ReportLine::Blank);

    match &view.record {
        Some(resolved) => {
            lines.push(ReportLine::item("Record source", resolved.provenance.describe()));
            lines.push(ReportLine::item("Saved", resolved.record.timestamp.clone()));
            for section in Section::ALL {
                lines.push(ReportLine::Heading(section.label().to_string()));
                let data = resolved.record.section(section);
                for field in Field::ALL {
                    lines.push(ReportLine::item(field.label(), data.get(field)));
                }
            }
        }
        None => lines.push(ReportLine::item("Maintenance record", "none")),
    }

    lines
}

/// 行をページに分ける
pub fn paginate(lines: &[ReportLine], lines_per_page: usize) -> Vec<&[ReportLine]> {
    if lines.is_empty() {
        return vec![&[]];
    }
    lines.chunks(lines_per_page.max(1)).collect()
}
