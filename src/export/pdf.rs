use crate::error::{ConsoleError, Result};
use flarenet_common::export::pdf_core::{build_report_lines, paginate, ReportLayout, ReportLine};
use flarenet_common::RecordView;
use printpdf::*;
use std::path::Path;

/// 組み込みフォントで描けない文字を置き換える
fn pdf_safe(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_ascii() && !c.is_ascii_control() { c } else { '?' })
        .collect()
}

/// 表示データをPDFにする
///
/// 文書全体のシリアライズに成功してからファイルを書く（途中まで書かれたPDFは残さない）。
pub fn generate_pdf(view: &RecordView, output_path: &Path) -> Result<()> {
    let bytes = render_pdf(view)?;
    std::fs::write(output_path, bytes)?;
    Ok(())
}

pub fn render_pdf(view: &RecordView) -> Result<Vec<u8>> {
    let layout = ReportLayout::default();
    let lines = build_report_lines(view);
    let pages = paginate(&lines, layout.lines_per_page());
    let title = match lines.first() {
        Some(ReportLine::Title(t)) => pdf_safe(t),
        _ => "Maintenance Record".to_string(),
    };

    let (doc, page1, layer1) = PdfDocument::new(
        &title,
        Mm(layout.page_width_mm),
        Mm(layout.page_height_mm),
        "Layer 1",
    );

    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ConsoleError::PdfGeneration(format!("フォント追加エラー: {:?}", e)))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| ConsoleError::PdfGeneration(format!("フォント追加エラー: {:?}", e)))?;

    for (page_no, page_lines) in pages.iter().enumerate() {
        let layer = if page_no == 0 {
            doc.get_page(page1).get_layer(layer1)
        } else {
            let (page, layer) = doc.add_page(
                Mm(layout.page_width_mm),
                Mm(layout.page_height_mm),
                format!("Layer {}", page_no + 1),
            );
            doc.get_page(page).get_layer(layer)
        };

        for (row, line) in page_lines.iter().enumerate() {
            if matches!(line, ReportLine::Blank) {
                continue;
            }
            let face = match line {
                ReportLine::Title(_) | ReportLine::Heading(_) => &bold,
                _ => &font,
            };
            layer.use_text(
                pdf_safe(&line.text()),
                line.font_size(),
                Mm(layout.margin_mm),
                Mm(layout.line_y_mm(row)),
                face,
            );
        }
    }

    doc.save_to_bytes()
        .map_err(|e| ConsoleError::PdfGeneration(format!("PDF保存エラー: {:?}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_safe_replaces_non_ascii() {
        assert_eq!(pdf_safe("OK 点検\n"), "OK ???");
    }
}
