pub mod pdf;

use crate::error::Result;
use flarenet_common::export::pdf_core::export_file_name;
use flarenet_common::RecordView;
use std::path::{Path, PathBuf};

/// 出力先がディレクトリ（または拡張子なし）なら `record_<点検番号>.pdf` を付ける
pub fn output_path_for(output: &Path, view: &RecordView) -> PathBuf {
    if output.is_dir() || output.extension().is_none() {
        let number = view.inspection.as_ref().and_then(|i| i.inspection_number.as_deref());
        output.join(export_file_name(number, view.identity.inspection_id.as_deref()))
    } else {
        output.to_path_buf()
    }
}

pub fn export_record_pdf(view: &RecordView, output: &Path) -> Result<PathBuf> {
    let output_path = output_path_for(output, view);
    // `--pdf ./report` のようにまだ無いディレクトリを指定された場合
    if let Some(dir) = output_path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    println!("- PDFを生成中...");
    pdf::generate_pdf(view, &output_path)?;
    println!("✔ PDF出力: {}", output_path.display());
    Ok(output_path)
}
