//! PDF生成（WASM版）
//!
//! 画面をラスタ化し、A4幅に合わせてページ単位にずらして貼る。

use crate::export::js_bindings::{
    from_js, pdf_page_size_js, rasterize_element_js, save_pdf_pages_js, JsPageSize, JsRaster,
};
use flarenet_common::export::pdf_core::{page_offsets, scaled_height};

/// 要素をPDFにしてダウンロードさせる
///
/// 失敗は1つのエラーメッセージにまとめて返す。保存は最後の1回だけ。
pub async fn export_element_pdf(element_id: &str, file_name: &str) -> Result<usize, String> {
    let raster = rasterize_element_js(element_id)
        .await
        .map_err(|e| format!("rasterization failed: {:?}", e))?;
    let raster: JsRaster = from_js(&raster)?;

    let page = pdf_page_size_js().map_err(|e| format!("PDF library unavailable: {:?}", e))?;
    let page: JsPageSize = from_js(&page)?;

    let image_height = scaled_height(raster.width, raster.height, page.width);
    let offsets = page_offsets(image_height, page.height);
    let pages = offsets.len();

    save_pdf_pages_js(&raster.data_url, image_height, offsets, file_name)
        .map_err(|e| format!("PDF save failed: {:?}", e))?;
    Ok(pages)
}
