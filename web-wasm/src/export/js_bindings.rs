//! JavaScript Bridge バインディング
//!
//! 画面のラスタ化とPDF書き出しは html2canvas / jsPDF に任せる。

use serde::Deserialize;
use wasm_bindgen::prelude::*;

/// `rasterizeElement` の戻り値
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsRaster {
    pub data_url: String,
    pub width: f64,
    pub height: f64,
}

/// `pdfPageSize` の戻り値（pt）
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct JsPageSize {
    pub width: f64,
    pub height: f64,
}

#[wasm_bindgen(module = "/js/pdf-export.js")]
extern "C" {
    /// 要素をPNGにラスタ化（`no-pdf` クラスの要素は除外）
    #[wasm_bindgen(js_name = "rasterizeElement", catch)]
    pub async fn rasterize_element_js(element_id: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(js_name = "pdfPageSize", catch)]
    pub fn pdf_page_size_js() -> Result<JsValue, JsValue>;

    /// ページごとのY位置で画像を貼ってPDFを保存
    #[wasm_bindgen(js_name = "savePdfPages", catch)]
    pub fn save_pdf_pages_js(
        data_url: &str,
        image_height: f64,
        offsets: Vec<f64>,
        file_name: &str,
    ) -> Result<(), JsValue>;
}

/// JS側のプレーンオブジェクトを読む
pub fn from_js<T: for<'de> Deserialize<'de>>(value: &JsValue) -> Result<T, String> {
    let json = js_sys::JSON::stringify(value)
        .map_err(|e| format!("{:?}", e))?
        .as_string()
        .ok_or_else(|| "unexpected value from JavaScript".to_string())?;
    serde_json::from_str(&json).map_err(|e| e.to_string())
}

#[cfg(all(target_arch = "wasm32", test))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn js_object(json: &str) -> JsValue {
        js_sys::JSON::parse(json).expect("JSONとして読めるはず")
    }

    #[wasm_bindgen_test]
    fn wasm_from_js_reads_raster() {
        let value = js_object(r#"{"dataUrl":"data:image/png;base64,AAAA","width":794,"height":2400}"#);
        let raster: JsRaster = from_js(&value).expect("ラスタ結果を読めない");
        assert_eq!(raster.data_url, "data:image/png;base64,AAAA");
        assert_eq!(raster.height, 2400.0);
    }

    #[wasm_bindgen_test]
    fn wasm_from_js_reads_page_size() {
        let size: JsPageSize = from_js(&js_object(r#"{"width":595.28,"height":841.89}"#)).expect("ページサイズを読めない");
        assert!(size.height > size.width);
    }

    #[wasm_bindgen_test]
    fn wasm_from_js_rejects_wrong_shape() {
        assert!(from_js::<JsRaster>(&js_object(r#"{"width":1}"#)).is_err());
        assert!(from_js::<JsPageSize>(&JsValue::UNDEFINED).is_err());
    }
}
