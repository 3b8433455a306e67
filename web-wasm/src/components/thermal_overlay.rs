//! 熱画像 + 異常オーバーレイ
//!
//! 画像のロード時とリサイズ時に寸法を測り直し、ボックス位置を再計算する。
//! 計算自体は純関数なので、両方のイベントが重なっても結果は同じ。

use flarenet_common::overlay::{map_overlays, OverlayBox, OverlayOffset};
use flarenet_common::{Anomaly, ImageDimensions};
use leptos::html::Img;
use leptos::prelude::*;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::ResizeObserver;

fn measure(img: &web_sys::HtmlImageElement) -> ImageDimensions {
    ImageDimensions::new(
        img.natural_width() as f64,
        img.natural_height() as f64,
        img.client_width() as f64,
        img.client_height() as f64,
    )
}

#[component]
pub fn ThermalOverlay(
    src: String,
    anomalies: Signal<Vec<Anomaly>>,
    #[prop(default = OverlayOffset::DEFAULT)] offset: OverlayOffset,
) -> impl IntoView {
    let img_ref = NodeRef::<Img>::new();
    let dims = RwSignal::new(ImageDimensions::default());

    let recompute = move || {
        if let Some(img) = img_ref.get_untracked() {
            dims.set(measure(&img));
        }
    };

    // ResizeObserver とそのコールバックは要素が消えるまで保持する
    let observer = StoredValue::new_local(None::<(ResizeObserver, Closure<dyn FnMut(js_sys::Array)>)>);
    Effect::new(move |_| {
        let Some(img) = img_ref.get() else { return };
        let callback = Closure::<dyn FnMut(js_sys::Array)>::new(move |_entries: js_sys::Array| recompute());
        match ResizeObserver::new(callback.as_ref().unchecked_ref()) {
            Ok(obs) => {
                obs.observe(&img);
                observer.set_value(Some((obs, callback)));
            }
            Err(e) => gloo::console::warn!(format!("ResizeObserver unavailable: {:?}", e)),
        }
    });
    on_cleanup(move || {
        observer.try_update_value(|slot| {
            if let Some((obs, _callback)) = slot.take() {
                obs.disconnect();
            }
        });
    });

    let boxes = move || -> Vec<OverlayBox> { anomalies.with(|list| map_overlays(list, &dims.get(), offset)) };

    view! {
        <div class="image-frame">
            <img node_ref=img_ref src=src alt="Thermal image" crossorigin="anonymous" on:load=move |_| recompute() />
            <For
                each=boxes
                key=|b| (b.index, b.rect.left.to_bits(), b.rect.top.to_bits(), b.rect.width.to_bits(), b.rect.height.to_bits())
                children=move |b: OverlayBox| {
                    let box_style = format!(
                        "left:{}px;top:{}px;width:{}px;height:{}px;border-color:{};",
                        b.rect.left, b.rect.top, b.rect.width, b.rect.height, b.tone.border_color()
                    );
                    let label_style = format!(
                        "left:{}px;top:{}px;background:{};color:{};",
                        b.rect.left, b.label_top(), b.tone.border_color(), b.tone.text_color()
                    );
                    view! {
                        <div class="overlay-box" style=box_style></div>
                        <div class="overlay-label" style=label_style>{b.label.clone()}</div>
                    }
                }
            />
        </div>
    }
}
