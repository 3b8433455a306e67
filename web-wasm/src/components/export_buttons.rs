//! PDF出力ボタン

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::export::pdf_wasm::export_element_pdf;

/// `element_id` の要素をPDFにする。ボタン自身は `no-pdf` で出力から外す
#[component]
pub fn ExportButtons(element_id: &'static str, #[prop(into)] file_name: Signal<String>) -> impl IntoView {
    let (exporting, set_exporting) = signal(false);

    let on_export_pdf = move |_| {
        let name = file_name.get_untracked();
        set_exporting.set(true);
        spawn_local(async move {
            match export_element_pdf(element_id, &name).await {
                Ok(pages) => gloo::console::log!(format!("PDF exported: {} ({} pages)", name, pages)),
                Err(e) => {
                    gloo::console::warn!(format!("PDF export failed: {}", e));
                    gloo::dialogs::alert("PDF export failed. Make sure html2canvas and jsPDF are loaded.");
                }
            }
            set_exporting.set(false);
        });
    };

    view! {
        <div class="export-buttons no-pdf">
            <button
                class="btn btn-secondary"
                disabled=move || exporting.get()
                on:click=on_export_pdf
            >
                {move || if exporting.get() { "Exporting..." } else { "Export PDF" }}
            </button>
        </div>
    }
}
