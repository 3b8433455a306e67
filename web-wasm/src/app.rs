//! メインアプリケーションコンポーネント

use flarenet_common::RecordIdentity;
use leptos::prelude::*;

use crate::api::WebClient;
use crate::auth::{api_base_url, Session};
use crate::components::{header::Header, record_view::RecordViewScreen};

/// `?transformer=..&inspection=..` を読む
fn query_param(name: &str) -> Option<String> {
    let search = web_sys::window()?.location().search().ok()?;
    web_sys::UrlSearchParams::new_with_str(&search).ok()?.get(name)
}

/// メインアプリケーションコンポーネント
#[component]
pub fn App() -> impl IntoView {
    let session = RwSignal::new(Session::load());

    let (transformer_input, set_transformer_input) = signal(query_param("transformer").unwrap_or_default());
    let (inspection_input, set_inspection_input) = signal(query_param("inspection").unwrap_or_default());
    let identity = RwSignal::new(RecordIdentity::new(
        Some(&transformer_input.get_untracked()),
        Some(&inspection_input.get_untracked()),
    ));

    let client = Signal::derive(move || WebClient::new(&api_base_url(), session.with(|s| s.token.clone())));

    let on_open = move |_| {
        identity.set(RecordIdentity::new(
            Some(&transformer_input.get_untracked()),
            Some(&inspection_input.get_untracked()),
        ));
    };

    view! {
        <div class="container">
            <Header session=session />

            <div class="card no-pdf">
                <input
                    placeholder="Transformer ID"
                    prop:value=move || transformer_input.get()
                    on:input=move |ev| set_transformer_input.set(event_target_value(&ev))
                />
                <input
                    placeholder="Inspection ID"
                    prop:value=move || inspection_input.get()
                    on:input=move |ev| set_inspection_input.set(event_target_value(&ev))
                />
                <button class="btn btn-primary" on:click=on_open>"Open"</button>
            </div>

            <RecordViewScreen identity=identity.into() client=client />
        </div>
    }
}
