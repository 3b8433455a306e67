//! メンテナンス記録の編集フォーム
//!
//! 入力のたびにデバウンスタイマーを張り直し、満了時に下書きを書く。
//! コンポーネント破棄時は未保存の編集があればタイマーを待たずに書く。

use flarenet_common::record::{Field, MaintenanceStatus, Section};
use flarenet_common::{DraftAutosave, MaintenanceRecord, RecordIdentity};
use gloo::timers::callback::Timeout;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api::WebClient;
use crate::storage::BrowserStore;

fn now_ms() -> u64 {
    js_sys::Date::now() as u64
}

fn now_iso() -> String {
    String::from(js_sys::Date::new_0().to_iso_string())
}

#[component]
pub fn MaintenanceForm(
    identity: RecordIdentity,
    client: WebClient,
    #[prop(default = None)] initial: Option<serde_json::Value>,
    #[prop(into)] on_saved: Callback<MaintenanceRecord>,
) -> impl IntoView {
    let form = StoredValue::new_local(DraftAutosave::open(BrowserStore, &identity, initial.as_ref()));
    let timer = StoredValue::new_local(None::<Timeout>);
    let snapshot = RwSignal::new(form.with_value(|f| f.form().clone()));
    let restored = form.with_value(|f| f.restored_from().as_str());
    let client = StoredValue::new(client);

    let on_change = move |section: Section, field: Field, value: String| {
        let delay = form
            .try_update_value(|f| {
                f.set_field(now_ms(), section, field, &value);
                snapshot.set(f.form().clone());
                f.debounce().delay_ms()
            })
            .unwrap_or(flarenet_common::DRAFT_DEBOUNCE_MS);

        // 古いタイマーは drop で取り消される
        let pending = Timeout::new(delay as u32, move || {
            form.try_update_value(|f| {
                if let Err(e) = f.poll(now_ms()) {
                    gloo::console::warn!(format!("draft autosave failed: {}", e));
                }
            });
        });
        timer.set_value(Some(pending));
    };

    on_cleanup(move || {
        timer.try_update_value(|t| t.take());
        form.try_update_value(|f| {
            if let Err(e) = f.close() {
                gloo::console::warn!(format!("final draft write failed: {}", e));
            }
        });
    });

    let on_save = move |_| {
        timer.try_update_value(|t| t.take());
        let saved = form.try_update_value(|f| f.save(&now_iso()));
        let record = match saved {
            Some(Ok(record)) => record,
            Some(Err(e)) => {
                gloo::dialogs::alert(&format!("Could not save locally: {}", e));
                return;
            }
            None => return,
        };
        snapshot.set(record.clone());

        let client = client.get_value();
        spawn_local(async move {
            if let Err(e) = client.save_record(&record).await {
                gloo::console::warn!(format!("record upload failed: {}", e));
                gloo::dialogs::alert("Saved locally, but the server could not be reached.");
            }
            on_saved.run(record);
        });
    };

    let text_input = move |section: Section, field: Field| {
        view! {
            <label>
                {field.label()}
                <input
                    prop:value=move || snapshot.with(|r| r.get_field(section, field))
                    on:input=move |ev| on_change(section, field, event_target_value(&ev))
                />
            </label>
        }
    };

    let status_select = move |section: Section| {
        view! {
            <label>
                {Field::Status.label()}
                <select
                    prop:value=move || snapshot.with(|r| r.get_field(section, Field::Status))
                    on:change=move |ev| on_change(section, Field::Status, event_target_value(&ev))
                >
                    {MaintenanceStatus::ALL.iter().map(|s| view! {
                        <option value=s.as_str()>{s.as_str()}</option>
                    }).collect_view()}
                </select>
            </label>
        }
    };

    let section_view = move |section: Section| {
        view! {
            <fieldset>
                <legend>{section.label()}</legend>
                <div class="form-grid">
                    {text_input(section, Field::Name)}
                    {status_select(section)}
                    {text_input(section, Field::Voltage)}
                    {text_input(section, Field::Current)}
                    {text_input(section, Field::RecommendedAction)}
                    {text_input(section, Field::AdditionalRemarks)}
                    {text_input(section, Field::Timestamp)}
                </div>
            </fieldset>
        }
    };

    view! {
        <div class="card no-pdf">
            <h3>"Maintenance Record"</h3>
            <p class="text-muted">"Loaded from: " {restored}</p>
            {Section::ALL.iter().map(|s| section_view(*s)).collect_view()}
            <button class="btn btn-primary" on:click=on_save>"Save"</button>
        </div>
    }
}
