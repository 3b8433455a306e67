//! 解決済みメンテナンス記録の表示

use flarenet_common::record::{Field, Section};
use flarenet_common::resolver::ResolvedRecord;
use leptos::prelude::*;
use wasm_bindgen::JsValue;

/// ISO形式の時刻はブラウザのローカル表記にする。読めなければそのまま
fn display_timestamp(raw: &str) -> String {
    if !raw.contains('T') {
        return raw.to_string();
    }
    let date = js_sys::Date::new(&JsValue::from_str(raw));
    if date.get_time().is_nan() {
        return raw.to_string();
    }
    date.to_locale_string("default", &JsValue::UNDEFINED).into()
}

#[component]
pub fn MaintenancePanel(record: Signal<Option<ResolvedRecord>>) -> impl IntoView {
    move || match record.get() {
        None => view! {
            <p class="text-muted">"No maintenance record for this inspection"</p>
        }
        .into_any(),
        Some(resolved) => {
            let sections = Section::ALL
                .iter()
                .map(|section| {
                    let data = resolved.record.section(*section).clone();
                    view! {
                        <div>
                            <h4>{section.label()}</h4>
                            <table>
                                <tbody>
                                    {Field::ALL.iter().map(|field| {
                                        let mut value = data.get(*field);
                                        if *field == Field::Timestamp {
                                            value = display_timestamp(&value);
                                        }
                                        view! {
                                            <tr>
                                                <th>{field.label()}</th>
                                                <td>{if value.is_empty() { "-".to_string() } else { value }}</td>
                                            </tr>
                                        }
                                    }).collect_view()}
                                </tbody>
                            </table>
                        </div>
                    }
                })
                .collect_view();

            let saved_at = resolved.record.timestamp.clone();
            let saved = (!saved_at.is_empty())
                .then(|| view! { <p class="text-muted">"Saved: " {display_timestamp(&saved_at)}</p> });

            view! {
                <div>
                    <p class="text-muted">"Source: " {resolved.provenance.describe()}</p>
                    {saved}
                    {sections}
                </div>
            }
            .into_any()
        }
    }
}
