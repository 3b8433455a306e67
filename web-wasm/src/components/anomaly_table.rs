//! 異常一覧テーブル

use flarenet_common::Anomaly;
use leptos::prelude::*;

#[component]
pub fn AnomalyTable(anomalies: Signal<Vec<Anomaly>>) -> impl IntoView {
    let rows = move || {
        anomalies.with(|list| {
            list.iter()
                .filter(|a| !a.is_deleted)
                .cloned()
                .enumerate()
                .collect::<Vec<_>>()
        })
    };

    view! {
        <Show
            when=move || anomalies.with(|list| list.iter().any(|a| !a.is_deleted))
            fallback=|| view! { <p class="text-muted">"No anomalies detected"</p> }
        >
            <table>
                <thead>
                    <tr>
                        <th>"#"</th>
                        <th>"Anomaly"</th>
                        <th>"Severity / Confidence"</th>
                        <th>"Location (x, y, w, h)"</th>
                        <th>"Source"</th>
                        <th>"Details"</th>
                    </tr>
                </thead>
                <tbody>
                    {move || rows().into_iter().map(|(i, a)| {
                        let color = if a.is_faulty() { "red" } else { "inherit" };
                        view! {
                            <tr>
                                <td>{i + 1}</td>
                                <td>{a.display_name().to_string()}</td>
                                <td style=format!("color:{}", color)>{a.severity_summary()}</td>
                                <td>{a.location_summary()}</td>
                                <td>{a.source().as_str()}</td>
                                <td>{a.details_summary().to_string()}</td>
                            </tr>
                        }
                    }).collect_view()}
                </tbody>
            </table>
        </Show>
    }
}
