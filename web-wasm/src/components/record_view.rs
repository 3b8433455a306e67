//! 記録表示画面
//!
//! 対象（変圧器+点検）が変わるたびに読み込み直す。
//! 読み込み中に対象が変わった場合、古い結果は反映しない。

use flarenet_common::export::pdf_core::export_file_name;
use flarenet_common::resolver::{RecordProvenance, RecordTarget, ResolvedRecord};
use flarenet_common::autosave::editor_initial;
use flarenet_common::{load_record_view, MaintenanceRecord, RecordIdentity, RecordView};
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api::WebClient;
use crate::components::anomaly_table::AnomalyTable;
use crate::components::export_buttons::ExportButtons;
use crate::components::maintenance_form::MaintenanceForm;
use crate::components::maintenance_panel::MaintenancePanel;
use crate::components::thermal_overlay::ThermalOverlay;
use crate::storage::BrowserStore;

const PRINT_AREA_ID: &str = "record-print-area";

#[component]
pub fn RecordViewScreen(identity: Signal<RecordIdentity>, client: Signal<WebClient>) -> impl IntoView {
    let view_data = RwSignal::new(None::<RecordView>);
    let loading = RwSignal::new(false);
    let editing = RwSignal::new(false);
    let target = StoredValue::new(RecordTarget::new());

    Effect::new(move |_| {
        let identity = identity.get();
        let client = client.get();
        editing.set(false);
        view_data.set(None);

        if identity.inspection_id.is_none() {
            target.update_value(RecordTarget::clear);
            loading.set(false);
            return;
        }

        let mut issued = None;
        target.update_value(|t| issued = Some(t.begin(identity.clone())));
        let Some(ticket) = issued else { return };

        loading.set(true);
        spawn_local(async move {
            let loaded = load_record_view(&client, &BrowserStore, &identity).await;
            // 対象が変わっていたら捨てる
            if target.try_with_value(|t| t.accepts(&ticket)).unwrap_or(false) {
                view_data.set(Some(loaded));
                loading.set(false);
            }
        });
    });

    on_cleanup(move || {
        target.try_update_value(RecordTarget::clear);
    });

    let anomalies = Signal::derive(move || {
        view_data.with(|v| v.as_ref().map(|v| v.anomalies.clone()).unwrap_or_default())
    });
    let record = Signal::derive(move || view_data.with(|v| v.as_ref().and_then(|v| v.record.clone())));
    let file_name = Signal::derive(move || {
        view_data.with(|v| match v {
            Some(v) => {
                let number = v.inspection.as_ref().and_then(|i| i.inspection_number.as_deref());
                export_file_name(number, v.identity.inspection_id.as_deref())
            }
            None => export_file_name(None, None),
        })
    });

    let on_saved = Callback::new(move |saved: MaintenanceRecord| {
        view_data.update(|v| {
            if let Some(v) = v {
                v.record = Some(ResolvedRecord {
                    record: saved,
                    provenance: RecordProvenance::SavedInEditor,
                });
            }
        });
        editing.set(false);
    });

    move || {
        if loading.get() {
            return view! { <p class="text-muted">"Loading..."</p> }.into_any();
        }
        let Some(data) = view_data.get() else {
            return view! { <p class="text-muted">"Select a transformer and inspection"</p> }.into_any();
        };

        let base = client.with_untracked(|c| c.base_url().to_string());
        let baseline_url = data.baseline.as_ref().and_then(|img| img.absolute_url(&base));
        let thermal_url = data.thermal.as_ref().and_then(|img| img.absolute_url(&base));
        let title = format!("Inspection {}", data.inspection_label().unwrap_or("-"));
        let transformer_line = data.transformer.as_ref().map(|t| {
            format!(
                "Transformer {} / Pole {} / {}",
                t.transformer_no.as_deref().unwrap_or("-"),
                t.pole_no.as_deref().unwrap_or("-"),
                t.region.as_deref().unwrap_or("-"),
            )
        });
        let form_identity = data.identity.clone();

        view! {
            <div id=PRINT_AREA_ID>
                <div class="card">
                    <h2>{title}</h2>
                    {transformer_line.map(|line| view! { <p>{line}</p> })}
                    <div class="images">
                        <div>
                            <h4>"Baseline"</h4>
                            {match baseline_url {
                                Some(url) => view! { <img src=url alt="Baseline image" width="500" crossorigin="anonymous" /> }.into_any(),
                                None => view! { <p class="text-muted">"No baseline image"</p> }.into_any(),
                            }}
                        </div>
                        <div>
                            <h4>"Thermal"</h4>
                            {match thermal_url {
                                Some(url) => view! { <ThermalOverlay src=url anomalies=anomalies /> }.into_any(),
                                None => view! { <p class="text-muted">"No thermal image"</p> }.into_any(),
                            }}
                        </div>
                    </div>
                </div>

                <div class="card">
                    <h3>"Anomalies"</h3>
                    <AnomalyTable anomalies=anomalies />
                </div>

                <div class="card">
                    <h3>"Maintenance"</h3>
                    <MaintenancePanel record=record />
                    <button class="btn no-pdf" on:click=move |_| editing.update(|e| *e = !*e)>
                        {move || if editing.get() { "Close editor" } else { "Edit record" }}
                    </button>
                </div>

                <Show when=move || editing.get()>
                    {
                        // 開くたびに判定する（閉じたときに書かれた下書きを拾う）
                        let shown = record.get_untracked().map(|r| r.record);
                        let initial = editor_initial(&BrowserStore, &form_identity, shown.as_ref());
                        view! {
                            <MaintenanceForm
                                identity=form_identity.clone()
                                client=client.get_untracked()
                                initial=initial
                                on_saved=on_saved
                            />
                        }
                    }
                </Show>

                <ExportButtons element_id=PRINT_AREA_ID file_name=file_name />
            </div>
        }
        .into_any()
    }
}
