pub mod anomaly_table;
pub mod export_buttons;
pub mod header;
pub mod maintenance_form;
pub mod maintenance_panel;
pub mod record_view;
pub mod thermal_overlay;
