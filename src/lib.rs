pub mod data_type;
pub mod ddl;
pub mod dialect;
pub mod error;
pub mod layout;
pub mod measure;
pub mod model;
pub mod resolver;
pub mod schema;
pub mod snapshot;
pub mod validate;

use wasm_bindgen::prelude::*;

use ddl::ExportOptions;
use error::ExportError;
use layout::LayoutEngine;
use schema::SchemaModel;
use snapshot::Snapshot;

/// Initialize panic hook for better error messages in WASM
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

fn hydrate(snapshot_json: &str) -> Result<(SchemaModel, Option<String>), String> {
    let snapshot = Snapshot::from_json(snapshot_json).map_err(|e| e.to_string())?;
    let name = snapshot.name.clone();
    Ok((snapshot.into_model(&LayoutEngine::default()), name))
}

fn export_options(options_json: Option<String>) -> Result<ExportOptions, String> {
    match options_json.as_deref().map(str::trim) {
        None | Some("") => Ok(ExportOptions::default()),
        Some(json) => {
            serde_json::from_str(json).map_err(|e| format!("Invalid export options: {}", e))
        }
    }
}

/// Compile a snapshot to SQL DDL
#[wasm_bindgen(js_name = "compileSql")]
pub fn compile_sql(snapshot_json: &str, options_json: Option<String>) -> Result<String, String> {
    let (model, _) = hydrate(snapshot_json)?;
    let options = export_options(options_json)?;

    let selection = model.select(options.selected_tables.as_deref());
    match ddl::export(&selection, &options.compile_options(model.dialect())) {
        Ok(export) => Ok(export.sql),
        Err(err) => {
            let ExportError::Blocked { issues } = &err;
            let mut message = err.to_string();
            for issue in issues.iter().filter(|i| i.is_error()) {
                message.push_str(&format!("\n- {}: {}", issue.title, issue.description));
            }
            Err(message)
        }
    }
}

/// Validate the selected tables of a snapshot, returning the issues as JSON
#[wasm_bindgen(js_name = "validateSchema")]
pub fn validate_schema(
    snapshot_json: &str,
    options_json: Option<String>,
) -> Result<String, String> {
    let (model, _) = hydrate(snapshot_json)?;
    let options = export_options(options_json)?;

    let selection = model.select(options.selected_tables.as_deref());
    let issues = validate::validate(&selection.tables);
    serde_json::to_string(&issues).map_err(|e| e.to_string())
}

/// Lay out every table of a snapshot, returning the updated snapshot JSON
#[wasm_bindgen(js_name = "autoLayout")]
pub fn auto_layout(snapshot_json: &str) -> Result<String, String> {
    let (model, name) = hydrate(snapshot_json)?;
    let model = model.auto_layout(&LayoutEngine::default());

    let snapshot = Snapshot {
        name,
        ..Snapshot::from_model(&model)
    };
    snapshot.to_json().map_err(|e| e.to_string())
}
