//! Browser entry points: study payloads, the 1-D equilibrium classifier and an
//! interactively stepped Kaldor system.

mod kaldor;

pub use kaldor::WasmKaldorSystem;

use cycles_core::equilibrium::{
    classify_equilibria as core_classify_equilibria, RootScanSettings, ZeroCrossingPolicy,
};
use cycles_core::studies::{self, Study, StudyConfig};
use serde::Serialize;
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;

#[derive(Serialize)]
struct StudyEntry {
    name: &'static str,
    description: &'static str,
}

fn study_entries() -> Vec<StudyEntry> {
    Study::ALL
        .iter()
        .map(|s| StudyEntry {
            name: s.name(),
            description: s.description(),
        })
        .collect()
}

fn js_error(context: &str, err: anyhow::Error) -> JsValue {
    JsValue::from_str(&format!("{}: {:#}", context, err))
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    to_value(value).map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

/// Name and description of every study, as an array of objects.
#[wasm_bindgen]
pub fn list_studies() -> Result<JsValue, JsValue> {
    to_js(&study_entries())
}

/// Runs a study by name. `config` may be `undefined`/`null` for the defaults or a partial
/// configuration object.
#[wasm_bindgen]
pub fn run_study(name: &str, config: JsValue) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();

    let study: Study = name.parse().map_err(|e| js_error("Invalid study", e))?;
    let config: StudyConfig = if config.is_undefined() || config.is_null() {
        StudyConfig::default()
    } else {
        from_value(config)
            .map_err(|e| JsValue::from_str(&format!("Invalid study config: {}", e)))?
    };
    let report = studies::run_study(study, &config)
        .map_err(|e| js_error(&format!("Study {} failed", study), e))?;
    to_js(&report)
}

/// Roots of a sampled curve difference with their stability.
#[wasm_bindgen]
pub fn classify_equilibria(
    grid: Vec<f64>,
    values: Vec<f64>,
    include_grid_zeros: bool,
) -> Result<JsValue, JsValue> {
    let policy = if include_grid_zeros {
        ZeroCrossingPolicy::IncludeGridZeros
    } else {
        ZeroCrossingPolicy::StrictSignChange
    };
    let equilibria = core_classify_equilibria(&grid, &values, RootScanSettings { policy })
        .map_err(|e| js_error("Equilibrium scan failed", e))?;
    to_js(&equilibria)
}

#[cfg(test)]
mod tests {
    use super::study_entries;

    #[test]
    fn entries_cover_every_study() {
        let entries = study_entries();
        assert_eq!(entries.len(), 7);
        assert_eq!(entries[0].name, "goodwin");
        assert!(entries.iter().all(|e| !e.description.is_empty()));
    }
}
