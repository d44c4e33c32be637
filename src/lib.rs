#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod geom;
pub mod horn;

use std::collections::BTreeMap;

use serde::Serialize;
use wasm_bindgen::JsError;
use wasm_bindgen::prelude::*;

use geom::{GroupRange, MeshQualityReport, RingSpan};
use horn::{HornBuild, HornContext, HornParams, ParamIssue};

cfg_if::cfg_if! {
    if #[cfg(all(feature = "console_error_panic_hook", target_arch = "wasm32"))] {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            console_error_panic_hook::set_once();
            init_logger();
        }
    } else {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            // no-op fallback when panic hook is disabled
            init_logger();
        }
    }
}

#[cfg(feature = "debug_logs")]
fn init_logger() {
    use log::LevelFilter;
    use wasm_bindgen_console_logger::DEFAULT_LOGGER;
    if log::set_logger(&DEFAULT_LOGGER).is_ok() {
        log::set_max_level(LevelFilter::Debug);
    }
}

#[cfg(not(feature = "debug_logs"))]
fn init_logger() {
    // no-op fallback when debug logs are disabled
}

/// Mesh payload handed to JavaScript.
///
/// `vertices` and `indices` are flat so the caller can wrap them in typed
/// arrays without reshaping.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HornMeshExport<'a> {
    vertices: &'a [f64],
    indices: &'a [u32],
    ring_count: usize,
    full_circle: bool,
    rings: &'a [RingSpan],
    groups: &'a BTreeMap<String, GroupRange>,
    quality: &'a MeshQualityReport,
    issues: &'a [ParamIssue],
}

impl<'a> From<&'a HornBuild> for HornMeshExport<'a> {
    fn from(build: &'a HornBuild) -> Self {
        Self {
            vertices: build.mesh.positions_flat(),
            indices: &build.mesh.indices,
            ring_count: build.mesh.ring_count,
            full_circle: build.mesh.full_circle,
            rings: &build.mesh.rings,
            groups: &build.mesh.groups,
            quality: &build.quality,
            issues: &build.issues,
        }
    }
}

/// Builds a horn from a parameter object.
///
/// Numeric fields may be given as formula strings in `p`. With `strict` set,
/// parameter errors and quality violations reject the promise instead of
/// being reported in `issues`/`quality`.
#[wasm_bindgen(js_name = buildHornMesh)]
pub fn build_horn_mesh(params: JsValue, strict: Option<bool>) -> Result<JsValue, JsError> {
    let params: HornParams =
        serde_wasm_bindgen::from_value(params).map_err(|err| JsError::new(&err.to_string()))?;
    let mut ctx = HornContext {
        strict: strict.unwrap_or(false),
        ..HornContext::new()
    };
    let build = horn::build_horn_with_context(&params, &mut ctx).map_err(|err| JsError::new(&err.to_string()))?;
    let export = HornMeshExport::from(&build);
    serde_wasm_bindgen::to_value(&export).map_err(|err| JsError::new(&err.to_string()))
}

/// Checks a parameter object without building.
#[wasm_bindgen(js_name = validateHornParams)]
pub fn validate_horn_params(params: JsValue) -> Result<JsValue, JsError> {
    let params: HornParams =
        serde_wasm_bindgen::from_value(params).map_err(|err| JsError::new(&err.to_string()))?;
    let issues = horn::validate_params(&params);
    serde_wasm_bindgen::to_value(&issues).map_err(|err| JsError::new(&err.to_string()))
}
