//! Interactive stepping of the two-variable Kaldor system.

use cycles_core::models::kaldor::{KaldorModel, KaldorParams};
use cycles_core::solvers::RK4;
use cycles_core::traits::{FieldSystem, PlanarField, Steppable};
use cycles_core::trajectory::State;
use serde_wasm_bindgen::from_value;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub struct WasmKaldorSystem {
    model: KaldorModel,
    solver: RK4<f64>,
    state: Vec<f64>,
    t: f64,
}

impl WasmKaldorSystem {
    pub(crate) fn from_params(params: KaldorParams) -> Self {
        Self {
            model: KaldorModel::new(params),
            solver: RK4::new(2),
            state: vec![0.2, 0.1],
            t: 0.0,
        }
    }

    fn current(&self) -> State {
        State::new(self.state[0], self.state[1])
    }
}

#[wasm_bindgen]
impl WasmKaldorSystem {
    /// `params` may be `undefined` for the default parameters or a partial object.
    #[wasm_bindgen(constructor)]
    pub fn new(params: JsValue) -> Result<WasmKaldorSystem, JsValue> {
        console_error_panic_hook::set_once();

        let params: KaldorParams = if params.is_undefined() || params.is_null() {
            KaldorParams::default()
        } else {
            from_value(params)
                .map_err(|e| JsValue::from_str(&format!("Invalid Kaldor parameters: {}", e)))?
        };
        Ok(Self::from_params(params))
    }

    pub fn set_state(&mut self, state: &[f64]) -> Result<(), JsValue> {
        if state.len() != 2 {
            return Err(JsValue::from_str(&format!(
                "Kaldor state has two entries (Y, K), got {}",
                state.len()
            )));
        }
        self.state = state.to_vec();
        Ok(())
    }

    pub fn get_state(&self) -> Vec<f64> {
        self.state.clone()
    }

    pub fn set_t(&mut self, t: f64) {
        self.t = t;
    }

    pub fn get_t(&self) -> f64 {
        self.t
    }

    pub fn step(&mut self, dt: f64) {
        let system = FieldSystem::new(&self.model);
        self.solver.step(&system, &mut self.t, &mut self.state, dt);
    }

    /// Advances `steps` times and returns the visited states flattened as `[Y0, K0, Y1, K1, ...]`.
    pub fn run(&mut self, dt: f64, steps: u32) -> Vec<f64> {
        let mut out = Vec::with_capacity(2 * steps as usize);
        for _ in 0..steps {
            self.step(dt);
            out.extend_from_slice(&self.state);
        }
        out
    }

    /// Row-major 2x2 Jacobian at the current state.
    pub fn jacobian(&self) -> Vec<f64> {
        let jac = self.model.jacobian(self.current());
        vec![jac[0][0], jac[0][1], jac[1][0], jac[1][1]]
    }

    pub fn divergence(&self) -> f64 {
        self.model.divergence(self.current())
    }
}
