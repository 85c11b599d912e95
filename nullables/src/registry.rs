//! Nullable parameter registry.

use claw_governance::{GovernableParam, ParamRegistry};
use std::collections::HashMap;
use std::sync::Mutex;

/// An in-memory key/value parameter registry for testing.
pub struct NullParamRegistry {
    values: Mutex<HashMap<String, u128>>,
}

impl NullParamRegistry {
    pub fn new() -> Self {
        Self {
            values: Mutex::new(HashMap::new()),
        }
    }

    pub fn set(&self, key: &str, value: u128) {
        self.values.lock().unwrap().insert(key.to_string(), value);
    }

    pub fn set_param(&self, param: GovernableParam, value: u128) {
        self.set(param.name(), value);
    }

    pub fn clear(&self, key: &str) {
        self.values.lock().unwrap().remove(key);
    }
}

impl Default for NullParamRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ParamRegistry for NullParamRegistry {
    fn get_param_with_default(&self, key: &str, default: u128) -> u128 {
        self.values
            .lock()
            .unwrap()
            .get(key)
            .copied()
            .unwrap_or(default)
    }
}
