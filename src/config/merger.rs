//! Deep merge for layered YAML configuration.
//!
//! # Merge Rules
//!
//! - Mappings are merged recursively
//! - Sequences are replaced entirely (not merged)
//! - Null values in an overlay delete the corresponding key
//! - Scalars in an overlay replace the base value
//! - A layer that is null as a whole (an empty file) changes nothing

use serde_yaml::Value;

/// Deep merge `overlay` onto `base`; the overlay wins at the point of conflict.
pub fn deep_merge(base: &Value, overlay: &Value) -> Value {
    match (base, overlay) {
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            let mut result = base_map.clone();

            for (key, overlay_value) in overlay_map {
                if overlay_value.is_null() {
                    result.remove(key);
                } else if let Some(base_value) = base_map.get(key) {
                    result.insert(key.clone(), deep_merge(base_value, overlay_value));
                } else {
                    result.insert(key.clone(), overlay_value.clone());
                }
            }

            Value::Mapping(result)
        }
        (_, overlay) => overlay.clone(),
    }
}

/// Merge config layers in order (later layers override earlier ones).
pub fn merge_configs(layers: &[Value]) -> Value {
    layers
        .iter()
        .filter(|layer| !layer.is_null())
        .fold(Value::Mapping(Default::default()), |acc, layer| {
            deep_merge(&acc, layer)
        })
}
