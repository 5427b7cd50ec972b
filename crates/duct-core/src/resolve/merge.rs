//! Merge "fill defaults" para el pre-flight.
//!
//! El input existente tiene precedencia sobre lo resuelto: así el output de
//! un paso anterior sobrevive junto a los inputs nombrados nuevos. Merge
//! shallow; extender a deep-merge sólo si alguna vez hace falta.

use serde_json::{Map, Value};

/// Completa `existing` con las claves de `resolved` que falten. Un input
/// previo que no es objeto se conserva entero.
pub fn fill_defaults(existing: Value, resolved: Map<String, Value>) -> Value {
    match existing {
        Value::Object(mut map) => {
            for (k, v) in resolved {
                map.entry(k).or_insert(v);
            }
            Value::Object(map)
        }
        Value::Null => Value::Object(resolved),
        other => other,
    }
}
