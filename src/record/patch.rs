use serde_json::Value;

/// Shallow merge: top-level keys of `patch` replace those of `target`.
/// A non-object patch leaves `target` unchanged.
pub(crate) fn merge_patch(target: &mut Value, patch: &Value) {
    let (Value::Object(target), Value::Object(patch)) = (target, patch) else {
        return;
    };

    for (key, value) in patch {
        target.insert(key.clone(), value.clone());
    }
}
