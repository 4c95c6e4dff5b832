//! Feature vector assembly.
//!
//! Turns a named feature mapping into the fixed-order vector an artifact was
//! fit on. Values are only coerced to numbers; their ranges are not checked.

use serde_json::{Map, Value};

use crate::RecommendError;

/// Build the input vector for `ordering` from a named feature mapping.
///
/// Every absent name is reported at once, in ordering order, before any value
/// is type-checked. Keys not named in `ordering` are ignored.
pub fn build_feature_vector(
    features: &Map<String, Value>,
    ordering: &[String],
) -> Result<Vec<f64>, RecommendError> {
    let missing: Vec<String> = ordering
        .iter()
        .filter(|name| !features.contains_key(name.as_str()))
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Err(RecommendError::MissingFeatures(missing));
    }

    ordering
        .iter()
        .map(|name| {
            coerce(&features[name.as_str()])
                .ok_or_else(|| RecommendError::InvalidFeatureType(name.clone()))
        })
        .collect()
}

/// Numbers pass through; strings are parsed. Anything non-finite is rejected.
fn coerce(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::default_feature_names;
    use serde_json::json;

    fn full_request() -> Map<String, Value> {
        let value = json!({
            "N": 90, "P": 42, "K": 43,
            "temperature": 20.87, "humidity": 82.0,
            "ph": 6.5, "rainfall": 202.93
        });
        value.as_object().unwrap().clone()
    }

    #[test]
    fn builds_in_ordering_order() {
        let v = build_feature_vector(&full_request(), &default_feature_names()).unwrap();
        assert_eq!(v, vec![90.0, 42.0, 43.0, 20.87, 82.0, 6.5, 202.93]);
    }

    #[test]
    fn follows_custom_ordering() {
        let ordering = vec!["ph".to_string(), "N".to_string()];
        let v = build_feature_vector(&full_request(), &ordering).unwrap();
        assert_eq!(v, vec![6.5, 90.0]);
    }

    #[test]
    fn extra_keys_are_ignored() {
        let mut req = full_request();
        req.insert("soil_colour".into(), json!("red"));
        let v = build_feature_vector(&req, &default_feature_names()).unwrap();
        assert_eq!(v.len(), 7);
    }

    #[test]
    fn missing_ph_is_reported() {
        let mut req = full_request();
        req.remove("ph");
        let err = build_feature_vector(&req, &default_feature_names()).unwrap_err();
        assert_eq!(err, RecommendError::MissingFeatures(vec!["ph".into()]));
    }

    #[test]
    fn every_missing_name_is_reported_in_order() {
        let mut req = full_request();
        req.remove("rainfall");
        req.remove("N");
        req.remove("humidity");
        // A bad value elsewhere must not hide the missing names.
        req.insert("ph".into(), json!("acidic"));
        let err = build_feature_vector(&req, &default_feature_names()).unwrap_err();
        assert_eq!(
            err,
            RecommendError::MissingFeatures(vec![
                "N".into(),
                "humidity".into(),
                "rainfall".into()
            ])
        );
    }

    #[test]
    fn numeric_strings_are_coerced() {
        let mut req = full_request();
        req.insert("K".into(), json!(" 43.5 "));
        let v = build_feature_vector(&req, &default_feature_names()).unwrap();
        assert_eq!(v[2], 43.5);
    }

    #[test]
    fn non_numeric_values_are_rejected() {
        let bad_values = [
            json!("acidic"),
            json!(true),
            json!(null),
            json!([6.5]),
            json!({"v": 6.5}),
            json!("NaN"),
            json!("inf"),
        ];
        for bad in bad_values {
            let mut req = full_request();
            req.insert("ph".into(), bad.clone());
            let err = build_feature_vector(&req, &default_feature_names()).unwrap_err();
            assert_eq!(err, RecommendError::InvalidFeatureType("ph".into()), "value {bad}");
        }
    }

    #[test]
    fn out_of_range_values_pass_through() {
        let mut req = full_request();
        req.insert("ph".into(), json!(-40.0));
        let v = build_feature_vector(&req, &default_feature_names()).unwrap();
        assert_eq!(v[5], -40.0);
    }
}
