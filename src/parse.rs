use serde_json::Value;

use crate::{error::PipelineError, exchange_rate::RawRate, fetch::RATES_FIELD};

/// Flattens the provider's `conversion_rates` mapping into one row per
/// currency, in the order the provider sent them.
pub fn parse_rates(payload: &Value) -> Result<Vec<RawRate>, PipelineError> {
    let rates = payload
        .get(RATES_FIELD)
        .ok_or_else(|| PipelineError::malformed("parse", format!("missing {RATES_FIELD:?} field")))?
        .as_object()
        .ok_or_else(|| PipelineError::malformed("parse", format!("{RATES_FIELD:?} is not a mapping")))?;

    Ok(rates
        .iter()
        .map(|(code, rate)| RawRate::new(code.as_str(), rate.as_f64()))
        .collect())
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use serde_json::{Map, json};

    use super::*;

    #[test]
    fn rows_follow_provider_order() {
        let payload = json!({ "conversion_rates": { "USD": 1.2, "EUR": 0.9, "JPY": 190 } });
        let rows = parse_rates(&payload).unwrap();
        assert_eq!(
            rows,
            vec![
                RawRate::new("USD", Some(1.2)),
                RawRate::new("EUR", Some(0.9)),
                RawRate::new("JPY", Some(190.0)),
            ]
        );
    }

    #[test]
    fn row_count_and_keys_match_the_mapping() {
        let payload = json!({ "conversion_rates": {
            "GBP": 1, "AED": 4.66, "AFN": 87.1, "ALL": 117.2, "AMD": 490.3
        }});
        let mapping = payload[RATES_FIELD].as_object().unwrap();
        let rows = parse_rates(&payload).unwrap();

        assert_eq!(rows.len(), mapping.len());
        let mut parsed: Vec<&str> = rows.iter().map(|r| r.currency.as_str()).collect();
        let mut keys: Vec<&str> = mapping.keys().map(String::as_str).collect();
        parsed.sort_unstable();
        keys.sort_unstable();
        assert_eq!(parsed, keys);
    }

    #[test]
    fn non_numeric_rates_become_missing() {
        let payload = json!({ "conversion_rates": { "USD": null, "EUR": "0.9" } });
        let rows = parse_rates(&payload).unwrap();
        assert_eq!(rows[0].exchange_rate, None);
        assert_eq!(rows[1].exchange_rate, None);
    }

    #[test]
    fn empty_mapping_parses_to_no_rows() {
        let rows = parse_rates(&json!({ "conversion_rates": {} })).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn missing_or_wrong_shape_is_malformed() {
        for payload in [
            json!({ "rates": {} }),
            json!({ "conversion_rates": [1.2, 0.9] }),
            json!({ "conversion_rates": 1.2 }),
        ] {
            assert!(matches!(
                parse_rates(&payload),
                Err(PipelineError::MalformedResponse { stage: "parse", .. })
            ));
        }
    }

    proptest! {
        /// One row per mapping entry, same codes, same rates, same order.
        #[test]
        fn every_entry_becomes_one_row(
            rates in prop::collection::btree_map("[A-Z]{3}", 1.0e-6f64..1.0e9, 0..40),
        ) {
            let mapping: Map<String, Value> =
                rates.iter().map(|(code, rate)| (code.clone(), json!(rate))).collect();
            let rows = parse_rates(&json!({ "conversion_rates": mapping })).unwrap();

            prop_assert_eq!(rows.len(), rates.len());
            for (row, (code, rate)) in rows.iter().zip(&rates) {
                prop_assert_eq!(&row.currency, code);
                prop_assert_eq!(row.exchange_rate, Some(*rate));
            }
        }
    }
}
