use serde_json::Value;

use crate::core::Bar;
use crate::core::error::EngineError;

/// Parse the klines endpoint's JSON body: an array of fixed-shape tuples,
/// open-time first, OHLCV as numeric-looking strings (spec §6 "REST
/// endpoint shape").
pub fn parse_klines(body: &str, key: &str) -> Result<Vec<Bar>, EngineError> {
    let rows: Vec<Value> = serde_json::from_str(body)?;
    rows.iter().map(|row| parse_row(row, key)).collect()
}

fn parse_row(row: &Value, key: &str) -> Result<Bar, EngineError> {
    let arr = row.as_array().ok_or_else(|| EngineError::Integrity {
        key: key.to_string(),
        reason: "kline row is not an array".to_string(),
    })?;
    if arr.len() < 6 {
        return Err(EngineError::Integrity {
            key: key.to_string(),
            reason: format!("kline row has {} fields, expected at least 6", arr.len()),
        });
    }
    let open_time = arr[0].as_i64().ok_or_else(|| EngineError::Integrity {
        key: key.to_string(),
        reason: "open_time is not an integer".to_string(),
    })?;
    let num = |v: &Value| -> Result<f64, EngineError> {
        v.as_str()
            .and_then(|s| s.parse::<f64>().ok())
            .or_else(|| v.as_f64())
            .ok_or_else(|| EngineError::Integrity {
                key: key.to_string(),
                reason: format!("non-numeric OHLCV field: {v}"),
            })
    };
    Ok(Bar {
        open_time,
        open: num(&arr[1])?,
        high: num(&arr[2])?,
        low: num(&arr[3])?,
        close: num(&arr[4])?,
        volume: num(&arr[5])?,
    })
}
