use csv::ReaderBuilder;

use crate::core::Bar;
use crate::core::error::EngineError;

/// Binance's daily kline archives carry at least these 6 leading columns,
/// in this order, sometimes with a header row and sometimes without
/// (spec §4.5 "column schema is fixed but not guaranteed header-free").
const MIN_COLUMNS: usize = 6;

fn looks_like_header(first_field: &str) -> bool {
    first_field.parse::<i64>().is_err()
}

/// Parse one day's raw kline CSV body into bars, in file order (not yet
/// validated for invariants; the caller runs those through
/// [`crate::daypack::validate_invariants`]).
pub fn parse_csv(body: &str, key: &str) -> Result<Vec<Bar>, EngineError> {
    let has_header = body
        .lines()
        .next()
        .and_then(|line| line.split(',').next())
        .is_some_and(looks_like_header);

    let mut reader = ReaderBuilder::new()
        .has_headers(has_header)
        .flexible(true)
        .from_reader(body.as_bytes());

    let mut bars = Vec::new();
    for record in reader.records() {
        let record = record.map_err(EngineError::Csv)?;
        if record.len() < MIN_COLUMNS {
            return Err(EngineError::Integrity {
                key: key.to_string(),
                reason: format!("row has {} columns, expected at least {MIN_COLUMNS}", record.len()),
            });
        }
        let field = |i: usize| -> Result<&str, EngineError> {
            record.get(i).ok_or_else(|| EngineError::Integrity {
                key: key.to_string(),
                reason: format!("missing column {i}"),
            })
        };
        let parse_i64 = |s: &str| -> Result<i64, EngineError> {
            s.parse().map_err(|_| EngineError::Integrity {
                key: key.to_string(),
                reason: format!("non-numeric open_time {s:?}"),
            })
        };
        let parse_f64 = |s: &str| -> Result<f64, EngineError> {
            s.parse().map_err(|_| EngineError::Integrity {
                key: key.to_string(),
                reason: format!("non-numeric field {s:?}"),
            })
        };

        bars.push(Bar {
            open_time: parse_i64(field(0)?)?,
            open: parse_f64(field(1)?)?,
            high: parse_f64(field(2)?)?,
            low: parse_f64(field(3)?)?,
            close: parse_f64(field(4)?)?,
            volume: parse_f64(field(5)?)?,
        });
    }
    Ok(bars)
}
