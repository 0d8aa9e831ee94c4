#![cfg(feature = "dataframe")]

use polars::prelude::*;

use super::models::BarSeries;

/// Converts an engine data structure into a Polars `DataFrame`. A thin
/// boundary adapter, gated behind the `dataframe` feature, never a core
/// dependency — the façade's native return type is [`BarSeries`] (spec §9
/// design note: "treat any inter-library conversion... as a thin boundary
/// adapter, not a core concern").
pub trait ToDataFrame {
    /// Converts the object into a Polars `DataFrame`.
    ///
    /// # Errors
    /// Returns an error if Polars rejects the assembled columns.
    fn to_dataframe(&self) -> PolarsResult<DataFrame>;
}

impl ToDataFrame for BarSeries {
    fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        df! {
            "open_time" => self.open_time.clone(),
            "open" => self.open.clone(),
            "high" => self.high.clone(),
            "low" => self.low.clone(),
            "close" => self.close.clone(),
            "volume" => self.volume.clone(),
        }
    }
}
