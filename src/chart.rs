//! Shapes handed to the rendering side. Nothing here draws.

use serde::{Deserialize, Serialize};

use crate::common::types::Timestamp;
use crate::error::{SeriesError, SeriesResult};
use crate::storage::DatasetType;

/// One value per timestamp, ready for a line plot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineChart {
    pub dataset: DatasetType,
    pub timestamps: Vec<Timestamp>,
    pub values: Vec<f64>,
}

/// Peak-normalized histogram rows, one per time window.
///
/// `timestamps` bounds the rows, so it is one element longer than `histogram_rows`. Each row
/// has one entry per bin, i.e. one fewer than `bin_edges`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapChart {
    pub dataset: DatasetType,
    pub timestamps: Vec<Timestamp>,
    pub bin_edges: Vec<f64>,
    pub histogram_rows: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ChartData {
    Line(LineChart),
    Heatmap(HeatmapChart),
}

impl ChartData {
    pub fn dataset(&self) -> &DatasetType {
        match self {
            ChartData::Line(chart) => &chart.dataset,
            ChartData::Heatmap(chart) => &chart.dataset,
        }
    }

    pub fn to_json(&self) -> SeriesResult<String> {
        serde_json::to_string(self).map_err(|e| SeriesError::Serialization(e.to_string()))
    }
}

impl From<LineChart> for ChartData {
    fn from(chart: LineChart) -> Self {
        ChartData::Line(chart)
    }
}

impl From<HeatmapChart> for ChartData {
    fn from(chart: HeatmapChart) -> Self {
        ChartData::Heatmap(chart)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_line_chart_json_shape() {
        let ts = Utc.with_ymd_and_hms(2018, 1, 1, 12, 0, 0).unwrap();
        let chart = ChartData::from(LineChart {
            dataset: DatasetType::Steps,
            timestamps: vec![ts],
            values: vec![15.0],
        });
        let json: serde_json::Value = serde_json::from_str(&chart.to_json().unwrap()).unwrap();
        assert_eq!(json["kind"], "line");
        assert_eq!(json["dataset"], "steps");
        assert_eq!(json["values"][0], 15.0);
        assert_eq!(json["timestamps"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_heatmap_round_trip() {
        let ts = Utc.with_ymd_and_hms(2018, 1, 1, 12, 0, 0).unwrap();
        let chart = ChartData::from(HeatmapChart {
            dataset: DatasetType::Heartrate,
            timestamps: vec![ts, ts],
            bin_edges: vec![50.0, 55.0],
            histogram_rows: vec![vec![1.0]],
        });
        let parsed: ChartData = serde_json::from_str(&chart.to_json().unwrap()).unwrap();
        assert_eq!(parsed, chart);
        assert_eq!(parsed.dataset(), &DatasetType::Heartrate);
    }
}
