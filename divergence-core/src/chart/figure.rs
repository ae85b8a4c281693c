//! Plotly figure model for the dual-axis divergence chart.
//!
//! Only the attributes the chart uses are modelled. Field names follow the
//! plotly.js JSON schema so the figure serializes directly into `Plotly.newPlot`.

use crate::config::DivergenceConfig;
use crate::data::AlignedTable;
use crate::stats::Relationship;
use chrono::NaiveDate;
use serde::Serialize;

/// Extra room above and below the macro series on its axis.
const MACRO_AXIS_PADDING: f64 = 2.0;

#[derive(Debug, Clone, Serialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

#[derive(Debug, Clone, Serialize)]
pub struct Trace {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub mode: &'static str,
    pub name: String,
    pub x: Vec<NaiveDate>,
    pub y: Vec<f64>,
    pub line: Line,
    pub hovertemplate: String,
    pub yaxis: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Line {
    pub color: String,
    pub width: u32,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Font {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Title {
    pub text: String,
    pub font: Font,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HoverLabel {
    pub bgcolor: &'static str,
    pub bordercolor: &'static str,
    pub font: Font,
}

#[derive(Debug, Clone, Serialize)]
pub struct Legend {
    pub orientation: &'static str,
    pub yanchor: &'static str,
    pub y: f64,
    pub xanchor: &'static str,
    pub x: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Annotation {
    pub text: String,
    pub xref: &'static str,
    pub yref: &'static str,
    pub x: f64,
    pub y: f64,
    pub showarrow: bool,
    pub bgcolor: &'static str,
    pub bordercolor: &'static str,
    pub borderwidth: u32,
    pub font: Font,
}

#[derive(Debug, Clone, Serialize)]
pub struct RangeSlider {
    pub visible: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Axis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<Title>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tickfont: Option<Font>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<[f64; 2]>,
    pub showgrid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gridcolor: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlaying: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub side: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rangeslider: Option<RangeSlider>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showspikes: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spikemode: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spikesnap: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spikedash: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spikecolor: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spikethickness: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showline: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linewidth: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linecolor: Option<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Layout {
    pub title: Title,
    pub plot_bgcolor: &'static str,
    pub hovermode: &'static str,
    pub hoverlabel: HoverLabel,
    pub legend: Legend,
    pub annotations: Vec<Annotation>,
    pub xaxis: Axis,
    pub yaxis: Axis,
    pub yaxis2: Axis,
}

/// Annotation body: correlation to two decimals plus the sign-derived label.
pub fn correlation_text(correlation: f64) -> String {
    format!(
        "<b>Statistical Correlation: {correlation:.2}</b><br>({})",
        Relationship::from_correlation(correlation)
    )
}

fn coloured_axis_title(text: &str, color: &str) -> Option<Title> {
    Some(Title {
        text: text.to_string(),
        font: Font {
            color: Some(color.to_string()),
            ..Font::default()
        },
        y: None,
    })
}

/// Build the dual-axis figure: macro series on the left axis, equity on the right.
pub fn build_figure(table: &AlignedTable, correlation: f64, config: &DivergenceConfig) -> Figure {
    let dates = table.dates();
    let grey = &config.colors.macro_series;
    let red = &config.colors.equity;

    let macro_trace = Trace {
        kind: "scatter",
        mode: "lines",
        name: config.labels.macro_name.clone(),
        x: dates.clone(),
        y: table.macro_values(),
        line: Line {
            color: grey.clone(),
            width: 3,
        },
        hovertemplate: format!(
            "<span style='color:{grey}; font-size:16px; font-weight:bold'>%{{y:.1f}}%</span><extra></extra>"
        ),
        yaxis: "y",
    };

    let equity_trace = Trace {
        kind: "scatter",
        mode: "lines",
        name: config.labels.equity_name.clone(),
        x: dates,
        y: table.prices(),
        line: Line {
            color: red.clone(),
            width: 3,
        },
        hovertemplate: format!(
            "<span style='color:{red}; font-size:16px; font-weight:bold'>$%{{y:.2f}}</span><extra></extra>"
        ),
        yaxis: "y2",
    };

    let layout = Layout {
        title: Title {
            text: config.labels.title.clone(),
            font: Font {
                size: Some(20),
                family: Some("Arial"),
                color: Some("black".into()),
            },
            y: Some(0.95),
        },
        plot_bgcolor: "white",
        hovermode: "x",
        hoverlabel: HoverLabel {
            bgcolor: "white",
            bordercolor: "black",
            font: Font {
                size: Some(14),
                family: Some("Arial"),
                color: None,
            },
        },
        legend: Legend {
            orientation: "h",
            yanchor: "bottom",
            y: 1.02,
            xanchor: "right",
            x: 1.0,
        },
        annotations: vec![Annotation {
            text: correlation_text(correlation),
            xref: "paper",
            yref: "paper",
            x: 0.05,
            y: 0.9,
            showarrow: false,
            bgcolor: "rgba(240,240,240,0.8)",
            bordercolor: "black",
            borderwidth: 1,
            font: Font {
                size: Some(12),
                family: None,
                color: Some("black".into()),
            },
        }],
        xaxis: Axis {
            title: Some(Title {
                text: "Timeline (Sync Data)".into(),
                font: Font::default(),
                y: None,
            }),
            showgrid: false,
            rangeslider: Some(RangeSlider { visible: true }),
            showspikes: Some(true),
            spikemode: Some("across"),
            spikesnap: Some("cursor"),
            spikedash: Some("dot"),
            spikecolor: Some("black"),
            spikethickness: Some(1),
            showline: Some(true),
            linewidth: Some(1),
            linecolor: Some("black"),
            ..Axis::default()
        },
        yaxis: Axis {
            title: coloured_axis_title(&config.labels.macro_axis, grey),
            tickfont: Some(Font {
                color: Some(grey.clone()),
                ..Font::default()
            }),
            range: table
                .macro_bounds()
                .map(|(lo, hi)| [lo - MACRO_AXIS_PADDING, hi + MACRO_AXIS_PADDING]),
            showgrid: true,
            gridcolor: Some("rgba(0,0,0,0.05)"),
            ..Axis::default()
        },
        yaxis2: Axis {
            title: coloured_axis_title(&config.labels.equity_axis, red),
            tickfont: Some(Font {
                color: Some(red.clone()),
                ..Font::default()
            }),
            showgrid: false,
            overlaying: Some("y"),
            side: Some("right"),
            ..Axis::default()
        },
    };

    Figure {
        data: vec![macro_trace, equity_trace],
        layout,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::AlignedRow;

    fn table() -> AlignedTable {
        let d = |day| NaiveDate::from_ymd_opt(2023, 1, day).unwrap();
        AlignedTable::new(
            "AFRM_Price",
            "Savings_Rate",
            vec![
                AlignedRow { date: d(3), price: 10.0, macro_value: 4.5 },
                AlignedRow { date: d(4), price: 12.0, macro_value: 3.5 },
            ],
        )
    }

    #[test]
    fn annotation_label_follows_sign() {
        assert_eq!(
            correlation_text(-0.734),
            "<b>Statistical Correlation: -0.73</b><br>(Inverse relationship)"
        );
        assert_eq!(
            correlation_text(0.5),
            "<b>Statistical Correlation: 0.50</b><br>(Positive relationship)"
        );
    }

    #[test]
    fn figure_json_shape() {
        let figure = build_figure(&table(), -1.0, &DivergenceConfig::default());
        let json = serde_json::to_value(&figure).unwrap();

        assert_eq!(json["data"][0]["yaxis"], "y");
        assert_eq!(json["data"][1]["yaxis"], "y2");
        assert_eq!(json["data"][0]["x"][0], "2023-01-03");
        assert_eq!(json["data"][1]["y"][1], 12.0);
        assert_eq!(json["data"][1]["line"]["color"], "#FF412C");
        assert_eq!(json["data"][0]["line"]["color"], "#959595");
        assert_eq!(json["data"][0]["type"], "scatter");

        assert_eq!(json["layout"]["yaxis"]["range"][0], 1.5);
        assert_eq!(json["layout"]["yaxis"]["range"][1], 6.5);
        assert_eq!(json["layout"]["yaxis2"]["overlaying"], "y");
        assert_eq!(json["layout"]["yaxis2"]["side"], "right");
        assert_eq!(json["layout"]["xaxis"]["rangeslider"]["visible"], true);
        assert_eq!(json["layout"]["xaxis"]["spikedash"], "dot");
        assert!(json["layout"]["yaxis2"].get("range").is_none());
        assert!(json["layout"]["annotations"][0]["text"]
            .as_str()
            .unwrap()
            .contains("Inverse relationship"));
    }

    #[test]
    fn hover_templates_use_trace_colours() {
        let figure = build_figure(&table(), 0.1, &DivergenceConfig::default());
        assert_eq!(
            figure.data[0].hovertemplate,
            "<span style='color:#959595; font-size:16px; font-weight:bold'>%{y:.1f}%</span><extra></extra>"
        );
        assert!(figure.data[1].hovertemplate.contains("$%{y:.2f}"));
        assert!(figure.data[1].hovertemplate.contains("color:#FF412C"));
    }
}
