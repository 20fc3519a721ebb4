//! Chart specifications in Plotly figure shape (`data` + `layout`).
//!
//! The browser hands a serialized [`ChartSpec`] straight to `Plotly.react`.

use serde::Serialize;

use crate::{AssetRecord, Symbol, ThemeMode, TradeDate};

/// Which of the two dashboard charts a spec describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Price,
    Liquidity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceType {
    Scatter,
    Bar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TraceMode {
    #[serde(rename = "lines")]
    Lines,
    #[serde(rename = "lines+markers")]
    LinesMarkers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisSide {
    Left,
    Right,
}

/// One series of (date, value) points.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trace {
    #[serde(rename = "type")]
    pub trace_type: TraceType,
    pub name: String,
    pub x: Vec<TradeDate>,
    pub y: Vec<Option<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<TraceMode>,
    /// Value axis id; `None` means the primary `y` axis.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<String>,
}

impl Trace {
    fn from_records(
        trace_type: TraceType,
        name: &str,
        records: &[AssetRecord],
        value: impl Fn(&AssetRecord) -> Option<f64>,
    ) -> Self {
        Self {
            trace_type,
            name: name.to_owned(),
            x: records.iter().map(|record| record.date).collect(),
            y: records.iter().map(value).collect(),
            mode: None,
            yaxis: None,
        }
    }

    fn with_mode(mut self, mode: TraceMode) -> Self {
        self.mode = Some(mode);
        self
    }

    fn on_axis(mut self, axis: &str) -> Self {
        self.yaxis = Some(axis.to_owned());
        self
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Title {
    pub text: String,
}

impl Title {
    fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Axis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<Title>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlaying: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub side: Option<AxisSide>,
}

impl Axis {
    fn titled(text: &str) -> Self {
        Self {
            title: Some(Title::new(text)),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Font {
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Layout {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<Title>,
    pub xaxis: Axis,
    pub yaxis: Axis,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis2: Option<Axis>,
    pub paper_bgcolor: String,
    pub plot_bgcolor: String,
    pub font: Font,
}

impl Layout {
    fn themed(theme: ThemeMode) -> Self {
        let palette = theme.palette();
        Self {
            title: None,
            xaxis: Axis::default(),
            yaxis: Axis::default(),
            yaxis2: None,
            paper_bgcolor: palette.paper_bgcolor.to_owned(),
            plot_bgcolor: palette.plot_bgcolor.to_owned(),
            font: Font {
                color: palette.font_color.to_owned(),
            },
        }
    }
}

/// A renderable chart: traces plus layout hints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub data: Vec<Trace>,
    pub layout: Layout,
}

impl ChartSpec {
    /// Chart shown when nothing is selected: no traces, no title.
    pub fn blank(kind: ChartKind, theme: ThemeMode) -> Self {
        Self {
            kind,
            data: Vec::new(),
            layout: Layout::themed(theme),
        }
    }

    /// Points in the first trace; zero for a blank chart.
    pub fn point_count(&self) -> usize {
        self.data.first().map_or(0, Trace::len)
    }

    pub fn is_empty(&self) -> bool {
        self.data.iter().all(Trace::is_empty)
    }
}

/// Adjusted close over time, one line+marker series.
pub fn build_price_chart(symbol: &Symbol, records: &[AssetRecord], theme: ThemeMode) -> ChartSpec {
    let trace = Trace::from_records(TraceType::Scatter, "Adj close", records, |record| {
        record.adjusted_close
    })
    .with_mode(TraceMode::LinesMarkers);

    let mut layout = Layout::themed(theme);
    layout.title = Some(Title::new(format!("{symbol} price")));
    layout.xaxis = Axis::titled("date");
    layout.yaxis = Axis::titled("price");

    ChartSpec {
        kind: ChartKind::Price,
        data: vec![trace],
        layout,
    }
}

/// Amihud bars with the z-score line on a right-hand secondary axis.
pub fn build_liquidity_chart(
    symbol: &Symbol,
    records: &[AssetRecord],
    theme: ThemeMode,
) -> ChartSpec {
    let bars = Trace::from_records(TraceType::Bar, "Amihud", records, |record| record.amihud);
    let line = Trace::from_records(TraceType::Scatter, "Z-score", records, |record| {
        record.z_score
    })
    .with_mode(TraceMode::Lines)
    .on_axis("y2");

    let mut layout = Layout::themed(theme);
    layout.title = Some(Title::new(format!("{symbol} liquidity and z-score")));
    layout.xaxis = Axis::titled("date");
    layout.yaxis = Axis::titled("Amihud");
    layout.yaxis2 = Some(Axis {
        title: Some(Title::new("Z-score")),
        overlaying: Some(String::from("y")),
        side: Some(AxisSide::Right),
    });

    ChartSpec {
        kind: ChartKind::Liquidity,
        data: vec![bars, line],
        layout,
    }
}
