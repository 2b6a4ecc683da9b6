//! One report run: fetch, shape, and draw each conversion view.

use ga_report_analytics::{
    coerce, derive, normalize, Conversion, GroupValue, ReportFrame, ReportQuery, ReportSource,
    Series, TypedTable,
};
use ga_report_charts::{
    BarChartRenderer, ChartKind, ChartRenderer, ChartSpec, ChartStyle, LineChartRenderer,
    OutputDir,
};
use ga_report_common::{strip_namespace, ReportError, Result, DATE_COLUMN};
use std::path::PathBuf;
use tracing::{info, instrument};

/// Per-chart options shared by the five views
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartOptions {
    /// Caption; the chart's file stem when absent
    pub title: Option<String>,
    /// Column of the exact-match filter, empty for none
    pub filter_dimension: String,
    /// Value of the exact-match filter, empty for none
    pub filter_value: String,
    /// Fixed value axis of the line views; bar views always scale to their
    /// data so negative uplift bars stay visible
    pub y_range: Option<(f64, f64)>,
}

impl ChartOptions {
    /// Set the caption
    pub fn titled(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Keep only rows whose `dimension` equals `value`
    pub fn filtered(mut self, dimension: impl Into<String>, value: impl Into<String>) -> Self {
        self.filter_dimension = dimension.into();
        self.filter_value = value.into();
        self
    }

    /// Fix the value axis of the line views
    pub fn with_y_range(mut self, min: f64, max: f64) -> Self {
        self.y_range = Some((min, max));
        self
    }
}

/// A report bound to a source, a query and an output directory
pub struct AnalyticsReport<S> {
    source: S,
    query: ReportQuery,
    conversion: Conversion,
    output: OutputDir,
    line: LineChartRenderer,
    bar: BarChartRenderer,
}

impl<S: ReportSource> AnalyticsReport<S> {
    /// Bind a query to its source.
    ///
    /// `version` names the dimension whose values are compared; it must be
    /// one of the query's dimensions. The first metric is the CR denominator.
    pub fn new(
        source: S,
        query: ReportQuery,
        version: &str,
        output: OutputDir,
        style: ChartStyle,
    ) -> Result<Self> {
        query.validate()?;
        let version = strip_namespace(version);
        if !query.dimensions.iter().any(|d| d == version) {
            return Err(ReportError::validation_field(
                format!("Version dimension '{}' is not among the requested dimensions", version),
                "version",
            ));
        }
        let metric = query
            .base_metric()
            .ok_or_else(|| ReportError::validation_field("No base metric", "metrics"))?;
        let conversion = Conversion::new(version, metric, query.goal.as_str());

        Ok(Self {
            source,
            conversion,
            query,
            output,
            line: LineChartRenderer::new(style.clone()),
            bar: BarChartRenderer::new(style),
        })
    }

    /// The query this report runs
    pub fn query(&self) -> &ReportQuery {
        &self.query
    }

    /// Where charts are written
    pub fn output(&self) -> &OutputDir {
        &self.output
    }

    /// Fetch and normalize, keeping an empty result as [`ReportFrame::NoData`]
    #[instrument(skip(self), fields(view_id = %self.query.view_id))]
    pub async fn fetch_frame(&self) -> Result<ReportFrame> {
        let raw = self.source.fetch(&self.query).await?;
        normalize(&raw)
    }

    /// Fetch, normalize and coerce. An empty result is [`ReportError::NoData`].
    pub async fn full_data(&self) -> Result<TypedTable> {
        let table = self.fetch_frame().await?.into_table()?;
        let typed = coerce(table, &self.query.numeric_columns())?;
        info!(rows = typed.num_rows(), "Report data ready");
        Ok(typed)
    }

    /// Daily CR per version as lines
    #[instrument(skip(self, data, options))]
    pub fn ts(&self, data: &TypedTable, options: &ChartOptions) -> Result<PathBuf> {
        let data = Self::filtered(data, options)?;
        let series = derive::conversion_over_time(&data, &self.conversion)?;
        self.draw_lines(ChartKind::TimeSeries, &series, options)
    }

    /// Overall CR per version as sorted, annotated bars
    #[instrument(skip(self, data, options))]
    pub fn bar(&self, data: &TypedTable, options: &ChartOptions) -> Result<PathBuf> {
        let data = Self::filtered(data, options)?;
        let values = derive::conversion_by_version(&data, &self.conversion)?;
        self.draw_bars(ChartKind::Bar, &values, options)
    }

    /// Uplift over `reference` per version as sorted, annotated bars
    #[instrument(skip(self, data, options))]
    pub fn diff(&self, data: &TypedTable, reference: &str, options: &ChartOptions) -> Result<PathBuf> {
        let data = Self::filtered(data, options)?;
        let values = derive::uplift_by_version(&data, &self.conversion, reference)?;
        self.draw_bars(ChartKind::Diff, &values, options)
    }

    /// Cumulative CR per version as lines
    #[instrument(skip(self, data, options))]
    pub fn cumulative(&self, data: &TypedTable, options: &ChartOptions) -> Result<PathBuf> {
        let data = Self::filtered(data, options)?;
        let series = derive::cumulative_conversion(&data, &self.conversion)?;
        self.draw_lines(ChartKind::Cumulative, &series, options)
    }

    /// Cumulative uplift over `reference` per version as lines
    #[instrument(skip(self, data, options))]
    pub fn diff_cumulative(
        &self,
        data: &TypedTable,
        reference: &str,
        options: &ChartOptions,
    ) -> Result<PathBuf> {
        let data = Self::filtered(data, options)?;
        let series = derive::cumulative_uplift(&data, &self.conversion, reference)?;
        self.draw_lines(ChartKind::CumulativeDiff, &series, options)
    }

    /// Every view in [`ChartKind::ALL`] order; the two uplift views only when
    /// a reference is given. Stops at the first failure, keeping files
    /// already written.
    pub fn render_all(
        &self,
        data: &TypedTable,
        reference: Option<&str>,
        options: &ChartOptions,
    ) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();
        for kind in ChartKind::ALL {
            let path = match (kind, reference) {
                (ChartKind::TimeSeries, _) => self.ts(data, options)?,
                (ChartKind::Bar, _) => self.bar(data, options)?,
                (ChartKind::Cumulative, _) => self.cumulative(data, options)?,
                (ChartKind::Diff, Some(reference)) => self.diff(data, reference, options)?,
                (ChartKind::CumulativeDiff, Some(reference)) => {
                    self.diff_cumulative(data, reference, options)?
                }
                (ChartKind::Diff | ChartKind::CumulativeDiff, None) => continue,
            };
            written.push(path);
        }
        Ok(written)
    }

    fn filtered(data: &TypedTable, options: &ChartOptions) -> Result<TypedTable> {
        data.filter_eq(&options.filter_dimension, &options.filter_value)
    }

    fn spec(&self, kind: ChartKind, options: &ChartOptions) -> ChartSpec {
        let y_range = if kind.is_bar() { None } else { options.y_range };
        let spec = ChartSpec::new(kind).with_y_range(y_range);
        let spec = match &options.title {
            Some(title) => spec.with_title(title.as_str()),
            None => spec,
        };
        if kind.is_bar() {
            spec.with_x_label(self.conversion.version.as_str())
        } else {
            spec.with_x_label(DATE_COLUMN)
        }
    }

    fn draw_lines(
        &self,
        kind: ChartKind,
        series: &[Series],
        options: &ChartOptions,
    ) -> Result<PathBuf> {
        let path = self.output.path_for(kind);
        self.line
            .render_to_file(&self.spec(kind, options), series, &path)?;
        Ok(path)
    }

    fn draw_bars(
        &self,
        kind: ChartKind,
        values: &[GroupValue],
        options: &ChartOptions,
    ) -> Result<PathBuf> {
        let path = self.output.path_for(kind);
        self.bar.render_to_file(&self.spec(kind, options), values, &path)?;
        Ok(path)
    }
}
