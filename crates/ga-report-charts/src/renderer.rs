//! Chart rendering trait and the line and bar implementations

use crate::annotate::{bar_labels, label_offset, BarGeometry};
use crate::types::{ChartSpec, ChartStyle};
use crate::utils::{bar_range, day_label, day_offset, finite_bounds, padded_range};
use ga_report_analytics::{GroupValue, Series};
use ga_report_common::{ReportError, Result};
use plotters::prelude::*;
use std::path::Path;
use tracing::{info, warn};

/// Fallback series color when the palette is empty
const DEFAULT_COLOR: RGBColor = RGBColor(31, 119, 180);

/// Trait for rendering one chart kind to a PNG file
pub trait ChartRenderer {
    /// Data drawn by this renderer
    type Data: ?Sized;

    /// Style shared by every chart of the run
    fn style(&self) -> &ChartStyle;

    /// Render a chart to a file path
    fn render_to_file(&self, spec: &ChartSpec, data: &Self::Data, path: &Path) -> Result<()>;

    /// Series colors from the palette, cycled by the caller
    fn get_colors(&self) -> Vec<RGBColor> {
        let colors: Vec<RGBColor> = self
            .style()
            .palette
            .iter()
            .map(|color| self.parse_color(color))
            .collect();
        if colors.is_empty() {
            vec![DEFAULT_COLOR]
        } else {
            colors
        }
    }

    /// Parse a color string (hex format) to RGBColor
    fn parse_color(&self, color_str: &str) -> RGBColor {
        parse_color(color_str)
    }

    /// Plot background
    fn get_background_color(&self) -> RGBColor {
        self.parse_color(&self.style().background_color)
    }
}

/// Parse `#RRGGBB`; anything else is black
pub fn parse_color(color_str: &str) -> RGBColor {
    if let Some(hex) = color_str.strip_prefix('#') {
        if hex.len() == 6 {
            if let (Ok(r), Ok(g), Ok(b)) = (
                u8::from_str_radix(&hex[0..2], 16),
                u8::from_str_radix(&hex[2..4], 16),
                u8::from_str_radix(&hex[4..6], 16),
            ) {
                return RGBColor(r, g, b);
            }
        }
    }
    RGBColor(0, 0, 0)
}

fn checked_range(range: (f64, f64)) -> Result<(f64, f64)> {
    let (min, max) = range;
    if !(min.is_finite() && max.is_finite()) || min >= max {
        return Err(ReportError::validation_field(
            format!("Value range [{}, {}] is not increasing", min, max),
            "y_range",
        ));
    }
    Ok(range)
}

/// One line per series over a date axis
#[derive(Debug, Clone, Default)]
pub struct LineChartRenderer {
    style: ChartStyle,
}

impl LineChartRenderer {
    /// Create a renderer with the given style
    pub fn new(style: ChartStyle) -> Self {
        Self { style }
    }
}

impl ChartRenderer for LineChartRenderer {
    type Data = [Series];

    fn style(&self) -> &ChartStyle {
        &self.style
    }

    fn render_to_file(&self, spec: &ChartSpec, data: &[Series], path: &Path) -> Result<()> {
        let finite: Vec<_> = data
            .iter()
            .flat_map(|s| s.points.iter())
            .filter(|(_, v)| v.is_finite())
            .collect();
        let (Some(first), Some(last)) = (
            finite.iter().map(|(d, _)| *d).min(),
            finite.iter().map(|(d, _)| *d).max(),
        ) else {
            return Err(ReportError::graph(format!(
                "No finite values to plot for {}",
                spec.kind
            )));
        };

        let x_max = day_offset(first, last).max(1.0);
        let (y_min, y_max) = checked_range(match spec.y_range {
            Some(range) => range,
            None => padded_range(
                finite_bounds(finite.iter().map(|(_, v)| *v)).unwrap_or((0.0, 1.0)),
                0.05,
            ),
        })?;

        let root = BitMapBackend::new(path, (self.style.width, self.style.height))
            .into_drawing_area();
        root.fill(&WHITE)?;

        let family = self.style.font_family.as_str();
        let title_font = (family, f64::from(self.style.title_font_size));
        let label_font = (family, f64::from(self.style.label_font_size));

        let mut chart = ChartBuilder::on(&root)
            .caption(&spec.title, title_font)
            .margin(20)
            .x_label_area_size(60)
            .y_label_area_size(80)
            .build_cartesian_2d(0f64..x_max, y_min..y_max)?;

        chart.plotting_area().fill(&self.get_background_color())?;
        chart
            .configure_mesh()
            .bold_line_style(WHITE)
            .light_line_style(WHITE.mix(0.5))
            .x_labels(8)
            .x_label_formatter(&|x| day_label(first, *x))
            .x_desc(spec.x_label.as_deref().unwrap_or("date"))
            .y_desc(spec.y_label.as_deref().unwrap_or(""))
            .label_style(label_font)
            .draw()?;

        let colors = self.get_colors();
        for (i, series) in data.iter().enumerate() {
            let color = colors[i % colors.len()];
            let line: Vec<(f64, f64)> = series
                .points
                .iter()
                .filter(|(_, v)| v.is_finite())
                .map(|(d, v)| (day_offset(first, *d), *v))
                .collect();

            let skipped = series.points.len() - line.len();
            if skipped > 0 {
                warn!(series = %series.name, skipped, "Skipping non-finite values");
            }
            if line.is_empty() {
                continue;
            }

            chart
                .draw_series(LineSeries::new(line, color.stroke_width(2)))?
                .label(series.name.as_str())
                .legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
                });
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .label_font(label_font)
            .draw()?;

        root.present()?;
        info!("Successfully rendered {} chart to {}", spec.kind, path.display());
        Ok(())
    }
}

/// One annotated bar per group, in the given order
#[derive(Debug, Clone, Default)]
pub struct BarChartRenderer {
    style: ChartStyle,
}

impl BarChartRenderer {
    /// Create a renderer with the given style
    pub fn new(style: ChartStyle) -> Self {
        Self { style }
    }
}

impl ChartRenderer for BarChartRenderer {
    type Data = [GroupValue];

    fn style(&self) -> &ChartStyle {
        &self.style
    }

    fn render_to_file(&self, spec: &ChartSpec, data: &[GroupValue], path: &Path) -> Result<()> {
        if data.is_empty() {
            return Err(ReportError::graph(format!(
                "No groups to plot for {}",
                spec.kind
            )));
        }

        let bars: Vec<BarGeometry> = data
            .iter()
            .enumerate()
            .filter(|(_, g)| g.value.is_finite())
            .map(|(i, g)| BarGeometry::from_value(i, g.value))
            .collect();
        if bars.len() < data.len() {
            warn!(
                skipped = data.len() - bars.len(),
                "Skipping groups with non-finite values"
            );
        }

        let y_range = checked_range(
            spec.y_range
                .unwrap_or_else(|| bar_range(data.iter().map(|g| g.value))),
        )?;
        // A single-value integer range would be degenerate; keep at least two slots
        let slots = data.len().max(2);

        let root = BitMapBackend::new(path, (self.style.width, self.style.height))
            .into_drawing_area();
        root.fill(&WHITE)?;

        let family = self.style.font_family.as_str();
        let title_font = (family, f64::from(self.style.title_font_size));
        let label_font = (family, f64::from(self.style.label_font_size));

        let mut chart = ChartBuilder::on(&root)
            .caption(&spec.title, title_font)
            .margin(20)
            .x_label_area_size(60)
            .y_label_area_size(80)
            .build_cartesian_2d((0..slots - 1).into_segmented(), y_range.0..y_range.1)?;

        chart.plotting_area().fill(&self.get_background_color())?;
        chart
            .configure_mesh()
            .disable_x_mesh()
            .bold_line_style(WHITE)
            .light_line_style(WHITE.mix(0.5))
            .x_labels(slots)
            .x_label_formatter(&|x| match x {
                SegmentValue::CenterOf(i) => data
                    .get(*i)
                    .map(|g| g.group.clone())
                    .unwrap_or_default(),
                _ => String::new(),
            })
            .x_desc(spec.x_label.as_deref().unwrap_or(""))
            .y_desc(spec.y_label.as_deref().unwrap_or(""))
            .label_style(label_font)
            .draw()?;

        let color = self.get_colors()[0];
        chart.draw_series(bars.iter().map(|bar| {
            let mut rect = Rectangle::new(
                [
                    (SegmentValue::Exact(bar.index), bar.bottom),
                    (SegmentValue::Exact(bar.index + 1), bar.top),
                ],
                color.filled(),
            );
            rect.set_margin(0, 0, 10, 10);
            rect
        }))?;

        let text_style = label_font.into_font().color(&BLACK);
        chart.draw_series(bar_labels(&bars, label_offset(y_range), text_style))?;

        root.present()?;
        info!("Successfully rendered {} chart to {}", spec.kind, path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChartKind;
    use chrono::NaiveDate;

    #[test]
    fn test_color_parsing() {
        assert_eq!(parse_color("#FF0000"), RGBColor(255, 0, 0));
        assert_eq!(parse_color("#348ABD"), RGBColor(52, 138, 189));
        assert_eq!(parse_color("invalid"), RGBColor(0, 0, 0));
        assert_eq!(parse_color("#ZZ0000"), RGBColor(0, 0, 0));
    }

    #[test]
    fn test_palette_colors() {
        let renderer = LineChartRenderer::new(ChartStyle {
            palette: vec!["#FF0000".into(), "#00FF00".into()],
            ..ChartStyle::default()
        });
        assert_eq!(
            renderer.get_colors(),
            vec![RGBColor(255, 0, 0), RGBColor(0, 255, 0)]
        );
        assert_eq!(renderer.get_background_color(), RGBColor(0xE5, 0xE5, 0xE5));

        let empty = BarChartRenderer::new(ChartStyle {
            palette: vec![],
            ..ChartStyle::default()
        });
        assert_eq!(empty.get_colors(), vec![DEFAULT_COLOR]);
    }

    #[test]
    fn test_checked_range() {
        assert!(checked_range((0.0, 1.0)).is_ok());
        assert!(checked_range((1.0, 1.0)).is_err());
        assert!(checked_range((2.0, 1.0)).is_err());
        assert!(checked_range((f64::NAN, 1.0)).is_err());
    }

    #[test]
    fn test_line_chart_without_finite_values_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ts.png");
        let data = vec![Series {
            name: "1.0".into(),
            points: vec![(NaiveDate::from_ymd_opt(2019, 1, 1).unwrap(), f64::NAN)],
        }];

        let err = LineChartRenderer::default()
            .render_to_file(&ChartSpec::new(ChartKind::TimeSeries), &data, &path)
            .unwrap_err();
        assert!(matches!(err, ReportError::Graph { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn test_bar_chart_without_groups_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bar.png");
        let err = BarChartRenderer::default()
            .render_to_file(&ChartSpec::new(ChartKind::Bar), &[], &path)
            .unwrap_err();
        assert!(matches!(err, ReportError::Graph { .. }));
    }

    #[test]
    fn test_inverted_range_is_rejected_before_drawing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bar.png");
        let data = vec![GroupValue {
            group: "1.0".into(),
            value: 3.0,
        }];
        let spec = ChartSpec::new(ChartKind::Bar).with_y_range(Some((5.0, 1.0)));

        let err = BarChartRenderer::default()
            .render_to_file(&spec, &data, &path)
            .unwrap_err();
        assert!(matches!(err, ReportError::Validation { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn test_render_line_chart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ts_versions.png");
        let day = |d| NaiveDate::from_ymd_opt(2019, 1, d).unwrap();
        let data = vec![
            Series {
                name: "1.0".into(),
                points: vec![(day(1), 10.0), (day(2), 12.0), (day(3), f64::NAN)],
            },
            Series {
                name: "2.0".into(),
                points: vec![(day(1), 20.0), (day(3), 15.0)],
            },
        ];

        LineChartRenderer::default()
            .render_to_file(&ChartSpec::new(ChartKind::TimeSeries), &data, &path)
            .unwrap();
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn test_render_bar_chart_with_negative_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("diff_v.png");
        let data = vec![
            GroupValue {
                group: "2.0".into(),
                value: 28.0,
            },
            GroupValue {
                group: "1.0".into(),
                value: 0.0,
            },
            GroupValue {
                group: "0.9".into(),
                value: -12.5,
            },
        ];

        BarChartRenderer::default()
            .render_to_file(&ChartSpec::new(ChartKind::Diff), &data, &path)
            .unwrap();
        assert!(path.exists());
    }
}
