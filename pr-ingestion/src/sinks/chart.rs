use std::path::{Path, PathBuf};

use plotters::{
    coord::Shift,
    prelude::*,
    style::{
        text_anchor::{HPos, Pos, VPos},
        FontStyle,
    },
};
use pr_client::{
    analysis::{PlantYearTarget, RenderInstruction},
    domain::{GhiClass, TrailingWindow},
};
use time::{macros::format_description, Date};

use super::{atomic::replace_via_temp, fonts};
use crate::pipeline::{PipelineError, Sink};

const MA_COLOR: RGBColor = RGBColor(0xFF, 0x44, 0x44);
const TARGET_COLOR: RGBColor = RGBColor(0x2D, 0x50, 0x16);
const GRID_COLOR: RGBColor = RGBColor(0xB0, 0xB0, 0xB0);

fn class_color(class: GhiClass) -> RGBColor {
    match class {
        GhiClass::Low => RGBColor(0x00, 0x00, 0x8B),
        GhiClass::Moderate => RGBColor(0x41, 0x69, 0xE1),
        GhiClass::Good => RGBColor(0xFF, 0xA5, 0x00),
        GhiClass::Excellent => RGBColor(0x8B, 0x45, 0x13),
        GhiClass::Unclassified => RGBColor(0x80, 0x80, 0x80),
    }
}

/// Physical size of the rendered figure.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartStyle {
    pub dpi: u32,
    pub width_in: f64,
    pub height_in: f64,
    /// TrueType font for bitmap output; common system locations are tried when unset.
    pub font_path: Option<PathBuf>,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            dpi: 300,
            width_in: 14.0,
            height_in: 8.0,
            font_path: None,
        }
    }
}

impl ChartStyle {
    fn pixels(&self) -> (u32, u32) {
        let px = |inches: f64| (inches * f64::from(self.dpi)).round().max(1.0) as u32;
        (px(self.width_in), px(self.height_in))
    }

    /// Typographic points to pixels.
    fn pt(&self, points: f64) -> f64 {
        points * f64::from(self.dpi) / 72.0
    }

    fn pt_px(&self, points: f64) -> u32 {
        self.pt(points).round().max(1.0) as u32
    }
}

/// Renders the performance chart. `.svg` targets are written as SVG, anything
/// else goes through the bitmap encoder (format chosen by extension).
pub struct ChartSink {
    path: PathBuf,
    style: ChartStyle,
}

impl ChartSink {
    pub fn new<P: Into<PathBuf>>(path: P, style: ChartStyle) -> Self {
        Self {
            path: path.into(),
            style,
        }
    }

    fn is_svg(&self) -> bool {
        self.path
            .extension()
            .is_some_and(|e| e.eq_ignore_ascii_case("svg"))
    }
}

impl Sink<RenderInstruction> for ChartSink {
    fn write(&self, input: &RenderInstruction) -> Result<(), PipelineError> {
        let size = self.style.pixels();
        replace_via_temp(&self.path, |tmp| {
            // Text layout needs a registered font for both backends.
            fonts::ensure_registered(self.style.font_path.as_deref())?;
            if self.is_svg() {
                draw(SVGBackend::new(tmp, size).into_drawing_area(), input, &self.style)
            } else {
                draw(BitMapBackend::new(tmp, size).into_drawing_area(), input, &self.style)
            }
        })
        .map_err(|e| PipelineError::Render(format!("{e:#}")))?;

        tracing::info!(
            path = %self.path.display(),
            width = size.0,
            height = size.1,
            points = input.points.len(),
            "chart written"
        );
        Ok(())
    }
}

fn x_of(date: Date) -> i32 {
    date.to_julian_day()
}

fn month_label(jd: i32) -> String {
    Date::from_julian_day(jd)
        .ok()
        .and_then(|d| {
            d.format(format_description!("[month repr:short]/[year repr:last_two]"))
                .ok()
        })
        .unwrap_or_default()
}

fn day_label(date: Date) -> String {
    date.format(format_description!("[year]~[month]~[day]"))
        .unwrap_or_else(|_| date.to_string())
}

pub(crate) fn target_label(years: &[PlantYearTarget]) -> String {
    let parts: Vec<String> = years
        .iter()
        .map(|y| format!("{}Y~{:.1}%", y.index + 1, y.target))
        .collect();
    format!("Target Budget Yield Performance Ratio [{}]", parts.join(","))
}

pub(crate) fn exceedance_label(chart: &RenderInstruction) -> String {
    format!(
        "Points above Target Budget PR = {}/{} = {:.1}%",
        chart.exceedance.above,
        chart.exceedance.total,
        chart.exceedance.percentage()
    )
}

pub(crate) fn summary_lines(chart: &RenderInstruction) -> Vec<String> {
    TrailingWindow::ALL
        .iter()
        .map(|&w| {
            let value = chart
                .average(w)
                .map_or_else(|| "n/a".to_string(), |v| format!("{v:.1} %"));
            format!("Average PR {}: {value}", w.label())
        })
        .collect()
}

fn draw<DB>(
    root: DrawingArea<DB, Shift>,
    chart: &RenderInstruction,
    style: &ChartStyle,
) -> anyhow::Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;

    let (width, _) = root.dim_in_pixel();
    let side = (f64::from(width) * 0.2) as u32;
    let (plot_area, side_area) = root.split_horizontally(width - side);

    let first = x_of(chart.first_date);
    let last = x_of(chart.last_date);
    let caption = format!(
        "Performance Ratio Evolution, from {} to {}",
        day_label(chart.first_date),
        day_label(chart.last_date)
    );

    let mut cc = ChartBuilder::on(&plot_area)
        .caption(
            caption,
            ("sans-serif", style.pt(13.0)).into_font().style(FontStyle::Bold),
        )
        .margin(style.pt_px(8.0))
        .x_label_area_size(style.pt_px(22.0))
        .y_label_area_size(style.pt_px(34.0))
        .build_cartesian_2d(first..last + 1, 0f64..105f64)?;

    cc.configure_mesh()
        .y_desc("Performance Ratio [%]")
        .x_labels(12)
        .y_labels(11)
        .x_label_formatter(&|jd| month_label(*jd))
        .label_style(("sans-serif", style.pt(9.0)))
        .axis_desc_style(("sans-serif", style.pt(11.0)))
        .light_line_style(WHITE)
        .bold_line_style(GRID_COLOR.mix(0.3))
        .draw()?;

    let radius = style.pt_px(2.0);
    for class in GhiClass::BUCKETS.into_iter().chain([GhiClass::Unclassified]) {
        let color = class_color(class);
        let points: Vec<(i32, f64)> = chart
            .points
            .iter()
            .filter(|p| p.ghi_class == class)
            .filter_map(|p| p.pr.map(|pr| (x_of(p.date), pr)))
            .collect();
        let anno = cc.draw_series(
            points
                .into_iter()
                .map(|c| Circle::new(c, radius, color.mix(0.7).filled())),
        )?;
        if class != GhiClass::Unclassified {
            anno.label(format!("Daily Irradiation {} kWh/m2", class.label()))
                .legend(move |(x, y)| Circle::new((x + 10, y), 5, color.filled()));
        }
    }

    let line_width = style.pt_px(2.0);
    let ma: Vec<(i32, f64)> = chart
        .points
        .iter()
        .filter_map(|p| p.moving_average.map(|v| (x_of(p.date), v)))
        .collect();
    cc.draw_series(LineSeries::new(ma, MA_COLOR.stroke_width(line_width)))?
        .label(format!(
            "{}~d moving average of PR",
            chart.moving_average_days
        ))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], MA_COLOR.stroke_width(3)));

    let target: Vec<(i32, f64)> = chart
        .points
        .iter()
        .map(|p| (x_of(p.date), p.target))
        .collect();
    cc.draw_series(LineSeries::new(target, TARGET_COLOR.stroke_width(line_width)))?
        .label(target_label(&chart.plant_years))
        .legend(|(x, y)| {
            PathElement::new(vec![(x, y), (x + 20, y)], TARGET_COLOR.stroke_width(3))
        });

    let centered = Pos::new(HPos::Center, VPos::Center);
    let mid = first + (last + 1 - first) / 2;
    cc.draw_series(std::iter::once(Text::new(
        exceedance_label(chart),
        (mid, 35.0),
        ("sans-serif", style.pt(9.0))
            .into_font()
            .color(&BLACK)
            .pos(centered),
    )))?;

    cc.configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .label_font(("sans-serif", style.pt(8.0)))
        .background_style(WHITE)
        .border_style(BLACK)
        .draw()?;

    draw_summary(&side_area, chart, style)?;

    root.present()?;
    Ok(())
}

/// Boxed list of the trailing-window averages, vertically centred.
fn draw_summary<DB>(
    area: &DrawingArea<DB, Shift>,
    chart: &RenderInstruction,
    style: &ChartStyle,
) -> anyhow::Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let lines = summary_lines(chart);
    let (w, h) = area.dim_in_pixel();
    let line_h = style.pt(9.0 * 1.6) as i32;
    let pad = style.pt(6.0) as i32;
    let block = line_h * lines.len() as i32;
    let top = (h as i32 - block) / 2;

    area.draw(&Rectangle::new(
        [(pad, top - pad), (w as i32 - pad, top + block + pad)],
        BLACK.stroke_width(1),
    ))?;
    let font = ("monospace", style.pt(9.0)).into_font();
    for (i, line) in lines.iter().enumerate() {
        area.draw(&Text::new(
            line.as_str(),
            (pad * 2, top + i as i32 * line_h),
            font.clone(),
        ))?;
    }
    Ok(())
}
