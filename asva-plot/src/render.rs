//! Chart rendering
//!
//! `ChartRenderer` is the seam between layout and pixels. `SvgRenderer` is
//! a minimal renderer that writes the layout as a standalone SVG document.

use crate::layout::PlotLayout;
use asva_core::AsvaError;

/// Rendered chart bytes plus the file extension they belong under
#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub extension: &'static str,
    pub bytes: Vec<u8>,
}

pub trait ChartRenderer: Send + Sync {
    /// File extension of the produced charts, without the dot
    fn extension(&self) -> &'static str;

    fn render(&self, layout: &PlotLayout) -> Result<Chart, AsvaError>;
}

/// Pixels per inch of figure size
const DPI: f64 = 72.0;
const MARGIN_LEFT: f64 = 70.0;
const MARGIN_RIGHT: f64 = 15.0;
const MARGIN_TOP: f64 = 20.0;
const MARGIN_BOTTOM: f64 = 80.0;
const BOX_HALF_WIDTH: f64 = 0.4;

/// Minimal SVG renderer
#[derive(Debug, Clone, Copy, Default)]
pub struct SvgRenderer;

impl SvgRenderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render_svg(&self, layout: &PlotLayout) -> Result<String, AsvaError> {
        let (lo, hi) = layout.ylim;
        if !(hi > lo) {
            return Err(AsvaError::domain_error(format!(
                "empty y-range [{}, {}] for column '{}'",
                lo, hi, layout.column
            )));
        }

        let width = layout.figure_size.0 * DPI;
        let height = layout.figure_size.1 * DPI;
        let frame = Frame {
            left: MARGIN_LEFT,
            right: width - MARGIN_RIGHT,
            top: MARGIN_TOP,
            bottom: height - MARGIN_BOTTOM,
            n_boxes: layout.boxes.len().max(1) as f64,
            ylim: layout.ylim,
        };

        let mut out = String::new();
        out.push_str(&format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{:.0}\" height=\"{:.0}\" viewBox=\"0 0 {:.0} {:.0}\">\n",
            width, height, width, height
        ));
        out.push_str(&format!("<title>{}</title>\n", escape(&layout.column)));
        out.push_str("<rect width=\"100%\" height=\"100%\" fill=\"white\"/>\n");

        // Axes
        out.push_str(&format!(
            "<polyline points=\"{:.1},{:.1} {:.1},{:.1} {:.1},{:.1}\" fill=\"none\" stroke=\"black\" stroke-width=\"2\"/>\n",
            frame.left, frame.top, frame.left, frame.bottom, frame.right, frame.bottom
        ));
        out.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" font-size=\"16\" text-anchor=\"middle\" transform=\"rotate(-90 {:.1} {:.1})\">{}</text>\n",
            20.0,
            (frame.top + frame.bottom) / 2.0,
            20.0,
            (frame.top + frame.bottom) / 2.0,
            escape(&layout.column)
        ));

        for (i, stats) in layout.boxes.iter().enumerate() {
            let center = i as f64;
            let x0 = frame.x(center - BOX_HALF_WIDTH);
            let x1 = frame.x(center + BOX_HALF_WIDTH);
            let xc = frame.x(center);

            // Whiskers
            out.push_str(&line(xc, frame.y(stats.whisker_low), xc, frame.y(stats.q1)));
            out.push_str(&line(xc, frame.y(stats.q3), xc, frame.y(stats.whisker_high)));
            // Box
            out.push_str(&format!(
                "<rect x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\" fill=\"grey\" stroke=\"black\" stroke-width=\"2\"/>\n",
                x0,
                frame.y(stats.q3),
                x1 - x0,
                frame.y(stats.q1) - frame.y(stats.q3)
            ));
            out.push_str(&line(x0, frame.y(stats.median), x1, frame.y(stats.median)));
            // Strip overlay
            for &obs in &stats.observations {
                out.push_str(&format!(
                    "<circle cx=\"{:.1}\" cy=\"{:.1}\" r=\"6\" fill=\"white\" stroke=\"black\" stroke-width=\"1.5\"/>\n",
                    xc,
                    frame.y(obs)
                ));
            }
            // Tick label
            let label_y = frame.bottom + 16.0;
            out.push_str(&format!(
                "<text x=\"{:.1}\" y=\"{:.1}\" font-size=\"14\" text-anchor=\"end\" transform=\"rotate(-45 {:.1} {:.1})\">{}</text>\n",
                xc, label_y, xc, label_y, escape(&stats.label)
            ));
        }

        for marker in layout.quartile_markers.values() {
            let (xa, xb) = (frame.x(marker.x.0), frame.x(marker.x.1));
            out.push_str(&line(xa, frame.y(marker.q25), xb, frame.y(marker.q25)));
            out.push_str(&line(xa, frame.y(marker.q75), xb, frame.y(marker.q75)));
        }

        for bracket in &layout.brackets {
            let (xa, xb) = (frame.x(bracket.x.0), frame.x(bracket.x.1));
            let (yb, yt) = (frame.y(bracket.y_base), frame.y(bracket.y_top));
            out.push_str(&format!(
                "<polyline points=\"{:.1},{:.1} {:.1},{:.1} {:.1},{:.1} {:.1},{:.1}\" fill=\"none\" stroke=\"black\" stroke-width=\"2\"/>\n",
                xa, yb, xa, yt, xb, yt, xb, yb
            ));
            let weight = if bracket.annotation.significant { "bold" } else { "normal" };
            out.push_str(&format!(
                "<text x=\"{:.1}\" y=\"{:.1}\" font-size=\"12\" font-weight=\"{}\">{}</text>\n",
                frame.x(bracket.label_x),
                frame.y(bracket.label_y),
                weight,
                escape(&bracket.annotation.label())
            ));
        }

        out.push_str("</svg>\n");
        Ok(out)
    }
}

impl ChartRenderer for SvgRenderer {
    fn extension(&self) -> &'static str {
        "svg"
    }

    fn render(&self, layout: &PlotLayout) -> Result<Chart, AsvaError> {
        Ok(Chart {
            extension: self.extension(),
            bytes: self.render_svg(layout)?.into_bytes(),
        })
    }
}

/// Plot area in pixels, mapping box positions and data values
struct Frame {
    left: f64,
    right: f64,
    top: f64,
    bottom: f64,
    n_boxes: f64,
    ylim: (f64, f64),
}

impl Frame {
    fn x(&self, position: f64) -> f64 {
        let t = (position + 0.5) / self.n_boxes;
        self.left + t * (self.right - self.left)
    }

    fn y(&self, value: f64) -> f64 {
        let t = (value - self.ylim.0) / (self.ylim.1 - self.ylim.0);
        self.bottom - t * (self.bottom - self.top)
    }
}

fn line(x1: f64, y1: f64, x2: f64, y2: f64) -> String {
    format!(
        "<line x1=\"{:.1}\" y1=\"{:.1}\" x2=\"{:.1}\" y2=\"{:.1}\" stroke=\"black\" stroke-width=\"2\"/>\n",
        x1, y1, x2, y2
    )
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::AnnotationPlanner;
    use asva_core::{GroupSamples, PairwiseRecord, PairwiseTable};
    use asva_select::OmnibusP;

    fn layout() -> PlotLayout {
        let samples = GroupSamples::from_pairs([("a<1>", vec![1.0, 2.0, 3.0]), ("b", vec![4.0, 5.0, 6.0])]);
        let mut table = PairwiseTable::new();
        table.push(PairwiseRecord::new("a<1>", "b", -3.0, 0.01)).unwrap();
        let plan = AnnotationPlanner.plan(samples.groups(), &table, OmnibusP::NotApplicable).unwrap();
        PlotLayout::build("weight & height", &samples, &plan).unwrap()
    }

    #[test]
    fn test_svg_document() {
        let svg = SvgRenderer.render_svg(&layout()).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        // 3.5 x 9 inches
        assert!(svg.contains("width=\"252\" height=\"648\""));
        assert!(svg.contains("p=0.010"));
        assert!(svg.contains("font-weight=\"bold\""));
        assert_eq!(svg.matches("<circle").count(), 6);
    }

    #[test]
    fn test_svg_escapes_text() {
        let svg = SvgRenderer.render_svg(&layout()).unwrap();
        assert!(svg.contains("weight &amp; height"));
        assert!(svg.contains("a&lt;1&gt;"));
    }

    #[test]
    fn test_chart_extension() {
        let chart = SvgRenderer.render(&layout()).unwrap();
        assert_eq!(chart.extension, "svg");
        assert!(!chart.bytes.is_empty());
    }

    #[test]
    fn test_frame_mapping() {
        let frame = Frame {
            left: 0.0,
            right: 200.0,
            top: 0.0,
            bottom: 100.0,
            n_boxes: 2.0,
            ylim: (0.0, 10.0),
        };
        assert_eq!(frame.x(0.0), 50.0);
        assert_eq!(frame.x(1.0), 150.0);
        assert_eq!(frame.y(10.0), 0.0);
        assert_eq!(frame.y(0.0), 100.0);
    }
}
