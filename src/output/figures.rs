use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use eyre::{Result, WrapErr};
use plotly::common::{Line, Mode, Title};
use plotly::layout::Axis;
use plotly::{Layout, Plot, Scatter};
use quick_xml::escape::escape;
use serde_derive::Serialize;

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.12.1.min.js";

/// A line of a panel
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trace {
    pub name: String,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub color: Option<String>,
}

impl Trace {
    pub fn new(name: impl Into<String>, x: Vec<f64>, y: Vec<f64>) -> Self {
        Trace {
            name: name.into(),
            x,
            y,
            color: None,
        }
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

/// A single plot of a figure
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Panel {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub x_range: Option<(f64, f64)>,
    pub log_x: bool,
    pub traces: Vec<Trace>,
}

impl Panel {
    pub fn new(title: impl Into<String>, x_label: impl Into<String>, y_label: impl Into<String>) -> Self {
        Panel {
            title: title.into(),
            x_label: x_label.into(),
            y_label: y_label.into(),
            x_range: None,
            log_x: false,
            traces: Vec::new(),
        }
    }

    pub fn x_range(mut self, min: f64, max: f64) -> Self {
        self.x_range = Some((min, max));
        self
    }

    pub fn log_x(mut self) -> Self {
        self.log_x = true;
        self
    }

    pub fn add_trace(&mut self, trace: Trace) {
        self.traces.push(trace);
    }

    fn plot(&self) -> Plot {
        let mut plot = Plot::new();
        for trace in &self.traces {
            let mut line = Line::new();
            if let Some(color) = &trace.color {
                line = line.color(color.clone());
            }
            let scatter = Scatter::new(trace.x.clone(), trace.y.clone())
                .name(&trace.name)
                .mode(Mode::Lines)
                .line(line);
            plot.add_trace(scatter);
        }

        let mut x_axis = Axis::new().title(Title::with_text(&self.x_label));
        if let Some((min, max)) = self.x_range {
            x_axis = x_axis.range(vec![min, max]);
        }
        if self.log_x {
            x_axis = x_axis.type_(plotly::layout::AxisType::Log);
        }
        let layout = Layout::new()
            .title(Title::with_text(&self.title))
            .x_axis(x_axis)
            .y_axis(Axis::new().title(Title::with_text(&self.y_label)))
            .show_legend(true)
            .height(450);
        plot.set_layout(layout);
        plot
    }
}

/// A named collection of panels written as a single HTML page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    pub sid: String,
    pub title: String,
    pub panels: Vec<Panel>,
}

impl Figure {
    pub fn new(sid: impl Into<String>, title: impl Into<String>) -> Self {
        Figure {
            sid: sid.into(),
            title: title.into(),
            panels: Vec::new(),
        }
    }

    pub fn with_panels(mut self, panels: Vec<Panel>) -> Self {
        self.panels = panels;
        self
    }

    pub fn add_panel(&mut self, panel: Panel) {
        self.panels.push(panel);
    }

    pub fn ntraces(&self) -> usize {
        self.panels.iter().map(|panel| panel.traces.len()).sum()
    }

    pub fn to_html(&self) -> Result<String, std::fmt::Error> {
        let title = escape(&self.title);
        let mut html = String::new();
        writeln!(html, "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\"/>")?;
        writeln!(html, "<title>{title}</title>")?;
        writeln!(html, "<script src=\"{PLOTLY_CDN}\"></script>\n</head>\n<body>")?;
        writeln!(html, "<h1>{title}</h1>")?;
        for (k, panel) in self.panels.iter().enumerate() {
            let div_id = format!("{}_{}", self.sid, k);
            writeln!(
                html,
                "<div style=\"display:inline-block;width:32%\">{}</div>",
                panel.plot().to_inline_html(Some(div_id.as_str()))
            )?;
        }
        writeln!(html, "</body>\n</html>")?;
        Ok(html)
    }

    /// Writes the figure to `<dir>/<prefix>_<sid>.html`
    pub fn write(&self, dir: &Path, prefix: &str) -> Result<PathBuf> {
        let path = dir.join(format!("{}_{}.html", prefix, self.sid));
        let html = self.to_html().wrap_err("Could not render figure")?;
        fs::write(&path, html)
            .wrap_err_with(|| format!("Could not write figure {}", path.display()))?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_contains_all_panels() {
        let mut panel = Panel::new("Plasma", "Time [hr]", "Empagliflozin [µM]").x_range(0.0, 24.0);
        panel.add_trace(Trace::new("25 mg", vec![0.0, 1.0, 2.0], vec![0.0, 0.3, 0.2]).color("black"));
        let figure = Figure::new("Fig1", "Test (Healthy)").with_panels(vec![panel.clone(), panel]);
        let html = figure.to_html().unwrap();
        assert_eq!(figure.ntraces(), 2);
        assert!(html.contains(PLOTLY_CDN));
        assert!(html.contains("Fig1_0"));
        assert!(html.contains("Fig1_1"));
        assert!(html.contains("Test (Healthy)"));
    }

    #[test]
    fn titles_are_escaped() {
        let figure = Figure::new("Fig2", "Emp <25 mg> & placebo");
        let html = figure.to_html().unwrap();
        assert!(html.contains("<h1>Emp &lt;25 mg&gt; &amp; placebo</h1>"));
        assert!(!html.contains("<25 mg>"));
    }
}
