use std::fmt::Write;

use crate::api::models::CrowdAnalysis;

use super::view::{AnalysisView, PageView};

pub const ALERT_COLOR: &str = "#ff6b6b";
pub const ALERT_BACKGROUND: &str = "#ffe0e0";
pub const NORMAL_COLOR: &str = "#51cf66";
pub const NORMAL_BACKGROUND: &str = "#e6ffed";
pub const FAILURE_COLOR: &str = "#c53030";
const PENDING_COLOR: &str = "#718096";

pub fn status_colors(analysis: &CrowdAnalysis) -> (&'static str, &'static str) {
    if analysis.is_high_crowd() {
        (ALERT_COLOR, ALERT_BACKGROUND)
    } else {
        (NORMAL_COLOR, NORMAL_BACKGROUND)
    }
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// The analysis output fragment, as it appears on the web page.
pub fn analysis_html(analysis: &AnalysisView) -> String {
    match analysis {
        AnalysisView::Empty => String::new(),
        AnalysisView::Pending => {
            format!("<p style=\"color: {PENDING_COLOR};\">🔄 Analyzing crowd...</p>")
        }
        AnalysisView::Failed(error) => format!(
            "<p style=\"color: {FAILURE_COLOR};\">❌ {}</p>",
            escape_html(error)
        ),
        AnalysisView::Report { message, analysis } => {
            let (color, background) = status_colors(analysis);
            format!(
                "<div class=\"analysis-card\" style=\"background: {background}; border-left: 4px solid {color};\">\
                 <h3 style=\"color: {color}; margin-bottom: 1rem;\">{message}</h3>\
                 <div class=\"analysis-grid\">\
                 <div class=\"analysis-item\"><span class=\"label\">👥 People Count</span><span class=\"value\">{count}</span></div>\
                 <div class=\"analysis-item\"><span class=\"label\">📊 Density</span><span class=\"value\">{density}%</span></div>\
                 <div class=\"analysis-item\"><span class=\"label\">🆓 Free Space</span><span class=\"value\">{free_space}%</span></div>\
                 <div class=\"analysis-item\"><span class=\"label\">⚠️ Status</span><span class=\"value\" style=\"color: {color}; font-weight: bold;\">{status}</span></div>\
                 </div></div>",
                message = escape_html(message),
                count = analysis.count,
                density = analysis.density,
                free_space = analysis.free_space,
                status = escape_html(&analysis.status),
            )
        }
    }
}

/// Plain-text rendering of the page for the terminal.
pub fn render_text(view: &PageView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "[{}]", view.server_status.label());
    if let Some(result) = &view.result {
        let _ = writeln!(out, "({}) {}", result.kind.as_str(), result.message);
    }

    if view.form_visible {
        let state = if view.submit.enabled { "" } else { " (busy)" };
        let _ = writeln!(out, "Camera URL form: {}{state}", view.submit.label);
    }

    if view.camera_visible {
        let _ = writeln!(out, "Camera: {}", view.camera_label);
        let _ = writeln!(out, "Status: {}", view.camera_status);
        if let Some(source) = &view.stream_source {
            let _ = writeln!(out, "Source: {source}");
        }
        if let Some(frame) = &view.frame {
            let _ = writeln!(
                out,
                "Frame: {} bytes ({} loaded)",
                frame.len(),
                view.frames_loaded
            );
        }
        let _ = writeln!(
            out,
            "Actions: {} | {} | ⏹ Stop",
            view.capture.label, view.analyze.label
        );
    }

    if let Some(debug) = &view.probe_debug {
        let _ = writeln!(out, "{debug}");
    }

    match &view.analysis {
        AnalysisView::Empty => {}
        AnalysisView::Pending => {
            let _ = writeln!(out, "🔄 Analyzing crowd...");
        }
        AnalysisView::Failed(error) => {
            let _ = writeln!(out, "❌ {error}");
        }
        AnalysisView::Report { message, analysis } => {
            let marker = if analysis.is_high_crowd() { "!!" } else { "ok" };
            let _ = writeln!(out, "{message}");
            let _ = writeln!(out, "  👥 People Count: {}", analysis.count);
            let _ = writeln!(out, "  📊 Density: {}%", analysis.density);
            let _ = writeln!(out, "  🆓 Free Space: {}%", analysis.free_space);
            let _ = writeln!(out, "  ⚠️ Status: {} [{marker}]", analysis.status);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use crate::{
        api::models::CrowdAnalysis,
        page::view::{AnalysisView, PageView},
    };

    use super::{ALERT_COLOR, FAILURE_COLOR, NORMAL_COLOR, analysis_html, render_text};

    fn report(status: &str) -> AnalysisView {
        AnalysisView::Report {
            message: "OK".to_string(),
            analysis: CrowdAnalysis {
                count: 5,
                density: 40.0,
                free_space: 60.0,
                status: status.to_string(),
            },
        }
    }

    #[test]
    fn low_crowd_report_uses_normal_color() {
        let html = analysis_html(&report("LOW CROWD"));

        assert!(html.contains("<span class=\"value\">5</span>"));
        assert!(html.contains("<span class=\"value\">40%</span>"));
        assert!(html.contains("<span class=\"value\">60%</span>"));
        assert!(html.contains(&format!("color: {NORMAL_COLOR}; font-weight: bold;\">LOW CROWD")));
        assert!(!html.contains(ALERT_COLOR));
    }

    #[test]
    fn high_crowd_report_uses_alert_color() {
        let html = analysis_html(&report("HIGH CROWD"));

        assert!(html.contains(&format!("color: {ALERT_COLOR}; font-weight: bold;\">HIGH CROWD")));
        assert!(!html.contains(NORMAL_COLOR));
    }

    #[test]
    fn failure_renders_error_text_without_grid() {
        let html = analysis_html(&AnalysisView::Failed("bad url".to_string()));

        assert!(html.contains("❌ bad url"));
        assert!(html.contains(FAILURE_COLOR));
        assert!(!html.contains("analysis-grid"));
    }

    #[test]
    fn fractional_density_keeps_its_decimals() {
        let html = analysis_html(&AnalysisView::Report {
            message: "🚨 12 people".to_string(),
            analysis: CrowdAnalysis {
                count: 12,
                density: 52.37,
                free_space: 47.63,
                status: "HIGH CROWD".to_string(),
            },
        });
        assert!(html.contains("52.37%"));
        assert!(html.contains("47.63%"));
    }

    #[test]
    fn text_render_shows_form_until_camera_opens() {
        let mut view = PageView::new();
        let text = render_text(&view);
        assert!(text.contains("Camera URL form"));
        assert!(!text.contains("Camera: "));

        view.show_camera();
        view.camera_label = "http://cam".to_string();
        let text = render_text(&view);
        assert!(text.contains("Camera: http://cam"));
        assert!(!text.contains("Camera URL form"));
    }
}
