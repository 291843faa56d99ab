use crate::view::ResultsPanel;

/// Clean HTML content using the ammonia library.
///
/// Whitelist-based: safe tags like <ul> and <a href> survive, scripts, event
/// attributes and `javascript:` links are stripped. `class` is kept so the
/// page stylesheet still applies to the fragment.
pub fn clean_html(input: &str) -> String {
    ammonia::Builder::default()
        .add_generic_attributes(["class"])
        .clean(input)
        .to_string()
}

/// Renders the results panel as an HTML fragment.
///
/// Every server-provided string is escaped with `clean_text` before it is
/// placed in markup, and the assembled fragment goes through `clean_html`.
pub fn render_results_html(panel: &ResultsPanel) -> String {
    let esc = ammonia::clean_text;
    let mut html = String::from("<div class=\"results\">");

    if let Some(message) = &panel.message {
        html.push_str(&format!("<p>{}</p>", esc(message)));
    }

    if let Some(url) = &panel.download_url {
        html.push_str(&format!(
            "<p><a href=\"{}\">Download calendar (.ics)</a></p>",
            esc(url)
        ));
    }

    let counters = [
        ("Scheduled", panel.scheduled),
        ("Unscheduled", panel.unscheduled),
        ("Courses", panel.courses_count),
        ("PDFs processed", panel.pdfs_processed),
        ("Calendar events", panel.calendar_events_count),
    ];
    let shown: Vec<String> = counters
        .iter()
        .filter_map(|(label, value)| value.map(|v| format!("<li>{}: {}</li>", label, v)))
        .collect();
    if !shown.is_empty() {
        html.push_str(&format!("<ul class=\"stats\">{}</ul>", shown.concat()));
    }

    if !panel.items.is_empty() {
        html.push_str("<ol class=\"assignments\">");
        for item in &panel.items {
            html.push_str("<li>");
            html.push_str(&esc(&item.name));
            if let Some(class_name) = &item.class_name {
                html.push_str(&format!(" ({})", esc(class_name)));
            }
            if let Some(due) = &item.due_date {
                html.push_str(&format!(", due {}", esc(due)));
            }
            if let Some(hours) = &item.hours {
                html.push_str(&format!(": {} h", esc(hours)));
            }
            html.push_str("</li>");
        }
        html.push_str("</ol>");
    }

    html.push_str("</div>");
    clean_html(&html)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::ResultItem;

    #[test]
    fn test_results_html_keeps_class_hooks() {
        let panel = ResultsPanel {
            scheduled: Some(2),
            items: vec![ResultItem {
                name: "Essay".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        };

        let html = render_results_html(&panel);
        assert!(html.contains("class=\"results\""));
        assert!(html.contains("class=\"stats\""));
        assert!(html.contains("class=\"assignments\""));
    }

    #[test]
    fn test_results_html_strips_script_and_handlers() {
        let html = clean_html("<p class=\"x\" onclick=\"evil()\">hi<script>alert(1)</script></p>");
        assert!(html.contains("class=\"x\""));
        assert!(!html.contains("onclick"));
        assert!(!html.contains("script"));
    }
}
