use jobwatch_common::{ExtractedDetails, FeedEntry};

/// Render a Telegram (HTML parse mode) notification for one job.
///
/// Layout: title, then any extracted details, then the publication date and
/// the apply link. Absent details are left out entirely.
pub fn format_message(entry: &FeedEntry, details: &ExtractedDetails) -> String {
    let mut lines = vec![format!("🩺 <b>{}</b>", escape_html(&entry.title))];

    let fields = [
        ("🏥", "Employer", &details.employer),
        ("🔬", "Specialty", &details.specialty),
        ("💷", "Salary", &details.salary),
        ("📍", "Location", &details.location),
    ];
    for (icon, label, value) in fields {
        if let Some(value) = value {
            lines.push(format!("{icon} {label}: {}", escape_html(value)));
        }
    }

    lines.push(format!("📅 Published: {}", entry.published_display()));
    lines.push(format!(
        "🔗 <a href=\"{}\">Link to apply</a>",
        escape_html(&entry.link).replace('"', "&quot;")
    ));

    lines.join("\n")
}

/// Telegram's HTML mode only requires these three to be escaped.
fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
