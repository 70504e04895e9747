use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

use jobwatch_common::ExtractedDetails;

/// Wide enough that html2text never wraps a value onto a second line.
const RENDER_WIDTH: usize = 1024;

static MARKUP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</?[a-z][^>]*>").expect("valid regex"));

static EMPLOYER_RE: LazyLock<Regex> = LazyLock::new(|| label_re("employer"));
static SPECIALTY_RE: LazyLock<Regex> = LazyLock::new(|| label_re("specialt(?:y|ies)|speciality"));
static SALARY_RE: LazyLock<Regex> = LazyLock::new(|| label_re("salary"));
static LOCATION_RE: LazyLock<Regex> = LazyLock::new(|| label_re("location"));

/// `Label: value` up to the end of the line. html2text renders `<b>`/`<strong>`
/// as `**`, so emphasis markers around the label or colon are skipped.
fn label_re(label: &str) -> Regex {
    Regex::new(&format!(r"(?im)\b(?:{label})[*\t ]*:[*\t ]*([^\r\n]*)")).expect("valid regex")
}

/// Pull employer, specialty, salary and location out of a free-text summary.
/// Labels are matched case-insensitively; a missing or empty label leaves the field unset.
pub fn extract_details(summary: &str) -> ExtractedDetails {
    if summary.trim().is_empty() {
        return ExtractedDetails::default();
    }

    let text = strip_markup(summary);

    ExtractedDetails {
        employer: find_label(&EMPLOYER_RE, &text),
        specialty: find_label(&SPECIALTY_RE, &text),
        salary: find_label(&SALARY_RE, &text),
        location: find_label(&LOCATION_RE, &text),
    }
}

/// Render an HTML (or plain-text) summary as plain text with entities decoded.
pub fn strip_markup(text: &str) -> String {
    // Plain-text summaries separate labels with bare newlines, which HTML folds into spaces.
    let html: Cow<'_, str> = if MARKUP_RE.is_match(text) {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(text.replace("\r\n", "\n").replace('\n', "<br>"))
    };

    html2text::from_read(html.as_bytes(), RENDER_WIDTH)
        .unwrap_or_default()
        .trim_end()
        .to_string()
}

fn find_label(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| {
            m.as_str()
                .trim_matches(|c: char| c == '*' || c.is_whitespace())
                .to_string()
        })
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_labelled_fields() {
        let details = extract_details("Employer: Acme NHS Trust\nSalary: £40000");

        assert_eq!(details.employer.as_deref(), Some("Acme NHS Trust"));
        assert_eq!(details.salary.as_deref(), Some("£40000"));
        assert_eq!(details.specialty, None);
        assert_eq!(details.location, None);
    }

    #[test]
    fn labels_are_case_insensitive() {
        let details = extract_details("EMPLOYER: North Trust\nlocation:Leeds\nSpeciality: Paediatrics");

        assert_eq!(details.employer.as_deref(), Some("North Trust"));
        assert_eq!(details.location.as_deref(), Some("Leeds"));
        assert_eq!(details.specialty.as_deref(), Some("Paediatrics"));
    }

    #[test]
    fn strips_html_before_matching() {
        let summary = "<p><strong>Employer:</strong> Royal Free London</p>\
                       <p><b>Specialty:</b> General Surgery<br/>\
                       <b>Salary:</b> &pound;49,909 &ndash; &#163;55,329</p>";
        let details = extract_details(summary);

        assert_eq!(details.employer.as_deref(), Some("Royal Free London"));
        assert_eq!(details.specialty.as_deref(), Some("General Surgery"));
        assert_eq!(details.salary.as_deref(), Some("£49,909 – £55,329"));
        assert_eq!(details.location, None);
    }

    #[test]
    fn empty_and_label_free_input() {
        assert!(extract_details("").is_empty());
        assert!(extract_details("   ").is_empty());
        assert!(extract_details("A great opportunity to join our team.").is_empty());
    }

    #[test]
    fn empty_label_value_is_absent() {
        let details = extract_details("Employer:\nLocation: Hull");
        assert_eq!(details.employer, None);
        assert_eq!(details.location.as_deref(), Some("Hull"));
    }

    #[test]
    fn value_runs_to_end_of_line() {
        let details = extract_details("Location: Leicester Royal Infirmary, Leicester\r\nMore text");
        assert_eq!(
            details.location.as_deref(),
            Some("Leicester Royal Infirmary, Leicester")
        );
    }

    #[test]
    fn decodes_named_entities() {
        let details = extract_details(
            "Employer: &ldquo;St Mary&rsquo;s&rdquo; H&ocirc;pital\nSpecialty: M&eacute;decine g&eacute;n&eacute;rale",
        );

        assert_eq!(
            details.employer.as_deref(),
            Some("\u{201c}St Mary\u{2019}s\u{201d} H\u{f4}pital")
        );
        assert_eq!(details.specialty.as_deref(), Some("M\u{e9}decine g\u{e9}n\u{e9}rale"));
    }

    #[test]
    fn emphasised_values_are_unwrapped() {
        let details = extract_details("<p>Location: <b>Bristol</b></p><p><em>Salary</em>: &euro;60k</p>");

        assert_eq!(details.location.as_deref(), Some("Bristol"));
        assert_eq!(details.salary.as_deref(), Some("\u{20ac}60k"));
    }

    #[test]
    fn long_values_are_not_wrapped() {
        let employer = "Very Long Named University Hospitals NHS Foundation Trust ".repeat(4);
        let details = extract_details(&format!("<p>Employer: {employer}</p>"));

        assert_eq!(details.employer.as_deref(), Some(employer.trim()));
    }

    #[test]
    fn unknown_entities_are_kept() {
        assert_eq!(strip_markup("A &bogus; B &amp; C"), "A &bogus; B & C");
    }
}
