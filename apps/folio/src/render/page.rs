//! Paginated export artifact.
//!
//! `render` is a pure function from a resume to a page list; it mirrors the
//! document model 1:1 in section order and never fails. Empty fields and
//! sections simply do not appear. `render_json` accepts untrusted JSON and
//! coerces it through `normalize` first, so absent or wrong-typed fields
//! degrade to empty rather than erroring.

use serde::Serialize;
use serde_json::Value;

use crate::models::resume::{normalize, Resume};
use crate::render::metrics::{CharMetricTable, PageConfig, BODY_FONT};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    Title,
    Heading,
    SubHeading,
    Body,
    Bullet,
    /// Wrapped continuation of a bullet line.
    Continuation,
    Blank,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportLine {
    pub kind: LineKind,
    pub text: String,
}

impl ExportLine {
    fn new(kind: LineKind, text: impl Into<String>) -> Self {
        ExportLine {
            kind,
            text: text.into(),
        }
    }

    fn blank() -> Self {
        ExportLine::new(LineKind::Blank, "")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportPage {
    pub number: usize,
    pub lines: Vec<ExportLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportDocument {
    pub title: String,
    pub pages: Vec<ExportPage>,
}

impl ExportDocument {
    /// Plain-text projection of the artifact, one form feed between pages.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for page in &self.pages {
            if page.number > 1 {
                out.push('\x0c');
                out.push('\n');
            }
            for line in &page.lines {
                match line.kind {
                    LineKind::Heading => out.push_str(&line.text.to_uppercase()),
                    LineKind::Bullet => {
                        out.push_str("  • ");
                        out.push_str(&line.text);
                    }
                    LineKind::Continuation => {
                        out.push_str("    ");
                        out.push_str(&line.text);
                    }
                    _ => out.push_str(&line.text),
                }
                out.push('\n');
            }
        }
        out
    }
}

/// Renders one resume as a paginated document.
pub fn render(resume: &Resume, config: &PageConfig) -> ExportDocument {
    let lines = layout_lines(resume, config);
    let pages = paginate(lines, config.lines_per_page);
    ExportDocument {
        title: resume.display_title.clone(),
        pages,
    }
}

/// Renders untrusted JSON: the payload is normalized against the blank
/// template first, so any malformed field degrades to empty.
pub fn render_json(raw: &Value, config: &PageConfig) -> ExportDocument {
    render(&normalize(raw, &Resume::blank()), config)
}

// ── Line layout ─────────────────────────────────────────────────────────────

fn layout_lines(resume: &Resume, config: &PageConfig) -> Vec<ExportLine> {
    let metrics = &BODY_FONT;
    let mut lines: Vec<ExportLine> = Vec::new();

    // Header block: name, role, contact.
    let name = if resume.header_name.is_empty() {
        &resume.display_title
    } else {
        &resume.header_name
    };
    if !name.is_empty() {
        lines.push(ExportLine::new(LineKind::Title, name.as_str()));
    }
    if !resume.header_role.is_empty() {
        lines.push(ExportLine::new(
            LineKind::SubHeading,
            resume.header_role.as_str(),
        ));
    }
    let contact_parts: Vec<&str> = [
        resume.contact.location.as_str(),
        resume.contact.phone.as_str(),
        resume.contact.email.as_str(),
        resume.contact.linkedin_url.as_str(),
    ]
    .into_iter()
    .filter(|part| !part.is_empty())
    .collect();
    if !contact_parts.is_empty() {
        push_wrapped(
            &mut lines,
            LineKind::Body,
            &contact_parts.join(" | "),
            metrics,
            config.text_width_em,
        );
    }

    if !resume.summary.is_empty() {
        push_heading(&mut lines, "Summary");
        push_wrapped(
            &mut lines,
            LineKind::Body,
            &resume.summary,
            metrics,
            config.text_width_em,
        );
    }

    if !resume.experience_entries.is_empty() {
        push_heading(&mut lines, "Experience");
        for entry in &resume.experience_entries {
            let role_line = join_nonempty(&[&entry.role, &entry.company], " · ");
            if !role_line.is_empty() {
                lines.push(ExportLine::new(LineKind::SubHeading, role_line));
            }
            let meta_line = join_nonempty(&[&entry.location, &entry.period], " · ");
            if !meta_line.is_empty() {
                lines.push(ExportLine::new(LineKind::Body, meta_line));
            }
            for highlight in &entry.highlights {
                push_bullet(&mut lines, highlight, metrics, config);
            }
        }
    }

    if !resume.education_entries.is_empty() {
        push_heading(&mut lines, "Education");
        for entry in &resume.education_entries {
            if !entry.institution.is_empty() {
                lines.push(ExportLine::new(
                    LineKind::SubHeading,
                    entry.institution.as_str(),
                ));
            }
            let detail = join_nonempty(&[&entry.degree, &entry.period], " · ");
            if !detail.is_empty() {
                lines.push(ExportLine::new(LineKind::Body, detail));
            }
        }
    }

    if !resume.skill_groups.is_empty() {
        push_heading(&mut lines, "Skills");
        for (label, skills) in &resume.skill_groups {
            let listed: Vec<&str> = skills
                .iter()
                .map(String::as_str)
                .filter(|s| !s.is_empty())
                .collect();
            let text = if listed.is_empty() {
                label.clone()
            } else {
                format!("{label}: {}", listed.join(", "))
            };
            push_wrapped(
                &mut lines,
                LineKind::Body,
                &text,
                metrics,
                config.text_width_em,
            );
        }
    }

    if !resume.languages.is_empty() {
        push_heading(&mut lines, "Languages");
        for entry in &resume.languages {
            let text = join_nonempty(&[&entry.language, &entry.proficiency], " · ");
            if !text.is_empty() {
                lines.push(ExportLine::new(LineKind::Body, text));
            }
        }
    }

    if !resume.certifications.is_empty() {
        push_heading(&mut lines, "Certifications");
        for cert in &resume.certifications {
            if !cert.is_empty() {
                push_bullet(&mut lines, cert, metrics, config);
            }
        }
    }

    if !resume.publications.is_empty() {
        push_heading(&mut lines, "Publications");
        for publication in &resume.publications {
            let text = join_nonempty(&[&publication.title, &publication.url], " · ");
            if !text.is_empty() {
                push_wrapped(
                    &mut lines,
                    LineKind::Body,
                    &text,
                    metrics,
                    config.text_width_em,
                );
            }
        }
    }

    lines
}

fn push_heading(lines: &mut Vec<ExportLine>, title: &str) {
    if !lines.is_empty() {
        lines.push(ExportLine::blank());
    }
    lines.push(ExportLine::new(LineKind::Heading, title));
}

fn push_wrapped(
    lines: &mut Vec<ExportLine>,
    kind: LineKind,
    text: &str,
    metrics: &CharMetricTable,
    width_em: f32,
) {
    for segment in wrap_text(text, metrics, width_em) {
        lines.push(ExportLine::new(kind, segment));
    }
}

fn push_bullet(
    lines: &mut Vec<ExportLine>,
    text: &str,
    metrics: &CharMetricTable,
    config: &PageConfig,
) {
    let width = config.text_width_em - config.bullet_indent_em;
    for (i, segment) in wrap_text(text, metrics, width).into_iter().enumerate() {
        let kind = if i == 0 {
            LineKind::Bullet
        } else {
            LineKind::Continuation
        };
        lines.push(ExportLine::new(kind, segment));
    }
}

fn join_nonempty(parts: &[&String], separator: &str) -> String {
    parts
        .iter()
        .filter(|part| !part.is_empty())
        .map(|part| part.as_str())
        .collect::<Vec<_>>()
        .join(separator)
}

/// Greedy word-wrap: words accumulate onto a line until the next word would
/// exceed the width, then a new line starts. A single word wider than the
/// line gets a line of its own.
fn wrap_text(text: &str, metrics: &CharMetricTable, width_em: f32) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_width = 0.0_f32;

    for word in text.split_whitespace() {
        let word_width = metrics.measure_str(word);
        if !current.is_empty() && current_width + metrics.space_width + word_width > width_em {
            lines.push(std::mem::take(&mut current));
            current_width = 0.0;
        }
        if current.is_empty() {
            current.push_str(word);
            current_width = word_width;
        } else {
            current.push(' ');
            current.push_str(word);
            current_width += metrics.space_width + word_width;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

// ── Pagination ──────────────────────────────────────────────────────────────

fn is_heading(line: &ExportLine) -> bool {
    matches!(line.kind, LineKind::Heading | LineKind::SubHeading)
}

fn paginate(lines: Vec<ExportLine>, lines_per_page: usize) -> Vec<ExportPage> {
    let lines_per_page = lines_per_page.max(1);
    let mut pages: Vec<Vec<ExportLine>> = Vec::new();
    let mut current: Vec<ExportLine> = Vec::new();

    for line in lines {
        // No page opens with blank spacing.
        if current.is_empty() && line.kind == LineKind::Blank {
            continue;
        }
        current.push(line);
        if current.len() == lines_per_page {
            // A heading stranded at the bottom of a page moves to the next.
            let mut carried: Vec<ExportLine> = Vec::new();
            while current.len() > 1 && current.last().is_some_and(is_heading) {
                carried.extend(current.pop());
            }
            while current.last().is_some_and(|l| l.kind == LineKind::Blank) {
                current.pop();
            }
            pages.push(std::mem::take(&mut current));
            carried.reverse();
            current = carried;
        }
    }

    if !current.is_empty() || pages.is_empty() {
        pages.push(current);
    }

    pages
        .into_iter()
        .enumerate()
        .map(|(i, lines)| ExportPage {
            number: i + 1,
            lines,
        })
        .collect()
}
