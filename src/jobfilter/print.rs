use colored::{ColoredString, Colorize};
use jobfilter::api::{FieldFilterEntry, NonFieldFilterEntry};
use jobfilter::model::Job;
use jobfilter::registry::{FilterRegistry, MatchType};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const STATUS_WIDTH: usize = 12;
const SYMBOL_WIDTH: usize = 10;
const NAME_WIDTH: usize = 40;
const HIDDEN_MARKER: &str = "·";

pub(super) fn print_query(query: &str) {
    println!("{}", query);
}

/// One line per job. With `all`, hidden jobs are listed too, dimmed.
pub(super) fn print_jobs(jobs: &[(&Job, bool)], all: bool) {
    let visible = jobs.iter().filter(|(_, shown)| *shown).count();

    for (job, shown) in jobs {
        if !shown && !all {
            continue;
        }
        let marker = if *shown { " " } else { HIDDEN_MARKER };
        let status = job.result_status();
        let status_col = pad_to_width(status, STATUS_WIDTH);
        let symbol = job.job_type_symbol.as_deref().unwrap_or("-");
        let name = job
            .job_type_name
            .as_deref()
            .or(job.ref_data_name.as_deref())
            .unwrap_or("");
        let name = truncate_to_width(name, NAME_WIDTH);
        let platform = job.platform_label().unwrap_or_default();

        let rest = format!(
            "{:>8}  {}  {}  {}",
            job.id,
            pad_to_width(symbol, SYMBOL_WIDTH),
            pad_to_width(&name, NAME_WIDTH),
            platform
        );
        let rest = rest.trim_end();

        if *shown {
            println!("{} {}{}", marker, color_status(status, &status_col), rest);
        } else {
            println!("{} {}{}", marker, status_col.dimmed(), rest.dimmed());
        }
    }

    println!(
        "{}",
        format!("{} of {} jobs shown", visible, jobs.len()).dimmed()
    );
}

pub(super) fn print_fields(registry: &FilterRegistry) {
    let width = registry
        .dimensions()
        .iter()
        .map(|d| d.name.width())
        .max()
        .unwrap_or(0);

    for dim in registry.dimensions() {
        println!(
            "{}  {}  {}",
            pad_to_width(dim.name, width).bold(),
            pad_to_width(match_label(dim.match_type), 14).dimmed(),
            dim.display_name
        );
        for choice in &dim.choices {
            println!("{}  {:>2} {}", " ".repeat(width), choice.id, choice.name);
        }
    }
    println!(
        "{}",
        format!("keys are stored as {}<field>", registry.prefix()).dimmed()
    );
}

pub(super) fn print_filters(fields: &[FieldFilterEntry], others: &[NonFieldFilterEntry]) {
    if fields.is_empty() && others.is_empty() {
        println!("No active filters.");
        return;
    }

    let width = fields
        .iter()
        .map(|e| e.field_name.width())
        .chain(others.iter().map(|e| e.field.width()))
        .max()
        .unwrap_or(0);

    for entry in fields {
        println!(
            "{}  {}",
            pad_to_width(&entry.field_name, width).bold(),
            entry.display_value
        );
    }
    for entry in others {
        println!(
            "{}  {}",
            pad_to_width(&entry.field, width).bold(),
            entry.value.cyan()
        );
    }
}

fn match_label(match_type: MatchType) -> &'static str {
    match match_type {
        MatchType::ExactString => "exact",
        MatchType::Substring => "substring",
        MatchType::AllSubstrings => "all terms",
        MatchType::Choice => "choice",
    }
}

fn color_status(status: &str, text: &str) -> ColoredString {
    match status {
        "success" => text.green(),
        "testfailed" => text.yellow(),
        "busted" => text.red(),
        "exception" => text.magenta(),
        "retry" | "usercancel" => text.cyan(),
        "superseded" | "runnable" => text.dimmed(),
        _ => text.normal(),
    }
}

fn pad_to_width(s: &str, width: usize) -> String {
    let padding = width.saturating_sub(s.width());
    format!("{}{}", s, " ".repeat(padding))
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }

    let mut result = String::new();
    let mut current_width = 0;
    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            result.push('…');
            return result;
        }
        result.push(c);
        current_width += char_width;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_by_display_width() {
        assert_eq!(pad_to_width("ab", 4), "ab  ");
        assert_eq!(pad_to_width("日本", 6), "日本  ");
        assert_eq!(pad_to_width("toolong", 3), "toolong");
    }

    #[test]
    fn truncates_with_ellipsis() {
        assert_eq!(truncate_to_width("short", 10), "short");
        assert_eq!(truncate_to_width("abcdefgh", 5), "abcd…");
    }
}
