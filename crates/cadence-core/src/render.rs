use std::io::{self, IsTerminal, Write};

use unicode_width::UnicodeWidthStr;

use crate::bucket::PostSummary;
use crate::config::Config;
use crate::grid::{CalendarCell, weeks};
use crate::post::ContentPost;

const WEEKDAY_LABELS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
const CELL_WIDTH: usize = 6;

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(cfg: &Config) -> anyhow::Result<Self> {
        let color = cfg.get_bool("color")?.unwrap_or(true);
        Ok(Self {
            color: color && io::stdout().is_terminal(),
        })
    }

    pub fn plain() -> Self {
        Self { color: false }
    }

    #[tracing::instrument(skip(self, cells))]
    pub fn print_month(&mut self, title: &str, cells: &[CalendarCell<'_>]) -> anyhow::Result<()> {
        self.write_month(io::stdout().lock(), title, cells)
    }

    #[tracing::instrument(skip(self, posts))]
    pub fn print_posts(&mut self, title: &str, posts: &[&ContentPost]) -> anyhow::Result<()> {
        self.write_posts(io::stdout().lock(), title, posts)
    }

    pub fn print_line(&mut self, text: &str) -> anyhow::Result<()> {
        writeln!(io::stdout().lock(), "{text}")?;
        Ok(())
    }

    /// Writes without a newline and flushes, for output that grows in place.
    pub fn print_fragment(&mut self, text: &str) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        write!(out, "{text}")?;
        out.flush()?;
        Ok(())
    }

    pub fn print_summary(&mut self, summary: &PostSummary) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        writeln!(
            out,
            "{} posts: {} draft, {} scheduled, {} published, {} failed",
            summary.total, summary.draft, summary.scheduled, summary.published, summary.failed
        )?;
        Ok(())
    }

    /// Month grid, one row per week. Days with posts show their count.
    pub fn write_month<W: Write>(
        &self,
        mut out: W,
        title: &str,
        cells: &[CalendarCell<'_>],
    ) -> anyhow::Result<()> {
        writeln!(out, "{title}")?;
        for label in WEEKDAY_LABELS {
            write!(out, "{label:<width$}", width = CELL_WIDTH)?;
        }
        writeln!(out)?;

        for week in weeks(cells) {
            for cell in week {
                let text = match cell {
                    CalendarCell::Empty => String::new(),
                    CalendarCell::Day { day_number, posts } if posts.is_empty() => {
                        day_number.to_string()
                    }
                    CalendarCell::Day { day_number, posts } => {
                        self.paint(&format!("{day_number}*{}", posts.len()), "1")
                    }
                };
                let visible = UnicodeWidthStr::width(strip_ansi(&text).as_str());
                write!(out, "{text}{}", " ".repeat(CELL_WIDTH.saturating_sub(visible)))?;
            }
            writeln!(out)?;
        }

        Ok(())
    }

    pub fn write_posts<W: Write>(
        &self,
        mut out: W,
        title: &str,
        posts: &[&ContentPost],
    ) -> anyhow::Result<()> {
        writeln!(out, "{title}")?;
        if posts.is_empty() {
            writeln!(out, "No posts.")?;
            return Ok(());
        }

        let headers = vec![
            "ID".to_string(),
            "When".to_string(),
            "Status".to_string(),
            "Platforms".to_string(),
            "Type".to_string(),
            "Title".to_string(),
        ];

        let rows = posts
            .iter()
            .map(|post| {
                let when = post
                    .effective_date()
                    .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| "-".to_string());
                let status = post.status.style();
                let platforms = post
                    .platforms
                    .iter()
                    .map(|platform| platform.style().icon)
                    .collect::<Vec<_>>()
                    .join(",");

                vec![
                    post.id.clone(),
                    when,
                    self.paint(status.label, status.ansi),
                    platforms,
                    post.content_type.style().label.to_string(),
                    post.title.clone(),
                ]
            })
            .collect();

        write_table(&mut out, headers, rows)
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

fn write_table<W: Write>(
    mut writer: W,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
) -> anyhow::Result<()> {
    let column_count = headers.len();
    let mut widths = vec![0usize; column_count];

    for (idx, header) in headers.iter().enumerate() {
        widths[idx] = widths[idx].max(UnicodeWidthStr::width(header.as_str()));
    }

    for row in &rows {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(UnicodeWidthStr::width(strip_ansi(cell).as_str()));
        }
    }

    for (header, width) in headers.iter().zip(&widths) {
        write!(writer, "{header:width$} ", width = *width)?;
    }
    writeln!(writer)?;

    for width in &widths {
        write!(writer, "{:-<width$} ", "", width = *width)?;
    }
    writeln!(writer)?;

    for row in rows {
        for (cell, width) in row.iter().zip(&widths) {
            let visible_width = UnicodeWidthStr::width(strip_ansi(cell).as_str());
            let padding = width.saturating_sub(visible_width);
            write!(writer, "{}{} ", cell, " ".repeat(padding))?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut escaped = false;

    for ch in s.chars() {
        if escaped {
            if ch == 'm' {
                escaped = false;
            }
            continue;
        }

        if ch == '\x1b' {
            escaped = true;
            continue;
        }

        out.push(ch);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::{Renderer, strip_ansi};
    use crate::config::Config;
    use crate::grid::build_month_grid;
    use crate::post::{ContentPost, ContentType, Platform, PostStatus};

    #[test]
    fn month_output_has_header_and_one_line_per_week() {
        let cells = build_month_grid(2024, 1);
        let mut out = Vec::new();
        Renderer::plain()
            .write_month(&mut out, "February 2024", &cells)
            .expect("render");

        let text = String::from_utf8(out).expect("utf8");
        let lines = text.lines().collect::<Vec<_>>();
        assert_eq!(lines[0], "February 2024");
        assert!(lines[1].starts_with("Sun"));
        assert_eq!(lines.len(), 2 + cells.len() / 7);
        assert!(text.contains("29"));
    }

    #[test]
    fn post_table_aligns_columns() {
        let post = ContentPost::new(
            "1",
            "Café opening",
            ContentType::Image,
            vec![Platform::Instagram, Platform::Twitter],
            PostStatus::Draft,
        );
        let mut out = Vec::new();
        Renderer::plain()
            .write_posts(&mut out, "List View", &[&post])
            .expect("render");

        let text = String::from_utf8(out).expect("utf8");
        assert!(text.contains("IG,TW"));
        assert!(text.contains("Café opening"));
        assert!(text.contains(" - "));
    }

    #[test]
    fn color_setting_uses_config_booleans() {
        let mut cfg = Config::defaults();
        cfg.apply_overrides([("color".to_string(), "y".to_string())]);
        assert!(Renderer::new(&cfg).is_ok());

        cfg.apply_overrides([("color".to_string(), "off".to_string())]);
        assert!(!Renderer::new(&cfg).expect("renderer").color);

        cfg.apply_overrides([("color".to_string(), "sometimes".to_string())]);
        assert!(Renderer::new(&cfg).is_err());
    }

    #[test]
    fn strip_ansi_removes_escape_sequences() {
        assert_eq!(strip_ansi("\x1b[31mlate\x1b[0m"), "late");
    }
}
