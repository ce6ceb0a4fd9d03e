use anyhow::Result;
use crossterm::{
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
};
use roster_chat::TranscriptEntry;
use roster_dashboard::{ProblemCard, QuickAction, StatCard};
use roster_viz::{ChartKind, ChartView, ResultPresenter, ResultView, SeriesPoint};
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Color scheme for terminal output.
struct Colors;

impl Colors {
    const USER_PROMPT: Color = Color::Green;
    const ASSISTANT_TEXT: Color = Color::Cyan;
    const QUERY: Color = Color::Yellow;
    const VALUE: Color = Color::White;
    const ERROR: Color = Color::Red;
    const DIM: Color = Color::DarkGrey;
    const HEADER: Color = Color::Magenta;
}

/// Widest bar drawn for the largest value in a series.
const BAR_WIDTH: usize = 30;

/// Terminal rendering for the dashboard and chat views.
pub struct Terminal;

impl Terminal {
    pub fn new() -> Self {
        Self
    }

    /// Print the startup banner.
    pub fn print_banner(&self, base_url: &str) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::HEADER),
            Print("roster-cli"),
            ResetColor,
            Print(" - Provider Data Quality Analytics\n"),
            SetForegroundColor(Colors::DIM),
            Print(format!("Query service: {}\n", base_url)),
            Print("Type 'exit' or 'quit' to end.\n"),
            Print("---\n"),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }

    /// Read a line of user input with prompt.
    /// Returns None if the user wants to exit or stdin is closed.
    pub fn read_input(&self) -> Result<Option<String>> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            Print("\n"),
            SetForegroundColor(Colors::USER_PROMPT),
            Print("ask> "),
            ResetColor,
        )?;
        stdout.flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            return Ok(None);
        }
        let trimmed = input.trim();

        if trimmed == "exit" || trimmed == "quit" {
            return Ok(None);
        }

        Ok(Some(trimmed.to_string()))
    }

    pub fn print_stat_cards(&self, cards: &[StatCard]) -> Result<()> {
        let mut stdout = io::stdout();
        for card in cards {
            execute!(
                stdout,
                SetForegroundColor(Colors::DIM),
                Print(format!("{:<18}", card.title)),
                SetForegroundColor(Colors::VALUE),
                Print(format!("{:>10}", card.value)),
                SetForegroundColor(Colors::DIM),
                Print(format!("  {}\n", card.subtitle)),
                ResetColor,
            )?;
        }
        stdout.flush()?;
        Ok(())
    }

    pub fn print_problem_card(&self, card: &ProblemCard) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            Print("\n"),
            SetForegroundColor(Colors::HEADER),
            Print(format!("{}\n", card.title)),
            SetForegroundColor(Colors::DIM),
            Print(format!("{}\n", card.description)),
            ResetColor,
        )?;
        for metric in &card.metrics {
            execute!(stdout, Print(format!("  {:<22}{}\n", metric.label, metric.value)))?;
        }
        self.print_chart(&card.chart)
    }

    /// A titled breakdown series, drawn as bars.
    pub fn print_series(&self, title: &str, points: &[SeriesPoint]) -> Result<()> {
        let chart = if points.is_empty() {
            ChartView::NoData
        } else {
            ChartView::Series {
                kind: ChartKind::Bar,
                points: points.to_vec(),
            }
        };
        let mut stdout = io::stdout();
        execute!(
            stdout,
            Print("\n"),
            SetForegroundColor(Colors::HEADER),
            Print(format!("{}\n", title)),
            ResetColor,
        )?;
        self.print_chart(&chart)
    }

    pub fn print_chart(&self, chart: &ChartView) -> Result<()> {
        let mut stdout = io::stdout();
        for line in chart_lines(chart) {
            execute!(
                stdout,
                SetForegroundColor(Colors::ASSISTANT_TEXT),
                Print(format!("  {}\n", line)),
                ResetColor,
            )?;
        }
        stdout.flush()?;
        Ok(())
    }

    pub fn print_quick_actions(&self, actions: &[QuickAction]) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            Print("\n"),
            SetForegroundColor(Colors::HEADER),
            Print("Quick actions\n"),
            ResetColor,
        )?;
        for action in actions {
            execute!(
                stdout,
                Print(format!("  {:<24}", action.label)),
                SetForegroundColor(Colors::DIM),
                Print(format!("roster-cli ask \"{}\"\n", action.question)),
                ResetColor,
            )?;
        }
        stdout.flush()?;
        Ok(())
    }

    /// Print one transcript entry.
    pub fn print_entry(&self, entry: &TranscriptEntry) -> Result<()> {
        let mut stdout = io::stdout();
        let time = entry.timestamp().format("%H:%M:%S");
        let (color, prefix) = match entry {
            TranscriptEntry::User { .. } => (Colors::USER_PROMPT, "you"),
            TranscriptEntry::Assistant { .. } => (Colors::ASSISTANT_TEXT, "roster"),
            TranscriptEntry::Error { .. } => (Colors::ERROR, "error"),
        };
        execute!(
            stdout,
            SetForegroundColor(Colors::DIM),
            Print(format!("[{}] ", time)),
            SetForegroundColor(color),
            Print(format!("{}: {}\n", prefix, entry.content())),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }

    /// Print the generated query, the table and a chart of the leading rows.
    pub fn print_result(&self, presenter: &ResultPresenter) -> Result<()> {
        let mut stdout = io::stdout();
        match presenter.view() {
            ResultView::Empty { generated_query } => {
                self.print_query(generated_query)?;
                execute!(
                    stdout,
                    SetForegroundColor(Colors::DIM),
                    Print("No results found\n"),
                    ResetColor,
                )?;
            }
            ResultView::Table { generated_query, table } => {
                self.print_query(generated_query)?;
                execute!(stdout, Print(format!("{}", table)))?;
                self.print_chart(&presenter.chart(ChartKind::Bar))?;
            }
        }
        stdout.flush()?;
        Ok(())
    }

    fn print_query(&self, sql: &str) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::QUERY),
            Print(format!("SQL: {}\n", sql)),
            ResetColor,
        )?;
        Ok(())
    }

    pub fn print_samples(&self, samples: &[&str]) -> Result<()> {
        let mut stdout = io::stdout();
        for (i, q) in samples.iter().enumerate() {
            execute!(stdout, Print(format!("{:>2}. {}\n", i + 1, q)))?;
        }
        stdout.flush()?;
        Ok(())
    }

    /// Show a spinner/waiting indicator. Returns a handle to stop it.
    pub fn start_spinner(&self, message: &str) -> Result<SpinnerHandle> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::DIM),
            Print(format!("{} ", message)),
            ResetColor,
        )?;
        stdout.flush()?;

        let running = Arc::new(AtomicBool::new(true));
        let running_clone = running.clone();

        let handle = std::thread::spawn(move || {
            let frames = ['|', '/', '-', '\\'];
            let mut i = 0;
            while running_clone.load(Ordering::SeqCst) {
                let mut stdout = io::stdout();
                execute!(
                    stdout,
                    SetForegroundColor(Colors::DIM),
                    Print(format!("\r{} ", frames[i % frames.len()])),
                    ResetColor,
                )
                .ok();
                stdout.flush().ok();
                i += 1;
                std::thread::sleep(std::time::Duration::from_millis(100));
            }
            let mut stdout = io::stdout();
            execute!(stdout, Print("\r  \r")).ok();
            stdout.flush().ok();
        });

        Ok(SpinnerHandle {
            running,
            thread: Some(handle),
        })
    }

    /// Print an error message.
    pub fn print_error(&self, msg: &str) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::ERROR),
            Print(format!("Error: {}\n", msg)),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }

    /// Print an info message.
    pub fn print_info(&self, msg: &str) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::DIM),
            Print(format!("{}\n", msg)),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }
}

/// Handle to a running spinner. Stops on drop.
pub struct SpinnerHandle {
    running: Arc<AtomicBool>,
    thread: Option<std::thread::JoinHandle<()>>,
}

impl SpinnerHandle {
    /// Stop the spinner and wait for the line to be cleared.
    pub fn stop(mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(thread) = self.thread.take() {
            thread.join().ok();
        }
    }
}

impl Drop for SpinnerHandle {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

/// Text rendering of a chart: bars scaled to the largest magnitude, or pie
/// slices as shares of the total.
fn chart_lines(chart: &ChartView) -> Vec<String> {
    let (kind, points) = match chart {
        ChartView::NoData => return vec!["(no data)".to_string()],
        ChartView::Series { kind, points } => (*kind, points),
    };
    let label_width = points.iter().map(|p| p.name.chars().count()).max().unwrap_or(0);

    match kind {
        ChartKind::Bar => {
            let max = points.iter().map(|p| p.value.abs()).fold(0.0, f64::max);
            points
                .iter()
                .map(|p| {
                    let len = if max > 0.0 {
                        (p.value.abs() / max * BAR_WIDTH as f64).round() as usize
                    } else {
                        0
                    };
                    format!(
                        "{:<lw$} | {} {}",
                        p.name,
                        "#".repeat(len),
                        format_value(p.value),
                        lw = label_width
                    )
                })
                .collect()
        }
        ChartKind::Pie => {
            let total: f64 = points.iter().map(|p| p.value).sum();
            points
                .iter()
                .map(|p| {
                    format!(
                        "{:<lw$}  {:>5.1}%  ({})",
                        p.name,
                        p.value / total * 100.0,
                        format_value(p.value),
                        lw = label_width
                    )
                })
                .collect()
        }
    }
}

/// Whole numbers without a fraction, everything else to one decimal.
fn format_value(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{}", v as i64)
    } else {
        format!("{:.1}", v)
    }
}
