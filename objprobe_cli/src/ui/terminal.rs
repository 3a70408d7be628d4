use std::fmt::Write as _;
use std::io::{stdout, Stdout, Write};

use async_trait::async_trait;
use crossterm::{
    cursor::MoveToColumn,
    queue,
    style::{Print, Stylize},
    terminal::{Clear, ClearType},
};
use log::debug;
use objprobe_core::{Console, ConsoleError, MenuGroup};
use tokio::io::{self, AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::watch;

/// Ctrl+C presses counted by one listener that lives as long as the console.
///
/// A press that lands while nobody waits (during a save, between two status
/// updates) is kept until the next [`Interrupts::next`].
struct Interrupts {
    presses: watch::Receiver<u64>,
}

impl Interrupts {
    fn listen() -> Self {
        let (tx, presses) = watch::channel(0);
        forward_interrupts(tx);
        Self { presses }
    }

    /// Resolves once for every press not yet taken.
    async fn next(&mut self) {
        if self.presses.changed().await.is_err() {
            // no listener, so no press will ever come
            std::future::pending::<()>().await;
        }
    }
}

/// Installs the handler right away and counts presses on a background task.
#[cfg(unix)]
fn forward_interrupts(tx: watch::Sender<u64>) {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigint = match signal(SignalKind::interrupt()) {
        Ok(sigint) => sigint,
        Err(e) => {
            log::warn!("Cannot listen for Ctrl+C: {}", e);
            return;
        }
    };
    tokio::spawn(async move {
        while sigint.recv().await.is_some() {
            debug!("Ctrl+C");
            tx.send_modify(|n| *n += 1);
        }
    });
}

#[cfg(not(unix))]
fn forward_interrupts(tx: watch::Sender<u64>) {
    tokio::spawn(async move {
        while let Ok(()) = tokio::signal::ctrl_c().await {
            debug!("Ctrl+C");
            tx.send_modify(|n| *n += 1);
        }
    });
}

/// Line-based console on stdin/stdout.
///
/// Input stays in cooked mode so the operator can edit answers normally.
/// Ctrl+C is caught from construction on. At a prompt it closes the console
/// (the menu exits cleanly). While a check runs it only stops the check.
/// Must be created inside the tokio runtime.
pub struct TerminalConsole {
    lines: Lines<BufReader<Stdin>>,
    interrupts: Interrupts,
    out: Stdout,
    status_title: Option<String>,
}

impl Default for TerminalConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalConsole {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(io::stdin()).lines(),
            interrupts: Interrupts::listen(),
            out: stdout(),
            status_title: None,
        }
    }

    pub fn intro(&mut self) {
        let _ = writeln!(self.out, "{}", " OBJPROBE ".bold().black().on_dark_yellow());
        let _ = writeln!(
            self.out,
            "{}\n",
            "── object storage connections & health ──".dark_yellow()
        );
        let _ = self.out.flush();
    }

    fn ask(&mut self, label: &str) {
        let _ = write!(self.out, "{} ", label.bold());
        let _ = self.out.flush();
    }

    async fn read_line(&mut self) -> Result<String, ConsoleError> {
        tokio::select! {
            line = self.lines.next_line() => match line? {
                Some(line) => Ok(line),
                None => Err(ConsoleError::Closed),
            },
            _ = self.interrupts.next() => {
                debug!("Ctrl+C at a prompt");
                let _ = writeln!(self.out);
                Err(ConsoleError::Closed)
            }
        }
    }
}

#[async_trait]
impl Console for TerminalConsole {
    async fn prompt_text(&mut self, label: &str) -> Result<String, ConsoleError> {
        loop {
            self.ask(label);
            let answer = self.read_line().await?;
            let answer = answer.trim();
            if !answer.is_empty() {
                return Ok(answer.to_string());
            }
        }
    }

    async fn confirm(&mut self, label: &str) -> Result<bool, ConsoleError> {
        loop {
            self.ask(&format!("{label} [y/n]"));
            match parse_yes_no(&self.read_line().await?) {
                Some(answer) => return Ok(answer),
                None => self.error("Please answer y or n."),
            }
        }
    }

    async fn select(&mut self, title: &str, groups: &[MenuGroup]) -> Result<usize, ConsoleError> {
        let _ = writeln!(self.out, "\n{}", title.bold());
        let mut number = 0;
        for group in groups {
            let _ = writeln!(self.out, "  {}", group.title.as_str().dark_grey());
            for item in &group.items {
                number += 1;
                let _ = writeln!(self.out, "    {} {item}", format!("{number:>2})").yellow());
            }
        }
        loop {
            self.ask(&format!("Choice [1-{number}]:"));
            match parse_choice(&self.read_line().await?, number) {
                Some(index) => return Ok(index),
                None => self.error(&format!("Pick a number between 1 and {number}.")),
            }
        }
    }

    async fn wait_for_stop(&mut self) -> Result<(), ConsoleError> {
        tokio::select! {
            line = self.lines.next_line() => match line? {
                Some(_) => Ok(()),
                None => Err(ConsoleError::Closed),
            },
            _ = self.interrupts.next() => Ok(()),
        }
    }

    fn begin_status(&mut self, title: &str) {
        self.status_title = Some(title.to_string());
        let _ = queue!(self.out, Print(format!("{} ", "◌".cyan())), Print(title.bold()));
        let _ = self.out.flush();
    }

    fn status(&mut self, text: &str) {
        let _ = queue!(
            self.out,
            MoveToColumn(0),
            Clear(ClearType::CurrentLine),
            Print(format!("{} ", "◌".cyan())),
            Print(text)
        );
        let _ = self.out.flush();
    }

    fn end_status(&mut self) {
        if self.status_title.take().is_some() {
            let _ = queue!(self.out, MoveToColumn(0), Clear(ClearType::CurrentLine));
            let _ = self.out.flush();
        }
    }

    fn table(&mut self, title: &str, headers: &[&str], rows: &[Vec<String>]) {
        let _ = writeln!(self.out, "\n{}", title.bold());
        let _ = writeln!(self.out, "{}", format_table(headers, rows));
    }

    fn text(&mut self, text: &str) {
        let _ = writeln!(self.out, "{}", text.green());
    }

    fn error(&mut self, text: &str) {
        let _ = writeln!(self.out, "{}", text.red());
    }
}

fn parse_yes_no(answer: &str) -> Option<bool> {
    match answer.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" | "true" => Some(true),
        "n" | "no" | "false" => Some(false),
        _ => None,
    }
}

/// `answer` is 1-based; the result is a 0-based index below `count`.
fn parse_choice(answer: &str, count: usize) -> Option<usize> {
    match answer.trim().parse::<usize>() {
        Ok(n) if (1..=count).contains(&n) => Some(n - 1),
        _ => None,
    }
}

/// Plain left-aligned columns sized to their widest cell.
fn format_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut output = String::new();
    write_row(&mut output, headers.iter().copied(), &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let _ = writeln!(output, "{}", rule.join("  "));
    for row in rows {
        write_row(&mut output, row.iter().map(String::as_str), &widths);
    }
    if rows.is_empty() {
        let _ = writeln!(output, "(no connections)");
    }

    output.trim_end().to_string()
}

fn write_row<'a>(output: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let padded: Vec<String> = cells
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect();
    let _ = writeln!(output, "{}", padded.join("  ").trim_end());
}
