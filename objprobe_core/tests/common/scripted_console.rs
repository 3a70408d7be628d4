//! A `Console` driven by a fixed list of answers.
//!
//! Each prompt pops the next `Reply`; a reply of the wrong kind panics so a
//! test that drifts out of step fails loudly. An exhausted script behaves like
//! a closed stdin. Everything written is kept for assertions.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::time::Instant;

use async_trait::async_trait;
use objprobe_core::{Console, ConsoleError, MenuGroup};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    Confirm(bool),
    Select(usize),
}

pub fn text(s: &str) -> Reply {
    Reply::Text(s.into())
}

#[derive(Debug, Default)]
pub struct ScriptedConsole {
    script: VecDeque<Reply>,
    /// `wait_for_stop` resolves this long after it is first awaited;
    /// `None` never resolves.
    pub stop_after: Option<Duration>,
    stop_deadline: Option<Instant>,

    pub prompts: Vec<String>,
    pub select_titles: Vec<String>,
    pub select_groups: Vec<Vec<MenuGroup>>,
    pub statuses: Vec<String>,
    pub tables: Vec<(String, Vec<String>, Vec<Vec<String>>)>,
    pub texts: Vec<String>,
    pub errors: Vec<String>,
}

impl ScriptedConsole {
    pub fn new(script: impl IntoIterator<Item = Reply>) -> Self {
        Self {
            script: script.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }

    fn next(&mut self) -> Result<Reply, ConsoleError> {
        self.script.pop_front().ok_or(ConsoleError::Closed)
    }
}

#[async_trait]
impl Console for ScriptedConsole {
    async fn prompt_text(&mut self, label: &str) -> Result<String, ConsoleError> {
        self.prompts.push(label.into());
        match self.next()? {
            Reply::Text(s) => Ok(s),
            other => panic!("prompt {label:?} got {other:?}"),
        }
    }

    async fn confirm(&mut self, label: &str) -> Result<bool, ConsoleError> {
        self.prompts.push(label.into());
        match self.next()? {
            Reply::Confirm(b) => Ok(b),
            other => panic!("confirm {label:?} got {other:?}"),
        }
    }

    async fn select(&mut self, title: &str, groups: &[MenuGroup]) -> Result<usize, ConsoleError> {
        self.select_titles.push(title.into());
        self.select_groups.push(groups.to_vec());
        match self.next()? {
            Reply::Select(i) => Ok(i),
            other => panic!("select {title:?} got {other:?}"),
        }
    }

    async fn wait_for_stop(&mut self) -> Result<(), ConsoleError> {
        let Some(after) = self.stop_after else {
            return std::future::pending().await;
        };
        // the command loop re-creates this future on every probe event
        let deadline = *self.stop_deadline.get_or_insert_with(|| Instant::now() + after);
        tokio::time::sleep_until(deadline).await;
        self.stop_deadline = None;
        Ok(())
    }

    fn begin_status(&mut self, title: &str) {
        self.statuses.push(title.into());
    }

    fn status(&mut self, text: &str) {
        self.statuses.push(text.into());
    }

    fn end_status(&mut self) {}

    fn table(&mut self, title: &str, headers: &[&str], rows: &[Vec<String>]) {
        self.tables.push((
            title.into(),
            headers.iter().map(|h| h.to_string()).collect(),
            rows.to_vec(),
        ));
    }

    fn text(&mut self, text: &str) {
        self.texts.push(text.into());
    }

    fn error(&mut self, text: &str) {
        self.errors.push(text.into());
    }
}
