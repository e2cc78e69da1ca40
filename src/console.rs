//! Line-oriented command layer used by the binary
//!
//! Parses one command per line and renders replies as text or JSON. The
//! session never touches stdin or stdout itself; the caller feeds lines in
//! and prints whatever comes back.

use anyhow::Context;
use regex::Regex;
use serde_json::json;

use crate::error::{PredictorError, Result};
use crate::rating::League;
use crate::types::{Prediction, Standing, Truncation};

pub const USAGE: &str = "Commands: 'input Name(a) - Name(b)', 'predict Name - Name', \
                         'stats Name', 'overview', 'exit'";

const PREDICTION_BANNER: &str = "\n************ (Prediction) ************\n";
const OVERVIEW_BANNER: &str = "\n************ (Log Base 2) ************\n";

/// A parsed console command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Record a played match
    Input {
        name_a: String,
        score_a: u32,
        name_b: String,
        score_b: u32,
    },
    Predict {
        name: String,
        opponent: String,
    },
    Stats {
        name: String,
    },
    Overview,
    Exit,
}

/// Regex-backed parser for the console grammar
#[derive(Debug, Clone)]
pub struct CommandParser {
    input: Regex,
    predict: Regex,
    stats: Regex,
}

impl CommandParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            input: Regex::new(r"^input (.+)\((\d+)\) - (.+)\((\d+)\)$")?,
            predict: Regex::new(r"^predict (.+) - (.+)$")?,
            stats: Regex::new(r"^stats (.+)$")?,
        })
    }

    /// Parse one line; `Ok(None)` when it matches no command
    pub fn parse(&self, line: &str) -> Result<Option<Command>> {
        let line = line.trim();

        match line.to_lowercase().as_str() {
            "overview" => return Ok(Some(Command::Overview)),
            "exit" => return Ok(Some(Command::Exit)),
            _ => {}
        }

        if let Some(captures) = self.input.captures(line) {
            return Ok(Some(Command::Input {
                name_a: captures[1].to_string(),
                score_a: parse_score(&captures[2])?,
                name_b: captures[3].to_string(),
                score_b: parse_score(&captures[4])?,
            }));
        }

        if let Some(captures) = self.predict.captures(line) {
            return Ok(Some(Command::Predict {
                name: captures[1].to_string(),
                opponent: captures[2].to_string(),
            }));
        }

        if let Some(captures) = self.stats.captures(line) {
            return Ok(Some(Command::Stats {
                name: captures[1].to_string(),
            }));
        }

        Ok(None)
    }
}

fn parse_score(text: &str) -> Result<u32> {
    text.parse::<u32>()
        .with_context(|| format!("Score out of range: {}", text))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// What the caller should do after a line was handled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Silent,
    Text(String),
    Exit,
}

/// A league plus the state needed to answer console commands
#[derive(Debug)]
pub struct Session {
    league: League,
    parser: CommandParser,
    truncation: Truncation,
    format: OutputFormat,
}

impl Session {
    pub fn new(league: League, truncation: Truncation, format: OutputFormat) -> Result<Self> {
        Ok(Self {
            league,
            parser: CommandParser::new()?,
            truncation,
            format,
        })
    }

    pub fn league(&self) -> &League {
        &self.league
    }

    pub fn handle_line(&mut self, line: &str) -> Result<Response> {
        if line.trim().is_empty() {
            return Ok(Response::Silent);
        }

        match self.parser.parse(line)? {
            Some(command) => self.execute(command),
            None => Ok(Response::Text(USAGE.to_string())),
        }
    }

    pub fn execute(&mut self, command: Command) -> Result<Response> {
        match command {
            Command::Input {
                name_a,
                score_a,
                name_b,
                score_b,
            } => {
                self.league.add_result(&name_a, score_a, &name_b, score_b)?;
                Ok(Response::Silent)
            }
            Command::Predict { name, opponent } => {
                self.refresh();
                let prediction = self
                    .league
                    .predict(&name, &opponent, self.truncation)
                    .ok_or_else(|| self.unknown(&[name.as_str(), opponent.as_str()]))?;
                self.render_prediction(&prediction).map(Response::Text)
            }
            Command::Stats { name } => {
                self.refresh();
                let competitor = self
                    .league
                    .lookup(&name)
                    .ok_or_else(|| self.unknown(&[name.as_str()]))?;

                let text = match self.format {
                    OutputFormat::Text => format!(
                        "{} {:.6} {:.6}",
                        competitor.name(),
                        competitor.attack(),
                        competitor.defence()
                    ),
                    OutputFormat::Json => serde_json::to_string_pretty(&json!({
                        "name": competitor.name(),
                        "attack": competitor.attack(),
                        "defence": competitor.defence(),
                        "matches": competitor.matches().len(),
                    }))?,
                };
                Ok(Response::Text(text))
            }
            Command::Overview => {
                let report = self.league.fit();
                let standings = self.league.standings(&report.clusters);
                self.render_overview(&standings).map(Response::Text)
            }
            Command::Exit => Ok(Response::Exit),
        }
    }

    fn refresh(&mut self) {
        if self.league.is_stale() {
            self.league.fit();
        }
    }

    fn unknown(&self, names: &[&str]) -> anyhow::Error {
        let missing = names
            .iter()
            .find(|name| self.league.lookup(name).is_none())
            .or(names.first())
            .map(|name| name.to_string())
            .unwrap_or_default();

        PredictorError::UnknownCompetitor { name: missing }.into()
    }

    fn render_prediction(&self, prediction: &Prediction) -> Result<String> {
        if self.format == OutputFormat::Json {
            return Ok(serde_json::to_string_pretty(prediction)?);
        }

        let mut text = String::from(PREDICTION_BANNER);
        for outcome in &prediction.outcomes {
            let label = format!(
                "{}({}) - {}({})",
                prediction.competitor, outcome.score, prediction.opponent, outcome.opponent_score
            );
            text.push_str(&format!("{:<30}{:>8.1}%\n", label, outcome.probability * 100.0));
        }
        text.push_str(&format!(
            "{:.0}% - {:.0}% - {:.0}%",
            prediction.win * 100.0,
            prediction.draw * 100.0,
            prediction.loss * 100.0
        ));

        Ok(text)
    }

    fn render_overview(&self, standings: &[Vec<Standing>]) -> Result<String> {
        if self.format == OutputFormat::Json {
            return Ok(serde_json::to_string_pretty(standings)?);
        }

        let mut text = String::new();
        for cluster in standings {
            text.push_str(OVERVIEW_BANNER);
            for standing in cluster {
                text.push_str(&format!("{:<30}{:>8.2}\n", standing.name, standing.score));
            }
        }

        Ok(text)
    }
}
