//! Headless runner: ticks a walkthrough on an interval and drives the scene
//! from line commands read on stdin.

use anyhow::Result;
use std::io::{self, BufRead, BufReader};
use std::str::FromStr;
use std::thread;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::definition::LoadedWalkthrough;
use crate::scene::Scene;
use crate::spatial::Vec3;
use crate::walkthrough::Walkthrough;

/// One line of runner input
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Next,
    Prev,
    Goto(usize),
    Click(String),
    Activate(String),
    Deactivate(String),
    Track(String),
    Lose(String),
    Move { transform: String, to: Vec3 },
    Face { transform: String, to: Vec3 },
    Status,
    Quit,
}

#[derive(Debug, Error, PartialEq)]
pub enum CommandError {
    #[error("empty command")]
    Empty,

    #[error("unknown command '{0}' (try: next, prev, goto, click, activate, deactivate, track, lose, move, face, status, quit)")]
    Unknown(String),

    #[error("usage: {0}")]
    Usage(&'static str),

    #[error("'{0}' is not a number")]
    Number(String),
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let verb = words.next().ok_or(CommandError::Empty)?;
        let args: Vec<&str> = words.collect();

        let name = |usage: &'static str| -> Result<String, CommandError> {
            match args.as_slice() {
                [name] => Ok((*name).to_string()),
                _ => Err(CommandError::Usage(usage)),
            }
        };
        let vector = |usage: &'static str| -> Result<(String, Vec3), CommandError> {
            match args.as_slice() {
                [name, x, y, z] => Ok(((*name).to_string(), Vec3::new(num(x)?, num(y)?, num(z)?))),
                _ => Err(CommandError::Usage(usage)),
            }
        };

        let command = match verb.to_ascii_lowercase().as_str() {
            "next" | "n" => Command::Next,
            "prev" | "p" => Command::Prev,
            "goto" => match args.as_slice() {
                [index] => Command::Goto(
                    index
                        .parse()
                        .map_err(|_| CommandError::Number((*index).to_string()))?,
                ),
                _ => return Err(CommandError::Usage("goto <step>")),
            },
            "click" => Command::Click(name("click <button>")?),
            "activate" => Command::Activate(name("activate <entity>")?),
            "deactivate" => Command::Deactivate(name("deactivate <entity>")?),
            "track" => Command::Track(name("track <proxy>")?),
            "lose" => Command::Lose(name("lose <proxy>")?),
            "move" => {
                let (transform, to) = vector("move <transform> <x> <y> <z>")?;
                Command::Move { transform, to }
            }
            "face" => {
                let (transform, to) = vector("face <transform> <x> <y> <z>")?;
                Command::Face { transform, to }
            }
            "status" | "s" => Command::Status,
            "quit" | "exit" | "q" => Command::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(command)
    }
}

fn num(text: &str) -> Result<f32, CommandError> {
    text.parse()
        .map_err(|_| CommandError::Number(text.to_string()))
}

/// What the loop should do after a command
#[derive(Debug, PartialEq)]
pub enum Outcome {
    Continue,
    Quit,
}

pub struct Runner {
    walkthrough: Walkthrough,
    scene: Scene,
    tick_rate: Duration,
    reported_revision: Option<u64>,
}

impl Runner {
    pub fn new(loaded: LoadedWalkthrough, tick_rate: Duration) -> Self {
        Self {
            walkthrough: loaded.walkthrough,
            scene: loaded.scene,
            tick_rate,
            reported_revision: None,
        }
    }

    pub fn walkthrough(&self) -> &Walkthrough {
        &self.walkthrough
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Apply one command. Scene lookups that miss are reported, not fatal.
    pub fn apply(&mut self, command: Command) -> Result<Outcome, String> {
        match command {
            Command::Next => self.walkthrough.next_step(),
            Command::Prev => self.walkthrough.previous_step(),
            Command::Goto(index) => self.walkthrough.skip_to_step(index, false),
            Command::Click(name) => self.lookup(self.scene.button(&name), "button", &name)?.click(),
            Command::Activate(name) => self
                .lookup(self.scene.entity(&name), "entity", &name)?
                .set_active(true),
            Command::Deactivate(name) => self
                .lookup(self.scene.entity(&name), "entity", &name)?
                .set_active(false),
            Command::Track(name) => self
                .lookup(self.scene.proxy(&name), "proxy", &name)?
                .set_tracking(true),
            Command::Lose(name) => self
                .lookup(self.scene.proxy(&name), "proxy", &name)?
                .set_tracking(false),
            Command::Move { transform, to } => self
                .lookup(self.scene.transform(&transform), "transform", &transform)?
                .set_position(to),
            Command::Face { transform, to } => self
                .lookup(self.scene.transform(&transform), "transform", &transform)?
                .set_forward(to),
            Command::Status => {
                // Force the next report
                self.reported_revision = None;
            }
            Command::Quit => return Ok(Outcome::Quit),
        }
        Ok(Outcome::Continue)
    }

    fn lookup<T>(&self, found: Option<T>, kind: &str, name: &str) -> Result<T, String> {
        found.ok_or_else(|| format!("no {} named '{}'", kind, name))
    }

    /// One status line for the current step
    pub fn status_line(&self) -> String {
        if self.walkthrough.is_empty() {
            return format!("[{}] no steps", self.walkthrough.name());
        }
        if self.walkthrough.is_finished() {
            return format!("[{}] finished", self.walkthrough.name());
        }

        let step = &self.walkthrough.steps()[self.walkthrough.display_step()];
        let mut line = format!(
            "[{}] {}: {}",
            self.walkthrough.name(),
            self.walkthrough.progress_label(),
            step.description()
        );

        let pending: Vec<String> = step
            .pending_trigger_kinds()
            .iter()
            .map(ToString::to_string)
            .collect();
        if !pending.is_empty() {
            line.push_str(&format!(" (waiting on: {})", pending.join(", ")));
        }
        line
    }

    /// Status line, if the walkthrough changed since the last report
    pub fn report(&mut self) -> Option<String> {
        let revision = self.walkthrough.revision();
        if self.reported_revision == Some(revision) {
            return None;
        }
        self.reported_revision = Some(revision);
        Some(self.status_line())
    }

    /// Tick until `quit`, end of input or Ctrl-C
    pub async fn run(mut self, mut commands: mpsc::UnboundedReceiver<String>) -> Result<()> {
        tracing::info!(
            walkthrough = %self.walkthrough.name(),
            tick_ms = self.tick_rate.as_millis() as u64,
            "Runner started"
        );

        let mut interval = tokio::time::interval(self.tick_rate);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        // Armed once so a signal during command handling is not lost
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.walkthrough.tick();
                }
                line = commands.recv() => {
                    let Some(line) = line else {
                        tracing::debug!("Command input closed");
                        self.walkthrough.tick();
                        self.print_report();
                        break;
                    };
                    if line.trim().is_empty() {
                        continue;
                    }
                    match line.parse::<Command>() {
                        Ok(command) => {
                            tracing::debug!(?command, "Runner command");
                            match self.apply(command) {
                                Ok(Outcome::Quit) => break,
                                Ok(Outcome::Continue) => {}
                                Err(message) => eprintln!("{}", message),
                            }
                        }
                        Err(e) => eprintln!("{}", e),
                    }
                }
                _ = &mut ctrl_c => {
                    tracing::info!("Interrupted");
                    break;
                }
            }
            self.print_report();
        }

        tracing::info!(
            finished = self.walkthrough.is_finished(),
            step = self.walkthrough.current_step(),
            "Runner stopped"
        );
        Ok(())
    }

    fn print_report(&mut self) {
        if let Some(line) = self.report() {
            println!("{}", line);
        }
    }
}

/// Forward stdin lines into a channel until EOF.
///
/// Reads on a detached thread so a pending read never holds up shutdown.
pub fn spawn_stdin_reader(tx: mpsc::UnboundedSender<String>) -> thread::JoinHandle<()> {
    spawn_line_reader(BufReader::new(io::stdin()), tx)
}

/// Forward lines from `input` into a channel until EOF or the receiver is gone
pub fn spawn_line_reader<R>(input: R, tx: mpsc::UnboundedSender<String>) -> thread::JoinHandle<()>
where
    R: BufRead + Send + 'static,
{
    thread::spawn(move || {
        for line in input.lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to read command");
                    break;
                }
            }
        }
    })
}
