use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::Duration;

use crate::config::Config;
use crate::definition::LoadedWalkthrough;
use crate::scene::Scene;
use crate::spatial::Vec3;
use crate::ui::{FocusedPanel, HelpDialog, WalkthroughMenu};
use crate::walkthrough::Walkthrough;

/// Distance a transform moves per key press
const NUDGE_STEP: f32 = 0.25;
/// Degrees a transform turns per key press
const TURN_STEP: f32 = 15.0;

pub struct App {
    config: Config,
    walkthrough: Walkthrough,
    scene: Scene,
    menu: WalkthroughMenu,
    help_dialog: HelpDialog,
    should_quit: bool,
}

impl App {
    pub fn new(config: Config, loaded: LoadedWalkthrough) -> Self {
        let menu = WalkthroughMenu::new(&loaded.walkthrough, &loaded.scene);
        Self {
            config,
            walkthrough: loaded.walkthrough,
            scene: loaded.scene,
            menu,
            help_dialog: HelpDialog::new(),
            should_quit: false,
        }
    }

    pub fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.event_loop(&mut terminal);

        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        let tick_rate = Duration::from_millis(self.config.ui.tick_rate_ms);
        tracing::info!(
            walkthrough = %self.walkthrough.name(),
            scene_objects = self.scene.entities().len()
                + self.scene.transforms().len()
                + self.scene.buttons().len()
                + self.scene.proxies().len(),
            tick_ms = self.config.ui.tick_rate_ms,
            "Menu started"
        );

        while !self.should_quit {
            terminal.draw(|f| {
                self.menu.render(f);
                self.help_dialog.render(f);
            })?;

            if event::poll(tick_rate)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }

            self.tick();
        }

        Ok(())
    }

    /// Advance the walkthrough one frame and pull its state into the menu
    fn tick(&mut self) {
        self.walkthrough.tick();
        self.menu.refresh(&self.walkthrough);
    }

    fn handle_key(&mut self, key: KeyCode) {
        // Help overlay swallows the next key
        if self.help_dialog.visible {
            self.help_dialog.visible = false;
            return;
        }

        match key {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.help_dialog.toggle(),
            KeyCode::Char('m') => self.menu.toggle_minimized(),
            KeyCode::Char('n') | KeyCode::Right => self.walkthrough.next_step(),
            KeyCode::Char('p') | KeyCode::Left => self.walkthrough.previous_step(),
            KeyCode::Tab => self.menu.toggle_focus(),
            KeyCode::Char('j') | KeyCode::Down => self.menu.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.menu.select_prev(),
            KeyCode::Enter => self.activate_selection(),
            KeyCode::Char('w') => self.nudge_selected(Vec3::new(0.0, 0.0, NUDGE_STEP)),
            KeyCode::Char('s') => self.nudge_selected(Vec3::new(0.0, 0.0, -NUDGE_STEP)),
            KeyCode::Char('a') => self.nudge_selected(Vec3::new(-NUDGE_STEP, 0.0, 0.0)),
            KeyCode::Char('d') => self.nudge_selected(Vec3::new(NUDGE_STEP, 0.0, 0.0)),
            KeyCode::Char('[') => self.turn_selected(-TURN_STEP),
            KeyCode::Char(']') => self.turn_selected(TURN_STEP),
            _ => {}
        }

        self.menu.refresh(&self.walkthrough);
    }

    fn activate_selection(&mut self) {
        match self.menu.focused {
            FocusedPanel::Steps => {
                // Quick nav jumps without auto-progressing past completed steps
                if let Some(index) = self.menu.selected_step() {
                    self.walkthrough.skip_to_step(index, false);
                }
            }
            FocusedPanel::Scene => {
                if let Some(item) = self.menu.selected_scene_item() {
                    item.activate();
                }
            }
        }
    }

    fn nudge_selected(&self, delta: Vec3) {
        if let Some(item) = self.menu.selected_scene_item() {
            item.nudge(delta);
        }
    }

    fn turn_selected(&self, degrees: f32) {
        if let Some(item) = self.menu.selected_scene_item() {
            item.turn(degrees);
        }
    }
}
