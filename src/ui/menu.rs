//! The walkthrough menu: step text, progress, quick navigation and a scene
//! panel for driving the handles that triggers observe.

use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::Color,
    Frame,
};

use super::panels::{HeaderBar, NavPanel, ScenePanel, StatusBar, StepPanel};
use crate::scene::{ButtonHandle, EntityHandle, ProxyHandle, Scene, TransformHandle};
use crate::spatial::Vec3;
use crate::walkthrough::Walkthrough;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusedPanel {
    Steps,
    Scene,
}

/// One row of the quick navigation list
#[derive(Debug, Clone, PartialEq)]
pub struct StepEntry {
    pub index: usize,
    pub label: String,
    pub completed: bool,
    pub current: bool,
}

/// A scene handle exposed in the menu
#[derive(Debug, Clone)]
pub enum SceneItem {
    Button(ButtonHandle),
    Entity(EntityHandle),
    Proxy(ProxyHandle),
    Transform(TransformHandle),
}

impl SceneItem {
    /// Every handle in the scene, grouped by kind, each group sorted by name
    pub fn collect(scene: &Scene) -> Vec<SceneItem> {
        let mut items: Vec<SceneItem> = Vec::new();
        items.extend(scene.buttons().into_iter().map(SceneItem::Button));
        items.extend(scene.entities().into_iter().map(SceneItem::Entity));
        items.extend(scene.proxies().into_iter().map(SceneItem::Proxy));
        items.extend(scene.transforms().into_iter().map(SceneItem::Transform));
        items
    }

    pub fn name(&self) -> &str {
        match self {
            SceneItem::Button(b) => b.name(),
            SceneItem::Entity(e) => e.name(),
            SceneItem::Proxy(p) => p.name(),
            SceneItem::Transform(t) => t.name(),
        }
    }

    pub fn kind_label(&self) -> &'static str {
        match self {
            SceneItem::Button(_) => "button",
            SceneItem::Entity(_) => "entity",
            SceneItem::Proxy(_) => "proxy",
            SceneItem::Transform(_) => "transform",
        }
    }

    pub fn status(&self) -> String {
        match self {
            SceneItem::Button(b) => format!("clicks: {}", b.clicks()),
            SceneItem::Entity(e) => match (e.active_self(), e.active_in_hierarchy()) {
                (true, true) => "active".to_string(),
                (true, false) => "active (parent hidden)".to_string(),
                _ => "inactive".to_string(),
            },
            SceneItem::Proxy(p) => {
                if p.is_tracking() {
                    "tracking".to_string()
                } else {
                    "searching".to_string()
                }
            }
            SceneItem::Transform(t) => {
                let pose = t.get();
                format!("at {} facing {}", pose.position, pose.forward)
            }
        }
    }

    pub fn status_color(&self) -> Color {
        match self {
            SceneItem::Entity(e) if !e.active_in_hierarchy() => Color::DarkGray,
            SceneItem::Proxy(p) if !p.is_tracking() => Color::Yellow,
            SceneItem::Button(_) | SceneItem::Transform(_) => Color::Gray,
            _ => Color::Green,
        }
    }

    /// Enter on a row: click a button, toggle an entity or a proxy's tracking
    pub fn activate(&self) {
        match self {
            SceneItem::Button(b) => b.click(),
            SceneItem::Entity(e) => e.set_active(!e.active_self()),
            SceneItem::Proxy(p) => p.set_tracking(!p.is_tracking()),
            SceneItem::Transform(_) => {}
        }
        tracing::debug!(kind = self.kind_label(), name = self.name(), status = %self.status(), "Scene object used");
    }

    /// Move a transform; other kinds ignore it
    pub fn nudge(&self, delta: Vec3) {
        if let SceneItem::Transform(t) = self {
            t.set_position(t.position() + delta);
        }
    }

    /// Turn a transform about the vertical axis; other kinds ignore it
    pub fn turn(&self, degrees: f32) {
        if let SceneItem::Transform(t) = self {
            t.set_forward(t.forward().rotated_y(degrees));
        }
    }
}

pub struct WalkthroughMenu {
    name: String,
    pub nav_panel: NavPanel,
    pub scene_panel: ScenePanel,
    pub focused: FocusedPanel,
    pub minimized: bool,
    description: String,
    waiting_on: Vec<String>,
    progress: String,
    finished: bool,
    next_available: bool,
    previous_available: bool,
    seen_revision: Option<u64>,
}

impl WalkthroughMenu {
    pub fn new(walkthrough: &Walkthrough, scene: &Scene) -> Self {
        let mut menu = Self {
            name: walkthrough.name().to_string(),
            nav_panel: NavPanel::new(),
            scene_panel: ScenePanel::new(SceneItem::collect(scene)),
            focused: FocusedPanel::Steps,
            minimized: false,
            description: String::new(),
            waiting_on: Vec::new(),
            progress: String::new(),
            finished: false,
            next_available: false,
            previous_available: false,
            seen_revision: None,
        };
        menu.refresh(walkthrough);
        menu
    }

    /// Pull the walkthrough's state into the view. When the walkthrough
    /// has changed since the last call, the quick nav jumps to the current step.
    pub fn refresh(&mut self, walkthrough: &Walkthrough) {
        let current = walkthrough.display_step();

        self.nav_panel.entries = walkthrough
            .steps()
            .iter()
            .enumerate()
            .map(|(index, step)| {
                let description = step.description();
                StepEntry {
                    index,
                    label: if description.is_empty() {
                        step.name().to_string()
                    } else {
                        description
                    },
                    completed: step.completed(),
                    current: index == current && !walkthrough.is_finished(),
                }
            })
            .collect();

        match walkthrough.steps().get(current) {
            Some(step) => {
                self.description = step.description();
                self.waiting_on = step
                    .pending_trigger_kinds()
                    .into_iter()
                    .map(|kind| kind.to_string())
                    .collect();
            }
            None => {
                self.description = "This walkthrough has no steps.".to_string();
                self.waiting_on.clear();
            }
        }

        self.progress = walkthrough.progress_label();
        self.finished = walkthrough.is_finished();
        self.next_available = walkthrough.next_available();
        self.previous_available = walkthrough.previous_available();

        let revision = walkthrough.revision();
        if self.seen_revision != Some(revision) {
            self.seen_revision = Some(revision);
            if !walkthrough.is_empty() {
                self.nav_panel.state.select(Some(current));
            }
        }
    }

    pub fn toggle_focus(&mut self) {
        self.focused = match self.focused {
            FocusedPanel::Steps => FocusedPanel::Scene,
            FocusedPanel::Scene => FocusedPanel::Steps,
        };
    }

    pub fn toggle_minimized(&mut self) {
        self.minimized = !self.minimized;
    }

    pub fn select_next(&mut self) {
        let (state, len) = self.focused_list();
        if len == 0 {
            return;
        }
        let i = match state.selected() {
            Some(i) => (i + 1).min(len - 1),
            None => 0,
        };
        state.select(Some(i));
    }

    pub fn select_prev(&mut self) {
        let (state, len) = self.focused_list();
        if len == 0 {
            return;
        }
        let i = match state.selected() {
            Some(i) => i.saturating_sub(1),
            None => 0,
        };
        state.select(Some(i));
    }

    /// Step highlighted in the quick nav list
    pub fn selected_step(&self) -> Option<usize> {
        self.nav_panel
            .state
            .selected()
            .filter(|&i| i < self.nav_panel.entries.len())
    }

    pub fn selected_scene_item(&self) -> Option<&SceneItem> {
        self.scene_panel
            .state
            .selected()
            .and_then(|i| self.scene_panel.items.get(i))
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn progress(&self) -> &str {
        &self.progress
    }

    fn focused_list(&mut self) -> (&mut ratatui::widgets::ListState, usize) {
        match self.focused {
            FocusedPanel::Steps => (&mut self.nav_panel.state, self.nav_panel.entries.len()),
            FocusedPanel::Scene => (&mut self.scene_panel.state, self.scene_panel.items.len()),
        }
    }

    pub fn render(&mut self, frame: &mut Frame) {
        let header = HeaderBar {
            name: &self.name,
            progress: &self.progress,
            finished: self.finished,
        };

        if self.minimized {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(2), Constraint::Min(0)])
                .split(frame.area());
            header.render(frame, chunks[0]);
            return;
        }

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2), // Header
                Constraint::Length(7), // Current step
                Constraint::Min(6),    // Steps + scene
                Constraint::Length(2), // Status bar
            ])
            .split(frame.area());

        header.render(frame, chunks[0]);

        StepPanel {
            description: &self.description,
            waiting_on: &self.waiting_on,
        }
        .render(frame, chunks[1]);

        let main_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[2]);

        self.nav_panel
            .render(frame, main_chunks[0], self.focused == FocusedPanel::Steps);
        self.scene_panel
            .render(frame, main_chunks[1], self.focused == FocusedPanel::Scene);

        StatusBar {
            previous_available: self.previous_available,
            next_available: self.next_available,
        }
        .render(frame, chunks[3]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::triggers::{ButtonPressTrigger, ObjectActiveTrigger};
    use crate::walkthrough::Step;
    use ratatui::{backend::TestBackend, Terminal};

    fn fixture() -> (Walkthrough, Scene) {
        let mut scene = Scene::new();
        let button = ButtonHandle::new("continue");
        let panel = EntityHandle::new("panel", false);
        scene.add_button(button.clone()).unwrap();
        scene.add_entity(panel.clone()).unwrap();
        scene.add_transform(TransformHandle::at("camera", Vec3::ZERO)).unwrap();

        let walkthrough = Walkthrough::new(
            "Training",
            vec![
                Step::new("intro")
                    .with_description("Press continue")
                    .with_trigger(ButtonPressTrigger::new(Some(button))),
                Step::new("reveal")
                    .with_description("Open the panel")
                    .with_trigger(ObjectActiveTrigger::new(Some(panel)))
                    .block_until_complete(true),
                Step::new("done").with_description("All done"),
            ],
        );
        (walkthrough, scene)
    }

    fn rendered(menu: &mut WalkthroughMenu) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| menu.render(f)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_refresh_reflects_current_step() {
        let (walkthrough, scene) = fixture();
        let menu = WalkthroughMenu::new(&walkthrough, &scene);

        assert_eq!(menu.description(), "Press continue");
        assert_eq!(menu.progress(), "Step 0 / 2");
        assert_eq!(menu.waiting_on, vec!["button_press".to_string()]);
        assert!(menu.next_available);
        assert!(!menu.previous_available);
        assert_eq!(menu.selected_step(), Some(0));
    }

    #[test]
    fn test_scene_actions_drive_triggers() {
        let (mut walkthrough, scene) = fixture();
        let mut menu = WalkthroughMenu::new(&walkthrough, &scene);
        menu.toggle_focus();

        // Scene rows: buttons, entities, proxies, transforms
        assert_eq!(menu.selected_scene_item().unwrap().name(), "continue");
        menu.selected_scene_item().unwrap().activate();
        walkthrough.tick();
        menu.refresh(&walkthrough);

        assert_eq!(menu.progress(), "Step 1 / 2");
        assert_eq!(menu.selected_step(), Some(1));
        assert!(menu.nav_panel.entries[0].completed);
        assert_eq!(menu.nav_panel.entries[0].label, "Press continue (Complete)");
        assert!(!menu.next_available);

        menu.select_next();
        let item = menu.selected_scene_item().unwrap();
        assert_eq!(item.name(), "panel");
        item.activate();
        walkthrough.tick();
        menu.refresh(&walkthrough);

        assert!(walkthrough.is_finished());
        assert!(menu.finished);
    }

    #[test]
    fn test_nudge_and_turn_only_move_transforms() {
        let (_, scene) = fixture();
        let items = SceneItem::collect(&scene);
        let camera = items.iter().find(|i| i.name() == "camera").unwrap();

        camera.nudge(Vec3::new(0.0, 0.0, 0.5));
        camera.turn(90.0);
        let pose = scene.transform("camera").unwrap().get();
        assert_eq!(pose.position, Vec3::new(0.0, 0.0, 0.5));
        assert!((pose.forward.x - 1.0).abs() < 1e-5);

        // Ignored for non-transforms
        let button = items.iter().find(|i| i.name() == "continue").unwrap();
        button.nudge(Vec3::new(1.0, 0.0, 0.0));
        button.turn(45.0);
    }

    #[test]
    fn test_selection_clamps_to_list() {
        let (walkthrough, scene) = fixture();
        let mut menu = WalkthroughMenu::new(&walkthrough, &scene);

        for _ in 0..10 {
            menu.select_next();
        }
        assert_eq!(menu.selected_step(), Some(2));
        for _ in 0..10 {
            menu.select_prev();
        }
        assert_eq!(menu.selected_step(), Some(0));
    }

    #[test]
    fn test_render_shows_menu_text() {
        let (walkthrough, scene) = fixture();
        let mut menu = WalkthroughMenu::new(&walkthrough, &scene);

        let screen = rendered(&mut menu);
        assert!(screen.contains("Training"));
        assert!(screen.contains("Step 0 / 2"));
        assert!(screen.contains("Press continue"));
        assert!(screen.contains("continue"));
    }

    #[test]
    fn test_minimized_hides_panels() {
        let (walkthrough, scene) = fixture();
        let mut menu = WalkthroughMenu::new(&walkthrough, &scene);
        menu.toggle_minimized();

        let screen = rendered(&mut menu);
        assert!(screen.contains("Step 0 / 2"));
        assert!(!screen.contains("Scene"));
    }

    #[test]
    fn test_empty_walkthrough() {
        let walkthrough = Walkthrough::new("Empty", Vec::new());
        let mut menu = WalkthroughMenu::new(&walkthrough, &Scene::new());

        assert_eq!(menu.selected_step(), None);
        assert!(!menu.next_available);
        menu.select_next();
        let screen = rendered(&mut menu);
        assert!(screen.contains("no steps"));
    }
}
