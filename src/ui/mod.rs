pub mod dialogs;
pub mod keybindings;
pub mod menu;
mod panels;

pub use dialogs::HelpDialog;
pub use menu::{FocusedPanel, SceneItem, WalkthroughMenu};
