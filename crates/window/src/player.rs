use mdcontainer_inventory::PlayerInventory;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Game mode of the player viewing a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    /// Normal play.
    #[default]
    Survival,
    /// Unlimited items; creative clicks and middle clicks are honoured.
    Creative,
    /// Survival without block interaction.
    Adventure,
    /// Observer.
    Spectator,
}

/// The player a window is shown to.
#[derive(Debug, Clone)]
pub struct ClientPlayer {
    id: u64,
    name: String,
    game_mode: GameMode,
    inventory: Arc<PlayerInventory>,
}

impl ClientPlayer {
    /// Player with an empty inventory.
    pub fn new(id: u64, name: impl Into<String>, game_mode: GameMode) -> Self {
        Self::with_inventory(id, name, game_mode, Arc::new(PlayerInventory::new()))
    }

    /// Player over an existing inventory.
    pub fn with_inventory(
        id: u64,
        name: impl Into<String>,
        game_mode: GameMode,
        inventory: Arc<PlayerInventory>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            game_mode,
            inventory,
        }
    }

    /// Entity id.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current game mode.
    pub fn game_mode(&self) -> GameMode {
        self.game_mode
    }

    /// Switch game mode. Takes effect on the next gesture.
    pub fn set_game_mode(&mut self, game_mode: GameMode) {
        self.game_mode = game_mode;
    }

    /// Whether creative-only gestures are honoured.
    pub fn is_creative(&self) -> bool {
        self.game_mode == GameMode::Creative
    }

    /// Main inventory and cursor.
    pub fn inventory(&self) -> &Arc<PlayerInventory> {
        &self.inventory
    }
}
