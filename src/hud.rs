//! HUD text and overlay visibility
//!
//! Pure presentation logic so the DOM glue in the binary only copies strings
//! and toggles classes.

use crate::sim::{GamePhase, GameState};

/// Which overlay panels are shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overlay {
    /// The dimmed backdrop behind every panel
    pub backdrop: bool,
    pub menu: bool,
    pub how_to_play: bool,
    pub game_over: bool,
}

impl Overlay {
    pub fn for_phase(phase: GamePhase) -> Self {
        match phase {
            GamePhase::Menu => Self {
                backdrop: true,
                menu: true,
                how_to_play: false,
                game_over: false,
            },
            GamePhase::HowToPlay => Self {
                backdrop: true,
                menu: false,
                how_to_play: true,
                game_over: false,
            },
            GamePhase::Playing => Self {
                backdrop: false,
                menu: false,
                how_to_play: false,
                game_over: false,
            },
            GamePhase::GameOver => Self {
                backdrop: true,
                menu: false,
                how_to_play: false,
                game_over: true,
            },
        }
    }
}

/// Snapshot of everything the HUD shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hud {
    pub score: String,
    pub combo: String,
    pub lives: String,
    /// Final score, only at game over
    pub final_score: Option<String>,
    /// Best combo, only at game over
    pub best_combo: Option<String>,
    pub overlay: Overlay,
}

impl Hud {
    pub fn from_state(state: &GameState) -> Self {
        let over = state.phase == GamePhase::GameOver;
        Self {
            score: format!("Pontos: {}", state.score),
            combo: format!("Combo: {}", state.combo),
            lives: format!("Vidas: {}", "♥".repeat(state.lives as usize)),
            final_score: over.then(|| state.score.to_string()),
            best_combo: over.then(|| state.best_combo.to_string()),
            overlay: Overlay::for_phase(state.phase),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn test_counters() {
        let mut state = GameState::new(1, Vec2::new(400.0, 600.0));
        state.start();
        state.score = 51;
        state.combo = 3;
        let hud = Hud::from_state(&state);
        assert_eq!(hud.score, "Pontos: 51");
        assert_eq!(hud.combo, "Combo: 3");
        assert_eq!(hud.lives, "Vidas: ♥♥♥");
        assert_eq!(hud.final_score, None);
        assert!(!hud.overlay.backdrop);
    }

    #[test]
    fn test_game_over_panel() {
        let mut state = GameState::new(1, Vec2::new(400.0, 600.0));
        state.phase = GamePhase::GameOver;
        state.lives = 0;
        state.score = 230;
        state.best_combo = 8;
        let hud = Hud::from_state(&state);
        assert_eq!(hud.lives, "Vidas: ");
        assert_eq!(hud.final_score.as_deref(), Some("230"));
        assert_eq!(hud.best_combo.as_deref(), Some("8"));
        assert!(hud.overlay.game_over && hud.overlay.backdrop && !hud.overlay.menu);
    }

    #[test]
    fn test_menu_panels_are_exclusive() {
        let menu = Overlay::for_phase(GamePhase::Menu);
        assert!(menu.menu && !menu.how_to_play);
        let how = Overlay::for_phase(GamePhase::HowToPlay);
        assert!(!how.menu && how.how_to_play && how.backdrop);
    }
}
