//! # Display Management
//!
//! Draws a [`RenderSnapshot`] with macroquad as coloured glyphs, plus a side
//! panel and a message log.

use crate::rendering::{RenderSnapshot, VisibilityState};
use crate::{DelveResult, Rgb};
use macroquad::prelude::*;

/// Brightness multiplier for remembered cells.
const REMEMBERED_DIM: f32 = 0.4;

/// Macroquad display manager for the game.
pub struct MacroquadDisplay {
    /// Tile size in pixels
    pub tile_size: f32,
    /// UI panel width in pixels
    pub ui_panel_width: f32,
    /// Message history
    pub messages: Vec<String>,
    /// Maximum number of messages to keep
    pub max_messages: usize,
}

impl Default for MacroquadDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl MacroquadDisplay {
    pub fn new() -> Self {
        Self {
            tile_size: 24.0,
            ui_panel_width: 260.0,
            messages: Vec::new(),
            max_messages: 100,
        }
    }

    /// Renders the complete game screen.
    pub fn render(&self, snapshot: &RenderSnapshot) -> DelveResult<()> {
        clear_background(BLACK);

        self.render_map(snapshot);
        self.render_ui(snapshot);
        self.render_messages();

        Ok(())
    }

    /// Draws every renderable in order, so later layers cover earlier ones.
    fn render_map(&self, snapshot: &RenderSnapshot) {
        for renderable in &snapshot.renderables {
            let x = renderable.screen.x as f32 * self.tile_size;
            let y = renderable.screen.y as f32 * self.tile_size;

            // Blank the cell so an entity hides the tile glyph beneath it.
            draw_rectangle(x, y, self.tile_size, self.tile_size, BLACK);

            let color = match renderable.visibility {
                VisibilityState::Visible => to_color(renderable.color, 1.0),
                VisibilityState::Remembered => to_color(renderable.color, REMEMBERED_DIM),
            };
            let glyph = renderable.glyph.to_string();
            draw_text(
                &glyph,
                x + self.tile_size * 0.25,
                y + self.tile_size * 0.8,
                self.tile_size,
                color,
            );
        }
    }

    /// Renders the side panel.
    fn render_ui(&self, snapshot: &RenderSnapshot) {
        let panel_x = snapshot.view_width as f32 * self.tile_size + 10.0;
        let mut line_y = 20.0;
        let line_height = 20.0;

        draw_text("DELVE", panel_x, line_y, 24.0, WHITE);
        line_y += line_height * 2.0;

        let lines = [
            format!("Depth: {}", snapshot.depth),
            format!("HP: {}/{}", snapshot.player_hp, snapshot.player_max_hp),
            format!("Turn: {}", snapshot.turn),
            format!(
                "Position: ({}, {})",
                snapshot.player_position.x, snapshot.player_position.y
            ),
        ];
        for line in &lines {
            draw_text(line, panel_x, line_y, 18.0, WHITE);
            line_y += line_height;
        }
        line_y += line_height;

        draw_text("Inventory:", panel_x, line_y, 18.0, SKYBLUE);
        line_y += line_height;
        if snapshot.inventory.is_empty() {
            draw_text("(empty)", panel_x, line_y, 16.0, GRAY);
            line_y += line_height;
        }
        for item in &snapshot.inventory {
            draw_text(&format!("{:?}", item), panel_x, line_y, 16.0, WHITE);
            line_y += line_height;
        }
        line_y += line_height;

        draw_text("Controls:", panel_x, line_y, 18.0, GREEN);
        line_y += line_height;
        for control in ["WASD/Arrows/hjkl: Move", "yubn: Diagonals", "ESC/Q: Quit"] {
            draw_text(control, panel_x, line_y, 16.0, WHITE);
            line_y += line_height;
        }
    }

    /// Renders the last few messages along the bottom edge.
    fn render_messages(&self) {
        let message_area_y = screen_height() - 80.0;
        let message_count = 3;
        let line_height = 18.0;

        draw_rectangle(
            0.0,
            message_area_y - 10.0,
            screen_width(),
            90.0,
            Color::new(0.0, 0.0, 0.0, 0.8),
        );

        let start_index = self.messages.len().saturating_sub(message_count);
        for (i, message) in self.messages.iter().skip(start_index).enumerate() {
            let y = message_area_y + i as f32 * line_height;
            draw_text(message, 10.0, y, 16.0, WHITE);
        }
    }

    /// Adds a message to the message history.
    pub fn add_message(&mut self, message: String) {
        self.messages.push(message);

        if self.messages.len() > self.max_messages {
            self.messages.remove(0);
        }
    }
}

fn to_color(rgb: Rgb, brightness: f32) -> Color {
    let Rgb(r, g, b) = rgb;
    let channel = |c: u8| c as f32 / 255.0 * brightness;
    Color::new(channel(r), channel(g), channel(b), 1.0)
}
