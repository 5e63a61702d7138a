// Terminal implementation of `GardenView`.
//
// Keeps the latest `TokenView` of every token and the most recent feed lines
// (an `EventLog`, so the oldest drop off first), and renders the garden as a coarse grid of emoji cells. Each cell
// covers `cell_size` canvas units; when several tokens share a cell the one
// with the highest handle wins, so newer tokens are drawn on top like in the
// browser.

use emoji_garden_sim::config::GardenConfig;
use emoji_garden_sim::event::EventLog;
use emoji_garden_sim::types::EntityId;
use emoji_garden_sim::view::{GardenView, TokenView};
use std::collections::BTreeMap;

const EMPTY_CELL: &str = "··";

#[derive(Debug)]
pub struct ConsoleView {
    tokens: BTreeMap<EntityId, TokenView>,
    feed: EventLog,
}

impl ConsoleView {
    /// A view whose feed keeps the last `feed_capacity` messages.
    pub fn new(feed_capacity: usize) -> Self {
        Self {
            tokens: BTreeMap::new(),
            feed: EventLog::new(feed_capacity),
        }
    }

    pub fn token(&self, id: EntityId) -> Option<&TokenView> {
        self.tokens.get(&id)
    }

    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    /// The retained feed lines, oldest first.
    pub fn feed(&self) -> Vec<&str> {
        self.feed.messages().collect()
    }

    /// Render the play area as rows of emoji cells.
    pub fn render_map(&self, config: &GardenConfig, cell_size: f32) -> String {
        let cell_size = cell_size.max(1.0);
        let columns = (config.play_area.0 / cell_size).ceil().max(1.0) as usize;
        let rows = (config.play_area.1 / cell_size).ceil().max(1.0) as usize;
        let mut grid = vec![vec![EMPTY_CELL; columns]; rows];

        for token in self.tokens.values() {
            let column = ((token.position.x / cell_size).max(0.0) as usize).min(columns - 1);
            let row = ((token.position.y / cell_size).max(0.0) as usize).min(rows - 1);
            grid[row][column] = token.emoji;
        }

        grid.iter()
            .map(|row| row.concat())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl GardenView for ConsoleView {
    fn render_token(&mut self, token: &TokenView) {
        self.tokens.insert(token.id, token.clone());
    }

    fn remove_token(&mut self, id: EntityId) {
        self.tokens.remove(&id);
    }

    fn log_event(&mut self, message: &str) {
        self.feed.push(message.to_string());
    }
}
