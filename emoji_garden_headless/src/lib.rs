// emoji_garden_headless: drive the emoji garden without a browser.
//
// The simulation crate needs a platform collaborator to feed it drops and to
// show what happens. This crate is that collaborator for terminals and CI:
// it reads a JSON command script (or uses a built-in demo), steps the garden
// at a fixed frame delta, streams narrative events as JSON lines, and prints
// a population summary at the end. Batch mode runs many seeds in parallel to
// compare outcomes.
//
// Module overview:
// - `cli.rs`:          Command-line parsing into `RunOptions`.
// - `script.rs`:       JSON command scripts and the built-in demo script.
// - `console_view.rs`: `GardenView` implementation that keeps a token table
//                      and renders a coarse emoji map.
// - `run.rs`:          A single seeded run, streaming events.
// - `batch.rs`:        Many seeds at once on the rayon pool.

pub mod batch;
pub mod cli;
pub mod console_view;
pub mod run;
pub mod script;
