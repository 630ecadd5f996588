pub mod app;
pub mod cli;
pub mod config;
pub mod decode;
pub mod model;
pub mod output;
pub mod pagination;
pub mod view;

#[cfg(test)]
mod tests;
