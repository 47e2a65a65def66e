mod config;
mod hierarchy;
