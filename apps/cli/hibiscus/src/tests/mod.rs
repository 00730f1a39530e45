mod commands;
mod error;
mod input;
mod logger;
