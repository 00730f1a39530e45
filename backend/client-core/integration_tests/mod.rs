#[path = "../src/tests/frames.rs"]
mod frames;
mod helpers;

mod connection;
mod identity;
mod probe;
mod storage;
