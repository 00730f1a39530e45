mod memory;
mod ws;
