mod codec;
pub(crate) mod frames;
mod machine;
mod ping;
mod protocol;
