mod flags;
mod frame;
