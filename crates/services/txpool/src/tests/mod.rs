mod package;
mod reorg;
