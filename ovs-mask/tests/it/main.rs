mod exhaustive;
mod properties;
