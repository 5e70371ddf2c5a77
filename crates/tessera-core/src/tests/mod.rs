mod dimensions;
mod store;
