// Per-feed stages, in the order a cycle runs them:
// fetch -> sanitize -> parse -> filter -> extract details -> format.

pub mod details;
pub mod fetcher;
pub mod filter;
pub mod formatter;
pub mod parser;
pub mod sanitizer;
