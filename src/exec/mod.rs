mod builtins;
mod executable;
mod pipeline;
mod streams;

pub use builtins::Registry;
pub use pipeline::run;
#[cfg(test)]
pub use streams::SessionStream;
pub use streams::Terminal;
