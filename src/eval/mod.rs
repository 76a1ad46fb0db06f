mod dispatcher;
mod parser;
mod readline;
pub mod symbols;
mod tokenizer;

pub use dispatcher::Dispatcher;
pub use parser::Command;
pub use readline::LineEditor;
