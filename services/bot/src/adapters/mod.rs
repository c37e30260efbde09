pub mod db;
pub mod interpreter_llm;
pub mod memory;

pub use db::DbAdapter;
pub use interpreter_llm::OpenAiInterpreterAdapter;
pub use memory::InMemoryDb;
