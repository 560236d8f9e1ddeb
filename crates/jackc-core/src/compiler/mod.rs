//! VM code generation for Jack.
//!
//! Transforms a token stream directly into stack-machine instructions.
//!
//! # Module Structure
//!
//! - `bytecode`: instruction definitions and the `VmWriter`
//! - `codegen`: the single-pass `CompilationEngine`
//!   - `codegen::symbols`: the two-tier symbol table

pub mod bytecode;
pub mod codegen;

pub use bytecode::{Command, Segment, VmWriter};
pub use codegen::{CompilationEngine, Kind, SubroutineKind, SymbolTable};
