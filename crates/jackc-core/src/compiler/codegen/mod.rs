//! Single-pass code generation from Jack source to VM instructions.
//!
//! This module contains the `CompilationEngine`, a recursive-descent parser
//! that emits stack-machine code inline as it recognizes each grammar
//! production. No syntax tree is ever materialized: identifier resolution,
//! object layout, and call-target selection all happen at the moment a
//! token is consumed, with at most one token of pushback.

mod symbols;

pub mod expressions;
pub mod statements;


pub use symbols::{Kind, SymbolTable};

use std::io::Write;

use tracing::debug;

use crate::compiler::bytecode::{Command, Segment, VmWriter};
use crate::error::{CompileError, Result};
use crate::lexer::{Keyword, TokenKind, Tokenizer};

/// The binary operator symbols, applied strictly left to right.
const OPERATORS: [char; 9] = ['+', '-', '*', '/', '&', '|', '<', '>', '='];

/// The unary operator symbols.
const UNARY_OPERATORS: [char; 2] = ['-', '~'];

/// The three subroutine categories of a class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubroutineKind {
    /// Allocates and returns a new object; receiver in local 0
    Constructor,
    /// Class-level subroutine with no receiver
    Function,
    /// Operates on a receiver passed as argument 0
    Method,
}

/// Compiles one class from a token stream to VM instructions.
///
/// The symbol table and instruction writer are injected per unit; the
/// engine never constructs its own. Besides those collaborators, the only
/// state is the current token and the unit state below: class name,
/// declared-field count, current subroutine name and category, and the
/// per-subroutine label counters.
pub struct CompilationEngine<'s, 'c, W: Write> {
    tokens: Tokenizer<'s>,
    table: &'c mut SymbolTable,
    writer: &'c mut VmWriter<W>,
    class_name: String,
    field_count: u16,
    subroutine_name: String,
    subroutine_kind: SubroutineKind,
    if_index: u16,
    while_index: u16,
}

impl<'s, 'c, W: Write> CompilationEngine<'s, 'c, W> {
    /// Creates an engine for one compilation unit.
    pub fn new(
        tokens: Tokenizer<'s>,
        table: &'c mut SymbolTable,
        writer: &'c mut VmWriter<W>,
    ) -> Self {
        Self {
            tokens,
            table,
            writer,
            class_name: String::new(),
            field_count: 0,
            subroutine_name: String::new(),
            subroutine_kind: SubroutineKind::Function,
            if_index: 0,
            while_index: 0,
        }
    }

    // ========================================================================
    // Class structure
    // ========================================================================

    /// Compiles the unit's class declaration. Empty input compiles to
    /// empty output.
    pub fn compile_class(&mut self) -> Result<()> {
        if !self.tokens.has_next() {
            return Ok(());
        }

        self.tokens.advance()?;
        self.check_keyword(Keyword::Class)?;
        self.class_name = self.expect_identifier()?;
        debug!(class = %self.class_name, "compiling class");
        self.expect_symbol('{')?;

        loop {
            self.tokens.advance()?;
            match self.current_keyword() {
                Some(Keyword::Static) => self.compile_class_var_dec(Kind::Static)?,
                Some(Keyword::Field) => self.compile_class_var_dec(Kind::Field)?,
                _ => {
                    self.tokens.push_back();
                    break;
                }
            }
        }

        loop {
            self.tokens.advance()?;
            match self.current_keyword() {
                Some(Keyword::Constructor) => {
                    self.compile_subroutine_dec(SubroutineKind::Constructor)?
                }
                Some(Keyword::Function) => {
                    self.compile_subroutine_dec(SubroutineKind::Function)?
                }
                Some(Keyword::Method) => self.compile_subroutine_dec(SubroutineKind::Method)?,
                _ => {
                    self.tokens.push_back();
                    break;
                }
            }
        }

        self.expect_symbol('}')?;
        Ok(())
    }

    fn compile_class_var_dec(&mut self, kind: Kind) -> Result<()> {
        self.tokens.advance()?;
        let ty = self.parse_type()?;
        loop {
            let name = self.expect_identifier()?;
            self.table.define(&name, &ty, kind);
            if kind == Kind::Field {
                self.field_count += 1;
            }
            self.tokens.advance()?;
            match self.current_symbol() {
                Some(',') => continue,
                Some(';') => break,
                _ => return Err(self.syntax_error("`,` or `;`")),
            }
        }
        Ok(())
    }

    /// Parses the current token as `int`, `char`, `boolean`, or a class
    /// name, returning its spelling.
    fn parse_type(&mut self) -> Result<String> {
        match self.tokens.kind() {
            Some(TokenKind::Keyword(
                kw @ (Keyword::Int | Keyword::Char | Keyword::Boolean),
            )) => Ok(kw.as_str().to_string()),
            Some(TokenKind::Identifier(name)) => Ok(name.clone()),
            _ => Err(self.syntax_error("a type name")),
        }
    }

    fn parse_return_type(&mut self) -> Result<()> {
        match self.tokens.kind() {
            Some(TokenKind::Keyword(
                Keyword::Void | Keyword::Int | Keyword::Char | Keyword::Boolean,
            )) => Ok(()),
            Some(TokenKind::Identifier(_)) => Ok(()),
            _ => Err(self.syntax_error("`void` or a type name")),
        }
    }

    // ========================================================================
    // Subroutines
    // ========================================================================

    fn compile_subroutine_dec(&mut self, kind: SubroutineKind) -> Result<()> {
        self.subroutine_kind = kind;
        self.if_index = 0;
        self.while_index = 0;
        self.table.start_subroutine();

        self.tokens.advance()?;
        self.parse_return_type()?;
        self.subroutine_name = self.expect_identifier()?;
        debug!(subroutine = %self.subroutine_name, ?kind, "compiling subroutine");

        self.expect_symbol('(')?;
        if kind == SubroutineKind::Method {
            // the receiver occupies argument 0, ahead of declared parameters
            let class_name = self.class_name.clone();
            self.table.define("this", &class_name, Kind::Argument);
        }
        self.compile_parameter_list()?;
        self.expect_symbol(')')?;

        self.compile_subroutine_body()
    }

    fn compile_parameter_list(&mut self) -> Result<()> {
        self.tokens.advance()?;
        if self.current_symbol() == Some(')') {
            self.tokens.push_back();
            return Ok(());
        }
        loop {
            let ty = self.parse_type()?;
            let name = self.expect_identifier()?;
            self.table.define(&name, &ty, Kind::Argument);
            self.tokens.advance()?;
            if self.current_symbol() == Some(',') {
                self.tokens.advance()?;
            } else {
                self.tokens.push_back();
                return Ok(());
            }
        }
    }

    fn compile_subroutine_body(&mut self) -> Result<()> {
        self.expect_symbol('{')?;

        let mut n_locals: u16 = 0;
        if self.subroutine_kind == SubroutineKind::Constructor {
            // the receiver lives in a dedicated local, declared first so it
            // lands at index 0
            let class_name = self.class_name.clone();
            self.table.define("this", &class_name, Kind::Local);
            n_locals += 1;
        }

        loop {
            self.tokens.advance()?;
            if self.current_keyword() == Some(Keyword::Var) {
                n_locals += self.compile_var_dec()?;
            } else {
                self.tokens.push_back();
                break;
            }
        }

        let name = format!("{}.{}", self.class_name, self.subroutine_name);
        self.writer.write_function(&name, n_locals)?;

        if self.subroutine_kind == SubroutineKind::Constructor {
            self.writer.write_push(Segment::Constant, self.field_count)?;
            self.writer.write_call("Memory.alloc", 1)?;
            self.writer.write_pop(Segment::Local, 0)?;
        }

        self.tokens.advance()?;
        self.compile_statements()?;
        self.expect_symbol('}')?;
        Ok(())
    }

    fn compile_var_dec(&mut self) -> Result<u16> {
        let mut count = 0;
        self.tokens.advance()?;
        let ty = self.parse_type()?;
        loop {
            let name = self.expect_identifier()?;
            self.table.define(&name, &ty, Kind::Local);
            count += 1;
            self.tokens.advance()?;
            match self.current_symbol() {
                Some(',') => continue,
                Some(';') => break,
                _ => return Err(self.syntax_error("`,` or `;`")),
            }
        }
        Ok(count)
    }

    // ========================================================================
    // Statements
    // ========================================================================

    /// Compiles a run of statements; stops (and pushes back) at the first
    /// token that cannot begin one.
    fn compile_statements(&mut self) -> Result<()> {
        loop {
            match self.current_keyword() {
                Some(Keyword::Let) => self.compile_let()?,
                Some(Keyword::If) => self.compile_if()?,
                Some(Keyword::While) => self.compile_while()?,
                Some(Keyword::Do) => self.compile_do()?,
                Some(Keyword::Return) => self.compile_return()?,
                _ => {
                    self.tokens.push_back();
                    return Ok(());
                }
            }
            self.tokens.advance()?;
        }
    }

    fn compile_let(&mut self) -> Result<()> {
        let name = self.expect_identifier()?;
        let kind = self.table.kind_of(&name)?;
        let index = self.table.index_of(&name)?;

        self.tokens.advance()?;
        match self.current_symbol() {
            Some('[') => {
                // compute base + index, then the right-hand side, then
                // store through `that`
                self.push_variable(&name)?;
                self.tokens.advance()?;
                self.compile_expression()?;
                self.expect_symbol(']')?;
                self.writer.write_arithmetic(Command::Add)?;
                self.expect_symbol('=')?;
                self.tokens.advance()?;
                self.compile_expression()?;
                self.writer.write_pop(Segment::Temp, 0)?;
                self.writer.write_pop(Segment::Pointer, 1)?;
                self.writer.write_push(Segment::Temp, 0)?;
                self.writer.write_pop(Segment::That, 0)?;
            }
            Some('=') => {
                // a field target needs the this pointer anchored; done
                // ahead of the right-hand side, whose own field reads
                // re-anchor to the same receiver
                if kind == Kind::Field {
                    self.set_this_pointer()?;
                }
                self.tokens.advance()?;
                self.compile_expression()?;
                self.writer.write_pop(kind.segment(), index)?;
            }
            _ => return Err(self.syntax_error("`[` or `=`")),
        }

        self.expect_symbol(';')
    }

    fn compile_if(&mut self) -> Result<()> {
        self.expect_symbol('(')?;
        self.tokens.advance()?;
        self.compile_expression()?;
        self.expect_symbol(')')?;

        let index = self.if_index;
        self.if_index += 1;
        let else_label = self.flow_label("IF_L1", index);
        let end_label = self.flow_label("IF_L2", index);

        self.writer.write_arithmetic(Command::Not)?;
        self.writer.write_if(&else_label)?;

        self.expect_symbol('{')?;
        self.tokens.advance()?;
        self.compile_statements()?;
        self.expect_symbol('}')?;

        self.writer.write_goto(&end_label)?;
        self.writer.write_label(&else_label)?;

        self.tokens.advance()?;
        if self.current_keyword() == Some(Keyword::Else) {
            self.expect_symbol('{')?;
            self.tokens.advance()?;
            self.compile_statements()?;
            self.expect_symbol('}')?;
        } else {
            self.tokens.push_back();
        }

        self.writer.write_label(&end_label)?;
        Ok(())
    }

    fn compile_while(&mut self) -> Result<()> {
        let index = self.while_index;
        self.while_index += 1;
        let top_label = self.flow_label("WHILE_L1", index);
        let end_label = self.flow_label("WHILE_L2", index);

        self.writer.write_label(&top_label)?;

        self.expect_symbol('(')?;
        self.tokens.advance()?;
        self.compile_expression()?;
        self.expect_symbol(')')?;

        self.writer.write_arithmetic(Command::Not)?;
        self.writer.write_if(&end_label)?;

        self.expect_symbol('{')?;
        self.tokens.advance()?;
        self.compile_statements()?;
        self.expect_symbol('}')?;

        self.writer.write_goto(&top_label)?;
        self.writer.write_label(&end_label)?;
        Ok(())
    }

    fn compile_do(&mut self) -> Result<()> {
        let name = self.expect_identifier()?;
        self.tokens.advance()?;
        match self.current_symbol() {
            Some('.') | Some('(') => self.compile_subroutine_call(&name)?,
            _ => return Err(self.syntax_error("`.` or `(`")),
        }
        // a do statement discards the call's result
        self.writer.write_pop(Segment::Temp, 0)?;
        self.expect_symbol(';')
    }

    fn compile_return(&mut self) -> Result<()> {
        self.tokens.advance()?;
        if self.current_symbol() == Some(';') {
            // every call site pops one result, so produce a dummy value
            self.writer.write_push(Segment::Constant, 0)?;
            self.tokens.push_back();
        } else {
            self.compile_expression()?;
        }
        self.writer.write_return()?;
        self.expect_symbol(';')
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    /// Compiles `term (op term)*` strictly left to right: each operator is
    /// emitted immediately after its right-hand term, so `a + b * c`
    /// computes `(a + b) * c`. This no-precedence chaining is a defining
    /// property of the language.
    fn compile_expression(&mut self) -> Result<()> {
        self.compile_term()?;
        loop {
            self.tokens.advance()?;
            let op = match self.current_symbol() {
                Some(ch) if OPERATORS.contains(&ch) => ch,
                _ => {
                    self.tokens.push_back();
                    return Ok(());
                }
            };
            self.tokens.advance()?;
            self.compile_term()?;
            match op {
                '+' => self.writer.write_arithmetic(Command::Add)?,
                '-' => self.writer.write_arithmetic(Command::Sub)?,
                '*' => self.writer.write_call("Math.multiply", 2)?,
                '/' => self.writer.write_call("Math.divide", 2)?,
                '&' => self.writer.write_arithmetic(Command::And)?,
                '|' => self.writer.write_arithmetic(Command::Or)?,
                '<' => self.writer.write_arithmetic(Command::Lt)?,
                '>' => self.writer.write_arithmetic(Command::Gt)?,
                '=' => self.writer.write_arithmetic(Command::Eq)?,
                _ => unreachable!("operator set covered above"),
            }
        }
    }

    fn compile_term(&mut self) -> Result<()> {
        match self.tokens.kind() {
            Some(&TokenKind::IntConst(value)) => {
                self.writer.write_push(Segment::Constant, value)?;
            }
            Some(TokenKind::StrConst(_)) => {
                let value = self.tokens.as_string()?.to_string();
                self.compile_string_constant(&value)?;
            }
            Some(TokenKind::Keyword(_)) => {
                let kw = self.tokens.as_keyword()?;
                self.compile_keyword_constant(kw)?;
            }
            Some(TokenKind::Identifier(_)) => {
                let name = self.tokens.as_identifier()?.to_string();
                self.compile_identifier_term(&name)?;
            }
            Some(TokenKind::Symbol('(')) => {
                self.tokens.advance()?;
                self.compile_expression()?;
                self.expect_symbol(')')?;
            }
            Some(&TokenKind::Symbol(op)) if UNARY_OPERATORS.contains(&op) => {
                self.tokens.advance()?;
                self.compile_term()?;
                let command = if op == '-' { Command::Neg } else { Command::Not };
                self.writer.write_arithmetic(command)?;
            }
            _ => return Err(self.syntax_error("a term")),
        }
        Ok(())
    }

    fn compile_keyword_constant(&mut self, kw: Keyword) -> Result<()> {
        match kw {
            Keyword::True => {
                // true is the all-ones word, built as -1
                self.writer.write_push(Segment::Constant, 1)?;
                self.writer.write_arithmetic(Command::Neg)?;
            }
            Keyword::False | Keyword::Null => {
                self.writer.write_push(Segment::Constant, 0)?;
            }
            Keyword::This => {
                self.push_receiver()?;
            }
            _ => return Err(self.syntax_error("a term")),
        }
        Ok(())
    }

    fn compile_string_constant(&mut self, value: &str) -> Result<()> {
        let length = value.chars().count() as u16;
        self.writer.write_push(Segment::Constant, length)?;
        self.writer.write_call("String.new", 1)?;
        for ch in value.chars() {
            self.writer.write_push(Segment::Constant, ch as u16)?;
            self.writer.write_call("String.appendChar", 2)?;
        }
        Ok(())
    }

    /// A term starting with an identifier: array access, subroutine call,
    /// or a plain variable read, distinguished by one token of lookahead.
    fn compile_identifier_term(&mut self, name: &str) -> Result<()> {
        self.tokens.advance()?;
        match self.current_symbol() {
            Some('[') => {
                self.push_variable(name)?;
                self.tokens.advance()?;
                self.compile_expression()?;
                self.expect_symbol(']')?;
                self.writer.write_arithmetic(Command::Add)?;
                self.writer.write_pop(Segment::Pointer, 1)?;
                self.writer.write_push(Segment::That, 0)?;
            }
            Some('.') | Some('(') => {
                self.compile_subroutine_call(name)?;
            }
            _ => {
                self.push_variable(name)?;
                self.tokens.push_back();
            }
        }
        Ok(())
    }

    /// Compiles the remainder of a subroutine call whose leading
    /// identifier has been consumed; the current token is `.` or `(`.
    ///
    /// `name.member(...)` is a method call when `name` is a known variable
    /// (the object becomes the implicit first argument and the callee is
    /// qualified by its declared type), otherwise a plain call qualified by
    /// `name` itself. A bare `name(...)` targets the current class on the
    /// current receiver.
    fn compile_subroutine_call(&mut self, name: &str) -> Result<()> {
        let mut n_args: u16 = 0;
        let callee = match self.current_symbol() {
            Some('.') => {
                let target = if self.table.contains(name) {
                    self.push_variable(name)?;
                    n_args += 1;
                    self.table.type_of(name)?.to_string()
                } else {
                    name.to_string()
                };
                let member = self.expect_identifier()?;
                self.expect_symbol('(')?;
                format!("{}.{}", target, member)
            }
            Some('(') => {
                self.push_receiver()?;
                n_args += 1;
                format!("{}.{}", self.class_name, name)
            }
            _ => return Err(self.syntax_error("`.` or `(`")),
        };

        self.tokens.advance()?;
        n_args += self.compile_expression_list()?;
        self.expect_symbol(')')?;

        self.writer.write_call(&callee, n_args)
    }

    /// Compiles a comma-separated argument list; the current token is the
    /// first token of the first expression, or `)` when empty. Returns the
    /// number of expressions compiled, leaving `)` pushed back.
    fn compile_expression_list(&mut self) -> Result<u16> {
        if self.current_symbol() == Some(')') {
            self.tokens.push_back();
            return Ok(0);
        }
        let mut n_args = 1;
        self.compile_expression()?;
        loop {
            self.tokens.advance()?;
            if self.current_symbol() == Some(',') {
                self.tokens.advance()?;
                self.compile_expression()?;
                n_args += 1;
            } else {
                self.tokens.push_back();
                return Ok(n_args);
            }
        }
    }

    // ========================================================================
    // Variable access
    // ========================================================================

    /// Pushes a variable's value, anchoring the this pointer first when the
    /// variable is a field.
    fn push_variable(&mut self, name: &str) -> Result<()> {
        let kind = self.table.kind_of(name)?;
        let index = self.table.index_of(name)?;
        if kind == Kind::Field {
            self.set_this_pointer()?;
        }
        self.writer.write_push(kind.segment(), index)
    }

    /// Points pointer 0 at the current receiver. Emitted before every
    /// field access; redundant across consecutive accesses, which keeps
    /// the engine stateless between statements.
    fn set_this_pointer(&mut self) -> Result<()> {
        self.push_receiver()?;
        self.writer.write_pop(Segment::Pointer, 0)
    }

    /// Pushes the current receiver: local 0 inside a constructor,
    /// argument 0 otherwise.
    fn push_receiver(&mut self) -> Result<()> {
        if self.subroutine_kind == SubroutineKind::Constructor {
            self.writer.write_push(Segment::Local, 0)
        } else {
            self.writer.write_push(Segment::Argument, 0)
        }
    }

    // ========================================================================
    // Token helpers
    // ========================================================================

    fn current_keyword(&self) -> Option<Keyword> {
        match self.tokens.kind() {
            Some(TokenKind::Keyword(kw)) => Some(*kw),
            _ => None,
        }
    }

    fn current_symbol(&self) -> Option<char> {
        match self.tokens.kind() {
            Some(TokenKind::Symbol(ch)) => Some(*ch),
            _ => None,
        }
    }

    fn check_keyword(&self, kw: Keyword) -> Result<()> {
        if self.current_keyword() == Some(kw) {
            Ok(())
        } else {
            Err(self.syntax_error(format!("`{}`", kw.as_str())))
        }
    }

    fn expect_symbol(&mut self, ch: char) -> Result<()> {
        self.tokens.advance()?;
        if self.current_symbol() == Some(ch) {
            Ok(())
        } else {
            Err(self.syntax_error(format!("`{}`", ch)))
        }
    }

    fn expect_identifier(&mut self) -> Result<String> {
        self.tokens.advance()?;
        match self.tokens.kind() {
            Some(TokenKind::Identifier(name)) => Ok(name.clone()),
            _ => Err(self.syntax_error("an identifier")),
        }
    }

    fn flow_label(&self, tag: &str, index: u16) -> String {
        format!(
            "{}.{}.{}${}",
            self.class_name, self.subroutine_name, tag, index
        )
    }

    fn syntax_error(&self, expected: impl Into<String>) -> CompileError {
        CompileError::Syntax {
            expected: expected.into(),
            found: match self.tokens.kind() {
                Some(kind) => kind.to_string(),
                None => "end of input".to_string(),
            },
            at: self.tokens.span().start,
        }
    }
}
