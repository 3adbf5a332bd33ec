//! Statement compiler.
//!
//! The [`StmtCompiler`] lowers statements to IR on top of the
//! [`ExprCompiler`]:
//! - declarations, with storage allocation and type inference
//! - `if`, `while` and `for` as label-based branches
//! - `for x in` and `match`, lowered onto hidden locals and the branches
//!   above
//! - function declarations with their frames, and `return`
//! - struct declarations
//!
//! Every statement list gets a declaration pre-pass that binds struct types
//! and then function symbols, so code may call a function declared further
//! down.
//!
//! # Example
//!
//! ```ignore
//! let mut compiler = StmtCompiler::new(&mut session, &mut emitter);
//! compiler.compile_program(program)?;
//! ```

mod block;
mod for_in;
mod for_stmt;
mod function;
mod if_stmt;
mod match_stmt;
mod return_stmt;
mod struct_decl;
mod var_decl;
mod while_stmt;

use sable_ast::{Expr, ExprStmt, Ident, Stmt, StorageQualifier, TypeExpr, VarDeclStmt};
use sable_core::{CompilerError, CompilerErrors, Span, SymbolType, Visibility};

use crate::emit::IrEmitter;
use crate::expr::ExprCompiler;
use crate::session::CompilerSession;
use crate::temporaries::Temporary;
use crate::type_checker::{ConversionContext, TypeChecker};

type Result<T> = std::result::Result<T, CompilerError>;

/// The function whose body is being compiled.
#[derive(Debug, Clone)]
struct FunctionContext {
    return_type: SymbolType,
    /// Frame offset of the hidden return slot.
    return_offset: i32,
}

/// Compiles statements to IR.
pub struct StmtCompiler<'a> {
    session: &'a mut CompilerSession,
    emitter: &'a mut IrEmitter,
    /// `None` at program level.
    function: Option<FunctionContext>,
}

impl<'a> StmtCompiler<'a> {
    pub fn new(session: &'a mut CompilerSession, emitter: &'a mut IrEmitter) -> Self {
        Self {
            session,
            emitter,
            function: None,
        }
    }

    /// Compile the top-level statements of a program.
    ///
    /// An error abandons only the declaration it occurs in: its partial
    /// output is discarded and compilation continues with the next one. All
    /// errors are returned together.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn compile_program(&mut self, stmts: &[Stmt<'_>]) -> std::result::Result<(), CompilerErrors> {
        let mut errors = CompilerErrors::new();
        let mut declared = vec![true; stmts.len()];
        for (index, stmt) in stmts.iter().enumerate() {
            if let Stmt::Struct(decl) = stmt {
                declared[index] = self.recover(&mut errors, |compiler| compiler.compile_struct(decl));
            }
        }
        for (index, stmt) in stmts.iter().enumerate() {
            if let Stmt::Function(decl) = stmt {
                declared[index] = self.recover(&mut errors, |compiler| {
                    compiler.declare_function(decl).map(|_| ())
                });
            }
        }
        for (stmt, declared) in stmts.iter().zip(declared) {
            if declared {
                self.recover(&mut errors, |compiler| compiler.compile_declared(stmt));
            }
        }
        log::debug!(
            "compiled {} top-level statements with {} errors",
            stmts.len(),
            errors.len()
        );
        errors.into_result()
    }

    /// Run `compile`, and on failure record the error and roll back the
    /// emitter, scopes and temporaries to where they were. Returns whether
    /// `compile` succeeded.
    fn recover(
        &mut self,
        errors: &mut CompilerErrors,
        compile: impl FnOnce(&mut Self) -> Result<()>,
    ) -> bool {
        let emitted = self.emitter.len();
        let depth = self.session.symbols.depth();
        let temporaries = self.session.temporaries.mark();
        let function = self.function.clone();
        if let Err(error) = compile(self) {
            log::debug!("discarding declaration: {error}");
            errors.push(error);
            self.emitter.truncate(emitted);
            while self.session.symbols.depth() > depth {
                self.session.symbols.pop_scope();
            }
            self.session.temporaries.release_to(temporaries);
            self.function = function;
            return false;
        }
        true
    }

    /// Compile a single statement.
    pub fn compile(&mut self, stmt: &Stmt<'_>) -> Result<()> {
        match stmt {
            Stmt::Expr(expr_stmt) => self.compile_expr_stmt(expr_stmt),
            Stmt::VarDecl(decl) => self.compile_var_decl(decl),
            Stmt::If(if_stmt) => self.compile_if(if_stmt),
            Stmt::While(while_stmt) => self.compile_while(while_stmt),
            Stmt::For(for_stmt) => self.compile_for(for_stmt),
            Stmt::ForIn(for_in) => self.compile_for_in(for_in),
            Stmt::Match(match_stmt) => self.compile_match(match_stmt),
            Stmt::Block(block) => self.compile_block(block),
            Stmt::Function(decl) => {
                let function = self.declare_function(decl)?;
                self.compile_function(decl, function)
            }
            Stmt::Return(ret) => self.compile_return(ret),
            Stmt::Struct(decl) => self.compile_struct(decl),
        }
    }

    /// Compile a statement list: the declaration pre-pass, then every
    /// statement in order.
    pub fn compile_statements(&mut self, stmts: &[Stmt<'_>]) -> Result<()> {
        for stmt in stmts {
            if let Stmt::Struct(decl) = stmt {
                self.compile_struct(decl)?;
            }
        }
        for stmt in stmts {
            if let Stmt::Function(decl) = stmt {
                self.declare_function(decl)?;
            }
        }
        for stmt in stmts {
            self.compile_declared(stmt)?;
        }
        Ok(())
    }

    /// Compile a statement whose declarations the pre-pass already bound.
    fn compile_declared(&mut self, stmt: &Stmt<'_>) -> Result<()> {
        match stmt {
            Stmt::Struct(_) => {}
            Stmt::Function(decl) => {
                let function = self.declared_function(decl)?;
                self.compile_function(decl, function)?;
            }
            other => self.compile(other)?,
        }
        self.session.temporaries.assert_empty()
    }

    /// An expression evaluated for its effects.
    fn compile_expr_stmt(&mut self, expr_stmt: &ExprStmt<'_>) -> Result<()> {
        let mut compiler = self.expr_compiler();
        if let Some(value) = compiler.compile(expr_stmt.expr)? {
            compiler.release(value)?;
        }
        Ok(())
    }

    /// Compile a loop or branch condition into a bool temporary.
    fn compile_condition(&mut self, condition: &Expr<'_>) -> Result<Temporary> {
        let ty = self.type_checker().check(condition)?;
        self.type_checker().convert(
            &SymbolType::Bool,
            &ty,
            false,
            ConversionContext::Condition,
            condition.span(),
        )?;
        self.expr_compiler()
            .compile_converted(condition, &SymbolType::Bool)
    }

    fn expr_compiler(&mut self) -> ExprCompiler<'_> {
        ExprCompiler::new(self.session, self.emitter)
    }

    fn type_checker(&self) -> TypeChecker<'_> {
        TypeChecker::new(&self.session.symbols)
    }
}

/// An automatic declaration the compiler introduces on its own.
fn synthesized_decl<'x>(
    name: Ident<'x>,
    explicit_type: Option<TypeExpr<'x>>,
    init: &'x Expr<'x>,
    is_mutable: bool,
    span: Span,
) -> VarDeclStmt<'x> {
    VarDeclStmt {
        name,
        explicit_type,
        init: Some(init),
        is_mutable,
        storage: StorageQualifier::Automatic,
        visibility: Visibility::Private,
        span,
    }
}
