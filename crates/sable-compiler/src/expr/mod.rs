//! Expression compiler.
//!
//! The [`ExprCompiler`] lowers a type-checked expression to IR. Its contract
//! is the temporary stack discipline: a compile call leaves exactly one new
//! temporary on top of the stack, holding the value of the expression, and
//! releases everything else it allocated. `void` expressions leave the stack
//! as they found it.
//!
//! Expressions whose type is a compile-time constant are never lowered node
//! by node. They become a single immediate store of the folded value.
//!
//! # Example
//!
//! ```ignore
//! let mut compiler = ExprCompiler::new(&mut session, &mut emitter);
//! let result = compiler.compile(&expr)?;
//! ```

mod assignment;
mod binary;
mod calls;
mod conversion;
mod identifiers;
mod intrinsics;
mod literals;
mod lvalue;
mod member;
mod subscript;
mod unary;

pub(crate) use assignment::store;

use sable_ast::Expr;
use sable_core::{CompilerError, Span, SymbolType};

use crate::emit::IrEmitter;
use crate::ir::{Address, Width};
use crate::session::CompilerSession;
use crate::temporaries::Temporary;
use crate::type_checker::TypeChecker;

type Result<T> = std::result::Result<T, CompilerError>;

/// Lowers expressions into an [`IrEmitter`].
pub struct ExprCompiler<'a> {
    session: &'a mut CompilerSession,
    emitter: &'a mut IrEmitter,
}

impl<'a> ExprCompiler<'a> {
    pub fn new(session: &'a mut CompilerSession, emitter: &'a mut IrEmitter) -> Self {
        Self { session, emitter }
    }

    /// Compile `expr`, returning the temporary holding its value, or `None`
    /// for `void` expressions.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn compile(&mut self, expr: &Expr<'_>) -> Result<Option<Temporary>> {
        let ty = self.check(expr)?;
        let span = expr.span();
        if ty.is_comptime() {
            return literals::compile_constant(self, &ty, span).map(Some);
        }
        match expr {
            Expr::LiteralInt(_) | Expr::LiteralBool(_) => {
                literals::compile_constant(self, &ty, span).map(Some)
            }
            Expr::LiteralArray(literal) => {
                literals::compile_literal_array(self, literal, &ty).map(Some)
            }
            Expr::Identifier(ident) => identifiers::compile_identifier(self, ident).map(Some),
            Expr::Unary(unary) => unary::compile_unary(self, unary, &ty).map(Some),
            Expr::Binary(binary) => binary::compile_binary(self, binary, &ty).map(Some),
            Expr::Group(group) => self.compile(group.expr),
            Expr::Assignment(assignment) => {
                assignment::compile_assignment(self, assignment, &ty).map(Some)
            }
            Expr::Call(call) => calls::compile_call(self, call),
            Expr::As(cast) => conversion::compile_converted(self, cast.expr, &ty).map(Some),
            Expr::Is(is) => conversion::compile_is(self, is).map(Some),
            Expr::Get(get) => member::compile_get(self, expr, get, &ty).map(Some),
            Expr::Subscript(subscript) => {
                subscript::compile_subscript(self, expr, subscript, &ty).map(Some)
            }
            Expr::StructInitializer(init) => {
                literals::compile_struct_initializer(self, init, &ty).map(Some)
            }
        }
    }

    /// Compile an expression that must produce a value.
    pub fn compile_value(&mut self, expr: &Expr<'_>) -> Result<Temporary> {
        self.compile(expr)?.ok_or_else(|| {
            CompilerError::type_error("value of type `void' cannot be used here", expr.span())
        })
    }

    /// Compile `expr` and convert the result to `target`.
    ///
    /// The conversion must already have been accepted by the type checker.
    pub fn compile_converted(&mut self, expr: &Expr<'_>, target: &SymbolType) -> Result<Temporary> {
        conversion::compile_converted(self, expr, target)
    }

    /// Compute the address of an lvalue into a two byte temporary.
    pub fn compile_address(&mut self, expr: &Expr<'_>) -> Result<Temporary> {
        lvalue::compile_address(self, expr)
    }

    pub fn check(&self, expr: &Expr<'_>) -> Result<SymbolType> {
        self.type_checker().check(expr)
    }

    pub fn check_lvalue(&self, expr: &Expr<'_>) -> Result<Option<SymbolType>> {
        self.type_checker().check_lvalue(expr)
    }

    pub fn type_checker(&self) -> TypeChecker<'_> {
        TypeChecker::new(&self.session.symbols)
    }

    // =========================================================================
    // Temporaries
    // =========================================================================

    fn allocate(&mut self, size: usize, span: Span) -> Result<Temporary> {
        self.session.temporaries.allocate(size, span)
    }

    pub fn release(&mut self, temp: Temporary) -> Result<()> {
        self.session.temporaries.release(temp)
    }

    /// Replace `value` by `result`, which was computed from it.
    ///
    /// `result` must be directly above `value`. Both are released and the
    /// bytes of `result` move down to where `value` started.
    fn collapse(&mut self, value: Temporary, result: Temporary) -> Result<Temporary> {
        self.release(result)?;
        self.release(value)?;
        let moved = self.allocate(result.size, Span::default())?;
        self.emitter
            .copy_words(moved.address, result.address, result.size);
        Ok(moved)
    }

    // =========================================================================
    // Storage
    // =========================================================================

    fn stack_pointer(&self) -> Address {
        self.session.options.stack_pointer
    }

    fn frame_pointer(&self) -> Address {
        self.session.options.frame_pointer
    }

    /// Reserve `size` anonymous bytes that live as long as the enclosing
    /// function frame, or the program at top level, and store their address
    /// in the word at `dst`.
    fn reserve_storage(&mut self, size: usize, dst: Address, span: Span) -> Result<()> {
        if self.session.symbols.is_program_level() {
            let address = self.session.allocate_static(size, span)?;
            self.emitter.store_immediate16(dst, address);
            return Ok(());
        }
        self.session.symbols.bump_storage_pointer(size);
        let offset = frame_offset(self.session.symbols.storage_pointer())?;
        let (sp, fp) = (self.stack_pointer(), self.frame_pointer());
        self.emitter.subi16(sp, fp, offset);
        self.emitter.copy_words(dst, fp, 2);
        self.emitter.subi16(dst, dst, offset);
        Ok(())
    }

    /// Write `value` to `FP - offset` in the current frame.
    pub fn store_to_frame(&mut self, offset: i32, value: Temporary, span: Span) -> Result<()> {
        let address = identifiers::frame_address(self, offset, 0, span)?;
        self.emitter
            .copy_words_indirect_destination(address.address, value.address, value.size);
        self.release(address)
    }

    /// Push the bytes of `value` onto the program stack.
    fn push_temporary(&mut self, value: Temporary) -> Result<()> {
        let size = immediate(value.size)?;
        let sp = self.stack_pointer();
        self.emitter.subi16(sp, sp, size);
        self.emitter
            .copy_words_indirect_destination(sp, value.address, value.size);
        Ok(())
    }
}

/// Width of the arithmetic on values of type `ty`.
fn width_of(ty: &SymbolType) -> Result<Width> {
    match ty.unqualified() {
        SymbolType::U8 | SymbolType::Bool => Ok(Width::Byte),
        SymbolType::U16 => Ok(Width::Word),
        other => Err(CompilerError::internal(format!(
            "no arithmetic width for `{other}'"
        ))),
    }
}

/// A byte count as a 16-bit immediate.
fn immediate(size: usize) -> Result<u16> {
    u16::try_from(size)
        .map_err(|_| CompilerError::internal(format!("{size} does not fit a 16-bit immediate")))
}

/// Frame offsets are bounded by the 64K address space.
fn frame_offset(storage_pointer: usize) -> Result<u16> {
    immediate(storage_pointer)
}
