//! Abstract syntax for the relic specification language.
//!
//! Programs are definitions: type definitions, functions, and relations.
//! Function and relation bodies are instruction lists over a small expression
//! calculus with explicit iteration. The parser and wire format live outside
//! this workspace; an external loader produces these nodes.

use smallvec::SmallVec;
use std::fmt;

use crate::{Integer, MixopId, Name, Span};

/// Iteration shape of a binding: optional or list.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum Iter {
    Opt,
    List,
}

/// A variable's iteration suffix.
///
/// Environment keys are `(name, suffix)`: the same source name bound at
/// different iteration depths occupies distinct slots. Suffixes are short in
/// practice, so they live inline.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct IterSuffix(SmallVec<[Iter; 4]>);

impl IterSuffix {
    /// The empty suffix (a plain, non-iterated variable).
    pub fn empty() -> Self {
        IterSuffix(SmallVec::new())
    }

    pub fn from_iters(iters: impl IntoIterator<Item = Iter>) -> Self {
        IterSuffix(iters.into_iter().collect())
    }

    /// This suffix extended by one more iteration dimension.
    #[must_use]
    pub fn with(&self, iter: Iter) -> Self {
        let mut inner = self.0.clone();
        inner.push(iter);
        IterSuffix(inner)
    }

    /// This suffix with its innermost (last) dimension removed.
    /// `None` when already empty.
    #[must_use]
    pub fn popped(&self) -> Option<Self> {
        if self.0.is_empty() {
            return None;
        }
        let mut inner = self.0.clone();
        inner.pop();
        Some(IterSuffix(inner))
    }

    pub fn last(&self) -> Option<Iter> {
        self.0.last().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Iter> + '_ {
        self.0.iter().copied()
    }
}

impl fmt::Debug for IterSuffix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for it in &self.0 {
            match it {
                Iter::Opt => write!(f, "?")?,
                Iter::List => write!(f, "*")?,
            }
        }
        Ok(())
    }
}

/// A suffixed variable: the unit of environment lookup.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct VarId {
    pub name: Name,
    pub iters: IterSuffix,
}

impl VarId {
    /// A plain variable with no iteration suffix.
    pub fn plain(name: Name) -> Self {
        VarId {
            name,
            iters: IterSuffix::empty(),
        }
    }

    pub fn new(name: Name, iters: IterSuffix) -> Self {
        VarId { name, iters }
    }

    /// This variable with one more iteration dimension appended.
    #[must_use]
    pub fn suffixed(&self, iter: Iter) -> Self {
        VarId {
            name: self.name,
            iters: self.iters.with(iter),
        }
    }
}

/// Numeric kind: natural (non-negative by construction) or integer.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum NumKind {
    Nat,
    Int,
}

/// Types, as they appear in casts, subtype guards, and type arguments.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum Typ {
    Bool,
    Num(NumKind),
    Text,
    /// A named type: a typedef reference or a bound type variable.
    Var(Name),
    Tuple(Vec<Typ>),
    Iter(Box<Typ>, Iter),
    /// A function type. First-order only: substituting one for a type
    /// variable is an error.
    Func,
}

/// The body of a type definition.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum DefTyp {
    /// Transparent alias.
    Plain(Typ),
    /// Record with ordered named fields.
    Struct(Vec<(Name, Typ)>),
    /// Tagged union of mixop-named cases.
    Variant(Vec<CaseTyp>),
}

/// One case of a variant type.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct CaseTyp {
    pub mixop: MixopId,
    pub args: Vec<Typ>,
}

/// An expression with its source span.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Exp {
    pub kind: ExpKind,
    pub span: Span,
}

impl Exp {
    pub fn new(kind: ExpKind, span: Span) -> Self {
        Exp { kind, span }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum ExpKind {
    Bool(bool),
    Num(NumKind, Integer),
    Text(String),
    Var(VarId),
    Tuple(Vec<Exp>),
    List(Vec<Exp>),
    /// `head :: tail`.
    Cons(Box<Exp>, Box<Exp>),
    Opt(Option<Box<Exp>>),
    /// Struct construction with ordered named fields.
    Struct(Vec<(Name, Exp)>),
    /// Struct field projection.
    Dot(Box<Exp>, Name),
    /// Algebraic case construction.
    Case(MixopId, Vec<Exp>),
    /// Function call: builtin or user-defined, with explicit type arguments.
    Call {
        func: Name,
        targs: Vec<Typ>,
        args: Vec<Exp>,
    },
    /// Relation query: does `rel` hold for these positions? Only the
    /// relation's declared input positions are evaluated; outputs are
    /// discarded. Yields a boolean, xor `negated`.
    Hold {
        rel: Name,
        args: Vec<Exp>,
        negated: bool,
    },
    /// Iterated evaluation: `exp` once per binding of `vars` under `iter`.
    Iter {
        exp: Box<Exp>,
        iter: Iter,
        vars: Vec<VarId>,
    },
    /// Shape test: does the value of `exp` match the pattern? Never fails,
    /// a shape mismatch is `false`.
    Match(Box<Exp>, Pat),
    /// Subtype test, yields a boolean.
    Sub(Box<Exp>, Typ),
    /// Widening cast (always succeeds on well-typed input).
    UpCast(Box<Exp>, Typ),
    /// Narrowing cast (fails when the value is outside the target).
    DownCast(Box<Exp>, Typ),
}

/// Shape patterns for `Match` expressions and `Case` guards.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Pat {
    Case(MixopId),
    List(ListPat),
    Opt(OptPat),
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum ListPat {
    /// Non-empty list.
    Cons,
    /// Exactly `n` elements.
    Fixed(usize),
    /// Empty list.
    Nil,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum OptPat {
    Some,
    None,
}

/// A program point id, assigned by the external loader and recorded into
/// coverage when the instruction executes.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProgPoint(u32);

impl ProgPoint {
    pub const fn new(id: u32) -> Self {
        ProgPoint(id)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for ProgPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProgPoint({})", self.0)
    }
}

/// An instruction with its source span and coverage point.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Instr {
    pub kind: InstrKind,
    pub span: Span,
    pub point: ProgPoint,
}

impl Instr {
    pub fn new(kind: InstrKind, span: Span, point: ProgPoint) -> Self {
        Instr { kind, span, point }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum InstrKind {
    /// Guarded block: when the (possibly iterated) condition holds, run
    /// `then`; otherwise fall through to the next instruction.
    If {
        cond: Exp,
        iters: Vec<IterBinding>,
        then: Vec<Instr>,
    },
    /// First-match case analysis over a scrutinee. Commits to the first arm
    /// whose guard holds; no matching arm falls through.
    Case { exp: Exp, arms: Vec<CaseArm> },
    /// Destructuring binding, possibly iterated.
    Let {
        lhs: Exp,
        rhs: Exp,
        iters: Vec<IterBinding>,
    },
    /// Relation premise: invoke `rel` with the declared-input positions of
    /// `exps` and bind the output positions from its results. A premise that
    /// does not match ends the enclosing body without a result.
    Rule {
        rel: Name,
        exps: Vec<Exp>,
        iters: Vec<IterBinding>,
    },
    /// Terminal: the relation's output values.
    Result(Vec<Exp>),
    /// Terminal: the function's return value.
    Return(Exp),
}

/// One iteration dimension attached to an instruction. The first declared
/// binding is the innermost.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct IterBinding {
    pub iter: Iter,
    pub vars: Vec<VarId>,
}

/// One arm of a `Case` instruction.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct CaseArm {
    pub guard: Guard,
    pub body: Vec<Instr>,
}

/// Tests a `Case` arm applies to its scrutinee.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Guard {
    /// Scrutinee equals the value of the expression.
    Eq(Exp),
    /// Scrutinee differs from the value of the expression.
    NotEq(Exp),
    /// Ordered comparison against the value of the expression.
    Cmp(CmpOp, Exp),
    /// Scrutinee is a member of the target type.
    Sub(Typ),
    /// Scrutinee matches the shape pattern.
    Match(Pat),
    /// Scrutinee is an element of the list the expression evaluates to.
    Mem(Exp),
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum CmpOp {
    Lt,
    Gt,
    Le,
    Ge,
}

/// A type definition.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TypDef {
    pub name: Name,
    pub params: Vec<Name>,
    pub body: DefTyp,
}

/// A function parameter: a value pattern or a function-typed parameter
/// naming a definition to bind into the callee's local function environment.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Param {
    Exp(VarId),
    Def(Name),
}

/// A function definition.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct FuncDef {
    pub name: Name,
    pub tparams: Vec<Name>,
    pub params: Vec<Param>,
    pub instrs: Vec<Instr>,
}

/// A relation definition.
///
/// `params` holds one pattern expression per position; `inputs` indexes the
/// positions bound from the caller's values, the rest are outputs produced
/// by the body's `Result` instruction.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct RelDef {
    pub name: Name,
    pub inputs: Vec<usize>,
    pub params: Vec<Exp>,
    pub instrs: Vec<Instr>,
}

impl RelDef {
    /// Total number of positions, inputs and outputs together.
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

/// A top-level definition, as handed to the context loader.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Def {
    Typ(TypDef),
    Func(FuncDef),
    Rel(RelDef),
}
