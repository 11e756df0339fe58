//! Evaluation contexts.
//!
//! `Globals` holds everything shared by a whole run: the interner, the mixop
//! table, the three definition tables, the struct layout cache, the memo
//! cache, and the recursion depth guard. It is populated once through
//! `load_definition` and read-mostly afterwards.
//!
//! `Ctx` layers the local environments (types, functions, variables) over the
//! globals. Contexts are cheap to clone; every "mutation" is an extension
//! returning a new context, except `commit`, which adopts a child's
//! environment triple.

use rustc_hash::FxHashMap;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use relic_ir::{
    Def, FuncDef, Iter, Mixop, MixopId, MixopTable, Name, RelDef, SharedInterner, Span,
    StringLookup, TypDef, VarId,
};
use relic_value::{StructLayout, Value};

use crate::builtins::BuiltinNames;
use crate::cache::InvokeCache;
use crate::coverage::Coverage;
use crate::env::{FuncEnv, TypeEnv, VarEnv};
use crate::errors::{invalid_operation, unbound_name, EvalResult, NameKind};

/// Recursion limit for function and relation invocations.
const MAX_CALL_DEPTH: usize = 512;

/// Pre-interned mixops for the builtin collection carriers.
pub struct BuiltinMixops {
    /// `{}`: the set and map carrier.
    pub braces: MixopId,
    /// `->`: the map entry pair.
    pub arrow: MixopId,
}

impl BuiltinMixops {
    fn new(interner: &SharedInterner, mixops: &MixopTable) -> Self {
        let lb = interner.intern("{");
        let rb = interner.intern("}");
        let arrow = interner.intern("->");
        BuiltinMixops {
            braces: mixops.intern(Mixop {
                groups: vec![vec![lb], vec![rb]],
            }),
            arrow: mixops.intern(Mixop {
                groups: vec![vec![], vec![arrow], vec![]],
            }),
        }
    }
}

/// Shared per-run state: interning, definitions, caches.
pub struct Globals {
    pub interner: SharedInterner,
    pub mixops: MixopTable,
    pub builtin_mixops: BuiltinMixops,
    pub(crate) builtin_names: BuiltinNames,
    pub(crate) cache: InvokeCache,
    typdefs: RefCell<FxHashMap<Name, Rc<TypDef>>>,
    funcdefs: RefCell<FxHashMap<Name, Rc<FuncDef>>>,
    reldefs: RefCell<FxHashMap<Name, Rc<RelDef>>>,
    layouts: RefCell<FxHashMap<Vec<Name>, StructLayout>>,
    depth: Cell<usize>,
    // Prototype environments: cloning them shares one schema root per kind,
    // so every invocation in a run resolves keys through the same trie.
    proto_tenv: TypeEnv,
    proto_fenv: FuncEnv,
    proto_venv: VarEnv,
}

impl Globals {
    pub fn new(interner: SharedInterner) -> Rc<Self> {
        let mixops = MixopTable::new();
        let builtin_mixops = BuiltinMixops::new(&interner, &mixops);
        let builtin_names = BuiltinNames::new(&interner);
        Rc::new(Globals {
            interner,
            mixops,
            builtin_mixops,
            builtin_names,
            cache: InvokeCache::new(),
            typdefs: RefCell::new(FxHashMap::default()),
            funcdefs: RefCell::new(FxHashMap::default()),
            reldefs: RefCell::new(FxHashMap::default()),
            layouts: RefCell::new(FxHashMap::default()),
            depth: Cell::new(0),
            proto_tenv: TypeEnv::new(),
            proto_fenv: FuncEnv::new(),
            proto_venv: VarEnv::new(),
        })
    }

    /// Register one top-level definition. Later definitions shadow earlier
    /// ones with the same name.
    pub fn load_definition(&self, def: Def) {
        match def {
            Def::Typ(d) => {
                tracing::debug!(name = %self.interner.lookup(d.name), "loaded type definition");
                self.typdefs.borrow_mut().insert(d.name, Rc::new(d));
            }
            Def::Func(d) => {
                tracing::debug!(name = %self.interner.lookup(d.name), "loaded function definition");
                self.funcdefs.borrow_mut().insert(d.name, Rc::new(d));
            }
            Def::Rel(d) => {
                tracing::debug!(name = %self.interner.lookup(d.name), "loaded relation definition");
                self.reldefs.borrow_mut().insert(d.name, Rc::new(d));
            }
        }
    }

    pub fn typdef(&self, name: Name) -> Option<Rc<TypDef>> {
        self.typdefs.borrow().get(&name).cloned()
    }

    pub fn funcdef(&self, name: Name) -> Option<Rc<FuncDef>> {
        self.funcdefs.borrow().get(&name).cloned()
    }

    pub fn reldef(&self, name: Name) -> Option<Rc<RelDef>> {
        self.reldefs.borrow().get(&name).cloned()
    }

    /// Turn on relation memoization for this run.
    pub fn enable_memo(&self) {
        self.cache.enable();
    }

    /// The shared layout for a field-name sequence.
    pub(crate) fn struct_layout(&self, fields: &[Name]) -> StructLayout {
        if let Some(layout) = self.layouts.borrow().get(fields) {
            return layout.clone();
        }
        let layout = StructLayout::new(fields.to_vec());
        self.layouts
            .borrow_mut()
            .insert(fields.to_vec(), layout.clone());
        layout
    }

    /// Enter an invocation, failing past the recursion limit. The returned
    /// guard restores the depth when dropped.
    pub(crate) fn enter_call(self: &Rc<Self>, span: Span) -> EvalResult<DepthGuard> {
        let depth = self.depth.get();
        if depth >= MAX_CALL_DEPTH {
            return Err(invalid_operation(
                format!("recursion limit exceeded (limit: {MAX_CALL_DEPTH})"),
                span,
            ));
        }
        self.depth.set(depth + 1);
        Ok(DepthGuard(Rc::clone(self)))
    }
}

pub(crate) struct DepthGuard(Rc<Globals>);

impl Drop for DepthGuard {
    fn drop(&mut self) {
        let depth = self.0.depth.get();
        self.0.depth.set(depth.saturating_sub(1));
    }
}

/// An evaluation context: globals plus the local environment triple.
#[derive(Clone)]
pub struct Ctx {
    pub globals: Rc<Globals>,
    pub tenv: TypeEnv,
    pub fenv: FuncEnv,
    pub venv: VarEnv,
    /// Declared input positions of the relation being evaluated.
    pub inputs: Rc<[usize]>,
    pub cover: Coverage,
}

impl fmt::Debug for Ctx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ctx")
            .field("tenv", &self.tenv.len())
            .field("fenv", &self.fenv.len())
            .field("venv", &self.venv.len())
            .field("inputs", &self.inputs)
            .finish_non_exhaustive()
    }
}

impl Ctx {
    pub fn new(globals: Rc<Globals>) -> Self {
        Ctx {
            tenv: globals.proto_tenv.clone(),
            fenv: globals.proto_fenv.clone(),
            venv: globals.proto_venv.clone(),
            inputs: Rc::from(&[] as &[usize]),
            cover: Coverage::new(),
            globals,
        }
    }

    /// A fresh context for a callee: empty local environments, shared
    /// globals and coverage, caller's declared inputs preserved.
    #[must_use]
    pub fn localize(&self) -> Ctx {
        Ctx {
            globals: Rc::clone(&self.globals),
            tenv: self.globals.proto_tenv.clone(),
            fenv: self.globals.proto_fenv.clone(),
            venv: self.globals.proto_venv.clone(),
            inputs: Rc::clone(&self.inputs),
            cover: self.cover.clone(),
        }
    }

    /// Adopt a child's local environment triple.
    pub fn commit(&mut self, child: Ctx) {
        self.tenv = child.tenv;
        self.fenv = child.fenv;
        self.venv = child.venv;
    }

    /// This context with the given declared input positions.
    #[must_use]
    pub fn with_inputs(mut self, inputs: &[usize]) -> Ctx {
        self.inputs = Rc::from(inputs);
        self
    }

    /// This context with one more variable binding.
    #[must_use]
    pub fn bind(&self, var: &VarId, value: Value) -> Ctx {
        let mut next = self.clone();
        next.venv = self.venv.extend(var, value);
        next
    }

    pub fn lookup_var(&self, var: &VarId) -> Option<&Value> {
        self.venv.lookup(var)
    }

    pub(crate) fn name_str(&self, name: Name) -> String {
        self.globals.interner.lookup(name)
    }

    fn lookup_iterated(&self, var: &VarId, iter: Iter, span: Span) -> EvalResult<&Value> {
        let key = var.suffixed(iter);
        self.venv
            .lookup(&key)
            .ok_or_else(|| unbound_name(NameKind::Var, &self.name_str(var.name), span))
    }

    /// Optional-iteration sub-context over `vars`.
    ///
    /// Each var must be bound as an optional under its `?`-suffixed key.
    /// All absent yields `None`; all present yields one sub-context binding
    /// each var to its unwrapped value; a mix of the two is an error.
    pub fn sub_opt(&self, vars: &[VarId], span: Span) -> EvalResult<Option<Ctx>> {
        if vars.is_empty() {
            return Err(invalid_operation("iteration without variables", span));
        }
        let mut present: Vec<(&VarId, Value)> = Vec::with_capacity(vars.len());
        let mut absent = 0usize;
        for var in vars {
            let value = self.lookup_iterated(var, Iter::Opt, span)?;
            match value.as_opt() {
                Some(Some(inner)) => present.push((var, inner.clone())),
                Some(None) => absent += 1,
                None => {
                    return Err(invalid_operation(
                        format!(
                            "expected an optional for {}, got {}",
                            self.name_str(var.name),
                            value.type_name()
                        ),
                        span,
                    ));
                }
            }
        }
        if absent == vars.len() {
            return Ok(None);
        }
        if !present.is_empty() && absent > 0 {
            return Err(invalid_operation(
                "mixed optionality across iteration variables",
                span,
            ));
        }
        let mut sub = self.clone();
        for (var, value) in present {
            sub.venv = sub.venv.extend(var, value);
        }
        Ok(Some(sub))
    }

    /// List-iteration sub-contexts over `vars`: the zip of their bound
    /// lists, one sub-context per row.
    pub fn sub_list(&self, vars: &[VarId], span: Span) -> EvalResult<Vec<Ctx>> {
        if vars.is_empty() {
            return Err(invalid_operation("iteration without variables", span));
        }
        let mut columns: Vec<(&VarId, &[Value])> = Vec::with_capacity(vars.len());
        for var in vars {
            let value = self.lookup_iterated(var, Iter::List, span)?;
            let items = value.as_list().ok_or_else(|| {
                invalid_operation(
                    format!(
                        "expected a list for {}, got {}",
                        self.name_str(var.name),
                        value.type_name()
                    ),
                    span,
                )
            })?;
            if let Some((first_var, first)) = columns.first() {
                if first.len() != items.len() {
                    return Err(invalid_operation(
                        format!(
                            "cannot transpose: {} has {} elements, {} has {}",
                            self.name_str(first_var.name),
                            first.len(),
                            self.name_str(var.name),
                            items.len()
                        ),
                        span,
                    ));
                }
            }
            columns.push((var, items));
        }
        let rows = columns.first().map(|(_, c)| c.len()).unwrap_or(0);
        let mut subs = Vec::with_capacity(rows);
        for row in 0..rows {
            let mut sub = self.clone();
            for (var, column) in &columns {
                sub.venv = sub.venv.extend(var, column[row].clone());
            }
            subs.push(sub);
        }
        Ok(subs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ctx() -> Ctx {
        Ctx::new(Globals::new(SharedInterner::new()))
    }

    fn var(ctx: &Ctx, s: &str) -> VarId {
        VarId::plain(ctx.globals.interner.intern(s))
    }

    #[test]
    fn localize_clears_locals_and_keeps_globals() {
        let base = ctx();
        let x = var(&base, "x");
        let bound = base.bind(&x, Value::nat(1i64));
        let local = bound.localize();
        assert_eq!(local.lookup_var(&x), None);
        assert!(Rc::ptr_eq(&local.globals, &bound.globals));
    }

    #[test]
    fn sub_list_zips_rows() {
        let base = ctx();
        let x = var(&base, "x");
        let y = var(&base, "y");
        let bound = base
            .bind(
                &x.suffixed(Iter::List),
                Value::list(vec![Value::nat(1i64), Value::nat(2i64)]),
            )
            .bind(
                &y.suffixed(Iter::List),
                Value::list(vec![Value::nat(10i64), Value::nat(20i64)]),
            );
        let rows = bound.sub_list(&[x.clone(), y.clone()], Span::DUMMY).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].lookup_var(&x), Some(&Value::nat(1i64)));
        assert_eq!(rows[1].lookup_var(&y), Some(&Value::nat(20i64)));
    }

    #[test]
    fn sub_list_rejects_unequal_lengths() {
        let base = ctx();
        let x = var(&base, "x");
        let y = var(&base, "y");
        let bound = base
            .bind(&x.suffixed(Iter::List), Value::list(vec![Value::nat(1i64)]))
            .bind(&y.suffixed(Iter::List), Value::list(vec![]));
        let err = bound.sub_list(&[x, y], Span::DUMMY).unwrap_err();
        assert!(err.message.contains("cannot transpose"));
    }

    #[test]
    fn sub_opt_consensus() {
        let base = ctx();
        let x = var(&base, "x");
        let y = var(&base, "y");

        let all_absent = base
            .bind(&x.suffixed(Iter::Opt), Value::none())
            .bind(&y.suffixed(Iter::Opt), Value::none());
        assert!(all_absent.sub_opt(&[x.clone(), y.clone()], Span::DUMMY).unwrap().is_none());

        let all_present = base
            .bind(&x.suffixed(Iter::Opt), Value::some(Value::nat(1i64)))
            .bind(&y.suffixed(Iter::Opt), Value::some(Value::nat(2i64)));
        let sub = all_present
            .sub_opt(&[x.clone(), y.clone()], Span::DUMMY)
            .unwrap()
            .unwrap();
        assert_eq!(sub.lookup_var(&x), Some(&Value::nat(1i64)));

        let mixed = base
            .bind(&x.suffixed(Iter::Opt), Value::some(Value::nat(1i64)))
            .bind(&y.suffixed(Iter::Opt), Value::none());
        assert!(mixed.sub_opt(&[x, y], Span::DUMMY).is_err());
    }
}
