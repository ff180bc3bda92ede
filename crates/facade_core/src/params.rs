use indexmap::IndexSet;

use crate::context::TranslationContext;
use crate::diagnostics::TranslateError;
use crate::ident;
use crate::merge::{MergedTypeSet, TypeMerger};
use crate::names::NameKind;
use crate::types::{Param, TypeRef};

/// One parameter position across several signatures. `types` holds the
/// type of a single argument, so a rest parameter contributes its element
/// type.
#[derive(Debug, Clone, Default)]
pub struct MergedParameter {
    pub name_candidates: IndexSet<String>,
    pub types: MergedTypeSet,
    pub optional: bool,
    /// Still variadic: every contributing signature has a rest parameter here.
    pub rest: bool,
}

impl MergedParameter {
    /// `a` for one candidate, `a_b` for several, escaped when needed.
    pub fn name(&self) -> String {
        let joined = self
            .name_candidates
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("_");
        ident::escape(&joined, NameKind::Value).unwrap_or_else(|| ident::sanitize(&joined))
    }

    /// Collapse back into a source parameter. A rest position gets its
    /// array type back.
    pub fn to_param(&self) -> Param {
        let ty = match self.types.len() {
            0 => TypeRef::any(),
            1 => self.types.types().next().cloned().unwrap_or_else(TypeRef::any),
            _ => TypeRef::Union(self.types.types().cloned().collect()),
        };
        let ty = if self.rest { TypeRef::array(ty) } else { ty };
        Param {
            name: self.name(),
            ty,
            optional: self.optional && !self.rest,
            rest: self.rest,
        }
    }
}

/// Folds parameter lists of several signatures into one that accepts every
/// call any of them accepts.
///
/// After folding signatures of lengths `n1..nk` the result has `max(n)`
/// positions, and every position past the shortest one is optional. A rest
/// parameter accepts zero arguments, so any position that has one is
/// optional too.
pub struct ParameterMerger {
    merged: Vec<Slot>,
}

struct Slot {
    names: IndexSet<String>,
    types: TypeMerger,
    optional: bool,
    rest: bool,
}

impl Slot {
    fn new(ctx: &mut TranslationContext<'_>, param: &Param, optional: bool) -> Result<Self, TranslateError> {
        let mut types = TypeMerger::new();
        types.merge(ctx, param.argument_type())?;
        Ok(Self {
            names: IndexSet::from([param.name.clone()]),
            types,
            optional: optional || param.optional || param.rest,
            rest: param.rest,
        })
    }
}

impl ParameterMerger {
    pub fn new(ctx: &mut TranslationContext<'_>, baseline: &[Param]) -> Result<Self, TranslateError> {
        let merged = baseline
            .iter()
            .map(|param| Slot::new(ctx, param, false))
            .collect::<Result<_, _>>()?;
        Ok(Self { merged })
    }

    pub fn fold_in(&mut self, ctx: &mut TranslationContext<'_>, next: &[Param]) -> Result<(), TranslateError> {
        for (i, param) in next.iter().enumerate() {
            match self.merged.get_mut(i) {
                Some(slot) => {
                    slot.names.insert(param.name.clone());
                    slot.types.merge(ctx, param.argument_type())?;
                    slot.optional |= param.optional || param.rest;
                    slot.rest &= param.rest;
                }
                None => {
                    let mut slot = Slot::new(ctx, param, true)?;
                    slot.rest = false;
                    self.merged.push(slot);
                }
            }
        }
        for slot in self.merged.iter_mut().skip(next.len()) {
            slot.optional = true;
            slot.rest = false;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.merged.len()
    }

    pub fn is_empty(&self) -> bool {
        self.merged.is_empty()
    }

    pub fn finish(self) -> Vec<MergedParameter> {
        self.merged
            .into_iter()
            .map(|slot| MergedParameter {
                name_candidates: slot.names,
                types: slot.types.into_set(),
                optional: slot.optional,
                rest: slot.rest,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::ReportMode;
    use crate::resolve::UnionPolicy;
    use crate::symbols::SymbolTable;

    fn fold(lists: &[Vec<Param>]) -> Vec<MergedParameter> {
        let table = SymbolTable::new();
        let mut ctx = TranslationContext::new(&table, ReportMode::Batch, UnionPolicy::default());
        let mut merger = ParameterMerger::new(&mut ctx, &lists[0]).unwrap();
        for list in &lists[1..] {
            merger.fold_in(&mut ctx, list).unwrap();
        }
        merger.finish()
    }

    #[test]
    fn test_arity_law() {
        let lists = vec![
            vec![Param::new("a", TypeRef::string()), Param::new("b", TypeRef::number())],
            vec![Param::new("a", TypeRef::string())],
            vec![
                Param::new("a", TypeRef::number()),
                Param::new("b", TypeRef::number()),
                Param::new("c", TypeRef::boolean()),
            ],
        ];
        let merged = fold(&lists);
        let shortest = lists.iter().map(Vec::len).min().unwrap_or(0);
        assert_eq!(merged.len(), 3);
        for (i, param) in merged.iter().enumerate() {
            assert_eq!(param.optional, i >= shortest, "position {i}");
        }
        assert_eq!(merged[0].types.len(), 2);
        assert_eq!(merged[1].types.len(), 1);
    }

    #[test]
    fn test_names_are_combined() {
        let merged = fold(&[
            vec![Param::new("value", TypeRef::string())],
            vec![Param::new("index", TypeRef::number())],
            vec![Param::new("value", TypeRef::string())],
        ]);
        assert_eq!(merged[0].name(), "value_index");
        assert_eq!(merged[0].to_param().ty, TypeRef::Union(vec![TypeRef::string(), TypeRef::number()]));
    }

    #[test]
    fn test_optional_is_sticky() {
        let merged = fold(&[
            vec![Param::new("a", TypeRef::string()).optional()],
            vec![Param::new("a", TypeRef::string())],
        ]);
        assert!(merged[0].optional);
    }

    #[test]
    fn test_rest_needs_every_signature() {
        let rest = Param::new("xs", TypeRef::array(TypeRef::any())).rest();
        let both = fold(&[vec![rest.clone()], vec![rest.clone()]]);
        assert!(both[0].rest);
        assert!(both[0].to_param().rest);

        let one = fold(&[vec![rest], vec![Param::new("x", TypeRef::any())]]);
        assert!(!one[0].rest);
    }

    #[test]
    fn test_rest_folded_with_plain_parameter_is_optional() {
        let merged = fold(&[
            vec![Param::new("xs", TypeRef::array(TypeRef::number())).rest()],
            vec![Param::new("a", TypeRef::string())],
        ]);
        assert_eq!(merged.len(), 1);
        assert!(merged[0].optional);
        assert!(!merged[0].rest);
        // The rest position contributes one argument's type, not the array.
        assert_eq!(
            merged[0].types.types().cloned().collect::<Vec<_>>(),
            vec![TypeRef::number(), TypeRef::string()]
        );
        let param = merged[0].to_param();
        assert!(param.optional);
        assert_eq!(param.ty, TypeRef::Union(vec![TypeRef::number(), TypeRef::string()]));
    }

    #[test]
    fn test_plain_parameter_folded_with_rest_is_optional() {
        let merged = fold(&[
            vec![Param::new("a", TypeRef::string())],
            vec![Param::new("xs", TypeRef::array(TypeRef::string())).rest()],
        ]);
        assert!(merged[0].optional);
        assert_eq!(merged[0].types.len(), 1);
    }

    #[test]
    fn test_shared_rest_keeps_array_type() {
        let rest = Param::new("xs", TypeRef::array(TypeRef::number())).rest();
        let merged = fold(&[vec![rest.clone()], vec![rest]]);
        let param = merged[0].to_param();
        assert!(param.rest);
        assert!(!param.optional);
        assert_eq!(param.ty, TypeRef::array(TypeRef::number()));
    }

    #[test]
    fn test_reserved_name_is_escaped() {
        let merged = fold(&[vec![Param::new("in", TypeRef::string())]]);
        assert_eq!(merged[0].name(), "$in");
    }
}
