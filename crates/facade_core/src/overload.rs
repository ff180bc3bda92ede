use indexmap::IndexMap;
use tracing::debug;

use crate::context::TranslationContext;
use crate::diagnostics::TranslateError;
use crate::merge::TypeMerger;
use crate::params::ParameterMerger;
use crate::source_text::member_signature_text;
use crate::types::{FunctionSig, Member, MemberKind, TypeRef};

/// Which members compete for the same declaration slot in the target.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OverloadKey {
    Named { name: String, is_static: bool },
    Call,
    Construct,
    Index,
}

impl OverloadKey {
    /// Properties and nested declarations never overload.
    pub fn of(member: &Member) -> Option<Self> {
        match &member.kind {
            MemberKind::Method { .. } => member.name.as_ref().map(|name| OverloadKey::Named {
                name: name.clone(),
                is_static: member.is_static,
            }),
            MemberKind::Call(_) => Some(OverloadKey::Call),
            MemberKind::Construct(_) => Some(OverloadKey::Construct),
            MemberKind::Index(_) => Some(OverloadKey::Index),
            MemberKind::Property { .. } | MemberKind::Nested(_) => None,
        }
    }
}

/// Several source signatures replaced by one.
#[derive(Debug, Clone)]
pub struct MergedOverload {
    pub key: OverloadKey,
    /// The source signatures, in declaration order.
    pub originals: Vec<Member>,
    /// One line of source text per original, kept as documentation.
    pub docs: Vec<String>,
    /// The only declaration that is emitted.
    pub merged: Member,
}

#[derive(Debug, Clone)]
pub enum MemberGroup {
    Single(Member),
    Merged(MergedOverload),
}

impl MemberGroup {
    /// The member that stands in the output.
    pub fn effective(&self) -> &Member {
        match self {
            MemberGroup::Single(member) => member,
            MemberGroup::Merged(merged) => &merged.merged,
        }
    }

    pub fn docs(&self) -> &[String] {
        match self {
            MemberGroup::Single(_) => &[],
            MemberGroup::Merged(merged) => &merged.docs,
        }
    }
}

pub struct OverloadGrouper;

impl OverloadGrouper {
    /// Bucket members by [`OverloadKey`]. Buckets appear where their first
    /// member appeared; members of one bucket need not be adjacent.
    pub fn group(members: &[Member]) -> Vec<Vec<&Member>> {
        let mut buckets: Vec<Vec<&Member>> = Vec::new();
        let mut by_key: IndexMap<OverloadKey, usize> = IndexMap::new();
        for member in members {
            match OverloadKey::of(member) {
                Some(key) => match by_key.get(&key) {
                    Some(&index) => buckets[index].push(member),
                    None => {
                        by_key.insert(key, buckets.len());
                        buckets.push(vec![member]);
                    }
                },
                None => buckets.push(vec![member]),
            }
        }
        buckets
    }

    /// Group `members` and merge every bucket with more than one signature.
    pub fn apply(ctx: &mut TranslationContext<'_>, members: &[Member]) -> Result<Vec<MemberGroup>, TranslateError> {
        Self::group(members)
            .into_iter()
            .map(|bucket| merge_signatures(ctx, &bucket))
            .collect()
    }
}

/// Collapse one bucket into a single member.
pub fn merge_signatures(ctx: &mut TranslationContext<'_>, bucket: &[&Member]) -> Result<MemberGroup, TranslateError> {
    let Some((first, rest)) = bucket.split_first() else {
        return Err(TranslateError::structural(ctx.position(), "empty overload group"));
    };
    let (Some(key), false) = (OverloadKey::of(first), rest.is_empty()) else {
        return Ok(MemberGroup::Single((*first).clone()));
    };

    let sigs: Vec<&FunctionSig> = bucket.iter().filter_map(|m| m.signature()).collect();
    let Some((base, others)) = sigs.split_first() else {
        return Ok(MemberGroup::Single((*first).clone()));
    };

    ctx.at(first.span);
    let mut params = ParameterMerger::new(ctx, &base.params)?;
    let mut returns = TypeMerger::new();
    returns.merge(ctx, &base.return_type)?;
    let mut type_params = base.type_params.clone();
    for sig in others {
        params.fold_in(ctx, &sig.params)?;
        returns.merge(ctx, &sig.return_type)?;
        for tp in &sig.type_params {
            if !type_params.contains(tp) {
                type_params.push(tp.clone());
            }
        }
    }

    let sig = FunctionSig::new(
        params.finish().iter().map(|p| p.to_param()).collect(),
        returns.to_representative().unwrap_or_else(TypeRef::void),
    )
    .with_type_params(type_params);

    let kind = match &first.kind {
        MemberKind::Method { .. } => MemberKind::Method {
            sig,
            optional: bucket
                .iter()
                .all(|m| matches!(m.kind, MemberKind::Method { optional: true, .. })),
        },
        MemberKind::Call(_) => MemberKind::Call(sig),
        MemberKind::Construct(_) => MemberKind::Construct(sig),
        MemberKind::Index(_) => MemberKind::Index(sig),
        MemberKind::Property { .. } | MemberKind::Nested(_) => {
            return Err(TranslateError::structural(first.span, "overload key on a non-callable member"));
        }
    };

    let symbols = ctx.symbols();
    let docs = bucket
        .iter()
        .map(|m| member_signature_text(m, symbols))
        .collect();
    debug!(?key, count = bucket.len(), "merged overloads");

    Ok(MemberGroup::Merged(MergedOverload {
        key,
        originals: bucket.iter().map(|m| (*m).clone()).collect(),
        docs,
        merged: Member {
            name: first.name.clone(),
            kind,
            is_static: first.is_static,
            span: first.span,
        },
    }))
}
