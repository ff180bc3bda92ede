use oxc_span::Span;

// ---------------------------------------------------------------------------
// Handles
// ---------------------------------------------------------------------------

/// Handle of a declaration registered in the symbol table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(pub u32);

/// Handle of an input source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(pub u32);

impl FileId {
    /// Pseudo-file owning symbols that come from the target platform rather
    /// than from any input (e.g. `Promise`, `Date`).
    pub const AMBIENT: FileId = FileId(u32::MAX);
}

// ---------------------------------------------------------------------------
// Source type expressions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Number,
    String,
    Boolean,
    Null,
    Undefined,
    Void,
    Never,
    Any,
    Unknown,
    Object,
    Symbol,
    BigInt,
}

impl PrimitiveKind {
    /// The source keyword spelling.
    pub fn keyword(self) -> &'static str {
        match self {
            PrimitiveKind::Number => "number",
            PrimitiveKind::String => "string",
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Null => "null",
            PrimitiveKind::Undefined => "undefined",
            PrimitiveKind::Void => "void",
            PrimitiveKind::Never => "never",
            PrimitiveKind::Any => "any",
            PrimitiveKind::Unknown => "unknown",
            PrimitiveKind::Object => "object",
            PrimitiveKind::Symbol => "symbol",
            PrimitiveKind::BigInt => "bigint",
        }
    }

    /// `void`, `undefined` and `never` all mean "no value".
    pub fn is_absent(self) -> bool {
        matches!(
            self,
            PrimitiveKind::Void | PrimitiveKind::Undefined | PrimitiveKind::Never
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LiteralKind {
    String,
    Number,
    Boolean,
    BigInt,
    Template,
}

/// A source type expression.
///
/// Built once by the frontend lowering and never mutated afterwards; every
/// transformation (alias substitution, merging) produces fresh values.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeRef {
    Primitive(PrimitiveKind),
    /// `Foo<A, B>` referring to a class, interface, enum or alias.
    Nominal {
        symbol: SymbolId,
        type_args: Vec<TypeRef>,
    },
    Function(FunctionSig),
    /// `T[]`
    Array(Box<TypeRef>),
    /// `[A, B]`
    Tuple(Vec<TypeRef>),
    /// `{ a: A; (x: X): Y; [k: string]: V }`
    Structural(Vec<Member>),
    /// Direct reference to an alias declaration; arguments, if any, come
    /// from the reference site.
    Alias(SymbolId),
    TypeParam(String),
    /// `'a'`, `1`, `true`; `text` is the literal as written.
    Literal {
        kind: LiteralKind,
        text: String,
    },
    Union(Vec<TypeRef>),
    Intersection(Vec<TypeRef>),
    /// A construct the frontend could not lower, kept as source text.
    Unresolved(String),
}

impl TypeRef {
    pub fn primitive(kind: PrimitiveKind) -> Self {
        TypeRef::Primitive(kind)
    }

    pub fn any() -> Self {
        TypeRef::Primitive(PrimitiveKind::Any)
    }

    pub fn void() -> Self {
        TypeRef::Primitive(PrimitiveKind::Void)
    }

    pub fn number() -> Self {
        TypeRef::Primitive(PrimitiveKind::Number)
    }

    pub fn string() -> Self {
        TypeRef::Primitive(PrimitiveKind::String)
    }

    pub fn boolean() -> Self {
        TypeRef::Primitive(PrimitiveKind::Boolean)
    }

    pub fn nominal(symbol: SymbolId) -> Self {
        TypeRef::Nominal {
            symbol,
            type_args: Vec::new(),
        }
    }

    pub fn generic(symbol: SymbolId, type_args: Vec<TypeRef>) -> Self {
        TypeRef::Nominal { symbol, type_args }
    }

    pub fn array(elem: TypeRef) -> Self {
        TypeRef::Array(Box::new(elem))
    }

    pub fn type_param(name: impl Into<String>) -> Self {
        TypeRef::TypeParam(name.into())
    }

    /// Whether this type denotes the absent value (`void`, `undefined`, `never`).
    pub fn is_absent(&self) -> bool {
        matches!(self, TypeRef::Primitive(kind) if kind.is_absent())
    }
}

// ---------------------------------------------------------------------------
// Signatures and members
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: TypeRef,
    pub optional: bool,
    /// `...rest` parameter.
    pub rest: bool,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            optional: false,
            rest: false,
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn rest(mut self) -> Self {
        self.rest = true;
        self
    }

    /// The type of one argument: `T` for `...xs: T[]`.
    pub fn argument_type(&self) -> &TypeRef {
        match &self.ty {
            TypeRef::Array(elem) if self.rest => elem,
            ty => ty,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionSig {
    pub type_params: Vec<String>,
    pub params: Vec<Param>,
    pub return_type: Box<TypeRef>,
}

impl FunctionSig {
    pub fn new(params: Vec<Param>, return_type: TypeRef) -> Self {
        Self {
            type_params: Vec::new(),
            params,
            return_type: Box::new(return_type),
        }
    }

    pub fn with_type_params(mut self, type_params: Vec<String>) -> Self {
        self.type_params = type_params;
        self
    }

    /// Variadic arity cannot be expressed nominally.
    pub fn has_variadic(&self) -> bool {
        self.params.iter().any(|p| p.rest)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MemberKind {
    /// Data field, getter/setter pair, or variable.
    Property {
        ty: TypeRef,
        optional: bool,
        readonly: bool,
    },
    Method {
        sig: FunctionSig,
        optional: bool,
    },
    /// `(x): y` in an interface or type literal.
    Call(FunctionSig),
    /// `new (x): y` in an interface, or a class constructor.
    Construct(FunctionSig),
    /// `[key: K]: V`, stored as a one-parameter signature returning `V`.
    Index(FunctionSig),
    /// A type declaration nested in a namespace body.
    Nested(SymbolId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    /// `None` for call, construct and index signatures.
    pub name: Option<String>,
    pub kind: MemberKind,
    pub is_static: bool,
    pub span: Span,
}

impl Member {
    pub fn property(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: Some(name.into()),
            kind: MemberKind::Property {
                ty,
                optional: false,
                readonly: false,
            },
            is_static: false,
            span: Span::default(),
        }
    }

    pub fn method(name: impl Into<String>, sig: FunctionSig) -> Self {
        Self {
            name: Some(name.into()),
            kind: MemberKind::Method {
                sig,
                optional: false,
            },
            is_static: false,
            span: Span::default(),
        }
    }

    pub fn call(sig: FunctionSig) -> Self {
        Self::unnamed(MemberKind::Call(sig))
    }

    pub fn construct(sig: FunctionSig) -> Self {
        Self::unnamed(MemberKind::Construct(sig))
    }

    pub fn index(key_name: impl Into<String>, key: TypeRef, value: TypeRef) -> Self {
        Self::unnamed(MemberKind::Index(FunctionSig::new(
            vec![Param::new(key_name, key)],
            value,
        )))
    }

    fn unnamed(kind: MemberKind) -> Self {
        Self {
            name: None,
            kind,
            is_static: false,
            span: Span::default(),
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    /// The signature carried by callable members.
    pub fn signature(&self) -> Option<&FunctionSig> {
        match &self.kind {
            MemberKind::Method { sig, .. }
            | MemberKind::Call(sig)
            | MemberKind::Construct(sig)
            | MemberKind::Index(sig) => Some(sig),
            MemberKind::Property { .. } | MemberKind::Nested(_) => None,
        }
    }
}
