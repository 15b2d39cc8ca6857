//! TypeScript syntax tree used for code generation.
//!
//! - TsType: type positions (primitives, arrays, unions, index signatures)
//! - TsExpr / TsStmt: expressions and statements inside function bodies
//! - TsItem: module-level declarations (namespaces, classes, interfaces, enums)

/// TypeScript type representation
#[derive(Debug, Clone, PartialEq)]
pub enum TsType {
    Primitive(TsPrimitive),
    /// Array type: T[]
    Array(Box<TsType>),
    /// Union type: A | B | C
    Union(Vec<TsType>),
    /// Index signature object: { [key: K]: V }
    IndexSignature {
        key: Box<TsType>,
        value: Box<TsType>,
    },
    Literal(TsLiteral),
    /// Named type reference, possibly qualified: "MyApp.User"
    Ref(String),
    /// Generic instantiation: Page<Item>
    Generic { name: String, args: Vec<TsType> },
    /// Function type: (result: T) => any
    Function {
        params: Vec<TsParam>,
        return_type: Box<TsType>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TsPrimitive {
    String,
    Number,
    Boolean,
    Null,
    Void,
    Undefined,
    Any,
}

/// Interface property
#[derive(Debug, Clone, PartialEq)]
pub struct TsProp {
    pub name: String,
    pub ty: TsType,
    pub optional: bool,
}

/// Interface method signature: done(cb: ...): ISignalRPromise<T>;
#[derive(Debug, Clone, PartialEq)]
pub struct TsMethodSig {
    pub name: String,
    pub params: Vec<TsParam>,
    pub return_type: TsType,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TsLiteral {
    String(String),
    Int(i64),
    Bool(bool),
    Null,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TsExpr {
    Ident(String),
    Literal(TsLiteral),
    /// Function call: foo(a, b)
    Call {
        callee: Box<TsExpr>,
        args: Vec<TsExpr>,
    },
    /// Arrow function with an expression body: (x: T): R => x.foo
    Arrow {
        params: Vec<TsParam>,
        return_type: Option<TsType>,
        body: Box<TsExpr>,
    },
    /// Member access: foo.bar
    Member { object: Box<TsExpr>, prop: String },
    /// Index/bracket access: obj[key]
    Index {
        object: Box<TsExpr>,
        index: Box<TsExpr>,
    },
    BinOp {
        left: Box<TsExpr>,
        op: BinOp,
        right: Box<TsExpr>,
    },
    /// new Ajax(...)
    New {
        callee: Box<TsExpr>,
        args: Vec<TsExpr>,
    },
    /// cond ? a : b
    Ternary {
        cond: Box<TsExpr>,
        then_expr: Box<TsExpr>,
        else_expr: Box<TsExpr>,
    },
    Array(Vec<TsExpr>),
    /// Object literal: { ...value }
    Object(Vec<ObjectEntry>),
    Raw(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ObjectEntry {
    Prop(String, TsExpr),
    Spread(TsExpr),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Assign,
    LooseEqual,
    Or,
}

/// Function parameter
#[derive(Debug, Clone, PartialEq)]
pub struct TsParam {
    pub name: String,
    pub ty: Option<TsType>,
    pub optional: bool,
}

impl TsParam {
    pub fn new(name: impl Into<String>, ty: TsType) -> Self {
        Self {
            name: name.into(),
            ty: Some(ty),
            optional: false,
        }
    }

    pub fn optional(name: impl Into<String>, ty: TsType) -> Self {
        Self {
            name: name.into(),
            ty: Some(ty),
            optional: true,
        }
    }
}

/// Statement in a function body
#[derive(Debug, Clone, PartialEq)]
pub enum TsStmt {
    VarDecl {
        kind: VarKind,
        name: String,
        ty: Option<TsType>,
        init: TsExpr,
    },
    Expr(TsExpr),
    Return(Option<TsExpr>),
    If {
        cond: TsExpr,
        then_body: Vec<TsStmt>,
        else_body: Option<Vec<TsStmt>>,
    },
    /// for (const binding of iterable) { ... }
    ForOf {
        binding: String,
        iterable: TsExpr,
        body: Vec<TsStmt>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    Const,
    Let,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TsFunction {
    pub name: String,
    pub type_params: Vec<String>,
    pub params: Vec<TsParam>,
    pub return_type: Option<TsType>,
    pub body: Vec<TsStmt>,
    pub is_export: bool,
}

// =============================================================================
// Module-Level Items
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct TsImport {
    pub items: Vec<ImportItem>,
    /// `import * as ns from ...`; takes precedence over `items`.
    pub namespace: Option<String>,
    pub from: String,
    pub type_only: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportItem {
    pub name: String,
    pub alias: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeDefKind {
    /// interface Foo<T> extends Base { ... }
    Interface {
        type_params: Vec<String>,
        extends: Option<TsType>,
        properties: Vec<TsProp>,
        methods: Vec<TsMethodSig>,
    },
    /// type Foo = ...
    TypeAlias { ty: TsType },
    /// enum Foo { A = 0 } / const enum Foo { ... }
    Enum {
        is_const: bool,
        members: Vec<(String, TsLiteral)>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TsTypeDef {
    pub name: String,
    pub is_export: bool,
    pub kind: TypeDefKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Private,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TsField {
    pub name: String,
    pub ty: TsType,
    pub visibility: Visibility,
    pub readonly: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TsMethod {
    pub name: String,
    pub params: Vec<TsParam>,
    pub return_type: Option<TsType>,
    pub body: Vec<TsStmt>,
    pub visibility: Visibility,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TsClass {
    pub name: String,
    pub extends: Option<String>,
    pub is_export: bool,
    pub fields: Vec<TsField>,
    /// Constructor parameters and body; `None` omits the constructor.
    pub constructor: Option<(Vec<TsParam>, Vec<TsStmt>)>,
    pub methods: Vec<TsMethod>,
}

/// Initializer of a module-level constant. Objects print one entry per line.
#[derive(Debug, Clone, PartialEq)]
pub enum TsInit {
    Expr(TsExpr),
    Object(Vec<(String, TsInit)>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TsNamespace {
    pub name: String,
    pub declare: bool,
    pub items: Vec<TsItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TsItem {
    Import(TsImport),
    TypeDef(TsTypeDef),
    Namespace(TsNamespace),
    Class(TsClass),
    Function(TsFunction),
    Const {
        name: String,
        is_export: bool,
        ty: Option<TsType>,
        init: TsInit,
    },
    Stmt(TsStmt),
    /// Verbatim text (helper snippets, banners); re-indented line by line.
    Raw(String),
}

/// Complete TypeScript source file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TsModule {
    pub items: Vec<TsItem>,
}

// Small constructors used throughout code generation.

pub fn ident(name: impl Into<String>) -> TsExpr {
    TsExpr::Ident(name.into())
}

pub fn string_lit(value: impl Into<String>) -> TsExpr {
    TsExpr::Literal(TsLiteral::String(value.into()))
}

pub fn call(callee: TsExpr, args: Vec<TsExpr>) -> TsExpr {
    TsExpr::Call {
        callee: Box::new(callee),
        args,
    }
}

pub fn member(object: TsExpr, prop: impl Into<String>) -> TsExpr {
    TsExpr::Member {
        object: Box::new(object),
        prop: prop.into(),
    }
}

pub fn binop(left: TsExpr, op: BinOp, right: TsExpr) -> TsExpr {
    TsExpr::BinOp {
        left: Box::new(left),
        op,
        right: Box::new(right),
    }
}

pub fn this_member(prop: impl Into<String>) -> TsExpr {
    member(ident("this"), prop)
}
