//! TypeScript code emission.
//!
//! Inline nodes (types, expressions, parameters) implement [`Emit`] and
//! produce a single string. Block nodes (statements, declarations) implement
//! [`EmitBlock`] and write lines into a [`Printer`], which owns indentation,
//! so nothing below this module counts spaces.

use super::types::{
    BinOp, ImportItem, ObjectEntry, TsClass, TsExpr, TsField, TsFunction, TsImport, TsInit, TsItem, TsLiteral,
    TsMethod, TsMethodSig, TsModule, TsNamespace, TsParam, TsPrimitive, TsProp, TsStmt, TsType, TsTypeDef, TypeDefKind, VarKind,
    Visibility,
};
use super::utils::{escape_js_string, needs_bracket_notation, quote_if_needed};

/// Trait for emitting inline TypeScript code from AST nodes.
pub trait Emit {
    /// Convert the AST node to its TypeScript string representation.
    fn emit(&self) -> String;
}

/// Trait for nodes that span one or more full lines.
pub trait EmitBlock {
    fn emit_block(&self, p: &mut Printer);
}

/// Line-oriented output buffer with a configurable indentation unit.
#[derive(Debug)]
pub struct Printer {
    indent: String,
    depth: usize,
    out: String,
}

impl Printer {
    pub fn new(indent: &str) -> Self {
        Self {
            indent: indent.to_string(),
            depth: 0,
            out: String::new(),
        }
    }

    pub fn line(&mut self, text: &str) {
        if !text.is_empty() {
            for _ in 0..self.depth {
                self.out.push_str(&self.indent);
            }
            self.out.push_str(text);
        }
        self.out.push('\n');
    }

    pub fn blank(&mut self) {
        self.out.push('\n');
    }

    pub fn indented(&mut self, f: impl FnOnce(&mut Self)) {
        self.depth += 1;
        f(self);
        self.depth -= 1;
    }

    /// Write multi-line text, indenting every line at the current depth.
    pub fn raw(&mut self, text: &str) {
        for line in text.lines() {
            self.line(line);
        }
    }

    pub fn finish(self) -> String {
        self.out
    }
}

fn join<T: Emit>(items: &[T]) -> String {
    items.iter().map(|i| i.emit()).collect::<Vec<_>>().join(", ")
}

// =============================================================================
// Types
// =============================================================================

impl Emit for TsPrimitive {
    fn emit(&self) -> String {
        match self {
            TsPrimitive::String => "string".to_string(),
            TsPrimitive::Number => "number".to_string(),
            TsPrimitive::Boolean => "boolean".to_string(),
            TsPrimitive::Null => "null".to_string(),
            TsPrimitive::Void => "void".to_string(),
            TsPrimitive::Undefined => "undefined".to_string(),
            TsPrimitive::Any => "any".to_string(),
        }
    }
}

impl Emit for TsLiteral {
    fn emit(&self) -> String {
        match self {
            TsLiteral::String(s) => format!("\"{}\"", escape_js_string(s)),
            TsLiteral::Int(i) => i.to_string(),
            TsLiteral::Bool(b) => b.to_string(),
            TsLiteral::Null => "null".to_string(),
        }
    }
}

impl Emit for TsType {
    fn emit(&self) -> String {
        match self {
            TsType::Primitive(p) => p.emit(),
            TsType::Array(inner) => {
                let inner_str = inner.emit();
                if matches!(**inner, TsType::Union(_) | TsType::Function { .. }) {
                    format!("({inner_str})[]")
                } else {
                    format!("{inner_str}[]")
                }
            }
            TsType::Union(types) => types.iter().map(|t| t.emit()).collect::<Vec<_>>().join(" | "),
            TsType::IndexSignature { key, value } => {
                format!("{{ [key: {}]: {} }}", key.emit(), value.emit())
            }
            TsType::Literal(lit) => lit.emit(),
            TsType::Ref(name) => name.clone(),
            TsType::Generic { name, args } => format!("{name}<{}>", join(args)),
            TsType::Function { params, return_type } => format!("({}) => {}", join(params), return_type.emit()),
        }
    }
}

impl Emit for TsMethodSig {
    fn emit(&self) -> String {
        format!("{}({}): {}", self.name, join(&self.params), self.return_type.emit())
    }
}

impl Emit for TsProp {
    fn emit(&self) -> String {
        let key = quote_if_needed(&self.name);
        let opt = if self.optional { "?" } else { "" };
        format!("{key}{opt}: {}", self.ty.emit())
    }
}

// =============================================================================
// Expressions
// =============================================================================

impl Emit for BinOp {
    fn emit(&self) -> String {
        match self {
            BinOp::Add => "+".to_string(),
            BinOp::Assign => "=".to_string(),
            BinOp::LooseEqual => "==".to_string(),
            BinOp::Or => "||".to_string(),
        }
    }
}

impl Emit for TsExpr {
    fn emit(&self) -> String {
        match self {
            TsExpr::Ident(name) => name.clone(),
            TsExpr::Literal(lit) => lit.emit(),
            TsExpr::Call { callee, args } => format!("{}({})", callee.emit(), join(args)),
            TsExpr::Arrow {
                params,
                return_type,
                body,
            } => {
                let ret = return_type
                    .as_ref()
                    .map(|t| format!(": {}", t.emit()))
                    .unwrap_or_default();
                format!("({}){ret} => {}", join(params), body.emit())
            }
            TsExpr::Member { object, prop } => {
                if needs_bracket_notation(prop) {
                    format!("{}[\"{}\"]", object.emit(), escape_js_string(prop))
                } else {
                    format!("{}.{prop}", object.emit())
                }
            }
            TsExpr::Index { object, index } => format!("{}[{}]", object.emit(), index.emit()),
            TsExpr::BinOp { left, op, right } => {
                format!("{} {} {}", left.emit(), op.emit(), right.emit())
            }
            TsExpr::New { callee, args } => format!("new {}({})", callee.emit(), join(args)),
            TsExpr::Ternary {
                cond,
                then_expr,
                else_expr,
            } => {
                let cond_str = if matches!(**cond, TsExpr::BinOp { .. }) {
                    format!("({})", cond.emit())
                } else {
                    cond.emit()
                };
                format!("{cond_str} ? {} : {}", then_expr.emit(), else_expr.emit())
            }
            TsExpr::Array(items) => format!("[{}]", join(items)),
            TsExpr::Object(entries) => {
                if entries.is_empty() {
                    "{}".to_string()
                } else {
                    let parts: Vec<_> = entries
                        .iter()
                        .map(|entry| match entry {
                            ObjectEntry::Prop(k, v) => format!("{}: {}", quote_if_needed(k), v.emit()),
                            ObjectEntry::Spread(e) => format!("...{}", e.emit()),
                        })
                        .collect();
                    format!("{{ {} }}", parts.join(", "))
                }
            }
            TsExpr::Raw(code) => code.clone(),
        }
    }
}

impl Emit for TsParam {
    fn emit(&self) -> String {
        let opt = if self.optional { "?" } else { "" };
        match &self.ty {
            Some(ty) => format!("{}{}: {}", self.name, opt, ty.emit()),
            None => format!("{}{}", self.name, opt),
        }
    }
}

// =============================================================================
// Statements
// =============================================================================

impl Emit for VarKind {
    fn emit(&self) -> String {
        match self {
            VarKind::Const => "const".to_string(),
            VarKind::Let => "let".to_string(),
        }
    }
}

fn emit_body(p: &mut Printer, body: &[TsStmt]) {
    p.indented(|p| {
        for stmt in body {
            stmt.emit_block(p);
        }
    });
}

impl EmitBlock for TsStmt {
    fn emit_block(&self, p: &mut Printer) {
        match self {
            TsStmt::VarDecl { kind, name, ty, init } => {
                let ty_str = ty.as_ref().map(|t| format!(": {}", t.emit())).unwrap_or_default();
                p.line(&format!("{} {name}{ty_str} = {};", kind.emit(), init.emit()));
            }
            TsStmt::Expr(expr) => p.line(&format!("{};", expr.emit())),
            TsStmt::Return(expr) => match expr {
                Some(e) => p.line(&format!("return {};", e.emit())),
                None => p.line("return;"),
            },
            TsStmt::If {
                cond,
                then_body,
                else_body,
            } => {
                p.line(&format!("if ({}) {{", cond.emit()));
                emit_body(p, then_body);
                if let Some(else_stmts) = else_body {
                    p.line("} else {");
                    emit_body(p, else_stmts);
                }
                p.line("}");
            }
            TsStmt::ForOf {
                binding,
                iterable,
                body,
            } => {
                p.line(&format!("for (const {binding} of {}) {{", iterable.emit()));
                emit_body(p, body);
                p.line("}");
            }
        }
    }
}

// =============================================================================
// Declarations
// =============================================================================

fn export_prefix(is_export: bool) -> &'static str {
    if is_export { "export " } else { "" }
}

fn type_params(params: &[String]) -> String {
    if params.is_empty() {
        String::new()
    } else {
        format!("<{}>", params.join(", "))
    }
}

impl EmitBlock for TsFunction {
    fn emit_block(&self, p: &mut Printer) {
        let return_type_str = self
            .return_type
            .as_ref()
            .map(|t| format!(": {}", t.emit()))
            .unwrap_or_default();
        p.line(&format!(
            "{}function {}{}({}){} {{",
            export_prefix(self.is_export),
            self.name,
            type_params(&self.type_params),
            join(&self.params),
            return_type_str
        ));
        emit_body(p, &self.body);
        p.line("}");
    }
}

impl EmitBlock for TsTypeDef {
    fn emit_block(&self, p: &mut Printer) {
        let export = export_prefix(self.is_export);
        match &self.kind {
            TypeDefKind::Interface {
                type_params: params,
                extends,
                properties,
                methods,
            } => {
                let extends_str = extends
                    .as_ref()
                    .map(|b| format!(" extends {}", b.emit()))
                    .unwrap_or_default();
                p.line(&format!(
                    "{export}interface {}{}{extends_str} {{",
                    self.name,
                    type_params(params)
                ));
                p.indented(|p| {
                    for prop in properties {
                        p.line(&format!("{};", prop.emit()));
                    }
                    for method in methods {
                        p.line(&format!("{};", method.emit()));
                    }
                });
                p.line("}");
            }
            TypeDefKind::TypeAlias { ty } => {
                p.line(&format!("{export}type {} = {};", self.name, ty.emit()));
            }
            TypeDefKind::Enum { is_const, members } => {
                let const_str = if *is_const { "const " } else { "" };
                p.line(&format!("{export}{const_str}enum {} {{", self.name));
                p.indented(|p| {
                    for (name, value) in members {
                        p.line(&format!("{} = {},", quote_if_needed(name), value.emit()));
                    }
                });
                p.line("}");
            }
        }
    }
}

impl Emit for Visibility {
    fn emit(&self) -> String {
        match self {
            Visibility::Public => "public".to_string(),
            Visibility::Private => "private".to_string(),
        }
    }
}

impl Emit for TsField {
    fn emit(&self) -> String {
        let readonly = if self.readonly { " readonly" } else { "" };
        format!("{}{readonly} {}: {};", self.visibility.emit(), self.name, self.ty.emit())
    }
}

impl EmitBlock for TsMethod {
    fn emit_block(&self, p: &mut Printer) {
        let return_type_str = self
            .return_type
            .as_ref()
            .map(|t| format!(": {}", t.emit()))
            .unwrap_or_default();
        p.line(&format!(
            "{} {}({}){} {{",
            self.visibility.emit(),
            self.name,
            join(&self.params),
            return_type_str
        ));
        emit_body(p, &self.body);
        p.line("}");
    }
}

impl EmitBlock for TsClass {
    fn emit_block(&self, p: &mut Printer) {
        let extends = self
            .extends
            .as_ref()
            .map(|b| format!(" extends {b}"))
            .unwrap_or_default();
        p.line(&format!("{}class {}{extends} {{", export_prefix(self.is_export), self.name));
        p.indented(|p| {
            let mut first = true;
            for field in &self.fields {
                p.line(&field.emit());
                first = false;
            }
            if let Some((params, body)) = &self.constructor {
                if !first {
                    p.blank();
                }
                p.line(&format!("constructor({}) {{", join(params)));
                emit_body(p, body);
                p.line("}");
                first = false;
            }
            for method in &self.methods {
                if !first {
                    p.blank();
                }
                method.emit_block(p);
                first = false;
            }
        });
        p.line("}");
    }
}

impl Emit for ImportItem {
    fn emit(&self) -> String {
        match &self.alias {
            Some(alias) => format!("{} as {}", self.name, alias),
            None => self.name.clone(),
        }
    }
}

impl Emit for TsImport {
    fn emit(&self) -> String {
        if let Some(ns) = &self.namespace {
            return format!("import * as {ns} from \"{}\";", self.from);
        }
        let type_keyword = if self.type_only { "type " } else { "" };
        format!("import {type_keyword}{{ {} }} from \"{}\";", join(&self.items), self.from)
    }
}

fn emit_init_object(p: &mut Printer, entries: &[(String, TsInit)]) {
    p.indented(|p| {
        for (key, value) in entries {
            let key = quote_if_needed(key);
            match value {
                TsInit::Expr(expr) => p.line(&format!("{key}: {},", expr.emit())),
                TsInit::Object(nested) => {
                    p.line(&format!("{key}: {{"));
                    emit_init_object(p, nested);
                    p.line("},");
                }
            }
        }
    });
}

impl EmitBlock for TsNamespace {
    fn emit_block(&self, p: &mut Printer) {
        let declare = if self.declare { "declare " } else { "" };
        p.line(&format!("{declare}namespace {} {{", self.name));
        p.indented(|p| emit_items(p, &self.items));
        p.line("}");
    }
}

impl EmitBlock for TsItem {
    fn emit_block(&self, p: &mut Printer) {
        match self {
            TsItem::Import(import) => p.line(&import.emit()),
            TsItem::TypeDef(def) => def.emit_block(p),
            TsItem::Namespace(ns) => ns.emit_block(p),
            TsItem::Class(class) => class.emit_block(p),
            TsItem::Function(func) => func.emit_block(p),
            TsItem::Const {
                name,
                is_export,
                ty,
                init,
            } => {
                let ty_str = ty.as_ref().map(|t| format!(": {}", t.emit())).unwrap_or_default();
                let prefix = format!("{}const {name}{ty_str} =", export_prefix(*is_export));
                match init {
                    TsInit::Expr(expr) => p.line(&format!("{prefix} {};", expr.emit())),
                    TsInit::Object(entries) if entries.is_empty() => p.line(&format!("{prefix} {{}};")),
                    TsInit::Object(entries) => {
                        p.line(&format!("{prefix} {{"));
                        emit_init_object(p, entries);
                        p.line("};");
                    }
                }
            }
            TsItem::Stmt(stmt) => stmt.emit_block(p),
            TsItem::Raw(text) => p.raw(text),
        }
    }
}

/// Items are separated by a blank line, except runs of imports or statements.
fn emit_items(p: &mut Printer, items: &[TsItem]) {
    let mut previous: Option<&TsItem> = None;
    for item in items {
        if let Some(prev) = previous {
            let same_run = matches!(
                (prev, item),
                (TsItem::Import(_), TsItem::Import(_)) | (TsItem::Stmt(_), TsItem::Stmt(_))
            );
            if !same_run {
                p.blank();
            }
        }
        item.emit_block(p);
        previous = Some(item);
    }
}

impl TsModule {
    /// Render the module with the given indentation unit.
    pub fn render(&self, indent: &str) -> String {
        let mut p = Printer::new(indent);
        emit_items(&mut p, &self.items);
        p.finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
