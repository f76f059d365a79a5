//! Class body emission

use std::collections::BTreeSet;

use super::expr::{quote, render_literal, ExprEmitter};
use super::metadata::{Access, ClassInfo, MemberInfo, NameRecord, ReflectionInfo};
use super::writer::CodeWriter;
use crate::bindings::{plan_accessors, plan_handlers, AccessorOrigin, AccessorPlan, HandlerPlan, EVENT_PARAM};
use crate::deps;
use crate::error::CodegenResult;
use crate::ir::{ClassNode, Expr, FieldSpec, MethodSpec, QualifiedName, Stmt, SymbolKind, TypeRef, Visibility};
use crate::linearize::{Encoded, Linearized, Linearizer};
use crate::options::EmitOptions;
use crate::symbols::{private_member_name, Symbol, SymbolTable};

/// Everything produced for one class
#[derive(Debug, Clone)]
pub struct ClassBody {
    /// Qualified class name
    pub name: QualifiedName,
    /// Identifier used in emitted code
    pub output_name: String,
    /// Emitted text
    pub text: String,
    /// Symbols the text references (self excluded)
    pub deps: BTreeSet<QualifiedName>,
    /// Linearized declarative tree
    pub linearized: Option<Linearized>,
    /// Synthesized event handlers
    pub handlers: Vec<HandlerPlan>,
    /// Accessor pairs
    pub accessors: Vec<AccessorPlan>,
    /// `CLASS_INFO` descriptor
    pub class_info: ClassInfo,
    /// `REFLECTION_INFO` descriptor
    pub reflection: ReflectionInfo,
}

/// Emit one class with the given table and options
pub fn emit_class(class: &ClassNode, table: &SymbolTable, options: &EmitOptions) -> CodegenResult<ClassBody> {
    ClassEmitter::new(table, options).emit(class)
}

/// Per-class code generator
pub struct ClassEmitter<'a> {
    table: &'a SymbolTable,
    options: &'a EmitOptions,
}

impl<'a> ClassEmitter<'a> {
    pub fn new(table: &'a SymbolTable, options: &'a EmitOptions) -> Self {
        Self { table, options }
    }

    /// Generate the body of `class`
    pub fn emit(&self, class: &ClassNode) -> CodegenResult<ClassBody> {
        let symbol = self
            .table
            .resolve(&class.name, &class.name)
            .map_err(|e| e.or_location(class.location.as_ref()))?;
        let deps = deps::collect(class, self.table, self.options)?;

        let linearized = match &class.declarative {
            Some(tree) => Some(
                Linearizer::new(&class.name)
                    .with_events(&class.events)
                    .with_location(class.location.as_ref())
                    .linearize(tree)?,
            ),
            None => None,
        };
        let accessors = plan_accessors(class, linearized.as_ref(), self.options)?;
        let handlers = plan_handlers(class, linearized.as_ref())?;

        let mut exprs = ExprEmitter::new(self.table, self.options, &class.name);
        if self.options.allow_private_name_conflicts {
            let private_fields = class
                .fields
                .iter()
                .filter(|f| f.visibility == Visibility::Private)
                .map(|f| (&f.name, f.is_static));
            let private_methods = class
                .methods
                .iter()
                .filter(|m| m.visibility == Visibility::Private)
                .map(|m| (&m.name, m.is_static));
            for (name, is_static) in private_fields.chain(private_methods) {
                let mangled = private_member_name(&class.name, name);
                exprs = if is_static {
                    exprs.with_static_rename(name.clone(), mangled)
                } else {
                    exprs.with_rename(name.clone(), mangled)
                };
            }
        }

        let class_info = self.class_info(class, symbol);
        let reflection = self.reflection(class, symbol, linearized.as_ref(), &accessors, &handlers);

        let cx = EmitContext {
            class,
            symbol,
            exprs: &exprs,
            options: self.options,
        };
        let mut w = CodeWriter::new();
        if class.kind == SymbolKind::Interface {
            cx.interface(&mut w)?;
        } else {
            cx.constructor(&mut w, linearized.as_ref(), &accessors)?;
        }
        cx.export(&mut w);
        cx.class_info(&mut w, &class_info);
        if class.kind == SymbolKind::Class {
            cx.static_fields(&mut w)?;
            for handler in &handlers {
                cx.handler(&mut w, handler)?;
            }
            for accessor in &accessors {
                cx.accessor(&mut w, accessor)?;
            }
            for method in &class.methods {
                cx.method(&mut w, method)?;
            }
        }
        cx.reflection(&mut w, &reflection);

        Ok(ClassBody {
            name: class.name.clone(),
            output_name: symbol.output_name.clone(),
            text: w.finish(),
            deps,
            linearized,
            handlers,
            accessors,
            class_info,
            reflection,
        })
    }

    fn class_info(&self, class: &ClassNode, symbol: &Symbol) -> ClassInfo {
        let mut names = vec![NameRecord {
            name: symbol.simple_name().to_string(),
            qualified: symbol.qualified.as_str().to_string(),
            kind: symbol.kind,
        }];
        names.extend(class.metadata.aliases.iter().map(|alias| NameRecord {
            name: alias.name.clone(),
            qualified: alias.qualified.as_str().to_string(),
            kind: alias.kind,
        }));
        let interfaces = symbol
            .interfaces
            .iter()
            .map(|&id| self.table.get(id).output_name.clone())
            .collect();
        ClassInfo { names, interfaces }
    }

    fn reflection(
        &self,
        class: &ClassNode,
        symbol: &Symbol,
        linearized: Option<&Linearized>,
        accessors: &[AccessorPlan],
        handlers: &[HandlerPlan],
    ) -> ReflectionInfo {
        let mut info = ReflectionInfo::default();
        if !symbol.capabilities.reflectable {
            return info;
        }
        let declared_by = class.name.as_str();
        let reflect_private = self.options.reflect_private;
        let marker = |visibility: Visibility| (!visibility.is_public()).then_some(visibility);

        for field in class.fields.iter().filter(|f| !f.is_static) {
            if field.visibility.is_public() || reflect_private {
                let mut entry = MemberInfo::new(field.ty.name(), declared_by);
                entry.visibility = marker(field.visibility);
                info.variables.insert(field.name.clone(), entry);
            }
        }
        if reflect_private {
            for binding in linearized.iter().flat_map(|l| &l.bindings).filter(|b| !b.exposed) {
                let mut entry = MemberInfo::new(binding.target.as_str(), declared_by);
                entry.visibility = Some(Visibility::Private);
                info.variables.insert(binding.name.clone(), entry);
            }
        }

        for accessor in accessors {
            if accessor.visibility.is_public() || reflect_private {
                let mut entry = MemberInfo::new(accessor.ty.name(), declared_by);
                entry.access = Some(Access::ReadWrite);
                entry.visibility = marker(accessor.visibility);
                info.accessors.insert(accessor.property.clone(), entry);
            }
        }

        if class.kind == SymbolKind::Class {
            info.methods.insert(
                symbol.simple_name().to_string(),
                MemberInfo::new("", declared_by),
            );
        }
        for method in class.methods.iter().filter(|m| !m.is_static) {
            if method.visibility.is_public() || reflect_private {
                let mut entry = MemberInfo::new(method.return_type.name(), declared_by);
                entry.parameters = method.params.iter().map(|p| p.ty.name().to_string()).collect();
                entry.visibility = marker(method.visibility);
                info.methods.insert(method.name.clone(), entry);
            }
        }
        if reflect_private {
            for handler in handlers {
                let ty = handler.event_type.as_ref().map(TypeRef::name).unwrap_or("*");
                let mut entry = MemberInfo::new("void", declared_by);
                entry.parameters = vec![ty.to_string()];
                entry.visibility = Some(Visibility::Private);
                info.methods.insert(handler.name.clone(), entry);
            }
        }
        info
    }
}

struct EmitContext<'c> {
    class: &'c ClassNode,
    symbol: &'c Symbol,
    exprs: &'c ExprEmitter<'c>,
    options: &'c EmitOptions,
}

impl<'c> EmitContext<'c> {
    fn name(&self) -> &str {
        &self.symbol.output_name
    }

    fn annotation(&self, ty: &TypeRef) -> String {
        match ty {
            TypeRef::Builtin(name) => name.clone(),
            TypeRef::Class(name) => self.exprs.support_ref(name),
        }
    }

    fn visibility_tag(visibility: Visibility) -> &'static str {
        match visibility {
            Visibility::Public | Visibility::Internal => "@export",
            Visibility::Protected => "@protected",
            Visibility::Private => "@private",
        }
    }

    fn base_name(&self) -> Option<String> {
        self.class.base.as_ref().map(|b| self.exprs.support_ref(b))
    }

    fn field_name(&self, field: &FieldSpec) -> String {
        if field.is_static {
            self.exprs.static_member_name(&field.name).to_string()
        } else {
            self.exprs.member_name(&field.name).to_string()
        }
    }

    fn method_name(&self, method: &MethodSpec) -> String {
        if method.is_static {
            self.exprs.static_member_name(&method.name).to_string()
        } else {
            self.exprs.member_name(&method.name).to_string()
        }
    }

    fn initial_value(&self, ty: &TypeRef, init: Option<&Expr>) -> CodegenResult<String> {
        match init {
            Some(expr) => self.exprs.expr(expr),
            None => Ok(typed_default(ty).to_string()),
        }
    }

    fn body(&self, w: &mut CodeWriter, body: &[Stmt]) -> CodegenResult<()> {
        w.indent();
        for stmt in body {
            w.line(self.exprs.stmt(stmt)?);
        }
        w.dedent();
        Ok(())
    }

    fn constructor(
        &self,
        w: &mut CodeWriter,
        linearized: Option<&Linearized>,
        accessors: &[AccessorPlan],
    ) -> CodegenResult<()> {
        let base = self.base_name();
        let mut tags = vec!["@constructor".to_string()];
        if let Some(base) = &base {
            tags.push(format!("@extends {{{}}}", base));
        }
        for iface in &self.class.interfaces {
            tags.push(format!("@implements {{{}}}", self.exprs.support_ref(iface)));
        }
        w.doc(&tags);
        w.line(format!("{} = function() {{", self.name()));
        w.indent();

        if base.is_some() {
            w.line(format!("{}.base(this, 'constructor');", self.name()));
        }

        for field in self.class.fields.iter().filter(|f| !f.is_static) {
            w.blank();
            let mut tags = Vec::new();
            if field.visibility != Visibility::Public {
                tags.push(Self::visibility_tag(field.visibility).to_string());
            }
            tags.push(format!("@type {{{}}}", self.annotation(&field.ty)));
            w.doc(&tags);
            w.line(format!(
                "this.{} = {};",
                self.field_name(field),
                self.initial_value(&field.ty, field.initializer.as_ref())?
            ));
        }

        for accessor in accessors.iter().filter(|a| a.origin == AccessorOrigin::Declared) {
            w.blank();
            w.doc(["@private".to_string(), format!("@type {{{}}}", self.annotation(&accessor.ty))]);
            w.line(format!(
                "this.{} = {};",
                accessor.storage,
                self.initial_value(&accessor.ty, accessor.initializer.as_ref())?
            ));
        }

        if let Some(linearized) = linearized {
            for binding in &linearized.bindings {
                w.blank();
                w.doc([
                    "@private".to_string(),
                    format!("@type {{{}}}", self.exprs.support_ref(&binding.target)),
                ]);
                w.line(format!("this.{};", binding.name));
            }

            let name_of = |name: &QualifiedName| self.exprs.support_ref(name);
            let encoded = linearized.root.encode_root(&name_of);
            w.blank();
            w.line(format!("this.{}([", self.options.graph_builder));
            w.indent();
            let last = encoded.len().saturating_sub(1);
            for (i, item) in encoded.iter().enumerate() {
                let comma = if i == last { "" } else { "," };
                w.line(format!("{}{}", self.encoded(item)?, comma));
            }
            w.dedent();
            w.line("]);");
        }

        w.dedent();
        w.line("};");
        if let Some(base) = &base {
            w.line(format!("{}({}, {});", self.options.inherits_fn, self.name(), base));
        }
        Ok(())
    }

    fn encoded(&self, item: &Encoded) -> CodegenResult<String> {
        Ok(match item {
            Encoded::Class(name) => name.clone(),
            Encoded::Int(n) => n.to_string(),
            Encoded::Str(s) => quote(s),
            Encoded::Bool(b) => b.to_string(),
            Encoded::Null => "null".to_string(),
            Encoded::Literal(value) => render_literal(value),
            Encoded::Expr(expr) => self.exprs.expr(expr)?,
            Encoded::Handler(name) => format!("this.{}", name),
            Encoded::Array(items) => {
                let parts = items
                    .iter()
                    .map(|i| self.encoded(i))
                    .collect::<CodegenResult<Vec<_>>>()?;
                format!("[{}]", parts.join(", "))
            }
        })
    }

    fn interface(&self, w: &mut CodeWriter) -> CodegenResult<()> {
        let mut tags = vec!["@interface".to_string()];
        for iface in &self.class.interfaces {
            tags.push(format!("@extends {{{}}}", self.exprs.support_ref(iface)));
        }
        w.doc(&tags);
        w.line(format!("{} = function() {{", self.name()));
        w.line("};");

        for method in &self.class.methods {
            w.blank();
            w.blank();
            let mut tags = Vec::new();
            for param in &method.params {
                tags.push(format!("@param {{{}}} {}", self.annotation(&param.ty), param.name));
            }
            if method.return_type != TypeRef::void() {
                tags.push(format!("@return {{{}}}", self.annotation(&method.return_type)));
            }
            if !tags.is_empty() {
                w.doc(&tags);
            }
            let params: Vec<&str> = method.params.iter().map(|p| p.name.as_str()).collect();
            w.line(format!(
                "{}.prototype.{} = function({}) {{}};",
                self.name(),
                method.name,
                params.join(", ")
            ));
        }
        Ok(())
    }

    fn export(&self, w: &mut CodeWriter) {
        if !(self.options.export_reflectable && self.symbol.capabilities.reflectable) {
            return;
        }
        w.blank();
        w.blank();
        w.doc(["Prevent renaming of class. Needed for reflection."]);
        w.line(format!(
            "{}({}, {});",
            self.options.export_symbol_fn,
            quote(self.name()),
            self.name()
        ));
    }

    fn class_info(&self, w: &mut CodeWriter, info: &ClassInfo) {
        w.blank();
        w.blank();
        w.doc(["Metadata", "", "@type {Object.<string, Array.<Object>>}"]);
        w.line(format!(
            "{}.prototype.{} = {};",
            self.name(),
            self.options.class_info_member(),
            info.render()
        ));
    }

    fn static_fields(&self, w: &mut CodeWriter) -> CodegenResult<()> {
        for field in self.class.fields.iter().filter(|f| f.is_static) {
            w.blank();
            w.blank();
            let mut tags = Vec::new();
            if field.visibility != Visibility::Public {
                tags.push(Self::visibility_tag(field.visibility).to_string());
            }
            tags.push(format!("@type {{{}}}", self.annotation(&field.ty)));
            w.doc(&tags);
            w.line(format!(
                "{}.{} = {};",
                self.name(),
                self.field_name(field),
                self.initial_value(&field.ty, field.initializer.as_ref())?
            ));
        }
        Ok(())
    }

    fn handler(&self, w: &mut CodeWriter, handler: &HandlerPlan) -> CodegenResult<()> {
        let ty = handler
            .event_type
            .as_ref()
            .map(|t| self.annotation(t))
            .unwrap_or_else(|| "*".to_string());
        w.blank();
        w.blank();
        w.doc(["@export".to_string(), format!("@param {{{}}} {}", ty, EVENT_PARAM)]);
        w.line(format!("{}.prototype.{} = function({})", self.name(), handler.name, EVENT_PARAM));
        w.line("{");
        self.body(w, &handler.body)?;
        w.line("};");
        Ok(())
    }

    fn accessor(&self, w: &mut CodeWriter, accessor: &AccessorPlan) -> CodegenResult<()> {
        let ty = self.annotation(&accessor.ty);
        let tag = Self::visibility_tag(accessor.visibility);

        w.blank();
        w.blank();
        w.doc([tag.to_string(), format!("@return {{{}}}", ty)]);
        w.line(format!("{}.prototype.{} = function()", self.name(), accessor.getter));
        w.line("{");
        w.indent();
        w.line(format!("return this.{};", accessor.storage));
        w.dedent();
        w.line("};");

        w.blank();
        w.blank();
        w.doc([tag.to_string(), format!("@param {{{}}} value", ty)]);
        w.line(format!("{}.prototype.{} = function(value)", self.name(), accessor.setter));
        w.line("{");
        w.indent();
        if accessor.is_bindable() {
            w.line(format!("var oldValue = this.{};", accessor.storage));
            w.line("if (value != oldValue) {");
            w.indent();
            w.line(format!("this.{} = value;", accessor.storage));
            w.line(format!(
                "this.dispatchEvent({}.createUpdateEvent(this, {}, oldValue, value));",
                self.exprs.support_ref(&self.options.change_event_class),
                quote(&accessor.setter_plan.property)
            ));
            w.dedent();
            w.line("}");
        } else {
            w.line(format!("this.{} = value;", accessor.storage));
        }
        w.dedent();
        w.line("};");
        Ok(())
    }

    fn method(&self, w: &mut CodeWriter, method: &MethodSpec) -> CodegenResult<()> {
        let mut tags = vec![Self::visibility_tag(method.visibility).to_string()];
        for param in &method.params {
            tags.push(format!("@param {{{}}} {}", self.annotation(&param.ty), param.name));
        }
        if method.return_type != TypeRef::void() {
            tags.push(format!("@return {{{}}}", self.annotation(&method.return_type)));
        }
        let params: Vec<&str> = method.params.iter().map(|p| p.name.as_str()).collect();
        let owner = if method.is_static {
            self.name().to_string()
        } else {
            format!("{}.prototype", self.name())
        };

        w.blank();
        w.blank();
        w.doc(&tags);
        w.line(format!(
            "{}.{} = function({}) {{",
            owner,
            self.method_name(method),
            params.join(", ")
        ));
        self.body(w, &method.body)?;
        w.line("};");
        Ok(())
    }

    fn reflection(&self, w: &mut CodeWriter, info: &ReflectionInfo) {
        w.blank();
        w.blank();
        w.blank();
        w.doc(["Reflection", "", "@return {Object.<string, Function>}"]);
        let text = info.render();
        let mut lines = text.lines();
        if let Some(first) = lines.next() {
            w.line(format!(
                "{}.prototype.{} = {}",
                self.name(),
                self.options.reflection_member(),
                first
            ));
        }
        let rest: Vec<&str> = lines.collect();
        let last = rest.len().saturating_sub(1);
        for (i, line) in rest.iter().enumerate() {
            if i == last {
                w.line(format!("{};", line));
            } else {
                w.line(*line);
            }
        }
    }
}

fn typed_default(ty: &TypeRef) -> &'static str {
    match ty {
        TypeRef::Builtin(name) => match name.as_str() {
            "Number" => "NaN",
            "int" | "uint" => "0",
            "Boolean" => "false",
            "*" => "undefined",
            _ => "null",
        },
        TypeRef::Class(_) => "null",
    }
}
