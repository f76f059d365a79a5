//! Expression and statement emission

use rustc_hash::FxHashMap;

use crate::error::{CodegenError, CodegenResult};
use crate::ir::{Expr, Literal, QualifiedName, Stmt, TypeRef};
use crate::options::EmitOptions;
use crate::symbols::{flatten, getter_name, setter_name, NameStyle, SymbolTable};

/// Renders expressions of one class
pub struct ExprEmitter<'a> {
    table: &'a SymbolTable,
    options: &'a EmitOptions,
    class: &'a QualifiedName,
    /// Instance member renames (mangled private members)
    renames: FxHashMap<String, String>,
    /// Static member renames of the emitted class
    static_renames: FxHashMap<String, String>,
}

impl<'a> ExprEmitter<'a> {
    pub fn new(table: &'a SymbolTable, options: &'a EmitOptions, class: &'a QualifiedName) -> Self {
        Self {
            table,
            options,
            class,
            renames: FxHashMap::default(),
            static_renames: FxHashMap::default(),
        }
    }

    /// Emit `this.<from>` as `this.<to>`
    pub fn with_rename(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.renames.insert(from.into(), to.into());
        self
    }

    /// Emit `<Class>.<from>` as `<Class>.<to>` for the emitted class
    pub fn with_static_rename(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.static_renames.insert(from.into(), to.into());
        self
    }

    /// Emitted name of an instance member
    pub fn member_name<'n>(&'n self, name: &'n str) -> &'n str {
        self.renames.get(name).map(String::as_str).unwrap_or(name)
    }

    /// Emitted name of a static member of the emitted class
    pub fn static_member_name<'n>(&'n self, name: &'n str) -> &'n str {
        self.static_renames.get(name).map(String::as_str).unwrap_or(name)
    }

    /// Output identifier of a registered class
    pub fn class_ref(&self, name: &QualifiedName) -> CodegenResult<String> {
        self.table
            .output_name(name)
            .map(str::to_string)
            .ok_or_else(|| CodegenError::UnresolvedSymbol {
                name: name.clone(),
                referenced_from: self.class.clone(),
                location: None,
            })
    }

    /// Output identifier of a runtime support class, registered or not
    pub fn support_ref(&self, name: &QualifiedName) -> String {
        match self.table.output_name(name) {
            Some(output) => output.to_string(),
            None => match self.table.name_style() {
                NameStyle::Dotted => name.as_str().to_string(),
                NameStyle::Flattened => flatten(name),
            },
        }
    }

    /// Type as a value or annotation
    pub fn type_ref(&self, ty: &TypeRef) -> CodegenResult<String> {
        match ty {
            TypeRef::Builtin(name) => Ok(name.clone()),
            TypeRef::Class(name) => self.class_ref(name),
        }
    }

    /// Render an expression
    pub fn expr(&self, expr: &Expr) -> CodegenResult<String> {
        Ok(match expr {
            Expr::Literal { value } => render_literal(value),
            Expr::This => "this".to_string(),
            Expr::Local { name } => name.clone(),
            Expr::Member {
                object,
                name,
                accessor,
            } => {
                let receiver = self.receiver(object)?;
                if *accessor {
                    format!("{}.{}()", receiver, getter_name(name))
                } else {
                    format!("{}.{}", receiver, self.member_of(object, name))
                }
            }
            Expr::StaticMember { class, name } => {
                let name = match class {
                    TypeRef::Class(owner) if owner == self.class => self.static_member_name(name),
                    _ => name.as_str(),
                };
                format!("{}.{}", self.type_ref(class)?, name)
            }
            Expr::Call { callee, args } => {
                format!("{}({})", self.receiver(callee)?, self.list(args)?)
            }
            Expr::New { class, args } => {
                format!("new {}({})", self.type_ref(class)?, self.list(args)?)
            }
            Expr::ClassRef { class } => self.type_ref(class)?,
            Expr::Cast { value, to } => format!(
                "{}.as({}, {}, true)",
                self.support_ref(&self.options.language_helper),
                self.expr(value)?,
                self.type_ref(to)?
            ),
            Expr::Assign { target, value } => match target.as_ref() {
                Expr::Member {
                    object,
                    name,
                    accessor: true,
                } => format!(
                    "{}.{}({})",
                    self.receiver(object)?,
                    setter_name(name),
                    self.expr(value)?
                ),
                _ => format!("{} = {}", self.expr(target)?, self.expr(value)?),
            },
            Expr::Binary { op, left, right } => format!(
                "{} {} {}",
                self.operand(left)?,
                op,
                self.operand(right)?
            ),
            Expr::Array { items } => format!("[{}]", self.list(items)?),
        })
    }

    /// Render a statement (without indentation)
    pub fn stmt(&self, stmt: &Stmt) -> CodegenResult<String> {
        Ok(match stmt {
            Stmt::Expr { expr } => format!("{};", self.expr(expr)?),
            Stmt::Var { name, init: Some(init) } => format!("var {} = {};", name, self.expr(init)?),
            Stmt::Var { name, init: None } => format!("var {};", name),
            Stmt::Return { value: Some(value) } => format!("return {};", self.expr(value)?),
            Stmt::Return { value: None } => "return;".to_string(),
        })
    }

    fn list(&self, items: &[Expr]) -> CodegenResult<String> {
        let parts = items
            .iter()
            .map(|e| self.expr(e))
            .collect::<CodegenResult<Vec<_>>>()?;
        Ok(parts.join(", "))
    }

    fn member_of<'n>(&'n self, object: &Expr, name: &'n str) -> &'n str {
        if matches!(object, Expr::This) {
            self.member_name(name)
        } else {
            name
        }
    }

    // Operands that bind looser than member access get parentheses
    fn receiver(&self, expr: &Expr) -> CodegenResult<String> {
        let text = self.expr(expr)?;
        Ok(match expr {
            Expr::Binary { .. } | Expr::Assign { .. } | Expr::New { .. } => format!("({})", text),
            _ => text,
        })
    }

    fn operand(&self, expr: &Expr) -> CodegenResult<String> {
        let text = self.expr(expr)?;
        Ok(match expr {
            Expr::Binary { .. } | Expr::Assign { .. } => format!("({})", text),
            _ => text,
        })
    }
}

/// Render a literal
pub fn render_literal(value: &Literal) -> String {
    match value {
        Literal::Null => "null".to_string(),
        Literal::Bool(b) => b.to_string(),
        Literal::Int(i) => i.to_string(),
        Literal::Number(n) if n.is_nan() => "NaN".to_string(),
        Literal::Number(n) if n.is_infinite() => {
            let text = if *n > 0.0 { "Infinity" } else { "-Infinity" };
            text.to_string()
        }
        Literal::Number(n) => n.to_string(),
        Literal::String(s) => quote(s),
    }
}

/// Single-quoted string literal
pub fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('\'');
    for c in text.chars() {
        match c {
            '\'' => out.push_str("\\'"),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}
