//! ponyfront_printer: AST to source text.
//!
//! Emission happens in two passes. The first renders the tree into a string
//! annotated with indent/dedent sentinel characters at block boundaries; the
//! second either strips the sentinels ([`to_source`], the compact form) or
//! converts them to two-space indentation ([`to_pretty_source`]).
//!
//! Sequence elements are separated by newlines, never spaces: the leading
//! token of a sequence element may be one of the context-dependent kinds
//! (`(`, `[`, `-`, `-~`), which only open a fresh expression at the start of
//! a line. Keeping the newline in the compact form is what makes
//! `parse(to_source(parse(s)))` structurally equal to `parse(s)`.

use ponyfront_ast::node::*;

/// Sentinel marking the start of an indented block.
const INDENT: char = '\u{0002}';
/// Sentinel marking the end of an indented block.
const DEDENT: char = '\u{0003}';
/// Sentinel standing in for a newline inside a string literal, so the
/// indenting pass never injects spaces into literal text.
const LITERAL_NEWLINE: char = '\u{0001}';

/// Render a module compactly: sentinels stripped, structural newlines kept.
pub fn to_source(module: &Module) -> String {
    strip_sentinels(&render_module(module))
}

/// Render a module with two-space indentation derived from the sentinels.
pub fn to_pretty_source(module: &Module) -> String {
    indent_sentinels(&render_module(module))
}

/// Render a standalone expression (compact form).
pub fn expr_to_source(expr: &Expr) -> String {
    let mut printer = Printer::new();
    printer.print_expr(expr);
    strip_sentinels(&printer.finish())
}

/// Render a standalone type.
pub fn type_to_source(ty: &Type) -> String {
    let mut printer = Printer::new();
    printer.print_type(ty);
    strip_sentinels(&printer.finish())
}

fn render_module(module: &Module) -> String {
    let mut printer = Printer::new();
    printer.print_module(module);
    printer.finish()
}

fn strip_sentinels(annotated: &str) -> String {
    annotated
        .chars()
        .filter(|&ch| ch != INDENT && ch != DEDENT)
        .map(|ch| if ch == LITERAL_NEWLINE { '\n' } else { ch })
        .collect()
}

fn indent_sentinels(annotated: &str) -> String {
    let mut out = String::with_capacity(annotated.len());
    let mut level: usize = 0;
    let mut at_line_start = false;
    for ch in annotated.chars() {
        match ch {
            INDENT => level += 1,
            DEDENT => level = level.saturating_sub(1),
            '\n' => {
                out.push('\n');
                at_line_start = true;
            }
            // A newline owned by a string literal: emit it without marking
            // a fresh line, so no indentation lands inside the literal.
            LITERAL_NEWLINE => out.push('\n'),
            _ => {
                if at_line_start {
                    for _ in 0..level {
                        out.push_str("  ");
                    }
                    at_line_start = false;
                }
                out.push(ch);
            }
        }
    }
    out
}

/// The sentinel-annotating renderer. One method per node shape.
pub struct Printer {
    out: String,
}

impl Printer {
    pub fn new() -> Self {
        Self {
            out: String::with_capacity(4096),
        }
    }

    pub fn finish(self) -> String {
        self.out
    }

    #[inline]
    fn write(&mut self, text: &str) {
        self.out.push_str(text);
    }

    /// Emit raw string-literal text. Newlines inside the literal are part of
    /// its value and must survive indentation untouched.
    fn write_literal(&mut self, text: &str) {
        for ch in text.chars() {
            self.out
                .push(if ch == '\n' { LITERAL_NEWLINE } else { ch });
        }
    }

    #[inline]
    fn newline(&mut self) {
        self.out.push('\n');
    }

    fn open_block(&mut self) {
        self.out.push(INDENT);
        self.newline();
    }

    fn close_block(&mut self) {
        self.out.push(DEDENT);
        self.newline();
    }

    // ========================================================================
    // Module level
    // ========================================================================

    pub fn print_module(&mut self, module: &Module) {
        if let Some(doc) = &module.docstring {
            self.write_literal(doc);
            self.newline();
        }
        for use_ in &module.uses {
            self.print_use(use_);
            self.newline();
        }
        for (i, def) in module.class_defs.iter().enumerate() {
            if i > 0 || module.docstring.is_some() || !module.uses.is_empty() {
                self.newline();
            }
            self.print_class_def(def);
        }
    }

    fn print_use(&mut self, use_: &Use) {
        self.write("use ");
        if let Some(id) = &use_.id {
            self.write(id);
            self.write(" = ");
        }
        if let Some(package) = &use_.package {
            self.write_literal(package);
        }
        if let Some(ffi) = &use_.ffi {
            self.print_ffi_decl(ffi);
        }
        if let Some(guard) = &use_.guard {
            self.write(" if ");
            self.print_expr(guard);
        }
    }

    fn print_ffi_decl(&mut self, decl: &FfiDecl) {
        self.write("@");
        self.write(&decl.id);
        if !decl.type_args.is_empty() {
            self.print_type_args(&decl.type_args);
        }
        self.write("(");
        for (i, param) in decl.params.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.print_param(param);
        }
        if decl.varargs {
            if !decl.params.is_empty() {
                self.write(", ");
            }
            self.write("...");
        }
        self.write(")");
        if decl.partial {
            self.write(" ?");
        }
    }

    fn print_class_def(&mut self, def: &ClassDef) {
        self.write(def.kind.spelling());
        self.write(" ");
        self.print_annotations(&def.annotations);
        if let Some(cap) = &def.capability {
            self.write(cap);
            self.write(" ");
        }
        self.write(&def.id);
        if !def.type_params.is_empty() {
            self.print_type_params(&def.type_params);
        }
        if let Some(provides) = &def.provides {
            self.write(" is ");
            self.print_type(provides);
        }
        if let Some(doc) = &def.docstring {
            self.write(" ");
            self.write_literal(doc);
        }
        self.print_members(&def.fields, &def.methods);
    }

    fn print_members(&mut self, fields: &[Field], methods: &[Method]) {
        self.out.push(INDENT);
        for field in fields {
            self.newline();
            self.print_field(field);
        }
        for method in methods {
            self.newline();
            self.print_method(method);
        }
        self.out.push(DEDENT);
        self.newline();
    }

    fn print_field(&mut self, field: &Field) {
        self.write(field.kind.spelling());
        self.write(" ");
        self.write(&field.id);
        self.write(": ");
        self.print_type(&field.ty);
        if let Some(default) = &field.default {
            self.write(" = ");
            self.print_expr(default);
        }
    }

    fn print_method(&mut self, method: &Method) {
        self.write(method.kind.spelling());
        self.write(" ");
        self.print_annotations(&method.annotations);
        if let Some(cap) = &method.capability {
            self.write(cap);
            self.write(" ");
        }
        self.write(&method.id);
        if !method.type_params.is_empty() {
            self.print_type_params(&method.type_params);
        }
        self.write("(");
        for (i, param) in method.params.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.print_param(param);
        }
        self.write(")");
        if let Some(ret) = &method.return_type {
            self.write(": ");
            self.print_type(ret);
        }
        if method.partial {
            self.write(" ?");
        }
        if let Some(doc) = &method.docstring {
            self.write(" ");
            self.write_literal(doc);
        }
        if let Some(guard) = &method.guard {
            self.write(" if ");
            self.print_seq_inline(guard);
        }
        if let Some(body) = &method.body {
            self.write(" =>");
            self.open_block();
            self.print_seq(body);
            self.out.push(DEDENT);
        }
    }

    fn print_param(&mut self, param: &Param) {
        self.write(&param.id);
        if let Some(ty) = &param.ty {
            self.write(": ");
            self.print_type(ty);
        }
        if let Some(default) = &param.default {
            self.write(" = ");
            self.print_expr(default);
        }
    }

    fn print_type_params(&mut self, params: &[TypeParam]) {
        self.write("[");
        for (i, param) in params.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.write(&param.id);
            if let Some(constraint) = &param.constraint {
                self.write(": ");
                self.print_type(constraint);
            }
            if let Some(default) = &param.default {
                self.write(" = ");
                self.print_type_arg(default);
            }
        }
        self.write("]");
    }

    fn print_annotations(&mut self, annotations: &[String]) {
        if annotations.is_empty() {
            return;
        }
        self.write("\\");
        self.write(&annotations.join(", "));
        self.write("\\ ");
    }

    // ========================================================================
    // Sequences
    // ========================================================================

    /// Elements on separate lines; see the module docs for why a newline is
    /// the one separator that always reparses.
    fn print_seq(&mut self, seq: &Seq) {
        for (i, expr) in seq.exprs.iter().enumerate() {
            if i > 0 {
                self.newline();
            }
            self.print_expr(expr);
        }
        if let Some(jump) = &seq.jump {
            if !seq.exprs.is_empty() {
                self.newline();
            }
            self.print_jump(jump);
        }
    }

    /// A sequence in a spot that reads better inline; multi-element
    /// sequences still need their newlines.
    fn print_seq_inline(&mut self, seq: &Seq) {
        self.print_seq(seq);
    }

    fn print_jump(&mut self, jump: &Jump) {
        self.write(jump.kind.spelling());
        if let Some(value) = &jump.value {
            self.write(" ");
            self.print_seq(value);
        }
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    pub fn print_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Assign { lhs, rhs } => {
                self.print_expr(lhs);
                self.write(" = ");
                self.print_expr(rhs);
            }
            Expr::Binop {
                op,
                left,
                right,
                partial,
            } => {
                self.print_expr(left);
                self.write(" ");
                self.write(op);
                if *partial {
                    self.write("?");
                }
                self.write(" ");
                self.print_expr(right);
            }
            Expr::Isop { op, left, right } => {
                self.print_expr(left);
                self.write(" ");
                self.write(op);
                self.write(" ");
                self.print_expr(right);
            }
            Expr::AsOp { expr, ty } => {
                self.print_expr(expr);
                self.write(" as ");
                self.print_type(ty);
            }
            Expr::Unary { op, expr } => {
                self.write(op);
                if op.chars().next().is_some_and(|ch| ch.is_ascii_alphabetic()) {
                    self.write(" ");
                }
                self.print_expr(expr);
            }
            Expr::Consume { capability, expr } => {
                self.write("consume ");
                if let Some(cap) = capability {
                    self.write(cap);
                    self.write(" ");
                }
                self.print_expr(expr);
            }
            Expr::Recover {
                annotations,
                capability,
                body,
            } => {
                self.write("recover");
                if !annotations.is_empty() {
                    self.write(" ");
                    self.print_annotations(annotations);
                }
                if let Some(cap) = capability {
                    self.write(" ");
                    self.write(cap);
                }
                self.open_block();
                self.print_seq(body);
                self.close_block();
                self.write("end");
            }
            Expr::If(arm) => {
                self.write("if ");
                self.print_if_arm(arm);
                self.write("end");
            }
            Expr::Ifdef(arm) => {
                self.write("ifdef ");
                self.print_ifdef_arm(arm);
                self.write("end");
            }
            Expr::Iftype(arm) => {
                self.write("iftype ");
                self.print_iftype_arm(arm);
                self.write("end");
            }
            Expr::Match {
                annotations,
                subject,
                cases,
                else_branch,
            } => {
                self.write("match ");
                self.print_annotations(annotations);
                self.print_seq_inline(subject);
                self.out.push(INDENT);
                for case in cases {
                    self.newline();
                    self.print_case(case);
                }
                self.out.push(DEDENT);
                self.newline();
                if let Some(block) = else_branch {
                    self.print_else_block(block);
                }
                self.write("end");
            }
            Expr::While {
                annotations,
                condition,
                body,
                else_branch,
            } => {
                self.write("while ");
                self.print_annotations(annotations);
                self.print_seq_inline(condition);
                self.write(" do");
                self.open_block();
                self.print_seq(body);
                self.close_block();
                if let Some(block) = else_branch {
                    self.print_else_block(block);
                }
                self.write("end");
            }
            Expr::Repeat {
                annotations,
                body,
                condition,
                else_branch,
            } => {
                self.write("repeat");
                if !annotations.is_empty() {
                    self.write(" ");
                    self.print_annotations(annotations);
                }
                self.open_block();
                self.print_seq(body);
                self.close_block();
                self.write("until ");
                self.print_seq_inline(condition);
                self.newline();
                if let Some(block) = else_branch {
                    self.print_else_block(block);
                }
                self.write("end");
            }
            Expr::For {
                annotations,
                pattern,
                iterator,
                body,
                else_branch,
            } => {
                self.write("for ");
                self.print_annotations(annotations);
                self.print_id_pattern(pattern);
                self.write(" in ");
                self.print_seq_inline(iterator);
                self.write(" do");
                self.open_block();
                self.print_seq(body);
                self.close_block();
                if let Some(block) = else_branch {
                    self.print_else_block(block);
                }
                self.write("end");
            }
            Expr::With {
                annotations,
                elems,
                body,
                else_branch,
            } => {
                self.write("with ");
                self.print_annotations(annotations);
                for (i, elem) in elems.iter().enumerate() {
                    if i > 0 {
                        self.write(", ");
                    }
                    self.print_id_pattern(&elem.pattern);
                    self.write(" = ");
                    self.print_seq_inline(&elem.initialiser);
                }
                self.write(" do");
                self.open_block();
                self.print_seq(body);
                self.close_block();
                if let Some(block) = else_branch {
                    self.print_else_block(block);
                }
                self.write("end");
            }
            Expr::Try {
                annotations,
                body,
                else_branch,
                then_branch,
            } => {
                self.write("try");
                if !annotations.is_empty() {
                    self.write(" ");
                    self.print_annotations(annotations);
                }
                self.open_block();
                self.print_seq(body);
                self.close_block();
                if let Some(block) = else_branch {
                    self.print_else_block(block);
                }
                if let Some(then) = then_branch {
                    self.write("then");
                    self.open_block();
                    self.print_seq(then);
                    self.close_block();
                }
                self.write("end");
            }
            Expr::Local { kind, id, ty } => {
                self.write(kind.spelling());
                self.write(" ");
                self.write(id);
                if let Some(ty) = ty {
                    self.write(": ");
                    self.print_type(ty);
                }
            }
            Expr::Dot { expr, id } => {
                self.print_expr(expr);
                self.write(".");
                self.write(id);
            }
            Expr::Tilde { expr, id } => {
                self.print_expr(expr);
                self.write("~");
                self.write(id);
            }
            Expr::Chain { expr, id } => {
                self.print_expr(expr);
                self.write(".>");
                self.write(id);
            }
            Expr::Qualify { expr, type_args } => {
                self.print_expr(expr);
                self.print_type_args(type_args);
            }
            Expr::Call {
                callee,
                positional,
                named,
                partial,
            } => {
                self.print_expr(callee);
                self.print_call_args(positional, named);
                if *partial {
                    self.write("?");
                }
            }
            Expr::Reference(id) => self.write(id),
            Expr::This => self.write("this"),
            Expr::True => self.write("true"),
            Expr::False => self.write("false"),
            Expr::Int(text) | Expr::Float(text) => self.write(text),
            Expr::Str(text) => self.write_literal(text),
            Expr::Tuple(elems) => {
                self.write("(");
                for (i, elem) in elems.iter().enumerate() {
                    if i > 0 {
                        self.write(", ");
                    }
                    self.print_seq_inline(elem);
                }
                self.write(")");
            }
            Expr::Array { ty, elems } => {
                self.write("[");
                if let Some(ty) = ty {
                    self.write("as ");
                    self.print_type(ty);
                    self.write(": ");
                }
                if let Some(elems) = elems {
                    self.print_seq_inline(elems);
                }
                self.write("]");
            }
            Expr::Object {
                capability,
                provides,
                fields,
                methods,
            } => {
                self.write("object");
                if let Some(cap) = capability {
                    self.write(" ");
                    self.write(cap);
                }
                if let Some(provides) = provides {
                    self.write(" is ");
                    self.print_type(provides);
                }
                self.print_members(fields, methods);
                self.write("end");
            }
            Expr::FfiCall {
                id,
                type_args,
                positional,
                named,
                partial,
            } => {
                self.write("@");
                self.write(id);
                if !type_args.is_empty() {
                    self.print_type_args(type_args);
                }
                self.print_call_args(positional, named);
                if *partial {
                    self.write("?");
                }
            }
        }
    }

    fn print_call_args(&mut self, positional: &[Seq], named: &[NamedArg]) {
        self.write("(");
        for (i, arg) in positional.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.print_seq_inline(arg);
        }
        if !named.is_empty() {
            self.write(" where ");
            for (i, arg) in named.iter().enumerate() {
                if i > 0 {
                    self.write(", ");
                }
                self.write(&arg.id);
                self.write(" = ");
                self.print_seq_inline(&arg.value);
            }
        }
        self.write(")");
    }

    fn print_if_arm(&mut self, arm: &IfExpr) {
        self.print_annotations(&arm.annotations);
        self.print_seq_inline(&arm.condition);
        self.write(" then");
        self.open_block();
        self.print_seq(&arm.then_body);
        self.close_block();
        match &arm.else_branch {
            Some(IfElse::Elseif(next)) => {
                self.write("elseif ");
                self.print_if_arm(next);
            }
            Some(IfElse::Else(block)) => self.print_else_block(block),
            None => {}
        }
    }

    fn print_ifdef_arm(&mut self, arm: &IfdefExpr) {
        self.print_annotations(&arm.annotations);
        self.print_seq_inline(&arm.condition);
        self.write(" then");
        self.open_block();
        self.print_seq(&arm.then_body);
        self.close_block();
        match &arm.else_branch {
            Some(IfdefElse::Elseif(next)) => {
                self.write("elseif ");
                self.print_ifdef_arm(next);
            }
            Some(IfdefElse::Else(block)) => self.print_else_block(block),
            None => {}
        }
    }

    fn print_iftype_arm(&mut self, arm: &IftypeExpr) {
        self.print_annotations(&arm.annotations);
        self.print_type(&arm.sub);
        self.write(" <: ");
        self.print_type(&arm.super_);
        self.write(" then");
        self.open_block();
        self.print_seq(&arm.then_body);
        self.close_block();
        match &arm.else_branch {
            Some(IftypeElse::Elseif(next)) => {
                self.write("elseif ");
                self.print_iftype_arm(next);
            }
            Some(IftypeElse::Else(block)) => self.print_else_block(block),
            None => {}
        }
    }

    fn print_else_block(&mut self, block: &ElseBlock) {
        self.write("else");
        if !block.annotations.is_empty() {
            self.write(" ");
            self.print_annotations(&block.annotations);
        }
        self.open_block();
        self.print_seq(&block.body);
        self.close_block();
    }

    fn print_case(&mut self, case: &Case) {
        self.write("| ");
        self.print_annotations(&case.annotations);
        if let Some(pattern) = &case.pattern {
            self.print_expr(pattern);
        }
        if let Some(guard) = &case.guard {
            self.write(" if ");
            self.print_seq_inline(guard);
        }
        if let Some(action) = &case.action {
            self.write(" => ");
            self.print_seq_inline(action);
        }
    }

    fn print_id_pattern(&mut self, pattern: &IdPattern) {
        match pattern {
            IdPattern::Name(id) => self.write(id),
            IdPattern::Tuple(elems) => {
                self.write("(");
                for (i, elem) in elems.iter().enumerate() {
                    if i > 0 {
                        self.write(", ");
                    }
                    self.print_id_pattern(elem);
                }
                self.write(")");
            }
        }
    }

    // ========================================================================
    // Types
    // ========================================================================

    pub fn print_type(&mut self, ty: &Type) {
        match ty {
            Type::This => self.write("this"),
            Type::Cap(cap) => self.write(cap),
            Type::Arrow { origin, target } => {
                self.print_type(origin);
                self.write("->");
                self.print_type(target);
            }
            Type::Union(types) => self.print_type_list(types, " | "),
            Type::Isect(types) => self.print_type_list(types, " & "),
            Type::Tuple(types) => self.print_type_list(types, ", "),
            Type::Nominal {
                package,
                id,
                type_args,
                capability,
                cap_modifier,
            } => {
                if let Some(package) = package {
                    self.write(package);
                    self.write(".");
                }
                self.write(id);
                if !type_args.is_empty() {
                    self.print_type_args(type_args);
                }
                if let Some(cap) = capability {
                    self.write(" ");
                    self.write(cap);
                }
                if let Some(modifier) = cap_modifier {
                    self.write(modifier);
                }
            }
        }
    }

    fn print_type_list(&mut self, types: &[Type], separator: &str) {
        self.write("(");
        for (i, ty) in types.iter().enumerate() {
            if i > 0 {
                self.write(separator);
            }
            self.print_type(ty);
        }
        self.write(")");
    }

    fn print_type_args(&mut self, args: &[TypeArg]) {
        self.write("[");
        for (i, arg) in args.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.print_type_arg(arg);
        }
        self.write("]");
    }

    fn print_type_arg(&mut self, arg: &TypeArg) {
        match arg {
            TypeArg::Type(ty) => self.print_type(ty),
            TypeArg::Literal(expr) => self.print_expr(expr),
        }
    }
}

impl Default for Printer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nominal(id: &str) -> Type {
        Type::Nominal {
            package: None,
            id: id.to_string(),
            type_args: Vec::new(),
            capability: None,
            cap_modifier: None,
        }
    }

    #[test]
    fn test_partial_operator_rendering() {
        let expr = Expr::Binop {
            op: "+".to_string(),
            left: Box::new(Expr::Reference("a".to_string())),
            right: Box::new(Expr::Reference("b".to_string())),
            partial: true,
        };
        assert_eq!(expr_to_source(&expr), "a +? b");
    }

    #[test]
    fn test_union_type_rendering() {
        let ty = Type::Union(vec![nominal("A"), nominal("B")]);
        assert_eq!(type_to_source(&ty), "(A | B)");
    }

    #[test]
    fn test_sentinel_passes() {
        let annotated = format!("a{INDENT}\nb{DEDENT}\nc");
        assert_eq!(indent_sentinels(&annotated), "a\n  b\nc");
        assert_eq!(strip_sentinels(&annotated), "a\nb\nc");
    }

    #[test]
    fn test_literal_newlines_take_no_indentation() {
        let annotated = format!("x{INDENT}\n\"a{LITERAL_NEWLINE}b\"{DEDENT}\ny");
        assert_eq!(indent_sentinels(&annotated), "x\n  \"a\nb\"\ny");
    }
}
