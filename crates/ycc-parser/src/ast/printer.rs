//! Tree dump of a parsed program, used for `trace!` output.

use std::fmt;

use crate::ast::Program;
use crate::ast::expr::{Expr, LiteralKind};
use crate::ast::stmt::{ForInit, Stmt, VarDecl};

struct Node {
    label: String,
    children: Vec<Node>,
}

impl Node {
    fn leaf(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            children: Vec::new(),
        }
    }

    fn new(label: impl Into<String>, children: Vec<Node>) -> Self {
        Self {
            label: label.into(),
            children,
        }
    }

    fn render(&self, f: &mut fmt::Formatter<'_>, prefix: &str, last: bool) -> fmt::Result {
        let (branch, indent) = if last { ("└── ", "    ") } else { ("├── ", "│   ") };
        writeln!(f, "{prefix}{branch}{}", self.label)?;
        let child_prefix = format!("{prefix}{indent}");
        for (i, child) in self.children.iter().enumerate() {
            child.render(f, &child_prefix, i + 1 == self.children.len())?;
        }
        Ok(())
    }
}

fn stmt_node(stmt: &Stmt<'_>) -> Node {
    match stmt {
        Stmt::Class(class) => Node::new(
            format!("class {}", class.name.name),
            class.body.iter().map(stmt_node).collect(),
        ),
        Stmt::Method(method) => {
            let params: Vec<String> = method
                .params
                .iter()
                .map(|p| format!("{} {}", p.ty.name, p.name.name))
                .collect();
            let label = if method.is_constructor {
                format!("constructor {}({})", method.name.name, params.join(", "))
            } else {
                format!(
                    "method {} {}({})",
                    method.return_type.name,
                    method.name.name,
                    params.join(", ")
                )
            };
            let children = method
                .body
                .map(|b| b.stmts.iter().map(stmt_node).collect())
                .unwrap_or_default();
            Node::new(label, children)
        }
        Stmt::VarDecl(decl) => var_decl_node(decl),
        Stmt::Block(block) => Node::new("block", block.stmts.iter().map(stmt_node).collect()),
        Stmt::Expr(stmt) => expr_node(stmt.expr),
        Stmt::If(stmt) => {
            let mut children = vec![expr_node(stmt.cond), stmt_node(&stmt.then_branch)];
            if let Some(else_branch) = &stmt.else_branch {
                children.push(Node::new("else", vec![stmt_node(else_branch)]));
            }
            Node::new("if", children)
        }
        Stmt::For(stmt) => {
            let mut children = Vec::new();
            match stmt.init {
                Some(ForInit::VarDecl(decl)) => children.push(var_decl_node(decl)),
                Some(ForInit::Exprs(exprs)) => children.extend(exprs.iter().map(|e| expr_node(e))),
                None => {}
            }
            if let Some(cond) = stmt.cond {
                children.push(Node::new("cond", vec![expr_node(cond)]));
            }
            if !stmt.update.is_empty() {
                children.push(Node::new(
                    "update",
                    stmt.update.iter().map(|e| expr_node(e)).collect(),
                ));
            }
            children.push(stmt_node(&stmt.body));
            Node::new("for", children)
        }
        Stmt::While(stmt) => Node::new("while", vec![expr_node(stmt.cond), stmt_node(&stmt.body)]),
        Stmt::DoWhile(stmt) => {
            Node::new("do-while", vec![stmt_node(&stmt.body), expr_node(stmt.cond)])
        }
        Stmt::Switch(stmt) => {
            let mut children = vec![expr_node(stmt.selector)];
            for case in stmt.cases {
                let mut case_children: Vec<Node> = case.label.map(expr_node).into_iter().collect();
                case_children.extend(case.stmts.iter().map(stmt_node));
                let label = if case.label.is_some() { "case" } else { "default" };
                children.push(Node::new(label, case_children));
            }
            Node::new("switch", children)
        }
        Stmt::Break(_) => Node::leaf("break"),
        Stmt::Continue(_) => Node::leaf("continue"),
        Stmt::Return(stmt) => Node::new("return", stmt.value.map(expr_node).into_iter().collect()),
        Stmt::Empty(_) => Node::leaf(";"),
    }
}

fn var_decl_node(decl: &VarDecl<'_>) -> Node {
    let children = decl
        .declarators
        .iter()
        .map(|d| {
            let label = match d.array_size {
                Some(size) => format!("{}[{size}]", d.name.name),
                None => d.name.name.to_string(),
            };
            Node::new(label, d.init.map(expr_node).into_iter().collect())
        })
        .collect();
    Node::new(format!("var {}", decl.ty.name), children)
}

fn expr_node(expr: &Expr<'_>) -> Node {
    match expr {
        Expr::Ident(e) => Node::leaf(format!("ident {}", e.ident.name)),
        Expr::Literal(e) => Node::leaf(match e.kind {
            LiteralKind::Int { value, is_char: true, .. } => format!("char {value}"),
            LiteralKind::Int { value, .. } => format!("int {value}"),
            LiteralKind::Real(value) => format!("real {value}"),
            LiteralKind::Bool(value) => format!("bool {value}"),
            LiteralKind::Null => "null".to_string(),
            LiteralKind::Str(text) => format!("string \"{text}\""),
        }),
        Expr::New(e) => {
            let children = e.length.into_iter().chain(e.args.iter().copied()).map(expr_node);
            Node::new(format!("new {}", e.type_name.name), children.collect())
        }
        Expr::Index(e) => Node::new("index", vec![expr_node(e.base), expr_node(e.index)]),
        Expr::Call(e) => Node::new(
            format!("call {}", e.callee.name),
            e.args.iter().map(|a| expr_node(a)).collect(),
        ),
        Expr::Qualified(e) => Node::new(".", vec![expr_node(e.left), expr_node(e.right)]),
        Expr::Array(e) => Node::new("{}", e.elements.iter().map(|a| expr_node(a)).collect()),
        Expr::Unary(e) => Node::new(format!("unary {}", e.op), vec![expr_node(e.operand)]),
        Expr::Postfix(e) => Node::new(format!("postfix {}", e.op), vec![expr_node(e.operand)]),
        Expr::Binary(e) => Node::new(
            format!("binary {}", e.op),
            vec![expr_node(e.left), expr_node(e.right)],
        ),
        Expr::Assign(e) => Node::new(
            format!("assign {}", e.op),
            vec![expr_node(e.target), expr_node(e.value)],
        ),
        Expr::Ternary(e) => Node::new(
            "?:",
            vec![
                expr_node(e.cond),
                expr_node(e.then_expr),
                expr_node(e.else_expr),
            ],
        ),
    }
}

impl fmt::Display for Program<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "program")?;
        for (i, item) in self.items.iter().enumerate() {
            stmt_node(item).render(f, "", i + 1 == self.items.len())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use bumpalo::Bump;
    use ycc_registry::ScopeEnvironment;

    use crate::Parser;

    #[test]
    fn dumps_nested_structure() {
        let arena = Bump::new();
        let mut env = ScopeEnvironment::new();
        let program = Parser::parse(
            "class A { int x; int f(int a) { return a + 1; } }",
            &arena,
            &mut env,
        )
        .unwrap();
        let expected = "\
program
└── class A
    ├── var int
    │   └── x
    └── method int f(int a)
        └── return
            └── binary +
                ├── ident a
                └── int 1
";
        assert_eq!(program.to_string(), expected);
    }
}
