use crate::literal::Literal;
use crate::token::Token;

/// An expression node. Each variant wraps a `*Data` struct holding its
/// children; this keeps `match` arms at the interpretation sites flat while
/// letting every data struct carry its own fields independently.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Assign(AssignData),
    Binary(BinaryData),
    Call(CallData),
    Get(GetData),
    Grouping(GroupingData),
    Lambda(LambdaData),
    Literal(Literal),
    Logical(LogicalData),
    Set(SetData),
    Super(SuperData),
    This(ThisData),
    Unary(UnaryData),
    Variable(VariableData),
}

impl Expr {
    pub fn accept<T>(&self, visitor: &mut dyn ExprVisitor<T>) -> T {
        match self {
            Expr::Assign(_) => visitor.visit_assign_expr(self),
            Expr::Binary(_) => visitor.visit_binary_expr(self),
            Expr::Call(_) => visitor.visit_call_expr(self),
            Expr::Get(_) => visitor.visit_get_expr(self),
            Expr::Grouping(_) => visitor.visit_grouping_expr(self),
            Expr::Lambda(_) => visitor.visit_lambda_expr(self),
            Expr::Literal(_) => visitor.visit_literal_expr(self),
            Expr::Logical(_) => visitor.visit_logical_expr(self),
            Expr::Set(_) => visitor.visit_set_expr(self),
            Expr::Super(_) => visitor.visit_super_expr(self),
            Expr::This(_) => visitor.visit_this_expr(self),
            Expr::Unary(_) => visitor.visit_unary_expr(self),
            Expr::Variable(_) => visitor.visit_variable_expr(self),
        }
    }
}

pub trait ExprVisitor<T> {
    fn visit_assign_expr(&mut self, expr: &Expr) -> T;
    fn visit_binary_expr(&mut self, expr: &Expr) -> T;
    fn visit_call_expr(&mut self, expr: &Expr) -> T;
    fn visit_get_expr(&mut self, expr: &Expr) -> T;
    fn visit_grouping_expr(&mut self, expr: &Expr) -> T;
    fn visit_lambda_expr(&mut self, expr: &Expr) -> T;
    fn visit_literal_expr(&mut self, expr: &Expr) -> T;
    fn visit_logical_expr(&mut self, expr: &Expr) -> T;
    fn visit_set_expr(&mut self, expr: &Expr) -> T;
    fn visit_super_expr(&mut self, expr: &Expr) -> T;
    fn visit_this_expr(&mut self, expr: &Expr) -> T;
    fn visit_unary_expr(&mut self, expr: &Expr) -> T;
    fn visit_variable_expr(&mut self, expr: &Expr) -> T;
}

/// Assignment target/value carry an `id` — the resolver's side-table key.
/// See [`crate::resolver`] for why this is a counter instead of node identity.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignData {
    pub id: u32,
    pub name: Token,
    pub value: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryData {
    pub left: Box<Expr>,
    pub operator: Token,
    pub right: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallData {
    pub callee: Box<Expr>,
    pub paren: Token,
    pub arguments: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GetData {
    pub object: Box<Expr>,
    pub name: Token,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupingData {
    pub expr: Box<Expr>,
}

/// An anonymous function expression: `fun (a, b) { ... }`.
#[derive(Debug, Clone, PartialEq)]
pub struct LambdaData {
    pub params: Vec<Token>,
    pub body: Vec<crate::stmt::Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogicalData {
    pub left: Box<Expr>,
    pub operator: Token,
    pub right: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetData {
    pub object: Box<Expr>,
    pub name: Token,
    pub value: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SuperData {
    pub id: u32,
    pub keyword: Token,
    pub method: Token,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThisData {
    pub id: u32,
    pub keyword: Token,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryData {
    pub operator: Token,
    pub expr: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableData {
    pub id: u32,
    pub name: Token,
}
