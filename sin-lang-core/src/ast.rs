use std::fmt::Display;
use std::rc::Rc;

#[derive(Debug, PartialEq, Clone)]
pub enum Expression {
    Variable(Identifier),
    Literal(Literal),
    EmbeddedHostCode(Rc<str>),
    PropertyAccess {
        target: Box<Expression>,
        key: Identifier,
    },
    ListIndex {
        target: Box<Expression>,
        index: Box<Expression>,
    },
    Call {
        callee: Box<Expression>,
        arguments: Vec<Expression>,
    },
    /// Direct invocation of a host callable, named by its embedded code.
    HostCall {
        code: Rc<str>,
        arguments: Vec<Expression>,
    },
    Assign {
        target: Box<Expression>,
        value: Box<Expression>,
    },
    Block(Block),
    Condition {
        condition: Box<Expression>,
        consequence: Block,
        alternative: Option<Block>,
    },
    Loop {
        condition: Box<Expression>,
        body: Block,
    },
    Function {
        parameters: Vec<Identifier>,
        body: Rc<Block>,
    },
    Record(Vec<Field>),
}

#[derive(Debug, PartialEq, Clone)]
pub enum Literal {
    Number(i64),
    String(Rc<str>),
    List(Vec<Expression>),
}

#[derive(Debug, PartialEq, Clone)]
pub struct Field {
    pub name: Identifier,
    pub value: Expression,
}

#[derive(Debug, PartialEq, Clone)]
pub struct Identifier {
    pub name: Rc<str>,
}

#[derive(Debug, PartialEq, Clone, Default)]
pub struct Block {
    pub expressions: Vec<Expression>,
}

impl Expression {
    pub fn variable(name: &str) -> Self {
        Expression::Variable(Identifier { name: name.into() })
    }
}

fn write_separated<T: Display>(
    f: &mut std::fmt::Formatter<'_>,
    items: impl IntoIterator<Item = T>,
    separator: &str,
) -> std::fmt::Result {
    for (i, item) in items.into_iter().enumerate() {
        if i > 0 {
            write!(f, "{}", separator)?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl Display for Block {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write_separated(f, &self.expressions, " ")
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Literal::Number(value) => write!(f, "{}", value),
            Literal::String(value) => write!(f, "\"{}\"", value),
            Literal::List(elements) => {
                write!(f, "[")?;
                write_separated(f, elements, ", ")?;
                write!(f, "]")
            }
        }
    }
}

impl Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use Expression::*;
        match self {
            Variable(ident) => write!(f, "{}", ident),
            Literal(literal) => write!(f, "{}", literal),
            EmbeddedHostCode(code) => write!(f, "{{{}}}", code),
            PropertyAccess { target, key } => write!(f, "{}.{}", target, key),
            ListIndex { target, index } => write!(f, "{}[{}]", target, index),
            Call { callee, arguments } => {
                write!(f, "{}(", callee)?;
                write_separated(f, arguments, ", ")?;
                write!(f, ")")
            }
            HostCall { code, arguments } => {
                write!(f, "{{{}}}(", code)?;
                write_separated(f, arguments, ", ")?;
                write!(f, ")")
            }
            Assign { target, value } => write!(f, "({} = {})", target, value),
            Block(block) => write!(f, "({})", block),
            Condition {
                condition,
                consequence,
                alternative,
            } => {
                write!(f, "if {} then {}", condition, consequence)?;
                if let Some(alternative) = alternative {
                    write!(f, " else {}", alternative)?;
                }
                write!(f, " end")
            }
            Loop { condition, body } => write!(f, "while {} do {} end", condition, body),
            Function { parameters, body } => {
                write!(f, "fun (")?;
                write_separated(f, parameters, ", ")?;
                write!(f, ") {} end", body)
            }
            Record(fields) => {
                write!(f, "data")?;
                for field in fields {
                    write!(f, " {} -> {}", field.name, field.value)?;
                }
                write!(f, " end")
            }
        }
    }
}
