use crate::error::{assure_query, ArchError, Result};
use crate::term::{Term, TermType};

const N: TermType = TermType::Number;
const S: TermType = TermType::String;
const B: TermType = TermType::Bool;
const W: TermType = TermType::Wildcard;

/// SQL function registry.
///
/// Every function is a row in [`Func::signature`]: its SQL name, an optional render
/// pattern, the accepted type of each argument slot and the result type.
/// Overloads (e.g. `FIRST_NUM`) are separate rows sharing one SQL name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Func {
    Count,
    Sum,
    Avg,
    Max,
    Min,

    First,
    FirstNum,
    FirstStr,
    Last,
    LastNum,
    LastStr,

    Abs,
    Square,
    Sqrt,

    Lower,
    Lcase,
    Upper,
    Ucase,

    Trim,
    Ltrim,
    Rtrim,
    Lpad,
    Rpad,

    Ascii,
    Char,
    Str,
    Hex,

    Left,
    Right,
    Substr,
    Substring,
    Mid,

    FindInSet,
    Locate,
    LocateFrom,
    Position,
    Instr,

    Translate,
    Replace,
    Repeat,
    Reverse,

    Len,
    Length,
    CharLength,

    CastAs,
    CastAsSigned,
    CastAsChar,

    Concat,
    Concat3,
    Concat4,
    Concat5,

    IsNull,
    IfNull,
    IfNullNum,
    IfNullStr,

    Coalesce,
    Coalesce3,
    Coalesce4,
    Coalesce5,
}

#[derive(Debug, Clone, Copy)]
pub struct FuncSignature {
    pub name: &'static str,
    /// Custom layout with one `{}` per argument; `name(a, b, ..)` otherwise
    pub pattern: Option<&'static str>,
    pub inputs: &'static [TermType],
    pub result: TermType,
}

const fn row(name: &'static str, inputs: &'static [TermType], result: TermType) -> FuncSignature {
    FuncSignature {
        name,
        pattern: None,
        inputs,
        result,
    }
}

const fn pattern(
    name: &'static str,
    pattern: &'static str,
    inputs: &'static [TermType],
    result: TermType,
) -> FuncSignature {
    FuncSignature {
        name,
        pattern: Some(pattern),
        inputs,
        result,
    }
}

impl Func {
    #[rustfmt::skip]
    pub const ALL: &'static [Func] = &[
        Func::Count, Func::Sum, Func::Avg, Func::Max, Func::Min,
        Func::First, Func::FirstNum, Func::FirstStr, Func::Last, Func::LastNum, Func::LastStr,
        Func::Abs, Func::Square, Func::Sqrt,
        Func::Lower, Func::Lcase, Func::Upper, Func::Ucase,
        Func::Trim, Func::Ltrim, Func::Rtrim, Func::Lpad, Func::Rpad,
        Func::Ascii, Func::Char, Func::Str, Func::Hex,
        Func::Left, Func::Right, Func::Substr, Func::Substring, Func::Mid,
        Func::FindInSet, Func::Locate, Func::LocateFrom, Func::Position, Func::Instr,
        Func::Translate, Func::Replace, Func::Repeat, Func::Reverse,
        Func::Len, Func::Length, Func::CharLength,
        Func::CastAs, Func::CastAsSigned, Func::CastAsChar,
        Func::Concat, Func::Concat3, Func::Concat4, Func::Concat5,
        Func::IsNull, Func::IfNull, Func::IfNullNum, Func::IfNullStr,
        Func::Coalesce, Func::Coalesce3, Func::Coalesce4, Func::Coalesce5,
    ];

    pub fn signature(self) -> FuncSignature {
        match self {
            Func::Count => row("count", &[W], N),
            Func::Sum => row("sum", &[N], N),
            Func::Avg => row("avg", &[N], N),
            Func::Max => row("max", &[N], N),
            Func::Min => row("min", &[N], N),

            Func::First => row("first", &[W], W),
            Func::FirstNum => row("first", &[N], N),
            Func::FirstStr => row("first", &[S], S),
            Func::Last => row("last", &[W], W),
            Func::LastNum => row("last", &[N], N),
            Func::LastStr => row("last", &[S], S),

            Func::Abs => row("abs", &[N], N),
            Func::Square => row("square", &[N], N),
            Func::Sqrt => row("sqrt", &[N], N),

            Func::Lower => row("lower", &[S], S),
            Func::Lcase => row("lcase", &[S], S),
            Func::Upper => row("upper", &[S], S),
            Func::Ucase => row("ucase", &[S], S),

            Func::Trim => row("trim", &[S], S),
            Func::Ltrim => row("ltrim", &[S], S),
            Func::Rtrim => row("rtrim", &[S], S),
            Func::Lpad => row("lpad", &[S, N, S], S),
            Func::Rpad => row("rpad", &[S, N, S], S),

            Func::Ascii => row("ascii", &[S], N),
            Func::Char => row("char", &[N], S),
            Func::Str => row("str", &[N], S),
            Func::Hex => row("hex", &[S], S),

            Func::Left => row("left", &[S, N], S),
            Func::Right => row("right", &[S, N], S),
            Func::Substr => row("substr", &[S, N, N], S),
            Func::Substring => row("substring", &[S, N, N], S),
            Func::Mid => row("mid", &[S, N, N], S),

            Func::FindInSet => row("find_in_set", &[S, S], N),
            Func::Locate => row("locate", &[S, S], N),
            Func::LocateFrom => row("locate", &[S, S, N], N),
            Func::Position => pattern("position", "position({} IN {})", &[S, S], N),
            Func::Instr => row("instr", &[S, S], N),

            Func::Translate => row("translate", &[S, S, S], S),
            Func::Replace => row("replace", &[S, S, S], S),
            Func::Repeat => row("repeat", &[S, N], S),
            Func::Reverse => row("reverse", &[S], S),

            Func::Len => row("len", &[S], N),
            Func::Length => row("length", &[S], N),
            Func::CharLength => row("char_length", &[S], N),

            Func::CastAs => pattern("CAST", "CAST({} AS {})", &[W, S], W),
            Func::CastAsSigned => pattern("CAST", "CAST({} AS SIGNED)", &[W], N),
            Func::CastAsChar => pattern("CAST", "CAST({} AS CHAR)", &[W], S),

            Func::Concat => row("concat", &[S, S], S),
            Func::Concat3 => row("concat", &[S, S, S], S),
            Func::Concat4 => row("concat", &[S, S, S, S], S),
            Func::Concat5 => row("concat", &[S, S, S, S, S], S),

            Func::IsNull => row("isnull", &[W], B),
            Func::IfNull => row("ifnull", &[W, W], W),
            Func::IfNullNum => row("ifnull", &[N, N], N),
            Func::IfNullStr => row("ifnull", &[S, S], S),

            Func::Coalesce => row("coalesce", &[W, W], W),
            Func::Coalesce3 => row("coalesce", &[W, W, W], W),
            Func::Coalesce4 => row("coalesce", &[W, W, W, W], W),
            Func::Coalesce5 => row("coalesce", &[W, W, W, W, W], W),
        }
    }

    pub fn name(self) -> &'static str {
        self.signature().name
    }

    pub fn arity(self) -> usize {
        self.signature().inputs.len()
    }

    pub fn result_type(self) -> TermType {
        self.signature().result
    }

    pub fn is_aggregate(self) -> bool {
        matches!(
            self,
            Func::Count
                | Func::Sum
                | Func::Avg
                | Func::Min
                | Func::Max
                | Func::First
                | Func::FirstNum
                | Func::FirstStr
                | Func::Last
                | Func::LastNum
                | Func::LastStr
        )
    }

    /// Only `count(*)` takes the `*` pseudo-column.
    pub fn allows_star(self) -> bool {
        self == Func::Count
    }

    /// Builds the call, checking arity first and then every argument slot.
    pub fn apply<I, T>(self, terms: I) -> Result<FuncExpr>
    where
        I: IntoIterator<Item = T>,
        T: Into<Term>,
    {
        let terms: Vec<Term> = terms.into_iter().map(Into::into).collect();
        let signature = self.signature();

        assure_query(terms.len() == signature.inputs.len(), || {
            format!(
                "Function `{}` expects {} argument(s), got {}",
                signature.name,
                signature.inputs.len(),
                terms.len()
            )
        })?;

        for (index, (expected, term)) in signature.inputs.iter().zip(&terms).enumerate() {
            if term.is_star() {
                assure_query(self.allows_star(), || {
                    format!("Function `{}` does not accept `*`", signature.name)
                })?;
                continue;
            }
            if !expected.accepts(term.term_type()) {
                return Err(ArchError::InvalidQuery(format!(
                    "Incompatible function `{}` argument #{}: `{}` has type {}, expected {}",
                    signature.name,
                    index + 1,
                    term.repr(),
                    term.term_type(),
                    expected
                )));
            }
        }

        Ok(FuncExpr { func: self, terms })
    }
}

/// Checked function application
#[derive(Debug, Clone, PartialEq)]
pub struct FuncExpr {
    func: Func,
    terms: Vec<Term>,
}

impl FuncExpr {
    pub fn func(&self) -> Func {
        self.func
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    pub fn term_type(&self) -> TermType {
        self.func.result_type()
    }

    pub fn is_aggregate(&self) -> bool {
        self.func.is_aggregate()
    }

    pub fn repr(&self) -> String {
        let signature = self.func.signature();
        let reprs: Vec<String> = self.terms.iter().map(Term::repr).collect();
        match signature.pattern {
            Some(pattern) => {
                let mut out = String::new();
                let mut parts = pattern.split("{}");
                if let Some(head) = parts.next() {
                    out.push_str(head);
                }
                for (part, repr) in parts.zip(&reprs) {
                    out.push_str(repr);
                    out.push_str(part);
                }
                out
            }
            None => format!("{}({})", signature.name, reprs.join(", ")),
        }
    }
}

impl From<FuncExpr> for Term {
    fn from(expr: FuncExpr) -> Self {
        Term::Func(expr)
    }
}
