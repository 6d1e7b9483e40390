//! Grammar of the text form.
//!
//! Everything here is still names; resolving them to handles happens in the
//! parent module. An operation reads as
//!
//! ```text
//! [%r, ... =] dialect.op [@symbol] [(%arg: type, ...) | %operand, ...]
//!     [-> type] [{key = attr, ...}] [: type, ...] [{region}]*
//! ```

use winnow::ascii::{dec_uint, digit1, multispace1, space0, till_line_ending};
use winnow::combinator::{
    alt, cut_err, delimited, opt, preceded, repeat, separated, separated_pair, terminated,
};
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::token::{any, one_of, take_till, take_while};

type Named<'a, T> = (&'a str, T);

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TypeSyntax<'a> {
    pub dialect: &'a str,
    pub name: &'a str,
    pub params: Vec<TypeSyntax<'a>>,
    pub attrs: Vec<Named<'a, AttrSyntax<'a>>>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum AttrSyntax<'a> {
    Unit,
    Bool(bool),
    /// Two's complement bits; `-1` reads as `u64::MAX`.
    Int(u64),
    Float(f64),
    String(String),
    Symbol(String),
    Type(TypeSyntax<'a>),
    List(Vec<AttrSyntax<'a>>),
}

/// `(%a: t, ...) -> t` of a function-like op.
#[derive(Debug)]
pub(crate) struct Signature<'a> {
    pub params: Vec<Named<'a, TypeSyntax<'a>>>,
    pub result: Option<TypeSyntax<'a>>,
}

#[derive(Debug)]
pub(crate) struct OpSyntax<'a> {
    /// Input length left where the op starts, for error offsets.
    pub rest_len: usize,
    pub results: Vec<&'a str>,
    pub dialect: &'a str,
    pub name: &'a str,
    pub symbol: Option<String>,
    pub signature: Option<Signature<'a>>,
    pub operands: Vec<&'a str>,
    pub attrs: Vec<Named<'a, AttrSyntax<'a>>>,
    pub result_types: Vec<TypeSyntax<'a>>,
    pub regions: Vec<RegionSyntax<'a>>,
}

#[derive(Debug)]
pub(crate) struct RegionSyntax<'a> {
    pub blocks: Vec<BlockSyntax<'a>>,
}

#[derive(Debug)]
pub(crate) struct BlockSyntax<'a> {
    pub label: &'a str,
    pub args: Vec<Named<'a, TypeSyntax<'a>>>,
    pub ops: Vec<OpSyntax<'a>>,
}

/// Whitespace and `//` line comments.
pub(crate) fn skip(input: &mut &str) -> ModalResult<()> {
    repeat(0.., alt((multispace1.void(), ("//", till_line_ending).void()))).parse_next(input)
}

/// `open item, ... close`, whitespace allowed between tokens.
fn list<'a, O>(
    open: char,
    item: impl Parser<&'a str, O, ErrMode<ContextError>>,
    close: char,
) -> impl Parser<&'a str, Vec<O>, ErrMode<ContextError>> {
    delimited(
        open,
        separated(0.., preceded(skip, item), preceded(skip, ',')),
        preceded(skip, close),
    )
}

fn is_word(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn word<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    take_while(1.., is_word).parse_next(input)
}

fn ident<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    (one_of(|c: char| c.is_ascii_alphabetic() || c == '_'), take_while(0.., is_word))
        .take()
        .parse_next(input)
}

fn dotted_name<'a>(input: &mut &'a str) -> ModalResult<(&'a str, &'a str)> {
    separated_pair(ident, '.', ident).parse_next(input)
}

fn value_name<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    preceded('%', word).parse_next(input)
}

fn symbol_name(input: &mut &str) -> ModalResult<String> {
    preceded('@', alt((quoted, word.map(str::to_owned)))).parse_next(input)
}

fn integer(input: &mut &str) -> ModalResult<u64> {
    (opt('-'), dec_uint)
        .verify_map(|(sign, magnitude): (Option<char>, u64)| match sign {
            None => Some(magnitude),
            Some(_) => (magnitude <= 1 << 63).then(|| magnitude.wrapping_neg()),
        })
        .parse_next(input)
}

/// Decimal float; the `.` keeps it apart from integers.
fn float(input: &mut &str) -> ModalResult<f64> {
    (
        opt('-'),
        digit1,
        '.',
        digit1,
        opt((one_of(['e', 'E']), opt(one_of(['+', '-'])), digit1)),
    )
        .take()
        .verify_map(|text: &str| text.parse().ok())
        .parse_next(input)
}

fn quoted(input: &mut &str) -> ModalResult<String> {
    let body = repeat(0.., alt((take_till(1.., ['"', '\\']).void(), ('\\', any).void())))
        .map(|()| ())
        .take();
    delimited('"', body, '"').map(unescape).parse_next(input)
}

fn unescape(raw: &str) -> String {
    let mut text = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            text.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => text.push('\n'),
            Some('t') => text.push('\t'),
            Some('r') => text.push('\r'),
            Some('0') => text.push('\0'),
            Some('x') => {
                let byte = chars.as_str().get(..2).and_then(|hex| u8::from_str_radix(hex, 16).ok());
                match byte {
                    Some(byte) => {
                        text.push(char::from(byte));
                        chars.nth(1);
                    }
                    None => text.push_str("\\x"),
                }
            }
            Some(c @ ('"' | '\\')) => text.push(c),
            Some(other) => {
                text.push('\\');
                text.push(other);
            }
            None => text.push('\\'),
        }
    }
    text
}

fn type_syntax<'a>(input: &mut &'a str) -> ModalResult<TypeSyntax<'a>> {
    let (dialect, name) = dotted_name(input)?;
    let params = opt(list('(', type_syntax, ')')).parse_next(input)?;
    // Without a parameter list a following `{` belongs to the op, not the type.
    let attrs = match params {
        Some(_) => opt(preceded(skip, nonempty_dict)).parse_next(input)?,
        None => None,
    };
    Ok(TypeSyntax {
        dialect,
        name,
        params: params.unwrap_or_default(),
        attrs: attrs.unwrap_or_default(),
    })
}

fn attr_value<'a>(input: &mut &'a str) -> ModalResult<AttrSyntax<'a>> {
    alt((
        "true".value(AttrSyntax::Bool(true)),
        "false".value(AttrSyntax::Bool(false)),
        "unit".value(AttrSyntax::Unit),
        quoted.map(AttrSyntax::String),
        symbol_name.map(AttrSyntax::Symbol),
        list('[', attr_value, ']').map(AttrSyntax::List),
        float.map(AttrSyntax::Float),
        integer.map(AttrSyntax::Int),
        type_syntax.map(AttrSyntax::Type),
    ))
    .parse_next(input)
}

fn attr_dict<'a>(input: &mut &'a str) -> ModalResult<Vec<Named<'a, AttrSyntax<'a>>>> {
    list('{', separated_pair(ident, (skip, '=', skip), attr_value), '}').parse_next(input)
}

/// `{}` in front of a region position is the region, never a dict.
fn nonempty_dict<'a>(input: &mut &'a str) -> ModalResult<Vec<Named<'a, AttrSyntax<'a>>>> {
    attr_dict
        .verify(|entries: &Vec<Named<'a, AttrSyntax<'a>>>| !entries.is_empty())
        .parse_next(input)
}

fn typed_arg<'a>(input: &mut &'a str) -> ModalResult<Named<'a, TypeSyntax<'a>>> {
    separated_pair(value_name, (skip, ':', skip), type_syntax).parse_next(input)
}

fn value_names<'a>(input: &mut &'a str) -> ModalResult<Vec<&'a str>> {
    separated(1.., value_name, (skip, ',', skip)).parse_next(input)
}

pub(crate) fn operation<'a>(input: &mut &'a str) -> ModalResult<OpSyntax<'a>> {
    skip(input)?;
    let rest_len = input.len();
    let results = opt(terminated(value_names, (skip, '=', skip)))
        .parse_next(input)?
        .unwrap_or_default();
    let (dialect, name) = dotted_name(input)?;
    let symbol = opt(preceded(skip, symbol_name)).parse_next(input)?;

    // Operands must share the op's line; otherwise the next op's results
    // would read as operands.
    let params = preceded(space0, opt(list('(', typed_arg, ')'))).parse_next(input)?;
    let operands = match params {
        Some(_) => Vec::new(),
        None => opt(value_names).parse_next(input)?.unwrap_or_default(),
    };
    let result = opt(preceded((skip, "->", skip), type_syntax)).parse_next(input)?;
    let signature = (params.is_some() || result.is_some()).then(|| Signature {
        params: params.unwrap_or_default(),
        result,
    });

    let attrs = opt(preceded(skip, nonempty_dict))
        .parse_next(input)?
        .unwrap_or_default();
    let result_types = opt(preceded(
        (skip, ':', skip),
        separated(1.., type_syntax, (skip, ',', skip)),
    ))
    .parse_next(input)?
    .unwrap_or_default();
    let regions = repeat(0.., preceded(skip, region)).parse_next(input)?;

    Ok(OpSyntax {
        rest_len,
        results,
        dialect,
        name,
        symbol,
        signature,
        operands,
        attrs,
        result_types,
        regions,
    })
}

fn block<'a>(input: &mut &'a str) -> ModalResult<BlockSyntax<'a>> {
    let label = preceded('^', word).parse_next(input)?;
    let args = opt(list('(', typed_arg, ')'))
        .parse_next(input)?
        .unwrap_or_default();
    (skip, ':').parse_next(input)?;
    let ops = repeat(0.., preceded(skip, operation)).parse_next(input)?;
    Ok(BlockSyntax { label, args, ops })
}

/// Labelled blocks, or bare ops forming a single block `^bb0`. Once the `{`
/// is read the region is committed, so errors inside it are not retried.
fn region<'a>(input: &mut &'a str) -> ModalResult<RegionSyntax<'a>> {
    preceded('{', cut_err(terminated(region_body, (skip, '}')))).parse_next(input)
}

fn region_body<'a>(input: &mut &'a str) -> ModalResult<RegionSyntax<'a>> {
    skip(input)?;
    if input.starts_with('^') {
        let blocks = repeat(1.., preceded(skip, block)).parse_next(input)?;
        return Ok(RegionSyntax { blocks });
    }
    let ops = repeat(0.., preceded(skip, operation)).parse_next(input)?;
    Ok(RegionSyntax {
        blocks: vec![BlockSyntax {
            label: "bb0",
            args: Vec::new(),
            ops,
        }],
    })
}
